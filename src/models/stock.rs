use bigdecimal::BigDecimal;
use serde::{de, Deserialize, Deserializer, Serialize};
use sqlx::FromRow;

use crate::models::comment::CommentDto;
use crate::models::validation::{check_char_len, FieldErrors};

pub const DEFAULT_PAGE_NUMBER: i64 = 1;
pub const DEFAULT_PAGE_SIZE: i64 = 20;

const MAX_TEXT_LEN: usize = 10;
const MIN_PURCHASE: f64 = 1.0;
const MAX_PURCHASE: f64 = 1_000_000_000.0;
const MIN_LAST_DIV: f64 = 0.001;
const MAX_LAST_DIV: f64 = 100.0;
const MIN_MARKET_CAP: i64 = 1;
const MAX_MARKET_CAP: i64 = 5_000_000_000;

// A listed equity as persisted in the `stocks` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Stock {
    pub id: i32,
    pub symbol: String,
    pub company_name: String,
    pub purchase: BigDecimal,
    pub last_div: BigDecimal,
    pub industry: String,
    pub market_cap: i64,
}

/// Column values for an insert or a full-field overwrite.
#[derive(Debug, Clone, PartialEq)]
pub struct NewStock {
    pub symbol: String,
    pub company_name: String,
    pub purchase: BigDecimal,
    pub last_div: BigDecimal,
    pub industry: String,
    pub market_cap: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockDto {
    pub id: i32,
    pub symbol: String,
    pub company_name: String,
    pub purchase: f64,
    pub last_div: f64,
    pub industry: String,
    pub market_cap: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockDetailDto {
    #[serde(flatten)]
    pub stock: StockDto,
    pub comments: Vec<CommentDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateStockRequest {
    pub symbol: String,
    pub company_name: String,
    pub purchase: f64,
    pub last_div: f64,
    pub industry: String,
    pub market_cap: i64,
}

pub type UpdateStockRequest = CreateStockRequest;

impl CreateStockRequest {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::default();

        // Lengths are checked on the trimmed values that get stored.
        check_char_len(&mut errors, "symbol", "Symbol", self.symbol.trim(), 1, MAX_TEXT_LEN);
        check_char_len(
            &mut errors,
            "companyName",
            "Company name",
            self.company_name.trim(),
            1,
            MAX_TEXT_LEN,
        );
        check_char_len(&mut errors, "industry", "Industry", self.industry.trim(), 1, MAX_TEXT_LEN);

        if !self.purchase.is_finite() || self.purchase < MIN_PURCHASE || self.purchase > MAX_PURCHASE {
            errors.push("purchase", "Purchase must be between 1 and 1000000000");
        }

        // Zero means the stock pays no dividend; anything else must sit in the dividend range.
        let pays_no_dividend = self.last_div == 0.0;
        if !self.last_div.is_finite()
            || (!pays_no_dividend && (self.last_div < MIN_LAST_DIV || self.last_div > MAX_LAST_DIV))
        {
            errors.push("lastDiv", "Last dividend must be 0 or between 0.001 and 100");
        }

        if self.market_cap < MIN_MARKET_CAP || self.market_cap > MAX_MARKET_CAP {
            errors.push("marketCap", "Market cap must be between 1 and 5000000000");
        }

        errors.into_result()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Symbol,
    CompanyName,
}

impl SortField {
    /// Matches the `SortBy` query value case-insensitively. Unknown names yield `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.eq_ignore_ascii_case("symbol") {
            Some(SortField::Symbol)
        } else if raw.eq_ignore_ascii_case("companyname") {
            Some(SortField::CompanyName)
        } else {
            None
        }
    }

    pub fn column(&self) -> &'static str {
        match self {
            SortField::Symbol => "symbol",
            SortField::CompanyName => "company_name",
        }
    }

    pub fn key<'a>(&self, stock: &'a Stock) -> &'a str {
        match self {
            SortField::Symbol => &stock.symbol,
            SortField::CompanyName => &stock.company_name,
        }
    }
}

/// Query string accepted by `GET /api/stock`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct StockQuery {
    pub company_name: Option<String>,
    pub symbol: Option<String>,
    pub sort_by: Option<String>,
    #[serde(deserialize_with = "deserialize_flag")]
    pub is_sort_descending: bool,
    pub page_number: i64,
    pub page_size: i64,
}

/// Accepts `true`/`false` in any letter case, so `IsSortDescending=True` binds.
fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    let value = raw.trim();
    if value.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if value.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err(de::Error::custom(format!(
            "IsSortDescending must be true or false, got `{}`",
            value
        )))
    }
}

impl Default for StockQuery {
    fn default() -> Self {
        Self {
            company_name: None,
            symbol: None,
            sort_by: None,
            is_sort_descending: false,
            page_number: DEFAULT_PAGE_NUMBER,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockSort {
    pub field: SortField,
    pub descending: bool,
}

/// Normalised listing criteria handed to the stock repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockFilter {
    pub company_name: Option<String>,
    pub symbol: Option<String>,
    pub sort: Option<StockSort>,
    pub offset: i64,
    pub limit: i64,
}

impl StockFilter {
    pub fn from_query(query: &StockQuery, max_page_size: i64) -> Result<Self, FieldErrors> {
        let mut errors = FieldErrors::default();
        if query.page_number < 1 {
            errors.push("PageNumber", "PageNumber must be at least 1");
        }
        if query.page_size < 1 {
            errors.push("PageSize", "PageSize must be at least 1");
        }
        errors.into_result()?;

        let limit = query.page_size.min(max_page_size);
        let offset = (query.page_number - 1).saturating_mul(limit);

        Ok(Self {
            company_name: non_blank(query.company_name.as_deref()),
            symbol: non_blank(query.symbol.as_deref()),
            sort: query
                .sort_by
                .as_deref()
                .and_then(SortField::parse)
                .map(|field| StockSort {
                    field,
                    descending: query.is_sort_descending,
                }),
            offset,
            limit,
        })
    }

    pub fn matches(&self, stock: &Stock) -> bool {
        let company_ok = self
            .company_name
            .as_deref()
            .map_or(true, |needle| stock.company_name.contains(needle));
        let symbol_ok = self
            .symbol
            .as_deref()
            .map_or(true, |needle| stock.symbol.contains(needle));
        company_ok && symbol_ok
    }

    /// Filters, orders and pages an in-memory set the same way the SQL listing does.
    pub fn apply<'a, I>(&self, stocks: I) -> Vec<Stock>
    where
        I: IntoIterator<Item = &'a Stock>,
    {
        let mut selected: Vec<&Stock> = stocks.into_iter().filter(|s| self.matches(s)).collect();
        selected.sort_by_key(|s| s.id);
        if let Some(sort) = self.sort {
            selected.sort_by(|a, b| {
                let ord = sort.field.key(a).cmp(sort.field.key(b));
                if sort.descending {
                    ord.reverse()
                } else {
                    ord
                }
            });
        }
        selected
            .into_iter()
            .skip(usize::try_from(self.offset).unwrap_or(usize::MAX))
            .take(usize::try_from(self.limit).unwrap_or(0))
            .cloned()
            .collect()
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .filter(|v| !v.trim().is_empty())
        .map(|v| v.to_string())
}
