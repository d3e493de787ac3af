use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::models::{NewStock, Stock, StockFilter};

const STOCK_COLUMNS: &str = "id, symbol, company_name, purchase, last_div, industry, market_cap";

pub async fn fetch_filtered(pool: &PgPool, filter: &StockFilter) -> Result<Vec<Stock>, sqlx::Error> {
    let mut query_builder: QueryBuilder<Postgres> =
        QueryBuilder::new(format!("SELECT {} FROM stocks WHERE TRUE", STOCK_COLUMNS));

    // strpos keeps the match case-sensitive and treats % and _ literally
    if let Some(company_name) = &filter.company_name {
        query_builder.push(" AND strpos(company_name, ");
        query_builder.push_bind(company_name);
        query_builder.push(") > 0");
    }

    if let Some(symbol) = &filter.symbol {
        query_builder.push(" AND strpos(symbol, ");
        query_builder.push_bind(symbol);
        query_builder.push(") > 0");
    }

    match filter.sort {
        Some(sort) => {
            query_builder.push(" ORDER BY ");
            query_builder.push(sort.field.column());
            query_builder.push(if sort.descending {
                " COLLATE \"C\" DESC, id ASC"
            } else {
                " COLLATE \"C\" ASC, id ASC"
            });
        }
        None => {
            query_builder.push(" ORDER BY id ASC");
        }
    }

    query_builder.push(" OFFSET ");
    query_builder.push_bind(filter.offset);
    query_builder.push(" LIMIT ");
    query_builder.push_bind(filter.limit);

    query_builder
        .build_query_as::<Stock>()
        .fetch_all(pool)
        .await
}

pub async fn fetch_one(pool: &PgPool, id: i32) -> Result<Option<Stock>, sqlx::Error> {
    sqlx::query_as::<_, Stock>(&format!("SELECT {} FROM stocks WHERE id = $1", STOCK_COLUMNS))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn fetch_by_symbol(pool: &PgPool, symbol: &str) -> Result<Option<Stock>, sqlx::Error> {
    sqlx::query_as::<_, Stock>(&format!(
        "SELECT {} FROM stocks WHERE symbol = $1 ORDER BY id LIMIT 1",
        STOCK_COLUMNS
    ))
    .bind(symbol)
    .fetch_optional(pool)
    .await
}

pub async fn insert(pool: &PgPool, input: NewStock) -> Result<Stock, sqlx::Error> {
    sqlx::query_as::<_, Stock>(&format!(
        "INSERT INTO stocks (symbol, company_name, purchase, last_div, industry, market_cap)
         VALUES ($1, $2, $3, $4, $5, $6)
         RETURNING {}",
        STOCK_COLUMNS
    ))
    .bind(input.symbol)
    .bind(input.company_name)
    .bind(input.purchase)
    .bind(input.last_div)
    .bind(input.industry)
    .bind(input.market_cap)
    .fetch_one(pool)
    .await
}

pub async fn update(pool: &PgPool, id: i32, input: NewStock) -> Result<Option<Stock>, sqlx::Error> {
    sqlx::query_as::<_, Stock>(&format!(
        "UPDATE stocks
         SET symbol = $1, company_name = $2, purchase = $3, last_div = $4, industry = $5, market_cap = $6
         WHERE id = $7
         RETURNING {}",
        STOCK_COLUMNS
    ))
    .bind(input.symbol)
    .bind(input.company_name)
    .bind(input.purchase)
    .bind(input.last_div)
    .bind(input.industry)
    .bind(input.market_cap)
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn delete(pool: &PgPool, id: i32) -> Result<Option<Stock>, sqlx::Error> {
    sqlx::query_as::<_, Stock>(&format!(
        "DELETE FROM stocks WHERE id = $1 RETURNING {}",
        STOCK_COLUMNS
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn exists(pool: &PgPool, id: i32) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM stocks WHERE id = $1)")
        .bind(id)
        .fetch_one(pool)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    use bigdecimal::BigDecimal;
    use sqlx::postgres::PgPoolOptions;
    use sqlx::Executor;
    use uuid::Uuid;

    use crate::models::StockQuery;

    // Runs only against a reachable Postgres; each run migrates into its own schema and drops it.
    async fn scratch_pool() -> Option<(PgPool, String)> {
        let url = std::env::var("DATABASE_URL").ok()?;
        let schema = format!("stock_test_{}", Uuid::new_v4().simple());

        let admin = PgPoolOptions::new().max_connections(1).connect(&url).await.unwrap();
        admin
            .execute(format!("CREATE SCHEMA {}", schema).as_str())
            .await
            .unwrap();
        admin.close().await;

        let search_path = format!("SET search_path TO {}", schema);
        let pool = PgPoolOptions::new()
            .max_connections(2)
            .after_connect(move |conn, _meta| {
                let sql = search_path.clone();
                Box::pin(async move {
                    conn.execute(sql.as_str()).await?;
                    Ok(())
                })
            })
            .connect(&url)
            .await
            .unwrap();
        crate::db::run_migrations(&pool).await.unwrap();
        Some((pool, schema))
    }

    async fn drop_schema(pool: PgPool, schema: &str) {
        pool.execute(format!("DROP SCHEMA {} CASCADE", schema).as_str())
            .await
            .unwrap();
        pool.close().await;
    }

    fn new_stock(symbol: &str, company: &str) -> NewStock {
        NewStock {
            symbol: symbol.to_string(),
            company_name: company.to_string(),
            purchase: BigDecimal::from_str("12.50").unwrap(),
            last_div: BigDecimal::from_str("0.25").unwrap(),
            industry: "Tech".to_string(),
            market_cap: 1_000,
        }
    }

    #[tokio::test]
    async fn test_listing_matches_in_memory_pipeline() {
        let Some((pool, schema)) = scratch_pool().await else {
            return;
        };

        let mut stored = Vec::new();
        for (symbol, company) in [
            ("abc", "Abacus"),
            ("ABD", "Abbott"),
            ("XYZ", "abyss"),
            ("A%C", "50% Co"),
            ("ABE", "Abacus"),
            ("Q_Q", "Quill"),
        ] {
            stored.push(insert(&pool, new_stock(symbol, company)).await.unwrap());
        }

        let queries = [
            StockQuery {
                company_name: Some("Ab".to_string()),
                sort_by: Some("Symbol".to_string()),
                ..StockQuery::default()
            },
            StockQuery {
                sort_by: Some("companyname".to_string()),
                is_sort_descending: true,
                page_number: 2,
                page_size: 2,
                ..StockQuery::default()
            },
            StockQuery {
                symbol: Some("%".to_string()),
                ..StockQuery::default()
            },
            StockQuery {
                symbol: Some("_".to_string()),
                ..StockQuery::default()
            },
            StockQuery {
                sort_by: Some("Industry".to_string()),
                page_size: 4,
                ..StockQuery::default()
            },
        ];

        for query in &queries {
            let filter = StockFilter::from_query(query, 100).unwrap();
            let from_db = fetch_filtered(&pool, &filter).await.unwrap();
            let ids: Vec<i32> = from_db.iter().map(|s| s.id).collect();
            let expected: Vec<i32> = filter.apply(&stored).iter().map(|s| s.id).collect();
            assert_eq!(ids, expected, "listing differs for {:?}", query);
        }

        // Byte order puts upper case before lower case.
        let by_symbol = StockFilter::from_query(
            &StockQuery {
                sort_by: Some("Symbol".to_string()),
                ..StockQuery::default()
            },
            100,
        )
        .unwrap();
        let symbols: Vec<String> = fetch_filtered(&pool, &by_symbol)
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.symbol)
            .collect();
        assert_eq!(symbols, vec!["A%C", "ABD", "ABE", "Q_Q", "XYZ", "abc"]);

        drop_schema(pool, &schema).await;
    }
}
