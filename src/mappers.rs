//! Projections between persisted rows and the JSON shapes served over HTTP.

use std::str::FromStr;

use bigdecimal::{BigDecimal, ToPrimitive};
use chrono::Utc;

use crate::models::{
    Comment, CommentDto, CreateCommentRequest, CreateStockRequest, NewComment, NewStock, Stock,
    StockDetailDto, StockDto,
};

fn to_decimal(value: f64) -> BigDecimal {
    // Going through the shortest decimal rendering keeps 0.001 as 0.001.
    BigDecimal::from_str(&value.to_string()).unwrap_or_default()
}

impl From<&Stock> for StockDto {
    fn from(stock: &Stock) -> Self {
        Self {
            id: stock.id,
            symbol: stock.symbol.clone(),
            company_name: stock.company_name.clone(),
            purchase: stock.purchase.to_f64().unwrap_or_default(),
            last_div: stock.last_div.to_f64().unwrap_or_default(),
            industry: stock.industry.clone(),
            market_cap: stock.market_cap,
        }
    }
}

impl From<Stock> for StockDto {
    fn from(stock: Stock) -> Self {
        StockDto::from(&stock)
    }
}

impl From<&Comment> for CommentDto {
    fn from(comment: &Comment) -> Self {
        Self {
            id: comment.id,
            title: comment.title.clone(),
            content: comment.content.clone(),
            created_on: comment.created_on,
            stock_id: comment.stock_id,
        }
    }
}

impl From<Comment> for CommentDto {
    fn from(comment: Comment) -> Self {
        CommentDto::from(&comment)
    }
}

pub fn to_stock_detail(stock: &Stock, comments: &[Comment]) -> StockDetailDto {
    StockDetailDto {
        stock: StockDto::from(stock),
        comments: comments
            .iter()
            .filter(|c| c.stock_id == Some(stock.id))
            .map(CommentDto::from)
            .collect(),
    }
}

impl From<&CreateStockRequest> for NewStock {
    fn from(request: &CreateStockRequest) -> Self {
        Self {
            symbol: request.symbol.trim().to_string(),
            company_name: request.company_name.trim().to_string(),
            purchase: to_decimal(request.purchase),
            last_div: to_decimal(request.last_div),
            industry: request.industry.trim().to_string(),
            market_cap: request.market_cap,
        }
    }
}

pub fn to_new_comment(request: &CreateCommentRequest, stock_id: i32) -> NewComment {
    NewComment {
        title: request.title.clone(),
        content: request.content.clone(),
        created_on: Utc::now(),
        stock_id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_decimals_keep_their_written_form() {
        let request = CreateStockRequest {
            symbol: " TSLA ".to_string(),
            company_name: "Tesla".to_string(),
            purchase: 300.25,
            last_div: 0.001,
            industry: "Auto".to_string(),
            market_cap: 900_000_000,
        };
        let new_stock = NewStock::from(&request);
        assert_eq!(new_stock.symbol, "TSLA");
        assert_eq!(new_stock.purchase, BigDecimal::from_str("300.25").unwrap());
        assert_eq!(new_stock.last_div, BigDecimal::from_str("0.001").unwrap());
    }

    #[test]
    fn test_stock_detail_only_keeps_own_comments() {
        let stock = Stock {
            id: 7,
            symbol: "MSFT".to_string(),
            company_name: "Microsoft".to_string(),
            purchase: BigDecimal::from(420),
            last_div: BigDecimal::from_str("0.75").unwrap(),
            industry: "Tech".to_string(),
            market_cap: 3_000_000_000,
        };
        let comment = |id: i32, stock_id: Option<i32>| Comment {
            id,
            title: "Title".to_string(),
            content: "Content".to_string(),
            created_on: Utc::now(),
            stock_id,
        };
        let comments = vec![comment(1, Some(7)), comment(2, Some(8)), comment(3, None)];

        let detail = to_stock_detail(&stock, &comments);
        assert_eq!(detail.stock.purchase, 420.0);
        assert_eq!(detail.stock.last_div, 0.75);
        assert_eq!(detail.comments.len(), 1);
        assert_eq!(detail.comments[0].id, 1);
    }
}
