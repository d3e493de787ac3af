use crate::errors::AppError;
use crate::mappers;
use crate::models::{
    CreateStockRequest, NewStock, StockDetailDto, StockFilter, StockQuery, UpdateStockRequest,
};
use crate::store::{CommentRepository, StockRepository};

fn not_found() -> AppError {
    AppError::NotFound("Stock not found".to_string())
}

pub async fn fetch_all(
    stocks: &dyn StockRepository,
    comments: &dyn CommentRepository,
    query: &StockQuery,
    max_page_size: i64,
) -> Result<Vec<StockDetailDto>, AppError> {
    let filter = StockFilter::from_query(query, max_page_size)?;
    let page = stocks.list_stocks(&filter).await?;

    let stock_ids: Vec<i32> = page.iter().map(|s| s.id).collect();
    let page_comments = comments.fetch_comments_for_stocks(&stock_ids).await?;

    Ok(page
        .iter()
        .map(|stock| mappers::to_stock_detail(stock, &page_comments))
        .collect())
}

pub async fn fetch_one(
    stocks: &dyn StockRepository,
    comments: &dyn CommentRepository,
    id: i32,
) -> Result<StockDetailDto, AppError> {
    let stock = stocks.fetch_stock(id).await?.ok_or_else(not_found)?;
    let stock_comments = comments.fetch_comments_for_stocks(&[stock.id]).await?;
    Ok(mappers::to_stock_detail(&stock, &stock_comments))
}

pub async fn create(
    stocks: &dyn StockRepository,
    input: CreateStockRequest,
) -> Result<StockDetailDto, AppError> {
    input.validate()?;
    let stock = stocks.insert_stock(NewStock::from(&input)).await?;
    Ok(mappers::to_stock_detail(&stock, &[]))
}

pub async fn update(
    stocks: &dyn StockRepository,
    comments: &dyn CommentRepository,
    id: i32,
    input: UpdateStockRequest,
) -> Result<StockDetailDto, AppError> {
    input.validate()?;
    let stock = stocks
        .update_stock(id, NewStock::from(&input))
        .await?
        .ok_or_else(not_found)?;
    let stock_comments = comments.fetch_comments_for_stocks(&[stock.id]).await?;
    Ok(mappers::to_stock_detail(&stock, &stock_comments))
}

pub async fn delete(stocks: &dyn StockRepository, id: i32) -> Result<(), AppError> {
    stocks.delete_stock(id).await?.ok_or_else(not_found)?;
    Ok(())
}

pub async fn exists(stocks: &dyn StockRepository, id: i32) -> Result<bool, AppError> {
    Ok(stocks.stock_exists(id).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use std::collections::HashSet;

    fn request(symbol: &str, company: &str) -> CreateStockRequest {
        CreateStockRequest {
            symbol: symbol.to_string(),
            company_name: company.to_string(),
            purchase: 100.0,
            last_div: 1.25,
            industry: "Tech".to_string(),
            market_cap: 1_000_000,
        }
    }

    async fn seed(store: &MemoryStore, count: usize) {
        for i in 0..count {
            create(store, request(&format!("S{:02}", i), &format!("Co{:02}", i)))
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn test_created_ids_are_unique() {
        let store = MemoryStore::new();
        let mut seen = HashSet::new();
        for i in 0..10 {
            let created = create(&store, request(&format!("T{}", i), "Co")).await.unwrap();
            assert!(seen.insert(created.stock.id), "id {} reused", created.stock.id);
        }
    }

    #[tokio::test]
    async fn test_second_page_is_next_slice_of_full_listing() {
        let store = MemoryStore::new();
        seed(&store, 12).await;

        for n in 1..=5_i64 {
            let everything = StockQuery {
                sort_by: Some("Symbol".to_string()),
                page_size: 100,
                ..StockQuery::default()
            };
            let all = fetch_all(&store, &store, &everything, 100).await.unwrap();

            let second = StockQuery {
                page_number: 2,
                page_size: n,
                ..everything.clone()
            };
            let page = fetch_all(&store, &store, &second, 100).await.unwrap();

            let start = n as usize;
            let end = (2 * n as usize).min(all.len());
            assert_eq!(page, all[start..end].to_vec());
        }
    }

    #[tokio::test]
    async fn test_default_query_returns_first_page() {
        let store = MemoryStore::new();
        seed(&store, 25).await;
        let page = fetch_all(&store, &store, &StockQuery::default(), 100).await.unwrap();
        assert_eq!(page.len() as i64, StockQuery::default().page_size);
        assert_eq!(page[0].stock.id, 1);
    }

    #[tokio::test]
    async fn test_invalid_request_never_reaches_store() {
        let store = MemoryStore::new();
        let mut bad = request("TSLA", "Tesla");
        bad.market_cap = 0;
        let err = create(&store, bad).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(!exists(&store, 1).await.unwrap());
    }

    #[tokio::test]
    async fn test_update_missing_stock_is_not_found() {
        let store = MemoryStore::new();
        seed(&store, 1).await;
        let before = fetch_one(&store, &store, 1).await.unwrap();

        let err = update(&store, &store, 99, request("NEW", "New")).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(fetch_one(&store, &store, 1).await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_update_overwrites_every_field() {
        let store = MemoryStore::new();
        seed(&store, 1).await;
        let replacement = CreateStockRequest {
            symbol: "NEW".to_string(),
            company_name: "NewCo".to_string(),
            purchase: 55.5,
            last_div: 0.5,
            industry: "Energy".to_string(),
            market_cap: 42,
        };
        let updated = update(&store, &store, 1, replacement).await.unwrap();
        assert_eq!(updated.stock.symbol, "NEW");
        assert_eq!(updated.stock.company_name, "NewCo");
        assert_eq!(updated.stock.purchase, 55.5);
        assert_eq!(updated.stock.last_div, 0.5);
        assert_eq!(updated.stock.industry, "Energy");
        assert_eq!(updated.stock.market_cap, 42);
    }

    #[tokio::test]
    async fn test_delete_then_fetch_is_not_found() {
        let store = MemoryStore::new();
        seed(&store, 2).await;

        delete(&store, 1).await.unwrap();
        assert!(matches!(
            fetch_one(&store, &store, 1).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(delete(&store, 1).await, Err(AppError::NotFound(_))));
        assert!(fetch_one(&store, &store, 2).await.is_ok());
    }
}
