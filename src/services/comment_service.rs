use tracing::warn;

use crate::errors::AppError;
use crate::mappers;
use crate::models::{CommentDto, CreateCommentRequest, UpdateCommentRequest};
use crate::services::stock_service;
use crate::store::{CommentRepository, StockRepository, StoreError};

fn comment_not_found() -> AppError {
    AppError::NotFound("Comment not found".to_string())
}

fn stock_not_found() -> AppError {
    AppError::NotFound("Stock not found".to_string())
}

pub async fn fetch_all(comments: &dyn CommentRepository) -> Result<Vec<CommentDto>, AppError> {
    let all = comments.fetch_comments().await?;
    Ok(all.into_iter().map(CommentDto::from).collect())
}

pub async fn fetch_one(comments: &dyn CommentRepository, id: i32) -> Result<CommentDto, AppError> {
    let comment = comments
        .fetch_comment(id)
        .await?
        .ok_or_else(comment_not_found)?;
    Ok(CommentDto::from(comment))
}

pub async fn create(
    stocks: &dyn StockRepository,
    comments: &dyn CommentRepository,
    stock_id: i32,
    input: CreateCommentRequest,
) -> Result<CommentDto, AppError> {
    input.validate()?;

    if !stock_service::exists(stocks, stock_id).await? {
        return Err(stock_not_found());
    }

    match comments
        .insert_comment(mappers::to_new_comment(&input, stock_id))
        .await
    {
        Ok(comment) => Ok(CommentDto::from(comment)),
        // The stock went away between the existence check and the insert.
        Err(StoreError::ForeignKeyViolation(constraint)) => {
            warn!("Comment insert for stock {} hit {}", stock_id, constraint);
            Err(stock_not_found())
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn update(
    comments: &dyn CommentRepository,
    id: i32,
    input: UpdateCommentRequest,
) -> Result<CommentDto, AppError> {
    input.validate()?;
    let comment = comments
        .update_comment(id, &input.title, &input.content)
        .await?
        .ok_or_else(comment_not_found)?;
    Ok(CommentDto::from(comment))
}

pub async fn delete(comments: &dyn CommentRepository, id: i32) -> Result<CommentDto, AppError> {
    let comment = comments
        .delete_comment(id)
        .await?
        .ok_or_else(comment_not_found)?;
    Ok(CommentDto::from(comment))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewStock;
    use crate::store::MemoryStore;
    use bigdecimal::BigDecimal;
    use chrono::Utc;

    fn body(title: &str, content: &str) -> CreateCommentRequest {
        CreateCommentRequest {
            title: title.to_string(),
            content: content.to_string(),
        }
    }

    async fn store_with_stock() -> (MemoryStore, i32) {
        let store = MemoryStore::new();
        let stock = store
            .insert_stock(NewStock {
                symbol: "AAPL".to_string(),
                company_name: "Apple".to_string(),
                purchase: BigDecimal::from(190),
                last_div: BigDecimal::from(1),
                industry: "Tech".to_string(),
                market_cap: 3_000_000_000,
            })
            .await
            .unwrap();
        (store, stock.id)
    }

    #[tokio::test]
    async fn test_create_for_missing_stock_leaves_comments_unchanged() {
        let (store, _) = store_with_stock().await;
        let err = create(&store, &store, 404, body("Title", "Content"))
            .await
            .unwrap_err();

        match err {
            AppError::NotFound(msg) => assert_eq!(msg, "Stock not found"),
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(fetch_all(&store).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_stamps_creation_time_and_stock() {
        let (store, stock_id) = store_with_stock().await;
        let before = Utc::now();
        let created = create(&store, &store, stock_id, body("Earnings", "Beat estimates"))
            .await
            .unwrap();

        assert_eq!(created.stock_id, Some(stock_id));
        assert!(created.created_on >= before);
        assert_eq!(fetch_one(&store, created.id).await.unwrap(), created);
    }

    #[tokio::test]
    async fn test_update_only_touches_title_and_content() {
        let (store, stock_id) = store_with_stock().await;
        let created = create(&store, &store, stock_id, body("First", "Original text"))
            .await
            .unwrap();

        let updated = update(&store, created.id, body("Second", "Revised text"))
            .await
            .unwrap();
        assert_eq!(updated.title, "Second");
        assert_eq!(updated.content, "Revised text");
        assert_eq!(updated.created_on, created.created_on);
        assert_eq!(updated.stock_id, created.stock_id);

        assert!(matches!(
            update(&store, 999, body("Second", "Revised text")).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_returns_removed_comment() {
        let (store, stock_id) = store_with_stock().await;
        let created = create(&store, &store, stock_id, body("Title", "Content"))
            .await
            .unwrap();

        let removed = delete(&store, created.id).await.unwrap();
        assert_eq!(removed, created);
        assert!(matches!(fetch_one(&store, created.id).await, Err(AppError::NotFound(_))));
        assert!(matches!(delete(&store, created.id).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_short_title_is_rejected_before_lookup() {
        let (store, stock_id) = store_with_stock().await;
        let err = create(&store, &store, stock_id, body("Hi", "Content"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
