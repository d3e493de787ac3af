//! Repository seams between the services and whichever backend holds the data.
//!
//! The postgres backend lives in `crate::db`; `memory` keeps everything in-process and is
//! selected with `STORE_BACKEND=memory`.

pub mod memory;

use async_trait::async_trait;
use sqlx::error::ErrorKind;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Comment, NewComment, NewStock, NewUser, Portfolio, Role, Stock, StockFilter, User};

pub use memory::MemoryStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0}")]
    Database(sqlx::Error),
    #[error("duplicate value violates {0}")]
    UniqueViolation(String),
    #[error("referenced row missing for {0}")]
    ForeignKeyViolation(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(value: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &value {
            let constraint = db_err.constraint().unwrap_or("unknown constraint").to_string();
            match db_err.kind() {
                ErrorKind::UniqueViolation => return StoreError::UniqueViolation(constraint),
                ErrorKind::ForeignKeyViolation => return StoreError::ForeignKeyViolation(constraint),
                _ => {}
            }
        }
        StoreError::Database(value)
    }
}

#[async_trait]
pub trait StockRepository: Send + Sync {
    async fn list_stocks(&self, filter: &StockFilter) -> Result<Vec<Stock>, StoreError>;

    async fn fetch_stock(&self, id: i32) -> Result<Option<Stock>, StoreError>;

    async fn fetch_stock_by_symbol(&self, symbol: &str) -> Result<Option<Stock>, StoreError>;

    async fn insert_stock(&self, stock: NewStock) -> Result<Stock, StoreError>;

    /// Overwrites every column. `None` when no stock has that id.
    async fn update_stock(&self, id: i32, stock: NewStock) -> Result<Option<Stock>, StoreError>;

    async fn delete_stock(&self, id: i32) -> Result<Option<Stock>, StoreError>;

    async fn stock_exists(&self, id: i32) -> Result<bool, StoreError>;
}

#[async_trait]
pub trait CommentRepository: Send + Sync {
    async fn fetch_comments(&self) -> Result<Vec<Comment>, StoreError>;

    async fn fetch_comments_for_stocks(&self, stock_ids: &[i32]) -> Result<Vec<Comment>, StoreError>;

    async fn fetch_comment(&self, id: i32) -> Result<Option<Comment>, StoreError>;

    /// Fails with `ForeignKeyViolation` when the stock is gone at write time.
    async fn insert_comment(&self, comment: NewComment) -> Result<Comment, StoreError>;

    async fn update_comment(
        &self,
        id: i32,
        title: &str,
        content: &str,
    ) -> Result<Option<Comment>, StoreError>;

    async fn delete_comment(&self, id: i32) -> Result<Option<Comment>, StoreError>;
}

#[async_trait]
pub trait PortfolioRepository: Send + Sync {
    async fn fetch_portfolio_stocks(&self, user_id: Uuid) -> Result<Vec<Stock>, StoreError>;

    async fn insert_portfolio(&self, entry: Portfolio) -> Result<Portfolio, StoreError>;

    /// Returns whether a link was removed.
    async fn delete_portfolio(&self, entry: Portfolio) -> Result<bool, StoreError>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fails with `UniqueViolation` when the user name or email is already taken.
    async fn insert_user(&self, user: NewUser, roles: &[Role]) -> Result<User, StoreError>;

    async fn fetch_user(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    async fn fetch_user_by_name(&self, user_name: &str) -> Result<Option<User>, StoreError>;

    async fn fetch_user_roles(&self, id: Uuid) -> Result<Vec<Role>, StoreError>;
}
