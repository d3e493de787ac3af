pub(crate) mod comment_queries;
pub(crate) mod portfolio_queries;
pub(crate) mod stock_queries;
pub(crate) mod user_queries;

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use crate::config::Config;
use crate::models::{Comment, NewComment, NewStock, NewUser, Portfolio, Role, Stock, StockFilter, User};
use crate::store::{
    CommentRepository, PortfolioRepository, StockRepository, StoreError, UserRepository,
};

pub async fn create_pool(config: &Config, database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(database_url)
        .await
}

pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// Postgres backend; every call is a single round-trip on the shared pool.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StockRepository for PgStore {
    async fn list_stocks(&self, filter: &StockFilter) -> Result<Vec<Stock>, StoreError> {
        Ok(stock_queries::fetch_filtered(&self.pool, filter).await?)
    }

    async fn fetch_stock(&self, id: i32) -> Result<Option<Stock>, StoreError> {
        Ok(stock_queries::fetch_one(&self.pool, id).await?)
    }

    async fn fetch_stock_by_symbol(&self, symbol: &str) -> Result<Option<Stock>, StoreError> {
        Ok(stock_queries::fetch_by_symbol(&self.pool, symbol).await?)
    }

    async fn insert_stock(&self, stock: NewStock) -> Result<Stock, StoreError> {
        Ok(stock_queries::insert(&self.pool, stock).await?)
    }

    async fn update_stock(&self, id: i32, stock: NewStock) -> Result<Option<Stock>, StoreError> {
        Ok(stock_queries::update(&self.pool, id, stock).await?)
    }

    async fn delete_stock(&self, id: i32) -> Result<Option<Stock>, StoreError> {
        Ok(stock_queries::delete(&self.pool, id).await?)
    }

    async fn stock_exists(&self, id: i32) -> Result<bool, StoreError> {
        Ok(stock_queries::exists(&self.pool, id).await?)
    }
}

#[async_trait]
impl CommentRepository for PgStore {
    async fn fetch_comments(&self) -> Result<Vec<Comment>, StoreError> {
        Ok(comment_queries::fetch_all(&self.pool).await?)
    }

    async fn fetch_comments_for_stocks(&self, stock_ids: &[i32]) -> Result<Vec<Comment>, StoreError> {
        Ok(comment_queries::fetch_for_stocks(&self.pool, stock_ids).await?)
    }

    async fn fetch_comment(&self, id: i32) -> Result<Option<Comment>, StoreError> {
        Ok(comment_queries::fetch_one(&self.pool, id).await?)
    }

    async fn insert_comment(&self, comment: NewComment) -> Result<Comment, StoreError> {
        Ok(comment_queries::insert(&self.pool, comment).await?)
    }

    async fn update_comment(
        &self,
        id: i32,
        title: &str,
        content: &str,
    ) -> Result<Option<Comment>, StoreError> {
        Ok(comment_queries::update(&self.pool, id, title, content).await?)
    }

    async fn delete_comment(&self, id: i32) -> Result<Option<Comment>, StoreError> {
        Ok(comment_queries::delete(&self.pool, id).await?)
    }
}

#[async_trait]
impl PortfolioRepository for PgStore {
    async fn fetch_portfolio_stocks(&self, user_id: Uuid) -> Result<Vec<Stock>, StoreError> {
        Ok(portfolio_queries::fetch_stocks_for_user(&self.pool, user_id).await?)
    }

    async fn insert_portfolio(&self, entry: Portfolio) -> Result<Portfolio, StoreError> {
        Ok(portfolio_queries::insert(&self.pool, entry).await?)
    }

    async fn delete_portfolio(&self, entry: Portfolio) -> Result<bool, StoreError> {
        Ok(portfolio_queries::delete(&self.pool, entry).await? > 0)
    }
}

#[async_trait]
impl UserRepository for PgStore {
    async fn insert_user(&self, user: NewUser, roles: &[Role]) -> Result<User, StoreError> {
        Ok(user_queries::insert(&self.pool, user, roles).await?)
    }

    async fn fetch_user(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(user_queries::fetch_one(&self.pool, id).await?)
    }

    async fn fetch_user_by_name(&self, user_name: &str) -> Result<Option<User>, StoreError> {
        Ok(user_queries::fetch_by_user_name(&self.pool, user_name).await?)
    }

    async fn fetch_user_roles(&self, id: Uuid) -> Result<Vec<Role>, StoreError> {
        Ok(user_queries::fetch_roles(&self.pool, id).await?)
    }
}
