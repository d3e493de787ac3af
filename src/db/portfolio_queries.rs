use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{Portfolio, Stock};

pub async fn fetch_stocks_for_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Stock>, sqlx::Error> {
    sqlx::query_as::<_, Stock>(
        "SELECT s.id, s.symbol, s.company_name, s.purchase, s.last_div, s.industry, s.market_cap
         FROM portfolios p
         JOIN stocks s ON s.id = p.stock_id
         WHERE p.user_id = $1
         ORDER BY s.id",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

pub async fn insert(pool: &PgPool, input: Portfolio) -> Result<Portfolio, sqlx::Error> {
    sqlx::query_as::<_, Portfolio>(
        "INSERT INTO portfolios (user_id, stock_id)
         VALUES ($1, $2)
         RETURNING user_id, stock_id",
    )
    .bind(input.user_id)
    .bind(input.stock_id)
    .fetch_one(pool)
    .await
}

pub async fn delete(pool: &PgPool, input: Portfolio) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM portfolios WHERE user_id = $1 AND stock_id = $2")
        .bind(input.user_id)
        .bind(input.stock_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
