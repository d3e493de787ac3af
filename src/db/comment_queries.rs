use sqlx::PgPool;

use crate::models::{Comment, NewComment};

pub async fn fetch_all(pool: &PgPool) -> Result<Vec<Comment>, sqlx::Error> {
    sqlx::query_as::<_, Comment>(
        "SELECT id, title, content, created_on, stock_id
         FROM comments
         ORDER BY id",
    )
    .fetch_all(pool)
    .await
}

pub async fn fetch_for_stocks(pool: &PgPool, stock_ids: &[i32]) -> Result<Vec<Comment>, sqlx::Error> {
    if stock_ids.is_empty() {
        return Ok(Vec::new());
    }
    sqlx::query_as::<_, Comment>(
        "SELECT id, title, content, created_on, stock_id
         FROM comments
         WHERE stock_id = ANY($1)
         ORDER BY id",
    )
    .bind(stock_ids)
    .fetch_all(pool)
    .await
}

pub async fn fetch_one(pool: &PgPool, id: i32) -> Result<Option<Comment>, sqlx::Error> {
    sqlx::query_as::<_, Comment>(
        "SELECT id, title, content, created_on, stock_id
         FROM comments
         WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn insert(pool: &PgPool, input: NewComment) -> Result<Comment, sqlx::Error> {
    sqlx::query_as::<_, Comment>(
        "INSERT INTO comments (title, content, created_on, stock_id)
         VALUES ($1, $2, $3, $4)
         RETURNING id, title, content, created_on, stock_id",
    )
    .bind(input.title)
    .bind(input.content)
    .bind(input.created_on)
    .bind(input.stock_id)
    .fetch_one(pool)
    .await
}

pub async fn update(
    pool: &PgPool,
    id: i32,
    title: &str,
    content: &str,
) -> Result<Option<Comment>, sqlx::Error> {
    sqlx::query_as::<_, Comment>(
        "UPDATE comments SET title = $1, content = $2
         WHERE id = $3
         RETURNING id, title, content, created_on, stock_id",
    )
    .bind(title)
    .bind(content)
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn delete(pool: &PgPool, id: i32) -> Result<Option<Comment>, sqlx::Error> {
    sqlx::query_as::<_, Comment>(
        "DELETE FROM comments WHERE id = $1
         RETURNING id, title, content, created_on, stock_id",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}
