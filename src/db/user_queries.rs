use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{normalize, NewUser, Role, User};

pub async fn insert(pool: &PgPool, input: NewUser, roles: &[Role]) -> Result<User, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let user = sqlx::query_as::<_, User>(
        "INSERT INTO users (id, user_name, normalized_user_name, email, normalized_email, password_hash, created_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7)
         RETURNING id, user_name, email, password_hash, created_at",
    )
    .bind(input.id)
    .bind(&input.user_name)
    .bind(normalize(&input.user_name))
    .bind(&input.email)
    .bind(normalize(&input.email))
    .bind(&input.password_hash)
    .bind(input.created_at)
    .fetch_one(&mut *tx)
    .await?;

    for role in roles {
        sqlx::query("INSERT INTO user_roles (user_id, role) VALUES ($1, $2)")
            .bind(user.id)
            .bind(role.as_str())
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    Ok(user)
}

pub async fn fetch_one(pool: &PgPool, id: Uuid) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "SELECT id, user_name, email, password_hash, created_at
         FROM users
         WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn fetch_by_user_name(pool: &PgPool, user_name: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "SELECT id, user_name, email, password_hash, created_at
         FROM users
         WHERE normalized_user_name = $1",
    )
    .bind(normalize(user_name))
    .fetch_optional(pool)
    .await
}

pub async fn fetch_roles(pool: &PgPool, user_id: Uuid) -> Result<Vec<Role>, sqlx::Error> {
    let names = sqlx::query_scalar::<_, String>(
        "SELECT role FROM user_roles WHERE user_id = $1 ORDER BY role",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    // Unknown role names are skipped.
    Ok(names.iter().filter_map(|name| name.parse().ok()).collect())
}
