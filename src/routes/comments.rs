use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use tracing::{error, info};

use crate::errors::AppError;
use crate::extract::AppJson;
use crate::models::{CommentDto, CreateCommentRequest, UpdateCommentRequest};
use crate::services::comment_service;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_comments))
        // POST takes the stock id; GET, PUT and DELETE take the comment id.
        .route(
            "/:id",
            get(get_comment)
                .post(create_comment)
                .put(update_comment)
                .delete(delete_comment),
        )
}

pub async fn list_comments(
    State(state): State<AppState>,
) -> Result<Json<Vec<CommentDto>>, AppError> {
    info!("GET /comment - Listing comments");
    let comments = comment_service::fetch_all(state.comments.as_ref())
        .await
        .map_err(|e| {
            error!("Failed to list comments: {}", e);
            e
        })?;
    Ok(Json(comments))
}

pub async fn get_comment(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<CommentDto>, AppError> {
    info!("GET /comment/{} - Fetching comment", id);
    let comment = comment_service::fetch_one(state.comments.as_ref(), id)
        .await
        .map_err(|e| {
            error!("Failed to fetch comment {}: {}", id, e);
            e
        })?;
    Ok(Json(comment))
}

pub async fn create_comment(
    State(state): State<AppState>,
    Path(stock_id): Path<i32>,
    AppJson(data): AppJson<CreateCommentRequest>,
) -> Result<impl IntoResponse, AppError> {
    info!("POST /comment/{} - Creating comment", stock_id);
    let comment = comment_service::create(
        state.stocks.as_ref(),
        state.comments.as_ref(),
        stock_id,
        data,
    )
    .await
    .map_err(|e| {
        error!("Failed to create comment on stock {}: {}", stock_id, e);
        e
    })?;
    let location = format!("/api/comment/{}", comment.id);
    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(comment)))
}

pub async fn update_comment(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(data): AppJson<UpdateCommentRequest>,
) -> Result<Json<CommentDto>, AppError> {
    info!("PUT /comment/{} - Updating comment", id);
    let comment = comment_service::update(state.comments.as_ref(), id, data)
        .await
        .map_err(|e| {
            error!("Failed to update comment {}: {}", id, e);
            e
        })?;
    Ok(Json(comment))
}

pub async fn delete_comment(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<CommentDto>, AppError> {
    info!("DELETE /comment/{} - Deleting comment", id);
    let comment = comment_service::delete(state.comments.as_ref(), id)
        .await
        .map_err(|e| {
            error!("Failed to delete comment {}: {}", id, e);
            e
        })?;
    Ok(Json(comment))
}
