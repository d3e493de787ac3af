use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use tracing::{error, info};

use crate::errors::AppError;
use crate::extract::{AppJson, AppQuery};
use crate::models::{CreateStockRequest, StockDetailDto, StockQuery, UpdateStockRequest};
use crate::services::stock_service;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_stocks).post(create_stock))
        .route("/:id", get(get_stock).put(update_stock).delete(delete_stock))
}

pub async fn list_stocks(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<StockQuery>,
) -> Result<Json<Vec<StockDetailDto>>, AppError> {
    info!("GET /stock - Listing stocks with {:?}", query);
    let stocks = stock_service::fetch_all(
        state.stocks.as_ref(),
        state.comments.as_ref(),
        &query,
        state.max_page_size,
    )
    .await
    .map_err(|e| {
        error!("Failed to list stocks: {}", e);
        e
    })?;
    Ok(Json(stocks))
}

pub async fn get_stock(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<StockDetailDto>, AppError> {
    info!("GET /stock/{} - Fetching stock", id);
    let stock = stock_service::fetch_one(state.stocks.as_ref(), state.comments.as_ref(), id)
        .await
        .map_err(|e| {
            error!("Failed to fetch stock {}: {}", id, e);
            e
        })?;
    Ok(Json(stock))
}

pub async fn create_stock(
    State(state): State<AppState>,
    AppJson(data): AppJson<CreateStockRequest>,
) -> Result<impl IntoResponse, AppError> {
    info!("POST /stock - Creating stock {}", data.symbol);
    let stock = stock_service::create(state.stocks.as_ref(), data)
        .await
        .map_err(|e| {
            error!("Failed to create stock: {}", e);
            e
        })?;
    let location = format!("/api/stock/{}", stock.stock.id);
    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(stock)))
}

pub async fn update_stock(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(data): AppJson<UpdateStockRequest>,
) -> Result<Json<StockDetailDto>, AppError> {
    info!("PUT /stock/{} - Updating stock", id);
    let stock = stock_service::update(state.stocks.as_ref(), state.comments.as_ref(), id, data)
        .await
        .map_err(|e| {
            error!("Failed to update stock {}: {}", id, e);
            e
        })?;
    Ok(Json(stock))
}

pub async fn delete_stock(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    info!("DELETE /stock/{} - Deleting stock", id);
    stock_service::delete(state.stocks.as_ref(), id)
        .await
        .map_err(|e| {
            error!("Failed to delete stock {}: {}", id, e);
            e
        })?;
    Ok(StatusCode::NO_CONTENT)
}
