use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use tracing::{error, info};

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::extract::AppQuery;
use crate::models::{PortfolioSymbolQuery, StockDto};
use crate::services::portfolio_service;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route(
        "/",
        get(get_portfolio).post(add_to_portfolio).delete(remove_from_portfolio),
    )
}

pub async fn get_portfolio(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> Result<Json<Vec<StockDto>>, AppError> {
    info!("GET /portfolio - Fetching portfolio for {}", claims.name);
    let user = portfolio_service::resolve_user(state.users.as_ref(), claims.sub).await?;
    let stocks = portfolio_service::fetch_for_user(state.portfolios.as_ref(), &user)
        .await
        .map_err(|e| {
            error!("Failed to fetch portfolio for {}: {}", user.id, e);
            e
        })?;
    Ok(Json(stocks))
}

pub async fn add_to_portfolio(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    AppQuery(query): AppQuery<PortfolioSymbolQuery>,
) -> Result<(StatusCode, Json<StockDto>), AppError> {
    info!("POST /portfolio - Adding {} for {}", query.symbol, claims.name);
    let user = portfolio_service::resolve_user(state.users.as_ref(), claims.sub).await?;
    let stock = portfolio_service::add(
        state.stocks.as_ref(),
        state.portfolios.as_ref(),
        &user,
        &query.symbol,
    )
    .await
    .map_err(|e| {
        error!("Failed to add {} to portfolio of {}: {}", query.symbol, user.id, e);
        e
    })?;
    Ok((StatusCode::CREATED, Json(stock)))
}

pub async fn remove_from_portfolio(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    AppQuery(query): AppQuery<PortfolioSymbolQuery>,
) -> Result<StatusCode, AppError> {
    info!("DELETE /portfolio - Removing {} for {}", query.symbol, claims.name);
    let user = portfolio_service::resolve_user(state.users.as_ref(), claims.sub).await?;
    portfolio_service::remove(
        state.stocks.as_ref(),
        state.portfolios.as_ref(),
        &user,
        &query.symbol,
    )
    .await
    .map_err(|e| {
        error!("Failed to remove {} from portfolio of {}: {}", query.symbol, user.id, e);
        e
    })?;
    Ok(StatusCode::NO_CONTENT)
}
