use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{Portfolio, StockDto, User};
use crate::store::{PortfolioRepository, StockRepository, StoreError, UserRepository};

/// Tokens outlive accounts; a deleted user is treated like a bad token.
pub async fn resolve_user(users: &dyn UserRepository, user_id: Uuid) -> Result<User, AppError> {
    users.fetch_user(user_id).await?.ok_or(AppError::Unauthorized)
}

pub async fn fetch_for_user(
    portfolios: &dyn PortfolioRepository,
    user: &User,
) -> Result<Vec<StockDto>, AppError> {
    let stocks = portfolios.fetch_portfolio_stocks(user.id).await?;
    Ok(stocks.into_iter().map(StockDto::from).collect())
}

pub async fn add(
    stocks: &dyn StockRepository,
    portfolios: &dyn PortfolioRepository,
    user: &User,
    symbol: &str,
) -> Result<StockDto, AppError> {
    let stock = stocks
        .fetch_stock_by_symbol(symbol.trim())
        .await?
        .ok_or_else(|| AppError::NotFound("Stock not found".to_string()))?;

    match portfolios.insert_portfolio(Portfolio::new(user.id, stock.id)).await {
        Ok(_) => Ok(StockDto::from(stock)),
        Err(StoreError::UniqueViolation(_)) => Err(AppError::Conflict(format!(
            "{} is already in the portfolio",
            stock.symbol
        ))),
        Err(StoreError::ForeignKeyViolation(_)) => {
            Err(AppError::NotFound("Stock not found".to_string()))
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn remove(
    stocks: &dyn StockRepository,
    portfolios: &dyn PortfolioRepository,
    user: &User,
    symbol: &str,
) -> Result<(), AppError> {
    let not_held = || AppError::NotFound(format!("{} is not in the portfolio", symbol.trim()));

    let stock = stocks
        .fetch_stock_by_symbol(symbol.trim())
        .await?
        .ok_or_else(not_held)?;

    if portfolios
        .delete_portfolio(Portfolio::new(user.id, stock.id))
        .await?
    {
        Ok(())
    } else {
        Err(not_held())
    }
}
