use std::sync::Arc;

use crate::services::token_service::TokenService;
use crate::store::{CommentRepository, PortfolioRepository, StockRepository, UserRepository};

#[derive(Clone)]
pub struct AppState {
    pub stocks: Arc<dyn StockRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub portfolios: Arc<dyn PortfolioRepository>,
    pub users: Arc<dyn UserRepository>,
    pub tokens: Arc<TokenService>,
    pub max_page_size: i64,
}

impl AppState {
    /// Wires every repository to the same backend.
    pub fn new<S>(store: Arc<S>, tokens: TokenService, max_page_size: i64) -> Self
    where
        S: StockRepository + CommentRepository + PortfolioRepository + UserRepository + 'static,
    {
        Self {
            stocks: store.clone(),
            comments: store.clone(),
            portfolios: store.clone(),
            users: store,
            tokens: Arc::new(tokens),
            max_page_size,
        }
    }
}
