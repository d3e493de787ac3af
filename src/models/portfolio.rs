use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// Links one user to one stock they hold. (user_id, stock_id) is unique.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, FromRow)]
pub struct Portfolio {
    pub user_id: Uuid,
    pub stock_id: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioSymbolQuery {
    pub symbol: String,
}

impl Portfolio {
    pub(crate) fn new(user_id: Uuid, stock_id: i32) -> Self {
        Self { user_id, stock_id }
    }
}
