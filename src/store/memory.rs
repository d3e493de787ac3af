use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use parking_lot::RwLock;
use uuid::Uuid;

use crate::models::{
    normalize, Comment, NewComment, NewStock, NewUser, Portfolio, Role, Stock, StockFilter, User,
};
use crate::store::{
    CommentRepository, PortfolioRepository, StockRepository, StoreError, UserRepository,
};

#[derive(Default)]
struct Tables {
    stocks: BTreeMap<i32, Stock>,
    comments: BTreeMap<i32, Comment>,
    portfolios: Vec<Portfolio>,
    users: HashMap<Uuid, User>,
    user_roles: HashMap<Uuid, Vec<Role>>,
    last_stock_id: i32,
    last_comment_id: i32,
}

/// In-process backend. Every write takes the single table lock, so a check and the insert
/// that depends on it cannot interleave with another writer.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StockRepository for MemoryStore {
    async fn list_stocks(&self, filter: &StockFilter) -> Result<Vec<Stock>, StoreError> {
        let tables = self.tables.read();
        Ok(filter.apply(tables.stocks.values()))
    }

    async fn fetch_stock(&self, id: i32) -> Result<Option<Stock>, StoreError> {
        Ok(self.tables.read().stocks.get(&id).cloned())
    }

    async fn fetch_stock_by_symbol(&self, symbol: &str) -> Result<Option<Stock>, StoreError> {
        let tables = self.tables.read();
        Ok(tables.stocks.values().find(|s| s.symbol == symbol).cloned())
    }

    async fn insert_stock(&self, stock: NewStock) -> Result<Stock, StoreError> {
        let mut tables = self.tables.write();
        tables.last_stock_id += 1;
        let created = Stock {
            id: tables.last_stock_id,
            symbol: stock.symbol,
            company_name: stock.company_name,
            purchase: stock.purchase,
            last_div: stock.last_div,
            industry: stock.industry,
            market_cap: stock.market_cap,
        };
        tables.stocks.insert(created.id, created.clone());
        Ok(created)
    }

    async fn update_stock(&self, id: i32, stock: NewStock) -> Result<Option<Stock>, StoreError> {
        let mut tables = self.tables.write();
        let Some(existing) = tables.stocks.get_mut(&id) else {
            return Ok(None);
        };
        existing.symbol = stock.symbol;
        existing.company_name = stock.company_name;
        existing.purchase = stock.purchase;
        existing.last_div = stock.last_div;
        existing.industry = stock.industry;
        existing.market_cap = stock.market_cap;
        Ok(Some(existing.clone()))
    }

    async fn delete_stock(&self, id: i32) -> Result<Option<Stock>, StoreError> {
        let mut tables = self.tables.write();
        let Some(removed) = tables.stocks.remove(&id) else {
            return Ok(None);
        };
        for comment in tables.comments.values_mut() {
            if comment.stock_id == Some(id) {
                comment.stock_id = None;
            }
        }
        tables.portfolios.retain(|p| p.stock_id != id);
        Ok(Some(removed))
    }

    async fn stock_exists(&self, id: i32) -> Result<bool, StoreError> {
        Ok(self.tables.read().stocks.contains_key(&id))
    }
}

#[async_trait]
impl CommentRepository for MemoryStore {
    async fn fetch_comments(&self) -> Result<Vec<Comment>, StoreError> {
        Ok(self.tables.read().comments.values().cloned().collect())
    }

    async fn fetch_comments_for_stocks(&self, stock_ids: &[i32]) -> Result<Vec<Comment>, StoreError> {
        let tables = self.tables.read();
        Ok(tables
            .comments
            .values()
            .filter(|c| c.stock_id.map_or(false, |id| stock_ids.contains(&id)))
            .cloned()
            .collect())
    }

    async fn fetch_comment(&self, id: i32) -> Result<Option<Comment>, StoreError> {
        Ok(self.tables.read().comments.get(&id).cloned())
    }

    async fn insert_comment(&self, comment: NewComment) -> Result<Comment, StoreError> {
        let mut tables = self.tables.write();
        if !tables.stocks.contains_key(&comment.stock_id) {
            return Err(StoreError::ForeignKeyViolation("comments_stock_id_fkey".to_string()));
        }
        tables.last_comment_id += 1;
        let created = Comment {
            id: tables.last_comment_id,
            title: comment.title,
            content: comment.content,
            created_on: comment.created_on,
            stock_id: Some(comment.stock_id),
        };
        tables.comments.insert(created.id, created.clone());
        Ok(created)
    }

    async fn update_comment(
        &self,
        id: i32,
        title: &str,
        content: &str,
    ) -> Result<Option<Comment>, StoreError> {
        let mut tables = self.tables.write();
        let Some(existing) = tables.comments.get_mut(&id) else {
            return Ok(None);
        };
        existing.title = title.to_string();
        existing.content = content.to_string();
        Ok(Some(existing.clone()))
    }

    async fn delete_comment(&self, id: i32) -> Result<Option<Comment>, StoreError> {
        Ok(self.tables.write().comments.remove(&id))
    }
}

#[async_trait]
impl PortfolioRepository for MemoryStore {
    async fn fetch_portfolio_stocks(&self, user_id: Uuid) -> Result<Vec<Stock>, StoreError> {
        let tables = self.tables.read();
        let mut stocks: Vec<Stock> = tables
            .portfolios
            .iter()
            .filter(|p| p.user_id == user_id)
            .filter_map(|p| tables.stocks.get(&p.stock_id).cloned())
            .collect();
        stocks.sort_by_key(|s| s.id);
        Ok(stocks)
    }

    async fn insert_portfolio(&self, entry: Portfolio) -> Result<Portfolio, StoreError> {
        let mut tables = self.tables.write();
        if !tables.users.contains_key(&entry.user_id) {
            return Err(StoreError::ForeignKeyViolation("portfolios_user_id_fkey".to_string()));
        }
        if !tables.stocks.contains_key(&entry.stock_id) {
            return Err(StoreError::ForeignKeyViolation("portfolios_stock_id_fkey".to_string()));
        }
        if tables.portfolios.contains(&entry) {
            return Err(StoreError::UniqueViolation("portfolios_pkey".to_string()));
        }
        tables.portfolios.push(entry);
        Ok(entry)
    }

    async fn delete_portfolio(&self, entry: Portfolio) -> Result<bool, StoreError> {
        let mut tables = self.tables.write();
        let before = tables.portfolios.len();
        tables.portfolios.retain(|p| *p != entry);
        Ok(tables.portfolios.len() < before)
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn insert_user(&self, user: NewUser, roles: &[Role]) -> Result<User, StoreError> {
        let mut tables = self.tables.write();
        let user_name = normalize(&user.user_name);
        let email = normalize(&user.email);
        if tables.users.values().any(|u| normalize(&u.user_name) == user_name) {
            return Err(StoreError::UniqueViolation(
                "users_normalized_user_name_key".to_string(),
            ));
        }
        if tables.users.values().any(|u| normalize(&u.email) == email) {
            return Err(StoreError::UniqueViolation("users_normalized_email_key".to_string()));
        }
        let created = User {
            id: user.id,
            user_name: user.user_name,
            email: user.email,
            password_hash: user.password_hash,
            created_at: user.created_at,
        };
        tables.users.insert(created.id, created.clone());
        tables.user_roles.insert(created.id, roles.to_vec());
        Ok(created)
    }

    async fn fetch_user(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.tables.read().users.get(&id).cloned())
    }

    async fn fetch_user_by_name(&self, user_name: &str) -> Result<Option<User>, StoreError> {
        let wanted = normalize(user_name);
        let tables = self.tables.read();
        Ok(tables
            .users
            .values()
            .find(|u| normalize(&u.user_name) == wanted)
            .cloned())
    }

    async fn fetch_user_roles(&self, id: Uuid) -> Result<Vec<Role>, StoreError> {
        Ok(self
            .tables
            .read()
            .user_roles
            .get(&id)
            .cloned()
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bigdecimal::BigDecimal;
    use chrono::Utc;

    fn new_stock(symbol: &str) -> NewStock {
        NewStock {
            symbol: symbol.to_string(),
            company_name: format!("{} Inc", symbol),
            purchase: BigDecimal::from(100),
            last_div: BigDecimal::from(1),
            industry: "Tech".to_string(),
            market_cap: 1_000_000,
        }
    }

    fn new_comment(stock_id: i32) -> NewComment {
        NewComment {
            title: "Bullish".to_string(),
            content: "Strong quarter".to_string(),
            created_on: Utc::now(),
            stock_id,
        }
    }

    #[tokio::test]
    async fn test_ids_are_assigned_sequentially_and_never_reused() {
        let store = MemoryStore::new();
        let first = store.insert_stock(new_stock("AAA")).await.unwrap();
        let second = store.insert_stock(new_stock("BBB")).await.unwrap();
        store.delete_stock(second.id).await.unwrap();
        let third = store.insert_stock(new_stock("CCC")).await.unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(third.id, 3);
    }

    #[tokio::test]
    async fn test_deleting_stock_orphans_comments_and_drops_links() {
        let store = MemoryStore::new();
        let stock = store.insert_stock(new_stock("AAA")).await.unwrap();
        let comment = store.insert_comment(new_comment(stock.id)).await.unwrap();
        let user = store
            .insert_user(
                NewUser::new("bob".into(), "bob@x.com".into(), "hash".into()),
                &[Role::User],
            )
            .await
            .unwrap();
        store
            .insert_portfolio(Portfolio::new(user.id, stock.id))
            .await
            .unwrap();

        store.delete_stock(stock.id).await.unwrap();

        let orphan = store.fetch_comment(comment.id).await.unwrap().unwrap();
        assert_eq!(orphan.stock_id, None);
        assert!(store.fetch_portfolio_stocks(user.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_comment_insert_requires_existing_stock() {
        let store = MemoryStore::new();
        let err = store.insert_comment(new_comment(42)).await.unwrap_err();
        assert!(matches!(err, StoreError::ForeignKeyViolation(_)));
        assert!(store.fetch_comments().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_user_names_and_emails_are_unique_ignoring_case() {
        let store = MemoryStore::new();
        store
            .insert_user(
                NewUser::new("alice".into(), "a@x.com".into(), "hash".into()),
                &[Role::User],
            )
            .await
            .unwrap();

        let same_name = store
            .insert_user(
                NewUser::new("ALICE".into(), "other@x.com".into(), "hash".into()),
                &[Role::User],
            )
            .await
            .unwrap_err();
        assert!(matches!(same_name, StoreError::UniqueViolation(c) if c.contains("user_name")));

        let same_email = store
            .insert_user(
                NewUser::new("carol".into(), "A@X.COM".into(), "hash".into()),
                &[Role::User],
            )
            .await
            .unwrap_err();
        assert!(matches!(same_email, StoreError::UniqueViolation(c) if c.contains("email")));

        let found = store.fetch_user_by_name("Alice").await.unwrap();
        assert_eq!(found.map(|u| u.user_name), Some("alice".to_string()));
    }

    #[tokio::test]
    async fn test_portfolio_pair_is_unique() {
        let store = MemoryStore::new();
        let stock = store.insert_stock(new_stock("AAA")).await.unwrap();
        let user = store
            .insert_user(
                NewUser::new("dave".into(), "d@x.com".into(), "hash".into()),
                &[Role::User],
            )
            .await
            .unwrap();
        let entry = Portfolio::new(user.id, stock.id);

        store.insert_portfolio(entry).await.unwrap();
        let dup = store.insert_portfolio(entry).await.unwrap_err();
        assert!(matches!(dup, StoreError::UniqueViolation(_)));

        assert!(store.delete_portfolio(entry).await.unwrap());
        assert!(!store.delete_portfolio(entry).await.unwrap());
    }
}
