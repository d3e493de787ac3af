mod comment;
mod portfolio;
mod stock;
mod user;
mod validation;

pub use comment::{Comment, CommentDto, CreateCommentRequest, NewComment, UpdateCommentRequest};
pub use portfolio::{Portfolio, PortfolioSymbolQuery};
pub use stock::{
    CreateStockRequest, NewStock, Stock, StockDetailDto, StockDto, StockFilter, StockQuery,
    UpdateStockRequest,
};
pub use user::{normalize, LoginRequest, NewUser, NewUserDto, RegisterRequest, Role, User};
pub use validation::FieldErrors;
