pub(crate) mod account_service;
pub(crate) mod comment_service;
pub(crate) mod portfolio_service;
pub(crate) mod stock_service;
pub(crate) mod token_service;
