pub(crate) mod accounts;
pub(crate) mod comments;
pub(crate) mod health;
pub(crate) mod portfolios;
pub(crate) mod stocks;
