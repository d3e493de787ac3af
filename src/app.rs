use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::routes::{accounts, comments, health, portfolios, stocks};
use crate::state::AppState;

pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::<AppState>::new()
        .nest("/health", health::router())
        .nest("/api/stock", stocks::router())
        .nest("/api/comment", comments::router())
        .nest("/api/portfolio", portfolios::router())
        .nest("/api/account", accounts::router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
