use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

use crate::routes::{health, investments, portfolio, transactions};
use crate::state::AppState;

pub fn create_app(state: AppState) -> Router {
    let accounts = Router::<AppState>::new()
        .merge(transactions::router())
        .merge(portfolio::router())
        .merge(investments::router());

    Router::<AppState>::new()
        .nest("/health", health::router())
        .nest("/api/accounts", accounts)
        .layer(ServiceBuilder::new().layer(CorsLayer::permissive()))
        .with_state(state)
}
