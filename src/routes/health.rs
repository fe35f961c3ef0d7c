use axum::{routing::get, Router};
use tracing::debug;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(health))
}

// Liveness only; does not touch the store or the price feed.
async fn health() -> &'static str {
    debug!("GET /health");
    "OK"
}
