use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::InvestmentPoint;
use crate::services;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/:account_id/investments", get(get_investments))
}

pub async fn get_investments(
    State(state): State<AppState>,
    Path(account_id): Path<Uuid>,
) -> Result<Json<Vec<InvestmentPoint>>, AppError> {
    info!("GET /accounts/{}/investments - Building investment series", account_id);
    let series = services::portfolio_service::investments(&state, account_id).await?;
    Ok(Json(series))
}
