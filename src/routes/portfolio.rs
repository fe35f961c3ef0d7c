use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{Holding, Page, PortfolioSummary, PortfolioValuation, ValuedHolding};
use crate::services;
use crate::services::portfolio_view::{self, CategoryFilter, PortfolioQuery};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/:account_id/holdings", get(get_holdings))
        .route("/:account_id/summary", get(get_summary))
        .route("/:account_id/portfolio", get(get_portfolio))
        .route("/:account_id/portfolio/view", get(get_portfolio_view))
}

#[derive(Debug, Deserialize)]
pub struct PortfolioViewParams {
    search: Option<String>,
    category: Option<CategoryFilter>,
    page: Option<usize>,
}

pub async fn get_holdings(
    State(state): State<AppState>,
    Path(account_id): Path<Uuid>,
) -> Result<Json<Vec<Holding>>, AppError> {
    info!("GET /accounts/{}/holdings - Replaying ledger", account_id);
    let holdings = services::portfolio_service::holdings(&state, account_id).await?;
    Ok(Json(holdings))
}

pub async fn get_summary(
    State(state): State<AppState>,
    Path(account_id): Path<Uuid>,
) -> Result<Json<PortfolioSummary>, AppError> {
    info!("GET /accounts/{}/summary - Valuing portfolio", account_id);
    let valuation = services::portfolio_service::valuation(&state, account_id).await?;
    Ok(Json(valuation.summary))
}

pub async fn get_portfolio(
    State(state): State<AppState>,
    Path(account_id): Path<Uuid>,
) -> Result<Json<PortfolioValuation>, AppError> {
    info!("GET /accounts/{}/portfolio - Valuing portfolio", account_id);
    let valuation = services::portfolio_service::valuation(&state, account_id).await?;
    Ok(Json(valuation))
}

pub async fn get_portfolio_view(
    State(state): State<AppState>,
    Path(account_id): Path<Uuid>,
    Query(params): Query<PortfolioViewParams>,
) -> Result<Json<Page<ValuedHolding>>, AppError> {
    info!("GET /accounts/{}/portfolio/view - Filtering holdings", account_id);
    let valuation = services::portfolio_service::valuation(&state, account_id).await?;
    let query = PortfolioQuery {
        search: params.search.unwrap_or_default(),
        category: params.category.unwrap_or_default(),
        page: params.page.unwrap_or(1),
    };
    Ok(Json(portfolio_view::query(&valuation.holdings, &query)))
}
