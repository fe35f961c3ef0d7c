use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use tracing::{error, info};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{CreateTransaction, Page, Transaction};
use crate::services;
use crate::services::transaction_view::{self, SortDirection, SortKey, SortState, TransactionQuery};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/:account_id/transactions", get(list_transactions).post(create_transaction))
}

#[derive(Debug, Deserialize)]
pub struct TransactionListParams {
    filter: Option<String>,
    sort: Option<String>,
    direction: Option<SortDirection>,
    page: Option<usize>,
}

impl TransactionListParams {
    fn into_query(self) -> Result<TransactionQuery, AppError> {
        let sort = match self.sort {
            Some(key) => Some(SortState {
                key: key.parse::<SortKey>()?,
                direction: self.direction.unwrap_or_default(),
            }),
            None => None,
        };
        Ok(TransactionQuery {
            filter: self.filter.unwrap_or_default(),
            sort,
            page: self.page.unwrap_or(1),
        })
    }
}

pub async fn list_transactions(
    State(state): State<AppState>,
    Path(account_id): Path<Uuid>,
    Query(params): Query<TransactionListParams>,
) -> Result<Json<Page<Transaction>>, AppError> {
    info!("GET /accounts/{}/transactions - Listing transactions", account_id);
    let query = params.into_query()?;
    let transactions = services::portfolio_service::transactions(&state, account_id).await?;
    Ok(Json(transaction_view::query(&transactions, &query)))
}

pub async fn create_transaction(
    State(state): State<AppState>,
    Path(account_id): Path<Uuid>,
    Json(input): Json<CreateTransaction>,
) -> Result<(StatusCode, Json<Transaction>), AppError> {
    info!("POST /accounts/{}/transactions - Recording {} {}", account_id, input.transaction_type, input.ticker);
    let transaction = services::portfolio_service::record_transaction(&state, account_id, input)
        .await
        .map_err(|e| {
            error!("Failed to record transaction for account {}: {}", account_id, e);
            e
        })?;
    Ok((StatusCode::CREATED, Json(transaction)))
}
