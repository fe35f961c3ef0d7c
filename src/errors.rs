use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use bigdecimal::BigDecimal;
use serde_json::json;
use thiserror::Error;

/// Failures that abort a ledger replay. No partial holdings are returned.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LedgerError {
    #[error("insufficient holdings for {ticker}: tried to sell {requested}, held {held}")]
    InsufficientHoldings {
        ticker: String,
        requested: BigDecimal,
        held: BigDecimal,
    },
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Store error: {0}")]
    Store(StoreError),
    #[error("Ledger integrity error: {0}")]
    Ledger(LedgerError),
    #[error("Validation error: {0}")]
    Validation(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        match self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
            AppError::Ledger(LedgerError::InsufficientHoldings { ticker, requested, held }) => {
                let body = json!({
                    "error": "insufficient_holdings",
                    "ticker": ticker,
                    "requested": requested.to_string(),
                    "held": held.to_string(),
                });
                (StatusCode::UNPROCESSABLE_ENTITY, Json(body)).into_response()
            }
            AppError::Store(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        }
    }
}

impl From<StoreError> for AppError {
    fn from(value: StoreError) -> Self {
        AppError::Store(value)
    }
}

impl From<LedgerError> for AppError {
    fn from(value: LedgerError) -> Self {
        AppError::Ledger(value)
    }
}

impl From<String> for AppError {
    fn from(value: String) -> Self {
        AppError::Validation(value)
    }
}

/// Why a stored record could not be turned into a transaction. Such records
/// are skipped and counted; they never abort a replay.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MalformedTransaction {
    #[error("record {id}: missing {field}")]
    MissingField { id: i64, field: &'static str },
    #[error("record {id}: unknown transaction type '{value}'")]
    UnknownType { id: i64, value: String },
    #[error("record {id}: quantity must be positive")]
    NonPositiveQuantity { id: i64 },
    #[error("record {id}: price must not be negative")]
    NegativePrice { id: i64 },
}
