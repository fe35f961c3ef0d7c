pub mod failure_cache;
pub mod ledger_service;
pub mod portfolio_service;
pub mod portfolio_view;
pub mod price_service;
pub mod replay_cache;
pub mod timeseries_service;
pub mod transaction_view;
pub mod valuation_service;
