mod holding;
mod investment;
mod page;
mod price;
mod snapshot;
mod transaction;

pub use holding::{Category, Holding, PortfolioSummary, PortfolioValuation, ValuedHolding};
pub use investment::InvestmentPoint;
pub use page::{Page, PAGE_SIZE};
pub use price::PriceBook;
pub use snapshot::LedgerSnapshot;
pub use transaction::{CreateTransaction, Transaction, TransactionRecord, TransactionType};
