pub(crate) mod health;
pub(crate) mod investments;
pub(crate) mod portfolio;
pub(crate) mod transactions;
