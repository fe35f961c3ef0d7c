pub mod price_feed;
pub mod yahoo;
