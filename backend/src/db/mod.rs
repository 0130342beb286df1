pub mod price_queries;
pub mod ticker_queries;
