//! Background jobs run by the job scheduler service.
//!
//! - `price_refresh_job` - appends the current quote of each watch-list ticker

pub mod price_refresh_job;
