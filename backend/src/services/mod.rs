pub mod clock;
pub mod favorites_service;
pub mod job_scheduler_service;
pub mod price_service;
pub mod rate_limiter;
pub mod rating_service;
pub mod trend_filter;
