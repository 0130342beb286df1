use crate::errors::AppError;
use crate::services::job_scheduler_service::{JobContext, JobResult};
use crate::services::price_service;
use tracing::info;

/// Appends the current quote of every watch-list ticker to its history.
///
/// The trend filters work on daily representatives, so running this more
/// than once a day only refines the latest point of each day.
pub async fn refresh_watch_list_prices(ctx: JobContext) -> Result<JobResult, AppError> {
    info!("Starting watch-list price refresh job");

    let summary = price_service::update_current_prices(
        &ctx.pool,
        ctx.quote_provider.as_ref(),
        ctx.rate_limiter.as_ref(),
        ctx.clock.as_ref(),
    )
    .await?;

    Ok(JobResult {
        items_processed: summary.inserted,
        items_failed: summary.skipped,
    })
}
