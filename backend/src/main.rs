use std::sync::Arc;

use eagle_backend::app;
use eagle_backend::config::AppConfig;
use eagle_backend::external::finnhub::FinnhubProvider;
use eagle_backend::external::quote_provider::QuoteProvider;
use eagle_backend::logging::{self, LoggingConfig};
use eagle_backend::services::clock::{Clock, SystemClock};
use eagle_backend::services::job_scheduler_service::{JobContext, JobSchedulerService};
use eagle_backend::services::rate_limiter::{RateLimiter, MAX_CONCURRENT_QUOTES};
use eagle_backend::services::rating_service::PlaceholderRatingSource;
use eagle_backend::state::AppState;
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Initialize logging FIRST
    logging::init_logging(&LoggingConfig::from_env()?)?;

    let config = AppConfig::from_env()?;

    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .connect(&config.database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("🗄️ Database migrations applied");

    let quote_provider: Arc<dyn QuoteProvider> = Arc::new(FinnhubProvider::new(
        config.finnhub_base_url.clone(),
        config.finnhub_api_key.clone(),
    ));
    let rate_limiter = Arc::new(RateLimiter::new(
        MAX_CONCURRENT_QUOTES,
        config.quote_requests_per_minute,
    ));
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let mut scheduler = match &config.price_refresh_cron {
        Some(cron) => {
            let mut scheduler = JobSchedulerService::new(JobContext {
                pool: pool.clone(),
                quote_provider: quote_provider.clone(),
                rate_limiter: rate_limiter.clone(),
                clock: clock.clone(),
            })
            .await?;
            scheduler.start(cron).await?;
            Some(scheduler)
        }
        None => {
            tracing::info!("⏸️ Price refresh job disabled");
            None
        }
    };

    let state = AppState {
        pool,
        quote_provider,
        rate_limiter,
        rating_source: Arc::new(PlaceholderRatingSource),
        clock,
        auth_code: config.auth_code.clone(),
    };
    if state.auth_code.is_none() {
        tracing::warn!("AUTH_CODE is not set; every auth attempt will be rejected");
    }

    let app = app::create_app(state, config.cors_origin.clone());

    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!("🚀 Eagle backend running at http://{}/", config.bind_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(scheduler) = scheduler.as_mut() {
        scheduler.stop().await?;
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
