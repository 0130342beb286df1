use sqlx::PgPool;
use tracing::error;

use crate::models::FavoriteTicker;

pub async fn fetch_all(pool: &PgPool) -> Result<Vec<FavoriteTicker>, sqlx::Error> {
    sqlx::query_as::<_, FavoriteTicker>(
        "SELECT id, ticker, name, logo, created_at
         FROM favorite_tickers
         ORDER BY id ASC",
    )
    .fetch_all(pool)
    .await
}

pub async fn fetch_one(pool: &PgPool, id: i32) -> Result<Option<FavoriteTicker>, sqlx::Error> {
    sqlx::query_as::<_, FavoriteTicker>(
        "SELECT id, ticker, name, logo, created_at
         FROM favorite_tickers
         WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn exists_by_symbol(pool: &PgPool, symbol: &str) -> Result<bool, sqlx::Error> {
    let (exists,): (bool,) = sqlx::query_as(
        "SELECT EXISTS(SELECT 1 FROM favorite_tickers WHERE ticker = $1)",
    )
    .bind(symbol)
    .fetch_one(pool)
    .await?;
    Ok(exists)
}

pub async fn fetch_by_symbols(
    pool: &PgPool,
    symbols: &[String],
) -> Result<Vec<FavoriteTicker>, sqlx::Error> {
    if symbols.is_empty() {
        return Ok(Vec::new());
    }

    sqlx::query_as::<_, FavoriteTicker>(
        r#"
        SELECT id, ticker, name, logo, created_at
        FROM favorite_tickers
        WHERE ticker = ANY($1)
        ORDER BY id ASC
        "#,
    )
    .bind(symbols)
    .fetch_all(pool)
    .await
}

pub async fn insert(
    pool: &PgPool,
    symbol: &str,
    name: &str,
    logo: Option<&str>,
) -> Result<FavoriteTicker, sqlx::Error> {
    sqlx::query_as::<_, FavoriteTicker>(
        r#"
        INSERT INTO favorite_tickers (ticker, name, logo)
        VALUES ($1, $2, $3)
        RETURNING id, ticker, name, logo, created_at
        "#,
    )
    .bind(symbol)
    .bind(name)
    .bind(logo)
    .fetch_one(pool)
    .await
}

/// Deletes a ticker together with all of its price points.
///
/// Returns `false` when no ticker with `id` existed.
pub async fn delete_with_prices(pool: &PgPool, id: i32) -> Result<bool, sqlx::Error> {
    let mut tx = pool.begin().await.map_err(|e| {
        error!("Failed to begin transaction for ticker {}: {}", id, e);
        e
    })?;

    sqlx::query("DELETE FROM stock_data WHERE favorite_ticker_id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    let deleted = sqlx::query("DELETE FROM favorite_tickers WHERE id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    tx.commit().await?;
    Ok(deleted > 0)
}
