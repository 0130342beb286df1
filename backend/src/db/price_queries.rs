use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::models::PricePoint;

pub async fn fetch_all(pool: &PgPool) -> Result<Vec<PricePoint>, sqlx::Error> {
    sqlx::query_as::<_, PricePoint>(
        "SELECT id, favorite_ticker_id, price, recorded_at
         FROM stock_data
         ORDER BY recorded_at ASC",
    )
    .fetch_all(pool)
    .await
}

pub async fn fetch_one(pool: &PgPool, id: i32) -> Result<Option<PricePoint>, sqlx::Error> {
    sqlx::query_as::<_, PricePoint>(
        "SELECT id, favorite_ticker_id, price, recorded_at
         FROM stock_data
         WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Returns `false` when no row with `id` existed.
pub async fn delete(pool: &PgPool, id: i32) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM stock_data WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Price points for one ticker, optionally bounded below by `since`.
pub async fn fetch_for_ticker_since(
    pool: &PgPool,
    ticker_id: i32,
    since: Option<DateTime<Utc>>,
) -> Result<Vec<PricePoint>, sqlx::Error> {
    sqlx::query_as::<_, PricePoint>(
        r#"
        SELECT id, favorite_ticker_id, price, recorded_at
        FROM stock_data
        WHERE favorite_ticker_id = $1
          AND ($2::timestamptz IS NULL OR recorded_at >= $2)
        ORDER BY recorded_at ASC, id ASC
        "#,
    )
    .bind(ticker_id)
    .bind(since)
    .fetch_all(pool)
    .await
}

/// Most recent point for one ticker; the lowest id wins a timestamp tie.
pub async fn fetch_latest_for_ticker(
    pool: &PgPool,
    ticker_id: i32,
) -> Result<Option<PricePoint>, sqlx::Error> {
    sqlx::query_as::<_, PricePoint>(
        r#"
        SELECT id, favorite_ticker_id, price, recorded_at
        FROM stock_data
        WHERE favorite_ticker_id = $1
        ORDER BY recorded_at DESC, id ASC
        LIMIT 1
        "#,
    )
    .bind(ticker_id)
    .fetch_optional(pool)
    .await
}

pub async fn insert(
    pool: &PgPool,
    ticker_id: i32,
    price: &BigDecimal,
    recorded_at: DateTime<Utc>,
) -> Result<PricePoint, sqlx::Error> {
    sqlx::query_as::<_, PricePoint>(
        r#"
        INSERT INTO stock_data (favorite_ticker_id, price, recorded_at)
        VALUES ($1, $2, $3)
        RETURNING id, favorite_ticker_id, price, recorded_at
        "#,
    )
    .bind(ticker_id)
    .bind(price)
    .bind(recorded_at)
    .fetch_one(pool)
    .await
}
