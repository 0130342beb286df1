//! Trend filters over a ticker's stored price history.
//!
//! Evaluation is pure: the caller passes the ticker, every candidate price
//! point and the instant to measure windows from. Points may arrive in any
//! order and several may share a calendar day (UTC).
//!
//! Each windowed mode first drops points older than its window, then reduces
//! what is left to one representative per day (the point with the latest
//! timestamp) before applying its predicate. Days with no data simply have no
//! representative.

use std::collections::BTreeMap;

use bigdecimal::{BigDecimal, Zero};
use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;
use tracing::debug;

use crate::models::{FavoriteTicker, FilterMode, FilterResult, PricePoint};

/// Distinct days a windowed mode needs before it will include a ticker.
pub const MIN_DISTINCT_DAYS: usize = 3;

/// Most recent days compared by `NonDecreasing3Day`.
pub const NON_DECREASING_SPAN: usize = 3;

/// Day-over-day declines tolerated by `MaxTwoDeclines5Day`.
pub const MAX_DECLINES: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrendFilterError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Evaluates one ticker under `mode`.
///
/// `Ok(None)` means the ticker does not qualify (or has no usable price);
/// it is a normal outcome, not a failure. Negative prices and points that
/// belong to another ticker are rejected as `InvalidInput`.
pub fn evaluate(
    ticker: &FavoriteTicker,
    points: &[PricePoint],
    mode: FilterMode,
    now: DateTime<Utc>,
) -> Result<Option<FilterResult>, TrendFilterError> {
    validate(ticker, points)?;

    let selected = match mode {
        FilterMode::Latest => latest_point(points),
        FilterMode::NonDecreasing3Day => {
            let days = daily_representatives(points, mode.window_start(now));
            non_decreasing_head(&days, NON_DECREASING_SPAN)
        }
        FilterMode::MaxTwoDeclines5Day => {
            let days = daily_representatives(points, mode.window_start(now));
            within_decline_budget(&days, MAX_DECLINES)
        }
    };

    debug!(
        "trend filter {:?} for {}: {} points -> {}",
        mode,
        ticker.ticker,
        points.len(),
        if selected.is_some() { "included" } else { "excluded" }
    );

    Ok(selected.map(|point| FilterResult::priced(ticker, point)))
}

fn validate(ticker: &FavoriteTicker, points: &[PricePoint]) -> Result<(), TrendFilterError> {
    let zero = BigDecimal::zero();
    for p in points {
        if p.favorite_ticker_id != ticker.id {
            return Err(TrendFilterError::InvalidInput(format!(
                "price point {} belongs to ticker {}, not {}",
                p.id, p.favorite_ticker_id, ticker.id
            )));
        }
        if p.price < zero {
            return Err(TrendFilterError::InvalidInput(format!(
                "price point {} has negative price {}",
                p.id, p.price
            )));
        }
    }
    Ok(())
}

/// Point with the greatest timestamp; the earliest one in input order wins a tie.
pub fn latest_point(points: &[PricePoint]) -> Option<&PricePoint> {
    let mut best: Option<&PricePoint> = None;
    for p in points {
        match best {
            Some(b) if p.recorded_at <= b.recorded_at => {}
            _ => best = Some(p),
        }
    }
    best
}

/// One representative per distinct day at or after `window_start`, oldest day first.
pub fn daily_representatives(
    points: &[PricePoint],
    window_start: Option<NaiveDate>,
) -> Vec<&PricePoint> {
    let mut by_day: BTreeMap<NaiveDate, &PricePoint> = BTreeMap::new();

    for p in points {
        let day = p.recorded_at.date_naive();
        if window_start.is_some_and(|start| day < start) {
            continue;
        }
        by_day
            .entry(day)
            .and_modify(|current| {
                if p.recorded_at > current.recorded_at {
                    *current = p;
                }
            })
            .or_insert(p);
    }

    by_day.into_values().collect()
}

// Takes the `span` most recent days and requires newest >= ... >= oldest.
fn non_decreasing_head<'a>(days: &[&'a PricePoint], span: usize) -> Option<&'a PricePoint> {
    if days.len() < MIN_DISTINCT_DAYS.max(span) {
        return None;
    }

    let recent: Vec<&PricePoint> = days.iter().rev().take(span).copied().collect();
    let holds = recent.windows(2).all(|pair| pair[0].price >= pair[1].price);

    if holds {
        recent.first().copied()
    } else {
        None
    }
}

// `days` must be oldest first.
fn within_decline_budget<'a>(days: &[&'a PricePoint], budget: usize) -> Option<&'a PricePoint> {
    if days.len() < MIN_DISTINCT_DAYS {
        return None;
    }

    if count_declines(days) <= budget {
        days.last().copied()
    } else {
        None
    }
}

/// Number of strict day-over-day decreases in an oldest-first sequence.
pub fn count_declines(days: &[&PricePoint]) -> usize {
    days.windows(2)
        .filter(|pair| pair[1].price < pair[0].price)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn ticker() -> FavoriteTicker {
        FavoriteTicker {
            id: 7,
            ticker: "AAPL".to_string(),
            name: "Apple Inc".to_string(),
            logo: Some("https://static.example.com/aapl.png".to_string()),
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 10, 15, 30, 0).unwrap()
    }

    // Point recorded `days_ago` calendar days before `now()`, at `hour`:00 UTC.
    fn point(id: i32, days_ago: i64, hour: u32, price: &str) -> PricePoint {
        let day = now().date_naive() - Duration::days(days_ago);
        PricePoint {
            id,
            favorite_ticker_id: 7,
            price: price.parse().unwrap(),
            recorded_at: day.and_hms_opt(hour, 0, 0).unwrap().and_utc(),
        }
    }

    // One point per day, oldest first, ending today.
    fn daily_series(prices: &[&str]) -> Vec<PricePoint> {
        let n = prices.len() as i64;
        prices
            .iter()
            .enumerate()
            .map(|(i, p)| point(i as i32 + 1, n - 1 - i as i64, 12, p))
            .collect()
    }

    fn price(v: &str) -> BigDecimal {
        v.parse().unwrap()
    }

    #[test]
    fn test_empty_input_excluded_in_every_mode() {
        for mode in [
            FilterMode::Latest,
            FilterMode::NonDecreasing3Day,
            FilterMode::MaxTwoDeclines5Day,
        ] {
            assert_eq!(evaluate(&ticker(), &[], mode, now()), Ok(None));
        }
    }

    #[test]
    fn test_latest_picks_max_timestamp_regardless_of_order() {
        let points = vec![point(1, 2, 9, "10"), point(2, 0, 8, "12"), point(3, 1, 23, "11")];

        let result = evaluate(&ticker(), &points, FilterMode::Latest, now())
            .unwrap()
            .unwrap();

        assert_eq!(result.latest_price, Some(price("12")));
        assert_eq!(result.latest_date, Some(points[1].recorded_at));
        assert_eq!(result.ticker, "AAPL");
        assert_eq!(result.name, "Apple Inc");
    }

    #[test]
    fn test_latest_tie_keeps_first_encountered() {
        let points = vec![point(1, 0, 10, "5"), point(2, 0, 10, "6")];

        let best = latest_point(&points).unwrap();
        assert_eq!(best.id, 1);
    }

    #[test]
    fn test_latest_ignores_windows() {
        let points = vec![point(1, 40, 10, "3")];

        let result = evaluate(&ticker(), &points, FilterMode::Latest, now()).unwrap();
        assert_eq!(result.unwrap().latest_price, Some(price("3")));
    }

    #[test]
    fn test_non_decreasing_flat_prices_included() {
        let points = daily_series(&["10", "10", "10"]);

        let result = evaluate(&ticker(), &points, FilterMode::NonDecreasing3Day, now())
            .unwrap()
            .unwrap();

        assert_eq!(result.latest_price, Some(price("10")));
        assert_eq!(result.latest_date, Some(points[2].recorded_at));
    }

    #[test]
    fn test_non_decreasing_falling_prices_excluded() {
        let points = daily_series(&["10", "9", "8"]);

        let result = evaluate(&ticker(), &points, FilterMode::NonDecreasing3Day, now()).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_non_decreasing_rising_prices_report_newest_day() {
        let points = daily_series(&["8", "9", "10"]);

        let result = evaluate(&ticker(), &points, FilterMode::NonDecreasing3Day, now())
            .unwrap()
            .unwrap();
        assert_eq!(result.latest_price, Some(price("10")));
    }

    #[test]
    fn test_non_decreasing_needs_three_days() {
        let points = vec![point(1, 1, 12, "1"), point(2, 0, 12, "2"), point(3, 0, 13, "3")];

        let result = evaluate(&ticker(), &points, FilterMode::NonDecreasing3Day, now()).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_non_decreasing_uses_three_most_recent_of_four_days() {
        // today-3 is inside the window but only the newest three days count.
        let points = vec![
            point(1, 3, 12, "50"),
            point(2, 2, 12, "10"),
            point(3, 1, 12, "11"),
            point(4, 0, 12, "12"),
        ];

        let result = evaluate(&ticker(), &points, FilterMode::NonDecreasing3Day, now())
            .unwrap()
            .unwrap();
        assert_eq!(result.latest_price, Some(price("12")));
    }

    #[test]
    fn test_non_decreasing_window_boundary() {
        // today-3 is inside the window.
        let inside = vec![point(1, 3, 0, "1"), point(2, 2, 12, "2"), point(3, 1, 12, "3")];
        let result = evaluate(&ticker(), &inside, FilterMode::NonDecreasing3Day, now()).unwrap();
        assert!(result.is_some());

        // today-4 is not, leaving only two days.
        let outside = vec![point(1, 4, 23, "1"), point(2, 2, 12, "2"), point(3, 1, 12, "3")];
        let result = evaluate(&ticker(), &outside, FilterMode::NonDecreasing3Day, now()).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_same_day_points_use_latest_timestamp() {
        // Morning dip on the middle day is superseded by the evening price.
        let points = vec![
            point(1, 2, 12, "10"),
            point(2, 1, 9, "5"),
            point(3, 1, 18, "10"),
            point(4, 0, 12, "10"),
        ];

        let days = daily_representatives(&points, FilterMode::NonDecreasing3Day.window_start(now()));
        assert_eq!(days.len(), 3);
        assert_eq!(days[1].id, 3);

        let result = evaluate(&ticker(), &points, FilterMode::NonDecreasing3Day, now()).unwrap();
        assert!(result.is_some());
    }

    #[test]
    fn test_same_day_points_do_not_inflate_day_count() {
        let points = vec![point(1, 0, 8, "1"), point(2, 0, 9, "2"), point(3, 0, 10, "3")];

        assert_eq!(daily_representatives(&points, None).len(), 1);
        let result = evaluate(&ticker(), &points, FilterMode::MaxTwoDeclines5Day, now()).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_daily_representatives_are_oldest_first() {
        let points = vec![point(1, 0, 12, "3"), point(2, 4, 12, "1"), point(3, 2, 12, "2")];

        let days = daily_representatives(&points, None);
        let ids: Vec<i32> = days.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[test]
    fn test_max_declines_steady_fall_excluded() {
        let points = daily_series(&["10", "9", "8", "7", "6"]);

        let days = daily_representatives(&points, None);
        assert_eq!(count_declines(&days), 4);

        let result = evaluate(&ticker(), &points, FilterMode::MaxTwoDeclines5Day, now()).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_max_declines_two_dips_included_with_last_day() {
        let points = daily_series(&["10", "11", "10", "11", "10"]);

        let result = evaluate(&ticker(), &points, FilterMode::MaxTwoDeclines5Day, now())
            .unwrap()
            .unwrap();

        assert_eq!(result.latest_price, Some(price("10")));
        assert_eq!(result.latest_date, Some(points[4].recorded_at));
    }

    #[test]
    fn test_max_declines_three_rising_days_included() {
        let points = daily_series(&["10", "11", "12"]);

        let result = evaluate(&ticker(), &points, FilterMode::MaxTwoDeclines5Day, now()).unwrap();
        assert_eq!(result.unwrap().latest_price, Some(price("12")));
    }

    #[test]
    fn test_max_declines_reports_last_day_with_data() {
        // Nothing recorded today; the newest day with data is reported.
        let points = vec![point(1, 5, 12, "10"), point(2, 3, 12, "9"), point(3, 2, 12, "9.5")];

        let result = evaluate(&ticker(), &points, FilterMode::MaxTwoDeclines5Day, now())
            .unwrap()
            .unwrap();
        assert_eq!(result.latest_date, Some(points[2].recorded_at));
    }

    #[test]
    fn test_max_declines_window_excludes_sixth_day_back() {
        let points = vec![point(1, 6, 12, "10"), point(2, 1, 12, "11"), point(3, 0, 12, "12")];

        let result = evaluate(&ticker(), &points, FilterMode::MaxTwoDeclines5Day, now()).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_zero_price_is_an_ordinary_value() {
        let points = daily_series(&["0", "0", "0"]);

        let result = evaluate(&ticker(), &points, FilterMode::NonDecreasing3Day, now())
            .unwrap()
            .unwrap();
        assert_eq!(result.latest_price, Some(price("0")));
    }

    #[test]
    fn test_negative_price_is_rejected() {
        let points = vec![point(1, 0, 12, "-1")];

        let err = evaluate(&ticker(), &points, FilterMode::Latest, now()).unwrap_err();
        assert!(matches!(err, TrendFilterError::InvalidInput(_)));
    }

    #[test]
    fn test_foreign_price_point_is_rejected() {
        let mut foreign = point(1, 0, 12, "1");
        foreign.favorite_ticker_id = 99;

        let err = evaluate(&ticker(), &[foreign], FilterMode::Latest, now()).unwrap_err();
        assert!(matches!(err, TrendFilterError::InvalidInput(_)));
    }

    #[test]
    fn test_evaluation_is_repeatable_and_leaves_input_untouched() {
        let points = daily_series(&["10", "11", "10", "11", "10"]);
        let before = points.clone();

        let first = evaluate(&ticker(), &points, FilterMode::MaxTwoDeclines5Day, now());
        let second = evaluate(&ticker(), &points, FilterMode::MaxTwoDeclines5Day, now());

        assert_eq!(first, second);
        assert_eq!(points, before);
    }
}
