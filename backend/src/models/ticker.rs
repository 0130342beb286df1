use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// A symbol on the watch-list. `ticker` is always stored uppercase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct FavoriteTicker {
    pub id: i32,
    pub ticker: String,
    pub name: String,
    pub logo: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Normalizes user input into the stored symbol form.
///
/// Returns `None` for blank input.
pub fn normalize_symbol(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_uppercase())
    }
}
