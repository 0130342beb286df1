mod ticker;
mod price_point;
mod trend;
mod rating;

pub use ticker::{normalize_symbol, FavoriteTicker};
pub use price_point::{PricePoint, PriceRefreshSummary};
pub use trend::{FilterMode, FilterParams, FilterResult, UnknownFilterMode};
pub use rating::{ProcessParams, TickerProfile, TickerRating};
