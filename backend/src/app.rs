use axum::http::HeaderValue;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};

use crate::routes::{auth, favorites, health, prices};
use crate::state::AppState;

pub fn create_app(state: AppState, cors_origin: HeaderValue) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(cors_origin)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::<AppState>::new()
        .nest("/health", health::router())
        .nest("/api/auth", auth::router())
        .nest("/api/favorites", favorites::router())
        .nest("/api/prices", prices::router())
        .layer(cors)
        .with_state(state)
}
