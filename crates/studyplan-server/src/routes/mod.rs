pub mod sessions;
pub mod subjects;
pub mod topics;

use axum::Router;

use crate::AppState;

/// Build the /api router.
pub fn api_router() -> Router<AppState> {
    Router::new()
        .merge(sessions::router())
        .merge(subjects::router())
        .merge(topics::router())
}
