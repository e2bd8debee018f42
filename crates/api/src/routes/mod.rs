//! API routes
//!
//! Route handlers grouped by concern.

pub mod channels;
pub mod live;
pub mod ops;

use axum::Router;

use crate::state::AppState;

/// Build the complete API router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Operations routes (health)
        .merge(ops::routes())
        // Channel management and history
        .merge(channels::routes())
        // Live record streams
        .merge(live::routes())
        .with_state(state)
}
