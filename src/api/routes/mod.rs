//! API routes module

pub mod auth;
pub mod calendar;
pub mod chat;

use std::sync::{Arc, RwLock};

use crate::api::state::AppState;
use axum::Router;

type SharedState = Arc<RwLock<AppState>>;

/// Create the combined API router
pub fn router() -> Router<SharedState> {
    Router::new()
        // Google OAuth authorization flow
        .nest("/auth/google", auth::router())
        // Calendar connection state
        .nest("/calendar", calendar::router())
        // Chat routes
        .nest("/chat", chat::router())
}
