//! Router for the calendar API

use std::sync::{Arc, RwLock};

use axum::{Router, extract::State, response::Json, routing::get};

use super::public;
use crate::api::session::AuthSession;
use crate::api::state::AppState;
use crate::calendar;

type SharedState = Arc<RwLock<AppState>>;

/// Whether the caller has a calendar connected, and to which account
async fn status_handler(
    State(state): State<SharedState>,
    session: AuthSession,
) -> Result<Json<public::CalendarStatusResponse>, crate::api::public::ApiError> {
    let db = state
        .read()
        .expect("Unable to read shared state")
        .db
        .clone();

    let connection = calendar::connection_for_subject(&db, &session.subject).await?;

    Ok(Json(public::CalendarStatusResponse {
        connected: connection.is_some(),
        calendar_id: connection.map(|token| token.calendar_id),
    }))
}

/// Create the calendar router
pub fn router() -> Router<SharedState> {
    Router::new().route("/status", get(status_handler))
}
