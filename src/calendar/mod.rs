//! Calendar connection state, token refresh, and event read/write on
//! top of the Google Calendar API.

pub mod db;
pub mod models;

pub use models::{CalendarToken, EVENT_TIME_ZONE, NewEvent, User};

use chrono::{DateTime, Duration, Utc};
use tokio_rusqlite::Connection;

use crate::core::AppConfig;
use crate::google::gcal;
use crate::google::oauth::{self, TokenEndpointResponse};

/// Access tokens this close to expiry are refreshed proactively
/// instead of being handed to a caller.
const EXPIRY_MARGIN_MINUTES: i64 = 5;

/// Why the calendar could not be used. Callers are expected to treat
/// any of these as "calendar unavailable" and degrade the feature
/// rather than fail the request.
#[derive(Debug, thiserror::Error)]
pub enum Unavailable {
    #[error("calendar is not connected")]
    NotConnected,
    #[error("token refresh rejected by provider: {0}")]
    RefreshRejected(String),
    #[error("calendar provider request failed: {0}")]
    Provider(#[from] anyhow::Error),
    #[error("credential store query failed: {0}")]
    Store(#[from] tokio_rusqlite::Error),
}

/// The user's stored credential, if any. Presence means "calendar
/// connected" for status and prompt-building purposes.
pub async fn connection_for_subject(
    db: &Connection,
    auth_subject: &str,
) -> Result<Option<CalendarToken>, tokio_rusqlite::Error> {
    db::find_token_by_subject(db, auth_subject).await
}

/// Return an access token that is valid for at least the expiry
/// margin, refreshing against the provider when the stored one is
/// stale. A refresh failure leaves the stored credential unmodified.
pub async fn get_valid_access_token(
    db: &Connection,
    config: &AppConfig,
    auth_subject: &str,
) -> Result<String, Unavailable> {
    let token = db::find_token_by_subject(db, auth_subject)
        .await?
        .ok_or(Unavailable::NotConnected)?;

    if token.expires_at > Utc::now() + Duration::minutes(EXPIRY_MARGIN_MINUTES) {
        return Ok(token.access_token);
    }

    match oauth::refresh_access_token(
        &config.google_oauth_api_url,
        &config.google_client_id,
        &config.google_client_secret,
        &token.refresh_token,
    )
    .await
    {
        Ok(TokenEndpointResponse::Granted(grant)) => {
            let expires_at = Utc::now() + Duration::seconds(grant.expires_in);
            db::update_access_token(db, &token.id, &grant.access_token, expires_at).await?;
            Ok(grant.access_token)
        }
        Ok(TokenEndpointResponse::Denied(denied)) => {
            tracing::warn!(
                "Token refresh rejected for user {}: {}",
                token.user_id,
                denied.error
            );
            Err(Unavailable::RefreshRejected(denied.error))
        }
        Err(e) => {
            tracing::warn!("Token refresh failed for user {}: {}", token.user_id, e);
            Err(Unavailable::Provider(e))
        }
    }
}

/// Events in `[now, now + days_ahead]`, ordered by start time.
pub async fn upcoming_events(
    db: &Connection,
    config: &AppConfig,
    auth_subject: &str,
    max_results: u32,
    days_ahead: i64,
) -> Result<Vec<gcal::Event>, Unavailable> {
    let token = db::find_token_by_subject(db, auth_subject)
        .await?
        .ok_or(Unavailable::NotConnected)?;
    let access_token = get_valid_access_token(db, config, auth_subject).await?;

    let now = Utc::now();
    let end = now + Duration::days(days_ahead);
    let events = gcal::list_events(
        &config.google_api_url,
        &access_token,
        &token.calendar_id,
        now,
        end,
        max_results,
    )
    .await?;
    Ok(events)
}

/// Create a calendar event from a validated request. Best-effort: no
/// idempotency key, so a duplicate submission creates a duplicate
/// entry.
pub async fn create_event(
    db: &Connection,
    config: &AppConfig,
    auth_subject: &str,
    event: &NewEvent,
) -> Result<gcal::Event, Unavailable> {
    let token = db::find_token_by_subject(db, auth_subject)
        .await?
        .ok_or(Unavailable::NotConnected)?;
    let access_token = get_valid_access_token(db, config, auth_subject).await?;

    let created = gcal::insert_event(
        &config.google_api_url,
        &access_token,
        &token.calendar_id,
        &event.to_calendar_event(),
    )
    .await?;
    Ok(created)
}

/// Render events as chat-prompt lines, one per event in input order:
/// `• <summary> - <start>[ (<location>)]`. Timed starts are shown
/// like `Thu, Feb 15, 2:00 PM`, all-day starts as the bare date.
pub fn format_events_for_chat(events: &[gcal::Event]) -> String {
    if events.is_empty() {
        return "No upcoming events found.".to_string();
    }
    events
        .iter()
        .map(|event| {
            let start = match &event.start.date_time {
                Some(date_time) => DateTime::parse_from_rfc3339(date_time)
                    .map(|dt| dt.format("%a, %b %-d, %-I:%M %p").to_string())
                    .unwrap_or_else(|_| date_time.clone()),
                None => event.start.date.clone().unwrap_or_default(),
            };
            let summary = event.summary.as_deref().unwrap_or("No title");
            let mut line = format!("• {} - {}", summary, start);
            if let Some(location) = &event.location {
                line.push_str(&format!(" ({})", location));
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}
