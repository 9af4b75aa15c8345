//! Router for the Google OAuth authorization flow

use std::sync::{Arc, RwLock};

use axum::{
    Router,
    extract::State,
    response::{IntoResponse, Redirect},
    routing::get,
};
use axum_extra::extract::Query;
use http::StatusCode;
use serde_json::json;
use tokio_rusqlite::Connection;

use super::public;
use crate::api::session::AuthSession;
use crate::api::state::AppState;
use crate::calendar::db as calendar_db;
use crate::core::AppConfig;
use crate::google::oauth::{self, TokenEndpointResponse};

type SharedState = Arc<RwLock<AppState>>;

const SCOPES: &str = "https://www.googleapis.com/auth/calendar https://www.googleapis.com/auth/calendar.events https://www.googleapis.com/auth/userinfo.email";

fn redirect_uri(config: &AppConfig) -> String {
    format!(
        "{}/auth/google/callback",
        config.public_url.trim_end_matches('/')
    )
}

fn dashboard_url(config: &AppConfig) -> String {
    format!("{}/dashboard", config.public_url.trim_end_matches('/'))
}

/// Send the caller to Google's consent screen. The caller's auth
/// subject travels in `state`, which both correlates the callback and
/// names the user the tokens get bound to. `prompt=consent` forces a
/// refresh token on every authorization, including re-consent.
async fn initiate_handler(
    State(state): State<SharedState>,
    session: AuthSession,
) -> impl IntoResponse {
    let config = state
        .read()
        .expect("Unable to read shared state")
        .config
        .clone();

    if config.google_client_id.is_empty() {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            axum::Json(json!({ "error": "Google OAuth not configured" })),
        )
            .into_response();
    }

    let auth_url = format!(
        "{}/o/oauth2/v2/auth?client_id={}&redirect_uri={}&response_type=code&scope={}&access_type=offline&prompt=consent&state={}",
        config.google_accounts_url.trim_end_matches('/'),
        urlencoding::encode(&config.google_client_id),
        urlencoding::encode(&redirect_uri(&config)),
        urlencoding::encode(SCOPES),
        urlencoding::encode(&session.subject),
    );

    Redirect::temporary(&auth_url).into_response()
}

enum CallbackOutcome {
    Connected,
    ExchangeDenied,
}

/// Receive the provider redirect. Every path out of here is itself a
/// redirect into the UI; the user never sees a raw error.
async fn callback_handler(
    State(state): State<SharedState>,
    Query(params): Query<public::CallbackQuery>,
) -> Redirect {
    let (db, config) = {
        let shared_state = state.read().expect("Unable to read shared state");
        (shared_state.db.clone(), shared_state.config.clone())
    };
    let dashboard = dashboard_url(&config);

    if params.error.is_some() {
        return Redirect::temporary(&format!("{}?error=google_auth_denied", dashboard));
    }
    let (Some(code), Some(subject)) = (params.code, params.state) else {
        return Redirect::temporary(&format!("{}?error=missing_params", dashboard));
    };

    match connect_calendar(&db, &config, &code, &subject).await {
        Ok(CallbackOutcome::Connected) => {
            Redirect::temporary(&format!("{}?success=calendar_connected", dashboard))
        }
        Ok(CallbackOutcome::ExchangeDenied) => {
            Redirect::temporary(&format!("{}?error=token_exchange_failed", dashboard))
        }
        Err(e) => {
            tracing::error!("Google OAuth callback error: {:#}", e);
            Redirect::temporary(&format!("{}?error=callback_failed", dashboard))
        }
    }
}

/// Exchange the authorization code, resolve the local user (creating
/// it on first connect), and upsert their credential.
async fn connect_calendar(
    db: &Connection,
    config: &AppConfig,
    code: &str,
    auth_subject: &str,
) -> anyhow::Result<CallbackOutcome> {
    let grant = match oauth::exchange_code_for_token(
        &config.google_oauth_api_url,
        &config.google_client_id,
        &config.google_client_secret,
        code,
        &redirect_uri(config),
    )
    .await?
    {
        TokenEndpointResponse::Granted(grant) => grant,
        TokenEndpointResponse::Denied(denied) => {
            tracing::error!(
                "Token exchange error: {} {}",
                denied.error,
                denied.error_description.unwrap_or_default()
            );
            return Ok(CallbackOutcome::ExchangeDenied);
        }
    };

    // The profile email is the calendar identifier for all subsequent
    // calendar calls
    let userinfo = oauth::fetch_userinfo(&config.google_api_url, &grant.access_token).await?;

    let user = match calendar_db::find_user_by_subject(db, auth_subject).await? {
        Some(user) => user,
        None => calendar_db::create_user(db, auth_subject, &userinfo.email).await?,
    };

    let expires_at = chrono::Utc::now() + chrono::Duration::seconds(grant.expires_in);
    calendar_db::upsert_token(
        db,
        &user.id,
        &grant.access_token,
        // A repeat consent may omit the refresh token
        grant.refresh_token.as_deref().unwrap_or(""),
        expires_at,
        &userinfo.email,
    )
    .await?;

    Ok(CallbackOutcome::Connected)
}

/// Create the auth router
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/", get(initiate_handler))
        .route("/callback", get(callback_handler))
}
