//! Test utilities for integration tests
use std::sync::{Arc, RwLock};

use axum::Router;
use chrono::{DateTime, Utc};
use tempfile::TempDir;
use tokio_rusqlite::Connection;

use otto::api::AppState;
use otto::api::app;
use otto::calendar::db as calendar_db;
use otto::core::AppConfig;
use otto::core::db::{async_db, initialize_db};

/// A running test application plus handles for seeding and inspecting
/// its state. Holds the storage tempdir so it outlives the test.
pub struct TestApp {
    pub app: Router,
    pub db: Connection,
    pub config: AppConfig,
    _storage: TempDir,
}

/// Config with every outbound base URL pointed at `api_url`, so one
/// mockito server can stand in for Google and Anthropic at once (the
/// paths never collide).
pub fn test_config(api_url: &str, storage_path: &str) -> AppConfig {
    AppConfig {
        storage_path: storage_path.to_string(),
        public_url: "http://localhost:2222".to_string(),
        google_client_id: "test_client_id".to_string(),
        google_client_secret: "test_client_secret".to_string(),
        google_accounts_url: "https://accounts.google.com".to_string(),
        google_oauth_api_url: api_url.to_string(),
        google_api_url: api_url.to_string(),
        anthropic_api_url: api_url.to_string(),
        anthropic_api_key: "test-api-key".to_string(),
        anthropic_model: "claude-sonnet-4-20250514".to_string(),
    }
}

/// An app whose outbound calls all fail fast. Good enough for tests
/// that never leave the request handler.
pub async fn test_app() -> TestApp {
    test_app_with(|_| {}).await
}

/// Build an app, letting the caller adjust the config (e.g. point the
/// API base URLs at a mockito server) before the router is built.
pub async fn test_app_with(adjust: impl FnOnce(&mut AppConfig)) -> TestApp {
    let storage = tempfile::tempdir().expect("Failed to create temp dir");
    let storage_path = storage.path().to_str().unwrap().to_string();

    let db = async_db(&storage_path)
        .await
        .expect("Failed to connect to async db");
    db.call(|conn| {
        initialize_db(conn)?;
        Ok(())
    })
    .await
    .unwrap();

    let mut config = test_config("http://127.0.0.1:1", &storage_path);
    adjust(&mut config);

    let app_state = AppState::new(db.clone(), config.clone());
    let app = app(Arc::new(RwLock::new(app_state)));

    TestApp {
        app,
        db,
        config,
        _storage: storage,
    }
}

/// Connect a calendar for `subject` directly in the store.
pub async fn seed_calendar_token(
    db: &Connection,
    subject: &str,
    calendar_id: &str,
    expires_at: DateTime<Utc>,
) {
    let user = calendar_db::create_user(db, subject, calendar_id)
        .await
        .unwrap();
    calendar_db::upsert_token(
        db,
        &user.id,
        "seeded_access",
        "seeded_refresh",
        expires_at,
        calendar_id,
    )
    .await
    .unwrap();
}
