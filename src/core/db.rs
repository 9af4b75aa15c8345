use tokio_rusqlite::Connection;

/// Open the sqlite database stored under `storage_path`.
pub async fn async_db(storage_path: &str) -> Result<Connection, tokio_rusqlite::Error> {
    let db_file = format!("{}/otto.db", storage_path.trim_end_matches('/'));
    Connection::open(db_file).await
}

/// Create the schema if it doesn't already exist. Safe to run on
/// every startup.
///
/// A user owns at most one calendar credential: `calendar_token.user_id`
/// is UNIQUE and all writes go through an upsert keyed on it.
pub fn initialize_db(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS user (
             id TEXT PRIMARY KEY,
             auth_subject TEXT NOT NULL UNIQUE,
             email TEXT NOT NULL
         );
         CREATE TABLE IF NOT EXISTS calendar_token (
             id TEXT PRIMARY KEY,
             user_id TEXT NOT NULL UNIQUE REFERENCES user(id),
             access_token TEXT NOT NULL,
             refresh_token TEXT NOT NULL,
             expires_at TEXT NOT NULL,
             calendar_id TEXT NOT NULL
         );",
    )
}
