//! Credential store queries. One calendar credential per user,
//! enforced by the UNIQUE constraint on `calendar_token.user_id` and
//! the upsert in [`upsert_token`].

use chrono::{DateTime, Utc};
use rusqlite::OptionalExtension;
use rusqlite::types::Type;
use tokio_rusqlite::Connection;
use uuid::Uuid;

use super::models::{CalendarToken, User};

fn parse_expiry(value: String) -> Result<DateTime<Utc>, rusqlite::Error> {
    DateTime::parse_from_rfc3339(&value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(e)))
}

pub async fn find_user_by_subject(
    db: &Connection,
    auth_subject: &str,
) -> Result<Option<User>, tokio_rusqlite::Error> {
    let auth_subject = auth_subject.to_string();
    db.call(move |conn| {
        let user = conn
            .prepare("SELECT id, auth_subject, email FROM user WHERE auth_subject = ?1")?
            .query_row([&auth_subject], |row| {
                Ok(User {
                    id: row.get(0)?,
                    auth_subject: row.get(1)?,
                    email: row.get(2)?,
                })
            })
            .optional()?;
        Ok(user)
    })
    .await
}

pub async fn create_user(
    db: &Connection,
    auth_subject: &str,
    email: &str,
) -> Result<User, tokio_rusqlite::Error> {
    let user = User {
        id: Uuid::new_v4().to_string(),
        auth_subject: auth_subject.to_string(),
        email: email.to_string(),
    };
    let row = user.clone();
    db.call(move |conn| {
        conn.execute(
            "INSERT INTO user (id, auth_subject, email) VALUES (?1, ?2, ?3)",
            (&row.id, &row.auth_subject, &row.email),
        )?;
        Ok(())
    })
    .await?;
    Ok(user)
}

pub async fn find_token_by_subject(
    db: &Connection,
    auth_subject: &str,
) -> Result<Option<CalendarToken>, tokio_rusqlite::Error> {
    let auth_subject = auth_subject.to_string();
    db.call(move |conn| {
        let token = conn
            .prepare(
                "SELECT t.id, t.user_id, t.access_token, t.refresh_token, t.expires_at, t.calendar_id
                 FROM calendar_token t
                 JOIN user u ON u.id = t.user_id
                 WHERE u.auth_subject = ?1",
            )?
            .query_row([&auth_subject], |row| {
                Ok(CalendarToken {
                    id: row.get(0)?,
                    user_id: row.get(1)?,
                    access_token: row.get(2)?,
                    refresh_token: row.get(3)?,
                    expires_at: parse_expiry(row.get(4)?)?,
                    calendar_id: row.get(5)?,
                })
            })
            .optional()?;
        Ok(token)
    })
    .await
}

/// Insert or replace the user's credential in one statement, keyed on
/// `user_id`. A reconnect overwrites every token field including the
/// calendar identifier.
pub async fn upsert_token(
    db: &Connection,
    user_id: &str,
    access_token: &str,
    refresh_token: &str,
    expires_at: DateTime<Utc>,
    calendar_id: &str,
) -> Result<(), tokio_rusqlite::Error> {
    let id = Uuid::new_v4().to_string();
    let user_id = user_id.to_string();
    let access_token = access_token.to_string();
    let refresh_token = refresh_token.to_string();
    let expires_at = expires_at.to_rfc3339();
    let calendar_id = calendar_id.to_string();
    db.call(move |conn| {
        conn.execute(
            "INSERT INTO calendar_token (id, user_id, access_token, refresh_token, expires_at, calendar_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(user_id) DO UPDATE SET
                 access_token = excluded.access_token,
                 refresh_token = excluded.refresh_token,
                 expires_at = excluded.expires_at,
                 calendar_id = excluded.calendar_id",
            (&id, &user_id, &access_token, &refresh_token, &expires_at, &calendar_id),
        )?;
        Ok(())
    })
    .await
}

/// Persist a refreshed access token. The refresh token is
/// deliberately left untouched; the provider does not rotate it on a
/// refresh grant.
pub async fn update_access_token(
    db: &Connection,
    token_id: &str,
    access_token: &str,
    expires_at: DateTime<Utc>,
) -> Result<(), tokio_rusqlite::Error> {
    let token_id = token_id.to_string();
    let access_token = access_token.to_string();
    let expires_at = expires_at.to_rfc3339();
    db.call(move |conn| {
        conn.execute(
            "UPDATE calendar_token SET access_token = ?1, expires_at = ?2 WHERE id = ?3",
            (&access_token, &expires_at, &token_id),
        )?;
        Ok(())
    })
    .await
}
