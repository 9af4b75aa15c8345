//! Caller identity. Session management is delegated to a fronting
//! auth proxy which injects the verified subject id and display name
//! as request headers; this extractor only reads them.

use axum::extract::FromRequestParts;
use axum::response::{IntoResponse, Response};
use http::StatusCode;
use http::request::Parts;
use serde_json::json;

pub const SUBJECT_HEADER: &str = "x-auth-subject";
pub const NAME_HEADER: &str = "x-auth-name";

#[derive(Debug, Clone)]
pub struct AuthSession {
    /// Opaque id the auth provider uses for this user
    pub subject: String,
    /// Display name, when the provider knows one
    pub name: Option<String>,
}

pub struct Unauthorized;

impl IntoResponse for Unauthorized {
    fn into_response(self) -> Response {
        (
            StatusCode::UNAUTHORIZED,
            axum::Json(json!({ "error": "Unauthorized" })),
        )
            .into_response()
    }
}

impl<S> FromRequestParts<S> for AuthSession
where
    S: Send + Sync,
{
    type Rejection = Unauthorized;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let subject = parts
            .headers
            .get(SUBJECT_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or(Unauthorized)?
            .to_string();
        let name = parts
            .headers
            .get(NAME_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(ToString::to_string);
        Ok(AuthSession { subject, name })
    }
}
