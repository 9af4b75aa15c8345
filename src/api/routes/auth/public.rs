//! Public types for the OAuth flow
use serde::Deserialize;

/// Query string Google sends to the redirect URI. All fields are
/// optional on the wire; the handler decides which combinations are
/// usable.
#[derive(Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}
