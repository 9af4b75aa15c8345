//! Public types for the chat API
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize)]
pub struct ChatResponse {
    pub content: String,
}
