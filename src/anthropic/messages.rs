//! Anthropic Messages API client. Single-turn, non-streaming; the
//! caller supplies the full conversation history on every request.

use std::time::Duration;

use anyhow::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

const ANTHROPIC_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 1024;

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub enum Role {
    #[serde(rename = "user")]
    User,
    #[serde(rename = "assistant")]
    Assistant,
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: &str) -> Self {
        ChatMessage {
            role,
            content: content.to_string(),
        }
    }
}

/// Request the next assistant turn. The system prompt travels in the
/// top-level `system` field, not as a message.
pub async fn create_message(
    messages: &[ChatMessage],
    system: &str,
    api_url: &str,
    api_key: &str,
    model: &str,
) -> Result<Value, Error> {
    let payload = json!({
        "model": model,
        "max_tokens": MAX_TOKENS,
        "system": system,
        "messages": messages,
    });
    let url = format!("{}/v1/messages", api_url.trim_end_matches('/'));
    let response = reqwest::Client::new()
        .post(url)
        .header("x-api-key", api_key)
        .header("anthropic-version", ANTHROPIC_VERSION)
        .header("Content-Type", "application/json")
        .timeout(Duration::from_secs(120))
        .json(&payload)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    Ok(response)
}

/// The first text content block of a reply, or an empty string when
/// the reply contains no text block.
pub fn first_text_block(response: &Value) -> String {
    response["content"]
        .as_array()
        .and_then(|blocks| blocks.iter().find(|block| block["type"] == "text"))
        .and_then(|block| block["text"].as_str())
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_message() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let _mock = server
            .mock("POST", "/v1/messages")
            .match_header("x-api-key", "test-api-key")
            .match_header("anthropic-version", ANTHROPIC_VERSION)
            .match_body(mockito::Matcher::PartialJson(json!({
                "model": "claude-sonnet-4-20250514",
                "system": "You are Otto.",
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"id": "msg_1", "content": [{"type": "text", "text": "Hi!"}], "stop_reason": "end_turn"}"#,
            )
            .create();

        let messages = vec![ChatMessage::new(Role::User, "hello")];
        let response = create_message(
            &messages,
            "You are Otto.",
            &url,
            "test-api-key",
            "claude-sonnet-4-20250514",
        )
        .await
        .unwrap();
        assert_eq!(first_text_block(&response), "Hi!");
    }

    #[test]
    fn test_first_text_block_skips_non_text_blocks() {
        let response = json!({
            "content": [
                {"type": "thinking", "thinking": "..."},
                {"type": "text", "text": "the reply"}
            ]
        });
        assert_eq!(first_text_block(&response), "the reply");
    }

    #[test]
    fn test_first_text_block_empty_when_no_text() {
        let response = json!({"content": [{"type": "tool_use", "id": "t1"}]});
        assert_eq!(first_text_block(&response), "");
        assert_eq!(first_text_block(&json!({})), "");
    }
}
