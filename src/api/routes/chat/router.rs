//! Router for the chat API

use std::sync::{Arc, RwLock};

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use serde_json::{Value, json};

use super::public;
use crate::anthropic::{self, ChatMessage};
use crate::api::session::AuthSession;
use crate::api::state::AppState;
use crate::calendar;
use crate::chat::commands;
use crate::chat::prompt;

type SharedState = Arc<RwLock<AppState>>;

/// How much calendar context gets injected into the system prompt
const UPCOMING_EVENTS_LIMIT: u32 = 15;
const UPCOMING_DAYS_AHEAD: i64 = 14;

fn bad_request(reason: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        axum::Json(json!({ "error": reason })),
    )
        .into_response()
}

/// Run one chat turn: inject calendar context into the system prompt,
/// get the next assistant message, apply any event commands it
/// contains, and return the cleaned reply.
async fn chat_handler(
    State(state): State<SharedState>,
    session: AuthSession,
    axum::Json(payload): axum::Json<Value>,
) -> Result<Response, crate::api::public::ApiError> {
    let Some(raw_messages) = payload.get("messages").and_then(Value::as_array) else {
        return Ok(bad_request("Messages are required"));
    };
    let messages: Vec<ChatMessage> =
        match serde_json::from_value(Value::Array(raw_messages.clone())) {
            Ok(messages) => messages,
            Err(_) => return Ok(bad_request("Malformed messages")),
        };

    let (db, config) = {
        let shared_state = state.read().expect("Unable to read shared state");
        (shared_state.db.clone(), shared_state.config.clone())
    };

    let connection = calendar::connection_for_subject(&db, &session.subject).await?;
    let connected = connection.is_some();

    // Calendar trouble downgrades the feature, never the request
    let events_text = if connected {
        match calendar::upcoming_events(
            &db,
            &config,
            &session.subject,
            UPCOMING_EVENTS_LIMIT,
            UPCOMING_DAYS_AHEAD,
        )
        .await
        {
            Ok(events) => calendar::format_events_for_chat(&events),
            Err(reason) => {
                tracing::warn!("Proceeding without calendar context: {}", reason);
                "No upcoming events found.".to_string()
            }
        }
    } else {
        String::new()
    };

    let user_name = session.name.as_deref().unwrap_or("there");
    let system = prompt::system_prompt(user_name, connected, &events_text)?;

    let response = anthropic::create_message(
        &messages,
        &system,
        &config.anthropic_api_url,
        &config.anthropic_api_key,
        &config.anthropic_model,
    )
    .await?;
    let reply = anthropic::first_text_block(&response);

    let (cleaned, parsed_commands) = commands::extract_event_commands(&reply);

    let mut added = Vec::new();
    if connected {
        for command in &parsed_commands {
            let Some(event) = command.to_new_event() else {
                continue;
            };
            match calendar::create_event(&db, &config, &session.subject, &event).await {
                Ok(_) => added.push(event.title),
                Err(reason) => {
                    tracing::warn!("Failed to create event \"{}\": {}", event.title, reason)
                }
            }
        }
    }

    let content = if added.is_empty() {
        cleaned
    } else {
        format!("{}\n\nAdded to your calendar: {}", cleaned, added.join(", "))
    };

    Ok(axum::Json(public::ChatResponse { content }).into_response())
}

/// Create the chat router
pub fn router() -> Router<SharedState> {
    Router::new().route("/", post(chat_handler))
}
