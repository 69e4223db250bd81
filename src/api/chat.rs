//! JSON and SSE chat endpoints

use std::convert::Infallible;

use axum::{
    extract::State,
    http::{header, HeaderName},
    response::{
        sse::{Event, Sse},
        IntoResponse,
    },
};
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, info, warn};

use super::state::AppState;
use super::types::{ApiError, ChatPayload, ChatReply, Json};
use crate::infrastructure::services::{error_reply, ChatbotServiceTrait};

/// Answer the latest user message; failures come back as an `Error: ...` reply
pub async fn chat_json(
    State(state): State<AppState>,
    Json(payload): Json<ChatPayload>,
) -> Result<Json<ChatReply>, ApiError> {
    let question = question_of(&payload)?;
    info!(session_id = ?payload.session_id, "Chat request");

    let reply = answer(state.chatbot.as_ref(), payload.session_id.as_deref(), question).await;
    Ok(Json(ChatReply { reply }))
}

/// Stream the answer one character per SSE event, then `[DONE]`
pub async fn chat_stream(
    State(state): State<AppState>,
    Json(payload): Json<ChatPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let question = question_of(&payload)?.to_string();
    info!(session_id = ?payload.session_id, "Streaming chat request");

    let (tx, rx) = tokio::sync::mpsc::channel::<Result<Event, Infallible>>(32);
    let chatbot = state.chatbot.clone();
    let delay = state.stream_delay;
    let session_id = payload.session_id;

    tokio::spawn(async move {
        let reply = answer(chatbot.as_ref(), session_id.as_deref(), &question).await;

        // SSE data may not carry carriage returns
        for ch in reply.chars().filter(|c| *c != '\r') {
            if tx.send(Ok(Event::default().data(ch.to_string()))).await.is_err() {
                debug!("Client disconnected, stopping stream");
                return;
            }
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }

        let _ = tx.send(Ok(Event::default().data("[DONE]"))).await;
    });

    let headers = [
        (header::CACHE_CONTROL, "no-cache"),
        (HeaderName::from_static("x-accel-buffering"), "no"),
    ];

    Ok((headers, Sse::new(ReceiverStream::new(rx))))
}

fn question_of(payload: &ChatPayload) -> Result<&str, ApiError> {
    payload
        .last_user_content()
        .ok_or_else(|| ApiError::bad_request("messages must contain a user message").with_code("no_user_message"))
}

pub(crate) async fn answer(
    chatbot: &dyn ChatbotServiceTrait,
    session_id: Option<&str>,
    question: &str,
) -> String {
    let result = match session_id {
        Some(id) => chatbot.ask_in_session(id, question).await,
        None => chatbot.ask(question).await,
    };

    result.unwrap_or_else(|e| {
        warn!(error = %e, "Chat request failed");
        error_reply(&e)
    })
}
