use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::Json;
use axum::body::Body;
use axum::extract::{ConnectInfo, State};
use axum::http::{HeaderMap, header};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use tracing::{debug, info, warn};

use crate::client_ip::resolve_client_ip;
use crate::error::ApiError;
use crate::metrics::{
    RATE_LIMITED_TOTAL, REQUEST_TOTAL, UPSTREAM_CONNECT_LATENCY, UPSTREAM_ERRORS_TOTAL,
};
use crate::models::{ChatMessage, ChatRequest, CompletionRequest};
use crate::relay::{self, FALLBACK_MESSAGE};
use crate::state::AppState;

// POST /api/chat handler. Admission first, then the upstream call; the
// response body streams fragments as the provider emits them.
pub async fn chat_handler(
    State(state): State<Arc<AppState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Json(payload): Json<ChatRequest>,
) -> Result<Response, ApiError> {
    REQUEST_TOTAL.inc();

    let client_ip = resolve_client_ip(&headers, Some(peer));
    if !state.rate_limiter.admit(&client_ip, Instant::now()) {
        RATE_LIMITED_TOTAL.inc();
        info!(%client_ip, "rate limit exceeded");
        return Err(ApiError::RateLimitExceeded {
            max: state.rate_limiter.max_requests(),
            window_secs: state.rate_limiter.window_secs(),
        });
    }

    let messages = assemble_messages(
        &payload.developer_message,
        payload.conversation_history,
        state.history_limit,
    );

    let request = CompletionRequest {
        model: resolve_model(payload.model, &state.default_model),
        messages,
        stream: true,
    };
    debug!(
        %client_ip,
        model = %request.model,
        message_count = request.messages.len(),
        user_message_len = payload.user_message.len(),
        "dispatching chat upstream"
    );

    let timer = UPSTREAM_CONNECT_LATENCY.start_timer();
    let upstream = relay::open_chat_stream(
        state.client.clone(),
        state.upstream_url.clone(),
        payload.api_key,
        request,
    )
    .await;
    timer.observe_duration();

    let upstream = upstream.map_err(|e| {
        UPSTREAM_ERRORS_TOTAL.inc();
        warn!(%client_ip, "upstream call failed: {e}");
        ApiError::Upstream(e)
    })?;

    let body = Body::from_stream(into_plain_text(upstream));
    Ok((
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        body,
    )
        .into_response())
}

// One system message first, then the most recent `limit` history entries in
// their original order. The history already ends with the latest user turn.
fn assemble_messages(
    developer_message: &str,
    history: Option<Vec<ChatMessage>>,
    limit: usize,
) -> Vec<ChatMessage> {
    let mut messages = vec![ChatMessage {
        role: "system".to_string(),
        content: developer_message.to_string(),
    }];

    let mut history = history.unwrap_or_default();
    if history.len() > limit {
        history.drain(..history.len() - limit);
    }
    messages.extend(history);

    messages
}

fn resolve_model(requested: Option<String>, default_model: &str) -> String {
    match requested {
        Some(model) if !model.is_empty() => model,
        _ => default_model.to_string(),
    }
}

// Map relay items onto the plain-text response body. Once streaming has
// started an error can no longer become a status code, so it degrades to
// one fallback fragment and the stream ends cleanly.
fn into_plain_text(
    upstream: impl Stream<Item = Result<String, String>>,
) -> impl Stream<Item = Result<Bytes, std::convert::Infallible>> {
    async_stream::stream! {
        let mut upstream = std::pin::pin!(upstream);
        while let Some(item) = upstream.next().await {
            match item {
                Ok(fragment) => yield Ok(Bytes::from(fragment)),
                Err(e) => {
                    warn!("upstream stream error after start: {e}");
                    yield Ok(Bytes::from_static(FALLBACK_MESSAGE.as_bytes()));
                    break;
                }
            }
        }
    }
}
