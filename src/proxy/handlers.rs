//! HTTP request handlers.

use axum::{
    body::Bytes,
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde_json::Value;

use super::server::AppState;
use super::types::{build_upstream_payload, ChatRequest};
use crate::config::ApiKey;
use crate::error::Error;

/// Handle POST /api/chat
///
/// Takes the raw body rather than the `Json` extractor so that a malformed
/// body lands in the internal-error path with the contract's JSON shape
/// instead of an extractor rejection.
pub async fn chat(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Value>, Error> {
    // Credential first: a request with a broken body but no server key should
    // still report the configuration error.
    let api_key = ApiKey::from_env(&state.config.upstream.api_key_env).ok_or_else(|| {
        tracing::error!(
            var = %state.config.upstream.api_key_env,
            "API key is not set in environment variables"
        );
        Error::MissingApiKey
    })?;

    let raw: Value = serde_json::from_slice(&body)
        .map_err(|e| Error::Internal(format!("Failed to parse request body: {}", e)))?;

    // A null body has no fields to read at all; anything else is inspected
    // for the known fields, and a missing chatHistory is the client's error.
    if raw.is_null() {
        return Err(Error::Internal(
            "Request body must not be null".to_string(),
        ));
    }

    let request = ChatRequest::from_body(&raw);

    let history = request
        .history_entries()
        .ok_or(Error::InvalidChatHistory)?;

    tracing::info!(
        turns = history.len(),
        has_system_prompt = request.system_prompt.is_some(),
        "Received chat request"
    );

    let payload = build_upstream_payload(history, request.system_prompt.as_deref());

    forward_to_upstream(&state, &api_key, &payload).await
}

/// Forward the built payload to the Gemini API and relay the response.
///
/// One best-effort attempt: network faults and unparseable bodies become
/// internal errors, non-2xx statuses are relayed verbatim with the upstream
/// body attached, and a 2xx body passes through unmodified.
async fn forward_to_upstream(
    state: &AppState,
    api_key: &ApiKey,
    payload: &Value,
) -> Result<Json<Value>, Error> {
    let upstream_response = state
        .http_client
        .post(&state.config.upstream.endpoint)
        .query(&[("key", api_key.expose_secret())])
        .header(header::CONTENT_TYPE, "application/json")
        .json(payload)
        .send()
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to reach Gemini API");
            Error::Internal(format!("Failed to reach Gemini API: {}", e))
        })?;

    let status = upstream_response.status();

    // The upstream reports errors as JSON too, so parse regardless of status.
    let data: Value = upstream_response.json().await.map_err(|e| {
        tracing::error!(error = %e, "Failed to parse Gemini API response");
        Error::Internal(format!("Failed to parse Gemini API response: {}", e))
    })?;

    if !status.is_success() {
        tracing::error!(status = %status, body = %data, "Gemini API returned error");
        return Err(Error::Upstream {
            status: status.as_u16(),
            details: data,
        });
    }

    Ok(Json(data))
}

/// Fallback for any non-POST method on the chat route.
pub async fn method_not_allowed() -> impl IntoResponse {
    (StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed")
}

/// Handle GET /health
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "gemrelay"
    }))
}
