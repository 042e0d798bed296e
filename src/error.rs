//! Error types for gemrelay.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

/// Result type alias for gemrelay operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for gemrelay.
///
/// Every variant maps to a terminal JSON response; nothing is retried. The
/// response bodies are part of the wire contract consumed by the browser
/// client, so the strings here must stay stable.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("API key missing from environment")]
    MissingApiKey,

    #[error("Missing or invalid chatHistory array in request body")]
    InvalidChatHistory,

    #[error("Gemini API call failed with status {status}")]
    Upstream {
        status: u16,
        details: serde_json::Value,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::MissingApiKey => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({
                    "error": "Server configuration error: API Key missing.",
                })),
            )
                .into_response(),

            Error::InvalidChatHistory => (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({
                    "error": "Missing or invalid chatHistory array in request body.",
                })),
            )
                .into_response(),

            Error::Upstream { status, details } => {
                // Relay the upstream status verbatim; an out-of-range code
                // falls back to 502.
                let status =
                    StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
                (
                    status,
                    Json(serde_json::json!({
                        "error": "Gemini API call failed",
                        "details": details,
                    })),
                )
                    .into_response()
            }

            Error::Internal(message) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({
                    "error": "Internal Server Error",
                    "message": message,
                })),
            )
                .into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> (StatusCode, serde_json::Value) {
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), 1_048_576)
            .await
            .expect("read body");
        (status, serde_json::from_slice(&bytes).expect("json body"))
    }

    #[tokio::test]
    async fn missing_api_key_response() {
        let (status, json) = body_json(Error::MissingApiKey.into_response()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"], "Server configuration error: API Key missing.");
    }

    #[tokio::test]
    async fn invalid_chat_history_response() {
        let (status, json) = body_json(Error::InvalidChatHistory.into_response()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            json["error"],
            "Missing or invalid chatHistory array in request body."
        );
    }

    #[tokio::test]
    async fn upstream_error_relays_status_and_details() {
        let err = Error::Upstream {
            status: 429,
            details: serde_json::json!({"error": "rate limited"}),
        };
        let (status, json) = body_json(err.into_response()).await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(json["error"], "Gemini API call failed");
        assert_eq!(json["details"]["error"], "rate limited");
    }

    #[tokio::test]
    async fn internal_error_carries_message() {
        let err = Error::Internal("connection reset".to_string());
        let (status, json) = body_json(err.into_response()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"], "Internal Server Error");
        assert_eq!(json["message"], "connection reset");
    }
}
