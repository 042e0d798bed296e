//! Wire types for the chat endpoint and the upstream payload builder.

use serde_json::{json, Value};

/// Persona used when the client does not supply a system prompt.
pub const DEFAULT_SYSTEM_PROMPT: &str =
    "Ты — Личный Тренер по развитию, который мотивирует, поддерживает и дает полезные советы.";

/// Inbound chat request body.
///
/// `chat_history` is kept as an opaque JSON value: the handler only validates
/// that it is a non-empty array and passes the entries through to the upstream
/// API unchanged. Modeling entries as typed structs would couple this proxy to
/// the upstream schema for no benefit.
#[derive(Debug, Clone, Default)]
pub struct ChatRequest {
    pub chat_history: Option<Value>,
    pub system_prompt: Option<String>,
}

impl ChatRequest {
    /// Pull the two known fields out of an already-parsed body.
    ///
    /// Tolerant of any top-level shape: a scalar or array body simply has no
    /// `chatHistory` field, which validation reports as a client error rather
    /// than a server fault.
    pub fn from_body(body: &Value) -> Self {
        Self {
            chat_history: body.get("chatHistory").cloned(),
            system_prompt: body
                .get("systemPrompt")
                .and_then(Value::as_str)
                .map(str::to_string),
        }
    }

    /// Validate the top-level shape and return the history entries.
    ///
    /// Present, an array, and non-empty -- anything else is a client error.
    pub fn history_entries(&self) -> Option<&[Value]> {
        self.chat_history
            .as_ref()
            .and_then(|v| v.as_array())
            .filter(|entries| !entries.is_empty())
            .map(|entries| entries.as_slice())
    }
}

/// Build the Gemini generateContent payload.
///
/// `contents` is the chat history verbatim; `tools` enables web-search
/// grounding; `systemInstruction` carries the client prompt or the default
/// persona.
pub fn build_upstream_payload(chat_history: &[Value], system_prompt: Option<&str>) -> Value {
    json!({
        "contents": chat_history,
        "tools": [{ "google_search": {} }],
        "systemInstruction": {
            "parts": [{ "text": system_prompt.unwrap_or(DEFAULT_SYSTEM_PROMPT) }]
        },
    })
}
