//! Decoding of the agent's structured output envelope.

use serde_json::{Map, Value};
use tracing::warn;

/// Envelope fields holding the response text, in priority order.
pub const RESPONSE_FIELDS: &[&str] = &["result", "content", "response"];

/// Envelope fields holding the session identifier, in priority order.
pub const SESSION_FIELDS: &[&str] = &["sessionId", "session_id"];

/// What the agent printed, after decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedResponse {
    /// stdout was a JSON object envelope.
    Structured {
        text: String,
        session_id: Option<String>,
    },
    /// stdout was not an envelope; the whole output is the response.
    Raw(String),
}

impl ParsedResponse {
    /// Split into `(response_text, session_id)`.
    pub fn into_parts(self) -> (String, Option<String>) {
        match self {
            ParsedResponse::Structured { text, session_id } => (text, session_id),
            ParsedResponse::Raw(text) => (text, None),
        }
    }

    pub fn is_structured(&self) -> bool {
        matches!(self, ParsedResponse::Structured { .. })
    }
}

/// Decode agent stdout.
///
/// A JSON object yields `Structured`: the text is the first non-empty string
/// among [`RESPONSE_FIELDS`] (falling back to the full stdout) and the session
/// id the first non-empty string among [`SESSION_FIELDS`]. Anything else,
/// including valid JSON that is not an object, degrades to `Raw`.
pub fn parse(stdout: &str) -> ParsedResponse {
    match serde_json::from_str::<Value>(stdout) {
        Ok(Value::Object(envelope)) => ParsedResponse::Structured {
            text: first_string(&envelope, RESPONSE_FIELDS).unwrap_or_else(|| stdout.to_string()),
            session_id: first_string(&envelope, SESSION_FIELDS),
        },
        Ok(other) => {
            warn!(kind = json_kind(&other), "agent output is JSON but not an object, using raw text");
            ParsedResponse::Raw(stdout.to_string())
        }
        Err(e) => {
            warn!(error = %e, "agent output is not JSON, using raw text");
            ParsedResponse::Raw(stdout.to_string())
        }
    }
}

fn first_string(envelope: &Map<String, Value>, fields: &[&str]) -> Option<String> {
    fields
        .iter()
        .filter_map(|field| envelope.get(*field).and_then(Value::as_str))
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
