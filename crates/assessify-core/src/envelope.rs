//! The uniform response envelope returned to callers.
//!
//! Success and failure share one shape: `{success, message, data}`, with
//! `data` carrying the payload on success and literal `false` on failure.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Response messages used by the engine.
pub mod messages {
    pub const EVIDENCE_FETCHED: &str = "Evidence fetched successfully.";
    pub const PAGE_QUESTIONS_FETCHED: &str = "Page questions fetched successfully.";
}

/// The uniform `{success, message, data}` envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse {
    pub success: bool,
    pub message: String,
    pub data: Value,
}

impl ApiResponse {
    /// A success envelope wrapping a serializable payload.
    pub fn ok(message: &str, data: impl Serialize) -> Self {
        ApiResponse {
            success: true,
            message: message.to_string(),
            data: serde_json::to_value(data).unwrap_or(Value::Null),
        }
    }

    /// A failure envelope; `data` is the literal `false`.
    pub fn failure(message: &str) -> Self {
        ApiResponse {
            success: false,
            message: message.to_string(),
            data: Value::Bool(false),
        }
    }
}
