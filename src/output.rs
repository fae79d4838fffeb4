// Output formatting — the JSON report printed once per invocation.

use serde::Serialize;

use crate::error::Error;

/// Reason reported when an exempt role short-circuits analysis.
pub const EXEMPT_REASON: &str = "Authority Exempt (Teacher/Admin)";

/// Reason reported when the full pipeline ran.
pub const ANALYZED_REASON: &str = "Successfully analyzed";

/// The single result record of a `check` invocation.
///
/// Field names follow the wire contract consumed by the calling application,
/// hence camelCase. `isAggressive` only appears on the evaluated path and is
/// a reserved placeholder, always false.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub transcribed_text: String,
    pub toxicity_score: f64,
    pub role_detected: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_aggressive: Option<bool>,
    pub reason: String,
}

impl Report {
    /// Report for an exempt role: no analysis ran, score is exactly 0.0.
    pub fn exempt(transcribed_text: String, role_detected: String) -> Self {
        Self {
            transcribed_text,
            toxicity_score: 0.0,
            role_detected,
            is_aggressive: None,
            reason: EXEMPT_REASON.to_string(),
        }
    }

    /// Report for a fully evaluated request. The score is rounded here so
    /// every evaluated report carries at most 4 decimal places.
    pub fn evaluated(transcribed_text: String, toxicity_score: f64, role_detected: String) -> Self {
        Self {
            transcribed_text,
            toxicity_score: round4(toxicity_score),
            role_detected,
            is_aggressive: Some(false),
            reason: ANALYZED_REASON.to_string(),
        }
    }
}

/// The JSON object printed on any failure: `{"error": "<kind>: <message>"}`.
#[derive(Debug, Serialize)]
pub struct ErrorReport {
    pub error: String,
}

impl ErrorReport {
    pub fn new(error: &Error) -> Self {
        Self {
            error: error.to_string(),
        }
    }
}

/// Round to 4 decimal places.
pub fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

/// Truncate a string to at most `max_chars` characters, appending "..." if
/// truncated. Respects UTF-8 character boundaries, so multi-byte characters
/// never cause a panic.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    let char_count = text.chars().count();
    if char_count <= max_chars {
        text.to_string()
    } else {
        let truncated: String = text.chars().take(max_chars).collect();
        format!("{truncated}...")
    }
}
