use displaydoc::Display;
use htmd::HtmlToMarkdown;
use http::StatusCode;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;

use super::RawResponse;

/// Longest raw-body excerpt shown to a user.
const MAX_RAW_MESSAGE: usize = 200;

lazy_static! {
    // Matches `"message": "..."` or `"error": "..."` in bodies that are not
    // valid JSON as a whole (truncated, or JSON embedded in text).
    static ref MESSAGE_FIELD: Regex =
        Regex::new(r#""(?:message|error)"\s*:\s*"((?:[^"\\]|\\.)*)""#).unwrap();
}

/// A failed API call. `Display` is the message shown to the user.
#[derive(Debug, Clone, Display, PartialEq)]
pub enum ApiError {
    /// {message}
    Status { status: StatusCode, message: String },

    /// {0}
    Rejected(String),

    /// {0}
    Transport(String),

    /// {context}
    Decode { context: String, detail: String },
}

impl std::error::Error for ApiError {}

// A request that never produced an HTTP response.
#[derive(Debug, Clone, Display, PartialEq)]
/// {0}
pub struct TransportError(pub String);

impl std::error::Error for TransportError {}

impl From<TransportError> for ApiError {
    fn from(e: TransportError) -> Self {
        ApiError::Transport(e.0)
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Picks the message for a non-2xx response: the `message` of a JSON error
/// body, then the status text, then whatever the raw body yields, then
/// `fallback`.
pub fn derive_message(response: &RawResponse, fallback: &str) -> String {
    if let Some(message) = structured_message(&response.body) {
        return message;
    }
    let status_text = response.status_text.trim();
    if !status_text.is_empty() {
        return status_text.to_string();
    }
    raw_message(&response.body).unwrap_or_else(|| fallback.to_string())
}

fn structured_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .filter(|m| !m.trim().is_empty())
}

fn raw_message(body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }

    if let Some(captures) = MESSAGE_FIELD.captures(body) {
        let message = captures[1].replace("\\\"", "\"").replace("\\n", "\n");
        if !message.trim().is_empty() {
            return Some(message);
        }
    }

    let text = if body.starts_with('<') {
        HtmlToMarkdown::builder()
            .skip_tags(vec!["script", "style"])
            .build()
            .convert(body)
            .ok()?
    } else {
        body.to_string()
    };

    text.lines()
        .map(|line| line.trim().trim_start_matches('#').trim())
        .find(|line| !line.is_empty())
        .map(|line| line.chars().take(MAX_RAW_MESSAGE).collect())
}
