// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Log events and their persisted rendering.
//!
//! A [`LogEvent`] is one caller-submitted log occurrence, immutable once
//! constructed. Rendering produces the persisted textual line without ever
//! mutating the event, so the same event can be formatted repeatedly (e.g.
//! on a retried append) with identical output.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::constants::{DETAILS_MARKER, FIELD_SEPARATOR, TIMESTAMP_FORMAT};

/// The recognized level set, plus the explicit "none of the above" tag.
///
/// Level dispatch at ingestion is a single exhaustive match over this enum;
/// `Unrecognized` is the explicit no-write branch rather than a silent
/// fallthrough. Matching against the caller's level string is
/// case-sensitive: `info` is unrecognized, only `INFO` is not.
///
/// # Parsing
///
/// ```
/// use loghub_core::LogLevel;
///
/// assert_eq!(LogLevel::from_token("INFO"), LogLevel::Info);
/// assert_eq!(LogLevel::from_token("info"), LogLevel::Unrecognized);
/// assert_eq!(LogLevel::from_token("TRACE"), LogLevel::Unrecognized);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    /// Routine operational information.
    Info,
    /// A failure the emitting service wants recorded.
    Error,
    /// A hazardous but non-fatal condition.
    Warning,
    /// Diagnostic detail.
    Debug,
    /// Any other token. Ingesting an event with this tag performs no write.
    Unrecognized,
}

impl LogLevel {
    /// Maps a caller-supplied level string onto the recognized set,
    /// case-sensitively. Anything outside `INFO`/`ERROR`/`WARNING`/`DEBUG`
    /// is `Unrecognized`.
    #[must_use]
    pub fn from_token(token: &str) -> Self {
        match token {
            "INFO" => LogLevel::Info,
            "ERROR" => LogLevel::Error,
            "WARNING" => LogLevel::Warning,
            "DEBUG" => LogLevel::Debug,
            _ => LogLevel::Unrecognized,
        }
    }

    /// The token written into the persisted line, `None` for
    /// `Unrecognized` (which never reaches the file).
    #[must_use]
    pub fn as_token(&self) -> Option<&'static str> {
        match self {
            LogLevel::Info => Some("INFO"),
            LogLevel::Error => Some("ERROR"),
            LogLevel::Warning => Some("WARNING"),
            LogLevel::Debug => Some("DEBUG"),
            LogLevel::Unrecognized => None,
        }
    }
}

/// One log occurrence submitted by a caller, prior to formatting.
///
/// # Fields
///
/// - `service`: non-empty identifier; selects the destination and filename
/// - `level`: level string as supplied; recognized values are exactly
///   `INFO`, `ERROR`, `WARNING`, `DEBUG` (case-sensitive)
/// - `message`: free-form text
/// - `details`: optional mapping rendered compactly and appended to the
///   message at write time
/// - `timestamp`: optional; when absent the ingestion engine assigns the
///   current time at the moment of processing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEvent {
    pub service: String,
    pub level: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Map<String, serde_json::Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<NaiveDateTime>,
}

impl LogEvent {
    /// Tags this event's level string against the recognized set.
    #[must_use]
    pub fn level_tag(&self) -> LogLevel {
        LogLevel::from_token(&self.level)
    }

    /// The message with the details mapping (if any) rendered and appended.
    ///
    /// Details are rendered as compact JSON, which is deterministic for a
    /// given mapping, so the same event always produces the same line:
    ///
    /// ```
    /// use loghub_core::LogEvent;
    ///
    /// let mut details = serde_json::Map::new();
    /// details.insert("key".to_string(), serde_json::json!("value"));
    /// let event = LogEvent {
    ///     service: "api".to_string(),
    ///     level: "INFO".to_string(),
    ///     message: "Test info message".to_string(),
    ///     details: Some(details),
    ///     timestamp: None,
    /// };
    /// assert_eq!(
    ///     event.rendered_message(),
    ///     r#"Test info message - Details: {"key":"value"}"#
    /// );
    /// ```
    #[must_use]
    pub fn rendered_message(&self) -> String {
        let mut message = self.message.clone();
        if let Some(details) = &self.details {
            // Serializing a JSON map to a string cannot fail in practice;
            // if it ever does, the bare message is still written.
            if let Ok(compact) = serde_json::to_string(details) {
                message.push_str(DETAILS_MARKER);
                message.push_str(&compact);
            }
        }
        message
    }

    /// Renders the full persisted line (without the trailing newline) for
    /// the given assigned timestamp and level token.
    ///
    /// The caller resolves both inputs: the timestamp falls back to "now"
    /// when the event carries none, and the token comes from the exhaustive
    /// level match, so an unrecognized level can never be rendered.
    #[must_use]
    pub fn render_line(&self, timestamp: NaiveDateTime, level_token: &str) -> String {
        format!(
            "{}{sep}{}{sep}{}",
            timestamp.format(TIMESTAMP_FORMAT),
            level_token,
            self.rendered_message(),
            sep = FIELD_SEPARATOR,
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn timestamp(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn basic_event(level: &str, message: &str) -> LogEvent {
        LogEvent {
            service: "test_service".to_string(),
            level: level.to_string(),
            message: message.to_string(),
            details: None,
            timestamp: None,
        }
    }

    #[test]
    fn test_level_from_token_recognized() {
        assert_eq!(LogLevel::from_token("INFO"), LogLevel::Info);
        assert_eq!(LogLevel::from_token("ERROR"), LogLevel::Error);
        assert_eq!(LogLevel::from_token("WARNING"), LogLevel::Warning);
        assert_eq!(LogLevel::from_token("DEBUG"), LogLevel::Debug);
    }

    #[test]
    fn test_level_from_token_is_case_sensitive() {
        assert_eq!(LogLevel::from_token("info"), LogLevel::Unrecognized);
        assert_eq!(LogLevel::from_token("Info"), LogLevel::Unrecognized);
        assert_eq!(LogLevel::from_token("WARN"), LogLevel::Unrecognized);
        assert_eq!(LogLevel::from_token("TRACE"), LogLevel::Unrecognized);
        assert_eq!(LogLevel::from_token(""), LogLevel::Unrecognized);
    }

    #[test]
    fn test_level_token_round_trip() {
        for token in ["INFO", "ERROR", "WARNING", "DEBUG"] {
            assert_eq!(LogLevel::from_token(token).as_token(), Some(token));
        }
        assert_eq!(LogLevel::Unrecognized.as_token(), None);
    }

    #[test]
    fn test_rendered_message_without_details() {
        let event = basic_event("INFO", "Test info message");
        assert_eq!(event.rendered_message(), "Test info message");
    }

    #[test]
    fn test_rendered_message_with_details() {
        let mut event = basic_event("INFO", "Test info message");
        let mut details = serde_json::Map::new();
        details.insert("key".to_string(), serde_json::json!("value"));
        event.details = Some(details);

        assert_eq!(
            event.rendered_message(),
            r#"Test info message - Details: {"key":"value"}"#
        );
    }

    #[test]
    fn test_rendered_message_details_are_deterministic() {
        let mut event = basic_event("ERROR", "failed");
        let mut details = serde_json::Map::new();
        details.insert("error_code".to_string(), serde_json::json!(500));
        details.insert("retryable".to_string(), serde_json::json!(false));
        event.details = Some(details);

        let first = event.rendered_message();
        let second = event.rendered_message();
        assert_eq!(first, second);
    }

    #[test]
    fn test_render_line_layout() {
        let event = basic_event("ERROR", "Test error message");
        let line = event.render_line(timestamp("2023-01-01 10:01:00"), "ERROR");
        assert_eq!(line, "2023-01-01 10:01:00 - ERROR - Test error message");
    }

    #[test]
    fn test_render_line_does_not_mutate_event() {
        let mut event = basic_event("INFO", "message");
        let mut details = serde_json::Map::new();
        details.insert("key".to_string(), serde_json::json!("value"));
        event.details = Some(details.clone());

        let _ = event.render_line(timestamp("2023-01-01 10:00:00"), "INFO");

        assert_eq!(event.message, "message");
        assert_eq!(event.details, Some(details));
    }

    #[test]
    fn test_event_deserializes_iso_timestamp() {
        let event: LogEvent = serde_json::from_str(
            r#"{"service":"s","level":"INFO","message":"m","timestamp":"2023-01-01T10:00:00"}"#,
        )
        .unwrap();
        assert_eq!(
            event.timestamp,
            Some(timestamp("2023-01-01 10:00:00")),
        );
    }

    #[test]
    fn test_event_optional_fields_default_to_none() {
        let event: LogEvent =
            serde_json::from_str(r#"{"service":"s","level":"INFO","message":"m"}"#).unwrap();
        assert!(event.details.is_none());
        assert!(event.timestamp.is_none());
    }
}
