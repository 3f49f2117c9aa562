// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Errors surfaced by the core logging engine.

/// Errors that can occur while routing, appending, or retrieving logs.
///
/// The taxonomy is deliberately small: callers either passed something
/// malformed (`InvalidArgument`) or the filesystem failed (`Io`). An event
/// with an unrecognized level is NOT an error; ingestion reports it as
/// "not written" (`Ok(false)`) so one malformed event cannot break a batch.
#[derive(Debug, thiserror::Error)]
pub enum LogStoreError {
    /// A caller-supplied value is malformed: empty or unsafe service name,
    /// out-of-bounds pagination, inverted time range.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A filesystem create/open/append/read failed. Never swallowed on the
    /// write path.
    #[error("I/O failure while trying to {operation} for service '{service}': {source}")]
    Io {
        /// What the engine was doing when the failure occurred.
        operation: String,
        /// The service whose destination was involved.
        service: String,
        /// The underlying filesystem error.
        #[source]
        source: std::io::Error,
    },
}

impl LogStoreError {
    pub(crate) fn io(operation: &str, service: &str, source: std::io::Error) -> Self {
        LogStoreError::Io {
            operation: operation.to_string(),
            service: service.to_string(),
            source,
        }
    }

    /// True for the `InvalidArgument` variant. Transports map this to a
    /// client error status, `Io` to a server error status.
    #[must_use]
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, LogStoreError::InvalidArgument(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_argument_display() {
        let error = LogStoreError::InvalidArgument("limit must be positive".to_string());
        assert_eq!(error.to_string(), "invalid argument: limit must be positive");
        assert!(error.is_invalid_argument());
    }

    #[test]
    fn test_io_display_includes_operation_and_service() {
        let error = LogStoreError::io(
            "append a log line",
            "payments",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        let rendered = error.to_string();
        assert!(rendered.contains("append a log line"));
        assert!(rendered.contains("payments"));
        assert!(!error.is_invalid_argument());
    }

    #[test]
    fn test_io_preserves_source() {
        use std::error::Error;

        let error = LogStoreError::io(
            "read log file",
            "api",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(error.source().is_some());
    }
}
