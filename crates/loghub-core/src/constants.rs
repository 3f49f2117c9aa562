// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Constants pinning the persisted line format and retrieval bounds.
//!
//! The line layout is shared between the write path ([`crate::ingest`]) and
//! the read path ([`crate::retrieve`]); retrieval's level and time filters
//! parse lines positionally using these separators, so changing any of them
//! silently breaks filtering of previously written files.

/// Format of the timestamp that leads every persisted line.
///
/// # Value: `%Y-%m-%d %H:%M:%S`
///
/// Example: `2023-01-01 10:00:00`. Retrieval parses the leading field of
/// each line with this format when a time filter is active; lines whose
/// leading field does not parse are excluded from time-filtered results.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Separator between the timestamp, level, and message fields of a line.
///
/// A persisted line is `<timestamp> - <LEVEL> - <message>`; the first two
/// ` - `-delimited fields are positional, the message may itself contain
/// the separator.
pub const FIELD_SEPARATOR: &str = " - ";

/// Marker inserted between a message and its rendered details mapping.
///
/// When an event carries a `details` object, the compact JSON rendering is
/// appended to the message as ` - Details: {"key":"value"}`.
pub const DETAILS_MARKER: &str = " - Details: ";

/// Extension of per-service log files under the log root.
pub const LOG_FILE_EXTENSION: &str = "log";

/// Number of lines returned by a retrieval when no limit is given.
pub const DEFAULT_PAGE_LIMIT: usize = 100;

/// Largest accepted retrieval limit.
///
/// # Value: 1,000 lines
///
/// Requests above this bound are rejected with
/// [`crate::LogStoreError::InvalidArgument`] rather than silently clamped,
/// so callers learn about the bound instead of receiving a shorter page
/// than they asked for.
pub const MAX_PAGE_LIMIT: usize = 1000;
