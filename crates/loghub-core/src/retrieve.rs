// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Retrieval engine: filtered, paginated reads of persisted logs.
//!
//! Retrieval always goes back to storage: it reads the service's file as
//! currently flushed, never any in-memory buffer, so it observes exactly
//! what has been durably appended at call time (no snapshot isolation
//! against concurrent in-flight appends).
//!
//! # Filter composition
//!
//! The level filter and the time filter compose with logical AND, each
//! applied as an early return per line:
//! - **Level**: exact token equality against the second ` - `-delimited
//!   field. `INFO` can never match a `WARNING` line, and a line with no
//!   parsable level field never matches an active level filter.
//! - **Time**: the leading timestamp must fall within `[start, end]`
//!   inclusive. Lines with an unparsable leading timestamp are excluded
//!   while a time filter is active and retained otherwise.
//!
//! `total` counts lines after filtering and before pagination, so callers
//! can page through a filtered view with a stable denominator.

use std::sync::Arc;

use chrono::NaiveDateTime;
use tracing::debug;

use crate::constants::{DEFAULT_PAGE_LIMIT, FIELD_SEPARATOR, MAX_PAGE_LIMIT, TIMESTAMP_FORMAT};
use crate::error::LogStoreError;
use crate::registry::{validate_service_name, DestinationRegistry};

/// Filter and pagination parameters for one retrieval.
#[derive(Debug, Clone)]
pub struct RetrieveQuery {
    /// Keep only lines whose level token equals this value exactly.
    pub level: Option<String>,
    /// Keep only lines stamped at or after this time.
    pub start_time: Option<NaiveDateTime>,
    /// Keep only lines stamped at or before this time.
    pub end_time: Option<NaiveDateTime>,
    /// Maximum lines returned; must be in `1..=`[`MAX_PAGE_LIMIT`].
    pub limit: usize,
    /// Filtered lines to skip before the page starts.
    pub offset: usize,
}

impl Default for RetrieveQuery {
    fn default() -> Self {
        RetrieveQuery {
            level: None,
            start_time: None,
            end_time: None,
            limit: DEFAULT_PAGE_LIMIT,
            offset: 0,
        }
    }
}

impl RetrieveQuery {
    /// Rejects out-of-bounds pagination and inverted time ranges.
    ///
    /// Bounds are rejected, never silently clamped: `limit` of zero or
    /// above [`MAX_PAGE_LIMIT`] is an `InvalidArgument`. Negative values
    /// cannot reach this type and are rejected at the transport boundary.
    pub fn validate(&self) -> Result<(), LogStoreError> {
        if self.limit == 0 {
            return Err(LogStoreError::InvalidArgument(
                "limit must be greater than 0".to_string(),
            ));
        }
        if self.limit > MAX_PAGE_LIMIT {
            return Err(LogStoreError::InvalidArgument(format!(
                "limit must not exceed {MAX_PAGE_LIMIT}"
            )));
        }
        if let (Some(start), Some(end)) = (self.start_time, self.end_time) {
            if start > end {
                return Err(LogStoreError::InvalidArgument(
                    "start_time must not be after end_time".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// One page of retrieved lines plus the filtered total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogPage {
    /// The requested slice, in file order (oldest first).
    pub lines: Vec<String>,
    /// Count of matching lines before pagination.
    pub total: usize,
}

impl LogPage {
    fn empty() -> Self {
        LogPage {
            lines: Vec::new(),
            total: 0,
        }
    }
}

/// Reads a service's persisted log back with filters and pagination.
#[derive(Debug)]
pub struct RetrievalEngine {
    registry: Arc<DestinationRegistry>,
}

impl RetrievalEngine {
    #[must_use]
    pub fn new(registry: Arc<DestinationRegistry>) -> Self {
        RetrievalEngine { registry }
    }

    /// Retrieves a filtered, paginated slice of a service's log.
    ///
    /// A service that has never logged returns an empty page with
    /// `total == 0`; absence of prior logs is not an error. A read
    /// failure (file vanished after the existence check, permissions,
    /// undecodable bytes) surfaces as an I/O failure, kept distinct from
    /// the empty case.
    pub async fn retrieve(
        &self,
        service: &str,
        query: &RetrieveQuery,
    ) -> Result<LogPage, LogStoreError> {
        validate_service_name(service)?;
        query.validate()?;

        let path = self.registry.log_path(service);
        match tokio::fs::try_exists(&path).await {
            Ok(true) => {}
            Ok(false) => {
                debug!("No log file yet for service '{service}', returning empty page");
                return Ok(LogPage::empty());
            }
            Err(e) => return Err(LogStoreError::io("check for the log file", service, e)),
        }

        let contents = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| LogStoreError::io("read the log file", service, e))?;

        let matching: Vec<&str> = contents
            .lines()
            .filter(|line| line_matches(line, query))
            .collect();
        let total = matching.len();

        let lines = matching
            .into_iter()
            .skip(query.offset)
            .take(query.limit)
            .map(str::to_owned)
            .collect();

        Ok(LogPage { lines, total })
    }
}

/// Splits a line into its leading timestamp and level token, if present.
///
/// Both fields are positional: everything before the first ` - ` is the
/// timestamp candidate, the field between the first and second ` - ` is
/// the level candidate. The message may contain the separator freely.
fn line_parts(line: &str) -> (Option<NaiveDateTime>, Option<&str>) {
    let Some((leading, rest)) = line.split_once(FIELD_SEPARATOR) else {
        return (None, None);
    };
    let timestamp = NaiveDateTime::parse_from_str(leading, TIMESTAMP_FORMAT).ok();
    let level = rest.split_once(FIELD_SEPARATOR).map(|(token, _)| token);
    (timestamp, level)
}

fn line_matches(line: &str, query: &RetrieveQuery) -> bool {
    let (timestamp, level) = line_parts(line);

    if let Some(wanted) = &query.level {
        if level != Some(wanted.as_str()) {
            return false;
        }
    }

    if query.start_time.is_some() || query.end_time.is_some() {
        // Lines without a parsable timestamp cannot be placed in the
        // range, so an active time filter excludes them.
        let Some(timestamp) = timestamp else {
            return false;
        };
        if let Some(start) = query.start_time {
            if timestamp < start {
                return false;
            }
        }
        if let Some(end) = query.end_time {
            if timestamp > end {
                return false;
            }
        }
    }

    true
}
