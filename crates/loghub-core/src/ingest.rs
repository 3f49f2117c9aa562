// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Ingestion engine and batch adapter.
//!
//! The write half of the core: an event is resolved to its destination,
//! rendered into one line, and appended. Level dispatch is a single
//! exhaustive match; an unrecognized level is an explicit no-write branch
//! reported as `Ok(false)`, not an error, so callers that need stricter
//! validation do it before calling [`IngestionEngine::ingest`].

use std::sync::Arc;

use chrono::Local;
use tracing::{debug, warn};

use crate::error::LogStoreError;
use crate::event::{LogEvent, LogLevel};
use crate::registry::DestinationRegistry;

/// Outcome of a batch ingestion.
///
/// `attempted` always echoes the number of submitted events, matching the
/// service's historical batch contract; the remaining fields break the
/// attempt down so callers can see exactly which events failed instead of
/// having failures silently swallowed.
#[derive(Debug)]
pub struct BatchReceipt {
    /// Number of events submitted (always the input length).
    pub attempted: usize,
    /// Events durably written.
    pub written: usize,
    /// Events skipped because their level was unrecognized.
    pub skipped: usize,
    /// Per-event failures, as (input index, error) pairs.
    pub failures: Vec<(usize, LogStoreError)>,
}

impl BatchReceipt {
    /// Number of events that failed with an error.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.failures.len()
    }
}

/// Validates, formats, and appends incoming events.
///
/// Cheap to construct; holds only a handle to the shared registry. Built
/// once at service start and handed to the transport layer.
#[derive(Debug)]
pub struct IngestionEngine {
    registry: Arc<DestinationRegistry>,
}

impl IngestionEngine {
    #[must_use]
    pub fn new(registry: Arc<DestinationRegistry>) -> Self {
        IngestionEngine { registry }
    }

    /// Ingests one event.
    ///
    /// Returns `Ok(true)` when a line was durably appended, `Ok(false)`
    /// when the event's level is unrecognized (nothing is written), and
    /// an error when destination resolution or the append itself fails.
    ///
    /// Events ingested sequentially for one service persist in that same
    /// order; there is no ordering guarantee across services.
    pub async fn ingest(&self, event: &LogEvent) -> Result<bool, LogStoreError> {
        let destination = self.registry.get(&event.service).await?;

        let level_token = match event.level_tag() {
            LogLevel::Info => "INFO",
            LogLevel::Error => "ERROR",
            LogLevel::Warning => "WARNING",
            LogLevel::Debug => "DEBUG",
            LogLevel::Unrecognized => {
                debug!(
                    "Skipping event for service '{}': unrecognized level '{}'",
                    event.service, event.level
                );
                return Ok(false);
            }
        };

        let timestamp = event
            .timestamp
            .unwrap_or_else(|| Local::now().naive_local());
        let line = event.render_line(timestamp, level_token);

        destination.append_line(&line).await?;
        Ok(true)
    }

    /// Fans a batch out to [`ingest`](Self::ingest), one event at a time.
    ///
    /// Per-event isolation: a failure on one event (including an I/O
    /// failure on one destination) never aborts the remaining events;
    /// batches span multiple services and one service's storage trouble
    /// must not blind-spot the rest. Failures are recorded in the receipt
    /// and logged here.
    pub async fn ingest_batch(&self, events: &[LogEvent]) -> BatchReceipt {
        let mut receipt = BatchReceipt {
            attempted: events.len(),
            written: 0,
            skipped: 0,
            failures: Vec::new(),
        };

        for (index, event) in events.iter().enumerate() {
            match self.ingest(event).await {
                Ok(true) => receipt.written += 1,
                Ok(false) => receipt.skipped += 1,
                Err(e) => {
                    warn!(
                        "Batch event {index} for service '{}' failed: {e}",
                        event.service
                    );
                    receipt.failures.push((index, e));
                }
            }
        }

        receipt
    }
}
