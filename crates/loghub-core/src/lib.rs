// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! # loghub-core
//!
//! Core engine of the loghub centralized logging service: routes structured
//! log events to per-service append-only files and reads them back with
//! filtering and pagination.
//!
//! ## Overview
//!
//! The crate is organized around four components:
//! - [`registry`]: maps a service name to its single append-only
//!   [`registry::Destination`], created lazily and cached for the process
//!   lifetime
//! - [`ingest`]: validates and formats an incoming [`event::LogEvent`] and
//!   appends it durably, in order, via the registry; includes the batch
//!   adapter with per-event failure isolation
//! - [`retrieve`]: scans a service's persisted log file and returns a
//!   filtered, paginated slice
//! - [`error`]: the shared [`error::LogStoreError`] taxonomy
//!
//! The HTTP transport lives in the `loghub-server` crate; this crate only
//! deals in already-decoded events and queries.
//!
//! ## Persisted format
//!
//! One plain-text file per service under a configured root directory, one
//! line per event:
//!
//! ```text
//! 2023-01-01 10:00:00 - INFO - Request completed - Details: {"status":200}
//! ```
//!
//! The textual layout is load-bearing for retrieval's filters and must stay
//! stable; see [`constants`] for the pinned pieces.

#![deny(clippy::all)]
#![deny(clippy::unwrap_used)]
#![deny(unused_extern_crates)]
#![deny(unreachable_pub)]

/// Pinned pieces of the persisted line format and pagination bounds
pub mod constants;

/// Error taxonomy shared by every core operation
pub mod error;

/// Log events, the level tag, and line rendering
pub mod event;

/// Ingestion engine and the batch adapter
pub mod ingest;

/// Per-service destination registry
pub mod registry;

/// Retrieval engine: filters and pagination over persisted lines
pub mod retrieve;

pub use error::LogStoreError;
pub use event::{LogEvent, LogLevel};
pub use ingest::{BatchReceipt, IngestionEngine};
pub use registry::{Destination, DestinationRegistry};
pub use retrieve::{LogPage, RetrievalEngine, RetrieveQuery};
