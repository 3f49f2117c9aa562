// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! HTTP transport for the loghub centralized logging service.
//!
//! Exposes the `loghub-core` engines over a small hyper HTTP/1 surface:
//! single-event ingestion, batch ingestion, filtered retrieval, and a
//! health probe. Configuration comes from the environment; the binary
//! entry point lives in `main.rs`.

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

pub mod config;
pub mod error;
pub mod http;
pub mod server;

pub use config::ServerConfig;
pub use error::ServerError;
pub use http::LogService;
