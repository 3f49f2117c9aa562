// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Errors raised while configuring or running the server.

use std::net::SocketAddr;

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// An environment variable held a value the server cannot use.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Binding the listen socket failed.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    /// The accept loop hit a non-recoverable socket error.
    #[error("server I/O error: {0}")]
    Io(#[from] std::io::Error),
}
