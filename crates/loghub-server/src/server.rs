// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! TCP accept loop for the HTTP/1 server.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use hyper::service::service_fn;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use loghub_core::DestinationRegistry;

use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::http::LogService;

/// Builds the engines from `config`, binds the listen socket, and serves
/// until `shutdown` is cancelled.
pub async fn run(config: &ServerConfig, shutdown: CancellationToken) -> Result<(), ServerError> {
    let registry = Arc::new(DestinationRegistry::new(&config.log_root));
    let service = Arc::new(LogService::new(registry));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })?;
    info!(
        "loghub listening on {addr}, writing logs under {:?}",
        config.log_root
    );

    serve_tcp(listener, service, shutdown).await
}

/// Accepts connections and serves each on its own task.
///
/// Transient accept errors (reset, aborted, refused) are skipped; any
/// other accept error tears the server down. A panicking connection
/// handler is logged and does not take the accept loop with it. On
/// cancellation the loop stops accepting and drains in-flight
/// connections before returning.
async fn serve_tcp(
    listener: TcpListener,
    service: Arc<LogService>,
    shutdown: CancellationToken,
) -> Result<(), ServerError> {
    let server = hyper::server::conn::http1::Builder::new();
    let mut joinset = tokio::task::JoinSet::new();

    loop {
        let conn = tokio::select! {
            () = shutdown.cancelled() => {
                info!("Shutting down, draining {} open connection(s)", joinset.len());
                while joinset.join_next().await.is_some() {}
                return Ok(());
            },
            con_res = listener.accept() => match con_res {
                Err(e)
                    if matches!(
                        e.kind(),
                        io::ErrorKind::ConnectionAborted
                            | io::ErrorKind::ConnectionReset
                            | io::ErrorKind::ConnectionRefused
                    ) =>
                {
                    continue;
                }
                Err(e) => {
                    error!("Server error: {e}");
                    return Err(e.into());
                }
                Ok((conn, _)) => conn,
            },
            finished = async {
                match joinset.join_next().await {
                    Some(finished) => finished,
                    None => std::future::pending().await,
                }
            } => match finished {
                Err(e) if e.is_panic() => {
                    // Don't kill server on panic - log and continue
                    error!("Connection handler panicked: {e:?}");
                    continue;
                },
                Ok(()) | Err(_) => continue,
            },
        };

        let conn = hyper_util::rt::TokioIo::new(conn);
        let server = server.clone();
        let service = Arc::clone(&service);
        joinset.spawn(async move {
            let handler = service_fn(move |req| {
                let service = Arc::clone(&service);
                async move { service.handle(req).await }
            });
            if let Err(e) = server.serve_connection(conn, handler).await {
                error!("Connection error: {e}");
            }
        });
    }
}
