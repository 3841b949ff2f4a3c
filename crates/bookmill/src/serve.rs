// SPDX-FileCopyrightText: 2026 Bookmill Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `bookmill serve` command implementation.
//!
//! Opens storage, wires the book service and runs the HTTP gateway until
//! SIGINT or SIGTERM.

use bookmill_config::BookmillConfig;
use bookmill_core::{BookmillError, PluginAdapter};
use bookmill_gateway::{GatewayState, ServerConfig};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::commands::open_service;

/// Runs the `bookmill serve` command.
pub(crate) async fn run_serve(config: BookmillConfig) -> Result<(), BookmillError> {
    init_tracing(&format!("bookmill={},warn", config.server.log_level));

    info!(
        database = %config.storage.database_path,
        books_dir = %config.library.books_dir,
        classifier = config.extraction.api_key.is_some(),
        "starting bookmill serve"
    );
    if config.server.bearer_token.is_none() {
        warn!("no bearer token configured, /v1 routes are open");
    }

    let (service, storage) = open_service(&config).await?;
    let state = GatewayState::new(service, config.server.bearer_token.clone());
    let server_config = ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
        bearer_token: config.server.bearer_token.clone(),
        max_upload_bytes: config.server.max_upload_bytes,
    };

    let cancel = install_signal_handler();
    let served = bookmill_gateway::start_server(&server_config, state, async move {
        cancel.cancelled().await;
    })
    .await;

    if let Err(e) = storage.shutdown().await {
        warn!(error = %e, "storage shutdown failed");
    }
    served?;

    info!("bookmill serve shutdown complete");
    Ok(())
}

/// Cancels the returned token on SIGINT or SIGTERM.
fn install_signal_handler() -> CancellationToken {
    let token = CancellationToken::new();
    let token_clone = token.clone();

    tokio::spawn(async move {
        let ctrl_c = tokio::signal::ctrl_c();

        #[cfg(unix)]
        {
            use tokio::signal::unix::{SignalKind, signal};
            match signal(SignalKind::terminate()) {
                Ok(mut sigterm) => {
                    tokio::select! {
                        _ = ctrl_c => info!("received SIGINT (Ctrl+C), initiating shutdown"),
                        _ = sigterm.recv() => info!("received SIGTERM, initiating shutdown"),
                    }
                }
                Err(e) => {
                    warn!(error = %e, "SIGTERM handler unavailable, waiting for Ctrl+C only");
                    let _ = ctrl_c.await;
                    info!("received SIGINT (Ctrl+C), initiating shutdown");
                }
            }
        }

        #[cfg(not(unix))]
        {
            let _ = ctrl_c.await;
            info!("received Ctrl+C, initiating shutdown");
        }

        token_clone.cancel();
        debug!("shutdown signal handler completed");
    });

    token
}

/// Installs the global subscriber. `RUST_LOG` wins over `default_filter`.
///
/// Logs go to stderr so command output on stdout stays machine-readable.
pub(crate) fn init_tracing(default_filter: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
