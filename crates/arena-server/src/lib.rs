//! HTTP server for the arena dashboard.
//!
//! This crate provides a native Rust HTTP server using axum, serving:
//! - Static files from an ordered list of directory mounts
//! - The SPA entry-point document for every other path
//! - A read-only tournament list for the dashboard cards (when configured)
//!
//! # Quick Start
//!
//! ```ignore
//! use arena_server::{ServerConfig, run_server};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ServerConfig {
//!         port: 4000,
//!         ..ServerConfig::default()
//!     };
//!
//!     run_server(config).await.unwrap();
//! }
//! ```
//!
//! # Routing
//!
//! ```text
//! Browser ──HTTP──► axum router (arena-server)
//!                        │
//!                        ├─► /api/tournaments (if a data file is configured)
//!                        │
//!                        ├─► /public ─► public root
//!                        ├─► /pages  ─► pages root
//!                        ├─► /src    ─► source root
//!                        ├─► /Miku   ─► framework assets (directory or embedded)
//!                        ├─► /       ─► public root
//!                        │
//!                        └─► anything else ─► entry-point document (200)
//! ```

mod app;
mod error;
mod handlers;
mod middleware;
mod state;
mod static_files;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use arena_config::{DEFAULT_PORT, MountsConfig};
use arena_tournament::TournamentError;
use axum::Router;
use state::AppState;

/// Server configuration.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Static mount directories and entry-point document.
    pub mounts: MountsConfig,
    /// Tournament data file (`None` disables `/api/tournaments`).
    pub tournaments_file: Option<PathBuf>,
    /// Per-request timeout.
    pub request_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: DEFAULT_PORT,
            mounts: MountsConfig {
                public_dir: PathBuf::from("web/public"),
                pages_dir: PathBuf::from("web/pages"),
                source_dir: PathBuf::from("web/src"),
                framework_dir: PathBuf::from("web/vendor/miku"),
                entry_point: PathBuf::from("web/index.html"),
            },
            tournaments_file: None,
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Error that prevents the server from starting.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    /// The SPA entry-point document is missing or not a regular file.
    #[error("Entry-point document not found: {}", .0.display())]
    EntryPointMissing(PathBuf),

    /// Tournament data could not be loaded.
    #[error("{0}")]
    Tournaments(#[from] TournamentError),

    /// Binding or serving failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Build the application router without binding a socket.
///
/// Performs the same startup checks as [`run_server`].
///
/// # Errors
///
/// Returns an error if the entry-point document is missing or the tournament
/// data file cannot be loaded.
pub fn router(config: &ServerConfig) -> Result<Router, StartupError> {
    let state = Arc::new(AppState::from_config(config)?);
    Ok(app::create_router(state, config.request_timeout))
}

/// Run the server.
///
/// # Arguments
///
/// * `config` - Server configuration
///
/// # Errors
///
/// Returns an error if startup checks fail or the server fails to bind.
pub async fn run_server(config: ServerConfig) -> Result<(), StartupError> {
    let state = Arc::new(AppState::from_config(&config)?);
    log_startup(&state);

    let app = app::create_router(state, config.request_timeout);

    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port)).await?;
    tracing::info!(address = %listener.local_addr()?, "Starting server");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Log resolved mounts and the entry point so operators can verify them.
fn log_startup(state: &AppState) {
    for mount in state.mounts.iter() {
        let prefix = if mount.prefix().is_empty() {
            "/"
        } else {
            mount.prefix()
        };
        tracing::info!(prefix, dir = %mount.source(), "Mounted static assets");
    }
    tracing::info!(path = %state.entry_point.display(), "SPA entry point");

    if let Some(tournaments) = &state.tournaments {
        tracing::info!(count = tournaments.len(), "Loaded tournaments");
        for t in tournaments {
            tracing::debug!(
                id = t.id,
                name = %t.name,
                status = t.status.label(),
                detail = t.status.display_value(),
                "Tournament card"
            );
        }
    }
}

/// Wait for shutdown signal (Ctrl-C).
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, stopping server...");
}

/// Create server configuration from the loaded arena config.
#[must_use]
pub fn server_config_from_config(config: &arena_config::Config) -> ServerConfig {
    ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
        mounts: config.mounts_resolved.clone(),
        tournaments_file: config.dashboard_resolved.tournaments_file.clone(),
        request_timeout: Duration::from_secs(config.server.request_timeout_secs),
    }
}
