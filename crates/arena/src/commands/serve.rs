//! `arena serve` command implementation.

use std::path::PathBuf;

use arena_config::{CliSettings, Config};
use arena_server::{run_server, server_config_from_config};
use clap::Args;

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the serve command.
#[derive(Args, Debug)]
pub(crate) struct ServeArgs {
    /// Path to configuration file (default: auto-discover arena.toml).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Host to bind to (overrides config).
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on (overrides config).
    #[arg(short, long, env = "PORT")]
    pub port: Option<u16>,

    /// Public assets directory (overrides config).
    #[arg(long)]
    pub public_dir: Option<PathBuf>,

    /// SPA entry-point document (overrides config).
    #[arg(long)]
    pub entry_point: Option<PathBuf>,

    /// Enable verbose output (info-level logs for every request).
    #[arg(short, long)]
    pub verbose: bool,
}

impl ServeArgs {
    /// Execute the serve command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or the server fails to start.
    pub(crate) async fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            host: self.host,
            port: self.port,
            public_dir: self.public_dir,
            entry_point: self.entry_point,
        };

        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        tracing::debug!(?config, "Loaded configuration");

        output.heading(&format!(
            "Arena dashboard on http://{}:{}",
            config.server.host, config.server.port
        ));
        if let Some(path) = &config.config_path {
            output.field("config", path.display());
        } else {
            output.warning("No arena.toml found, using defaults");
        }

        let mounts = &config.mounts_resolved;
        output.field("/public", mounts.public_dir.display());
        output.field("/pages", mounts.pages_dir.display());
        output.field("/src", mounts.source_dir.display());
        output.field("/Miku", mounts.framework_dir.display());
        output.field("/", mounts.public_dir.display());
        output.field("fallback", mounts.entry_point.display());

        if let Some(file) = &config.dashboard_resolved.tournaments_file {
            output.field("data", file.display());
        }

        run_server(server_config_from_config(&config)).await?;

        Ok(())
    }
}
