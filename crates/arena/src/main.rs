//! Arena CLI - tournament dashboard server.
//!
//! Provides commands for:
//! - `serve`: Serve the dashboard's static assets with SPA fallback

mod commands;
mod error;
mod output;

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::ServeArgs;
use error::CliError;
use output::Output;

/// Log filter used when `RUST_LOG` is unset: startup lines plus warnings.
const DEFAULT_LOG_FILTER: &str = "warn,arena_server=info";

/// Arena - tournament dashboard server.
#[derive(Parser)]
#[command(name = "arena", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the dashboard.
    Serve(ServeArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let output = Output::new();

    let verbose = matches!(&cli.command, Commands::Serve(args) if args.verbose);

    // --verbose enables INFO level everywhere, otherwise RUST_LOG or the default
    let filter = if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            output.error(&format!("Error: {err}"));
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands) -> Result<(), CliError> {
    match command {
        Commands::Serve(args) => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(args.execute())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn serve_args(argv: &[&str]) -> ServeArgs {
        let cli = Cli::try_parse_from(argv).unwrap();
        let Commands::Serve(args) = cli.command;
        args
    }

    #[test]
    fn test_port_flag_reads_port_env() {
        use clap::CommandFactory;

        let cli = Cli::command();
        let serve = cli.find_subcommand("serve").unwrap();
        let port = serve
            .get_arguments()
            .find(|arg| *arg.get_id() == "port")
            .unwrap();

        assert_eq!(port.get_env(), Some(std::ffi::OsStr::new("PORT")));
    }

    #[test]
    fn test_port_flag_parsed() {
        assert_eq!(
            serve_args(&["arena", "serve", "--port", "9001"]).port,
            Some(9001)
        );
        assert_eq!(serve_args(&["arena", "serve", "-p", "4001"]).port, Some(4001));
        assert!(Cli::try_parse_from(["arena", "serve", "--port", "70000"]).is_err());
    }

    #[test]
    fn test_serve_path_overrides() {
        let args = serve_args(&[
            "arena",
            "serve",
            "--public-dir",
            "/srv/public",
            "--entry-point",
            "/srv/index.html",
            "--port",
            "4100",
            "-v",
        ]);

        assert_eq!(args.public_dir, Some("/srv/public".into()));
        assert_eq!(args.entry_point, Some("/srv/index.html".into()));
        assert_eq!(args.port, Some(4100));
        assert!(args.verbose);
    }
}
