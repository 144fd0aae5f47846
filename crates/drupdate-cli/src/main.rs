//! # drupdate
//!
//! Keeps the `require` constraints of a Drupal project's `composer.json`
//! current.
//!
//! This is the entry point of the CLI. It parses arguments, layers catalog
//! settings from flags and environment, sets up logging and panic reporting,
//! and dispatches to the command handlers.

use std::net::SocketAddr;
use std::process::ExitCode;
use std::time::Duration;

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};
use drupdate_registry::ClientConfig;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

use commands::CommandContext;
use output::errors::ErrorFormatter;

/// Interactive composer.json updater for Drupal projects
#[derive(Parser)]
#[command(name = "drupdate", version, about = "Update Drupal composer.json constraints")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub registry: RegistryArgs,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Choose new constraints interactively and rewrite composer.json
    Update {
        /// Path to composer.json
        #[arg(value_name = "COMPOSER_JSON")]
        path: Utf8PathBuf,
    },
    /// Report packages with newer releases, without changing anything
    Check {
        /// Path to composer.json
        #[arg(value_name = "COMPOSER_JSON")]
        path: Utf8PathBuf,
    },
    /// Serve the JSON API
    Serve {
        /// Listen address
        #[arg(long, env = "DRUPDATE_ADDR", default_value = "127.0.0.1:8080")]
        addr: SocketAddr,
    },
}

/// Catalog settings; each flag falls back to its environment variable
#[derive(Args)]
pub struct RegistryArgs {
    /// drupal.org release-history base URL
    #[arg(long, global = true, env = "DRUPDATE_MODULE_REGISTRY_URL")]
    pub module_registry_url: Option<String>,

    /// Packagist base URL
    #[arg(long, global = true, env = "DRUPDATE_REGISTRY_URL")]
    pub registry_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true, env = "DRUPDATE_TIMEOUT_SECS")]
    pub timeout_secs: Option<u64>,

    /// User-Agent header sent to both catalogs
    #[arg(long, global = true, env = "DRUPDATE_USER_AGENT")]
    pub user_agent: Option<String>,

    /// Releases listed for projects without supported branches
    #[arg(long, global = true, env = "DRUPDATE_FALLBACK_LIMIT")]
    pub fallback_limit: Option<usize>,
}

impl RegistryArgs {
    /// Overlay the given settings on the defaults
    pub fn into_config(self) -> ClientConfig {
        let mut config = ClientConfig::default();
        if let Some(url) = self.module_registry_url {
            config.module_base_url = url;
        }
        if let Some(url) = self.registry_url {
            config.registry_base_url = url;
        }
        if let Some(secs) = self.timeout_secs {
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(agent) = self.user_agent {
            config.user_agent = agent;
        }
        config.fallback_limit = self.fallback_limit;
        config
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    setup_logging(cli.verbose);
    setup_panic_handler();

    info!("Starting drupdate v{}", env!("CARGO_PKG_VERSION"));

    match run_cli(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            eprint!("{}", ErrorFormatter::new().format_any(&e));
            ExitCode::FAILURE
        },
    }
}

fn run_cli(cli: Cli) -> anyhow::Result<()> {
    let config = cli.registry.into_config();
    config.validate()?;

    let rt = tokio::runtime::Runtime::new().map_err(|e| {
        drupdate_core::DrupdateError::io("Failed to create async runtime".to_string(), e)
    })?;

    rt.block_on(async {
        let ctx = CommandContext::new(config)?;
        commands::dispatch_command(cli.command, &ctx).await
    })
}

/// `RUST_LOG` wins; otherwise drupdate crates log at warn, or debug with `-v`
fn setup_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "drupdate={level},drupdate_core={level},drupdate_manifest={level},drupdate_registry={level},drupdate_server={level}"
        ))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn setup_panic_handler() {
    std::panic::set_hook(Box::new(|panic_info| {
        error!("drupdate encountered an unexpected error: {}", panic_info);
        eprintln!("drupdate crashed! This is a bug.");
        eprintln!("Error: {}", panic_info);
    }));
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_registry_flags_override_defaults() {
        let cli = Cli::try_parse_from([
            "drupdate",
            "--registry-url",
            "http://localhost:9000",
            "--timeout-secs",
            "5",
            "check",
            "composer.json",
        ])
        .unwrap();

        assert!(matches!(cli.command, Commands::Check { ref path } if path == "composer.json"));
        let config = cli.registry.into_config();
        assert_eq!(config.registry_base_url, "http://localhost:9000");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.module_base_url, ClientConfig::default().module_base_url);
    }

    #[test]
    fn test_user_agent_and_fallback_limit_flags() {
        let cli = Cli::try_parse_from([
            "drupdate",
            "update",
            "composer.json",
            "--user-agent",
            "site-bot/1.0",
            "--fallback-limit",
            "25",
        ])
        .unwrap();
        let config = cli.registry.into_config();
        assert_eq!(config.user_agent, "site-bot/1.0");
        assert_eq!(config.fallback_limit, Some(25));

        let cli = Cli::try_parse_from(["drupdate", "serve"]).unwrap();
        let config = cli.registry.into_config();
        assert_eq!(config.user_agent, ClientConfig::default().user_agent);
        assert_eq!(config.fallback_limit, None);
    }

    #[test]
    fn test_serve_addr() {
        let cli = Cli::try_parse_from(["drupdate", "serve", "--addr", "0.0.0.0:9090"]).unwrap();
        match cli.command {
            Commands::Serve { addr } => assert_eq!(addr.port(), 9090),
            _ => panic!("expected serve"),
        }
        assert!(Cli::try_parse_from(["drupdate", "serve", "--addr", "nope"]).is_err());
    }

    #[test]
    fn test_update_requires_path() {
        assert!(Cli::try_parse_from(["drupdate", "update"]).is_err());
    }
}
