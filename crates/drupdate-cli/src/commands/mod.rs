//! Command implementations and dispatch logic.
//!
//! Each command is an async function taking the parsed arguments and a
//! shared `CommandContext`.

use camino::{Utf8Path, Utf8PathBuf};
use drupdate_registry::ClientConfig;
use tracing::info;

/// Cap on releases listed for projects without supported branches when the
/// user has not set one
pub const CLI_FALLBACK_LIMIT: usize = 10;

pub mod check;
pub mod serve;
pub mod update;


use crate::{output::OutputHandler, Commands};

/// Shared context for all commands
pub struct CommandContext {
    pub cwd: Utf8PathBuf,
    pub output: OutputHandler,
    /// Catalog settings after flag and environment layering
    pub config: ClientConfig,
}

impl CommandContext {
    pub fn new(config: ClientConfig) -> anyhow::Result<Self> {
        let cwd = std::env::current_dir()
            .map_err(|e| drupdate_core::DrupdateError::io("Failed to get current directory".to_string(), e))?;
        let cwd = Utf8PathBuf::from_path_buf(cwd).map_err(|p| {
            anyhow::anyhow!("current directory {} is not valid UTF-8", p.display())
        })?;

        Ok(Self {
            cwd,
            output: OutputHandler::new(),
            config,
        })
    }

    /// Catalog settings for `update` and `check`, capped at
    /// `CLI_FALLBACK_LIMIT` unless a limit was configured
    pub fn interactive_config(&self) -> ClientConfig {
        ClientConfig {
            fallback_limit: self.config.fallback_limit.or(Some(CLI_FALLBACK_LIMIT)),
            ..self.config.clone()
        }
    }

    /// Resolve a user-supplied path against the working directory
    pub fn resolve(&self, path: &Utf8Path) -> Utf8PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.cwd.join(path)
        }
    }
}

/// Dispatch a command to its handler
pub async fn dispatch_command(command: Commands, ctx: &CommandContext) -> anyhow::Result<()> {
    match command {
        Commands::Update { path } => {
            info!("Running update wizard for {}", path);
            update::execute(&path, ctx).await
        },
        Commands::Check { path } => {
            info!("Checking {} for updates", path);
            check::execute(&path, ctx).await
        },
        Commands::Serve { addr } => {
            info!("Starting API server on {}", addr);
            serve::execute(addr, ctx).await
        },
    }
}
