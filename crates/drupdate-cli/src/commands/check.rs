//! Non-interactive report of available updates

use camino::Utf8Path;
use drupdate_core::types::Package;
use drupdate_manifest::{load_from_file, ComposerJson};
use drupdate_registry::{RegistryClient, ReleaseSource};
use tracing::info;

use super::CommandContext;

/// One line of the report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckEntry {
    pub package: String,
    pub current: String,
    /// Newest offered pin, `None` when nothing could be fetched
    pub newest: Option<String>,
}

impl CheckEntry {
    pub fn is_outdated(&self) -> bool {
        self.newest
            .as_deref()
            .is_some_and(|newest| newest != self.current)
    }
}

pub async fn execute(path: &Utf8Path, ctx: &CommandContext) -> anyhow::Result<()> {
    let path = ctx.resolve(path);
    info!("Checking {}", path);

    let manifest = load_from_file(&path).await?;
    let client = RegistryClient::with_config(ctx.interactive_config())?;
    let entries = check_manifest(&manifest, &client).await;

    let colors = ctx.output.colors();
    for entry in &entries {
        match &entry.newest {
            Some(newest) if entry.is_outdated() => println!(
                "  {:<40} {:<12} -> {}",
                entry.package,
                entry.current,
                colors.yellow(newest)
            ),
            Some(_) => println!("  {:<40} {:<12} {}", entry.package, entry.current, colors.dim("up to date")),
            None => println!("  {:<40} {:<12} {}", entry.package, entry.current, colors.dim("unknown")),
        }
    }

    let outdated = entries.iter().filter(|e| e.is_outdated()).count();
    if outdated == 0 {
        ctx.output.success("All packages are up to date");
    } else {
        ctx.output.warn(&format!("{} of {} packages can be updated", outdated, entries.len()));
    }
    Ok(())
}

/// Compare every offered package against the newest release pin.
///
/// Core packages are checked individually but all resolve to the same
/// catalog project. Fetch failures leave `newest` empty.
pub async fn check_manifest(manifest: &ComposerJson, source: &dyn ReleaseSource) -> Vec<CheckEntry> {
    let packages: Vec<Package> = manifest
        .core_packages()
        .into_iter()
        .chain(manifest.module_packages())
        .chain(manifest.other_packages())
        .collect();

    let mut entries = Vec::with_capacity(packages.len());
    for package in packages {
        let newest = match source.fetch_releases(&package.name).await {
            Ok(releases) => releases.first().map(|r| r.pin.clone()),
            Err(e) => {
                tracing::warn!("Could not fetch releases for {}: {}", package.name, e);
                None
            },
        };
        entries.push(CheckEntry {
            package: package.name,
            current: package.version,
            newest,
        });
    }
    entries
}
