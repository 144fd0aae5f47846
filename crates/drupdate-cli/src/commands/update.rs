//! Interactive update wizard.
//!
//! Walks the core, Drupal and Composer sections of a manifest, offers the
//! selected releases for each package and writes back only what changed.

use std::io::{self, BufRead, Write};

use camino::Utf8Path;
use drupdate_core::error::{DrupdateError, DrupdateResult};
use drupdate_core::types::{Package, Release};
use drupdate_manifest::{load_from_file, write_to_file, ComposerJson};
use drupdate_registry::{RegistryClient, ReleaseSource};
use tracing::{debug, info};

use super::CommandContext;
use crate::output::colors::ColorSupport;

/// Outcome of one version prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Choice {
    Keep,
    Pin(String),
}

pub async fn execute(path: &Utf8Path, ctx: &CommandContext) -> anyhow::Result<()> {
    let path = ctx.resolve(path);
    info!("Updating {}", path);

    let client = RegistryClient::with_config(ctx.interactive_config())?;

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut out = io::stdout();
    let changed = update_file(&path, &client, &mut input, &mut out, ctx.output.colors()).await?;

    if changed {
        ctx.output.success(&format!("{} updated successfully!", path));
    } else {
        ctx.output.info("No changes made.");
    }
    Ok(())
}

/// Load, run the wizard, and save when any constraint changed
pub async fn update_file<R, W>(
    path: &Utf8Path,
    source: &dyn ReleaseSource,
    input: &mut R,
    out: &mut W,
    colors: &ColorSupport,
) -> DrupdateResult<bool>
where
    R: BufRead,
    W: Write,
{
    let mut manifest = load_from_file(path).await?;
    let changed = run_wizard(&mut manifest, source, input, out, colors)
        .await
        .map_err(|e| DrupdateError::io("Failed to run update prompt".to_string(), e))?;

    if changed {
        write_to_file(path, &manifest).await?;
    }
    Ok(changed)
}

/// Prompt for every package section in turn. Returns whether any
/// constraint in `manifest` was changed.
pub async fn run_wizard<R, W>(
    manifest: &mut ComposerJson,
    source: &dyn ReleaseSource,
    input: &mut R,
    out: &mut W,
    colors: &ColorSupport,
) -> io::Result<bool>
where
    R: BufRead,
    W: Write,
{
    let mut changed = false;

    let core = manifest.core_packages();
    if let Some(first) = core.first() {
        section(out, colors, "Drupal Core")?;
        let names: Vec<&str> = core.iter().map(|p| p.name.as_str()).collect();
        writeln!(out, "  Packages: {}", names.join(", "))?;

        // All core packages share one catalog project
        match source.fetch_releases(&first.name).await {
            Err(e) => writeln!(out, "  {} Could not fetch core releases: {}", colors.yellow("!"), e)?,
            Ok(releases) if releases.is_empty() => writeln!(out, "  No releases found")?,
            Ok(releases) => {
                if let Choice::Pin(pin) =
                    select_version(input, out, colors, "Drupal Core", &first.version, &releases)?
                {
                    for package in &core {
                        changed |= manifest.set_constraint(&package.name, &pin);
                    }
                }
            },
        }
    }

    let modules = manifest.module_packages();
    if !modules.is_empty() {
        section(out, colors, "Drupal Packages")?;
        changed |= update_packages(manifest, &modules, source, input, out, colors).await?;
    }

    let others = manifest.other_packages();
    if !others.is_empty() {
        section(out, colors, "Composer Packages")?;
        changed |= update_packages(manifest, &others, source, input, out, colors).await?;
    }

    Ok(changed)
}

async fn update_packages<R, W>(
    manifest: &mut ComposerJson,
    packages: &[Package],
    source: &dyn ReleaseSource,
    input: &mut R,
    out: &mut W,
    colors: &ColorSupport,
) -> io::Result<bool>
where
    R: BufRead,
    W: Write,
{
    let mut changed = false;
    for package in packages {
        let releases = match source.fetch_releases(&package.name).await {
            Ok(releases) => releases,
            Err(e) => {
                debug!(package = %package.name, error = %e, "fetch failed");
                writeln!(
                    out,
                    "  {} [{}] Could not fetch releases: {}",
                    colors.yellow("!"),
                    package.name,
                    e
                )?;
                continue;
            },
        };
        if releases.is_empty() {
            writeln!(out, "  [{}] No releases found", package.name)?;
            continue;
        }

        if let Choice::Pin(pin) =
            select_version(input, out, colors, &package.name, &package.version, &releases)?
        {
            changed |= manifest.set_constraint(&package.name, &pin);
        }
    }
    Ok(changed)
}

fn section<W: Write>(out: &mut W, colors: &ColorSupport, title: &str) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", colors.bold(&format!("=== {} ===", title)))
}

/// Show the numbered candidates and read choices until one is valid.
///
/// Empty input, `s`, `S` or end of input keep the current constraint.
pub fn select_version<R, W>(
    input: &mut R,
    out: &mut W,
    colors: &ColorSupport,
    label: &str,
    current: &str,
    releases: &[Release],
) -> io::Result<Choice>
where
    R: BufRead,
    W: Write,
{
    writeln!(out)?;
    writeln!(out, "{} (current: {})", colors.bold(label), current)?;
    writeln!(out, "{}", "-".repeat(60))?;

    for (i, release) in releases.iter().enumerate() {
        match &release.core_compatibility {
            Some(compat) => writeln!(
                out,
                "  [{}] {:<12} ({}, core: {})",
                i + 1,
                release.pin,
                release.version,
                compat
            )?,
            None => writeln!(out, "  [{}] {:<12} ({})", i + 1, release.pin, release.version)?,
        }
    }
    writeln!(out, "  [s] Skip (keep current version)")?;
    writeln!(out)?;

    loop {
        write!(out, "Select version: ")?;
        out.flush()?;

        let mut line = String::new();
        let read = input.read_line(&mut line)?;
        let answer = line.trim();

        if read == 0 || answer.is_empty() || answer.eq_ignore_ascii_case("s") {
            writeln!(out, "  -> Keeping current version")?;
            return Ok(Choice::Keep);
        }

        if let Some(release) = answer
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| releases.get(i))
        {
            writeln!(out, "  -> Updated to {}", colors.green(&release.pin))?;
            return Ok(Choice::Pin(release.pin.clone()));
        }

        writeln!(out, "  Invalid choice. Try again.")?;
    }
}
