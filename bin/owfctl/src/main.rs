//! ---
//! owf_section: "05-networking-external-interfaces"
//! owf_subsection: "binary"
//! owf_type: "source"
//! owf_scope: "code"
//! owf_description: "Command-line front end for collection and export design runs."
//! owf_version: "v0.0.0-prealpha"
//! owf_owner: "tbd"
//! ---
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use owf_common::{init_tracing, AppConfig};
use tracing::{info, warn};

mod layout;
mod optimize;
mod sweep;

const CONFIG_CANDIDATES: [&str; 2] = ["configs/owf.toml", "owf.toml"];

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Offshore wind farm collection and export design",
    long_about = None
)]
struct Cli {
    /// Configuration file; defaults to OWF_CONFIG, then configs/owf.toml, then owf.toml.
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Optimise the CCP location and export system for one scenario.
    Optimize(optimize::OptimizeCommand),
    /// Re-run a scenario with one catalog's costs scaled by each factor.
    Sweep(sweep::SweepCommand),
    /// Print a staggered reference layout as JSON.
    Layout(layout::LayoutCommand),
}

fn load_config(explicit: Option<&PathBuf>) -> Result<(AppConfig, Option<PathBuf>)> {
    if let Some(path) = explicit {
        return Ok((AppConfig::from_path(path)?, Some(path.clone())));
    }
    let env_set = std::env::var(AppConfig::ENV_CONFIG_PATH)
        .map(|v| !v.trim().is_empty())
        .unwrap_or(false);
    let present = CONFIG_CANDIDATES
        .iter()
        .any(|c| std::path::Path::new(c).exists());
    if env_set || present {
        let loaded = AppConfig::load_with_source(&CONFIG_CANDIDATES)?;
        return Ok((loaded.config, Some(loaded.source)));
    }
    Ok((AppConfig::default(), None))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let (config, source) = load_config(cli.config.as_ref())?;
    init_tracing("owfctl", &config.logging)?;
    match &source {
        Some(path) => info!(config_path = %path.display(), "configuration loaded"),
        None => warn!("no configuration file found; using built-in defaults"),
    }

    match cli.command {
        Commands::Optimize(cmd) => optimize::run(cmd, &config)?,
        Commands::Sweep(cmd) => sweep::run(cmd, &config)?,
        Commands::Layout(cmd) => layout::run(cmd)?,
    }
    Ok(())
}
