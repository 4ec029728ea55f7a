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

use anyhow::{anyhow, Context, Result};
use clap::Args;
use owf_common::AppConfig;
use owf_design_engine::{io::load_scenario_from_file, model::CatalogKind, sensitivity_sweep};

#[derive(Debug, Args)]
pub struct SweepCommand {
    /// Scenario file (JSON, YAML or TOML).
    #[arg(long, value_name = "FILE")]
    scenario: PathBuf,

    /// Catalog whose costs are scaled: mv, hv or transformer.
    #[arg(long, value_name = "CATALOG")]
    target: CatalogKind,

    /// Comma-separated scaling factors.
    #[arg(long, value_name = "LIST", value_delimiter = ',', required = true)]
    factors: Vec<f64>,
}

pub fn run(command: SweepCommand, config: &AppConfig) -> Result<()> {
    if command.factors.is_empty() {
        return Err(anyhow!("at least one scaling factor is required"));
    }
    let problem = load_scenario_from_file(&command.scenario)
        .with_context(|| format!("unable to load scenario {}", command.scenario.display()))?
        .into_problem(config.search)?;

    let points = sensitivity_sweep(&problem, command.target, &command.factors)?;
    println!("{}", serde_json::to_string_pretty(&points)?);
    Ok(())
}
