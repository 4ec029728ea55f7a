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

use anyhow::{Context, Result};
use clap::Args;
use owf_common::AppConfig;
use owf_design_engine::{design_scenario, io::load_scenario_from_file};
use tracing::info;

#[derive(Debug, Args)]
pub struct OptimizeCommand {
    /// Scenario file (JSON, YAML or TOML).
    #[arg(long, value_name = "FILE")]
    scenario: PathBuf,

    /// Report directory; defaults to `reports.directory` from the configuration.
    #[arg(long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Print the summary without writing report files.
    #[arg(long = "no-reports", action = clap::ArgAction::SetTrue)]
    no_reports: bool,
}

pub fn run(command: OptimizeCommand, config: &AppConfig) -> Result<()> {
    let problem = load_scenario_from_file(&command.scenario)
        .with_context(|| format!("unable to load scenario {}", command.scenario.display()))?
        .into_problem(config.search)?;

    let report = design_scenario(&problem)?;
    let exporter = report.exporter();

    if !command.no_reports {
        let output = command
            .output
            .unwrap_or_else(|| config.reports.directory.join(&report.scenario));
        let written = exporter.export_all(&output, config.reports.bill_of_quantities)?;
        info!(
            run_id = %report.run_id,
            files = written.len(),
            output = %output.display(),
            "design reports written"
        );
    }

    println!("{}", serde_json::to_string_pretty(&exporter.summary())?);
    Ok(())
}
