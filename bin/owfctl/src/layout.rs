//! ---
//! owf_section: "05-networking-external-interfaces"
//! owf_subsection: "binary"
//! owf_type: "source"
//! owf_scope: "code"
//! owf_description: "Command-line front end for collection and export design runs."
//! owf_version: "v0.0.0-prealpha"
//! owf_owner: "tbd"
//! ---
use anyhow::{anyhow, Result};
use clap::Args;
use owf_design_engine::layout::StaggeredGrid;

#[derive(Debug, Args)]
pub struct LayoutCommand {
    #[arg(long)]
    rows: usize,

    #[arg(long)]
    cols: usize,

    /// Rated power assigned to every turbine.
    #[arg(long, default_value_t = 12.0)]
    power: f64,
}

pub fn run(command: LayoutCommand) -> Result<()> {
    if command.rows == 0 || command.cols == 0 {
        return Err(anyhow!("rows and cols must both be at least 1"));
    }
    let farm = StaggeredGrid::new(command.rows, command.cols).farm(command.power);
    println!("{}", serde_json::to_string_pretty(&farm.turbines)?);
    Ok(())
}
