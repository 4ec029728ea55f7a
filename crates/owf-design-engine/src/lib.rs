//! ---
//! owf_section: "08-energy-models-optimization"
//! owf_subsection: "module"
//! owf_type: "source"
//! owf_scope: "code"
//! owf_description: "Collection and export design routines for offshore wind farms."
//! owf_version: "v0.0.0-prealpha"
//! owf_owner: "tbd"
//! ---
pub mod cable;
pub mod errors;
pub mod export;
pub mod io;
pub mod layout;
pub mod model;
pub mod network;
pub mod placement;
pub mod reports;
pub mod sweep;

use chrono::{DateTime, Utc};
use tracing::info;
use uuid::Uuid;

use crate::{
    model::{Catalogs, DesignProblem, Position, SearchSettings},
    reports::ReportExporter,
};

pub use cable::{select_cable_bundle, CableBundle};
pub use errors::{DesignError, Result};
pub use export::{optimize_export, select_transformers, ExportConfiguration, ExportMode};
pub use network::{build_connection_network, Topology};
pub use placement::{optimize_design, CcpOptimizer, SystemResult};
pub use sweep::{sensitivity_sweep, SweepPoint};

/// One optimisation run together with the inputs needed to read it back.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct DesignReport {
    pub run_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub scenario: String,
    pub turbine_count: usize,
    pub total_power: f64,
    pub onshore: Position,
    pub settings: SearchSettings,
    pub catalogs: Catalogs,
    pub result: SystemResult,
}

impl DesignReport {
    pub fn exporter(&self) -> ReportExporter<'_> {
        ReportExporter::new(self)
    }
}

/// Runs the full optimiser for `problem` and stamps the outcome with a run id.
///
/// Nothing is written to disk; use [`DesignReport::exporter`] for that.
pub fn design_scenario(problem: &DesignProblem) -> Result<DesignReport> {
    info!(
        scenario = %problem.name,
        turbines = problem.farm.len(),
        "Running collection and export design..."
    );
    let result = optimize_design(problem)?;

    Ok(DesignReport {
        run_id: Uuid::new_v4(),
        timestamp: Utc::now(),
        scenario: problem.name.clone(),
        turbine_count: problem.farm.len(),
        total_power: problem.total_power(),
        onshore: problem.onshore,
        settings: problem.settings,
        catalogs: problem.catalogs.clone(),
        result,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CableFamily, CableType, WindFarm};

    #[test]
    fn design_scenario_pipeline() {
        let farm = WindFarm::uniform(
            [Position::new(4000.0, 3000.0), Position::new(4000.0, -3000.0)],
            2.0,
        );
        let problem = DesignProblem::new(
            "pipeline",
            farm,
            Catalogs::mv_only(vec![CableType::new("mv1", CableFamily::Mv, 2.0, 10.0)]),
        );

        let report = design_scenario(&problem).unwrap();
        assert_eq!(report.scenario, "pipeline");
        assert_eq!(report.turbine_count, 2);
        assert_eq!(report.total_power, 4.0);
        assert_eq!(report.result.topology.edges.len(), 2);
        assert_eq!(report.result.export.mode, ExportMode::MvOnly);

        let other = design_scenario(&problem).unwrap();
        assert_ne!(report.run_id, other.run_id);
        assert_eq!(report.result, other.result);
    }
}
