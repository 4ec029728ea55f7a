//! ---
//! owf_section: "08-energy-models-optimization"
//! owf_subsection: "module"
//! owf_type: "source"
//! owf_scope: "code"
//! owf_description: "Collection and export design routines for offshore wind farms."
//! owf_version: "v0.0.0-prealpha"
//! owf_owner: "tbd"
//! ---
//! Cost-scaling sensitivity runs. Each factor is applied to a copy of the catalogs.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    errors::{DesignError, Result},
    export::ExportMode,
    model::{CatalogKind, DesignProblem, Position},
    placement::optimize_design,
};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SweepPoint {
    pub factor: f64,
    pub ccp: Position,
    pub ray_parameter: f64,
    pub connection_cost: f64,
    pub export_cost: f64,
    pub total_cost: f64,
    pub export_mode: ExportMode,
}

/// Re-runs the optimiser with the costs of `kind` multiplied by each factor in turn.
pub fn sensitivity_sweep(
    problem: &DesignProblem,
    kind: CatalogKind,
    factors: &[f64],
) -> Result<Vec<SweepPoint>> {
    let mut points = Vec::with_capacity(factors.len());
    for &factor in factors {
        if !(factor.is_finite() && factor > 0.0) {
            return Err(DesignError::invalid(format!(
                "scaling factor must be positive, got {}",
                factor
            )));
        }
        let scaled = DesignProblem {
            catalogs: problem.catalogs.scaled(kind, factor),
            ..problem.clone()
        };
        let result = optimize_design(&scaled)?;
        info!(
            ?kind,
            factor,
            total_cost = result.total_cost,
            "sensitivity point computed"
        );
        points.push(SweepPoint {
            factor,
            ccp: result.ccp,
            ray_parameter: result.ray_parameter,
            connection_cost: result.connection_cost,
            export_cost: result.export_cost,
            total_cost: result.total_cost,
            export_mode: result.export.mode,
        });
    }
    Ok(points)
}
