//! ---
//! owf_section: "08-energy-models-optimization"
//! owf_subsection: "module"
//! owf_type: "source"
//! owf_scope: "code"
//! owf_description: "Collection and export design routines for offshore wind farms."
//! owf_version: "v0.0.0-prealpha"
//! owf_owner: "tbd"
//! ---
//! Export leg pricing: MV-only versus HV cables with step-up transformers at the CCP.

use indexmap::IndexMap;
use nalgebra::distance;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    cable::{select_cable_bundle, CableBundle},
    errors::{DesignError, Result},
    model::{Catalogs, Position, TransformerType},
};

/// Largest capacity table the transformer search will allocate.
pub const MAX_CAPACITY_CELLS: usize = 10_000_000;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ExportMode {
    MvOnly,
    Hv,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TransformerPlan {
    /// Installed count per transformer type, in catalog order.
    pub usage: IndexMap<String, u32>,
    pub installed_capacity: f64,
    pub cost: f64,
}

/// Cheapest multiset of transformers whose summed rating is at least `required_power`.
///
/// Capacity is tabulated in quanta of `resolution`: the target is rounded up and each
/// rating is rounded down, so any discrete cover is also a cover in real units. Ratings
/// are capped at the target, which bounds the table by twice the target; each level keeps
/// the cheapest way to reach at least that level. Equal costs keep the earliest catalog
/// entry.
pub fn select_transformers(
    required_power: f64,
    catalog: &[TransformerType],
    resolution: f64,
) -> Result<TransformerPlan> {
    if !(required_power.is_finite() && required_power > 0.0) {
        return Err(DesignError::invalid(format!(
            "required power must be positive, got {}",
            required_power
        )));
    }
    if !(resolution.is_finite() && resolution > 0.0) {
        return Err(DesignError::invalid(format!(
            "capacity resolution must be positive, got {}",
            resolution
        )));
    }
    let infeasible = || DesignError::NoFeasibleTransformerCombination { required_power };

    let target = (required_power / resolution).ceil() as usize;
    // Any rating at or above the target covers it alone, so larger units are clamped.
    let units: Vec<usize> = catalog
        .iter()
        .map(|t| ((t.rated_power / resolution).floor() as usize).min(target))
        .collect();
    let max_unit = units.iter().copied().max().unwrap_or(0);
    if max_unit == 0 {
        return Err(infeasible());
    }
    let bound = target
        .checked_add(max_unit)
        .filter(|&b| b < MAX_CAPACITY_CELLS)
        .ok_or_else(infeasible)?;

    let mut best = vec![f64::INFINITY; bound + 1];
    let mut choice = vec![usize::MAX; bound + 1];
    best[0] = 0.0;
    for level in 1..=bound {
        for (k, transformer) in catalog.iter().enumerate() {
            if units[k] == 0 {
                continue;
            }
            let candidate = transformer.cost + best[level.saturating_sub(units[k])];
            if candidate < best[level] {
                best[level] = candidate;
                choice[level] = k;
            }
        }
    }

    let mut level = target;
    for covered in target + 1..=bound {
        if best[covered] < best[level] {
            level = covered;
        }
    }
    let cost = best[level];
    if !cost.is_finite() {
        return Err(infeasible());
    }

    let mut counts = vec![0u32; catalog.len()];
    while level > 0 {
        let k = choice[level];
        counts[k] += 1;
        level = level.saturating_sub(units[k]);
    }

    let mut usage = IndexMap::new();
    let mut installed_capacity = 0.0;
    for (transformer, &count) in catalog.iter().zip(&counts) {
        if count == 0 {
            continue;
        }
        *usage.entry(transformer.name.clone()).or_insert(0) += count;
        installed_capacity += transformer.rated_power * f64::from(count);
    }

    Ok(TransformerPlan {
        usage,
        installed_capacity,
        cost,
    })
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExportConfiguration {
    pub mode: ExportMode,
    pub length: f64,
    pub bundle: CableBundle,
    pub cable_cost: f64,
    /// Present only when `mode` is [`ExportMode::Hv`].
    pub transformer_usage: Option<IndexMap<String, u32>>,
    pub transformer_cost: f64,
    pub total_cost: f64,
    /// Cost of the MV-only alternative at the same CCP.
    pub mv_only_cost: f64,
    /// Cost of the HV alternative, when one was feasible.
    pub hv_cost: Option<f64>,
}

impl ExportConfiguration {
    pub fn uses_hv(&self) -> bool {
        matches!(self.mode, ExportMode::Hv)
    }
}

/// Prices the CCP-to-shore leg and returns the cheaper of MV-only and HV export.
///
/// HV is considered only when both the HV cable and transformer catalogs are present.
/// An infeasible transformer cover drops back to MV-only; ties go to MV.
pub fn optimize_export(
    ccp: Position,
    onshore: Position,
    total_power: f64,
    catalogs: &Catalogs,
    capacity_resolution: f64,
) -> Result<ExportConfiguration> {
    let length = distance(&ccp, &onshore);

    let mv_bundle = select_cable_bundle(total_power, &catalogs.mv_cables)?;
    let mv_cost = mv_bundle.cost_for_length(length);
    let mv_only = ExportConfiguration {
        mode: ExportMode::MvOnly,
        length,
        cable_cost: mv_cost,
        bundle: mv_bundle,
        transformer_usage: None,
        transformer_cost: 0.0,
        total_cost: mv_cost,
        mv_only_cost: mv_cost,
        hv_cost: None,
    };

    let (Some(hv_cables), Some(transformers)) = (catalogs.hv_cables(), catalogs.transformers())
    else {
        return Ok(mv_only);
    };

    let hv_bundle = select_cable_bundle(total_power, hv_cables)?;
    let plan = match select_transformers(total_power, transformers, capacity_resolution) {
        Ok(plan) => plan,
        Err(DesignError::NoFeasibleTransformerCombination { required_power }) => {
            debug!(
                required_power,
                "no transformer cover available; exporting at MV"
            );
            return Ok(mv_only);
        }
        Err(err) => return Err(err),
    };

    let hv_cable_cost = hv_bundle.cost_for_length(length);
    let hv_total = hv_cable_cost + plan.cost;
    if hv_total < mv_cost {
        Ok(ExportConfiguration {
            mode: ExportMode::Hv,
            length,
            bundle: hv_bundle,
            cable_cost: hv_cable_cost,
            transformer_usage: Some(plan.usage),
            transformer_cost: plan.cost,
            total_cost: hv_total,
            mv_only_cost: mv_cost,
            hv_cost: Some(hv_total),
        })
    } else {
        Ok(ExportConfiguration {
            hv_cost: Some(hv_total),
            ..mv_only
        })
    }
}
