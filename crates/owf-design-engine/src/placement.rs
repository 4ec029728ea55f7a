//! ---
//! owf_section: "08-energy-models-optimization"
//! owf_subsection: "module"
//! owf_type: "source"
//! owf_scope: "code"
//! owf_description: "Collection and export design routines for offshore wind farms."
//! owf_version: "v0.0.0-prealpha"
//! owf_owner: "tbd"
//! ---
//! CCP placement along the segment from the onshore point to the turbine centroid.
//!
//! Candidates are `onshore + t * (centroid - onshore)` for `t` in `[0, 1]`; the plane is
//! not searched. Total cost is assumed unimodal in `t` and minimised by ternary search.
//! Because the MST can change shape as the CCP moves, that assumption does not always
//! hold and the result is then a local minimum.

use std::convert::Infallible;

use nalgebra::distance;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{
    errors::{DesignError, Result},
    export::{optimize_export, ExportConfiguration},
    model::{DesignProblem, Position},
    network::{build_connection_network, Topology},
};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SearchOutcome {
    pub t: f64,
    pub lo: f64,
    pub hi: f64,
    pub iterations: usize,
    /// `false` when the iteration cap was hit before `hi - lo <= tolerance`.
    pub converged: bool,
}

/// Ternary search for the minimum of `cost` on `[lo, hi]`.
pub fn ternary_search<F>(
    mut cost: F,
    lo: f64,
    hi: f64,
    tolerance: f64,
    max_iterations: usize,
) -> SearchOutcome
where
    F: FnMut(f64) -> f64,
{
    match try_ternary_search(
        |t| Ok::<f64, Infallible>(cost(t)),
        lo,
        hi,
        tolerance,
        max_iterations,
    ) {
        Ok(outcome) => outcome,
        Err(never) => match never {},
    }
}

/// Fallible ternary search; the first error from `cost` aborts the search.
///
/// When `cost(m1) < cost(m2)` the upper third is dropped, otherwise the lower third,
/// so infinite plateaus shrink toward `hi`.
pub fn try_ternary_search<E, F>(
    mut cost: F,
    lo: f64,
    hi: f64,
    tolerance: f64,
    max_iterations: usize,
) -> std::result::Result<SearchOutcome, E>
where
    F: FnMut(f64) -> std::result::Result<f64, E>,
{
    let (mut lo, mut hi) = (lo, hi);
    let mut iterations = 0;
    while hi - lo > tolerance {
        if iterations >= max_iterations {
            warn!(
                lo,
                hi, iterations, "ternary search stopped before reaching tolerance"
            );
            return Ok(SearchOutcome {
                t: 0.5 * (lo + hi),
                lo,
                hi,
                iterations,
                converged: false,
            });
        }
        let m1 = lo + (hi - lo) / 3.0;
        let m2 = hi - (hi - lo) / 3.0;
        if cost(m1)? < cost(m2)? {
            hi = m2;
        } else {
            lo = m1;
        }
        iterations += 1;
    }
    Ok(SearchOutcome {
        t: 0.5 * (lo + hi),
        lo,
        hi,
        iterations,
        converged: true,
    })
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SystemResult {
    pub ccp: Position,
    /// Position of the CCP along the onshore-to-centroid segment.
    pub ray_parameter: f64,
    pub topology: Topology,
    pub export: ExportConfiguration,
    pub connection_cost: f64,
    pub export_cost: f64,
    pub total_cost: f64,
    pub search: SearchOutcome,
    /// Set when the search settled inside a clearance zone and the CCP was moved.
    pub relocated: bool,
}

/// Evaluates and optimises CCP candidates for one validated [`DesignProblem`].
#[derive(Debug)]
pub struct CcpOptimizer<'a> {
    problem: &'a DesignProblem,
    centroid: Position,
    total_power: f64,
}

impl<'a> CcpOptimizer<'a> {
    pub fn new(problem: &'a DesignProblem) -> Result<Self> {
        problem.validate()?;
        let centroid = problem
            .farm
            .centroid()
            .ok_or_else(|| DesignError::invalid("wind farm has no turbines"))?;
        Ok(Self {
            problem,
            centroid,
            total_power: problem.total_power(),
        })
    }

    pub fn centroid(&self) -> Position {
        self.centroid
    }

    pub fn candidate(&self, t: f64) -> Position {
        self.problem.onshore + (self.centroid - self.problem.onshore) * t
    }

    /// `false` when `position` is strictly within the clearance radius of a turbine.
    pub fn is_clear(&self, position: &Position) -> bool {
        let radius = self.problem.settings.clearance_radius;
        self.problem
            .farm
            .turbines
            .iter()
            .all(|t| distance(position, &t.position) >= radius)
    }

    /// Sub-intervals of `[0, 1]` whose candidates keep the clearance radius.
    pub fn feasible_intervals(&self) -> Vec<(f64, f64)> {
        let radius = self.problem.settings.clearance_radius;
        let origin = self.problem.onshore;
        let direction = self.centroid - origin;
        let a = direction.norm_squared();

        let mut blocked: Vec<(f64, f64)> = Vec::new();
        for turbine in &self.problem.farm.turbines {
            let offset = origin - turbine.position;
            let c = offset.norm_squared() - radius * radius;
            if a == 0.0 {
                if c < 0.0 {
                    blocked.push((f64::NEG_INFINITY, f64::INFINITY));
                }
                continue;
            }
            let b = 2.0 * direction.dot(&offset);
            let discriminant = b * b - 4.0 * a * c;
            if discriminant <= 0.0 {
                continue;
            }
            let root = discriminant.sqrt();
            blocked.push(((-b - root) / (2.0 * a), (-b + root) / (2.0 * a)));
        }
        blocked.sort_by(|x, y| x.0.total_cmp(&y.0));

        let mut feasible = Vec::new();
        let mut cursor = 0.0_f64;
        for (start, end) in blocked {
            if cursor > 1.0 {
                break;
            }
            if start >= cursor {
                feasible.push((cursor, start.min(1.0)));
            }
            cursor = cursor.max(end);
        }
        if cursor <= 1.0 {
            feasible.push((cursor, 1.0));
        }
        feasible
    }

    /// Total cost at `t`, or `+inf` when the candidate violates clearance.
    pub fn cost_at(&self, t: f64) -> Result<f64> {
        let position = self.candidate(t);
        if !self.is_clear(&position) {
            debug!(t, "candidate inside clearance zone");
            return Ok(f64::INFINITY);
        }
        let (topology, export) = self.design_at(position)?;
        let cost = topology.total_cost + export.total_cost;
        debug!(t, cost, "candidate evaluated");
        Ok(cost)
    }

    fn design_at(&self, position: Position) -> Result<(Topology, ExportConfiguration)> {
        let topology = build_connection_network(
            position,
            &self.problem.farm.turbines,
            &self.problem.catalogs.mv_cables,
        )?;
        let export = optimize_export(
            position,
            self.problem.onshore,
            self.total_power,
            &self.problem.catalogs,
            self.problem.settings.capacity_resolution,
        )?;
        Ok((topology, export))
    }

    /// Cheapest finite-cost point among the feasible intervals. Each interval offers
    /// `near` clamped into it, its midpoint and its two ends; cost ties keep the
    /// earliest candidate, so `near` only decides between equally cheap points.
    fn relocate(&self, intervals: &[(f64, f64)], near: f64) -> Result<(f64, f64)> {
        let mut best: Option<(f64, f64)> = None;
        for &(lo, hi) in intervals {
            for t in [near.clamp(lo, hi), 0.5 * (lo + hi), lo, hi] {
                let cost = self.cost_at(t)?;
                if !cost.is_finite() {
                    continue;
                }
                match best {
                    Some((_, best_cost)) if cost >= best_cost => {}
                    _ => best = Some((t, cost)),
                }
            }
        }
        best.ok_or(DesignError::NoFeasibleCandidate {
            clearance_radius: self.problem.settings.clearance_radius,
        })
    }

    pub fn optimize(&self) -> Result<SystemResult> {
        let settings = self.problem.settings;
        info!(
            scenario = %self.problem.name,
            turbines = self.problem.farm.len(),
            total_power = self.total_power,
            centroid_x = self.centroid.x,
            centroid_y = self.centroid.y,
            "optimising CCP location"
        );

        let intervals = self.feasible_intervals();
        if intervals.is_empty() {
            return Err(DesignError::NoFeasibleCandidate {
                clearance_radius: settings.clearance_radius,
            });
        }

        let search = try_ternary_search(
            |t| self.cost_at(t),
            0.0,
            1.0,
            settings.tolerance,
            settings.max_iterations,
        )?;

        let mut t_star = search.t;
        let mut relocated = false;
        if !self.cost_at(t_star)?.is_finite() {
            let (t, _) = self.relocate(&intervals, t_star)?;
            warn!(
                from = t_star,
                to = t,
                "search settled inside a clearance zone; CCP relocated"
            );
            t_star = t;
            relocated = true;
        }

        let ccp = self.candidate(t_star);
        let (topology, export) = self.design_at(ccp)?;
        let connection_cost = topology.total_cost;
        let export_cost = export.total_cost;
        let total_cost = connection_cost + export_cost;

        info!(
            t = t_star,
            ccp_x = ccp.x,
            ccp_y = ccp.y,
            connection_cost,
            export_cost,
            total_cost,
            export_mode = ?export.mode,
            iterations = search.iterations,
            "CCP location optimised"
        );

        Ok(SystemResult {
            ccp,
            ray_parameter: t_star,
            topology,
            export,
            connection_cost,
            export_cost,
            total_cost,
            search,
            relocated,
        })
    }
}

/// Validates `problem` and runs the full placement search.
pub fn optimize_design(problem: &DesignProblem) -> Result<SystemResult> {
    CcpOptimizer::new(problem)?.optimize()
}
