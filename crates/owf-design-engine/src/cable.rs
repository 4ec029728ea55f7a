//! ---
//! owf_section: "08-energy-models-optimization"
//! owf_subsection: "module"
//! owf_type: "source"
//! owf_scope: "code"
//! owf_description: "Collection and export design routines for offshore wind farms."
//! owf_version: "v0.0.0-prealpha"
//! owf_owner: "tbd"
//! ---
//! Bundled cable selection: parallel circuits of a single catalog type.

use serde::{Deserialize, Serialize};

use crate::{
    errors::{DesignError, Result},
    model::CableType,
};

/// A cable type together with the number of parallel circuits laid.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CableBundle {
    pub cable: CableType,
    pub count: u32,
    /// `count * cable.cost_per_meter`.
    pub cost_per_meter: f64,
}

impl CableBundle {
    pub fn cost_for_length(&self, length: f64) -> f64 {
        self.cost_per_meter * length
    }

    pub fn capacity(&self) -> f64 {
        self.cable.rated_power * f64::from(self.count)
    }
}

/// Number of circuits of `cable` needed to carry `required_power`.
pub fn circuits_needed(required_power: f64, cable: &CableType) -> u32 {
    ((required_power / cable.rated_power).ceil() as u32).max(1)
}

/// Picks the cheapest bundle per unit length able to carry `required_power`.
///
/// Every catalog entry is evaluated on its own; entries are never mixed within a
/// bundle. On equal bundled cost the earliest catalog entry wins.
pub fn select_cable_bundle(required_power: f64, catalog: &[CableType]) -> Result<CableBundle> {
    if !(required_power.is_finite() && required_power > 0.0) {
        return Err(DesignError::invalid(format!(
            "required power must be positive, got {}",
            required_power
        )));
    }
    let Some(first) = catalog.first() else {
        return Err(DesignError::EmptyCatalog);
    };

    let mut best_idx = 0;
    let mut best_count = circuits_needed(required_power, first);
    let mut best_cost = f64::from(best_count) * first.cost_per_meter;
    for (idx, cable) in catalog.iter().enumerate().skip(1) {
        let count = circuits_needed(required_power, cable);
        let cost = f64::from(count) * cable.cost_per_meter;
        if cost < best_cost {
            best_idx = idx;
            best_count = count;
            best_cost = cost;
        }
    }

    Ok(CableBundle {
        cable: catalog[best_idx].clone(),
        count: best_count,
        cost_per_meter: best_cost,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CableFamily;

    fn mv(name: &str, rating: f64, cost: f64) -> CableType {
        CableType::new(name, CableFamily::Mv, rating, cost)
    }

    #[test]
    fn picks_cheapest_bundle() {
        let catalog = vec![mv("mv1", 58.29, 1110.0), mv("mv2", 90.87, 1515.0)];
        // 84 needs two mv1 circuits (2220/m) or one mv2 (1515/m).
        let bundle = select_cable_bundle(84.0, &catalog).unwrap();
        assert_eq!(bundle.cable.name, "mv2");
        assert_eq!(bundle.count, 1);
        assert_eq!(bundle.cost_per_meter, 1515.0);

        // 12 fits a single mv1.
        let bundle = select_cable_bundle(12.0, &catalog).unwrap();
        assert_eq!(bundle.cable.name, "mv1");
        assert_eq!(bundle.count, 1);
    }

    #[test]
    fn bundles_parallel_circuits() {
        let catalog = vec![mv("mv1", 5.0, 10.0)];
        let bundle = select_cable_bundle(6.0, &catalog).unwrap();
        assert_eq!(bundle.count, 2);
        assert_eq!(bundle.cost_per_meter, 20.0);
        assert_eq!(bundle.capacity(), 10.0);
        assert_eq!(bundle.cost_for_length(100.0), 2000.0);

        let exact = select_cable_bundle(10.0, &catalog).unwrap();
        assert_eq!(exact.count, 2);
    }

    #[test]
    fn ties_resolve_to_first_entry() {
        let catalog = vec![mv("a", 10.0, 20.0), mv("b", 5.0, 10.0)];
        // 10 -> a: 1 x 20, b: 2 x 10; both 20/m.
        let bundle = select_cable_bundle(10.0, &catalog).unwrap();
        assert_eq!(bundle.cable.name, "a");
    }

    #[test]
    fn empty_catalog_is_a_configuration_error() {
        assert!(matches!(
            select_cable_bundle(1.0, &[]),
            Err(DesignError::EmptyCatalog)
        ));
    }

    #[test]
    fn rejects_non_positive_power() {
        let catalog = vec![mv("mv1", 5.0, 10.0)];
        assert!(select_cable_bundle(0.0, &catalog).is_err());
        assert!(select_cable_bundle(f64::NAN, &catalog).is_err());
    }
}
