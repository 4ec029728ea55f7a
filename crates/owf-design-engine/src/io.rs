//! ---
//! owf_section: "08-energy-models-optimization"
//! owf_subsection: "module"
//! owf_type: "source"
//! owf_scope: "code"
//! owf_description: "Collection and export design routines for offshore wind farms."
//! owf_version: "v0.0.0-prealpha"
//! owf_owner: "tbd"
//! ---
use std::{fs, path::Path};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    errors::{DesignError, Result},
    layout::StaggeredGrid,
    model::{CatalogKind, Catalogs, DesignProblem, Position, SearchSettings, WindFarm},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioFormat {
    Json,
    Yaml,
    Toml,
}

impl ScenarioFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "json" => Some(ScenarioFormat::Json),
            "yaml" | "yml" => Some(ScenarioFormat::Yaml),
            "toml" => Some(ScenarioFormat::Toml),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "layout", rename_all = "kebab-case")]
pub enum TurbineLayout {
    Explicit { positions: Vec<Position> },
    Staggered(StaggeredGrid),
}

impl TurbineLayout {
    pub fn positions(&self) -> Vec<Position> {
        match self {
            TurbineLayout::Explicit { positions } => positions.clone(),
            TurbineLayout::Staggered(grid) => grid.positions(),
        }
    }
}

/// Per-scenario overrides on top of the configured search defaults.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct SearchOverrides {
    pub clearance_radius: Option<f64>,
    pub tolerance: Option<f64>,
    pub max_iterations: Option<usize>,
    pub capacity_resolution: Option<f64>,
}

impl SearchOverrides {
    pub fn apply(&self, base: SearchSettings) -> SearchSettings {
        SearchSettings {
            clearance_radius: self.clearance_radius.unwrap_or(base.clearance_radius),
            tolerance: self.tolerance.unwrap_or(base.tolerance),
            max_iterations: self.max_iterations.unwrap_or(base.max_iterations),
            capacity_resolution: self.capacity_resolution.unwrap_or(base.capacity_resolution),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CostScaling {
    pub target: CatalogKind,
    pub factor: f64,
}

fn default_onshore() -> Position {
    Position::origin()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Scenario {
    pub name: String,
    #[serde(default = "default_onshore")]
    pub onshore: Position,
    pub turbine_power: f64,
    pub turbines: TurbineLayout,
    pub catalogs: Catalogs,
    #[serde(default)]
    pub search: SearchOverrides,
    #[serde(default)]
    pub cost_scaling: Option<CostScaling>,
}

impl Scenario {
    /// Resolves the scenario against `defaults` and validates the resulting problem.
    pub fn into_problem(self, defaults: SearchSettings) -> Result<DesignProblem> {
        let catalogs = match self.cost_scaling {
            Some(CostScaling { target, factor }) => {
                if !(factor.is_finite() && factor > 0.0) {
                    return Err(DesignError::invalid(format!(
                        "cost scaling factor must be positive, got {}",
                        factor
                    )));
                }
                self.catalogs.scaled(target, factor)
            }
            None => self.catalogs,
        };
        let farm = WindFarm::uniform(self.turbines.positions(), self.turbine_power);
        let problem = DesignProblem::new(self.name, farm, catalogs)
            .with_onshore(self.onshore)
            .with_settings(self.search.apply(defaults));
        problem.validate()?;
        Ok(problem)
    }
}

pub fn parse_scenario(data: &str, format: Option<ScenarioFormat>) -> Result<Scenario> {
    let scenario = match format {
        Some(ScenarioFormat::Json) => serde_json::from_str(data)?,
        Some(ScenarioFormat::Yaml) => serde_yaml::from_str(data)?,
        Some(ScenarioFormat::Toml) => toml::from_str(data)?,
        None if data.trim_start().starts_with('{') => serde_json::from_str(data)?,
        None => match toml::from_str(data) {
            Ok(scenario) => scenario,
            Err(_) => serde_yaml::from_str(data)?,
        },
    };
    Ok(scenario)
}

pub fn load_scenario_from_file(path: impl AsRef<Path>) -> Result<Scenario> {
    let path = path.as_ref();
    let data = fs::read_to_string(path)?;
    let format = ScenarioFormat::from_path(path);
    debug!(path = %path.display(), ?format, "loading scenario");
    parse_scenario(&data, format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CableFamily;

    const TOML_SCENARIO: &str = r#"
name = "grid-4x7"
turbine_power = 12.0

[turbines]
layout = "staggered"
rows = 4
cols = 7

[search]
clearance_radius = 300.0

[[catalogs.mv_cables]]
name = "mv1"
family = "mv"
rated_power = 5.0
cost_per_meter = 10.0
"#;

    #[test]
    fn toml_scenario_with_grid_layout() {
        let scenario = parse_scenario(TOML_SCENARIO, Some(ScenarioFormat::Toml)).unwrap();
        let problem = scenario.into_problem(SearchSettings::default()).unwrap();
        assert_eq!(problem.farm.len(), 28);
        assert_eq!(problem.onshore, Position::origin());
        assert_eq!(problem.settings.clearance_radius, 300.0);
        assert_eq!(problem.settings.tolerance, SearchSettings::default().tolerance);
    }

    #[test]
    fn json_is_sniffed_without_extension() {
        let json = r#"{
            "name": "pair",
            "onshore": [0.0, 100.0],
            "turbine_power": 2.0,
            "turbines": {"layout": "explicit", "positions": [[1000.0, 0.0], [2000.0, 0.0]]},
            "catalogs": {"mv_cables": [{"name": "mv1", "family": "mv", "rated_power": 5.0, "cost_per_meter": 10.0}]},
            "cost_scaling": {"target": "mv-cables", "factor": 2.0}
        }"#;
        let problem = parse_scenario(json, None)
            .unwrap()
            .into_problem(SearchSettings::default())
            .unwrap();
        assert_eq!(problem.onshore, Position::new(0.0, 100.0));
        assert_eq!(problem.catalogs.mv_cables[0].cost_per_meter, 20.0);
        assert_eq!(problem.catalogs.mv_cables[0].family, CableFamily::Mv);
    }

    #[test]
    fn yaml_falls_back_when_toml_fails() {
        let yaml = "name: pair\nturbine_power: 2.0\nturbines:\n  layout: explicit\n  positions:\n    - [1000.0, 0.0]\ncatalogs:\n  mv_cables:\n    - {name: mv1, family: mv, rated_power: 5.0, cost_per_meter: 10.0}\n";
        let scenario = parse_scenario(yaml, None).unwrap();
        assert_eq!(scenario.name, "pair");
        assert_eq!(scenario.turbines.positions().len(), 1);
    }

    #[test]
    fn empty_explicit_layout_is_rejected() {
        let yaml = "name: none\nturbine_power: 2.0\nturbines: {layout: explicit, positions: []}\ncatalogs:\n  mv_cables:\n    - {name: mv1, family: mv, rated_power: 5.0, cost_per_meter: 10.0}\n";
        let err = parse_scenario(yaml, Some(ScenarioFormat::Yaml))
            .unwrap()
            .into_problem(SearchSettings::default())
            .unwrap_err();
        assert!(matches!(err, DesignError::InvalidInput(_)));
    }
}
