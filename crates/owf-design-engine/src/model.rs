//! ---
//! owf_section: "08-energy-models-optimization"
//! owf_subsection: "module"
//! owf_type: "source"
//! owf_scope: "code"
//! owf_description: "Collection and export design routines for offshore wind farms."
//! owf_version: "v0.0.0-prealpha"
//! owf_owner: "tbd"
//! ---
use std::{collections::HashSet, fmt, str::FromStr};

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::errors::{DesignError, Result};

/// Planar site coordinates, in the same length unit as cable costs.
pub type Position = Point2<f64>;

pub const DEFAULT_CLEARANCE_RADIUS: f64 = 250.0;
pub const DEFAULT_TOLERANCE: f64 = 1e-3;
pub const DEFAULT_MAX_ITERATIONS: usize = 200;
pub const DEFAULT_CAPACITY_RESOLUTION: f64 = 1.0;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct TurbineId(pub u32);

impl fmt::Display for TurbineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Turbine {
    pub id: TurbineId,
    pub position: Position,
    pub rated_power: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct WindFarm {
    pub turbines: Vec<Turbine>,
}

impl WindFarm {
    /// Builds a farm of identically rated turbines; ids start at 1, 0 is the CCP.
    pub fn uniform(positions: impl IntoIterator<Item = Position>, rated_power: f64) -> Self {
        let turbines = positions
            .into_iter()
            .enumerate()
            .map(|(idx, position)| Turbine {
                id: TurbineId(idx as u32 + 1),
                position,
                rated_power,
            })
            .collect();
        Self { turbines }
    }

    pub fn len(&self) -> usize {
        self.turbines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turbines.is_empty()
    }

    pub fn total_power(&self) -> f64 {
        self.turbines.iter().map(|t| t.rated_power).sum()
    }

    pub fn centroid(&self) -> Option<Position> {
        if self.turbines.is_empty() {
            return None;
        }
        let n = self.turbines.len() as f64;
        let (sx, sy) = self
            .turbines
            .iter()
            .fold((0.0, 0.0), |(sx, sy), t| (sx + t.position.x, sy + t.position.y));
        Some(Position::new(sx / n, sy / n))
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum CableFamily {
    Mv,
    Hv,
}

impl fmt::Display for CableFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CableFamily::Mv => f.write_str("MV"),
            CableFamily::Hv => f.write_str("HV"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CableType {
    pub name: String,
    pub family: CableFamily,
    pub rated_power: f64,
    pub cost_per_meter: f64,
}

impl CableType {
    pub fn new(
        name: impl Into<String>,
        family: CableFamily,
        rated_power: f64,
        cost_per_meter: f64,
    ) -> Self {
        Self {
            name: name.into(),
            family,
            rated_power,
            cost_per_meter,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TransformerType {
    pub name: String,
    pub rated_power: f64,
    pub cost: f64,
}

impl TransformerType {
    pub fn new(name: impl Into<String>, rated_power: f64, cost: f64) -> Self {
        Self {
            name: name.into(),
            rated_power,
            cost,
        }
    }
}

/// Catalog targeted by a cost-scaling sensitivity run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum CatalogKind {
    MvCables,
    HvCables,
    Transformers,
}

impl FromStr for CatalogKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mv" | "mv-cables" => Ok(CatalogKind::MvCables),
            "hv" | "hv-cables" => Ok(CatalogKind::HvCables),
            "transformer" | "transformers" => Ok(CatalogKind::Transformers),
            other => Err(format!("unknown catalog: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Catalogs {
    pub mv_cables: Vec<CableType>,
    #[serde(default)]
    pub hv_cables: Option<Vec<CableType>>,
    #[serde(default)]
    pub transformers: Option<Vec<TransformerType>>,
}

impl Catalogs {
    pub fn mv_only(mv_cables: Vec<CableType>) -> Self {
        Self {
            mv_cables,
            hv_cables: None,
            transformers: None,
        }
    }

    /// HV cables, or `None` when the catalog is absent or empty.
    pub fn hv_cables(&self) -> Option<&[CableType]> {
        self.hv_cables.as_deref().filter(|c| !c.is_empty())
    }

    pub fn transformers(&self) -> Option<&[TransformerType]> {
        self.transformers.as_deref().filter(|t| !t.is_empty())
    }

    /// Copy of the catalogs with the cost field of `kind` multiplied by `factor`.
    pub fn scaled(&self, kind: CatalogKind, factor: f64) -> Self {
        let mut scaled = self.clone();
        match kind {
            CatalogKind::MvCables => scaled
                .mv_cables
                .iter_mut()
                .for_each(|c| c.cost_per_meter *= factor),
            CatalogKind::HvCables => scaled
                .hv_cables
                .iter_mut()
                .flatten()
                .for_each(|c| c.cost_per_meter *= factor),
            CatalogKind::Transformers => scaled
                .transformers
                .iter_mut()
                .flatten()
                .for_each(|t| t.cost *= factor),
        }
        scaled
    }

    pub fn validate(&self) -> Result<()> {
        if self.mv_cables.is_empty() {
            return Err(DesignError::invalid("MV cable catalog must not be empty"));
        }
        validate_cables(&self.mv_cables, CableFamily::Mv)?;
        if let Some(hv) = &self.hv_cables {
            validate_cables(hv, CableFamily::Hv)?;
        }
        // Reports and transformer plans key entries by name.
        ensure_unique_names(
            "cable",
            self.mv_cables
                .iter()
                .chain(self.hv_cables.iter().flatten())
                .map(|c| c.name.as_str()),
        )?;
        ensure_unique_names(
            "transformer",
            self.transformers.iter().flatten().map(|t| t.name.as_str()),
        )?;
        for transformer in self.transformers.iter().flatten() {
            ensure_positive(
                &format!("transformer {} rated_power", transformer.name),
                transformer.rated_power,
            )?;
            ensure_positive(
                &format!("transformer {} cost", transformer.name),
                transformer.cost,
            )?;
        }
        Ok(())
    }
}

fn ensure_unique_names<'a>(kind: &str, names: impl Iterator<Item = &'a str>) -> Result<()> {
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name) {
            return Err(DesignError::invalid(format!("duplicate {} name {:?}", kind, name)));
        }
    }
    Ok(())
}

fn validate_cables(cables: &[CableType], family: CableFamily) -> Result<()> {
    for cable in cables {
        if cable.family != family {
            return Err(DesignError::invalid(format!(
                "cable {} is tagged {} but listed in the {} catalog",
                cable.name, cable.family, family
            )));
        }
        ensure_positive(&format!("cable {} rated_power", cable.name), cable.rated_power)?;
        ensure_positive(
            &format!("cable {} cost_per_meter", cable.name),
            cable.cost_per_meter,
        )?;
    }
    Ok(())
}

fn ensure_positive(label: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(DesignError::invalid(format!(
            "{} must be positive and finite, got {}",
            label, value
        )))
    }
}

fn default_clearance_radius() -> f64 {
    DEFAULT_CLEARANCE_RADIUS
}

fn default_tolerance() -> f64 {
    DEFAULT_TOLERANCE
}

fn default_max_iterations() -> usize {
    DEFAULT_MAX_ITERATIONS
}

fn default_capacity_resolution() -> f64 {
    DEFAULT_CAPACITY_RESOLUTION
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SearchSettings {
    #[serde(default = "default_clearance_radius")]
    pub clearance_radius: f64,
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
    /// Power quantum used when tabulating transformer capacity.
    #[serde(default = "default_capacity_resolution")]
    pub capacity_resolution: f64,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            clearance_radius: default_clearance_radius(),
            tolerance: default_tolerance(),
            max_iterations: default_max_iterations(),
            capacity_resolution: default_capacity_resolution(),
        }
    }
}

impl SearchSettings {
    pub fn validate(&self) -> Result<()> {
        if !(self.clearance_radius.is_finite() && self.clearance_radius >= 0.0) {
            return Err(DesignError::invalid(format!(
                "clearance_radius must be non-negative, got {}",
                self.clearance_radius
            )));
        }
        ensure_positive("tolerance", self.tolerance)?;
        ensure_positive("capacity_resolution", self.capacity_resolution)?;
        if self.max_iterations == 0 {
            return Err(DesignError::invalid("max_iterations must be at least 1"));
        }
        Ok(())
    }
}

/// Everything a single optimisation run reads. Treated as immutable for the run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DesignProblem {
    pub name: String,
    pub farm: WindFarm,
    pub onshore: Position,
    pub catalogs: Catalogs,
    pub settings: SearchSettings,
}

impl DesignProblem {
    pub fn new(name: impl Into<String>, farm: WindFarm, catalogs: Catalogs) -> Self {
        Self {
            name: name.into(),
            farm,
            onshore: Position::origin(),
            catalogs,
            settings: SearchSettings::default(),
        }
    }

    pub fn with_onshore(mut self, onshore: Position) -> Self {
        self.onshore = onshore;
        self
    }

    pub fn with_settings(mut self, settings: SearchSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn total_power(&self) -> f64 {
        self.farm.total_power()
    }

    pub fn validate(&self) -> Result<()> {
        if self.farm.is_empty() {
            return Err(DesignError::invalid("wind farm has no turbines"));
        }
        if !(self.onshore.x.is_finite() && self.onshore.y.is_finite()) {
            return Err(DesignError::invalid("onshore point must be finite"));
        }
        let mut seen = HashSet::with_capacity(self.farm.len());
        for turbine in &self.farm.turbines {
            if !seen.insert(turbine.id) {
                return Err(DesignError::invalid(format!(
                    "duplicate turbine id {}",
                    turbine.id
                )));
            }
            if !(turbine.position.x.is_finite() && turbine.position.y.is_finite()) {
                return Err(DesignError::invalid(format!(
                    "turbine {} has a non-finite position",
                    turbine.id
                )));
            }
            ensure_positive(
                &format!("turbine {} rated_power", turbine.id),
                turbine.rated_power,
            )?;
        }
        self.catalogs.validate()?;
        self.settings.validate()
    }
}
