//! ---
//! owf_section: "08-energy-models-optimization"
//! owf_subsection: "module"
//! owf_type: "source"
//! owf_scope: "code"
//! owf_description: "Collection and export design routines for offshore wind farms."
//! owf_version: "v0.0.0-prealpha"
//! owf_owner: "tbd"
//! ---
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DesignError>;

#[derive(Debug, Error)]
pub enum DesignError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("cable catalog is empty")]
    EmptyCatalog,
    #[error("every CCP candidate on the ray lies within {clearance_radius} of a turbine")]
    NoFeasibleCandidate { clearance_radius: f64 },
    #[error("no transformer combination covers {required_power}")]
    NoFeasibleTransformerCombination { required_power: f64 },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    SerializationFailed(#[from] serde_json::Error),
    #[error("yaml serialization error: {0}")]
    YamlSerializationFailed(#[from] serde_yaml::Error),
    #[error("toml parse error: {0}")]
    TomlParseFailed(#[from] toml::de::Error),
    #[error("csv export error: {0}")]
    CsvExportFailed(#[from] csv::Error),
}

impl DesignError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        DesignError::InvalidInput(message.into())
    }
}
