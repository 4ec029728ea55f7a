//! ---
//! owf_section: "01-core-functionality"
//! owf_subsection: "module"
//! owf_type: "source"
//! owf_scope: "code"
//! owf_description: "Shared configuration and logging primitives for the design tools."
//! owf_version: "v0.0.0-prealpha"
//! owf_owner: "tbd"
//! ---
//! Shared primitives for the OWF design workspace: configuration loading and
//! tracing setup consumed by the command-line tools.

pub mod config;
pub mod logging;

pub use config::{AppConfig, LoadedAppConfig, LoggingConfig, ReportsConfig};
pub use logging::{init_tracing, LogFormat};
