//! ---
//! owf_section: "08-energy-models-optimization"
//! owf_subsection: "module"
//! owf_type: "source"
//! owf_scope: "code"
//! owf_description: "Collection and export design routines for offshore wind farms."
//! owf_version: "v0.0.0-prealpha"
//! owf_owner: "tbd"
//! ---
use std::{
    fs,
    path::{Path, PathBuf},
};

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::{errors::Result, export::ExportMode, model::Position, DesignReport};

#[derive(Debug)]
pub struct ReportExporter<'a> {
    report: &'a DesignReport,
}

impl<'a> ReportExporter<'a> {
    pub fn new(report: &'a DesignReport) -> Self {
        Self { report }
    }

    /// Writes the JSON reports and, when `include_csv` is set, the bill of quantities.
    pub fn export_all(&self, output_dir: &Path, include_csv: bool) -> Result<Vec<PathBuf>> {
        if !output_dir.exists() {
            fs::create_dir_all(output_dir)?;
        }

        let timestamp = self.report.timestamp.to_rfc3339();
        let result = &self.report.result;
        let summary = self.summary();

        let topology_report = ReportEnvelope::new(
            &timestamp,
            self.report.run_id,
            &self.report.scenario,
            topology_schema(),
            &result.topology,
        );
        let export_report = ReportEnvelope::new(
            &timestamp,
            self.report.run_id,
            &self.report.scenario,
            export_schema(),
            &result.export,
        );
        let summary_report = ReportEnvelope::new(
            &timestamp,
            self.report.run_id,
            &self.report.scenario,
            summary_schema(),
            &summary,
        );

        let mut written = vec![
            output_dir.join("topology.json"),
            output_dir.join("export.json"),
            output_dir.join("summary.json"),
        ];
        write_json(&written[0], &topology_report)?;
        write_json(&written[1], &export_report)?;
        write_json(&written[2], &summary_report)?;

        if include_csv {
            let path = output_dir.join("bill_of_quantities.csv");
            self.write_bill_of_quantities(&path)?;
            written.push(path);
        }

        info!("Reports exported to {}", output_dir.display());
        Ok(written)
    }

    pub fn summary(&self) -> DesignSummary {
        let result = &self.report.result;
        DesignSummary {
            scenario: self.report.scenario.clone(),
            turbine_count: self.report.turbine_count,
            total_power: self.report.total_power,
            ccp: result.ccp,
            ray_parameter: result.ray_parameter,
            export_mode: result.export.mode,
            connection_cost: result.connection_cost,
            export_cost: result.export_cost,
            total_cost: result.total_cost,
            collection_length: result.topology.total_length(),
            export_length: result.export.length,
            iterations: result.search.iterations,
            converged: result.search.converged,
            relocated: result.relocated,
        }
    }

    /// One row per cable type and usage, plus one per transformer type, in first-seen order.
    pub fn bill_of_quantities(&self) -> Vec<QuantityRow> {
        let result = &self.report.result;
        let mut cables: IndexMap<(&'static str, String), QuantityRow> = IndexMap::new();

        let mut add_cable =
            |usage: &'static str, name: &str, family: String, length: f64, cost: f64| {
                let row = cables
                    .entry((usage, name.to_string()))
                    .or_insert_with(|| QuantityRow {
                        category: format!("{}-cable", family),
                        usage: usage.to_string(),
                        item: name.to_string(),
                        quantity: 0.0,
                        unit: "m".to_string(),
                        cost: 0.0,
                    });
                row.quantity += length;
                row.cost += cost;
            };

        for edge in &result.topology.edges {
            add_cable(
                "collection",
                &edge.bundle.cable.name,
                edge.bundle.cable.family.to_string().to_lowercase(),
                edge.length * f64::from(edge.bundle.count),
                edge.cost,
            );
        }
        let export = &result.export;
        add_cable(
            "export",
            &export.bundle.cable.name,
            export.bundle.cable.family.to_string().to_lowercase(),
            export.length * f64::from(export.bundle.count),
            export.cable_cost,
        );

        let mut rows: Vec<QuantityRow> = cables.into_values().collect();
        for (name, &count) in export.transformer_usage.iter().flatten() {
            let unit_cost = self
                .report
                .catalogs
                .transformers
                .iter()
                .flatten()
                .find(|t| &t.name == name)
                .map(|t| t.cost)
                .unwrap_or(0.0);
            rows.push(QuantityRow {
                category: "transformer".to_string(),
                usage: "export".to_string(),
                item: name.clone(),
                quantity: f64::from(count),
                unit: "pcs".to_string(),
                cost: unit_cost * f64::from(count),
            });
        }
        rows
    }

    pub fn write_bill_of_quantities(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)?;
        for row in self.bill_of_quantities() {
            writer.serialize(row)?;
        }
        writer.flush()?;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DesignSummary {
    pub scenario: String,
    pub turbine_count: usize,
    pub total_power: f64,
    pub ccp: Position,
    pub ray_parameter: f64,
    pub export_mode: ExportMode,
    pub connection_cost: f64,
    pub export_cost: f64,
    pub total_cost: f64,
    pub collection_length: f64,
    pub export_length: f64,
    pub iterations: usize,
    pub converged: bool,
    pub relocated: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct QuantityRow {
    pub category: String,
    pub usage: String,
    pub item: String,
    pub quantity: f64,
    pub unit: String,
    pub cost: f64,
}

#[derive(Debug, Serialize)]
struct ReportEnvelope<'a, T: Serialize> {
    timestamp: &'a str,
    run_id: Uuid,
    scenario: &'a str,
    schema: serde_json::Value,
    data: &'a T,
}

impl<'a, T: Serialize> ReportEnvelope<'a, T> {
    fn new(
        timestamp: &'a str,
        run_id: Uuid,
        scenario: &'a str,
        schema: serde_json::Value,
        data: &'a T,
    ) -> Self {
        Self {
            timestamp,
            run_id,
            scenario,
            schema,
            data,
        }
    }
}

fn write_json<T: Serialize>(path: impl AsRef<Path>, value: &T) -> Result<()> {
    let serialized = serde_json::to_string_pretty(value)?;
    fs::write(path, serialized)?;
    Ok(())
}

fn point_schema() -> serde_json::Value {
    json!({
        "type": "array",
        "items": {"type": "number"},
        "minItems": 2,
        "maxItems": 2
    })
}

fn bundle_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "cable": {
                "type": "object",
                "properties": {
                    "name": {"type": "string"},
                    "family": {"enum": ["mv", "hv"]},
                    "rated_power": {"type": "number"},
                    "cost_per_meter": {"type": "number"}
                },
                "required": ["name", "family", "rated_power", "cost_per_meter"]
            },
            "count": {"type": "integer", "minimum": 1},
            "cost_per_meter": {"type": "number"}
        },
        "required": ["cable", "count", "cost_per_meter"]
    })
}

fn topology_schema() -> serde_json::Value {
    let node = json!({
        "type": "object",
        "properties": {
            "kind": {"enum": ["ccp", "turbine"]},
            "id": {"type": "integer"}
        },
        "required": ["kind"]
    });
    json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": "CollectionTopologyReport",
        "type": "object",
        "properties": {
            "ccp": point_schema(),
            "edges": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "from": node,
                        "to": node,
                        "from_position": point_schema(),
                        "to_position": point_schema(),
                        "length": {"type": "number"},
                        "flow": {"type": "number"},
                        "bundle": bundle_schema(),
                        "cost": {"type": "number"}
                    },
                    "required": ["from", "to", "length", "flow", "bundle", "cost"]
                }
            },
            "total_cost": {"type": "number"}
        },
        "required": ["ccp", "edges", "total_cost"]
    })
}

fn export_schema() -> serde_json::Value {
    json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": "ExportConfigurationReport",
        "type": "object",
        "properties": {
            "mode": {"enum": ["mv-only", "hv"]},
            "length": {"type": "number"},
            "bundle": bundle_schema(),
            "cable_cost": {"type": "number"},
            "transformer_usage": {
                "type": ["object", "null"],
                "additionalProperties": {"type": "integer", "minimum": 0}
            },
            "transformer_cost": {"type": "number"},
            "total_cost": {"type": "number"},
            "mv_only_cost": {"type": "number"},
            "hv_cost": {"type": ["number", "null"]}
        },
        "required": ["mode", "length", "bundle", "cable_cost", "total_cost", "mv_only_cost"]
    })
}

fn summary_schema() -> serde_json::Value {
    json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": "DesignSummaryReport",
        "type": "object",
        "properties": {
            "scenario": {"type": "string"},
            "turbine_count": {"type": "integer"},
            "total_power": {"type": "number"},
            "ccp": point_schema(),
            "ray_parameter": {"type": "number", "minimum": 0, "maximum": 1},
            "export_mode": {"enum": ["mv-only", "hv"]},
            "connection_cost": {"type": "number"},
            "export_cost": {"type": "number"},
            "total_cost": {"type": "number"},
            "collection_length": {"type": "number"},
            "export_length": {"type": "number"},
            "iterations": {"type": "integer"},
            "converged": {"type": "boolean"},
            "relocated": {"type": "boolean"}
        },
        "required": ["scenario", "ccp", "ray_parameter", "export_mode", "total_cost"]
    })
}
