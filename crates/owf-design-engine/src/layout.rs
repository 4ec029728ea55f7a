//! ---
//! owf_section: "08-energy-models-optimization"
//! owf_subsection: "module"
//! owf_type: "source"
//! owf_scope: "code"
//! owf_description: "Collection and export design routines for offshore wind farms."
//! owf_version: "v0.0.0-prealpha"
//! owf_owner: "tbd"
//! ---
use serde::{Deserialize, Serialize};

use crate::model::{Position, WindFarm};

fn default_origin_x() -> f64 {
    25_000.0
}

fn default_origin_y() -> f64 {
    2_000.0
}

fn default_row_spacing() -> f64 {
    750.0
}

fn default_column_spacing() -> f64 {
    500.0
}

fn default_stagger() -> f64 {
    250.0
}

/// Rectangular layout with every odd row shifted by `stagger`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct StaggeredGrid {
    pub rows: usize,
    pub cols: usize,
    #[serde(default = "default_origin_x")]
    pub origin_x: f64,
    #[serde(default = "default_origin_y")]
    pub origin_y: f64,
    #[serde(default = "default_row_spacing")]
    pub row_spacing: f64,
    #[serde(default = "default_column_spacing")]
    pub column_spacing: f64,
    #[serde(default = "default_stagger")]
    pub stagger: f64,
}

impl StaggeredGrid {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            origin_x: default_origin_x(),
            origin_y: default_origin_y(),
            row_spacing: default_row_spacing(),
            column_spacing: default_column_spacing(),
            stagger: default_stagger(),
        }
    }

    /// Turbine positions, row by row.
    pub fn positions(&self) -> Vec<Position> {
        let mut positions = Vec::with_capacity(self.rows * self.cols);
        for row in 0..self.rows {
            let leftmost = if row % 2 == 0 {
                self.origin_x
            } else {
                self.origin_x + self.stagger
            };
            let y = self.origin_y + row as f64 * self.row_spacing;
            for col in 0..self.cols {
                positions.push(Position::new(leftmost + col as f64 * self.column_spacing, y));
            }
        }
        positions
    }

    pub fn farm(&self, rated_power: f64) -> WindFarm {
        WindFarm::uniform(self.positions(), rated_power)
    }
}
