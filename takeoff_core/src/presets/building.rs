//! Building-Type Presets
//!
//! Whole-building material rates per m² of floor area, grouped by the
//! typical exterior wall thickness of the building type.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingPreset {
    pub key: String,
    pub label: String,
    /// Wall thickness bracket in cm, e.g. "20"
    pub wall_bracket: String,
    pub rebar_kg_per_sqm: f64,
    pub concrete_m3_per_sqm: f64,
    pub formwork_sqm_per_sqm: f64,
    pub sand_m3_per_sqm: f64,
}

fn preset(
    key: &str,
    label: &str,
    wall_bracket: &str,
    rebar_kg_per_sqm: f64,
    concrete_m3_per_sqm: f64,
    formwork_sqm_per_sqm: f64,
    sand_m3_per_sqm: f64,
) -> BuildingPreset {
    BuildingPreset {
        key: key.to_string(),
        label: label.to_string(),
        wall_bracket: wall_bracket.to_string(),
        rebar_kg_per_sqm,
        concrete_m3_per_sqm,
        formwork_sqm_per_sqm,
        sand_m3_per_sqm,
    }
}

pub fn standard_presets() -> Vec<BuildingPreset> {
    vec![
        preset("steel-office-15", "Steel-frame office", "15", 45.0, 0.45, 1.5, 0.30),
        preset("rc-house-15", "RC townhouse, 15 cm walls", "15", 85.0, 0.75, 3.2, 0.45),
        preset("rc-house-20", "RC townhouse, 20 cm walls", "20", 95.0, 0.85, 3.5, 0.50),
        preset("rc-apartment-20", "RC apartment block", "20", 110.0, 0.95, 3.8, 0.50),
        preset("rc-apartment-25", "RC apartment, shear walls", "25", 125.0, 1.05, 4.0, 0.55),
        preset("src-highrise-25", "SRC high-rise", "25", 140.0, 1.00, 3.6, 0.40),
    ]
}
