//! # Building Estimate
//!
//! Whole-building quantities from a building-type preset: each per-m² rate
//! (rebar, concrete, formwork, sand) times the floor area.
//!
//! Presets are narrowed by wall-thickness bracket first. A preset key that
//! is unknown, or outside the chosen bracket, selects the first preset of
//! the bracket; an empty bracket filter allows every preset.

use serde::{Deserialize, Serialize};

use crate::calculators::{Calculator, CalculatorId, TakeoffContext};
use crate::input::{lenient, num};
use crate::presets::{BuildingPreset, PresetCatalog};
use crate::record::MaterialLine;
use crate::units::AreaUnit;
use crate::wastage::{MaterialCategory, WastageConfig, WastageDefaults};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BuildingEstimateInput {
    /// Building-type preset key
    #[serde(default, deserialize_with = "lenient::key")]
    pub preset: String,

    /// Wall-thickness bracket filter (cm), empty for all
    #[serde(default, deserialize_with = "lenient::key")]
    pub wall_bracket: String,

    #[serde(default, deserialize_with = "lenient::f64")]
    pub floor_area: f64,

    #[serde(default, deserialize_with = "lenient::area_unit")]
    pub unit: AreaUnit,

    #[serde(default)]
    pub wastage: WastageConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingEstimateResult {
    /// Preset actually used; `None` when the bracket has no presets
    pub preset: Option<String>,
    pub label: String,
    pub floor_area_sqm: f64,
    pub rebar_kg: f64,
    pub concrete_m3: f64,
    pub formwork_sqm: f64,
    pub sand_m3: f64,
}

/// Presets a user may choose from under a bracket filter
pub fn available_presets<'a>(input: &BuildingEstimateInput, catalog: &'a PresetCatalog) -> Vec<&'a BuildingPreset> {
    catalog.buildings_for_wall(&input.wall_bracket)
}

/// The preset an input resolves to
pub fn select_preset<'a>(input: &BuildingEstimateInput, catalog: &'a PresetCatalog) -> Option<&'a BuildingPreset> {
    let available = available_presets(input, catalog);
    let key = input.preset.trim();
    available
        .iter()
        .find(|p| p.key == key)
        .or_else(|| available.first())
        .copied()
}

pub fn calculate(input: &BuildingEstimateInput, catalog: &PresetCatalog) -> BuildingEstimateResult {
    let floor_area_sqm = num(input.unit.to_sqm(num(input.floor_area)));
    match select_preset(input, catalog) {
        Some(p) => BuildingEstimateResult {
            preset: Some(p.key.clone()),
            label: p.label.clone(),
            floor_area_sqm,
            rebar_kg: num(floor_area_sqm * p.rebar_kg_per_sqm),
            concrete_m3: num(floor_area_sqm * p.concrete_m3_per_sqm),
            formwork_sqm: num(floor_area_sqm * p.formwork_sqm_per_sqm),
            sand_m3: num(floor_area_sqm * p.sand_m3_per_sqm),
        },
        None => {
            tracing::debug!(bracket = %input.wall_bracket, "no building preset in bracket");
            BuildingEstimateResult {
                preset: None,
                label: String::new(),
                floor_area_sqm,
                rebar_kg: 0.0,
                concrete_m3: 0.0,
                formwork_sqm: 0.0,
                sand_m3: 0.0,
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BuildingEstimateCalculator {
    #[serde(default)]
    pub input: BuildingEstimateInput,
}

impl BuildingEstimateCalculator {
    fn line(
        &self,
        category: MaterialCategory,
        sub_type: &str,
        label: String,
        quantity: f64,
        unit: &str,
        defaults: &WastageDefaults,
    ) -> MaterialLine {
        let adjusted = self.input.wastage.apply(quantity, category, defaults);
        MaterialLine::new(category, sub_type, label, quantity, unit, adjusted)
    }
}

impl Calculator for BuildingEstimateCalculator {
    fn id(&self) -> CalculatorId {
        CalculatorId::Building
    }

    fn material_lines(&self, ctx: &TakeoffContext<'_>) -> Vec<MaterialLine> {
        let r = calculate(&self.input, ctx.catalog);
        let name = if r.label.is_empty() { "Building" } else { r.label.as_str() };
        vec![
            self.line(
                MaterialCategory::Rebar,
                "building_estimate",
                format!("{} rebar", name),
                r.rebar_kg,
                "kg",
                ctx.wastage,
            ),
            self.line(
                MaterialCategory::Concrete,
                "building_estimate",
                format!("{} concrete", name),
                r.concrete_m3,
                "m³",
                ctx.wastage,
            ),
            self.line(
                MaterialCategory::Formwork,
                "building_estimate",
                format!("{} formwork", name),
                r.formwork_sqm,
                "m²",
                ctx.wastage,
            ),
            self.line(
                MaterialCategory::Mortar,
                "building_sand",
                format!("{} sand", name),
                r.sand_m3,
                "m³",
                ctx.wastage,
            ),
        ]
    }
}
