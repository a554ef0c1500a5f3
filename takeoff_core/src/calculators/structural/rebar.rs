//! # Rebar Weight
//!
//! Two row-based rebar takeoffs:
//!
//! - **Exact**: `weight = unit_weight(size) × length × count`, unit weight
//!   from the bar-size table (kg/m).
//! - **Area estimate**: `amount = area × usage_rate(component, variant)`,
//!   using the empirical kg/m² rates for walls, floors and stairs; the
//!   total is the sum over all three components.
//!
//! ## Example
//!
//! ```rust
//! use takeoff_core::calculators::TakeoffContext;
//! use takeoff_core::calculators::structural::RebarExactCalculator;
//!
//! let ctx = TakeoffContext::standard();
//! let mut calc = RebarExactCalculator::default();
//! calc.rows.update_row(1, "size", "#5");
//! calc.rows.update_row(1, "length", 12.0);
//! calc.rows.update_row(1, "count", 10.0);
//!
//! // 1.56 kg/m × 12 m × 10 bars
//! let summary = calc.summary(&ctx);
//! assert!((summary.total_kg - 187.2).abs() < 1e-9);
//! ```

use serde::{Deserialize, Serialize};

use crate::calculators::{sum, Calculator, CalculatorId, RowCalculator, TakeoffContext};
use crate::input::{lenient, num, FieldValue};
use crate::presets::rebar::DEFAULT_REBAR_KEY;
use crate::presets::{AreaComponent, PresetCatalog};
use crate::record::MaterialLine;
use crate::rows::{RowCollection, RowFields};
use crate::wastage::{apply_wastage, MaterialCategory, WastageConfig};

// ============================================================================
// Exact mode
// ============================================================================

/// A group of identical bars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RebarExactRow {
    /// Bar size key, e.g. "#4" or "D13"
    #[serde(default = "default_size", deserialize_with = "lenient::key")]
    pub size: String,

    /// Length of one bar (m)
    #[serde(default, deserialize_with = "lenient::f64")]
    pub length: f64,

    /// Number of bars
    #[serde(default, deserialize_with = "lenient::f64")]
    pub count: f64,
}

fn default_size() -> String {
    DEFAULT_REBAR_KEY.to_string()
}

impl Default for RebarExactRow {
    fn default() -> Self {
        RebarExactRow {
            size: default_size(),
            length: 0.0,
            count: 0.0,
        }
    }
}

impl RowFields for RebarExactRow {
    fn set_field(&mut self, field: &str, value: &FieldValue) -> bool {
        match field {
            "size" => self.size = value.as_text(),
            "length" => self.length = value.as_f64(),
            "count" => self.count = value.as_f64(),
            _ => return false,
        }
        true
    }
}

/// `unit_weight × length × count` (kg)
pub fn exact_rebar_weight(unit_weight_kg_m: f64, length: f64, count: f64) -> f64 {
    num(num(unit_weight_kg_m) * num(length) * num(count))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RebarExactRowResult {
    pub id: u32,
    pub name: String,
    pub size: String,
    pub unit_weight_kg_m: f64,
    /// Total bar length of the row (m)
    pub total_length_m: f64,
    pub weight_kg: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RebarSummary {
    pub total_kg: f64,
    pub wastage_percent: f64,
    pub total_with_wastage_kg: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RebarExactCalculator {
    #[serde(default)]
    pub rows: RowCollection<RebarExactRow>,
    #[serde(default)]
    pub wastage: WastageConfig,
}

impl RebarExactCalculator {
    fn row_result(row: &crate::rows::Row<RebarExactRow>, catalog: &PresetCatalog) -> RebarExactRowResult {
        let size = catalog.rebar(&row.fields.size);
        RebarExactRowResult {
            id: row.id,
            name: row.display_name(),
            size: size.key.clone(),
            unit_weight_kg_m: size.unit_weight_kg_m,
            total_length_m: num(num(row.fields.length) * num(row.fields.count)),
            weight_kg: exact_rebar_weight(size.unit_weight_kg_m, row.fields.length, row.fields.count),
        }
    }

    pub fn row_results(&self, ctx: &TakeoffContext<'_>) -> Vec<RebarExactRowResult> {
        self.rows.iter().map(|row| Self::row_result(row, ctx.catalog)).collect()
    }

    pub fn summary(&self, ctx: &TakeoffContext<'_>) -> RebarSummary {
        let total_kg = sum(self.row_results(ctx).into_iter().map(|r| r.weight_kg));
        let wastage_percent = self.wastage.effective_rate(MaterialCategory::Rebar, ctx.wastage);
        RebarSummary {
            total_kg,
            wastage_percent,
            total_with_wastage_kg: apply_wastage(total_kg, wastage_percent),
        }
    }
}

impl Calculator for RebarExactCalculator {
    fn id(&self) -> CalculatorId {
        CalculatorId::RebarExact
    }

    fn material_lines(&self, ctx: &TakeoffContext<'_>) -> Vec<MaterialLine> {
        let results = self.row_results(ctx);

        // One line per bar size, in catalog order
        ctx.catalog
            .rebar_sizes
            .iter()
            .filter(|size| results.iter().any(|r| r.size == size.key))
            .map(|size| {
                let weight = sum(results.iter().filter(|r| r.size == size.key).map(|r| r.weight_kg));
                MaterialLine::new(
                    MaterialCategory::Rebar,
                    size.key.clone(),
                    format!("Rebar {}", size.label()),
                    weight,
                    "kg",
                    self.wastage.apply(weight, MaterialCategory::Rebar, ctx.wastage),
                )
            })
            .collect()
    }
}

impl RowCalculator for RebarExactCalculator {
    type Row = RebarExactRow;

    fn rows(&self) -> &RowCollection<RebarExactRow> {
        &self.rows
    }

    fn rows_mut(&mut self) -> &mut RowCollection<RebarExactRow> {
        &mut self.rows
    }
}

// ============================================================================
// Area-estimate mode
// ============================================================================

/// An area of wall, floor or stair to be estimated by usage rate.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RebarAreaRow {
    #[serde(default, deserialize_with = "lenient::area_component")]
    pub component: AreaComponent,

    /// Index into the component's usage-rate variants
    #[serde(default, deserialize_with = "lenient::index")]
    pub variant: usize,

    /// Component area (m²)
    #[serde(default, deserialize_with = "lenient::f64")]
    pub area: f64,
}

impl RowFields for RebarAreaRow {
    fn set_field(&mut self, field: &str, value: &FieldValue) -> bool {
        match field {
            "component" => match AreaComponent::from_key(&value.as_text()) {
                Some(component) => {
                    self.component = component;
                    // variants differ per component
                    self.variant = 0;
                }
                None => return false,
            },
            "variant" => self.variant = value.as_index(),
            "area" => self.area = value.as_f64(),
            _ => return false,
        }
        true
    }
}

/// `area × usage_rate` (kg)
pub fn area_rebar_amount(area: f64, usage_kg_per_sqm: f64) -> f64 {
    num(num(area) * num(usage_kg_per_sqm))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RebarAreaRowResult {
    pub id: u32,
    pub name: String,
    pub component: AreaComponent,
    pub usage_kg_per_sqm: f64,
    pub amount_kg: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RebarAreaSummary {
    pub wall_kg: f64,
    pub floor_kg: f64,
    pub stair_kg: f64,
    /// wall + floor + stair
    pub total_kg: f64,
    pub wastage_percent: f64,
    pub total_with_wastage_kg: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RebarAreaCalculator {
    #[serde(default)]
    pub rows: RowCollection<RebarAreaRow>,
    #[serde(default)]
    pub wastage: WastageConfig,
}

impl RebarAreaCalculator {
    pub fn row_results(&self, ctx: &TakeoffContext<'_>) -> Vec<RebarAreaRowResult> {
        self.rows
            .iter()
            .map(|row| {
                let usage = ctx.catalog.area_usage_rate(row.fields.component, row.fields.variant);
                RebarAreaRowResult {
                    id: row.id,
                    name: row.display_name(),
                    component: row.fields.component,
                    usage_kg_per_sqm: usage,
                    amount_kg: area_rebar_amount(row.fields.area, usage),
                }
            })
            .collect()
    }

    fn component_total(results: &[RebarAreaRowResult], component: AreaComponent) -> f64 {
        sum(results.iter().filter(|r| r.component == component).map(|r| r.amount_kg))
    }

    pub fn summary(&self, ctx: &TakeoffContext<'_>) -> RebarAreaSummary {
        let results = self.row_results(ctx);
        let wall_kg = Self::component_total(&results, AreaComponent::Wall);
        let floor_kg = Self::component_total(&results, AreaComponent::Floor);
        let stair_kg = Self::component_total(&results, AreaComponent::Stair);
        let total_kg = wall_kg + floor_kg + stair_kg;
        let wastage_percent = self.wastage.effective_rate(MaterialCategory::Rebar, ctx.wastage);
        RebarAreaSummary {
            wall_kg,
            floor_kg,
            stair_kg,
            total_kg,
            wastage_percent,
            total_with_wastage_kg: apply_wastage(total_kg, wastage_percent),
        }
    }
}

impl Calculator for RebarAreaCalculator {
    fn id(&self) -> CalculatorId {
        CalculatorId::RebarArea
    }

    fn material_lines(&self, ctx: &TakeoffContext<'_>) -> Vec<MaterialLine> {
        let results = self.row_results(ctx);
        AreaComponent::ALL
            .into_iter()
            .map(|component| {
                let amount = Self::component_total(&results, component);
                MaterialLine::new(
                    MaterialCategory::Rebar,
                    format!("area_{}", component.display_name().to_lowercase()),
                    format!("Rebar estimate, {}", component.display_name().to_lowercase()),
                    amount,
                    "kg",
                    self.wastage.apply(amount, MaterialCategory::Rebar, ctx.wastage),
                )
            })
            .collect()
    }
}

impl RowCalculator for RebarAreaCalculator {
    type Row = RebarAreaRow;

    fn rows(&self) -> &RowCollection<RebarAreaRow> {
        &self.rows
    }

    fn rows_mut(&mut self) -> &mut RowCollection<RebarAreaRow> {
        &mut self.rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_weight() {
        // #4: 0.994 kg/m × 6 m × 20 bars
        assert!((exact_rebar_weight(0.994, 6.0, 20.0) - 119.28).abs() < 1e-9);
        assert_eq!(exact_rebar_weight(0.994, f64::NAN, 20.0), 0.0);
    }

    #[test]
    fn test_exact_rows_and_lines() {
        let ctx = TakeoffContext::standard();
        let mut calc = RebarExactCalculator::default();
        calc.rows.update_row_with(1, |r| {
            r.fields = RebarExactRow {
                size: "D13".to_string(),
                length: 6.0,
                count: 20.0,
            }
        });
        calc.rows.add_row_with(RebarExactRow {
            size: "#5".to_string(),
            length: 12.0,
            count: 10.0,
        });
        calc.rows.add_row_with(RebarExactRow {
            size: "#4".to_string(),
            length: 3.0,
            count: 10.0,
        });

        let results = calc.row_results(&ctx);
        assert_eq!(results[0].size, "#4");
        assert!((results[0].total_length_m - 120.0).abs() < 1e-9);

        let summary = calc.summary(&ctx);
        let expected = 0.994 * 150.0 + 1.56 * 120.0;
        assert!((summary.total_kg - expected).abs() < 1e-9);
        assert!((summary.total_with_wastage_kg - expected * 1.05).abs() < 1e-9);

        let lines = calc.material_lines(&ctx);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].sub_type, "#4");
        assert!((lines[0].quantity - 149.1).abs() < 1e-9);
        assert_eq!(lines[1].sub_type, "#5");
    }

    #[test]
    fn test_area_estimate_sums_components() {
        let ctx = TakeoffContext::standard();
        let mut calc = RebarAreaCalculator::default();
        // wall, 20 cm (variant 2): 25 kg/m²
        calc.rows.update_row(1, "component", "wall");
        calc.rows.update_row(1, "variant", 2.0);
        calc.rows.update_row(1, "area", 100.0);
        // floor, 15 cm: 15 kg/m²
        let floor = calc.rows.add_row();
        calc.rows.update_row(floor, "component", "floor");
        calc.rows.update_row(floor, "variant", "1");
        calc.rows.update_row(floor, "area", 200.0);
        // stair, standard: 35 kg/m²
        let stair = calc.rows.add_row();
        calc.rows.update_row(stair, "component", "stair");
        calc.rows.update_row(stair, "area", 10.0);

        let summary = calc.summary(&ctx);
        assert!((summary.wall_kg - 2500.0).abs() < 1e-9);
        assert!((summary.floor_kg - 3000.0).abs() < 1e-9);
        assert!((summary.stair_kg - 350.0).abs() < 1e-9);
        assert!((summary.total_kg - 5850.0).abs() < 1e-9);

        let lines = calc.material_lines(&ctx);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].sub_type, "area_wall");
        assert_eq!(lines[2].sub_type, "area_stair");
    }

    #[test]
    fn test_component_change_resets_variant() {
        let mut calc = RebarAreaCalculator::default();
        calc.rows.update_row(1, "variant", 3.0);
        calc.rows.update_row(1, "component", "stair");
        assert_eq!(calc.rows.get(1).unwrap().fields.variant, 0);
        assert!(!calc.rows.update_row(1, "component", "roof"));
    }
}
