//! # Tile
//!
//! - **Tile count**: `tiles/m² = 10000 / (L × W)` with tile sizes in cm;
//!   `count = area(m²) × tiles/m²`. Areas may be entered in ping.
//! - **Grout**: `kg/m² = ((L + W) / (L × W)) × joint width × joint depth × 1.7`
//!   with every dimension in mm.
//! - **Adhesive**: kg/m² by trowel notch (4 mm → 2.5, 6 mm → 6.25, else 4).
//! - **Labor**: cost only, `area(ping) × rate per ping` for a laying method.
//!
//! Tile sizes come from a preset key ("60x60"); `"custom"` uses the row's
//! own length/width and falls back to 60×60 when those are blank, as does
//! an unknown key.
//!
//! ## Example
//!
//! ```rust
//! use takeoff_core::calculators::TakeoffContext;
//! use takeoff_core::calculators::tile::TileCalculator;
//!
//! let ctx = TakeoffContext::standard();
//! let mut calc = TileCalculator::default();
//! calc.rows.update_row(1, "area", 1.0);
//! calc.rows.update_row(1, "unit", "ping");
//!
//! let count = calc.row_results(&ctx)[0].count;
//! assert!((count - 9.19).abs() < 0.01);
//! ```

use serde::{Deserialize, Serialize};

use crate::calculators::{sum, Calculator, CalculatorId, RowCalculator, TakeoffContext};
use crate::cost::CostInput;
use crate::input::{lenient, num, safe_div, FieldValue};
use crate::presets::tile::{adhesive_usage, DEFAULT_LABOR_KEY, DEFAULT_TILE_CM, GROUT_DENSITY_FACTOR};
use crate::presets::{PresetCatalog, PresetChoice};
use crate::record::MaterialLine;
use crate::rows::{RowCollection, RowFields};
use crate::units::{AreaUnit, Centimeters, Millimeters};
use crate::wastage::{apply_wastage, MaterialCategory, WastageConfig};

fn default_tile() -> String {
    "60x60".to_string()
}

/// Tile (length, width) in cm for a preset key or custom dimensions
pub fn resolve_tile(key: &str, length_cm: f64, width_cm: f64, catalog: &PresetCatalog) -> (f64, f64) {
    match PresetChoice::parse(key) {
        PresetChoice::Preset(key) => catalog.tile_size(&key),
        PresetChoice::Custom => {
            let (length, width) = (num(length_cm), num(width_cm));
            if length > 0.0 && width > 0.0 {
                (length, width)
            } else {
                DEFAULT_TILE_CM
            }
        }
    }
}

/// `10000 / (L × W)` with L, W in cm
pub fn tiles_per_sqm(length_cm: f64, width_cm: f64) -> f64 {
    safe_div(10000.0, num(length_cm) * num(width_cm))
}

/// Grout consumption (kg/m²), every dimension in mm
pub fn grout_usage(length_mm: f64, width_mm: f64, joint_width_mm: f64, joint_depth_mm: f64) -> f64 {
    let (l, w) = (num(length_mm), num(width_mm));
    num(safe_div(l + w, l * w) * num(joint_width_mm) * num(joint_depth_mm) * GROUT_DENSITY_FACTOR)
}

// ============================================================================
// Tile count
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileRow {
    #[serde(default, deserialize_with = "lenient::f64")]
    pub area: f64,

    #[serde(default, deserialize_with = "lenient::area_unit")]
    pub unit: AreaUnit,

    /// Size key ("60x60") or "custom"
    #[serde(default = "default_tile", deserialize_with = "lenient::key")]
    pub tile: String,

    /// Custom tile length (cm)
    #[serde(default, deserialize_with = "lenient::f64")]
    pub length_cm: f64,

    /// Custom tile width (cm)
    #[serde(default, deserialize_with = "lenient::f64")]
    pub width_cm: f64,
}

impl Default for TileRow {
    fn default() -> Self {
        TileRow {
            area: 0.0,
            unit: AreaUnit::Sqm,
            tile: default_tile(),
            length_cm: 0.0,
            width_cm: 0.0,
        }
    }
}

impl TileRow {
    pub fn area_sqm(&self) -> f64 {
        num(self.unit.to_sqm(num(self.area)))
    }

    pub fn tile_cm(&self, catalog: &PresetCatalog) -> (f64, f64) {
        resolve_tile(&self.tile, self.length_cm, self.width_cm, catalog)
    }
}

impl RowFields for TileRow {
    fn set_field(&mut self, field: &str, value: &FieldValue) -> bool {
        match field {
            "area" => self.area = value.as_f64(),
            "unit" => self.unit = AreaUnit::from_key(&value.as_text()),
            "tile" => self.tile = value.as_text(),
            "length_cm" => self.length_cm = value.as_f64(),
            "width_cm" => self.width_cm = value.as_f64(),
            _ => return false,
        }
        true
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileRowResult {
    pub id: u32,
    pub name: String,
    pub area_sqm: f64,
    pub length_cm: f64,
    pub width_cm: f64,
    pub tiles_per_sqm: f64,
    pub count: f64,
    /// Whole tiles to order
    pub pieces: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileSummary {
    pub area_sqm: f64,
    pub count: f64,
    pub wastage_percent: f64,
    pub count_with_wastage: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TileCalculator {
    #[serde(default)]
    pub rows: RowCollection<TileRow>,
    #[serde(default)]
    pub wastage: WastageConfig,
}

impl TileCalculator {
    pub fn row_results(&self, ctx: &TakeoffContext<'_>) -> Vec<TileRowResult> {
        self.rows
            .iter()
            .map(|row| {
                let (length_cm, width_cm) = row.fields.tile_cm(ctx.catalog);
                let area_sqm = row.fields.area_sqm();
                let per_sqm = tiles_per_sqm(length_cm, width_cm);
                let count = num(area_sqm * per_sqm);
                TileRowResult {
                    id: row.id,
                    name: row.display_name(),
                    area_sqm,
                    length_cm,
                    width_cm,
                    tiles_per_sqm: per_sqm,
                    count,
                    pieces: count.ceil(),
                }
            })
            .collect()
    }

    pub fn summary(&self, ctx: &TakeoffContext<'_>) -> TileSummary {
        let results = self.row_results(ctx);
        let count = sum(results.iter().map(|r| r.count));
        let wastage_percent = self.wastage.effective_rate(MaterialCategory::Tile, ctx.wastage);
        TileSummary {
            area_sqm: sum(results.iter().map(|r| r.area_sqm)),
            count,
            wastage_percent,
            count_with_wastage: apply_wastage(count, wastage_percent),
        }
    }
}

impl Calculator for TileCalculator {
    fn id(&self) -> CalculatorId {
        CalculatorId::Tile
    }

    fn material_lines(&self, ctx: &TakeoffContext<'_>) -> Vec<MaterialLine> {
        // One line per tile size, in first-seen order
        let results = self.row_results(ctx);
        let mut sizes: Vec<(f64, f64)> = Vec::new();
        for r in &results {
            if !sizes.contains(&(r.length_cm, r.width_cm)) {
                sizes.push((r.length_cm, r.width_cm));
            }
        }

        sizes
            .into_iter()
            .map(|(length, width)| {
                let count = sum(results
                    .iter()
                    .filter(|r| r.length_cm == length && r.width_cm == width)
                    .map(|r| r.count));
                MaterialLine::new(
                    MaterialCategory::Tile,
                    format!("{}x{}", length, width),
                    format!("Tiles {}×{} cm", length, width),
                    count,
                    "pcs",
                    self.wastage.apply(count, MaterialCategory::Tile, ctx.wastage),
                )
            })
            .collect()
    }
}

impl RowCalculator for TileCalculator {
    type Row = TileRow;

    fn rows(&self) -> &RowCollection<TileRow> {
        &self.rows
    }

    fn rows_mut(&mut self) -> &mut RowCollection<TileRow> {
        &mut self.rows
    }
}

// ============================================================================
// Grout
// ============================================================================

fn default_joint_width() -> f64 {
    3.0
}

fn default_joint_depth() -> f64 {
    5.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroutRow {
    #[serde(default, deserialize_with = "lenient::f64")]
    pub area: f64,

    #[serde(default, deserialize_with = "lenient::area_unit")]
    pub unit: AreaUnit,

    #[serde(default = "default_tile", deserialize_with = "lenient::key")]
    pub tile: String,

    #[serde(default, deserialize_with = "lenient::f64")]
    pub length_cm: f64,

    #[serde(default, deserialize_with = "lenient::f64")]
    pub width_cm: f64,

    #[serde(default = "default_joint_width", deserialize_with = "lenient::f64")]
    pub joint_width_mm: f64,

    #[serde(default = "default_joint_depth", deserialize_with = "lenient::f64")]
    pub joint_depth_mm: f64,
}

impl Default for GroutRow {
    fn default() -> Self {
        GroutRow {
            area: 0.0,
            unit: AreaUnit::Sqm,
            tile: default_tile(),
            length_cm: 0.0,
            width_cm: 0.0,
            joint_width_mm: default_joint_width(),
            joint_depth_mm: default_joint_depth(),
        }
    }
}

impl RowFields for GroutRow {
    fn set_field(&mut self, field: &str, value: &FieldValue) -> bool {
        match field {
            "area" => self.area = value.as_f64(),
            "unit" => self.unit = AreaUnit::from_key(&value.as_text()),
            "tile" => self.tile = value.as_text(),
            "length_cm" => self.length_cm = value.as_f64(),
            "width_cm" => self.width_cm = value.as_f64(),
            "joint_width_mm" => self.joint_width_mm = value.as_f64(),
            "joint_depth_mm" => self.joint_depth_mm = value.as_f64(),
            _ => return false,
        }
        true
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroutRowResult {
    pub id: u32,
    pub name: String,
    pub area_sqm: f64,
    pub usage_kg_per_sqm: f64,
    pub grout_kg: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GroutCalculator {
    #[serde(default)]
    pub rows: RowCollection<GroutRow>,
    #[serde(default)]
    pub wastage: WastageConfig,
}

impl GroutCalculator {
    pub fn row_results(&self, ctx: &TakeoffContext<'_>) -> Vec<GroutRowResult> {
        self.rows
            .iter()
            .map(|row| {
                let f = &row.fields;
                let (length_cm, width_cm) = resolve_tile(&f.tile, f.length_cm, f.width_cm, ctx.catalog);
                let usage = grout_usage(
                    Millimeters::from(Centimeters(length_cm)).value(),
                    Millimeters::from(Centimeters(width_cm)).value(),
                    f.joint_width_mm,
                    f.joint_depth_mm,
                );
                let area_sqm = num(f.unit.to_sqm(num(f.area)));
                GroutRowResult {
                    id: row.id,
                    name: row.display_name(),
                    area_sqm,
                    usage_kg_per_sqm: usage,
                    grout_kg: num(area_sqm * usage),
                }
            })
            .collect()
    }

    pub fn total_kg(&self, ctx: &TakeoffContext<'_>) -> f64 {
        sum(self.row_results(ctx).iter().map(|r| r.grout_kg))
    }
}

impl Calculator for GroutCalculator {
    fn id(&self) -> CalculatorId {
        CalculatorId::Grout
    }

    fn material_lines(&self, ctx: &TakeoffContext<'_>) -> Vec<MaterialLine> {
        let total = self.total_kg(ctx);
        vec![MaterialLine::new(
            MaterialCategory::Grout,
            "grout",
            "Tile grout",
            total,
            "kg",
            self.wastage.apply(total, MaterialCategory::Grout, ctx.wastage),
        )]
    }
}

impl RowCalculator for GroutCalculator {
    type Row = GroutRow;

    fn rows(&self) -> &RowCollection<GroutRow> {
        &self.rows
    }

    fn rows_mut(&mut self) -> &mut RowCollection<GroutRow> {
        &mut self.rows
    }
}

// ============================================================================
// Adhesive
// ============================================================================

fn default_notch() -> f64 {
    6.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdhesiveRow {
    #[serde(default, deserialize_with = "lenient::f64")]
    pub area: f64,

    #[serde(default, deserialize_with = "lenient::area_unit")]
    pub unit: AreaUnit,

    /// Trowel notch size (mm)
    #[serde(default = "default_notch", deserialize_with = "lenient::f64")]
    pub notch_mm: f64,
}

impl Default for AdhesiveRow {
    fn default() -> Self {
        AdhesiveRow {
            area: 0.0,
            unit: AreaUnit::Sqm,
            notch_mm: default_notch(),
        }
    }
}

impl RowFields for AdhesiveRow {
    fn set_field(&mut self, field: &str, value: &FieldValue) -> bool {
        match field {
            "area" => self.area = value.as_f64(),
            "unit" => self.unit = AreaUnit::from_key(&value.as_text()),
            "notch_mm" => self.notch_mm = value.as_f64(),
            _ => return false,
        }
        true
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdhesiveRowResult {
    pub id: u32,
    pub name: String,
    pub area_sqm: f64,
    pub usage_kg_per_sqm: f64,
    pub adhesive_kg: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AdhesiveCalculator {
    #[serde(default)]
    pub rows: RowCollection<AdhesiveRow>,
    #[serde(default)]
    pub wastage: WastageConfig,
}

impl AdhesiveCalculator {
    pub fn row_results(&self) -> Vec<AdhesiveRowResult> {
        self.rows
            .iter()
            .map(|row| {
                let area_sqm = num(row.fields.unit.to_sqm(num(row.fields.area)));
                let usage = adhesive_usage(num(row.fields.notch_mm));
                AdhesiveRowResult {
                    id: row.id,
                    name: row.display_name(),
                    area_sqm,
                    usage_kg_per_sqm: usage,
                    adhesive_kg: num(area_sqm * usage),
                }
            })
            .collect()
    }
}

impl Calculator for AdhesiveCalculator {
    fn id(&self) -> CalculatorId {
        CalculatorId::Adhesive
    }

    fn material_lines(&self, ctx: &TakeoffContext<'_>) -> Vec<MaterialLine> {
        let total = sum(self.row_results().iter().map(|r| r.adhesive_kg));
        vec![MaterialLine::new(
            MaterialCategory::Adhesive,
            "adhesive",
            "Tile adhesive",
            total,
            "kg",
            self.wastage.apply(total, MaterialCategory::Adhesive, ctx.wastage),
        )]
    }
}

impl RowCalculator for AdhesiveCalculator {
    type Row = AdhesiveRow;

    fn rows(&self) -> &RowCollection<AdhesiveRow> {
        &self.rows
    }

    fn rows_mut(&mut self) -> &mut RowCollection<AdhesiveRow> {
        &mut self.rows
    }
}

// ============================================================================
// Labor
// ============================================================================

fn default_method() -> String {
    DEFAULT_LABOR_KEY.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileLaborInput {
    /// Total laid area
    #[serde(default, deserialize_with = "lenient::f64")]
    pub area: f64,

    #[serde(default, deserialize_with = "lenient::area_unit")]
    pub unit: AreaUnit,

    /// Laying method key
    #[serde(default = "default_method", deserialize_with = "lenient::key")]
    pub method: String,

    /// Price per ping override; 0 uses the catalog rate
    #[serde(default, deserialize_with = "lenient::f64")]
    pub rate_per_ping: f64,
}

impl Default for TileLaborInput {
    fn default() -> Self {
        TileLaborInput {
            area: 0.0,
            unit: AreaUnit::Sqm,
            method: default_method(),
            rate_per_ping: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileLaborResult {
    pub method: String,
    pub label: String,
    pub area_ping: f64,
    pub rate_per_ping: f64,
    pub cost: f64,
}

/// Laying labor cost for a total area
pub fn calculate_labor(input: &TileLaborInput, catalog: &PresetCatalog) -> TileLaborResult {
    let rate = catalog.labor_rate(&input.method);
    let rate_per_ping = if num(input.rate_per_ping) > 0.0 {
        input.rate_per_ping
    } else {
        rate.price_per_ping
    };
    let area_ping = num(input.unit.to_ping(num(input.area)));
    TileLaborResult {
        method: rate.key,
        label: rate.label,
        area_ping,
        rate_per_ping,
        cost: num(area_ping * rate_per_ping),
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TileLaborCalculator {
    #[serde(default)]
    pub input: TileLaborInput,
}

impl Calculator for TileLaborCalculator {
    fn id(&self) -> CalculatorId {
        CalculatorId::TileLabor
    }

    fn material_lines(&self, ctx: &TakeoffContext<'_>) -> Vec<MaterialLine> {
        let r = calculate_labor(&self.input, ctx.catalog);
        vec![MaterialLine::exact(
            MaterialCategory::Labor,
            format!("tile_{}", r.method),
            r.label,
            r.area_ping,
            "ping",
        )]
    }

    fn line_cost(&self, line: &MaterialLine, ctx: &TakeoffContext<'_>) -> Option<CostInput> {
        if line.category != MaterialCategory::Labor {
            return None;
        }
        let r = calculate_labor(&self.input, ctx.catalog);
        Some(CostInput::new(None, r.label, r.rate_per_ping))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tiles_per_sqm_60x60() {
        assert!((tiles_per_sqm(60.0, 60.0) - 2.78).abs() < 0.01);
        assert_eq!(tiles_per_sqm(0.0, 60.0), 0.0);
    }

    #[test]
    fn test_tile_count_sqm_and_ping() {
        let ctx = TakeoffContext::standard();
        let mut calc = TileCalculator::default();
        calc.rows.update_row(1, "area", 1.0);
        assert!((calc.row_results(&ctx)[0].count - 2.78).abs() < 0.01);

        calc.rows.update_row(1, "unit", "ping");
        let r = &calc.row_results(&ctx)[0];
        assert!((r.area_sqm - 3.30579).abs() < 1e-9);
        assert!((r.count - 9.19).abs() < 0.01);
        assert_eq!(r.pieces, 10.0);
    }

    #[test]
    fn test_custom_tile_fallback() {
        let ctx = TakeoffContext::standard();
        assert_eq!(resolve_tile("custom", 0.0, 0.0, ctx.catalog), (60.0, 60.0));
        assert_eq!(resolve_tile("custom", 25.0, 40.0, ctx.catalog), (25.0, 40.0));
        assert_eq!(resolve_tile("99x99", 25.0, 40.0, ctx.catalog), (60.0, 60.0));
        assert_eq!(resolve_tile("30X60", 0.0, 0.0, ctx.catalog), (30.0, 60.0));
    }

    #[test]
    fn test_tile_lines_per_size() {
        let ctx = TakeoffContext::standard();
        let mut calc = TileCalculator::default();
        calc.rows.update_row(1, "area", 36.0);
        let id = calc.rows.add_row();
        calc.rows.update_row(id, "area", 9.0);
        calc.rows.update_row(id, "tile", "30x30");

        let lines = calc.material_lines(&ctx);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].sub_type, "60x60");
        assert!((lines[0].quantity - 100.0).abs() < 1e-9);
        assert!((lines[0].wastage_adjusted_quantity - 105.0).abs() < 1e-9);
        assert_eq!(lines[1].sub_type, "30x30");
        assert!((lines[1].quantity - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_grout_usage() {
        // (1200 / 360000) × 3 × 5 × 1.7
        let usage = grout_usage(600.0, 600.0, 3.0, 5.0);
        assert!((usage - 0.085).abs() < 1e-9);
        // one-millimeter joint
        assert!((grout_usage(600.0, 600.0, 1.0, 5.0) - 0.0283).abs() < 0.0001);
        assert_eq!(grout_usage(0.0, 0.0, 3.0, 5.0), 0.0);
    }

    #[test]
    fn test_grout_total() {
        let ctx = TakeoffContext::standard();
        let mut calc = GroutCalculator::default();
        calc.rows.update_row(1, "area", 10.0);
        let r = &calc.row_results(&ctx)[0];
        assert!((r.usage_kg_per_sqm - 0.085).abs() < 1e-9);
        assert!((calc.total_kg(&ctx) - 0.85).abs() < 1e-9);

        let lines = calc.material_lines(&ctx);
        assert!((lines[0].wastage_adjusted_quantity - lines[0].quantity * 1.1).abs() < 1e-9);
    }

    #[test]
    fn test_adhesive_steps() {
        let mut calc = AdhesiveCalculator::default();
        calc.rows.update_row(1, "area", 10.0);
        calc.rows.update_row(1, "notch_mm", 4.0);
        assert!((calc.row_results()[0].adhesive_kg - 25.0).abs() < 1e-9);

        calc.rows.update_row(1, "notch_mm", "6");
        assert!((calc.row_results()[0].adhesive_kg - 62.5).abs() < 1e-9);

        calc.rows.update_row(1, "notch_mm", 10.0);
        assert!((calc.row_results()[0].adhesive_kg - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_labor_cost() {
        let ctx = TakeoffContext::standard();
        let input = TileLaborInput {
            area: 10.0,
            unit: AreaUnit::Ping,
            method: "dry".into(),
            rate_per_ping: 0.0,
        };
        let r = calculate_labor(&input, ctx.catalog);
        assert_eq!(r.rate_per_ping, 3500.0);
        assert!((r.cost - 35000.0).abs() < 1e-9);

        let sqm = TileLaborInput {
            area: 3.30579,
            unit: AreaUnit::Sqm,
            method: "unknown".into(),
            rate_per_ping: 0.0,
        };
        let r = calculate_labor(&sqm, ctx.catalog);
        assert_eq!(r.method, "wet");
        assert!((r.cost - 3000.0).abs() < 1e-6);
    }

    #[test]
    fn test_labor_line_carries_cost() {
        let ctx = TakeoffContext::standard();
        let calc = TileLaborCalculator {
            input: TileLaborInput {
                area: 2.0,
                unit: AreaUnit::Ping,
                ..Default::default()
            },
        };
        let lines = calc.material_lines(&ctx);
        assert_eq!(lines[0].category, MaterialCategory::Labor);
        assert_eq!(lines[0].quantity, lines[0].wastage_adjusted_quantity);
        let cost = calc.line_cost(&lines[0], &ctx).unwrap();
        assert_eq!(cost.unit_price, 3000.0);
    }
}
