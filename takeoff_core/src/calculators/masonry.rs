//! # Masonry
//!
//! - **Mortar (render coat)**: baseline 10.6 kg/m² cement and 42.8 kg/m² sand
//!   at 2.5 cm, scaled linearly with the actual thickness.
//! - **Plaster mix**: `volume = area × thickness`; cement and sand per m³
//!   from the mix ratio.
//! - **Bricks**: `area × bricks/m²` for the wall thickness (128 when the key
//!   is unknown).
//! - **Quick estimate**: 0.4 bags of cement and 0.05 m³ of sand per m², a
//!   rule of thumb independent of the other paths.
//!
//! Thicknesses are entered in centimeters.

use serde::{Deserialize, Serialize};

use crate::calculators::{sum, Calculator, CalculatorId, RowCalculator, TakeoffContext};
use crate::input::{lenient, num, FieldValue};
use crate::presets::masonry::{
    DEFAULT_PLASTER_RATIO, MORTAR_BASE_CEMENT_KG_SQM, MORTAR_BASE_SAND_KG_SQM, MORTAR_BASE_THICKNESS_CM,
    QUICK_CEMENT_BAGS_PER_SQM, QUICK_SAND_M3_PER_SQM,
};
use crate::presets::PresetCatalog;
use crate::record::MaterialLine;
use crate::rows::{RowCollection, RowFields};
use crate::units::{Centimeters, Meters};
use crate::wastage::{apply_wastage, MaterialCategory, WastageConfig};

// ============================================================================
// Mortar
// ============================================================================

fn default_mortar_thickness() -> f64 {
    MORTAR_BASE_THICKNESS_CM
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MortarRow {
    /// Rendered area (m²)
    #[serde(default, deserialize_with = "lenient::f64")]
    pub area: f64,

    /// Coat thickness (cm)
    #[serde(default = "default_mortar_thickness", deserialize_with = "lenient::f64")]
    pub thickness_cm: f64,
}

impl Default for MortarRow {
    fn default() -> Self {
        MortarRow {
            area: 0.0,
            thickness_cm: MORTAR_BASE_THICKNESS_CM,
        }
    }
}

impl RowFields for MortarRow {
    fn set_field(&mut self, field: &str, value: &FieldValue) -> bool {
        match field {
            "area" => self.area = value.as_f64(),
            "thickness_cm" | "thickness" => self.thickness_cm = value.as_f64(),
            _ => return false,
        }
        true
    }
}

/// Cement and sand (kg/m²) for a render coat of the given thickness
pub fn mortar_rates(thickness_cm: f64) -> (f64, f64) {
    let scale = num(thickness_cm) / MORTAR_BASE_THICKNESS_CM;
    (MORTAR_BASE_CEMENT_KG_SQM * scale, MORTAR_BASE_SAND_KG_SQM * scale)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MortarRowResult {
    pub id: u32,
    pub name: String,
    pub cement_kg: f64,
    pub sand_kg: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MortarSummary {
    pub cement_kg: f64,
    pub sand_kg: f64,
    pub wastage_percent: f64,
    pub cement_with_wastage_kg: f64,
    pub sand_with_wastage_kg: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MortarCalculator {
    #[serde(default)]
    pub rows: RowCollection<MortarRow>,
    #[serde(default)]
    pub wastage: WastageConfig,
}

impl MortarCalculator {
    pub fn row_results(&self) -> Vec<MortarRowResult> {
        self.rows
            .iter()
            .map(|row| {
                let (cement, sand) = mortar_rates(row.fields.thickness_cm);
                let area = num(row.fields.area);
                MortarRowResult {
                    id: row.id,
                    name: row.display_name(),
                    cement_kg: num(area * cement),
                    sand_kg: num(area * sand),
                }
            })
            .collect()
    }

    pub fn summary(&self, ctx: &TakeoffContext<'_>) -> MortarSummary {
        let results = self.row_results();
        let cement_kg = sum(results.iter().map(|r| r.cement_kg));
        let sand_kg = sum(results.iter().map(|r| r.sand_kg));
        let wastage_percent = self.wastage.effective_rate(MaterialCategory::Mortar, ctx.wastage);
        MortarSummary {
            cement_kg,
            sand_kg,
            wastage_percent,
            cement_with_wastage_kg: apply_wastage(cement_kg, wastage_percent),
            sand_with_wastage_kg: apply_wastage(sand_kg, wastage_percent),
        }
    }
}

impl Calculator for MortarCalculator {
    fn id(&self) -> CalculatorId {
        CalculatorId::Mortar
    }

    fn material_lines(&self, ctx: &TakeoffContext<'_>) -> Vec<MaterialLine> {
        let s = self.summary(ctx);
        vec![
            MaterialLine::new(
                MaterialCategory::Mortar,
                "cement",
                "Render mortar cement",
                s.cement_kg,
                "kg",
                s.cement_with_wastage_kg,
            ),
            MaterialLine::new(
                MaterialCategory::Mortar,
                "sand",
                "Render mortar sand",
                s.sand_kg,
                "kg",
                s.sand_with_wastage_kg,
            ),
        ]
    }
}

impl RowCalculator for MortarCalculator {
    type Row = MortarRow;

    fn rows(&self) -> &RowCollection<MortarRow> {
        &self.rows
    }

    fn rows_mut(&mut self) -> &mut RowCollection<MortarRow> {
        &mut self.rows
    }
}

// ============================================================================
// Plaster
// ============================================================================

fn default_plaster_thickness() -> f64 {
    2.0
}

fn default_ratio() -> String {
    DEFAULT_PLASTER_RATIO.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlasterRow {
    /// Plastered area (m²)
    #[serde(default, deserialize_with = "lenient::f64")]
    pub area: f64,

    /// Coat thickness (cm)
    #[serde(default = "default_plaster_thickness", deserialize_with = "lenient::f64")]
    pub thickness_cm: f64,

    /// Mix ratio key, e.g. "1:3"
    #[serde(default = "default_ratio", deserialize_with = "lenient::key")]
    pub ratio: String,
}

impl Default for PlasterRow {
    fn default() -> Self {
        PlasterRow {
            area: 0.0,
            thickness_cm: default_plaster_thickness(),
            ratio: default_ratio(),
        }
    }
}

impl RowFields for PlasterRow {
    fn set_field(&mut self, field: &str, value: &FieldValue) -> bool {
        match field {
            "area" => self.area = value.as_f64(),
            "thickness_cm" | "thickness" => self.thickness_cm = value.as_f64(),
            "ratio" => self.ratio = value.as_text(),
            _ => return false,
        }
        true
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlasterRowResult {
    pub id: u32,
    pub name: String,
    pub ratio: String,
    pub volume_m3: f64,
    pub cement_kg: f64,
    pub sand_m3: f64,
}

/// Mix volume, cement (kg) and sand (m³) of one plaster row
pub fn plaster_quantities(row: &PlasterRow, catalog: &PresetCatalog) -> (f64, f64, f64) {
    let thickness = Meters::from(Centimeters(num(row.thickness_cm))).value();
    let volume = num(num(row.area) * thickness);
    let mix = catalog.plaster_ratio(&row.ratio);
    (volume, num(volume * mix.cement_kg_per_m3), num(volume * mix.sand_m3_per_m3))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlasterSummary {
    pub volume_m3: f64,
    pub cement_kg: f64,
    pub sand_m3: f64,
    pub wastage_percent: f64,
    pub cement_with_wastage_kg: f64,
    pub sand_with_wastage_m3: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PlasterCalculator {
    #[serde(default)]
    pub rows: RowCollection<PlasterRow>,
    #[serde(default)]
    pub wastage: WastageConfig,
}

impl PlasterCalculator {
    pub fn row_results(&self, ctx: &TakeoffContext<'_>) -> Vec<PlasterRowResult> {
        self.rows
            .iter()
            .map(|row| {
                let (volume_m3, cement_kg, sand_m3) = plaster_quantities(&row.fields, ctx.catalog);
                PlasterRowResult {
                    id: row.id,
                    name: row.display_name(),
                    ratio: ctx.catalog.plaster_ratio(&row.fields.ratio).key,
                    volume_m3,
                    cement_kg,
                    sand_m3,
                }
            })
            .collect()
    }

    pub fn summary(&self, ctx: &TakeoffContext<'_>) -> PlasterSummary {
        let results = self.row_results(ctx);
        let cement_kg = sum(results.iter().map(|r| r.cement_kg));
        let sand_m3 = sum(results.iter().map(|r| r.sand_m3));
        let wastage_percent = self.wastage.effective_rate(MaterialCategory::Plaster, ctx.wastage);
        PlasterSummary {
            volume_m3: sum(results.iter().map(|r| r.volume_m3)),
            cement_kg,
            sand_m3,
            wastage_percent,
            cement_with_wastage_kg: apply_wastage(cement_kg, wastage_percent),
            sand_with_wastage_m3: apply_wastage(sand_m3, wastage_percent),
        }
    }
}

impl Calculator for PlasterCalculator {
    fn id(&self) -> CalculatorId {
        CalculatorId::Plaster
    }

    fn material_lines(&self, ctx: &TakeoffContext<'_>) -> Vec<MaterialLine> {
        let s = self.summary(ctx);
        vec![
            MaterialLine::new(
                MaterialCategory::Plaster,
                "cement",
                "Plaster cement",
                s.cement_kg,
                "kg",
                s.cement_with_wastage_kg,
            ),
            MaterialLine::new(
                MaterialCategory::Plaster,
                "sand",
                "Plaster sand",
                s.sand_m3,
                "m³",
                s.sand_with_wastage_m3,
            ),
        ]
    }
}

impl RowCalculator for PlasterCalculator {
    type Row = PlasterRow;

    fn rows(&self) -> &RowCollection<PlasterRow> {
        &self.rows
    }

    fn rows_mut(&mut self) -> &mut RowCollection<PlasterRow> {
        &mut self.rows
    }
}

// ============================================================================
// Bricks
// ============================================================================

fn default_wall() -> String {
    "24".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrickRow {
    /// Wall face area (m²)
    #[serde(default, deserialize_with = "lenient::f64")]
    pub area: f64,

    /// Wall thickness key (cm), e.g. "24"
    #[serde(default = "default_wall", deserialize_with = "lenient::key")]
    pub wall: String,
}

impl Default for BrickRow {
    fn default() -> Self {
        BrickRow {
            area: 0.0,
            wall: default_wall(),
        }
    }
}

impl RowFields for BrickRow {
    fn set_field(&mut self, field: &str, value: &FieldValue) -> bool {
        match field {
            "area" => self.area = value.as_f64(),
            "wall" => self.wall = value.as_text(),
            _ => return false,
        }
        true
    }
}

/// `area × bricks/m²`
pub fn brick_count(area: f64, bricks_per_sqm: f64) -> f64 {
    num(num(area) * num(bricks_per_sqm))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrickRowResult {
    pub id: u32,
    pub name: String,
    pub bricks_per_sqm: f64,
    pub count: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrickSummary {
    pub count: f64,
    pub wastage_percent: f64,
    pub count_with_wastage: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BrickCalculator {
    #[serde(default)]
    pub rows: RowCollection<BrickRow>,
    #[serde(default)]
    pub wastage: WastageConfig,
}

impl BrickCalculator {
    pub fn row_results(&self, ctx: &TakeoffContext<'_>) -> Vec<BrickRowResult> {
        self.rows
            .iter()
            .map(|row| {
                let bricks_per_sqm = ctx.catalog.bricks_per_sqm(&row.fields.wall);
                BrickRowResult {
                    id: row.id,
                    name: row.display_name(),
                    bricks_per_sqm,
                    count: brick_count(row.fields.area, bricks_per_sqm),
                }
            })
            .collect()
    }

    pub fn summary(&self, ctx: &TakeoffContext<'_>) -> BrickSummary {
        let count = sum(self.row_results(ctx).iter().map(|r| r.count));
        let wastage_percent = self.wastage.effective_rate(MaterialCategory::Brick, ctx.wastage);
        BrickSummary {
            count,
            wastage_percent,
            count_with_wastage: apply_wastage(count, wastage_percent),
        }
    }
}

impl Calculator for BrickCalculator {
    fn id(&self) -> CalculatorId {
        CalculatorId::Brick
    }

    fn material_lines(&self, ctx: &TakeoffContext<'_>) -> Vec<MaterialLine> {
        let s = self.summary(ctx);
        vec![MaterialLine::new(
            MaterialCategory::Brick,
            "brick",
            "Bricks",
            s.count,
            "pcs",
            s.count_with_wastage,
        )]
    }
}

impl RowCalculator for BrickCalculator {
    type Row = BrickRow;

    fn rows(&self) -> &RowCollection<BrickRow> {
        &self.rows
    }

    fn rows_mut(&mut self) -> &mut RowCollection<BrickRow> {
        &mut self.rows
    }
}

// ============================================================================
// Quick estimate
// ============================================================================

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MasonryQuickInput {
    /// Masonry area (m²)
    #[serde(default, deserialize_with = "lenient::f64")]
    pub area: f64,

    #[serde(default)]
    pub wastage: WastageConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MasonryQuickResult {
    pub cement_bags: f64,
    pub sand_m3: f64,
    pub wastage_percent: f64,
    pub cement_bags_with_wastage: f64,
    pub sand_with_wastage_m3: f64,
}

/// Rule-of-thumb cement and sand for a masonry area
pub fn calculate_quick(input: &MasonryQuickInput, ctx: &TakeoffContext<'_>) -> MasonryQuickResult {
    let area = num(input.area);
    let cement_bags = num(area * QUICK_CEMENT_BAGS_PER_SQM);
    let sand_m3 = num(area * QUICK_SAND_M3_PER_SQM);
    let wastage_percent = input.wastage.effective_rate(MaterialCategory::Mortar, ctx.wastage);
    MasonryQuickResult {
        cement_bags,
        sand_m3,
        wastage_percent,
        cement_bags_with_wastage: apply_wastage(cement_bags, wastage_percent),
        sand_with_wastage_m3: apply_wastage(sand_m3, wastage_percent),
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MasonryQuickCalculator {
    #[serde(default)]
    pub input: MasonryQuickInput,
}

impl Calculator for MasonryQuickCalculator {
    fn id(&self) -> CalculatorId {
        CalculatorId::MasonryQuick
    }

    fn material_lines(&self, ctx: &TakeoffContext<'_>) -> Vec<MaterialLine> {
        let r = calculate_quick(&self.input, ctx);
        vec![
            MaterialLine::new(
                MaterialCategory::Mortar,
                "quick_cement",
                "Masonry cement (quick estimate)",
                r.cement_bags,
                "bag",
                r.cement_bags_with_wastage,
            ),
            MaterialLine::new(
                MaterialCategory::Mortar,
                "quick_sand",
                "Masonry sand (quick estimate)",
                r.sand_m3,
                "m³",
                r.sand_with_wastage_m3,
            ),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mortar_baseline_and_scaling() {
        assert_eq!(mortar_rates(2.5), (10.6, 42.8));
        let (cement, sand) = mortar_rates(5.0);
        assert!((cement - 21.2).abs() < 1e-9);
        assert!((sand - 85.6).abs() < 1e-9);
        assert_eq!(mortar_rates(0.0), (0.0, 0.0));
    }

    #[test]
    fn test_mortar_summary() {
        let ctx = TakeoffContext::standard();
        let mut calc = MortarCalculator::default();
        calc.rows.update_row(1, "area", 10.0);
        let id = calc.rows.add_row();
        calc.rows.update_row(id, "area", "20");
        calc.rows.update_row(id, "thickness_cm", 5.0);

        let s = calc.summary(&ctx);
        assert!((s.cement_kg - (106.0 + 424.0)).abs() < 1e-9);
        assert!((s.sand_kg - (428.0 + 1712.0)).abs() < 1e-9);
        assert!((s.cement_with_wastage_kg - 530.0 * 1.05).abs() < 1e-9);
    }

    #[test]
    fn test_plaster_mix() {
        let ctx = TakeoffContext::standard();
        let row = PlasterRow {
            area: 50.0,
            thickness_cm: 2.0,
            ratio: "1:3".into(),
        };
        let (volume, cement, sand) = plaster_quantities(&row, ctx.catalog);
        assert!((volume - 1.0).abs() < 1e-9);
        assert!((cement - 408.0).abs() < 1e-9);
        assert!((sand - 1.03).abs() < 1e-9);

        let rich = PlasterRow {
            ratio: "1:2".into(),
            ..row
        };
        let (_, cement, _) = plaster_quantities(&rich, ctx.catalog);
        assert!((cement - 557.0).abs() < 1e-9);
    }

    #[test]
    fn test_plaster_lines() {
        let ctx = TakeoffContext::standard();
        let mut calc = PlasterCalculator::default();
        calc.rows.update_row(1, "area", 100.0);
        calc.wastage = WastageConfig::custom(0.0);
        let lines = calc.material_lines(&ctx);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].unit, "kg");
        assert!((lines[0].quantity - 816.0).abs() < 1e-9);
        assert_eq!(lines[0].quantity, lines[0].wastage_adjusted_quantity);
        assert_eq!(lines[1].unit, "m³");
    }

    #[test]
    fn test_brick_count_24_wall() {
        let ctx = TakeoffContext::standard();
        let mut calc = BrickCalculator::default();
        calc.rows.update_row(1, "area", 1.0);
        calc.rows.update_row(1, "wall", "24");
        let results = calc.row_results(&ctx);
        assert_eq!(results[0].count, 128.0);
    }

    #[test]
    fn test_brick_unknown_wall_defaults() {
        let ctx = TakeoffContext::standard();
        let mut calc = BrickCalculator::default();
        calc.rows.update_row(1, "area", 2.0);
        calc.rows.update_row(1, "wall", "99");
        assert_eq!(calc.row_results(&ctx)[0].count, 256.0);

        calc.rows.update_row(1, "wall", 12);
        assert_eq!(calc.row_results(&ctx)[0].count, 128.0);
    }

    #[test]
    fn test_quick_estimate() {
        let ctx = TakeoffContext::standard();
        let input = MasonryQuickInput {
            area: 100.0,
            wastage: WastageConfig::custom(0.0),
        };
        let r = calculate_quick(&input, &ctx);
        assert!((r.cement_bags - 40.0).abs() < 1e-9);
        assert!((r.sand_m3 - 5.0).abs() < 1e-9);
        assert_eq!(r.cement_bags_with_wastage, r.cement_bags);
    }

    #[test]
    fn test_remove_last_row_is_noop() {
        let mut calc = BrickCalculator::default();
        calc.rows.update_row(1, "area", 3.0);
        let before = calc.rows.clone();
        assert!(!calc.rows.remove_row(1));
        assert_eq!(calc.rows, before);
        assert_eq!(calc.rows.len(), 1);
    }
}
