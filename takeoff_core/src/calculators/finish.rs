//! # Finishes
//!
//! - **Paint**: `gallons = area(m²) / 3.30579 × 0.5`, half a gallon per ping.
//! - **Putty**: `kg = area(m²) × 0.35`.
//! - **Coverage estimate**: paintable area ≈ 3 × floor area, tiled floor
//!   ≈ 0.7 × floor area. Informational, never wastage-adjusted.

use serde::{Deserialize, Serialize};

use crate::calculators::{sum, Calculator, CalculatorId, RowCalculator, TakeoffContext};
use crate::input::{lenient, num, FieldValue};
use crate::record::MaterialLine;
use crate::rows::{RowCollection, RowFields};
use crate::units::{AreaUnit, Ping, SqMeters};
use crate::wastage::{MaterialCategory, WastageConfig};

/// Paint consumption per ping of wall (gallons)
pub const PAINT_GALLONS_PER_PING: f64 = 0.5;

/// Putty consumption (kg/m²)
pub const PUTTY_KG_PER_SQM: f64 = 0.35;

/// Paintable surface per m² of floor
pub const COVERAGE_PAINT_FACTOR: f64 = 3.0;

/// Tiled floor per m² of floor
pub const COVERAGE_TILE_FACTOR: f64 = 0.7;

/// Area row shared by paint and putty.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SurfaceRow {
    #[serde(default, deserialize_with = "lenient::f64")]
    pub area: f64,

    #[serde(default, deserialize_with = "lenient::area_unit")]
    pub unit: AreaUnit,
}

impl SurfaceRow {
    pub fn area_sqm(&self) -> f64 {
        num(self.unit.to_sqm(num(self.area)))
    }
}

impl RowFields for SurfaceRow {
    fn set_field(&mut self, field: &str, value: &FieldValue) -> bool {
        match field {
            "area" => self.area = value.as_f64(),
            "unit" => self.unit = AreaUnit::from_key(&value.as_text()),
            _ => return false,
        }
        true
    }
}

/// Paint (gallons) for an area in m²
pub fn paint_gallons(area_sqm: f64) -> f64 {
    num(Ping::from(SqMeters(num(area_sqm))).value() * PAINT_GALLONS_PER_PING)
}

/// Putty (kg) for an area in m²
pub fn putty_kg(area_sqm: f64) -> f64 {
    num(num(area_sqm) * PUTTY_KG_PER_SQM)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfaceRowResult {
    pub id: u32,
    pub name: String,
    pub area_sqm: f64,
    pub quantity: f64,
}

fn surface_results(rows: &RowCollection<SurfaceRow>, per_sqm: fn(f64) -> f64) -> Vec<SurfaceRowResult> {
    rows.iter()
        .map(|row| {
            let area_sqm = row.fields.area_sqm();
            SurfaceRowResult {
                id: row.id,
                name: row.display_name(),
                area_sqm,
                quantity: per_sqm(area_sqm),
            }
        })
        .collect()
}

// ============================================================================
// Paint
// ============================================================================

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PaintCalculator {
    #[serde(default)]
    pub rows: RowCollection<SurfaceRow>,
    #[serde(default)]
    pub wastage: WastageConfig,
}

impl PaintCalculator {
    /// Row results; `quantity` is gallons
    pub fn row_results(&self) -> Vec<SurfaceRowResult> {
        surface_results(&self.rows, paint_gallons)
    }

    pub fn total_gallons(&self) -> f64 {
        sum(self.row_results().iter().map(|r| r.quantity))
    }
}

impl Calculator for PaintCalculator {
    fn id(&self) -> CalculatorId {
        CalculatorId::Paint
    }

    fn material_lines(&self, ctx: &TakeoffContext<'_>) -> Vec<MaterialLine> {
        let gallons = self.total_gallons();
        vec![MaterialLine::new(
            MaterialCategory::Paint,
            "paint",
            "Wall paint",
            gallons,
            "gal",
            self.wastage.apply(gallons, MaterialCategory::Paint, ctx.wastage),
        )]
    }
}

impl RowCalculator for PaintCalculator {
    type Row = SurfaceRow;

    fn rows(&self) -> &RowCollection<SurfaceRow> {
        &self.rows
    }

    fn rows_mut(&mut self) -> &mut RowCollection<SurfaceRow> {
        &mut self.rows
    }
}

// ============================================================================
// Putty
// ============================================================================

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PuttyCalculator {
    #[serde(default)]
    pub rows: RowCollection<SurfaceRow>,
    #[serde(default)]
    pub wastage: WastageConfig,
}

impl PuttyCalculator {
    /// Row results; `quantity` is kg
    pub fn row_results(&self) -> Vec<SurfaceRowResult> {
        surface_results(&self.rows, putty_kg)
    }

    pub fn total_kg(&self) -> f64 {
        sum(self.row_results().iter().map(|r| r.quantity))
    }
}

impl Calculator for PuttyCalculator {
    fn id(&self) -> CalculatorId {
        CalculatorId::Putty
    }

    fn material_lines(&self, ctx: &TakeoffContext<'_>) -> Vec<MaterialLine> {
        let kg = self.total_kg();
        vec![MaterialLine::new(
            MaterialCategory::Putty,
            "putty",
            "Wall putty",
            kg,
            "kg",
            self.wastage.apply(kg, MaterialCategory::Putty, ctx.wastage),
        )]
    }
}

impl RowCalculator for PuttyCalculator {
    type Row = SurfaceRow;

    fn rows(&self) -> &RowCollection<SurfaceRow> {
        &self.rows
    }

    fn rows_mut(&mut self) -> &mut RowCollection<SurfaceRow> {
        &mut self.rows
    }
}

// ============================================================================
// Coverage estimate
// ============================================================================

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CoverageInput {
    /// Building floor area
    #[serde(default, deserialize_with = "lenient::f64")]
    pub building_area: f64,

    #[serde(default, deserialize_with = "lenient::area_unit")]
    pub unit: AreaUnit,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageResult {
    pub building_area_sqm: f64,
    pub paint_area_sqm: f64,
    pub tile_floor_area_sqm: f64,
}

pub fn calculate_coverage(input: &CoverageInput) -> CoverageResult {
    let building_area_sqm = num(input.unit.to_sqm(num(input.building_area)));
    CoverageResult {
        building_area_sqm,
        paint_area_sqm: building_area_sqm * COVERAGE_PAINT_FACTOR,
        tile_floor_area_sqm: building_area_sqm * COVERAGE_TILE_FACTOR,
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CoverageCalculator {
    #[serde(default)]
    pub input: CoverageInput,
}

impl Calculator for CoverageCalculator {
    fn id(&self) -> CalculatorId {
        CalculatorId::Coverage
    }

    fn material_lines(&self, _ctx: &TakeoffContext<'_>) -> Vec<MaterialLine> {
        let r = calculate_coverage(&self.input);
        vec![
            MaterialLine::exact(
                MaterialCategory::Estimate,
                "paint_area",
                "Paintable area (estimate)",
                r.paint_area_sqm,
                "m²",
            ),
            MaterialLine::exact(
                MaterialCategory::Estimate,
                "tile_floor_area",
                "Tiled floor area (estimate)",
                r.tile_floor_area_sqm,
                "m²",
            ),
        ]
    }
}
