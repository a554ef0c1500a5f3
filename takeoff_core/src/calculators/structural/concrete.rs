//! # Concrete Volume
//!
//! Box volumes per row: `volume = length × width × height` (meters). The
//! total is the plain sum of row volumes and wastage is applied once, to
//! the total.
//!
//! Each row also names a concrete grade; lines are emitted per grade so a
//! mixed pour (e.g. fc' 280 columns, fc' 210 slabs) prices correctly.
//!
//! ## Example
//!
//! ```rust
//! use takeoff_core::calculators::TakeoffContext;
//! use takeoff_core::calculators::structural::ConcreteCalculator;
//!
//! let ctx = TakeoffContext::standard();
//! let mut calc = ConcreteCalculator::default();
//! calc.rows.update_row(1, "length", 5.0);
//! calc.rows.update_row(1, "width", 4.0);
//! calc.rows.update_row(1, "height", "0.15");
//!
//! let summary = calc.summary(&ctx);
//! assert!((summary.total_m3 - 3.0).abs() < 1e-9);
//! assert!((summary.total_with_wastage_m3 - 3.09).abs() < 1e-9);
//! ```

use serde::{Deserialize, Serialize};

use crate::calculators::{sum, Calculator, CalculatorId, RowCalculator, TakeoffContext};
use crate::input::{lenient, num, FieldValue};
use crate::presets::concrete::DEFAULT_GRADE_KEY;
use crate::record::MaterialLine;
use crate::rows::{RowCollection, RowFields};
use crate::wastage::{MaterialCategory, WastageConfig};

/// One concrete element, dimensions in meters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConcreteRow {
    #[serde(default, deserialize_with = "lenient::f64")]
    pub length: f64,

    #[serde(default, deserialize_with = "lenient::f64")]
    pub width: f64,

    #[serde(default, deserialize_with = "lenient::f64")]
    pub height: f64,

    /// Concrete grade key, e.g. "210"
    #[serde(default = "default_grade", deserialize_with = "lenient::key")]
    pub grade: String,
}

fn default_grade() -> String {
    DEFAULT_GRADE_KEY.to_string()
}

impl Default for ConcreteRow {
    fn default() -> Self {
        ConcreteRow {
            length: 0.0,
            width: 0.0,
            height: 0.0,
            grade: default_grade(),
        }
    }
}

impl ConcreteRow {
    /// `length × width × height` (m³)
    pub fn volume(&self) -> f64 {
        concrete_volume(self.length, self.width, self.height)
    }
}

impl RowFields for ConcreteRow {
    fn set_field(&mut self, field: &str, value: &FieldValue) -> bool {
        match field {
            "length" => self.length = value.as_f64(),
            "width" => self.width = value.as_f64(),
            "height" => self.height = value.as_f64(),
            "grade" => self.grade = value.as_text(),
            _ => return false,
        }
        true
    }
}

/// Box volume (m³); blank dimensions are 0
pub fn concrete_volume(length: f64, width: f64, height: f64) -> f64 {
    num(num(length) * num(width) * num(height))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConcreteRowResult {
    pub id: u32,
    pub name: String,
    pub grade: String,
    pub volume_m3: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConcreteSummary {
    pub total_m3: f64,
    pub wastage_percent: f64,
    pub total_with_wastage_m3: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ConcreteCalculator {
    #[serde(default)]
    pub rows: RowCollection<ConcreteRow>,
    #[serde(default)]
    pub wastage: WastageConfig,
}

impl ConcreteCalculator {
    pub fn row_results(&self) -> Vec<ConcreteRowResult> {
        self.rows
            .iter()
            .map(|row| ConcreteRowResult {
                id: row.id,
                name: row.display_name(),
                grade: row.fields.grade.clone(),
                volume_m3: row.fields.volume(),
            })
            .collect()
    }

    pub fn summary(&self, ctx: &TakeoffContext<'_>) -> ConcreteSummary {
        let total_m3 = sum(self.rows.iter().map(|r| r.fields.volume()));
        let wastage_percent = self.wastage.effective_rate(MaterialCategory::Concrete, ctx.wastage);
        ConcreteSummary {
            total_m3,
            wastage_percent,
            total_with_wastage_m3: crate::wastage::apply_wastage(total_m3, wastage_percent),
        }
    }
}

impl Calculator for ConcreteCalculator {
    fn id(&self) -> CalculatorId {
        CalculatorId::Concrete
    }

    fn material_lines(&self, ctx: &TakeoffContext<'_>) -> Vec<MaterialLine> {
        // One line per grade, in first-seen order
        let mut grades: Vec<String> = Vec::new();
        for row in &self.rows {
            let key = ctx.catalog.concrete_grade(&row.fields.grade).key;
            if !grades.contains(&key) {
                grades.push(key);
            }
        }

        grades
            .into_iter()
            .map(|key| {
                let volume = sum(self
                    .rows
                    .iter()
                    .filter(|r| ctx.catalog.concrete_grade(&r.fields.grade).key == key)
                    .map(|r| r.fields.volume()));
                let grade = ctx.catalog.concrete_grade(&key);
                MaterialLine::new(
                    MaterialCategory::Concrete,
                    format!("fc{}", grade.key),
                    format!("Concrete {}", grade.label()),
                    volume,
                    "m³",
                    self.wastage.apply(volume, MaterialCategory::Concrete, ctx.wastage),
                )
            })
            .collect()
    }
}

impl RowCalculator for ConcreteCalculator {
    type Row = ConcreteRow;

    fn rows(&self) -> &RowCollection<ConcreteRow> {
        &self.rows
    }

    fn rows_mut(&mut self) -> &mut RowCollection<ConcreteRow> {
        &mut self.rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(length: f64, width: f64, height: f64, grade: &str) -> ConcreteRow {
        ConcreteRow {
            length,
            width,
            height,
            grade: grade.to_string(),
        }
    }

    #[test]
    fn test_row_volume() {
        assert!((row(2.0, 3.0, 0.5, "210").volume() - 3.0).abs() < 1e-12);
        assert_eq!(ConcreteRow::default().volume(), 0.0);
    }

    #[test]
    fn test_total_invariant_under_reordering() {
        let ctx = TakeoffContext::standard();
        let inputs = [row(2.0, 3.0, 0.5, "210"), row(1.2, 0.4, 3.0, "280"), row(7.0, 0.3, 0.6, "210")];

        let mut forward = ConcreteCalculator::default();
        forward.rows.update_row_with(1, |r| r.fields = inputs[0].clone());
        forward.rows.add_row_with(inputs[1].clone());
        forward.rows.add_row_with(inputs[2].clone());

        let mut reversed = ConcreteCalculator::default();
        reversed.rows.update_row_with(1, |r| r.fields = inputs[2].clone());
        reversed.rows.add_row_with(inputs[1].clone());
        reversed.rows.add_row_with(inputs[0].clone());

        let a = forward.summary(&ctx).total_m3;
        let b = reversed.summary(&ctx).total_m3;
        assert!((a - b).abs() < 1e-9);
        assert!((a - (3.0 + 1.44 + 1.26)).abs() < 1e-9);
    }

    #[test]
    fn test_blank_input_is_zero() {
        let ctx = TakeoffContext::standard();
        let mut calc = ConcreteCalculator::default();
        calc.rows.update_row(1, "length", "");
        calc.rows.update_row(1, "width", "abc");
        calc.rows.update_row(1, "height", 2.0);
        let summary = calc.summary(&ctx);
        assert_eq!(summary.total_m3, 0.0);
        assert_eq!(summary.total_with_wastage_m3, 0.0);
    }

    #[test]
    fn test_custom_wastage() {
        let ctx = TakeoffContext::standard();
        let mut calc = ConcreteCalculator::default();
        calc.rows.update_row_with(1, |r| r.fields = row(10.0, 1.0, 1.0, "210"));
        calc.wastage = WastageConfig::custom(10.0);
        let summary = calc.summary(&ctx);
        assert_eq!(summary.wastage_percent, 10.0);
        assert!((summary.total_with_wastage_m3 - 11.0).abs() < 1e-9);
    }

    #[test]
    fn test_lines_per_grade() {
        let ctx = TakeoffContext::standard();
        let mut calc = ConcreteCalculator::default();
        calc.rows.update_row_with(1, |r| r.fields = row(1.0, 1.0, 1.0, "210"));
        calc.rows.add_row_with(row(2.0, 1.0, 1.0, "280"));
        calc.rows.add_row_with(row(3.0, 1.0, 1.0, "210"));
        // unknown grade is counted as fc' 210
        calc.rows.add_row_with(row(1.0, 1.0, 1.0, "999"));

        let lines = calc.material_lines(&ctx);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].sub_type, "fc210");
        assert!((lines[0].quantity - 5.0).abs() < 1e-9);
        assert!((lines[0].wastage_adjusted_quantity - 5.15).abs() < 1e-9);
        assert_eq!(lines[1].sub_type, "fc280");
        assert_eq!(lines[1].unit, "m³");
    }
}
