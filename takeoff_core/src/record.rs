//! # Material Records
//!
//! A [`MaterialRecord`] is the unit that leaves the engine: one material
//! quantity with its wastage-adjusted amount and optional cost. Records are
//! created only through [`emit`], cannot be changed afterwards, and are
//! handed straight to a [`RecordSink`] (the summary/export side). The engine
//! keeps no record history of its own.
//!
//! The `category`/`sub_type`/`label` strings are the whole coupling contract
//! with the receiving side, so they are plain text rather than an enum.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::cost::{attach_cost, CostBook, CostEstimate};
use crate::input::num;
use crate::wastage::MaterialCategory;

/// A computed, not yet emitted, material quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialLine {
    pub category: MaterialCategory,
    /// Material within the category, e.g. "cement", "column"
    pub sub_type: String,
    pub label: String,
    pub quantity: f64,
    pub unit: String,
    pub wastage_adjusted_quantity: f64,
}

impl MaterialLine {
    pub fn new(
        category: MaterialCategory,
        sub_type: impl Into<String>,
        label: impl Into<String>,
        quantity: f64,
        unit: impl Into<String>,
        wastage_adjusted_quantity: f64,
    ) -> Self {
        MaterialLine {
            category,
            sub_type: sub_type.into(),
            label: label.into(),
            quantity: num(quantity),
            unit: unit.into(),
            wastage_adjusted_quantity: num(wastage_adjusted_quantity),
        }
    }

    /// A line without wastage (estimates, labor)
    pub fn exact(
        category: MaterialCategory,
        sub_type: impl Into<String>,
        label: impl Into<String>,
        quantity: f64,
        unit: impl Into<String>,
    ) -> Self {
        MaterialLine::new(category, sub_type, label, quantity, unit, quantity)
    }

    /// Whether the line carries any quantity worth exporting
    pub fn is_zero(&self) -> bool {
        self.quantity == 0.0 && self.wastage_adjusted_quantity == 0.0
    }
}

/// Immutable record handed to the export collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialRecord {
    id: Uuid,
    created: DateTime<Utc>,
    category: String,
    sub_type: String,
    label: String,
    quantity: f64,
    unit: String,
    wastage_adjusted_quantity: f64,
    cost: Option<CostEstimate>,
}

impl MaterialRecord {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn created(&self) -> DateTime<Utc> {
        self.created
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn sub_type(&self) -> &str {
        &self.sub_type
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn quantity(&self) -> f64 {
        self.quantity
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }

    pub fn wastage_adjusted_quantity(&self) -> f64 {
        self.wastage_adjusted_quantity
    }

    pub fn cost(&self) -> Option<&CostEstimate> {
        self.cost.as_ref()
    }
}

/// Receiving end of emitted records (summary list, export queue, …).
pub trait RecordSink {
    fn accept(&mut self, record: MaterialRecord);
}

impl RecordSink for Vec<MaterialRecord> {
    fn accept(&mut self, record: MaterialRecord) {
        self.push(record);
    }
}

/// Build one record from a line and hand it to the sink. Returns the record id.
pub fn emit(sink: &mut dyn RecordSink, line: &MaterialLine, cost: Option<CostEstimate>) -> Uuid {
    let record = MaterialRecord {
        id: Uuid::new_v4(),
        created: Utc::now(),
        category: line.category.as_str().to_string(),
        sub_type: line.sub_type.clone(),
        label: line.label.clone(),
        quantity: num(line.quantity),
        unit: line.unit.clone(),
        wastage_adjusted_quantity: num(line.wastage_adjusted_quantity),
        cost,
    };
    let id = record.id;
    tracing::debug!(
        record_id = %id,
        category = %record.category,
        sub_type = %record.sub_type,
        quantity = record.wastage_adjusted_quantity,
        "emitting material record"
    );
    sink.accept(record);
    id
}

/// Emit a line, pricing the wastage-adjusted quantity from the cost book
/// when it has an entry for the line
pub fn emit_priced(sink: &mut dyn RecordSink, line: &MaterialLine, costs: &CostBook) -> Uuid {
    let cost = costs
        .get(line.category, &line.sub_type)
        .map(|input| attach_cost(input, line.wastage_adjusted_quantity));
    emit(sink, line, cost)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cost::CostInput;

    fn line() -> MaterialLine {
        MaterialLine::new(MaterialCategory::Concrete, "fc210", "Slab pour", 10.0, "m³", 10.3)
    }

    #[test]
    fn test_emit_hands_over_one_record() {
        let mut sink: Vec<MaterialRecord> = Vec::new();
        let id = emit(&mut sink, &line(), None);
        assert_eq!(sink.len(), 1);
        let record = &sink[0];
        assert_eq!(record.id(), id);
        assert_eq!(record.category(), "concrete");
        assert_eq!(record.sub_type(), "fc210");
        assert_eq!(record.unit(), "m³");
        assert_eq!(record.wastage_adjusted_quantity(), 10.3);
        assert!(record.cost().is_none());
    }

    #[test]
    fn test_emit_priced() {
        let mut book = CostBook::new();
        book.set(MaterialCategory::Concrete, "fc210", CostInput::new(None, "fc' 210", 3000.0));
        let mut sink: Vec<MaterialRecord> = Vec::new();
        emit_priced(&mut sink, &line(), &book);
        let cost = sink[0].cost().unwrap();
        assert!((cost.quantity - 10.3).abs() < 1e-12);
        assert!((cost.subtotal - 30900.0).abs() < 1e-6);
    }

    #[test]
    fn test_record_serialization() {
        let mut sink: Vec<MaterialRecord> = Vec::new();
        emit(&mut sink, &line(), None);
        let json = serde_json::to_string(&sink[0]).unwrap();
        assert!(json.contains("\"category\":\"concrete\""));
        let back: MaterialRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back.label(), "Slab pour");
    }

    #[test]
    fn test_line_sanitizes() {
        let l = MaterialLine::exact(MaterialCategory::Estimate, "paint_area", "Paintable area", f64::NAN, "m²");
        assert!(l.is_zero());
    }
}
