//! # Takeoff Calculators
//!
//! One calculator per material domain. Row-oriented calculators follow the
//! pattern:
//!
//! - `*Row` - One input line (implements [`RowFields`], `Default` is the new-row shape)
//! - `*RowResult` - The row plus its derived quantity, recomputed on demand
//! - `*Calculator` - Owns a [`RowCollection`] and a wastage setting, exposes
//!   `row_results()`, a summary and its [`MaterialLine`]s
//!
//! Single-input calculators (formwork estimate, quick masonry estimate,
//! coverage, building estimate) use the `*Input` / `*Result` /
//! `calculate(input, ctx)` pattern, with a thin `*Calculator` wrapper that
//! holds the input for the session.
//!
//! No calculator returns an error: blank fields are 0 and unknown preset
//! keys use the catalog fallbacks.
//!
//! ## Available Calculators
//!
//! - [`structural`] - Concrete, rebar, formwork and per-component takeoff
//! - [`masonry`] - Render mortar, plaster mixes, bricks, quick estimate
//! - [`tile`] - Tile count, grout, adhesive, laying labor
//! - [`finish`] - Paint, putty, coverage estimate
//! - [`building`] - Whole-building per-m² estimate

pub mod building;
pub mod finish;
pub mod masonry;
pub mod structural;
pub mod tile;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::cost::CostInput;
use crate::presets::PresetCatalog;
use crate::record::MaterialLine;
use crate::rows::{RowCollection, RowFields};
use crate::wastage::WastageDefaults;

/// Identity of a calculator; the key of its persisted rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CalculatorId {
    Concrete,
    RebarExact,
    RebarArea,
    FormworkEstimate,
    Component,
    Mortar,
    Plaster,
    Brick,
    MasonryQuick,
    Tile,
    Grout,
    Adhesive,
    TileLabor,
    Paint,
    Putty,
    Coverage,
    Building,
}

impl CalculatorId {
    pub const ALL: [CalculatorId; 17] = [
        CalculatorId::Concrete,
        CalculatorId::RebarExact,
        CalculatorId::RebarArea,
        CalculatorId::FormworkEstimate,
        CalculatorId::Component,
        CalculatorId::Mortar,
        CalculatorId::Plaster,
        CalculatorId::Brick,
        CalculatorId::MasonryQuick,
        CalculatorId::Tile,
        CalculatorId::Grout,
        CalculatorId::Adhesive,
        CalculatorId::TileLabor,
        CalculatorId::Paint,
        CalculatorId::Putty,
        CalculatorId::Coverage,
        CalculatorId::Building,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CalculatorId::Concrete => "concrete",
            CalculatorId::RebarExact => "rebar-exact",
            CalculatorId::RebarArea => "rebar-area",
            CalculatorId::FormworkEstimate => "formwork-estimate",
            CalculatorId::Component => "component",
            CalculatorId::Mortar => "mortar",
            CalculatorId::Plaster => "plaster",
            CalculatorId::Brick => "brick",
            CalculatorId::MasonryQuick => "masonry-quick",
            CalculatorId::Tile => "tile",
            CalculatorId::Grout => "grout",
            CalculatorId::Adhesive => "adhesive",
            CalculatorId::TileLabor => "tile-labor",
            CalculatorId::Paint => "paint",
            CalculatorId::Putty => "putty",
            CalculatorId::Coverage => "coverage",
            CalculatorId::Building => "building",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        let key = key.trim();
        CalculatorId::ALL.into_iter().find(|id| id.as_str() == key)
    }
}

impl std::fmt::Display for CalculatorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

static STANDARD_WASTAGE: Lazy<WastageDefaults> = Lazy::new(WastageDefaults::standard);

/// Read-only data every formula may consult.
#[derive(Debug, Clone, Copy)]
pub struct TakeoffContext<'a> {
    pub catalog: &'a PresetCatalog,
    pub wastage: &'a WastageDefaults,
}

impl<'a> TakeoffContext<'a> {
    pub fn new(catalog: &'a PresetCatalog, wastage: &'a WastageDefaults) -> Self {
        TakeoffContext { catalog, wastage }
    }
}

impl TakeoffContext<'static> {
    /// Standard catalog with built-in wastage defaults
    pub fn standard() -> Self {
        TakeoffContext {
            catalog: PresetCatalog::standard(),
            wastage: &STANDARD_WASTAGE,
        }
    }
}

/// Anything that produces material lines.
pub trait Calculator {
    fn id(&self) -> CalculatorId;

    /// Material quantities of the current state, zero lines included
    fn material_lines(&self, ctx: &TakeoffContext<'_>) -> Vec<MaterialLine>;

    /// Price a calculator carries for one of its own lines (labor rates).
    /// A cost book entry for the line takes precedence.
    fn line_cost(&self, _line: &MaterialLine, _ctx: &TakeoffContext<'_>) -> Option<CostInput> {
        None
    }
}

/// A calculator driven by an editable row collection.
pub trait RowCalculator: Calculator {
    type Row: RowFields;

    fn rows(&self) -> &RowCollection<Self::Row>;

    fn rows_mut(&mut self) -> &mut RowCollection<Self::Row>;
}

/// Sum of a per-row quantity; order independent up to float rounding
pub(crate) fn sum<I: IntoIterator<Item = f64>>(values: I) -> f64 {
    values.into_iter().map(crate::input::num).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calculator_id_keys() {
        for id in CalculatorId::ALL {
            assert_eq!(CalculatorId::from_key(id.as_str()), Some(id));
            let json = serde_json::to_string(&id).unwrap();
            assert_eq!(json, format!("\"{}\"", id.as_str()));
        }
        assert_eq!(CalculatorId::from_key("nope"), None);
    }

    #[test]
    fn test_standard_context() {
        let ctx = TakeoffContext::standard();
        assert_eq!(ctx.wastage.get(crate::wastage::MaterialCategory::Rebar), 5.0);
        assert_eq!(ctx.catalog.bricks_per_sqm("24"), 128.0);
    }
}
