//! # Takeoff Session
//!
//! A [`TakeoffSession`] is the root container: one instance of every
//! calculator, the settings, a cost book and metadata. Sessions serialize
//! to human-readable JSON (see [`crate::file_io`] for atomic saves).
//!
//! ```text
//! TakeoffSession
//! ├── meta: SessionMeta (schema version, name, estimator, timestamps)
//! ├── settings: TakeoffSettings (wastage overrides, units, currency)
//! ├── costs: CostBook (unit prices keyed by category.sub_type)
//! └── one field per calculator (rows or single input)
//! ```
//!
//! ## Example
//!
//! ```rust
//! use takeoff_core::record::MaterialRecord;
//! use takeoff_core::session::TakeoffSession;
//!
//! let mut session = TakeoffSession::new("Site A", "estimator");
//! session.update_row("concrete", 1, "length", 5.0).unwrap();
//! session.update_row("concrete", 1, "width", 4.0).unwrap();
//! session.update_row("concrete", 1, "height", 0.15).unwrap();
//!
//! let mut records: Vec<MaterialRecord> = Vec::new();
//! let count = session.export_records(&session.costs, &mut records);
//! assert_eq!(count, 1);
//! assert_eq!(records[0].category(), "concrete");
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::calculators::building::BuildingEstimateCalculator;
use crate::calculators::finish::{CoverageCalculator, PaintCalculator, PuttyCalculator};
use crate::calculators::masonry::{BrickCalculator, MasonryQuickCalculator, MortarCalculator, PlasterCalculator};
use crate::calculators::structural::{
    ComponentCalculator, ConcreteCalculator, FormworkEstimateCalculator, RebarAreaCalculator, RebarExactCalculator,
};
use crate::calculators::tile::{AdhesiveCalculator, GroutCalculator, TileCalculator, TileLaborCalculator};
use crate::calculators::{Calculator, CalculatorId, TakeoffContext};
use crate::cost::{attach_cost, CostBook};
use crate::errors::{TakeoffError, TakeoffResult};
use crate::input::FieldValue;
use crate::presets::PresetCatalog;
use crate::record::{emit, MaterialLine, RecordSink};
use crate::rows::{RowCollection, RowFields};
use crate::settings::TakeoffSettings;
use crate::snapshot::{load_rows, save_rows, SnapshotStore};
use crate::units::AreaUnit;

/// Current schema version of session files and row snapshots
pub const SCHEMA_VERSION: &str = "0.1.0";

/// Check a file's schema version against [`SCHEMA_VERSION`].
///
/// The major version must match; while on 0.x, a file with a newer minor
/// version than ours is rejected too.
pub fn validate_version(file_version: &str) -> TakeoffResult<()> {
    let parse = |v: &str| -> Vec<u32> { v.split('.').filter_map(|p| p.trim().parse().ok()).collect() };
    let file_parts = parse(file_version);
    let current_parts = parse(SCHEMA_VERSION);

    let mismatch = || TakeoffError::VersionMismatch {
        file_version: file_version.to_string(),
        expected_version: SCHEMA_VERSION.to_string(),
    };

    let (Some(file_major), Some(current_major)) = (file_parts.first(), current_parts.first()) else {
        return Err(mismatch());
    };
    if file_major != current_major {
        return Err(mismatch());
    }
    if *current_major == 0 {
        if let (Some(file_minor), Some(current_minor)) = (file_parts.get(1), current_parts.get(1)) {
            if file_minor > current_minor {
                return Err(mismatch());
            }
        }
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionMeta {
    /// Schema version the file was written with
    pub version: String,
    /// Project or site name
    pub name: String,
    pub estimator: String,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TakeoffSession {
    pub meta: SessionMeta,

    #[serde(default)]
    pub settings: TakeoffSettings,

    #[serde(default)]
    pub costs: CostBook,

    #[serde(default)]
    pub concrete: ConcreteCalculator,
    #[serde(default)]
    pub rebar_exact: RebarExactCalculator,
    #[serde(default)]
    pub rebar_area: RebarAreaCalculator,
    #[serde(default)]
    pub formwork_estimate: FormworkEstimateCalculator,
    #[serde(default)]
    pub component: ComponentCalculator,
    #[serde(default)]
    pub mortar: MortarCalculator,
    #[serde(default)]
    pub plaster: PlasterCalculator,
    #[serde(default)]
    pub brick: BrickCalculator,
    #[serde(default)]
    pub masonry_quick: MasonryQuickCalculator,
    #[serde(default)]
    pub tile: TileCalculator,
    #[serde(default)]
    pub grout: GroutCalculator,
    #[serde(default)]
    pub adhesive: AdhesiveCalculator,
    #[serde(default)]
    pub tile_labor: TileLaborCalculator,
    #[serde(default)]
    pub paint: PaintCalculator,
    #[serde(default)]
    pub putty: PuttyCalculator,
    #[serde(default)]
    pub coverage: CoverageCalculator,
    #[serde(default)]
    pub building: BuildingEstimateCalculator,
}

impl TakeoffSession {
    pub fn new(name: impl Into<String>, estimator: impl Into<String>) -> Self {
        let now = Utc::now();
        TakeoffSession {
            meta: SessionMeta {
                version: SCHEMA_VERSION.to_string(),
                name: name.into(),
                estimator: estimator.into(),
                created: now,
                modified: now,
            },
            settings: TakeoffSettings::default(),
            costs: CostBook::new(),
            concrete: Default::default(),
            rebar_exact: Default::default(),
            rebar_area: Default::default(),
            formwork_estimate: Default::default(),
            component: Default::default(),
            mortar: Default::default(),
            plaster: Default::default(),
            brick: Default::default(),
            masonry_quick: Default::default(),
            tile: Default::default(),
            grout: Default::default(),
            adhesive: Default::default(),
            tile_labor: Default::default(),
            paint: Default::default(),
            putty: Default::default(),
            coverage: Default::default(),
            building: Default::default(),
        }
    }

    /// A new session whose area rows and inputs start in the settings' default unit
    pub fn with_settings(name: impl Into<String>, estimator: impl Into<String>, settings: TakeoffSettings) -> Self {
        let mut session = TakeoffSession::new(name, estimator);
        let unit = settings.default_area_unit;
        let key = match unit {
            AreaUnit::Sqm => "sqm",
            AreaUnit::Ping => "ping",
        };
        session.tile.rows.update_row(1, "unit", key);
        session.grout.rows.update_row(1, "unit", key);
        session.adhesive.rows.update_row(1, "unit", key);
        session.paint.rows.update_row(1, "unit", key);
        session.putty.rows.update_row(1, "unit", key);
        session.tile_labor.input.unit = unit;
        session.coverage.input.unit = unit;
        session.building.input.unit = unit;
        session.settings = settings;
        session
    }

    /// Update the modified timestamp
    pub fn touch(&mut self) {
        self.meta.modified = Utc::now();
    }

    /// Every calculator, in [`CalculatorId::ALL`] order
    pub fn calculators(&self) -> [&dyn Calculator; 17] {
        [
            &self.concrete,
            &self.rebar_exact,
            &self.rebar_area,
            &self.formwork_estimate,
            &self.component,
            &self.mortar,
            &self.plaster,
            &self.brick,
            &self.masonry_quick,
            &self.tile,
            &self.grout,
            &self.adhesive,
            &self.tile_labor,
            &self.paint,
            &self.putty,
            &self.coverage,
            &self.building,
        ]
    }

    pub fn calculator(&self, id: CalculatorId) -> &dyn Calculator {
        let index = CalculatorId::ALL.iter().position(|c| *c == id).unwrap_or(0);
        self.calculators()[index]
    }

    /// Material lines of every calculator, zero lines included
    pub fn material_lines(&self) -> Vec<(CalculatorId, MaterialLine)> {
        let wastage = self.settings.wastage_defaults();
        let ctx = TakeoffContext::new(PresetCatalog::standard(), &wastage);
        self.calculators()
            .into_iter()
            .flat_map(|calc| calc.material_lines(&ctx).into_iter().map(move |line| (calc.id(), line)))
            .collect()
    }

    /// Emit one record per non-zero material line, calculators in
    /// [`CalculatorId::ALL`] order. Returns the number of records emitted.
    ///
    /// A cost book entry prices the wastage-adjusted quantity; lines without
    /// one fall back to a price the calculator carries itself (labor rates).
    pub fn export_records(&self, costs: &CostBook, sink: &mut dyn RecordSink) -> usize {
        let wastage = self.settings.wastage_defaults();
        let ctx = TakeoffContext::new(PresetCatalog::standard(), &wastage);

        let mut emitted = 0;
        for calc in self.calculators() {
            for line in calc.material_lines(&ctx) {
                if line.is_zero() {
                    continue;
                }
                let cost = costs
                    .get(line.category, &line.sub_type)
                    .cloned()
                    .or_else(|| calc.line_cost(&line, &ctx))
                    .map(|input| attach_cost(&input, line.wastage_adjusted_quantity));
                emit(sink, &line, cost);
                emitted += 1;
            }
        }

        tracing::info!(session = %self.meta.name, records = emitted, "exported material records");
        emitted
    }

    /// Set one field of one row in a row calculator, addressed by calculator key.
    ///
    /// Returns `Ok(false)` when the row or field does not exist.
    pub fn update_row(
        &mut self,
        calculator: &str,
        row_id: u32,
        field: &str,
        value: impl Into<FieldValue>,
    ) -> TakeoffResult<bool> {
        let id = CalculatorId::from_key(calculator).ok_or_else(|| TakeoffError::unknown_calculator(calculator))?;
        let value = value.into();
        let updated = match id {
            CalculatorId::Concrete => self.concrete.rows.update_row(row_id, field, value),
            CalculatorId::RebarExact => self.rebar_exact.rows.update_row(row_id, field, value),
            CalculatorId::RebarArea => self.rebar_area.rows.update_row(row_id, field, value),
            CalculatorId::Component => self.component.rows.update_row(row_id, field, value),
            CalculatorId::Mortar => self.mortar.rows.update_row(row_id, field, value),
            CalculatorId::Plaster => self.plaster.rows.update_row(row_id, field, value),
            CalculatorId::Brick => self.brick.rows.update_row(row_id, field, value),
            CalculatorId::Tile => self.tile.rows.update_row(row_id, field, value),
            CalculatorId::Grout => self.grout.rows.update_row(row_id, field, value),
            CalculatorId::Adhesive => self.adhesive.rows.update_row(row_id, field, value),
            CalculatorId::Paint => self.paint.rows.update_row(row_id, field, value),
            CalculatorId::Putty => self.putty.rows.update_row(row_id, field, value),
            CalculatorId::FormworkEstimate
            | CalculatorId::MasonryQuick
            | CalculatorId::TileLabor
            | CalculatorId::Coverage
            | CalculatorId::Building => {
                return Err(TakeoffError::invalid_input(
                    "calculator",
                    calculator,
                    "single-input calculator has no rows",
                ))
            }
        };
        if updated {
            self.touch();
        }
        Ok(updated)
    }

    /// Save every row collection to a snapshot store
    pub fn persist(&self, store: &mut dyn SnapshotStore) -> TakeoffResult<()> {
        save_rows(store, CalculatorId::Concrete, &self.concrete.rows)?;
        save_rows(store, CalculatorId::RebarExact, &self.rebar_exact.rows)?;
        save_rows(store, CalculatorId::RebarArea, &self.rebar_area.rows)?;
        save_rows(store, CalculatorId::Component, &self.component.rows)?;
        save_rows(store, CalculatorId::Mortar, &self.mortar.rows)?;
        save_rows(store, CalculatorId::Plaster, &self.plaster.rows)?;
        save_rows(store, CalculatorId::Brick, &self.brick.rows)?;
        save_rows(store, CalculatorId::Tile, &self.tile.rows)?;
        save_rows(store, CalculatorId::Grout, &self.grout.rows)?;
        save_rows(store, CalculatorId::Adhesive, &self.adhesive.rows)?;
        save_rows(store, CalculatorId::Paint, &self.paint.rows)?;
        save_rows(store, CalculatorId::Putty, &self.putty.rows)?;
        tracing::info!(session = %self.meta.name, "persisted row snapshots");
        Ok(())
    }

    /// Restore every row collection the store has a snapshot for.
    /// Returns how many collections were restored.
    pub fn restore(&mut self, store: &dyn SnapshotStore) -> TakeoffResult<usize> {
        // Load everything first so a bad snapshot leaves the session untouched.
        let concrete = load_rows(store, CalculatorId::Concrete)?;
        let rebar_exact = load_rows(store, CalculatorId::RebarExact)?;
        let rebar_area = load_rows(store, CalculatorId::RebarArea)?;
        let component = load_rows(store, CalculatorId::Component)?;
        let mortar = load_rows(store, CalculatorId::Mortar)?;
        let plaster = load_rows(store, CalculatorId::Plaster)?;
        let brick = load_rows(store, CalculatorId::Brick)?;
        let tile = load_rows(store, CalculatorId::Tile)?;
        let grout = load_rows(store, CalculatorId::Grout)?;
        let adhesive = load_rows(store, CalculatorId::Adhesive)?;
        let paint = load_rows(store, CalculatorId::Paint)?;
        let putty = load_rows(store, CalculatorId::Putty)?;

        let mut restored = 0;
        restored += assign(&mut self.concrete.rows, concrete);
        restored += assign(&mut self.rebar_exact.rows, rebar_exact);
        restored += assign(&mut self.rebar_area.rows, rebar_area);
        restored += assign(&mut self.component.rows, component);
        restored += assign(&mut self.mortar.rows, mortar);
        restored += assign(&mut self.plaster.rows, plaster);
        restored += assign(&mut self.brick.rows, brick);
        restored += assign(&mut self.tile.rows, tile);
        restored += assign(&mut self.grout.rows, grout);
        restored += assign(&mut self.adhesive.rows, adhesive);
        restored += assign(&mut self.paint.rows, paint);
        restored += assign(&mut self.putty.rows, putty);
        if restored > 0 {
            self.touch();
        }
        tracing::info!(session = %self.meta.name, restored, "restored row snapshots");
        Ok(restored)
    }
}

fn assign<T: RowFields>(rows: &mut RowCollection<T>, loaded: Option<RowCollection<T>>) -> usize {
    match loaded {
        Some(loaded) => {
            *rows = loaded;
            1
        }
        None => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cost::CostInput;
    use crate::record::MaterialRecord;
    use crate::snapshot::MemorySnapshotStore;
    use crate::wastage::MaterialCategory;

    fn sample() -> TakeoffSession {
        let mut s = TakeoffSession::new("Site A", "estimator");
        s.update_row("concrete", 1, "length", 5.0).unwrap();
        s.update_row("concrete", 1, "width", 4.0).unwrap();
        s.update_row("concrete", 1, "height", 0.15).unwrap();
        s.update_row("brick", 1, "area", 10.0).unwrap();
        s.tile_labor.input.area = 2.0;
        s.tile_labor.input.unit = AreaUnit::Ping;
        s
    }

    #[test]
    fn test_version_validation() {
        assert!(validate_version(SCHEMA_VERSION).is_ok());
        assert!(validate_version("0.1.7").is_ok());
        assert!(validate_version("0.0.9").is_ok());
        assert!(validate_version("0.2.0").is_err());
        assert!(validate_version("1.0.0").is_err());
        assert!(validate_version("garbage").is_err());
    }

    #[test]
    fn test_calculators_follow_id_order() {
        let s = TakeoffSession::new("x", "y");
        let ids: Vec<CalculatorId> = s.calculators().iter().map(|c| c.id()).collect();
        assert_eq!(ids, CalculatorId::ALL.to_vec());
        assert_eq!(s.calculator(CalculatorId::Grout).id(), CalculatorId::Grout);
    }

    #[test]
    fn test_export_skips_zero_lines_in_stable_order() {
        let s = sample();
        let mut records: Vec<MaterialRecord> = Vec::new();
        let count = s.export_records(&CostBook::new(), &mut records);
        assert_eq!(count, 3);
        let categories: Vec<&str> = records.iter().map(|r| r.category()).collect();
        assert_eq!(categories, vec!["concrete", "brick", "labor"]);
        assert!((records[0].wastage_adjusted_quantity() - 3.09).abs() < 1e-9);
        assert!(records[0].cost().is_none());
    }

    #[test]
    fn test_export_prices_lines() {
        let s = sample();
        let mut costs = CostBook::new();
        costs.set(MaterialCategory::Brick, "brick", CostInput::new(None, "red brick", 5.0));
        let mut records: Vec<MaterialRecord> = Vec::new();
        s.export_records(&costs, &mut records);

        let brick = records.iter().find(|r| r.category() == "brick").unwrap();
        let cost = brick.cost().unwrap();
        assert!((cost.quantity - 1344.0).abs() < 1e-9);
        assert!((cost.subtotal - 6720.0).abs() < 1e-6);

        let labor = records.iter().find(|r| r.category() == "labor").unwrap();
        assert!((labor.cost().unwrap().subtotal - 6000.0).abs() < 1e-9);
    }

    #[test]
    fn test_settings_overrides_reach_lines() {
        let mut s = sample();
        s.settings.wastage_overrides.insert(MaterialCategory::Concrete, 10.0);
        let lines = s.material_lines();
        let (_, concrete) = lines.iter().find(|(id, _)| *id == CalculatorId::Concrete).unwrap();
        assert!((concrete.wastage_adjusted_quantity - 3.3).abs() < 1e-9);
    }

    #[test]
    fn test_with_settings_sets_area_unit() {
        let settings = TakeoffSettings {
            default_area_unit: AreaUnit::Ping,
            ..Default::default()
        };
        let s = TakeoffSession::with_settings("x", "y", settings);
        assert_eq!(s.tile.rows.rows()[0].fields.unit, AreaUnit::Ping);
        assert_eq!(s.paint.rows.rows()[0].fields.unit, AreaUnit::Ping);
        assert_eq!(s.coverage.input.unit, AreaUnit::Ping);
        assert_eq!(s.settings.default_area_unit, AreaUnit::Ping);
    }

    #[test]
    fn test_update_row_errors() {
        let mut s = TakeoffSession::new("x", "y");
        assert_eq!(s.update_row("nope", 1, "area", 1.0).unwrap_err().error_code(), "UNKNOWN_CALCULATOR");
        assert_eq!(s.update_row("coverage", 1, "area", 1.0).unwrap_err().error_code(), "INVALID_INPUT");
        assert!(!s.update_row("brick", 99, "area", 1.0).unwrap());
        assert!(!s.update_row("brick", 1, "colour", 1.0).unwrap());
    }

    #[test]
    fn test_persist_and_restore() {
        let original = sample();
        let mut store = MemorySnapshotStore::new();
        original.persist(&mut store).unwrap();
        assert_eq!(store.len(), 12);

        let mut fresh = TakeoffSession::new("Site A", "estimator");
        assert_eq!(fresh.restore(&store).unwrap(), 12);
        assert_eq!(fresh.concrete.rows, original.concrete.rows);
        assert_eq!(fresh.brick.rows, original.brick.rows);
    }

    #[test]
    fn test_failed_restore_leaves_rows_untouched() {
        let mut saved = TakeoffSession::new("Site A", "estimator");
        saved.concrete.rows.update_row(1, "length", 9.0);
        let mut store = MemorySnapshotStore::new();
        saved.persist(&mut store).unwrap();
        store.save_raw(CalculatorId::RebarExact, "{ broken".into()).unwrap();

        let mut session = sample();
        let before = session.concrete.rows.clone();
        let modified = session.meta.modified;
        assert!(session.restore(&store).is_err());
        assert_eq!(session.concrete.rows, before);
        assert_eq!(session.concrete.rows.rows()[0].fields.length, 5.0);
        assert_eq!(session.meta.modified, modified);
    }

    #[test]
    fn test_session_json_roundtrip() {
        let s = sample();
        let json = serde_json::to_string_pretty(&s).unwrap();
        let back: TakeoffSession = serde_json::from_str(&json).unwrap();
        assert_eq!(back, s);
    }

    #[test]
    fn test_minimal_session_json() {
        let json = r#"{"meta":{"version":"0.1.0","name":"n","estimator":"e",
            "created":"2026-01-01T00:00:00Z","modified":"2026-01-01T00:00:00Z"},
            "brick":{"rows":[{"id":1,"area":"3"}]}}"#;
        let s: TakeoffSession = serde_json::from_str(json).unwrap();
        assert_eq!(s.brick.rows.rows()[0].fields.area, 3.0);
        assert_eq!(s.concrete.rows.len(), 1);
    }
}
