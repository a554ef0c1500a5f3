//! # Component Rebar
//!
//! Two strategies per component row:
//!
//! - **Standard**: `concrete volume × ratio`, the ratio (kg/m³) coming from
//!   the row override or the catalog ratio for the member type.
//! - **Advanced**: bar-by-bar layout.
//!   - Slab-type members (floor, wall, parapet, foundation) use a two-way
//!     grid: `ceil(span·1000 / spacing) + 1` bars each way, each bar running
//!     the other span, doubled for a double layer.
//!   - Columns: main bars over the height plus stirrups at
//!     `ceil(H·1000 / s) + 1`, each one section perimeter long.
//!   - Beams: top and bottom bars over the length plus stirrups at
//!     `ceil(L·1000 / s) + 1`, each `2(w + h)` long.
//!
//! Spacing is in millimeters. A spacing or span of zero places no bars.

use serde::{Deserialize, Serialize};

use crate::input::{lenient, num, FieldValue};
use crate::presets::rebar::DEFAULT_REBAR_KEY;
use crate::presets::{PresetCatalog, Section};

use super::component::{MemberDims, ResolvedMember};

fn default_bar() -> String {
    DEFAULT_REBAR_KEY.to_string()
}

fn default_stirrup() -> String {
    "#3".to_string()
}

fn default_spacing() -> f64 {
    200.0
}

fn default_stirrup_spacing() -> f64 {
    150.0
}

fn default_main_count() -> f64 {
    8.0
}

fn default_beam_bars() -> f64 {
    3.0
}

/// Bar-by-bar layout parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvancedRebar {
    /// Main / grid bar size key
    #[serde(default = "default_bar", deserialize_with = "lenient::key")]
    pub bar_size: String,

    /// Grid spacing for slab-type members (mm)
    #[serde(default = "default_spacing", deserialize_with = "lenient::f64")]
    pub spacing_mm: f64,

    /// Two grid layers (top and bottom, or both wall faces)
    #[serde(default, deserialize_with = "lenient::bool")]
    pub double_layer: bool,

    /// Column main bars
    #[serde(default = "default_main_count", deserialize_with = "lenient::f64")]
    pub main_bar_count: f64,

    /// Beam top bars
    #[serde(default = "default_beam_bars", deserialize_with = "lenient::f64")]
    pub top_bar_count: f64,

    /// Beam bottom bars
    #[serde(default = "default_beam_bars", deserialize_with = "lenient::f64")]
    pub bottom_bar_count: f64,

    #[serde(default = "default_stirrup", deserialize_with = "lenient::key")]
    pub stirrup_size: String,

    /// Stirrup / tie spacing (mm)
    #[serde(default = "default_stirrup_spacing", deserialize_with = "lenient::f64")]
    pub stirrup_spacing_mm: f64,
}

impl Default for AdvancedRebar {
    fn default() -> Self {
        AdvancedRebar {
            bar_size: default_bar(),
            spacing_mm: default_spacing(),
            double_layer: false,
            main_bar_count: default_main_count(),
            top_bar_count: default_beam_bars(),
            bottom_bar_count: default_beam_bars(),
            stirrup_size: default_stirrup(),
            stirrup_spacing_mm: default_stirrup_spacing(),
        }
    }
}

/// How a component row takes off its rebar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum RebarStrategy {
    Standard {
        /// kg/m³ override; 0 uses the catalog ratio of the member type
        #[serde(default, deserialize_with = "lenient::f64")]
        ratio: f64,
    },
    Advanced(AdvancedRebar),
}

impl Default for RebarStrategy {
    fn default() -> Self {
        RebarStrategy::Standard { ratio: 0.0 }
    }
}

impl RebarStrategy {
    /// Update a field of the active strategy; fields of the other mode are rejected
    pub fn set_field(&mut self, field: &str, value: &FieldValue) -> bool {
        match self {
            RebarStrategy::Standard { ratio } => match field {
                "ratio" => *ratio = value.as_f64(),
                _ => return false,
            },
            RebarStrategy::Advanced(params) => match field {
                "bar_size" => params.bar_size = value.as_text(),
                "spacing_mm" => params.spacing_mm = value.as_f64(),
                "double_layer" => params.double_layer = value.as_bool(),
                "main_bar_count" => params.main_bar_count = value.as_f64(),
                "top_bar_count" => params.top_bar_count = value.as_f64(),
                "bottom_bar_count" => params.bottom_bar_count = value.as_f64(),
                "stirrup_size" => params.stirrup_size = value.as_text(),
                "stirrup_spacing_mm" => params.stirrup_spacing_mm = value.as_f64(),
                _ => return false,
            },
        }
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RebarMethod {
    Standard,
    Advanced,
}

/// Rebar of one component row (all members).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RebarTakeoff {
    pub method: RebarMethod,
    /// Ratio used (kg/m³), standard method only
    pub ratio_kg_m3: f64,
    /// Main, grid or longitudinal bars (kg)
    pub main_kg: f64,
    /// Stirrups and ties (kg)
    pub stirrup_kg: f64,
    pub total_kg: f64,
    /// Bar length placed (m), advanced method only
    pub total_length_m: f64,
}

impl RebarTakeoff {
    fn standard(concrete_m3: f64, ratio: f64) -> Self {
        let total_kg = num(concrete_m3 * ratio);
        RebarTakeoff {
            method: RebarMethod::Standard,
            ratio_kg_m3: ratio,
            main_kg: total_kg,
            stirrup_kg: 0.0,
            total_kg,
            total_length_m: 0.0,
        }
    }

    fn advanced(main: BarRun, stirrups: BarRun) -> Self {
        RebarTakeoff {
            method: RebarMethod::Advanced,
            ratio_kg_m3: 0.0,
            main_kg: main.weight_kg,
            stirrup_kg: stirrups.weight_kg,
            total_kg: num(main.weight_kg + stirrups.weight_kg),
            total_length_m: num(main.length_m + stirrups.length_m),
        }
    }
}

/// A run of bars: total length and weight
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BarRun {
    pub length_m: f64,
    pub weight_kg: f64,
}

impl BarRun {
    fn new(length_m: f64, unit_weight: f64) -> Self {
        let length_m = num(length_m);
        BarRun {
            length_m,
            weight_kg: num(length_m * unit_weight),
        }
    }

    fn plus(self, other: BarRun) -> BarRun {
        BarRun {
            length_m: self.length_m + other.length_m,
            weight_kg: self.weight_kg + other.weight_kg,
        }
    }
}

/// Bars across a span at a spacing: `ceil(span·1000 / spacing) + 1`, 0 when
/// either is not positive
pub fn bar_count(span_m: f64, spacing_mm: f64) -> f64 {
    let span_m = num(span_m);
    let spacing_mm = num(spacing_mm);
    if span_m <= 0.0 || spacing_mm <= 0.0 {
        return 0.0;
    }
    (span_m * 1000.0 / spacing_mm).ceil() + 1.0
}

/// Two-way grid over `lx × ly` for one member
pub fn two_way_grid(lx: f64, ly: f64, spacing_mm: f64, unit_weight: f64, double_layer: bool) -> BarRun {
    // bars along x are spaced across y, and the other way round
    let bars_x = bar_count(ly, spacing_mm);
    let bars_y = bar_count(lx, spacing_mm);
    let layers = if double_layer { 2.0 } else { 1.0 };
    BarRun::new((bars_x * lx + bars_y * ly) * layers, unit_weight)
}

/// Grid spans of a slab-type member, `None` for columns and beams
fn grid_spans(dims: &MemberDims) -> Option<(f64, f64)> {
    match *dims {
        MemberDims::Floor { length, width, .. } => Some((length, width)),
        MemberDims::Wall { length, height, .. } => Some((length, height)),
        MemberDims::Parapet { length, height, .. } => Some((length, height)),
        MemberDims::Foundation { length, width, .. } => Some((length, width)),
        MemberDims::Column { .. } | MemberDims::Beam { .. } => None,
    }
}

fn column_runs(section: Section, height: f64, params: &AdvancedRebar, catalog: &PresetCatalog) -> (BarRun, BarRun) {
    let main = catalog.rebar(&params.bar_size);
    let tie = catalog.rebar(&params.stirrup_size);
    let mains = BarRun::new(num(params.main_bar_count) * height, main.unit_weight_kg_m);
    let ties = BarRun::new(
        bar_count(height, params.stirrup_spacing_mm) * section.perimeter(),
        tie.unit_weight_kg_m,
    );
    (mains, ties)
}

fn beam_runs(
    width: f64,
    height: f64,
    length: f64,
    params: &AdvancedRebar,
    catalog: &PresetCatalog,
) -> (BarRun, BarRun) {
    let main = catalog.rebar(&params.bar_size);
    let stirrup = catalog.rebar(&params.stirrup_size);
    let top = BarRun::new(num(params.top_bar_count) * length, main.unit_weight_kg_m);
    let bottom = BarRun::new(num(params.bottom_bar_count) * length, main.unit_weight_kg_m);
    let stirrups = BarRun::new(
        bar_count(length, params.stirrup_spacing_mm) * 2.0 * (width + height),
        stirrup.unit_weight_kg_m,
    );
    (top.plus(bottom), stirrups)
}

fn advanced_runs(resolved: &ResolvedMember, params: &AdvancedRebar, catalog: &PresetCatalog) -> (BarRun, BarRun) {
    if resolved.member.is_slab_type() {
        let (lx, ly) = grid_spans(&resolved.dims).unwrap_or_default();
        let bar = catalog.rebar(&params.bar_size);
        let grid = two_way_grid(lx, ly, params.spacing_mm, bar.unit_weight_kg_m, params.double_layer);
        return (grid, BarRun::default());
    }

    match resolved.dims {
        MemberDims::Column { section, height } => column_runs(section, height, params, catalog),
        MemberDims::Beam {
            width, height, length, ..
        } => beam_runs(width, height, length, params, catalog),
        _ => (BarRun::default(), BarRun::default()),
    }
}

fn scale(run: BarRun, count: f64) -> BarRun {
    BarRun {
        length_m: num(run.length_m * count),
        weight_kg: num(run.weight_kg * count),
    }
}

/// Rebar of a resolved component row under its strategy.
///
/// `concrete_m3` is the row's total concrete (all members), used by the
/// standard method.
pub fn resolve_rebar(
    resolved: &ResolvedMember,
    strategy: &RebarStrategy,
    concrete_m3: f64,
    catalog: &PresetCatalog,
) -> RebarTakeoff {
    match strategy {
        RebarStrategy::Standard { ratio } => {
            let ratio = if num(*ratio) > 0.0 {
                *ratio
            } else {
                catalog.rebar_ratio(resolved.member)
            };
            RebarTakeoff::standard(concrete_m3, ratio)
        }
        RebarStrategy::Advanced(params) => {
            let (main, stirrups) = advanced_runs(resolved, params, catalog);
            RebarTakeoff::advanced(scale(main, resolved.count), scale(stirrups, resolved.count))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculators::structural::component::{concrete_volume, resolve_member, ComponentRow};
    use crate::presets::MemberType;

    fn catalog() -> &'static PresetCatalog {
        PresetCatalog::standard()
    }

    fn member(row: ComponentRow) -> ResolvedMember {
        resolve_member(&row, catalog())
    }

    #[test]
    fn test_bar_count() {
        assert_eq!(bar_count(5.0, 200.0), 26.0);
        assert_eq!(bar_count(4.1, 200.0), 22.0);
        assert_eq!(bar_count(5.0, 0.0), 0.0);
        assert_eq!(bar_count(0.0, 200.0), 0.0);
    }

    #[test]
    fn test_two_way_grid() {
        // 5 × 4 slab at 200 mm: 21 bars of 5 m, 26 bars of 4 m
        let grid = two_way_grid(5.0, 4.0, 200.0, 0.994, false);
        assert!((grid.length_m - (21.0 * 5.0 + 26.0 * 4.0)).abs() < 1e-9);
        assert!((grid.weight_kg - 209.0 * 0.994).abs() < 1e-9);

        let double = two_way_grid(5.0, 4.0, 200.0, 0.994, true);
        assert!((double.weight_kg - 2.0 * grid.weight_kg).abs() < 1e-9);
    }

    #[test]
    fn test_standard_uses_catalog_ratio() {
        let m = member(ComponentRow {
            member: MemberType::Beam,
            preset: "B30x60".into(),
            length: 6.0,
            ..Default::default()
        });
        let concrete = concrete_volume(&m);
        let takeoff = resolve_rebar(&m, &RebarStrategy::default(), concrete, catalog());
        assert_eq!(takeoff.method, RebarMethod::Standard);
        assert_eq!(takeoff.ratio_kg_m3, 140.0);
        assert!((takeoff.total_kg - 1.08 * 140.0).abs() < 1e-9);
    }

    #[test]
    fn test_standard_ratio_override() {
        let m = member(ComponentRow {
            member: MemberType::Wall,
            preset: "W20".into(),
            length: 5.0,
            height: 3.0,
            ..Default::default()
        });
        let takeoff = resolve_rebar(&m, &RebarStrategy::Standard { ratio: 100.0 }, 3.0, catalog());
        assert!((takeoff.total_kg - 300.0).abs() < 1e-9);
        assert_eq!(takeoff.stirrup_kg, 0.0);
    }

    #[test]
    fn test_advanced_floor_grid() {
        let m = member(ComponentRow {
            member: MemberType::Floor,
            preset: "S15".into(),
            length: 5.0,
            width: 4.0,
            count: 2.0,
            ..Default::default()
        });
        let strategy = RebarStrategy::Advanced(AdvancedRebar {
            double_layer: true,
            ..Default::default()
        });
        let takeoff = resolve_rebar(&m, &strategy, concrete_volume(&m), catalog());
        assert_eq!(takeoff.method, RebarMethod::Advanced);
        let expected = 209.0 * 0.994 * 2.0 * 2.0;
        assert!((takeoff.total_kg - expected).abs() < 1e-9);
        assert!((takeoff.total_length_m - 209.0 * 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_advanced_wall_uses_height_span() {
        let m = member(ComponentRow {
            member: MemberType::Wall,
            preset: "W20".into(),
            length: 5.0,
            height: 3.0,
            ..Default::default()
        });
        let strategy = RebarStrategy::Advanced(AdvancedRebar::default());
        let takeoff = resolve_rebar(&m, &strategy, 0.0, catalog());
        // 16 bars of 5 m, 26 bars of 3 m
        let expected = (16.0 * 5.0 + 26.0 * 3.0) * 0.994;
        assert!((takeoff.total_kg - expected).abs() < 1e-9);
    }

    #[test]
    fn test_advanced_column() {
        let m = member(ComponentRow {
            member: MemberType::Column,
            preset: "C40x40".into(),
            height: 3.0,
            count: 2.0,
            ..Default::default()
        });
        let strategy = RebarStrategy::Advanced(AdvancedRebar {
            bar_size: "#6".into(),
            main_bar_count: 8.0,
            stirrup_size: "#3".into(),
            stirrup_spacing_mm: 150.0,
            ..Default::default()
        });
        let takeoff = resolve_rebar(&m, &strategy, 0.0, catalog());
        let six = catalog().rebar("#6").unit_weight_kg_m;
        let main = 8.0 * 3.0 * six * 2.0;
        // 21 ties of 1.6 m
        let ties = 21.0 * 1.6 * 0.560 * 2.0;
        assert!((takeoff.main_kg - main).abs() < 1e-9);
        assert!((takeoff.stirrup_kg - ties).abs() < 1e-9);
        assert!((takeoff.total_kg - (main + ties)).abs() < 1e-9);
    }

    #[test]
    fn test_advanced_beam() {
        let m = member(ComponentRow {
            member: MemberType::Beam,
            preset: "B30x60".into(),
            length: 6.0,
            ..Default::default()
        });
        let strategy = RebarStrategy::Advanced(AdvancedRebar {
            top_bar_count: 3.0,
            bottom_bar_count: 4.0,
            ..Default::default()
        });
        let takeoff = resolve_rebar(&m, &strategy, 0.0, catalog());
        let main = 7.0 * 6.0 * 0.994;
        // 41 stirrups of 2 × (0.3 + 0.6)
        let stirrups = 41.0 * 1.8 * 0.560;
        assert!((takeoff.main_kg - main).abs() < 1e-9);
        assert!((takeoff.stirrup_kg - stirrups).abs() < 1e-9);
    }

    #[test]
    fn test_advanced_zero_spacing_places_nothing() {
        let m = member(ComponentRow {
            member: MemberType::Floor,
            preset: "S15".into(),
            length: 5.0,
            width: 4.0,
            ..Default::default()
        });
        let strategy = RebarStrategy::Advanced(AdvancedRebar {
            spacing_mm: 0.0,
            ..Default::default()
        });
        assert_eq!(resolve_rebar(&m, &strategy, 3.0, catalog()).total_kg, 0.0);
    }

    #[test]
    fn test_strategy_field_routing() {
        let mut s = RebarStrategy::default();
        assert!(s.set_field("ratio", &"120".into()));
        assert!(!s.set_field("spacing_mm", &150.0.into()));

        let mut s = RebarStrategy::Advanced(AdvancedRebar::default());
        assert!(s.set_field("double_layer", &"yes".into()));
        assert!(!s.set_field("ratio", &100.0.into()));
        match s {
            RebarStrategy::Advanced(p) => assert!(p.double_layer),
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_strategy_serde() {
        let s: RebarStrategy = serde_json::from_str(r#"{"mode":"advanced","spacing_mm":"150"}"#).unwrap();
        match s {
            RebarStrategy::Advanced(p) => {
                assert_eq!(p.spacing_mm, 150.0);
                assert_eq!(p.bar_size, "#4");
            }
            _ => panic!("expected advanced"),
        }
        let s: RebarStrategy = serde_json::from_str(r#"{"mode":"standard"}"#).unwrap();
        assert_eq!(s, RebarStrategy::Standard { ratio: 0.0 });
    }
}
