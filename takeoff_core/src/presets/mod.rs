//! # Preset Catalog
//!
//! Static engineering lookup tables consumed by the calculators: rebar
//! sizes, concrete grades, brick and plaster rates, tile sizes, structural
//! member sections, formwork coefficients and building-type rates.
//!
//! ## Lookup rules
//!
//! - Lenient lookups never fail. An unknown key falls back to a documented
//!   default (128 bricks/m², a 60x60 cm tile, a 1:3 plaster mix, a #4 bar,
//!   fc' 210).
//! - `try_*` lookups return [`TakeoffError::UnknownPreset`] instead, for
//!   callers that need to know a key is wrong.
//! - The key `"custom"` is reserved: it means "use the row's own override
//!   fields", see [`PresetChoice`].
//!
//! ## Example
//!
//! ```rust
//! use takeoff_core::presets::PresetCatalog;
//!
//! let catalog = PresetCatalog::standard();
//! assert_eq!(catalog.bricks_per_sqm("24"), 128.0);
//! assert_eq!(catalog.bricks_per_sqm("99"), 128.0);
//! assert!((catalog.rebar("#4").unit_weight_kg_m - 0.994).abs() < 1e-9);
//! ```

pub mod building;
pub mod concrete;
pub mod formwork;
pub mod masonry;
pub mod members;
pub mod rebar;
pub mod tile;

pub use building::BuildingPreset;
pub use concrete::ConcreteGrade;
pub use formwork::{ComplexityTier, ConstructionCondition, FormworkType};
pub use masonry::{BrickRate, PlasterRatio};
pub use members::{MemberPreset, MemberType, PresetDims, Section};
pub use rebar::{AreaComponent, AreaUsageRate, RebarSize};
pub use tile::{LaborRate, TileSize};

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::errors::{TakeoffError, TakeoffResult};

/// Reserved preset key selecting the row's own override fields
pub const CUSTOM_KEY: &str = "custom";

/// A preset key resolved against the reserved `"custom"` key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "key", rename_all = "snake_case")]
pub enum PresetChoice {
    Preset(String),
    Custom,
}

impl PresetChoice {
    pub fn parse(key: &str) -> Self {
        let key = key.trim();
        if key.eq_ignore_ascii_case(CUSTOM_KEY) {
            PresetChoice::Custom
        } else {
            PresetChoice::Preset(key.to_string())
        }
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, PresetChoice::Custom)
    }
}

static STANDARD: Lazy<PresetCatalog> = Lazy::new(PresetCatalog::build_standard);

/// All lookup tables of the engine.
///
/// Fields are public so a deployment can extend the tables; the standard
/// catalog is built once and shared.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresetCatalog {
    pub rebar_sizes: Vec<RebarSize>,
    pub concrete_grades: Vec<ConcreteGrade>,
    /// Area usage rates, in variant order within each component
    pub area_usage: Vec<AreaUsageRate>,
    /// Fast-estimate rebar ratio (kg/m³) per member type
    pub rebar_ratios: BTreeMap<MemberType, f64>,
    pub brick_rates: Vec<BrickRate>,
    pub plaster_ratios: Vec<PlasterRatio>,
    pub tile_sizes: Vec<TileSize>,
    pub labor_rates: Vec<LaborRate>,
    pub members: Vec<MemberPreset>,
    pub buildings: Vec<BuildingPreset>,
}

impl PresetCatalog {
    /// The shared standard catalog
    pub fn standard() -> &'static PresetCatalog {
        &STANDARD
    }

    fn build_standard() -> PresetCatalog {
        PresetCatalog {
            rebar_sizes: rebar::standard_sizes(),
            concrete_grades: concrete::standard_grades(),
            area_usage: rebar::standard_area_usage(),
            rebar_ratios: rebar::standard_ratios().into_iter().collect(),
            brick_rates: masonry::standard_brick_rates(),
            plaster_ratios: masonry::standard_plaster_ratios(),
            tile_sizes: tile::standard_sizes(),
            labor_rates: tile::standard_labor_rates(),
            members: members::standard_presets(),
            buildings: building::standard_presets(),
        }
    }

    // ------------------------------------------------------------------
    // Rebar
    // ------------------------------------------------------------------

    pub fn try_rebar(&self, key: &str) -> TakeoffResult<&RebarSize> {
        self.rebar_sizes
            .iter()
            .find(|s| s.matches(key))
            .ok_or_else(|| TakeoffError::unknown_preset("rebar", key))
    }

    /// Bar size for a key; unknown keys give #4 (D13)
    pub fn rebar(&self, key: &str) -> RebarSize {
        self.try_rebar(key).cloned().unwrap_or_default()
    }

    /// Area usage rate (kg/m²); an out-of-range variant uses the first one
    pub fn area_usage_rate(&self, component: AreaComponent, variant: usize) -> f64 {
        let variants: Vec<&AreaUsageRate> = self
            .area_usage
            .iter()
            .filter(|r| r.component == component)
            .collect();
        variants
            .get(variant)
            .or_else(|| variants.first())
            .map(|r| r.kg_per_sqm)
            .unwrap_or(0.0)
    }

    pub fn area_usage_variants(&self, component: AreaComponent) -> Vec<&AreaUsageRate> {
        self.area_usage.iter().filter(|r| r.component == component).collect()
    }

    /// Standard rebar ratio (kg/m³) for a member type
    pub fn rebar_ratio(&self, member: MemberType) -> f64 {
        self.rebar_ratios.get(&member).copied().unwrap_or(0.0)
    }

    // ------------------------------------------------------------------
    // Concrete
    // ------------------------------------------------------------------

    pub fn try_concrete_grade(&self, key: &str) -> TakeoffResult<&ConcreteGrade> {
        let key = key.trim();
        self.concrete_grades
            .iter()
            .find(|g| g.key == key)
            .ok_or_else(|| TakeoffError::unknown_preset("concrete grade", key))
    }

    /// Grade for a key; unknown keys give fc' 210
    pub fn concrete_grade(&self, key: &str) -> ConcreteGrade {
        self.try_concrete_grade(key).cloned().unwrap_or_default()
    }

    // ------------------------------------------------------------------
    // Masonry
    // ------------------------------------------------------------------

    pub fn try_brick_rate(&self, wall_key: &str) -> TakeoffResult<&BrickRate> {
        let key = wall_key.trim();
        self.brick_rates
            .iter()
            .find(|r| r.key == key)
            .ok_or_else(|| TakeoffError::unknown_preset("brick", key))
    }

    /// Bricks per m² for a wall thickness key; unknown keys give 128
    pub fn bricks_per_sqm(&self, wall_key: &str) -> f64 {
        self.try_brick_rate(wall_key)
            .map(|r| r.bricks_per_sqm)
            .unwrap_or(masonry::DEFAULT_BRICKS_PER_SQM)
    }

    pub fn try_plaster_ratio(&self, key: &str) -> TakeoffResult<&PlasterRatio> {
        let key = key.trim();
        self.plaster_ratios
            .iter()
            .find(|r| r.key == key)
            .ok_or_else(|| TakeoffError::unknown_preset("plaster ratio", key))
    }

    /// Mix constants for a ratio key; unknown keys give 1:3
    pub fn plaster_ratio(&self, key: &str) -> PlasterRatio {
        self.try_plaster_ratio(key).cloned().unwrap_or_default()
    }

    // ------------------------------------------------------------------
    // Tile
    // ------------------------------------------------------------------

    pub fn try_tile_size(&self, key: &str) -> TakeoffResult<&TileSize> {
        let key = key.trim().to_lowercase();
        self.tile_sizes
            .iter()
            .find(|t| t.key == key)
            .ok_or_else(|| TakeoffError::unknown_preset("tile", key))
    }

    /// Tile (length, width) in cm; unknown keys give 60x60
    pub fn tile_size(&self, key: &str) -> (f64, f64) {
        self.try_tile_size(key)
            .map(|t| (t.length_cm, t.width_cm))
            .unwrap_or(tile::DEFAULT_TILE_CM)
    }

    /// Labor rate for a laying method; unknown keys give wet laying
    pub fn labor_rate(&self, key: &str) -> LaborRate {
        let key = key.trim();
        self.labor_rates
            .iter()
            .find(|r| r.key == key)
            .cloned()
            .unwrap_or_default()
    }

    // ------------------------------------------------------------------
    // Structural members
    // ------------------------------------------------------------------

    /// Member preset for a type and key. `"custom"` and unknown keys give `None`.
    pub fn member_preset(&self, member: MemberType, key: &str) -> Option<&MemberPreset> {
        let key = key.trim();
        self.members
            .iter()
            .find(|p| p.member == member && p.key.eq_ignore_ascii_case(key))
    }

    pub fn member_presets(&self, member: MemberType) -> Vec<&MemberPreset> {
        self.members.iter().filter(|p| p.member == member).collect()
    }

    // ------------------------------------------------------------------
    // Building types
    // ------------------------------------------------------------------

    pub fn try_building(&self, key: &str) -> TakeoffResult<&BuildingPreset> {
        let key = key.trim();
        self.buildings
            .iter()
            .find(|b| b.key == key)
            .ok_or_else(|| TakeoffError::unknown_preset("building", key))
    }

    /// Building presets in a wall-thickness bracket; an empty bracket lists all
    pub fn buildings_for_wall(&self, wall_bracket: &str) -> Vec<&BuildingPreset> {
        let bracket = wall_bracket.trim();
        self.buildings
            .iter()
            .filter(|b| bracket.is_empty() || b.wall_bracket == bracket)
            .collect()
    }

    /// Distinct wall brackets, in table order
    pub fn wall_brackets(&self) -> Vec<&str> {
        let mut brackets: Vec<&str> = Vec::new();
        for b in &self.buildings {
            if !brackets.contains(&b.wall_bracket.as_str()) {
                brackets.push(&b.wall_bracket);
            }
        }
        brackets
    }
}

impl Default for PresetCatalog {
    fn default() -> Self {
        PresetCatalog::build_standard()
    }
}
