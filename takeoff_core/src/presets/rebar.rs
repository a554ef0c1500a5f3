//! Rebar Sizes and Usage Rates
//!
//! Deformed bar sizes per CNS 560 with nominal diameter and unit weight,
//! plus the empirical rates used by the two fast estimate paths:
//!
//! - **Area usage** (kg/m²) for walls, floors and stairs, by sub-variant
//! - **Standard ratio** (kg/m³ of concrete) per structural member type

use serde::{Deserialize, Serialize};

use super::members::MemberType;

/// One deformed bar size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RebarSize {
    /// Lookup key, e.g. "#4"
    pub key: String,
    /// Metric designation, e.g. "D13"
    pub metric: String,
    /// Nominal diameter (mm)
    pub diameter_mm: f64,
    /// Unit weight (kg/m)
    pub unit_weight_kg_m: f64,
}

impl RebarSize {
    fn new(key: &str, metric: &str, diameter_mm: f64, unit_weight_kg_m: f64) -> Self {
        RebarSize {
            key: key.to_string(),
            metric: metric.to_string(),
            diameter_mm,
            unit_weight_kg_m,
        }
    }

    /// Matches "#4", "4", "D13" or "d13"
    pub fn matches(&self, key: &str) -> bool {
        let key = key.trim();
        self.key.eq_ignore_ascii_case(key)
            || self.metric.eq_ignore_ascii_case(key)
            || self.key.trim_start_matches('#') == key
    }

    /// Display label, e.g. "#4 (D13)"
    pub fn label(&self) -> String {
        format!("{} ({})", self.key, self.metric)
    }
}

/// Size used when a key matches nothing
pub const DEFAULT_REBAR_KEY: &str = "#4";

impl Default for RebarSize {
    fn default() -> Self {
        RebarSize::new("#4", "D13", 12.7, 0.994)
    }
}

/// CNS 560 deformed bars
pub fn standard_sizes() -> Vec<RebarSize> {
    vec![
        RebarSize::new("#3", "D10", 9.53, 0.560),
        RebarSize::new("#4", "D13", 12.7, 0.994),
        RebarSize::new("#5", "D16", 15.9, 1.560),
        RebarSize::new("#6", "D19", 19.1, 2.250),
        RebarSize::new("#7", "D22", 22.2, 3.040),
        RebarSize::new("#8", "D25", 25.4, 3.980),
        RebarSize::new("#9", "D29", 28.7, 5.080),
        RebarSize::new("#10", "D32", 32.2, 6.390),
        RebarSize::new("#11", "D36", 35.8, 7.900),
    ]
}

/// Component groups of the area-estimate rebar mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AreaComponent {
    #[default]
    Wall,
    Floor,
    Stair,
}

impl AreaComponent {
    pub const ALL: [AreaComponent; 3] = [AreaComponent::Wall, AreaComponent::Floor, AreaComponent::Stair];

    pub fn display_name(&self) -> &'static str {
        match self {
            AreaComponent::Wall => "Wall",
            AreaComponent::Floor => "Floor",
            AreaComponent::Stair => "Stair",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key.trim().to_lowercase().as_str() {
            "wall" => Some(AreaComponent::Wall),
            "floor" | "slab" => Some(AreaComponent::Floor),
            "stair" | "stairs" => Some(AreaComponent::Stair),
            _ => None,
        }
    }
}

/// One sub-variant of an area usage rate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaUsageRate {
    pub component: AreaComponent,
    pub label: String,
    /// Rebar usage (kg per m² of component area)
    pub kg_per_sqm: f64,
}

fn rate(component: AreaComponent, label: &str, kg_per_sqm: f64) -> AreaUsageRate {
    AreaUsageRate {
        component,
        label: label.to_string(),
        kg_per_sqm,
    }
}

/// Usage rates, ordered by variant index within each component
pub fn standard_area_usage() -> Vec<AreaUsageRate> {
    use AreaComponent::*;
    vec![
        rate(Wall, "15 cm wall", 18.0),
        rate(Wall, "18 cm wall", 22.0),
        rate(Wall, "20 cm wall", 25.0),
        rate(Wall, "25 cm wall", 32.0),
        rate(Floor, "12 cm slab", 12.0),
        rate(Floor, "15 cm slab", 15.0),
        rate(Floor, "18 cm slab", 18.0),
        rate(Stair, "Standard stair", 35.0),
        rate(Stair, "Heavy stair", 45.0),
    ]
}

/// Fast-estimate rebar ratio (kg per m³ of concrete) per member type
pub fn standard_ratios() -> Vec<(MemberType, f64)> {
    vec![
        (MemberType::Column, 160.0),
        (MemberType::Beam, 140.0),
        (MemberType::GroundBeam, 120.0),
        (MemberType::Wall, 85.0),
        (MemberType::Floor, 95.0),
        (MemberType::Parapet, 75.0),
        (MemberType::Foundation, 90.0),
    ]
}
