//! Masonry Tables
//!
//! Brick consumption by wall thickness, cement/sand content of plaster
//! mixes, and the baseline render-coat rates.

use serde::{Deserialize, Serialize};

/// Render coat thickness the baseline rates are quoted at (cm)
pub const MORTAR_BASE_THICKNESS_CM: f64 = 2.5;
/// Cement per m² at the baseline thickness (kg/m²)
pub const MORTAR_BASE_CEMENT_KG_SQM: f64 = 10.6;
/// Sand per m² at the baseline thickness (kg/m²)
pub const MORTAR_BASE_SAND_KG_SQM: f64 = 42.8;

/// Rule-of-thumb cement (bags per m²) for the quick estimate
pub const QUICK_CEMENT_BAGS_PER_SQM: f64 = 0.4;
/// Rule-of-thumb sand (m³ per m²) for the quick estimate
pub const QUICK_SAND_M3_PER_SQM: f64 = 0.05;

/// Bricks per m² when the wall key matches nothing
pub const DEFAULT_BRICKS_PER_SQM: f64 = 128.0;

/// Mix used when a ratio key matches nothing
pub const DEFAULT_PLASTER_RATIO: &str = "1:3";

/// Brick consumption for one wall thickness
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrickRate {
    /// Wall thickness key in cm, e.g. "24"
    pub key: String,
    pub bricks_per_sqm: f64,
}

impl BrickRate {
    fn new(key: &str, bricks_per_sqm: f64) -> Self {
        BrickRate {
            key: key.to_string(),
            bricks_per_sqm,
        }
    }

    pub fn label(&self) -> String {
        format!("{} cm wall = {} bricks/m²", self.key, self.bricks_per_sqm)
    }
}

pub fn standard_brick_rates() -> Vec<BrickRate> {
    vec![
        BrickRate::new("12", 64.0),
        BrickRate::new("24", 128.0),
        BrickRate::new("36", 192.0),
    ]
}

/// Cement:sand plaster mix
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlasterRatio {
    /// Ratio key, e.g. "1:3"
    pub key: String,
    /// Cement per m³ of plaster (kg)
    pub cement_kg_per_m3: f64,
    /// Sand per m³ of plaster (m³)
    pub sand_m3_per_m3: f64,
}

impl PlasterRatio {
    fn new(key: &str, cement_kg_per_m3: f64, sand_m3_per_m3: f64) -> Self {
        PlasterRatio {
            key: key.to_string(),
            cement_kg_per_m3,
            sand_m3_per_m3,
        }
    }
}

impl Default for PlasterRatio {
    fn default() -> Self {
        PlasterRatio::new("1:3", 408.0, 1.03)
    }
}

pub fn standard_plaster_ratios() -> Vec<PlasterRatio> {
    vec![
        PlasterRatio::new("1:1", 765.0, 0.64),
        PlasterRatio::new("1:2", 557.0, 0.94),
        PlasterRatio::new("1:2.5", 490.0, 1.03),
        PlasterRatio::new("1:3", 408.0, 1.03),
        PlasterRatio::new("1:4", 306.0, 1.03),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_brick_label() {
        let rates = standard_brick_rates();
        let wall24 = rates.iter().find(|r| r.key == "24").unwrap();
        assert_eq!(wall24.bricks_per_sqm, 128.0);
        assert_eq!(wall24.label(), "24 cm wall = 128 bricks/m²");
    }

    #[test]
    fn test_leaner_mix_uses_less_cement() {
        let ratios = standard_plaster_ratios();
        for pair in ratios.windows(2) {
            assert!(pair[1].cement_kg_per_m3 < pair[0].cement_kg_per_m3);
        }
        assert_eq!(PlasterRatio::default().key, DEFAULT_PLASTER_RATIO);
    }
}
