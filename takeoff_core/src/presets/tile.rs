//! Tile Tables
//!
//! Nominal tile sizes, adhesive consumption by trowel notch and labor rates
//! per ping by laying method.

use serde::{Deserialize, Serialize};

/// Tile dimensions used for unknown keys and blank custom sizes (cm)
pub const DEFAULT_TILE_CM: (f64, f64) = (60.0, 60.0);

/// Adhesive usage when the notch size matches no step (kg/m²)
pub const DEFAULT_ADHESIVE_KG_SQM: f64 = 4.0;

/// Adhesive usage steps: (notch mm, kg/m²)
pub const ADHESIVE_STEPS: [(f64, f64); 2] = [(4.0, 2.5), (6.0, 6.25)];

/// Grout density factor in the joint-volume formula
pub const GROUT_DENSITY_FACTOR: f64 = 1.7;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileSize {
    /// Key, e.g. "60x60"
    pub key: String,
    pub length_cm: f64,
    pub width_cm: f64,
}

impl TileSize {
    fn new(length_cm: f64, width_cm: f64) -> Self {
        TileSize {
            key: format!("{}x{}", length_cm, width_cm),
            length_cm,
            width_cm,
        }
    }
}

impl Default for TileSize {
    fn default() -> Self {
        TileSize::new(DEFAULT_TILE_CM.0, DEFAULT_TILE_CM.1)
    }
}

pub fn standard_sizes() -> Vec<TileSize> {
    vec![
        TileSize::new(20.0, 20.0),
        TileSize::new(30.0, 30.0),
        TileSize::new(30.0, 60.0),
        TileSize::new(45.0, 45.0),
        TileSize::new(60.0, 60.0),
        TileSize::new(60.0, 120.0),
        TileSize::new(80.0, 80.0),
        TileSize::new(15.0, 90.0),
    ]
}

/// Adhesive usage (kg/m²) for a trowel notch size in mm
pub fn adhesive_usage(notch_mm: f64) -> f64 {
    ADHESIVE_STEPS
        .iter()
        .find(|(notch, _)| (notch - notch_mm).abs() < 1e-9)
        .map(|(_, usage)| *usage)
        .unwrap_or(DEFAULT_ADHESIVE_KG_SQM)
}

/// Labor rate for one laying method
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaborRate {
    pub key: String,
    pub label: String,
    /// Price per ping of laid area
    pub price_per_ping: f64,
}

/// Method used when a labor key matches nothing
pub const DEFAULT_LABOR_KEY: &str = "wet";

impl LaborRate {
    fn new(key: &str, label: &str, price_per_ping: f64) -> Self {
        LaborRate {
            key: key.to_string(),
            label: label.to_string(),
            price_per_ping,
        }
    }
}

impl Default for LaborRate {
    fn default() -> Self {
        LaborRate::new("wet", "Wet (mortar bed) laying", 3000.0)
    }
}

pub fn standard_labor_rates() -> Vec<LaborRate> {
    vec![
        LaborRate::new("wet", "Wet (mortar bed) laying", 3000.0),
        LaborRate::new("dry", "Semi-dry laying", 3500.0),
        LaborRate::new("wall", "Wall tiling", 3200.0),
        LaborRate::new("large", "Large-format tile", 4500.0),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tile_keys() {
        let sizes = standard_sizes();
        assert!(sizes.iter().any(|s| s.key == "60x60"));
        assert!(sizes.iter().any(|s| s.key == "60x120"));
        assert_eq!(TileSize::default().key, "60x60");
    }

    #[test]
    fn test_adhesive_steps() {
        assert_eq!(adhesive_usage(4.0), 2.5);
        assert_eq!(adhesive_usage(6.0), 6.25);
        assert_eq!(adhesive_usage(8.0), 4.0);
        assert_eq!(adhesive_usage(0.0), 4.0);
    }
}
