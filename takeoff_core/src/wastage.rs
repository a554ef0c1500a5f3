//! # Wastage
//!
//! Construction losses are modelled as a percentage added on top of the raw
//! takeoff quantity. Each material category has a default rate; a
//! calculator may override it with its own [`WastageConfig`].
//!
//! ```rust
//! use takeoff_core::wastage::{apply_wastage, MaterialCategory, WastageConfig, WastageDefaults};
//!
//! let defaults = WastageDefaults::standard();
//! let config = WastageConfig::default();
//! let rate = config.effective_rate(MaterialCategory::Concrete, &defaults);
//! assert_eq!(rate, 3.0);
//! assert!((apply_wastage(10.0, rate) - 10.3).abs() < 1e-9);
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::input::{lenient, num};

/// Material categories. The string form is what crosses the record boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaterialCategory {
    Concrete,
    Rebar,
    Formwork,
    Mortar,
    Plaster,
    Brick,
    Tile,
    Grout,
    Adhesive,
    Paint,
    Putty,
    /// Cost-only lines (no material)
    Labor,
    /// Informational estimates (no wastage)
    Estimate,
}

impl MaterialCategory {
    pub const ALL: [MaterialCategory; 13] = [
        MaterialCategory::Concrete,
        MaterialCategory::Rebar,
        MaterialCategory::Formwork,
        MaterialCategory::Mortar,
        MaterialCategory::Plaster,
        MaterialCategory::Brick,
        MaterialCategory::Tile,
        MaterialCategory::Grout,
        MaterialCategory::Adhesive,
        MaterialCategory::Paint,
        MaterialCategory::Putty,
        MaterialCategory::Labor,
        MaterialCategory::Estimate,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MaterialCategory::Concrete => "concrete",
            MaterialCategory::Rebar => "rebar",
            MaterialCategory::Formwork => "formwork",
            MaterialCategory::Mortar => "mortar",
            MaterialCategory::Plaster => "plaster",
            MaterialCategory::Brick => "brick",
            MaterialCategory::Tile => "tile",
            MaterialCategory::Grout => "grout",
            MaterialCategory::Adhesive => "adhesive",
            MaterialCategory::Paint => "paint",
            MaterialCategory::Putty => "putty",
            MaterialCategory::Labor => "labor",
            MaterialCategory::Estimate => "estimate",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        let key = key.trim().to_lowercase();
        MaterialCategory::ALL.into_iter().find(|c| c.as_str() == key)
    }

    /// Built-in default wastage (%)
    pub fn default_wastage(&self) -> f64 {
        match self {
            MaterialCategory::Concrete => 3.0,
            MaterialCategory::Rebar => 5.0,
            MaterialCategory::Formwork => 10.0,
            MaterialCategory::Mortar => 5.0,
            MaterialCategory::Plaster => 5.0,
            MaterialCategory::Brick => 5.0,
            MaterialCategory::Tile => 5.0,
            MaterialCategory::Grout => 10.0,
            MaterialCategory::Adhesive => 10.0,
            MaterialCategory::Paint => 10.0,
            MaterialCategory::Putty => 10.0,
            MaterialCategory::Labor => 0.0,
            MaterialCategory::Estimate => 0.0,
        }
    }
}

impl std::fmt::Display for MaterialCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Default wastage rate (%) per category, passed into the engine as data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WastageDefaults(BTreeMap<MaterialCategory, f64>);

impl WastageDefaults {
    /// The built-in table
    pub fn standard() -> Self {
        WastageDefaults(
            MaterialCategory::ALL
                .into_iter()
                .map(|c| (c, c.default_wastage()))
                .collect(),
        )
    }

    /// Built-in table with some categories replaced
    pub fn with_overrides(overrides: &BTreeMap<MaterialCategory, f64>) -> Self {
        let mut defaults = WastageDefaults::standard();
        for (category, rate) in overrides {
            defaults.set(*category, *rate);
        }
        defaults
    }

    /// Default rate for a category; categories missing from the table use 0
    pub fn get(&self, category: MaterialCategory) -> f64 {
        self.0.get(&category).copied().map(num).unwrap_or(0.0)
    }

    pub fn set(&mut self, category: MaterialCategory, rate_percent: f64) {
        self.0.insert(category, num(rate_percent));
    }
}

impl Default for WastageDefaults {
    fn default() -> Self {
        WastageDefaults::standard()
    }
}

/// Per-calculator wastage setting.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WastageConfig {
    /// User rate (%), only used when `use_custom` is set
    #[serde(default, deserialize_with = "lenient::f64")]
    pub rate_percent: f64,

    #[serde(default, deserialize_with = "lenient::bool")]
    pub use_custom: bool,
}

impl WastageConfig {
    /// Override the category default with a fixed rate
    pub fn custom(rate_percent: f64) -> Self {
        WastageConfig {
            rate_percent,
            use_custom: true,
        }
    }

    /// `use_custom ? rate_percent : defaults[category]`
    pub fn effective_rate(&self, category: MaterialCategory, defaults: &WastageDefaults) -> f64 {
        if self.use_custom {
            num(self.rate_percent)
        } else {
            defaults.get(category)
        }
    }

    pub fn apply(&self, value: f64, category: MaterialCategory, defaults: &WastageDefaults) -> f64 {
        apply_wastage(value, self.effective_rate(category, defaults))
    }
}

/// `value × (1 + pct/100)`
pub fn apply_wastage(value: f64, pct: f64) -> f64 {
    num(num(value) * (1.0 + num(pct) / 100.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_wastage_is_identity() {
        for v in [0.0, 1.0, 12.345, 1e6] {
            assert_eq!(apply_wastage(v, 0.0), v);
        }
    }

    #[test]
    fn test_monotonic_in_rate() {
        let mut last = apply_wastage(7.5, 0.0);
        for pct in 1..=50 {
            let next = apply_wastage(7.5, pct as f64);
            assert!(next >= last);
            last = next;
        }
    }

    #[test]
    fn test_non_finite_input() {
        assert_eq!(apply_wastage(f64::NAN, 5.0), 0.0);
        assert_eq!(apply_wastage(10.0, f64::NAN), 10.0);
    }

    #[test]
    fn test_effective_rate() {
        let defaults = WastageDefaults::standard();
        assert_eq!(WastageConfig::default().effective_rate(MaterialCategory::Rebar, &defaults), 5.0);
        assert_eq!(WastageConfig::custom(12.0).effective_rate(MaterialCategory::Rebar, &defaults), 12.0);

        // a custom rate is ignored while the toggle is off
        let config = WastageConfig {
            rate_percent: 12.0,
            use_custom: false,
        };
        assert_eq!(config.effective_rate(MaterialCategory::Rebar, &defaults), 5.0);
    }

    #[test]
    fn test_overrides() {
        let mut overrides = BTreeMap::new();
        overrides.insert(MaterialCategory::Tile, 8.0);
        let defaults = WastageDefaults::with_overrides(&overrides);
        assert_eq!(defaults.get(MaterialCategory::Tile), 8.0);
        assert_eq!(defaults.get(MaterialCategory::Concrete), 3.0);
    }

    #[test]
    fn test_category_strings() {
        assert_eq!(MaterialCategory::Formwork.to_string(), "formwork");
        assert_eq!(MaterialCategory::from_key("Grout"), Some(MaterialCategory::Grout));
        let json = serde_json::to_string(&WastageDefaults::standard()).unwrap();
        assert!(json.contains("\"concrete\":3.0"));
    }
}
