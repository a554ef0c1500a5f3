//! # Takeoff Settings
//!
//! Company-wide defaults stored with a session or in a standalone JSON
//! settings file. Every key is optional; missing keys take the built-in
//! defaults.
//!
//! ```rust
//! use takeoff_core::settings::TakeoffSettings;
//! use takeoff_core::wastage::MaterialCategory;
//!
//! let settings = TakeoffSettings::from_json(r#"{"wastage_overrides":{"rebar":7.5}}"#).unwrap();
//! let defaults = settings.wastage_defaults();
//! assert_eq!(defaults.get(MaterialCategory::Rebar), 7.5);
//! assert_eq!(defaults.get(MaterialCategory::Concrete), 3.0);
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::errors::{TakeoffError, TakeoffResult};
use crate::units::AreaUnit;
use crate::wastage::{MaterialCategory, WastageDefaults};

fn default_snapshot_dir() -> String {
    "snapshots".to_string()
}

fn default_currency() -> String {
    "TWD".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TakeoffSettings {
    /// Wastage rates (%) replacing the built-in default of a category
    pub wastage_overrides: BTreeMap<MaterialCategory, f64>,

    /// Unit new area rows start in
    pub default_area_unit: AreaUnit,

    /// Directory of the file snapshot store, relative to the session file
    pub snapshot_dir: String,

    /// Currency label printed next to cost subtotals
    pub currency: String,
}

impl Default for TakeoffSettings {
    fn default() -> Self {
        TakeoffSettings {
            wastage_overrides: BTreeMap::new(),
            default_area_unit: AreaUnit::Sqm,
            snapshot_dir: default_snapshot_dir(),
            currency: default_currency(),
        }
    }
}

impl TakeoffSettings {
    pub fn from_json(json: &str) -> TakeoffResult<Self> {
        let settings: TakeoffSettings = serde_json::from_str(json).map_err(TakeoffError::serialization)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Wastage overrides must be finite and non-negative
    pub fn validate(&self) -> TakeoffResult<()> {
        for (category, rate) in &self.wastage_overrides {
            if !rate.is_finite() || *rate < 0.0 {
                return Err(TakeoffError::invalid_input(
                    format!("wastage_overrides.{}", category),
                    rate.to_string(),
                    "wastage rate must be a non-negative percentage",
                ));
            }
        }
        Ok(())
    }

    /// Built-in wastage table with this file's overrides applied
    pub fn wastage_defaults(&self) -> WastageDefaults {
        WastageDefaults::with_overrides(&self.wastage_overrides)
    }

    /// Load a settings file; a missing file gives the defaults
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load(path: &std::path::Path) -> TakeoffResult<Self> {
        if !path.exists() {
            tracing::info!(path = %path.display(), "no settings file, using defaults");
            return Ok(TakeoffSettings::default());
        }
        let json = crate::file_io::read_file(path)?;
        let settings = TakeoffSettings::from_json(&json)?;
        tracing::info!(
            path = %path.display(),
            overrides = settings.wastage_overrides.len(),
            "settings loaded"
        );
        Ok(settings)
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self, path: &std::path::Path) -> TakeoffResult<()> {
        let json = serde_json::to_string_pretty(self).map_err(TakeoffError::serialization)?;
        crate::file_io::write_atomic(path, &json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_for_missing_keys() {
        let settings = TakeoffSettings::from_json("{}").unwrap();
        assert_eq!(settings, TakeoffSettings::default());
        assert_eq!(settings.default_area_unit, AreaUnit::Sqm);
        assert_eq!(settings.wastage_defaults(), WastageDefaults::standard());
    }

    #[test]
    fn test_overrides_merge() {
        let settings = TakeoffSettings::from_json(
            r#"{"wastage_overrides":{"tile":8,"paint":0},"default_area_unit":"ping","currency":"USD"}"#,
        )
        .unwrap();
        let defaults = settings.wastage_defaults();
        assert_eq!(defaults.get(MaterialCategory::Tile), 8.0);
        assert_eq!(defaults.get(MaterialCategory::Paint), 0.0);
        assert_eq!(defaults.get(MaterialCategory::Grout), 10.0);
        assert_eq!(settings.default_area_unit, AreaUnit::Ping);
        assert_eq!(settings.currency, "USD");
    }

    #[test]
    fn test_negative_override_rejected() {
        let err = TakeoffSettings::from_json(r#"{"wastage_overrides":{"rebar":-5}}"#).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");
    }

    #[test]
    fn test_unknown_category_is_serialization_error() {
        let err = TakeoffSettings::from_json(r#"{"wastage_overrides":{"glass":5}}"#).unwrap_err();
        assert_eq!(err.error_code(), "SERIALIZATION_ERROR");
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let path = std::env::temp_dir().join(format!("takeoff_settings_missing_{}.json", std::process::id()));
        assert_eq!(TakeoffSettings::load(&path).unwrap(), TakeoffSettings::default());
    }

    #[test]
    fn test_save_and_load() {
        let path = std::env::temp_dir().join(format!("takeoff_settings_{}.json", std::process::id()));
        let mut settings = TakeoffSettings::default();
        settings.wastage_overrides.insert(MaterialCategory::Concrete, 4.0);
        settings.save(&path).unwrap();
        assert_eq!(TakeoffSettings::load(&path).unwrap(), settings);
        let _ = std::fs::remove_file(&path);
    }
}
