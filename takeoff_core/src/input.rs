//! # Numeric Input Coercion
//!
//! Row fields arrive from text boxes and from restored snapshots, so they can
//! be numbers, numeric strings, empty strings or `null`. Everything that is
//! not a finite number becomes `0.0`: a blank field yields a zero result and
//! never a NaN that would leak into totals.
//!
//! ```rust
//! use takeoff_core::input::{FieldValue, num};
//!
//! assert_eq!(FieldValue::from("2.5").as_f64(), 2.5);
//! assert_eq!(FieldValue::from("").as_f64(), 0.0);
//! assert_eq!(FieldValue::from("abc").as_f64(), 0.0);
//! assert_eq!(num(f64::NAN), 0.0);
//! ```

use serde::{Deserialize, Deserializer, Serialize};

/// Sanitize a computed value: non-finite becomes 0
#[inline]
pub fn num(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Divide, returning 0 when the divisor is zero or the result is not finite
#[inline]
pub fn safe_div(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        num(numerator / denominator)
    }
}

/// Raw value handed to `update_row`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Flag(bool),
    Text(String),
}

impl FieldValue {
    /// Numeric view of the value; blank, garbage and non-finite input is 0
    pub fn as_f64(&self) -> f64 {
        match self {
            FieldValue::Number(n) => num(*n),
            FieldValue::Flag(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            FieldValue::Text(s) => s.trim().parse::<f64>().map(num).unwrap_or(0.0),
        }
    }

    /// Index view: the numeric value floored, negatives are 0
    pub fn as_index(&self) -> usize {
        let n = self.as_f64();
        if n > 0.0 {
            n.floor() as usize
        } else {
            0
        }
    }

    /// Boolean view: true, "true", "1", "yes", "on" and non-zero numbers
    pub fn as_bool(&self) -> bool {
        match self {
            FieldValue::Number(n) => num(*n) != 0.0,
            FieldValue::Flag(b) => *b,
            FieldValue::Text(s) => matches!(
                s.trim().to_lowercase().as_str(),
                "true" | "1" | "yes" | "on"
            ),
        }
    }

    /// Text view, used for preset keys and names
    pub fn as_text(&self) -> String {
        match self {
            FieldValue::Number(n) => {
                if n.fract() == 0.0 && n.is_finite() {
                    format!("{}", *n as i64)
                } else {
                    n.to_string()
                }
            }
            FieldValue::Flag(b) => b.to_string(),
            FieldValue::Text(s) => s.trim().to_string(),
        }
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        FieldValue::Number(value as f64)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Flag(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

/// Serde helpers for lenient row fields (`#[serde(deserialize_with = ...)]`).
pub mod lenient {
    use super::*;

    /// Accept a number, numeric string, empty string or null; anything unusable is 0
    pub fn f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<FieldValue>::deserialize(deserializer)?;
        Ok(value.map(|v| v.as_f64()).unwrap_or(0.0))
    }

    /// Accept a bool, "true"/"false" string, 0/1 or null
    pub fn bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<FieldValue>::deserialize(deserializer)?;
        Ok(value.map(|v| v.as_bool()).unwrap_or(false))
    }

    /// Accept a non-negative index as number or string; anything else is 0
    pub fn index<'de, D>(deserializer: D) -> Result<usize, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<FieldValue>::deserialize(deserializer)?;
        Ok(value.map(|v| v.as_index()).unwrap_or(0))
    }

    /// Accept a string or a bare number as a key
    pub fn key<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<FieldValue>::deserialize(deserializer)?;
        Ok(value.map(|v| v.as_text()).unwrap_or_default())
    }

    /// Accept "sqm", "ping" or anything else (m²)
    pub fn area_unit<'de, D>(deserializer: D) -> Result<crate::units::AreaUnit, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<FieldValue>::deserialize(deserializer)?;
        Ok(value
            .map(|v| crate::units::AreaUnit::from_key(&v.as_text()))
            .unwrap_or_default())
    }

    /// Parse a keyed enum through its `from_key`; unknown, blank or null is `T::default()`
    fn keyed<'de, D, T>(deserializer: D, from_key: fn(&str) -> Option<T>) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: Default,
    {
        let value = Option::<FieldValue>::deserialize(deserializer)?;
        Ok(value.and_then(|v| from_key(&v.as_text())).unwrap_or_default())
    }

    pub fn member_type<'de, D>(deserializer: D) -> Result<crate::presets::MemberType, D::Error>
    where
        D: Deserializer<'de>,
    {
        keyed(deserializer, crate::presets::MemberType::from_key)
    }

    pub fn area_component<'de, D>(deserializer: D) -> Result<crate::presets::AreaComponent, D::Error>
    where
        D: Deserializer<'de>,
    {
        keyed(deserializer, crate::presets::AreaComponent::from_key)
    }

    pub fn complexity_tier<'de, D>(deserializer: D) -> Result<crate::presets::ComplexityTier, D::Error>
    where
        D: Deserializer<'de>,
    {
        keyed(deserializer, crate::presets::ComplexityTier::from_key)
    }

    pub fn formwork_type<'de, D>(deserializer: D) -> Result<crate::presets::FormworkType, D::Error>
    where
        D: Deserializer<'de>,
    {
        keyed(deserializer, crate::presets::FormworkType::from_key)
    }

    pub fn construction_condition<'de, D>(deserializer: D) -> Result<crate::presets::ConstructionCondition, D::Error>
    where
        D: Deserializer<'de>,
    {
        keyed(deserializer, crate::presets::ConstructionCondition::from_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Probe {
        #[serde(default, deserialize_with = "lenient::f64")]
        length: f64,
        #[serde(default, deserialize_with = "lenient::bool")]
        double_layer: bool,
        #[serde(default, deserialize_with = "lenient::key")]
        wall: String,
    }

    #[test]
    fn test_coercion() {
        assert_eq!(FieldValue::from(3.0).as_f64(), 3.0);
        assert_eq!(FieldValue::from(" 4.5 ").as_f64(), 4.5);
        assert_eq!(FieldValue::from("").as_f64(), 0.0);
        assert_eq!(FieldValue::from("NaN").as_f64(), 0.0);
        assert_eq!(FieldValue::from("inf").as_f64(), 0.0);
        assert_eq!(FieldValue::Number(f64::INFINITY).as_f64(), 0.0);
        assert_eq!(FieldValue::from(true).as_f64(), 1.0);
    }

    #[test]
    fn test_bool_and_text() {
        assert!(FieldValue::from("yes").as_bool());
        assert!(!FieldValue::from("no").as_bool());
        assert!(FieldValue::from(1.0).as_bool());
        assert_eq!(FieldValue::from(24.0).as_text(), "24");
        assert_eq!(FieldValue::from(2.5).as_text(), "2.5");
    }

    #[test]
    fn test_safe_div() {
        assert_eq!(safe_div(1.0, 0.0), 0.0);
        assert_eq!(safe_div(10.0, 4.0), 2.5);
    }

    #[test]
    fn test_lenient_deserialize() {
        let p: Probe = serde_json::from_str(r#"{"length":"2.5","double_layer":"true","wall":24}"#).unwrap();
        assert_eq!(p.length, 2.5);
        assert!(p.double_layer);
        assert_eq!(p.wall, "24");

        let p: Probe = serde_json::from_str(r#"{"length":null,"double_layer":0,"wall":null}"#).unwrap();
        assert_eq!(p.length, 0.0);
        assert!(!p.double_layer);
        assert_eq!(p.wall, "");

        let p: Probe = serde_json::from_str(r#"{"length":""}"#).unwrap();
        assert_eq!(p.length, 0.0);
    }
}
