//! # Unit Types
//!
//! Type-safe wrappers for the metric units used on site, plus the
//! traditional "ping" area unit that appears next to metric input in tile
//! and paint takeoffs.
//!
//! ## Conventions
//!
//! - Areas are square meters unless explicitly entered in ping (1 ping = 3.30579 m²)
//! - Rebar lengths and member heights are meters, rebar weight is kilograms
//! - Rebar spacing is millimeters; masonry thicknesses are centimeters
//!
//! ## Example
//!
//! ```rust
//! use takeoff_core::units::{Ping, SqMeters, Centimeters, Meters};
//!
//! let area: SqMeters = Ping(1.0).into();
//! assert!((area.0 - 3.30579).abs() < 1e-9);
//!
//! let t: Meters = Centimeters(2.5).into();
//! assert!((t.0 - 0.025).abs() < 1e-12);
//! ```

use serde::{Deserialize, Serialize};
use std::ops::{Add, Div, Mul, Sub};

/// Square meters in one ping
pub const SQM_PER_PING: f64 = 3.30579;

// ============================================================================
// Length Units
// ============================================================================

/// Length in meters
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Meters(pub f64);

/// Length in centimeters
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Centimeters(pub f64);

/// Length in millimeters
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Millimeters(pub f64);

impl From<Centimeters> for Meters {
    fn from(cm: Centimeters) -> Self {
        Meters(cm.0 / 100.0)
    }
}

impl From<Millimeters> for Meters {
    fn from(mm: Millimeters) -> Self {
        Meters(mm.0 / 1000.0)
    }
}

impl From<Centimeters> for Millimeters {
    fn from(cm: Centimeters) -> Self {
        Millimeters(cm.0 * 10.0)
    }
}

impl From<Meters> for Millimeters {
    fn from(m: Meters) -> Self {
        Millimeters(m.0 * 1000.0)
    }
}

// ============================================================================
// Area Units
// ============================================================================

/// Area in square meters
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SqMeters(pub f64);

/// Area in ping (坪)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ping(pub f64);

impl From<Ping> for SqMeters {
    fn from(ping: Ping) -> Self {
        SqMeters(ping.0 * SQM_PER_PING)
    }
}

impl From<SqMeters> for Ping {
    fn from(sqm: SqMeters) -> Self {
        Ping(sqm.0 / SQM_PER_PING)
    }
}

// ============================================================================
// Volume and Mass
// ============================================================================

/// Volume in cubic meters
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CubicMeters(pub f64);

/// Mass in kilograms
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Kilograms(pub f64);

/// Unit an area field was entered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AreaUnit {
    /// Square meters
    #[default]
    Sqm,
    /// Ping (3.30579 m²)
    Ping,
}

impl AreaUnit {
    pub const ALL: [AreaUnit; 2] = [AreaUnit::Sqm, AreaUnit::Ping];

    /// Convert a raw value entered in this unit to square meters
    pub fn to_sqm(self, value: f64) -> f64 {
        match self {
            AreaUnit::Sqm => value,
            AreaUnit::Ping => SqMeters::from(Ping(value)).0,
        }
    }

    /// Convert a raw value entered in this unit to ping
    pub fn to_ping(self, value: f64) -> f64 {
        match self {
            AreaUnit::Sqm => Ping::from(SqMeters(value)).0,
            AreaUnit::Ping => value,
        }
    }

    /// Parse from a loose key ("sqm", "m2", "ping", "坪"); anything else is m²
    pub fn from_key(key: &str) -> Self {
        match key.trim().to_lowercase().as_str() {
            "ping" | "坪" => AreaUnit::Ping,
            _ => AreaUnit::Sqm,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            AreaUnit::Sqm => "m²",
            AreaUnit::Ping => "ping",
        }
    }
}

// ============================================================================
// Arithmetic Implementations (macro to reduce boilerplate)
// ============================================================================

macro_rules! impl_arithmetic {
    ($type:ty) => {
        impl Add for $type {
            type Output = Self;
            fn add(self, rhs: Self) -> Self::Output {
                Self(self.0 + rhs.0)
            }
        }

        impl Sub for $type {
            type Output = Self;
            fn sub(self, rhs: Self) -> Self::Output {
                Self(self.0 - rhs.0)
            }
        }

        impl Mul<f64> for $type {
            type Output = Self;
            fn mul(self, rhs: f64) -> Self::Output {
                Self(self.0 * rhs)
            }
        }

        impl Div<f64> for $type {
            type Output = Self;
            fn div(self, rhs: f64) -> Self::Output {
                Self(self.0 / rhs)
            }
        }

        impl $type {
            /// Get the raw f64 value
            pub fn value(self) -> f64 {
                self.0
            }

            /// Create from raw f64 value
            pub fn new(value: f64) -> Self {
                Self(value)
            }
        }
    };
}

impl_arithmetic!(Meters);
impl_arithmetic!(Centimeters);
impl_arithmetic!(Millimeters);
impl_arithmetic!(SqMeters);
impl_arithmetic!(Ping);
impl_arithmetic!(CubicMeters);
impl_arithmetic!(Kilograms);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ping_to_sqm() {
        let sqm: SqMeters = Ping(2.0).into();
        assert!((sqm.0 - 6.61158).abs() < 1e-9);
        let back: Ping = sqm.into();
        assert!((back.0 - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_length_conversions() {
        let m: Meters = Centimeters(15.0).into();
        assert!((m.0 - 0.15).abs() < 1e-12);
        let m: Meters = Millimeters(200.0).into();
        assert!((m.0 - 0.2).abs() < 1e-12);
        let mm: Millimeters = Centimeters(60.0).into();
        assert_eq!(mm.0, 600.0);
    }

    #[test]
    fn test_area_unit() {
        assert_eq!(AreaUnit::Sqm.to_sqm(10.0), 10.0);
        assert!((AreaUnit::Ping.to_sqm(1.0) - SQM_PER_PING).abs() < 1e-12);
        assert!((AreaUnit::Sqm.to_ping(SQM_PER_PING) - 1.0).abs() < 1e-12);
        assert_eq!(AreaUnit::from_key(" Ping "), AreaUnit::Ping);
        assert_eq!(AreaUnit::from_key("m2"), AreaUnit::Sqm);
    }

    #[test]
    fn test_arithmetic() {
        let a = CubicMeters(3.0);
        let b = CubicMeters(1.5);
        assert_eq!((a + b).0, 4.5);
        assert_eq!((a - b).0, 1.5);
        assert_eq!((a * 2.0).0, 6.0);
        assert_eq!((a / 2.0).0, 1.5);
    }

    #[test]
    fn test_serialization() {
        let kg = Kilograms(12.5);
        let json = serde_json::to_string(&kg).unwrap();
        assert_eq!(json, "12.5");
        assert_eq!(serde_json::to_string(&AreaUnit::Ping).unwrap(), "\"ping\"");
    }
}
