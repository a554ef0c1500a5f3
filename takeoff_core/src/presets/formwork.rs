//! Formwork Coefficients
//!
//! The building-estimate formwork path multiplies floor area by a
//! complexity tier and, in its advanced form, by a formwork-type and a
//! construction-condition coefficient.

use serde::{Deserialize, Serialize};

/// Formwork contact area per m² of building floor area
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ComplexityTier {
    /// Regular grid, few openings
    Simple,
    #[default]
    Standard,
    /// Irregular plan, transfer beams, many openings
    Complex,
}

impl ComplexityTier {
    pub const ALL: [ComplexityTier; 3] = [ComplexityTier::Simple, ComplexityTier::Standard, ComplexityTier::Complex];

    pub fn coefficient(&self) -> f64 {
        match self {
            ComplexityTier::Simple => 1.3,
            ComplexityTier::Standard => 1.8,
            ComplexityTier::Complex => 2.2,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ComplexityTier::Simple => "Simple structure",
            ComplexityTier::Standard => "Standard structure",
            ComplexityTier::Complex => "Complex structure",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match normalize(key).as_str() {
            "simple" => Some(ComplexityTier::Simple),
            "standard" => Some(ComplexityTier::Standard),
            "complex" => Some(ComplexityTier::Complex),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FormworkType {
    #[default]
    Plywood,
    Steel,
    Aluminum,
    /// Exposed-finish (fair-faced) formwork
    FairFaced,
}

impl FormworkType {
    pub const ALL: [FormworkType; 4] = [
        FormworkType::Plywood,
        FormworkType::Steel,
        FormworkType::Aluminum,
        FormworkType::FairFaced,
    ];

    pub fn coefficient(&self) -> f64 {
        match self {
            FormworkType::Plywood => 1.0,
            FormworkType::Steel => 0.92,
            FormworkType::Aluminum => 0.88,
            FormworkType::FairFaced => 1.15,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            FormworkType::Plywood => "Plywood",
            FormworkType::Steel => "Steel",
            FormworkType::Aluminum => "Aluminum system",
            FormworkType::FairFaced => "Fair-faced",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match normalize(key).as_str() {
            "plywood" => Some(FormworkType::Plywood),
            "steel" => Some(FormworkType::Steel),
            "aluminum" | "aluminium" => Some(FormworkType::Aluminum),
            "fair_faced" | "fairfaced" => Some(FormworkType::FairFaced),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConstructionCondition {
    #[default]
    Normal,
    /// Tight urban site
    Congested,
    HighRise,
    /// Slopes, basements, poor access
    Difficult,
}

impl ConstructionCondition {
    pub const ALL: [ConstructionCondition; 4] = [
        ConstructionCondition::Normal,
        ConstructionCondition::Congested,
        ConstructionCondition::HighRise,
        ConstructionCondition::Difficult,
    ];

    pub fn coefficient(&self) -> f64 {
        match self {
            ConstructionCondition::Normal => 1.0,
            ConstructionCondition::Congested => 1.1,
            ConstructionCondition::HighRise => 1.15,
            ConstructionCondition::Difficult => 1.25,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ConstructionCondition::Normal => "Normal",
            ConstructionCondition::Congested => "Congested site",
            ConstructionCondition::HighRise => "High-rise",
            ConstructionCondition::Difficult => "Difficult access",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match normalize(key).as_str() {
            "normal" => Some(ConstructionCondition::Normal),
            "congested" => Some(ConstructionCondition::Congested),
            "high_rise" | "highrise" => Some(ConstructionCondition::HighRise),
            "difficult" => Some(ConstructionCondition::Difficult),
            _ => None,
        }
    }
}

/// "High-Rise" / "high rise" → "high_rise"
fn normalize(key: &str) -> String {
    key.trim().to_lowercase().replace(['-', ' '], "_")
}
