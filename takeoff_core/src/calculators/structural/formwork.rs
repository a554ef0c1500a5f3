//! # Formwork Building Estimate
//!
//! Formwork contact area from building floor area:
//!
//! ```text
//! area = building_area × tier coefficient                      (basic)
//! area = max(0, building_area × tier × type × condition − openings)   (advanced)
//! ```
//!
//! Tier coefficients are 1.3 / 1.8 / 2.2 for simple, standard and complex
//! structures. Member-by-member formwork lives in
//! [`component`](super::component).

use serde::{Deserialize, Serialize};

use crate::calculators::{Calculator, CalculatorId, TakeoffContext};
use crate::input::{lenient, num};
use crate::presets::{ComplexityTier, ConstructionCondition, FormworkType};
use crate::record::MaterialLine;
use crate::wastage::{apply_wastage, MaterialCategory, WastageConfig};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FormworkEstimateInput {
    /// Total building floor area (m²)
    #[serde(default, deserialize_with = "lenient::f64")]
    pub building_area: f64,

    #[serde(default, deserialize_with = "lenient::complexity_tier")]
    pub tier: ComplexityTier,

    /// Apply formwork-type/condition coefficients and the opening deduction
    #[serde(default, deserialize_with = "lenient::bool")]
    pub advanced: bool,

    #[serde(default, deserialize_with = "lenient::formwork_type")]
    pub formwork_type: FormworkType,

    #[serde(default, deserialize_with = "lenient::construction_condition")]
    pub condition: ConstructionCondition,

    /// Area of openings not formed (m²), advanced mode only
    #[serde(default, deserialize_with = "lenient::f64")]
    pub opening_area: f64,

    #[serde(default)]
    pub wastage: WastageConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormworkEstimateResult {
    /// building_area × tier coefficient
    pub base_area: f64,
    pub tier_coefficient: f64,
    /// formwork type × condition, 1.0 in basic mode
    pub adjustment_factor: f64,
    pub opening_deduction: f64,
    /// Net formwork area (m²), never negative
    pub area: f64,
    pub wastage_percent: f64,
    pub area_with_wastage: f64,
}

/// Estimate formwork area for a whole building
pub fn calculate(input: &FormworkEstimateInput, ctx: &TakeoffContext<'_>) -> FormworkEstimateResult {
    let tier_coefficient = input.tier.coefficient();
    let base_area = num(num(input.building_area) * tier_coefficient);

    let (adjustment_factor, opening_deduction) = if input.advanced {
        (
            input.formwork_type.coefficient() * input.condition.coefficient(),
            num(input.opening_area).max(0.0),
        )
    } else {
        (1.0, 0.0)
    };

    let area = (base_area * adjustment_factor - opening_deduction).max(0.0);
    let wastage_percent = input.wastage.effective_rate(MaterialCategory::Formwork, ctx.wastage);

    FormworkEstimateResult {
        base_area,
        tier_coefficient,
        adjustment_factor,
        opening_deduction,
        area,
        wastage_percent,
        area_with_wastage: apply_wastage(area, wastage_percent),
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FormworkEstimateCalculator {
    #[serde(default)]
    pub input: FormworkEstimateInput,
}

impl Calculator for FormworkEstimateCalculator {
    fn id(&self) -> CalculatorId {
        CalculatorId::FormworkEstimate
    }

    fn material_lines(&self, ctx: &TakeoffContext<'_>) -> Vec<MaterialLine> {
        let result = calculate(&self.input, ctx);
        vec![MaterialLine::new(
            MaterialCategory::Formwork,
            "building_estimate",
            format!("Formwork estimate ({})", self.input.tier.display_name().to_lowercase()),
            result.area,
            "m²",
            result.area_with_wastage,
        )]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(area: f64, tier: ComplexityTier) -> FormworkEstimateInput {
        FormworkEstimateInput {
            building_area: area,
            tier,
            ..Default::default()
        }
    }

    #[test]
    fn test_basic_tiers() {
        let ctx = TakeoffContext::standard();
        assert!((calculate(&input(100.0, ComplexityTier::Simple), &ctx).area - 130.0).abs() < 1e-9);
        assert!((calculate(&input(100.0, ComplexityTier::Standard), &ctx).area - 180.0).abs() < 1e-9);
        assert!((calculate(&input(100.0, ComplexityTier::Complex), &ctx).area - 220.0).abs() < 1e-9);
    }

    #[test]
    fn test_basic_mode_ignores_advanced_fields() {
        let ctx = TakeoffContext::standard();
        let mut i = input(100.0, ComplexityTier::Standard);
        i.formwork_type = FormworkType::FairFaced;
        i.opening_area = 50.0;
        let result = calculate(&i, &ctx);
        assert_eq!(result.adjustment_factor, 1.0);
        assert!((result.area - 180.0).abs() < 1e-9);
    }

    #[test]
    fn test_advanced_adjustment() {
        let ctx = TakeoffContext::standard();
        let mut i = input(100.0, ComplexityTier::Standard);
        i.advanced = true;
        i.formwork_type = FormworkType::Steel;
        i.condition = ConstructionCondition::HighRise;
        i.opening_area = 20.0;
        let result = calculate(&i, &ctx);
        // 180 × 0.92 × 1.15 − 20
        assert!((result.area - (180.0 * 0.92 * 1.15 - 20.0)).abs() < 1e-9);
        assert!((result.area_with_wastage - result.area * 1.1).abs() < 1e-9);
    }

    #[test]
    fn test_opening_deduction_clamped() {
        let ctx = TakeoffContext::standard();
        let mut i = input(10.0, ComplexityTier::Simple);
        i.advanced = true;
        i.opening_area = 500.0;
        let result = calculate(&i, &ctx);
        assert_eq!(result.area, 0.0);
        assert_eq!(result.area_with_wastage, 0.0);
    }

    #[test]
    fn test_lenient_input() {
        let i: FormworkEstimateInput =
            serde_json::from_str(r#"{"building_area":"250","tier":"complex","advanced":"false"}"#).unwrap();
        assert_eq!(i.building_area, 250.0);
        assert_eq!(i.tier, ComplexityTier::Complex);
        assert!(!i.advanced);
    }

    #[test]
    fn test_lenient_input_restore() {
        let json = r#"{"building_area":"100","tier":"","advanced":"true","formwork_type":"Fair-Faced","condition":"unknown"}"#;
        let input: FormworkEstimateInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.tier, ComplexityTier::Standard);
        assert_eq!(input.formwork_type, FormworkType::FairFaced);
        assert_eq!(input.condition, ConstructionCondition::Normal);

        let ctx = TakeoffContext::standard();
        assert!((calculate(&input, &ctx).area - 100.0 * 1.8 * 1.15).abs() < 1e-9);
    }
}
