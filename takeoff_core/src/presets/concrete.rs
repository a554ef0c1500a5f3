//! Concrete Grades
//!
//! Specified compressive strengths as used on Taiwanese drawings
//! (kgf/cm²), with the SI equivalent. The grade key travels with a concrete
//! row and ends up as the `spec` text of the emitted record.

use serde::{Deserialize, Serialize};

/// 1 kgf/cm² in MPa
const MPA_PER_KGF_CM2: f64 = 0.0980665;

/// Grade used when a key matches nothing
pub const DEFAULT_GRADE_KEY: &str = "210";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConcreteGrade {
    /// Lookup key, e.g. "210"
    pub key: String,
    /// f'c in kgf/cm²
    pub fc_kgf_cm2: f64,
}

impl ConcreteGrade {
    pub fn new(fc_kgf_cm2: f64) -> Self {
        ConcreteGrade {
            key: format!("{}", fc_kgf_cm2 as u32),
            fc_kgf_cm2,
        }
    }

    /// f'c in MPa
    pub fn fc_mpa(&self) -> f64 {
        self.fc_kgf_cm2 * MPA_PER_KGF_CM2
    }

    pub fn label(&self) -> String {
        format!("fc' {} kgf/cm² ({:.1} MPa)", self.key, self.fc_mpa())
    }
}

impl Default for ConcreteGrade {
    fn default() -> Self {
        ConcreteGrade::new(210.0)
    }
}

pub fn standard_grades() -> Vec<ConcreteGrade> {
    [140.0, 175.0, 210.0, 245.0, 280.0, 315.0, 350.0, 420.0]
        .into_iter()
        .map(ConcreteGrade::new)
        .collect()
}
