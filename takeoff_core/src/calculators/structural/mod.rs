//! Structural Calculators
//!
//! Concrete volume, rebar weight (exact and area estimate), building-level
//! formwork and the per-component takeoff with its dual-mode rebar.

pub mod component;
pub mod component_rebar;
pub mod concrete;
pub mod formwork;
pub mod rebar;

pub use component::{ComponentCalculator, ComponentRow, ComponentRowResult, ComponentSummary, MemberDims, ResolvedMember};
pub use component_rebar::{AdvancedRebar, RebarMethod, RebarStrategy, RebarTakeoff};
pub use concrete::{ConcreteCalculator, ConcreteRow};
pub use formwork::{FormworkEstimateCalculator, FormworkEstimateInput, FormworkEstimateResult};
pub use rebar::{RebarAreaCalculator, RebarAreaRow, RebarExactCalculator, RebarExactRow};
