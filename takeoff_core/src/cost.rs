//! # Cost Attachment
//!
//! Binds a vendor and a unit price to a takeoff quantity. Costing is
//! independent of the quantity formulas: a [`CostInput`] holds what the user
//! picked, and [`attach_cost`] rebuilds the [`CostEstimate`] from it every
//! time the quantity changes.
//!
//! A missing or zero price is not an error; it yields a zero subtotal.
//!
//! ```rust
//! use takeoff_core::cost::{attach_cost, CostInput, Vendor};
//!
//! let vendor = Vendor::new("v-01", "Harbor Ready-Mix", ["concrete"]);
//! let input = CostInput::new(Some(&vendor), "fc' 280", 3200.0);
//! let estimate = attach_cost(&input, 12.5);
//! assert_eq!(estimate.subtotal, 40000.0);
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::input::{lenient, num};
use crate::wastage::MaterialCategory;

/// Supplier reference data, owned by the vendor-management collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vendor {
    pub id: String,
    pub name: String,
    /// Free-text trade/category tags, e.g. "concrete", "tile & stone"
    #[serde(default)]
    pub trades: Vec<String>,
}

impl Vendor {
    pub fn new<I, S>(id: impl Into<String>, name: impl Into<String>, trades: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Vendor {
            id: id.into(),
            name: name.into(),
            trades: trades.into_iter().map(Into::into).collect(),
        }
    }

    /// Case-insensitive substring match against any trade tag
    pub fn serves(&self, tag: &str) -> bool {
        let tag = tag.trim().to_lowercase();
        tag.is_empty() || self.trades.iter().any(|t| t.to_lowercase().contains(&tag))
    }
}

/// Vendors whose trade tags contain `tag`; an empty tag keeps every vendor
pub fn filter_vendors<'a>(vendors: &'a [Vendor], tag: &str) -> Vec<&'a Vendor> {
    vendors.iter().filter(|v| v.serves(tag)).collect()
}

/// What the user picked for one material line.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CostInput {
    #[serde(default)]
    pub vendor_id: String,

    #[serde(default)]
    pub vendor_name: String,

    /// Product/specification text, e.g. "fc' 280" or "#5"
    #[serde(default)]
    pub spec: String,

    #[serde(default, deserialize_with = "lenient::f64")]
    pub unit_price: f64,

    #[serde(default)]
    pub note: String,
}

impl CostInput {
    pub fn new(vendor: Option<&Vendor>, spec: impl Into<String>, unit_price: f64) -> Self {
        CostInput {
            vendor_id: vendor.map(|v| v.id.clone()).unwrap_or_default(),
            vendor_name: vendor.map(|v| v.name.clone()).unwrap_or_default(),
            spec: spec.into(),
            unit_price,
            note: String::new(),
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }
}

/// Priced quantity: `subtotal = unit_price × quantity`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CostEstimate {
    pub vendor_id: String,
    pub vendor_name: String,
    pub spec: String,
    pub unit_price: f64,
    pub quantity: f64,
    pub subtotal: f64,
    pub note: String,
}

/// Build a cost estimate for a quantity
pub fn attach_cost(input: &CostInput, quantity: f64) -> CostEstimate {
    let unit_price = num(input.unit_price);
    let quantity = num(quantity);
    CostEstimate {
        vendor_id: input.vendor_id.clone(),
        vendor_name: input.vendor_name.clone(),
        spec: input.spec.clone(),
        unit_price,
        quantity,
        subtotal: subtotal(unit_price, quantity),
        note: input.note.clone(),
    }
}

/// `unit_price × quantity`, zero for missing values
pub fn subtotal(unit_price: f64, quantity: f64) -> f64 {
    num(num(unit_price) * num(quantity))
}

/// Cost inputs keyed by record category and sub-type.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CostBook(BTreeMap<String, CostInput>);

impl CostBook {
    pub fn new() -> Self {
        CostBook::default()
    }

    fn key(category: MaterialCategory, sub_type: &str) -> String {
        format!("{}.{}", category.as_str(), sub_type)
    }

    pub fn set(&mut self, category: MaterialCategory, sub_type: &str, input: CostInput) {
        self.0.insert(CostBook::key(category, sub_type), input);
    }

    pub fn get(&self, category: MaterialCategory, sub_type: &str) -> Option<&CostInput> {
        self.0.get(&CostBook::key(category, sub_type))
    }

    pub fn remove(&mut self, category: MaterialCategory, sub_type: &str) -> Option<CostInput> {
        self.0.remove(&CostBook::key(category, sub_type))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vendors() -> Vec<Vendor> {
        vec![
            Vendor::new("v1", "North Steel", ["Rebar", "structural steel"]),
            Vendor::new("v2", "Tile House", ["tile & stone"]),
            Vendor::new("v3", "General Supply", ["cement", "sand", "tile adhesive"]),
        ]
    }

    #[test]
    fn test_filter_vendors() {
        let all = vendors();
        let tile: Vec<&str> = filter_vendors(&all, "TILE").iter().map(|v| v.id.as_str()).collect();
        assert_eq!(tile, vec!["v2", "v3"]);
        assert_eq!(filter_vendors(&all, "rebar").len(), 1);
        assert_eq!(filter_vendors(&all, "").len(), 3);
        assert!(filter_vendors(&all, "glass").is_empty());
    }

    #[test]
    fn test_attach_cost() {
        let all = vendors();
        let input = CostInput::new(Some(&all[0]), "#5", 28.5).with_note("delivered");
        let estimate = attach_cost(&input, 100.0);
        assert_eq!(estimate.vendor_name, "North Steel");
        assert_eq!(estimate.quantity, 100.0);
        assert!((estimate.subtotal - 2850.0).abs() < 1e-9);
        assert_eq!(estimate.note, "delivered");
    }

    #[test]
    fn test_missing_price_is_zero() {
        let input = CostInput::default();
        assert_eq!(attach_cost(&input, 50.0).subtotal, 0.0);

        let input: CostInput = serde_json::from_str(r#"{"unit_price":""}"#).unwrap();
        assert_eq!(attach_cost(&input, 50.0).subtotal, 0.0);
        assert_eq!(subtotal(f64::NAN, 3.0), 0.0);
    }

    #[test]
    fn test_cost_book() {
        let mut book = CostBook::new();
        book.set(MaterialCategory::Mortar, "cement", CostInput::new(None, "Type I", 4.2));
        assert!(book.get(MaterialCategory::Mortar, "cement").is_some());
        assert!(book.get(MaterialCategory::Plaster, "cement").is_none());
        let json = serde_json::to_string(&book).unwrap();
        assert!(json.contains("mortar.cement"));
        assert_eq!(book.len(), 1);
    }
}
