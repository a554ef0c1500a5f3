//! # Row Collections
//!
//! Every calculator edits an ordered list of input rows. [`RowCollection`]
//! is the one generic container they all share; a calculator only supplies
//! its row shape (a type implementing [`RowFields`]) and that type's
//! `Default` is the shape of a freshly added row.
//!
//! ## Invariants
//!
//! - A collection is never empty. Removing the sole row is a silent no-op and
//!   clearing resets to one default row.
//! - New ids are `max(existing) + 1`, so a collection restored from a
//!   snapshot keeps handing out fresh ids.
//! - No validation happens here; numeric coercion is done by each row type
//!   (see [`crate::input`]).
//!
//! ## Example
//!
//! ```rust
//! use takeoff_core::rows::RowCollection;
//! use takeoff_core::calculators::structural::ConcreteRow;
//!
//! let mut rows: RowCollection<ConcreteRow> = RowCollection::new();
//! let id = rows.add_row();
//! rows.update_row(id, "length", "4");
//! assert_eq!(rows.len(), 2);
//!
//! rows.clear_rows();
//! assert_eq!(rows.len(), 1);
//! ```

use std::fmt::Debug;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::calculators::CalculatorId;
use crate::input::FieldValue;
use crate::session::SCHEMA_VERSION;

/// Row shape of one calculator.
///
/// `Default` provides the values of a newly added row.
pub trait RowFields: Debug + Clone + Default + PartialEq + Serialize + DeserializeOwned {
    /// Set one named field from raw input.
    ///
    /// Returns `false` (and changes nothing) when the row has no such field.
    fn set_field(&mut self, field: &str, value: &FieldValue) -> bool;
}

/// One line item: an id, a free-text name and the calculator-specific fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row<T> {
    pub id: u32,

    #[serde(default)]
    pub name: String,

    #[serde(flatten)]
    pub fields: T,
}

impl<T: RowFields> Row<T> {
    pub fn new(id: u32) -> Self {
        Row {
            id,
            name: String::new(),
            fields: T::default(),
        }
    }

    pub fn with_fields(id: u32, fields: T) -> Self {
        Row {
            id,
            name: String::new(),
            fields,
        }
    }

    /// Name shown on emitted records; falls back to "#<id>"
    pub fn display_name(&self) -> String {
        if self.name.trim().is_empty() {
            format!("#{}", self.id)
        } else {
            self.name.trim().to_string()
        }
    }
}

/// Ordered, never-empty list of rows owned by a single calculator.
#[derive(Debug, Clone, PartialEq)]
pub struct RowCollection<T> {
    rows: Vec<Row<T>>,
}

impl<T: RowFields> RowCollection<T> {
    /// A collection holding one default row with id 1
    pub fn new() -> Self {
        RowCollection {
            rows: vec![Row::new(1)],
        }
    }

    /// Build from existing rows; an empty list yields one default row
    pub fn from_rows(rows: Vec<Row<T>>) -> Self {
        if rows.is_empty() {
            return RowCollection::new();
        }
        RowCollection { rows }
    }

    fn next_id(&self) -> u32 {
        self.rows.iter().map(|r| r.id).max().unwrap_or(0) + 1
    }

    /// Append a default row, returning its id
    pub fn add_row(&mut self) -> u32 {
        self.add_row_with(T::default())
    }

    /// Append a row with the given fields, returning its id
    pub fn add_row_with(&mut self, fields: T) -> u32 {
        let id = self.next_id();
        self.rows.push(Row::with_fields(id, fields));
        id
    }

    /// Remove a row by id.
    ///
    /// Returns `true` if a row was removed. The last remaining row is never
    /// removed; that case returns `false` and leaves the collection unchanged.
    pub fn remove_row(&mut self, id: u32) -> bool {
        if self.rows.len() <= 1 {
            tracing::debug!(id, "ignoring removal of the last row");
            return false;
        }
        let before = self.rows.len();
        self.rows.retain(|r| r.id != id);
        self.rows.len() != before
    }

    /// Replace one field of one row.
    ///
    /// `"name"` addresses the row name; every other field is delegated to
    /// the row type. Returns `false` for an unknown id or field.
    pub fn update_row(&mut self, id: u32, field: &str, value: impl Into<FieldValue>) -> bool {
        let value = value.into();
        match self.rows.iter_mut().find(|r| r.id == id) {
            Some(row) if field == "name" => {
                row.name = value.as_text();
                true
            }
            Some(row) => row.fields.set_field(field, &value),
            None => false,
        }
    }

    /// Apply a typed edit to one row. Returns `false` for an unknown id.
    pub fn update_row_with(&mut self, id: u32, edit: impl FnOnce(&mut Row<T>)) -> bool {
        match self.rows.iter_mut().find(|r| r.id == id) {
            Some(row) => {
                edit(row);
                // The id is the row's identity, keep it
                row.id = id;
                true
            }
            None => false,
        }
    }

    /// Reset to a single default row
    pub fn clear_rows(&mut self) {
        self.rows = vec![Row::new(1)];
    }

    pub fn rows(&self) -> &[Row<T>] {
        &self.rows
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Row<T>> {
        self.rows.iter()
    }

    pub fn get(&self, id: u32) -> Option<&Row<T>> {
        self.rows.iter().find(|r| r.id == id)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Always false; kept for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Capture the rows for persistence
    pub fn snapshot(&self, calculator: CalculatorId) -> RowSnapshot<T> {
        RowSnapshot {
            calculator,
            version: SCHEMA_VERSION.to_string(),
            saved_at: Utc::now(),
            rows: self.rows.clone(),
        }
    }

    /// Rebuild a collection from a snapshot, rows restored verbatim
    pub fn restore(snapshot: RowSnapshot<T>) -> Self {
        RowCollection::from_rows(snapshot.rows)
    }
}

impl<T: RowFields> Default for RowCollection<T> {
    fn default() -> Self {
        RowCollection::new()
    }
}

impl<'a, T> IntoIterator for &'a RowCollection<T> {
    type Item = &'a Row<T>;
    type IntoIter = std::slice::Iter<'a, Row<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

// Serialized as a plain array of rows
impl<T: RowFields> Serialize for RowCollection<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.rows.serialize(serializer)
    }
}

impl<'de, T: RowFields> Deserialize<'de> for RowCollection<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let rows = Vec::<Row<T>>::deserialize(deserializer)?;
        Ok(RowCollection::from_rows(rows))
    }
}

/// Persisted copy of one calculator's rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowSnapshot<T> {
    /// Calculator the rows belong to
    pub calculator: CalculatorId,

    /// Schema version the snapshot was written with
    pub version: String,

    pub saved_at: DateTime<Utc>,

    pub rows: Vec<Row<T>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::lenient;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct BoxRow {
        #[serde(default, deserialize_with = "lenient::f64")]
        length: f64,
        #[serde(default, deserialize_with = "lenient::f64")]
        width: f64,
    }

    impl Default for BoxRow {
        fn default() -> Self {
            BoxRow { length: 1.0, width: 0.0 }
        }
    }

    impl RowFields for BoxRow {
        fn set_field(&mut self, field: &str, value: &FieldValue) -> bool {
            match field {
                "length" => self.length = value.as_f64(),
                "width" => self.width = value.as_f64(),
                _ => return false,
            }
            true
        }
    }

    #[test]
    fn test_new_has_one_default_row() {
        let rows: RowCollection<BoxRow> = RowCollection::new();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows.rows()[0].id, 1);
        assert_eq!(rows.rows()[0].fields.length, 1.0);
    }

    #[test]
    fn test_add_row_uses_fresh_ids() {
        let mut rows: RowCollection<BoxRow> = RowCollection::new();
        let a = rows.add_row();
        let b = rows.add_row();
        assert_eq!((a, b), (2, 3));
        rows.remove_row(a);
        // max + 1, not len + 1
        assert_eq!(rows.add_row(), 4);
    }

    #[test]
    fn test_remove_last_row_is_noop() {
        let mut rows: RowCollection<BoxRow> = RowCollection::new();
        let before = rows.clone();
        assert!(!rows.remove_row(1));
        assert_eq!(rows, before);
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn test_remove_unknown_id() {
        let mut rows: RowCollection<BoxRow> = RowCollection::new();
        rows.add_row();
        assert!(!rows.remove_row(99));
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_update_row() {
        let mut rows: RowCollection<BoxRow> = RowCollection::new();
        assert!(rows.update_row(1, "width", "2.5"));
        assert!(rows.update_row(1, "name", "Slab A"));
        assert!(!rows.update_row(1, "colour", "red"));
        assert!(!rows.update_row(7, "width", 1.0));
        let row = rows.get(1).unwrap();
        assert_eq!(row.fields.width, 2.5);
        assert_eq!(row.name, "Slab A");

        rows.update_row(1, "width", "oops");
        assert_eq!(rows.get(1).unwrap().fields.width, 0.0);
    }

    #[test]
    fn test_update_row_with_keeps_id() {
        let mut rows: RowCollection<BoxRow> = RowCollection::new();
        rows.update_row_with(1, |r| {
            r.id = 42;
            r.fields.length = 3.0;
        });
        assert!(rows.get(1).is_some());
        assert_eq!(rows.get(1).unwrap().fields.length, 3.0);
    }

    #[test]
    fn test_clear_rows() {
        let mut rows: RowCollection<BoxRow> = RowCollection::new();
        rows.add_row();
        rows.add_row();
        rows.update_row(1, "width", 9.0);
        rows.clear_rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows.rows()[0].fields, BoxRow::default());
    }

    #[test]
    fn test_serialization_never_empty() {
        let rows: RowCollection<BoxRow> = serde_json::from_str("[]").unwrap();
        assert_eq!(rows.len(), 1);

        let rows: RowCollection<BoxRow> =
            serde_json::from_str(r#"[{"id":5,"name":"x","length":"2","width":""}]"#).unwrap();
        assert_eq!(rows.rows()[0].id, 5);
        assert_eq!(rows.rows()[0].fields.length, 2.0);
        assert_eq!(rows.rows()[0].fields.width, 0.0);
    }

    #[test]
    fn test_snapshot_restore() {
        let mut rows: RowCollection<BoxRow> = RowCollection::new();
        rows.add_row_with(BoxRow { length: 2.0, width: 3.0 });
        let snap = rows.snapshot(CalculatorId::Concrete);
        assert_eq!(snap.version, SCHEMA_VERSION);
        let json = serde_json::to_string(&snap).unwrap();
        let back: RowSnapshot<BoxRow> = serde_json::from_str(&json).unwrap();
        assert_eq!(RowCollection::restore(back), rows);
    }
}
