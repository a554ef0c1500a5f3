//! # takeoff_core - Material Quantity & Cost Takeoff Engine
//!
//! `takeoff_core` turns the dimensions a site estimator enters into material
//! quantities (concrete, rebar, formwork, mortar, plaster, bricks, tile,
//! grout, adhesive, paint, putty), adds category wastage and attaches vendor
//! pricing. All inputs and outputs are JSON-serializable.
//!
//! ## Design Philosophy
//!
//! - **Never fails on input**: blank or non-numeric fields count as 0
//! - **Data-driven**: presets and wastage defaults are passed in, not hard-coded in formulas
//! - **JSON-First**: sessions, snapshots and records all serialize with serde
//! - **Rich Errors**: structured error types for the file and persistence layer
//!
//! ## Quick Start
//!
//! ```rust
//! use takeoff_core::record::MaterialRecord;
//! use takeoff_core::TakeoffSession;
//!
//! let mut session = TakeoffSession::new("Site A", "estimator@company.com");
//! session.update_row("brick", 1, "area", 10.0).unwrap();
//!
//! let mut records: Vec<MaterialRecord> = Vec::new();
//! session.export_records(&session.costs, &mut records);
//! assert_eq!(records[0].category(), "brick");
//! ```
//!
//! ## Modules
//!
//! - [`session`] - Session container, schema version, export and persistence
//! - [`calculators`] - All takeoff calculators
//! - [`presets`] - Catalog of preset tables (grades, bars, members, tiles, buildings)
//! - [`rows`] - Never-empty row collections shared by every calculator
//! - [`wastage`] - Material categories and wastage rates
//! - [`cost`] - Vendors, cost inputs and the cost book
//! - [`record`] - Material lines and emitted records
//! - [`snapshot`] - Row persistence stores
//! - [`settings`] - Company-wide defaults
//! - [`units`] - Type-safe unit wrappers
//! - [`errors`] - Structured error types
//! - [`file_io`] - File operations with atomic saves and locking

pub mod calculators;
pub mod cost;
pub mod errors;
#[cfg(not(target_arch = "wasm32"))]
pub mod file_io;
pub mod input;
pub mod presets;
pub mod record;
pub mod rows;
pub mod session;
pub mod settings;
pub mod snapshot;
pub mod units;
pub mod wastage;

// Re-export commonly used types at crate root for convenience
pub use calculators::{Calculator, CalculatorId, TakeoffContext};
pub use cost::{CostBook, CostInput, Vendor};
pub use errors::{TakeoffError, TakeoffResult};
#[cfg(not(target_arch = "wasm32"))]
pub use file_io::{load_session, save_session, FileLock};
pub use presets::PresetCatalog;
pub use record::{MaterialLine, MaterialRecord, RecordSink};
pub use session::{TakeoffSession, SCHEMA_VERSION};
pub use settings::TakeoffSettings;
pub use wastage::{MaterialCategory, WastageConfig, WastageDefaults};
