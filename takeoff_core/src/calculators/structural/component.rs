//! # Per-Component Takeoff
//!
//! Formwork area, concrete volume and rebar weight for individual
//! structural members: columns, beams, ground beams, walls, floors,
//! parapets and foundations.
//!
//! ## Resolution
//!
//! A row names a member type and a preset key. Before any geometry runs,
//! the row is resolved into a [`ResolvedMember`]: the preset supplies the
//! cross-section (or thickness, or footing size), the row supplies run
//! lengths, heights and the member count. The key `"custom"`, and any key
//! the catalog does not know for that member type, takes the section from
//! the row's own override fields instead.
//!
//! ## Geometry (per member, × count)
//!
//! | Member       | Formwork                                  | Concrete            |
//! |--------------|-------------------------------------------|---------------------|
//! | Parapet      | L × H × 2                                 | L × H × T           |
//! | Beam         | (2H [+ W with bottom form]) × L           | W × H × L           |
//! | Column       | perimeter × H (π·d or 2(w+d))             | section area × H    |
//! | Wall         | L × H × sides, minus openings (≥ 0)       | L × H × T           |
//! | Floor        | L × W (soffit only)                       | L × W × T           |
//! | Foundation   | 2(L + W) × depth (sides)                  | L × W × depth       |
//!
//! Rebar comes from [`component_rebar`](super::component_rebar).
//!
//! ## Example
//!
//! ```rust
//! use takeoff_core::calculators::TakeoffContext;
//! use takeoff_core::calculators::structural::ComponentCalculator;
//!
//! let ctx = TakeoffContext::standard();
//! let mut calc = ComponentCalculator::default();
//! calc.rows.update_row(1, "member", "column");
//! calc.rows.update_row(1, "preset", "R40");
//! calc.rows.update_row(1, "height", 3.0);
//!
//! let result = &calc.row_results(&ctx)[0];
//! assert!((result.formwork_sqm - 3.77).abs() < 0.01);
//! ```

use serde::{Deserialize, Serialize};

use crate::calculators::{sum, Calculator, CalculatorId, RowCalculator, TakeoffContext};
use crate::input::{lenient, num, FieldValue};
use crate::presets::{MemberType, PresetCatalog, PresetChoice, PresetDims, Section};
use crate::record::MaterialLine;
use crate::rows::{Row, RowCollection, RowFields};
use crate::wastage::{apply_wastage, MaterialCategory, WastageConfig};

use super::component_rebar::{resolve_rebar, AdvancedRebar, RebarStrategy, RebarTakeoff};

fn default_true() -> bool {
    true
}

fn default_count() -> f64 {
    1.0
}

fn default_preset() -> String {
    "C40x40".to_string()
}

/// One structural member line. Lengths are meters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentRow {
    #[serde(default, deserialize_with = "lenient::member_type")]
    pub member: MemberType,

    /// Preset key, or "custom" to use the override fields below
    #[serde(default = "default_preset", deserialize_with = "lenient::key")]
    pub preset: String,

    /// Run length (beams, walls, floors, parapets); custom footing length
    #[serde(default, deserialize_with = "lenient::f64")]
    pub length: f64,

    /// Floor width; custom beam/column width; custom footing width
    #[serde(default, deserialize_with = "lenient::f64")]
    pub width: f64,

    /// Custom column depth; custom footing depth
    #[serde(default, deserialize_with = "lenient::f64")]
    pub depth: f64,

    /// Column/wall height; custom beam height; custom parapet height
    #[serde(default, deserialize_with = "lenient::f64")]
    pub height: f64,

    /// Custom wall, floor or parapet thickness
    #[serde(default, deserialize_with = "lenient::f64")]
    pub thickness: f64,

    /// Custom round column diameter
    #[serde(default, deserialize_with = "lenient::f64")]
    pub diameter: f64,

    /// Custom column is round
    #[serde(default, deserialize_with = "lenient::bool")]
    pub round: bool,

    /// Number of identical members
    #[serde(default = "default_count", deserialize_with = "lenient::f64")]
    pub count: f64,

    /// Beams: include the soffit form
    #[serde(default = "default_true", deserialize_with = "lenient::bool")]
    pub bottom_form: bool,

    /// Walls: form both faces
    #[serde(default = "default_true", deserialize_with = "lenient::bool")]
    pub double_sided: bool,

    /// Walls: opening area deducted from formwork (m²)
    #[serde(default, deserialize_with = "lenient::f64")]
    pub opening_area: f64,

    #[serde(default)]
    pub rebar: RebarStrategy,
}

impl Default for ComponentRow {
    fn default() -> Self {
        ComponentRow {
            member: MemberType::Column,
            preset: default_preset(),
            length: 0.0,
            width: 0.0,
            depth: 0.0,
            height: 0.0,
            thickness: 0.0,
            diameter: 0.0,
            round: false,
            count: 1.0,
            bottom_form: true,
            double_sided: true,
            opening_area: 0.0,
            rebar: RebarStrategy::default(),
        }
    }
}

impl RowFields for ComponentRow {
    fn set_field(&mut self, field: &str, value: &FieldValue) -> bool {
        match field {
            "member" => match MemberType::from_key(&value.as_text()) {
                Some(member) => self.member = member,
                None => return false,
            },
            "preset" => self.preset = value.as_text(),
            "length" => self.length = value.as_f64(),
            "width" => self.width = value.as_f64(),
            "depth" => self.depth = value.as_f64(),
            "height" => self.height = value.as_f64(),
            "thickness" => self.thickness = value.as_f64(),
            "diameter" => self.diameter = value.as_f64(),
            "round" => self.round = value.as_bool(),
            "count" => self.count = value.as_f64(),
            "bottom_form" => self.bottom_form = value.as_bool(),
            "double_sided" => self.double_sided = value.as_bool(),
            "opening_area" => self.opening_area = value.as_f64(),
            "rebar_mode" => match value.as_text().to_lowercase().as_str() {
                "standard" => {
                    if !matches!(self.rebar, RebarStrategy::Standard { .. }) {
                        self.rebar = RebarStrategy::default();
                    }
                }
                "advanced" => {
                    if !matches!(self.rebar, RebarStrategy::Advanced(_)) {
                        self.rebar = RebarStrategy::Advanced(AdvancedRebar::default());
                    }
                }
                _ => return false,
            },
            _ => return self.rebar.set_field(field, value),
        }
        true
    }
}

/// Concrete dimensions of a member after preset resolution (meters).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MemberDims {
    Column {
        section: Section,
        height: f64,
    },
    /// Beams and ground beams
    Beam {
        width: f64,
        height: f64,
        length: f64,
        bottom_form: bool,
    },
    Wall {
        length: f64,
        height: f64,
        thickness: f64,
        double_sided: bool,
        opening_area: f64,
    },
    Floor {
        length: f64,
        width: f64,
        thickness: f64,
    },
    Parapet {
        length: f64,
        height: f64,
        thickness: f64,
    },
    Foundation {
        length: f64,
        width: f64,
        depth: f64,
    },
}

/// A row resolved against the catalog; every formula consumes this.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedMember {
    pub member: MemberType,
    /// Preset key actually used, `None` for custom dimensions
    pub preset: Option<String>,
    pub dims: MemberDims,
    pub count: f64,
}

/// Resolve a row's preset-or-custom section into concrete dimensions
pub fn resolve_member(row: &ComponentRow, catalog: &PresetCatalog) -> ResolvedMember {
    let preset = match PresetChoice::parse(&row.preset) {
        PresetChoice::Preset(key) => catalog.member_preset(row.member, &key),
        PresetChoice::Custom => None,
    };
    let preset_dims = preset.map(|p| p.dims);

    let dims = match row.member {
        MemberType::Column => {
            let section = match preset_dims {
                Some(PresetDims::Column { section }) => section,
                _ if row.round => Section::Round {
                    diameter: num(row.diameter),
                },
                _ => Section::Rect {
                    width: num(row.width),
                    depth: num(row.depth),
                },
            };
            MemberDims::Column {
                section,
                height: num(row.height),
            }
        }
        MemberType::Beam | MemberType::GroundBeam => {
            let (width, height) = match preset_dims {
                Some(PresetDims::Beam { width, height }) => (width, height),
                _ => (num(row.width), num(row.height)),
            };
            MemberDims::Beam {
                width,
                height,
                length: num(row.length),
                bottom_form: row.bottom_form,
            }
        }
        MemberType::Wall => {
            let thickness = match preset_dims {
                Some(PresetDims::Wall { thickness }) => thickness,
                _ => num(row.thickness),
            };
            MemberDims::Wall {
                length: num(row.length),
                height: num(row.height),
                thickness,
                double_sided: row.double_sided,
                opening_area: num(row.opening_area),
            }
        }
        MemberType::Floor => {
            let thickness = match preset_dims {
                Some(PresetDims::Floor { thickness }) => thickness,
                _ => num(row.thickness),
            };
            MemberDims::Floor {
                length: num(row.length),
                width: num(row.width),
                thickness,
            }
        }
        MemberType::Parapet => {
            let (height, thickness) = match preset_dims {
                Some(PresetDims::Parapet { height, thickness }) => (height, thickness),
                _ => (num(row.height), num(row.thickness)),
            };
            MemberDims::Parapet {
                length: num(row.length),
                height,
                thickness,
            }
        }
        MemberType::Foundation => match preset_dims {
            Some(PresetDims::Foundation { length, width, depth }) => MemberDims::Foundation { length, width, depth },
            _ => MemberDims::Foundation {
                length: num(row.length),
                width: num(row.width),
                depth: num(row.depth),
            },
        },
    };

    ResolvedMember {
        member: row.member,
        preset: preset.map(|p| p.key.clone()),
        dims,
        count: num(row.count),
    }
}

/// Formwork contact area (m²) of all members of a resolved row
pub fn formwork_area(resolved: &ResolvedMember) -> f64 {
    let count = resolved.count;
    let area = match resolved.dims {
        MemberDims::Parapet { length, height, .. } => length * height * 2.0 * count,
        MemberDims::Beam {
            width,
            height,
            length,
            bottom_form,
        } => {
            let girth = height * 2.0 + if bottom_form { width } else { 0.0 };
            girth * length * count
        }
        MemberDims::Column { section, height } => section.perimeter() * height * count,
        MemberDims::Wall {
            length,
            height,
            double_sided,
            opening_area,
            ..
        } => {
            let sides = if double_sided { 2.0 } else { 1.0 };
            (length * height * sides * count - opening_area).max(0.0)
        }
        MemberDims::Floor { length, width, .. } => length * width * count,
        MemberDims::Foundation { length, width, depth } => 2.0 * (length + width) * depth * count,
    };
    num(area)
}

/// Concrete volume (m³) of all members of a resolved row
pub fn concrete_volume(resolved: &ResolvedMember) -> f64 {
    let count = resolved.count;
    let volume = match resolved.dims {
        MemberDims::Parapet {
            length,
            height,
            thickness,
        } => length * height * thickness * count,
        MemberDims::Beam {
            width, height, length, ..
        } => width * height * length * count,
        MemberDims::Column { section, height } => section.area() * height * count,
        MemberDims::Wall {
            length,
            height,
            thickness,
            ..
        } => length * height * thickness * count,
        MemberDims::Floor {
            length,
            width,
            thickness,
        } => length * width * thickness * count,
        MemberDims::Foundation { length, width, depth } => length * width * depth * count,
    };
    num(volume)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentRowResult {
    pub id: u32,
    pub name: String,
    pub resolved: ResolvedMember,
    pub formwork_sqm: f64,
    pub concrete_m3: f64,
    pub rebar: RebarTakeoff,
}

/// Totals of one member type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberTotals {
    pub member: MemberType,
    pub formwork_sqm: f64,
    pub concrete_m3: f64,
    pub rebar_kg: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentSummary {
    /// Member types present in the rows, in [`MemberType::ALL`] order
    pub by_member: Vec<MemberTotals>,
    pub formwork_sqm: f64,
    pub concrete_m3: f64,
    pub rebar_kg: f64,
    pub formwork_with_wastage_sqm: f64,
    pub concrete_with_wastage_m3: f64,
    pub rebar_with_wastage_kg: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ComponentCalculator {
    #[serde(default)]
    pub rows: RowCollection<ComponentRow>,
    #[serde(default)]
    pub formwork_wastage: WastageConfig,
    #[serde(default)]
    pub concrete_wastage: WastageConfig,
    #[serde(default)]
    pub rebar_wastage: WastageConfig,
}

/// Full takeoff of one row
pub fn component_row_result(row: &Row<ComponentRow>, catalog: &PresetCatalog) -> ComponentRowResult {
    let resolved = resolve_member(&row.fields, catalog);
    let concrete_m3 = concrete_volume(&resolved);
    let rebar = resolve_rebar(&resolved, &row.fields.rebar, concrete_m3, catalog);
    ComponentRowResult {
        id: row.id,
        name: row.display_name(),
        formwork_sqm: formwork_area(&resolved),
        concrete_m3,
        rebar,
        resolved,
    }
}

impl ComponentCalculator {
    pub fn row_results(&self, ctx: &TakeoffContext<'_>) -> Vec<ComponentRowResult> {
        self.rows
            .iter()
            .map(|row| component_row_result(row, ctx.catalog))
            .collect()
    }

    fn member_totals(results: &[ComponentRowResult]) -> Vec<MemberTotals> {
        MemberType::ALL
            .into_iter()
            .filter(|member| results.iter().any(|r| r.resolved.member == *member))
            .map(|member| {
                let of_member = || results.iter().filter(move |r| r.resolved.member == member);
                MemberTotals {
                    member,
                    formwork_sqm: sum(of_member().map(|r| r.formwork_sqm)),
                    concrete_m3: sum(of_member().map(|r| r.concrete_m3)),
                    rebar_kg: sum(of_member().map(|r| r.rebar.total_kg)),
                }
            })
            .collect()
    }

    pub fn summary(&self, ctx: &TakeoffContext<'_>) -> ComponentSummary {
        let results = self.row_results(ctx);
        let by_member = Self::member_totals(&results);
        let formwork_sqm = sum(by_member.iter().map(|m| m.formwork_sqm));
        let concrete_m3 = sum(by_member.iter().map(|m| m.concrete_m3));
        let rebar_kg = sum(by_member.iter().map(|m| m.rebar_kg));

        ComponentSummary {
            formwork_with_wastage_sqm: apply_wastage(
                formwork_sqm,
                self.formwork_wastage.effective_rate(MaterialCategory::Formwork, ctx.wastage),
            ),
            concrete_with_wastage_m3: apply_wastage(
                concrete_m3,
                self.concrete_wastage.effective_rate(MaterialCategory::Concrete, ctx.wastage),
            ),
            rebar_with_wastage_kg: apply_wastage(
                rebar_kg,
                self.rebar_wastage.effective_rate(MaterialCategory::Rebar, ctx.wastage),
            ),
            by_member,
            formwork_sqm,
            concrete_m3,
            rebar_kg,
        }
    }
}

impl Calculator for ComponentCalculator {
    fn id(&self) -> CalculatorId {
        CalculatorId::Component
    }

    fn material_lines(&self, ctx: &TakeoffContext<'_>) -> Vec<MaterialLine> {
        let results = self.row_results(ctx);
        let mut lines = Vec::new();
        for totals in Self::member_totals(&results) {
            let code = totals.member.code();
            let name = totals.member.display_name();
            lines.push(MaterialLine::new(
                MaterialCategory::Formwork,
                code,
                format!("{} formwork", name),
                totals.formwork_sqm,
                "m²",
                self.formwork_wastage
                    .apply(totals.formwork_sqm, MaterialCategory::Formwork, ctx.wastage),
            ));
            lines.push(MaterialLine::new(
                MaterialCategory::Concrete,
                code,
                format!("{} concrete", name),
                totals.concrete_m3,
                "m³",
                self.concrete_wastage
                    .apply(totals.concrete_m3, MaterialCategory::Concrete, ctx.wastage),
            ));
            lines.push(MaterialLine::new(
                MaterialCategory::Rebar,
                code,
                format!("{} rebar", name),
                totals.rebar_kg,
                "kg",
                self.rebar_wastage.apply(totals.rebar_kg, MaterialCategory::Rebar, ctx.wastage),
            ));
        }
        lines
    }
}

impl RowCalculator for ComponentCalculator {
    type Row = ComponentRow;

    fn rows(&self) -> &RowCollection<ComponentRow> {
        &self.rows
    }

    fn rows_mut(&mut self) -> &mut RowCollection<ComponentRow> {
        &mut self.rows
    }
}
