//! Structural Member Presets
//!
//! Standard cross-sections for the per-component takeoff. A preset only
//! fixes what a drawing schedule would fix (a column section, a beam
//! section, a wall or slab thickness, a footing size); run lengths,
//! heights and counts come from the row.
//!
//! ## Keys
//!
//! - Columns: `C40x40` (rectangular, cm), `R40` (round, diameter cm)
//! - Beams: `B30x60`; ground beams: `GB40x80` (width x height, cm)
//! - Walls: `W20`; floors: `S15` (thickness, cm)
//! - Parapets: `P120x15` (height x thickness, cm)
//! - Foundations: `F200` (square footing side, cm)

use serde::{Deserialize, Serialize};

/// Structural member types of the per-component takeoff
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MemberType {
    #[default]
    Column,
    Beam,
    GroundBeam,
    Wall,
    Floor,
    Parapet,
    Foundation,
}

impl MemberType {
    pub const ALL: [MemberType; 7] = [
        MemberType::Column,
        MemberType::Beam,
        MemberType::GroundBeam,
        MemberType::Wall,
        MemberType::Floor,
        MemberType::Parapet,
        MemberType::Foundation,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            MemberType::Column => "Column",
            MemberType::Beam => "Beam",
            MemberType::GroundBeam => "Ground beam",
            MemberType::Wall => "Wall",
            MemberType::Floor => "Floor",
            MemberType::Parapet => "Parapet",
            MemberType::Foundation => "Foundation",
        }
    }

    /// Stable machine name, used as record sub-type
    pub fn code(&self) -> &'static str {
        match self {
            MemberType::Column => "column",
            MemberType::Beam => "beam",
            MemberType::GroundBeam => "ground_beam",
            MemberType::Wall => "wall",
            MemberType::Floor => "floor",
            MemberType::Parapet => "parapet",
            MemberType::Foundation => "foundation",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        let key = key.trim().to_lowercase().replace(['-', ' '], "_");
        MemberType::ALL.into_iter().find(|m| m.code() == key || (key == "groundbeam" && *m == MemberType::GroundBeam))
    }

    /// Members whose advanced rebar uses the two-way grid formula
    pub fn is_slab_type(&self) -> bool {
        matches!(
            self,
            MemberType::Floor | MemberType::Wall | MemberType::Parapet | MemberType::Foundation
        )
    }
}

impl std::fmt::Display for MemberType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Column cross-section (meters)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum Section {
    Rect { width: f64, depth: f64 },
    Round { diameter: f64 },
}

impl Section {
    /// Cross-section area (m²)
    pub fn area(&self) -> f64 {
        match *self {
            Section::Rect { width, depth } => width * depth,
            Section::Round { diameter } => std::f64::consts::PI * diameter * diameter / 4.0,
        }
    }

    /// Perimeter (m): π·d for round, 2·(w+d) for rectangular
    pub fn perimeter(&self) -> f64 {
        match *self {
            Section::Rect { width, depth } => 2.0 * (width + depth),
            Section::Round { diameter } => std::f64::consts::PI * diameter,
        }
    }
}

impl Default for Section {
    fn default() -> Self {
        Section::Rect { width: 0.0, depth: 0.0 }
    }
}

/// Dimensions a preset fixes, per member type (meters)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PresetDims {
    Column { section: Section },
    Beam { width: f64, height: f64 },
    Wall { thickness: f64 },
    Floor { thickness: f64 },
    Parapet { height: f64, thickness: f64 },
    Foundation { length: f64, width: f64, depth: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberPreset {
    pub key: String,
    pub member: MemberType,
    pub label: String,
    pub dims: PresetDims,
}

fn cm(value: f64) -> f64 {
    value / 100.0
}

fn column(width_cm: f64, depth_cm: f64) -> MemberPreset {
    MemberPreset {
        key: format!("C{}x{}", width_cm, depth_cm),
        member: MemberType::Column,
        label: format!("{}x{} cm column", width_cm, depth_cm),
        dims: PresetDims::Column {
            section: Section::Rect {
                width: cm(width_cm),
                depth: cm(depth_cm),
            },
        },
    }
}

fn round_column(diameter_cm: f64) -> MemberPreset {
    MemberPreset {
        key: format!("R{}", diameter_cm),
        member: MemberType::Column,
        label: format!("Ø{} cm round column", diameter_cm),
        dims: PresetDims::Column {
            section: Section::Round {
                diameter: cm(diameter_cm),
            },
        },
    }
}

fn beam(member: MemberType, prefix: &str, width_cm: f64, height_cm: f64) -> MemberPreset {
    MemberPreset {
        key: format!("{}{}x{}", prefix, width_cm, height_cm),
        member,
        label: format!("{}x{} cm {}", width_cm, height_cm, member.display_name().to_lowercase()),
        dims: PresetDims::Beam {
            width: cm(width_cm),
            height: cm(height_cm),
        },
    }
}

fn wall(thickness_cm: f64) -> MemberPreset {
    MemberPreset {
        key: format!("W{}", thickness_cm),
        member: MemberType::Wall,
        label: format!("{} cm RC wall", thickness_cm),
        dims: PresetDims::Wall {
            thickness: cm(thickness_cm),
        },
    }
}

fn floor(thickness_cm: f64) -> MemberPreset {
    MemberPreset {
        key: format!("S{}", thickness_cm),
        member: MemberType::Floor,
        label: format!("{} cm slab", thickness_cm),
        dims: PresetDims::Floor {
            thickness: cm(thickness_cm),
        },
    }
}

fn parapet(height_cm: f64, thickness_cm: f64) -> MemberPreset {
    MemberPreset {
        key: format!("P{}x{}", height_cm, thickness_cm),
        member: MemberType::Parapet,
        label: format!("{} cm high, {} cm parapet", height_cm, thickness_cm),
        dims: PresetDims::Parapet {
            height: cm(height_cm),
            thickness: cm(thickness_cm),
        },
    }
}

fn footing(side_cm: f64, depth_cm: f64) -> MemberPreset {
    MemberPreset {
        key: format!("F{}", side_cm),
        member: MemberType::Foundation,
        label: format!("{0}x{0}x{1} cm spread footing", side_cm, depth_cm),
        dims: PresetDims::Foundation {
            length: cm(side_cm),
            width: cm(side_cm),
            depth: cm(depth_cm),
        },
    }
}

pub fn standard_presets() -> Vec<MemberPreset> {
    vec![
        column(30.0, 30.0),
        column(40.0, 40.0),
        column(50.0, 50.0),
        column(60.0, 60.0),
        column(40.0, 60.0),
        round_column(30.0),
        round_column(40.0),
        round_column(50.0),
        round_column(60.0),
        beam(MemberType::Beam, "B", 20.0, 40.0),
        beam(MemberType::Beam, "B", 25.0, 50.0),
        beam(MemberType::Beam, "B", 30.0, 60.0),
        beam(MemberType::Beam, "B", 40.0, 70.0),
        beam(MemberType::GroundBeam, "GB", 30.0, 60.0),
        beam(MemberType::GroundBeam, "GB", 40.0, 80.0),
        beam(MemberType::GroundBeam, "GB", 50.0, 100.0),
        wall(15.0),
        wall(18.0),
        wall(20.0),
        wall(25.0),
        floor(12.0),
        floor(15.0),
        floor(18.0),
        parapet(90.0, 12.0),
        parapet(110.0, 15.0),
        parapet(120.0, 15.0),
        footing(150.0, 50.0),
        footing(200.0, 60.0),
        footing(250.0, 70.0),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_geometry() {
        let round = Section::Round { diameter: 0.4 };
        assert!((round.perimeter() - 1.2566).abs() < 0.001);
        assert!((round.area() - 0.12566).abs() < 0.0001);

        let rect = Section::Rect { width: 0.3, depth: 0.5 };
        assert!((rect.perimeter() - 1.6).abs() < 1e-12);
        assert!((rect.area() - 0.15).abs() < 1e-12);
    }

    #[test]
    fn test_preset_keys() {
        let presets = standard_presets();
        let keys: Vec<&str> = presets.iter().map(|p| p.key.as_str()).collect();
        assert!(keys.contains(&"C40x40"));
        assert!(keys.contains(&"R40"));
        assert!(keys.contains(&"GB40x80"));
        assert!(keys.contains(&"P120x15"));
        assert!(keys.contains(&"F200"));
    }

    #[test]
    fn test_preset_dims_match_member() {
        for preset in standard_presets() {
            let ok = match (preset.member, preset.dims) {
                (MemberType::Column, PresetDims::Column { .. }) => true,
                (MemberType::Beam | MemberType::GroundBeam, PresetDims::Beam { .. }) => true,
                (MemberType::Wall, PresetDims::Wall { .. }) => true,
                (MemberType::Floor, PresetDims::Floor { .. }) => true,
                (MemberType::Parapet, PresetDims::Parapet { .. }) => true,
                (MemberType::Foundation, PresetDims::Foundation { .. }) => true,
                _ => false,
            };
            assert!(ok, "{} has mismatched dims", preset.key);
        }
    }

    #[test]
    fn test_member_from_key() {
        assert_eq!(MemberType::from_key("ground-beam"), Some(MemberType::GroundBeam));
        assert_eq!(MemberType::from_key("groundbeam"), Some(MemberType::GroundBeam));
        assert_eq!(MemberType::from_key(" Column "), Some(MemberType::Column));
        assert_eq!(MemberType::from_key("truss"), None);
    }
}
