use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use pcbsolid_geometry::OffsetAlgorithm;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Environment override for the component model directory.
pub const MODEL_PATH_ENV: &str = "KISYS3DMOD";

const MODEL_DIRS: [&str; 2] = [
    "/usr/share/kicad/modules/packages3d",
    "/usr/local/share/kicad/modules/packages3d",
];

/// What a compositor produces: bare outlines, filled faces, or extrusions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShapeKind {
    Path,
    #[default]
    Face,
    Solid,
}

impl ShapeKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ShapeKind::Path => "path",
            ShapeKind::Face => "face",
            ShapeKind::Solid => "solid",
        }
    }
}

impl FromStr for ShapeKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "path" => Ok(ShapeKind::Path),
            "face" => Ok(ShapeKind::Face),
            "solid" => Ok(ShapeKind::Solid),
            other => Err(ConfigError::InvalidKind(other.to_string())),
        }
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An RGB color, serialized as `[r, g, b]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color(pub [u8; 3]);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorRole {
    Board,
    Pad,
    Zone,
    Track,
}

/// Colors per role, keyed by copper layer index. Index 0 is the fallback for
/// layers without their own entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    pub board: Color,
    pub pad: BTreeMap<u32, Color>,
    pub zone: BTreeMap<u32, Color>,
    pub track: BTreeMap<u32, Color>,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            board: Color([0, 150, 0]),
            pad: BTreeMap::from([(0, Color([204, 204, 204]))]),
            zone: BTreeMap::from([(0, Color([0, 100, 0]))]),
            track: BTreeMap::from([(0, Color([0, 120, 0]))]),
        }
    }
}

impl Palette {
    #[must_use]
    pub fn color(&self, role: ColorRole, layer: u32) -> Option<Color> {
        let table = match role {
            ColorRole::Board => return Some(self.board),
            ColorRole::Pad => &self.pad,
            ColorRole::Zone => &self.zone,
            ColorRole::Track => &self.track,
        };
        table.get(&layer).or_else(|| table.get(&0)).copied()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ComposeConfig {
    #[serde(with = "algorithm_name")]
    pub offset_algorithm: OffsetAlgorithm,
    pub arc_tolerance: f64,
    pub copper_thickness: f64,
    /// Zero means the board document's own thickness.
    pub board_thickness: f64,
    /// Multiplied by a zone's `min_thickness` to get the outward fill correction.
    pub zone_fill_correction: f64,
    pub min_hole_size: f64,
    /// Zero means no upper bound.
    pub max_hole_size: f64,
    pub oval_holes: bool,
    pub fuse: bool,
    pub fit_arc: bool,
    pub connect_tracks: bool,
    pub model_path: Option<PathBuf>,
    pub palette: Palette,
    pub document: bool,
}

impl Default for ComposeConfig {
    fn default() -> Self {
        Self {
            offset_algorithm: OffsetAlgorithm::ClipperOffset,
            arc_tolerance: 0.01,
            copper_thickness: 0.05,
            board_thickness: 0.0,
            zone_fill_correction: 0.5,
            min_hole_size: 0.0,
            max_hole_size: 0.0,
            oval_holes: true,
            fuse: true,
            fit_arc: true,
            connect_tracks: true,
            model_path: None,
            palette: Palette::default(),
            document: false,
        }
    }
}

impl ComposeConfig {
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(s).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(s).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load from a `.yaml`/`.yml` or JSON file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml" | "yml") => Self::from_yaml_str(&text),
            _ => Self::from_json_str(&text),
        }
    }

    /// The directory searched for component models.
    #[must_use]
    pub fn model_dir(&self) -> PathBuf {
        if let Some(p) = &self.model_path {
            return p.clone();
        }
        if let Some(p) = std::env::var_os(MODEL_PATH_ENV).filter(|p| !p.is_empty()) {
            return PathBuf::from(p);
        }
        let first = PathBuf::from(MODEL_DIRS[0]);
        if first.is_dir() {
            first
        } else {
            PathBuf::from(MODEL_DIRS[1])
        }
    }
}

mod algorithm_name {
    use pcbsolid_geometry::OffsetAlgorithm;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(a: &OffsetAlgorithm, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(a.name())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<OffsetAlgorithm, D::Error> {
        let name = String::deserialize(d)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}
