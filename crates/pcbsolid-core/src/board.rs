//! Board records as produced by the document parser.
//!
//! All coordinates are in document units with Y pointing down; convert with
//! [`Point::from_board`] before handing them to geometry code.

use serde::{Deserialize, Serialize};

use crate::layer::{LayerError, LayerRef};
use crate::{Layer, Point};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Board {
    #[serde(default)]
    pub general: General,
    #[serde(default)]
    pub layers: Vec<LayerDef>,
    #[serde(default)]
    pub gr_line: Vec<GrLine>,
    #[serde(default)]
    pub gr_arc: Vec<GrArc>,
    #[serde(default)]
    pub module: Vec<Module>,
    #[serde(default)]
    pub via: Vec<Via>,
    #[serde(default)]
    pub segment: Vec<Segment>,
    #[serde(default)]
    pub zone: Vec<Zone>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct General {
    #[serde(default = "default_thickness")]
    pub thickness: f64,
}

impl Default for General {
    fn default() -> Self {
        Self {
            thickness: default_thickness(),
        }
    }
}

fn default_thickness() -> f64 {
    1.6
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerDef {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub kind: String,
}

/// A board-graphics line. Only lines on `Edge.Cuts` take part in the outline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrLine {
    pub start: [f64; 2],
    pub end: [f64; 2],
    pub layer: String,
    #[serde(default)]
    pub width: f64,
}

/// A board-graphics arc. `start` holds the arc center and `end` the arc's
/// start point; `angle` is the sweep in degrees.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrArc {
    pub start: [f64; 2],
    pub end: [f64; 2],
    pub angle: f64,
    pub layer: String,
    #[serde(default)]
    pub width: f64,
}

/// Position with optional rotation, serialized as `[x, y]` or `[x, y, angle]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct At {
    pub x: f64,
    pub y: f64,
    pub angle: f64,
}

impl At {
    #[must_use]
    pub fn position(&self) -> Point {
        Point::from_board([self.x, self.y])
    }
}

impl TryFrom<Vec<f64>> for At {
    type Error = String;

    fn try_from(v: Vec<f64>) -> Result<Self, Self::Error> {
        match v.as_slice() {
            [x, y] => Ok(Self {
                x: *x,
                y: *y,
                angle: 0.0,
            }),
            [x, y, angle] => Ok(Self {
                x: *x,
                y: *y,
                angle: *angle,
            }),
            _ => Err(format!("expected [x, y] or [x, y, angle], got {} values", v.len())),
        }
    }
}

impl From<At> for Vec<f64> {
    fn from(at: At) -> Self {
        if at.angle == 0.0 {
            vec![at.x, at.y]
        } else {
            vec![at.x, at.y, at.angle]
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Module {
    pub layer: String,
    #[serde(default)]
    pub at: At,
    #[serde(default)]
    pub reference: String,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub pad: Vec<Pad>,
    #[serde(default)]
    pub model: Vec<Model>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PadShape {
    Rect,
    Circle,
    Oval,
    Roundrect,
    Trapezoid,
    Custom,
}

impl PadShape {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Rect => "rect",
            Self::Circle => "circle",
            Self::Oval => "oval",
            Self::Roundrect => "roundrect",
            Self::Trapezoid => "trapezoid",
            Self::Custom => "custom",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pad {
    #[serde(default)]
    pub number: String,
    #[serde(default)]
    pub kind: String,
    pub shape: PadShape,
    #[serde(default)]
    pub at: At,
    pub size: [f64; 2],
    #[serde(default)]
    pub layers: Vec<String>,
    #[serde(default)]
    pub drill: Option<Drill>,
    #[serde(default)]
    pub roundrect_rratio: f64,
}

/// Drill size: a plain diameter or an oval `[width, height]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Drill {
    Round(f64),
    Oval { oval: [f64; 2] },
}

/// A 3D model reference. `at` is in inches, `rotate` in degrees.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Model {
    pub path: String,
    #[serde(default)]
    pub at: [f64; 3],
    #[serde(default = "unit_scale")]
    pub scale: [f64; 3],
    #[serde(default)]
    pub rotate: [f64; 3],
}

fn unit_scale() -> [f64; 3] {
    [1.0, 1.0, 1.0]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Via {
    pub at: [f64; 2],
    pub size: f64,
    pub drill: f64,
    #[serde(default)]
    pub layers: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Segment {
    pub start: [f64; 2],
    pub end: [f64; 2],
    pub width: f64,
    pub layer: String,
    #[serde(default)]
    pub net: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Zone {
    pub layer: String,
    #[serde(default)]
    pub net_name: String,
    #[serde(default)]
    pub min_thickness: f64,
    #[serde(default)]
    pub filled_polygon: Vec<FilledPolygon>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilledPolygon {
    pub pts: Vec<[f64; 2]>,
}

impl Board {
    /// Load a board from its JSON serialization.
    pub fn from_json_str(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }

    #[must_use]
    pub fn layer_def(&self, id: u32) -> Option<&LayerDef> {
        self.layers.iter().find(|l| l.id == id)
    }

    #[must_use]
    pub fn layer_index(&self, name: &str) -> Option<u32> {
        self.layers.iter().find(|l| l.name == name).map(|l| l.id)
    }

    /// Resolve an index or a canonical name to a layer of this board.
    pub fn resolve_layer(&self, layer: &LayerRef) -> Result<Layer, LayerError> {
        let def = match layer {
            LayerRef::Index(id) => self.layer_def(*id),
            LayerRef::Name(name) => self.layers.iter().find(|l| &l.name == name),
        };
        def.map(|d| Layer::new(d.id, d.name.clone()))
            .ok_or_else(|| LayerError::NotFound(layer.to_string()))
    }

    /// Copper layers present on the board, front to back.
    #[must_use]
    pub fn copper_layers(&self) -> Vec<Layer> {
        let mut out: Vec<Layer> = self
            .layers
            .iter()
            .filter(|l| l.id <= crate::layer::BOTTOM_COPPER)
            .map(|l| Layer::new(l.id, l.name.clone()))
            .collect();
        out.sort_by_key(|l| l.index);
        out.dedup_by_key(|l| l.index);
        out
    }
}

impl Via {
    /// A via sits on every layer it lists, and on every copper layer between
    /// the two outermost copper layers it lists.
    #[must_use]
    pub fn on_layer(&self, layer: &Layer, board: &Board) -> bool {
        if self.layers.iter().any(|l| l == &layer.name) {
            return true;
        }
        if !layer.is_copper() {
            return false;
        }
        let span: Vec<u32> = self
            .layers
            .iter()
            .filter_map(|name| board.layer_index(name))
            .filter(|id| *id <= crate::layer::BOTTOM_COPPER)
            .collect();
        match (span.iter().min(), span.iter().max()) {
            (Some(lo), Some(hi)) => (*lo..=*hi).contains(&layer.index),
            _ => false,
        }
    }
}
