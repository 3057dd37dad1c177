//! Read-only board record model shared by the geometry pipeline.

pub mod board;
pub mod layer;
pub mod point;

pub use board::{
    At, Board, Drill, FilledPolygon, General, GrArc, GrLine, LayerDef, Model, Module, Pad,
    PadShape, Segment, Via, Zone,
};
pub use layer::{Layer, LayerError, LayerRef, Side};
pub use point::Point;
