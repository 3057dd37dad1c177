//! Planar geometry kernel for board reconstruction.
//!
//! Edges and wires carry circular arcs as polyline bulges, regions are sets of
//! outer and hole polylines, and solids are regions extruded along +Z.

pub mod edge;
pub mod error;
pub mod offset;
pub mod primitives;
pub mod region;
pub mod shape;
pub mod wire;

pub use cavalier_contours::polyline::{BooleanOp, BooleanResultInfo, PlineVertex, Polyline};
pub use edge::Edge;
pub use error::{GeometryError, Result};
pub use offset::{OffsetAlgorithm, OffsetOptions, UnknownAlgorithm, dilate_wire, offset_region};
pub use pcbsolid_core::Point;
pub use region::{Area, Region};
pub use shape::{BoundingBox, Shape};
pub use wire::{Wire, find_wires};
