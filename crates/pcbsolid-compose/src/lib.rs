//! Board reconstruction: per-layer compositors over the geometry kernel.
//!
//! A [`Composer`] borrows a parsed [`Board`](pcbsolid_core::Board) and a
//! [`ComposeConfig`], selects one layer at a time and builds paths, faces or
//! solids for the board outline, drill holes, pads, tracks and zones. The
//! copper assembler stacks the layers and [`Composer::make`] produces the
//! whole board.

pub mod assembly;
pub mod board;
pub mod builder;
pub mod composer;
pub mod config;
pub mod copper;
pub mod error;
pub mod fill_polygon;
pub mod holes;
pub mod models;
pub mod pads;
pub mod parts;
pub mod thicken;
pub mod tracks;
pub mod zones;

pub use assembly::Assembly;
pub use builder::{
    BareBuilder, Document, DocumentBuilder, DocumentObject, Entity, FeatureKind, ShapeBuilder,
};
pub use composer::Composer;
pub use config::{Color, ColorRole, ComposeConfig, MODEL_PATH_ENV, Palette, ShapeKind};
pub use copper::copper_z_offsets;
pub use error::{ComposeError, ConfigError, ModelError, Result};
pub use fill_polygon::{Rings, extract_rings};
pub use holes::HoleFilter;
pub use models::{FsModelLoader, LoadedModel, ModelCache, ModelLoader};
pub use parts::{Part, PlacedModel};
pub use thicken::{Thickened, thicken};
