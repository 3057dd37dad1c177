use pcbsolid_core::layer::TOP_COPPER;
use pcbsolid_core::{Board, Layer, LayerRef};
use pcbsolid_geometry::{OffsetOptions, Shape, Wire};

use crate::builder::{BareBuilder, Entity, FeatureKind, ShapeBuilder};
use crate::config::{ColorRole, ComposeConfig};
use crate::error::Result;

/// Composes the shapes of one board, one layer at a time.
///
/// The compositors live in their own modules as `impl` blocks on this type:
/// board, holes, pads, tracks, zones, copper and parts.
pub struct Composer<'a, B: ShapeBuilder = BareBuilder> {
    pub(crate) board: &'a Board,
    pub(crate) config: &'a ComposeConfig,
    pub(crate) layer: Layer,
    pub(crate) builder: B,
}

impl<'a> Composer<'a, BareBuilder> {
    #[must_use]
    pub fn new(board: &'a Board, config: &'a ComposeConfig) -> Self {
        Self::with_builder(board, config, BareBuilder)
    }
}

impl<'a, B: ShapeBuilder> Composer<'a, B> {
    /// Starts on the front copper layer.
    pub fn with_builder(board: &'a Board, config: &'a ComposeConfig, builder: B) -> Self {
        let layer = board
            .resolve_layer(&LayerRef::Index(TOP_COPPER))
            .unwrap_or_else(|_| Layer::new(TOP_COPPER, "F.Cu"));
        Self {
            board,
            config,
            layer,
            builder,
        }
    }

    /// Select the layer later compositor calls work on, by index or name.
    pub fn set_layer(&mut self, layer: impl Into<LayerRef>) -> Result<()> {
        self.layer = self.board.resolve_layer(&layer.into())?;
        Ok(())
    }

    #[must_use]
    pub fn layer(&self) -> &Layer {
        &self.layer
    }

    #[must_use]
    pub fn board(&self) -> &'a Board {
        self.board
    }

    #[must_use]
    pub fn builder(&self) -> &B {
        &self.builder
    }

    pub fn into_builder(self) -> B {
        self.builder
    }

    /// Board thickness: the configured one, else the document's.
    #[must_use]
    pub fn board_thickness(&self) -> f64 {
        if self.config.board_thickness > 0.0 {
            self.config.board_thickness
        } else {
            self.board.general.thickness
        }
    }

    pub(crate) fn offset_options(&self, fit_arc: bool, fill: bool, fuse: bool) -> OffsetOptions {
        OffsetOptions {
            algorithm: self.config.offset_algorithm.resolve(fit_arc),
            fill,
            open_result: true,
            intersection: fuse,
            arc_tolerance: self.config.arc_tolerance,
        }
    }

    pub(crate) fn emit(
        &mut self,
        kind: FeatureKind,
        name: &str,
        label: Option<&str>,
        shape: Shape,
    ) -> Shape {
        self.builder.record(Entity {
            kind,
            name,
            layer: &self.layer.name,
            label,
            shape: &shape,
        });
        shape
    }

    pub(crate) fn set_color(&mut self, role: ColorRole) {
        if let Some(c) = self.config.palette.color(role, self.layer.index) {
            self.builder.set_color(c);
        }
    }

    /// Group shapes, or union them when `fuse` is set. A single unfused shape
    /// is returned as it is.
    pub(crate) fn make_compound(
        &mut self,
        mut shapes: Vec<Shape>,
        name: &str,
        label: Option<&str>,
        fuse: bool,
    ) -> Option<Shape> {
        if shapes.is_empty() {
            return None;
        }
        if fuse {
            let fused = Shape::compound(shapes).fuse();
            return Some(self.emit(FeatureKind::Offset, &format!("{name}_fuse"), label, fused));
        }
        if shapes.len() == 1 {
            return shapes.pop();
        }
        Some(self.emit(
            FeatureKind::Compound,
            &format!("{name}_combo"),
            label,
            Shape::Compound(shapes),
        ))
    }

    pub(crate) fn make_offset(
        &mut self,
        shape: &Shape,
        name: &str,
        delta: f64,
        fill: bool,
        fuse: bool,
        label: Option<&str>,
    ) -> Result<Shape> {
        let opts = self.offset_options(self.config.fit_arc, fill, fuse);
        let out = shape.offset(delta, &opts)?;
        Ok(self.emit(FeatureKind::Offset, name, label, out))
    }

    /// Wires as a path, or the face they bound when `fill` is set.
    pub(crate) fn make_path(
        &mut self,
        wires: Vec<Wire>,
        name: &str,
        fill: bool,
        label: Option<&str>,
    ) -> Result<Shape> {
        if !fill {
            return Ok(self.emit(
                FeatureKind::Feature,
                &format!("{name}_wire"),
                label,
                Shape::path(wires),
            ));
        }
        let face = Shape::face_from_wires(&wires)?;
        Ok(self.emit(FeatureKind::Face, &format!("{name}_face"), label, face))
    }

    pub(crate) fn make_solid(
        &mut self,
        shapes: Vec<Shape>,
        name: &str,
        height: f64,
        fuse: bool,
    ) -> Result<Option<Shape>> {
        let Some(base) = self.make_compound(shapes, name, None, fuse) else {
            return Ok(None);
        };
        let solid = base.extrude(height)?;
        Ok(Some(self.emit(
            FeatureKind::Extrusion,
            &format!("{name}_solid"),
            None,
            solid,
        )))
    }

    pub(crate) fn make_cut(&mut self, base: &Shape, tool: &Shape, name: &str) -> Result<Shape> {
        let cut = base.cut(tool)?;
        Ok(self.emit(FeatureKind::Cut, name, None, cut))
    }
}

/// Rotate about Z, then move.
pub(crate) fn place(shape: Shape, at: [f64; 3], angle_deg: f64) -> Shape {
    let shape = if angle_deg != 0.0 {
        shape.rotated_z(angle_deg)
    } else {
        shape
    };
    shape.translated(at)
}

/// Every wire of the path pieces of `shape`.
pub(crate) fn path_wires(shape: &Shape) -> Vec<Wire> {
    shape
        .leaves()
        .into_iter()
        .filter_map(|s| match s {
            Shape::Path { wires, .. } => Some(wires.iter().cloned()),
            _ => None,
        })
        .flatten()
        .collect()
}

/// Map `f64` keys to hashable bucket keys; `-0.0` and `0.0` share a bucket.
pub(crate) fn bucket_key(v: f64) -> u64 {
    (v + 0.0).to_bits()
}
