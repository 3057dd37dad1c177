use pcbsolid_geometry::Shape;
use tracing::{info, info_span};

use crate::builder::{FeatureKind, ShapeBuilder};
use crate::composer::Composer;
use crate::config::ShapeKind;
use crate::error::Result;
use crate::models::{ModelCache, ModelLoader};
use crate::parts::Part;

/// A complete board: its solid, every drilled copper layer, and the
/// component parts that could be loaded.
#[derive(Debug, Clone, Default)]
pub struct Assembly {
    pub board: Option<Shape>,
    pub coppers: Vec<Shape>,
    pub parts: Vec<Part>,
}

impl Assembly {
    /// Board and coppers as one compound.
    #[must_use]
    pub fn shape(&self) -> Shape {
        let mut items: Vec<Shape> = self.board.iter().cloned().collect();
        items.extend(self.coppers.iter().cloned());
        Shape::Compound(items)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.board.is_none() && self.coppers.is_empty() && self.parts.is_empty()
    }
}

impl<B: ShapeBuilder> Composer<'_, B> {
    /// Compose the whole board as solids. Parts are loaded only when a
    /// model cache is given.
    pub fn make<L: ModelLoader>(&mut self, cache: Option<&mut ModelCache<L>>) -> Result<Assembly> {
        let _span = info_span!("pcb").entered();

        let board = self.make_board(ShapeKind::Solid, None)?;
        let coppers = self.make_coppers(ShapeKind::Solid, self.config.copper_thickness, true)?;
        let parts = match cache {
            Some(cache) => self.load_all_parts(cache),
            None => Vec::new(),
        };
        let assembly = Assembly {
            board,
            coppers,
            parts,
        };
        let shape = assembly.shape();
        self.emit(FeatureKind::Compound, "pcb", None, shape);
        info!(
            "pcb done: {} copper layers, {} parts",
            assembly.coppers.len(),
            assembly.parts.len()
        );
        Ok(assembly)
    }
}
