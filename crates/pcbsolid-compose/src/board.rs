use pcbsolid_core::Point;
use pcbsolid_core::layer::EDGE_CUTS;
use pcbsolid_geometry::edge::{make_arc, make_line};
use pcbsolid_geometry::{Shape, find_wires};
use tracing::{info, info_span};

use crate::builder::{FeatureKind, ShapeBuilder};
use crate::composer::{Composer, path_wires};
use crate::config::{ColorRole, ShapeKind};
use crate::error::Result;
use crate::holes::HoleFilter;

impl<B: ShapeBuilder> Composer<'_, B> {
    /// The board outline from `Edge.Cuts` graphics, with every drill hole
    /// punched through it.
    ///
    /// `thickness` defaults to the configured or document board thickness.
    pub fn make_board(&mut self, kind: ShapeKind, thickness: Option<f64>) -> Result<Option<Shape>> {
        let _span = info_span!("board").entered();

        let mut edges = Vec::new();
        info!("making {} lines", self.board.gr_line.len());
        for l in self.board.gr_line.iter().filter(|l| l.layer == EDGE_CUTS) {
            edges.push(make_line(Point::from_board(l.start), Point::from_board(l.end))?);
        }
        info!("making {} arcs", self.board.gr_arc.len());
        for a in self.board.gr_arc.iter().filter(|a| a.layer == EDGE_CUTS) {
            // `start` is the arc center and `end` its first point.
            edges.push(make_arc(
                Point::from_board(a.start),
                Point::from_board(a.end),
                a.angle,
            )?);
        }
        if edges.is_empty() {
            info!("no board outline");
            return Ok(None);
        }
        let mut wires = find_wires(&edges)?;

        let filter = HoleFilter {
            oval: true,
            max_size: 0.0,
            ..HoleFilter::from_config(self.config)
        };
        if let Some(holes) = self.make_holes(ShapeKind::Path, filter, None, false)? {
            wires.extend(path_wires(&holes));
        }

        let fuse = self.config.fuse;
        let shape = match kind {
            ShapeKind::Path => {
                let outline = Shape::path(wires);
                let outline = if fuse { outline.fuse() } else { outline };
                self.emit(FeatureKind::Feature, "board_wire", None, outline)
            }
            ShapeKind::Face => self.make_path(wires, "board", true, None)?,
            ShapeKind::Solid => {
                let face = self.make_path(wires, "board", true, None)?;
                let height = thickness.unwrap_or_else(|| self.board_thickness());
                match self.make_solid(vec![face], "board", height, false)? {
                    Some(solid) => solid,
                    None => return Ok(None),
                }
            }
        };
        self.set_color(ColorRole::Board);
        info!("board done");
        Ok(Some(shape))
    }
}

#[cfg(test)]
mod tests {
    use crate::{ComposeConfig, Composer, ShapeKind};
    use approx::assert_abs_diff_eq;
    use pcbsolid_core::Board;

    const OUTLINE: &str = r#"{
        "general": { "thickness": 1.6 },
        "layers": [{ "id": 0, "name": "F.Cu", "kind": "signal" }],
        "gr_line": [
            { "start": [0, 0], "end": [20, 0], "layer": "Edge.Cuts" },
            { "start": [20, 10], "end": [20, 0], "layer": "Edge.Cuts" },
            { "start": [20, 10], "end": [0, 10], "layer": "Edge.Cuts" },
            { "start": [0, 0], "end": [0, 10], "layer": "Edge.Cuts" },
            { "start": [5, 5], "end": [6, 5], "layer": "F.SilkS" }
        ],
        "via": [{ "at": [5, 5], "size": 0.8, "drill": 0.4, "layers": ["F.Cu", "B.Cu"] }]
    }"#;

    #[test]
    fn board_face_is_punched_by_vias() {
        let board = Board::from_json_str(OUTLINE).unwrap();
        let config = ComposeConfig::default();
        let mut c = Composer::new(&board, &config);
        let face = c.make_board(ShapeKind::Face, None).unwrap().unwrap();
        let hole = std::f64::consts::PI * 0.2 * 0.2;
        assert_abs_diff_eq!(face.area(), 200.0 - hole, epsilon = 1e-6);

        let solid = c.make_board(ShapeKind::Solid, Some(1.0)).unwrap().unwrap();
        assert_abs_diff_eq!(solid.volume(), 200.0 - hole, epsilon = 1e-6);
    }

    #[test]
    fn board_path_keeps_outline_and_hole_loops() {
        let board = Board::from_json_str(OUTLINE).unwrap();
        let config = ComposeConfig::default();
        let mut c = Composer::new(&board, &config);
        let path = c.make_board(ShapeKind::Path, None).unwrap().unwrap();
        assert_eq!(crate::composer::path_wires(&path).len(), 2);
    }

    #[test]
    fn missing_outline_is_empty_not_an_error() {
        let board = Board::from_json_str(r#"{ "layers": [] }"#).unwrap();
        let config = ComposeConfig::default();
        let mut c = Composer::new(&board, &config);
        assert!(c.make_board(ShapeKind::Solid, None).unwrap().is_none());
    }
}
