use indexmap::IndexMap;
use pcbsolid_core::Point;
use pcbsolid_geometry::edge::{MIN_EDGE_LENGTH, make_line};
use pcbsolid_geometry::primitives::make_circle;
use pcbsolid_geometry::{Edge, Region, Shape, Wire, find_wires};
use tracing::{debug, info, info_span};

use crate::builder::{FeatureKind, ShapeBuilder};
use crate::composer::{Composer, bucket_key};
use crate::config::{ColorRole, ShapeKind};
use crate::error::Result;
use crate::thicken::{stadiums, thicken};

#[derive(Default)]
struct Bucket {
    width: f64,
    edges: Vec<Edge>,
    dots: Vec<Point>,
}

impl<B: ShapeBuilder> Composer<'_, B> {
    /// Tracks of the current layer, thickened to their width.
    ///
    /// Segments of equal width are reconnected into wires and dilated
    /// together; with `connect_tracks` unset every segment is thickened on
    /// its own.
    pub fn make_tracks(&mut self, kind: ShapeKind, thickness: f64, fuse: bool) -> Result<Option<Shape>> {
        let _span = info_span!("tracks", layer = %self.layer.name).entered();

        let mut buckets: IndexMap<u64, Bucket> = IndexMap::new();
        let mut count = 0usize;
        for s in self.board.segment.iter().filter(|s| s.layer == self.layer.name) {
            count += 1;
            let bucket = buckets.entry(bucket_key(s.width)).or_insert_with(|| Bucket {
                width: s.width,
                ..Bucket::default()
            });
            let (start, end) = (Point::from_board(s.start), Point::from_board(s.end));
            if start.distance(end) <= MIN_EDGE_LENGTH {
                bucket.dots.push(start);
            } else {
                bucket.edges.push(make_line(start, end)?);
            }
        }
        info!("tracks: {count}, widths: {}", buckets.len());
        if buckets.is_empty() {
            return Ok(None);
        }

        let connect = self.config.connect_tracks;
        let opts = self.offset_options(self.config.fit_arc, true, true);
        let mut objs = Vec::new();
        for bucket in buckets.into_values() {
            let half_width = bucket.width * 0.5;
            debug!(
                "{} segments of width {}, {} dots",
                bucket.edges.len(),
                bucket.width,
                bucket.dots.len()
            );
            let mut region = if bucket.edges.is_empty() {
                Region::empty()
            } else if connect {
                let wires = find_wires(&bucket.edges)?;
                thicken(&wires, half_width, &opts)?.into_region()
            } else {
                let wires: Vec<Wire> = bucket.edges.into_iter().map(Wire::from_edge).collect();
                stadiums(&wires, half_width)?
            };
            for dot in bucket.dots {
                let outline = make_circle(bucket.width).translated(dot);
                region = region.union(&Region::from_wires(&[outline])?);
            }

            let shape = match kind {
                ShapeKind::Path => Shape::path(region.boundaries()),
                ShapeKind::Face | ShapeKind::Solid => Shape::face(region),
            };
            let label = bucket.width.to_string();
            objs.push(self.emit(FeatureKind::Offset, "track", Some(&label), shape));
        }

        let out = if kind == ShapeKind::Solid {
            self.make_solid(objs, "tracks", thickness, fuse)?
        } else {
            self.make_compound(objs, "tracks", None, fuse)
        };
        self.set_color(ColorRole::Track);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use crate::{ComposeConfig, Composer, ShapeKind};
    use approx::assert_abs_diff_eq;
    use pcbsolid_core::Board;
    use std::f64::consts::PI;

    const TRACKS: &str = r#"{
        "layers": [
            { "id": 0, "name": "F.Cu", "kind": "signal" },
            { "id": 31, "name": "B.Cu", "kind": "signal" }
        ],
        "segment": [
            { "start": [0, 0], "end": [10, 0], "width": 1, "layer": "F.Cu" },
            { "start": [10, 0], "end": [10, 10], "width": 1, "layer": "F.Cu" },
            { "start": [0, 20], "end": [5, 20], "width": 0.5, "layer": "F.Cu" },
            { "start": [0, 40], "end": [0, 40], "width": 2, "layer": "F.Cu" },
            { "start": [0, 0], "end": [0, 5], "width": 1, "layer": "B.Cu" }
        ]
    }"#;

    // A bent 10 + 10 track of width 1, a straight 5-long track of width 0.5,
    // and a dot of diameter 2.
    fn expected_front() -> f64 {
        let bent = 20.0 - 0.25 + PI / 4.0 + PI / 16.0;
        let straight = 5.0 * 0.5 + PI * 0.0625;
        bent + straight + PI
    }

    #[test]
    fn tracks_are_bucketed_and_thickened() {
        let board = Board::from_json_str(TRACKS).unwrap();
        let config = ComposeConfig::default();
        let mut c = Composer::new(&board, &config);
        let front = c.make_tracks(ShapeKind::Face, 0.05, false).unwrap().unwrap();
        assert_eq!(front.leaves().len(), 3);
        assert_abs_diff_eq!(front.area(), expected_front(), epsilon = 1e-6);

        let solid = c.make_tracks(ShapeKind::Solid, 0.05, true).unwrap().unwrap();
        assert_abs_diff_eq!(solid.volume(), expected_front() * 0.05, epsilon = 1e-6);
    }

    #[test]
    fn unconnected_tracks_cover_the_same_copper() {
        let board = Board::from_json_str(TRACKS).unwrap();
        let config = ComposeConfig {
            connect_tracks: false,
            ..ComposeConfig::default()
        };
        let mut c = Composer::new(&board, &config);
        let front = c.make_tracks(ShapeKind::Face, 0.05, false).unwrap().unwrap();
        assert_abs_diff_eq!(front.area(), expected_front(), epsilon = 1e-6);
    }

    #[test]
    fn tracks_stay_on_their_layer() {
        let board = Board::from_json_str(TRACKS).unwrap();
        let config = ComposeConfig::default();
        let mut c = Composer::new(&board, &config);
        c.set_layer(31).unwrap();
        let back = c.make_tracks(ShapeKind::Path, 0.05, false).unwrap().unwrap();
        assert_eq!(crate::composer::path_wires(&back).len(), 1);

        let empty = Board::from_json_str(r#"{ "layers": [{ "id": 0, "name": "F.Cu" }] }"#).unwrap();
        let mut c = Composer::new(&empty, &config);
        assert!(c.make_tracks(ShapeKind::Face, 0.05, false).unwrap().is_none());
    }
}
