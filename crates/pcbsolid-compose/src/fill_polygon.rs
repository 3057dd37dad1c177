//! Hole extraction for zone fill polygons.
//!
//! A filled polygon is stored as a single ring. Each hole is reached by a
//! "double edge": the ring walks into the hole along an edge, around the hole,
//! and back out along the same edge in the opposite direction. A hole may lead
//! to further holes the same way.
//!
//! ```text
//!  ---------------------------
//!  |    -----      ----      |
//!  |    |   |======|  |      |
//!  |====|   |      |  |      |
//!  |    -----      ----      |
//!  ---------------------------
//! ```
//!
//! Both members of a double edge must have equal length with no branch in
//! between; inputs breaking that are decomposed incorrectly without notice.

use std::collections::HashMap;

use pcbsolid_geometry::edge::make_line;
use pcbsolid_geometry::{Edge, Point, Result};

use crate::composer::bucket_key;

type EdgeKey = (u64, u64, u64, u64);

/// The rings recovered from one filled polygon.
#[derive(Debug, Clone, Default)]
pub struct Rings {
    pub outer: Vec<Edge>,
    pub holes: Vec<Vec<Edge>>,
}

fn key(a: Point, b: Point) -> EdgeKey {
    (bucket_key(a.x), bucket_key(a.y), bucket_key(b.x), bucket_key(b.y))
}

/// Split a filled polygon ring into its outer boundary and hole rings.
/// Double edges appear in neither.
pub fn extract_rings(points: &[Point]) -> Result<Rings> {
    let Some(&first) = points.first() else {
        return Ok(Rings::default());
    };
    let mut pts = points.to_vec();
    pts.push(first);

    // Later duplicates of a directed edge win, matching a plain map insert.
    let mut table: HashMap<EdgeKey, usize> = HashMap::new();
    for i in 0..pts.len() - 1 {
        table.insert(key(pts[i], pts[i + 1]), i);
    }

    let (outer, holes) = extract(&pts, &mut table, 0, pts.len() - 1)?;
    Ok(Rings { outer, holes })
}

/// Walk edges `start..end` of the closed ring, returning the boundary edges
/// of this level and every hole found below it.
fn extract(
    pts: &[Point],
    table: &mut HashMap<EdgeKey, usize>,
    mut start: usize,
    end: usize,
) -> Result<(Vec<Edge>, Vec<Vec<Edge>>)> {
    let mut edges = Vec::new();
    let mut holes = Vec::new();
    while start < end {
        let (a, b) = (pts[start], pts[start + 1]);
        let reverse = key(b, a);
        match table.get(&reverse).copied() {
            Some(j) if j > start && j < end => {
                table.remove(&reverse);
                let (hole, nested) = extract(pts, table, start + 1, j)?;
                if !hole.is_empty() {
                    holes.push(hole);
                }
                holes.extend(nested);
                start = j + 1;
            }
            _ => {
                if a != b {
                    edges.push(make_line(a, b)?);
                }
                start += 1;
            }
        }
    }
    Ok((edges, holes))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    fn touches(edges: &[Edge], a: Point, b: Point) -> bool {
        edges
            .iter()
            .any(|e| (e.start == a && e.end == b) || (e.start == b && e.end == a))
    }

    #[test]
    fn plain_ring_has_no_holes() {
        let rings = extract_rings(&[p(0.0, 0.0), p(1.0, 0.0), p(1.0, 1.0), p(0.0, 1.0)]).unwrap();
        assert_eq!(rings.outer.len(), 4);
        assert!(rings.holes.is_empty());
    }

    #[test]
    fn already_closed_ring_drops_the_repeat() {
        let rings = extract_rings(&[
            p(0.0, 0.0),
            p(1.0, 0.0),
            p(1.0, 1.0),
            p(0.0, 0.0),
        ])
        .unwrap();
        assert_eq!(rings.outer.len(), 3);
    }

    #[test]
    fn empty_ring() {
        let rings = extract_rings(&[]).unwrap();
        assert!(rings.outer.is_empty() && rings.holes.is_empty());
    }

    fn closed(edges: &[Edge]) -> bool {
        edges.windows(2).all(|w| w[0].end == w[1].start)
            && edges.first().map(|e| e.start) == edges.last().map(|e| e.end)
    }

    #[test]
    fn spike_digs_one_hole() {
        let pts = [
            p(0.0, 0.0),
            p(10.0, 0.0),
            p(10.0, 10.0),
            p(0.0, 10.0),
            p(0.0, 0.0),
            p(3.0, 3.0),
            p(3.0, 7.0),
            p(7.0, 7.0),
            p(7.0, 3.0),
            p(3.0, 3.0),
        ];
        let rings = extract_rings(&pts).unwrap();
        assert_eq!(rings.outer.len(), 4);
        assert_eq!(rings.holes.len(), 1);
        assert_eq!(rings.holes[0].len(), 4);
        assert!(closed(&rings.outer));
        assert!(closed(&rings.holes[0]));
        let spike = (p(0.0, 0.0), p(3.0, 3.0));
        assert!(!touches(&rings.outer, spike.0, spike.1));
        assert!(!touches(&rings.holes[0], spike.0, spike.1));
    }

    #[test]
    fn hole_leading_to_another_hole_recurses() {
        let pts = [
            p(0.0, 0.0),
            p(10.0, 0.0),
            p(10.0, 10.0),
            p(0.0, 10.0),
            p(0.0, 0.0),
            p(2.0, 2.0),
            p(2.0, 4.0),
            p(4.0, 4.0),
            p(6.0, 4.0),
            p(6.0, 6.0),
            p(8.0, 6.0),
            p(8.0, 4.0),
            p(6.0, 4.0),
            p(4.0, 4.0),
            p(4.0, 2.0),
            p(2.0, 2.0),
        ];
        let rings = extract_rings(&pts).unwrap();
        assert_eq!(rings.outer.len(), 4);
        assert_eq!(rings.holes.len(), 2);
        for hole in &rings.holes {
            assert_eq!(hole.len(), 4);
            assert!(closed(hole));
            assert!(!touches(hole, p(4.0, 4.0), p(6.0, 4.0)));
            assert!(!touches(hole, p(0.0, 0.0), p(2.0, 2.0)));
        }
        assert!(touches(&rings.holes[0], p(2.0, 2.0), p(2.0, 4.0)));
        assert!(touches(&rings.holes[1], p(8.0, 6.0), p(8.0, 4.0)));
    }
}
