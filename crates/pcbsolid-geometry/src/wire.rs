use std::collections::VecDeque;

use cavalier_contours::polyline::{PlineSource, PlineVertex, Polyline};

use crate::{Edge, GeometryError, Point, Result};

/// Endpoint distance under which two edges are considered connected.
pub const CONNECT_TOLERANCE: f64 = 1e-4;

/// An ordered chain of connected edges, open or closed.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Wire {
    pub edges: Vec<Edge>,
}

impl Wire {
    #[must_use]
    pub fn new(edges: Vec<Edge>) -> Self {
        Self { edges }
    }

    #[must_use]
    pub fn from_edge(edge: Edge) -> Self {
        Self { edges: vec![edge] }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    #[must_use]
    pub fn start(&self) -> Option<Point> {
        self.edges.first().map(|e| e.start)
    }

    #[must_use]
    pub fn end(&self) -> Option<Point> {
        self.edges.last().map(|e| e.end)
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        match (self.start(), self.end()) {
            (Some(s), Some(e)) => {
                self.edges.len() >= 2 && s.approx_eq(e, CONNECT_TOLERANCE)
            }
            _ => false,
        }
    }

    #[must_use]
    pub fn length(&self) -> f64 {
        self.edges.iter().map(Edge::length).sum()
    }

    /// True when every edge is a straight line on one common line, so the
    /// wire alone does not span a plane.
    #[must_use]
    pub fn is_colinear(&self) -> bool {
        if self.edges.iter().any(Edge::is_arc) {
            return false;
        }
        let Some(first) = self.edges.first() else {
            return true;
        };
        let (ox, oy) = (first.start.x, first.start.y);
        let (dx, dy) = (first.end.x - ox, first.end.y - oy);
        let len = dx.hypot(dy);
        if len == 0.0 {
            return true;
        }
        self.edges.iter().flat_map(|e| [e.start, e.end]).all(|p| {
            let cross = (p.x - ox) * dy - (p.y - oy) * dx;
            (cross / len).abs() <= CONNECT_TOLERANCE
        })
    }

    #[must_use]
    pub fn rotated(&self, angle_deg: f64) -> Self {
        Self::new(self.edges.iter().map(|e| e.rotated(angle_deg)).collect())
    }

    #[must_use]
    pub fn translated(&self, by: Point) -> Self {
        Self::new(self.edges.iter().map(|e| e.translated(by)).collect())
    }

    #[must_use]
    pub fn reversed(&self) -> Self {
        Self::new(self.edges.iter().rev().map(Edge::reversed).collect())
    }

    #[must_use]
    pub fn to_polyline(&self) -> Polyline<f64> {
        let closed = self.is_closed();
        let mut pl = if closed {
            Polyline::new_closed()
        } else {
            Polyline::new()
        };
        for e in &self.edges {
            pl.vertex_data
                .push(PlineVertex::new(e.start.x, e.start.y, e.bulge));
        }
        if !closed && let Some(end) = self.end() {
            pl.vertex_data.push(PlineVertex::new(end.x, end.y, 0.0));
        }
        pl
    }

    #[must_use]
    pub fn from_polyline(pl: &Polyline<f64>) -> Self {
        let n = pl.vertex_count();
        let segs = if pl.is_closed() { n } else { n.saturating_sub(1) };
        let edges = (0..segs)
            .map(|i| {
                let a = pl.at(i);
                let b = pl.at((i + 1) % n);
                Edge::new(Point::new(a.x, a.y), Point::new(b.x, b.y), a.bulge)
            })
            .collect();
        Self { edges }
    }
}

/// Group unordered edges into maximal connected wires.
pub fn find_wires(edges: &[Edge]) -> Result<Vec<Wire>> {
    find_wires_with_tolerance(edges, CONNECT_TOLERANCE)
}

/// Same as [`find_wires`], joining endpoints closer than `tolerance`.
///
/// Every input edge lands in exactly one wire; edges are reversed where
/// needed so consecutive edges share an endpoint.
pub fn find_wires_with_tolerance(edges: &[Edge], tolerance: f64) -> Result<Vec<Wire>> {
    if !(tolerance.is_finite() && tolerance > 0.0) {
        return Err(GeometryError::WireSorting(format!(
            "invalid tolerance {tolerance}"
        )));
    }
    if let Some(bad) = edges.iter().find(|e| !e.is_finite()) {
        return Err(GeometryError::WireSorting(format!(
            "non-finite edge {bad:?}"
        )));
    }

    let mut used = vec![false; edges.len()];
    let mut wires = Vec::new();

    for seed in 0..edges.len() {
        if used[seed] {
            continue;
        }
        used[seed] = true;
        let mut chain: VecDeque<Edge> = VecDeque::from([edges[seed]]);

        let closes = |chain: &VecDeque<Edge>| match (chain.front(), chain.back()) {
            (Some(f), Some(b)) => chain.len() >= 2 && f.start.approx_eq(b.end, tolerance),
            _ => false,
        };

        // Grow the tail, then the head.
        while !closes(&chain) {
            let Some(tail) = chain.back().map(|e| e.end) else {
                break;
            };
            match take_touching(edges, &mut used, tail, tolerance) {
                Some((e, touches_start)) => {
                    chain.push_back(if touches_start { e } else { e.reversed() });
                }
                None => break,
            }
        }
        while !closes(&chain) {
            let Some(head) = chain.front().map(|e| e.start) else {
                break;
            };
            match take_touching(edges, &mut used, head, tolerance) {
                Some((e, touches_start)) => {
                    chain.push_front(if touches_start { e.reversed() } else { e });
                }
                None => break,
            }
        }

        wires.push(Wire::new(chain.into_iter().collect()));
    }

    Ok(wires)
}

/// Claim the first unused edge with an endpoint at `p`. The flag reports
/// whether it was the edge's start.
fn take_touching(
    edges: &[Edge],
    used: &mut [bool],
    p: Point,
    tolerance: f64,
) -> Option<(Edge, bool)> {
    for (i, e) in edges.iter().enumerate() {
        if used[i] {
            continue;
        }
        let touches_start = e.start.approx_eq(p, tolerance);
        if touches_start || e.end.approx_eq(p, tolerance) {
            used[i] = true;
            return Some((*e, touches_start));
        }
    }
    None
}
