use cavalier_contours::core::math::Vector2;
use cavalier_contours::polyline::{
    BooleanOp, BooleanResultInfo, PlineOrientation, PlineSource, PlineSourceMut, PlineVertex,
    Polyline,
};

use crate::{GeometryError, Point, Result, Wire};

/// Relative area difference under which two loops count as the same loop.
const AREA_EPS: f64 = 1e-9;

/// One connected filled area: a counter-clockwise outer loop and clockwise holes.
#[derive(Debug, Clone)]
pub struct Area {
    pub outer: Polyline<f64>,
    pub holes: Vec<Polyline<f64>>,
}

/// A planar region made of disjoint areas. Islands inside a hole are separate
/// areas.
#[derive(Debug, Clone, Default)]
pub struct Region {
    pub areas: Vec<Area>,
}

impl Area {
    fn new(outer: Polyline<f64>, holes: Vec<Polyline<f64>>) -> Self {
        let mut outer = normalize_winding(vec![simplify(outer)], PlineOrientation::CounterClockwise);
        let holes = normalize_winding(
            holes.into_iter().filter(is_loop).map(simplify).collect(),
            PlineOrientation::Clockwise,
        );
        Self {
            outer: outer.pop().unwrap_or_else(Polyline::new_closed),
            holes,
        }
    }

    #[must_use]
    pub fn area(&self) -> f64 {
        self.outer.area().abs() - self.holes.iter().map(|h| h.area().abs()).sum::<f64>()
    }

    /// Outer loop followed by holes.
    pub fn loops(&self) -> impl Iterator<Item = &Polyline<f64>> {
        std::iter::once(&self.outer).chain(self.holes.iter())
    }

    fn inside_hole_of(&self, other: &Area) -> bool {
        other.holes.iter().any(|h| contains(h, &self.outer))
    }
}

impl Region {
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// A region from outer loops only; overlapping loops are merged.
    #[must_use]
    pub fn union_all(plines: Vec<Polyline<f64>>) -> Self {
        let areas = plines
            .into_iter()
            .filter(is_loop)
            .map(|p| Area::new(p, vec![]))
            .collect();
        Self {
            areas: union_areas(areas),
        }
    }

    /// Build a face from closed wires. Loops nested an odd number of times
    /// become holes of the loop directly around them, even-nested loops become
    /// islands.
    pub fn from_wires(wires: &[Wire]) -> Result<Self> {
        if let Some(open) = wires.iter().find(|w| !w.is_closed()) {
            return Err(GeometryError::InvalidEdge(format!(
                "cannot fill an open wire of {} edges",
                open.len()
            )));
        }
        let loops: Vec<Polyline<f64>> = wires
            .iter()
            .map(Wire::to_polyline)
            .filter(|p| is_loop(p) && p.area().abs() > AREA_EPS)
            .collect();

        let depth: Vec<usize> = (0..loops.len())
            .map(|i| {
                (0..loops.len())
                    .filter(|&j| j != i && encloses(&loops[j], &loops[i]))
                    .count()
            })
            .collect();

        let mut areas: Vec<Area> = Vec::new();
        let mut owners: Vec<usize> = Vec::new();
        for (i, pl) in loops.iter().enumerate() {
            if depth[i] % 2 == 0 {
                areas.push(Area::new(pl.clone(), vec![]));
                owners.push(i);
            }
        }
        for (i, pl) in loops.iter().enumerate() {
            if depth[i] % 2 == 0 {
                continue;
            }
            // The owning outer is the enclosing even loop one level up.
            let owner = owners
                .iter()
                .position(|&o| depth[o] + 1 == depth[i] && encloses(&loops[o], pl));
            if let Some(k) = owner {
                areas[k].holes.push(pl.clone());
            }
        }
        let areas = areas
            .into_iter()
            .map(|a| {
                let holes = union_pline_set(a.holes);
                Area::new(a.outer, holes)
            })
            .collect();
        Ok(Self {
            areas: union_areas(areas),
        })
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.areas.is_empty()
    }

    #[must_use]
    pub fn area(&self) -> f64 {
        self.areas.iter().map(Area::area).sum()
    }

    /// Every boundary loop: outers counter-clockwise, holes clockwise.
    #[must_use]
    pub fn boundaries(&self) -> Vec<Wire> {
        self.areas
            .iter()
            .flat_map(Area::loops)
            .map(Wire::from_polyline)
            .collect()
    }

    #[must_use]
    pub fn union(&self, other: &Region) -> Region {
        let mut areas = self.areas.clone();
        areas.extend(other.areas.iter().cloned());
        Region {
            areas: union_areas(areas),
        }
    }

    #[must_use]
    pub fn subtract(&self, other: &Region) -> Region {
        let mut areas = self.areas.clone();
        for cutter in &other.areas {
            let mut next = Vec::new();
            for a in areas {
                next.extend(subtract_area(a, cutter));
            }
            areas = next;
        }
        Region { areas }
    }

    #[must_use]
    pub fn intersect(&self, other: &Region) -> Region {
        let mut out = Vec::new();
        for a in &self.areas {
            for b in &other.areas {
                out.extend(intersect_area(a, b));
            }
        }
        Region {
            areas: union_areas(out),
        }
    }

    /// Subtract plain loops, as used for drill cutters.
    pub fn subtract_all(&mut self, cutters: &[Polyline<f64>]) {
        for c in cutters.iter().filter(|c| is_loop(c)) {
            let mut next = Vec::new();
            for a in std::mem::take(&mut self.areas) {
                next.extend(subtract_pline(a, c));
            }
            self.areas = next;
        }
    }

    #[must_use]
    pub fn translated(&self, by: Point) -> Region {
        self.map_vertices(|p| p.translated(by))
    }

    #[must_use]
    pub fn rotated(&self, angle_deg: f64) -> Region {
        self.map_vertices(|p| p.rotated(angle_deg))
    }

    fn map_vertices(&self, f: impl Fn(Point) -> Point) -> Region {
        let map = |pl: &Polyline<f64>| {
            let mut out = Polyline::new_closed();
            for v in &pl.vertex_data {
                let p = f(Point::new(v.x, v.y));
                out.vertex_data.push(PlineVertex::new(p.x, p.y, v.bulge));
            }
            out
        };
        Region {
            areas: self
                .areas
                .iter()
                .map(|a| Area {
                    outer: map(&a.outer),
                    holes: a.holes.iter().map(&map).collect(),
                })
                .collect(),
        }
    }

    /// The same region with arcs replaced by chords within `tolerance`.
    #[must_use]
    pub fn flattened(&self, tolerance: f64) -> Region {
        let flat = |pl: &Polyline<f64>| {
            let mut out = Polyline::new_closed();
            for e in Wire::from_polyline(pl).edges {
                for p in e.flatten(tolerance) {
                    out.vertex_data.push(PlineVertex::new(p.x, p.y, 0.0));
                }
            }
            out
        };
        Region {
            areas: self
                .areas
                .iter()
                .map(|a| Area {
                    outer: flat(&a.outer),
                    holes: a.holes.iter().map(&flat).collect(),
                })
                .collect(),
        }
    }

    /// `(min_x, min_y, max_x, max_y)` over all outer loops.
    #[must_use]
    pub fn extents(&self) -> Option<(f64, f64, f64, f64)> {
        self.areas
            .iter()
            .filter_map(|a| a.outer.extents())
            .map(|e| (e.min_x, e.min_y, e.max_x, e.max_y))
            .reduce(|a, b| (a.0.min(b.0), a.1.min(b.1), a.2.max(b.2), a.3.max(b.3)))
    }
}

fn is_loop(p: &Polyline<f64>) -> bool {
    p.is_closed() && p.vertex_count() >= 2
}

fn sample_point(p: &Polyline<f64>) -> Vector2<f64> {
    let v = p.at(0);
    let w = p.at(1 % p.vertex_count());
    if v.bulge_is_zero() {
        Vector2::new((v.x + w.x) / 2.0, (v.y + w.y) / 2.0)
    } else {
        Vector2::new(v.x, v.y)
    }
}

/// `outer` strictly wraps `inner`: a point of `inner` lies inside `outer` and
/// `outer` is the larger of the two.
fn encloses(outer: &Polyline<f64>, inner: &Polyline<f64>) -> bool {
    outer.area().abs() > inner.area().abs() * (1.0 + AREA_EPS)
        && outer.winding_number(sample_point(inner)) != 0
}

/// `outer` covers all of `inner`.
fn contains(outer: &Polyline<f64>, inner: &Polyline<f64>) -> bool {
    if !encloses(outer, inner) {
        return false;
    }
    let res = ccw(outer).boolean(&ccw(inner), BooleanOp::Or);
    if matches!(res.result_info, BooleanResultInfo::InvalidInput) || res.pos_plines.len() != 1 {
        return false;
    }
    let merged = res.pos_plines[0].pline.area().abs();
    let own = outer.area().abs();
    (merged - own).abs() <= own.max(1.0) * AREA_EPS * 1e3
}

fn union_areas(areas: Vec<Area>) -> Vec<Area> {
    let mut out: Vec<Area> = Vec::new();
    for a in areas {
        let mut cur = a;
        while let Some(idx) = out.iter().position(|b| overlaps(&cur, b)) {
            let other = out.swap_remove(idx);
            cur = merge_areas(cur, &other);
        }
        out.push(cur);
    }
    out
}

fn overlaps(a: &Area, b: &Area) -> bool {
    let res = a.outer.boolean(&b.outer, BooleanOp::Or);
    match res.result_info {
        BooleanResultInfo::Disjoint | BooleanResultInfo::InvalidInput => false,
        _ => !a.inside_hole_of(b) && !b.inside_hole_of(a),
    }
}

fn merge_areas(a: Area, b: &Area) -> Area {
    let res = a.outer.boolean(&b.outer, BooleanOp::Or);
    let mut outers: Vec<Polyline<f64>> = res.pos_plines.into_iter().map(|p| p.pline).collect();
    outers.sort_by(|x, y| y.area().abs().total_cmp(&x.area().abs()));
    let Some(outer) = outers.into_iter().next() else {
        return a;
    };

    let mut holes: Vec<Polyline<f64>> = res.neg_plines.into_iter().map(|p| p.pline).collect();
    for h in &a.holes {
        holes.extend(clip_hole(h, b));
    }
    for h in &b.holes {
        holes.extend(clip_hole(h, &a));
    }
    Area::new(outer, union_pline_set(holes))
}

/// The part of hole `h` that `other` leaves uncovered.
fn clip_hole(h: &Polyline<f64>, other: &Area) -> Vec<Polyline<f64>> {
    let h = ccw(h);
    let mut out: Vec<Polyline<f64>> = h
        .boolean(&other.outer, BooleanOp::Not)
        .pos_plines
        .into_iter()
        .map(|p| p.pline)
        .collect();
    for oh in &other.holes {
        out.extend(
            h.boolean(&ccw(oh), BooleanOp::And)
                .pos_plines
                .into_iter()
                .map(|p| p.pline),
        );
    }
    out
}

fn subtract_area(a: Area, cutter: &Area) -> Vec<Area> {
    let keep_islands: Vec<Area> = cutter
        .holes
        .iter()
        .flat_map(|ch| intersect_area(&a, &Area::new(ch.clone(), vec![])))
        .collect();
    let mut out = subtract_pline(a, &cutter.outer);
    out.extend(keep_islands);
    out
}

fn subtract_pline(a: Area, cutter: &Polyline<f64>) -> Vec<Area> {
    let res = a.outer.boolean(&ccw(cutter), BooleanOp::Not);
    match res.result_info {
        BooleanResultInfo::Disjoint | BooleanResultInfo::InvalidInput => return vec![a],
        _ => {}
    }
    let pieces: Vec<Polyline<f64>> = res.pos_plines.into_iter().map(|p| p.pline).collect();
    let enclosed: Vec<Polyline<f64>> = res.neg_plines.into_iter().map(|p| p.pline).collect();

    if !enclosed.is_empty() && pieces.len() == 1 {
        let mut holes = a.holes;
        holes.extend(enclosed);
        return pieces
            .into_iter()
            .map(|p| Area::new(p, union_pline_set(holes.clone())))
            .collect();
    }

    let mut out: Vec<Area> = pieces.into_iter().map(|p| Area::new(p, vec![])).collect();
    for h in &a.holes {
        let mut next = Vec::new();
        for piece in out {
            next.extend(subtract_pline(piece, h));
        }
        out = next;
    }
    out
}

fn intersect_area(a: &Area, b: &Area) -> Vec<Area> {
    let mut out: Vec<Area> = a
        .outer
        .boolean(&b.outer, BooleanOp::And)
        .pos_plines
        .into_iter()
        .map(|p| Area::new(p.pline, vec![]))
        .collect();
    for h in a.holes.iter().chain(b.holes.iter()) {
        let mut next = Vec::new();
        for piece in out {
            next.extend(subtract_pline(piece, h));
        }
        out = next;
    }
    out
}

fn union_pline_set(mut plines: Vec<Polyline<f64>>) -> Vec<Polyline<f64>> {
    // O(n^2) pairwise merge until stable; hole sets per area are small.
    plines.retain(is_loop);
    plines = plines.iter().map(ccw).map(simplify).collect();

    let mut i = 0usize;
    while i < plines.len() {
        let mut merged = false;
        let mut j = i + 1;
        while j < plines.len() {
            let res = plines[i].boolean(&plines[j], BooleanOp::Or);
            match res.result_info {
                BooleanResultInfo::Disjoint | BooleanResultInfo::InvalidInput => {
                    j += 1;
                    continue;
                }
                _ => {
                    let mut next: Vec<Polyline<f64>> = res
                        .pos_plines
                        .into_iter()
                        .map(|p| simplify(p.pline))
                        .collect();
                    plines.swap_remove(j);
                    plines.swap_remove(i);
                    plines.append(&mut next);
                    merged = true;
                    break;
                }
            }
        }
        if merged {
            i = 0;
        } else {
            i += 1;
        }
    }

    plines
}

/// Counter-clockwise copy of a loop; boolean operands are kept CCW.
fn ccw(p: &Polyline<f64>) -> Polyline<f64> {
    let mut out = p.clone();
    if out.orientation() == PlineOrientation::Clockwise {
        out.invert_direction_mut();
    }
    out
}

fn normalize_winding(
    plines: Vec<Polyline<f64>>,
    desired: PlineOrientation,
) -> Vec<Polyline<f64>> {
    plines
        .into_iter()
        .map(|mut pl| {
            let orientation = pl.orientation();
            if orientation != PlineOrientation::Open && orientation != desired {
                pl.invert_direction_mut();
            }
            pl
        })
        .collect()
}

fn simplify(p: Polyline<f64>) -> Polyline<f64> {
    // Boolean results carry collinear runs; drop the redundant vertexes.
    p.remove_redundant(1e-6).unwrap_or(p)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::{make_circle, make_rect};
    use approx::assert_abs_diff_eq;

    fn square(cx: f64, cy: f64, s: f64) -> Wire {
        make_rect(s, s).translated(Point::new(cx, cy))
    }

    #[test]
    fn face_with_hole() {
        let r = Region::from_wires(&[square(0.0, 0.0, 10.0), square(0.0, 0.0, 4.0)]).unwrap();
        assert_eq!(r.areas.len(), 1);
        assert_eq!(r.areas[0].holes.len(), 1);
        assert_abs_diff_eq!(r.area(), 84.0, epsilon = 1e-9);
    }

    #[test]
    fn island_inside_hole_is_kept() {
        let r = Region::from_wires(&[
            square(0.0, 0.0, 10.0),
            square(0.0, 0.0, 6.0),
            square(0.0, 0.0, 2.0),
        ])
        .unwrap();
        assert_eq!(r.areas.len(), 2);
        assert_abs_diff_eq!(r.area(), 100.0 - 36.0 + 4.0, epsilon = 1e-9);
    }

    #[test]
    fn open_wires_cannot_be_filled() {
        let mut w = square(0.0, 0.0, 1.0);
        w.edges.pop();
        assert!(Region::from_wires(&[w]).is_err());
    }

    #[test]
    fn union_merges_overlaps_and_keeps_islands() {
        let ring = Region::from_wires(&[square(0.0, 0.0, 10.0), square(0.0, 0.0, 6.0)]).unwrap();
        let island = Region::from_wires(&[square(0.0, 0.0, 2.0)]).unwrap();
        let u = ring.union(&island);
        assert_eq!(u.areas.len(), 2);
        assert_abs_diff_eq!(u.area(), 64.0 + 4.0, epsilon = 1e-9);

        let a = Region::from_wires(&[square(0.0, 0.0, 2.0)]).unwrap();
        let b = Region::from_wires(&[square(1.0, 0.0, 2.0)]).unwrap();
        let u = a.union(&b);
        assert_eq!(u.areas.len(), 1);
        assert_abs_diff_eq!(u.area(), 6.0, epsilon = 1e-9);
    }

    #[test]
    fn subtract_drills_a_hole() {
        let mut r = Region::from_wires(&[square(0.0, 0.0, 10.0)]).unwrap();
        r.subtract_all(&[make_circle(1.0).to_polyline()]);
        assert_eq!(r.areas.len(), 1);
        assert_eq!(r.areas[0].holes.len(), 1);
        assert_abs_diff_eq!(r.area(), 100.0 - std::f64::consts::PI * 0.25, epsilon = 1e-6);
    }

    #[test]
    fn subtract_splits_areas() {
        let r = Region::from_wires(&[make_rect(10.0, 2.0)]).unwrap();
        let cut = Region::from_wires(&[make_rect(2.0, 4.0)]).unwrap();
        let d = r.subtract(&cut);
        assert_eq!(d.areas.len(), 2);
        assert_abs_diff_eq!(d.area(), 16.0, epsilon = 1e-9);
    }

    #[test]
    fn transforms_preserve_area() {
        let r = Region::from_wires(&[square(0.0, 0.0, 10.0), square(0.0, 0.0, 4.0)]).unwrap();
        let moved = r.rotated(33.0).translated(Point::new(5.0, -2.0));
        assert_abs_diff_eq!(moved.area(), r.area(), epsilon = 1e-9);
        let (x0, _, x1, _) = r.translated(Point::new(5.0, 0.0)).extents().unwrap();
        assert_abs_diff_eq!(x0, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(x1, 10.0, epsilon = 1e-12);
    }

    #[test]
    fn flattening_keeps_circles_close() {
        let r = Region::from_wires(&[make_circle(4.0)]).unwrap();
        let flat = r.flattened(1e-3);
        assert!(flat.areas[0].outer.vertex_data.iter().all(|v| v.bulge == 0.0));
        assert_abs_diff_eq!(flat.area(), r.area(), epsilon = 0.05);
    }
}
