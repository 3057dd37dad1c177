use std::fmt;
use std::str::FromStr;

use cavalier_contours::polyline::{
    PlineOffsetOptions, PlineOrientation, PlineSource, PlineSourceMut, Polyline,
};

use crate::{GeometryError, Point, Region, Result, Wire};

/// Named offset algorithms. The `…NoArcFit` variants approximate arcs in
/// their results with line segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OffsetAlgorithm {
    Occ,
    Libarea,
    LibareaNoArcFit,
    #[default]
    ClipperOffset,
    ClipperNoArcFit,
}

#[derive(Debug, thiserror::Error)]
#[error("unknown offset algorithm: {0}")]
pub struct UnknownAlgorithm(pub String);

impl OffsetAlgorithm {
    pub const ALL: [Self; 5] = [
        Self::Occ,
        Self::Libarea,
        Self::LibareaNoArcFit,
        Self::ClipperOffset,
        Self::ClipperNoArcFit,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Occ => "OCC",
            Self::Libarea => "libarea",
            Self::LibareaNoArcFit => "libareaNoArcFit",
            Self::ClipperOffset => "ClipperOffset",
            Self::ClipperNoArcFit => "ClipperNoArcFit",
        }
    }

    fn index(self) -> usize {
        self as usize
    }

    /// The algorithm to run for one call: `OCC` is used as is, otherwise a
    /// call that does not want arcs fitted runs the `…NoArcFit` sibling.
    #[must_use]
    pub fn resolve(self, fit_arc: bool) -> Self {
        if self == Self::Occ || fit_arc {
            return self;
        }
        Self::ALL[((self.index() - 1) | 1) + 1]
    }

    #[must_use]
    pub fn fits_arcs(self) -> bool {
        !matches!(self, Self::LibareaNoArcFit | Self::ClipperNoArcFit)
    }
}

impl FromStr for OffsetAlgorithm {
    type Err = UnknownAlgorithm;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|a| a.name() == s)
            .ok_or_else(|| UnknownAlgorithm(s.to_string()))
    }
}

impl fmt::Display for OffsetAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct OffsetOptions {
    pub algorithm: OffsetAlgorithm,
    /// Return a filled region instead of its boundary.
    pub fill: bool,
    /// Offset open wires on both sides and cap their ends.
    pub open_result: bool,
    /// Union the results instead of keeping one result per input.
    pub intersection: bool,
    /// Chord error when arcs are approximated.
    pub arc_tolerance: f64,
}

impl Default for OffsetOptions {
    fn default() -> Self {
        Self {
            algorithm: OffsetAlgorithm::default(),
            fill: true,
            open_result: false,
            intersection: false,
            arc_tolerance: 0.01,
        }
    }
}

impl OffsetOptions {
    fn finish(&self, region: Region) -> Region {
        if self.algorithm.fits_arcs() {
            region
        } else {
            region.flattened(self.arc_tolerance)
        }
    }
}

fn pline_opts() -> PlineOffsetOptions<'static, f64> {
    PlineOffsetOptions {
        handle_self_intersects: true,
        ..Default::default()
    }
}

fn signed_offset_for(pline: &Polyline<f64>, abs: f64, inside: bool) -> f64 {
    match pline.orientation() {
        // CCW: interior is on the left; left-offset is inward.
        PlineOrientation::CounterClockwise | PlineOrientation::Open => {
            if inside { abs } else { -abs }
        }
        PlineOrientation::Clockwise => {
            if inside { -abs } else { abs }
        }
    }
}

/// Grow (`delta > 0`) or shrink a region with round joins.
pub fn offset_region(region: &Region, delta: f64, opts: &OffsetOptions) -> Result<Region> {
    if !delta.is_finite() {
        return Err(GeometryError::OffsetFailed(format!("distance {delta}")));
    }
    if delta == 0.0 || region.is_empty() {
        return Ok(opts.finish(region.clone()));
    }

    let abs = delta.abs();
    let shrink = delta < 0.0;
    let popts = pline_opts();

    let mut out = Region::empty();
    for area in &region.areas {
        let off = signed_offset_for(&area.outer, abs, shrink);
        let outers: Vec<Polyline<f64>> = area.outer.parallel_offset_opt(off, &popts);
        let mut grown = Region::union_all(outers);

        let mut cutters: Vec<Polyline<f64>> = Vec::new();
        for h in &area.holes {
            // Growing the area shrinks its holes.
            let off = signed_offset_for(h, abs, !shrink);
            cutters.extend(h.parallel_offset_opt(off, &popts));
        }
        grown.subtract_all(&cutters);
        out = out.union(&grown);
    }
    Ok(opts.finish(out))
}

/// Dilate a wire by `half_width` into a ribbon with round ends.
///
/// Fails with [`GeometryError::PlaneUndefined`] when the wire is a single
/// straight edge or a run of colinear edges.
pub fn dilate_wire(wire: &Wire, half_width: f64, opts: &OffsetOptions) -> Result<Region> {
    if wire.is_empty() {
        return Err(GeometryError::NullShape);
    }
    if !(half_width.is_finite() && half_width > 0.0) {
        return Err(GeometryError::OffsetFailed(format!(
            "half width {half_width}"
        )));
    }
    if wire.is_colinear() {
        return Err(GeometryError::PlaneUndefined);
    }

    let popts = pline_opts();
    let mut pl = wire.to_polyline();

    if pl.is_closed() {
        if pl.orientation() == PlineOrientation::Clockwise {
            pl.invert_direction_mut();
        }
        let mut outer: Vec<Polyline<f64>> = pl.parallel_offset_opt(-half_width, &popts);
        if outer.len() != 1 {
            return Err(GeometryError::OffsetFailed(format!(
                "closed wire produced {} outer loops",
                outer.len()
            )));
        }
        let inner: Vec<Polyline<f64>> = pl.parallel_offset_opt(half_width, &popts);
        let mut region = Region::union_all(vec![outer.remove(0)]);
        region.subtract_all(&inner);
        return Ok(opts.finish(region));
    }

    let (Some(start), Some(end)) = (wire.start(), wire.end()) else {
        return Err(GeometryError::NullShape);
    };
    let left = single_side(&pl, half_width, start, end)?;
    let mut right = single_side(&pl, -half_width, start, end)?;

    // Right side forward, cap, left side backward, cap: a counter-clockwise loop.
    let mut left_back = left;
    left_back.invert_direction_mut();
    if let Some(v) = right.vertex_data.last_mut() {
        v.bulge = 1.0;
    }
    if let Some(v) = left_back.vertex_data.last_mut() {
        v.bulge = 1.0;
    }
    let mut ribbon = Polyline::new_closed();
    ribbon.vertex_data.extend(right.vertex_data.iter().copied());
    ribbon.vertex_data.extend(left_back.vertex_data.iter().copied());

    let area = ribbon.area();
    let bound = 2.0 * half_width * wire.length() + std::f64::consts::PI * half_width * half_width;
    if !(area > 0.0 && area <= bound * (1.0 + 1e-6)) {
        return Err(GeometryError::OffsetFailed(format!(
            "ribbon area {area} outside (0, {bound}]"
        )));
    }
    Ok(opts.finish(Region::union_all(vec![ribbon])))
}

/// One-sided offset of an open polyline that must stay a single piece
/// running from beside `start` to beside `end`.
fn single_side(pl: &Polyline<f64>, off: f64, start: Point, end: Point) -> Result<Polyline<f64>> {
    let mut sides: Vec<Polyline<f64>> = pl.parallel_offset_opt(off, &pline_opts());
    if sides.len() != 1 {
        return Err(GeometryError::OffsetFailed(format!(
            "open offset produced {} pieces",
            sides.len()
        )));
    }
    let side = sides.remove(0);
    let n = side.vertex_count();
    if n < 2 {
        return Err(GeometryError::OffsetFailed("degenerate side".to_string()));
    }
    let tol = 1e-6 * off.abs().max(1.0);
    let first = side.at(0);
    let last = side.at(n - 1);
    let d0 = Point::new(first.x, first.y).distance(start);
    let d1 = Point::new(last.x, last.y).distance(end);
    if (d0 - off.abs()).abs() > tol || (d1 - off.abs()).abs() > tol {
        return Err(GeometryError::OffsetFailed(
            "open offset was trimmed at an end".to_string(),
        ));
    }
    Ok(side)
}
