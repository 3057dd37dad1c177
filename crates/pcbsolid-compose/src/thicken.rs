use pcbsolid_geometry::primitives::make_thick_line;
use pcbsolid_geometry::{GeometryError, OffsetOptions, Region, Result, Wire, dilate_wire};
use tracing::warn;

/// A thickened set of track wires, tagged with how it was built.
#[derive(Debug, Clone)]
pub enum Thickened {
    /// The wires were dilated as a whole.
    Offset(Region),
    /// Dilation failed; every edge became a stadium and the stadiums were
    /// unioned.
    Fallback {
        region: Region,
        reason: GeometryError,
    },
}

impl Thickened {
    #[must_use]
    pub fn region(&self) -> &Region {
        match self {
            Thickened::Offset(region) | Thickened::Fallback { region, .. } => region,
        }
    }

    #[must_use]
    pub fn into_region(self) -> Region {
        match self {
            Thickened::Offset(region) | Thickened::Fallback { region, .. } => region,
        }
    }

    #[must_use]
    pub fn is_fallback(&self) -> bool {
        matches!(self, Thickened::Fallback { .. })
    }
}

/// Dilate `wires` by `half_width`, falling back to per-edge stadiums when
/// the kernel cannot offset them (a lone straight edge has no plane).
pub fn thicken(wires: &[Wire], half_width: f64, opts: &OffsetOptions) -> Result<Thickened> {
    match dilate_all(wires, half_width, opts) {
        Ok(region) => Ok(Thickened::Offset(region)),
        Err(reason) => {
            warn!("track offset failed: {reason}; using fallback");
            Ok(Thickened::Fallback {
                region: stadiums(wires, half_width)?,
                reason,
            })
        }
    }
}

fn dilate_all(wires: &[Wire], half_width: f64, opts: &OffsetOptions) -> Result<Region> {
    let mut out = Region::empty();
    for w in wires {
        out = out.union(&dilate_wire(w, half_width, opts)?);
    }
    Ok(out)
}

/// Union of one stadium per edge, each covering the edge's chord.
pub fn stadiums(wires: &[Wire], half_width: f64) -> Result<Region> {
    let mut out = Region::empty();
    for e in wires.iter().flat_map(|w| w.edges.iter()) {
        let outline = make_thick_line(e.start, e.end, half_width);
        out = out.union(&Region::from_wires(&[outline])?);
    }
    Ok(out)
}
