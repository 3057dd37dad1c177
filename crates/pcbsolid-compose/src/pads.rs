use pcbsolid_core::{Pad, PadShape, Point};
use pcbsolid_geometry::primitives::{make_circle, make_oval, make_rect, make_rounded_rect};
use pcbsolid_geometry::{Shape, Wire};
use tracing::{info, info_span};

use crate::builder::ShapeBuilder;
use crate::composer::{Composer, place};
use crate::config::{ColorRole, ShapeKind};
use crate::error::{ComposeError, Result};

/// Pad-local outline of a pad's copper.
pub fn pad_outline(pad: &Pad, reference: &str) -> Result<Wire> {
    let [w, h] = pad.size;
    Ok(match pad.shape {
        PadShape::Rect => make_rect(w, h),
        PadShape::Circle => make_circle(w),
        PadShape::Oval => make_oval(w, h),
        PadShape::Roundrect => make_rounded_rect(w, h, pad.roundrect_rratio * w.min(h)),
        PadShape::Trapezoid | PadShape::Custom => {
            return Err(ComposeError::UnsupportedPadShape {
                shape: pad.shape.as_str(),
                pad: pad.number.clone(),
                reference: reference.to_string(),
            });
        }
    })
}

impl<B: ShapeBuilder> Composer<'_, B> {
    /// Pads of every module and every via on the current layer.
    pub fn make_pads(&mut self, kind: ShapeKind, thickness: f64, fuse: bool) -> Result<Option<Shape>> {
        let _span = info_span!("pads", layer = %self.layer.name).entered();

        let fill = kind != ShapeKind::Path;
        let mut objs = Vec::new();
        let (mut count, mut skip_count) = (0usize, 0usize);

        for m in &self.board.module {
            let m_angle = m.at.angle;
            count += m.pad.len();
            let mut pads = Vec::new();
            for p in &m.pad {
                if !self.layer.holds_pad(&p.layers) {
                    skip_count += 1;
                    continue;
                }
                let mut w = pad_outline(p, &m.reference)?;
                if m_angle == 0.0 && p.at.angle != 0.0 {
                    w = w.rotated(p.at.angle);
                }
                w = w.translated(p.at.position());
                let label = format!("{}#{}", p.number, m.reference);
                pads.push(self.make_path(vec![w], "pad", fill, Some(&label))?);
            }
            let Some(obj) = self.make_compound(pads, "pads", Some(&m.reference), false) else {
                continue;
            };
            let at = m.at.position();
            objs.push(place(obj, [at.x, at.y, 0.0], m_angle));
        }

        let mut vias = Vec::new();
        let mut via_skip = 0usize;
        for v in &self.board.via {
            if !v.on_layer(&self.layer, self.board) {
                via_skip += 1;
                continue;
            }
            let w = make_circle(v.size).translated(Point::from_board(v.at));
            vias.push(self.make_path(vec![w], "via", fill, None)?);
        }
        if let Some(obj) = self.make_compound(vias, "vias", None, false) {
            objs.push(obj);
        }

        let via_count = self.board.via.len();
        info!("modules: {}", self.board.module.len());
        info!("pads: {count}, skipped: {skip_count}");
        info!("vias: {via_count}, skipped: {via_skip}");
        info!("total pads added: {}", count - skip_count + via_count - via_skip);

        if objs.is_empty() {
            return Ok(None);
        }
        let out = if kind == ShapeKind::Solid {
            self.make_solid(objs, "pads", thickness, fuse)?
        } else {
            self.make_compound(objs, "pads", None, fuse)
        };
        self.set_color(ColorRole::Pad);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ComposeConfig;
    use approx::assert_abs_diff_eq;
    use pcbsolid_core::Board;
    use std::f64::consts::PI;

    const PADS: &str = r#"{
        "layers": [
            { "id": 0, "name": "F.Cu", "kind": "signal" },
            { "id": 31, "name": "B.Cu", "kind": "signal" }
        ],
        "module": [{
            "layer": "F.Cu",
            "at": [10, 10],
            "reference": "U1",
            "pad": [
                { "number": "1", "shape": "rect", "at": [0, 0], "size": [2, 1], "layers": ["F.Cu", "F.Mask"] },
                { "number": "2", "shape": "circle", "at": [5, 0], "size": [1, 1], "layers": ["*.Cu"] },
                { "number": "3", "shape": "oval", "at": [-5, 0], "size": [1, 3], "layers": ["B.Cu"] }
            ]
        }],
        "via": [{ "at": [0, 0], "size": 0.6, "drill": 0.3, "layers": ["F.Cu", "B.Cu"] }]
    }"#;

    #[test]
    fn pads_follow_the_layer_filter() {
        let board = Board::from_json_str(PADS).unwrap();
        let config = ComposeConfig::default();
        let mut c = Composer::new(&board, &config);

        let front = c.make_pads(ShapeKind::Face, 0.05, false).unwrap().unwrap();
        let via = PI * 0.09;
        assert_abs_diff_eq!(front.area(), 2.0 + PI * 0.25 + via, epsilon = 1e-6);

        c.set_layer("B.Cu").unwrap();
        let back = c.make_pads(ShapeKind::Face, 0.05, false).unwrap().unwrap();
        assert_abs_diff_eq!(back.area(), PI * 0.25 + (2.0 + PI * 0.25) + via, epsilon = 1e-6);
    }

    #[test]
    fn pads_are_placed_on_the_board() {
        let board = Board::from_json_str(PADS).unwrap();
        let config = ComposeConfig::default();
        let mut c = Composer::new(&board, &config);
        let front = c.make_pads(ShapeKind::Solid, 0.05, true).unwrap().unwrap();
        let bb = front.bounding_box().unwrap();
        // The circle pad at local x = 5 lands at board x = 15; Y is flipped.
        assert_abs_diff_eq!(bb.max[0], 15.5, epsilon = 1e-9);
        assert_abs_diff_eq!(bb.min[1], -10.5, epsilon = 1e-9);
        assert_abs_diff_eq!(bb.max[2], 0.05, epsilon = 1e-12);
    }

    #[test]
    fn custom_pads_are_rejected() {
        let json = PADS.replace(r#""shape": "rect""#, r#""shape": "custom""#);
        let board = Board::from_json_str(&json).unwrap();
        let config = ComposeConfig::default();
        let mut c = Composer::new(&board, &config);
        let err = c.make_pads(ShapeKind::Face, 0.05, false).unwrap_err();
        assert!(matches!(err, ComposeError::UnsupportedPadShape { shape: "custom", .. }));
    }

    #[test]
    fn roundrect_corner_follows_the_ratio() {
        let pad: Pad = serde_json::from_str(
            r#"{ "shape": "roundrect", "size": [4, 2], "roundrect_rratio": 0.25 }"#,
        )
        .unwrap();
        let w = pad_outline(&pad, "R1").unwrap();
        let r = pcbsolid_geometry::Region::from_wires(&[w]).unwrap();
        assert_abs_diff_eq!(r.area(), 8.0 - (4.0 - PI) * 0.25, epsilon = 1e-9);
    }
}
