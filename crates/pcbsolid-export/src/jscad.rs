use cavalier_contours::polyline::PlineSource;
use pcbsolid_geometry::{Polyline, Region, Shape};

use crate::{ExportError, fmt_num};

const HEADER: &str = "\
const { booleans, extrusions, primitives, transforms } = require('@jscad/modeling');
const { union, subtract } = booleans;
const { extrudeLinear } = extrusions;
const { polygon } = primitives;
const { translate } = transforms;

";

/// Render the solids of `shape` as a JSCAD v2 script.
///
/// Every top-level child of a compound becomes one function whose solids are
/// unioned; `main` returns them all. Arcs are replaced by chords within
/// `arc_tolerance`.
pub fn assembly_to_jscad_v2(shape: &Shape, arc_tolerance: f64) -> Result<String, ExportError> {
    let groups: Vec<&Shape> = match shape {
        Shape::Compound(items) => items.iter().collect(),
        other => vec![other],
    };

    let mut out = String::from(HEADER);
    let mut names = Vec::new();
    for (idx, group) in groups.into_iter().enumerate() {
        let mut solids = Vec::new();
        for leaf in group.leaves() {
            match leaf {
                Shape::Solid { region, z, height } => solids.push((region, *z, *height)),
                Shape::Face { .. } => return Err(ExportError::NotExtrudable("face")),
                Shape::Path { .. } => return Err(ExportError::NotExtrudable("path")),
                Shape::Compound(_) => {}
            }
        }
        let name = format!("layer_{idx}");
        let Some(body) = render_group_fn(&name, &solids, arc_tolerance) else {
            continue;
        };
        out.push_str(&body);
        out.push('\n');
        names.push(name);
    }
    if names.is_empty() {
        return Err(ExportError::Empty);
    }

    let calls: Vec<String> = names.iter().map(|n| format!("{n}_fn()")).collect();
    out.push_str(&format!("const main = () => [{}];\n", calls.join(", ")));
    out.push_str("module.exports = { main };\n");
    Ok(out)
}

fn render_group_fn(name: &str, solids: &[(&Region, f64, f64)], tolerance: f64) -> Option<String> {
    let mut body = Vec::new();
    for (region, z, height) in solids {
        for lines in region_to_geom2(&region.flattened(tolerance)) {
            body.push("{".to_string());
            body.extend(lines.into_iter().map(|l| format!("  {l}")));
            body.push(format!(
                "  parts.push(translate([0, 0, {}], extrudeLinear({{ height: {} }}, shape)));",
                fmt_num(*z),
                fmt_num(*height)
            ));
            body.push("}".to_string());
        }
    }
    if body.is_empty() {
        return None;
    }

    let mut out = String::new();
    out.push_str(&format!("function {name}_fn() {{\n"));
    out.push_str("  const parts = [];\n");
    for line in body {
        out.push_str("  ");
        out.push_str(&line);
        out.push('\n');
    }
    out.push_str("  return parts.length === 1 ? parts[0] : union(parts);\n");
    out.push_str("}\n");
    Some(out)
}

/// One statement list per area: the outer polygon minus its holes.
fn region_to_geom2(region: &Region) -> Vec<Vec<String>> {
    let mut out = Vec::new();
    for area in &region.areas {
        let Some(outer) = polyline_to_polygon(&area.outer) else {
            continue;
        };
        let mut lines = vec![format!("let shape = {outer};")];
        for hole in &area.holes {
            if let Some(cut) = polyline_to_polygon(hole) {
                lines.push(format!("shape = subtract(shape, {cut});"));
            }
        }
        out.push(lines);
    }
    out
}

/// Points are written counter-clockwise whatever the loop's own winding.
fn polyline_to_polygon(pl: &Polyline<f64>) -> Option<String> {
    if pl.vertex_data.len() < 3 {
        return None;
    }
    let mut verts: Vec<_> = pl.vertex_data.iter().collect();
    if pl.area() < 0.0 {
        verts.reverse();
    }
    let mut pts = String::new();
    for (idx, v) in verts.into_iter().enumerate() {
        if idx > 0 {
            pts.push(',');
        }
        pts.push_str(&format!("[{},{}]", fmt_num(v.x), fmt_num(v.y)));
    }
    Some(format!("polygon({{ points: [{pts}] }})"))
}
