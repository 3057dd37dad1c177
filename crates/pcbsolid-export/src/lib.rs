//! Writers for composed board shapes (JSCAD/SVG).

pub mod error;
pub mod jscad;
pub mod svg;

pub use error::ExportError;
pub use jscad::assembly_to_jscad_v2;
pub use svg::shape_to_svg;

pub(crate) fn fmt_num(v: f64) -> String {
    let v = if v.abs() < 1e-9 { 0.0 } else { v };
    let mut buf = ryu::Buffer::new();
    let s = buf.format(v);
    s.strip_suffix(".0").unwrap_or(s).to_string()
}
