use pcbsolid_export::{ExportError, shape_to_svg};
use pcbsolid_geometry::primitives::{make_circle, make_rect};
use pcbsolid_geometry::{Region, Shape};

fn extract_path(svg: &str) -> &str {
    let needle = "<path d=\"";
    let start = svg.find(needle).map(|idx| idx + needle.len()).unwrap();
    let rest = &svg[start..];
    &rest[..rest.find('"').unwrap()]
}

fn count_command(path: &str, cmd: &str) -> usize {
    path.split_whitespace().filter(|tok| *tok == cmd).count()
}

#[test]
fn face_with_hole_is_two_closed_subpaths() {
    let region = Region::from_wires(&[make_rect(20.0, 10.0), make_circle(4.0)]).unwrap();
    let svg = shape_to_svg(&Shape::face(region)).unwrap();
    assert!(svg.starts_with("<svg width=\"20mm\" height=\"10mm\" viewBox=\"0 0 20 10\""));
    assert!(svg.contains("fill-rule=\"evenodd\""));
    let path = extract_path(&svg);
    assert_eq!(count_command(path, "M"), 2);
    assert_eq!(count_command(path, "Z"), 2);
    assert!(count_command(path, "A") >= 2);
}

#[test]
fn y_is_flipped_to_screen_orientation() {
    let rect = make_rect(4.0, 2.0).translated(pcbsolid_geometry::Point::new(2.0, -1.0));
    let svg = shape_to_svg(&Shape::path(vec![rect])).unwrap();
    let path = extract_path(&svg);
    // Every corner maps into the 4 x 2 viewBox.
    let nums: Vec<f64> = path
        .split_whitespace()
        .filter_map(|t| t.parse::<f64>().ok())
        .collect();
    assert!(nums.iter().all(|v| (0.0..=4.0).contains(v)));
    assert!(nums.contains(&2.0));
}

#[test]
fn empty_shape_is_an_error() {
    assert!(matches!(
        shape_to_svg(&Shape::Compound(vec![])),
        Err(ExportError::Empty)
    ));
}
