//! layout::shape モジュールのテスト

use super::*;

fn bbox_of(svg_fragment: &str) -> Option<BBox> {
    let xml = format!(r#"<svg xmlns="http://www.w3.org/2000/svg">{svg_fragment}</svg>"#);
    let doc = roxmltree::Document::parse(&xml).unwrap();
    let first = doc.root_element().first_element_child().unwrap();
    element_bbox(first, &Transform::identity()).unwrap()
}

fn assert_bbox(actual: Option<BBox>, min_x: f64, min_y: f64, max_x: f64, max_y: f64) {
    let b = actual.expect("bbox should exist");
    let eps = 1e-6;
    assert!(
        (b.min_x - min_x).abs() < eps
            && (b.min_y - min_y).abs() < eps
            && (b.max_x - max_x).abs() < eps
            && (b.max_y - max_y).abs() < eps,
        "expected ({min_x}, {min_y}, {max_x}, {max_y}), got {:?}",
        b
    );
}

#[test]
fn test_rect_bbox() {
    assert_bbox(
        bbox_of(r#"<rect x="10" y="20" width="30" height="40"/>"#),
        10.0,
        20.0,
        40.0,
        60.0,
    );
}

#[test]
fn test_image_bbox_with_transform() {
    assert_bbox(
        bbox_of(r#"<image transform="translate(5 5)" width="10" height="10"/>"#),
        5.0,
        5.0,
        15.0,
        15.0,
    );
}

#[test]
fn test_group_applies_transform_to_children() {
    assert_bbox(
        bbox_of(
            r#"<g transform="translate(100 0) rotate(90)">
                 <rect width="20" height="10"/>
               </g>"#,
        ),
        90.0,
        0.0,
        100.0,
        20.0,
    );
}

#[test]
fn test_nested_groups_compose() {
    assert_bbox(
        bbox_of(
            r#"<g transform="translate(10 10)">
                 <g transform="scale(2)"><rect width="5" height="5"/></g>
               </g>"#,
        ),
        10.0,
        10.0,
        20.0,
        20.0,
    );
}

#[test]
fn test_circle_under_rotation_is_exact() {
    assert_bbox(
        bbox_of(r#"<circle transform="rotate(33)" r="5"/>"#),
        -5.0,
        -5.0,
        5.0,
        5.0,
    );
}

#[test]
fn test_ellipse_bbox() {
    assert_bbox(
        bbox_of(r#"<ellipse cx="10" cy="10" rx="4" ry="2"/>"#),
        6.0,
        8.0,
        14.0,
        12.0,
    );
}

#[test]
fn test_polygon_bbox() {
    assert_bbox(
        bbox_of(r#"<polygon points="0,0 10,0 10,5 0,5"/>"#),
        0.0,
        0.0,
        10.0,
        5.0,
    );
}

#[test]
fn test_line_bbox() {
    assert_bbox(
        bbox_of(r#"<line x1="3" y1="9" x2="-1" y2="4"/>"#),
        -1.0,
        4.0,
        3.0,
        9.0,
    );
}

#[test]
fn test_path_absolute_lines() {
    assert_bbox(
        bbox_of(r#"<path d="M 0 0 L 10 0 L 10 20 Z"/>"#),
        0.0,
        0.0,
        10.0,
        20.0,
    );
}

#[test]
fn test_path_relative_and_implicit_lineto() {
    assert_bbox(
        bbox_of(r#"<path d="m5,5 10,0 0,10 h-10 v-10 z"/>"#),
        5.0,
        5.0,
        15.0,
        15.0,
    );
}

#[test]
fn test_path_cubic_extrema() {
    // 制御点は y=-10 まで出るが、曲線自体の頂点は y=-7.5
    assert_bbox(
        bbox_of(r#"<path d="M0 0 C 0 -10 10 -10 10 0"/>"#),
        0.0,
        -7.5,
        10.0,
        0.0,
    );
}

#[test]
fn test_path_quadratic_extrema() {
    assert_bbox(
        bbox_of(r#"<path d="M0 0 Q 5 10 10 0"/>"#),
        0.0,
        0.0,
        10.0,
        5.0,
    );
}

#[test]
fn test_path_smooth_cubic_reflects_control() {
    let b = bbox_of(r#"<path d="M0 0 C 0 -10 10 -10 10 0 S 20 10 20 0"/>"#).unwrap();
    assert!((b.max_y - 7.5).abs() < 1e-6);
    assert!((b.min_y + 7.5).abs() < 1e-6);
}

#[test]
fn test_path_half_circle_arc() {
    let b = bbox_of(r#"<path d="M0 0 A 5 5 0 0 1 10 0"/>"#).unwrap();
    assert!((b.min_x - 0.0).abs() < 1e-6);
    assert!((b.max_x - 10.0).abs() < 1e-6);
    // sweep=1 は y 軸下向きで時計回り。上側（負の y）を通る
    assert!((b.min_y + 5.0).abs() < 0.05, "min_y = {}", b.min_y);
    assert!(b.max_y.abs() < 1e-6);
}

#[test]
fn test_path_compact_arc_flags() {
    assert!(bbox_of(r#"<path d="M0 0a5 5 0 0110 0"/>"#).is_some());
}

#[test]
fn test_group_without_geometry_is_none() {
    assert!(bbox_of(r#"<g><title>nothing</title></g>"#).is_none());
}

#[test]
fn test_invalid_path_is_error() {
    let xml = r#"<svg><path d="M 0 0 L 10 banana"/></svg>"#;
    let doc = roxmltree::Document::parse(xml).unwrap();
    let path = doc.root_element().first_element_child().unwrap();
    assert!(element_bbox(path, &Transform::identity()).is_err());
}

#[test]
fn test_invalid_attribute_is_error() {
    let xml = r#"<svg><rect width="ten" height="5"/></svg>"#;
    let doc = roxmltree::Document::parse(xml).unwrap();
    let rect = doc.root_element().first_element_child().unwrap();
    assert!(element_bbox(rect, &Transform::identity()).is_err());
}
