//! arrange モジュールのテスト

use super::*;
use crate::error::ArrangeError;
use crate::host::mock::{HostCall, MockHost};
use crate::layout::Point;
use proptest::prelude::*;
use tempfile::TempDir;

/// 200mm / viewBox 100 → scale 2。254ppi と合わせて 1作者単位 = 20px
const LAYOUT: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" width="200mm" viewBox="0 0 100 150">
  <g id="sheet-a">
    <rect x="0" y="0" width="100" height="100"/>
    <g id="p0" transform="translate(10 20)">
      <image id="gear.png" width="20" height="10"/>
    </g>
    <g id="p1" transform="translate(60 50) rotate(90)">
      <image id="bracket.png" width="20" height="10"/>
    </g>
  </g>
  <g id="sheet-b" transform="translate(0 100)">
    <rect x="0" y="0" width="100" height="50"/>
    <g id="p2" transform="translate(5 5)">
      <polygon id="plate.png" points="0,0 30,0 30,30 0,30"/>
    </g>
  </g>
</svg>"#;

fn settings() -> Settings {
    Settings {
        ppi: 254.0,
        ..Settings::default()
    }
}

fn plan() -> LayoutPlan {
    let doc = LayoutDocument::parse(LAYOUT, "png").unwrap();
    plan_layout(&doc, 254.0).unwrap()
}

fn host_with_images(dir: &Path) -> MockHost {
    MockHost::new()
        .with_image(dir.join("gear.png"), 40, 20)
        .with_image(dir.join("bracket.png"), 40, 20)
        .with_image(dir.join("plate.png"), 60, 60)
}

fn assert_close(actual: Point, expected: Point) {
    assert!(
        (actual.x - expected.x).abs() < 1e-6 && (actual.y - expected.y).abs() < 1e-6,
        "expected {expected:?}, got {actual:?}"
    );
}

fn placement(rotation: f64, offset: Point) -> PartPlacement {
    PartPlacement {
        id: "p".to_string(),
        image_name: "part".to_string(),
        rotation,
        center: Point::new(0.0, 0.0),
        offset,
        bbox: BBox::from_rect(0.0, 0.0, 1.0, 1.0),
    }
}

// ========================================
// place_part
// ========================================

#[test]
fn test_place_part_centers_layer_on_offset() {
    let mut host = MockHost::new().with_image("part.png", 40, 20);
    let canvas = host.create_canvas("c", 500, 300).unwrap();

    let layer = place_part(
        &mut host,
        canvas,
        Path::new("part.png"),
        &placement(0.0, Point::new(120.0, 80.0)),
    )
    .unwrap();

    assert_close(host.layer_bounds(layer).unwrap().center(), Point::new(120.0, 80.0));
}

#[test]
fn test_place_part_with_rotation_keeps_center_on_offset() {
    let mut host = MockHost::new().with_image("part.png", 40, 20);
    let canvas = host.create_canvas("c", 500, 300).unwrap();

    let layer = place_part(
        &mut host,
        canvas,
        Path::new("part.png"),
        &placement(90.0, Point::new(33.0, 250.0)),
    )
    .unwrap();

    let bounds = host.layer_bounds(layer).unwrap();
    assert_eq!((bounds.width, bounds.height), (20.0, 40.0));
    assert_close(bounds.center(), Point::new(33.0, 250.0));
}

#[test]
fn test_place_part_call_sequence() {
    let mut host = MockHost::new().with_image("part.png", 40, 20);
    let canvas = host.create_canvas("c", 100, 100).unwrap();
    place_part(
        &mut host,
        canvas,
        Path::new("part.png"),
        &placement(30.0, Point::new(10.0, 10.0)),
    )
    .unwrap();

    let kinds: Vec<&str> = host
        .calls()
        .iter()
        .map(|call| match call {
            HostCall::CreateCanvas { .. } => "create",
            HostCall::LoadLayer { .. } => "load",
            HostCall::Translate { .. } => "translate",
            HostCall::Rotate { .. } => "rotate",
            HostCall::Crop { .. } => "crop",
            HostCall::StrokeRect { .. } => "stroke",
            HostCall::Flush => "flush",
        })
        .collect();
    assert_eq!(
        kinds,
        vec!["create", "load", "translate", "rotate", "crop", "translate", "translate"]
    );
    assert!(host.calls().contains(&HostCall::Rotate {
        layer: LayerId(0),
        degrees: 30.0
    }));
}

#[test]
fn test_place_part_missing_image() {
    let mut host = MockHost::new();
    let canvas = host.create_canvas("c", 100, 100).unwrap();
    let err = place_part(
        &mut host,
        canvas,
        Path::new("missing.png"),
        &placement(0.0, Point::new(0.0, 0.0)),
    )
    .unwrap_err();
    assert!(matches!(err, ArrangeError::ImageNotFound(_)));
}

proptest! {
    #[test]
    fn prop_layer_center_equals_offset(
        width in 1u32..400,
        height in 1u32..400,
        rotation in -720.0f64..720.0,
        ox in -5000.0f64..5000.0,
        oy in -5000.0f64..5000.0,
    ) {
        let mut host = MockHost::new().with_image("part.png", width, height);
        let canvas = host.create_canvas("c", 1000, 700).unwrap();
        let layer = place_part(
            &mut host,
            canvas,
            Path::new("part.png"),
            &placement(rotation, Point::new(ox, oy)),
        )
        .unwrap();

        let center = host.layer_bounds(layer).unwrap().center();
        prop_assert!((center.x - ox).abs() < 1e-6);
        prop_assert!((center.y - oy).abs() < 1e-6);
    }
}

// ========================================
// arrange
// ========================================

#[test]
fn test_canvas_name() {
    assert_eq!(canvas_name("output", 0), "output-sheet-1");
    assert_eq!(canvas_name("nest", 4), "nest-sheet-5");
}

#[test]
fn test_arrange_creates_canvas_per_sheet() {
    let dir = Path::new("/parts");
    let settings = settings();
    let mut host = host_with_images(dir);
    let job = ArrangeJob {
        image_dir: dir,
        settings: &settings,
        progress: false,
    };

    let report = arrange(&plan(), &job, &mut host).unwrap();

    assert_eq!(host.canvas_names(), vec!["output-sheet-1", "output-sheet-2"]);
    assert!(host.calls().contains(&HostCall::CreateCanvas {
        name: "output-sheet-1".to_string(),
        width: 2000,
        height: 2000,
    }));
    assert!(host.calls().contains(&HostCall::CreateCanvas {
        name: "output-sheet-2".to_string(),
        width: 2000,
        height: 1000,
    }));
    assert_eq!(report.sheets, 2);
    assert_eq!(report.parts, 3);
    assert_eq!(report.total_offset, 150.0);
    assert_eq!(
        report.written,
        vec![
            PathBuf::from("output-sheet-1.png"),
            PathBuf::from("output-sheet-2.png")
        ]
    );
}

#[test]
fn test_arrange_places_parts_at_pixel_offsets() {
    let dir = Path::new("/parts");
    let settings = settings();
    let mut host = host_with_images(dir);
    let job = ArrangeJob {
        image_dir: dir,
        settings: &settings,
        progress: false,
    };
    arrange(&plan(), &job, &mut host).unwrap();

    let first: Vec<Point> = host
        .layers_on(CanvasId(0))
        .iter()
        .map(|b| b.center())
        .collect();
    assert_eq!(first.len(), 2);
    assert_close(first[0], Point::new(400.0, 500.0));
    assert_close(first[1], Point::new(1100.0, 1200.0));

    // 2枚目のシートは縦オフセット 100 を差し引く
    let second = host.layers_on(CanvasId(1));
    assert_eq!(second.len(), 1);
    assert_close(second[0].center(), Point::new(400.0, 400.0));
}

#[test]
fn test_arrange_flushes_once_at_end() {
    let dir = Path::new("/parts");
    let settings = settings();
    let mut host = host_with_images(dir);
    let job = ArrangeJob {
        image_dir: dir,
        settings: &settings,
        progress: false,
    };
    arrange(&plan(), &job, &mut host).unwrap();

    let flushes = host
        .calls()
        .iter()
        .filter(|c| **c == HostCall::Flush)
        .count();
    assert_eq!(flushes, 1);
    assert_eq!(host.calls().last(), Some(&HostCall::Flush));
}

#[test]
fn test_arrange_outline_strokes_part_bbox() {
    let dir = Path::new("/parts");
    let settings = Settings {
        outline: true,
        ..settings()
    };
    let mut host = host_with_images(dir);
    let job = ArrangeJob {
        image_dir: dir,
        settings: &settings,
        progress: false,
    };
    arrange(&plan(), &job, &mut host).unwrap();

    let rects: Vec<BBox> = host
        .calls()
        .iter()
        .filter_map(|c| match c {
            HostCall::StrokeRect { rect, .. } => Some(*rect),
            _ => None,
        })
        .collect();
    assert_eq!(rects.len(), 3);
    assert_eq!(rects[0], BBox::from_rect(200.0, 400.0, 400.0, 200.0));
    assert_eq!(rects[2], BBox::from_rect(100.0, 100.0, 600.0, 600.0));
}

#[test]
fn test_arrange_without_outline_never_strokes() {
    let dir = Path::new("/parts");
    let settings = settings();
    let mut host = host_with_images(dir);
    let job = ArrangeJob {
        image_dir: dir,
        settings: &settings,
        progress: false,
    };
    arrange(&plan(), &job, &mut host).unwrap();

    assert!(!host
        .calls()
        .iter()
        .any(|c| matches!(c, HostCall::StrokeRect { .. })));
}

#[test]
fn test_arrange_aborts_on_missing_image_without_flush() {
    let dir = Path::new("/parts");
    let settings = settings();
    let mut host = MockHost::new().with_image(dir.join("gear.png"), 40, 20);
    let job = ArrangeJob {
        image_dir: dir,
        settings: &settings,
        progress: false,
    };

    let err = arrange(&plan(), &job, &mut host).unwrap_err();
    match err.innermost() {
        ArrangeError::ImageNotFound(path) => assert_eq!(path, &dir.join("bracket.png")),
        other => panic!("unexpected error: {other}"),
    }
    let context = err.context();
    assert_eq!(context.sheet, Some(1));
    assert_eq!(context.part.as_deref(), Some("p1"));
    assert_eq!(context.file_path, Some(dir.join("bracket.png")));
    assert!(!host.calls().contains(&HostCall::Flush));
}

#[test]
fn test_arrange_uses_configured_extension() {
    let dir = Path::new("/parts");
    let settings = Settings {
        ext: "jpg".to_string(),
        ..settings()
    };
    let doc = LayoutDocument::parse(&LAYOUT.replace(".png", ".jpg"), "jpg").unwrap();
    let plan = plan_layout(&doc, settings.ppi).unwrap();
    let mut host = MockHost::new()
        .with_image(dir.join("gear.jpg"), 40, 20)
        .with_image(dir.join("bracket.jpg"), 40, 20)
        .with_image(dir.join("plate.jpg"), 60, 60);
    let job = ArrangeJob {
        image_dir: dir,
        settings: &settings,
        progress: false,
    };

    assert_eq!(arrange(&plan, &job, &mut host).unwrap().parts, 3);
}

#[test]
fn test_outline_rect_subtracts_sheet_offset() {
    let unit_scale = UnitScale {
        scale: 2.0,
        pixels_per_unit: 10.0,
    };
    let mut p = placement(0.0, Point::new(0.0, 0.0));
    p.bbox = BBox::from_rect(5.0, 105.0, 30.0, 30.0);
    assert_eq!(
        outline_rect(&p, 100.0, &unit_scale),
        BBox::from_rect(100.0, 100.0, 600.0, 600.0)
    );
}

#[test]
fn test_arrange_dir_reads_layout_file() {
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join("output.svg"), LAYOUT).unwrap();
    let settings = settings();
    let mut host = host_with_images(temp.path());

    let report = arrange_dir(temp.path(), &settings, &mut host, false).unwrap();
    assert_eq!(report.parts, 3);
    assert_eq!(report.total_offset, 150.0);
}

#[test]
fn test_arrange_dir_missing_layout_file() {
    let temp = TempDir::new().unwrap();
    let mut host = MockHost::new();
    let err = arrange_dir(temp.path(), &settings(), &mut host, false).unwrap_err();
    assert!(matches!(err, ArrangeError::ReadFile { .. }));
}

#[test]
fn test_arrange_dir_oversized_canvas_is_error() {
    let temp = TempDir::new().unwrap();
    std::fs::write(
        temp.path().join("output.svg"),
        LAYOUT.replace("200mm", "1e200mm"),
    )
    .unwrap();
    let mut host = host_with_images(temp.path());

    let err = arrange_dir(temp.path(), &settings(), &mut host, false).unwrap_err();
    assert!(matches!(err, ArrangeError::CanvasTooLarge { sheet: 0, .. }));
    assert!(host.calls().is_empty());
}
