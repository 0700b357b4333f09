use floorkit_core::model::{Label, Wall};
use floorkit_core::PlanModel;
use floorkit_plan::{CancellationToken, Exportable, PlanView, TextMetrics, ViewServices};
use floorkit_settings::Config;
use std::sync::Arc;

fn view_with_walls() -> PlanView {
    let mut model = PlanModel::new();
    let wall = Wall::new(0.0, 0.0, 400.0, 0.0, 20.0);
    let id = wall.id;
    model.walls.push(wall);
    model.walls.push(Wall::new(400.0, 0.0, 400.0, 300.0, 20.0));
    model.selection.insert(id);
    PlanView::new(Arc::new(model), &Config::default(), ViewServices::default())
        .with_text_metrics(TextMetrics::approximate())
}

#[test]
fn test_vector_export_is_an_svg_document() {
    let mut view = view_with_walls();
    let mut out = Vec::new();
    view.export_vector(&mut out, &CancellationToken::new())
        .unwrap();
    let svg = String::from_utf8(out).unwrap();
    assert!(svg.starts_with("<?xml"));
    assert!(svg.contains("<svg"));
    assert!(svg.trim_end().ends_with("</svg>"));
}

#[test]
fn test_cancelled_file_export_leaves_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("plan.svg");
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = view_with_walls()
        .export_vector_to_file(&path, &cancel)
        .unwrap_err();
    assert!(err.is_interrupted());
    assert!(!path.exists());
}

#[test]
fn test_file_export_writes_document() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("plan.svg");
    view_with_walls()
        .export_vector_to_file(&path, &CancellationToken::new())
        .unwrap();
    let svg = std::fs::read_to_string(&path).unwrap();
    assert!(svg.contains("<svg"));
}

#[test]
fn test_clipboard_png_holds_selected_wall() {
    let mut view = view_with_walls();
    let image = view.export_clipboard_image().unwrap();
    // 400 x 20 wall plus half a wall stroke and the margin on each side
    assert_eq!(image.width(), 482);
    assert_eq!(image.height(), 102);

    let mut png = Vec::new();
    view.export_clipboard_png(&mut png).unwrap();
    assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    let decoded = image::load_from_memory(&png).unwrap().to_rgba8();
    assert_eq!(decoded.dimensions(), image.dimensions());
}

#[test]
fn test_label_only_plan_exports() {
    let mut model = PlanModel::new();
    model.labels.push(Label::new("Kitchen", 50.0, 50.0));
    let mut view = PlanView::new(Arc::new(model), &Config::default(), ViewServices::default())
        .with_text_metrics(TextMetrics::approximate());
    let mut out = Vec::new();
    view.export_vector(&mut out, &CancellationToken::new())
        .unwrap();
    assert!(String::from_utf8(out).unwrap().contains("<svg"));
}
