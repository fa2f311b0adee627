// Copyright 2025 the Whitebox Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tests for the `whitebox_canvas` mouse modes.
//!
//! Each test draws a map into the reference backend first, so gestures are
//! resolved against the viewport a user would actually see.

use kurbo::{Point, Size, Vec2};
use whitebox_canvas::{Gesture, MapCanvas, MouseButton, MouseMode, StatusReadout};
use whitebox_extent::BoundingBox;
use whitebox_imaging_ref::RefBackend;
use whitebox_map::memory::MemoryRaster;
use whitebox_map::{MapModel, MapRenderer, PaletteLibrary, RasterLayer, RenderConfig};
use whitebox_view::ViewportTransform;

fn map() -> MapModel {
    let palettes = PaletteLibrary::with_builtin();
    let full = BoundingBox::new(0.0, 0.0, 100.0, 100.0);
    let source = MemoryRaster::from_fn("dem.dep", 10, 10, full, |r, c| (r * 10 + c) as f64);
    let mut m = MapModel::new("gestures");
    m.add_layer(RasterLayer::new(Box::new(source), &palettes));
    m
}

fn draw(m: &mut MapModel) -> ViewportTransform {
    let mut renderer = MapRenderer::new(RenderConfig {
        border: 0.0,
        ..RenderConfig::default()
    });
    renderer
        .render(m, Size::new(100.0, 100.0), &mut RefBackend::default())
        .unwrap()
        .viewport
}

fn click(
    canvas: &mut MapCanvas,
    m: &mut MapModel,
    vp: &ViewportTransform,
    at: Point,
    button: MouseButton,
    count: u32,
) -> Option<Gesture> {
    canvas.pointer_down(at, button);
    canvas.pointer_up(m, vp, at, count)
}

fn assert_box_eq(a: BoundingBox, b: BoundingBox) {
    assert!((a.min_x() - b.min_x()).abs() < 1e-9, "{a:?} != {b:?}");
    assert!((a.min_y() - b.min_y()).abs() < 1e-9, "{a:?} != {b:?}");
    assert!((a.max_x() - b.max_x()).abs() < 1e-9, "{a:?} != {b:?}");
    assert!((a.max_y() - b.max_y()).abs() < 1e-9, "{a:?} != {b:?}");
}

#[test]
fn zoom_drag_sets_the_dragged_rectangle() {
    let mut m = map();
    let vp = draw(&mut m);
    let mut canvas = MapCanvas::new(MouseMode::Zoom);

    canvas.pointer_down(Point::new(20.0, 30.0), MouseButton::Primary);
    canvas.pointer_move(&m, &vp, Point::new(60.0, 80.0));
    assert!(canvas.rubber_band().is_some());
    let g = canvas.pointer_up(&mut m, &vp, Point::new(60.0, 80.0), 1);

    let expected = BoundingBox::new(20.0, 20.0, 60.0, 70.0);
    assert!(matches!(g, Some(Gesture::ZoomToRect(_))));
    assert_box_eq(m.current_extent(), expected);
    assert!(canvas.rubber_band().is_none());
}

#[test]
fn pan_drag_translates_by_the_drag() {
    let mut m = map();
    let vp = draw(&mut m);
    let mut canvas = MapCanvas::new(MouseMode::Pan);

    canvas.pointer_down(Point::new(50.0, 50.0), MouseButton::Primary);
    canvas.pointer_move(&m, &vp, Point::new(60.0, 40.0));
    assert!(canvas.rubber_band().is_none());
    let g = canvas.pointer_up(&mut m, &vp, Point::new(60.0, 40.0), 1);

    // Dragging right and up moves the view west and south.
    let Some(Gesture::Pan(delta)) = g else {
        panic!("expected a pan, got {g:?}");
    };
    assert!((delta - Vec2::new(-10.0, -10.0)).hypot() < 1e-9);
    assert_box_eq(m.current_extent(), BoundingBox::new(-10.0, -10.0, 90.0, 90.0));
}

#[test]
fn clicks_in_zoom_mode_centre_and_zoom() {
    let mut m = map();
    let vp = draw(&mut m);
    let mut canvas = MapCanvas::new(MouseMode::Zoom);

    let g = click(&mut canvas, &mut m, &vp, Point::new(25.0, 75.0), MouseButton::Primary, 1);
    assert!(matches!(g, Some(Gesture::ZoomInAt(_))));
    let e = m.current_extent();
    assert!((e.center().x - 25.0).abs() < 1e-9);
    assert!((e.center().y - 25.0).abs() < 1e-9);
    assert!((e.width() - 80.0).abs() < 1e-9);

    let vp = draw(&mut m);
    let g = click(&mut canvas, &mut m, &vp, Point::new(50.0, 50.0), MouseButton::Secondary, 1);
    assert!(matches!(g, Some(Gesture::ZoomOutAt(_))));
    assert!((m.current_extent().width() - 96.0).abs() < 1e-9);
}

#[test]
fn secondary_double_click_resets_to_full_extent() {
    let mut m = map();
    m.set_current_extent(BoundingBox::new(10.0, 10.0, 20.0, 20.0));
    let vp = draw(&mut m);
    let mut canvas = MapCanvas::new(MouseMode::Pan);

    let g = click(&mut canvas, &mut m, &vp, Point::new(5.0, 5.0), MouseButton::Secondary, 2);
    assert_eq!(g, Some(Gesture::FullExtent));
    assert_eq!(m.current_extent(), BoundingBox::new(0.0, 0.0, 100.0, 100.0));

    // A primary double click does nothing.
    let vp = draw(&mut m);
    let g = click(&mut canvas, &mut m, &vp, Point::new(5.0, 5.0), MouseButton::Primary, 2);
    assert_eq!(g, None);
}

#[test]
fn select_mode_leaves_the_view_alone() {
    let mut m = map();
    let vp = draw(&mut m);
    let before = m.current_extent();
    let mut canvas = MapCanvas::new(MouseMode::Select);

    canvas.pointer_down(Point::new(10.0, 10.0), MouseButton::Primary);
    canvas.pointer_move(&m, &vp, Point::new(90.0, 90.0));
    assert_eq!(canvas.pointer_up(&mut m, &vp, Point::new(90.0, 90.0), 1), None);
    assert_eq!(click(&mut canvas, &mut m, &vp, Point::new(10.0, 10.0), MouseButton::Primary, 1), None);
    assert_eq!(m.current_extent(), before);
}

#[test]
fn info_clicks_pick_cells_and_edits_write_back() {
    let mut m = map();
    let vp = draw(&mut m);
    let mut canvas = MapCanvas::new(MouseMode::Info);

    let Some(Gesture::PickCell(cell)) =
        click(&mut canvas, &mut m, &vp, Point::new(35.0, 15.0), MouseButton::Primary, 1)
    else {
        panic!("expected a picked cell");
    };
    assert_eq!((cell.row, cell.column), (1, 3));
    assert_eq!(cell.z, 13.0);

    canvas.edit_cell(&mut m, &cell, 500.0).unwrap();
    let vp = draw(&mut m);
    let again = StatusReadout::at(&m, &vp, Point::new(35.0, 15.0));
    assert_eq!(again.cell.z, 500.0);
}

#[test]
fn pixel_editing_overrides_zoom_clicks() {
    let mut m = map();
    let vp = draw(&mut m);
    let before = m.current_extent();
    let mut canvas = MapCanvas::new(MouseMode::Zoom);
    canvas.set_modifying_pixels(true);

    let g = click(&mut canvas, &mut m, &vp, Point::new(5.0, 5.0), MouseButton::Primary, 1);
    assert!(matches!(g, Some(Gesture::PickCell(_))));
    assert_eq!(m.current_extent(), before);
}

#[test]
fn changing_mode_drops_the_gesture() {
    let mut m = map();
    let vp = draw(&mut m);
    let mut canvas = MapCanvas::new(MouseMode::Zoom);
    canvas.pointer_down(Point::new(10.0, 10.0), MouseButton::Primary);
    canvas.pointer_move(&m, &vp, Point::new(50.0, 50.0));
    canvas.set_mode(MouseMode::Pan);
    assert_eq!(canvas.pointer_up(&mut m, &vp, Point::new(50.0, 50.0), 1), None);
}

#[test]
fn status_line_text() {
    let mut m = map();
    let vp = draw(&mut m);
    let mut canvas = MapCanvas::new(MouseMode::Zoom);

    let status = canvas.pointer_move(&m, &vp, Point::new(35.0, 15.0));
    assert_eq!(status.to_string(), "E: 35.0  N: 85.0  Row: 1  Col: 3  Z: 13");

    let mut wide = MapModel::new("wide");
    wide.set_current_extent(BoundingBox::new(1000.0, 0.0, 2000.0, 1000.0));
    let vp = ViewportTransform::new(Size::new(100.0, 100.0), 0.0, wide.current_extent()).unwrap();
    let status = canvas.pointer_move(&wide, &vp, Point::new(50.0, 50.0));
    assert_eq!(status.to_string(), "E: 1,500.0  N: 500.0");
}
