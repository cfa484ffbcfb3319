mod support;

use desk_widgets::geometry::Point;
use desk_widgets::layout::PointerOutcome;
use desk_widgets::renderer::RendererState;
use desk_widgets::window::{PointerEvent, SizeClass, WidgetId, WidgetKind, WidgetManager};
use support::{drag_to, frame_of, manager};

fn add(m: &mut WidgetManager) -> WidgetId {
    m.add_widget(RendererState::empty(WidgetKind::Clock), SizeClass::Medium)
        .unwrap()
}

#[test]
fn drag_near_screen_edge_lands_flush() {
    let dir = tempfile::tempdir().unwrap();
    let doc = dir.path().join("config.json");
    let (mut m, compositor) = manager(&doc);
    let id = add(&mut m);

    drag_to(&mut m, &id, Point::new(15, 300));
    assert_eq!(frame_of(&m, &id).origin(), Point::new(0, 300));
    assert_eq!(
        compositor.borrow().surface(&id).unwrap().frame.origin(),
        Point::new(0, 300)
    );

    // Bottom edge: a 240px frame at y=830 ends 10px above 1080.
    drag_to(&mut m, &id, Point::new(700, 830));
    assert_eq!(frame_of(&m, &id).origin(), Point::new(700, 840));
}

#[test]
fn indicator_is_shown_only_while_snapped() {
    let dir = tempfile::tempdir().unwrap();
    let (mut m, _c) = manager(&dir.path().join("config.json"));
    let id = add(&mut m);

    m.pointer(&id, PointerEvent::down(120, 120)).unwrap();
    m.pointer(&id, PointerEvent::moved(28, 400)).unwrap();
    let strip = m.paint_overlay(&id).unwrap().indicator.unwrap();
    assert_eq!((strip.x, strip.y), (0, 0));
    assert_eq!(strip.height, 240);

    m.pointer(&id, PointerEvent::moved(500, 400)).unwrap();
    assert!(m.paint_overlay(&id).unwrap().indicator.is_none());
    m.pointer(&id, PointerEvent::up(500, 400)).unwrap();
    assert_eq!(frame_of(&m, &id).origin(), Point::new(480, 380));
}

#[test]
fn sibling_edge_attracts_and_nearest_sibling_wins() {
    let dir = tempfile::tempdir().unwrap();
    let (mut m, _c) = manager(&dir.path().join("config.json"));
    let a = add(&mut m);
    let b = add(&mut m);
    let c = add(&mut m);

    drag_to(&mut m, &a, Point::new(600, 400));
    // c lands on a's bottom edge, stacked under it and offset 10px right.
    drag_to(&mut m, &c, Point::new(610, 648));
    assert_eq!(frame_of(&m, &c).origin(), Point::new(610, 640));

    // b's right edge is 5px from a and 15px from c; a is nearer.
    drag_to(&mut m, &b, Point::new(355, 560));
    assert_eq!(frame_of(&m, &b).origin(), Point::new(360, 560));
}

#[test]
fn edges_that_do_not_overlap_on_the_other_axis_are_ignored() {
    let dir = tempfile::tempdir().unwrap();
    let (mut m, _c) = manager(&dir.path().join("config.json"));
    let a = add(&mut m);
    let b = add(&mut m);
    drag_to(&mut m, &a, Point::new(600, 400));

    drag_to(&mut m, &b, Point::new(355, 700));
    assert_eq!(frame_of(&m, &b).origin(), Point::new(355, 700));
}

#[test]
fn threshold_is_exclusive_and_adjustable() {
    let dir = tempfile::tempdir().unwrap();
    let (mut m, _c) = manager(&dir.path().join("config.json"));
    let a = add(&mut m);
    let b = add(&mut m);
    drag_to(&mut m, &a, Point::new(600, 400));

    assert_eq!(m.set_snap_threshold(5), 5);
    drag_to(&mut m, &b, Point::new(355, 500));
    assert_eq!(frame_of(&m, &b).origin(), Point::new(355, 500));

    m.set_snap_threshold(6);
    drag_to(&mut m, &b, Point::new(356, 500));
    assert_eq!(frame_of(&m, &b).origin(), Point::new(360, 500));
}

#[test]
fn closed_widget_is_no_longer_a_target() {
    let dir = tempfile::tempdir().unwrap();
    let (mut m, _c) = manager(&dir.path().join("config.json"));
    let a = add(&mut m);
    let b = add(&mut m);
    drag_to(&mut m, &a, Point::new(600, 400));
    m.close_widget(&a).unwrap();

    drag_to(&mut m, &b, Point::new(355, 500));
    assert_eq!(frame_of(&m, &b).origin(), Point::new(355, 500));
}

#[test]
fn disabled_snapping_keeps_the_raw_position() {
    let dir = tempfile::tempdir().unwrap();
    let (mut m, _c) = manager(&dir.path().join("config.json"));
    let id = add(&mut m);
    m.set_snap_enabled(false);

    m.pointer(&id, PointerEvent::down(120, 120)).unwrap();
    let out = m.pointer(&id, PointerEvent::moved(35, 320)).unwrap();
    assert_eq!(
        out,
        PointerOutcome::Moved {
            origin: Point::new(15, 300),
            snap: None,
        }
    );
    m.pointer(&id, PointerEvent::up(35, 320)).unwrap();
    assert_eq!(frame_of(&m, &id).origin(), Point::new(15, 300));
}
