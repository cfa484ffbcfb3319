#![allow(dead_code)]

use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

use desk_widgets::geometry::{Point, Rect};
use desk_widgets::host::{CellScale, Compositor, SharedCompositor, TermDesktop};
use desk_widgets::persistence::LayoutPersistence;
use desk_widgets::renderer::{BasicRendererFactory, RendererFactory};
use desk_widgets::window::{PointerEvent, WidgetId, WidgetManager};

/// Terminal desktop of 192x54 cells, i.e. a 1920x1080 screen.
pub fn desktop() -> SharedCompositor {
    let compositor = Rc::new(RefCell::new(Compositor::new(CellScale::default())));
    compositor.borrow_mut().set_grid(192, 54);
    compositor
}

pub fn manager_with(
    document: &Path,
    compositor: &SharedCompositor,
    renderers: Box<dyn RendererFactory>,
) -> WidgetManager {
    WidgetManager::new(
        Box::new(TermDesktop::new(Rc::clone(compositor))),
        renderers,
        LayoutPersistence::new(document),
    )
}

pub fn manager(document: &Path) -> (WidgetManager, SharedCompositor) {
    let compositor = desktop();
    let m = manager_with(document, &compositor, Box::new(BasicRendererFactory));
    (m, compositor)
}

/// Press inside the card near its top-left, drag so the frame origin lands
/// on `to`, release.
pub fn drag_to(m: &mut WidgetManager, id: &WidgetId, to: Point) {
    let frame = m.registry().get(id).expect("widget").frame();
    let grab = Point::new(frame.x + 20, frame.y + 20);
    m.pointer(id, PointerEvent::down(grab.x, grab.y)).unwrap();
    m.pointer(id, PointerEvent::moved(to.x + 20, to.y + 20)).unwrap();
    m.pointer(id, PointerEvent::up(to.x + 20, to.y + 20)).unwrap();
}

pub fn frame_of(m: &WidgetManager, id: &WidgetId) -> Rect {
    m.registry().get(id).expect("widget").frame()
}
