//! Terminal desktop: the compositor plays the part of the OS window system
//! so the engine runs end to end inside a terminal.

pub mod compositor;
pub mod render;
pub mod theme;

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::{Result, WidgetError};
use crate::geometry::{Point, Rect};
use crate::window::{DesktopHost, NativeWindowCapability, WidgetId, ZBand};

pub use compositor::{CellScale, Compositor, Surface};

pub type SharedCompositor = Rc<RefCell<Compositor>>;

/// Native handle for one compositor surface.
pub struct TermWindow {
    id: WidgetId,
    compositor: SharedCompositor,
}

impl TermWindow {
    fn with_surface(&self, f: impl FnOnce(&mut Surface)) -> Result<()> {
        let mut compositor = self.compositor.borrow_mut();
        let surface = compositor
            .surface_mut(&self.id)
            .ok_or_else(|| WidgetError::native(format!("surface {} is gone", self.id)))?;
        f(surface);
        Ok(())
    }
}

impl NativeWindowCapability for TermWindow {
    fn set_click_through(&mut self, enabled: bool) -> Result<()> {
        self.with_surface(|s| s.click_through = enabled)
    }

    fn set_z_band(&mut self, band: ZBand) -> Result<()> {
        if self.compositor.borrow_mut().apply_z_band(&self.id, band) {
            Ok(())
        } else {
            Err(WidgetError::native(format!("surface {} is gone", self.id)))
        }
    }

    fn set_frame(&mut self, frame: Rect) -> Result<()> {
        self.with_surface(|s| s.frame = frame)
    }

    fn set_opacity(&mut self, opacity: f32) -> Result<()> {
        self.with_surface(|s| s.opacity = opacity)
    }

    fn raise(&mut self) -> Result<()> {
        if self.compositor.borrow_mut().raise(&self.id) {
            Ok(())
        } else {
            Err(WidgetError::native(format!("surface {} is gone", self.id)))
        }
    }

    fn close(&mut self) -> Result<()> {
        self.compositor
            .borrow_mut()
            .remove(&self.id)
            .map(|_| ())
            .ok_or_else(|| WidgetError::native(format!("surface {} is gone", self.id)))
    }
}

pub struct TermDesktop {
    compositor: SharedCompositor,
}

impl TermDesktop {
    pub fn new(compositor: SharedCompositor) -> Self {
        Self { compositor }
    }
}

impl DesktopHost for TermDesktop {
    fn create_window(
        &mut self,
        id: &WidgetId,
        frame: Rect,
        opacity: f32,
    ) -> Result<Box<dyn NativeWindowCapability>> {
        self.compositor.borrow_mut().insert(
            id.clone(),
            Surface {
                frame,
                opacity,
                click_through: false,
                pinned: false,
            },
        );
        Ok(Box::new(TermWindow {
            id: id.clone(),
            compositor: Rc::clone(&self.compositor),
        }))
    }

    /// The terminal is a single monitor.
    fn screen_at(&self, _point: Point) -> Rect {
        self.compositor.borrow().screen()
    }
}
