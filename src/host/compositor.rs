//! Window stack for the terminal desktop.
//!
//! Surfaces live in desktop pixels; the compositor converts to cells only
//! when asked. Pinned surfaces always stack above unpinned ones.

use std::collections::BTreeMap;

use ratatui::layout::Rect as CellRect;

use crate::constants::SHADOW_MARGIN;
use crate::geometry::{Point, Rect};
use crate::window::{WidgetId, ZBand};

/// Desktop pixels covered by one terminal cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellScale {
    pub width: i32,
    pub height: i32,
}

impl Default for CellScale {
    fn default() -> Self {
        Self {
            width: 10,
            height: 20,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Surface {
    pub frame: Rect,
    pub opacity: f32,
    pub click_through: bool,
    pub pinned: bool,
}

#[derive(Debug)]
pub struct Compositor {
    scale: CellScale,
    screen: Rect,
    surfaces: BTreeMap<WidgetId, Surface>,
    /// Bottom to top.
    stack: Vec<WidgetId>,
}

impl Compositor {
    pub fn new(scale: CellScale) -> Self {
        Self {
            scale,
            screen: Rect::default(),
            surfaces: BTreeMap::new(),
            stack: Vec::new(),
        }
    }

    pub fn scale(&self) -> CellScale {
        self.scale
    }

    pub fn screen(&self) -> Rect {
        self.screen
    }

    /// Resize the desktop to a grid of `cols` x `rows` cells.
    pub fn set_grid(&mut self, cols: u16, rows: u16) {
        self.screen = Rect::new(
            0,
            0,
            i32::from(cols) * self.scale.width,
            i32::from(rows) * self.scale.height,
        );
    }

    pub fn insert(&mut self, id: WidgetId, surface: Surface) {
        self.stack.retain(|s| s != &id);
        self.stack.push(id.clone());
        self.surfaces.insert(id, surface);
    }

    pub fn remove(&mut self, id: &WidgetId) -> Option<Surface> {
        self.stack.retain(|s| s != id);
        self.surfaces.remove(id)
    }

    pub fn surface(&self, id: &WidgetId) -> Option<&Surface> {
        self.surfaces.get(id)
    }

    pub fn surface_mut(&mut self, id: &WidgetId) -> Option<&mut Surface> {
        self.surfaces.get_mut(id)
    }

    pub fn raise(&mut self, id: &WidgetId) -> bool {
        let Some(pos) = self.stack.iter().position(|s| s == id) else {
            return false;
        };
        let id = self.stack.remove(pos);
        self.stack.push(id);
        true
    }

    fn lower(&mut self, id: &WidgetId) -> bool {
        let Some(pos) = self.stack.iter().position(|s| s == id) else {
            return false;
        };
        let id = self.stack.remove(pos);
        self.stack.insert(0, id);
        true
    }

    pub fn apply_z_band(&mut self, id: &WidgetId, band: ZBand) -> bool {
        let Some(surface) = self.surfaces.get_mut(id) else {
            return false;
        };
        surface.pinned = band == ZBand::PinnedAbove;
        match band {
            ZBand::PinnedAbove => self.raise(id),
            ZBand::SentToBottom => self.lower(id),
            ZBand::Normal => true,
        }
    }

    /// Paint order, bottom first.
    pub fn draw_order(&self) -> Vec<WidgetId> {
        let pinned = |id: &WidgetId| self.surfaces.get(id).is_some_and(|s| s.pinned);
        let mut order: Vec<WidgetId> = self.stack.iter().filter(|id| !pinned(id)).cloned().collect();
        order.extend(self.stack.iter().filter(|id| pinned(id)).cloned());
        order
    }

    /// Topmost surface whose card is under `point`. Click-through surfaces
    /// and the transparent shadow margin never receive the pointer.
    pub fn hit_test(&self, point: Point) -> Option<WidgetId> {
        self.draw_order().into_iter().rev().find(|id| {
            self.surfaces
                .get(id)
                .is_some_and(|s| !s.click_through && s.frame.inset(SHADOW_MARGIN).contains(point))
        })
    }

    /// Desktop point at the centre of a cell.
    pub fn cell_to_desktop(&self, col: u16, row: u16) -> Point {
        Point::new(
            i32::from(col) * self.scale.width + self.scale.width / 2,
            i32::from(row) * self.scale.height + self.scale.height / 2,
        )
    }

    /// Cells covered by `rect`, clipped to the visible grid.
    pub fn to_cells(&self, rect: Rect) -> Option<CellRect> {
        let sw = self.scale.width.max(1);
        let sh = self.scale.height.max(1);
        let x0 = rect.x.max(self.screen.x).div_euclid(sw);
        let y0 = rect.y.max(self.screen.y).div_euclid(sh);
        let x1 = (rect.right().min(self.screen.right()) + sw - 1).div_euclid(sw);
        let y1 = (rect.bottom().min(self.screen.bottom()) + sh - 1).div_euclid(sh);
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some(CellRect::new(
            u16::try_from(x0).ok()?,
            u16::try_from(y0).ok()?,
            u16::try_from(x1 - x0).ok()?,
            u16::try_from(y1 - y0).ok()?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn surface(x: i32, y: i32) -> Surface {
        Surface {
            frame: Rect::new(x, y, 240, 240),
            opacity: 1.0,
            click_through: false,
            pinned: false,
        }
    }

    fn ids(v: &[&str]) -> Vec<WidgetId> {
        v.iter().map(|s| WidgetId::from(*s)).collect()
    }

    #[test]
    fn pinned_surfaces_draw_above_raised_ones() {
        let mut c = Compositor::new(CellScale::default());
        c.insert("a".into(), surface(0, 0));
        c.insert("b".into(), surface(0, 0));
        c.apply_z_band(&"a".into(), ZBand::PinnedAbove);
        c.raise(&"b".into());
        assert_eq!(c.draw_order(), ids(&["b", "a"]));
    }

    #[test]
    fn send_to_bottom_reorders_once() {
        let mut c = Compositor::new(CellScale::default());
        c.insert("a".into(), surface(0, 0));
        c.insert("b".into(), surface(0, 0));
        c.apply_z_band(&"b".into(), ZBand::SentToBottom);
        assert_eq!(c.draw_order(), ids(&["b", "a"]));
        c.raise(&"b".into());
        assert_eq!(c.draw_order(), ids(&["a", "b"]));
    }

    #[test]
    fn click_through_and_shadow_margin_pass_the_pointer() {
        let mut c = Compositor::new(CellScale::default());
        c.insert("under".into(), surface(0, 0));
        c.insert("over".into(), surface(0, 0));
        assert_eq!(c.hit_test(Point::new(50, 50)), Some("over".into()));

        c.surface_mut(&"over".into()).unwrap().click_through = true;
        assert_eq!(c.hit_test(Point::new(50, 50)), Some("under".into()));

        c.surface_mut(&"over".into()).unwrap().click_through = false;
        assert_eq!(c.hit_test(Point::new(50, 50)), Some("over".into()));
        assert_eq!(c.hit_test(Point::new(5, 5)), None);
    }

    #[test]
    fn cell_mapping_clips_to_screen() {
        let mut c = Compositor::new(CellScale::default());
        c.set_grid(80, 24);
        assert_eq!(c.screen(), Rect::new(0, 0, 800, 480));
        assert_eq!(
            c.to_cells(Rect::new(100, 100, 220, 220)),
            Some(CellRect::new(10, 5, 22, 11))
        );
        assert_eq!(
            c.to_cells(Rect::new(-50, 400, 100, 200)),
            Some(CellRect::new(0, 20, 5, 4))
        );
        assert_eq!(c.to_cells(Rect::new(900, 0, 50, 50)), None);
        assert_eq!(c.cell_to_desktop(2, 1), Point::new(25, 30));
    }
}
