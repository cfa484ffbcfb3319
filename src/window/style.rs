use std::collections::HashMap;

use crate::error::Result;
use crate::geometry::Rect;

use super::{WidgetId, WidgetInstance, ZBand};

/// Native window operations the engine relies on.
///
/// Implemented by whatever owns real windows (an OS binding, the terminal
/// compositor, a recording mock in tests).
pub trait NativeWindowCapability {
    /// `true` makes the window transparent to pointer hit-testing.
    fn set_click_through(&mut self, enabled: bool) -> Result<()>;
    fn set_z_band(&mut self, band: ZBand) -> Result<()>;
    fn set_frame(&mut self, frame: Rect) -> Result<()>;
    fn set_opacity(&mut self, opacity: f32) -> Result<()>;
    fn raise(&mut self) -> Result<()>;
    fn close(&mut self) -> Result<()>;
}

#[derive(Debug, Clone, Copy, Default)]
struct Applied {
    click_through: Option<bool>,
    pinned: Option<bool>,
}

/// Maps logical click-through and z-band flags onto native windows.
///
/// Remembers the last value successfully applied to each window so repeated
/// requests never reach the native layer. Native failures are logged and
/// leave the cache untouched, so the next request retries.
#[derive(Debug, Default)]
pub struct WindowStyleController {
    applied: HashMap<WidgetId, Applied>,
}

impl WindowStyleController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the attributes a freshly created native window starts with.
    pub fn track(&mut self, id: &WidgetId) {
        self.applied.insert(
            id.clone(),
            Applied {
                click_through: Some(false),
                pinned: Some(false),
            },
        );
    }

    pub fn forget(&mut self, id: &WidgetId) {
        self.applied.remove(id);
    }

    pub fn set_click_through(
        &mut self,
        instance: &mut WidgetInstance,
        native: &mut dyn NativeWindowCapability,
        enabled: bool,
    ) {
        instance.click_through = enabled;
        let applied = self.applied.entry(instance.id.clone()).or_default();
        if applied.click_through == Some(enabled) {
            return;
        }
        match native.set_click_through(enabled) {
            Ok(()) => {
                applied.click_through = Some(enabled);
                tracing::debug!(widget_id = %instance.id, enabled, "click-through applied");
            }
            Err(err) => {
                tracing::warn!(widget_id = %instance.id, enabled, error = %err, "click-through not applied");
            }
        }
    }

    pub fn set_z_band(
        &mut self,
        instance: &mut WidgetInstance,
        native: &mut dyn NativeWindowCapability,
        band: ZBand,
    ) {
        instance.z_band = band;
        let applied = self.applied.entry(instance.id.clone()).or_default();
        let pinned = band == ZBand::PinnedAbove;
        // Sending to the bottom is a reorder, so it always reaches the native layer.
        if band != ZBand::SentToBottom && applied.pinned == Some(pinned) {
            return;
        }
        match native.set_z_band(band) {
            Ok(()) => {
                applied.pinned = Some(pinned);
                tracing::debug!(widget_id = %instance.id, band = ?band, "z-band applied");
            }
            Err(err) => {
                tracing::warn!(widget_id = %instance.id, band = ?band, error = %err, "z-band not applied");
            }
        }
    }

    /// Re-apply pinning to a pinned window regardless of the cache. Returns
    /// whether the native call was made and succeeded.
    pub fn reassert_pinned(
        &mut self,
        instance: &WidgetInstance,
        native: &mut dyn NativeWindowCapability,
    ) -> bool {
        if instance.z_band != ZBand::PinnedAbove {
            return false;
        }
        match native.set_z_band(ZBand::PinnedAbove) {
            Ok(()) => {
                self.applied.entry(instance.id.clone()).or_default().pinned = Some(true);
                true
            }
            Err(err) => {
                tracing::warn!(widget_id = %instance.id, error = %err, "pin not reasserted");
                false
            }
        }
    }
}
