mod manager;
mod registry;
mod style;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_OPACITY, MAX_OPACITY, MIN_OPACITY, WIDGET_ID_LEN};
use crate::geometry::{Point, Rect, Size};
use crate::layout::{clamp_content_size, frame_size};
use crate::renderer::RendererState;

pub use manager::{
    DesktopHost, OverlayPaint, PointerEvent, PointerKind, WidgetManager, WidgetSummary,
};
pub use registry::WidgetRegistry;
pub use style::{NativeWindowCapability, WindowStyleController};

/// Stable widget identifier; the first characters of a random UUID.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WidgetId(String);

impl WidgetId {
    pub fn generate() -> Self {
        let uuid = uuid::Uuid::new_v4().simple().to_string();
        Self(uuid[..WIDGET_ID_LEN].to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WidgetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for WidgetId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for WidgetId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WidgetKind {
    Clock,
    SystemMonitor,
    Timer,
    Notes,
    Image,
    Web,
}

impl WidgetKind {
    pub const ALL: [WidgetKind; 6] = [
        WidgetKind::Clock,
        WidgetKind::SystemMonitor,
        WidgetKind::Timer,
        WidgetKind::Notes,
        WidgetKind::Image,
        WidgetKind::Web,
    ];

    /// Discriminator written to the layout document's `type` field.
    pub fn as_str(self) -> &'static str {
        match self {
            WidgetKind::Clock => "ClockWidget",
            WidgetKind::SystemMonitor => "SystemMonitorWidget",
            WidgetKind::Timer => "TimerWidget",
            WidgetKind::Notes => "NotesWidget",
            WidgetKind::Image => "ImageWidget",
            WidgetKind::Web => "WebWidget",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            WidgetKind::Clock => "Clock",
            WidgetKind::SystemMonitor => "System Monitor",
            WidgetKind::Timer => "Timer",
            WidgetKind::Notes => "Notes",
            WidgetKind::Image => "Image",
            WidgetKind::Web => "Web",
        }
    }
}

impl fmt::Display for WidgetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeClass {
    Small,
    #[default]
    Medium,
    Large,
    Xlarge,
}

impl SizeClass {
    pub fn default_content_size(self) -> Size {
        match self {
            SizeClass::Small => Size::new(160, 160),
            SizeClass::Medium => Size::new(220, 220),
            SizeClass::Large => Size::new(320, 280),
            SizeClass::Xlarge => Size::new(480, 360),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ZBand {
    #[default]
    Normal,
    PinnedAbove,
    /// One-shot reorder; persisted as not pinned.
    SentToBottom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    /// Top-left of the native frame, shadow margin included.
    pub origin: Point,
    /// Visible card size, shadow margin excluded.
    pub content: Size,
}

impl Geometry {
    pub fn frame(&self) -> Rect {
        Rect::from_parts(self.origin, frame_size(self.content))
    }
}

#[derive(Debug, Clone)]
pub struct WidgetInstance {
    pub id: WidgetId,
    pub name: Option<String>,
    pub size_class: SizeClass,
    geometry: Geometry,
    custom_size: bool,
    opacity: f32,
    opacity_override: bool,
    pub click_through: bool,
    pub z_band: ZBand,
    pub visible: bool,
    pub renderer_state: RendererState,
    pub(crate) creation_order: u64,
}

impl WidgetInstance {
    /// New instance at `origin` using the size class default content size.
    pub fn new(
        id: WidgetId,
        renderer_state: RendererState,
        size_class: SizeClass,
        origin: Point,
    ) -> Self {
        Self {
            id,
            name: None,
            size_class,
            geometry: Geometry {
                origin,
                content: size_class.default_content_size(),
            },
            custom_size: false,
            opacity: DEFAULT_OPACITY,
            opacity_override: false,
            click_through: false,
            z_band: ZBand::Normal,
            visible: false,
            renderer_state,
            creation_order: 0,
        }
    }

    pub fn kind(&self) -> WidgetKind {
        self.renderer_state.kind()
    }

    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    pub fn frame(&self) -> Rect {
        self.geometry.frame()
    }

    pub fn set_origin(&mut self, origin: Point) {
        self.geometry.origin = origin;
    }

    /// Apply an explicit size request; the result is always within bounds.
    pub fn request_content_size(&mut self, requested: Size) -> Size {
        let content = clamp_content_size(requested);
        self.geometry.content = content;
        self.custom_size = true;
        content
    }

    /// Set the content size from the renderer's default for a size class.
    pub fn set_default_content_size(&mut self, content: Size) {
        self.geometry.content = content;
        self.custom_size = false;
    }

    pub fn has_custom_size(&self) -> bool {
        self.custom_size
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    pub fn has_opacity_override(&self) -> bool {
        self.opacity_override
    }

    /// Opacity following the global default.
    pub fn set_global_opacity(&mut self, opacity: f32) {
        self.opacity = clamp_opacity(opacity);
        self.opacity_override = false;
    }

    /// Opacity pinned by the renderer or the persisted entry; survives
    /// global opacity changes.
    pub fn set_opacity_override(&mut self, opacity: f32) {
        self.opacity = clamp_opacity(opacity);
        self.opacity_override = true;
    }

    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .unwrap_or_else(|| self.kind().display_name())
    }
}

pub fn clamp_opacity(opacity: f32) -> f32 {
    if opacity.is_nan() {
        return DEFAULT_OPACITY;
    }
    opacity.clamp(MIN_OPACITY, MAX_OPACITY)
}
