//! Boundary between the engine and content renderers.
//!
//! Renderers own everything drawn inside a card. The engine only calls the
//! lifecycle hooks below and persists the payload a renderer hands back. The
//! payload is a tagged enum keyed by the document's `type` field; each kind
//! carries its own `schema_version`.

use std::time::{Instant, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::geometry::Size;
use crate::window::{SizeClass, WidgetKind};

/// Newest payload schema understood by this build, for every kind.
pub const RENDERER_SCHEMA_VERSION: u32 = 1;

fn schema_v1() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlainState {
    #[serde(default = "schema_v1")]
    pub schema_version: u32,
}

impl Default for PlainState {
    fn default() -> Self {
        Self {
            schema_version: RENDERER_SCHEMA_VERSION,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotesState {
    #[serde(default = "schema_v1")]
    pub schema_version: u32,
    #[serde(default)]
    pub note_text: String,
}

impl Default for NotesState {
    fn default() -> Self {
        Self {
            schema_version: RENDERER_SCHEMA_VERSION,
            note_text: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageState {
    #[serde(default = "schema_v1")]
    pub schema_version: u32,
    #[serde(default)]
    pub image_path: String,
    /// Source crop as `[x, y, width, height]` in image pixels.
    #[serde(default)]
    pub crop_rect: Option<[i32; 4]>,
}

impl Default for ImageState {
    fn default() -> Self {
        Self {
            schema_version: RENDERER_SCHEMA_VERSION,
            image_path: String::new(),
            crop_rect: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebState {
    #[serde(default = "schema_v1")]
    pub schema_version: u32,
    #[serde(default)]
    pub url: String,
}

impl Default for WebState {
    fn default() -> Self {
        Self {
            schema_version: RENDERER_SCHEMA_VERSION,
            url: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RendererState {
    #[serde(rename = "ClockWidget")]
    Clock(PlainState),
    #[serde(rename = "SystemMonitorWidget")]
    SystemMonitor(PlainState),
    #[serde(rename = "TimerWidget")]
    Timer(PlainState),
    #[serde(rename = "NotesWidget")]
    Notes(NotesState),
    #[serde(rename = "ImageWidget")]
    Image(ImageState),
    #[serde(rename = "WebWidget")]
    Web(WebState),
}

impl RendererState {
    /// Fresh payload for a newly added widget of `kind`.
    pub fn empty(kind: WidgetKind) -> Self {
        match kind {
            WidgetKind::Clock => Self::Clock(PlainState::default()),
            WidgetKind::SystemMonitor => Self::SystemMonitor(PlainState::default()),
            WidgetKind::Timer => Self::Timer(PlainState::default()),
            WidgetKind::Notes => Self::Notes(NotesState::default()),
            WidgetKind::Image => Self::Image(ImageState::default()),
            WidgetKind::Web => Self::Web(WebState::default()),
        }
    }

    pub fn kind(&self) -> WidgetKind {
        match self {
            Self::Clock(_) => WidgetKind::Clock,
            Self::SystemMonitor(_) => WidgetKind::SystemMonitor,
            Self::Timer(_) => WidgetKind::Timer,
            Self::Notes(_) => WidgetKind::Notes,
            Self::Image(_) => WidgetKind::Image,
            Self::Web(_) => WidgetKind::Web,
        }
    }

    pub fn schema_version(&self) -> u32 {
        match self {
            Self::Clock(s) | Self::SystemMonitor(s) | Self::Timer(s) => s.schema_version,
            Self::Notes(s) => s.schema_version,
            Self::Image(s) => s.schema_version,
            Self::Web(s) => s.schema_version,
        }
    }
}

/// Lifecycle hooks a content renderer exposes to the engine.
pub trait ContentRenderer {
    fn kind(&self) -> WidgetKind;

    fn default_content_size(&self, size_class: SizeClass) -> Size {
        size_class.default_content_size()
    }

    /// Payload persisted alongside the widget's geometry.
    fn state(&self) -> RendererState;

    /// Renderer-specific opacity replacing the global default, if any.
    fn opacity_override(&self) -> Option<f32> {
        None
    }

    fn on_size_changed(&mut self, _content: Size) {}

    fn on_close(&mut self) {}

    /// Content tick, roughly once a second on the UI loop.
    fn on_tick(&mut self, _now: Instant) {}

    /// Returns true once after the renderer changed its persisted payload.
    fn take_content_changed(&mut self) -> bool {
        false
    }

    /// Text lines for hosts that draw cards as character cells.
    fn content_lines(&self) -> Vec<String> {
        Vec::new()
    }
}

/// Restore-time dispatch from a persisted payload to a live renderer.
pub trait RendererFactory {
    fn create(&self, state: &RendererState) -> Box<dyn ContentRenderer>;
}

/// Minimal renderer that shows a short summary for every kind.
#[derive(Debug, Clone)]
pub struct BasicRenderer {
    state: RendererState,
    content: Size,
    ticks: u64,
    changed: bool,
}

impl BasicRenderer {
    pub fn new(state: RendererState) -> Self {
        Self {
            state,
            content: Size::default(),
            ticks: 0,
            changed: false,
        }
    }

    pub fn set_note_text(&mut self, text: impl Into<String>) {
        if let RendererState::Notes(notes) = &mut self.state {
            notes.note_text = text.into();
            self.changed = true;
        }
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}

impl ContentRenderer for BasicRenderer {
    fn kind(&self) -> WidgetKind {
        self.state.kind()
    }

    fn state(&self) -> RendererState {
        self.state.clone()
    }

    fn on_size_changed(&mut self, content: Size) {
        self.content = content;
    }

    fn on_tick(&mut self, _now: Instant) {
        self.ticks = self.ticks.saturating_add(1);
    }

    fn take_content_changed(&mut self) -> bool {
        std::mem::take(&mut self.changed)
    }

    fn content_lines(&self) -> Vec<String> {
        match &self.state {
            RendererState::Clock(_) => vec![wall_clock_utc()],
            RendererState::SystemMonitor(_) => vec![format!("uptime {}s", self.ticks)],
            RendererState::Timer(_) => {
                let (m, s) = (self.ticks / 60, self.ticks % 60);
                vec![format!("{m:02}:{s:02}")]
            }
            RendererState::Notes(notes) if notes.note_text.is_empty() => {
                vec!["(empty note)".to_string()]
            }
            RendererState::Notes(notes) => notes.note_text.lines().map(str::to_string).collect(),
            RendererState::Image(image) if image.image_path.is_empty() => {
                vec!["(no image)".to_string()]
            }
            RendererState::Image(image) => vec![image.image_path.clone()],
            RendererState::Web(web) if web.url.is_empty() => vec!["(no url)".to_string()],
            RendererState::Web(web) => vec![web.url.clone()],
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BasicRendererFactory;

impl RendererFactory for BasicRendererFactory {
    fn create(&self, state: &RendererState) -> Box<dyn ContentRenderer> {
        Box::new(BasicRenderer::new(state.clone()))
    }
}

fn wall_clock_utc() -> String {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    let day = secs % 86_400;
    format!(
        "{:02}:{:02}:{:02} UTC",
        day / 3600,
        (day % 3600) / 60,
        day % 60
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_tags_use_document_type_names() {
        let json = serde_json::to_value(RendererState::empty(WidgetKind::Web)).unwrap();
        assert_eq!(json["type"], "WebWidget");
        assert_eq!(json["schema_version"], 1);
        assert_eq!(json["url"], "");
    }

    #[test]
    fn missing_schema_version_defaults_to_one() {
        let state: RendererState =
            serde_json::from_str(r#"{"type":"NotesWidget","note_text":"hi"}"#).unwrap();
        assert_eq!(state.schema_version(), 1);
        assert_eq!(state.kind(), WidgetKind::Notes);
    }

    #[test]
    fn unknown_type_is_rejected() {
        let res = serde_json::from_str::<RendererState>(r#"{"type":"WeatherWidget"}"#);
        assert!(res.is_err());
    }

    #[test]
    fn note_edit_marks_content_changed_once() {
        let mut r = BasicRenderer::new(RendererState::empty(WidgetKind::Notes));
        assert!(!r.take_content_changed());
        r.set_note_text("buy milk");
        assert!(r.take_content_changed());
        assert!(!r.take_content_changed());
        assert_eq!(r.content_lines(), vec!["buy milk".to_string()]);
    }

    #[test]
    fn timer_counts_ticks() {
        let mut r = BasicRenderer::new(RendererState::empty(WidgetKind::Timer));
        for _ in 0..65 {
            r.on_tick(Instant::now());
        }
        assert_eq!(r.content_lines(), vec!["01:05".to_string()]);
    }
}
