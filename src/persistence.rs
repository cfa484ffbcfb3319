//! Layout document load and save.
//!
//! One JSON object holds every widget plus the global settings. Saves always
//! rewrite the whole document through a sibling temp file; loads parse each
//! widget entry on its own so one bad entry never costs the rest.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::Settings;
use crate::constants::{DEFAULT_WIDGET_POSITION, MAX_WIDGET_COORD};
use crate::error::{Result, WidgetError};
use crate::geometry::{Point, Size};
use crate::renderer::{RENDERER_SCHEMA_VERSION, RendererState};
use crate::window::{SizeClass, WidgetId, WidgetInstance, WidgetRegistry, ZBand};

fn default_position() -> [i32; 2] {
    [DEFAULT_WIDGET_POSITION.0, DEFAULT_WIDGET_POSITION.1]
}

#[derive(Debug, Serialize, Deserialize)]
struct WidgetEntry {
    id: String,
    #[serde(flatten)]
    state: RendererState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default)]
    size: SizeClass,
    #[serde(default = "default_position")]
    position: [i32; 2],
    #[serde(default)]
    click_through: bool,
    #[serde(default)]
    always_on_top: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    custom_width: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    custom_height: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    opacity: Option<f32>,
}

#[derive(Serialize)]
struct DocumentOut<'a> {
    widgets: Vec<WidgetEntry>,
    #[serde(flatten)]
    settings: &'a Settings,
}

/// Everything needed to rebuild one widget after a restart.
#[derive(Debug, Clone, PartialEq)]
pub struct WidgetDescriptor {
    pub id: WidgetId,
    pub name: Option<String>,
    pub state: RendererState,
    pub size_class: SizeClass,
    pub origin: Point,
    /// Explicit content size from an earlier resize, already clamped.
    pub custom_content: Option<Size>,
    pub click_through: bool,
    pub z_band: ZBand,
    /// Per-widget opacity that does not follow the global setting.
    pub opacity: Option<f32>,
}

#[derive(Debug, Clone, Default)]
pub struct LoadedLayout {
    pub settings: Settings,
    pub widgets: Vec<WidgetDescriptor>,
    /// Entries dropped as malformed.
    pub skipped: usize,
}

#[derive(Debug, Clone)]
pub struct LayoutPersistence {
    path: PathBuf,
}

impl LayoutPersistence {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Overwrite the document with every registered widget and `settings`.
    pub fn save_all(&self, registry: &WidgetRegistry, settings: &Settings) -> Result<()> {
        let widgets = registry
            .all()
            .into_iter()
            .map(entry_from_instance)
            .collect();
        let doc = DocumentOut { widgets, settings };
        let json = serde_json::to_string_pretty(&doc).map_err(|source| WidgetError::Json {
            path: self.path.clone(),
            source,
        })?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|source| self.io_err(source))?;
        }
        let tmp = self.temp_path();
        fs::write(&tmp, json.as_bytes()).map_err(|source| WidgetError::Io {
            path: tmp.clone(),
            source,
        })?;
        fs::rename(&tmp, &self.path).map_err(|source| self.io_err(source))?;
        tracing::debug!(path = %self.path.display(), widgets = registry.len(), "layout saved");
        Ok(())
    }

    /// Read the document. A missing file is an empty layout with default
    /// settings; a file that is not JSON is an error.
    pub fn load_all(&self) -> Result<LoadedLayout> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                tracing::info!(path = %self.path.display(), "no layout document yet");
                return Ok(LoadedLayout::default());
            }
            Err(source) => return Err(self.io_err(source)),
        };
        let root: Value = serde_json::from_str(&text).map_err(|source| WidgetError::Json {
            path: self.path.clone(),
            source,
        })?;
        Ok(parse_document(root))
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn io_err(&self, source: io::Error) -> WidgetError {
        WidgetError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

fn entry_from_instance(w: &WidgetInstance) -> WidgetEntry {
    let geometry = w.geometry();
    let (custom_width, custom_height) = if w.has_custom_size() {
        (Some(geometry.content.width), Some(geometry.content.height))
    } else {
        (None, None)
    };
    let opacity = w.has_opacity_override().then(|| w.opacity());
    WidgetEntry {
        id: w.id.to_string(),
        state: w.renderer_state.clone(),
        name: w.name.clone(),
        size: w.size_class,
        position: [geometry.origin.x, geometry.origin.y],
        click_through: w.click_through,
        always_on_top: w.z_band == ZBand::PinnedAbove,
        custom_width,
        custom_height,
        opacity,
    }
}

fn parse_document(root: Value) -> LoadedLayout {
    let settings = match serde_json::from_value::<Settings>(root.clone()) {
        Ok(settings) => settings.normalized(),
        Err(err) => {
            tracing::warn!(error = %err, "layout settings unreadable, using defaults");
            Settings::default()
        }
    };

    let mut layout = LoadedLayout {
        settings,
        ..LoadedLayout::default()
    };
    let Some(entries) = root.get("widgets").and_then(Value::as_array) else {
        return layout;
    };
    for (index, raw) in entries.iter().enumerate() {
        match parse_entry(raw.clone()) {
            Ok(descriptor) => layout.widgets.push(descriptor),
            Err(reason) => {
                layout.skipped += 1;
                tracing::warn!(index, reason = %reason, "skipping malformed widget entry");
            }
        }
    }
    layout
}

fn parse_entry(raw: Value) -> std::result::Result<WidgetDescriptor, String> {
    let entry: WidgetEntry = serde_json::from_value(raw).map_err(|e| e.to_string())?;
    if entry.id.trim().is_empty() {
        return Err("empty id".into());
    }
    let version = entry.state.schema_version();
    if version > RENDERER_SCHEMA_VERSION {
        return Err(format!(
            "{} payload schema {version} is newer than {RENDERER_SCHEMA_VERSION}",
            entry.state.kind()
        ));
    }
    let [x, y] = entry.position;
    if x.unsigned_abs() > MAX_WIDGET_COORD.unsigned_abs()
        || y.unsigned_abs() > MAX_WIDGET_COORD.unsigned_abs()
    {
        return Err(format!("position ({x}, {y}) is out of range"));
    }
    let custom_content = match (entry.custom_width, entry.custom_height) {
        (Some(w), Some(h)) if w <= 0 || h <= 0 => {
            return Err(format!("custom size {w}x{h} is not positive"));
        }
        (Some(w), Some(h)) => Some(crate::layout::clamp_content_size(Size::new(w, h))),
        _ => None,
    };
    Ok(WidgetDescriptor {
        id: WidgetId::from(entry.id),
        name: entry.name,
        state: entry.state,
        size_class: entry.size,
        origin: Point::new(x, y),
        custom_content,
        click_through: entry.click_through,
        z_band: if entry.always_on_top {
            ZBand::PinnedAbove
        } else {
            ZBand::Normal
        },
        opacity: entry.opacity,
    })
}
