//! Global settings and on-disk locations.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_OPACITY, DEFAULT_SNAP_THRESHOLD, SNAP_THRESHOLD_RANGE};
use crate::error::{Result, WidgetError};
use crate::layout::SnapSettings;
use crate::window::clamp_opacity;

const DATA_DIR_NAME: &str = ".desk-widgets";
const DOCUMENT_NAME: &str = "config.json";
const LOGS_DIR_NAME: &str = "logs";

fn default_true() -> bool {
    true
}

fn default_opacity() -> f32 {
    DEFAULT_OPACITY
}

fn default_snap_threshold() -> i32 {
    DEFAULT_SNAP_THRESHOLD
}

/// Settings stored next to the widget list in the layout document.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_true")]
    pub light_mode: bool,
    #[serde(default = "default_opacity")]
    pub widget_opacity: f32,
    #[serde(default = "default_true")]
    pub snap_enabled: bool,
    #[serde(default = "default_snap_threshold")]
    pub snap_threshold: i32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            light_mode: true,
            widget_opacity: DEFAULT_OPACITY,
            snap_enabled: true,
            snap_threshold: DEFAULT_SNAP_THRESHOLD,
        }
    }
}

impl Settings {
    /// Pull hand-edited values back into their accepted ranges.
    pub fn normalized(mut self) -> Self {
        self.widget_opacity = clamp_opacity(self.widget_opacity);
        self.snap_threshold = clamp_snap_threshold(self.snap_threshold);
        self
    }

    pub fn snap(&self) -> SnapSettings {
        SnapSettings {
            enabled: self.snap_enabled,
            threshold: self.snap_threshold,
        }
    }
}

pub fn clamp_snap_threshold(threshold: i32) -> i32 {
    threshold.clamp(*SNAP_THRESHOLD_RANGE.start(), *SNAP_THRESHOLD_RANGE.end())
}

/// Resolved locations of the layout document and the log directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPaths {
    pub document: PathBuf,
    pub logs_dir: PathBuf,
}

impl DataPaths {
    /// `~/.desk-widgets/config.json`, unless `document` overrides it. An
    /// override keeps its logs in a `logs` directory beside the document.
    pub fn resolve(document: Option<&Path>) -> Result<Self> {
        match document {
            Some(path) => {
                let base = path
                    .parent()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| PathBuf::from("."));
                Ok(Self {
                    document: path.to_path_buf(),
                    logs_dir: base.join(LOGS_DIR_NAME),
                })
            }
            None => {
                let home = dirs::home_dir().ok_or(WidgetError::NoDataDir)?;
                Ok(Self::under(&home.join(DATA_DIR_NAME)))
            }
        }
    }

    pub fn under(data_dir: &Path) -> Self {
        Self {
            document: data_dir.join(DOCUMENT_NAME),
            logs_dir: data_dir.join(LOGS_DIR_NAME),
        }
    }
}
