use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::window::WidgetId;

#[derive(Debug, Error)]
pub enum WidgetError {
    #[error("widget id `{0}` is already registered")]
    DuplicateId(WidgetId),

    #[error("no widget with id `{0}`")]
    UnknownWidget(WidgetId),

    #[error("native window operation failed: {0}")]
    Native(String),

    #[error("could not resolve a home directory for widget data")]
    NoDataDir,

    #[error("failed to access layout document {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("layout document {path} is not valid JSON: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl WidgetError {
    pub fn native(message: impl Into<String>) -> Self {
        Self::Native(message.into())
    }
}

pub type Result<T> = std::result::Result<T, WidgetError>;
