use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

use tracing::Level;

pub const LOG_FILE_NAME: &str = "desk-widgets.log";

/// Where formatted events go.
#[derive(Clone, Debug)]
pub enum LogSink {
    File(Arc<File>),
    Stderr,
}

impl LogSink {
    /// Append to `desk-widgets.log` inside `logs_dir`, creating it if needed.
    pub fn file_in(logs_dir: &Path) -> io::Result<Self> {
        fs::create_dir_all(logs_dir)?;
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(logs_dir.join(LOG_FILE_NAME))?;
        Ok(Self::File(Arc::new(file)))
    }
}

pub struct DelegatingWriter {
    inner: DelegatingInner,
}

enum DelegatingInner {
    File(Arc<File>),
    Stderr(io::Stderr),
}

impl Write for DelegatingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match &mut self.inner {
            DelegatingInner::File(f) => f.as_ref().write(buf),
            DelegatingInner::Stderr(s) => s.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match &mut self.inner {
            DelegatingInner::File(f) => f.as_ref().flush(),
            DelegatingInner::Stderr(s) => s.flush(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct SubscriberMakeWriter {
    sink: LogSink,
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for SubscriberMakeWriter {
    type Writer = DelegatingWriter;

    fn make_writer(&'a self) -> Self::Writer {
        let inner = match &self.sink {
            LogSink::File(file) => DelegatingInner::File(Arc::clone(file)),
            LogSink::Stderr => DelegatingInner::Stderr(io::stderr()),
        };
        DelegatingWriter { inner }
    }
}

/// Install the global fmt subscriber. Safe to call more than once; later
/// calls are no-ops.
pub fn init(level: Level, sink: LogSink) {
    let ansi = matches!(sink, LogSink::Stderr);
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(SubscriberMakeWriter { sink })
        .with_ansi(ansi)
        .with_target(false)
        .with_thread_names(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_sink_creates_log_directory() {
        let dir = tempfile::tempdir().unwrap();
        let logs = dir.path().join("logs");
        let sink = LogSink::file_in(&logs).unwrap();
        assert!(matches!(sink, LogSink::File(_)));

        let mut writer =
            tracing_subscriber::fmt::MakeWriter::make_writer(&SubscriberMakeWriter { sink });
        writer.write_all(b"hello\n").unwrap();
        writer.flush().unwrap();
        let text = fs::read_to_string(logs.join(LOG_FILE_NAME)).unwrap();
        assert_eq!(text, "hello\n");
    }
}
