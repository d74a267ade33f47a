use std::path::PathBuf;

use tokio::fs::OpenOptions;
use tokio::io::{AsyncWriteExt, BufWriter};

/// Raw traffic log written by a link task.
///
/// Lines are appended before they reach the registry, so file I/O never happens while the
/// registry is locked. Write errors disable the log and never affect the link.
#[derive(Debug)]
pub(crate) struct TrafficWriter {
    path: PathBuf,
    writer: Option<BufWriter<tokio::fs::File>>,
}

impl TrafficWriter {
    /// Opens a log for appending. Returns `None` and logs a warning if the file can't be opened.
    pub(crate) async fn open(path: PathBuf) -> Option<Self> {
        match OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
        {
            Ok(file) => Some(Self {
                path,
                writer: Some(BufWriter::new(file)),
            }),
            Err(err) => {
                log::warn!("can't open traffic log {path:?}: {err}");
                None
            }
        }
    }

    pub(crate) async fn record(&mut self, raw: &[u8]) {
        let Some(writer) = &mut self.writer else {
            return;
        };

        if let Err(err) = writer.write_all(raw).await {
            log::warn!("[{:?}] traffic log disabled: {err}", self.path);
            self.writer = None;
        }
    }

    /// Flushes buffered lines.
    pub(crate) async fn close(mut self) {
        if let Some(writer) = &mut self.writer {
            if let Err(err) = writer.flush().await {
                log::warn!("[{:?}] can't flush traffic log: {err}", self.path);
            }
        }
    }
}
