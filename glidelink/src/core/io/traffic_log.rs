use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::prelude::*;

/// Raw traffic log of a channel.
///
/// Every delivered line is appended verbatim. The log is flushed and closed when dropped, which
/// happens when the channel is unbound or rebound. Write errors are logged once and disable
/// further writes, they never affect dispatch.
#[derive(Debug)]
pub struct TrafficLog {
    path: PathBuf,
    writer: Option<BufWriter<File>>,
}

impl TrafficLog {
    /// Opens a log file for appending, creating it if necessary.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;

        Ok(Self {
            path,
            writer: Some(BufWriter::new(file)),
        })
    }

    /// Log file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends raw bytes to the log.
    pub fn record(&mut self, raw: &[u8]) {
        let Some(writer) = &mut self.writer else {
            return;
        };

        if let Err(err) = writer.write_all(raw) {
            log::warn!("[{:?}] traffic log disabled: {err}", self.path);
            self.writer = None;
        }
    }
}

impl Drop for TrafficLog {
    fn drop(&mut self) {
        if let Some(writer) = &mut self.writer {
            if let Err(err) = writer.flush() {
                log::warn!("[{:?}] can't flush traffic log: {err}", self.path);
            }
        }
    }
}
