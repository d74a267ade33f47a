use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_stream::{Stream, StreamExt};
use tokio_util::sync::CancellationToken;

use crate::asnc::consts::{MAX_LINE_LENGTH, WRITE_TIMEOUT};
use crate::asnc::traffic_log::TrafficWriter;
use crate::asnc::transport::{BoxedReader, BoxedWriter, Transport};
use crate::core::io::{PortReceiver, Retry};
use crate::core::Devices;

use crate::prelude::*;

/// Link task of a single channel: connects the transport, writes queued outbound bytes and
/// delivers received lines to the registry.
pub(crate) struct Link {
    pub(crate) slot: SlotId,
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) devices: Arc<Mutex<Devices>>,
    pub(crate) outgoing: PortReceiver,
    pub(crate) retry: Retry,
    pub(crate) token: CancellationToken,
    pub(crate) traffic_log: Option<PathBuf>,
}

/// Handle of a spawned [`Link`].
#[derive(Debug)]
pub(crate) struct LinkHandle {
    token: CancellationToken,
    task: JoinHandle<()>,
}

impl LinkHandle {
    /// Returns `true` if the link task has exited.
    pub(crate) fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Cancels the link without waiting for it.
    pub(crate) fn cancel(&self) {
        self.token.cancel();
    }

    /// Cancels the link and waits until it has stopped.
    pub(crate) async fn stop(self) {
        self.token.cancel();
        if let Err(err) = self.task.await {
            log::error!("link task failed: {err}");
        }
    }
}

enum Served {
    Cancelled,
    Unbound,
    Failed(Error),
}

impl Link {
    pub(crate) fn spawn(self) -> LinkHandle {
        let token = self.token.clone();
        let task = tokio::spawn(self.run());
        LinkHandle { token, task }
    }

    async fn run(mut self) {
        let slot = self.slot;
        let info = self.transport.info();
        let mut attempt = 0;
        let mut traffic_log = match self.traffic_log.take() {
            Some(path) => TrafficWriter::open(path).await,
            None => None,
        };

        log::trace!("[{slot}] link to {info:?} started");

        loop {
            let connected = tokio::select! {
                _ = self.token.cancelled() => break,
                connected = self.transport.connect() => connected,
            };

            let served = match connected {
                Ok((reader, writer)) => {
                    log::debug!("[{slot}] connected to {info:?}");
                    attempt = 0;
                    self.serve(reader, writer, &mut traffic_log).await
                }
                Err(err) => Served::Failed(err),
            };

            match served {
                Served::Cancelled => break,
                Served::Unbound => {
                    log::trace!("[{slot}] channel is unbound, link is no longer needed");
                    break;
                }
                Served::Failed(err) => {
                    self.report_failure(&err).await;
                }
            }

            if !self.transport.is_repairable() {
                log::warn!("[{slot}] {info:?} can't be reconnected");
                break;
            }
            let Some(delay) = self.retry.delay(attempt) else {
                log::warn!("[{slot}] giving up reconnecting to {info:?}");
                break;
            };
            attempt += 1;

            tokio::select! {
                _ = self.token.cancelled() => break,
                _ = tokio::time::sleep(delay) => {
                    log::debug!("[{slot}] reconnecting to {info:?}, attempt #{attempt}");
                }
            }
        }

        if let Some(traffic_log) = traffic_log {
            traffic_log.close().await;
        }
        log::trace!("[{slot}] link to {info:?} stopped");
    }

    async fn serve(
        &mut self,
        reader: BoxedReader,
        mut writer: BoxedWriter,
        traffic_log: &mut Option<TrafficWriter>,
    ) -> Served {
        let slot = self.slot;
        let lines = read_lines(reader);
        tokio::pin!(lines);

        loop {
            tokio::select! {
                biased;

                _ = self.token.cancelled() => return Served::Cancelled,

                outgoing = self.outgoing.recv() => {
                    let Some(bytes) = outgoing else {
                        return Served::Unbound;
                    };
                    match tokio::time::timeout(WRITE_TIMEOUT, writer.write_all(&bytes)).await {
                        Ok(Ok(())) => log::trace!("[{slot}] sent {} bytes", bytes.len()),
                        Ok(Err(err)) => return Served::Failed(err.into()),
                        Err(_) => {
                            log::warn!("[{slot}] write timed out, {} bytes dropped", bytes.len());
                            return Served::Failed(io::Error::from(io::ErrorKind::TimedOut).into());
                        }
                    }
                }

                line = lines.next() => match line {
                    Some(Ok(line)) => {
                        if let Some(recorder) = traffic_log {
                            recorder.record(&line).await;
                        }
                        self.deliver(&line).await;
                    }
                    Some(Err(err)) => return Served::Failed(err.into()),
                    None => {
                        return Served::Failed(
                            io::Error::new(io::ErrorKind::UnexpectedEof, "connection closed").into(),
                        )
                    }
                },
            }
        }
    }

    /// Delivers a line that has been read, even if the link is being cancelled. The channel is
    /// rebound only after its link has stopped.
    async fn deliver(&self, line: &[u8]) {
        let mut devices = self.devices.lock().await;
        let now = tokio::time::Instant::now().into_std();
        if let Err(err) = devices.on_line_received(self.slot, line, now) {
            log::warn!("[{}] can't deliver line: {err}", self.slot);
        }
    }

    async fn report_failure(&self, err: &Error) {
        let mut devices = self.devices.lock().await;
        if self.token.is_cancelled() {
            return;
        }

        if let Err(err) = devices.report_transport_failure(self.slot, &err.to_string()) {
            log::warn!("[{}] can't report transport failure: {err}", self.slot);
        }
    }
}

/// Splits a byte stream into `\n` terminated lines, terminators included.
///
/// Lines longer than [`MAX_LINE_LENGTH`] are split.
fn read_lines(reader: BoxedReader) -> impl Stream<Item = io::Result<Vec<u8>>> {
    async_stream::try_stream! {
        let mut reader = BufReader::new(reader);
        loop {
            let mut line = Vec::new();
            let read = (&mut reader)
                .take(MAX_LINE_LENGTH as u64)
                .read_until(b'\n', &mut line)
                .await?;
            if read == 0 {
                break;
            }
            yield line;
        }
    }
}
