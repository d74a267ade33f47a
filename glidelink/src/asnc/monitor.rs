use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::asnc::manager::LinkTable;
use crate::core::Devices;

/// Periodic health check of all channels.
pub(crate) struct Monitor {
    pub(crate) devices: Arc<Mutex<Devices>>,
    pub(crate) table: Arc<Mutex<LinkTable>>,
    pub(crate) interval: Duration,
    pub(crate) token: CancellationToken,
}

impl Monitor {
    pub(crate) fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately.
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = self.token.cancelled() => break,
                    _ = ticker.tick() => {}
                }

                let mut table = self.table.lock().await;
                let mut devices = self.devices.lock().await;
                if self.token.is_cancelled() {
                    break;
                }

                let now = tokio::time::Instant::now().into_std();
                let report = devices.on_tick_with(now, |slot, port| table.reconnect(slot, port));
                if !report.is_empty() {
                    log::debug!("health check: {report:?}");
                }
            }

            log::trace!("health monitor stopped");
        })
    }
}
