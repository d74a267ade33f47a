use tokio::sync::oneshot;

use crate::core::device::Devices;
use crate::core::SlotId;

use crate::prelude::*;

/// Pending wait for an acknowledgement from a device.
///
/// Created by [`Devices::expect`]. It is met by the first line received on the channel which
/// contains the expected token. Unbinding the channel abandons the expectation.
#[derive(Debug)]
pub struct Expectation {
    rx: oneshot::Receiver<()>,
    met: bool,
}

impl Expectation {
    /// Returns `true` once a matching line has been received.
    pub fn is_met(&mut self) -> bool {
        if !self.met {
            self.met = self.rx.try_recv().is_ok();
        }
        self.met
    }

    /// Waits for a matching line.
    ///
    /// Returns `false` if the channel has been unbound before the line arrived.
    pub async fn wait(self) -> bool {
        self.met || self.rx.await.is_ok()
    }
}

#[derive(Debug)]
pub(super) struct Watcher {
    token: String,
    tx: oneshot::Sender<()>,
}

impl Watcher {
    /// Returns `true` if nobody waits for this watcher anymore.
    pub(super) fn is_abandoned(&self) -> bool {
        self.tx.is_closed()
    }

    pub(super) fn matches(&self, line: &[u8]) -> bool {
        contains(line, self.token.as_bytes())
    }

    pub(super) fn notify(self) {
        // Receiver may be dropped concurrently.
        let _ = self.tx.send(());
    }
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    needle.is_empty() || haystack.windows(needle.len()).any(|window| window == needle)
}

impl Devices {
    /// Starts watching the channel at `slot` for a line containing `token`.
    ///
    /// Lines received after this call are checked, whether or not the bound driver recognises
    /// them. Fails if the channel is unbound.
    pub fn expect(&mut self, slot: SlotId, token: &str) -> Result<Expectation> {
        self.check_slot(slot)?;
        let channel = &mut self.channels[slot.index()];
        if !channel.is_bound() {
            return Err(Error::NoDeviceBound);
        }

        let (tx, rx) = oneshot::channel();
        channel.watchers.push(Watcher {
            token: token.to_string(),
            tx,
        });
        log::trace!("[{slot}] expecting {token:?}");

        Ok(Expectation { rx, met: false })
    }

    /// First operational channel bound to a driver named `name`.
    pub fn find_driver(&self, name: &str) -> Option<SlotId> {
        self.channels
            .iter()
            .find(|channel| channel.is_operational() && channel.driver_name() == Some(name))
            .map(|channel| channel.slot())
    }
}
