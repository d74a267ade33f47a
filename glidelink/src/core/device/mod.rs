//! # Device registry
//!
//! [`Devices`] owns a fixed number of [`Channel`]s and the driver catalogue. Its methods are split
//! by concern:
//!
//! * registry: binding and unbinding channels, lookups (this module);
//! * dispatch router: inbound lines, pipe relays and outbound command fan-out;
//! * health monitor: link timeouts, driver recovery and channel restarts;
//! * acknowledgement watchers ([`Expectation`]) and driver lookup.
//!
//! Barometric source arbitration ([`BaroSources`]) is recomputed whenever a binding changes or a
//! channel fails, so arbitration pointers are never stale when altitude is read.

mod arbiter;
mod channel;
mod command;
mod conf;
mod event;
mod expect;
mod monitor;
mod router;

pub use arbiter::BaroSources;
pub use channel::{Channel, ChannelStats, LinkState};
pub use command::Command;
pub use conf::{Binding, DevicesConf, DevicesConfBuilder};
pub use event::DeviceEvent;
pub use expect::Expectation;
pub use monitor::{Reconnect, TickReport};
pub use router::Dispatch;

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::broadcast;

use crate::core::driver::DriverCatalogue;
use crate::core::io::{Port, TrafficLog};
use crate::core::nav::NavInfo;
use crate::core::utils::BoundedText;
use crate::core::SlotId;

use crate::prelude::*;

/// Registry of device channels.
///
/// # Usage
///
/// ```rust
/// use std::time::Instant;
///
/// use glidelink::core::driver::DriverCatalogue;
/// use glidelink::core::{Binding, Devices, DevicesConf, Dispatch, SlotId};
/// use glidelink::prelude::*;
///
/// let mut devices = Devices::new(DriverCatalogue::builtin(), DevicesConf::default());
/// let slot = SlotId::new(0);
///
/// devices
///     .bind(slot, &Binding::new("LX"), Port::null(), Instant::now())
///     .unwrap();
/// assert!(devices.has_baro_source());
///
/// let dispatch = devices
///     .on_line_received(slot, b"$LXWP0,N,,1234.5,0.5,,,,,,,\r\n", Instant::now())
///     .unwrap();
/// assert_eq!(dispatch, Dispatch::Handled);
/// assert_eq!(devices.baro_altitude(), Some(1234.5));
/// ```
#[derive(Debug)]
pub struct Devices {
    conf: DevicesConf,
    catalogue: DriverCatalogue,
    channels: Vec<Channel>,
    baro: BaroSources,
    nav: NavInfo,
    events: EventSender,
}

impl Devices {
    /// Creates a registry with all slots unbound.
    pub fn new(catalogue: DriverCatalogue, conf: DevicesConf) -> Self {
        let channels = (0..conf.slot_count)
            .map(|index| Channel::new(SlotId::new(index)))
            .collect();
        let (events, _) = broadcast::channel(conf.events_capacity);

        Self {
            conf,
            catalogue,
            channels,
            baro: BaroSources::default(),
            nav: NavInfo::default(),
            events: EventSender { inner: events },
        }
    }

    /// Registry configuration.
    pub fn conf(&self) -> &DevicesConf {
        &self.conf
    }

    /// Driver catalogue.
    pub fn catalogue(&self) -> &DriverCatalogue {
        &self.catalogue
    }

    /// Subscribes to device events.
    pub fn subscribe(&self) -> broadcast::Receiver<DeviceEvent> {
        self.events.inner.subscribe()
    }

    /// All channels in slot order.
    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    /// Channel at `slot`.
    pub fn channel(&self, slot: SlotId) -> Result<&Channel> {
        self.check_slot(slot)?;
        Ok(&self.channels[slot.index()])
    }

    /// Operator-facing name of a channel. Empty if channel is unbound.
    pub fn lookup_name(&self, slot: SlotId) -> Result<&str> {
        Ok(self.channel(slot)?.display_name())
    }

    /// Navigation state merged from all devices.
    pub fn nav(&self) -> &NavInfo {
        &self.nav
    }

    /// Mutable access to navigation state.
    pub fn nav_mut(&mut self) -> &mut NavInfo {
        &mut self.nav
    }

    /// Current barometric altitude sources.
    pub fn baro_sources(&self) -> BaroSources {
        self.baro
    }

    /// Returns `true` if some channel acts as primary barometric altitude source.
    pub fn has_baro_source(&self) -> bool {
        self.baro.is_available()
    }

    /// Barometric altitude reported by the primary baro source.
    pub fn baro_altitude(&self) -> Option<f64> {
        if self.has_baro_source() {
            self.nav.baro_altitude
        } else {
            None
        }
    }

    /// Binds channel at `slot` to a driver.
    ///
    /// Any previous binding of the channel is closed first. The new driver's `open` hook is
    /// invoked with `port`; if it rejects, the channel is left unbound and
    /// [`Error::OpenFailed`] is returned. Unknown driver names fail with
    /// [`Error::UnknownDriver`] before the current binding is touched.
    pub fn bind(&mut self, slot: SlotId, binding: &Binding, port: Port, now: Instant) -> Result<()> {
        let driver = self.check_binding(slot, binding)?;

        if self.teardown(slot) {
            self.events.send(DeviceEvent::Unbound { slot });
        }

        let traffic_log = match &binding.traffic_log {
            Some(path) => match TrafficLog::open(path) {
                Ok(log) => Some(log),
                Err(err) => {
                    log::warn!("[{slot}] can't open traffic log {path:?}: {err}");
                    None
                }
            },
            None => None,
        };
        let display_name = binding
            .display_name
            .clone()
            .unwrap_or_else(|| BoundedText::truncated(driver.name()));

        self.channels[slot.index()].attach(
            driver.clone(),
            port,
            display_name,
            binding.pipe_to,
            traffic_log,
            now,
        );

        let primary_baro = BaroSources::elect(&self.channels).is_primary(slot);
        let channel = &mut self.channels[slot.index()];
        if channel
            .invoke(primary_baro, |driver, ctx| driver.open(ctx))
            .is_rejected()
        {
            channel.detach();
            log::warn!("[{slot}] driver {} failed to open", driver.name());
            self.rearbitrate();
            return Err(Error::OpenFailed {
                slot,
                driver: driver.name().to_string(),
            });
        }

        log::debug!("[{slot}] bound to {} over {:?}", driver.name(), channel.port.info());
        self.events.send(DeviceEvent::Bound {
            slot,
            driver: driver.name().to_string(),
        });
        self.rearbitrate();

        Ok(())
    }

    /// Validates a binding without applying it and returns the driver it refers to.
    ///
    /// Fails if `slot` or the pipe target is out of range, if the channel pipes to itself or if
    /// the driver is not in the catalogue.
    pub fn check_binding(&self, slot: SlotId, binding: &Binding) -> Result<Arc<dyn Driver>> {
        self.check_slot(slot)?;
        if let Some(target) = binding.pipe_to {
            if target == slot {
                return Err(Error::SelfPipe(slot));
            }
            self.check_slot(target)?;
        }

        self.catalogue
            .get(&binding.driver)
            .cloned()
            .ok_or_else(|| Error::UnknownDriver(binding.driver.clone()))
    }

    /// Unbinds channel at `slot`, closing its driver. Unbinding an unbound channel is a no-op.
    pub fn unbind(&mut self, slot: SlotId) -> Result<()> {
        self.check_slot(slot)?;

        if self.teardown(slot) {
            log::debug!("[{slot}] unbound");
            self.events.send(DeviceEvent::Unbound { slot });
            self.rearbitrate();
        }

        Ok(())
    }

    /// Unbinds all channels.
    pub fn shutdown(&mut self) {
        for index in 0..self.channels.len() {
            if let Err(err) = self.unbind(SlotId::new(index)) {
                log::error!("can't unbind slot #{index}: {err}");
            }
        }
        log::debug!("all devices are shut down");
    }

    pub(crate) fn check_slot(&self, slot: SlotId) -> Result<()> {
        if slot.index() >= self.channels.len() {
            return Err(Error::InvalidSlot {
                index: slot.index(),
                count: self.channels.len(),
            });
        }
        Ok(())
    }

    /// Closes the bound driver and detaches the channel. Returns `false` if it was not bound.
    fn teardown(&mut self, slot: SlotId) -> bool {
        let primary_baro = self.baro.is_primary(slot);
        let channel = &mut self.channels[slot.index()];
        if !channel.is_bound() {
            return false;
        }

        let outcome = channel.invoke(primary_baro, |driver, ctx| driver.close(ctx));
        log::trace!("[{slot}] driver closed: {outcome:?}");
        channel.detach();

        true
    }

    fn rearbitrate(&mut self) {
        let elected = BaroSources::elect(&self.channels);
        if elected == self.baro {
            return;
        }

        log::debug!(
            "baro sources changed: primary={:?}, secondary={:?}",
            elected.primary(),
            elected.secondary()
        );
        self.baro = elected;
        self.events.send(DeviceEvent::BaroSourcesChanged(elected));
    }
}

#[derive(Clone, Debug)]
struct EventSender {
    inner: broadcast::Sender<DeviceEvent>,
}

impl EventSender {
    fn send(&self, event: DeviceEvent) {
        if let Err(err) = self.inner.send(event) {
            log::trace!("event is not delivered: {err:?}");
        }
    }
}
