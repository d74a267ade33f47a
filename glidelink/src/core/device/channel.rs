use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::consts::DEVICE_NAME_CAPACITY;
use crate::core::device::expect::Watcher;
use crate::core::driver::{Driver, DriverContext, Outcome};
use crate::core::io::{Port, TrafficLog};
use crate::core::utils::BoundedText;
use crate::core::SlotId;

/// Link state of a channel.
///
/// ```text
/// Unbound -> Healthy -> TimedOut -> Healthy                  (driver recovered in place)
///                                -> Restarting -> Healthy    (close + open succeeded)
///                                              -> Failed     (terminal until rebind)
/// ```
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum LinkState {
    /// No driver bound.
    #[default]
    Unbound,
    /// Bound and receiving data.
    Healthy,
    /// Bound, but silent for longer than the link timeout.
    TimedOut,
    /// Driver is being closed and reopened.
    Restarting,
    /// Recovery and restart failed.
    Failed,
}

/// Per-channel traffic counters.
///
/// Counters survive rebinding and are reset only when the registry is recreated.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ChannelStats {
    /// Lines delivered to a bound channel.
    pub lines: u64,
    /// Lines recognised by a driver.
    pub handled: u64,
    /// Lines no driver recognised.
    pub rejected: u64,
    /// Lines relayed to the pipe target.
    pub relayed: u64,
    /// Link timeouts.
    pub timeouts: u64,
    /// Timeouts resolved by the driver in place.
    pub recoveries: u64,
    /// Successful restarts.
    pub restarts: u64,
}

/// Runtime binding of one communication endpoint to a driver.
///
/// Channels are owned by [`Devices`](super::Devices) and exposed read-only.
#[derive(Debug)]
pub struct Channel {
    slot: SlotId,
    display_name: BoundedText<DEVICE_NAME_CAPACITY>,
    pub(super) driver: Option<Arc<dyn Driver>>,
    pub(super) port: Port,
    pub(super) pipe_to: Option<SlotId>,
    pub(super) state: LinkState,
    pub(super) stats: ChannelStats,
    pub(super) transport_failed: bool,
    pub(super) watchers: Vec<Watcher>,
    bound_at: Option<Instant>,
    last_activity: Option<Instant>,
    traffic_log: Option<TrafficLog>,
    ticker: bool,
}

impl Channel {
    pub(super) fn new(slot: SlotId) -> Self {
        Self {
            slot,
            display_name: BoundedText::default(),
            driver: None,
            port: Port::null(),
            pipe_to: None,
            state: LinkState::Unbound,
            stats: ChannelStats::default(),
            transport_failed: false,
            watchers: Vec::new(),
            bound_at: None,
            last_activity: None,
            traffic_log: None,
            ticker: false,
        }
    }

    /// Slot of this channel.
    #[inline(always)]
    pub fn slot(&self) -> SlotId {
        self.slot
    }

    /// Operator-facing name. Empty while unbound.
    pub fn display_name(&self) -> &str {
        self.display_name.as_str()
    }

    /// Bound driver.
    pub fn driver(&self) -> Option<&Arc<dyn Driver>> {
        self.driver.as_ref()
    }

    /// Name of the bound driver.
    pub fn driver_name(&self) -> Option<&str> {
        self.driver.as_ref().map(|driver| driver.name())
    }

    /// Outbound port.
    pub fn port(&self) -> &Port {
        &self.port
    }

    /// Relay target.
    pub fn pipe_to(&self) -> Option<SlotId> {
        self.pipe_to
    }

    /// Link state.
    pub fn state(&self) -> LinkState {
        self.state
    }

    /// Traffic counters.
    pub fn stats(&self) -> &ChannelStats {
        &self.stats
    }

    /// Time of the last delivered line.
    pub fn last_activity(&self) -> Option<Instant> {
        self.last_activity
    }

    /// Activity indicator, flips on every delivered line.
    pub fn ticker(&self) -> bool {
        self.ticker
    }

    /// Path of the raw traffic log, if the registry writes one.
    pub fn traffic_log(&self) -> Option<&std::path::Path> {
        self.traffic_log.as_ref().map(|log| log.path())
    }

    /// Returns `true` if a driver is bound.
    #[inline(always)]
    pub fn is_bound(&self) -> bool {
        self.driver.is_some()
    }

    /// Returns `true` if channel is bound and has not failed.
    #[inline(always)]
    pub fn is_operational(&self) -> bool {
        self.is_bound() && self.state != LinkState::Failed
    }

    /// Returns `true` if bound driver is a flight recorder.
    pub fn is_logger(&self) -> bool {
        self.driver.as_ref().is_some_and(|driver| driver.is_logger())
    }

    /// Returns `true` if bound driver provides GPS position.
    pub fn is_gps_source(&self) -> bool {
        self.driver.as_ref().is_some_and(|driver| driver.is_gps_source())
    }

    /// Returns `true` if bound driver provides barometric altitude.
    pub fn is_baro_source(&self) -> bool {
        self.driver.as_ref().is_some_and(|driver| driver.is_baro_source())
    }

    /// Returns `true` if bound driver controls a radio.
    pub fn is_radio(&self) -> bool {
        self.driver.as_ref().is_some_and(|driver| driver.is_radio())
    }

    /// Returns `true` if bound driver talks to the Condor simulator.
    pub fn is_condor(&self) -> bool {
        self.driver.as_ref().is_some_and(|driver| driver.is_condor())
    }

    pub(super) fn context(&self, primary_baro: bool) -> DriverContext<'_> {
        DriverContext::new(self.slot, &self.port, primary_baro)
    }

    /// Invokes a driver operation, unbound channels report [`Outcome::Unsupported`].
    pub(super) fn invoke<F>(&self, primary_baro: bool, op: F) -> Outcome
    where
        F: FnOnce(&dyn Driver, &DriverContext<'_>) -> Outcome,
    {
        match &self.driver {
            Some(driver) => op(driver.as_ref(), &self.context(primary_baro)),
            None => Outcome::Unsupported,
        }
    }

    pub(super) fn attach(
        &mut self,
        driver: Arc<dyn Driver>,
        port: Port,
        display_name: BoundedText<DEVICE_NAME_CAPACITY>,
        pipe_to: Option<SlotId>,
        traffic_log: Option<TrafficLog>,
        now: Instant,
    ) {
        self.driver = Some(driver);
        self.port = port;
        self.display_name = display_name;
        self.pipe_to = pipe_to;
        self.traffic_log = traffic_log;
        self.state = LinkState::Healthy;
        self.transport_failed = false;
        self.bound_at = Some(now);
        self.last_activity = None;
    }

    pub(super) fn detach(&mut self) {
        self.driver = None;
        self.port = Port::null();
        self.display_name = BoundedText::default();
        self.pipe_to = None;
        self.traffic_log = None;
        self.state = LinkState::Unbound;
        self.transport_failed = false;
        self.watchers.clear();
        self.bound_at = None;
    }

    /// Records a delivered line: stamps activity, flips the ticker and logs raw traffic.
    pub(super) fn record_line(&mut self, raw: &[u8], now: Instant) {
        // Activity stamps are strictly increasing even if the clock has not advanced.
        self.last_activity = match self.last_activity {
            Some(last) if now <= last => Some(last + Duration::from_nanos(1)),
            _ => Some(now),
        };
        self.ticker = !self.ticker;
        self.transport_failed = false;
        self.stats.lines += 1;

        if self.state == LinkState::TimedOut {
            self.state = LinkState::Healthy;
        }
        if let Some(log) = &mut self.traffic_log {
            log.record(raw);
        }

        if !self.watchers.is_empty() {
            let (met, pending): (Vec<_>, Vec<_>) = std::mem::take(&mut self.watchers)
                .into_iter()
                .filter(|watcher| !watcher.is_abandoned())
                .partition(|watcher| watcher.matches(raw));
            met.into_iter().for_each(Watcher::notify);
            self.watchers = pending;
        }
    }

    pub(super) fn is_timed_out(&self, now: Instant, timeout: Duration) -> bool {
        if self.transport_failed {
            return true;
        }
        match self.last_activity.or(self.bound_at) {
            Some(since) => now.saturating_duration_since(since) > timeout,
            None => false,
        }
    }

    /// Marks the link as alive again after a recovery or restart.
    pub(super) fn revive(&mut self, now: Instant) {
        self.state = LinkState::Healthy;
        self.transport_failed = false;
        self.last_activity = match self.last_activity {
            Some(last) if now <= last => Some(last + Duration::from_nanos(1)),
            _ => Some(now),
        };
    }
}
