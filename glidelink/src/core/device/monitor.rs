use std::time::Instant;

use crate::core::device::{DeviceEvent, Devices, LinkState};
use crate::core::io::Port;
use crate::core::SlotId;

use crate::prelude::*;

/// Channels affected by a health monitor tick.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Channels found timed out.
    pub timed_out: Vec<SlotId>,
    /// Timed out channels recovered by their drivers.
    pub recovered: Vec<SlotId>,
    /// Timed out channels restarted with `close` and `open`.
    pub restarted: Vec<SlotId>,
    /// Channels which entered [`LinkState::Failed`].
    pub failed: Vec<SlotId>,
}

impl TickReport {
    /// Returns `true` if no channel was affected.
    pub fn is_empty(&self) -> bool {
        self.timed_out.is_empty()
            && self.recovered.is_empty()
            && self.restarted.is_empty()
            && self.failed.is_empty()
    }
}

/// What the transport owner did to a channel being restarted.
///
/// Returned by the hook passed to [`Devices::on_tick_with`].
#[derive(Debug)]
pub enum Reconnect {
    /// Transport is still attached, keep the current port.
    Keep,
    /// Transport has been reconnected, the channel continues with a new port.
    Replace(Port),
    /// Transport is gone and can't be restored. The channel fails.
    Unavailable,
}

impl Devices {
    /// Inspects every bound channel for link timeouts.
    ///
    /// A channel silent for longer than [`DevicesConf::link_timeout`](super::DevicesConf) is
    /// offered to its driver's `on_link_timeout`. If the driver does not recover it, the channel
    /// is restarted by calling `close` and `open`. A rejected `open` moves the channel to
    /// [`LinkState::Failed`], where it stays until rebound. Failures of one channel never stop
    /// inspection of the others.
    ///
    /// A channel whose port has been [closed](Port::is_closed) by its transport owner can't be
    /// restarted and fails as well. Use [`on_tick_with`](Self::on_tick_with) to reconnect
    /// transports during a restart.
    ///
    /// Healthy channels get their driver's `on_sys_tick` instead.
    pub fn on_tick(&mut self, now: Instant) -> TickReport {
        self.on_tick_with(now, |_, port| {
            if port.is_closed() {
                Reconnect::Unavailable
            } else {
                Reconnect::Keep
            }
        })
    }

    /// Same as [`on_tick`](Self::on_tick), but asks `reconnect` to restore the transport of every
    /// channel being restarted.
    ///
    /// The hook runs after the driver's `close` and before its `open`, so `open` talks to the
    /// reconnected transport.
    pub fn on_tick_with<F>(&mut self, now: Instant, mut reconnect: F) -> TickReport
    where
        F: FnMut(SlotId, &Port) -> Reconnect,
    {
        let timeout = self.conf.link_timeout;
        let mut report = TickReport::default();

        for index in 0..self.channels.len() {
            let slot = SlotId::new(index);
            let primary_baro = self.baro.is_primary(slot);
            let channel = &mut self.channels[index];

            let Some(driver) = channel.driver.clone() else {
                continue;
            };
            if channel.state == LinkState::Failed {
                continue;
            }

            if !channel.is_timed_out(now, timeout) {
                channel.invoke(primary_baro, |driver, ctx| driver.on_sys_tick(ctx));
                continue;
            }

            channel.state = LinkState::TimedOut;
            channel.stats.timeouts += 1;
            report.timed_out.push(slot);
            log::warn!("[{slot}] link timeout, driver: {}", driver.name());
            self.events.send(DeviceEvent::LinkTimeout { slot });

            if channel
                .invoke(primary_baro, |driver, ctx| driver.on_link_timeout(ctx))
                .is_accepted()
            {
                channel.revive(now);
                channel.stats.recoveries += 1;
                report.recovered.push(slot);
                log::info!("[{slot}] link recovered by driver");
                self.events.send(DeviceEvent::Recovered { slot });
                continue;
            }

            channel.state = LinkState::Restarting;
            log::debug!("[{slot}] restarting");
            channel.invoke(primary_baro, |driver, ctx| driver.close(ctx));

            let reopened = match reconnect(slot, &channel.port) {
                Reconnect::Keep => true,
                Reconnect::Replace(port) => {
                    log::debug!("[{slot}] transport reconnected: {:?}", port.info());
                    channel.port = port;
                    true
                }
                Reconnect::Unavailable => {
                    log::warn!("[{slot}] transport can't be restored");
                    false
                }
            } && !channel
                .invoke(primary_baro, |driver, ctx| driver.open(ctx))
                .is_rejected();

            if !reopened {
                channel.state = LinkState::Failed;
                report.failed.push(slot);
                log::error!("[{slot}] driver {} failed to restart", driver.name());
                self.events.send(DeviceEvent::Failed {
                    slot,
                    driver: driver.name().to_string(),
                });
            } else {
                channel.revive(now);
                channel.stats.restarts += 1;
                report.restarted.push(slot);
                log::info!("[{slot}] restarted");
                self.events.send(DeviceEvent::Restarted { slot });
            }
        }

        if !report.failed.is_empty() {
            self.rearbitrate();
        }

        report
    }

    /// Reports a transport read or write error on the channel at `slot`.
    ///
    /// The channel is treated as timed out on the next [`on_tick`](Self::on_tick) unless a line
    /// arrives first.
    pub fn report_transport_failure(&mut self, slot: SlotId, reason: &str) -> Result<()> {
        self.check_slot(slot)?;

        let channel = &mut self.channels[slot.index()];
        if !channel.is_operational() {
            return Ok(());
        }

        channel.transport_failed = true;
        log::warn!("[{slot}] transport failure: {reason}");
        self.events.send(DeviceEvent::TransportFailure {
            slot,
            reason: reason.to_string(),
        });

        Ok(())
    }
}

#[cfg(test)]
mod monitor_tests {
    use std::time::Duration;

    use super::*;
    use crate::core::device::{Binding, DevicesConf};
    use crate::core::driver::{Capability, DriverCatalogue, Outcome};
    use crate::core::io::TransportInfo;
    use crate::core::utils::test::Probe;

    const TIMEOUT: Duration = Duration::from_secs(10);

    fn make_devices(probes: Vec<Probe>) -> Devices {
        let mut catalogue = DriverCatalogue::new();
        for probe in probes {
            catalogue.register(probe).unwrap();
        }
        Devices::new(
            catalogue,
            DevicesConf::builder().link_timeout(TIMEOUT).build(),
        )
    }

    fn bind(devices: &mut Devices, index: usize, driver: &str, now: Instant) {
        devices
            .bind(SlotId::new(index), &Binding::new(driver), Port::null(), now)
            .unwrap();
    }

    #[test]
    fn active_channels_are_ticked() {
        let probe = Probe::new("A");
        let counters = probe.counters();
        let mut devices = make_devices(vec![probe]);
        let start = Instant::now();
        bind(&mut devices, 0, "A", start);

        devices
            .on_line_received(SlotId::new(0), b"$OK", start + Duration::from_secs(5))
            .unwrap();
        let report = devices.on_tick(start + Duration::from_secs(12));

        assert!(report.is_empty());
        assert_eq!(counters.ticks(), 1);
        assert_eq!(counters.timeouts(), 0);
    }

    #[test]
    fn driver_recovery_suppresses_restart() {
        let probe = Probe::new("A").timeout_outcome(Outcome::Accepted);
        let counters = probe.counters();
        let mut devices = make_devices(vec![probe]);
        let start = Instant::now();
        bind(&mut devices, 0, "A", start);
        let slot = SlotId::new(0);

        let report = devices.on_tick(start + Duration::from_secs(11));

        assert_eq!(report.timed_out, vec![slot]);
        assert_eq!(report.recovered, vec![slot]);
        assert!(report.restarted.is_empty());
        assert_eq!(counters.opens(), 1);
        assert_eq!(counters.closes(), 0);
        assert_eq!(devices.channels()[0].state(), LinkState::Healthy);
    }

    #[test]
    fn one_timeout_and_one_restart_per_tick() {
        let probe = Probe::new("A");
        let counters = probe.counters();
        let mut devices = make_devices(vec![probe]);
        let start = Instant::now();
        bind(&mut devices, 0, "A", start);
        let slot = SlotId::new(0);

        let report = devices.on_tick(start + Duration::from_secs(11));
        assert_eq!(report.timed_out, vec![slot]);
        assert_eq!(report.restarted, vec![slot]);
        assert_eq!(counters.timeouts(), 1);
        assert_eq!(counters.closes(), 1);
        assert_eq!(counters.opens(), 2);

        // Restart grants a fresh timeout interval.
        assert!(devices.on_tick(start + Duration::from_secs(12)).is_empty());
        assert_eq!(counters.timeouts(), 1);

        let report = devices.on_tick(start + Duration::from_secs(22));
        assert_eq!(report.restarted, vec![slot]);
        assert_eq!(counters.timeouts(), 2);
        assert_eq!(counters.opens(), 3);
        assert_eq!(devices.channels()[0].stats().restarts, 2);
    }

    #[test]
    fn failed_restart_is_terminal_until_rebind() {
        let broken = Probe::new("Broken").caps(&[Capability::BaroAlt]);
        let broken_counters = broken.counters();
        let mut devices = make_devices(vec![
            broken,
            Probe::new("Baro").caps(&[Capability::BaroAlt]),
            Probe::new("Reject")
                .caps(&[Capability::BaroAlt])
                .open_outcome(Outcome::Rejected),
        ]);
        let start = Instant::now();
        bind(&mut devices, 0, "Broken", start);
        bind(&mut devices, 1, "Baro", start);
        assert_eq!(devices.baro_sources().primary(), Some(SlotId::new(0)));

        // Swap in a driver whose `open` fails, keeping the binding of the channel.
        let reject = devices.catalogue().get("Reject").unwrap().clone();
        devices.channels[0].driver = Some(reject);

        let later = start + Duration::from_secs(11);
        devices
            .on_line_received(SlotId::new(1), b"$OK", later)
            .unwrap();
        let report = devices.on_tick(later);

        assert_eq!(report.failed, vec![SlotId::new(0)]);
        assert_eq!(devices.channels()[0].state(), LinkState::Failed);
        assert_eq!(devices.channels()[1].state(), LinkState::Healthy);
        assert_eq!(devices.baro_sources().primary(), Some(SlotId::new(1)));
        assert_eq!(devices.baro_sources().secondary(), None);

        // Failed channels are not inspected again.
        assert!(devices
            .on_tick(later + Duration::from_secs(30))
            .failed
            .is_empty());

        bind(&mut devices, 0, "Broken", later);
        assert_eq!(devices.channels()[0].state(), LinkState::Healthy);
        assert_eq!(broken_counters.opens(), 2);
    }

    #[test]
    fn transport_failure_triggers_timeout() {
        let probe = Probe::new("A");
        let counters = probe.counters();
        let mut devices = make_devices(vec![probe]);
        let start = Instant::now();
        bind(&mut devices, 0, "A", start);
        let mut events = devices.subscribe();

        devices
            .report_transport_failure(SlotId::new(0), "broken pipe")
            .unwrap();
        let report = devices.on_tick(start + Duration::from_secs(1));

        assert_eq!(report.restarted, vec![SlotId::new(0)]);
        assert_eq!(counters.timeouts(), 1);
        assert!(matches!(
            events.try_recv(),
            Ok(DeviceEvent::TransportFailure { .. })
        ));
        assert!(matches!(events.try_recv(), Ok(DeviceEvent::LinkTimeout { .. })));
        assert!(matches!(events.try_recv(), Ok(DeviceEvent::Restarted { .. })));
    }

    #[test]
    fn channel_with_closed_port_fails_on_restart() {
        let probe = Probe::new("A");
        let counters = probe.counters();
        let mut devices = make_devices(vec![probe]);
        let start = Instant::now();
        let slot = SlotId::new(0);

        let (port, rx) = Port::new(TransportInfo::Memory { name: "a".into() });
        devices
            .bind(slot, &Binding::new("A"), port, start)
            .unwrap();
        drop(rx);

        let report = devices.on_tick(start + Duration::from_secs(11));

        assert_eq!(report.failed, vec![slot]);
        assert!(report.restarted.is_empty());
        assert_eq!(devices.channels()[0].state(), LinkState::Failed);
        assert_eq!(counters.closes(), 1);
        assert_eq!(counters.opens(), 1);
    }

    #[test]
    fn restart_reopens_driver_over_reconnected_port() {
        let mut devices = make_devices(vec![Probe::new("A")]);
        let start = Instant::now();
        let slot = SlotId::new(0);

        let (port, rx) = Port::new(TransportInfo::Memory { name: "old".into() });
        devices
            .bind(slot, &Binding::new("A"), port, start)
            .unwrap();
        drop(rx);

        let (fresh, mut fresh_rx) = Port::new(TransportInfo::Memory { name: "new".into() });
        let mut fresh = Some(fresh);
        let mut asked = Vec::new();
        let report = devices.on_tick_with(start + Duration::from_secs(11), |slot, port| {
            asked.push((slot, port.is_closed()));
            match fresh.take() {
                Some(port) => Reconnect::Replace(port),
                None => Reconnect::Unavailable,
            }
        });

        assert_eq!(asked, vec![(slot, true)]);
        assert_eq!(report.restarted, vec![slot]);
        assert_eq!(devices.channels()[0].state(), LinkState::Healthy);
        assert!(devices.channels()[0].port().is_open());

        assert!(devices.write_nmea(slot, "PTEST,1").unwrap());
        assert!(fresh_rx.try_recv().is_ok());
    }

    #[test]
    fn unbound_channels_are_not_inspected() {
        let mut devices = make_devices(vec![Probe::new("A")]);

        assert!(devices
            .on_tick(Instant::now() + Duration::from_secs(60))
            .is_empty());
    }
}
