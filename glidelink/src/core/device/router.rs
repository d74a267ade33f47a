use std::time::Instant;

use crate::core::declaration::Declaration;
use crate::core::device::{Command, Devices, LinkState};
use crate::core::driver::{Capability, Outcome};
use crate::core::SlotId;

use crate::prelude::*;

/// What happened to an inbound line.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Dispatch {
    /// Channel is unbound, line was discarded.
    Dropped,
    /// Bound driver (or the fallback parser) recognised the line.
    Handled,
    /// Line reached the channel but no parser recognised it.
    Ignored,
}

impl Devices {
    /// Delivers a line received by the channel at `slot`.
    ///
    /// Lines for unbound channels are dropped. Otherwise activity is stamped before parsing, so a
    /// stream of malformed lines still keeps the link alive. If the channel has a pipe target,
    /// `raw` is relayed to it verbatim whether or not parsing succeeded.
    pub fn on_line_received(&mut self, slot: SlotId, raw: &[u8], now: Instant) -> Result<Dispatch> {
        self.check_slot(slot)?;
        let primary_baro = self.baro.is_primary(slot);

        let channel = &mut self.channels[slot.index()];
        let Some(driver) = channel.driver.clone() else {
            log::trace!("[{slot}] line dropped, channel is unbound");
            return Ok(Dispatch::Dropped);
        };

        channel.record_line(raw, now);

        let dispatch = if channel.state == LinkState::Failed {
            Dispatch::Ignored
        } else {
            let text = String::from_utf8_lossy(raw);
            let line = text.trim_end_matches(['\r', '\n']);
            let ctx = channel.context(primary_baro);

            let mut outcome = driver.parse(&ctx, line, &mut self.nav);
            if !outcome.is_accepted() && driver.is_gps_source() {
                if let Some(fallback) = self.catalogue.fallback() {
                    if fallback.name() != driver.name() {
                        outcome = fallback.parse(&ctx, line, &mut self.nav);
                    }
                }
            }

            if outcome.is_accepted() {
                Dispatch::Handled
            } else {
                log::trace!("[{slot}] unrecognised line: {line}");
                Dispatch::Ignored
            }
        };

        match dispatch {
            Dispatch::Handled => channel.stats.handled += 1,
            _ => channel.stats.rejected += 1,
        }

        if let Some(target) = channel.pipe_to {
            self.relay(slot, target, raw);
        }

        Ok(dispatch)
    }

    /// Sends a command to the channel at `slot`.
    ///
    /// Unbound channels report [`Outcome::Unsupported`], failed ones [`Outcome::Rejected`].
    pub fn command(&self, slot: SlotId, command: &Command) -> Result<Outcome> {
        let channel = self.channel(slot)?;
        if channel.state == LinkState::Failed {
            return Ok(Outcome::Rejected);
        }

        Ok(channel.invoke(self.baro.is_primary(slot), |driver, ctx| {
            command.apply(driver, ctx)
        }))
    }

    /// Sends a command to every bound channel.
    ///
    /// Returns the number of channels which accepted the command. Partial success is not an
    /// error. Fails with [`Error::NoDeviceBound`] only if no channel is bound at all.
    pub fn broadcast(&self, command: &Command) -> Result<usize> {
        let mut bound = 0;
        let mut accepted = 0;

        for channel in self.channels.iter().filter(|channel| channel.is_bound()) {
            bound += 1;
            if channel.state == LinkState::Failed {
                continue;
            }

            let outcome = channel.invoke(self.baro.is_primary(channel.slot()), |driver, ctx| {
                command.apply(driver, ctx)
            });
            if outcome.is_accepted() {
                accepted += 1;
            } else {
                log::trace!("[{}] {command:?}: {outcome:?}", channel.slot());
            }
        }

        if bound == 0 {
            return Err(Error::NoDeviceBound);
        }

        log::debug!("{command:?} accepted by {accepted} of {bound} devices");
        Ok(accepted)
    }

    /// Broadcasts MacCready setting, m/s.
    pub fn broadcast_mac_cready(&self, value: f64) -> Result<usize> {
        self.broadcast(&Command::MacCready(value))
    }

    /// Broadcasts bugs factor.
    pub fn broadcast_bugs(&self, value: f64) -> Result<usize> {
        self.broadcast(&Command::Bugs(value))
    }

    /// Broadcasts ballast fraction.
    pub fn broadcast_ballast(&self, value: f64) -> Result<usize> {
        self.broadcast(&Command::Ballast(value))
    }

    /// Broadcasts QNH, hPa.
    pub fn broadcast_qnh(&self, value: f64) -> Result<usize> {
        self.broadcast(&Command::Qnh(value))
    }

    /// Broadcasts a voice message.
    pub fn broadcast_voice(&self, message: &str) -> Result<usize> {
        self.broadcast(&Command::Voice(message.to_string()))
    }

    /// Broadcasts speaker volume.
    pub fn broadcast_volume(&self, volume: u8) -> Result<usize> {
        self.broadcast(&Command::Volume(volume))
    }

    /// Broadcasts active radio frequency, MHz.
    pub fn broadcast_active_frequency(&self, frequency: f64) -> Result<usize> {
        self.broadcast(&Command::ActiveFrequency(frequency))
    }

    /// Broadcasts standby radio frequency, MHz.
    pub fn broadcast_standby_frequency(&self, frequency: f64) -> Result<usize> {
        self.broadcast(&Command::StandbyFrequency(frequency))
    }

    /// Uploads a task declaration to the channel at `slot`.
    pub fn declare_task(&self, slot: SlotId, declaration: &Declaration) -> Result<Outcome> {
        let channel = self.channel(slot)?;
        if channel.state == LinkState::Failed {
            return Ok(Outcome::Rejected);
        }

        Ok(channel.invoke(self.baro.is_primary(slot), |driver, ctx| {
            driver.declare_task(ctx, declaration)
        }))
    }

    /// Uploads a task declaration to every bound flight recorder.
    ///
    /// Returns the number of recorders which accepted the declaration. Fails with
    /// [`Error::NoDeviceBound`] if no channel is bound.
    pub fn declare_all(&self, declaration: &Declaration) -> Result<usize> {
        if !self.channels.iter().any(|channel| channel.is_bound()) {
            return Err(Error::NoDeviceBound);
        }

        let mut accepted = 0;
        for channel in self.channels.iter().filter(|channel| channel.is_logger()) {
            if self.declare_task(channel.slot(), declaration)?.is_accepted() {
                accepted += 1;
            }
        }

        log::debug!(
            "declaration with {} waypoints accepted by {accepted} recorders",
            declaration.waypoints().len()
        );
        Ok(accepted)
    }

    /// Writes an NMEA sentence to the channel at `slot`.
    ///
    /// `body` is framed with `$`, checksum and line terminator. Returns `false` if the channel
    /// is not operational or its port rejected the write.
    pub fn write_nmea(&self, slot: SlotId, body: &str) -> Result<bool> {
        let channel = self.channel(slot)?;
        Ok(channel.is_operational() && channel.port.write_nmea(body))
    }

    /// Writes an NMEA sentence to every operational channel whose driver declares `capability`.
    ///
    /// Returns the number of channels that queued the sentence.
    pub fn write_nmea_to(&self, capability: Capability, body: &str) -> usize {
        self.channels
            .iter()
            .filter(|channel| channel.is_operational())
            .filter(|channel| {
                channel
                    .driver()
                    .is_some_and(|driver| driver.capabilities().contains(capability))
            })
            .filter(|channel| channel.port.write_nmea(body))
            .count()
    }

    /// Returns `true` if channel at `slot` is bound to a flight recorder.
    pub fn is_logger(&self, slot: SlotId) -> Result<bool> {
        Ok(self.channel(slot)?.is_logger())
    }

    /// Returns `true` if channel at `slot` is bound to a GPS source.
    pub fn is_gps_source(&self, slot: SlotId) -> Result<bool> {
        Ok(self.channel(slot)?.is_gps_source())
    }

    /// Returns `true` if channel at `slot` is bound to a barometric altitude source.
    pub fn is_baro_source(&self, slot: SlotId) -> Result<bool> {
        Ok(self.channel(slot)?.is_baro_source())
    }

    /// Returns `true` if channel at `slot` is bound to a radio.
    pub fn is_radio(&self, slot: SlotId) -> Result<bool> {
        Ok(self.channel(slot)?.is_radio())
    }

    /// Returns `true` if channel at `slot` is bound to the Condor simulator.
    pub fn is_condor(&self, slot: SlotId) -> Result<bool> {
        Ok(self.channel(slot)?.is_condor())
    }

    fn relay(&mut self, source: SlotId, target: SlotId, raw: &[u8]) {
        let delivered = match self.channels.get(target.index()) {
            Some(channel) if channel.is_operational() => channel.port.write(raw),
            _ => false,
        };

        if delivered {
            self.channels[source.index()].stats.relayed += 1;
        } else {
            log::trace!("[{source}] relay to {target} dropped");
        }
    }
}
