use crate::core::declaration::Declaration;
use crate::core::nav::{NavInfo, Wind};
use crate::core::utils::nmea::Sentence;

use crate::prelude::*;

const KMH: f64 = 1.0 / 3.6;

/// LX Navigation variometer protocol.
///
/// Understands `LXWP0` (airspeed, barometric altitude, vario, wind) and `LXWP2` (MacCready,
/// ballast, bugs) and sends settings back with `PFLX2`. The same protocol is spoken by the GPS-only
/// LX units, which carry no usable barometer, and by the Condor simulator.
#[derive(Clone, Debug)]
pub struct Lx {
    name: &'static str,
    capabilities: Capabilities,
}

impl Lx {
    const VARIO: Capabilities = Capabilities::of(&[
        Capability::Gps,
        Capability::Logger,
        Capability::Speed,
        Capability::Vario,
        Capability::BaroAlt,
        Capability::Wind,
        Capability::NmeaOut,
    ]);

    /// LX variometer and flight recorder.
    pub fn lx() -> Self {
        Self {
            name: "LX",
            capabilities: Self::VARIO,
        }
    }

    /// LX unit without barometer.
    pub fn gps_only() -> Self {
        Self {
            name: "LX GPS",
            capabilities: Self::VARIO.without(Capability::BaroAlt),
        }
    }

    /// Condor gliding simulator.
    pub fn condor() -> Self {
        Self {
            name: "Condor",
            capabilities: Self::VARIO
                .without(Capability::Logger)
                .with(Capability::Condor),
        }
    }

    fn parse_lxwp0(&self, ctx: &DriverContext<'_>, sentence: &Sentence<'_>, nav: &mut NavInfo) {
        if let Some(airspeed) = sentence.number(1) {
            nav.indicated_airspeed = Some(airspeed * KMH);
        }
        if self.is_baro_source() && ctx.is_primary_baro_source() {
            if let Some(altitude) = sentence.number(2) {
                nav.baro_altitude = Some(altitude);
            }
        }
        if let Some(vario) = sentence.number(3) {
            nav.vario = Some(vario);
        }
        if let (Some(direction), Some(speed)) = (sentence.number(10), sentence.number(11)) {
            nav.wind = Some(Wind {
                direction,
                speed: speed * KMH,
            });
        }
        if self.is_condor() {
            nav.simulated = true;
        }
    }

    fn parse_lxwp2(sentence: &Sentence<'_>, nav: &mut NavInfo) {
        if let Some(mac_cready) = sentence.number(0) {
            nav.mac_cready = Some(mac_cready);
        }
        if let Some(ballast) = sentence.number(1) {
            nav.ballast = Some(ballast);
        }
        if let Some(bugs) = sentence.number(2) {
            nav.bugs = Some(1.0 - bugs / 100.0);
        }
    }
}

impl Driver for Lx {
    fn name(&self) -> &str {
        self.name
    }

    fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    fn parse(&self, ctx: &DriverContext<'_>, line: &str, nav: &mut NavInfo) -> Outcome {
        let Some(sentence) = Sentence::parse(line) else {
            return Outcome::Rejected;
        };

        match sentence.address() {
            "LXWP0" => self.parse_lxwp0(ctx, &sentence, nav),
            "LXWP2" => Self::parse_lxwp2(&sentence, nav),
            // Device info and polar, nothing to merge.
            "LXWP1" | "LXWP3" => {}
            _ => return Outcome::Rejected,
        }

        Outcome::Accepted
    }

    fn put_mac_cready(&self, ctx: &DriverContext<'_>, value: f64) -> Outcome {
        ctx.port().write_nmea(&format!("PFLX2,{value:.1},,,,,,")).into()
    }

    fn put_ballast(&self, ctx: &DriverContext<'_>, value: f64) -> Outcome {
        ctx.port().write_nmea(&format!("PFLX2,,{value:.2},,,,,")).into()
    }

    fn put_bugs(&self, ctx: &DriverContext<'_>, value: f64) -> Outcome {
        let percent = ((1.0 - value) * 100.0).round().clamp(0.0, 100.0);
        ctx.port().write_nmea(&format!("PFLX2,,,{percent},,,,")).into()
    }

    fn open(&self, ctx: &DriverContext<'_>) -> Outcome {
        // Ask for the data stream. Silent devices are handled by the health monitor.
        if !ctx.port().write_nmea("PFLX0,LXWP0,1,LXWP1,5,LXWP2,1") {
            log::debug!("[{}] {} stream request is not queued", ctx.slot(), self.name);
        }
        Outcome::Accepted
    }

    fn declare_task(&self, ctx: &DriverContext<'_>, declaration: &Declaration) -> Outcome {
        if !self.is_logger() {
            return Outcome::Unsupported;
        }

        let port = ctx.port();
        let mut sent = port.write_nmea(&format!(
            "PLXVC,DECL,W,{},{},{}",
            declaration.pilot_name(),
            declaration.aircraft_type(),
            declaration.aircraft_registration()
        ));
        for (index, waypoint) in declaration.waypoints().iter().enumerate() {
            let location = waypoint.location();
            sent &= port.write_nmea(&format!(
                "PLXVC,DECL,W,{index},{},{:.5},{:.5},{:.0}",
                waypoint.name(),
                location.latitude,
                location.longitude,
                waypoint.altitude()
            ));
        }

        sent.into()
    }
}
