use crate::core::nav::{GeoPoint, NavInfo};
use crate::core::utils::nmea::Sentence;

use crate::prelude::*;

const KNOTS: f64 = 0.514444;

/// Standard NMEA GPS receiver.
///
/// Parses `GGA` and `RMC` sentences of any talker (`GP`, `GN`, ...).
#[derive(Copy, Clone, Debug, Default)]
pub struct Generic;

impl Generic {
    /// Driver name.
    pub const NAME: &'static str = "Generic";

    fn parse_gga(sentence: &Sentence<'_>, nav: &mut NavInfo) -> Outcome {
        let quality = sentence.number(5).unwrap_or(0.0);
        nav.gps_fix = quality > 0.0;
        nav.satellites = sentence.field(6).and_then(|sats| sats.parse().ok());

        if !nav.gps_fix {
            return Outcome::Accepted;
        }
        if let Some(location) = location(sentence, 1) {
            nav.location = Some(location);
        }
        if let Some(altitude) = sentence.number(8) {
            nav.gps_altitude = Some(altitude);
        }

        Outcome::Accepted
    }

    fn parse_rmc(sentence: &Sentence<'_>, nav: &mut NavInfo) -> Outcome {
        nav.gps_fix = sentence.field(1) == Some("A");
        if !nav.gps_fix {
            return Outcome::Accepted;
        }

        if let Some(location) = location(sentence, 2) {
            nav.location = Some(location);
        }
        if let Some(speed) = sentence.number(6) {
            nav.ground_speed = Some(speed * KNOTS);
        }
        if let Some(track) = sentence.number(7) {
            nav.track = Some(track);
        }

        Outcome::Accepted
    }
}

impl Driver for Generic {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::of(&[Capability::Gps])
    }

    fn parse(&self, _: &DriverContext<'_>, line: &str, nav: &mut NavInfo) -> Outcome {
        let Some(sentence) = Sentence::parse(line) else {
            return Outcome::Rejected;
        };

        match sentence.address().get(2..) {
            Some("GGA") => Self::parse_gga(&sentence, nav),
            Some("RMC") => Self::parse_rmc(&sentence, nav),
            _ => Outcome::Rejected,
        }
    }
}

/// Reads `ddmm.mmm,N,dddmm.mmm,E` starting at field `index`.
fn location(sentence: &Sentence<'_>, index: usize) -> Option<GeoPoint> {
    let latitude = coordinate(sentence.field(index)?, sentence.field(index + 1)?, 'S')?;
    let longitude = coordinate(sentence.field(index + 2)?, sentence.field(index + 3)?, 'W')?;

    Some(GeoPoint {
        latitude,
        longitude,
    })
}

fn coordinate(value: &str, hemisphere: &str, negative: char) -> Option<f64> {
    let (integer, _) = value.split_once('.').unwrap_or((value, ""));
    let split = integer.len().checked_sub(2)?;

    let degrees: f64 = value.get(..split)?.parse().ok()?;
    let minutes: f64 = value.get(split..)?.parse().ok()?;
    let coordinate = degrees + minutes / 60.0;

    if hemisphere.starts_with(negative) {
        Some(-coordinate)
    } else {
        Some(coordinate)
    }
}
