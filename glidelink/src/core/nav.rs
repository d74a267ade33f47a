//! # Normalised navigation state
//!
//! [`NavInfo`] is the aggregate every driver writes into while parsing. The device layer never
//! interprets it: it only guarantees that one driver at a time has write access.

/// Geographic position in decimal degrees.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct GeoPoint {
    /// Latitude, positive north.
    pub latitude: f64,
    /// Longitude, positive east.
    pub longitude: f64,
}

/// Wind vector.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Wind {
    /// Direction the wind blows from, degrees true.
    pub direction: f64,
    /// Speed, m/s.
    pub speed: f64,
}

/// Merged measurements received from all devices.
///
/// Units are SI: metres, metres per second, degrees. Fields are `None` until some device
/// reports them.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NavInfo {
    /// `true` while the last GPS sentence reported a valid fix.
    pub gps_fix: bool,
    /// Number of satellites in use.
    pub satellites: Option<u8>,
    /// GPS position.
    pub location: Option<GeoPoint>,
    /// GPS altitude above mean sea level.
    pub gps_altitude: Option<f64>,
    /// Pressure altitude from the authoritative barometric source.
    pub baro_altitude: Option<f64>,
    /// Speed over ground.
    pub ground_speed: Option<f64>,
    /// Track over ground, degrees true.
    pub track: Option<f64>,
    /// Indicated airspeed.
    pub indicated_airspeed: Option<f64>,
    /// Total energy vario.
    pub vario: Option<f64>,
    /// Wind reported by a device.
    pub wind: Option<Wind>,
    /// MacCready setting reported by a device.
    pub mac_cready: Option<f64>,
    /// Ballast reported by a device, fraction of full ballast.
    pub ballast: Option<f64>,
    /// Bugs factor reported by a device, `1.0` means clean wings.
    pub bugs: Option<f64>,
    /// `true` if data comes from a flight simulator.
    pub simulated: bool,
}
