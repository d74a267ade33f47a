use crate::core::driver::{Driver, DriverContext, Outcome};

/// Outbound operator command.
///
/// Commands are delivered to a single channel by [`Devices::command`](super::Devices::command)
/// or fanned out to every bound channel by [`Devices::broadcast`](super::Devices::broadcast).
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// MacCready setting, m/s.
    MacCready(f64),
    /// Bugs factor, `1.0` means clean wings.
    Bugs(f64),
    /// Ballast, fraction of full ballast.
    Ballast(f64),
    /// QNH, hPa.
    Qnh(f64),
    /// Voice message.
    Voice(String),
    /// Speaker volume.
    Volume(u8),
    /// Active radio frequency, MHz.
    ActiveFrequency(f64),
    /// Standby radio frequency, MHz.
    StandbyFrequency(f64),
}

impl Command {
    /// Invokes the matching driver setter.
    pub fn apply(&self, driver: &dyn Driver, ctx: &DriverContext<'_>) -> Outcome {
        match self {
            Command::MacCready(value) => driver.put_mac_cready(ctx, *value),
            Command::Bugs(value) => driver.put_bugs(ctx, *value),
            Command::Ballast(value) => driver.put_ballast(ctx, *value),
            Command::Qnh(value) => driver.put_qnh(ctx, *value),
            Command::Voice(message) => driver.put_voice(ctx, message),
            Command::Volume(volume) => driver.put_volume(ctx, *volume),
            Command::ActiveFrequency(frequency) => driver.put_active_frequency(ctx, *frequency),
            Command::StandbyFrequency(frequency) => driver.put_standby_frequency(ctx, *frequency),
        }
    }
}
