//! # Driver capability interface
//!
//! A [`Driver`] describes one device family: its name, the [`Capabilities`] it declares and a
//! sparse set of operations. Every operation has a default implementation returning
//! [`Outcome::Unsupported`], so a driver implements only what its hardware can do and callers
//! never probe for missing hooks.
//!
//! Drivers are immutable and shared by every channel bound to them. Per-channel information
//! (slot, outbound port, arbitration status) is passed in a [`DriverContext`].

mod capability;
mod catalogue;
mod context;
mod outcome;

pub use capability::{Capabilities, Capability};
pub use catalogue::DriverCatalogue;
pub use context::DriverContext;
pub use outcome::Outcome;

use std::fmt::Debug;

use crate::core::declaration::Declaration;
use crate::core::nav::NavInfo;

/// Device driver.
///
/// # Usage
///
/// A driver for a variometer which understands a single sentence and accepts MacCready
/// settings:
///
/// ```rust
/// use glidelink::core::nav::NavInfo;
/// use glidelink::prelude::*;
///
/// #[derive(Debug)]
/// struct Vario;
///
/// impl Driver for Vario {
///     fn name(&self) -> &str {
///         "Vario"
///     }
///
///     fn capabilities(&self) -> Capabilities {
///         Capabilities::of(&[Capability::Vario])
///     }
///
///     fn parse(&self, _: &DriverContext<'_>, line: &str, nav: &mut NavInfo) -> Outcome {
///         match line.strip_prefix("$VARIO,").and_then(|v| v.parse().ok()) {
///             Some(vario) => {
///                 nav.vario = Some(vario);
///                 Outcome::Accepted
///             }
///             None => Outcome::Rejected,
///         }
///     }
///
///     fn put_mac_cready(&self, ctx: &DriverContext<'_>, value: f64) -> Outcome {
///         ctx.port().write_nmea(&format!("VMC,{value:.1}")).into()
///     }
/// }
/// ```
pub trait Driver: Debug + Send + Sync {
    /// Unique driver name.
    fn name(&self) -> &str;

    /// Capabilities declared by this driver.
    fn capabilities(&self) -> Capabilities;

    /// Interprets one line received from the device.
    ///
    /// Must not fail on malformed input: unrecognised lines are reported as
    /// [`Outcome::Rejected`] and the router decides whether to try a fallback parser.
    fn parse(&self, ctx: &DriverContext<'_>, line: &str, nav: &mut NavInfo) -> Outcome {
        let _ = (ctx, line, nav);
        Outcome::Unsupported
    }

    /// Sends MacCready setting, m/s.
    fn put_mac_cready(&self, ctx: &DriverContext<'_>, value: f64) -> Outcome {
        let _ = (ctx, value);
        Outcome::Unsupported
    }

    /// Sends bugs factor, `1.0` means clean wings.
    fn put_bugs(&self, ctx: &DriverContext<'_>, value: f64) -> Outcome {
        let _ = (ctx, value);
        Outcome::Unsupported
    }

    /// Sends ballast, fraction of full ballast.
    fn put_ballast(&self, ctx: &DriverContext<'_>, value: f64) -> Outcome {
        let _ = (ctx, value);
        Outcome::Unsupported
    }

    /// Sends QNH, hPa.
    fn put_qnh(&self, ctx: &DriverContext<'_>, value: f64) -> Outcome {
        let _ = (ctx, value);
        Outcome::Unsupported
    }

    /// Sends a voice message.
    fn put_voice(&self, ctx: &DriverContext<'_>, message: &str) -> Outcome {
        let _ = (ctx, message);
        Outcome::Unsupported
    }

    /// Sets speaker volume.
    fn put_volume(&self, ctx: &DriverContext<'_>, volume: u8) -> Outcome {
        let _ = (ctx, volume);
        Outcome::Unsupported
    }

    /// Sets active radio frequency, MHz.
    fn put_active_frequency(&self, ctx: &DriverContext<'_>, frequency: f64) -> Outcome {
        let _ = (ctx, frequency);
        Outcome::Unsupported
    }

    /// Sets standby radio frequency, MHz.
    fn put_standby_frequency(&self, ctx: &DriverContext<'_>, frequency: f64) -> Outcome {
        let _ = (ctx, frequency);
        Outcome::Unsupported
    }

    /// Called when a channel is bound to this driver.
    ///
    /// Only [`Outcome::Rejected`] fails the binding. A driver without an `open` hook is bound
    /// as-is.
    fn open(&self, ctx: &DriverContext<'_>) -> Outcome {
        let _ = ctx;
        Outcome::Unsupported
    }

    /// Called when a channel is unbound, rebound or restarted.
    fn close(&self, ctx: &DriverContext<'_>) -> Outcome {
        let _ = ctx;
        Outcome::Unsupported
    }

    /// Called by the health monitor when the channel has been silent for too long.
    ///
    /// Returning [`Outcome::Accepted`] means the driver has reset the device in place and
    /// suppresses a full channel restart.
    fn on_link_timeout(&self, ctx: &DriverContext<'_>) -> Outcome {
        let _ = ctx;
        Outcome::Unsupported
    }

    /// Uploads a task declaration.
    fn declare_task(&self, ctx: &DriverContext<'_>, declaration: &Declaration) -> Outcome {
        let _ = (ctx, declaration);
        Outcome::Unsupported
    }

    /// Called on every health monitor tick for channels that are not timed out.
    fn on_sys_tick(&self, ctx: &DriverContext<'_>) -> Outcome {
        let _ = ctx;
        Outcome::Unsupported
    }

    /// Returns `true` if driver is a flight recorder.
    fn is_logger(&self) -> bool {
        self.capabilities().contains(Capability::Logger)
    }

    /// Returns `true` if driver provides GPS position.
    fn is_gps_source(&self) -> bool {
        self.capabilities().contains(Capability::Gps)
    }

    /// Returns `true` if driver provides barometric altitude.
    ///
    /// Consulted by arbitration. Drivers may override it to disable the barometer of an
    /// otherwise capable device.
    fn is_baro_source(&self) -> bool {
        self.capabilities().contains(Capability::BaroAlt)
    }

    /// Returns `true` if driver controls a radio.
    fn is_radio(&self) -> bool {
        self.capabilities().contains(Capability::Radio)
    }

    /// Returns `true` if driver talks to the Condor simulator.
    fn is_condor(&self) -> bool {
        self.capabilities().contains(Capability::Condor)
    }
}
