//! # Built-in drivers
//!
//! A minimal driver set: [`Generic`] understands standard NMEA position sentences and serves as
//! the catalogue's fallback parser, [`Lx`] covers LX Navigation variometers, their GPS-only
//! variant and the Condor simulator which speaks the same protocol.

mod generic;
mod lx;

pub use generic::Generic;
pub use lx::Lx;
