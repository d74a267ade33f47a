//! # Basic imports

pub use crate::error::{Error, Result};

pub use crate::core::driver::{Capabilities, Capability, Driver, DriverContext, Outcome};
pub use crate::core::io::Port;
pub use crate::core::nav::NavInfo;
pub use crate::core::SlotId;
