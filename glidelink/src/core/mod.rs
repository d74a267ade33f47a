//! # Device layer core
//!
//! Runtime-agnostic part of the device layer. The central type is [`Devices`]: a registry of a
//! fixed number of [`Channel`]s and a [`DriverCatalogue`](driver::DriverCatalogue) of available
//! drivers. [`Devices`] also acts as dispatch router, barometric source arbitrator and link health
//! monitor.
//!
//! Nothing in this module spawns tasks or performs blocking I/O. Outbound traffic is queued into
//! [`Port`](io::Port)s which are drained by whoever owns the underlying transport (see
//! [`asnc`](crate::asnc) for the Tokio implementation). Timestamps are injected by the caller,
//! which keeps the whole layer deterministic under test.
//!
//! All methods of [`Devices`] take `&mut self`. Callers that deliver lines from several channels
//! concurrently must wrap [`Devices`] into a single lock, so at most one driver touches the shared
//! [`NavInfo`](nav::NavInfo) at any instant.

pub mod declaration;
pub mod device;
pub mod driver;
pub mod io;
pub mod nav;
mod slot;
pub mod utils;

pub use device::{
    BaroSources, Binding, Channel, ChannelStats, Command, DeviceEvent, Devices, DevicesConf,
    DevicesConfBuilder, Dispatch, Expectation, LinkState, Reconnect, TickReport,
};
pub use slot::SlotId;
