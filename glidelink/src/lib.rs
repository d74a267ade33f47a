//! # Glidelink
//!
//! Device management and driver dispatch for in-flight navigation instruments. Glidelink owns a
//! small, fixed set of communication channels (serial ports, sockets, simulated links), binds each
//! of them to a pluggable driver and routes incoming NMEA-style text lines to the bound driver
//! which merges them into a shared [`NavInfo`](core::nav::NavInfo) aggregate.
//!
//! The same layer pushes commands back out to the hardware (MacCready, ballast, bugs, QNH, radio
//! frequencies, task declarations), decides which channel is the authoritative barometric
//! altitude source and watches every link for stalls.
//!
//! ## Layout
//!
//! * [`core`] contains the runtime-agnostic device layer. It is synchronous and can be driven by
//!   hand: the embedding application delivers lines with
//!   [`Devices::on_line_received`](core::Devices::on_line_received) and calls
//!   [`Devices::on_tick`](core::Devices::on_tick) from its own scheduler.
//! * [`asnc`] wraps the core into a Tokio runtime with one link task per channel and a periodic
//!   health monitor. Available under the `async` feature (enabled by default).
//! * [`drivers`] provides a few built-in drivers.
//!
//! ## Feature flags
#![doc = document_features::document_features!()]
#![warn(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod consts;
pub mod core;
pub mod drivers;
pub mod error;
pub mod prelude;

#[cfg(feature = "async")]
pub mod asnc;
