//! # Channel I/O primitives
//!
//! The core never touches transports directly. Each bound channel owns a [`Port`], a handle to a
//! bounded queue of outbound bytes drained by the transport owner. Received traffic may be
//! mirrored into a [`TrafficLog`].

mod port;
mod retry;
mod traffic_log;
mod transport_info;

pub use port::{Port, PortReceiver};
pub use retry::Retry;
pub use traffic_log::TrafficLog;
pub use transport_info::TransportInfo;
