//! # Glidelink asynchronous device manager
//!
//! Tokio runtime around the [`core`](crate::core) device layer.
//!
//! [`DeviceManager`] keeps [`Devices`](crate::core::Devices) behind a single asynchronous mutex.
//! Each bound channel gets its own link task which connects the channel's [`Transport`], drains
//! the outbound [`Port`](crate::core::io::Port) queue and delivers received lines to the
//! registry. Since every delivery takes the same lock, at most one driver parses into the shared
//! navigation state at any instant, while a stalled transport never blocks other channels.
//!
//! A separate monitor task calls [`Devices::on_tick_with`](crate::core::Devices::on_tick_with)
//! with a configured interval. When the monitor restarts a channel whose link task has exited, a
//! fresh link is spawned over the channel's transport, or the channel fails if the transport
//! can't be reconnected.

mod consts;
mod event;
mod link;
mod manager;
mod monitor;
mod traffic_log;
pub mod transport;

pub use event::EventStream;
pub use manager::{DeviceManager, ManagerConf, ManagerConfBuilder, SlotConf};
#[doc(inline)]
pub use transport::Transport;
