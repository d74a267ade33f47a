//! # Transports
//!
//! A [`Transport`] knows how to (re)connect a byte stream for a channel. The link task owns the
//! resulting reader and writer and asks the transport for a fresh connection after a failure,
//! as long as the transport [is repairable](Transport::is_repairable) and the reconnect policy
//! allows it.

mod memory;
mod null;
#[cfg(feature = "serial")]
mod serial;
mod tcp;

use std::fmt::Debug;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncWrite};

use crate::core::io::TransportInfo;

use crate::prelude::*;

pub use memory::MemoryTransport;
pub use null::NullTransport;
#[cfg(feature = "serial")]
pub use serial::SerialPort;
pub use tcp::TcpClient;

/// Reading half of a connected transport.
pub type BoxedReader = Box<dyn AsyncRead + Send + Unpin>;

/// Writing half of a connected transport.
pub type BoxedWriter = Box<dyn AsyncWrite + Send + Unpin>;

/// <sup>[`async`](crate::asnc)</sup>
/// Byte stream endpoint of a channel.
#[async_trait]
pub trait Transport: Debug + Send + Sync {
    /// Information about the endpoint.
    fn info(&self) -> TransportInfo;

    /// Opens a new connection.
    async fn connect(&self) -> Result<(BoxedReader, BoxedWriter)>;

    /// Returns `true` if transport can be connected again after a failure.
    fn is_repairable(&self) -> bool {
        true
    }
}
