use std::fmt::{Debug, Formatter};
use std::net::SocketAddr;

/// <sup>[`serde`](https://serde.rs)</sup>
/// Description of the endpoint behind a channel.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, PartialEq, Eq)]
pub enum TransportInfo {
    /// Serial port.
    Serial {
        /// Port path.
        path: String,
        /// Baud rate.
        baud_rate: u32,
    },
    /// TCP client.
    TcpClient {
        /// Server address.
        remote_addr: SocketAddr,
    },
    /// In-memory stream, used for simulation and testing.
    Memory {
        /// Stream name.
        name: String,
    },
    /// No transport.
    Null,
}

impl Debug for TransportInfo {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportInfo::Serial { path, baud_rate } => write!(f, "serial:{path}@{baud_rate}"),
            TransportInfo::TcpClient { remote_addr } => write!(f, "tcp:{remote_addr}"),
            TransportInfo::Memory { name } => write!(f, "memory:{name}"),
            TransportInfo::Null => write!(f, "null"),
        }
    }
}
