use async_trait::async_trait;
use tokio::io::DuplexStream;
use tokio::sync::Mutex;

use crate::asnc::transport::{BoxedReader, BoxedWriter, Transport};
use crate::core::io::TransportInfo;

use crate::prelude::*;

const BUFFER_SIZE: usize = 4096;

/// <sup>[`async`](crate::asnc)</sup>
/// In-memory transport for simulation and testing.
///
/// Created in pairs with the device end of the stream:
///
/// ```rust
/// use glidelink::asnc::transport::MemoryTransport;
///
/// let (transport, device) = MemoryTransport::pair("vario");
/// ```
///
/// The transport can be connected only once. Whatever the device end writes is received by the
/// channel, whatever the channel sends can be read from the device end.
#[derive(Debug)]
pub struct MemoryTransport {
    name: String,
    stream: Mutex<Option<DuplexStream>>,
}

impl MemoryTransport {
    /// Creates a transport and the device end of its stream.
    pub fn pair(name: &str) -> (Self, DuplexStream) {
        let (local, remote) = tokio::io::duplex(BUFFER_SIZE);
        let transport = Self {
            name: name.to_string(),
            stream: Mutex::new(Some(local)),
        };
        (transport, remote)
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    fn info(&self) -> TransportInfo {
        TransportInfo::Memory {
            name: self.name.clone(),
        }
    }

    async fn connect(&self) -> Result<(BoxedReader, BoxedWriter)> {
        let stream = self.stream.lock().await.take().ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::NotConnected,
                format!("memory stream {} is already taken", self.name),
            )
        })?;

        let (reader, writer) = tokio::io::split(stream);
        Ok((Box::new(reader), Box::new(writer)))
    }

    fn is_repairable(&self) -> bool {
        false
    }
}
