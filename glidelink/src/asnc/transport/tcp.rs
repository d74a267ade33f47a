use std::net::{SocketAddr, ToSocketAddrs};

use async_trait::async_trait;
use tokio::net::TcpStream;

use crate::asnc::transport::{BoxedReader, BoxedWriter, Transport};
use crate::core::io::TransportInfo;

use crate::prelude::*;

/// <sup>[`async`](crate::asnc)</sup>
/// TCP client, for instruments exposed over a network bridge or for a simulator.
#[derive(Clone, Debug)]
pub struct TcpClient {
    addr: SocketAddr,
}

impl TcpClient {
    /// Creates a client for a server address.
    ///
    /// Address is resolved once, the first resolved address is used.
    pub fn new(addr: impl ToSocketAddrs) -> Result<Self> {
        let addr = addr.to_socket_addrs()?.next().ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "address resolved to nothing",
            )
        })?;
        Ok(Self { addr })
    }

    /// Server address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }
}

#[async_trait]
impl Transport for TcpClient {
    fn info(&self) -> TransportInfo {
        TransportInfo::TcpClient {
            remote_addr: self.addr,
        }
    }

    async fn connect(&self) -> Result<(BoxedReader, BoxedWriter)> {
        let stream = TcpStream::connect(self.addr).await?;
        let (reader, writer) = stream.into_split();
        Ok((Box::new(reader), Box::new(writer)))
    }
}
