use async_trait::async_trait;
use tokio_serial::SerialPortBuilderExt;

use crate::asnc::transport::{BoxedReader, BoxedWriter, Transport};
use crate::core::io::TransportInfo;

use crate::prelude::*;

/// <sup>[`async`](crate::asnc) | [`serial`](crate::asnc::transport)</sup>
/// Serial port.
#[derive(Clone, Debug)]
pub struct SerialPort {
    path: String,
    baud_rate: u32,
}

impl SerialPort {
    /// Creates a serial port transport.
    pub fn new(path: &str, baud_rate: u32) -> Self {
        Self {
            path: path.to_string(),
            baud_rate,
        }
    }
}

#[async_trait]
impl Transport for SerialPort {
    fn info(&self) -> TransportInfo {
        TransportInfo::Serial {
            path: self.path.clone(),
            baud_rate: self.baud_rate,
        }
    }

    async fn connect(&self) -> Result<(BoxedReader, BoxedWriter)> {
        let port = tokio_serial::new(&self.path, self.baud_rate).open_native_async()?;
        let (reader, writer) = tokio::io::split(port);
        Ok((Box::new(reader), Box::new(writer)))
    }
}
