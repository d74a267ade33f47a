use tokio::sync::mpsc;

use crate::consts::PORT_QUEUE_CAPACITY;
use crate::core::io::TransportInfo;
use crate::core::utils::nmea;

/// Receiving end of a [`Port`] queue.
///
/// Owned by whoever writes to the underlying transport.
pub type PortReceiver = mpsc::Receiver<Vec<u8>>;

/// Outbound handle of a channel transport.
///
/// Writes never block: bytes are queued into a bounded channel and a write to a full or closed
/// queue is reported as `false`. A [`Port::null`] discards everything and reports every write as
/// failed.
#[derive(Clone, Debug)]
pub struct Port {
    info: TransportInfo,
    tx: Option<mpsc::Sender<Vec<u8>>>,
}

impl Port {
    /// Creates a port for a transport and the receiver for its outbound queue.
    pub fn new(info: TransportInfo) -> (Self, PortReceiver) {
        let (tx, rx) = mpsc::channel(PORT_QUEUE_CAPACITY);
        (Self { info, tx: Some(tx) }, rx)
    }

    /// Creates a port that is not attached to any transport.
    pub fn null() -> Self {
        Self {
            info: TransportInfo::Null,
            tx: None,
        }
    }

    /// Information about underlying transport.
    pub fn info(&self) -> &TransportInfo {
        &self.info
    }

    /// Returns `true` if receiving side of the port is still alive.
    pub fn is_open(&self) -> bool {
        match &self.tx {
            Some(tx) => !tx.is_closed(),
            None => false,
        }
    }

    /// Returns `true` if port was attached to a transport which has since gone away.
    ///
    /// Unlike [`is_open`](Self::is_open), a [`Port::null`] is never closed.
    pub fn is_closed(&self) -> bool {
        self.tx.as_ref().is_some_and(|tx| tx.is_closed())
    }

    /// Queues raw bytes for writing.
    ///
    /// Returns `false` if port is closed or its queue is full.
    pub fn write(&self, bytes: &[u8]) -> bool {
        let Some(tx) = &self.tx else {
            return false;
        };

        match tx.try_send(bytes.to_vec()) {
            Ok(_) => true,
            Err(err) => {
                log::trace!("[{:?}] dropped {} outbound bytes: {err}", self.info, bytes.len());
                false
            }
        }
    }

    /// Queues text for writing as is.
    pub fn write_str(&self, text: &str) -> bool {
        self.write(text.as_bytes())
    }

    /// Frames `body` as an NMEA sentence with checksum and queues it for writing.
    pub fn write_nmea(&self, body: &str) -> bool {
        self.write_str(&nmea::frame(body))
    }
}

impl Default for Port {
    fn default() -> Self {
        Self::null()
    }
}

#[cfg(test)]
mod port_tests {
    use super::*;

    #[test]
    fn writes_are_queued() {
        let (port, mut rx) = Port::new(TransportInfo::Memory { name: "test".into() });

        assert!(port.write(b"abc"));
        assert!(port.write_nmea("PTEST,1"));

        assert_eq!(rx.try_recv().unwrap(), b"abc");
        assert_eq!(rx.try_recv().unwrap(), nmea::frame("PTEST,1").into_bytes());
    }

    #[test]
    fn closed_and_null_ports_reject_writes() {
        assert!(!Port::null().write(b"abc"));

        let (port, rx) = Port::new(TransportInfo::Null);
        assert!(port.is_open());
        assert!(!port.is_closed());
        drop(rx);
        assert!(!port.is_open());
        assert!(port.is_closed());
        assert!(!Port::null().is_closed());
        assert!(!port.write(b"abc"));
    }

    #[test]
    fn full_queue_rejects_writes() {
        let (port, _rx) = Port::new(TransportInfo::Null);

        for _ in 0..PORT_QUEUE_CAPACITY {
            assert!(port.write(b"x"));
        }
        assert!(!port.write(b"x"));
    }
}
