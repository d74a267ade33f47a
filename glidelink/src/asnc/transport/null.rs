use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use async_trait::async_trait;
use tokio::io::{AsyncRead, ReadBuf};

use crate::asnc::transport::{BoxedReader, BoxedWriter, Transport};
use crate::core::io::TransportInfo;

use crate::prelude::*;

/// <sup>[`async`](crate::asnc)</sup>
/// Transport which never receives anything and discards everything written to it.
///
/// Channels over a null transport stay silent, so their drivers are subject to link timeouts.
#[derive(Copy, Clone, Debug, Default)]
pub struct NullTransport;

#[async_trait]
impl Transport for NullTransport {
    fn info(&self) -> TransportInfo {
        TransportInfo::Null
    }

    async fn connect(&self) -> Result<(BoxedReader, BoxedWriter)> {
        Ok((Box::new(Silence), Box::new(tokio::io::sink())))
    }
}

struct Silence;

impl AsyncRead for Silence {
    fn poll_read(
        self: Pin<&mut Self>,
        _: &mut Context<'_>,
        _: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        Poll::Pending
    }
}
