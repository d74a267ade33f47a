use std::future::Future;
use std::pin::Pin;
use std::task::{ready, Context, Poll};

use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tokio_stream::Stream;
use tokio_util::sync::ReusableBoxFuture;

use crate::core::DeviceEvent;

/// <sup>[`async`](crate::asnc)</sup>
/// Stream of [`DeviceEvent`]s.
///
/// Slow consumers skip events they lagged behind on. The stream ends once the device registry is
/// dropped.
pub struct EventStream {
    inner: ReusableBoxFuture<'static, (RecvResult, broadcast::Receiver<DeviceEvent>)>,
}

type RecvResult = std::result::Result<DeviceEvent, RecvError>;

impl EventStream {
    pub(crate) fn new(rx: broadcast::Receiver<DeviceEvent>) -> Self {
        Self {
            inner: ReusableBoxFuture::new(make_future(rx)),
        }
    }
}

async fn make_future(
    mut rx: broadcast::Receiver<DeviceEvent>,
) -> (RecvResult, broadcast::Receiver<DeviceEvent>) {
    let result = rx.recv().await;
    (result, rx)
}

impl Stream for EventStream {
    type Item = DeviceEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        loop {
            let (result, rx) = ready!(self.inner.poll(cx));
            self.inner.set(make_future(rx));

            match result {
                Ok(event) => return Poll::Ready(Some(event)),
                Err(RecvError::Closed) => return Poll::Ready(None),
                Err(RecvError::Lagged(skipped)) => {
                    log::trace!("event stream skipped {skipped} events");
                }
            }
        }
    }
}

impl std::fmt::Debug for EventStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventStream").finish_non_exhaustive()
    }
}
