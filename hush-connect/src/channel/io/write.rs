use std::{io, pin::Pin, sync::Arc, task};

use hush_wire::connect;

use crate::channel::{RemoteWindow, State};
use crate::connect::Shared;

/// An [`futures::AsyncWrite`] over one of a channel's data streams,
/// respecting the peer's window and maximum packet size.
///
/// Every write is emitted as its own data message, so byte streams
/// spliced over the channel never stall on an unflushed buffer.
pub(crate) struct Write {
    stream_id: Option<u32>,

    shared: Arc<Shared>,
    remote_id: u32,

    window: Arc<RemoteWindow>,
    max_size: u32,
    state: Arc<State>,
}

impl Write {
    pub fn new(
        stream_id: Option<u32>,
        shared: Arc<Shared>,
        remote_id: u32,
        window: Arc<RemoteWindow>,
        max_size: u32,
        state: Arc<State>,
    ) -> Self {
        Self {
            stream_id,
            shared,
            remote_id,
            window,
            max_size,
            state,
        }
    }

    fn is_shut(&self) -> bool {
        use std::sync::atomic::Ordering;

        self.state.local_closed.load(Ordering::SeqCst)
            || self.state.remote_closed.load(Ordering::SeqCst)
            || self.state.local_eof.load(Ordering::SeqCst)
    }
}

impl futures::AsyncWrite for Write {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut task::Context<'_>,
        buf: &[u8],
    ) -> task::Poll<io::Result<usize>> {
        if self.is_shut() {
            return task::Poll::Ready(Err(io::ErrorKind::BrokenPipe.into()));
        }

        if buf.is_empty() {
            return task::Poll::Ready(Ok(0));
        }

        // Split on the peer's maximum packet size, then on whatever
        // window credit is left; park when there is none at all.
        let writable = buf.len().min(self.max_size as usize);
        let reserved = futures::ready!(self.window.poll_reserve(cx, writable as u32)) as usize;

        if self.is_shut() {
            return task::Poll::Ready(Err(io::ErrorKind::BrokenPipe.into()));
        }

        let data = buf[..reserved].to_vec();
        let sent = match self.stream_id {
            Some(data_type) => self.shared.send(&connect::ChannelExtendedData {
                recipient_channel: self.remote_id,
                data_type,
                data: data.into(),
            }),
            None => self.shared.send(&connect::ChannelData {
                recipient_channel: self.remote_id,
                data: data.into(),
            }),
        };

        match sent {
            Ok(()) => task::Poll::Ready(Ok(reserved)),
            Err(_) => task::Poll::Ready(Err(io::ErrorKind::BrokenPipe.into())),
        }
    }

    fn poll_flush(
        self: Pin<&mut Self>,
        _cx: &mut task::Context<'_>,
    ) -> task::Poll<io::Result<()>> {
        // Writes are never buffered locally.
        task::Poll::Ready(Ok(()))
    }

    fn poll_close(
        self: Pin<&mut Self>,
        cx: &mut task::Context<'_>,
    ) -> task::Poll<io::Result<()>> {
        self.poll_flush(cx)
    }
}
