use std::{
    collections::VecDeque,
    io,
    pin::Pin,
    sync::Arc,
    task,
};

use flume::r#async::RecvStream;
use futures::StreamExt;
use hush_wire::connect;

use crate::{channel::LocalWindow, connect::Shared};

/// The stream a [`Read`] drains, plain data or one extended stream.
pub(crate) enum Source {
    Data(RecvStream<'static, Vec<u8>>),
    Extended(u32, RecvStream<'static, (u32, Vec<u8>)>),
}

impl Source {
    /// The next data block for this stream, blocks for other extended
    /// streams are discarded.
    fn poll_block(&mut self, cx: &mut task::Context<'_>) -> task::Poll<Option<Vec<u8>>> {
        match self {
            Self::Data(stream) => stream.poll_next_unpin(cx),
            Self::Extended(id, stream) => loop {
                match futures::ready!(stream.poll_next_unpin(cx)) {
                    Some((stream_id, data)) if stream_id == *id => {
                        break task::Poll::Ready(Some(data))
                    }
                    Some((stream_id, _)) => {
                        tracing::trace!("Discarded a block for extended stream `{stream_id}`");
                    }
                    None => break task::Poll::Ready(None),
                }
            },
        }
    }
}

/// An [`futures::AsyncRead`] over one of a channel's data streams,
/// replenishing the peer's window as the consumer drains it.
pub(crate) struct Read {
    source: Source,
    buffer: VecDeque<u8>,

    window: Arc<LocalWindow>,
    shared: Arc<Shared>,
    remote_id: u32,
}

impl Read {
    pub fn new(
        source: Source,
        window: Arc<LocalWindow>,
        shared: Arc<Shared>,
        remote_id: u32,
    ) -> Self {
        Self {
            source,
            buffer: Default::default(),
            window,
            shared,
            remote_id,
        }
    }

    fn adjust_window(&self) {
        if let Some(bytes_to_add) = self.window.adjustable() {
            let sent = self
                .shared
                .send(&connect::ChannelWindowAdjust {
                    recipient_channel: self.remote_id,
                    bytes_to_add,
                })
                .is_ok();

            if sent {
                tracing::debug!(
                    "Granted `{bytes_to_add}` more window bytes on channel :{}",
                    self.remote_id,
                );
            }
        }
    }
}

impl futures::AsyncRead for Read {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut task::Context<'_>,
        buf: &mut [u8],
    ) -> task::Poll<io::Result<usize>> {
        while self.buffer.is_empty() {
            match futures::ready!(self.source.poll_block(cx)) {
                Some(data) => {
                    self.buffer.extend(&data);
                }
                // Senders dropped on EOF or close: the stream is done.
                None => return task::Poll::Ready(Ok(0)),
            }
        }

        let count = io::Read::read(&mut self.buffer, buf)?;
        self.adjust_window();

        task::Poll::Ready(Ok(count))
    }
}
