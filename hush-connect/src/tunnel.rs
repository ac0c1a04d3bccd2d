use std::{io, pin::Pin, task};

use futures::{AsyncRead, AsyncWrite};

use crate::channel::{self, Channel};

/// A [`Channel`] adapted into a plain bidirectional byte stream.
///
/// Writes become windowed `SSH_MSG_CHANNEL_DATA`, reads drain the
/// inbound data queue, and closing propagates an end-of-file then the
/// channel close. This is the surface higher-level protocols speak
/// through; the channel knows nothing of their framing.
pub struct Tunnel {
    channel: Channel,

    reader: channel::io::Read,
    writer: channel::io::Write,
}

impl Tunnel {
    pub(crate) fn new(channel: Channel) -> Self {
        Self {
            reader: channel.raw_reader(),
            writer: channel.raw_writer(),
            channel,
        }
    }

    /// The wrapped channel.
    pub fn channel(&self) -> &Channel {
        &self.channel
    }
}

impl AsyncRead for Tunnel {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut task::Context<'_>,
        buf: &mut [u8],
    ) -> task::Poll<io::Result<usize>> {
        Pin::new(&mut self.reader).poll_read(cx, buf)
    }
}

impl AsyncWrite for Tunnel {
    fn poll_write(
        mut self: Pin<&mut Self>,
        cx: &mut task::Context<'_>,
        buf: &[u8],
    ) -> task::Poll<io::Result<usize>> {
        Pin::new(&mut self.writer).poll_write(cx, buf)
    }

    fn poll_flush(
        mut self: Pin<&mut Self>,
        cx: &mut task::Context<'_>,
    ) -> task::Poll<io::Result<()>> {
        Pin::new(&mut self.writer).poll_flush(cx)
    }

    fn poll_close(
        mut self: Pin<&mut Self>,
        cx: &mut task::Context<'_>,
    ) -> task::Poll<io::Result<()>> {
        futures::ready!(Pin::new(&mut self.writer).poll_flush(cx))?;

        let _ = self.channel.eof();
        self.channel.close();

        task::Poll::Ready(Ok(()))
    }
}
