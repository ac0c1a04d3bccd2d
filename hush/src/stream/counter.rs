use std::task::Poll;

use futures::io::{AsyncBufRead, AsyncRead, AsyncWrite};

/// An I/O wrapper counting the bytes going through,
/// driving the byte-based re-keying trigger.
pub struct IoCounter<C> {
    inner: C,
    rx: usize,
    tx: usize,
}

impl<C> IoCounter<C> {
    pub fn new(inner: C) -> Self {
        IoCounter {
            inner,
            rx: 0,
            tx: 0,
        }
    }

    /// Bytes exchanged in both directions since the last [`Self::reset`].
    pub fn count(&self) -> usize {
        self.rx + self.tx
    }

    pub fn reset(&mut self) {
        self.rx = 0;
        self.tx = 0;
    }
}

impl<C: AsyncRead + Unpin> AsyncRead for IoCounter<C> {
    fn poll_read(
        mut self: std::pin::Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
        buf: &mut [u8],
    ) -> Poll<std::io::Result<usize>> {
        let poll = std::pin::Pin::new(&mut self.inner).poll_read(cx, buf);

        if let Poll::Ready(Ok(bytes)) = poll {
            self.rx += bytes;
        }

        poll
    }
}

impl<C: AsyncBufRead + Unpin> AsyncBufRead for IoCounter<C> {
    fn poll_fill_buf(
        self: std::pin::Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> Poll<std::io::Result<&[u8]>> {
        std::pin::Pin::new(&mut self.get_mut().inner).poll_fill_buf(cx)
    }

    fn consume(mut self: std::pin::Pin<&mut Self>, amt: usize) {
        self.rx += amt;

        std::pin::Pin::new(&mut self.inner).consume(amt)
    }
}

impl<C: AsyncWrite + Unpin> AsyncWrite for IoCounter<C> {
    fn poll_write(
        mut self: std::pin::Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
        buf: &[u8],
    ) -> Poll<std::io::Result<usize>> {
        let poll = std::pin::Pin::new(&mut self.inner).poll_write(cx, buf);

        if let Poll::Ready(Ok(bytes)) = poll {
            self.tx += bytes;
        }

        poll
    }

    fn poll_flush(
        mut self: std::pin::Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> Poll<std::io::Result<()>> {
        std::pin::Pin::new(&mut self.inner).poll_flush(cx)
    }

    fn poll_close(
        mut self: std::pin::Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> Poll<std::io::Result<()>> {
        std::pin::Pin::new(&mut self.inner).poll_close(cx)
    }
}
