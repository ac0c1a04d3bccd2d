//! Definition of the [`Channel`] struct providing isolated I/O on SSH channels.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use hush_wire::connect;

use crate::{
    connect::Shared,
    tunnel::Tunnel,
    Error, Result,
};

#[doc(no_inline)]
pub use hush_wire::connect::ChannelRequestContext;

pub(crate) mod io;

mod window;
pub(crate) use window::{LocalWindow, RemoteWindow};

pub mod request;

/// The lifecycle of a channel, from `Opening` to `Closed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// The open request is still in flight.
    Opening,

    /// Both directions flow.
    Open,

    /// We signalled end-of-file; the peer may still send.
    EofSent,

    /// The peer signalled end-of-file; we may still send.
    EofReceived,

    /// One side sent `SSH_MSG_CHANNEL_CLOSE`.
    Closing,

    /// Both sides sent `SSH_MSG_CHANNEL_CLOSE`, the identifier is freed.
    Closed,
}

#[derive(Debug, Default)]
pub(crate) struct State {
    pub opened: AtomicBool,
    pub local_eof: AtomicBool,
    pub remote_eof: AtomicBool,
    pub local_closed: AtomicBool,
    pub remote_closed: AtomicBool,
}

impl State {
    pub fn status(&self) -> Status {
        let local_closed = self.local_closed.load(Ordering::SeqCst);
        let remote_closed = self.remote_closed.load(Ordering::SeqCst);

        if !self.opened.load(Ordering::SeqCst) {
            Status::Opening
        } else if local_closed && remote_closed {
            Status::Closed
        } else if local_closed || remote_closed {
            Status::Closing
        } else if self.local_eof.load(Ordering::SeqCst) {
            Status::EofSent
        } else if self.remote_eof.load(Ordering::SeqCst) {
            Status::EofReceived
        } else {
            Status::Open
        }
    }
}

/// An incoming channel request, as routed by the multiplexer.
pub(crate) struct Incoming {
    pub context: ChannelRequestContext,
    pub want_reply: bool,
}

/// The multiplexer's half of a channel.
pub(crate) struct Handle {
    pub remote_id: u32,

    pub data: Option<flume::Sender<Vec<u8>>>,
    pub ext_data: Option<flume::Sender<(u32, Vec<u8>)>>,
    pub requests: flume::Sender<Incoming>,
    pub replies: flume::Sender<bool>,

    pub local_window: Arc<LocalWindow>,
    pub remote_window: Arc<RemoteWindow>,
    pub state: Arc<State>,
}

impl Handle {
    /// Drop the data senders so pending readers drain and then
    /// observe end-of-file.
    pub fn shutdown_data(&mut self) {
        self.data.take();
        self.ext_data.take();
    }
}

/// An opened channel in the session, the application's endpoint for
/// one multiplexed byte stream.
pub struct Channel {
    local_id: u32,
    remote_id: u32,
    remote_maxpack: u32,

    shared: Arc<Shared>,

    local_window: Arc<LocalWindow>,
    remote_window: Arc<RemoteWindow>,
    state: Arc<State>,

    data: flume::Receiver<Vec<u8>>,
    ext_data: flume::Receiver<(u32, Vec<u8>)>,
    requests: flume::Receiver<Incoming>,
    replies: flume::Receiver<bool>,
}

/// Construct the two halves of a channel.
pub(crate) fn pair(
    local_id: u32,
    remote_id: u32,
    remote_window: u32,
    remote_maxpack: u32,
    shared: Arc<Shared>,
) -> (Handle, Channel) {
    let (data_tx, data_rx) = flume::unbounded();
    let (ext_tx, ext_rx) = flume::unbounded();
    let (requests_tx, requests_rx) = flume::unbounded();
    let (replies_tx, replies_rx) = flume::unbounded();

    let local_window = Arc::new(LocalWindow::default());
    let remote_window = Arc::new(RemoteWindow::from(remote_window));
    let state = Arc::new(State::default());

    (
        Handle {
            remote_id,
            data: Some(data_tx),
            ext_data: Some(ext_tx),
            requests: requests_tx,
            replies: replies_tx,
            local_window: local_window.clone(),
            remote_window: remote_window.clone(),
            state: state.clone(),
        },
        Channel {
            local_id,
            remote_id,
            remote_maxpack,
            shared,
            local_window,
            remote_window,
            state,
            data: data_rx,
            ext_data: ext_rx,
            requests: requests_rx,
            replies: replies_rx,
        },
    )
}

impl Channel {
    /// Our identifier for the channel.
    pub fn local_id(&self) -> u32 {
        self.local_id
    }

    /// The peer's identifier for the channel.
    pub fn remote_id(&self) -> u32 {
        self.remote_id
    }

    /// The channel's position in its lifecycle.
    pub fn status(&self) -> Status {
        self.state.status()
    }

    pub(crate) fn raw_reader(&self) -> io::Read {
        io::Read::new(
            io::Source::Data(self.data.clone().into_stream()),
            self.local_window.clone(),
            self.shared.clone(),
            self.remote_id,
        )
    }

    pub(crate) fn raw_writer(&self) -> io::Write {
        io::Write::new(
            None,
            self.shared.clone(),
            self.remote_id,
            self.remote_window.clone(),
            self.remote_maxpack,
            self.state.clone(),
        )
    }

    /// Make a reader for the channel's _data_ stream.
    ///
    /// The channel expects a single reader per stream at a time.
    #[must_use]
    pub fn reader(&self) -> impl futures::AsyncRead + Send + Unpin {
        self.raw_reader()
    }

    /// Make a reader for one of the channel's _extended data_ streams,
    /// `1` being `SSH_EXTENDED_DATA_STDERR`.
    #[must_use]
    pub fn reader_ext(&self, stream_id: u32) -> impl futures::AsyncRead + Send + Unpin {
        io::Read::new(
            io::Source::Extended(stream_id, self.ext_data.clone().into_stream()),
            self.local_window.clone(),
            self.shared.clone(),
            self.remote_id,
        )
    }

    /// Make a writer for the channel's _data_ stream.
    ///
    /// Writes respect the peer's window and maximum packet size, and
    /// park on a full window without blocking any other channel.
    #[must_use]
    pub fn writer(&self) -> impl futures::AsyncWrite + Send + Unpin {
        self.raw_writer()
    }

    /// Make a writer for one of the channel's _extended data_ streams.
    #[must_use]
    pub fn writer_ext(&self, stream_id: u32) -> impl futures::AsyncWrite + Send + Unpin {
        io::Write::new(
            Some(stream_id),
            self.shared.clone(),
            self.remote_id,
            self.remote_window.clone(),
            self.remote_maxpack,
            self.state.clone(),
        )
    }

    /// Iterate over the incoming _channel requests_.
    pub fn requests(&self) -> impl futures::Stream<Item = request::Request<'_>> + '_ {
        use futures::StreamExt;

        self.requests
            .clone()
            .into_stream()
            .map(move |incoming| request::Request::new(self, incoming))
    }

    /// Send a _channel request_, without asking for a reply.
    pub fn request(&self, context: ChannelRequestContext) -> Result<()> {
        self.ensure_writable()?;

        self.shared.send(&connect::ChannelRequest {
            recipient_channel: self.remote_id,
            want_reply: false,
            context,
        })
    }

    /// Send a _channel request_ and wait for the peer's reply.
    pub async fn request_wait(&self, context: ChannelRequestContext) -> Result<request::Response> {
        self.ensure_writable()?;

        self.shared.send(&connect::ChannelRequest {
            recipient_channel: self.remote_id,
            want_reply: true,
            context,
        })?;

        match self.replies.recv_async().await {
            Ok(true) => Ok(request::Response::Success),
            Ok(false) => Ok(request::Response::Failure),
            Err(_) => Err(Error::ChannelClosed),
        }
    }

    /// Signal that we will not send any more data on the channel.
    pub fn eof(&self) -> Result<()> {
        self.ensure_writable()?;

        if !self.state.local_eof.swap(true, Ordering::SeqCst) {
            self.shared.send(&connect::ChannelEof {
                recipient_channel: self.remote_id,
            })?;
        }

        Ok(())
    }

    /// Close the channel; no further message may follow on it.
    pub fn close(&self) {
        if self.state.opened.load(Ordering::SeqCst)
            && !self.state.local_closed.swap(true, Ordering::SeqCst)
        {
            let _ = self.shared.send(&connect::ChannelClose {
                recipient_channel: self.remote_id,
            });

            if self.state.remote_closed.load(Ordering::SeqCst) {
                self.shared.channels.remove(&self.local_id);
            }

            tracing::debug!("Closed channel {}:{}", self.local_id, self.remote_id);
        }
    }

    /// Wrap the channel into a [`Tunnel`], a plain bidirectional byte
    /// stream over the channel's data streams.
    pub fn into_tunnel(self) -> Tunnel {
        Tunnel::new(self)
    }

    pub(crate) fn shared(&self) -> &Arc<Shared> {
        &self.shared
    }

    fn ensure_writable(&self) -> Result<()> {
        match self.state.local_closed.load(Ordering::SeqCst)
            || self.state.remote_closed.load(Ordering::SeqCst)
        {
            true => Err(Error::ChannelClosed),
            false => Ok(()),
        }
    }
}

impl Drop for Channel {
    fn drop(&mut self) {
        self.close();
    }
}
