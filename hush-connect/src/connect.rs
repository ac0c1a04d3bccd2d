//! Facilities to interact with the SSH _connect_ protocol.

use std::{
    collections::VecDeque,
    convert::Infallible,
    sync::{
        atomic::{AtomicU32, AtomicUsize, Ordering},
        Arc, Mutex,
    },
};

use dashmap::DashMap;
use futures::FutureExt;
use hush_wire::{
    connect::{self, numbers},
    Encode, IntoPacket, Packet,
};

use hush::{side::Side, Pipe, Session};

use crate::{
    channel::{self, LocalWindow},
    channel_open, global_request, Error, Result,
};

#[doc(no_inline)]
pub use hush_wire::connect::{ChannelOpenContext, ChannelOpenFailureReason, GlobalRequestContext};

/// The state shared between the multiplexer and its channels.
pub(crate) struct Shared {
    outgoing: flume::Sender<Packet>,

    /// Live channels, keyed by our local identifier.
    pub channels: DashMap<u32, channel::Handle>,

    /// Opens we initiated, waiting for a confirmation or failure.
    pending_opens: DashMap<u32, flume::Sender<channel_open::ChannelOpen>>,

    /// Global requests we initiated; replies come back in order.
    pending_requests: Mutex<VecDeque<(bool, flume::Sender<global_request::GlobalRequest>)>>,

    /// The monotonically increasing local identifier source.
    local_ids: AtomicU32,

    /// Mirror of the session's identifier and exchange count, kept
    /// up to date by the pump so it stays observable while it runs.
    session_id: Mutex<Option<Vec<u8>>>,
    exchanges: AtomicUsize,
}

impl Shared {
    /// Queue a message for the pump to send.
    pub fn send(&self, message: &impl Encode) -> Result<()> {
        self.outgoing
            .send(message.into_packet())
            .map_err(|_| Error::ChannelClosed)
    }
}

/// A wrapper around a [`Session`] to interact with the connect layer.
///
/// Channel I/O futures and [`Connect::run`] cooperate on one task:
/// drive them together with [`futures::join`] or [`futures::select`].
pub struct Connect<IO: Pipe, S: Side> {
    session: futures::lock::Mutex<Session<IO, S>>,
    outgoing: flume::Receiver<Packet>,

    shared: Arc<Shared>,
}

impl<IO, S> Connect<IO, S>
where
    IO: Pipe,
    S: Side,
{
    pub(crate) fn new(session: Session<IO, S>) -> Self {
        let (tx, rx) = flume::unbounded();

        Self {
            session: futures::lock::Mutex::new(session),
            outgoing: rx,
            shared: Arc::new(Shared {
                outgoing: tx,
                channels: Default::default(),
                pending_opens: Default::default(),
                pending_requests: Default::default(),
                local_ids: AtomicU32::new(0),
                session_id: Default::default(),
                exchanges: AtomicUsize::new(0),
            }),
        }
    }

    /// The session identifier, the hash of the first key-exchange,
    /// as last observed by [`Connect::run`].
    pub fn session_id(&self) -> Option<Vec<u8>> {
        self.shared
            .session_id
            .lock()
            .expect("the session-id mirror is never poisoned")
            .clone()
    }

    /// The amount of key-exchanges completed over the session's
    /// lifetime, as last observed by [`Connect::run`].
    pub fn exchanges(&self) -> usize {
        self.shared.exchanges.load(Ordering::SeqCst)
    }

    /// Send a disconnect message and tear the session down.
    ///
    /// The [`Connect::run`] future must have been dropped beforehand,
    /// as it holds the session while running.
    pub async fn disconnect(
        self,
        reason: hush_wire::trans::DisconnectReason,
        description: impl Into<String>,
    ) -> hush::DisconnectedError {
        let mut session = self.session.lock().await;

        session.disconnect(reason, description).await
    }

    /// Request a new _channel_ with the provided `context`.
    pub async fn channel_open(
        &self,
        context: ChannelOpenContext,
    ) -> Result<channel_open::ChannelOpen> {
        let local_id = self.shared.local_ids.fetch_add(1, Ordering::SeqCst);

        let (tx, rx) = flume::bounded(1);
        self.shared.pending_opens.insert(local_id, tx);

        self.shared.send(&connect::ChannelOpen {
            sender_channel: local_id,
            initial_window_size: LocalWindow::INITIAL_WINDOW_SIZE,
            maximum_packet_size: crate::MAXIMUM_PACKET_SIZE,
            context,
        })?;

        rx.recv_async().await.map_err(|_| Error::ChannelClosed)
    }

    /// Open a `direct-tcpip` channel towards `host:port` and wrap it
    /// into a [`crate::Tunnel`] right away.
    pub async fn direct_tcpip(
        &self,
        host: impl Into<String>,
        port: u32,
        originator: (impl Into<String>, u32),
    ) -> Result<crate::Tunnel> {
        let open = self
            .channel_open(ChannelOpenContext::DirectTcpip {
                host_to_connect: host.into().into(),
                port_to_connect: port,
                originator_address: originator.0.into().into(),
                originator_port: originator.1,
            })
            .await?;

        match open {
            channel_open::ChannelOpen::Accepted(channel) => Ok(channel.into_tunnel()),
            channel_open::ChannelOpen::Rejected { reason, message } => {
                Err(Error::ChannelOpenFailure { reason, message })
            }
        }
    }

    /// Make a _global request_ with the provided `context`.
    pub async fn global_request(
        &self,
        context: GlobalRequestContext,
    ) -> Result<global_request::GlobalRequest> {
        let with_port = matches!(
            context,
            GlobalRequestContext::TcpipForward { bind_port: 0, .. }
        );

        let (tx, rx) = flume::bounded(1);
        self.shared
            .pending_requests
            .lock()
            .expect("the pending-requests queue is never poisoned")
            .push_back((with_port, tx));

        self.shared.send(&connect::GlobalRequest {
            want_reply: true,
            context,
        })?;

        rx.recv_async().await.map_err(|_| Error::ChannelClosed)
    }

    /// Process the session's incoming messages and the queued outgoing
    /// ones, endlessly.
    ///
    /// Incoming channel opens go through `on_open`, incoming global
    /// requests through `on_global`; `()` rejects everything.
    pub async fn run(
        &self,
        mut on_open: impl channel_open::Hook,
        mut on_global: impl global_request::Hook,
    ) -> Result<Infallible> {
        let mut session = self.session.lock().await;

        loop {
            enum Event {
                Outgoing(Packet),
                Readable,
            }

            let event = {
                let readable = session.readable().fuse();
                let outgoing = self.outgoing.recv_async().fuse();
                futures::pin_mut!(readable, outgoing);

                futures::select_biased! {
                    packet = outgoing => {
                        Event::Outgoing(packet.expect("we hold a sender ourselves"))
                    }
                    res = readable => {
                        res?;

                        Event::Readable
                    }
                }
            };

            match event {
                Event::Outgoing(packet) => session.send(packet).await?,
                Event::Readable => {
                    let packet = session.recv().await?;

                    self.dispatch(&mut session, packet, &mut on_open, &mut on_global)
                        .await?;
                }
            }

            self.observe(&session);
        }
    }

    /// Mirror the session's identifier and exchange count into the
    /// shared state, where they stay readable while the pump runs.
    fn observe(&self, session: &Session<IO, S>) {
        self.shared
            .exchanges
            .store(session.exchanges(), Ordering::SeqCst);

        let mut mirror = self
            .shared
            .session_id
            .lock()
            .expect("the session-id mirror is never poisoned");
        if let Some(id) = session.session_id() {
            *mirror = Some(id.to_vec());
        }
    }

    async fn dispatch(
        &self,
        session: &mut Session<IO, S>,
        packet: Packet,
        on_open: &mut impl channel_open::Hook,
        on_global: &mut impl global_request::Hook,
    ) -> Result<()> {
        match packet.message_number() {
            Some(numbers::CHANNEL_OPEN) => {
                self.on_channel_open(session, packet.to()?, on_open).await?;
            }
            Some(numbers::CHANNEL_OPEN_CONFIRMATION) => {
                let confirmation: connect::ChannelOpenConfirmation = packet.to()?;

                let (_, reply) = self
                    .shared
                    .pending_opens
                    .remove(&confirmation.recipient_channel)
                    .ok_or(Error::UnsolicitedReply)?;

                let (handle, channel) = channel::pair(
                    confirmation.recipient_channel,
                    confirmation.sender_channel,
                    confirmation.initial_window_size,
                    confirmation.maximum_packet_size,
                    self.shared.clone(),
                );
                handle.state.opened.store(true, Ordering::SeqCst);

                self.shared
                    .channels
                    .insert(confirmation.recipient_channel, handle);

                // The opener may be gone; reap the channel through its Drop.
                let _ = reply.send(channel_open::ChannelOpen::Accepted(channel));
            }
            Some(numbers::CHANNEL_OPEN_FAILURE) => {
                let failure: connect::ChannelOpenFailure = packet.to()?;

                let (_, reply) = self
                    .shared
                    .pending_opens
                    .remove(&failure.recipient_channel)
                    .ok_or(Error::UnsolicitedReply)?;

                let _ = reply.send(channel_open::ChannelOpen::Rejected {
                    reason: failure.reason,
                    message: failure.description.into_string(),
                });
            }
            Some(numbers::CHANNEL_WINDOW_ADJUST) => {
                let adjust: connect::ChannelWindowAdjust = packet.to()?;

                if let Some(handle) = self.shared.channels.get(&adjust.recipient_channel) {
                    handle.remote_window.replenish(adjust.bytes_to_add);

                    tracing::debug!(
                        "Peer granted `{}` more window bytes on channel {}",
                        adjust.bytes_to_add,
                        adjust.recipient_channel,
                    );
                }
            }
            Some(numbers::CHANNEL_DATA) => {
                let data: connect::ChannelData = packet.to()?;

                self.on_data(data.recipient_channel, None, data.data.into_vec())?;
            }
            Some(numbers::CHANNEL_EXTENDED_DATA) => {
                let data: connect::ChannelExtendedData = packet.to()?;

                self.on_data(
                    data.recipient_channel,
                    Some(data.data_type),
                    data.data.into_vec(),
                )?;
            }
            Some(numbers::CHANNEL_EOF) => {
                let eof: connect::ChannelEof = packet.to()?;

                if let Some(mut handle) = self.shared.channels.get_mut(&eof.recipient_channel) {
                    handle.state.remote_eof.store(true, Ordering::SeqCst);
                    handle.shutdown_data();
                }
            }
            Some(numbers::CHANNEL_CLOSE) => {
                let close: connect::ChannelClose = packet.to()?;

                self.on_close(session, close.recipient_channel).await?;
            }
            Some(numbers::CHANNEL_REQUEST) => {
                let request: connect::ChannelRequest = packet.to()?;

                match self.shared.channels.get(&request.recipient_channel) {
                    Some(handle) => {
                        let incoming = channel::Incoming {
                            context: request.context,
                            want_reply: request.want_reply,
                        };

                        if handle.requests.send(incoming).is_err() && request.want_reply {
                            let recipient_channel = handle.remote_id;
                            drop(handle);

                            session
                                .send(&connect::ChannelFailure { recipient_channel })
                                .await?;
                        }
                    }
                    None => {
                        tracing::warn!(
                            "Dropped a request for unknown channel {}",
                            request.recipient_channel,
                        );
                    }
                }
            }
            Some(numbers::CHANNEL_SUCCESS) => {
                let success: connect::ChannelSuccess = packet.to()?;

                if let Some(handle) = self.shared.channels.get(&success.recipient_channel) {
                    let _ = handle.replies.send(true);
                }
            }
            Some(numbers::CHANNEL_FAILURE) => {
                let failure: connect::ChannelFailure = packet.to()?;

                if let Some(handle) = self.shared.channels.get(&failure.recipient_channel) {
                    let _ = handle.replies.send(false);
                }
            }
            Some(numbers::GLOBAL_REQUEST) => {
                self.on_global_request(session, packet.to()?, on_global)
                    .await?;
            }
            Some(numbers::REQUEST_SUCCESS) => {
                let (with_port, reply) = self
                    .shared
                    .pending_requests
                    .lock()
                    .expect("the pending-requests queue is never poisoned")
                    .pop_front()
                    .ok_or(Error::UnsolicitedReply)?;

                let outcome = match with_port {
                    true => {
                        let success: connect::ForwardingSuccess = packet.to()?;

                        global_request::GlobalRequest::AcceptedPort(success.bound_port)
                    }
                    false => {
                        packet.to::<connect::RequestSuccess>()?;

                        global_request::GlobalRequest::Accepted
                    }
                };

                let _ = reply.send(outcome);
            }
            Some(numbers::REQUEST_FAILURE) => {
                packet.to::<connect::RequestFailure>()?;

                let (_, reply) = self
                    .shared
                    .pending_requests
                    .lock()
                    .expect("the pending-requests queue is never poisoned")
                    .pop_front()
                    .ok_or(Error::UnsolicitedReply)?;

                let _ = reply.send(global_request::GlobalRequest::Rejected);
            }
            _ => {
                tracing::warn!(
                    "Received an unhandled message `{:?}` on the connect layer",
                    packet.message_number(),
                );
            }
        }

        Ok(())
    }

    async fn on_channel_open(
        &self,
        session: &mut Session<IO, S>,
        open: connect::ChannelOpen,
        on_open: &mut impl channel_open::Hook,
    ) -> Result<()> {
        let local_id = self.shared.local_ids.fetch_add(1, Ordering::SeqCst);

        let (handle, channel) = channel::pair(
            local_id,
            open.sender_channel,
            open.initial_window_size,
            open.maximum_packet_size,
            self.shared.clone(),
        );
        let state = handle.state.clone();

        self.shared.channels.insert(local_id, handle);

        match on_open.process(&open.context, channel) {
            channel_open::Outcome::Accept => {
                state.opened.store(true, Ordering::SeqCst);

                session
                    .send(&connect::ChannelOpenConfirmation {
                        recipient_channel: open.sender_channel,
                        sender_channel: local_id,
                        initial_window_size: LocalWindow::INITIAL_WINDOW_SIZE,
                        maximum_packet_size: crate::MAXIMUM_PACKET_SIZE,
                    })
                    .await?;

                tracing::debug!(
                    "Accepted a `{}` channel as {local_id}:{}",
                    open.context.as_str(),
                    open.sender_channel,
                );
            }
            channel_open::Outcome::Reject {
                reason,
                description,
            } => {
                self.shared.channels.remove(&local_id);

                session
                    .send(&connect::ChannelOpenFailure {
                        recipient_channel: open.sender_channel,
                        reason,
                        description: description.into(),
                        language: Default::default(),
                    })
                    .await?;
            }
        }

        Ok(())
    }

    fn on_data(&self, local_id: u32, stream_id: Option<u32>, data: Vec<u8>) -> Result<()> {
        let Some(handle) = self.shared.channels.get(&local_id) else {
            tracing::warn!("Dropped {} data bytes for unknown channel {local_id}", data.len());

            return Ok(());
        };

        if !handle.local_window.consume(data.len() as u32) {
            return Err(Error::WindowExceeded { channel: local_id });
        }

        let delivered = match stream_id {
            None => handle
                .data
                .as_ref()
                .map(|sender| sender.send(data).is_ok()),
            Some(stream_id) => handle
                .ext_data
                .as_ref()
                .map(|sender| sender.send((stream_id, data)).is_ok()),
        };

        if delivered.is_none() {
            tracing::warn!("Peer kept sending data after its EOF on channel {local_id}");
        }

        Ok(())
    }

    async fn on_close(&self, session: &mut Session<IO, S>, local_id: u32) -> Result<()> {
        let Some((_, mut handle)) = self.shared.channels.remove(&local_id) else {
            // Receiving a close for an unknown channel is non-fatal,
            // the identifier may just have been reaped already.
            tracing::debug!("Received a close for unknown channel {local_id}");

            return Ok(());
        };

        handle.state.remote_closed.store(true, Ordering::SeqCst);
        handle.shutdown_data();
        handle.remote_window.interrupt();

        // Reply with our own close, unless we already sent one.
        if !handle.state.local_closed.swap(true, Ordering::SeqCst) {
            session
                .send(&connect::ChannelClose {
                    recipient_channel: handle.remote_id,
                })
                .await?;
        }

        tracing::debug!("Channel {local_id}:{} is now closed", handle.remote_id);

        Ok(())
    }

    async fn on_global_request(
        &self,
        session: &mut Session<IO, S>,
        request: connect::GlobalRequest,
        on_global: &mut impl global_request::Hook,
    ) -> Result<()> {
        let wants_port = matches!(
            request.context,
            GlobalRequestContext::TcpipForward { bind_port: 0, .. }
        );

        let outcome = on_global.process(&request.context);

        if request.want_reply {
            match outcome {
                global_request::Outcome::Accept { bound_port } => match (wants_port, bound_port) {
                    (true, Some(bound_port)) => {
                        session.send(&connect::ForwardingSuccess { bound_port }).await?;
                    }
                    _ => session.send(&connect::RequestSuccess).await?,
                },
                global_request::Outcome::Reject => {
                    session.send(&connect::RequestFailure).await?;
                }
            }
        }

        Ok(())
    }
}
