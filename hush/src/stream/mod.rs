//! Primitives to extract and encode binary packets from/to a [`Pipe`] stream.

use futures::{AsyncBufReadExt, AsyncWriteExt, FutureExt};
use futures_time::{future::FutureExt as _, time::Duration};
use hush_wire::{IntoPacket, Packet};

use crate::{Pipe, Result};

mod counter;
use counter::IoCounter;

mod transport;
pub(crate) use transport::{Transport, TransportPair};

mod keys;
pub(crate) use keys::Keys;

/// Re-key after 1GiB of exchanged data, as the RFC recommends.
pub(crate) const REKEY_BYTES_THRESHOLD: usize = 0x40000000;

/// Re-key after an hour on a mostly idle stream.
const REKEY_TIME_THRESHOLD: std::time::Duration = std::time::Duration::from_secs(3600);

/// A wrapper around a [`Pipe`] interfacing with the SSH binary packet protocol.
pub struct Stream<S> {
    inner: IoCounter<S>,
    timeout: Duration,
    rekey_bytes: usize,

    /// The pair of transport algorithms and keys computed from the key-exchange.
    transport: TransportPair,

    /// The session identifier derived from the first key-exchange.
    session: Option<Vec<u8>>,

    /// Completed key-exchanges, and the instant of the latest one.
    exchanges: usize,
    kexed_at: std::time::Instant,

    /// Sequence number for the `tx` side, wrapping and never reset.
    txseq: u32,

    /// Sequence number for the `rx` side, wrapping and never reset.
    rxseq: u32,

    /// A buffer for the `peek` method.
    buffer: Option<Packet>,

    /// Packets deferred during a key-exchange, replayed in order.
    replayed: std::collections::VecDeque<Packet>,
}

impl<S> Stream<S>
where
    S: Pipe,
{
    pub fn new(stream: S, timeout: Duration, rekey_bytes: usize) -> Self {
        Self {
            inner: IoCounter::new(stream),
            timeout,
            rekey_bytes,
            transport: Default::default(),
            session: None,
            exchanges: 0,
            kexed_at: std::time::Instant::now(),
            txseq: 0,
            rxseq: 0,
            buffer: None,
            replayed: Default::default(),
        }
    }

    /// Queue packets received mid-exchange for redelivery, oldest first.
    pub fn replay(&mut self, packets: Vec<Packet>) {
        self.replayed.extend(packets);
    }

    /// Whether a key-exchange is due: none happened yet, enough bytes
    /// flowed since the last one, or it is too long ago.
    pub fn is_rekeyable(&self) -> bool {
        self.session.is_none()
            || self.inner.count() > self.rekey_bytes
            || self.kexed_at.elapsed() > REKEY_TIME_THRESHOLD
    }

    /// Atomically install the transport pair staged by a key-exchange.
    pub fn with_transport(&mut self, transport: TransportPair) {
        self.transport = transport;
        self.inner.reset();
        self.exchanges += 1;
        self.kexed_at = std::time::Instant::now();
    }

    /// Record the session identifier, which is only set by the _first_ exchange.
    pub fn with_session(&mut self, session: &[u8]) -> &[u8] {
        self.session.get_or_insert_with(|| session.to_vec())
    }

    pub fn session_id(&self) -> Option<&[u8]> {
        self.session.as_deref()
    }

    pub fn exchanges(&self) -> usize {
        self.exchanges
    }

    /// Wait until a packet could be read, immediately when one is
    /// already buffered or queued for redelivery.
    pub async fn fill_buf(&mut self) -> Result<()> {
        if self.buffer.is_some() || !self.replayed.is_empty() {
            return Ok(());
        }

        self.inner.fill_buf().await?;

        Ok(())
    }

    /// Poll the stream once to detect whether data is immediately readable.
    pub async fn is_readable(&mut self) -> Result<bool> {
        if self.buffer.is_some() || !self.replayed.is_empty() {
            return Ok(true);
        }

        futures::select_biased! {
            buf = self.inner.fill_buf().fuse() => {
                Ok(!buf?.is_empty())
            }
            _ = futures::future::ready(()).fuse() => {
                Ok(false)
            }
        }
    }

    /// Receive a _packet_ from the peer without removing it from the queue.
    pub async fn peek(&mut self) -> Result<&Packet> {
        let packet = self.recv().await?;

        Ok(self.buffer.insert(packet))
    }

    /// Receive and decrypt a _packet_ from the peer.
    pub async fn recv(&mut self) -> Result<Packet> {
        if let Some(packet) = self.buffer.take() {
            return Ok(packet);
        }

        match self.replayed.pop_front() {
            Some(packet) => Ok(packet),
            None => {
                let packet =
                    Packet::from_async_reader(&mut self.inner, &mut self.transport.rx, self.rxseq)
                        .timeout(self.timeout)
                        .await??;

                tracing::trace!(
                    "<~- #{}: ^{:#x} ({} bytes)",
                    self.rxseq,
                    packet.payload.first().unwrap_or(&0),
                    packet.payload.len(),
                );

                self.rxseq = self.rxseq.wrapping_add(1);

                Ok(packet)
            }
        }
    }

    /// Encrypt and send a _packet_ to the peer.
    pub async fn send(&mut self, packet: impl IntoPacket) -> Result<()> {
        let packet = packet.into_packet();

        packet
            .to_async_writer(&mut self.inner, &mut self.transport.tx, self.txseq)
            .timeout(self.timeout)
            .await??;
        self.inner.flush().await?;

        tracing::trace!(
            "-~> #{}: ^{:#x} ({} bytes)",
            self.txseq,
            packet.payload.first().unwrap_or(&0),
            packet.payload.len(),
        );

        self.txseq = self.txseq.wrapping_add(1);

        Ok(())
    }
}
