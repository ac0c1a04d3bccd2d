//! Session's [`Side`]s, either [`client::Client`] or [`server::Server`].

use futures::Future;
use futures_time::time::Duration;
use hush_wire::{
    trans::{KexInit, NewKeys},
    Id, IntoPacket,
};

use crate::{
    stream::{Stream, TransportPair},
    Pipe, Result,
};

pub mod client;
pub mod server;

mod private {
    pub trait Sealed {}

    impl Sealed for super::client::Client {}
    impl Sealed for super::server::Server {}
}

/// A side of the SSH protocol, either [`client::Client`] or [`server::Server`].
pub trait Side: private::Sealed + Send + Sync + 'static {
    /// The [`Id`] for this side of the session.
    fn id(&self) -> &Id;

    /// The timeout for sending and receiving packets.
    fn timeout(&self) -> Duration;

    /// The amount of exchanged bytes after which a re-key is initiated.
    fn rekey_threshold(&self) -> usize;

    /// Generate a [`KexInit`] message from the enabled algorithms.
    fn kexinit(&self) -> KexInit;

    /// Perform the algorithm-specific exchange from this side.
    fn exchange(
        &self,
        stream: &mut Stream<impl Pipe>,
        kexinit: (&KexInit, &[u8]),
        peerkexinit: (&KexInit, &[u8]),
        peer_id: &Id,
    ) -> impl Future<Output = Result<TransportPair>> + Send;

    /// Drive a whole key-exchange from this side.
    fn kex(
        &self,
        stream: &mut Stream<impl Pipe>,
        peer_id: &Id,
    ) -> impl Future<Output = Result<()>> + Send {
        async move {
            tracing::debug!("Starting key-exchange procedure");

            let kexinit = self.kexinit();
            let own = (&kexinit).into_packet();
            stream.send(own.clone()).await?;

            // Packets already in flight when we initiated are replayed
            // to the upper layers once the new keys are in place.
            let mut deferred = Vec::new();
            let peer = loop {
                let packet = stream.recv().await?;

                match packet.to::<KexInit>() {
                    Ok(peerkexinit) => break (peerkexinit, packet),
                    Err(_) if deferred.len() < 64 => deferred.push(packet),
                    Err(_) => return Err(crate::Error::UnexpectedMessage),
                }
            };

            let transport = self
                .exchange(
                    stream,
                    (&kexinit, own.payload.as_slice()),
                    (&peer.0, peer.1.payload.as_slice()),
                    peer_id,
                )
                .await?;

            stream.send(&NewKeys).await?;
            stream.recv().await?.to::<NewKeys>()?;

            tracing::debug!(
                "Key-exchange success, negotiated algorithms:\nrx: {:?}\ntx: {:?}",
                transport.rx,
                transport.tx,
            );

            stream.with_transport(transport);
            stream.replay(deferred);

            Ok(())
        }
    }
}
