use either::Either;
use futures::{AsyncBufRead, AsyncWrite, AsyncWriteExt};
use futures_time::future::FutureExt;
use hush_wire::{
    trans::{Debug, Disconnect, DisconnectReason, Ignore, KexInit, ServiceAccept, ServiceRequest, Unimplemented},
    Id, IntoPacket, Packet,
};

use crate::{
    error::{DisconnectedBy, DisconnectedError, Error, Result},
    service,
    side::Side,
    stream::Stream,
};

/// A trait alias for something _pipe-alike_, implementing [`AsyncBufRead`] and [`AsyncWrite`].
pub trait Pipe: AsyncBufRead + AsyncWrite + Unpin + Send + Sync + 'static {}
impl<T: AsyncBufRead + AsyncWrite + Unpin + Send + Sync + 'static> Pipe for T {}

/// A session wrapping a `stream` to handle **key-exchange** and
/// **[`SSH-TRANS`]** layer messages.
pub struct Session<IO: Pipe, S: Side> {
    stream: Either<Stream<IO>, DisconnectedError>,
    config: S,

    peer_id: Id,
}

impl<IO, S> Session<IO, S>
where
    IO: Pipe,
    S: Side,
{
    /// Create a new [`Session`] from a [`Pipe`] stream and some configuration,
    /// performing the identification string exchange.
    pub async fn new(mut stream: IO, config: S) -> Result<Self> {
        config.id().to_async_writer(&mut stream).await?;
        stream.flush().await?;

        let peer_id = Id::from_async_reader(&mut stream)
            .timeout(config.timeout())
            .await??;

        let stream = Stream::new(stream, config.timeout(), config.rekey_threshold());

        tracing::debug!("Session started with peer `{peer_id}`");

        Ok(Self {
            stream: Either::Left(stream),
            config,
            peer_id,
        })
    }

    /// Access the [`Id`] of the connected peer.
    pub fn peer_id(&self) -> &Id {
        &self.peer_id
    }

    /// Access the session identifier, the hash of the first key-exchange.
    pub fn session_id(&self) -> Option<&[u8]> {
        self.stream.as_ref().left().and_then(Stream::session_id)
    }

    /// The amount of key-exchanges completed over the session's lifetime.
    pub fn exchanges(&self) -> usize {
        self.stream
            .as_ref()
            .left()
            .map(Stream::exchanges)
            .unwrap_or_default()
    }

    /// Wait until the [`Session`] becomes readable, to be used with
    /// [`Session::recv`] in [`futures::select`], since `recv` itself
    /// is **not cancel-safe**.
    pub async fn readable(&mut self) -> Result<()> {
        let stream = match &mut self.stream {
            Either::Left(stream) => stream,
            Either::Right(err) => return Err(err.clone().into()),
        };

        stream.fill_buf().await
    }

    /// Receive a _packet_ from the connected peer.
    ///
    /// Transport-layer messages (disconnects, ignores, debug messages,
    /// unimplemented notices and key re-exchanges) are handled inline
    /// and never surface to the caller.
    ///
    /// # Cancel safety
    /// This method is **not cancel-safe**: if used within a
    /// [`futures::select`] call, some data may be partially received.
    pub async fn recv(&mut self) -> Result<Packet> {
        loop {
            let stream = match &mut self.stream {
                Either::Left(stream) => stream,
                Either::Right(err) => return Err(err.clone().into()),
            };

            if stream.is_rekeyable() || stream.peek().await?.to::<KexInit>().is_ok() {
                if let Err(err) = self.config.kex(stream, &self.peer_id).await {
                    tracing::warn!("Key-exchange failed: {err}");

                    return Err(self
                        .disconnect(DisconnectReason::KeyExchangeFailed, err.to_string())
                        .await
                        .into());
                }

                continue;
            }

            let packet = stream.recv().await?;

            if let Ok(Disconnect {
                reason,
                description,
                ..
            }) = packet.to()
            {
                tracing::warn!("Peer disconnected with `{reason:?}`: {description}");

                self.stream = Either::Right(DisconnectedError {
                    by: DisconnectedBy::Them,
                    reason,
                    description: description.into_string(),
                });
            } else if let Ok(Ignore { data }) = packet.to() {
                tracing::debug!("Received an 'ignore' message with length {}", data.len());
            } else if let Ok(Unimplemented { seq }) = packet.to() {
                tracing::debug!("Received an 'unimplemented' message about packet #{seq}");
            } else if let Ok(Debug { message, .. }) = packet.to() {
                tracing::debug!("Received a 'debug' message: {message}");
            } else {
                break Ok(packet);
            }
        }
    }

    /// Send a _packet_ to the connected peer, running a key-exchange
    /// first when one is due or requested by the peer.
    pub async fn send(&mut self, message: impl IntoPacket) -> Result<()> {
        let stream = match &mut self.stream {
            Either::Left(stream) => stream,
            Either::Right(err) => return Err(err.clone().into()),
        };

        if stream.is_rekeyable()
            || (stream.is_readable().await? && stream.peek().await?.to::<KexInit>().is_ok())
        {
            if let Err(err) = self.config.kex(stream, &self.peer_id).await {
                tracing::warn!("Key-exchange failed: {err}");

                return Err(self
                    .disconnect(DisconnectReason::KeyExchangeFailed, err.to_string())
                    .await
                    .into());
            }
        }

        let stream = match &mut self.stream {
            Either::Left(stream) => stream,
            Either::Right(err) => return Err(err.clone().into()),
        };

        stream.send(message).await
    }

    /// Send a _disconnect message_ to the peer and shut the session down.
    pub async fn disconnect(
        &mut self,
        reason: DisconnectReason,
        description: impl Into<String>,
    ) -> DisconnectedError {
        let description = description.into();

        if let Either::Left(stream) = &mut self.stream {
            let message = Disconnect {
                reason,
                description: description.clone().into(),
                language: Default::default(),
            };

            if let Err(err) = stream.send(&message).await {
                tracing::debug!("Unable to send the disconnect message: {err}");
            }
        }

        let err = DisconnectedError {
            by: DisconnectedBy::Us,
            reason,
            description,
        };
        self.stream = Either::Right(err.clone());

        err
    }

    /// Handle a _service_ request from the peer.
    pub async fn handle<H>(mut self, mut service: H) -> Result<H::Ok<IO, S>, H::Err>
    where
        H: service::Handler,
    {
        let packet = self.recv().await?;

        match packet.to::<ServiceRequest>() {
            Ok(ServiceRequest { service_name }) if service_name == H::SERVICE_NAME => {
                self.send(&ServiceAccept { service_name }).await?;

                service.on_request(self).await
            }
            Ok(_) => Err(Error::from(
                self.disconnect(
                    DisconnectReason::ServiceNotAvailable,
                    "Requested service is unknown",
                )
                .await,
            )
            .into()),
            Err(_) => Err(Error::from(
                self.disconnect(
                    DisconnectReason::ProtocolError,
                    "Unexpected message outside of a service request",
                )
                .await,
            )
            .into()),
        }
    }

    /// Request a _service_ from the peer.
    pub async fn request<R>(mut self, mut service: R) -> Result<R::Ok<IO, S>, R::Err>
    where
        R: service::Request,
    {
        self.send(&ServiceRequest {
            service_name: R::SERVICE_NAME.into(),
        })
        .await?;

        let packet = self.recv().await?;
        match packet.to::<ServiceAccept>() {
            Ok(ServiceAccept { service_name }) if service_name == R::SERVICE_NAME => {
                service.on_accept(self).await
            }
            Ok(_) => Err(Error::from(
                self.disconnect(
                    DisconnectReason::ServiceNotAvailable,
                    "Accepted service is unknown",
                )
                .await,
            )
            .into()),
            Err(_) => Err(Error::from(
                self.disconnect(
                    DisconnectReason::ProtocolError,
                    "Unexpected message outside of a service response",
                )
                .await,
            )
            .into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::side::{client::Client, server::Server};
    use futures::io::BufReader;

    #[test]
    fn assert_session_is_send() {
        fn is_send<T: Send>() {}

        is_send::<Session<BufReader<async_std::net::TcpStream>, Client>>();
        is_send::<Session<BufReader<async_std::net::TcpStream>, Server>>();
    }

    #[test]
    fn assert_session_is_sync() {
        fn is_sync<T: Sync>() {}

        is_sync::<Session<BufReader<async_std::net::TcpStream>, Client>>();
        is_sync::<Session<BufReader<async_std::net::TcpStream>, Server>>();
    }
}
