use futures::Future;

use crate::{side::Side, Pipe, Session};

/// A service request, the side _asking for_ a service.
pub trait Request {
    /// The erroneous outcome of the [`Request`].
    type Err: From<crate::Error>;

    /// The successful outcome of the [`Request`].
    type Ok<IO: Pipe, S: Side>;

    /// The requested service _identifier_.
    const SERVICE_NAME: &'static str;

    /// The service callback, invoked once the peer accepted the request.
    fn on_accept<IO, S>(
        &mut self,
        session: Session<IO, S>,
    ) -> impl Future<Output = Result<Self::Ok<IO, S>, Self::Err>>
    where
        IO: Pipe,
        S: Side;
}
