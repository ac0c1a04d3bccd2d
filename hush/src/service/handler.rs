use futures::Future;

use crate::{side::Side, Pipe, Session};

/// A service handler, the side _accepting_ a service request.
pub trait Handler {
    /// The erroneous outcome of the [`Handler`].
    type Err: From<crate::Error>;

    /// The successful outcome of the [`Handler`].
    type Ok<IO: Pipe, S: Side>;

    /// The handled service _identifier_.
    const SERVICE_NAME: &'static str;

    /// The service callback, invoked once the request has been accepted.
    fn on_request<IO, S>(
        &mut self,
        session: Session<IO, S>,
    ) -> impl Future<Output = Result<Self::Ok<IO, S>, Self::Err>>
    where
        IO: Pipe,
        S: Side;
}
