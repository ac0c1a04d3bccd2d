use hush::{service, side::Side, Pipe, Session};

use crate::Connect;

/// The `ssh-connection` service, yielding a [`Connect`] on both the
/// requesting and the handling side.
pub struct Service;

impl service::Request for Service {
    type Err = hush::Error;
    type Ok<IO: Pipe, S: Side> = Connect<IO, S>;

    const SERVICE_NAME: &'static str = crate::SERVICE_NAME;

    async fn on_accept<IO, S>(
        &mut self,
        session: Session<IO, S>,
    ) -> Result<Self::Ok<IO, S>, Self::Err>
    where
        IO: Pipe,
        S: Side,
    {
        Ok(Connect::new(session))
    }
}

impl service::Handler for Service {
    type Err = hush::Error;
    type Ok<IO: Pipe, S: Side> = Connect<IO, S>;

    const SERVICE_NAME: &'static str = crate::SERVICE_NAME;

    async fn on_request<IO, S>(
        &mut self,
        session: Session<IO, S>,
    ) -> Result<Self::Ok<IO, S>, Self::Err>
    where
        IO: Pipe,
        S: Side,
    {
        Ok(Connect::new(session))
    }
}
