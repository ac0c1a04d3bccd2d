//! The `none` authentication method hook.

/// An outcome to a `none` authentication attempt.
#[derive(Debug, PartialEq, Eq)]
pub enum Response {
    /// _Accept_ the authentication request.
    Accept,

    /// _Reject_ the authentication request.
    Reject,
}

/// A hook on `none` authentication attempts.
pub trait None: Send {
    /// Process the authentication attempt for `user`.
    fn process(&mut self, user: &str) -> Response;
}

impl<T: FnMut(&str) -> Response + Send> None for T {
    fn process(&mut self, user: &str) -> Response {
        (self)(user)
    }
}

/// The default implementation, rejecting all attempts.
impl None for () {
    fn process(&mut self, _: &str) -> Response {
        Response::Reject
    }
}
