//! The `password` authentication method hook.

/// An outcome to a `password` authentication attempt.
#[derive(Debug, PartialEq, Eq)]
pub enum Response {
    /// _Accept_ the authentication request.
    Accept,

    /// _Reject_ the authentication request.
    Reject,
}

/// A hook on `password` authentication attempts.
pub trait Password: Send {
    /// Process the authentication attempt for `user` with `password`.
    fn process(&mut self, user: &str, password: &str) -> Response;
}

impl<T: FnMut(&str, &str) -> Response + Send> Password for T {
    fn process(&mut self, user: &str, password: &str) -> Response {
        (self)(user, password)
    }
}

/// The default implementation, rejecting all attempts.
impl Password for () {
    fn process(&mut self, _: &str, _: &str) -> Response {
        Response::Reject
    }
}
