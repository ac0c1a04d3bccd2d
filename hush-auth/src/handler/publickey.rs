//! The `publickey` authentication method hook.

use hush::key::PublicKey;

/// An outcome to a `publickey` authentication attempt.
#[derive(Debug, PartialEq, Eq)]
pub enum Response {
    /// _Accept_ the authentication request.
    Accept,

    /// _Reject_ the authentication request.
    Reject,
}

/// A hook on `publickey` authentication attempts.
///
/// The hook only answers whether the key is _authorized_ for the user;
/// the signature itself is verified by the [`Auth`](super::Auth) handler.
pub trait Publickey: Send {
    /// Process the authentication attempt for `user` with `key`.
    fn process(&mut self, user: &str, key: &PublicKey) -> Response;
}

impl<T: FnMut(&str, &PublicKey) -> Response + Send> Publickey for T {
    fn process(&mut self, user: &str, key: &PublicKey) -> Response {
        (self)(user, key)
    }
}

/// The default implementation, rejecting all attempts.
impl Publickey for () {
    fn process(&mut self, _: &str, _: &PublicKey) -> Response {
        Response::Reject
    }
}
