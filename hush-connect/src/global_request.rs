//! The SSH _global request_ exchange, both directions.

use hush_wire::connect;

/// The response to an outgoing _global request_.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlobalRequest {
    /// The peer _accepted_ the global request.
    Accepted,

    /// The peer _accepted_ a `tcpip-forward` request for port `0`,
    /// reporting the port it actually bound.
    AcceptedPort(u32),

    /// The peer _rejected_ the global request.
    Rejected,
}

/// An outcome to an incoming global request, decided by a [`Hook`].
#[derive(Debug, PartialEq, Eq)]
pub enum Outcome {
    /// _Accept_ the global request; `bound_port` is reported back for
    /// a `tcpip-forward` request on port `0`.
    Accept {
        /// Port that was bound, when the peer asked for any port.
        bound_port: Option<u32>,
    },

    /// _Reject_ the global request.
    Reject,
}

/// A hook on incoming global requests.
pub trait Hook: Send {
    /// Process the global request.
    fn process(&mut self, context: &connect::GlobalRequestContext) -> Outcome;
}

impl<T: FnMut(&connect::GlobalRequestContext) -> Outcome + Send> Hook for T {
    fn process(&mut self, context: &connect::GlobalRequestContext) -> Outcome {
        (self)(context)
    }
}

/// The default implementation, rejecting all requests.
impl Hook for () {
    fn process(&mut self, _: &connect::GlobalRequestContext) -> Outcome {
        Outcome::Reject
    }
}
