//! The SSH _channel open_ exchange, both directions.

use hush_wire::connect;

use crate::channel;

/// The response to an outgoing _channel open request_.
pub enum ChannelOpen {
    /// The peer _accepted_ the channel open request.
    Accepted(channel::Channel),

    /// The peer _rejected_ the channel open request.
    Rejected {
        /// The reason for failure.
        reason: connect::ChannelOpenFailureReason,

        /// A textual message to accompany the reason.
        message: String,
    },
}

/// An outcome to an incoming channel open request, decided by a [`Hook`].
#[derive(Debug)]
pub enum Outcome {
    /// _Accept_ the channel open request.
    Accept,

    /// _Reject_ the channel open request.
    Reject {
        /// Reason for rejection.
        reason: connect::ChannelOpenFailureReason,

        /// A textual description of the reason.
        description: String,
    },
}

/// A hook on incoming channel open requests.
///
/// On [`Outcome::Accept`] the provided [`channel::Channel`] is live and
/// the hook is expected to have kept it; on [`Outcome::Reject`] the
/// dropped channel is reaped silently.
pub trait Hook: Send {
    /// Process the channel open request.
    fn process(
        &mut self,
        context: &connect::ChannelOpenContext,
        channel: channel::Channel,
    ) -> Outcome;
}

impl<T: FnMut(&connect::ChannelOpenContext, channel::Channel) -> Outcome + Send> Hook for T {
    fn process(
        &mut self,
        context: &connect::ChannelOpenContext,
        channel: channel::Channel,
    ) -> Outcome {
        (self)(context, channel)
    }
}

/// The default implementation, rejecting all requests.
impl Hook for () {
    fn process(&mut self, _: &connect::ChannelOpenContext, _: channel::Channel) -> Outcome {
        Outcome::Reject {
            reason: connect::ChannelOpenFailureReason::AdministrativelyProhibited,
            description: "Channel opening is disabled on this session".into(),
        }
    }
}
