//! Incoming _channel requests_ and their replies.

use hush_wire::connect;

use super::{Channel, Incoming};

/// The peer's answer to a [`Channel::request_wait`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Response {
    /// The request succeeded.
    Success,

    /// The request failed or was not recognized.
    Failure,
}

/// An incoming channel request, to be accepted or rejected.
///
/// A request that wanted a reply and is dropped unanswered is
/// rejected on behalf of the consumer.
pub struct Request<'c> {
    channel: &'c Channel,

    context: Option<connect::ChannelRequestContext>,
    want_reply: bool,
    answered: bool,
}

impl<'c> Request<'c> {
    pub(crate) fn new(channel: &'c Channel, incoming: Incoming) -> Self {
        Self {
            channel,
            context: Some(incoming.context),
            want_reply: incoming.want_reply,
            answered: false,
        }
    }

    /// The context of the request.
    pub fn context(&self) -> &connect::ChannelRequestContext {
        self.context
            .as_ref()
            .expect("the context is only taken by `into_context`")
    }

    /// Extract the context of the request, accepting it.
    pub fn into_context(mut self) -> connect::ChannelRequestContext {
        self.answer(true);

        self.context
            .take()
            .expect("the context is only taken by `into_context`")
    }

    /// Accept the request.
    pub fn accept(mut self) {
        self.answer(true);
    }

    /// Reject the request.
    pub fn reject(mut self) {
        self.answer(false);
    }

    fn answer(&mut self, success: bool) {
        if std::mem::replace(&mut self.answered, true) || !self.want_reply {
            return;
        }

        let recipient_channel = self.channel.remote_id();
        let _ = match success {
            true => self
                .channel
                .shared()
                .send(&connect::ChannelSuccess { recipient_channel }),
            false => self
                .channel
                .shared()
                .send(&connect::ChannelFailure { recipient_channel }),
        };
    }
}

impl Drop for Request<'_> {
    fn drop(&mut self) {
        self.answer(false);
    }
}
