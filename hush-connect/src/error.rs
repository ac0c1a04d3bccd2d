//! Collection of error handling types and aliases.

use hush_wire::connect::ChannelOpenFailureReason;
use thiserror::Error;

/// The error types that can occur when manipulating this crate.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum Error {
    /// Transport error.
    #[error(transparent)]
    Transport(#[from] hush::Error),

    /// Wire (de)-serialization error.
    #[error(transparent)]
    Wire(#[from] hush_wire::Error),

    /// I/O error on a bridged stream.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The peer refused to open the channel.
    #[error("Peer refused the opening of the channel: {message} ({reason:?})")]
    ChannelOpenFailure {
        /// The reason for failure.
        reason: ChannelOpenFailureReason,

        /// A textual message to accompany the reason.
        message: String,
    },

    /// The channel has been closed.
    #[error("The channel has been closed")]
    ChannelClosed,

    /// The peer overflowed the window it was granted; this is fatal.
    #[error("Peer sent more data than its window allowed on channel {channel}")]
    WindowExceeded {
        /// The channel the overflow happened on.
        channel: u32,
    },

    /// The peer answered a request nobody sent.
    #[error("Peer answered a global or channel request that was never sent")]
    UnsolicitedReply,

    /// The agent refused or failed to service a request.
    #[error("The agent refused or failed to service the request")]
    AgentRefused,
}

/// A handy [`std::result::Result`] type alias bounding the [`enum@Error`] struct as `E`.
pub type Result<T, E = Error> = std::result::Result<T, E>;
