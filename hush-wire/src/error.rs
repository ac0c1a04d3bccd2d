//! Collection of error handling types and aliases.

use thiserror::Error;

/// The error types that can occur when manipulating this crate.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum Error {
    /// I/O Error.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The buffer ended before the value could be read entirely.
    #[error("Unexpected end of buffer at offset {at}")]
    UnexpectedEof {
        /// Offset at which the read was attempted.
        at: usize,
    },

    /// The identification string did not match the expected pattern.
    #[error("Malformed identification string `{0}`")]
    BadIdentifier(String),

    /// The message number did not match the expected one.
    #[error("Unexpected message number {found}, expected {expected}")]
    BadMagic {
        /// The message number that was expected.
        expected: u8,

        /// The message number that was found.
        found: u8,
    },

    /// A `string` that was expected to be text wasn't valid UTF-8.
    #[error("Text string is not valid UTF-8")]
    BadString(#[from] std::str::Utf8Error),

    /// A name or discriminant that this crate does not know about.
    #[error("Unknown or unsupported value for {0}")]
    Unsupported(&'static str),

    /// The `packet_length` field was out of the bounds the RFC allows.
    #[error("Packet length out of bounds ({0} bytes)")]
    BadPacketLength(usize),

    /// The `padding_length` field exceeded the packet length.
    #[error("Padding length {0} exceeds the packet")]
    BadPadding(usize),

    /// A message body left bytes unconsumed in the packet.
    #[error("Message body left {0} trailing bytes")]
    Trailing(usize),
}

/// A handy [`std::result::Result`] type alias bounding the [`enum@Error`] struct as `E`.
pub type Result<T, E = Error> = std::result::Result<T, E>;
