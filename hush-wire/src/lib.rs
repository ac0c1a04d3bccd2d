#![doc = concat!(
    "[![crates.io](https://img.shields.io/crates/v/", env!("CARGO_PKG_NAME"), ")](https://crates.io/crates/", env!("CARGO_PKG_NAME"), ")",
    " ",
    "[![docs.rs](https://img.shields.io/docsrs/", env!("CARGO_PKG_NAME"), ")](https://docs.rs/", env!("CARGO_PKG_NAME"), ")",
    " ",
    "![license](https://img.shields.io/crates/l/", env!("CARGO_PKG_NAME"), ")"
)]
#![doc = ""]
#![doc = env!("CARGO_PKG_DESCRIPTION")]
//!
//! All integers on the wire are big-endian, name strings are US-ASCII,
//! see <https://datatracker.ietf.org/doc/html/rfc4251#section-5>.

#![warn(
    missing_docs,
    clippy::unwrap_used,
    clippy::panic,
    clippy::unimplemented,
    clippy::todo,
    clippy::undocumented_unsafe_blocks
)]
#![forbid(unsafe_code)]

/// Maximum size for the _payload_ of a packet, as the RFC mandates
/// implementations to support packets of a total size of `35000` bytes.
pub const PACKET_MAX_SIZE: usize = 35000;

/// Minimum size for a packet, coincidentally this is
/// the largest block cipher's block-size.
pub const PACKET_MIN_SIZE: usize = 16;

mod error;
pub use error::{Error, Result};

mod codec;
pub use codec::{Decode, Encode, Reader, Writer};

pub mod arch;

mod id;
pub use id::Id;

mod packet;
pub use packet::{IntoPacket, Mac, OpeningCipher, Packet, SealingCipher};

pub mod connect;
pub mod kex;
pub mod sig;
pub mod trans;
pub mod userauth;
