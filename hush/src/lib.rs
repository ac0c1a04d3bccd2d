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
//! ### Supported algorithms
//!
//! #### Key-exchange:
//! see [`algorithm::Kex`].
//!
//! #### Host keys:
//! see [`algorithm::Key`].
//!
//! #### Encryption:
//! see [`algorithm::Cipher`].
//!
//! #### MACs:
//! see [`algorithm::Hmac`].
//!
//! #### Compression:
//! see [`algorithm::Compress`].

#![warn(
    missing_docs,
    clippy::unwrap_used,
    clippy::panic,
    clippy::unimplemented,
    clippy::todo,
    clippy::undocumented_unsafe_blocks
)]
#![forbid(unsafe_code)]

mod error;
pub use error::{DisconnectedBy, DisconnectedError, Error, Result};

mod stream;

pub mod algorithm;
pub mod key;
pub mod knownhosts;
pub mod service;
pub mod side;

mod session;
pub use session::{Pipe, Session};
