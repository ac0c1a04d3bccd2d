#![doc = concat!(
    "[![crates.io](https://img.shields.io/crates/v/", env!("CARGO_PKG_NAME"), ")](https://crates.io/crates/", env!("CARGO_PKG_NAME"), ")",
    " ",
    "[![docs.rs](https://img.shields.io/docsrs/", env!("CARGO_PKG_NAME"), ")](https://docs.rs/", env!("CARGO_PKG_NAME"), ")",
    " ",
    "![license](https://img.shields.io/crates/l/", env!("CARGO_PKG_NAME"), ")"
)]
#![doc = ""]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

#![warn(
    missing_docs,
    clippy::unwrap_used,
    clippy::panic,
    clippy::unimplemented,
    clippy::todo,
    clippy::undocumented_unsafe_blocks
)]
#![forbid(unsafe_code)]

const SERVICE_NAME: &str = "ssh-connection";

/// The maximum packet size advertised for our channels, in bytes.
const MAXIMUM_PACKET_SIZE: u32 = 32768; // 32KiB

/// The window size advertised for our channels, in bytes.
const INITIAL_WINDOW_SIZE: u32 = 64 * MAXIMUM_PACKET_SIZE;

mod error;
pub use error::{Error, Result};

mod service;
pub use service::Service;

mod connect;
pub use connect::{Connect, ChannelOpenContext, ChannelOpenFailureReason, GlobalRequestContext};

pub mod agent;
pub mod channel;
pub mod channel_open;
pub mod global_request;

mod tunnel;
pub use tunnel::Tunnel;
