//! Supported algorithms for **key-exchange**, **host keys**, **encryption**,
//! **integrity** and **compression**, with their negotiation.

mod cipher;
pub use cipher::Cipher;
pub(crate) use cipher::CipherState;

mod compress;
pub use compress::Compress;

mod hmac;
pub use hmac::Hmac;

mod key;
pub use key::Key;

pub(crate) mod kex;
pub use kex::Kex;
