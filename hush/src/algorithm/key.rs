use hush_wire::trans::KexInit;
use strum::{AsRefStr, EnumIter, EnumString};

use crate::{Error, Result};

pub(crate) fn negotiate(clientkex: &KexInit, serverkex: &KexInit) -> Result<Key> {
    clientkex
        .server_host_key_algorithms
        .preferred_in(&serverkex.server_host_key_algorithms)
        .ok_or(Error::NoCommonKey)?
        .parse()
        .map_err(|_| Error::NoCommonKey)
}

/// SSH host key algorithms.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, AsRefStr, EnumIter)]
pub enum Key {
    /// The Ed25519 signature algorithm.
    #[strum(serialize = "ssh-ed25519")]
    Ed25519,

    /// ECDSA over the NIST P-256 curve, with the sha-2-256 digest.
    #[strum(serialize = "ecdsa-sha2-nistp256")]
    EcdsaP256,

    /// ECDSA over the NIST P-384 curve, with the sha-2-384 digest.
    #[strum(serialize = "ecdsa-sha2-nistp384")]
    EcdsaP384,

    /// ECDSA over the NIST P-521 curve, with the sha-2-512 digest.
    #[strum(serialize = "ecdsa-sha2-nistp521")]
    EcdsaP521,

    /// The RSA signature algorithm, with the sha-1 digest.
    #[strum(serialize = "ssh-rsa")]
    Rsa,
}
