use hush_wire::{sig, trans::KexInit, Id, Reader};
use strum::{AsRefStr, EnumIter, EnumString};

use crate::{
    key::{PrivateKey, PublicKey},
    side::client::Verifier,
    stream::{Stream, Transport, TransportPair},
    Error, Pipe, Result,
};

use super::{cipher, compress, hmac, key, Cipher, Hmac, Key};

mod curve25519;
mod dh;
mod ecdh;

pub(crate) fn negotiate(clientkex: &KexInit, serverkex: &KexInit) -> Result<Kex> {
    clientkex
        .kex_algorithms
        .preferred_in(&serverkex.kex_algorithms)
        .ok_or(Error::NoCommonKex)?
        .parse()
        .map_err(|_| Error::NoCommonKex)
}

/// SSH key-exchange algorithms.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, AsRefStr, EnumIter)]
pub enum Kex {
    /// Curve25519 ECDH with the sha-2-256 digest.
    #[strum(serialize = "curve25519-sha256")]
    Curve25519Sha256,

    /// Curve25519 ECDH with the sha-2-256 digest (pre-RFC 8731).
    #[strum(serialize = "curve25519-sha256@libssh.org")]
    Curve25519Sha256Libssh,

    /// NIST P-256 ECDH with the sha-2-256 digest.
    #[strum(serialize = "ecdh-sha2-nistp256")]
    EcdhSha2NistP256,

    /// NIST P-384 ECDH with the sha-2-384 digest.
    #[strum(serialize = "ecdh-sha2-nistp384")]
    EcdhSha2NistP384,

    /// NIST P-521 ECDH with the sha-2-512 digest.
    #[strum(serialize = "ecdh-sha2-nistp521")]
    EcdhSha2NistP521,

    /// Diffie-Hellman group exchange with the sha-2-256 digest.
    #[strum(serialize = "diffie-hellman-group-exchange-sha256")]
    DhGroupExchangeSha256,

    /// Diffie-Hellman group exchange with the sha-1 digest.
    #[strum(serialize = "diffie-hellman-group-exchange-sha1")]
    DhGroupExchangeSha1,

    /// Diffie-Hellman with the 2048-bit MODP group and the sha-1 digest.
    #[strum(serialize = "diffie-hellman-group14-sha1")]
    DhGroup14Sha1,

    /// Diffie-Hellman with the 1024-bit MODP group and the sha-1 digest.
    #[strum(serialize = "diffie-hellman-group1-sha1")]
    DhGroup1Sha1,
}

/// The negotiated parameters a key-exchange method works from.
pub(crate) struct Exchange<'e> {
    /// The client's identification string, as hashed into the transcript.
    pub v_c: String,

    /// The server's identification string, as hashed into the transcript.
    pub v_s: String,

    /// The client's raw `SSH_MSG_KEXINIT` payload.
    pub i_c: &'e [u8],

    /// The server's raw `SSH_MSG_KEXINIT` payload.
    pub i_s: &'e [u8],

    pub key: Key,

    pub client_cipher: Cipher,
    pub server_cipher: Cipher,
    pub client_hmac: Hmac,
    pub server_hmac: Hmac,
}

impl Exchange<'_> {
    fn new<'e>(
        v_c: &Id,
        v_s: &Id,
        i_c: (&KexInit, &'e [u8]),
        i_s: (&KexInit, &'e [u8]),
    ) -> Result<Exchange<'e>> {
        let (client_cipher, server_cipher) = cipher::negotiate(i_c.0, i_s.0)?;
        let (client_hmac, server_hmac) = hmac::negotiate(i_c.0, i_s.0)?;

        Ok(Exchange {
            v_c: v_c.to_string(),
            v_s: v_s.to_string(),
            i_c: i_c.1,
            i_s: i_s.1,
            key: key::negotiate(i_c.0, i_s.0)?,
            client_cipher,
            server_cipher,
            client_hmac,
            server_hmac,
        })
    }

    fn transcript<'t>(&'t self, k_s: &'t [u8]) -> sig::Transcript<'t> {
        sig::Transcript {
            v_c: &self.v_c,
            v_s: &self.v_s,
            i_c: self.i_c,
            i_s: self.i_s,
            k_s,
        }
    }
}

/// Verify the server's signature over the exchange hash against its
/// presented host key, then consult the client's host-key verifier.
fn verify_host(
    blob: &[u8],
    expected: Key,
    hash: &[u8],
    signature: &[u8],
    verifier: &Verifier,
) -> Result<()> {
    let public = PublicKey::from_blob(blob)?;
    if public.algorithm() != expected {
        return Err(Error::KexError);
    }

    let signature = {
        let mut reader = Reader::new(signature);
        <sig::Signature as hush_wire::Decode>::decode(&mut reader)?
    };
    public.verify(hash, &signature)?;

    verifier.check(blob, &public)
}

impl Kex {
    pub(crate) async fn as_client(
        &self,
        stream: &mut Stream<impl Pipe>,
        v_c: &Id,
        v_s: &Id,
        i_c: (&KexInit, &[u8]),
        i_s: (&KexInit, &[u8]),
        verifier: &Verifier,
    ) -> Result<TransportPair> {
        let (client_compress, server_compress) = compress::negotiate(i_c.0, i_s.0)?;
        let exchange = Exchange::new(v_c, v_s, i_c, i_s)?;

        let (client_keys, server_keys) = match self {
            Self::Curve25519Sha256 | Self::Curve25519Sha256Libssh => {
                curve25519::as_client::<sha2::Sha256>(stream, &exchange, verifier).await?
            }
            Self::EcdhSha2NistP256 => {
                ecdh::as_client::<p256::NistP256, sha2::Sha256>(stream, &exchange, verifier).await?
            }
            Self::EcdhSha2NistP384 => {
                ecdh::as_client::<p384::NistP384, sha2::Sha384>(stream, &exchange, verifier).await?
            }
            Self::EcdhSha2NistP521 => {
                ecdh::as_client::<p521::NistP521, sha2::Sha512>(stream, &exchange, verifier).await?
            }
            Self::DhGroupExchangeSha256 => {
                dh::gex_as_client::<sha2::Sha256>(stream, &exchange, verifier).await?
            }
            Self::DhGroupExchangeSha1 => {
                dh::gex_as_client::<sha1::Sha1>(stream, &exchange, verifier).await?
            }
            Self::DhGroup14Sha1 => {
                dh::group_as_client::<sha1::Sha1>(stream, &exchange, dh::Group::Group14, verifier)
                    .await?
            }
            Self::DhGroup1Sha1 => {
                dh::group_as_client::<sha1::Sha1>(stream, &exchange, dh::Group::Group1, verifier)
                    .await?
            }
        };

        Ok(TransportPair {
            rx: Transport {
                chain: server_keys,
                state: None,
                cipher: exchange.server_cipher,
                hmac: exchange.server_hmac,
                compress: server_compress,
            },
            tx: Transport {
                chain: client_keys,
                state: None,
                cipher: exchange.client_cipher,
                hmac: exchange.client_hmac,
                compress: client_compress,
            },
        })
    }

    pub(crate) async fn as_server(
        &self,
        stream: &mut Stream<impl Pipe>,
        v_c: &Id,
        v_s: &Id,
        i_c: (&KexInit, &[u8]),
        i_s: (&KexInit, &[u8]),
        keys: &[PrivateKey],
    ) -> Result<TransportPair> {
        let (client_compress, server_compress) = compress::negotiate(i_c.0, i_s.0)?;
        let exchange = Exchange::new(v_c, v_s, i_c, i_s)?;

        let key = keys
            .iter()
            .find(|key| key.algorithm() == exchange.key)
            .ok_or(Error::NoCommonKey)?;

        let (client_keys, server_keys) = match self {
            Self::Curve25519Sha256 | Self::Curve25519Sha256Libssh => {
                curve25519::as_server::<sha2::Sha256>(stream, &exchange, key).await?
            }
            Self::EcdhSha2NistP256 => {
                ecdh::as_server::<p256::NistP256, sha2::Sha256>(stream, &exchange, key).await?
            }
            Self::EcdhSha2NistP384 => {
                ecdh::as_server::<p384::NistP384, sha2::Sha384>(stream, &exchange, key).await?
            }
            Self::EcdhSha2NistP521 => {
                ecdh::as_server::<p521::NistP521, sha2::Sha512>(stream, &exchange, key).await?
            }
            Self::DhGroupExchangeSha256 => {
                dh::gex_as_server::<sha2::Sha256>(stream, &exchange, key).await?
            }
            Self::DhGroupExchangeSha1 => {
                dh::gex_as_server::<sha1::Sha1>(stream, &exchange, key).await?
            }
            Self::DhGroup14Sha1 => {
                dh::group_as_server::<sha1::Sha1>(stream, &exchange, dh::Group::Group14, key)
                    .await?
            }
            Self::DhGroup1Sha1 => {
                dh::group_as_server::<sha1::Sha1>(stream, &exchange, dh::Group::Group1, key).await?
            }
        };

        Ok(TransportPair {
            rx: Transport {
                chain: client_keys,
                state: None,
                cipher: exchange.client_cipher,
                hmac: exchange.client_hmac,
                compress: client_compress,
            },
            tx: Transport {
                chain: server_keys,
                state: None,
                cipher: exchange.server_cipher,
                hmac: exchange.server_hmac,
                compress: server_compress,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn every_algorithm_name_roundtrips() {
        for kex in Kex::iter() {
            assert_eq!(kex.as_ref().parse::<Kex>().unwrap(), kex);
        }

        for key in Key::iter() {
            assert_eq!(key.as_ref().parse::<Key>().unwrap(), key);
        }
    }
}
