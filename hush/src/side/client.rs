//! Client-[`Side`] configuration of the _session_.

use std::time::Duration;

use futures_time::time::Duration as Timeout;
use hush_wire::{arch::NameList, trans::KexInit, Id};
use rand::RngCore;

use super::Side;
use crate::{
    algorithm::{kex, Cipher, Compress, Hmac, Kex, Key},
    key::PublicKey,
    knownhosts::{Check, KnownHosts},
    stream::{Stream, TransportPair, REKEY_BYTES_THRESHOLD},
    Error, Pipe, Result,
};

/// The host-key acceptance policy of a _client_ session.
#[derive(Debug, Clone, Default)]
pub enum Verifier {
    /// Accept any host key; for tests and explicit first-contact flows.
    #[default]
    AcceptAny,

    /// Check the presented key against a known-hosts database.
    KnownHosts {
        /// The name the host was dialed under.
        host: String,

        /// The recorded host keys.
        database: KnownHosts,
    },
}

impl Verifier {
    pub(crate) fn check(&self, blob: &[u8], public: &PublicKey) -> Result<()> {
        match self {
            Self::AcceptAny => Ok(()),
            Self::KnownHosts { host, database } => {
                match database.check(host, public.algorithm().as_ref(), blob) {
                    Check::Match => Ok(()),
                    Check::Mismatch => {
                        Err(Error::HostKeyRefused("key differs from the recorded one"))
                    }
                    Check::Unknown => {
                        Err(Error::HostKeyRefused("host has no known-hosts entry"))
                    }
                }
            }
        }
    }
}

/// A _client_-side session configuration.
#[derive(Debug, Clone)]
pub struct Client {
    /// [`Id`] for this _client_ session.
    pub id: Id,

    /// Timeout for sending and receiving packets.
    pub timeout: Duration,

    /// Bytes exchanged before a re-key is initiated.
    pub rekey_threshold: usize,

    /// The algorithms enabled for this _client_ session.
    pub algorithms: Algorithms,

    /// The host-key acceptance policy.
    pub verifier: Verifier,
}

impl Default for Client {
    fn default() -> Self {
        Self {
            id: Id::v2(
                concat!(
                    env!("CARGO_PKG_NAME"),
                    "@client:",
                    env!("CARGO_PKG_VERSION")
                ),
                None::<&str>,
            ),
            timeout: Duration::from_secs(120),
            rekey_threshold: REKEY_BYTES_THRESHOLD,
            algorithms: Default::default(),
            verifier: Default::default(),
        }
    }
}

/// Algorithms enabled for a _client_-side session.
#[derive(Debug, Clone)]
pub struct Algorithms {
    /// Enabled algorithms for _key-exchange_.
    pub kexs: Vec<Kex>,

    /// Enabled algorithms for _server host key signature_.
    pub keys: Vec<Key>,

    /// Enabled algorithms for _encryption & decryption_.
    pub ciphers: Vec<Cipher>,

    /// Enabled algorithms for _hmac_.
    pub macs: Vec<Hmac>,

    /// Enabled algorithms for _compression_.
    pub compressions: Vec<Compress>,
}

impl Default for Algorithms {
    fn default() -> Self {
        Self {
            kexs: vec![
                Kex::Curve25519Sha256,
                Kex::Curve25519Sha256Libssh,
                Kex::EcdhSha2NistP256,
                Kex::EcdhSha2NistP384,
                Kex::EcdhSha2NistP521,
                Kex::DhGroupExchangeSha256,
                Kex::DhGroup14Sha1,
                Kex::DhGroupExchangeSha1,
                Kex::DhGroup1Sha1,
            ],
            keys: vec![
                Key::Ed25519,
                Key::EcdsaP256,
                Key::EcdsaP384,
                Key::EcdsaP521,
                Key::Rsa,
            ],
            ciphers: vec![
                Cipher::Aes256Ctr,
                Cipher::Aes128Ctr,
                Cipher::Aes256Cbc,
                Cipher::Aes128Cbc,
            ],
            macs: vec![Hmac::HmacSha256, Hmac::HmacSha512, Hmac::HmacSha1],
            compressions: vec![Compress::None, Compress::ZlibOpenssh, Compress::Zlib],
        }
    }
}

impl Side for Client {
    fn id(&self) -> &Id {
        &self.id
    }

    fn timeout(&self) -> Timeout {
        self.timeout.into()
    }

    fn rekey_threshold(&self) -> usize {
        self.rekey_threshold
    }

    fn kexinit(&self) -> KexInit {
        let mut cookie = [0u8; 16];
        rand::thread_rng().fill_bytes(&mut cookie);

        KexInit {
            cookie,
            kex_algorithms: NameList::new(self.algorithms.kexs.iter().map(|kex| kex.as_ref())),
            server_host_key_algorithms: NameList::new(
                self.algorithms.keys.iter().map(|key| key.as_ref()),
            ),
            encryption_algorithms_client_to_server: NameList::new(
                self.algorithms.ciphers.iter().map(|cipher| cipher.as_ref()),
            ),
            encryption_algorithms_server_to_client: NameList::new(
                self.algorithms.ciphers.iter().map(|cipher| cipher.as_ref()),
            ),
            mac_algorithms_client_to_server: NameList::new(
                self.algorithms.macs.iter().map(|mac| mac.as_ref()),
            ),
            mac_algorithms_server_to_client: NameList::new(
                self.algorithms.macs.iter().map(|mac| mac.as_ref()),
            ),
            compression_algorithms_client_to_server: NameList::new(
                self.algorithms.compressions.iter().map(|comp| comp.as_ref()),
            ),
            compression_algorithms_server_to_client: NameList::new(
                self.algorithms.compressions.iter().map(|comp| comp.as_ref()),
            ),
            languages_client_to_server: NameList::default(),
            languages_server_to_client: NameList::default(),
            first_kex_packet_follows: false,
        }
    }

    async fn exchange(
        &self,
        stream: &mut Stream<impl Pipe>,
        kexinit: (&KexInit, &[u8]),
        peerkexinit: (&KexInit, &[u8]),
        peer_id: &Id,
    ) -> Result<TransportPair> {
        kex::negotiate(kexinit.0, peerkexinit.0)?
            .as_client(
                stream,
                self.id(),
                peer_id,
                kexinit,
                peerkexinit,
                &self.verifier,
            )
            .await
    }
}
