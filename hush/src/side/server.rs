//! Server-[`Side`] configuration of the _session_.

use std::time::Duration;

use futures_time::time::Duration as Timeout;
use hush_wire::{arch::NameList, trans::KexInit, Id};
use rand::RngCore;

use super::Side;
use crate::{
    algorithm::{kex, Cipher, Compress, Hmac, Kex},
    key::PrivateKey,
    stream::{Stream, TransportPair, REKEY_BYTES_THRESHOLD},
    Pipe, Result,
};

/// A _server_-side session configuration.
#[derive(Debug, Clone)]
pub struct Server {
    /// [`Id`] for this _server_ session.
    pub id: Id,

    /// Timeout for sending and receiving packets.
    pub timeout: Duration,

    /// Bytes exchanged before a re-key is initiated.
    pub rekey_threshold: usize,

    /// Host keys for the key-exchange signature, one per offered algorithm.
    pub keys: Vec<PrivateKey>,

    /// The algorithms enabled for this _server_ session.
    pub algorithms: Algorithms,
}

impl Default for Server {
    fn default() -> Self {
        Self {
            id: Id::v2(
                concat!(
                    env!("CARGO_PKG_NAME"),
                    "@server:",
                    env!("CARGO_PKG_VERSION")
                ),
                None::<&str>,
            ),
            timeout: Duration::from_secs(120),
            rekey_threshold: REKEY_BYTES_THRESHOLD,
            keys: Default::default(),
            algorithms: Default::default(),
        }
    }
}

/// Algorithms enabled for a _server_-side session.
///
/// The host-key list is implied by the loaded [`Server::keys`].
#[derive(Debug, Clone)]
pub struct Algorithms {
    /// Enabled algorithms for _key-exchange_.
    pub kexs: Vec<Kex>,

    /// Enabled algorithms for _encryption & decryption_.
    pub ciphers: Vec<Cipher>,

    /// Enabled algorithms for _hmac_.
    pub macs: Vec<Hmac>,

    /// Enabled algorithms for _compression_.
    pub compressions: Vec<Compress>,
}

impl Default for Algorithms {
    fn default() -> Self {
        let super::client::Algorithms {
            kexs,
            ciphers,
            macs,
            compressions,
            ..
        } = Default::default();

        Self {
            kexs,
            ciphers,
            macs,
            compressions,
        }
    }
}

impl Side for Server {
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
                self.keys.iter().map(|key| key.algorithm().as_ref().to_owned()),
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
        kex::negotiate(peerkexinit.0, kexinit.0)?
            .as_server(stream, peer_id, self.id(), peerkexinit, kexinit, &self.keys)
            .await
    }
}
