use digest::{Digest, FixedOutputReset};
use hush_wire::{arch::MpInt, Encode};
use secrecy::SecretBox;

use crate::algorithm::{Cipher, Hmac};

/// The derived key material of one transport direction,
/// per <https://datatracker.ietf.org/doc/html/rfc4253#section-7.2>.
#[derive(Debug, Default)]
pub struct Keys {
    /// Cipher _initialization vector_.
    pub iv: SecretBox<Vec<u8>>,

    /// Cipher _key_.
    pub key: SecretBox<Vec<u8>>,

    /// Hmac _key_.
    pub hmac: SecretBox<Vec<u8>>,
}

impl Keys {
    /// Derive the client-to-server keys, letters `A`, `C` and `E`.
    pub fn as_client<D: Digest + FixedOutputReset>(
        secret: &MpInt,
        hash: &[u8],
        session_id: &[u8],
        cipher: &Cipher,
        hmac: &Hmac,
    ) -> Self {
        Self {
            iv: Self::derive::<D>(secret, hash, b'A', session_id, cipher.iv_size()),
            key: Self::derive::<D>(secret, hash, b'C', session_id, cipher.key_size()),
            hmac: Self::derive::<D>(secret, hash, b'E', session_id, hmac.size()),
        }
    }

    /// Derive the server-to-client keys, letters `B`, `D` and `F`.
    pub fn as_server<D: Digest + FixedOutputReset>(
        secret: &MpInt,
        hash: &[u8],
        session_id: &[u8],
        cipher: &Cipher,
        hmac: &Hmac,
    ) -> Self {
        Self {
            iv: Self::derive::<D>(secret, hash, b'B', session_id, cipher.iv_size()),
            key: Self::derive::<D>(secret, hash, b'D', session_id, cipher.key_size()),
            hmac: Self::derive::<D>(secret, hash, b'F', session_id, hmac.size()),
        }
    }

    /// `K1 = HASH(K || H || X || session_id)`, extended as needed with
    /// `K(n+1) = HASH(K || H || K1 || .. || Kn)`, truncated to `size`.
    fn derive<D: Digest + FixedOutputReset>(
        secret: &MpInt,
        hash: &[u8],
        kind: u8,
        session_id: &[u8],
        size: usize,
    ) -> SecretBox<Vec<u8>> {
        let secret = secret.to_bytes(); // `K` is hashed in its mpint wire form

        SecretBox::init_with_mut(|key: &mut Vec<u8>| {
            let mut hasher = D::new()
                .chain_update(&secret)
                .chain_update(hash)
                .chain_update([kind])
                .chain_update(session_id);

            key.extend_from_slice(&hasher.finalize_reset());

            while key.len() < size {
                Digest::update(&mut hasher, &secret);
                Digest::update(&mut hasher, hash);
                Digest::update(&mut hasher, &*key);

                key.extend_from_slice(&hasher.finalize_reset());
            }

            key.truncate(size);
        })
    }
}
