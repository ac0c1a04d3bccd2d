use cipher::{Block, BlockDecryptMut, BlockEncryptMut, KeyIvInit, StreamCipher};
use hush_wire::trans::KexInit;
use strum::{AsRefStr, EnumIter, EnumString};

use crate::{Error, Result};

/// An opaque, lazily initialized cipher context, kept across packets
/// so CTR keystreams and CBC chains continue mid-stream.
pub type CipherState = Box<dyn std::any::Any + Send + Sync>;

pub(crate) fn negotiate(clientkex: &KexInit, serverkex: &KexInit) -> Result<(Cipher, Cipher)> {
    Ok((
        clientkex
            .encryption_algorithms_client_to_server
            .preferred_in(&serverkex.encryption_algorithms_client_to_server)
            .ok_or(Error::NoCommonCipher)?
            .parse()
            .map_err(|_| Error::NoCommonCipher)?,
        clientkex
            .encryption_algorithms_server_to_client
            .preferred_in(&serverkex.encryption_algorithms_server_to_client)
            .ok_or(Error::NoCommonCipher)?
            .parse()
            .map_err(|_| Error::NoCommonCipher)?,
    ))
}

/// SSH cipher algorithms.
#[non_exhaustive]
#[derive(Debug, Clone, Default, PartialEq, Eq, EnumString, AsRefStr, EnumIter)]
#[strum(serialize_all = "kebab-case")]
pub enum Cipher {
    /// AES-256 in counter (CTR) mode.
    Aes256Ctr,

    /// AES-128 in counter (CTR) mode.
    Aes128Ctr,

    /// AES-256 in cipher block chaining (CBC) mode.
    Aes256Cbc,

    /// AES-128 in cipher block chaining (CBC) mode.
    Aes128Cbc,

    /// No cipher algorithm, before the first `SSH_MSG_NEWKEYS`.
    #[default]
    None,
}

impl Cipher {
    /// Lazily initialize the cipher context held in a dynamically
    /// typed [`CipherState`], so enum variants share one code path.
    fn state<'s, T: KeyIvInit + Send + Sync + 'static>(
        state: &'s mut Option<CipherState>,
        key: &[u8],
        iv: &[u8],
    ) -> &'s mut T {
        state
            .get_or_insert_with(|| {
                Box::new(T::new_from_slices(key, iv).expect("Key derivation sized the key material"))
            })
            .downcast_mut()
            .expect("Cipher state type never changes between packets")
    }

    fn ctr<C: StreamCipher>(cipher: &mut C, buffer: &mut [u8]) -> Result<()> {
        cipher
            .try_apply_keystream(buffer)
            .map_err(|_| Error::Cipher)
    }

    fn cbc_encrypt<C: BlockEncryptMut>(cipher: &mut C, buffer: &mut [u8]) -> Result<()> {
        if buffer.len() % C::block_size() != 0 {
            return Err(Error::Cipher);
        }

        for block in buffer.chunks_exact_mut(C::block_size()) {
            cipher.encrypt_block_mut(Block::<C>::from_mut_slice(block));
        }

        Ok(())
    }

    fn cbc_decrypt<C: BlockDecryptMut>(cipher: &mut C, buffer: &mut [u8]) -> Result<()> {
        if buffer.len() % C::block_size() != 0 {
            return Err(Error::Cipher);
        }

        for block in buffer.chunks_exact_mut(C::block_size()) {
            cipher.decrypt_block_mut(Block::<C>::from_mut_slice(block));
        }

        Ok(())
    }

    pub(crate) fn encrypt(
        &self,
        state: &mut Option<CipherState>,
        key: &[u8],
        iv: &[u8],
        buffer: &mut [u8],
    ) -> Result<()> {
        match self {
            Self::Aes256Ctr => Self::ctr(
                Self::state::<ctr::Ctr128BE<aes::Aes256>>(state, key, iv),
                buffer,
            ),
            Self::Aes128Ctr => Self::ctr(
                Self::state::<ctr::Ctr128BE<aes::Aes128>>(state, key, iv),
                buffer,
            ),
            Self::Aes256Cbc => Self::cbc_encrypt(
                Self::state::<cbc::Encryptor<aes::Aes256>>(state, key, iv),
                buffer,
            ),
            Self::Aes128Cbc => Self::cbc_encrypt(
                Self::state::<cbc::Encryptor<aes::Aes128>>(state, key, iv),
                buffer,
            ),
            Self::None => Ok(()),
        }
    }

    pub(crate) fn decrypt(
        &self,
        state: &mut Option<CipherState>,
        key: &[u8],
        iv: &[u8],
        buffer: &mut [u8],
    ) -> Result<()> {
        match self {
            // In CTR mode, encryption and decryption are the same.
            Self::Aes256Ctr | Self::Aes128Ctr => self.encrypt(state, key, iv, buffer),
            Self::Aes256Cbc => Self::cbc_decrypt(
                Self::state::<cbc::Decryptor<aes::Aes256>>(state, key, iv),
                buffer,
            ),
            Self::Aes128Cbc => Self::cbc_decrypt(
                Self::state::<cbc::Decryptor<aes::Aes128>>(state, key, iv),
                buffer,
            ),
            Self::None => Ok(()),
        }
    }

    /// The cipher's block size, `8` for the `none` packet arithmetic.
    pub fn block_size(&self) -> usize {
        match self {
            Self::None => 8,
            Self::Aes128Cbc | Self::Aes256Cbc | Self::Aes128Ctr | Self::Aes256Ctr => 16,
        }
    }

    /// The cipher's key size.
    pub fn key_size(&self) -> usize {
        match self {
            Self::None => 0,
            Self::Aes128Cbc | Self::Aes128Ctr => 16,
            Self::Aes256Cbc | Self::Aes256Ctr => 32,
        }
    }

    /// The cipher's initialization vector size.
    pub fn iv_size(&self) -> usize {
        match self {
            Self::None => 0,
            Self::Aes128Cbc | Self::Aes256Cbc | Self::Aes128Ctr | Self::Aes256Ctr => 16,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_roundtrips_names() {
        for (cipher, name) in [
            (Cipher::Aes256Ctr, "aes256-ctr"),
            (Cipher::Aes128Ctr, "aes128-ctr"),
            (Cipher::Aes256Cbc, "aes256-cbc"),
            (Cipher::Aes128Cbc, "aes128-cbc"),
        ] {
            assert_eq!(cipher.as_ref(), name);
            assert_eq!(name.parse::<Cipher>().unwrap(), cipher);
        }
    }

    #[test]
    fn it_continues_the_keystream_across_calls() {
        let key = [0x42; 32];
        let iv = [0x24; 16];

        let mut oneshot = [0u8; 64];
        let mut state = None;
        Cipher::Aes256Ctr
            .encrypt(&mut state, &key, &iv, &mut oneshot)
            .unwrap();

        let mut split = [0u8; 64];
        let mut state = None;
        let (head, tail) = split.split_at_mut(16);
        Cipher::Aes256Ctr
            .encrypt(&mut state, &key, &iv, head)
            .unwrap();
        Cipher::Aes256Ctr
            .encrypt(&mut state, &key, &iv, tail)
            .unwrap();

        assert_eq!(oneshot, split);

        let mut state = None;
        Cipher::Aes256Ctr
            .decrypt(&mut state, &key, &iv, &mut split)
            .unwrap();
        assert_eq!(split, [0u8; 64]);
    }
}
