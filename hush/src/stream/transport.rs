use rand::Rng;
use secrecy::ExposeSecret;

use crate::{
    algorithm::{Cipher, CipherState, Compress, Hmac},
    Error, Result,
};

use super::Keys;

/// The transport state of both directions, replaced atomically
/// when a key-exchange completes.
#[derive(Debug, Default)]
pub struct TransportPair {
    pub tx: Transport,
    pub rx: Transport,
}

/// The transport state of one direction: negotiated algorithms,
/// derived keys and the running cipher context.
#[derive(Default)]
pub struct Transport {
    pub compress: Compress,
    pub cipher: Cipher,
    pub hmac: Hmac,

    pub state: Option<CipherState>,
    pub chain: Keys,
}

impl std::fmt::Debug for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transport")
            .field("compress", &self.compress)
            .field("cipher", &self.cipher)
            .field("hmac", &self.hmac)
            .finish_non_exhaustive()
    }
}

impl Transport {
    fn padding(&self, payload: usize) -> u8 {
        const MIN_PAD_SIZE: usize = 4;
        const MIN_ALIGN: usize = 8;

        let align = self.cipher.block_size().max(MIN_ALIGN);

        let size = std::mem::size_of::<u32>() + std::mem::size_of::<u8>() + payload;
        let padding = align - size % align;

        let padding = if padding < MIN_PAD_SIZE {
            padding + align
        } else {
            padding
        };

        if size + padding < self.cipher.block_size().max(hush_wire::PACKET_MIN_SIZE) {
            (padding + align) as u8
        } else {
            padding as u8
        }
    }
}

impl hush_wire::OpeningCipher for Transport {
    type Mac = Hmac;
    type Err = Error;

    fn mac(&self) -> &Self::Mac {
        &self.hmac
    }

    fn block_size(&self) -> usize {
        self.cipher.block_size()
    }

    fn decrypt(&mut self, buf: &mut [u8]) -> Result<()> {
        if self.cipher != Cipher::None {
            self.cipher.decrypt(
                &mut self.state,
                self.chain.key.expose_secret(),
                self.chain.iv.expose_secret(),
                buf,
            )?;
        }

        Ok(())
    }

    fn open(&mut self, buf: &[u8], tag: Vec<u8>, seq: u32) -> Result<()> {
        if self.hmac.size() > 0 {
            self.hmac
                .verify(seq, buf, self.chain.hmac.expose_secret(), &tag)?;
        }

        Ok(())
    }

    fn decompress(&mut self, buf: Vec<u8>) -> Result<Vec<u8>> {
        self.compress.decompress(buf)
    }
}

impl hush_wire::SealingCipher for Transport {
    type Mac = Hmac;
    type Err = Error;

    fn mac(&self) -> &Self::Mac {
        &self.hmac
    }

    fn block_size(&self) -> usize {
        self.cipher.block_size()
    }

    fn compress(&mut self, buf: &[u8]) -> Result<Vec<u8>> {
        self.compress.compress(buf)
    }

    fn pad(&mut self, mut buf: Vec<u8>) -> Result<Vec<u8>> {
        let mut rng = rand::thread_rng();

        let padding = self.padding(buf.len());

        // prefix with the padding size
        let mut padded = vec![padding];
        padded.append(&mut buf);

        // fill with random bytes
        padded.resize_with(padded.len() + padding as usize, || rng.gen());

        Ok(padded)
    }

    fn encrypt(&mut self, buf: &mut [u8]) -> Result<()> {
        if self.cipher != Cipher::None {
            self.cipher.encrypt(
                &mut self.state,
                self.chain.key.expose_secret(),
                self.chain.iv.expose_secret(),
                buf,
            )?;
        }

        Ok(())
    }

    fn seal(&mut self, buf: &[u8], seq: u32) -> Result<Vec<u8>> {
        Ok(self.hmac.sign(seq, buf, self.chain.hmac.expose_secret()))
    }
}
