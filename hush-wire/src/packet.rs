use futures::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::{Decode, Encode, Error, Reader, Result, Writer, PACKET_MAX_SIZE};

/// A _message authentication_ algorithm, as seen from the packet layer.
pub trait Mac {
    /// The size of the produced authentication tag, `0` when disabled.
    fn size(&self) -> usize;
}

/// A decryption context for incoming packets,
/// as negotiated by the key-exchange.
pub trait OpeningCipher {
    /// The associated MAC algorithm.
    type Mac: Mac;

    /// The error type produced by the cipher.
    type Err: From<Error>;

    /// The negotiated MAC algorithm.
    fn mac(&self) -> &Self::Mac;

    /// The cipher's block size, at least `8` for the packet arithmetic.
    fn block_size(&self) -> usize;

    /// Decrypt the provided buffer in place.
    fn decrypt(&mut self, buf: &mut [u8]) -> Result<(), Self::Err>;

    /// Verify the authentication `tag` over `seq || buf`, in constant time.
    fn open(&mut self, buf: &[u8], tag: Vec<u8>, seq: u32) -> Result<(), Self::Err>;

    /// Decompress the payload after decryption.
    fn decompress(&mut self, buf: Vec<u8>) -> Result<Vec<u8>, Self::Err>;
}

/// An encryption context for outgoing packets,
/// as negotiated by the key-exchange.
pub trait SealingCipher {
    /// The associated MAC algorithm.
    type Mac: Mac;

    /// The error type produced by the cipher.
    type Err: From<Error>;

    /// The negotiated MAC algorithm.
    fn mac(&self) -> &Self::Mac;

    /// The cipher's block size, at least `8` for the packet arithmetic.
    fn block_size(&self) -> usize;

    /// Compress the payload before encryption.
    fn compress(&mut self, buf: &[u8]) -> Result<Vec<u8>, Self::Err>;

    /// Prefix the buffer with the padding length and append random
    /// padding, so `4 + buf.len()` aligns to the block size.
    fn pad(&mut self, buf: Vec<u8>) -> Result<Vec<u8>, Self::Err>;

    /// Encrypt the provided buffer in place.
    fn encrypt(&mut self, buf: &mut [u8]) -> Result<(), Self::Err>;

    /// Produce the authentication tag over `seq || buf`.
    fn seal(&mut self, buf: &[u8], seq: u32) -> Result<Vec<u8>, Self::Err>;
}

/// A payload-bearing SSH binary packet,
/// the unit the transport encrypts, authenticates and sequences.
///
/// see <https://datatracker.ietf.org/doc/html/rfc4253#section-6>.
#[derive(Debug, Clone)]
pub struct Packet {
    /// The decrypted, decompressed message payload.
    pub payload: Vec<u8>,
}

impl Packet {
    /// The message number, the first byte of the payload.
    pub fn message_number(&self) -> Option<u8> {
        self.payload.first().copied()
    }

    /// Try to deserialize the [`Packet`] into `T`, erroring out on trailing bytes.
    pub fn to<T: Decode>(&self) -> Result<T> {
        let mut reader = Reader::new(&self.payload);
        let message = T::decode(&mut reader)?;

        match reader.remaining() {
            0 => Ok(message),
            trailing => Err(Error::Trailing(trailing)),
        }
    }

    /// Read a [`Packet`] from the provided asynchronous `reader`,
    /// decrypting and authenticating it with the `cipher`.
    pub async fn from_async_reader<R, C>(
        reader: &mut R,
        cipher: &mut C,
        seq: u32,
    ) -> Result<Self, C::Err>
    where
        R: AsyncRead + Unpin,
        C: OpeningCipher,
    {
        let blocksize = cipher.block_size();

        let mut buf = vec![0; blocksize];
        reader.read_exact(&mut buf[..]).await.map_err(Error::from)?;
        cipher.decrypt(&mut buf[..])?;

        let len = u32::from_be_bytes(buf[..4].try_into().expect("block is at least 8 bytes"));

        if len as usize > PACKET_MAX_SIZE || (len as usize) < 5 {
            return Err(Error::BadPacketLength(len as usize).into());
        }

        buf.resize(std::mem::size_of_val(&len) + len as usize, 0);
        reader
            .read_exact(&mut buf[blocksize..])
            .await
            .map_err(Error::from)?;
        cipher.decrypt(&mut buf[blocksize..])?;

        let mut tag = vec![0; cipher.mac().size()];
        reader.read_exact(&mut tag[..]).await.map_err(Error::from)?;
        cipher.open(&buf, tag, seq)?;

        let padlen = buf[4] as usize;
        if padlen + 1 > len as usize {
            return Err(Error::BadPadding(padlen).into());
        }

        let payload = buf[5..4 + len as usize - padlen].to_vec();
        let payload = cipher.decompress(payload)?;

        Ok(Self { payload })
    }

    /// Write the [`Packet`] to the provided asynchronous `writer`,
    /// encrypting and authenticating it with the `cipher`.
    pub async fn to_async_writer<W, C>(
        &self,
        writer: &mut W,
        cipher: &mut C,
        seq: u32,
    ) -> Result<(), C::Err>
    where
        W: AsyncWrite + Unpin,
        C: SealingCipher,
    {
        if self.payload.len() > PACKET_MAX_SIZE {
            return Err(Error::BadPacketLength(self.payload.len()).into());
        }

        let compressed = cipher.compress(&self.payload)?;
        let padded = cipher.pad(compressed)?;

        let mut buf = Vec::with_capacity(4 + padded.len());
        buf.extend_from_slice(&(padded.len() as u32).to_be_bytes());
        buf.extend_from_slice(&padded);

        let tag = cipher.seal(&buf, seq)?;
        cipher.encrypt(&mut buf[..])?;

        writer.write_all(&buf).await.map_err(Error::from)?;
        writer.write_all(&tag).await.map_err(Error::from)?;

        Ok(())
    }
}

/// Allow types implementing [`Encode`] to be easily converted to a [`Packet`].
pub trait IntoPacket {
    /// Convert the current type to a [`Packet`].
    fn into_packet(self) -> Packet;
}

impl IntoPacket for Packet {
    fn into_packet(self) -> Packet {
        self
    }
}

impl<T: Encode> IntoPacket for &T {
    fn into_packet(self) -> Packet {
        let mut writer = Writer::new();
        self.encode(&mut writer);

        Packet {
            payload: writer.into_vec(),
        }
    }
}
