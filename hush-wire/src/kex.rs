//! Messages involved in the SSH's **key-exchange** methods,
//! as defined in the [RFC 4253](https://datatracker.ietf.org/doc/html/rfc4253),
//! the [RFC 4419](https://datatracker.ietf.org/doc/html/rfc4419)
//! and the [RFC 5656](https://datatracker.ietf.org/doc/html/rfc5656).
//!
//! Message numbers `30` through `49` are method-specific, so types here
//! share numbers and are disambiguated by the negotiated method.

use crate::{
    arch::{Bytes, MpInt},
    codec::magic,
    Decode, Encode, Reader, Result, Writer,
};

/// The `SSH_MSG_KEXDH_INIT` message, for fixed-group Diffie-Hellman.
///
/// see <https://datatracker.ietf.org/doc/html/rfc4253#section-8>.
#[derive(Debug, Clone)]
pub struct KexdhInit {
    /// The client's ephemeral public value, `e = g^x mod p`.
    pub e: MpInt,
}

impl KexdhInit {
    const MAGIC: u8 = 30;
}

impl Encode for KexdhInit {
    fn encode(&self, w: &mut Writer) -> usize {
        let start = w.len();

        w.put_u8(Self::MAGIC);
        self.e.encode(w);

        w.len() - start
    }
}

impl Decode for KexdhInit {
    fn decode(r: &mut Reader<'_>) -> Result<Self> {
        magic(r, Self::MAGIC)?;

        Ok(Self {
            e: MpInt::decode(r)?,
        })
    }
}

/// The `SSH_MSG_KEXDH_REPLY` message, for fixed-group Diffie-Hellman.
///
/// see <https://datatracker.ietf.org/doc/html/rfc4253#section-8>.
#[derive(Debug, Clone)]
pub struct KexdhReply {
    /// The server's public host key blob.
    pub k_s: Bytes,

    /// The server's ephemeral public value, `f = g^y mod p`.
    pub f: MpInt,

    /// Signature over the exchange hash with the host key.
    pub signature: Bytes,
}

impl KexdhReply {
    const MAGIC: u8 = 31;
}

impl Encode for KexdhReply {
    fn encode(&self, w: &mut Writer) -> usize {
        let start = w.len();

        w.put_u8(Self::MAGIC);
        self.k_s.encode(w);
        self.f.encode(w);
        self.signature.encode(w);

        w.len() - start
    }
}

impl Decode for KexdhReply {
    fn decode(r: &mut Reader<'_>) -> Result<Self> {
        magic(r, Self::MAGIC)?;

        Ok(Self {
            k_s: Bytes::decode(r)?,
            f: MpInt::decode(r)?,
            signature: Bytes::decode(r)?,
        })
    }
}

/// The `SSH_MSG_KEX_DH_GEX_REQUEST` message.
///
/// see <https://datatracker.ietf.org/doc/html/rfc4419#section-3>.
#[derive(Debug, Clone)]
pub struct KexDhGexRequest {
    /// Minimal acceptable group size, in bits.
    pub min: u32,

    /// Preferred group size, in bits.
    pub n: u32,

    /// Maximal acceptable group size, in bits.
    pub max: u32,
}

impl KexDhGexRequest {
    const MAGIC: u8 = 34;
}

impl Encode for KexDhGexRequest {
    fn encode(&self, w: &mut Writer) -> usize {
        let start = w.len();

        w.put_u8(Self::MAGIC);
        w.put_u32(self.min);
        w.put_u32(self.n);
        w.put_u32(self.max);

        w.len() - start
    }
}

impl Decode for KexDhGexRequest {
    fn decode(r: &mut Reader<'_>) -> Result<Self> {
        magic(r, Self::MAGIC)?;

        Ok(Self {
            min: r.take_u32()?,
            n: r.take_u32()?,
            max: r.take_u32()?,
        })
    }
}

/// The `SSH_MSG_KEX_DH_GEX_GROUP` message.
///
/// see <https://datatracker.ietf.org/doc/html/rfc4419#section-3>.
#[derive(Debug, Clone)]
pub struct KexDhGexGroup {
    /// The group's safe prime.
    pub p: MpInt,

    /// The group's generator.
    pub g: MpInt,
}

impl KexDhGexGroup {
    const MAGIC: u8 = 31;
}

impl Encode for KexDhGexGroup {
    fn encode(&self, w: &mut Writer) -> usize {
        let start = w.len();

        w.put_u8(Self::MAGIC);
        self.p.encode(w);
        self.g.encode(w);

        w.len() - start
    }
}

impl Decode for KexDhGexGroup {
    fn decode(r: &mut Reader<'_>) -> Result<Self> {
        magic(r, Self::MAGIC)?;

        Ok(Self {
            p: MpInt::decode(r)?,
            g: MpInt::decode(r)?,
        })
    }
}

/// The `SSH_MSG_KEX_DH_GEX_INIT` message.
///
/// see <https://datatracker.ietf.org/doc/html/rfc4419#section-3>.
#[derive(Debug, Clone)]
pub struct KexDhGexInit {
    /// The client's ephemeral public value, `e = g^x mod p`.
    pub e: MpInt,
}

impl KexDhGexInit {
    const MAGIC: u8 = 32;
}

impl Encode for KexDhGexInit {
    fn encode(&self, w: &mut Writer) -> usize {
        let start = w.len();

        w.put_u8(Self::MAGIC);
        self.e.encode(w);

        w.len() - start
    }
}

impl Decode for KexDhGexInit {
    fn decode(r: &mut Reader<'_>) -> Result<Self> {
        magic(r, Self::MAGIC)?;

        Ok(Self {
            e: MpInt::decode(r)?,
        })
    }
}

/// The `SSH_MSG_KEX_DH_GEX_REPLY` message.
///
/// see <https://datatracker.ietf.org/doc/html/rfc4419#section-3>.
#[derive(Debug, Clone)]
pub struct KexDhGexReply {
    /// The server's public host key blob.
    pub k_s: Bytes,

    /// The server's ephemeral public value, `f = g^y mod p`.
    pub f: MpInt,

    /// Signature over the exchange hash with the host key.
    pub signature: Bytes,
}

impl KexDhGexReply {
    const MAGIC: u8 = 33;
}

impl Encode for KexDhGexReply {
    fn encode(&self, w: &mut Writer) -> usize {
        let start = w.len();

        w.put_u8(Self::MAGIC);
        self.k_s.encode(w);
        self.f.encode(w);
        self.signature.encode(w);

        w.len() - start
    }
}

impl Decode for KexDhGexReply {
    fn decode(r: &mut Reader<'_>) -> Result<Self> {
        magic(r, Self::MAGIC)?;

        Ok(Self {
            k_s: Bytes::decode(r)?,
            f: MpInt::decode(r)?,
            signature: Bytes::decode(r)?,
        })
    }
}

/// The `SSH_MSG_KEX_ECDH_INIT` message.
///
/// see <https://datatracker.ietf.org/doc/html/rfc5656#section-4>.
#[derive(Debug, Clone)]
pub struct KexEcdhInit {
    /// The client's ephemeral public key octet string.
    pub q_c: Bytes,
}

impl KexEcdhInit {
    const MAGIC: u8 = 30;
}

impl Encode for KexEcdhInit {
    fn encode(&self, w: &mut Writer) -> usize {
        let start = w.len();

        w.put_u8(Self::MAGIC);
        self.q_c.encode(w);

        w.len() - start
    }
}

impl Decode for KexEcdhInit {
    fn decode(r: &mut Reader<'_>) -> Result<Self> {
        magic(r, Self::MAGIC)?;

        Ok(Self {
            q_c: Bytes::decode(r)?,
        })
    }
}

/// The `SSH_MSG_KEX_ECDH_REPLY` message.
///
/// see <https://datatracker.ietf.org/doc/html/rfc5656#section-4>.
#[derive(Debug, Clone)]
pub struct KexEcdhReply {
    /// The server's public host key blob.
    pub k_s: Bytes,

    /// The server's ephemeral public key octet string.
    pub q_s: Bytes,

    /// Signature over the exchange hash with the host key.
    pub signature: Bytes,
}

impl KexEcdhReply {
    const MAGIC: u8 = 31;
}

impl Encode for KexEcdhReply {
    fn encode(&self, w: &mut Writer) -> usize {
        let start = w.len();

        w.put_u8(Self::MAGIC);
        self.k_s.encode(w);
        self.q_s.encode(w);
        self.signature.encode(w);

        w.len() - start
    }
}

impl Decode for KexEcdhReply {
    fn decode(r: &mut Reader<'_>) -> Result<Self> {
        magic(r, Self::MAGIC)?;

        Ok(Self {
            k_s: Bytes::decode(r)?,
            q_s: Bytes::decode(r)?,
            signature: Bytes::decode(r)?,
        })
    }
}
