//! Cryptographic wire forms: signature blobs, the `publickey`
//! authentication transcript and the key-exchange hash transcripts.

use digest::Digest;

use crate::{
    arch::{Ascii, Bytes, MpInt},
    Decode, Encode, Reader, Result, Writer,
};

/// An SSH signature blob, `string algorithm || string blob`,
/// as carried in key-exchange replies and `publickey` requests.
///
/// see <https://datatracker.ietf.org/doc/html/rfc4253#section-6.6>.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    /// The signature algorithm name.
    pub algorithm: Ascii,

    /// The algorithm-specific signature bytes.
    pub blob: Bytes,
}

impl Encode for Signature {
    fn encode(&self, w: &mut Writer) -> usize {
        let start = w.len();

        self.algorithm.encode(w);
        self.blob.encode(w);

        w.len() - start
    }
}

impl Decode for Signature {
    fn decode(r: &mut Reader<'_>) -> Result<Self> {
        Ok(Self {
            algorithm: Ascii::decode(r)?,
            blob: Bytes::decode(r)?,
        })
    }
}

/// The signed transcript of a `publickey` authentication request,
/// bound to the session identifier to prevent cross-session replay.
///
/// see <https://datatracker.ietf.org/doc/html/rfc4252#section-7>.
#[derive(Debug, Clone)]
pub struct Publickey<'b> {
    /// The session identifier, the first exchange hash.
    pub session_id: &'b [u8],

    /// The user name from the request.
    pub username: &'b str,

    /// The service name from the request.
    pub service_name: &'b str,

    /// The public key algorithm name.
    pub algorithm: &'b str,

    /// The public key blob.
    pub blob: &'b [u8],
}

impl Encode for Publickey<'_> {
    fn encode(&self, w: &mut Writer) -> usize {
        const MSG_USERAUTH_REQUEST: u8 = 50;

        let start = w.len();

        w.put_bytes(self.session_id);
        w.put_u8(MSG_USERAUTH_REQUEST);
        w.put_str(self.username);
        w.put_str(self.service_name);
        w.put_str("publickey");
        w.put_bool(true);
        w.put_str(self.algorithm);
        w.put_bytes(self.blob);

        w.len() - start
    }
}

/// The exchange-hash transcript shared by every key-exchange method:
/// both identification strings, both raw `SSH_MSG_KEXINIT` payloads
/// and the server host key blob.
#[derive(Debug, Clone)]
pub struct Transcript<'b> {
    /// The client's identification string, without the line terminator.
    pub v_c: &'b str,

    /// The server's identification string, without the line terminator.
    pub v_s: &'b str,

    /// The client's `SSH_MSG_KEXINIT` payload, verbatim.
    pub i_c: &'b [u8],

    /// The server's `SSH_MSG_KEXINIT` payload, verbatim.
    pub i_s: &'b [u8],

    /// The server's public host key blob.
    pub k_s: &'b [u8],
}

impl Transcript<'_> {
    fn encode_prefix(&self, w: &mut Writer) {
        w.put_str(self.v_c);
        w.put_str(self.v_s);
        w.put_bytes(self.i_c);
        w.put_bytes(self.i_s);
        w.put_bytes(self.k_s);
    }
}

/// The exchange-hash input of the ECDH and Curve25519 methods.
///
/// see <https://datatracker.ietf.org/doc/html/rfc5656#section-4>.
#[derive(Debug, Clone)]
pub struct Ecdh<'b> {
    /// The common transcript prefix.
    pub transcript: Transcript<'b>,

    /// The client's ephemeral public key octet string.
    pub q_c: &'b [u8],

    /// The server's ephemeral public key octet string.
    pub q_s: &'b [u8],

    /// The shared secret.
    pub k: &'b MpInt,
}

impl Ecdh<'_> {
    /// Compute the exchange hash `H` under the digest `D`.
    pub fn hash<D: Digest>(&self) -> Vec<u8> {
        let mut w = Writer::new();

        self.transcript.encode_prefix(&mut w);
        w.put_bytes(self.q_c);
        w.put_bytes(self.q_s);
        self.k.encode(&mut w);

        D::digest(w.into_vec()).to_vec()
    }
}

/// The exchange-hash input of the fixed-group Diffie-Hellman methods.
///
/// see <https://datatracker.ietf.org/doc/html/rfc4253#section-8>.
#[derive(Debug, Clone)]
pub struct Dh<'b> {
    /// The common transcript prefix.
    pub transcript: Transcript<'b>,

    /// The client's ephemeral public value.
    pub e: &'b MpInt,

    /// The server's ephemeral public value.
    pub f: &'b MpInt,

    /// The shared secret.
    pub k: &'b MpInt,
}

impl Dh<'_> {
    /// Compute the exchange hash `H` under the digest `D`.
    pub fn hash<D: Digest>(&self) -> Vec<u8> {
        let mut w = Writer::new();

        self.transcript.encode_prefix(&mut w);
        self.e.encode(&mut w);
        self.f.encode(&mut w);
        self.k.encode(&mut w);

        D::digest(w.into_vec()).to_vec()
    }
}

/// The exchange-hash input of the Diffie-Hellman group-exchange methods.
///
/// see <https://datatracker.ietf.org/doc/html/rfc4419#section-3>.
#[derive(Debug, Clone)]
pub struct Gex<'b> {
    /// The common transcript prefix.
    pub transcript: Transcript<'b>,

    /// Minimal acceptable group size, from the request.
    pub min: u32,

    /// Preferred group size, from the request.
    pub n: u32,

    /// Maximal acceptable group size, from the request.
    pub max: u32,

    /// The group's safe prime.
    pub p: &'b MpInt,

    /// The group's generator.
    pub g: &'b MpInt,

    /// The client's ephemeral public value.
    pub e: &'b MpInt,

    /// The server's ephemeral public value.
    pub f: &'b MpInt,

    /// The shared secret.
    pub k: &'b MpInt,
}

impl Gex<'_> {
    /// Compute the exchange hash `H` under the digest `D`.
    pub fn hash<D: Digest>(&self) -> Vec<u8> {
        let mut w = Writer::new();

        self.transcript.encode_prefix(&mut w);
        w.put_u32(self.min);
        w.put_u32(self.n);
        w.put_u32(self.max);
        self.p.encode(&mut w);
        self.g.encode(&mut w);
        self.e.encode(&mut w);
        self.f.encode(&mut w);
        self.k.encode(&mut w);

        D::digest(w.into_vec()).to_vec()
    }
}
