use digest::{Digest, FixedOutputReset};
use hush_wire::{
    arch::MpInt,
    kex::{KexDhGexGroup, KexDhGexInit, KexDhGexReply, KexDhGexRequest, KexdhInit, KexdhReply},
    sig, Encode,
};
use num_bigint_dig::{BigUint, RandBigInt};

use crate::{
    key::PrivateKey,
    side::client::Verifier,
    stream::{Keys, Stream},
    Error, Pipe, Result,
};

use super::Exchange;

/// The 1024-bit MODP group ("Oakley Group 2"),
/// see <https://datatracker.ietf.org/doc/html/rfc2409#section-6.2>.
const GROUP1_P: &str = "FFFFFFFFFFFFFFFFC90FDAA22168C234C4C6628B80DC1CD129024E088A67CC74\
                        020BBEA63B139B22514A08798E3404DDEF9519B3CD3A431B302B0A6DF25F1437\
                        4FE1356D6D51C245E485B576625E7EC6F44C42E9A637ED6B0BFF5CB6F406B7ED\
                        EE386BFB5A899FA5AE9F24117C4B1FE649286651ECE65381FFFFFFFFFFFFFFFF";

/// The 2048-bit MODP group,
/// see <https://datatracker.ietf.org/doc/html/rfc3526#section-3>.
const GROUP14_P: &str = "FFFFFFFFFFFFFFFFC90FDAA22168C234C4C6628B80DC1CD129024E088A67CC74\
                         020BBEA63B139B22514A08798E3404DDEF9519B3CD3A431B302B0A6DF25F1437\
                         4FE1356D6D51C245E485B576625E7EC6F44C42E9A637ED6B0BFF5CB6F406B7ED\
                         EE386BFB5A899FA5AE9F24117C4B1FE649286651ECE45B3DC2007CB8A163BF05\
                         98DA48361C55D39A69163FA8FD24CF5F83655D23DCA3AD961C62F356208552BB\
                         9ED529077096966D670C354E4ABC9804F1746C08CA18217C32905E462E36CE3B\
                         E39E772C180E86039B2783A2EC07A28FB5C55DF06F4C52C9DE2BCBF695581718\
                         3995497CEA956AE515D2261898FA051015728E5A8AACAA68FFFFFFFFFFFFFFFF";

/// Group-exchange bounds sent by the client, in bits.
const GEX_MIN_BITS: u32 = 1024;
const GEX_WANT_BITS: u32 = 2048;
const GEX_MAX_BITS: u32 = 8192;

/// A fixed Diffie-Hellman MODP group with generator 2.
#[derive(Debug, Clone, Copy)]
pub(super) enum Group {
    Group1,
    Group14,
}

impl Group {
    fn modulus(&self) -> BigUint {
        let hex = match self {
            Self::Group1 => GROUP1_P,
            Self::Group14 => GROUP14_P,
        };

        BigUint::parse_bytes(hex.as_bytes(), 16).expect("the group constants are valid hex")
    }

    fn generator(&self) -> BigUint {
        BigUint::from(2u32)
    }
}

/// One Diffie-Hellman half: a random exponent and the matching public value.
fn keypair(p: &BigUint, g: &BigUint) -> (BigUint, BigUint) {
    // Exponent in [2, (p - 1) / 2), twice the bits of any sane subgroup.
    let x = rand::thread_rng().gen_biguint_range(&BigUint::from(2u32), &(p >> 1usize));
    let public = g.modpow(&x, p);

    (x, public)
}

/// Bound-check a peer's public value, `1 < e < p - 1`.
fn check_public(value: &BigUint, p: &BigUint) -> Result<()> {
    let one = BigUint::from(1u32);

    if value <= &one || *value >= p.clone() - one {
        return Err(Error::KexError);
    }

    Ok(())
}

pub(super) async fn group_as_client<H: Digest + FixedOutputReset>(
    stream: &mut Stream<impl Pipe>,
    exchange: &Exchange<'_>,
    group: Group,
    verifier: &Verifier,
) -> Result<(Keys, Keys)> {
    let (p, g) = (group.modulus(), group.generator());
    let (x, public) = keypair(&p, &g);

    let e = MpInt::from(public);
    stream.send(&KexdhInit { e: e.clone() }).await?;

    let reply: KexdhReply = stream.recv().await?.to()?;
    check_public(reply.f.as_uint(), &p)?;

    let secret = MpInt::from(reply.f.as_uint().modpow(&x, &p));

    let hash = sig::Dh {
        transcript: exchange.transcript(&reply.k_s),
        e: &e,
        f: &reply.f,
        k: &secret,
    }
    .hash::<H>();

    super::verify_host(&reply.k_s, exchange.key, &hash, &reply.signature, verifier)?;

    let session_id = stream.with_session(&hash).to_vec();

    Ok(derive::<H>(exchange, &secret, &hash, &session_id))
}

pub(super) async fn group_as_server<H: Digest + FixedOutputReset>(
    stream: &mut Stream<impl Pipe>,
    exchange: &Exchange<'_>,
    group: Group,
    key: &PrivateKey,
) -> Result<(Keys, Keys)> {
    let (p, g) = (group.modulus(), group.generator());

    let init: KexdhInit = stream.recv().await?.to()?;
    check_public(init.e.as_uint(), &p)?;

    let (y, public) = keypair(&p, &g);
    let f = MpInt::from(public);

    let secret = MpInt::from(init.e.as_uint().modpow(&y, &p));

    let k_s = key.public_key().to_blob();

    let hash = sig::Dh {
        transcript: exchange.transcript(&k_s),
        e: &init.e,
        f: &f,
        k: &secret,
    }
    .hash::<H>();

    let signature = key.sign(&hash);

    stream
        .send(&KexdhReply {
            k_s: k_s.into(),
            f,
            signature: signature.to_bytes().into(),
        })
        .await?;

    let session_id = stream.with_session(&hash).to_vec();

    Ok(derive::<H>(exchange, &secret, &hash, &session_id))
}

pub(super) async fn gex_as_client<H: Digest + FixedOutputReset>(
    stream: &mut Stream<impl Pipe>,
    exchange: &Exchange<'_>,
    verifier: &Verifier,
) -> Result<(Keys, Keys)> {
    stream
        .send(&KexDhGexRequest {
            min: GEX_MIN_BITS,
            n: GEX_WANT_BITS,
            max: GEX_MAX_BITS,
        })
        .await?;

    let group: KexDhGexGroup = stream.recv().await?.to()?;

    let (p, g) = (group.p.as_uint().clone(), group.g.as_uint().clone());
    if p.bits() < GEX_MIN_BITS as usize || p.bits() > GEX_MAX_BITS as usize {
        return Err(Error::KexError);
    }

    let (x, public) = keypair(&p, &g);
    let e = MpInt::from(public);

    stream.send(&KexDhGexInit { e: e.clone() }).await?;

    let reply: KexDhGexReply = stream.recv().await?.to()?;
    check_public(reply.f.as_uint(), &p)?;

    let secret = MpInt::from(reply.f.as_uint().modpow(&x, &p));

    let hash = sig::Gex {
        transcript: exchange.transcript(&reply.k_s),
        min: GEX_MIN_BITS,
        n: GEX_WANT_BITS,
        max: GEX_MAX_BITS,
        p: &group.p,
        g: &group.g,
        e: &e,
        f: &reply.f,
        k: &secret,
    }
    .hash::<H>();

    super::verify_host(&reply.k_s, exchange.key, &hash, &reply.signature, verifier)?;

    let session_id = stream.with_session(&hash).to_vec();

    Ok(derive::<H>(exchange, &secret, &hash, &session_id))
}

pub(super) async fn gex_as_server<H: Digest + FixedOutputReset>(
    stream: &mut Stream<impl Pipe>,
    exchange: &Exchange<'_>,
    key: &PrivateKey,
) -> Result<(Keys, Keys)> {
    let request: KexDhGexRequest = stream.recv().await?.to()?;

    // Serve the largest group we carry that fits the client's bounds.
    let group = if request.min <= 2048 && 2048 <= request.max {
        Group::Group14
    } else if request.min <= 1024 && 1024 <= request.max {
        Group::Group1
    } else {
        return Err(Error::KexError);
    };

    let (p, g) = (group.modulus(), group.generator());
    let (p_mpint, g_mpint) = (MpInt::from(&p), MpInt::from(&g));

    stream
        .send(&KexDhGexGroup {
            p: p_mpint.clone(),
            g: g_mpint.clone(),
        })
        .await?;

    let init: KexDhGexInit = stream.recv().await?.to()?;
    check_public(init.e.as_uint(), &p)?;

    let (y, public) = keypair(&p, &g);
    let f = MpInt::from(public);

    let secret = MpInt::from(init.e.as_uint().modpow(&y, &p));

    let k_s = key.public_key().to_blob();

    let hash = sig::Gex {
        transcript: exchange.transcript(&k_s),
        min: request.min,
        n: request.n,
        max: request.max,
        p: &p_mpint,
        g: &g_mpint,
        e: &init.e,
        f: &f,
        k: &secret,
    }
    .hash::<H>();

    let signature = key.sign(&hash);

    stream
        .send(&KexDhGexReply {
            k_s: k_s.into(),
            f,
            signature: signature.to_bytes().into(),
        })
        .await?;

    let session_id = stream.with_session(&hash).to_vec();

    Ok(derive::<H>(exchange, &secret, &hash, &session_id))
}

fn derive<H: Digest + FixedOutputReset>(
    exchange: &Exchange<'_>,
    secret: &MpInt,
    hash: &[u8],
    session_id: &[u8],
) -> (Keys, Keys) {
    (
        Keys::as_client::<H>(
            secret,
            hash,
            session_id,
            &exchange.client_cipher,
            &exchange.client_hmac,
        ),
        Keys::as_server::<H>(
            secret,
            hash,
            session_id,
            &exchange.server_cipher,
            &exchange.server_hmac,
        ),
    )
}
