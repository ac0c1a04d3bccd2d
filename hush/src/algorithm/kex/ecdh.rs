use digest::{Digest, FixedOutputReset};
use elliptic_curve::{
    ecdh::EphemeralSecret,
    sec1::{FromEncodedPoint, ModulusSize, ToEncodedPoint},
    AffinePoint, CurveArithmetic, FieldBytesSize, PublicKey,
};
use hush_wire::{
    arch::MpInt,
    kex::{KexEcdhInit, KexEcdhReply},
    sig, Encode,
};

use crate::{
    key,
    side::client::Verifier,
    stream::{Keys, Stream},
    Error, Pipe, Result,
};

use super::Exchange;

/// The uncompressed SEC1 octet string of an ephemeral public key,
/// the `Q_C`/`Q_S` wire form the RFC mandates.
fn octets<C>(public: &PublicKey<C>) -> Vec<u8>
where
    C: CurveArithmetic,
    FieldBytesSize<C>: ModulusSize,
    AffinePoint<C>: FromEncodedPoint<C> + ToEncodedPoint<C>,
{
    public.to_encoded_point(false).as_bytes().to_vec()
}

pub(super) async fn as_client<C, H>(
    stream: &mut Stream<impl Pipe>,
    exchange: &Exchange<'_>,
    verifier: &Verifier,
) -> Result<(Keys, Keys)>
where
    C: CurveArithmetic,
    FieldBytesSize<C>: ModulusSize,
    AffinePoint<C>: FromEncodedPoint<C> + ToEncodedPoint<C>,
    H: Digest + FixedOutputReset,
{
    let e_c = EphemeralSecret::<C>::random(&mut rand::thread_rng());
    let q_c = octets(&e_c.public_key());

    stream
        .send(&KexEcdhInit {
            q_c: q_c.as_slice().into(),
        })
        .await?;

    let ecdh: KexEcdhReply = stream.recv().await?.to()?;
    let public = PublicKey::<C>::from_sec1_bytes(&ecdh.q_s).map_err(|_| Error::KexError)?;

    let secret = e_c.diffie_hellman(&public);
    let secret = MpInt::positive(secret.raw_secret_bytes());

    let hash = sig::Ecdh {
        transcript: exchange.transcript(&ecdh.k_s),
        q_c: &q_c,
        q_s: &ecdh.q_s,
        k: &secret,
    }
    .hash::<H>();

    super::verify_host(&ecdh.k_s, exchange.key, &hash, &ecdh.signature, verifier)?;

    let session_id = stream.with_session(&hash).to_vec();

    Ok((
        Keys::as_client::<H>(
            &secret,
            &hash,
            &session_id,
            &exchange.client_cipher,
            &exchange.client_hmac,
        ),
        Keys::as_server::<H>(
            &secret,
            &hash,
            &session_id,
            &exchange.server_cipher,
            &exchange.server_hmac,
        ),
    ))
}

pub(super) async fn as_server<C, H>(
    stream: &mut Stream<impl Pipe>,
    exchange: &Exchange<'_>,
    key: &key::PrivateKey,
) -> Result<(Keys, Keys)>
where
    C: CurveArithmetic,
    FieldBytesSize<C>: ModulusSize,
    AffinePoint<C>: FromEncodedPoint<C> + ToEncodedPoint<C>,
    H: Digest + FixedOutputReset,
{
    let ecdh: KexEcdhInit = stream.recv().await?.to()?;
    let public = PublicKey::<C>::from_sec1_bytes(&ecdh.q_c).map_err(|_| Error::KexError)?;

    let e_s = EphemeralSecret::<C>::random(&mut rand::thread_rng());
    let q_s = octets(&e_s.public_key());

    let secret = e_s.diffie_hellman(&public);
    let secret = MpInt::positive(secret.raw_secret_bytes());

    let k_s = key.public_key().to_blob();

    let hash = sig::Ecdh {
        transcript: exchange.transcript(&k_s),
        q_c: &ecdh.q_c,
        q_s: &q_s,
        k: &secret,
    }
    .hash::<H>();

    let signature = key.sign(&hash);

    stream
        .send(&KexEcdhReply {
            k_s: k_s.into(),
            q_s: q_s.into(),
            signature: signature.to_bytes().into(),
        })
        .await?;

    let session_id = stream.with_session(&hash).to_vec();

    Ok((
        Keys::as_client::<H>(
            &secret,
            &hash,
            &session_id,
            &exchange.client_cipher,
            &exchange.client_hmac,
        ),
        Keys::as_server::<H>(
            &secret,
            &hash,
            &session_id,
            &exchange.server_cipher,
            &exchange.server_hmac,
        ),
    ))
}
