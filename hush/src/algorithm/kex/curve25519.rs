use digest::{Digest, FixedOutputReset};
use hush_wire::{
    arch::MpInt,
    kex::{KexEcdhInit, KexEcdhReply},
    sig, Encode,
};

use crate::{
    key::PrivateKey,
    side::client::Verifier,
    stream::{Keys, Stream},
    Error, Pipe, Result,
};

use super::Exchange;

pub(super) async fn as_client<H: Digest + FixedOutputReset>(
    stream: &mut Stream<impl Pipe>,
    exchange: &Exchange<'_>,
    verifier: &Verifier,
) -> Result<(Keys, Keys)> {
    let e_c = x25519_dalek::EphemeralSecret::random_from_rng(rand::thread_rng());
    let q_c = x25519_dalek::PublicKey::from(&e_c);

    stream
        .send(&KexEcdhInit {
            q_c: q_c.as_bytes().as_slice().into(),
        })
        .await?;

    let ecdh: KexEcdhReply = stream.recv().await?.to()?;
    let q_s = x25519_dalek::PublicKey::from(
        <[u8; 32]>::try_from(ecdh.q_s.as_ref()).map_err(|_| Error::KexError)?,
    );

    let secret = e_c.diffie_hellman(&q_s);
    if !secret.was_contributory() {
        return Err(Error::KexError);
    }
    let secret = MpInt::positive(secret.as_bytes());

    let hash = sig::Ecdh {
        transcript: exchange.transcript(&ecdh.k_s),
        q_c: q_c.as_bytes(),
        q_s: q_s.as_bytes(),
        k: &secret,
    }
    .hash::<H>();

    super::verify_host(
        &ecdh.k_s,
        exchange.key,
        &hash,
        &ecdh.signature,
        verifier,
    )?;

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

pub(super) async fn as_server<H: Digest + FixedOutputReset>(
    stream: &mut Stream<impl Pipe>,
    exchange: &Exchange<'_>,
    key: &PrivateKey,
) -> Result<(Keys, Keys)> {
    let ecdh: KexEcdhInit = stream.recv().await?.to()?;

    let e_s = x25519_dalek::EphemeralSecret::random_from_rng(rand::thread_rng());
    let q_s = x25519_dalek::PublicKey::from(&e_s);

    let q_c = x25519_dalek::PublicKey::from(
        <[u8; 32]>::try_from(ecdh.q_c.as_ref()).map_err(|_| Error::KexError)?,
    );

    let secret = e_s.diffie_hellman(&q_c);
    if !secret.was_contributory() {
        return Err(Error::KexError);
    }
    let secret = MpInt::positive(secret.as_bytes());

    let k_s = key.public_key().to_blob();

    let hash = sig::Ecdh {
        transcript: exchange.transcript(&k_s),
        q_c: q_c.as_bytes(),
        q_s: q_s.as_bytes(),
        k: &secret,
    }
    .hash::<H>();

    let signature = key.sign(&hash);

    stream
        .send(&KexEcdhReply {
            k_s: k_s.into(),
            q_s: q_s.as_bytes().as_slice().into(),
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
