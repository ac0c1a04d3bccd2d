use cipher::{KeyIvInit, StreamCipher};
use hush_wire::{arch::MpInt, Decode, Encode, Reader, Writer};
use num_bigint_dig::{BigUint, ModInverse};
use rand::Rng;
use rsa::traits::{PrivateKeyParts, PublicKeyParts};

use super::{Error, PrivateKey, Result};

const AUTH_MAGIC: &[u8] = b"openssh-key-v1\0";

const KDF_NONE: &str = "none";
const KDF_BCRYPT: &str = "bcrypt";

const CIPHER_NONE: &str = "none";
const CIPHER_AES256_CTR: &str = "aes256-ctr";
const CIPHER_AES256_CBC: &str = "aes256-cbc";

/// AES-256 key plus IV, the amount bcrypt-pbkdf has to produce.
const DERIVED_SIZE: usize = 32 + 16;

/// Decode an `openssh-key-v1` container into a key and its comment.
pub(super) fn decode(contents: &[u8], passphrase: Option<&str>) -> Result<(PrivateKey, String)> {
    let contents = contents
        .strip_prefix(AUTH_MAGIC)
        .ok_or(Error::Pem("missing openssh-key-v1 magic"))?;

    let mut r = Reader::new(contents);

    let ciphername = r.take_str()?.to_owned();
    let kdfname = r.take_str()?.to_owned();
    let kdfoptions = r.take_bytes()?.to_vec();

    if r.take_u32()? != 1 {
        return Err(Error::BadKeyData("expected exactly one key in the container"));
    }

    let _public = r.take_bytes()?;
    let mut private = r.take_bytes()?.to_vec();

    match (kdfname.as_str(), ciphername.as_str()) {
        (KDF_NONE, CIPHER_NONE) => (),
        (KDF_BCRYPT, cipher @ (CIPHER_AES256_CTR | CIPHER_AES256_CBC)) => {
            let passphrase = passphrase.ok_or(Error::PassphraseRequired)?;

            let mut opts = Reader::new(&kdfoptions);
            let salt = opts.take_bytes()?;
            let rounds = opts.take_u32()?;

            let mut derived = [0u8; DERIVED_SIZE];
            bcrypt_pbkdf::bcrypt_pbkdf(passphrase, salt, rounds, &mut derived)
                .map_err(|_| Error::Kdf)?;
            let (key, iv) = derived.split_at(32);

            match cipher {
                CIPHER_AES256_CTR => {
                    ctr::Ctr128BE::<aes::Aes256>::new_from_slices(key, iv)
                        .map_err(|_| Error::Kdf)?
                        .apply_keystream(&mut private);
                }
                _ => {
                    use cipher::{Block, BlockDecryptMut};

                    if private.len() % 16 != 0 {
                        return Err(Error::BadKeyData("encrypted section is not block-aligned"));
                    }

                    let mut decryptor = cbc::Decryptor::<aes::Aes256>::new_from_slices(key, iv)
                        .map_err(|_| Error::Kdf)?;
                    for block in private.chunks_exact_mut(16) {
                        decryptor.decrypt_block_mut(Block::<cbc::Decryptor<aes::Aes256>>::from_mut_slice(block));
                    }
                }
            }
        }
        _ => return Err(Error::UnsupportedCipher(format!("{kdfname}+{ciphername}"))),
    }

    let mut r = Reader::new(&private);

    if r.take_u32()? != r.take_u32()? {
        return Err(Error::BadPassphrase);
    }

    let key = match r.take_str()? {
        "ssh-rsa" => {
            let n = MpInt::decode(&mut r)?;
            let e = MpInt::decode(&mut r)?;
            let d = MpInt::decode(&mut r)?;
            let _iqmp = MpInt::decode(&mut r)?;
            let p = MpInt::decode(&mut r)?;
            let q = MpInt::decode(&mut r)?;

            PrivateKey::Rsa(rsa::RsaPrivateKey::from_components(
                n.into(),
                e.into(),
                d.into(),
                vec![p.into(), q.into()],
            )?)
        }
        "ssh-ed25519" => {
            let public = r.take_bytes()?.to_vec();
            let keypair = r.take_bytes()?;

            let seed: [u8; 32] = keypair
                .get(..32)
                .and_then(|seed| seed.try_into().ok())
                .ok_or(Error::BadKeyData("ed25519 keypair size"))?;

            let key = ed25519_dalek::SigningKey::from_bytes(&seed);
            if keypair.get(32..) != Some(key.verifying_key().as_bytes().as_slice())
                || public != key.verifying_key().as_bytes()
            {
                return Err(Error::BadKeyData("ed25519 halves do not match"));
            }

            PrivateKey::Ed25519(key)
        }
        name @ ("ecdsa-sha2-nistp256" | "ecdsa-sha2-nistp384" | "ecdsa-sha2-nistp521") => {
            let curve = r.take_str()?.to_owned();
            if !name.ends_with(curve.as_str()) {
                return Err(Error::BadKeyData("curve name mismatch"));
            }

            let _point = r.take_bytes()?;
            let scalar = MpInt::decode(&mut r)?.to_be_bytes();

            match curve.as_str() {
                "nistp256" => PrivateKey::EcdsaP256(ecdsa_scalar(&scalar, 32)?),
                "nistp384" => PrivateKey::EcdsaP384(ecdsa_scalar(&scalar, 48)?),
                "nistp521" => {
                    let mut raw = vec![0; 66];
                    super::left_pad(&scalar, &mut raw)?;

                    PrivateKey::EcdsaP521(p521::ecdsa::SigningKey::from_slice(&raw)?)
                }
                other => return Err(Error::UnsupportedCurve(other.to_owned())),
            }
        }
        other => return Err(Error::UnsupportedType(other.to_owned())),
    };

    let comment = r.take_str()?.to_owned();

    // Deterministic padding, 1, 2, 3, ... up to the cipher block size.
    for (nth, byte) in r.take_rest().iter().enumerate() {
        if *byte != (nth + 1) as u8 {
            return Err(Error::BadKeyData("broken private-section padding"));
        }
    }

    Ok((key, comment))
}

fn ecdsa_scalar<S>(scalar: &[u8], width: usize) -> Result<S>
where
    S: for<'s> TryFrom<&'s [u8], Error = signature::Error>,
{
    let mut raw = vec![0; width];
    super::left_pad(scalar, &mut raw)?;

    Ok(S::try_from(&raw[..])?)
}

/// Encode a key into an unencrypted `openssh-key-v1` container.
pub(super) fn encode(key: &PrivateKey, comment: &str) -> Vec<u8> {
    let mut w = Writer::new();

    w.put_raw(AUTH_MAGIC);
    w.put_str(CIPHER_NONE);
    w.put_str(KDF_NONE);
    w.put_str("");
    w.put_u32(1);
    w.put_bytes(&key.public_key().to_blob());

    let mut private = Writer::new();

    let check: u32 = rand::thread_rng().gen();
    private.put_u32(check);
    private.put_u32(check);

    private.put_str(key.algorithm().as_ref());
    match key {
        PrivateKey::Rsa(key) => {
            MpInt::from(key.n()).encode(&mut private);
            MpInt::from(key.e()).encode(&mut private);
            MpInt::from(key.d()).encode(&mut private);

            let (p, q) = (&key.primes()[0], &key.primes()[1]);
            let iqmp = q
                .clone()
                .mod_inverse(p)
                .and_then(|iqmp| iqmp.to_biguint())
                .unwrap_or_else(BigUint::default);

            MpInt::from(iqmp).encode(&mut private);
            MpInt::from(p).encode(&mut private);
            MpInt::from(q).encode(&mut private);
        }
        PrivateKey::Ed25519(key) => {
            let public = key.verifying_key();

            private.put_bytes(public.as_bytes());

            let mut keypair = key.to_bytes().to_vec();
            keypair.extend_from_slice(public.as_bytes());
            private.put_bytes(&keypair);
        }
        PrivateKey::EcdsaP256(key) => {
            private.put_str("nistp256");
            private.put_bytes(key.verifying_key().to_encoded_point(false).as_bytes());
            MpInt::positive(&key.to_bytes()).encode(&mut private);
        }
        PrivateKey::EcdsaP384(key) => {
            private.put_str("nistp384");
            private.put_bytes(key.verifying_key().to_encoded_point(false).as_bytes());
            MpInt::positive(&key.to_bytes()).encode(&mut private);
        }
        PrivateKey::EcdsaP521(key) => {
            private.put_str("nistp521");
            private.put_bytes(
                p521::ecdsa::VerifyingKey::from(key)
                    .to_encoded_point(false)
                    .as_bytes(),
            );
            MpInt::positive(&key.to_bytes()).encode(&mut private);
        }
    }
    private.put_str(comment);

    let mut private = private.into_vec();
    let mut nth = 0u8;
    while private.len() % 8 != 0 {
        nth += 1;
        private.push(nth);
    }

    w.put_bytes(&private);

    w.into_vec()
}
