//! Identity handling: private-key loading, signatures and public wire blobs.
//!
//! The loader is the sole point where key material enters the crate;
//! it accepts PEM-framed `RSA PRIVATE KEY` (PKCS#1) and
//! `OPENSSH PRIVATE KEY` (the `openssh-key-v1` container) documents.

use base64::{engine::general_purpose::STANDARD, Engine};
use hush_wire::{arch::MpInt, sig, Decode, Encode, Reader, Writer};
use rsa::traits::PublicKeyParts;
use sha1::Sha1;
use signature::{SignatureEncoding, Signer, Verifier};
use thiserror::Error;

use crate::algorithm::Key;

mod openssh;
mod pem;

/// The error types that can occur when handling identities.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed PEM framing.
    #[error("Malformed PEM document: {0}")]
    Pem(&'static str),

    /// The PEM label is not one the loader knows.
    #[error("Unsupported PEM type `{0}`")]
    UnsupportedType(String),

    /// The PEM body is not valid base64.
    #[error(transparent)]
    Base64(#[from] base64::DecodeError),

    /// PKCS#1 (de)serialization error.
    #[error(transparent)]
    Pkcs1(#[from] rsa::pkcs1::Error),

    /// RSA key construction error.
    #[error(transparent)]
    Rsa(#[from] rsa::Error),

    /// Wire-level error inside a key blob.
    #[error(transparent)]
    Wire(#[from] hush_wire::Error),

    /// Signature construction or verification error.
    #[error(transparent)]
    Signature(#[from] signature::Error),

    /// The container's cipher or KDF is not supported.
    #[error("Unsupported cipher or KDF `{0}`")]
    UnsupportedCipher(String),

    /// The named elliptic curve is not supported.
    #[error("Unsupported curve `{0}`")]
    UnsupportedCurve(String),

    /// The container is encrypted and no passphrase was provided.
    #[error("The key is encrypted and no passphrase was provided")]
    PassphraseRequired,

    /// The twin check integers differ after decryption.
    #[error("Check integers differ: wrong passphrase or corrupt key")]
    BadPassphrase,

    /// The key material does not add up.
    #[error("Inconsistent key material: {0}")]
    BadKeyData(&'static str),

    /// The bcrypt KDF failed to derive the decryption key.
    #[error("The bcrypt KDF failed")]
    Kdf,
}

/// A handy [`std::result::Result`] type alias bounding the [`enum@Error`] struct as `E`.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// A private identity, able to sign under its algorithm's name.
#[derive(Clone)]
pub enum PrivateKey {
    /// An RSA identity, signing as `ssh-rsa`.
    Rsa(rsa::RsaPrivateKey),

    /// An Ed25519 identity.
    Ed25519(ed25519_dalek::SigningKey),

    /// An ECDSA identity over NIST P-256.
    EcdsaP256(p256::ecdsa::SigningKey),

    /// An ECDSA identity over NIST P-384.
    EcdsaP384(p384::ecdsa::SigningKey),

    /// An ECDSA identity over NIST P-521.
    EcdsaP521(p521::ecdsa::SigningKey),
}

/// A stand-in for key types whose crate does not implement [`std::fmt::Debug`],
/// matching the opaque, non-leaking rendering their siblings use.
struct OpaqueKey(&'static str);

impl std::fmt::Debug for OpaqueKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct(self.0).finish_non_exhaustive()
    }
}

impl std::fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rsa(key) => f.debug_tuple("Rsa").field(key).finish(),
            Self::Ed25519(key) => f.debug_tuple("Ed25519").field(key).finish(),
            Self::EcdsaP256(key) => f.debug_tuple("EcdsaP256").field(key).finish(),
            Self::EcdsaP384(key) => f.debug_tuple("EcdsaP384").field(key).finish(),
            Self::EcdsaP521(_) => f
                .debug_tuple("EcdsaP521")
                .field(&OpaqueKey("SigningKey"))
                .finish(),
        }
    }
}

impl PrivateKey {
    /// Load a private key from a PEM document.
    ///
    /// The `passphrase` is consulted only when the document is an
    /// encrypted `openssh-key-v1` container; an encrypted container
    /// without a passphrase is a hard [`Error::PassphraseRequired`].
    pub fn from_pem(text: &str, passphrase: Option<&str>) -> Result<Self> {
        let pem = pem::decode(text)?;

        match pem.label.as_str() {
            "RSA PRIVATE KEY" => {
                use rsa::pkcs1::DecodeRsaPrivateKey;

                Ok(Self::Rsa(rsa::RsaPrivateKey::from_pkcs1_der(&pem.contents)?))
            }
            "OPENSSH PRIVATE KEY" => {
                openssh::decode(&pem.contents, passphrase).map(|(key, _)| key)
            }
            other => Err(Error::UnsupportedType(other.to_owned())),
        }
    }

    /// Load a private key from a PEM document, invoking the `provider`
    /// for a passphrase iff the document turns out to be encrypted.
    pub fn from_pem_with(
        text: &str,
        provider: impl FnOnce() -> Option<String>,
    ) -> Result<Self> {
        match Self::from_pem(text, None) {
            Err(Error::PassphraseRequired) => match provider() {
                Some(passphrase) => Self::from_pem(text, Some(&passphrase)),
                None => Err(Error::PassphraseRequired),
            },
            outcome => outcome,
        }
    }

    /// Serialize the key to an unencrypted `OPENSSH PRIVATE KEY` PEM document.
    pub fn to_pem(&self, comment: &str) -> String {
        pem::encode("OPENSSH PRIVATE KEY", &openssh::encode(self, comment))
    }

    /// Serialize an RSA key back to a PKCS#1 `RSA PRIVATE KEY` PEM document.
    pub fn to_pkcs1_pem(&self) -> Result<String> {
        use rsa::pkcs1::EncodeRsaPrivateKey;

        match self {
            Self::Rsa(key) => {
                let der = key.to_pkcs1_der()?;

                Ok(pem::encode("RSA PRIVATE KEY", der.as_bytes()))
            }
            _ => Err(Error::UnsupportedType("only RSA keys are PKCS#1".into())),
        }
    }

    /// Generate a fresh Ed25519 identity, handy for tests and
    /// throwaway host keys.
    pub fn random() -> Self {
        Self::Ed25519(ed25519_dalek::SigningKey::generate(&mut rand::rngs::OsRng))
    }

    /// Generate a fresh identity under the provided `algorithm`.
    ///
    /// RSA generation is noticeably slower than the other algorithms.
    pub fn generate(algorithm: Key) -> Result<Self> {
        let mut rng = rand::rngs::OsRng;

        Ok(match algorithm {
            Key::Ed25519 => Self::random(),
            Key::Rsa => Self::Rsa(rsa::RsaPrivateKey::new(&mut rng, 2048)?),
            Key::EcdsaP256 => Self::EcdsaP256(p256::ecdsa::SigningKey::random(&mut rng)),
            Key::EcdsaP384 => Self::EcdsaP384(p384::ecdsa::SigningKey::random(&mut rng)),
            Key::EcdsaP521 => Self::EcdsaP521(p521::ecdsa::SigningKey::random(&mut rng)),
        })
    }

    /// The key's algorithm.
    pub fn algorithm(&self) -> Key {
        match self {
            Self::Rsa(_) => Key::Rsa,
            Self::Ed25519(_) => Key::Ed25519,
            Self::EcdsaP256(_) => Key::EcdsaP256,
            Self::EcdsaP384(_) => Key::EcdsaP384,
            Self::EcdsaP521(_) => Key::EcdsaP521,
        }
    }

    /// The matching public half.
    pub fn public_key(&self) -> PublicKey {
        match self {
            Self::Rsa(key) => PublicKey::Rsa(key.to_public_key()),
            Self::Ed25519(key) => PublicKey::Ed25519(key.verifying_key()),
            Self::EcdsaP256(key) => PublicKey::EcdsaP256(*key.verifying_key()),
            Self::EcdsaP384(key) => PublicKey::EcdsaP384(*key.verifying_key()),
            Self::EcdsaP521(key) => PublicKey::EcdsaP521(p521::ecdsa::VerifyingKey::from(key)),
        }
    }

    /// Sign `data` under the key's algorithm, producing the SSH signature blob.
    pub fn sign(&self, data: &[u8]) -> sig::Signature {
        let blob = match self {
            Self::Rsa(key) => {
                let signer = rsa::pkcs1v15::SigningKey::<Sha1>::new(key.clone());
                let signature: rsa::pkcs1v15::Signature = signer.sign(data);

                signature.to_vec()
            }
            Self::Ed25519(key) => {
                let signature: ed25519_dalek::Signature = key.sign(data);

                signature.to_bytes().to_vec()
            }
            Self::EcdsaP256(key) => {
                let signature: p256::ecdsa::Signature = key.sign(data);

                ecdsa_blob(&signature.split_bytes())
            }
            Self::EcdsaP384(key) => {
                let signature: p384::ecdsa::Signature = key.sign(data);

                ecdsa_blob(&signature.split_bytes())
            }
            Self::EcdsaP521(key) => {
                let signature: p521::ecdsa::Signature = key.sign(data);

                ecdsa_blob(&signature.split_bytes())
            }
        };

        sig::Signature {
            algorithm: self.algorithm().as_ref().into(),
            blob: blob.into(),
        }
    }
}

/// The `(r, s)` pair of an ECDSA signature in its SSH wire form,
/// two mpints inside the signature blob.
fn ecdsa_blob<A: AsRef<[u8]>>((r, s): &(A, A)) -> Vec<u8> {
    let mut w = Writer::new();

    MpInt::positive(r.as_ref()).encode(&mut w);
    MpInt::positive(s.as_ref()).encode(&mut w);

    w.into_vec()
}

/// A public identity, able to verify signatures and to render
/// its SSH wire blob and one-line OpenSSH form.
#[derive(Clone)]
pub enum PublicKey {
    /// An RSA public key.
    Rsa(rsa::RsaPublicKey),

    /// An Ed25519 public key.
    Ed25519(ed25519_dalek::VerifyingKey),

    /// An ECDSA public key over NIST P-256.
    EcdsaP256(p256::ecdsa::VerifyingKey),

    /// An ECDSA public key over NIST P-384.
    EcdsaP384(p384::ecdsa::VerifyingKey),

    /// An ECDSA public key over NIST P-521.
    EcdsaP521(p521::ecdsa::VerifyingKey),
}

impl std::fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rsa(key) => f.debug_tuple("Rsa").field(key).finish(),
            Self::Ed25519(key) => f.debug_tuple("Ed25519").field(key).finish(),
            Self::EcdsaP256(key) => f.debug_tuple("EcdsaP256").field(key).finish(),
            Self::EcdsaP384(key) => f.debug_tuple("EcdsaP384").field(key).finish(),
            Self::EcdsaP521(key) => f
                .debug_tuple("EcdsaP521")
                .field(&key.to_encoded_point(false))
                .finish(),
        }
    }
}

impl PartialEq for PublicKey {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Rsa(a), Self::Rsa(b)) => a == b,
            (Self::Ed25519(a), Self::Ed25519(b)) => a == b,
            (Self::EcdsaP256(a), Self::EcdsaP256(b)) => a == b,
            (Self::EcdsaP384(a), Self::EcdsaP384(b)) => a == b,
            (Self::EcdsaP521(a), Self::EcdsaP521(b)) => {
                a.to_encoded_point(false) == b.to_encoded_point(false)
            }
            _ => false,
        }
    }
}

impl PublicKey {
    /// The key's algorithm.
    pub fn algorithm(&self) -> Key {
        match self {
            Self::Rsa(_) => Key::Rsa,
            Self::Ed25519(_) => Key::Ed25519,
            Self::EcdsaP256(_) => Key::EcdsaP256,
            Self::EcdsaP384(_) => Key::EcdsaP384,
            Self::EcdsaP521(_) => Key::EcdsaP521,
        }
    }

    /// Render the key's SSH wire blob.
    pub fn to_blob(&self) -> Vec<u8> {
        let mut w = Writer::new();
        w.put_str(self.algorithm().as_ref());

        match self {
            Self::Rsa(key) => {
                MpInt::from(key.e()).encode(&mut w);
                MpInt::from(key.n()).encode(&mut w);
            }
            Self::Ed25519(key) => {
                w.put_bytes(key.as_bytes());
            }
            Self::EcdsaP256(key) => {
                w.put_str("nistp256");
                w.put_bytes(key.to_encoded_point(false).as_bytes());
            }
            Self::EcdsaP384(key) => {
                w.put_str("nistp384");
                w.put_bytes(key.to_encoded_point(false).as_bytes());
            }
            Self::EcdsaP521(key) => {
                w.put_str("nistp521");
                w.put_bytes(key.to_encoded_point(false).as_bytes());
            }
        }

        w.into_vec()
    }

    /// Parse a key from its SSH wire blob.
    pub fn from_blob(blob: &[u8]) -> Result<Self> {
        let mut r = Reader::new(blob);

        let key = match r.take_str()? {
            "ssh-rsa" => {
                let e = MpInt::decode(&mut r)?;
                let n = MpInt::decode(&mut r)?;

                Self::Rsa(rsa::RsaPublicKey::new(n.into(), e.into())?)
            }
            "ssh-ed25519" => {
                let bytes: [u8; 32] = r
                    .take_bytes()?
                    .try_into()
                    .map_err(|_| Error::BadKeyData("ed25519 public key size"))?;

                Self::Ed25519(ed25519_dalek::VerifyingKey::from_bytes(&bytes)?)
            }
            name @ ("ecdsa-sha2-nistp256" | "ecdsa-sha2-nistp384" | "ecdsa-sha2-nistp521") => {
                let curve = r.take_str()?;
                if !name.ends_with(curve) {
                    return Err(Error::BadKeyData("curve name mismatch"));
                }

                let point = r.take_bytes()?;
                match curve {
                    "nistp256" => {
                        Self::EcdsaP256(p256::ecdsa::VerifyingKey::from_sec1_bytes(point)?)
                    }
                    "nistp384" => {
                        Self::EcdsaP384(p384::ecdsa::VerifyingKey::from_sec1_bytes(point)?)
                    }
                    "nistp521" => {
                        Self::EcdsaP521(p521::ecdsa::VerifyingKey::from_sec1_bytes(point)?)
                    }
                    other => return Err(Error::UnsupportedCurve(other.to_owned())),
                }
            }
            other => return Err(Error::UnsupportedType(other.to_owned())),
        };

        if r.remaining() != 0 {
            return Err(Error::BadKeyData("trailing bytes in the public blob"));
        }

        Ok(key)
    }

    /// Verify the `signature` over `data` under the key's algorithm.
    pub fn verify(&self, data: &[u8], signature: &sig::Signature) -> Result<()> {
        if signature.algorithm != self.algorithm().as_ref() {
            return Err(Error::BadKeyData("signature algorithm mismatch"));
        }

        match self {
            Self::Rsa(key) => {
                let verifier = rsa::pkcs1v15::VerifyingKey::<Sha1>::new(key.clone());
                let signature = rsa::pkcs1v15::Signature::try_from(signature.blob.as_ref())?;

                verifier.verify(data, &signature)?;
            }
            Self::Ed25519(key) => {
                let signature = ed25519_dalek::Signature::from_slice(&signature.blob)?;

                key.verify(data, &signature)?;
            }
            Self::EcdsaP256(key) => {
                let signature: p256::ecdsa::Signature = ecdsa_from_blob(&signature.blob, 32)?;

                key.verify(data, &signature)?;
            }
            Self::EcdsaP384(key) => {
                let signature: p384::ecdsa::Signature = ecdsa_from_blob(&signature.blob, 48)?;

                key.verify(data, &signature)?;
            }
            Self::EcdsaP521(key) => {
                let signature: p521::ecdsa::Signature = ecdsa_from_blob(&signature.blob, 66)?;

                key.verify(data, &signature)?;
            }
        }

        Ok(())
    }

    /// Render the one-line OpenSSH form, `algorithm base64-blob [comment]`,
    /// as found in `known_hosts` and `authorized_keys` files.
    pub fn to_openssh(&self, comment: Option<&str>) -> String {
        let blob = STANDARD.encode(self.to_blob());

        match comment {
            Some(comment) => format!("{} {blob} {comment}", self.algorithm().as_ref()),
            None => format!("{} {blob}", self.algorithm().as_ref()),
        }
    }

    /// Parse the one-line OpenSSH form.
    pub fn from_openssh(line: &str) -> Result<Self> {
        let mut fields = line.split_whitespace();

        let algorithm = fields.next().ok_or(Error::BadKeyData("empty line"))?;
        let blob = fields.next().ok_or(Error::BadKeyData("missing key blob"))?;

        let key = Self::from_blob(&STANDARD.decode(blob)?)?;
        if key.algorithm().as_ref() != algorithm {
            return Err(Error::BadKeyData("key type does not match the blob"));
        }

        Ok(key)
    }
}

/// Rebuild a fixed-width `(r, s)` ECDSA signature from the two
/// mpints inside an SSH signature blob.
fn ecdsa_from_blob<S>(blob: &[u8], width: usize) -> Result<S>
where
    S: for<'s> TryFrom<&'s [u8], Error = signature::Error>,
{
    let mut r = Reader::new(blob);

    let r_bytes = MpInt::decode(&mut r)?.to_be_bytes();
    let s_bytes = MpInt::decode(&mut r)?.to_be_bytes();

    let mut raw = vec![0; width * 2];
    left_pad(&r_bytes, &mut raw[..width])?;
    left_pad(&s_bytes, &mut raw[width..])?;

    Ok(S::try_from(&raw[..])?)
}

fn left_pad(bytes: &[u8], out: &mut [u8]) -> Result<()> {
    if bytes.len() > out.len() {
        return Err(Error::BadKeyData("scalar wider than the curve field"));
    }

    let offset = out.len() - bytes.len();
    out[offset..].copy_from_slice(bytes);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_signs_and_verifies_ed25519() {
        let key = PrivateKey::random();
        let signature = key.sign(b"attestation");

        assert_eq!(signature.algorithm, "ssh-ed25519");
        key.public_key()
            .verify(b"attestation", &signature)
            .expect("signature should verify");
        key.public_key()
            .verify(b"tampered", &signature)
            .expect_err("signature binds the data");
    }

    #[test]
    fn it_roundtrips_public_blobs() {
        let key = PrivateKey::random().public_key();

        assert_eq!(PublicKey::from_blob(&key.to_blob()).unwrap(), key);

        let line = key.to_openssh(Some("maya@hive"));
        assert_eq!(PublicKey::from_openssh(&line).unwrap(), key);
    }

    #[test]
    fn it_roundtrips_the_openssh_container() {
        let key = PrivateKey::random();
        let pem = key.to_pem("maya@hive");

        let read = PrivateKey::from_pem(&pem, None).unwrap();

        assert_eq!(read.public_key(), key.public_key());
    }
}
