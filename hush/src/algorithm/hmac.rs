use digest::OutputSizeUser;
use hush_wire::trans::KexInit;
use sha1::Sha1;
use sha2::{Sha256, Sha512};
use strum::{AsRefStr, EnumIter, EnumString};

use crate::{Error, Result};

pub(crate) fn negotiate(clientkex: &KexInit, serverkex: &KexInit) -> Result<(Hmac, Hmac)> {
    Ok((
        clientkex
            .mac_algorithms_client_to_server
            .preferred_in(&serverkex.mac_algorithms_client_to_server)
            .ok_or(Error::NoCommonHmac)?
            .parse()
            .map_err(|_| Error::NoCommonHmac)?,
        clientkex
            .mac_algorithms_server_to_client
            .preferred_in(&serverkex.mac_algorithms_server_to_client)
            .ok_or(Error::NoCommonHmac)?
            .parse()
            .map_err(|_| Error::NoCommonHmac)?,
    ))
}

/// SSH hmac algorithms.
#[non_exhaustive]
#[derive(Debug, Clone, Default, PartialEq, Eq, EnumString, AsRefStr, EnumIter)]
#[strum(serialize_all = "kebab-case")]
pub enum Hmac {
    /// HMAC with the sha-2-256 digest.
    #[strum(serialize = "hmac-sha2-256")]
    HmacSha256,

    /// HMAC with the sha-2-512 digest.
    #[strum(serialize = "hmac-sha2-512")]
    HmacSha512,

    /// HMAC with the sha-1 digest.
    HmacSha1,

    /// No HMAC algorithm, before the first `SSH_MSG_NEWKEYS`.
    #[default]
    None,
}

impl Hmac {
    /// Verify the `mac` over `seq || buf` under `key`, in constant time.
    pub(crate) fn verify(
        &self,
        seq: u32,
        buf: &[u8],
        key: &[u8],
        mac: &[u8],
    ) -> Result<(), digest::MacError> {
        fn verify<D: digest::Mac + digest::KeyInit>(
            seq: u32,
            buf: &[u8],
            key: &[u8],
            mac: &[u8],
        ) -> Result<(), digest::MacError> {
            <D as digest::Mac>::new_from_slice(key)
                .expect("HMAC accepts keys of any size")
                .chain_update(seq.to_be_bytes())
                .chain_update(buf)
                .verify_slice(mac)
        }

        match self {
            Self::HmacSha256 => verify::<hmac::Hmac<Sha256>>(seq, buf, key, mac),
            Self::HmacSha512 => verify::<hmac::Hmac<Sha512>>(seq, buf, key, mac),
            Self::HmacSha1 => verify::<hmac::Hmac<Sha1>>(seq, buf, key, mac),
            Self::None => Ok(()),
        }
    }

    /// Produce the mac over `seq || buf` under `key`.
    pub(crate) fn sign(&self, seq: u32, buf: &[u8], key: &[u8]) -> Vec<u8> {
        fn sign<D: digest::Mac + digest::KeyInit>(seq: u32, buf: &[u8], key: &[u8]) -> Vec<u8> {
            <D as digest::Mac>::new_from_slice(key)
                .expect("HMAC accepts keys of any size")
                .chain_update(seq.to_be_bytes())
                .chain_update(buf)
                .finalize()
                .into_bytes()
                .to_vec()
        }

        match self {
            Self::HmacSha256 => sign::<hmac::Hmac<Sha256>>(seq, buf, key),
            Self::HmacSha512 => sign::<hmac::Hmac<Sha512>>(seq, buf, key),
            Self::HmacSha1 => sign::<hmac::Hmac<Sha1>>(seq, buf, key),
            Self::None => Default::default(),
        }
    }

    /// The size of the produced mac.
    pub fn size(&self) -> usize {
        match self {
            Self::HmacSha256 => Sha256::output_size(),
            Self::HmacSha512 => Sha512::output_size(),
            Self::HmacSha1 => Sha1::output_size(),
            Self::None => 0,
        }
    }
}

impl hush_wire::Mac for Hmac {
    fn size(&self) -> usize {
        self.size()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_signs_and_verifies() {
        let key = [0x5a; 32];
        let data = b"the quick brown fox";

        for hmac in [Hmac::HmacSha256, Hmac::HmacSha512, Hmac::HmacSha1] {
            let mac = hmac.sign(7, data, &key);

            assert_eq!(mac.len(), hmac.size());
            hmac.verify(7, data, &key, &mac).expect("mac should verify");
            hmac.verify(8, data, &key, &mac)
                .expect_err("sequence number is bound into the mac");
        }
    }
}
