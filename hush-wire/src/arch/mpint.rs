use num_bigint_dig::BigUint;

use crate::{Decode, Encode, Error, Reader, Result, Writer};

/// An `mpint` as defined in the SSH protocol, a multiple precision integer
/// in two's complement format, stored as a `string`.
///
/// Negative numbers never occur in the protocol as implemented here,
/// so the type wraps an unsigned integer and encodes the mandatory
/// leading zero octet whenever the high bit of the first octet is set.
///
/// see <https://datatracker.ietf.org/doc/html/rfc4251#section-5>.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MpInt(BigUint);

impl MpInt {
    /// Create an [`MpInt`] from raw big-endian bytes, interpreted as positive.
    pub fn positive(bytes: &[u8]) -> Self {
        Self(BigUint::from_bytes_be(bytes))
    }

    /// The wrapped unsigned integer.
    pub fn as_uint(&self) -> &BigUint {
        &self.0
    }

    /// The minimal big-endian magnitude of the integer, no sign octet.
    pub fn to_be_bytes(&self) -> Vec<u8> {
        if self.0 == BigUint::default() {
            Vec::new()
        } else {
            self.0.to_bytes_be()
        }
    }
}

impl From<BigUint> for MpInt {
    fn from(value: BigUint) -> Self {
        Self(value)
    }
}

impl From<MpInt> for BigUint {
    fn from(value: MpInt) -> Self {
        value.0
    }
}

impl From<&BigUint> for MpInt {
    fn from(value: &BigUint) -> Self {
        Self(value.clone())
    }
}

impl Encode for MpInt {
    fn encode(&self, w: &mut Writer) -> usize {
        let bytes = self.to_be_bytes();

        match bytes.first() {
            Some(first) if first & 0x80 != 0 => {
                w.put_u32(bytes.len() as u32 + 1);
                w.put_u8(0);
                w.put_raw(&bytes);

                4 + 1 + bytes.len()
            }
            _ => {
                w.put_bytes(&bytes);

                4 + bytes.len()
            }
        }
    }
}

impl Decode for MpInt {
    fn decode(r: &mut Reader<'_>) -> Result<Self> {
        let bytes = r.take_bytes()?;

        if bytes.first().is_some_and(|first| first & 0x80 != 0) {
            // The high bit marks a two's complement negative number.
            return Err(Error::Unsupported("negative mpint"));
        }

        Ok(Self::positive(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(value: &MpInt) -> MpInt {
        let bytes = value.to_bytes_wire();
        let mut r = Reader::new(&bytes);
        let read = MpInt::decode(&mut r).expect("mpint did not round-trip");

        assert!(r.is_empty(), "read length differs from written length");

        read
    }

    impl MpInt {
        fn to_bytes_wire(&self) -> Vec<u8> {
            let mut w = Writer::new();
            let written = self.encode(&mut w);
            let bytes = w.into_vec();

            assert_eq!(written, bytes.len());

            bytes
        }
    }

    #[test]
    fn it_encodes_zero_as_an_empty_string() {
        assert_eq!(
            MpInt::positive(&[]).to_bytes_wire(),
            [0x00, 0x00, 0x00, 0x00]
        );
    }

    #[test]
    fn it_prepends_a_zero_octet_when_the_high_bit_is_set() {
        assert_eq!(
            MpInt::positive(&[0x80]).to_bytes_wire(),
            [0x00, 0x00, 0x00, 0x02, 0x00, 0x80]
        );
    }

    #[test]
    fn it_encodes_wide_values_minimally() {
        assert_eq!(
            MpInt::positive(&[0x09, 0xa3, 0x78, 0xf9, 0xb2, 0xe3, 0x32, 0xa7]).to_bytes_wire(),
            [0x00, 0x00, 0x00, 0x08, 0x09, 0xa3, 0x78, 0xf9, 0xb2, 0xe3, 0x32, 0xa7]
        );
    }

    #[test]
    fn it_roundtrips_exactly() {
        for bytes in [
            &[][..],
            &[0x01],
            &[0x7f],
            &[0x80],
            &[0xff, 0xff],
            &[0x00, 0x00, 0x42],
            &[0x09, 0xa3, 0x78, 0xf9, 0xb2, 0xe3, 0x32, 0xa7],
        ] {
            let value = MpInt::positive(bytes);

            assert_eq!(roundtrip(&value), value);
        }
    }
}
