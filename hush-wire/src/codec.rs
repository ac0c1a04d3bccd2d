//! Primitive readers and writers for the SSH wire representation.

use crate::{Error, Result};

/// A growable output buffer with big-endian primitive writers.
#[derive(Debug, Default)]
pub struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    /// Create an empty [`Writer`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes written so far.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether nothing has been written yet.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Extract the accumulated bytes.
    pub fn into_vec(self) -> Vec<u8> {
        self.buf
    }

    /// Write a `byte`.
    pub fn put_u8(&mut self, value: u8) {
        self.buf.push(value);
    }

    /// Write a big-endian `uint32`.
    pub fn put_u32(&mut self, value: u32) {
        self.buf.extend_from_slice(&value.to_be_bytes());
    }

    /// Write a big-endian `uint64`.
    pub fn put_u64(&mut self, value: u64) {
        self.buf.extend_from_slice(&value.to_be_bytes());
    }

    /// Write a `boolean`, as a single byte.
    pub fn put_bool(&mut self, value: bool) {
        self.buf.push(value.into());
    }

    /// Write raw bytes, with no length prefix.
    pub fn put_raw(&mut self, value: &[u8]) {
        self.buf.extend_from_slice(value);
    }

    /// Write an SSH `string`, an `uint32` length prefix followed by the raw bytes.
    pub fn put_bytes(&mut self, value: &[u8]) {
        self.put_u32(value.len() as u32);
        self.buf.extend_from_slice(value);
    }

    /// Write a textual SSH `string`.
    pub fn put_str(&mut self, value: &str) {
        self.put_bytes(value.as_bytes());
    }
}

impl AsRef<[u8]> for Writer {
    fn as_ref(&self) -> &[u8] {
        &self.buf
    }
}

/// A read-only view over a byte span with a running offset.
#[derive(Debug)]
pub struct Reader<'b> {
    buf: &'b [u8],
    at: usize,
}

impl<'b> Reader<'b> {
    /// Create a [`Reader`] over the provided bytes.
    pub fn new(buf: &'b [u8]) -> Self {
        Self { buf, at: 0 }
    }

    /// The current offset into the buffer.
    pub fn offset(&self) -> usize {
        self.at
    }

    /// Bytes left to read.
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.at
    }

    /// Whether the buffer has been read entirely.
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Read `n` raw bytes.
    pub fn take_raw(&mut self, n: usize) -> Result<&'b [u8]> {
        let span = self
            .buf
            .get(self.at..self.at + n)
            .ok_or(Error::UnexpectedEof { at: self.at })?;
        self.at += n;

        Ok(span)
    }

    /// Read the rest of the buffer.
    pub fn take_rest(&mut self) -> &'b [u8] {
        let span = &self.buf[self.at..];
        self.at = self.buf.len();

        span
    }

    /// Read a `byte`.
    pub fn take_u8(&mut self) -> Result<u8> {
        Ok(self.take_raw(1)?[0])
    }

    /// Read a big-endian `uint32`.
    pub fn take_u32(&mut self) -> Result<u32> {
        let raw = self.take_raw(4)?;

        Ok(u32::from_be_bytes(raw.try_into().expect("span is 4 bytes")))
    }

    /// Read a big-endian `uint64`.
    pub fn take_u64(&mut self) -> Result<u64> {
        let raw = self.take_raw(8)?;

        Ok(u64::from_be_bytes(raw.try_into().expect("span is 8 bytes")))
    }

    /// Read a `boolean`, any non-zero byte is `true`.
    pub fn take_bool(&mut self) -> Result<bool> {
        Ok(self.take_u8()? != 0)
    }

    /// Read an SSH `string`, an `uint32` length prefix followed by the raw bytes.
    pub fn take_bytes(&mut self) -> Result<&'b [u8]> {
        let size = self.take_u32()? as usize;

        self.take_raw(size)
    }

    /// Read a textual SSH `string`.
    pub fn take_str(&mut self) -> Result<&'b str> {
        Ok(std::str::from_utf8(self.take_bytes()?)?)
    }
}

/// Consume the message number byte, erroring out when it differs from `expected`.
pub(crate) fn magic(r: &mut Reader<'_>, expected: u8) -> Result<()> {
    match r.take_u8()? {
        found if found == expected => Ok(()),
        found => Err(Error::BadMagic { expected, found }),
    }
}

/// The _serialization_ half of a wire entity, reporting the amount of bytes written.
pub trait Encode {
    /// Write `self` to the provided [`Writer`], returning the serialized size.
    fn encode(&self, w: &mut Writer) -> usize;

    /// Serialize `self` to an owned buffer.
    fn to_bytes(&self) -> Vec<u8> {
        let mut w = Writer::new();
        self.encode(&mut w);

        w.into_vec()
    }
}

/// The _deserialization_ half of a wire entity.
pub trait Decode: Sized {
    /// Read an instance of `Self` from the provided [`Reader`].
    fn decode(r: &mut Reader<'_>) -> Result<Self>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_reads_primitives_in_order() {
        let mut w = Writer::new();
        w.put_u8(0xff);
        w.put_u32(0xdead_beef);
        w.put_u64(0x0123_4567_89ab_cdef);
        w.put_bool(true);
        w.put_str("no more");

        let buf = w.into_vec();
        let mut r = Reader::new(&buf);

        assert_eq!(r.take_u8().unwrap(), 0xff);
        assert_eq!(r.take_u32().unwrap(), 0xdead_beef);
        assert_eq!(r.take_u64().unwrap(), 0x0123_4567_89ab_cdef);
        assert!(r.take_bool().unwrap());
        assert_eq!(r.take_str().unwrap(), "no more");
        assert!(r.is_empty());
    }

    #[test]
    fn it_rejects_out_of_bounds_reads() {
        let mut r = Reader::new(&[0, 0, 0, 5, b'a']);

        assert!(matches!(
            r.take_bytes(),
            Err(Error::UnexpectedEof { at: 4 })
        ));
    }
}
