//! Binary framing shared by the image store, layer catalog and container.
//!
//! Little-endian throughout. Blobs and strings are `u32 length + bytes`,
//! sequences are `u32 count + elements`, hashes are 32 raw bytes.

use crate::error::{KittyError, Result};
use crate::hashing::{ContentHash, HASH_LEN};

pub const VERSION_LEN: usize = 2;

#[derive(Debug, Default)]
pub struct Encoder {
    buf: Vec<u8>,
}

impl Encoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_version(version: u16) -> Self {
        let mut enc = Self::new();
        enc.put_u16(version);
        enc
    }

    pub fn put_u16(&mut self, v: u16) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    pub fn put_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    /// Counts and lengths are framed as `u32`.
    pub fn put_count(&mut self, n: usize) {
        self.put_u32(n as u32);
    }

    pub fn put_bytes(&mut self, bytes: &[u8]) {
        self.put_count(bytes.len());
        self.buf.extend_from_slice(bytes);
    }

    pub fn put_str(&mut self, s: &str) {
        self.put_bytes(s.as_bytes());
    }

    pub fn put_hash(&mut self, hash: &ContentHash) {
        self.buf.extend_from_slice(hash.as_bytes());
    }

    pub fn finish(self) -> Vec<u8> {
        self.buf
    }
}

#[derive(Debug)]
pub struct Decoder<'a> {
    raw: &'a [u8],
    pos: usize,
}

impl<'a> Decoder<'a> {
    pub fn new(raw: &'a [u8]) -> Self {
        Self { raw, pos: 0 }
    }

    /// Read the leading version and reject anything but `expected`.
    pub fn versioned(raw: &'a [u8], expected: u16) -> Result<Self> {
        if raw.len() < VERSION_LEN {
            return Err(KittyError::InvalidSize { needed: VERSION_LEN, available: raw.len() });
        }
        let mut dec = Self::new(raw);
        let actual = dec.u16()?;
        if actual != expected {
            return Err(KittyError::InvalidVersion { expected, actual });
        }
        Ok(dec)
    }

    pub fn remaining(&self) -> usize {
        self.raw.len() - self.pos
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        if self.remaining() < n {
            return Err(KittyError::InvalidSize { needed: n, available: self.remaining() });
        }
        let out = &self.raw[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    pub fn u16(&mut self) -> Result<u16> {
        let b = self.take(2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    pub fn u32(&mut self) -> Result<u32> {
        let b = self.take(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    pub fn count(&mut self) -> Result<usize> {
        Ok(self.u32()? as usize)
    }

    pub fn bytes(&mut self) -> Result<&'a [u8]> {
        let n = self.count()?;
        self.take(n)
    }

    pub fn string(&mut self) -> Result<String> {
        let b = self.bytes()?;
        String::from_utf8(b.to_vec()).map_err(|_| KittyError::InvalidUtf8)
    }

    pub fn hash(&mut self) -> Result<ContentHash> {
        let b = self.take(HASH_LEN)?;
        let mut raw = [0u8; HASH_LEN];
        raw.copy_from_slice(b);
        Ok(ContentHash::from_bytes(raw))
    }

    /// Trailing garbage is treated as a malformed input.
    pub fn finish(self) -> Result<()> {
        match self.remaining() {
            0 => Ok(()),
            extra => Err(KittyError::InvalidSize { needed: self.pos, available: self.pos + extra }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_little_endian_framing() {
        let mut enc = Encoder::with_version(1);
        enc.put_str("ab");
        assert_eq!(enc.finish(), vec![1, 0, 2, 0, 0, 0, b'a', b'b']);
    }

    #[test]
    fn test_decode_mixed() {
        let h = ContentHash::of(b"x");
        let mut enc = Encoder::with_version(0);
        enc.put_count(2);
        enc.put_bytes(&[9, 8, 7]);
        enc.put_hash(&h);
        let raw = enc.finish();

        let mut dec = Decoder::versioned(&raw, 0).unwrap();
        assert_eq!(dec.count().unwrap(), 2);
        assert_eq!(dec.bytes().unwrap(), &[9, 8, 7]);
        assert_eq!(dec.hash().unwrap(), h);
        dec.finish().unwrap();
    }

    #[test]
    fn test_version_checks() {
        assert!(matches!(Decoder::versioned(&[0], 0), Err(KittyError::InvalidSize { .. })));
        assert!(matches!(
            Decoder::versioned(&[5, 0], 0),
            Err(KittyError::InvalidVersion { expected: 0, actual: 5 })
        ));
    }

    #[test]
    fn test_truncated_and_trailing() {
        let mut dec = Decoder::new(&[10, 0, 0, 0, 1, 2]);
        assert!(matches!(dec.bytes(), Err(KittyError::InvalidSize { needed: 10, available: 2 })));

        let dec = Decoder::new(&[1, 2, 3]);
        assert!(matches!(dec.finish(), Err(KittyError::InvalidSize { .. })));
    }

    #[test]
    fn test_invalid_utf8() {
        let mut enc = Encoder::new();
        enc.put_bytes(&[0xff, 0xfe]);
        let raw = enc.finish();
        assert!(matches!(Decoder::new(&raw).string(), Err(KittyError::InvalidUtf8)));
    }
}
