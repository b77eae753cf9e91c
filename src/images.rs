//! Content-addressed image store.
//!
//! Blobs are keyed by the SHA-256 of their bytes, so byte-identical artwork
//! is stored once. Export order follows hash order and is therefore stable.

use std::collections::BTreeMap;

use crate::codec::{Decoder, Encoder};
use crate::error::{KittyError, Result};
use crate::hashing::ContentHash;

pub const IMAGES_VERSION: u16 = 0;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageStore {
    images: BTreeMap<ContentHash, Vec<u8>>,
}

impl ImageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn version(&self) -> u16 {
        IMAGES_VERSION
    }

    /// Store `raw`, failing with `AlreadyExists` if identical bytes are
    /// already present. The error carries the existing hash in hex.
    pub fn add(&mut self, raw: Vec<u8>) -> Result<ContentHash> {
        let hash = ContentHash::of(&raw);
        if self.images.contains_key(&hash) {
            return Err(KittyError::already_exists("image", hash.to_hex()));
        }
        self.images.insert(hash, raw);
        Ok(hash)
    }

    /// Store `raw` unless present; always returns its hash.
    pub fn add_or_reuse(&mut self, raw: Vec<u8>) -> ContentHash {
        let hash = ContentHash::of(&raw);
        self.images.entry(hash).or_insert(raw);
        hash
    }

    pub fn remove(&mut self, hash: &ContentHash) -> Option<Vec<u8>> {
        self.images.remove(hash)
    }

    pub fn get(&self, hash: &ContentHash) -> Option<&[u8]> {
        self.images.get(hash).map(Vec::as_slice)
    }

    pub fn contains(&self, hash: &ContentHash) -> bool {
        self.images.contains_key(hash)
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn hashes(&self) -> impl Iterator<Item = &ContentHash> {
        self.images.keys()
    }

    /// `[u16 version][u32 count]{[u32 len][bytes]}*`
    pub fn export(&self) -> Vec<u8> {
        let mut enc = Encoder::with_version(IMAGES_VERSION);
        enc.put_count(self.images.len());
        for raw in self.images.values() {
            enc.put_bytes(raw);
        }
        enc.finish()
    }

    /// Strict inverse of `export`. Hashes are recomputed from the bytes.
    pub fn import(raw: &[u8]) -> Result<Self> {
        let mut dec = Decoder::versioned(raw, IMAGES_VERSION)?;
        let count = dec.count()?;
        let mut store = Self::new();
        for _ in 0..count {
            store.add_or_reuse(dec.bytes()?.to_vec());
        }
        dec.finish()?;
        Ok(store)
    }
}
