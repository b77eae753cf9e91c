//! Container - the single persisted unit (`.kcg` file).
//!
//! `[u16 version][u32 len][image store export][u32 len][layer catalog export]`

use std::io::{Read, Write};

use crate::codec::{Decoder, Encoder};
use crate::error::Result;
use crate::images::ImageStore;
use crate::layers::LayerCatalog;

pub const CONTAINER_VERSION: u16 = 0;
pub const CONTAINER_EXTENSION: &str = "kcg";

#[derive(Debug, Clone, Default)]
pub struct Container {
    pub images: ImageStore,
    pub catalog: LayerCatalog,
}

impl Container {
    pub fn new(images: ImageStore, catalog: LayerCatalog) -> Self {
        Self { images, catalog }
    }

    pub fn version(&self) -> u16 {
        CONTAINER_VERSION
    }

    pub fn export(&self) -> Vec<u8> {
        let mut enc = Encoder::with_version(CONTAINER_VERSION);
        enc.put_bytes(&self.images.export());
        enc.put_bytes(&self.catalog.export());
        enc.finish()
    }

    pub fn import(raw: &[u8]) -> Result<Self> {
        let mut dec = Decoder::versioned(raw, CONTAINER_VERSION)?;
        let images = ImageStore::import(dec.bytes()?)?;
        let catalog = LayerCatalog::import(dec.bytes()?)?;
        dec.finish()?;
        Ok(Self { images, catalog })
    }

    pub fn write_to<W: Write>(&self, mut w: W) -> Result<()> {
        w.write_all(&self.export())?;
        w.flush()?;
        Ok(())
    }

    pub fn read_from<R: Read>(mut r: R) -> Result<Self> {
        let mut raw = Vec::new();
        r.read_to_end(&mut raw)?;
        Self::import(&raw)
    }
}
