//! Layer catalog - trait categories, attributes, breeds and their artwork.
//!
//! An attribute's position within its category is the phenotype value that
//! selects it; a breed's position in the global breed list is the breed
//! phenotype. Both are assigned by insertion order and never change.

use serde::Serialize;

use crate::codec::{Decoder, Encoder};
use crate::error::{KittyError, Result};
use crate::genetics::{AlleleRange, AlleleRanges, Locus};
use crate::hashing::ContentHash;
use crate::ordered::{NameList, OrderedMap};

pub const LAYERS_VERSION: u16 = 0;

/// One area/outline pair. An empty hash means no artwork for that channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Part {
    pub area: ContentHash,
    pub outline: ContentHash,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Layer {
    attribute: String,
    breed: String,
    parts: Vec<Part>,
}

impl Layer {
    pub fn new(attribute: impl Into<String>, breed: impl Into<String>) -> Self {
        Self { attribute: attribute.into(), breed: breed.into(), parts: Vec::new() }
    }

    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    pub fn breed(&self) -> &str {
        &self.breed
    }

    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    /// Grow to at least `n` parts. Never shrinks.
    pub fn ensure_parts_count(&mut self, n: usize) {
        if self.parts.len() < n {
            self.parts.resize(n, Part::default());
        }
    }

    pub fn set_area(&mut self, index: usize, hash: ContentHash) {
        self.ensure_parts_count(index + 1);
        self.parts[index].area = hash;
    }

    pub fn set_outline(&mut self, index: usize, hash: ContentHash) {
        self.ensure_parts_count(index + 1);
        self.parts[index].outline = hash;
    }

    /// Every non-empty hash this layer refers to.
    pub fn hashes(&self) -> impl Iterator<Item = &ContentHash> {
        self.parts
            .iter()
            .flat_map(|p| [&p.area, &p.outline])
            .filter(|h| !h.is_empty())
    }
}

type LayerKey = (String, String);

/// Layers of one trait category (e.g. "ears").
#[derive(Debug, Clone, Default)]
pub struct TraitLayers {
    name: String,
    attributes: NameList,
    layers: OrderedMap<LayerKey, Layer>,
}

impl TraitLayers {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Self::default() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Register an attribute; its index is its insertion position.
    pub fn add_attribute(&mut self, name: &str) -> Result<usize> {
        match self.attributes.insert(name.to_string(), ()) {
            (i, true) => Ok(i),
            (_, false) => Err(KittyError::already_exists("attribute", format!("{}/{}", self.name, name))),
        }
    }

    pub fn attribute(&self, index: usize) -> Option<&str> {
        self.attributes.name(index)
    }

    pub fn attribute_index(&self, name: &str) -> Option<usize> {
        self.attributes.position(name)
    }

    pub fn attribute_count(&self) -> usize {
        self.attributes.len()
    }

    pub fn attributes(&self) -> impl Iterator<Item = &str> {
        self.attributes.keys().map(String::as_str)
    }

    pub fn upsert_layer(&mut self, attribute: &str, breed: &str) -> &mut Layer {
        self.layers
            .get_or_insert_with((attribute.to_string(), breed.to_string()), || Layer::new(attribute, breed))
    }

    pub fn layer(&self, attribute: &str, breed: &str) -> Option<&Layer> {
        self.layers.get(&(attribute.to_string(), breed.to_string()))
    }

    pub fn layers(&self) -> impl Iterator<Item = &Layer> {
        self.layers.values()
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }
}

#[derive(Debug, Clone, Default)]
pub struct LayerCatalog {
    breeds: NameList,
    categories: OrderedMap<String, TraitLayers>,
}

impl LayerCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn version(&self) -> u16 {
        LAYERS_VERSION
    }

    pub fn add_trait_category(&mut self, name: &str) -> Result<()> {
        match self.categories.insert(name.to_string(), TraitLayers::new(name)) {
            (_, true) => Ok(()),
            (_, false) => Err(KittyError::already_exists("trait category", name)),
        }
    }

    pub fn add_breed(&mut self, name: &str) -> Result<usize> {
        match self.breeds.insert(name.to_string(), ()) {
            (i, true) => Ok(i),
            (_, false) => Err(KittyError::already_exists("breed", name)),
        }
    }

    pub fn add_attribute(&mut self, category: &str, name: &str) -> Result<usize> {
        self.category_mut(category)?.add_attribute(name)
    }

    /// Existing layer for the key, or a new one with no parts.
    pub fn upsert_layer(&mut self, category: &str, attribute: &str, breed: &str) -> Result<&mut Layer> {
        Ok(self.category_mut(category)?.upsert_layer(attribute, breed))
    }

    pub fn resolve(&self, category: &str, attribute: &str, breed: &str) -> Option<&Layer> {
        self.categories.get(category)?.layer(attribute, breed)
    }

    pub fn category(&self, name: &str) -> Option<&TraitLayers> {
        self.categories.get(name)
    }

    fn category_mut(&mut self, name: &str) -> Result<&mut TraitLayers> {
        self.categories
            .get_mut(name)
            .ok_or_else(|| KittyError::not_found("trait category", name))
    }

    pub fn categories(&self) -> impl Iterator<Item = &TraitLayers> {
        self.categories.values()
    }

    pub fn category_count(&self) -> usize {
        self.categories.len()
    }

    pub fn breed(&self, index: usize) -> Option<&str> {
        self.breeds.name(index)
    }

    pub fn breed_index(&self, name: &str) -> Option<usize> {
        self.breeds.position(name)
    }

    pub fn breeds(&self) -> impl Iterator<Item = &str> {
        self.breeds.keys().map(String::as_str)
    }

    pub fn breed_count(&self) -> usize {
        self.breeds.len()
    }

    pub fn layer_count(&self) -> usize {
        self.categories.values().map(TraitLayers::layer_count).sum()
    }

    /// Valid phenotype range per locus, derived from current cardinality.
    pub fn allele_ranges(&self) -> AlleleRanges {
        let mut ranges = AlleleRanges::new();
        if let Some(r) = AlleleRange::from_count(self.breeds.len()) {
            ranges.set(Locus::Breed, r);
        }
        for locus in Locus::TRAITS {
            let count = locus
                .category()
                .and_then(|c| self.categories.get(c))
                .map_or(0, TraitLayers::attribute_count);
            if let Some(r) = AlleleRange::from_count(count) {
                ranges.set(locus, r);
            }
        }
        ranges
    }

    /// ```text
    /// [u16 version]
    /// [u32 n]{breed}*
    /// [u32 n]{ name [u32 n]{attribute}* [u32 n]{ attribute breed [u32 n]{area outline}* }* }*
    /// ```
    pub fn export(&self) -> Vec<u8> {
        let mut enc = Encoder::with_version(LAYERS_VERSION);
        enc.put_count(self.breeds.len());
        for breed in self.breeds.keys() {
            enc.put_str(breed);
        }
        enc.put_count(self.categories.len());
        for cat in self.categories.values() {
            enc.put_str(&cat.name);
            enc.put_count(cat.attributes.len());
            for attr in cat.attributes.keys() {
                enc.put_str(attr);
            }
            enc.put_count(cat.layers.len());
            for layer in cat.layers.values() {
                enc.put_str(&layer.attribute);
                enc.put_str(&layer.breed);
                enc.put_count(layer.parts.len());
                for part in &layer.parts {
                    enc.put_hash(&part.area);
                    enc.put_hash(&part.outline);
                }
            }
        }
        enc.finish()
    }

    /// Strict inverse of `export`; rebuilds the by-name indexes and rejects
    /// duplicate names or layer keys with `AlreadyExists`.
    pub fn import(raw: &[u8]) -> Result<Self> {
        let mut dec = Decoder::versioned(raw, LAYERS_VERSION)?;
        let mut catalog = Self::new();

        for _ in 0..dec.count()? {
            catalog.add_breed(&dec.string()?)?;
        }
        for _ in 0..dec.count()? {
            let name = dec.string()?;
            catalog.add_trait_category(&name)?;
            let cat = catalog.category_mut(&name)?;
            for _ in 0..dec.count()? {
                cat.add_attribute(&dec.string()?)?;
            }
            for _ in 0..dec.count()? {
                let attribute = dec.string()?;
                let breed = dec.string()?;
                let mut layer = Layer::new(attribute.as_str(), breed.as_str());
                for _ in 0..dec.count()? {
                    let area = dec.hash()?;
                    let outline = dec.hash()?;
                    layer.parts.push(Part { area, outline });
                }
                let key_name = format!("{}/{}/{}", name, attribute, breed);
                if !cat.layers.insert((attribute, breed), layer).1 {
                    return Err(KittyError::already_exists("layer", key_name));
                }
            }
        }
        dec.finish()?;
        Ok(catalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> LayerCatalog {
        let mut c = LayerCatalog::new();
        c.add_trait_category("body").unwrap();
        c.add_trait_category("ears").unwrap();
        c.add_breed("default").unwrap();
        c.add_breed("siamese").unwrap();
        c.add_attribute("body", "striped").unwrap();
        c.add_attribute("body", "spotted").unwrap();
        c.add_attribute("ears", "pointy").unwrap();
        let layer = c.upsert_layer("body", "striped", "default").unwrap();
        layer.set_outline(0, ContentHash::of(b"outline"));
        layer.set_area(1, ContentHash::of(b"area"));
        c.upsert_layer("ears", "pointy", "siamese").unwrap().set_outline(0, ContentHash::of(b"ear"));
        c
    }

    #[test]
    fn test_registration_conflicts() {
        let mut c = sample();
        assert!(c.add_trait_category("body").unwrap_err().is_already_exists());
        assert!(c.add_breed("default").unwrap_err().is_already_exists());
        assert!(c.add_attribute("body", "striped").unwrap_err().is_already_exists());
        assert!(matches!(c.add_attribute("tail", "long"), Err(KittyError::NotFound { .. })));
    }

    #[test]
    fn test_attribute_index_is_insertion_position() {
        let c = sample();
        let body = c.category("body").unwrap();
        assert_eq!(body.attribute(0), Some("striped"));
        assert_eq!(body.attribute(1), Some("spotted"));
        assert_eq!(body.attribute(2), None);
        assert_eq!(body.attribute_index("spotted"), Some(1));
        assert_eq!(c.breed(1), Some("siamese"));
    }

    #[test]
    fn test_upsert_returns_existing() {
        let mut c = sample();
        let layer = c.upsert_layer("body", "striped", "default").unwrap();
        assert_eq!(layer.parts().len(), 2);
        assert_eq!(c.layer_count(), 2);
        c.upsert_layer("body", "spotted", "default").unwrap();
        assert_eq!(c.layer_count(), 3);
        assert!(c.resolve("body", "spotted", "default").unwrap().parts().is_empty());
    }

    #[test]
    fn test_ensure_parts_count_never_shrinks() {
        let mut layer = Layer::new("a", "b");
        layer.ensure_parts_count(3);
        layer.ensure_parts_count(1);
        assert_eq!(layer.parts().len(), 3);
        assert!(layer.parts().iter().all(|p| p.area.is_empty() && p.outline.is_empty()));
        assert_eq!(layer.hashes().count(), 0);
    }

    #[test]
    fn test_resolve_missing() {
        let c = sample();
        assert!(c.resolve("body", "striped", "siamese").is_none());
        assert!(c.resolve("tail", "striped", "default").is_none());
    }

    #[test]
    fn test_allele_ranges_follow_cardinality() {
        let mut c = sample();
        let ranges = c.allele_ranges();
        assert_eq!(ranges.get(Locus::Breed).unwrap().max.to_u16(), 1);
        assert_eq!(ranges.get(Locus::BodyAttribute).unwrap().max.to_u16(), 1);
        assert_eq!(ranges.get(Locus::EarsAttribute).unwrap().max.to_u16(), 0);
        assert!(ranges.get(Locus::TailAttribute).is_none());

        c.add_attribute("ears", "floppy").unwrap();
        assert_eq!(c.allele_ranges().get(Locus::EarsAttribute).unwrap().max.to_u16(), 1);
    }

    #[test]
    fn test_export_import_preserves_order() {
        let c = sample();
        let back = LayerCatalog::import(&c.export()).unwrap();
        assert_eq!(back.breeds().collect::<Vec<_>>(), vec!["default", "siamese"]);
        assert_eq!(
            back.categories().map(TraitLayers::name).collect::<Vec<_>>(),
            vec!["body", "ears"]
        );
        assert_eq!(back.category("body").unwrap().attribute_index("spotted"), Some(1));
        assert_eq!(
            back.resolve("body", "striped", "default"),
            c.resolve("body", "striped", "default")
        );
        assert_eq!(back.export(), c.export());
    }

    #[test]
    fn test_import_rejects_duplicates() {
        let mut enc = Encoder::with_version(LAYERS_VERSION);
        enc.put_count(2);
        enc.put_str("default");
        enc.put_str("default");
        enc.put_count(0);
        assert!(LayerCatalog::import(&enc.finish()).unwrap_err().is_already_exists());
    }

    #[test]
    fn test_import_rejects_bad_version() {
        let mut raw = LayerCatalog::new().export();
        raw[0] = 9;
        assert!(matches!(LayerCatalog::import(&raw), Err(KittyError::InvalidVersion { actual: 9, .. })));
        assert!(matches!(LayerCatalog::import(&[]), Err(KittyError::InvalidSize { .. })));
    }
}
