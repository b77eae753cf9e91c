//! Kitty compositor - DNA + catalog + images -> raster image.
//!
//! Resolution runs to completion before any pixel is drawn, so a DNA that
//! names a missing attribute or layer fails without doing image work. The
//! catalog and image store are only read; one snapshot can serve any number
//! of concurrent calls.
//!
//! Draw order:
//! 1. fur: body colour A, then body colour B seen through the pattern mask
//! 2. ears, tail, body, nose, each with the fur as area background
//! 3. eyes: eye colour seen through the eye attribute
//!
//! Pixels are straight-alpha RGBA8 blended source-over in integer
//! arithmetic, so output is bit-identical across runs and platforms.

use image::{ImageFormat, Rgba, RgbaImage};
use serde::Serialize;
use tracing::{debug, error};

use crate::config::GeneratorConfig;
use crate::error::{KittyError, Result};
use crate::genetics::{Dna, Locus};
use crate::hashing::ContentHash;
use crate::images::ImageStore;
use crate::layers::{Layer, LayerCatalog};

/// A trait locus resolved down to the layer that will be drawn.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedTrait<'c> {
    pub locus: Locus,
    pub category: &'static str,
    pub attribute: &'c str,
    /// Breed of the layer actually used; differs from the kitty's breed on
    /// fallback to the default breed.
    pub layer_breed: &'c str,
    #[serde(skip)]
    pub layer: &'c Layer,
}

/// Everything generation needs, resolved from one DNA.
#[derive(Debug, Clone, Serialize)]
pub struct KittyPlan<'c> {
    pub breed: &'c str,
    pub traits: Vec<ResolvedTrait<'c>>,
}

impl<'c> KittyPlan<'c> {
    pub fn layer(&self, locus: Locus) -> Option<&'c Layer> {
        self.traits.iter().find(|t| t.locus == locus).map(|t| t.layer)
    }
}

pub struct Compositor<'c> {
    catalog: &'c LayerCatalog,
    images: &'c ImageStore,
    config: &'c GeneratorConfig,
}

impl<'c> Compositor<'c> {
    pub fn new(catalog: &'c LayerCatalog, images: &'c ImageStore, config: &'c GeneratorConfig) -> Self {
        Self { catalog, images, config }
    }

    /// Resolve breed, attributes and layers for every trait locus.
    ///
    /// Loci whose category is absent from the catalog, or has no
    /// attributes, are left out of the plan and draw nothing. Such loci have
    /// no allele range either.
    pub fn resolve(&self, dna: &Dna) -> Result<KittyPlan<'c>> {
        let breed = self.resolve_breed(dna)?;
        let mut traits = Vec::with_capacity(Locus::TRAITS.len());
        for locus in Locus::TRAITS {
            if let Some(t) = self.resolve_trait(dna, locus, breed)? {
                traits.push(t);
            }
        }
        Ok(KittyPlan { breed, traits })
    }

    fn resolve_breed(&self, dna: &Dna) -> Result<&'c str> {
        let index = dna.phenotype(Locus::Breed).to_u16();
        self.catalog
            .breed(index as usize)
            .ok_or(KittyError::AttributeOutOfRange {
                locus: Locus::Breed.name(),
                index,
                count: self.catalog.breed_count(),
            })
    }

    fn resolve_trait(&self, dna: &Dna, locus: Locus, breed: &'c str) -> Result<Option<ResolvedTrait<'c>>> {
        let Some(category) = locus.category() else {
            return Ok(None);
        };
        let Some(layers) = self.catalog.category(category) else {
            debug!(locus = %locus, category, "trait category not in catalog, skipping");
            return Ok(None);
        };
        if layers.attribute_count() == 0 {
            debug!(locus = %locus, category, "trait category has no attributes, skipping");
            return Ok(None);
        }

        let index = dna.phenotype(locus).to_u16();
        let attribute = layers.attribute(index as usize).ok_or(KittyError::AttributeOutOfRange {
            locus: locus.name(),
            index,
            count: layers.attribute_count(),
        })?;

        let default_breed = self.config.default_breed.as_str();
        let layer = match layers.layer(attribute, breed) {
            Some(layer) => layer,
            None => match layers.layer(attribute, default_breed) {
                Some(layer) => {
                    debug!(category, attribute, breed, "falling back to default breed layer");
                    layer
                }
                None => {
                    error!(category, attribute, breed, "failed to find layer");
                    return Err(KittyError::LayerNotFound {
                        category: category.to_string(),
                        attribute: attribute.to_string(),
                        breed: breed.to_string(),
                    });
                }
            },
        };

        Ok(Some(ResolvedTrait {
            locus,
            category,
            attribute,
            layer_breed: layer.breed(),
            layer,
        }))
    }

    /// Generate the kitty described by `dna`.
    pub fn generate(&self, dna: &Dna) -> Result<RgbaImage> {
        let plan = self.resolve(dna)?;
        let mut out = self.blank();

        let mut fur = self.blank();
        if let Some(layer) = plan.layer(Locus::BodyColorA) {
            draw_over(&mut fur, &self.render_layer(layer, None, None)?);
        }
        let secondary = match plan.layer(Locus::BodyColorB) {
            Some(layer) => Some(self.render_layer(layer, None, None)?),
            None => None,
        };
        if let Some(layer) = plan.layer(Locus::BodyPattern) {
            draw_over(&mut fur, &self.render_layer(layer, secondary.as_ref(), None)?);
        }
        draw_over(&mut out, &fur);

        for locus in [Locus::EarsAttribute, Locus::TailAttribute, Locus::BodyAttribute, Locus::NoseAttribute] {
            if let Some(layer) = plan.layer(locus) {
                draw_over(&mut out, &self.render_layer(layer, Some(&fur), None)?);
            }
        }

        let eye_colour = match plan.layer(Locus::EyesColor) {
            Some(layer) => Some(self.render_layer(layer, None, None)?),
            None => None,
        };
        if let Some(layer) = plan.layer(Locus::EyesAttribute) {
            draw_over(&mut out, &self.render_layer(layer, eye_colour.as_ref(), None)?);
        }

        Ok(out)
    }

    /// Render one layer on a transparent canvas. For each selected part,
    /// the area mask cuts `background` into the canvas, then the outline is
    /// drawn on top. `parts = None` selects every part.
    pub fn render_layer(
        &self,
        layer: &Layer,
        background: Option<&RgbaImage>,
        parts: Option<&[usize]>,
    ) -> Result<RgbaImage> {
        let mut canvas = self.blank();
        for (i, part) in layer.parts().iter().enumerate() {
            if parts.is_some_and(|sel| !sel.contains(&i)) {
                continue;
            }
            if let Some(bg) = background {
                if !part.area.is_empty() {
                    let mask = self.decode(&part.area)?;
                    draw_area(&mut canvas, bg, &mask);
                }
            }
            if !part.outline.is_empty() {
                let outline = self.decode(&part.outline)?;
                draw_over(&mut canvas, &outline);
            }
        }
        Ok(canvas)
    }

    fn decode(&self, hash: &ContentHash) -> Result<RgbaImage> {
        let raw = self
            .images
            .get(hash)
            .ok_or_else(|| KittyError::not_found("image", hash.to_hex()))?;
        Ok(image::load_from_memory_with_format(raw, ImageFormat::Png)?.to_rgba8())
    }

    fn blank(&self) -> RgbaImage {
        RgbaImage::new(self.config.canvas_width, self.config.canvas_height)
    }
}

fn mul255(a: u32, b: u32) -> u32 {
    (a * b + 127) / 255
}

/// Source-over of `src` onto `dst`, with `src` alpha scaled by `coverage`.
fn blend(dst: &mut Rgba<u8>, src: &Rgba<u8>, coverage: u8) {
    let sa = mul255(src[3] as u32, coverage as u32);
    if sa == 0 {
        return;
    }
    let dw = mul255(dst[3] as u32, 255 - sa);
    let oa = sa + dw;
    for c in 0..3 {
        dst[c] = ((src[c] as u32 * sa + dst[c] as u32 * dw + oa / 2) / oa) as u8;
    }
    dst[3] = oa as u8;
}

/// Draw `src` over `dst`, anchored at the origin and clipped to both.
pub fn draw_over(dst: &mut RgbaImage, src: &RgbaImage) {
    let w = dst.width().min(src.width());
    let h = dst.height().min(src.height());
    for y in 0..h {
        for x in 0..w {
            blend(dst.get_pixel_mut(x, y), src.get_pixel(x, y), 255);
        }
    }
}

/// Draw `bg` over `dst` through the alpha channel of `mask`.
pub fn draw_area(dst: &mut RgbaImage, bg: &RgbaImage, mask: &RgbaImage) {
    let w = dst.width().min(bg.width()).min(mask.width());
    let h = dst.height().min(bg.height()).min(mask.height());
    for y in 0..h {
        for x in 0..w {
            let coverage = mask.get_pixel(x, y)[3];
            blend(dst.get_pixel_mut(x, y), bg.get_pixel(x, y), coverage);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genetics::Allele;
    use std::io::Cursor;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
    const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);
    const CLEAR: Rgba<u8> = Rgba([0, 0, 0, 0]);

    fn png(img: &RgbaImage) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    /// `w`x`h` image, `fill` on the left half, transparent elsewhere.
    fn half(w: u32, h: u32, fill: Rgba<u8>) -> RgbaImage {
        RgbaImage::from_fn(w, h, |x, _| if x < w / 2 { fill } else { CLEAR })
    }

    fn config() -> GeneratorConfig {
        GeneratorConfig::default().with_canvas(4, 4)
    }

    fn dna_with(pairs: &[(Locus, u16)]) -> Dna {
        let mut dna = Dna::new();
        for &(locus, v) in pairs {
            dna.set_genotype(locus, Allele::MIN, Allele::MIN, Allele::from_u16(v));
        }
        dna
    }

    #[test]
    fn test_blend_opaque_and_transparent() {
        let mut px = BLUE;
        blend(&mut px, &RED, 255);
        assert_eq!(px, RED);

        let mut px = BLUE;
        blend(&mut px, &RED, 0);
        assert_eq!(px, BLUE);

        let mut px = CLEAR;
        blend(&mut px, &Rgba([10, 20, 30, 128]), 255);
        assert_eq!(px, Rgba([10, 20, 30, 128]));
    }

    #[test]
    fn test_draw_area_uses_mask_alpha() {
        let mut dst = RgbaImage::new(4, 4);
        let bg = RgbaImage::from_pixel(4, 4, RED);
        draw_area(&mut dst, &bg, &half(4, 4, BLUE));
        assert_eq!(*dst.get_pixel(0, 0), RED);
        assert_eq!(*dst.get_pixel(3, 0), CLEAR);
    }

    #[test]
    fn test_draw_over_clips_to_smaller_image() {
        let mut dst = RgbaImage::new(4, 4);
        draw_over(&mut dst, &RgbaImage::from_pixel(2, 2, RED));
        assert_eq!(*dst.get_pixel(1, 1), RED);
        assert_eq!(*dst.get_pixel(2, 2), CLEAR);
    }

    #[test]
    fn test_outline_only_kitty() {
        let config = config();
        let mut images = ImageStore::new();
        let outline = half(4, 4, RED);
        let hash = images.add_or_reuse(png(&outline));

        let mut catalog = LayerCatalog::new();
        catalog.add_trait_category("body").unwrap();
        catalog.add_breed("default").unwrap();
        catalog.add_attribute("body", "striped").unwrap();
        catalog.upsert_layer("body", "striped", "default").unwrap().set_outline(0, hash);

        let img = Compositor::new(&catalog, &images, &config).generate(&Dna::new()).unwrap();
        assert_eq!(img, outline);
    }

    #[test]
    fn test_area_cuts_fur_colour() {
        let config = config();
        let mut images = ImageStore::new();
        let solid_red = images.add_or_reuse(png(&RgbaImage::from_pixel(4, 4, RED)));
        let mask = images.add_or_reuse(png(&half(4, 4, BLUE)));

        let mut catalog = LayerCatalog::new();
        catalog.add_breed("default").unwrap();
        for (cat, attr) in [("body_color_a", "red"), ("body", "round")] {
            catalog.add_trait_category(cat).unwrap();
            catalog.add_attribute(cat, attr).unwrap();
        }
        catalog.upsert_layer("body_color_a", "red", "default").unwrap().set_outline(0, solid_red);
        catalog.upsert_layer("body", "round", "default").unwrap().set_area(0, mask);

        let compositor = Compositor::new(&catalog, &images, &config);
        let body = compositor
            .render_layer(catalog.resolve("body", "round", "default").unwrap(), Some(&RgbaImage::from_pixel(4, 4, RED)), None)
            .unwrap();
        assert_eq!(*body.get_pixel(0, 0), RED);
        assert_eq!(*body.get_pixel(3, 3), CLEAR);

        let img = compositor.generate(&Dna::new()).unwrap();
        assert_eq!(*img.get_pixel(3, 3), RED);
    }

    #[test]
    fn test_part_selection() {
        let config = config();
        let mut images = ImageStore::new();
        let left = images.add_or_reuse(png(&half(4, 4, RED)));
        let mut layer = Layer::new("ear", "default");
        layer.set_outline(1, left);

        let catalog = LayerCatalog::new();
        let compositor = Compositor::new(&catalog, &images, &config);
        let none = compositor.render_layer(&layer, None, Some(&[0])).unwrap();
        assert!(none.pixels().all(|p| *p == CLEAR));
        let some = compositor.render_layer(&layer, None, Some(&[1])).unwrap();
        assert_eq!(*some.get_pixel(0, 0), RED);
    }

    #[test]
    fn test_resolution_failures() {
        let config = config();
        let images = ImageStore::new();
        let mut catalog = LayerCatalog::new();
        catalog.add_trait_category("ears").unwrap();
        catalog.add_breed("default").unwrap();
        catalog.add_breed("siamese").unwrap();
        catalog.add_attribute("ears", "pointy").unwrap();
        catalog.add_attribute("ears", "floppy").unwrap();
        catalog.upsert_layer("ears", "pointy", "default").unwrap();

        let compositor = Compositor::new(&catalog, &images, &config);

        let err = compositor.resolve(&dna_with(&[(Locus::Breed, 2)])).unwrap_err();
        assert!(matches!(err, KittyError::AttributeOutOfRange { index: 2, count: 2, .. }));

        let err = compositor.resolve(&dna_with(&[(Locus::EarsAttribute, 2)])).unwrap_err();
        assert!(matches!(err, KittyError::AttributeOutOfRange { index: 2, count: 2, .. }));

        let err = compositor.resolve(&dna_with(&[(Locus::EarsAttribute, 1)])).unwrap_err();
        assert!(matches!(err, KittyError::LayerNotFound { .. }));

        let plan = compositor.resolve(&dna_with(&[(Locus::Breed, 1)])).unwrap();
        assert_eq!(plan.breed, "siamese");
        assert_eq!(plan.traits.len(), 1);
        assert_eq!(plan.traits[0].attribute, "pointy");
        assert_eq!(plan.traits[0].layer_breed, "default");
    }

    #[test]
    fn test_empty_category_is_skipped() {
        let config = config();
        let images = ImageStore::new();
        let mut catalog = LayerCatalog::new();
        catalog.add_trait_category("ears").unwrap();
        catalog.add_trait_category("tail").unwrap();
        catalog.add_breed("default").unwrap();
        catalog.add_attribute("ears", "pointy").unwrap();
        catalog.upsert_layer("ears", "pointy", "default").unwrap();

        let compositor = Compositor::new(&catalog, &images, &config);
        let plan = compositor.resolve(&Dna::new()).unwrap();
        assert_eq!(plan.traits.len(), 1);
        assert!(plan.layer(Locus::TailAttribute).is_none());

        // Empty categories carry no range, so any value there is accepted
        let plan = compositor.resolve(&dna_with(&[(Locus::TailAttribute, 7)])).unwrap();
        assert_eq!(plan.traits[0].category, "ears");
    }

    #[test]
    fn test_missing_image_is_not_found() {
        let config = config();
        let images = ImageStore::new();
        let catalog = LayerCatalog::new();
        let mut layer = Layer::new("a", "default");
        layer.set_outline(0, ContentHash::of(b"gone"));
        let err = Compositor::new(&catalog, &images, &config)
            .render_layer(&layer, None, None)
            .unwrap_err();
        assert!(matches!(err, KittyError::NotFound { kind: "image", .. }));
    }
}
