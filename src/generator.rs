//! Generator - single entry point tying config, catalog and images together.
//!
//! The write path (`compile`) builds a container once; the read path
//! (`generate_kitty`, `allele_ranges`, `validate_dna`) only borrows it.

use std::io::{Read, Write};
use std::path::Path;

use chrono::{DateTime, Utc};
use image::RgbaImage;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::compiler::{CatalogCompiler, CompileReport};
use crate::compositor::{Compositor, KittyPlan};
use crate::config::GeneratorConfig;
use crate::container::{Container, CONTAINER_VERSION};
use crate::error::Result;
use crate::genetics::{AlleleRanges, Dna};
use crate::hashing::{compute_manifest_hash, sha256_hex};
use crate::validation::{DnaValidator, ValidationResult};
use crate::ENGINE_VERSION;

/// Description of a compiled container, written alongside it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogManifest {
    pub engine_version: String,
    pub container_version: u16,
    pub created_at: DateTime<Utc>,
    /// SHA-256 of the exported container bytes.
    pub container_hash: String,
    pub breeds: Vec<String>,
    pub categories: Vec<CategorySummary>,
    pub image_count: usize,
    pub allele_ranges: AlleleRanges,
    /// Computed last, over everything above.
    pub manifest_hash: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategorySummary {
    pub name: String,
    pub attributes: Vec<String>,
    pub layer_count: usize,
}

/// Validation plus layer resolution for one DNA.
#[derive(Debug, Serialize)]
pub struct DnaCheck<'c> {
    pub validation: ValidationResult,
    pub plan: Option<KittyPlan<'c>>,
    /// Resolution failure for a DNA that passed validation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DnaCheck<'_> {
    pub fn is_ok(&self) -> bool {
        self.validation.valid && self.plan.is_some()
    }
}

pub struct Generator {
    config: GeneratorConfig,
    container: Container,
    validator: DnaValidator,
}

impl Generator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self::with_container(config, Container::default())
    }

    pub fn with_container(config: GeneratorConfig, container: Container) -> Self {
        Self { config, container, validator: DnaValidator::new() }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn container(&self) -> &Container {
        &self.container
    }

    /// Compile an artwork tree into this generator's catalog and images.
    pub fn compile(&mut self, root: &Path) -> Result<CompileReport> {
        let Container { images, catalog } = &mut self.container;
        CatalogCompiler::new(&self.config).compile(root, catalog, images)
    }

    pub fn import<R: Read>(&mut self, r: R) -> Result<()> {
        self.container = Container::read_from(r)?;
        Ok(())
    }

    pub fn export<W: Write>(&self, w: W) -> Result<()> {
        self.container.write_to(w)
    }

    pub fn allele_ranges(&self) -> AlleleRanges {
        self.container.catalog.allele_ranges()
    }

    pub fn random_dna<R: Rng + ?Sized>(&self, rng: &mut R) -> Dna {
        self.allele_ranges().random_dna(rng)
    }

    pub fn validate_dna(&self, dna: &Dna) -> ValidationResult {
        self.validator.validate(dna, &self.allele_ranges())
    }

    fn compositor(&self) -> Compositor<'_> {
        Compositor::new(&self.container.catalog, &self.container.images, &self.config)
    }

    pub fn resolve(&self, dna: &Dna) -> Result<KittyPlan<'_>> {
        self.compositor().resolve(dna)
    }

    /// Validate `dna`, then resolve its layers if it passed.
    pub fn check_dna(&self, dna: &Dna) -> DnaCheck<'_> {
        let validation = self.validate_dna(dna);
        if !validation.valid {
            return DnaCheck { validation, plan: None, error: None };
        }
        match self.resolve(dna) {
            Ok(plan) => DnaCheck { validation, plan: Some(plan), error: None },
            Err(e) => DnaCheck { validation, plan: None, error: Some(e.to_string()) },
        }
    }

    pub fn generate_kitty(&self, dna: &Dna) -> Result<RgbaImage> {
        self.compositor().generate(dna)
    }

    pub fn manifest(&self) -> Result<CatalogManifest> {
        let catalog = &self.container.catalog;
        let mut manifest = CatalogManifest {
            engine_version: ENGINE_VERSION.to_string(),
            container_version: CONTAINER_VERSION,
            created_at: Utc::now(),
            container_hash: sha256_hex(&self.container.export()),
            breeds: catalog.breeds().map(str::to_string).collect(),
            categories: catalog
                .categories()
                .map(|c| CategorySummary {
                    name: c.name().to_string(),
                    attributes: c.attributes().map(str::to_string).collect(),
                    layer_count: c.layer_count(),
                })
                .collect(),
            image_count: self.container.images.len(),
            allele_ranges: catalog.allele_ranges(),
            manifest_hash: String::new(), // Computed after
        };
        manifest.manifest_hash = compute_manifest_hash(&manifest)?;
        Ok(manifest)
    }
}

impl Default for Generator {
    fn default() -> Self {
        Self::new(GeneratorConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genetics::{Allele, Locus};
    use std::fs;

    #[test]
    fn test_compile_export_import() {
        let dir = tempfile::tempdir().unwrap();
        let breed_dir = dir.path().join("ears").join("default");
        fs::create_dir_all(&breed_dir).unwrap();
        fs::write(breed_dir.join("pointy_outline.png"), b"not decoded here").unwrap();

        let mut generator = Generator::default();
        let report = generator.compile(dir.path()).unwrap();
        assert_eq!(report.files_compiled, 1);

        let mut buf = Vec::new();
        generator.export(&mut buf).unwrap();

        let mut loaded = Generator::default();
        loaded.import(buf.as_slice()).unwrap();
        assert_eq!(loaded.allele_ranges(), generator.allele_ranges());
        assert_eq!(loaded.allele_ranges().get(Locus::EarsAttribute).unwrap().max.to_u16(), 0);
    }

    #[test]
    fn test_check_dna_reports_resolution_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("ears").join("default")).unwrap();
        let siamese = dir.path().join("ears").join("siamese");
        fs::create_dir_all(&siamese).unwrap();
        fs::write(siamese.join("floppy_outline.png"), b"x").unwrap();

        let mut generator = Generator::default();
        generator.compile(dir.path()).unwrap();

        let check = generator.check_dna(&Dna::new());
        assert!(check.validation.valid);
        assert!(check.plan.is_none());
        assert!(!check.is_ok());
        assert!(check.error.as_deref().unwrap().contains("floppy"));
        let json = serde_json::to_value(&check).unwrap();
        assert!(json["error"].is_string());

        let mut dna = Dna::new();
        dna.set_genotype(Locus::Breed, Allele::MIN, Allele::MIN, Allele::from_u16(1));
        let check = generator.check_dna(&dna);
        assert!(check.is_ok());
        assert_eq!(check.plan.unwrap().traits[0].layer_breed, "siamese");
    }

    #[test]
    fn test_check_dna_invalid_skips_resolution() {
        let generator = Generator::default();
        let mut dna = Dna::new();
        dna.set_version(3);
        let check = generator.check_dna(&dna);
        assert!(!check.validation.valid);
        assert!(check.error.is_none());
        assert!(serde_json::to_value(&check).unwrap().get("error").is_none());
    }

    #[test]
    fn test_manifest_hash_reproducible() {
        let generator = Generator::default();
        let m = generator.manifest().unwrap();
        assert_eq!(m.container_version, 0);
        assert!(m.breeds.is_empty());
        assert_eq!(m.manifest_hash.len(), 64);
        assert_eq!(m.container_hash, sha256_hex(&generator.container().export()));

        let mut unhashed = m.clone();
        unhashed.manifest_hash = String::new();
        assert_eq!(compute_manifest_hash(&unhashed).unwrap(), m.manifest_hash);
    }
}
