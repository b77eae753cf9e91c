//! Kitty Generator Core - DNA to collectible creature artwork
//!
//! # Pipeline
//! 1. Compile: artwork tree -> layer catalog + content-addressed images
//! 2. Persist: both bundled into one versioned container
//! 3. Generate: DNA phenotypes select layers, composited in fixed order
//!
//! Generation reads only the dominant allele of each genotype.

pub mod codec;
pub mod compiler;
pub mod compositor;
pub mod config;
pub mod container;
pub mod error;
pub mod generator;
pub mod genetics;
pub mod hashing;
pub mod images;
pub mod layers;
pub mod ordered;
pub mod validation;

pub use compiler::{ArtworkName, CatalogCompiler, Channel, CompileReport};
pub use compositor::{Compositor, KittyPlan, ResolvedTrait};
pub use config::GeneratorConfig;
pub use container::Container;
pub use error::{KittyError, Result};
pub use generator::{CatalogManifest, DnaCheck, Generator};
pub use genetics::{Allele, AlleleRange, AlleleRanges, Dna, Genotype, Locus};
pub use hashing::{canonical_json, compute_manifest_hash, ContentHash};
pub use images::ImageStore;
pub use layers::{Layer, LayerCatalog, Part, TraitLayers};
pub use validation::{DnaValidator, ValidationResult, ValidationViolation, ViolationSeverity};

pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");
