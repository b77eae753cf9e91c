//! Genetics - allele, genotype and DNA encoding.

pub mod allele;
pub mod dna;
pub mod genotype;
pub mod locus;
pub mod ranges;

pub use allele::{Allele, ALLELE_LEN};
pub use dna::{Dna, DnaBreakdown, DNA_HEX_LEN, DNA_LEN, DNA_VERSION};
pub use genotype::{Genotype, GenotypeBreakdown, GENOTYPE_LEN};
pub use locus::Locus;
pub use ranges::{AlleleRange, AlleleRanges};
