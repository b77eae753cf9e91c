//! Genotype - three alleles at one locus.
//!
//! Layout is `[recessive1][recessive2][dominant]`. Only the dominant allele
//! (the phenotype) is read by generation; the recessive pair is carried for
//! breeding, which this crate does not implement.

use serde::{Deserialize, Serialize};

use super::allele::{Allele, ALLELE_LEN};

pub const GENOTYPE_LEN: usize = ALLELE_LEN * 3;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Genotype {
    pub recessive1: Allele,
    pub recessive2: Allele,
    pub dominant: Allele,
}

impl Genotype {
    pub fn new(recessive1: Allele, recessive2: Allele, dominant: Allele) -> Self {
        Self { recessive1, recessive2, dominant }
    }

    pub fn from_bytes(raw: &[u8; GENOTYPE_LEN]) -> Self {
        Self {
            recessive1: Allele::from_bytes([raw[0], raw[1]]),
            recessive2: Allele::from_bytes([raw[2], raw[3]]),
            dominant: Allele::from_bytes([raw[4], raw[5]]),
        }
    }

    pub fn to_bytes(&self) -> [u8; GENOTYPE_LEN] {
        let mut out = [0u8; GENOTYPE_LEN];
        out[0..2].copy_from_slice(self.recessive1.as_bytes());
        out[2..4].copy_from_slice(self.recessive2.as_bytes());
        out[4..6].copy_from_slice(self.dominant.as_bytes());
        out
    }

    /// The expressed allele: always the dominant one.
    pub fn phenotype(&self) -> Allele {
        self.dominant
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    pub fn breakdown(&self) -> GenotypeBreakdown {
        GenotypeBreakdown {
            r1: self.recessive1,
            r2: self.recessive2,
            d: self.dominant,
        }
    }
}

/// Human-readable view of a genotype, one hex string per allele.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenotypeBreakdown {
    pub r1: Allele,
    pub r2: Allele,
    pub d: Allele,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phenotype_is_dominant() {
        let g = Genotype::new(Allele::from_u16(7), Allele::from_u16(8), Allele::from_u16(9));
        assert_eq!(g.phenotype().to_u16(), 9);
    }

    #[test]
    fn test_byte_layout() {
        let g = Genotype::new(Allele::from_u16(1), Allele::from_u16(0x0203), Allele::from_u16(511));
        assert_eq!(g.to_bytes(), [0, 1, 2, 3, 1, 255]);
        assert_eq!(Genotype::from_bytes(&g.to_bytes()), g);
        assert_eq!(g.to_hex(), "0001020301ff");
    }

    #[test]
    fn test_breakdown_json() {
        let g = Genotype::new(Allele::from_u16(1), Allele::from_u16(2), Allele::from_u16(3));
        let json = serde_json::to_string(&g.breakdown()).unwrap();
        assert_eq!(json, r#"{"r1":"0001","r2":"0002","d":"0003"}"#);
    }
}
