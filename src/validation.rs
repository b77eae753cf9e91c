//! Validation System - Rule/Policy Separation
//!
//! Rules inspect a DNA against the catalog's allele ranges and produce
//! structured violations; the validator collects them into a result. This
//! is an up-front check: generation enforces the same bounds on its own.

use serde::{Deserialize, Serialize};

use crate::genetics::{AlleleRanges, Dna, DNA_VERSION};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ViolationSeverity {
    Error,
    Warning,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationViolation {
    pub rule: String,
    pub severity: ViolationSeverity,
    pub message: String,
    pub expected: Option<String>,
    pub actual: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub dna: Dna,
    pub violations: Vec<ValidationViolation>,
}

impl ValidationResult {
    pub fn has_errors(&self) -> bool {
        self.violations.iter().any(|v| v.severity == ViolationSeverity::Error)
    }
}

/// Validation rule trait - produces violations
pub trait ValidationRule: Send + Sync {
    fn name(&self) -> &'static str;
    fn validate(&self, dna: &Dna, ranges: &AlleleRanges) -> Vec<ValidationViolation>;
}

// --- Concrete Rules ---

pub struct VersionRule;

impl ValidationRule for VersionRule {
    fn name(&self) -> &'static str { "dna_version" }

    fn validate(&self, dna: &Dna, _ranges: &AlleleRanges) -> Vec<ValidationViolation> {
        if dna.version() == DNA_VERSION {
            return vec![];
        }
        vec![ValidationViolation {
            rule: self.name().to_string(),
            severity: ViolationSeverity::Error,
            message: "Unsupported DNA version".to_string(),
            expected: Some(DNA_VERSION.to_string()),
            actual: Some(dna.version().to_string()),
        }]
    }
}

/// Every phenotype must select an existing breed or attribute.
pub struct PhenotypeRangeRule;

impl ValidationRule for PhenotypeRangeRule {
    fn name(&self) -> &'static str { "phenotype_range" }

    fn validate(&self, dna: &Dna, ranges: &AlleleRanges) -> Vec<ValidationViolation> {
        let mut violations = vec![];
        for (locus, range) in ranges.iter() {
            let phenotype = dna.phenotype(locus);
            if !range.contains(phenotype) {
                violations.push(ValidationViolation {
                    rule: self.name().to_string(),
                    severity: ViolationSeverity::Error,
                    message: format!("Phenotype out of range for {}", locus),
                    expected: Some(format!("{}..={}", range.min, range.max)),
                    actual: Some(phenotype.to_hex()),
                });
            }
        }
        violations
    }
}

/// Recessive alleles outside the range are legal but cannot be expressed
/// by any catalog entry.
pub struct RecessiveRangeRule;

impl ValidationRule for RecessiveRangeRule {
    fn name(&self) -> &'static str { "recessive_range" }

    fn validate(&self, dna: &Dna, ranges: &AlleleRanges) -> Vec<ValidationViolation> {
        let mut violations = vec![];
        for (locus, range) in ranges.iter() {
            let g = dna.genotype(locus);
            for allele in [g.recessive1, g.recessive2] {
                if !range.contains(allele) {
                    violations.push(ValidationViolation {
                        rule: self.name().to_string(),
                        severity: ViolationSeverity::Warning,
                        message: format!("Recessive allele out of range for {}", locus),
                        expected: Some(format!("{}..={}", range.min, range.max)),
                        actual: Some(allele.to_hex()),
                    });
                }
            }
        }
        violations
    }
}

/// Validator orchestrates rules
pub struct DnaValidator {
    rules: Vec<Box<dyn ValidationRule>>,
}

impl DnaValidator {
    pub fn new() -> Self {
        Self {
            rules: vec![
                Box::new(VersionRule),
                Box::new(PhenotypeRangeRule),
                Box::new(RecessiveRangeRule),
            ],
        }
    }

    pub fn validate(&self, dna: &Dna, ranges: &AlleleRanges) -> ValidationResult {
        let mut violations = vec![];
        for rule in &self.rules {
            violations.extend(rule.validate(dna, ranges));
        }
        // Warnings never block
        let valid = !violations.iter().any(|v| v.severity == ViolationSeverity::Error);
        ValidationResult { valid, dna: *dna, violations }
    }
}

impl Default for DnaValidator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genetics::{Allele, AlleleRange, Locus};

    fn ranges() -> AlleleRanges {
        let mut r = AlleleRanges::new();
        r.set(Locus::Breed, AlleleRange::from_count(2).unwrap());
        r.set(Locus::EarsAttribute, AlleleRange::from_count(3).unwrap());
        r
    }

    #[test]
    fn test_valid_dna() {
        let result = DnaValidator::new().validate(&Dna::new(), &ranges());
        assert!(result.valid);
        assert!(result.violations.is_empty());
    }

    #[test]
    fn test_out_of_range_phenotype() {
        let mut dna = Dna::new();
        dna.set_genotype(Locus::EarsAttribute, Allele::MIN, Allele::MIN, Allele::from_u16(3));
        let result = DnaValidator::new().validate(&dna, &ranges());
        assert!(!result.valid);
        assert_eq!(result.violations.len(), 1);
        assert_eq!(result.violations[0].rule, "phenotype_range");
        assert_eq!(result.violations[0].actual.as_deref(), Some("0003"));
    }

    #[test]
    fn test_recessive_out_of_range_is_warning() {
        let mut dna = Dna::new();
        dna.set_genotype(Locus::Breed, Allele::from_u16(9), Allele::MIN, Allele::MIN);
        let result = DnaValidator::new().validate(&dna, &ranges());
        assert!(result.valid);
        assert_eq!(result.violations.len(), 1);
        assert_eq!(result.violations[0].severity, ViolationSeverity::Warning);
        assert!(!result.has_errors());
    }

    #[test]
    fn test_version_rule() {
        let mut dna = Dna::new();
        dna.set_version(1);
        let result = DnaValidator::new().validate(&dna, &ranges());
        assert!(!result.valid);
        assert_eq!(result.violations[0].rule, "dna_version");
    }
}
