//! Locus - fixed trait slots within the DNA.
//!
//! Offsets are a property of DNA version 0 and are not configurable.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::genotype::GENOTYPE_LEN;

/// Byte 0 of every DNA carries its format version.
pub const DNA_VERSION_LEN: usize = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Locus {
    Breed,
    BodyAttribute,
    BodyColorA,
    BodyColorB,
    BodyPattern,
    EarsAttribute,
    EyesAttribute,
    EyesColor,
    NoseAttribute,
    TailAttribute,
    ReservedA,
    ReservedB,
}

impl Locus {
    /// Schema order. Position in this table defines the byte offset.
    pub const ALL: [Locus; 12] = [
        Locus::Breed,
        Locus::BodyAttribute,
        Locus::BodyColorA,
        Locus::BodyColorB,
        Locus::BodyPattern,
        Locus::EarsAttribute,
        Locus::EyesAttribute,
        Locus::EyesColor,
        Locus::NoseAttribute,
        Locus::TailAttribute,
        Locus::ReservedA,
        Locus::ReservedB,
    ];

    /// Loci that select artwork from a trait category.
    pub const TRAITS: [Locus; 9] = [
        Locus::BodyAttribute,
        Locus::BodyColorA,
        Locus::BodyColorB,
        Locus::BodyPattern,
        Locus::EarsAttribute,
        Locus::EyesAttribute,
        Locus::EyesColor,
        Locus::NoseAttribute,
        Locus::TailAttribute,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn offset(self) -> usize {
        DNA_VERSION_LEN + self.index() * GENOTYPE_LEN
    }

    /// Key used in JSON views (allele ranges, breakdowns).
    pub const fn name(self) -> &'static str {
        match self {
            Locus::Breed => "breed",
            Locus::BodyAttribute => "body_attribute",
            Locus::BodyColorA => "body_color_a",
            Locus::BodyColorB => "body_color_b",
            Locus::BodyPattern => "body_pattern",
            Locus::EarsAttribute => "ears_attribute",
            Locus::EyesAttribute => "eyes_attribute",
            Locus::EyesColor => "eyes_color",
            Locus::NoseAttribute => "nose_attribute",
            Locus::TailAttribute => "tail_attribute",
            Locus::ReservedA => "reserved_a",
            Locus::ReservedB => "reserved_b",
        }
    }

    /// Name of the trait-category directory this locus indexes into.
    pub const fn category(self) -> Option<&'static str> {
        match self {
            Locus::BodyAttribute => Some("body"),
            Locus::BodyColorA => Some("body_color_a"),
            Locus::BodyColorB => Some("body_color_b"),
            Locus::BodyPattern => Some("body_pattern"),
            Locus::EarsAttribute => Some("ears"),
            Locus::EyesAttribute => Some("eyes"),
            Locus::EyesColor => Some("eyes_color"),
            Locus::NoseAttribute => Some("nose"),
            Locus::TailAttribute => Some("tail"),
            Locus::Breed | Locus::ReservedA | Locus::ReservedB => None,
        }
    }

    pub const fn is_reserved(self) -> bool {
        matches!(self, Locus::ReservedA | Locus::ReservedB)
    }
}

impl fmt::Display for Locus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
