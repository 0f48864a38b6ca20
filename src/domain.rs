use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::IdMapError;

/// Kind of UUID handed to a UUID-to-barcode translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum IdType {
    #[default]
    Case,
    File,
}

impl IdType {
    /// Name of the id field in the GDC schema, also used as the relation column.
    pub fn id_field(&self) -> &'static str {
        match self {
            IdType::Case => "case_id",
            IdType::File => "file_id",
        }
    }
}

impl fmt::Display for IdType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdType::Case => write!(f, "case"),
            IdType::File => write!(f, "file"),
        }
    }
}

impl FromStr for IdType {
    type Err = IdMapError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "case" | "case_id" => Ok(IdType::Case),
            "file" | "file_id" => Ok(IdType::File),
            _ => Err(IdMapError::UnknownIdType(value.to_string())),
        }
    }
}

/// Depth of specificity a barcode encodes, coarse to fine.
///
/// `Portion`/`Analyte` and `Plate`/`Center` are distinct names for the same
/// tier as far as the GDC schema is concerned; see [`Granularity::tier`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    #[default]
    Participant,
    Sample,
    Portion,
    Analyte,
    Plate,
    Center,
}

impl Granularity {
    pub const ALL: [Granularity; 6] = [
        Granularity::Participant,
        Granularity::Sample,
        Granularity::Portion,
        Granularity::Analyte,
        Granularity::Plate,
        Granularity::Center,
    ];

    /// Position on the participant < sample < portion/analyte < plate/center scale.
    pub fn tier(&self) -> u8 {
        match self {
            Granularity::Participant => 0,
            Granularity::Sample => 1,
            Granularity::Portion | Granularity::Analyte => 2,
            Granularity::Plate | Granularity::Center => 3,
        }
    }

    /// Number of barcode segments a barcode cut at this level carries.
    pub fn segment_count(&self) -> usize {
        match self {
            Granularity::Participant => 3,
            Granularity::Sample => 4,
            Granularity::Portion | Granularity::Analyte => 5,
            Granularity::Plate => 6,
            Granularity::Center => 7,
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Granularity::Participant => "participant",
            Granularity::Sample => "sample",
            Granularity::Portion => "portion",
            Granularity::Analyte => "analyte",
            Granularity::Plate => "plate",
            Granularity::Center => "center",
        };
        write!(f, "{name}")
    }
}

impl FromStr for Granularity {
    type Err = IdMapError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "participant" => Ok(Granularity::Participant),
            "sample" => Ok(Granularity::Sample),
            "portion" => Ok(Granularity::Portion),
            "analyte" => Ok(Granularity::Analyte),
            "plate" => Ok(Granularity::Plate),
            "center" => Ok(Granularity::Center),
            _ => Err(IdMapError::UnknownGranularity(value.to_string())),
        }
    }
}
