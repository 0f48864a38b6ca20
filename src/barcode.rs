//! Grammar of TCGA specimen barcodes.
//!
//! A barcode such as `TCGA-02-0001-01C-01D-0182-01` is a sequence of
//! segments: project, tissue source site, participant, sample+vial,
//! portion+analyte, plate and center. The delimiter is whatever
//! non-alphanumeric character the batch uses.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::domain::Granularity;
use crate::error::IdMapError;

pub const PROJECT_PREFIX: &str = "TCGA";

pub const MIN_SEGMENTS: usize = 3;
pub const MAX_SEGMENTS: usize = 7;

static CODE_WITH_LETTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{2})([A-Z])?$").expect("static regex"));

const SAMPLE_TYPES: &[(&str, &str)] = &[
    ("01", "Primary Solid Tumor"),
    ("02", "Recurrent Solid Tumor"),
    ("03", "Primary Blood Derived Cancer - Peripheral Blood"),
    ("04", "Recurrent Blood Derived Cancer - Bone Marrow"),
    ("05", "Additional - New Primary"),
    ("06", "Metastatic"),
    ("07", "Additional Metastatic"),
    ("08", "Human Tumor Original Cells"),
    ("09", "Primary Blood Derived Cancer - Bone Marrow"),
    ("10", "Blood Derived Normal"),
    ("11", "Solid Tissue Normal"),
    ("12", "Buccal Cell Normal"),
    ("13", "EBV Immortalized Normal"),
    ("14", "Bone Marrow Normal"),
    ("20", "Control Analyte"),
    ("40", "Recurrent Blood Derived Cancer - Peripheral Blood"),
    ("50", "Cell Lines"),
    ("60", "Primary Xenograft Tissue"),
    ("61", "Cell Line Derived Xenograft Tissue"),
];

/// Returns the first non-alphanumeric character of `barcode`.
pub fn detect_delimiter(barcode: &str) -> Result<char, IdMapError> {
    barcode
        .chars()
        .find(|ch| !ch.is_ascii_alphanumeric())
        .ok_or_else(|| IdMapError::MalformedBarcode(vec![barcode.to_string()]))
}

fn segments(barcode: &str, delimiter: char) -> Vec<&str> {
    barcode.split(delimiter).collect()
}

/// Infers the granularity shared by every barcode in `barcodes`.
///
/// The delimiter is detected on the first barcode and applied to the whole
/// batch. Batches whose barcodes split into different segment counts are
/// rejected rather than resolved to one of the levels.
pub fn classify_granularity<S: AsRef<str>>(barcodes: &[S]) -> Result<Granularity, IdMapError> {
    let first = barcodes
        .first()
        .ok_or_else(|| IdMapError::MalformedBarcode(vec!["<empty batch>".to_string()]))?;
    let first: &str = first.as_ref();
    let delimiter = detect_delimiter(first)?;

    let mut counts = BTreeSet::new();
    for barcode in barcodes {
        let barcode: &str = barcode.as_ref();
        counts.insert(barcode.split(delimiter).count());
    }
    if counts.len() > 1 {
        return Err(IdMapError::InconsistentBarcodeLength {
            counts: counts.into_iter().collect(),
        });
    }

    match counts.into_iter().next().unwrap_or_default() {
        0..=3 => Ok(Granularity::Participant),
        4 => Ok(Granularity::Sample),
        5 => Ok(Granularity::Portion),
        6 | 7 => Ok(Granularity::Plate),
        _ => Err(IdMapError::MalformedBarcode(owned(barcodes))),
    }
}

/// Checks prefix, delimiter and minimum length of every barcode, reporting all offenders.
///
/// Each barcode is first checked against its own delimiter. The batch
/// delimiter is the one most of those well-formed barcodes share (the
/// earliest seen on a tie), and well-formed barcodes using another one are
/// reported too.
pub fn validate<S: AsRef<str>>(barcodes: &[S]) -> Result<(), IdMapError> {
    let shapes = barcodes
        .iter()
        .map(|barcode| {
            let barcode: &str = barcode.as_ref();
            (barcode, shape_delimiter(barcode))
        })
        .collect::<Vec<_>>();

    let mut tally: Vec<(char, usize)> = Vec::new();
    for delimiter in shapes.iter().filter_map(|(_, delimiter)| *delimiter) {
        match tally.iter_mut().find(|(seen, _)| *seen == delimiter) {
            Some((_, count)) => *count += 1,
            None => tally.push((delimiter, 1)),
        }
    }
    let mut batch_delimiter: Option<(char, usize)> = None;
    for (delimiter, count) in tally {
        if batch_delimiter.is_none_or(|(_, best)| count > best) {
            batch_delimiter = Some((delimiter, count));
        }
    }
    let batch_delimiter = batch_delimiter.map(|(delimiter, _)| delimiter);

    let offending = shapes
        .into_iter()
        .filter(|(_, delimiter)| delimiter.is_none() || *delimiter != batch_delimiter)
        .map(|(barcode, _)| barcode.to_string())
        .collect::<Vec<_>>();

    if offending.is_empty() {
        Ok(())
    } else {
        Err(IdMapError::MalformedBarcode(offending))
    }
}

fn owned<S: AsRef<str>>(barcodes: &[S]) -> Vec<String> {
    barcodes
        .iter()
        .map(|barcode| {
            let barcode: &str = barcode.as_ref();
            barcode.to_string()
        })
        .collect()
}

/// Delimiter of `barcode` when it carries the project prefix and enough segments.
fn shape_delimiter(barcode: &str) -> Option<char> {
    let delimiter = detect_delimiter(barcode).ok()?;
    let parts = segments(barcode, delimiter);
    (parts.len() >= MIN_SEGMENTS && parts[0] == PROJECT_PREFIX).then_some(delimiter)
}

/// Cuts `barcode` down to the segments that identify it at `level`.
pub fn truncate(barcode: &str, level: Granularity) -> Result<String, IdMapError> {
    let delimiter = detect_delimiter(barcode)?;
    let parts = segments(barcode, delimiter);
    let keep = level.segment_count();
    if parts.len() < keep {
        return Err(IdMapError::MalformedBarcode(vec![barcode.to_string()]));
    }
    let separator = delimiter.to_string();
    Ok(parts[..keep].join(separator.as_str()))
}

/// Human-readable definition of a two-digit sample type code.
pub fn sample_definition(code: &str) -> Option<&'static str> {
    SAMPLE_TYPES
        .iter()
        .find(|(key, _)| *key == code)
        .map(|(_, definition)| *definition)
}

/// A barcode broken into its biospecimen components.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Biospecimen {
    pub barcode: String,
    pub delimiter: char,
    pub project: String,
    pub tissue_source_site: String,
    pub participant: String,
    pub sample_type: Option<String>,
    pub vial: Option<char>,
    pub portion: Option<String>,
    pub analyte: Option<char>,
    pub plate: Option<String>,
    pub center: Option<String>,
}

impl Biospecimen {
    /// Decomposes one barcode; every segment present must have its expected shape.
    pub fn parse(barcode: &str) -> Result<Self, IdMapError> {
        let malformed = || IdMapError::MalformedBarcode(vec![barcode.to_string()]);
        let delimiter = shape_delimiter(barcode).ok_or_else(malformed)?;
        let parts = segments(barcode, delimiter);
        if parts.len() > MAX_SEGMENTS {
            return Err(malformed());
        }

        let (sample_type, vial) = match parts.get(3) {
            Some(segment) => {
                let (code, letter) = split_code(segment).ok_or_else(malformed)?;
                (Some(code), letter)
            }
            None => (None, None),
        };
        let (portion, analyte) = match parts.get(4) {
            Some(segment) => {
                let (code, letter) = split_code(segment).ok_or_else(malformed)?;
                (Some(code), letter)
            }
            None => (None, None),
        };

        Ok(Self {
            barcode: barcode.to_string(),
            delimiter,
            project: parts[0].to_string(),
            tissue_source_site: parts[1].to_string(),
            participant: parts[2].to_string(),
            sample_type,
            vial,
            portion,
            analyte,
            plate: parts.get(5).map(|s| s.to_string()),
            center: parts.get(6).map(|s| s.to_string()),
        })
    }

    /// The `PROJECT-TSS-PARTICIPANT` prefix.
    pub fn participant_barcode(&self) -> String {
        let d = self.delimiter;
        format!(
            "{}{d}{}{d}{}",
            self.project, self.tissue_source_site, self.participant
        )
    }

    pub fn sample_definition(&self) -> Option<&'static str> {
        self.sample_type.as_deref().and_then(sample_definition)
    }

    /// Tumor sample types are codes 01 through 09.
    pub fn is_tumor(&self) -> Option<bool> {
        self.sample_type
            .as_deref()
            .and_then(|code| code.parse::<u8>().ok())
            .map(|code| (1..=9).contains(&code))
    }

    pub fn granularity(&self) -> Granularity {
        if self.center.is_some() {
            Granularity::Center
        } else if self.plate.is_some() {
            Granularity::Plate
        } else if self.analyte.is_some() {
            Granularity::Analyte
        } else if self.portion.is_some() {
            Granularity::Portion
        } else if self.sample_type.is_some() {
            Granularity::Sample
        } else {
            Granularity::Participant
        }
    }
}

fn split_code(segment: &str) -> Option<(String, Option<char>)> {
    let caps = CODE_WITH_LETTER.captures(segment)?;
    let code = caps.get(1)?.as_str().to_string();
    let letter = caps.get(2).and_then(|m| m.as_str().chars().next());
    Some((code, letter))
}
