use crate::domain::Granularity;

/// Field path of the participant barcode on a case record.
pub const CASE_SUBMITTER_FIELD: &str = "submitter_id";

/// Field path, relative to a file record, where barcodes of `level` live.
pub fn resolve(level: Granularity) -> &'static str {
    match level {
        Granularity::Participant => "cases.submitter_id",
        Granularity::Sample => "cases.samples.submitter_id",
        Granularity::Portion | Granularity::Analyte => {
            "cases.samples.portions.analytes.submitter_id"
        }
        Granularity::Plate | Granularity::Center => {
            "cases.samples.portions.analytes.aliquots.submitter_id"
        }
    }
}

/// Parses a user-supplied level name and resolves it.
pub fn resolve_str(level: &str) -> Result<&'static str, crate::error::IdMapError> {
    Ok(resolve(level.parse()?))
}
