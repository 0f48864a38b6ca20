use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum IdMapError {
    #[error("malformed barcode(s): {}", .0.join(", "))]
    #[diagnostic(
        code(tcga_idmap::malformed_barcode),
        help("barcodes must start with TCGA and carry at least three segments")
    )]
    MalformedBarcode(Vec<String>),

    #[error("barcodes in one batch must share a segment count, found {counts:?}")]
    #[diagnostic(code(tcga_idmap::inconsistent_barcode_length))]
    InconsistentBarcodeLength { counts: Vec<usize> },

    #[error("unknown granularity: {0}")]
    #[diagnostic(
        code(tcga_idmap::unknown_granularity),
        help("expected one of participant, sample, portion, analyte, plate, center")
    )]
    UnknownGranularity(String),

    #[error("unknown id type: {0}")]
    #[diagnostic(code(tcga_idmap::unknown_id_type), help("expected case or file"))]
    UnknownIdType(String),

    #[error("GDC request failed: {0}")]
    #[diagnostic(code(tcga_idmap::remote_service))]
    RemoteService(String),

    #[error("GDC returned status {status}: {message}")]
    #[diagnostic(code(tcga_idmap::remote_status))]
    RemoteStatus { status: u16, message: String },

    #[error("failed to read config file at {0}")]
    #[diagnostic(code(tcga_idmap::config_read))]
    ConfigRead(PathBuf),

    #[error("failed to parse JSON config: {0}")]
    #[diagnostic(code(tcga_idmap::config_parse))]
    ConfigParse(String),
}

impl IdMapError {
    /// True for failures raised by the remote collaborator rather than by input checks.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            IdMapError::RemoteService(_) | IdMapError::RemoteStatus { .. }
        )
    }
}
