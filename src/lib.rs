//! Translation between TCGA specimen barcodes and GDC case/file UUIDs.

pub mod barcode;
pub mod config;
pub mod domain;
pub mod endpoint;
pub mod error;
pub mod gdc;
pub mod relation;
pub mod response;
pub mod translate;

pub use domain::{Granularity, IdType};
pub use error::IdMapError;
pub use relation::{IdPair, IdRelation};
pub use translate::Translator;
