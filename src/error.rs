use thiserror::Error;

/// Errors that can occur while building a commission invoice.
#[derive(Error, Debug)]
pub enum InvoiceError {
    #[error("Unsupported character {ch:?} in {field}: only single-byte text can be printed")]
    Encoding { field: &'static str, ch: char },

    #[error("Invalid {field} for patient '{patient}': {reason}")]
    InvalidInput {
        patient: String,
        field: &'static str,
        reason: String,
    },

    #[error("No patients given. Use --patients <FILE> or --patient <SPEC>")]
    NoPatients,

    #[error("Failed to read patients file: {0}")]
    PatientFile(String),

    #[error("Invalid patient spec '{0}'. Expected NAME:BILL:EXCLUDED:RATE:PERCENT")]
    PatientSpec(String),

    #[error("Failed to create PDF: {0}")]
    Pdf(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, InvoiceError>;
