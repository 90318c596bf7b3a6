use std::path::Path;

use crate::core::TransactionEntry;

#[derive(Debug)]
pub enum ImportError {
    Io(std::io::Error),
    Parse(String),
    /// A row parsed but does not form a committable entry (bad reference
    /// shape, bad date, bad amount).
    InvalidEntry(String),
}

impl std::fmt::Display for ImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImportError::Io(e) => write!(f, "io error: {e}"),
            ImportError::Parse(e) => write!(f, "parse error: {e}"),
            ImportError::InvalidEntry(e) => write!(f, "invalid entry: {e}"),
        }
    }
}

impl std::error::Error for ImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ImportError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ImportError {
    fn from(e: std::io::Error) -> Self {
        ImportError::Io(e)
    }
}

/// A staged batch of payment-advice entries read from a statement file,
/// ready for the engine to validate and commit.
pub trait BatchImporter {
    fn parse(path: &Path) -> Result<Vec<TransactionEntry>, ImportError>;
}

pub mod csv;
