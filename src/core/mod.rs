//! Core domain logic for the bookkeeping engine.

pub mod engine;
pub mod fiscal;
pub mod money;
pub mod report;
pub mod search;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::store::StoreError;

pub use engine::{AllocationReceipt, Bookkeeper, CommitReceipt};
pub use fiscal::{FiscalYear, Quarter};
pub use report::{DepartmentSummary, DetailedRow, QuarterBalance};
pub use search::{EntryKind, LedgerEntry, SearchFilter};

/// A single payment-advice line in an incoming batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionEntry {
    /// PPA reference code, unique per department within a fiscal year.
    pub reference: String,
    pub date: NaiveDate,
    /// Whole rupees.
    pub amount: i64,
}

/// One limit increase in an incoming allocation batch. The ordinal label is
/// derived from the claimed slot, never supplied by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationEntry {
    pub date: NaiveDate,
    pub amount: i64,
}

pub const REFERENCE_LEN: usize = 13;

/// Shape check for PPA references: exactly 13 alphanumeric characters.
/// This is the client-side contract the entry forms enforce; the storage
/// layer itself only enforces uniqueness.
pub fn is_valid_reference(reference: &str) -> bool {
    reference.len() == REFERENCE_LEN && reference.bytes().all(|b| b.is_ascii_alphanumeric())
}

/// A rejected batch. Nothing was written to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    EmptyBatch,
    NonPositiveAmount {
        amount: i64,
    },
    /// The reference is already recorded for this department in the target
    /// fiscal year.
    DuplicateReference {
        reference: String,
        fiscal_year: FiscalYear,
    },
    /// The reference appears twice within the incoming batch itself.
    DuplicateInBatch {
        reference: String,
    },
    /// The batch mixes dates from more than one fiscal year; later entries
    /// would land in the wrong table, so the whole batch is refused.
    MixedFiscalYears {
        expected: FiscalYear,
        found: FiscalYear,
        reference: String,
    },
    /// Committing the batch would take the department past its approved
    /// limit for the fiscal year.
    LimitExceeded {
        approved: i64,
        spent: i64,
        batch: i64,
        available: i64,
    },
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::EmptyBatch => write!(f, "batch contains no entries"),
            ValidationError::NonPositiveAmount { amount } => {
                write!(f, "amounts must be positive, got {amount}")
            }
            ValidationError::DuplicateReference {
                reference,
                fiscal_year,
            } => write!(f, "PPA {reference} already exists in {fiscal_year}"),
            ValidationError::DuplicateInBatch { reference } => {
                write!(f, "PPA {reference} is duplicated within the batch")
            }
            ValidationError::MixedFiscalYears {
                expected,
                found,
                reference,
            } => write!(
                f,
                "batch targets fiscal year {expected} but PPA {reference} is dated in {found}"
            ),
            ValidationError::LimitExceeded {
                approved,
                spent,
                batch,
                available,
            } => write!(
                f,
                "limit exceeded: approved {}, spent {} this fiscal year, batch {}, available {}",
                money::format(*approved),
                money::format(*spent),
                money::format(*batch),
                money::format(*available)
            ),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Engine-level error: either the batch was rejected or the store itself
/// failed.
#[derive(Debug)]
pub enum LedgerError {
    Validation(ValidationError),
    Store(StoreError),
}

impl std::fmt::Display for LedgerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LedgerError::Validation(e) => write!(f, "{e}"),
            LedgerError::Store(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for LedgerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LedgerError::Validation(e) => Some(e),
            LedgerError::Store(e) => Some(e),
        }
    }
}

impl From<ValidationError> for LedgerError {
    fn from(e: ValidationError) -> Self {
        LedgerError::Validation(e)
    }
}

impl From<StoreError> for LedgerError {
    fn from(e: StoreError) -> Self {
        LedgerError::Store(e)
    }
}
