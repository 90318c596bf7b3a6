//! Durable storage for the limits sheet and the per-fiscal-year
//! transaction sheets.

pub mod format;
pub mod layout;
pub mod sheet;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::core::fiscal::FiscalYear;
use format::{Document, Workbook};
use sheet::Sheet;

/// Errors surfaced by the persistent store.
#[derive(Debug)]
pub enum StoreError {
    /// The destination is held open exclusively by another process. The
    /// operation that hit this is safe to retry.
    Busy(PathBuf),
    /// The file exists but is not a readable workbook. Never downgraded to
    /// "empty store".
    Corrupt(String),
    Io(io::Error),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Busy(path) => {
                write!(f, "store file {} is locked by another process", path.display())
            }
            StoreError::Corrupt(reason) => write!(f, "store file is not a usable workbook: {reason}"),
            StoreError::Io(e) => write!(f, "io error: {e}"),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Io(e) => Some(e),
            _ => None,
        }
    }
}

/// The ledger's backing workbook file. Holds the whole document in memory;
/// mutations only reach disk through [`LedgerStore::save`], so a caller
/// that bails out before saving leaves the file untouched.
pub struct LedgerStore {
    path: PathBuf,
    book: Workbook,
}

impl LedgerStore {
    /// Loads the workbook at `path`, or prepares a fresh one when no file
    /// exists yet. A file that cannot be parsed is reported as
    /// [`StoreError::Corrupt`], never treated as empty.
    pub fn open_or_create(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let book = if path.exists() {
            let data = fs::read_to_string(&path).map_err(|e| file_error(&path, e))?;
            let doc: Document =
                serde_json::from_str(&data).map_err(|e| StoreError::Corrupt(e.to_string()))?;
            Workbook::from_document(doc).map_err(StoreError::Corrupt)?
        } else {
            info!(path = %path.display(), "creating new ledger workbook");
            Workbook::new()
        };
        Ok(Self { path, book })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn limits(&self) -> &Sheet {
        &self.book.limits
    }

    pub fn limits_mut(&mut self) -> &mut Sheet {
        &mut self.book.limits
    }

    pub fn fiscal_table(&self, year: FiscalYear) -> Option<&Sheet> {
        self.book.fiscal.get(&year)
    }

    /// Returns the transaction sheet for `year`, creating an empty one on
    /// first use. This is the whole year-rollover mechanism: the first
    /// commit dated in a new fiscal year creates its table transparently.
    pub fn ensure_fiscal_table(&mut self, year: FiscalYear) -> &mut Sheet {
        self.book.fiscal.entry(year).or_default()
    }

    /// Fiscal years with a transaction sheet, in ascending order.
    pub fn list_fiscal_tables(&self) -> Vec<FiscalYear> {
        self.book.fiscal.keys().copied().collect()
    }

    /// Every transaction sheet in the store: the legacy static sheet of
    /// version 1/2 documents, if present, followed by the per-fiscal-year
    /// sheets. The detailed report scans all of them.
    pub fn transaction_sheets(&self) -> impl Iterator<Item = &Sheet> {
        self.book
            .legacy_transactions
            .iter()
            .chain(self.book.fiscal.values())
    }

    /// Serializes the workbook and replaces the file through a sibling
    /// temp file. A destination held open by another process surfaces as
    /// [`StoreError::Busy`].
    pub fn save(&self) -> Result<(), StoreError> {
        let doc = self.book.to_document();
        let data = serde_json::to_string_pretty(&doc)
            .map_err(|e| StoreError::Io(io::Error::other(e)))?;
        let tmp = tmp_path(&self.path);
        fs::write(&tmp, data).map_err(|e| file_error(&self.path, e))?;
        fs::rename(&tmp, &self.path).map_err(|e| file_error(&self.path, e))?;
        debug!(path = %self.path.display(), "workbook saved");
        Ok(())
    }
}

fn file_error(path: &Path, e: io::Error) -> StoreError {
    match e.kind() {
        io::ErrorKind::PermissionDenied => StoreError::Busy(path.to_path_buf()),
        _ => StoreError::Io(e),
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
