use std::collections::HashSet;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::info;

use super::fiscal::FiscalYear;
use super::report::{self, DepartmentSummary, DetailedRow};
use super::search::{self, LedgerEntry, SearchFilter};
use super::{AllocationEntry, LedgerError, TransactionEntry, ValidationError};
use crate::store::sheet::Sheet;
use crate::store::{LedgerStore, layout};

/// Successful transaction commit: which fiscal-year table the batch landed
/// in, and how many rows were appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitReceipt {
    pub fiscal_year: FiscalYear,
    pub rows: usize,
}

/// Successful allocation commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocationReceipt {
    pub total_allocated: i64,
    pub slots: usize,
}

/// The ledger engine. Every operation performs a full
/// load-validate-mutate-save cycle against the workbook file, so the file
/// is the sole source of truth between calls and a rejected batch never
/// touches the disk.
pub struct Bookkeeper {
    path: PathBuf,
}

impl Bookkeeper {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open(&self) -> Result<LedgerStore, LedgerError> {
        Ok(LedgerStore::open_or_create(&self.path)?)
    }

    /// Department names in limits-sheet order.
    pub fn list_departments(&self) -> Result<Vec<String>, LedgerError> {
        let store = self.open()?;
        Ok(layout::department_rows(store.limits())
            .into_iter()
            .map(|(_, name)| name)
            .collect())
    }

    /// Cumulative approved limit for a department; 0 when the department
    /// has no limits row yet.
    pub fn limit(&self, department: &str) -> Result<i64, LedgerError> {
        let store = self.open()?;
        Ok(department_limit(store.limits(), department))
    }

    /// Validates and commits a batch of payment-advice entries against the
    /// department's approved limit. The target fiscal year comes from the
    /// first entry's date; a batch spanning fiscal years is rejected whole.
    /// On any validation failure nothing is written.
    pub fn commit_transactions(
        &self,
        department: &str,
        entries: &[TransactionEntry],
    ) -> Result<CommitReceipt, LedgerError> {
        let Some(first) = entries.first() else {
            return Err(ValidationError::EmptyBatch.into());
        };
        let fiscal_year = FiscalYear::containing(first.date);
        let mut batch_refs = HashSet::new();
        for entry in entries {
            if entry.amount <= 0 {
                return Err(ValidationError::NonPositiveAmount {
                    amount: entry.amount,
                }
                .into());
            }
            let found = FiscalYear::containing(entry.date);
            if found != fiscal_year {
                return Err(ValidationError::MixedFiscalYears {
                    expected: fiscal_year,
                    found,
                    reference: entry.reference.clone(),
                }
                .into());
            }
            if !batch_refs.insert(entry.reference.as_str()) {
                return Err(ValidationError::DuplicateInBatch {
                    reference: entry.reference.clone(),
                }
                .into());
            }
        }

        let mut store = self.open()?;
        let approved = department_limit(store.limits(), department);
        let sheet = store.ensure_fiscal_table(fiscal_year);
        let offset = layout::claim_department_columns(sheet, department);

        let mut spent = 0i64;
        let mut existing_refs = HashSet::new();
        for row in layout::read_column_group(sheet, offset) {
            if let Some(amount) = row.amount {
                spent += amount;
            }
            if let Some(reference) = row.reference {
                existing_refs.insert(reference);
            }
        }
        for entry in entries {
            if existing_refs.contains(&entry.reference) {
                return Err(ValidationError::DuplicateReference {
                    reference: entry.reference.clone(),
                    fiscal_year,
                }
                .into());
            }
        }
        let batch: i64 = entries.iter().map(|e| e.amount).sum();
        if spent + batch > approved {
            return Err(ValidationError::LimitExceeded {
                approved,
                spent,
                batch,
                available: approved - spent,
            }
            .into());
        }

        let rows: Vec<(String, NaiveDate, i64)> = entries
            .iter()
            .map(|e| (e.reference.clone(), e.date, e.amount))
            .collect();
        layout::append_rows(sheet, offset, &rows);
        store.save()?;
        info!(
            department,
            fiscal_year = %fiscal_year,
            rows = entries.len(),
            total = batch,
            "transaction batch committed"
        );
        Ok(CommitReceipt {
            fiscal_year,
            rows: entries.len(),
        })
    }

    /// Records a batch of limit increases for a department, creating its
    /// limits row on first use. Allocation slots are claimed in column
    /// order and the cumulative limit grows by the batch total; there is no
    /// ceiling on allocations.
    pub fn commit_allocations(
        &self,
        department: &str,
        entries: &[AllocationEntry],
    ) -> Result<AllocationReceipt, LedgerError> {
        if entries.is_empty() {
            return Err(ValidationError::EmptyBatch.into());
        }
        for entry in entries {
            if entry.amount <= 0 {
                return Err(ValidationError::NonPositiveAmount {
                    amount: entry.amount,
                }
                .into());
            }
        }

        let mut store = self.open()?;
        let limits = store.limits_mut();
        let limit_col = layout::limit_column(limits);
        let row = match layout::find_department_row(limits, department) {
            Some(row) => row,
            None => {
                let row = limits.row_count().max(layout::LIMITS_DATA_ROW);
                limits.set_cell(row, layout::DEPARTMENT_COL, department);
                limits.set_cell(row, limit_col, "0");
                row
            }
        };
        let current_limit = layout::parse_cell_amount(limits.cell(row, limit_col)).unwrap_or(0);

        let mut col = layout::next_allocation_column(limits, row);
        let mut total = 0i64;
        for entry in entries {
            layout::write_allocation(limits, row, col, entry.date, entry.amount);
            total += entry.amount;
            col += layout::ALLOC_STRIDE;
        }
        limits.set_cell(row, limit_col, (current_limit + total).to_string());
        store.save()?;
        info!(
            department,
            total,
            slots = entries.len(),
            "allocation batch committed"
        );
        Ok(AllocationReceipt {
            total_allocated: total,
            slots: entries.len(),
        })
    }

    /// Per-department spend against limit for the fiscal year containing
    /// `today`. Empty when that year has no transaction table yet.
    pub fn summary_report_as_of(
        &self,
        today: NaiveDate,
    ) -> Result<Vec<DepartmentSummary>, LedgerError> {
        let store = self.open()?;
        Ok(report::summary(&store, today))
    }

    pub fn summary_report(&self) -> Result<Vec<DepartmentSummary>, LedgerError> {
        self.summary_report_as_of(current_date())
    }

    /// Running quarterly balances for the fiscal year containing `today`,
    /// reconciled against all recorded history.
    pub fn detailed_report_as_of(&self, today: NaiveDate) -> Result<Vec<DetailedRow>, LedgerError> {
        let store = self.open()?;
        Ok(report::detailed(&store, today))
    }

    pub fn detailed_report(&self) -> Result<Vec<DetailedRow>, LedgerError> {
        self.detailed_report_as_of(current_date())
    }

    /// Unified allocation-and-transaction view, newest first. Transactions
    /// are searched in the fiscal year containing `today` only; allocations
    /// across the whole limits sheet.
    pub fn search_as_of(
        &self,
        filter: &SearchFilter,
        today: NaiveDate,
    ) -> Result<Vec<LedgerEntry>, LedgerError> {
        let store = self.open()?;
        Ok(search::run(&store, filter, today))
    }

    pub fn search(&self, filter: &SearchFilter) -> Result<Vec<LedgerEntry>, LedgerError> {
        self.search_as_of(filter, current_date())
    }
}

/// Report cutoffs are the one place the engine consults the wall clock;
/// everything else derives its fiscal year from entry dates.
fn current_date() -> NaiveDate {
    chrono::Local::now().date_naive()
}

pub(crate) fn department_limit(limits: &Sheet, department: &str) -> i64 {
    let Some(row) = layout::find_department_row(limits, department) else {
        return 0;
    };
    layout::parse_cell_amount(limits.cell(row, layout::limit_column(limits))).unwrap_or(0)
}
