use chrono::NaiveDate;
use serde::Serialize;

use super::fiscal::{FiscalYear, Quarter};
use crate::store::{LedgerStore, layout};

/// Where a ledger entry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EntryKind {
    /// A limit increase read from the limits sheet.
    Allocation,
    /// A payment-advice transaction.
    Payment,
}

impl std::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntryKind::Allocation => write!(f, "ALLOC"),
            EntryKind::Payment => write!(f, "PPA"),
        }
    }
}

/// One row of the unified search view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LedgerEntry {
    pub department: String,
    /// The PPA code, or `Allocation (<n>)` synthesized from the slot
    /// number.
    pub reference: String,
    pub date: NaiveDate,
    pub amount: i64,
    pub kind: EntryKind,
}

/// Filters for the unified search. An unset field matches everything.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SearchFilter {
    /// Exact department name.
    pub department: Option<String>,
    /// Case-insensitive substring of the reference.
    pub text: Option<String>,
    pub quarter: Option<Quarter>,
}

impl SearchFilter {
    fn matches_department(&self, department: &str) -> bool {
        self.department
            .as_deref()
            .is_none_or(|wanted| wanted == department)
    }

    fn matches_text(&self, reference: &str) -> bool {
        self.text.as_deref().is_none_or(|wanted| {
            reference
                .to_ascii_lowercase()
                .contains(&wanted.to_ascii_lowercase())
        })
    }

    fn matches_quarter(&self, date: NaiveDate) -> bool {
        self.quarter.is_none_or(|wanted| Quarter::of(date) == wanted)
    }
}

/// Runs the unified search: allocation rows from the whole limits sheet
/// joined with transaction rows from the fiscal year containing `today`,
/// newest first. Historical transaction years are intentionally out of
/// this view's scope.
pub fn run(store: &LedgerStore, filter: &SearchFilter, today: NaiveDate) -> Vec<LedgerEntry> {
    let mut results = Vec::new();

    let limits = store.limits();
    for (row, department) in layout::department_rows(limits) {
        if !filter.matches_department(&department) {
            continue;
        }
        for cell in layout::read_allocations(limits, row) {
            let Some(date) = cell.date else {
                continue;
            };
            let reference = format!("Allocation ({})", cell.number);
            if !filter.matches_text(&reference) || !filter.matches_quarter(date) {
                continue;
            }
            results.push(LedgerEntry {
                department: department.clone(),
                reference,
                date,
                amount: cell.amount,
                kind: EntryKind::Allocation,
            });
        }
    }

    if let Some(sheet) = store.fiscal_table(FiscalYear::containing(today)) {
        for (offset, department) in layout::department_columns(sheet) {
            if !filter.matches_department(&department) {
                continue;
            }
            for row in layout::read_column_group(sheet, offset) {
                let (Some(reference), Some(date), Some(amount)) =
                    (row.reference, row.date, row.amount)
                else {
                    continue;
                };
                if !filter.matches_text(&reference) || !filter.matches_quarter(date) {
                    continue;
                }
                results.push(LedgerEntry {
                    department: department.clone(),
                    reference,
                    date,
                    amount,
                    kind: EntryKind::Payment,
                });
            }
        }
    }

    results.sort_by(|a, b| b.date.cmp(&a.date));
    results
}
