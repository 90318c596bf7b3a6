use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;

use super::engine::department_limit;
use super::fiscal::{FiscalYear, Quarter};
use crate::store::{LedgerStore, layout};

/// Flat per-department view of the current fiscal year: spend per quarter,
/// total and remaining balance against the cumulative limit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DepartmentSummary {
    pub department: String,
    pub limit: i64,
    /// Spend bucketed Q1..Q4 of the fiscal year.
    pub quarters: [i64; 4],
    pub total_spent: i64,
    pub remaining: i64,
}

/// One quarter of the detailed running-balance report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QuarterBalance {
    pub allocated: i64,
    pub spent: i64,
    /// Balance carried out of the quarter into the next one.
    pub closing: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetailedRow {
    pub department: String,
    /// Pre-current-year limit minus historical expenditure.
    pub net_opening_balance: i64,
    pub quarters: [QuarterBalance; 4],
}

/// Summary over the fiscal year containing `today`. A missing table for
/// that year means no data yet, not an error: the report is empty.
pub fn summary(store: &LedgerStore, today: NaiveDate) -> Vec<DepartmentSummary> {
    let fiscal_year = FiscalYear::containing(today);
    let Some(sheet) = store.fiscal_table(fiscal_year) else {
        return Vec::new();
    };
    let limits = store.limits();
    let mut out = Vec::new();
    for (_, department) in layout::department_rows(limits) {
        let limit = department_limit(limits, &department);
        let mut quarters = [0i64; 4];
        let mut total_spent = 0i64;
        if let Some(offset) = layout::find_department_columns(sheet, &department) {
            for row in layout::read_column_group(sheet, offset) {
                if let (Some(date), Some(amount)) = (row.date, row.amount) {
                    total_spent += amount;
                    quarters[Quarter::of(date).index()] += amount;
                }
            }
        }
        out.push(DepartmentSummary {
            department,
            limit,
            quarters,
            total_spent,
            remaining: limit - total_spent,
        });
    }
    out
}

/// The running quarterly balance report. Expenditure from every
/// transaction sheet is split into historical (before the current fiscal
/// year) and current-year quarter buckets; the limits sheet's allocation
/// pairs are split the same way on the allocation's own date, which is the
/// sole source of truth for that split. The opening limit is the
/// cumulative limit with current-year allocations stripped back out.
pub fn detailed(store: &LedgerStore, today: NaiveDate) -> Vec<DetailedRow> {
    let fy_start = FiscalYear::containing(today).start();

    let mut historical_spend: HashMap<String, i64> = HashMap::new();
    let mut current_spend: HashMap<String, [i64; 4]> = HashMap::new();
    for sheet in store.transaction_sheets() {
        for (offset, department) in layout::department_columns(sheet) {
            for row in layout::read_column_group(sheet, offset) {
                let (Some(date), Some(amount)) = (row.date, row.amount) else {
                    continue;
                };
                if date < fy_start {
                    *historical_spend.entry(department.clone()).or_default() += amount;
                } else {
                    current_spend.entry(department.clone()).or_default()
                        [Quarter::of(date).index()] += amount;
                }
            }
        }
    }

    let limits = store.limits();
    let mut out = Vec::new();
    for (row, department) in layout::department_rows(limits) {
        let grand_total_limit = department_limit(limits, &department);

        let mut current_allocations = 0i64;
        let mut quarter_allocations = [0i64; 4];
        for cell in layout::read_allocations(limits, row) {
            // An allocation without a parseable date is historical: it is
            // already folded into the cumulative limit and must not be
            // stripped back out.
            if let Some(date) = cell.date {
                if date >= fy_start {
                    current_allocations += cell.amount;
                    quarter_allocations[Quarter::of(date).index()] += cell.amount;
                }
            }
        }

        let opening_limit = grand_total_limit - current_allocations;
        let net_opening_balance =
            opening_limit - historical_spend.get(&department).copied().unwrap_or(0);

        let spend = current_spend
            .get(&department)
            .copied()
            .unwrap_or([0i64; 4]);
        let mut balance = net_opening_balance;
        let mut quarters = [QuarterBalance {
            allocated: 0,
            spent: 0,
            closing: 0,
        }; 4];
        for quarter in Quarter::ALL {
            let i = quarter.index();
            balance = balance + quarter_allocations[i] - spend[i];
            quarters[i] = QuarterBalance {
                allocated: quarter_allocations[i],
                spent: spend[i],
                closing: balance,
            };
        }

        out.push(DetailedRow {
            department,
            net_opening_balance,
            quarters,
        });
    }
    out
}
