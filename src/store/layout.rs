//! Column-group layout of the workbook grids.
//
// Each transaction sheet reserves a stride of three adjacent columns per
// department (reference, date, amount) under a two-row header. The limits
// sheet reserves columns 0-1 for the department name and cumulative limit,
// then a stride of two columns per allocation event (amount, date). Groups
// are claimed lazily in first-free order and never compacted or reused.

use chrono::NaiveDate;

use super::sheet::Sheet;

pub const HDR_DEPARTMENT: &str = "Department";
pub const HDR_PREVIOUS_BALANCE: &str = "Previous_balance";
pub const HDR_APPROVED_LIMIT: &str = "Approved_Limit";

const TXN_SUB_HEADERS: [&str; 3] = ["PPA_Number", "Date", "Amount"];

pub const TXN_STRIDE: usize = 3;
/// Transaction sheets carry a merged department header over per-column
/// sub-labels; data rows start below both.
pub const TXN_DATA_ROW: usize = 2;

pub const ALLOC_STRIDE: usize = 2;
pub const ALLOC_FIRST_COL: usize = 2;
pub const LIMITS_DATA_ROW: usize = 1;
pub const DEPARTMENT_COL: usize = 0;
const DEFAULT_LIMIT_COL: usize = 1;

const CELL_DATE_FORMAT: &str = "%Y-%m-%d";

pub fn format_cell_date(date: NaiveDate) -> String {
    date.format(CELL_DATE_FORMAT).to_string()
}

pub fn parse_cell_date(cell: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(cell.trim(), CELL_DATE_FORMAT).ok()
}

pub fn parse_cell_amount(cell: &str) -> Option<i64> {
    let cell = cell.trim();
    if cell.is_empty() {
        return None;
    }
    cell.parse().ok()
}

/// One populated row of a department's transaction column group. Fields are
/// independently optional so callers can count references and sum amounts
/// the way the grid actually holds them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRow {
    pub reference: Option<String>,
    pub date: Option<NaiveDate>,
    pub amount: Option<i64>,
}

/// Offset of the department's column group in a transaction sheet, if one
/// was ever claimed.
pub fn find_department_columns(sheet: &Sheet, department: &str) -> Option<usize> {
    let mut col = 0;
    while col < sheet.col_count() {
        if sheet.cell(0, col) == department {
            return Some(col);
        }
        col += TXN_STRIDE;
    }
    None
}

/// Returns the department's column group, claiming the first unused stride
/// and writing its headers when the department is new to this sheet.
pub fn claim_department_columns(sheet: &mut Sheet, department: &str) -> usize {
    let mut col = 0;
    loop {
        if sheet.cell(0, col) == department {
            return col;
        }
        if sheet.cell(0, col).is_empty() {
            sheet.set_cell(0, col, department);
            for (i, header) in TXN_SUB_HEADERS.iter().enumerate() {
                sheet.set_cell(1, col + i, *header);
            }
            return col;
        }
        col += TXN_STRIDE;
    }
}

/// Every claimed column group in a transaction sheet, in column order.
pub fn department_columns(sheet: &Sheet) -> Vec<(usize, String)> {
    let mut out = Vec::new();
    let mut col = 0;
    while col < sheet.col_count() {
        let name = sheet.cell(0, col);
        if !name.is_empty() {
            out.push((col, name.to_string()));
        }
        col += TXN_STRIDE;
    }
    out
}

/// Appends rows after the last populated row of the column group, found by
/// scanning down from the first data row. Existing cells are never
/// overwritten.
pub fn append_rows(sheet: &mut Sheet, offset: usize, rows: &[(String, NaiveDate, i64)]) {
    let mut row = TXN_DATA_ROW;
    while !sheet.cell(row, offset).is_empty() {
        row += 1;
    }
    for (reference, date, amount) in rows {
        sheet.set_cell(row, offset, reference.clone());
        sheet.set_cell(row, offset + 1, format_cell_date(*date));
        sheet.set_cell(row, offset + 2, amount.to_string());
        row += 1;
    }
}

/// Scans a column group to the sheet's full extent. Blank rows inside the
/// group are skipped, not treated as a terminator, since adjacent
/// departments may have longer histories.
pub fn read_column_group(sheet: &Sheet, offset: usize) -> Vec<ColumnRow> {
    let mut out = Vec::new();
    for row in TXN_DATA_ROW..sheet.row_count() {
        let reference = sheet.cell(row, offset);
        let date = sheet.cell(row, offset + 1);
        let amount = sheet.cell(row, offset + 2);
        if reference.is_empty() && date.is_empty() && amount.is_empty() {
            continue;
        }
        out.push(ColumnRow {
            reference: (!reference.is_empty()).then(|| reference.to_string()),
            date: parse_cell_date(date),
            amount: parse_cell_amount(amount),
        });
    }
    out
}

/// Position of the cumulative-limit column. Version 2+ documents label it
/// `Previous_balance`, version 1 `Approved_Limit`; either is honoured, with
/// the classic physical column as the fallback.
pub fn limit_column(sheet: &Sheet) -> usize {
    let by_label = |label: &str| (0..sheet.col_count()).find(|&c| sheet.cell(0, c) == label);
    by_label(HDR_PREVIOUS_BALANCE)
        .or_else(|| by_label(HDR_APPROVED_LIMIT))
        .unwrap_or(DEFAULT_LIMIT_COL)
}

/// Row of a department in the limits sheet.
pub fn find_department_row(sheet: &Sheet, department: &str) -> Option<usize> {
    (LIMITS_DATA_ROW..sheet.row_count()).find(|&r| sheet.cell(r, DEPARTMENT_COL) == department)
}

/// Department names in limits-sheet order.
pub fn department_rows(sheet: &Sheet) -> Vec<(usize, String)> {
    (LIMITS_DATA_ROW..sheet.row_count())
        .filter_map(|r| {
            let name = sheet.cell(r, DEPARTMENT_COL);
            (!name.is_empty()).then(|| (r, name.to_string()))
        })
        .collect()
}

/// Sequence number of the allocation stored at `col`; derived from column
/// position, never stored.
pub fn allocation_number(col: usize) -> usize {
    col / ALLOC_STRIDE
}

/// First free allocation slot in a department's limits row.
pub fn next_allocation_column(sheet: &Sheet, row: usize) -> usize {
    let mut col = ALLOC_FIRST_COL;
    while !sheet.cell(row, col).is_empty() {
        col += ALLOC_STRIDE;
    }
    col
}

/// "1st allocation", "2nd allocation", ... with English ordinal suffixes
/// (11th-13th always take "th").
pub fn ordinal_label(number: usize) -> String {
    let suffix = match number % 100 {
        11..=13 => "th",
        _ => match number % 10 {
            1 => "st",
            2 => "nd",
            3 => "rd",
            _ => "th",
        },
    };
    format!("{number}{suffix} allocation")
}

/// Writes one allocation into a slot, labelling the slot's header columns
/// if no earlier row claimed them.
pub fn write_allocation(sheet: &mut Sheet, row: usize, col: usize, date: NaiveDate, amount: i64) {
    let number = allocation_number(col);
    if sheet.cell(0, col).is_empty() {
        sheet.set_cell(0, col, ordinal_label(number));
        sheet.set_cell(0, col + 1, format!("Date_{number}"));
    }
    sheet.set_cell(row, col, amount.to_string());
    sheet.set_cell(row, col + 1, format_cell_date(date));
}

/// One allocation event read back from a limits row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocationCell {
    pub number: usize,
    pub date: Option<NaiveDate>,
    pub amount: i64,
}

/// All allocation events recorded in a department's limits row.
pub fn read_allocations(sheet: &Sheet, row: usize) -> Vec<AllocationCell> {
    let mut out = Vec::new();
    let mut col = ALLOC_FIRST_COL;
    while col < sheet.col_count() {
        if let Some(amount) = parse_cell_amount(sheet.cell(row, col)) {
            out.push(AllocationCell {
                number: allocation_number(col),
                date: parse_cell_date(sheet.cell(row, col + 1)),
                amount,
            });
        }
        col += ALLOC_STRIDE;
    }
    out
}
