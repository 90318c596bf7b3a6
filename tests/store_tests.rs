use chrono::NaiveDate;
use tempfile::TempDir;

use dept_bookkeeper::core::fiscal::FiscalYear;
use dept_bookkeeper::store::{LedgerStore, StoreError, layout};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn fresh_store_has_limits_header_and_no_fiscal_tables() {
    let dir = TempDir::new().unwrap();
    let store = LedgerStore::open_or_create(dir.path().join("book.json")).unwrap();
    assert_eq!(store.limits().cell(0, 0), "Department");
    assert_eq!(store.limits().cell(0, 1), "Previous_balance");
    assert!(store.list_fiscal_tables().is_empty());
}

#[test]
fn open_does_not_create_the_file_until_save() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("book.json");
    let store = LedgerStore::open_or_create(&path).unwrap();
    assert!(!path.exists());
    store.save().unwrap();
    assert!(path.exists());
}

#[test]
fn saved_workbook_reloads_with_its_contents() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("book.json");
    let fy = FiscalYear::starting(2026);

    let mut store = LedgerStore::open_or_create(&path).unwrap();
    let sheet = store.ensure_fiscal_table(fy);
    let col = layout::claim_department_columns(sheet, "Roads");
    layout::append_rows(
        sheet,
        col,
        &[("PPAREF0000001".into(), date(2026, 5, 1), 30000)],
    );
    store.save().unwrap();

    let reloaded = LedgerStore::open_or_create(&path).unwrap();
    assert_eq!(reloaded.list_fiscal_tables(), vec![fy]);
    let sheet = reloaded.fiscal_table(fy).unwrap();
    let col = layout::find_department_columns(sheet, "Roads").unwrap();
    let rows = layout::read_column_group(sheet, col);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].reference.as_deref(), Some("PPAREF0000001"));
    assert_eq!(rows[0].date, Some(date(2026, 5, 1)));
    assert_eq!(rows[0].amount, Some(30000));
}

#[test]
fn ensure_fiscal_table_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let mut store = LedgerStore::open_or_create(dir.path().join("book.json")).unwrap();
    let fy = FiscalYear::starting(2026);
    store.ensure_fiscal_table(fy);
    let sheet = store.ensure_fiscal_table(fy);
    layout::claim_department_columns(sheet, "Roads");
    store.ensure_fiscal_table(fy);
    assert_eq!(store.list_fiscal_tables(), vec![fy]);
    assert!(store.fiscal_table(fy).unwrap().cell(0, 0) == "Roads");
}

#[test]
fn fiscal_tables_list_in_year_order() {
    let dir = TempDir::new().unwrap();
    let mut store = LedgerStore::open_or_create(dir.path().join("book.json")).unwrap();
    store.ensure_fiscal_table(FiscalYear::starting(2026));
    store.ensure_fiscal_table(FiscalYear::starting(2024));
    store.ensure_fiscal_table(FiscalYear::starting(2025));
    assert_eq!(
        store.list_fiscal_tables(),
        vec![
            FiscalYear::starting(2024),
            FiscalYear::starting(2025),
            FiscalYear::starting(2026)
        ]
    );
}

#[test]
fn unparsable_file_is_corrupt_not_empty() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("book.json");
    std::fs::write(&path, "definitely not a workbook").unwrap();
    let err = LedgerStore::open_or_create(&path).err().expect("open should fail");
    assert!(matches!(err, StoreError::Corrupt(_)), "got {err:?}");
}

#[test]
fn document_without_limits_sheet_is_corrupt() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("book.json");
    std::fs::write(&path, r#"{"version": 3, "sheets": []}"#).unwrap();
    let err = LedgerStore::open_or_create(&path).err().expect("open should fail");
    match err {
        StoreError::Corrupt(reason) => assert!(reason.contains("Limits")),
        other => panic!("expected Corrupt, got {other:?}"),
    }
}
