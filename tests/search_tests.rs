use chrono::NaiveDate;
use tempfile::TempDir;

use dept_bookkeeper::core::{
    AllocationEntry, Bookkeeper, EntryKind, Quarter, SearchFilter, TransactionEntry,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn txn(reference: &str, d: NaiveDate, amount: i64) -> TransactionEntry {
    TransactionEntry {
        reference: reference.to_string(),
        date: d,
        amount,
    }
}

fn alloc(d: NaiveDate, amount: i64) -> AllocationEntry {
    AllocationEntry { date: d, amount }
}

/// Two departments with allocations, current-year transactions and one
/// transaction in a previous fiscal year.
fn seeded_book(dir: &TempDir) -> Bookkeeper {
    let book = Bookkeeper::new(dir.path().join("book.json"));
    book.commit_allocations("Roads", &[alloc(date(2025, 4, 10), 50000)])
        .unwrap();
    book.commit_transactions("Roads", &[txn("PPAOLDYEAR001", date(2025, 6, 1), 700)])
        .unwrap();
    book.commit_allocations("Roads", &[alloc(date(2026, 4, 10), 20000)])
        .unwrap();
    book.commit_allocations("Water", &[alloc(date(2026, 7, 5), 10000)])
        .unwrap();
    book.commit_transactions(
        "Roads",
        &[
            txn("PPA0000000001", date(2026, 5, 1), 1000),
            txn("PPA0000000002", date(2026, 9, 15), 2000),
        ],
    )
    .unwrap();
    book.commit_transactions("Water", &[txn("PPA0000000003", date(2026, 8, 2), 300)])
        .unwrap();
    book
}

#[test]
fn unfiltered_search_joins_allocations_and_current_transactions() {
    let dir = TempDir::new().unwrap();
    let book = seeded_book(&dir);
    let today = date(2026, 10, 1);
    let results = book.search_as_of(&SearchFilter::default(), today).unwrap();

    // 3 allocations + 3 current-year transactions; the 2025_26 transaction
    // is out of this view's scope.
    assert_eq!(results.len(), 6);
    assert!(!results.iter().any(|e| e.reference == "PPAOLDYEAR001"));
    assert!(results.windows(2).all(|w| w[0].date >= w[1].date));

    let allocs: Vec<_> = results
        .iter()
        .filter(|e| e.kind == EntryKind::Allocation)
        .collect();
    assert_eq!(allocs.len(), 3);
    assert!(allocs.iter().any(|e| e.reference == "Allocation (1)"));
    assert!(allocs.iter().any(|e| e.reference == "Allocation (2)"));
}

#[test]
fn department_filter_is_exact() {
    let dir = TempDir::new().unwrap();
    let book = seeded_book(&dir);
    let filter = SearchFilter {
        department: Some("Water".into()),
        ..Default::default()
    };
    let results = book.search_as_of(&filter, date(2026, 10, 1)).unwrap();
    assert_eq!(results.len(), 2);
    assert!(results.iter().all(|e| e.department == "Water"));
}

#[test]
fn text_filter_matches_references_case_insensitively() {
    let dir = TempDir::new().unwrap();
    let book = seeded_book(&dir);
    let filter = SearchFilter {
        text: Some("ppa00000000".into()),
        ..Default::default()
    };
    let results = book.search_as_of(&filter, date(2026, 10, 1)).unwrap();
    assert_eq!(results.len(), 3);
    assert!(results.iter().all(|e| e.kind == EntryKind::Payment));
}

#[test]
fn text_filter_reaches_synthesized_allocation_references() {
    let dir = TempDir::new().unwrap();
    let book = seeded_book(&dir);
    let filter = SearchFilter {
        text: Some("allocation".into()),
        ..Default::default()
    };
    let results = book.search_as_of(&filter, date(2026, 10, 1)).unwrap();
    assert_eq!(results.len(), 3);
    assert!(results.iter().all(|e| e.kind == EntryKind::Allocation));
}

#[test]
fn quarter_filter_applies_to_both_kinds() {
    let dir = TempDir::new().unwrap();
    let book = seeded_book(&dir);
    let filter = SearchFilter {
        quarter: Some(Quarter::Q2),
        ..Default::default()
    };
    let results = book.search_as_of(&filter, date(2026, 10, 1)).unwrap();
    // Water's July allocation, Roads' September PPA, Water's August PPA.
    assert_eq!(results.len(), 3);
    assert!(
        results
            .iter()
            .all(|e| Quarter::of(e.date) == Quarter::Q2)
    );
}

#[test]
fn filters_combine() {
    let dir = TempDir::new().unwrap();
    let book = seeded_book(&dir);
    let filter = SearchFilter {
        department: Some("Roads".into()),
        text: Some("PPA".into()),
        quarter: Some(Quarter::Q1),
    };
    let results = book.search_as_of(&filter, date(2026, 10, 1)).unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].reference, "PPA0000000001");
}
