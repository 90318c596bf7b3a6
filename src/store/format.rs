//! On-disk document layout and schema-generation compatibility.
//
// Three generations of the workbook exist in the field. Version 1 kept a
// single static `Transactions` sheet and labelled the limits column
// `Approved_Limit`; version 2 relabelled it `Previous_balance`; version 3
// treats the limits column as a cumulative total, splits transactions into
// one sheet per fiscal year and records allocations as paired columns in
// the limits sheet. All three load transparently; saving always writes
// version 3.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::sheet::Sheet;
use crate::core::fiscal::FiscalYear;

pub const FORMAT_VERSION: u32 = 3;
pub const LIMITS_SHEET: &str = "Limits";
pub const LEGACY_TXN_SHEET: &str = "Transactions";
pub const TXN_SHEET_PREFIX: &str = "Transactions_";

/// Sheet name for a fiscal year's transaction table, e.g.
/// `Transactions_2026_27`.
pub fn fiscal_sheet_name(year: FiscalYear) -> String {
    format!("{TXN_SHEET_PREFIX}{}", year.label())
}

fn parse_fiscal_sheet_name(name: &str) -> Option<FiscalYear> {
    FiscalYear::parse_label(name.strip_prefix(TXN_SHEET_PREFIX)?)
}

/// The serialized workbook: a format version and a list of named sheets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    #[serde(default = "default_version")]
    pub version: u32,
    pub sheets: Vec<NamedSheet>,
}

fn default_version() -> u32 {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamedSheet {
    pub name: String,
    #[serde(flatten)]
    pub sheet: Sheet,
}

/// In-memory view of the store: the limits sheet plus an explicit index of
/// transaction sheets. The engine looks tables up here by fiscal year
/// instead of pattern-matching sheet names.
#[derive(Debug, Clone)]
pub struct Workbook {
    pub limits: Sheet,
    /// The static pre-split transactions sheet of version 1/2 documents.
    pub legacy_transactions: Option<Sheet>,
    pub fiscal: BTreeMap<FiscalYear, Sheet>,
    /// Sheets this engine does not understand, preserved across a rewrite.
    extras: Vec<NamedSheet>,
}

impl Workbook {
    /// A fresh version-3 workbook: an empty limits sheet with its header
    /// row, no transaction sheets yet.
    pub fn new() -> Self {
        let mut limits = Sheet::new();
        limits.set_cell(0, 0, super::layout::HDR_DEPARTMENT);
        limits.set_cell(0, 1, super::layout::HDR_PREVIOUS_BALANCE);
        Self {
            limits,
            legacy_transactions: None,
            fiscal: BTreeMap::new(),
            extras: Vec::new(),
        }
    }

    /// Classifies a loaded document's sheets. Fails with a reason when the
    /// document is from a newer format or has no limits sheet.
    pub fn from_document(doc: Document) -> Result<Self, String> {
        if doc.version > FORMAT_VERSION {
            return Err(format!(
                "document version {} is newer than supported version {FORMAT_VERSION}",
                doc.version
            ));
        }
        let mut limits = None;
        let mut legacy_transactions = None;
        let mut fiscal = BTreeMap::new();
        let mut extras = Vec::new();
        for named in doc.sheets {
            if named.name == LIMITS_SHEET && limits.is_none() {
                limits = Some(named.sheet);
            } else if named.name == LEGACY_TXN_SHEET && legacy_transactions.is_none() {
                legacy_transactions = Some(named.sheet);
            } else if let Some(year) = parse_fiscal_sheet_name(&named.name) {
                fiscal.insert(year, named.sheet);
            } else {
                extras.push(named);
            }
        }
        let limits = limits.ok_or_else(|| format!("missing {LIMITS_SHEET} sheet"))?;
        Ok(Self {
            limits,
            legacy_transactions,
            fiscal,
            extras,
        })
    }

    /// Serializable form, always at the current format version.
    pub fn to_document(&self) -> Document {
        let mut sheets = vec![NamedSheet {
            name: LIMITS_SHEET.to_string(),
            sheet: self.limits.clone(),
        }];
        if let Some(legacy) = &self.legacy_transactions {
            sheets.push(NamedSheet {
                name: LEGACY_TXN_SHEET.to_string(),
                sheet: legacy.clone(),
            });
        }
        for (year, sheet) in &self.fiscal {
            sheets.push(NamedSheet {
                name: fiscal_sheet_name(*year),
                sheet: sheet.clone(),
            });
        }
        sheets.extend(self.extras.iter().cloned());
        Document {
            version: FORMAT_VERSION,
            sheets,
        }
    }
}

impl Default for Workbook {
    fn default() -> Self {
        Self::new()
    }
}
