use std::path::Path;

use chrono::NaiveDate;
use csv::Reader;
use serde::Deserialize;

use super::{BatchImporter, ImportError};
use crate::core::{TransactionEntry, is_valid_reference, money};

#[derive(Deserialize)]
struct CsvRow {
    reference: String,
    date: String,
    amount: String,
}

/// Imports a transaction batch from a CSV file with a
/// `reference,date,amount` header. Dates are `YYYY-MM-DD`; amounts may be
/// plain integers or display-formatted rupees.
pub struct CsvImporter;

impl CsvImporter {
    fn parse_internal(path: &Path) -> Result<Vec<TransactionEntry>, ImportError> {
        let mut rdr = Reader::from_path(path).map_err(|e| ImportError::Parse(e.to_string()))?;
        let mut entries = Vec::new();
        for result in rdr.deserialize() {
            let row: CsvRow = result.map_err(|e| ImportError::Parse(e.to_string()))?;
            let reference = row.reference.trim().to_string();
            if !is_valid_reference(&reference) {
                return Err(ImportError::InvalidEntry(format!(
                    "reference {reference:?} is not 13 alphanumeric characters"
                )));
            }
            let date = NaiveDate::parse_from_str(row.date.trim(), "%Y-%m-%d")
                .map_err(|_| ImportError::InvalidEntry(format!("bad date {:?}", row.date)))?;
            let amount = money::parse(&row.amount)
                .map_err(|e| ImportError::InvalidEntry(e.to_string()))?;
            entries.push(TransactionEntry {
                reference,
                date,
                amount,
            });
        }
        Ok(entries)
    }
}

impl BatchImporter for CsvImporter {
    fn parse(path: &Path) -> Result<Vec<TransactionEntry>, ImportError> {
        Self::parse_internal(path)
    }
}

pub fn parse(path: &Path) -> Result<Vec<TransactionEntry>, ImportError> {
    CsvImporter::parse(path)
}
