use std::fs;
use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

use dept_bookkeeper::core::{
    AllocationEntry, Bookkeeper, Quarter, SearchFilter, TransactionEntry, is_valid_reference,
    money,
};
use dept_bookkeeper::import::{BatchImporter, csv::CsvImporter};

const DEFAULT_STORE_PATH: &str = "ledger-book.json";

#[derive(Deserialize, Default)]
struct LedgerConfig {
    store_path: Option<String>,
}

#[derive(Deserialize, Default)]
struct Config {
    #[serde(default)]
    ledger: LedgerConfig,
}

#[derive(Parser)]
#[command(name = "bookkeeper", about = "Department expenditure bookkeeping")]
struct Cli {
    /// Configuration file holding the workbook path.
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,
    /// Workbook path, overriding the configuration file.
    #[arg(long)]
    store: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List departments known to the limits sheet
    Departments,
    /// Show a department's cumulative approved limit
    Limit {
        #[arg(long)]
        department: String,
    },
    /// Record an allocation, raising the department's limit
    Allocate {
        #[arg(long)]
        department: String,
        #[arg(long)]
        amount: String,
        /// Allocation date, YYYY-MM-DD
        #[arg(long)]
        date: String,
    },
    /// Record a single payment-advice transaction
    Record {
        #[arg(long)]
        department: String,
        /// PPA number, exactly 13 alphanumeric characters
        #[arg(long)]
        reference: String,
        #[arg(long)]
        amount: String,
        /// Transaction date, YYYY-MM-DD
        #[arg(long)]
        date: String,
    },
    /// Commit a CSV batch of transactions (reference,date,amount)
    Import {
        #[arg(long)]
        department: String,
        #[arg(long)]
        file: PathBuf,
    },
    /// Current fiscal-year spend against limits
    Summary,
    /// Running quarterly balances reconciled with history
    Detailed,
    /// Search allocations and current-year transactions
    Search {
        #[arg(long)]
        department: Option<String>,
        #[arg(long)]
        text: Option<String>,
        #[arg(long)]
        quarter: Option<Quarter>,
    },
}

#[derive(Debug)]
enum CliError {
    InvalidConfig(String),
    InvalidDate(String),
    InvalidReference(String),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::InvalidConfig(msg) => write!(f, "invalid configuration: {msg}"),
            CliError::InvalidDate(text) => write!(f, "invalid date (expected YYYY-MM-DD): {text}"),
            CliError::InvalidReference(text) => {
                write!(
                    f,
                    "invalid PPA number (expected 13 alphanumeric characters): {text}"
                )
            }
        }
    }
}

impl std::error::Error for CliError {}

fn load_config(path: &PathBuf) -> Result<Config, CliError> {
    let Ok(data) = fs::read_to_string(path) else {
        return Ok(Config::default());
    };
    toml::from_str(&data).map_err(|e| CliError::InvalidConfig(e.to_string()))
}

fn parse_date(text: &str) -> Result<NaiveDate, CliError> {
    NaiveDate::parse_from_str(text, "%Y-%m-%d").map_err(|_| CliError::InvalidDate(text.into()))
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    if let Err(e) = run(Cli::parse()) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(&cli.config)?;
    let store_path = cli
        .store
        .or_else(|| config.ledger.store_path.map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_PATH));
    let book = Bookkeeper::new(store_path);

    match cli.command {
        Commands::Departments => {
            for department in book.list_departments()? {
                println!("{department}");
            }
        }
        Commands::Limit { department } => {
            println!("{}", money::format(book.limit(&department)?));
        }
        Commands::Allocate {
            department,
            amount,
            date,
        } => {
            let entry = AllocationEntry {
                date: parse_date(&date)?,
                amount: money::parse(&amount)?,
            };
            let receipt = book.commit_allocations(&department, &[entry])?;
            println!("Allocated {}.", money::format(receipt.total_allocated));
        }
        Commands::Record {
            department,
            reference,
            amount,
            date,
        } => {
            if !is_valid_reference(&reference) {
                return Err(Box::new(CliError::InvalidReference(reference)));
            }
            let entry = TransactionEntry {
                reference,
                date: parse_date(&date)?,
                amount: money::parse(&amount)?,
            };
            let receipt = book.commit_transactions(&department, &[entry])?;
            println!("Saved to {}.", receipt.fiscal_year);
        }
        Commands::Import { department, file } => {
            let entries = CsvImporter::parse(&file)?;
            let count = entries.len();
            let receipt = book.commit_transactions(&department, &entries)?;
            println!("Saved {count} entries to {}.", receipt.fiscal_year);
        }
        Commands::Summary => {
            for row in book.summary_report()? {
                println!(
                    "{}: limit {}, Q1 {}, Q2 {}, Q3 {}, Q4 {}, spent {}, remaining {}",
                    row.department,
                    money::format(row.limit),
                    money::format(row.quarters[0]),
                    money::format(row.quarters[1]),
                    money::format(row.quarters[2]),
                    money::format(row.quarters[3]),
                    money::format(row.total_spent),
                    money::format(row.remaining),
                );
            }
        }
        Commands::Detailed => {
            for row in book.detailed_report()? {
                println!(
                    "{} (opening {})",
                    row.department,
                    money::format(row.net_opening_balance)
                );
                for (quarter, balance) in Quarter::ALL.iter().zip(row.quarters.iter()) {
                    println!(
                        "  {quarter}: +{} -{} = {}",
                        money::format(balance.allocated),
                        money::format(balance.spent),
                        money::format(balance.closing),
                    );
                }
            }
        }
        Commands::Search {
            department,
            text,
            quarter,
        } => {
            let filter = SearchFilter {
                department,
                text,
                quarter,
            };
            for entry in book.search(&filter)? {
                println!(
                    "{} {:5} {} {} {}",
                    entry.date,
                    entry.kind.to_string(),
                    entry.department,
                    entry.reference,
                    money::format(entry.amount),
                );
            }
        }
    }
    Ok(())
}
