pub mod customers;
pub mod report;
pub mod schema;
pub mod statements;
pub mod validate;
pub mod vendors;

use chrono::NaiveDate;
use clap::Args;
use ledgerlens::core::{
    read_config_json, read_transactions_json, EngineConfig, Transaction, TransactionBatch,
};
use ledgerlens::reports::money;
use rust_decimal::Decimal;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};

/// Input options shared by every reporting command
#[derive(Args, Debug)]
pub struct InputArgs {
    /// JSON transaction batch ("-" reads stdin)
    #[arg(short, long, default_value = "-")]
    transactions: PathBuf,

    /// JSON engine configuration (tax profile, category rules, customers)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// First day to include (YYYY-MM-DD)
    #[arg(long)]
    start: Option<NaiveDate>,

    /// First day to exclude (YYYY-MM-DD)
    #[arg(long)]
    end: Option<NaiveDate>,
}

impl InputArgs {
    /// Transactions inside the date window, sorted by date
    pub fn load_transactions(&self) -> anyhow::Result<Vec<Transaction>> {
        let batch = read_batch(&self.transactions)?;
        let total = batch.transactions.len();
        let transactions: Vec<_> = batch
            .transactions
            .into_iter()
            .filter(|tx| in_window(tx.date, self.start, self.end))
            .collect();
        log::info!(
            "Loaded {} transaction(s), {} inside the date window",
            total,
            transactions.len()
        );
        Ok(transactions)
    }

    pub fn load_config(&self) -> anyhow::Result<EngineConfig> {
        match &self.config {
            Some(path) => {
                let file = File::open(path)?;
                let config = read_config_json(BufReader::new(file))?;
                log::info!(
                    "Loaded config with {} category rule(s) and {} customer(s)",
                    config.category_rules.len(),
                    config.customers.len()
                );
                Ok(config)
            }
            None => Ok(EngineConfig::default()),
        }
    }
}

/// Inclusive start, exclusive end
pub fn in_window(date: NaiveDate, start: Option<NaiveDate>, end: Option<NaiveDate>) -> bool {
    start.is_none_or(|s| date >= s) && end.is_none_or(|e| date < e)
}

/// Read a transaction batch (JSON) from a file, or stdin with "-"
pub fn read_batch(path: &Path) -> anyhow::Result<TransactionBatch> {
    if path.as_os_str() == "-" {
        read_from_stdin()
    } else {
        read_from_file(path)
    }
}

fn read_from_file(path: &Path) -> anyhow::Result<TransactionBatch> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    read_transactions_json(reader)
}

fn read_from_stdin() -> anyhow::Result<TransactionBatch> {
    let stdin = io::stdin();
    let mut reader = BufReader::new(stdin.lock());

    let mut buffer = Vec::new();
    reader.read_to_end(&mut buffer)?;

    if buffer.is_empty() {
        anyhow::bail!("No input received. Provide a file or pipe data to stdin.");
    }

    read_transactions_json(io::Cursor::new(buffer))
}

/// Two decimal places, negative amounts with a leading minus
pub fn format_usd(amount: Decimal) -> String {
    if amount < Decimal::ZERO {
        format!("-${}", money(amount.abs()))
    } else {
        format!("${}", money(amount))
    }
}

pub fn format_pct(pct: Decimal) -> String {
    format!("{:.1}%", pct)
}
