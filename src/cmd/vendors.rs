//! Vendors command - spending grouped by vendor

use crate::cmd::{format_pct, format_usd, InputArgs};
use clap::Args;
use ledgerlens::reports::expenses_by_vendor;
use tabled::{
    settings::{object::Columns, Alignment, Modify, Style},
    Table, Tabled,
};

#[derive(Args, Debug)]
pub struct VendorsCommand {
    #[command(flatten)]
    input: InputArgs,

    /// Output as JSON instead of a formatted table
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Tabled)]
struct VendorLine {
    #[tabled(rename = "Vendor")]
    vendor: String,
    #[tabled(rename = "Spent")]
    amount: String,
    #[tabled(rename = "Share")]
    pct: String,
    #[tabled(rename = "Txns")]
    count: usize,
}

impl VendorsCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let transactions = self.input.load_transactions()?;
        let report = expenses_by_vendor(&transactions);

        if self.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
            return Ok(());
        }

        if report.rows.is_empty() {
            println!("No expenses found");
            return Ok(());
        }

        let rows: Vec<VendorLine> = report
            .rows
            .iter()
            .map(|r| VendorLine {
                vendor: r.vendor.clone(),
                amount: format_usd(r.amount),
                pct: format_pct(r.pct),
                count: r.transaction_count,
            })
            .collect();

        println!();
        println!("EXPENSES BY VENDOR (total {})", format_usd(report.total));
        println!();
        let table = Table::new(rows)
            .with(Style::rounded())
            .with(Modify::new(Columns::new(1..)).with(Alignment::right()))
            .to_string();
        println!("{}", table);
        if !report.has_vendor_field {
            println!();
            println!("No vendor, merchant or payee fields found; vendors were read from descriptions.");
        }
        println!();
        Ok(())
    }
}
