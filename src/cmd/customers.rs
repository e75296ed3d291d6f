//! Customers command - revenue by customer and unattributed revenue

use crate::cmd::{format_pct, format_usd, InputArgs};
use clap::Args;
use ledgerlens::reports::{needs_review, sales_by_customer, NeedsReviewPage, SalesByCustomerReport};
use tabled::{
    settings::{object::Columns, Alignment, Modify, Style},
    Table, Tabled,
};

#[derive(Args, Debug)]
pub struct CustomersCommand {
    #[command(flatten)]
    input: InputArgs,

    /// List revenue with no customer attached instead of the totals
    #[arg(long)]
    review: bool,

    /// Page of the review list (1-based, 25 per page)
    #[arg(long, default_value_t = 1)]
    page: usize,

    /// Output as JSON instead of a formatted table
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Tabled)]
struct CustomerLine {
    #[tabled(rename = "Customer")]
    name: String,
    #[tabled(rename = "Sales")]
    amount: String,
    #[tabled(rename = "Share")]
    pct: String,
    #[tabled(rename = "Txns")]
    count: usize,
}

#[derive(Debug, Tabled)]
struct ReviewLine {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Id")]
    id: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "Description")]
    description: String,
}

impl CustomersCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let transactions = self.input.load_transactions()?;

        if self.review {
            let page = needs_review(&transactions, self.page);
            if self.json {
                println!("{}", serde_json::to_string_pretty(&page)?);
            } else {
                print_review(&page);
            }
        } else {
            let config = self.input.load_config()?;
            let report = sales_by_customer(&transactions, &config.customers);
            if self.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_sales(&report);
            }
        }
        Ok(())
    }
}

fn print_sales(report: &SalesByCustomerReport) {
    if report.rows.is_empty() {
        println!("No revenue found");
        return;
    }

    let rows: Vec<CustomerLine> = report
        .rows
        .iter()
        .map(|r| CustomerLine {
            name: r.name.clone(),
            amount: format_usd(r.amount),
            pct: format_pct(r.pct),
            count: r.transaction_count,
        })
        .collect();

    println!();
    println!("SALES BY CUSTOMER (total {})", format_usd(report.total));
    println!();
    let table = Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(1..)).with(Alignment::right()))
        .to_string();
    println!("{}", table);
    if report.unattributed_count > 0 {
        println!();
        println!(
            "\u{26A0} {} revenue transaction(s) have no customer (run with --review)",
            report.unattributed_count
        );
    }
    println!();
}

fn print_review(page: &NeedsReviewPage) {
    println!();
    println!(
        "REVENUE NEEDING A CUSTOMER ({} transactions, {})",
        page.total_count,
        format_usd(page.total_amount)
    );
    println!();

    if page.items.is_empty() {
        if page.total_count == 0 {
            println!("\u{2713} All revenue is attributed.");
        } else {
            println!("Page {} is past the end ({} pages)", page.page, page.total_pages);
        }
        println!();
        return;
    }

    let rows: Vec<ReviewLine> = page
        .items
        .iter()
        .map(|item| ReviewLine {
            date: item.date.format("%Y-%m-%d").to_string(),
            id: item.id.clone(),
            category: item.category.clone(),
            amount: format_usd(item.amount),
            description: item.description.clone().unwrap_or_default(),
        })
        .collect();
    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{}", table);
    println!("Page {} of {}", page.page, page.total_pages);
    println!();
}
