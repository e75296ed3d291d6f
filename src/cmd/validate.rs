//! Validate command - surface data quality issues without generating full reports

use crate::cmd::{format_usd, InputArgs};
use clap::Args;
use ledgerlens::reports::{money, validate_transactions, TransactionIssues};
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Args, Debug)]
pub struct ValidateCommand {
    #[command(flatten)]
    input: InputArgs,

    /// Output as JSON instead of formatted text
    #[arg(long)]
    json: bool,
}

/// A validation issue for output
#[derive(Debug, Clone, Serialize)]
struct ValidationIssue {
    #[serde(rename = "type")]
    issue_type: &'static str,
    id: String,
    date: String,
    amount: String,
    category: String,
    message: String,
    #[serde(skip)]
    signed_amount: Decimal,
}

/// JSON output structure
#[derive(Debug, Serialize)]
struct ValidationOutput<'a> {
    transaction_count: usize,
    issue_count: usize,
    issues: &'a [ValidationIssue],
}

impl ValidateCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let transactions = self.input.load_transactions()?;
        let config = self.input.load_config()?;
        let flagged = validate_transactions(&transactions, &config.category_rules);
        let issues: Vec<ValidationIssue> = flagged.iter().flat_map(issues_for).collect();

        if self.json {
            let output = ValidationOutput {
                transaction_count: transactions.len(),
                issue_count: issues.len(),
                issues: &issues,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            print_text(&issues, transactions.len());
        }

        // Exit with code 1 if issues found
        if !issues.is_empty() {
            std::process::exit(1);
        }
        Ok(())
    }
}

fn issues_for(flagged: &TransactionIssues) -> impl Iterator<Item = ValidationIssue> + '_ {
    flagged.warnings.iter().map(move |w| ValidationIssue {
        issue_type: w.name(),
        id: flagged.id.clone(),
        date: flagged.date.format("%Y-%m-%d").to_string(),
        amount: money(flagged.amount),
        category: flagged.category.clone(),
        message: w.message(),
        signed_amount: flagged.amount,
    })
}

fn print_text(issues: &[ValidationIssue], transaction_count: usize) {
    println!();
    println!("VALIDATION RESULTS ({} transactions)", transaction_count);
    println!();

    if issues.is_empty() {
        println!("\u{2713} No issues found.");
        return;
    }

    println!("\u{26A0} {} issue(s) found:", issues.len());
    println!();
    for (i, issue) in issues.iter().enumerate() {
        println!(
            "  {}. [{}] {} {} {} ({})",
            i + 1,
            issue.issue_type,
            issue.date,
            issue.id,
            format_usd(issue.signed_amount),
            issue.category
        );
        println!("     {}", issue.message);
        println!();
    }
}
