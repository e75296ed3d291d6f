//! Statements command - income statement, balance sheet, cash flow and monthly trend

use crate::cmd::{format_usd, InputArgs};
use clap::Args;
use ledgerlens::reports::{build_statements, money, FinancialStatements};
use serde::Serialize;
use std::io;
use tabled::{
    settings::{object::Columns, Alignment, Modify, Style},
    Table, Tabled,
};

#[derive(Args, Debug)]
pub struct StatementsCommand {
    #[command(flatten)]
    input: InputArgs,

    /// Output as JSON instead of formatted text
    #[arg(long, conflicts_with = "csv")]
    json: bool,

    /// Output the profit and loss rows as CSV
    #[arg(long)]
    csv: bool,
}

/// Row for the profit and loss table and CSV output
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct PnlLine {
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Income")]
    income: String,
    #[tabled(rename = "Expenses")]
    expenses: String,
    #[tabled(rename = "Net")]
    net: String,
}

#[derive(Debug, Clone, Tabled)]
struct MonthLine {
    #[tabled(rename = "Month")]
    period: String,
    #[tabled(rename = "Income")]
    income: String,
    #[tabled(rename = "Expenses")]
    expenses: String,
    #[tabled(rename = "Net")]
    net: String,
}

impl StatementsCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let transactions = self.input.load_transactions()?;
        let statements = build_statements(&transactions);

        if self.json {
            println!("{}", serde_json::to_string_pretty(&statements)?);
            Ok(())
        } else if self.csv {
            self.write_csv(&pnl_lines(&statements))
        } else {
            self.print_text(&statements);
            Ok(())
        }
    }

    fn print_text(&self, statements: &FinancialStatements) {
        let income = &statements.income_statement;
        println!();
        println!("PROFIT & LOSS");
        println!();
        let lines = pnl_lines(statements);
        if lines.is_empty() {
            println!("  (no income or expense activity)");
        } else {
            println!("{}", right_aligned(Table::new(lines)));
        }
        println!("  Total income:    {}", format_usd(income.total_income));
        println!("  Total expenses:  {}", format_usd(income.total_expenses));
        println!("  Net income:      {}", format_usd(income.net_income));

        let sheet = &statements.balance_sheet;
        println!();
        println!("BALANCE SHEET");
        println!();
        println!("  Assets:          {}", format_usd(sheet.assets));
        println!("  Liabilities:     {}", format_usd(sheet.liabilities));
        if sheet.equity_derived {
            println!("  Equity:          {} (assets - liabilities)", format_usd(sheet.equity));
        } else {
            println!("  Equity:          {}", format_usd(sheet.equity));
        }

        let flow = &statements.cash_flow;
        println!();
        println!("CASH FLOW");
        println!();
        println!("  Operating:       {}", format_usd(flow.operating));
        println!("  Investing:       {}", format_usd(flow.investing));
        println!("  Financing:       {}", format_usd(flow.financing));
        println!("  Net change:      {}", format_usd(flow.net_change));

        if !statements.monthly.is_empty() {
            let months: Vec<MonthLine> = statements
                .monthly
                .iter()
                .map(|m| MonthLine {
                    period: m.period(),
                    income: format_usd(m.income),
                    expenses: format_usd(m.expenses),
                    net: format_usd(m.net),
                })
                .collect();
            println!();
            println!("MONTHLY");
            println!();
            println!("{}", right_aligned(Table::new(months)));
        }
        println!();
    }

    fn write_csv(&self, lines: &[PnlLine]) -> anyhow::Result<()> {
        let mut wtr = csv::Writer::from_writer(io::stdout());
        for line in lines {
            wtr.serialize(line)?;
        }
        wtr.flush()?;
        Ok(())
    }
}

fn pnl_lines(statements: &FinancialStatements) -> Vec<PnlLine> {
    statements
        .pnl
        .iter()
        .map(|row| PnlLine {
            category: row.category.clone(),
            income: money(row.income),
            expenses: money(row.expenses),
            net: money(row.net),
        })
        .collect()
}

fn right_aligned(mut table: Table) -> String {
    table
        .with(Style::rounded())
        .with(Modify::new(Columns::new(1..)).with(Alignment::right()))
        .to_string()
}
