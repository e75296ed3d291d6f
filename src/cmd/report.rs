//! Report command - tax estimate, write-offs and estimate accuracy

use crate::cmd::InputArgs;
use clap::{Args, ValueEnum};
use ledgerlens::core::{EntityType, FilingStatus, TaxProfileOverrides};
use ledgerlens::reports::{build_tax_report, TaxReport};
use rust_decimal::Decimal;
use tabled::{
    settings::{object::Columns, Alignment, Modify, Style},
    Table, Tabled,
};

#[derive(Args, Debug)]
pub struct ReportCommand {
    #[command(flatten)]
    input: InputArgs,

    /// Legal entity type, overrides the configured profile
    #[arg(long, value_enum)]
    entity_type: Option<EntityTypeArg>,

    /// Federal filing status, overrides the configured profile
    #[arg(long, value_enum)]
    filing_status: Option<FilingStatusArg>,

    /// Flat state income tax rate, e.g. 0.05
    #[arg(long)]
    state_rate: Option<Decimal>,

    /// Skip self-employment tax
    #[arg(long)]
    no_self_employment: bool,

    /// Free-text legal structure (e.g. "Single-member LLC")
    #[arg(long)]
    legal_structure: Option<String>,

    /// Two-letter state code, shown in the report
    #[arg(long)]
    state_code: Option<String>,

    /// Estimate employer payroll taxes
    #[arg(long)]
    has_payroll: bool,

    /// Output as JSON instead of formatted text
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum EntityTypeArg {
    SoleProp,
    LlcSingle,
    LlcMulti,
    Partnership,
    SCorp,
    CCorp,
}

impl From<EntityTypeArg> for EntityType {
    fn from(arg: EntityTypeArg) -> Self {
        match arg {
            EntityTypeArg::SoleProp => EntityType::SoleProp,
            EntityTypeArg::LlcSingle => EntityType::LlcSingle,
            EntityTypeArg::LlcMulti => EntityType::LlcMulti,
            EntityTypeArg::Partnership => EntityType::Partnership,
            EntityTypeArg::SCorp => EntityType::SCorp,
            EntityTypeArg::CCorp => EntityType::CCorp,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum FilingStatusArg {
    Single,
    MarriedJoint,
    MarriedSeparate,
    HeadOfHousehold,
}

impl From<FilingStatusArg> for FilingStatus {
    fn from(arg: FilingStatusArg) -> Self {
        match arg {
            FilingStatusArg::Single => FilingStatus::Single,
            FilingStatusArg::MarriedJoint => FilingStatus::MarriedJoint,
            FilingStatusArg::MarriedSeparate => FilingStatus::MarriedSeparate,
            FilingStatusArg::HeadOfHousehold => FilingStatus::HeadOfHousehold,
        }
    }
}

#[derive(Debug, Tabled)]
struct LineRow {
    #[tabled(rename = "")]
    label: &'static str,
    #[tabled(rename = "Amount")]
    amount: String,
}

impl ReportCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let transactions = self.input.load_transactions()?;
        let config = self.input.load_config()?;
        let report = build_tax_report(&transactions, &config, &self.overrides());

        if self.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            self.print_report(&report);
        }
        Ok(())
    }

    fn overrides(&self) -> TaxProfileOverrides {
        TaxProfileOverrides {
            entity_type: self.entity_type.map(Into::into),
            filing_status: self.filing_status.map(Into::into),
            state_rate: self.state_rate,
            include_self_employment: self.no_self_employment.then_some(false),
            legal_structure: self.legal_structure.clone(),
            state_code: self.state_code.clone(),
            has_payroll: self.has_payroll.then_some(true),
        }
    }

    fn print_report(&self, report: &TaxReport) {
        let b = &report.breakdown;
        let usd = |s: &str| match s.strip_prefix('-') {
            Some(abs) => format!("-${}", abs),
            None => format!("${}", s),
        };

        println!();
        println!("TAX ESTIMATE ({} transactions)", b.meta.transaction_count);
        println!();
        println!("  Profit YTD:              {}", usd(&report.simple_cards.profit_ytd));
        println!(
            "  Estimated taxes owed:    {}",
            usd(&report.simple_cards.estimated_taxes_owed_ytd)
        );
        println!();

        let lines = [
            ("Gross income", &b.income.gross_income),
            ("Non-taxable income", &b.income.non_taxable_income),
            ("Taxable income", &b.income.taxable_income),
            ("Deductible expenses", &b.write_offs.deductible_expenses),
            ("Non-deductible expenses", &b.write_offs.non_deductible_expenses),
            ("Standard deduction", &b.write_offs.standard_deduction),
            ("Half SE deduction", &b.write_offs.se_half_deduction),
            ("Net profit", &b.profit.net_profit),
            ("Taxable profit", &b.profit.taxable_profit),
            ("Federal income tax", &b.taxes.federal),
            ("State income tax", &b.taxes.state),
            ("Self-employment tax", &b.taxes.self_employment),
            ("Total estimated tax", &b.taxes.total),
        ];
        let rows: Vec<LineRow> = lines
            .into_iter()
            .map(|(label, amount)| LineRow {
                label,
                amount: usd(amount),
            })
            .collect();
        let table = Table::new(rows)
            .with(Style::rounded())
            .with(Modify::new(Columns::new(1..)).with(Alignment::right()))
            .to_string();
        println!("{}", table);

        if b.taxes.payroll_employer != "0.00" || b.taxes.sales_tax_liability != "0.00" {
            println!();
            println!("  Not included in the total:");
            println!("    Employer payroll taxes:  {}", usd(&b.taxes.payroll_employer));
            println!("    Sales tax to remit:      {}", usd(&b.taxes.sales_tax_liability));
        }
        if b.meta.review_count > 0 {
            println!();
            println!(
                "  {} expense(s) need a tax treatment decision (run `validate`)",
                b.meta.review_count
            );
        }

        println!();
        println!("ACCURACY: {}/100", report.accuracy.score);
        println!("  {}", report.accuracy.sentence);
        for hint in &report.accuracy.checklist {
            println!("  - {}", hint);
        }
        println!();
    }
}
