//! Income statement, balance sheet and cash flow from bucketed transactions.
//!
//! Totals saturate at the `Decimal` bounds instead of overflowing.

use chrono::Datelike;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::core::{transaction_buckets, BucketSet, CashFlowBucket, Transaction};

/// Income and expenses over PnL-eligible transactions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeStatement {
    pub total_income: Decimal,
    pub total_expenses: Decimal,
    pub net_income: Decimal,
}

/// Headline inflow/outflow totals over every transaction, ignoring buckets.
///
/// The tax report's gross income, `profitYtd` and `netProfit` use these, so
/// owner investments, loan proceeds and other financing inflows count as
/// income there. The PnL view uses [`IncomeStatement`], which leaves out
/// balance-sheet movements.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BasicKpis {
    pub total_income: Decimal,
    pub total_expenses: Decimal,
    pub net: Decimal,
}

/// One category line of the PnL
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PnlRow {
    pub category: String,
    pub income: Decimal,
    pub expenses: Decimal,
    pub net: Decimal,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceSheet {
    pub assets: Decimal,
    pub liabilities: Decimal,
    pub equity: Decimal,
    /// True when equity fell back to assets minus liabilities
    pub equity_derived: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CashFlow {
    pub operating: Decimal,
    pub investing: Decimal,
    pub financing: Decimal,
    pub net_change: Decimal,
}

/// PnL totals for one calendar month
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyRow {
    pub year: i32,
    pub month: u32,
    pub income: Decimal,
    pub expenses: Decimal,
    pub net: Decimal,
}

impl MonthlyRow {
    /// "YYYY-MM"
    pub fn period(&self) -> String {
        format!("{:04}-{:02}", self.year, self.month)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialStatements {
    pub income_statement: IncomeStatement,
    pub pnl: Vec<PnlRow>,
    pub balance_sheet: BalanceSheet,
    pub cash_flow: CashFlow,
    pub monthly: Vec<MonthlyRow>,
}

fn eligible(transactions: &[Transaction]) -> impl Iterator<Item = &Transaction> {
    transactions
        .iter()
        .filter(|tx| transaction_buckets(tx).is_pnl_eligible())
}

/// Sum inflows and outflows (as positive) of the given transactions
fn split_totals<'a>(transactions: impl Iterator<Item = &'a Transaction>) -> (Decimal, Decimal) {
    transactions.fold((Decimal::ZERO, Decimal::ZERO), |(income, expenses), tx| {
        if tx.is_income() {
            (income.saturating_add(tx.amount), expenses)
        } else {
            (income, expenses.saturating_add(tx.amount.abs()))
        }
    })
}

pub fn income_statement(transactions: &[Transaction]) -> IncomeStatement {
    let (total_income, total_expenses) = split_totals(eligible(transactions));
    IncomeStatement {
        total_income,
        total_expenses,
        net_income: total_income - total_expenses,
    }
}

pub fn basic_kpis(transactions: &[Transaction]) -> BasicKpis {
    let (total_income, total_expenses) = split_totals(transactions.iter());
    BasicKpis {
        total_income,
        total_expenses,
        net: total_income - total_expenses,
    }
}

/// PnL-eligible transactions grouped by canonical category, sorted by label
pub fn pnl_rows(transactions: &[Transaction]) -> Vec<PnlRow> {
    let mut rows: BTreeMap<String, PnlRow> = BTreeMap::new();
    for tx in eligible(transactions) {
        let label = tx.category_label();
        let row = rows.entry(label.clone()).or_insert_with(|| PnlRow {
            category: label,
            ..Default::default()
        });
        if tx.is_income() {
            row.income = row.income.saturating_add(tx.amount);
        } else {
            row.expenses = row.expenses.saturating_add(tx.amount.abs());
        }
        row.net = row.net.saturating_add(tx.amount);
    }
    rows.into_values().collect()
}

pub fn balance_sheet(transactions: &[Transaction]) -> BalanceSheet {
    let mut assets = Decimal::ZERO;
    let mut liabilities = Decimal::ZERO;
    let mut equity = Decimal::ZERO;
    let mut equity_rows = 0usize;

    for tx in transactions {
        let buckets: BucketSet = transaction_buckets(tx);
        if buckets.asset {
            assets = assets.saturating_add(tx.amount.abs());
        }
        if buckets.liability {
            liabilities = liabilities.saturating_add(if tx.amount > Decimal::ZERO {
                tx.amount
            } else {
                tx.amount.abs()
            });
        }
        if buckets.equity {
            equity = equity.saturating_add(tx.amount);
            equity_rows += 1;
        }
    }

    let equity_derived = equity_rows == 0 || equity.is_zero();
    if equity_derived {
        equity = assets - liabilities;
    }

    BalanceSheet {
        assets,
        liabilities,
        equity,
        equity_derived,
    }
}

pub fn cash_flow(transactions: &[Transaction]) -> CashFlow {
    let mut flow = CashFlow::default();
    for tx in transactions {
        let total = match transaction_buckets(tx).cash_flow {
            CashFlowBucket::Operating => &mut flow.operating,
            CashFlowBucket::Investing => &mut flow.investing,
            CashFlowBucket::Financing => &mut flow.financing,
        };
        *total = total.saturating_add(tx.amount);
        flow.net_change = flow.net_change.saturating_add(tx.amount);
    }
    flow
}

/// PnL-eligible totals per calendar month of the transaction date, oldest first
pub fn monthly_series(transactions: &[Transaction]) -> Vec<MonthlyRow> {
    let mut months: BTreeMap<(i32, u32), MonthlyRow> = BTreeMap::new();
    for tx in eligible(transactions) {
        let key = (tx.date.year(), tx.date.month());
        let row = months.entry(key).or_insert_with(|| MonthlyRow {
            year: key.0,
            month: key.1,
            income: Decimal::ZERO,
            expenses: Decimal::ZERO,
            net: Decimal::ZERO,
        });
        if tx.is_income() {
            row.income = row.income.saturating_add(tx.amount);
        } else {
            row.expenses = row.expenses.saturating_add(tx.amount.abs());
        }
        row.net = row.net.saturating_add(tx.amount);
    }
    months.into_values().collect()
}

pub fn build_statements(transactions: &[Transaction]) -> FinancialStatements {
    FinancialStatements {
        income_statement: income_statement(transactions),
        pnl: pnl_rows(transactions),
        balance_sheet: balance_sheet(transactions),
        cash_flow: cash_flow(transactions),
        monthly: monthly_series(transactions),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fixtures::{tx, tx_on};
    use rust_decimal_macros::dec;

    fn sample() -> Vec<Transaction> {
        vec![
            tx_on("1", "2024-01-05", dec!(5000), "Consulting"),
            tx_on("2", "2024-01-20", dec!(-1200), "Equipment"),
            tx_on("3", "2024-02-02", dec!(-300), "Software"),
            tx_on("4", "2024-02-10", dec!(10000), "Owner Investment"),
            tx_on("5", "2024-03-01", dec!(-450.25), "Credit Card Payment"),
            tx_on("6", "2024-03-15", dec!(2500), "Loan proceeds"),
            tx_on("7", "2024-03-31", dec!(-80), ""),
            tx_on("8", "2023-12-31", dec!(700.10), "Product sales"),
        ]
    }

    #[test]
    fn income_statement_skips_balance_sheet_rows() {
        let statement = income_statement(&sample());
        assert_eq!(statement.total_income, dec!(5700.10));
        assert_eq!(statement.total_expenses, dec!(380));
        assert_eq!(statement.net_income, dec!(5320.10));
    }

    #[test]
    fn basic_kpis_use_every_row() {
        let kpis = basic_kpis(&sample());
        assert_eq!(kpis.total_income, dec!(18200.10));
        assert_eq!(kpis.total_expenses, dec!(2030.25));
        assert_eq!(kpis.net, dec!(16169.85));
    }

    #[test]
    fn pnl_rows_sum_to_net_income() {
        let txs = sample();
        let rows = pnl_rows(&txs);
        let total: Decimal = rows.iter().map(|r| r.net).sum();
        assert_eq!(total, income_statement(&txs).net_income);
        let labels: Vec<_> = rows.iter().map(|r| r.category.as_str()).collect();
        assert_eq!(labels, vec!["Consulting", "Product Sales", "Software", "Uncategorized"]);
    }

    #[test]
    fn cash_flow_preserves_total() {
        let txs = sample();
        let flow = cash_flow(&txs);
        let total: Decimal = txs.iter().map(|t| t.amount).sum();
        assert_eq!(flow.net_change, total);
        assert_eq!(flow.investing, dec!(-1200));
        assert_eq!(flow.financing, dec!(10000) + dec!(-450.25) + dec!(2500));
        assert_eq!(flow.operating, dec!(5000) - dec!(300) - dec!(80) + dec!(700.10));
    }

    #[test]
    fn balance_sheet_totals() {
        let sheet = balance_sheet(&sample());
        assert_eq!(sheet.assets, dec!(1200));
        // Credit card payment and loan proceeds both add their magnitude
        assert_eq!(sheet.liabilities, dec!(2950.25));
        assert_eq!(sheet.equity, dec!(10000));
        assert!(!sheet.equity_derived);
    }

    #[test]
    fn equity_falls_back_to_assets_minus_liabilities() {
        let txs = vec![
            tx("1", dec!(-5000), "Delivery Truck"),
            tx("2", dec!(-1000), "Loan Payment"),
        ];
        let sheet = balance_sheet(&txs);
        assert_eq!(sheet.equity, dec!(4000));
        assert!(sheet.equity_derived);

        // contributions that net to zero also fall back
        let txs = vec![
            tx("1", dec!(500), "Owner Investment"),
            tx("2", dec!(-500), "Owner Draw"),
            tx("3", dec!(-300), "Computer"),
        ];
        let sheet = balance_sheet(&txs);
        assert_eq!(sheet.equity, dec!(300));
        assert!(sheet.equity_derived);
    }

    #[test]
    fn monthly_series_uses_calendar_months() {
        let mut txs = sample();
        txs.push(tx_on("9", "2024-01-31", dec!(100), "Consulting"));
        let months = monthly_series(&txs);
        let periods: Vec<_> = months.iter().map(MonthlyRow::period).collect();
        assert_eq!(periods, vec!["2023-12", "2024-01", "2024-02", "2024-03"]);
        assert_eq!(months[1].income, dec!(5100));
        assert_eq!(months[1].expenses, Decimal::ZERO);
        assert_eq!(months[2].net, dec!(-300));
        let total: Decimal = months.iter().map(|m| m.net).sum();
        assert_eq!(total, income_statement(&txs).net_income);
    }

    #[test]
    fn investment_income_stays_on_balance_sheet() {
        let txs = vec![
            tx("1", dec!(1000), "Consulting"),
            tx("2", dec!(250), "Dividends"),
        ];
        assert_eq!(income_statement(&txs).total_income, dec!(1000));
        assert_eq!(balance_sheet(&txs).assets, dec!(250));
        assert_eq!(cash_flow(&txs).investing, dec!(250));
        assert_eq!(basic_kpis(&txs).total_income, dec!(1250));
    }

    #[test]
    fn huge_amounts_saturate() {
        let big = dec!(70000000000000000000000000000);
        let txs = vec![
            tx("1", big, "Consulting"),
            tx("2", big, "Consulting"),
            tx("3", -big, "Equipment"),
            tx("4", -big, "Equipment"),
            tx("5", big, "Owner Investment"),
            tx("6", big, "Owner Investment"),
            tx("7", -big, "Loan Payment"),
            tx("8", -big, "Loan Payment"),
        ];
        let statements = build_statements(&txs);
        assert_eq!(statements.income_statement.total_income, Decimal::MAX);
        assert_eq!(statements.pnl[0].net, Decimal::MAX);
        assert_eq!(statements.balance_sheet.assets, Decimal::MAX);
        assert_eq!(statements.cash_flow.investing, Decimal::MIN);
        assert_eq!(statements.monthly[0].income, Decimal::MAX);
        assert_eq!(basic_kpis(&txs).total_income, Decimal::MAX);
    }

    #[test]
    fn empty_batch() {
        let statements = build_statements(&[]);
        assert_eq!(statements.income_statement, IncomeStatement::default());
        assert!(statements.pnl.is_empty());
        assert_eq!(statements.balance_sheet.equity, Decimal::ZERO);
        assert!(statements.monthly.is_empty());
    }
}
