//! The tax report envelope served to dashboards.
//!
//! Money is rendered as strings with two decimal places so that consumers
//! never see binary float noise.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use super::accuracy::{score_accuracy, AccuracyReport};
use super::statements::basic_kpis;
use crate::core::{EngineConfig, EntityType, FilingStatus, TaxProfileOverrides, Transaction};
use crate::tax::{estimate_tax, summarize_tax};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxReport {
    pub simple_cards: SimpleCards,
    pub breakdown: Breakdown,
    pub accuracy: AccuracyReport,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimpleCards {
    pub profit_ytd: String,
    pub estimated_taxes_owed_ytd: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Breakdown {
    pub income: IncomeBreakdown,
    pub write_offs: WriteOffs,
    pub profit: ProfitBreakdown,
    pub taxes: TaxesBreakdown,
    pub meta: ReportMeta,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeBreakdown {
    pub gross_income: String,
    pub non_taxable_income: String,
    pub taxable_income: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WriteOffs {
    pub deductible_expenses: String,
    pub non_deductible_expenses: String,
    pub standard_deduction: String,
    pub se_half_deduction: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfitBreakdown {
    pub net_profit: String,
    pub taxable_profit: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxesBreakdown {
    pub federal: String,
    pub state: String,
    pub self_employment: String,
    pub payroll_employer: String,
    pub sales_tax_liability: String,
    pub total: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportMeta {
    pub transaction_count: usize,
    pub review_count: usize,
    pub entity_type: EntityType,
    pub filing_status: FilingStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_code: Option<String>,
}

/// Two decimal places, half away from zero
pub fn money(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.2}", rounded)
}

/// Build the full tax report for one business and date window
pub fn build_tax_report(
    transactions: &[Transaction],
    config: &EngineConfig,
    overrides: &TaxProfileOverrides,
) -> TaxReport {
    let profile = config.profile.with_overrides(overrides);
    let kpis = basic_kpis(transactions);
    let summary = summarize_tax(transactions, &config.category_rules);
    let estimate = estimate_tax(&summary, &profile);
    let accuracy = score_accuracy(transactions);

    log::debug!(
        "Tax report over {} transactions: net {} estimated tax {}",
        transactions.len(),
        kpis.net,
        estimate.total
    );

    TaxReport {
        simple_cards: SimpleCards {
            profit_ytd: money(kpis.net),
            estimated_taxes_owed_ytd: money(estimate.total),
        },
        breakdown: Breakdown {
            income: IncomeBreakdown {
                gross_income: money(kpis.total_income),
                non_taxable_income: money(summary.non_taxable_income),
                taxable_income: money(summary.taxable_income),
            },
            write_offs: WriteOffs {
                deductible_expenses: money(summary.deductible_expenses),
                non_deductible_expenses: money(summary.non_deductible_expenses),
                standard_deduction: money(estimate.standard_deduction),
                se_half_deduction: money(estimate.self_employment.half_deduction),
            },
            profit: ProfitBreakdown {
                net_profit: money(kpis.net),
                taxable_profit: money(estimate.taxable_profit),
            },
            taxes: TaxesBreakdown {
                federal: money(estimate.federal),
                state: money(estimate.state),
                self_employment: money(estimate.self_employment.total),
                payroll_employer: money(estimate.payroll_employer),
                sales_tax_liability: money(estimate.sales_tax_liability),
                total: money(estimate.total),
            },
            meta: ReportMeta {
                transaction_count: transactions.len(),
                review_count: summary.review_count,
                entity_type: profile.entity_type,
                filing_status: profile.filing_status,
                state_code: profile.state_code.clone(),
            },
        },
        accuracy,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fixtures::tx;
    use rust_decimal_macros::dec;

    #[test]
    fn consulting_with_equipment() {
        let txs = vec![
            tx("1", dec!(5000), "Consulting"),
            tx("2", dec!(-1200), "Equipment"),
        ];
        let report = build_tax_report(&txs, &EngineConfig::default(), &TaxProfileOverrides::default());

        assert_eq!(report.simple_cards.profit_ytd, "3800.00");
        assert_eq!(report.simple_cards.estimated_taxes_owed_ytd, "706.48");
        let breakdown = &report.breakdown;
        assert_eq!(breakdown.income.gross_income, "5000.00");
        assert_eq!(breakdown.income.taxable_income, "5000.00");
        assert_eq!(breakdown.write_offs.deductible_expenses, "0.00");
        assert_eq!(breakdown.write_offs.non_deductible_expenses, "1200.00");
        assert_eq!(breakdown.write_offs.standard_deduction, "14600.00");
        assert_eq!(breakdown.profit.taxable_profit, "5000.00");
        assert_eq!(breakdown.taxes.federal, "0.00");
        assert_eq!(breakdown.taxes.total, "706.48");
        assert_eq!(breakdown.meta.transaction_count, 2);
    }

    #[test]
    fn overrides_apply_on_top_of_profile() {
        let txs = vec![tx("1", dec!(100000), "Consulting")];
        let overrides = TaxProfileOverrides {
            legal_structure: Some("C Corporation".to_string()),
            state_rate: Some(dec!(0.05)),
            state_code: Some("CA".to_string()),
            ..Default::default()
        };
        let report = build_tax_report(&txs, &EngineConfig::default(), &overrides);
        let taxes = &report.breakdown.taxes;
        assert_eq!(taxes.federal, "21000.00");
        assert_eq!(taxes.state, "5000.00");
        assert_eq!(taxes.self_employment, "0.00");
        assert_eq!(taxes.total, "26000.00");
        assert_eq!(report.breakdown.meta.entity_type, EntityType::CCorp);
        assert_eq!(report.breakdown.meta.state_code.as_deref(), Some("CA"));
    }

    #[test]
    fn money_rounds_half_away_from_zero() {
        assert_eq!(money(dec!(706.4775)), "706.48");
        assert_eq!(money(dec!(0.125)), "0.13");
        assert_eq!(money(dec!(-0.125)), "-0.13");
        assert_eq!(money(dec!(0.124)), "0.12");
        assert_eq!(money(dec!(5)), "5.00");
    }

    #[test]
    fn huge_amounts_do_not_overflow() {
        let big = dec!(70000000000000000000000000000);
        let txs = vec![tx("1", big, "Consulting"), tx("2", big, "Consulting")];
        let report = build_tax_report(&txs, &EngineConfig::default(), &TaxProfileOverrides::default());
        assert_eq!(report.breakdown.income.gross_income, money(Decimal::MAX));
        assert_eq!(report.breakdown.profit.taxable_profit, money(Decimal::MAX));
        assert_eq!(report.breakdown.meta.transaction_count, 2);
    }

    #[test]
    fn empty_window() {
        let report = build_tax_report(&[], &EngineConfig::default(), &TaxProfileOverrides::default());
        assert_eq!(report.simple_cards.estimated_taxes_owed_ytd, "0.00");
        assert_eq!(report.accuracy.score, 20);
        assert_eq!(report.breakdown.meta.transaction_count, 0);
    }

    #[test]
    fn serializes_camel_case() {
        let report = build_tax_report(&[], &EngineConfig::default(), &TaxProfileOverrides::default());
        let json = serde_json::to_value(&report).unwrap();
        assert!(json["simpleCards"]["estimatedTaxesOwedYtd"].is_string());
        assert!(json["breakdown"]["writeOffs"]["seHalfDeduction"].is_string());
        assert_eq!(json["breakdown"]["meta"]["transactionCount"], 0);
        assert!(json["accuracy"]["checklist"].is_array());
    }
}
