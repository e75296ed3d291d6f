//! Per-transaction tax treatment and the aggregate tax summary.
//!
//! Treatment is resolved in priority order: the transaction's own override,
//! then the business's rule for its category, then keyword heuristics.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::core::{
    CategoryRule, CategoryRules, RuleTreatment, TaxCategoryOverride, TaxStatusOverride,
    Transaction,
};

const NON_TAXABLE_INCOME_KEYWORDS: &[&str] = &[
    "owner",
    "equity",
    "capital contribution",
    "transfer",
    "loan",
    "deposit",
];
const MEALS_KEYWORDS: &[&str] = &["meal", "restaurant", "dining"];
const CAPITALIZED_KEYWORDS: &[&str] = &[
    "equipment",
    "asset",
    "computer",
    "furniture",
    "vehicle",
    "truck",
];
const NON_DEDUCTIBLE_KEYWORDS: &[&str] = &["personal", "owner draw", "draw", "owner"];
const DEDUCTIBLE_KEYWORDS: &[&str] = &[
    "advertising",
    "software",
    "rent",
    "utilities",
    "payroll",
    "insurance",
    "travel",
    "fee",
    "professional",
    "contractor",
    "office",
    "supplies",
    "marketing",
    "subscription",
];

/// How a transaction is treated for income tax
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TreatmentKind {
    Taxable,
    NonTaxable,
    Deductible,
    PartialDeductible,
    NonDeductible,
    Capitalized,
    Review,
}

/// Where the treatment came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TreatmentSource {
    Override,
    CategoryRule,
    Heuristic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TaxTreatment {
    pub kind: TreatmentKind,
    /// Share of an expense deductible this year; zero for income
    pub deduction_pct: Decimal,
    pub source: TreatmentSource,
}

impl TaxTreatment {
    fn new(kind: TreatmentKind, source: TreatmentSource) -> Self {
        let deduction_pct = match kind {
            TreatmentKind::Deductible => Decimal::ONE,
            TreatmentKind::PartialDeductible => dec!(0.5),
            _ => Decimal::ZERO,
        };
        TaxTreatment {
            kind,
            deduction_pct,
            source,
        }
    }

    fn from_rule(rule: &CategoryRule) -> Self {
        let kind = match rule.treatment {
            RuleTreatment::Deductible => TreatmentKind::Deductible,
            RuleTreatment::Partial50 => TreatmentKind::PartialDeductible,
            RuleTreatment::NonDeductible => TreatmentKind::NonDeductible,
            RuleTreatment::Capitalized => TreatmentKind::Capitalized,
            RuleTreatment::NonTaxableIncome => TreatmentKind::NonTaxable,
            RuleTreatment::Review => TreatmentKind::Review,
        };
        TaxTreatment {
            kind,
            deduction_pct: rule.effective_deduction_pct(),
            source: TreatmentSource::CategoryRule,
        }
    }

    pub fn needs_review(&self) -> bool {
        self.kind == TreatmentKind::Review
    }
}

/// First defined source wins; the fallback is always available
pub fn first_defined<T>(first: Option<T>, second: Option<T>, fallback: impl FnOnce() -> T) -> T {
    first.or(second).unwrap_or_else(fallback)
}

/// Resolve the tax treatment of one transaction
pub fn classify_transaction(tx: &Transaction, rules: &CategoryRules) -> TaxTreatment {
    let label = tx.category_label();
    let income = tx.is_income();
    let treatment = first_defined(
        override_treatment(tx, income),
        rule_treatment(rules.get(&label), income),
        || heuristic_treatment(&label, income),
    );
    log::debug!(
        "tx {} ({}): {:?} via {:?}",
        tx.id,
        label,
        treatment.kind,
        treatment.source
    );
    treatment
}

fn override_treatment(tx: &Transaction, income: bool) -> Option<TaxTreatment> {
    let from_category = tx.tax_category_override.and_then(|o| {
        let kind = match (o, income) {
            (TaxCategoryOverride::Taxable, true) => TreatmentKind::Taxable,
            (TaxCategoryOverride::NonTaxable, true) => TreatmentKind::NonTaxable,
            (TaxCategoryOverride::Deductible, false) => TreatmentKind::Deductible,
            (TaxCategoryOverride::PartialDeductible, false) => TreatmentKind::PartialDeductible,
            (TaxCategoryOverride::NonDeductible, false) => TreatmentKind::NonDeductible,
            (TaxCategoryOverride::Capitalized, false) => TreatmentKind::Capitalized,
            _ => return None,
        };
        Some(kind)
    });
    let from_status = || {
        tx.tax_status_override.and_then(|o| match (o, income) {
            (TaxStatusOverride::Taxable, true) => Some(TreatmentKind::Taxable),
            (TaxStatusOverride::NonTaxable, true) => Some(TreatmentKind::NonTaxable),
            (TaxStatusOverride::Deductible, false) => Some(TreatmentKind::Deductible),
            (TaxStatusOverride::NonDeductible, false) => Some(TreatmentKind::NonDeductible),
            _ => None,
        })
    };
    from_category
        .or_else(from_status)
        .map(|kind| TaxTreatment::new(kind, TreatmentSource::Override))
}

fn rule_treatment(rule: Option<&CategoryRule>, income: bool) -> Option<TaxTreatment> {
    let rule = rule?;
    let income_rule = rule.treatment == RuleTreatment::NonTaxableIncome;
    (income == income_rule).then(|| TaxTreatment::from_rule(rule))
}

fn heuristic_treatment(label: &str, income: bool) -> TaxTreatment {
    let text = label.to_lowercase();
    let has = |keywords: &[&str]| keywords.iter().any(|k| text.contains(k));

    let kind = if income {
        if has(NON_TAXABLE_INCOME_KEYWORDS) {
            TreatmentKind::NonTaxable
        } else {
            TreatmentKind::Taxable
        }
    } else if has(MEALS_KEYWORDS) {
        TreatmentKind::PartialDeductible
    } else if has(CAPITALIZED_KEYWORDS) {
        TreatmentKind::Capitalized
    } else if has(NON_DEDUCTIBLE_KEYWORDS) {
        TreatmentKind::NonDeductible
    } else if has(DEDUCTIBLE_KEYWORDS) {
        TreatmentKind::Deductible
    } else {
        TreatmentKind::Review
    };
    TaxTreatment::new(kind, TreatmentSource::Heuristic)
}

/// Taxable income and deductible expenses for one category
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryTaxRow {
    pub category: String,
    pub taxable_income: Decimal,
    pub deductible_expenses: Decimal,
}

/// Income and expense totals split by tax treatment
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxSummary {
    pub gross_income: Decimal,
    pub taxable_income: Decimal,
    pub non_taxable_income: Decimal,
    pub total_expenses: Decimal,
    pub deductible_expenses: Decimal,
    pub non_deductible_expenses: Decimal,
    /// Outflows in payroll categories, the base for employer payroll tax
    pub payroll_expenses: Decimal,
    /// Net sales tax collected minus remitted
    pub sales_tax_collected: Decimal,
    pub by_category: Vec<CategoryTaxRow>,
    pub review_count: usize,
    pub transaction_count: usize,
}

impl TaxSummary {
    /// Taxable income less deductible expenses, never negative
    pub fn taxable_profit(&self) -> Decimal {
        (self.taxable_income - self.deductible_expenses).max(Decimal::ZERO)
    }
}

/// Classify every transaction and roll up the totals, saturating at the `Decimal` bounds
pub fn summarize_tax(transactions: &[Transaction], rules: &CategoryRules) -> TaxSummary {
    let mut summary = TaxSummary {
        transaction_count: transactions.len(),
        ..Default::default()
    };
    let mut by_category: BTreeMap<String, CategoryTaxRow> = BTreeMap::new();

    for tx in transactions {
        if tx.amount.is_zero() {
            continue;
        }
        let label = tx.category_label();
        let lower = label.to_lowercase();
        if lower.contains("sales tax") {
            summary.sales_tax_collected = summary.sales_tax_collected.saturating_add(tx.amount);
        }

        let treatment = classify_transaction(tx, rules);
        if treatment.needs_review() {
            summary.review_count += 1;
        }
        let row = by_category
            .entry(label.clone())
            .or_insert_with(|| CategoryTaxRow {
                category: label,
                ..Default::default()
            });

        if tx.is_income() {
            summary.gross_income = summary.gross_income.saturating_add(tx.amount);
            if treatment.kind == TreatmentKind::NonTaxable {
                summary.non_taxable_income = summary.non_taxable_income.saturating_add(tx.amount);
            } else {
                summary.taxable_income = summary.taxable_income.saturating_add(tx.amount);
                row.taxable_income = row.taxable_income.saturating_add(tx.amount);
            }
        } else {
            let spent = tx.amount.abs();
            let deductible = spent * treatment.deduction_pct;
            summary.total_expenses = summary.total_expenses.saturating_add(spent);
            summary.deductible_expenses = summary.deductible_expenses.saturating_add(deductible);
            summary.non_deductible_expenses = summary
                .non_deductible_expenses
                .saturating_add(spent - deductible);
            row.deductible_expenses = row.deductible_expenses.saturating_add(deductible);
            if lower.contains("payroll") {
                summary.payroll_expenses = summary.payroll_expenses.saturating_add(spent);
            }
        }
    }

    summary.sales_tax_collected = summary.sales_tax_collected.max(Decimal::ZERO);
    summary.by_category = by_category.into_values().collect();
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fixtures::tx;

    fn heuristic(amount: Decimal, category: &str) -> TaxTreatment {
        classify_transaction(&tx("t", amount, category), &CategoryRules::new())
    }

    #[test]
    fn heuristic_income() {
        assert_eq!(heuristic(dec!(5000), "Consulting").kind, TreatmentKind::Taxable);
        assert_eq!(heuristic(dec!(5000), "Owner Investment").kind, TreatmentKind::NonTaxable);
        assert_eq!(heuristic(dec!(100), "Transfer from savings").kind, TreatmentKind::NonTaxable);
        assert_eq!(heuristic(dec!(100), "Loan proceeds").kind, TreatmentKind::NonTaxable);
        assert_eq!(heuristic(dec!(100), "Mobile deposit").kind, TreatmentKind::NonTaxable);
    }

    #[test]
    fn heuristic_expenses() {
        let meals = heuristic(dec!(-80), "Business Meals");
        assert_eq!(meals.kind, TreatmentKind::PartialDeductible);
        assert_eq!(meals.deduction_pct, dec!(0.5));

        let equipment = heuristic(dec!(-1200), "Equipment");
        assert_eq!(equipment.kind, TreatmentKind::Capitalized);
        assert_eq!(equipment.deduction_pct, Decimal::ZERO);

        assert_eq!(heuristic(dec!(-50), "Personal").kind, TreatmentKind::NonDeductible);
        assert_eq!(heuristic(dec!(-50), "Owner Draw").kind, TreatmentKind::NonDeductible);
        assert_eq!(heuristic(dec!(-50), "Office Supplies").kind, TreatmentKind::Deductible);
        assert_eq!(heuristic(dec!(-50), "Bank Fees").kind, TreatmentKind::Deductible);

        let unknown = heuristic(dec!(-50), "Miscellaneous");
        assert_eq!(unknown.kind, TreatmentKind::Review);
        assert_eq!(unknown.deduction_pct, Decimal::ZERO);
        assert!(unknown.needs_review());
    }

    #[test]
    fn software_is_deductible() {
        let summary = summarize_tax(&[tx("t", dec!(-1000), "Software")], &CategoryRules::new());
        let treatment = heuristic(dec!(-1000), "Software");
        assert_eq!(treatment.kind, TreatmentKind::Deductible);
        assert_eq!(treatment.deduction_pct, Decimal::ONE);
        assert_eq!(summary.deductible_expenses, dec!(1000));
        assert_eq!(summary.non_deductible_expenses, Decimal::ZERO);
    }

    #[test]
    fn override_beats_rule_beats_heuristic() {
        let mut rules = CategoryRules::new();
        rules.insert("Software", CategoryRule::new(RuleTreatment::NonDeductible));

        let by_rule = classify_transaction(&tx("t", dec!(-10), "software"), &rules);
        assert_eq!(by_rule.kind, TreatmentKind::NonDeductible);
        assert_eq!(by_rule.source, TreatmentSource::CategoryRule);

        let mut overridden = tx("t", dec!(-10), "Software");
        overridden.tax_category_override = Some(TaxCategoryOverride::PartialDeductible);
        let by_override = classify_transaction(&overridden, &rules);
        assert_eq!(by_override.kind, TreatmentKind::PartialDeductible);
        assert_eq!(by_override.source, TreatmentSource::Override);
    }

    #[test]
    fn mismatched_override_falls_through() {
        let mut income = tx("t", dec!(100), "Consulting");
        income.tax_category_override = Some(TaxCategoryOverride::Deductible);
        let treatment = classify_transaction(&income, &CategoryRules::new());
        assert_eq!(treatment.kind, TreatmentKind::Taxable);
        assert_eq!(treatment.source, TreatmentSource::Heuristic);

        income.tax_status_override = Some(TaxStatusOverride::NonTaxable);
        let treatment = classify_transaction(&income, &CategoryRules::new());
        assert_eq!(treatment.kind, TreatmentKind::NonTaxable);
        assert_eq!(treatment.source, TreatmentSource::Override);
    }

    #[test]
    fn income_rules_only_apply_to_income() {
        let mut rules = CategoryRules::new();
        rules.insert("Grants", CategoryRule::new(RuleTreatment::NonTaxableIncome));
        rules.insert(
            "Consulting",
            CategoryRule {
                treatment: RuleTreatment::Deductible,
                deduction_pct: Some(dec!(0.8)),
            },
        );

        assert_eq!(
            classify_transaction(&tx("a", dec!(100), "Grants"), &rules).kind,
            TreatmentKind::NonTaxable
        );
        // expense rule ignored for income
        assert_eq!(
            classify_transaction(&tx("b", dec!(100), "Consulting"), &rules).kind,
            TreatmentKind::Taxable
        );
        let expense = classify_transaction(&tx("c", dec!(-100), "Consulting"), &rules);
        assert_eq!(expense.deduction_pct, dec!(0.8));
    }

    #[test]
    fn summary_totals() {
        let txs = vec![
            tx("1", dec!(5000), "Consulting"),
            tx("2", dec!(2000), "Owner Investment"),
            tx("3", dec!(-1200), "Equipment"),
            tx("4", dec!(-200), "Meals"),
            tx("5", dec!(-300), "Payroll"),
            tx("6", dec!(-75), "Miscellaneous"),
            tx("7", dec!(0), "Consulting"),
        ];
        let summary = summarize_tax(&txs, &CategoryRules::new());

        assert_eq!(summary.gross_income, dec!(7000));
        assert_eq!(summary.taxable_income, dec!(5000));
        assert_eq!(summary.non_taxable_income, dec!(2000));
        assert_eq!(summary.total_expenses, dec!(1775));
        assert_eq!(summary.deductible_expenses, dec!(400));
        assert_eq!(summary.non_deductible_expenses, dec!(1375));
        assert_eq!(summary.payroll_expenses, dec!(300));
        assert_eq!(summary.review_count, 1);
        assert_eq!(summary.transaction_count, 7);
        assert_eq!(summary.taxable_profit(), dec!(4600));

        let consulting = summary
            .by_category
            .iter()
            .find(|r| r.category == "Consulting")
            .unwrap();
        assert_eq!(consulting.taxable_income, dec!(5000));
        let meals = summary.by_category.iter().find(|r| r.category == "Meals").unwrap();
        assert_eq!(meals.deductible_expenses, dec!(100));
    }

    #[test]
    fn sales_tax_collected_is_net_and_floored() {
        let txs = vec![
            tx("1", dec!(80), "Sales Tax Collected"),
            tx("2", dec!(-30), "Sales tax remittance"),
        ];
        assert_eq!(summarize_tax(&txs, &CategoryRules::new()).sales_tax_collected, dec!(50));

        let overpaid = vec![tx("1", dec!(-30), "Sales Tax")];
        assert_eq!(
            summarize_tax(&overpaid, &CategoryRules::new()).sales_tax_collected,
            Decimal::ZERO
        );
    }

    #[test]
    fn huge_amounts_saturate() {
        let big = dec!(70000000000000000000000000000);
        let txs = vec![
            tx("1", big, "Consulting"),
            tx("2", big, "Consulting"),
            tx("3", -big, "Software"),
            tx("4", -big, "Software"),
        ];
        let summary = summarize_tax(&txs, &CategoryRules::new());
        assert_eq!(summary.gross_income, Decimal::MAX);
        assert_eq!(summary.taxable_income, Decimal::MAX);
        assert_eq!(summary.deductible_expenses, Decimal::MAX);
        assert_eq!(summary.taxable_profit(), Decimal::ZERO);
    }

    #[test]
    fn first_defined_order() {
        assert_eq!(first_defined(Some(1), Some(2), || 3), 1);
        assert_eq!(first_defined(None, Some(2), || 3), 2);
        assert_eq!(first_defined(None::<i32>, None, || 3), 3);
    }
}
