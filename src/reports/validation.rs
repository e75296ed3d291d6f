use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::core::{CategoryRules, Transaction, Warning};
use crate::tax::classify_transaction;

/// Confidence below this is flagged for review
pub const LOW_CONFIDENCE: f64 = 0.5;

/// Warnings raised by one transaction
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionIssues {
    pub id: String,
    pub date: NaiveDate,
    pub amount: Decimal,
    pub category: String,
    pub warnings: Vec<Warning>,
}

/// Data-quality warnings for a single transaction
pub fn transaction_warnings(tx: &Transaction, rules: &CategoryRules) -> Vec<Warning> {
    let mut warnings = Vec::new();
    if !tx.is_categorized() {
        warnings.push(Warning::Uncategorized);
    }
    if tx.is_income() && tx.customer_id().is_none() {
        warnings.push(Warning::UnattributedRevenue);
    }
    if !tx.amount.is_zero() {
        if !tx.has_tax_category() {
            warnings.push(Warning::MissingTaxCategory);
        }
        if classify_transaction(tx, rules).needs_review() {
            warnings.push(Warning::TaxTreatmentNeedsReview {
                category: tx.category_label(),
            });
        }
    }
    if let Some(confidence) = tx.confidence().filter(|c| *c < LOW_CONFIDENCE) {
        warnings.push(Warning::LowConfidence {
            confidence: format!("{:.0}%", confidence * 100.0),
        });
    }
    warnings
}

/// Transactions with at least one warning, in input order
pub fn validate_transactions(transactions: &[Transaction], rules: &CategoryRules) -> Vec<TransactionIssues> {
    transactions
        .iter()
        .filter_map(|tx| {
            let warnings = transaction_warnings(tx, rules);
            if warnings.is_empty() {
                return None;
            }
            Some(TransactionIssues {
                id: tx.id.clone(),
                date: tx.date,
                amount: tx.amount,
                category: tx.category_label(),
                warnings,
            })
        })
        .collect()
}
