//! How much to trust the estimate, from tagging coverage and confidence.

use serde::Serialize;

use crate::core::Transaction;

const TAX_CATEGORY_TARGET: f64 = 0.9;
const CATEGORY_TARGET: f64 = 0.9;
const CONFIDENCE_TARGET: f64 = 0.75;
const DEFAULT_CONFIDENCE: f64 = 0.5;
const EMPTY_SCORE: u32 = 20;
const MAX_HINTS: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccuracyReport {
    /// 0 to 100
    pub score: u32,
    pub sentence: String,
    pub checklist: Vec<String>,
}

/// Coverage ratios the score is built from
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coverage {
    pub tax_category: f64,
    pub category: f64,
    pub avg_confidence: f64,
}

impl Coverage {
    pub fn of(transactions: &[Transaction]) -> Option<Self> {
        if transactions.is_empty() {
            return None;
        }
        let n = transactions.len() as f64;
        let count = |pred: fn(&Transaction) -> bool| {
            transactions.iter().filter(|tx| pred(tx)).count() as f64
        };
        let confidence_sum: f64 = transactions
            .iter()
            .map(|tx| tx.confidence().unwrap_or(DEFAULT_CONFIDENCE))
            .sum();
        Some(Coverage {
            tax_category: count(Transaction::has_tax_category) / n,
            category: count(Transaction::is_categorized) / n,
            avg_confidence: confidence_sum / n,
        })
    }

    pub fn score(&self) -> u32 {
        let raw = 40.0 * self.tax_category + 20.0 * self.category + 40.0 * self.avg_confidence;
        raw.clamp(0.0, 100.0).round() as u32
    }

    fn hints(&self) -> Vec<String> {
        let mut hints = Vec::new();
        if self.tax_category < TAX_CATEGORY_TARGET {
            hints.push(format!(
                "Tag a tax category on more transactions ({:.0}% tagged, aim for 90%)",
                self.tax_category * 100.0
            ));
        }
        if self.category < CATEGORY_TARGET {
            hints.push(format!(
                "Categorize uncategorized transactions ({:.0}% categorized, aim for 90%)",
                self.category * 100.0
            ));
        }
        if self.avg_confidence < CONFIDENCE_TARGET {
            hints.push(format!(
                "Review low-confidence categories (average confidence {:.0}%, aim for 75%)",
                self.avg_confidence * 100.0
            ));
        }
        hints.truncate(MAX_HINTS);
        if hints.is_empty() {
            hints.push("Keep tagging new transactions as they come in to stay current".to_string());
        }
        hints
    }
}

fn sentence(score: u32) -> &'static str {
    match score {
        85.. => "Your books are in great shape; this estimate should be close.",
        65..=84 => "This estimate is directionally solid, but a few gaps remain.",
        _ => "Treat this as a rough estimate until more transactions are categorized.",
    }
}

pub fn score_accuracy(transactions: &[Transaction]) -> AccuracyReport {
    match Coverage::of(transactions) {
        None => AccuracyReport {
            score: EMPTY_SCORE,
            sentence: sentence(EMPTY_SCORE).to_string(),
            checklist: vec!["Add more transactions to get a meaningful estimate".to_string()],
        },
        Some(coverage) => {
            let score = coverage.score();
            log::debug!("Accuracy {:?} -> {}", coverage, score);
            AccuracyReport {
                score,
                sentence: sentence(score).to_string(),
                checklist: coverage.hints(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fixtures::tx;
    use crate::core::TaxCategoryOverride;
    use rust_decimal_macros::dec;

    fn tagged(id: &str, confidence: Option<f64>) -> Transaction {
        Transaction {
            tax_category_override: Some(TaxCategoryOverride::Deductible),
            confidence_score: confidence,
            ..tx(id, dec!(-10), "Software")
        }
    }

    #[test]
    fn empty_batch() {
        let report = score_accuracy(&[]);
        assert_eq!(report.score, 20);
        assert_eq!(report.checklist.len(), 1);
        assert!(report.checklist[0].starts_with("Add more transactions"));
        assert!(report.sentence.contains("rough estimate"));
    }

    #[test]
    fn fully_tagged_is_great() {
        let txs = vec![tagged("1", Some(1.0)), tagged("2", Some(0.9))];
        let report = score_accuracy(&txs);
        assert_eq!(report.score, 98);
        assert!(report.sentence.contains("great shape"));
        assert_eq!(report.checklist.len(), 1);
        assert!(report.checklist[0].starts_with("Keep tagging"));
    }

    #[test]
    fn untagged_defaults() {
        // categorized, untagged, no confidence: 0 + 20 + 20
        let report = score_accuracy(&[tx("1", dec!(5), "Consulting")]);
        assert_eq!(report.score, 40);
        assert_eq!(report.checklist.len(), 2);

        // nothing at all: 0 + 0 + 20, all three hints
        let report = score_accuracy(&[tx("1", dec!(5), "")]);
        assert_eq!(report.score, 20);
        assert_eq!(report.checklist.len(), 3);
    }

    #[test]
    fn directionally_solid_band() {
        // 40 + 20 + 40 * 0.6 = 84
        let report = score_accuracy(&[tagged("1", Some(0.6))]);
        assert_eq!(report.score, 84);
        assert!(report.sentence.contains("directionally solid"));
        assert_eq!(report.checklist.len(), 1);
    }

    #[test]
    fn rounds_half_away_from_zero() {
        let coverage = Coverage {
            tax_category: 0.5,
            category: 0.5,
            avg_confidence: 0.3125,
        };
        // 20 + 10 + 12.5
        assert_eq!(coverage.score(), 43);
    }

    #[test]
    fn out_of_range_confidence_clamped() {
        let txs = vec![tagged("1", Some(7.0)), tagged("2", Some(f64::INFINITY))];
        let report = score_accuracy(&txs);
        // avg of 1.0 and default 0.5
        assert_eq!(report.score, 90);
        assert!(report.score <= 100);
    }
}
