//! Balance-sheet and cash-flow buckets for canonical category labels.
//!
//! Matching is plain substring search over the lower-cased label, so some
//! keywords overlap: "card" marks "Business Cards" as a liability and "tax"
//! catches "Taxes & Licenses". These collisions are kept as-is; the keyword
//! lists below are the place to revisit them.

use serde::Serialize;

use super::transaction::Transaction;

const LIABILITY_KEYWORDS: &[&str] = &[
    "loan", "payable", "credit", "tax", "liab", "mortgage", "card", "overdraft",
];
const ASSET_KEYWORDS: &[&str] = &[
    "equipment", "truck", "computer", "asset", "receivable", "cash", "bank",
];
const EQUITY_KEYWORDS: &[&str] = &[
    "owner", "capital", "equity", "contribution", "draw", "distribution",
];
const DEBT_FINANCING_KEYWORDS: &[&str] = &[
    "financing", "loan", "credit card", "mortgage", "line of credit",
];
const INVESTING_KEYWORDS: &[&str] = &["equipment", "long-term asset", "investment"];
/// Canonical labels that always sit on the balance sheet as assets
const ASSET_LABELS: &[&str] = &["investment income"];

/// Mutually exclusive cash-flow section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CashFlowBucket {
    Operating,
    Investing,
    Financing,
}

/// Bucket flags for one transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BucketSet {
    pub asset: bool,
    pub liability: bool,
    pub equity: bool,
    /// Equity plus debt financing
    pub financing: bool,
    pub cash_flow: CashFlowBucket,
}

impl BucketSet {
    /// Only rows outside the balance-sheet buckets count toward income and expenses
    pub fn is_pnl_eligible(&self) -> bool {
        !(self.asset || self.liability || self.equity || self.financing)
    }
}

/// Classify a canonical category label, with an optional explicit type hint
pub fn classify_buckets(label: &str, type_hint: Option<&str>) -> BucketSet {
    let text = label.to_lowercase();
    let hint = type_hint.map(|h| h.trim().to_lowercase()).unwrap_or_default();
    let has = |keywords: &[&str]| keywords.iter().any(|k| text.contains(k));

    let liability = has(LIABILITY_KEYWORDS) || hint == "liability";
    let asset = has(ASSET_KEYWORDS)
        || ASSET_LABELS.contains(&text.as_str())
        || hint == "asset"
        || hint == "investment";
    let equity = has(EQUITY_KEYWORDS) || hint == "equity";
    let financing = equity || has(DEBT_FINANCING_KEYWORDS);
    let investing = has(INVESTING_KEYWORDS) || hint == "investment";

    let cash_flow = if financing {
        CashFlowBucket::Financing
    } else if investing {
        CashFlowBucket::Investing
    } else {
        CashFlowBucket::Operating
    };

    BucketSet {
        asset,
        liability,
        equity,
        financing,
        cash_flow,
    }
}

/// Buckets for a transaction's canonical category
pub fn transaction_buckets(tx: &Transaction) -> BucketSet {
    classify_buckets(&tx.category_label(), tx.kind.as_deref())
}
