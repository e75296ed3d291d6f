use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use schemars::JsonSchema;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::io::Read;
use std::str::FromStr;

use super::normalize::{clean_text, normalize_category, UNCATEGORIZED};

/// Largest magnitude a decoded amount may carry
pub const MAX_AMOUNT: Decimal = dec!(1000000000000000);

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum InputError {
    #[error("invalid date: {0}")]
    InvalidDate(String),
}

/// Input root for a transaction batch
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransactionBatch {
    /// Business the batch was fetched for
    #[serde(default)]
    pub business_id: Option<String>,
    pub transactions: Vec<Transaction>,
}

/// A money movement supplied by the data store. Positive amounts are inflows.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    /// Calendar date (YYYY-MM-DD); date-times keep their written date
    #[serde(deserialize_with = "deserialize_date")]
    #[schemars(with = "String")]
    pub date: NaiveDate,
    /// Signed amount; unparseable or non-finite values become 0, magnitudes
    /// above [`MAX_AMOUNT`] are capped
    #[serde(default, deserialize_with = "deserialize_amount")]
    #[schemars(with = "f64")]
    pub amount: Decimal,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub vendor: Option<String>,
    #[serde(default)]
    pub merchant: Option<String>,
    #[serde(default)]
    pub payee: Option<String>,
    /// Explicit bucket hint (asset, investment, liability, equity)
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub business_id: Option<String>,
    #[serde(default)]
    pub customer_ref: Option<CustomerRef>,
    #[serde(default)]
    pub tax_category_override: Option<TaxCategoryOverride>,
    #[serde(default)]
    pub tax_status_override: Option<TaxStatusOverride>,
    /// Categorization confidence in [0, 1]
    #[serde(default)]
    pub confidence_score: Option<f64>,
}

/// Customer attribution joined onto a transaction
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerRef {
    #[serde(default)]
    pub id: Option<String>,
    /// Denormalized display name from the join
    #[serde(default)]
    pub name: Option<String>,
    /// Business that owns the customer record
    #[serde(default)]
    pub business_id: Option<String>,
}

/// Per-transaction tax category chosen by the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum TaxCategoryOverride {
    Taxable,
    #[serde(alias = "non_taxable_income")]
    NonTaxable,
    Deductible,
    PartialDeductible,
    NonDeductible,
    Capitalized,
}

/// Coarse per-transaction tax status chosen by the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum TaxStatusOverride {
    Taxable,
    NonTaxable,
    Deductible,
    NonDeductible,
}

impl Transaction {
    pub fn is_income(&self) -> bool {
        self.amount > Decimal::ZERO
    }

    pub fn is_expense(&self) -> bool {
        self.amount < Decimal::ZERO
    }

    /// Canonical category label
    pub fn category_label(&self) -> String {
        normalize_category(self.category.as_deref().unwrap_or_default()).label
    }

    /// True when the row carries a real category
    pub fn is_categorized(&self) -> bool {
        let cleaned = clean_text(self.category.as_deref().unwrap_or_default());
        !cleaned.is_empty() && !cleaned.eq_ignore_ascii_case(UNCATEGORIZED)
    }

    pub fn has_tax_category(&self) -> bool {
        self.tax_category_override.is_some() || self.tax_status_override.is_some()
    }

    /// Customer id, ignoring blank ids
    pub fn customer_id(&self) -> Option<&str> {
        self.customer_ref
            .as_ref()
            .and_then(|c| c.id.as_deref())
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }

    /// Explicit vendor field in priority order: vendor, merchant, payee
    pub fn vendor_field(&self) -> Option<&str> {
        [&self.vendor, &self.merchant, &self.payee]
            .into_iter()
            .filter_map(|f| f.as_deref())
            .find(|v| !v.trim().is_empty())
    }

    /// Confidence clamped to [0, 1]; non-finite values count as absent
    pub fn confidence(&self) -> Option<f64> {
        self.confidence_score
            .filter(|c| c.is_finite())
            .map(|c| c.clamp(0.0, 1.0))
    }
}

/// Read a transaction batch from JSON, sorted by date
pub fn read_transactions_json<R: Read>(reader: R) -> anyhow::Result<TransactionBatch> {
    let mut batch: TransactionBatch = serde_json::from_reader(reader)?;
    warn_duplicate_ids(&batch.transactions);
    batch.transactions.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.id.cmp(&b.id)));
    Ok(batch)
}

/// Duplicate ids are kept; every row still counts
fn warn_duplicate_ids(transactions: &[Transaction]) -> usize {
    let mut seen = HashSet::new();
    let mut duplicates = 0;
    for tx in transactions {
        if !seen.insert(tx.id.as_str()) {
            log::warn!("Duplicate transaction id {:?}", tx.id);
            duplicates += 1;
        }
    }
    duplicates
}

/// Keep the written calendar date of date-only and date-time inputs
pub fn parse_date(s: &str) -> Result<NaiveDate, InputError> {
    let s = s.trim();
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.date_naive());
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(dt.date());
        }
    }
    Err(InputError::InvalidDate(s.to_string()))
}

fn deserialize_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let s: String = Deserialize::deserialize(deserializer)?;
    parse_date(&s).map_err(|err| de::Error::custom(err.to_string()))
}

/// Parse a loosely formatted amount, falling back to zero
pub fn parse_amount(s: &str) -> Decimal {
    let cleaned: String = s
        .trim()
        .chars()
        .filter(|c| !matches!(c, '$' | ',' | ' '))
        .collect();
    match Decimal::from_str(&cleaned).or_else(|_| Decimal::from_scientific(&cleaned)) {
        Ok(amount) => bounded(amount),
        Err(_) => {
            log::warn!("Unparseable amount {:?} treated as 0", s);
            Decimal::ZERO
        }
    }
}

fn amount_from_f64(v: f64) -> Decimal {
    if !v.is_finite() {
        log::warn!("Non-finite amount {} treated as 0", v);
        return Decimal::ZERO;
    }
    match Decimal::from_str(&v.to_string()).ok().or_else(|| Decimal::from_f64(v)) {
        Some(amount) => bounded(amount),
        None if v.abs() >= 1.0 => bounded(if v < 0.0 { Decimal::MIN } else { Decimal::MAX }),
        None => {
            log::warn!("Unrepresentable amount {} treated as 0", v);
            Decimal::ZERO
        }
    }
}

/// Clamp the magnitude to [`MAX_AMOUNT`]
fn bounded(amount: Decimal) -> Decimal {
    if amount.abs() <= MAX_AMOUNT {
        return amount;
    }
    log::warn!("Amount {} capped at {}", amount, MAX_AMOUNT);
    if amount.is_sign_negative() {
        -MAX_AMOUNT
    } else {
        MAX_AMOUNT
    }
}

struct AmountVisitor;

impl<'de> Visitor<'de> for AmountVisitor {
    type Value = Decimal;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a number or numeric string")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Decimal, E> {
        Ok(bounded(Decimal::from(v)))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Decimal, E> {
        Ok(bounded(Decimal::from(v)))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Decimal, E> {
        Ok(amount_from_f64(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Decimal, E> {
        Ok(parse_amount(v))
    }

    fn visit_bool<E: de::Error>(self, _: bool) -> Result<Decimal, E> {
        Ok(Decimal::ZERO)
    }

    fn visit_unit<E: de::Error>(self) -> Result<Decimal, E> {
        Ok(Decimal::ZERO)
    }

    fn visit_none<E: de::Error>(self) -> Result<Decimal, E> {
        Ok(Decimal::ZERO)
    }
}

fn deserialize_amount<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(AmountVisitor)
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// Transaction on 2024-01-15 with the given amount and category
    pub fn tx(id: &str, amount: Decimal, category: &str) -> Transaction {
        Transaction {
            id: id.to_string(),
            date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            amount,
            category: Some(category.to_string()),
            ..Default::default()
        }
    }

    pub fn tx_on(id: &str, date: &str, amount: Decimal, category: &str) -> Transaction {
        Transaction {
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            ..tx(id, amount, category)
        }
    }
}
