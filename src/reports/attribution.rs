//! Revenue by customer and spending by vendor.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use crate::core::{normalize_vendor, Transaction};

pub const UNKNOWN_CUSTOMER: &str = "Unknown Customer (Needs Review)";
pub const REVIEW_PAGE_SIZE: usize = 25;

/// Looks up customer display names by id
pub trait CustomerDirectory {
    fn display_name(&self, customer_id: &str) -> Option<String>;
}

impl CustomerDirectory for HashMap<String, String> {
    fn display_name(&self, customer_id: &str) -> Option<String> {
        self.get(customer_id).cloned()
    }
}

impl CustomerDirectory for () {
    fn display_name(&self, _customer_id: &str) -> Option<String> {
        None
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerSalesRow {
    /// `None` for the needs-review bucket
    pub customer_id: Option<String>,
    pub name: String,
    pub amount: Decimal,
    /// Share of total sales, 0 to 100
    pub pct: Decimal,
    pub transaction_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesByCustomerReport {
    pub total: Decimal,
    pub rows: Vec<CustomerSalesRow>,
    pub unattributed_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewItem {
    pub id: String,
    pub date: NaiveDate,
    pub amount: Decimal,
    pub category: String,
    pub description: Option<String>,
}

/// One page of revenue rows lacking a customer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NeedsReviewPage {
    pub page: usize,
    pub page_size: usize,
    pub total_count: usize,
    pub total_pages: usize,
    pub total_amount: Decimal,
    pub items: Vec<ReviewItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorExpenseRow {
    pub vendor: String,
    /// Spend as a positive amount
    pub amount: Decimal,
    pub pct: Decimal,
    pub transaction_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpensesByVendorReport {
    pub total: Decimal,
    pub rows: Vec<VendorExpenseRow>,
    /// Whether any row had an explicit vendor, merchant or payee
    pub has_vendor_field: bool,
}

/// `part / total * 100`, or 0 when the total is 0
pub fn percentage(part: Decimal, total: Decimal) -> Decimal {
    if total.is_zero() {
        Decimal::ZERO
    } else {
        part / total * Decimal::ONE_HUNDRED
    }
}

/// Display name for a customer-attributed transaction
fn customer_name(tx: &Transaction, customer_id: &str, directory: &impl CustomerDirectory) -> String {
    let joined = tx.customer_ref.as_ref().and_then(|customer| {
        let same_scope = match (&customer.business_id, &tx.business_id) {
            (Some(owner), Some(scope)) => owner == scope,
            (Some(_), None) => false,
            (None, _) => true,
        };
        customer
            .name
            .as_deref()
            .map(str::trim)
            .filter(|name| same_scope && !name.is_empty())
            .map(str::to_string)
    });
    joined
        .or_else(|| directory.display_name(customer_id))
        .unwrap_or_else(|| truncated_id_label(customer_id))
}

fn truncated_id_label(customer_id: &str) -> String {
    let short: String = customer_id.chars().take(8).collect();
    if customer_id.chars().count() > 8 {
        format!("Customer {}…", short)
    } else {
        format!("Customer {}", short)
    }
}

pub fn sales_by_customer(
    transactions: &[Transaction],
    directory: &impl CustomerDirectory,
) -> SalesByCustomerReport {
    let mut groups: BTreeMap<Option<String>, CustomerSalesRow> = BTreeMap::new();
    let mut total = Decimal::ZERO;
    let mut unattributed_count = 0;

    for tx in transactions.iter().filter(|tx| tx.is_income()) {
        total = total.saturating_add(tx.amount);
        let customer_id = tx.customer_id().map(str::to_string);
        if customer_id.is_none() {
            unattributed_count += 1;
        }
        let row = groups.entry(customer_id.clone()).or_insert_with(|| {
            let name = match &customer_id {
                Some(id) => customer_name(tx, id, directory),
                None => UNKNOWN_CUSTOMER.to_string(),
            };
            CustomerSalesRow {
                customer_id,
                name,
                amount: Decimal::ZERO,
                pct: Decimal::ZERO,
                transaction_count: 0,
            }
        });
        row.amount = row.amount.saturating_add(tx.amount);
        row.transaction_count += 1;
    }

    if unattributed_count > 0 {
        log::warn!("{} revenue transaction(s) have no customer", unattributed_count);
    }

    let mut rows: Vec<_> = groups
        .into_values()
        .map(|row| CustomerSalesRow {
            pct: percentage(row.amount, total),
            ..row
        })
        .collect();
    rows.sort_by(|a, b| b.amount.cmp(&a.amount).then_with(|| a.name.cmp(&b.name)));

    SalesByCustomerReport {
        total,
        rows,
        unattributed_count,
    }
}

/// Revenue rows with no customer, newest first, one fixed-size page (1-based)
pub fn needs_review(transactions: &[Transaction], page: usize) -> NeedsReviewPage {
    let mut unattributed: Vec<&Transaction> = transactions
        .iter()
        .filter(|tx| tx.is_income() && tx.customer_id().is_none())
        .collect();
    unattributed.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.id.cmp(&b.id)));

    let page = page.max(1);
    let total_count = unattributed.len();
    let total_amount = unattributed
        .iter()
        .fold(Decimal::ZERO, |sum, tx| sum.saturating_add(tx.amount));
    let items = unattributed
        .iter()
        .skip((page - 1).saturating_mul(REVIEW_PAGE_SIZE))
        .take(REVIEW_PAGE_SIZE)
        .map(|tx| ReviewItem {
            id: tx.id.clone(),
            date: tx.date,
            amount: tx.amount,
            category: tx.category_label(),
            description: tx.description.clone(),
        })
        .collect();

    NeedsReviewPage {
        page,
        page_size: REVIEW_PAGE_SIZE,
        total_count,
        total_pages: total_count.div_ceil(REVIEW_PAGE_SIZE),
        total_amount,
        items,
    }
}

pub fn expenses_by_vendor(transactions: &[Transaction]) -> ExpensesByVendorReport {
    let mut groups: BTreeMap<String, VendorExpenseRow> = BTreeMap::new();
    let mut total = Decimal::ZERO;
    let mut has_vendor_field = false;

    for tx in transactions.iter().filter(|tx| tx.is_expense()) {
        let vendor_field = tx.vendor_field();
        has_vendor_field |= vendor_field.is_some();
        let vendor = normalize_vendor(vendor_field, tx.description.as_deref());
        let spent = tx.amount.abs();
        total = total.saturating_add(spent);

        let row = groups.entry(vendor.clone()).or_insert_with(|| VendorExpenseRow {
            vendor,
            amount: Decimal::ZERO,
            pct: Decimal::ZERO,
            transaction_count: 0,
        });
        row.amount = row.amount.saturating_add(spent);
        row.transaction_count += 1;
    }

    let mut rows: Vec<_> = groups
        .into_values()
        .map(|row| VendorExpenseRow {
            pct: percentage(row.amount, total),
            ..row
        })
        .collect();
    rows.sort_by(|a, b| b.amount.cmp(&a.amount).then_with(|| a.vendor.cmp(&b.vendor)));

    ExpensesByVendorReport {
        total,
        rows,
        has_vendor_field,
    }
}
