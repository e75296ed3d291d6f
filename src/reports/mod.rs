pub mod accuracy;
pub mod attribution;
pub mod statements;
pub mod tax_report;
pub mod validation;

pub use accuracy::{score_accuracy, AccuracyReport};
pub use attribution::{
    expenses_by_vendor, needs_review, sales_by_customer, CustomerDirectory,
    ExpensesByVendorReport, NeedsReviewPage, SalesByCustomerReport,
};
pub use statements::{basic_kpis, build_statements, FinancialStatements, PnlRow};
pub use tax_report::{build_tax_report, money, TaxReport};
pub use validation::{validate_transactions, TransactionIssues};
