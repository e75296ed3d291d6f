pub mod classify;
pub mod estimate;
pub mod us;

pub use classify::{classify_transaction, summarize_tax, TaxSummary, TaxTreatment, TreatmentKind};
pub use estimate::{estimate_tax, progressive_tax, self_employment_tax, TaxEstimate};
