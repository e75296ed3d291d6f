pub mod buckets;
pub mod normalize;
pub mod profile;
pub mod transaction;
pub mod warnings;

// Flat public surface for domain types and functions.
pub use buckets::{classify_buckets, transaction_buckets, BucketSet, CashFlowBucket};
pub use normalize::{normalize_category, normalize_vendor, NormalizedCategory};
pub use profile::{
    read_config_json, CategoryRule, CategoryRules, EngineConfig, EntityType, FilingStatus,
    RuleTreatment, TaxProfile, TaxProfileOverrides,
};
pub use transaction::{
    read_transactions_json, CustomerRef, InputError, TaxCategoryOverride, TaxStatusOverride,
    Transaction, TransactionBatch, MAX_AMOUNT,
};
pub use warnings::Warning;

#[cfg(test)]
pub(crate) use transaction::fixtures;
