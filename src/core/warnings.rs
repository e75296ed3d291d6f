use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Data-quality issues that weaken an estimate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type")]
pub enum Warning {
    /// Transaction has no category.
    Uncategorized,
    /// Revenue with no customer attached.
    UnattributedRevenue,
    /// No heuristic or rule decided the tax treatment of this expense.
    TaxTreatmentNeedsReview { category: String },
    /// Neither a tax category nor a tax status was tagged.
    MissingTaxCategory,
    /// Categorization confidence is below the review threshold.
    LowConfidence { confidence: String },
}

impl Warning {
    pub fn name(&self) -> &'static str {
        match self {
            Warning::Uncategorized => "Uncategorized",
            Warning::UnattributedRevenue => "UnattributedRevenue",
            Warning::TaxTreatmentNeedsReview { .. } => "TaxTreatmentNeedsReview",
            Warning::MissingTaxCategory => "MissingTaxCategory",
            Warning::LowConfidence { .. } => "LowConfidence",
        }
    }

    pub fn message(&self) -> String {
        match self {
            Warning::Uncategorized => "Assign a category so the row lands in the right report".to_string(),
            Warning::UnattributedRevenue => "Attach a customer to this revenue".to_string(),
            Warning::TaxTreatmentNeedsReview { category } => {
                format!("Decide whether '{}' expenses are deductible", category)
            }
            Warning::MissingTaxCategory => "Tag a tax category".to_string(),
            Warning::LowConfidence { confidence } => {
                format!("Categorization confidence is only {}", confidence)
            }
        }
    }
}
