use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::Read;

use super::normalize::normalize_category;

/// Legal structure of the business
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    #[default]
    SoleProp,
    LlcSingle,
    LlcMulti,
    Partnership,
    SCorp,
    CCorp,
}

impl EntityType {
    pub fn from_str(s: &str) -> Option<EntityType> {
        match s.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "sole_prop" => Some(EntityType::SoleProp),
            "llc_single" => Some(EntityType::LlcSingle),
            "llc_multi" => Some(EntityType::LlcMulti),
            "partnership" => Some(EntityType::Partnership),
            "s_corp" => Some(EntityType::SCorp),
            "c_corp" => Some(EntityType::CCorp),
            _ => None,
        }
    }

    /// Map a free-text legal structure ("Single-member LLC", "S Corporation")
    pub fn from_legal_structure(s: &str) -> Option<EntityType> {
        if let Some(entity) = EntityType::from_str(s) {
            return Some(entity);
        }
        let text = s.to_lowercase();
        if text.contains("sole") {
            Some(EntityType::SoleProp)
        } else if text.contains("llc") {
            if text.contains("multi") {
                Some(EntityType::LlcMulti)
            } else {
                Some(EntityType::LlcSingle)
            }
        } else if text.contains("partnership") {
            Some(EntityType::Partnership)
        } else if text.starts_with("s ") || text.starts_with("s-") || text.contains("s corp") {
            Some(EntityType::SCorp)
        } else if text.starts_with("c ") || text.starts_with("c-") || text.contains("c corp") {
            Some(EntityType::CCorp)
        } else {
            None
        }
    }

    /// Owners of these entities pay self-employment tax on profit
    pub fn pays_self_employment_tax(self) -> bool {
        matches!(self, EntityType::SoleProp | EntityType::LlcSingle)
    }
}

/// Federal filing status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum FilingStatus {
    #[default]
    Single,
    MarriedJoint,
    MarriedSeparate,
    HeadOfHousehold,
}

impl FilingStatus {
    pub fn from_str(s: &str) -> Option<FilingStatus> {
        match s.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "single" => Some(FilingStatus::Single),
            "married_joint" | "mfj" => Some(FilingStatus::MarriedJoint),
            "married_separate" | "mfs" => Some(FilingStatus::MarriedSeparate),
            "head_of_household" | "hoh" => Some(FilingStatus::HeadOfHousehold),
            _ => None,
        }
    }
}

/// Stored tax settings of a business
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct TaxProfile {
    pub entity_type: EntityType,
    pub filing_status: FilingStatus,
    /// Flat state income tax rate in [0, 1]
    #[schemars(with = "f64")]
    pub state_rate: Decimal,
    pub include_self_employment: bool,
    /// Two-letter state code, informational only
    pub state_code: Option<String>,
    pub has_payroll: bool,
}

impl Default for TaxProfile {
    fn default() -> Self {
        TaxProfile {
            entity_type: EntityType::SoleProp,
            filing_status: FilingStatus::Single,
            state_rate: Decimal::ZERO,
            include_self_employment: true,
            state_code: None,
            has_payroll: false,
        }
    }
}

impl TaxProfile {
    pub fn clamped_state_rate(&self) -> Decimal {
        clamp_unit(self.state_rate)
    }

    pub fn with_overrides(&self, overrides: &TaxProfileOverrides) -> TaxProfile {
        let entity_type = overrides
            .entity_type
            .or_else(|| {
                overrides
                    .legal_structure
                    .as_deref()
                    .and_then(EntityType::from_legal_structure)
            })
            .unwrap_or(self.entity_type);

        TaxProfile {
            entity_type,
            filing_status: overrides.filing_status.unwrap_or(self.filing_status),
            state_rate: overrides.state_rate.unwrap_or(self.state_rate),
            include_self_employment: overrides
                .include_self_employment
                .unwrap_or(self.include_self_employment),
            state_code: overrides.state_code.clone().or_else(|| self.state_code.clone()),
            has_payroll: overrides.has_payroll.unwrap_or(self.has_payroll),
        }
    }
}

/// Per-request changes to the stored profile
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct TaxProfileOverrides {
    pub entity_type: Option<EntityType>,
    pub filing_status: Option<FilingStatus>,
    #[schemars(with = "Option<f64>")]
    pub state_rate: Option<Decimal>,
    pub include_self_employment: Option<bool>,
    /// Free-text legal structure, used when `entityType` is absent
    pub legal_structure: Option<String>,
    pub state_code: Option<String>,
    pub has_payroll: Option<bool>,
}

/// Business-level tax treatment of a category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum RuleTreatment {
    Deductible,
    #[serde(rename = "partial_50")]
    Partial50,
    NonDeductible,
    Capitalized,
    NonTaxableIncome,
    Review,
}

impl RuleTreatment {
    pub fn default_deduction_pct(self) -> Decimal {
        match self {
            RuleTreatment::Deductible => Decimal::ONE,
            RuleTreatment::Partial50 => dec!(0.5),
            RuleTreatment::NonDeductible
            | RuleTreatment::Capitalized
            | RuleTreatment::NonTaxableIncome
            | RuleTreatment::Review => Decimal::ZERO,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRule {
    pub treatment: RuleTreatment,
    #[serde(default)]
    #[schemars(with = "Option<f64>")]
    pub deduction_pct: Option<Decimal>,
}

impl CategoryRule {
    pub fn new(treatment: RuleTreatment) -> Self {
        CategoryRule {
            treatment,
            deduction_pct: None,
        }
    }

    /// Explicit percentage clamped to [0, 1], else the treatment's default
    pub fn effective_deduction_pct(&self) -> Decimal {
        self.deduction_pct
            .map(clamp_unit)
            .unwrap_or_else(|| self.treatment.default_deduction_pct())
    }
}

/// Category rules keyed by canonical label, case-insensitive
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(transparent)]
pub struct CategoryRules(HashMap<String, CategoryRule>);

impl CategoryRules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, category: &str, rule: CategoryRule) {
        self.0.insert(rule_key(category), rule);
    }

    pub fn get(&self, category: &str) -> Option<&CategoryRule> {
        self.0.get(&rule_key(category))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, CategoryRule)> for CategoryRules {
    fn from_iter<I: IntoIterator<Item = (String, CategoryRule)>>(iter: I) -> Self {
        let mut rules = CategoryRules::new();
        for (category, rule) in iter {
            rules.insert(&category, rule);
        }
        rules
    }
}

impl<'de> Deserialize<'de> for CategoryRules {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = HashMap::<String, CategoryRule>::deserialize(deserializer)?;
        Ok(raw.into_iter().collect())
    }
}

fn rule_key(category: &str) -> String {
    normalize_category(category).label.to_lowercase()
}

/// Everything a computation needs besides the transactions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    pub profile: TaxProfile,
    pub category_rules: CategoryRules,
    /// Customer directory: id to display name
    pub customers: HashMap<String, String>,
}

/// Read engine configuration from JSON
pub fn read_config_json<R: Read>(reader: R) -> anyhow::Result<EngineConfig> {
    let config: EngineConfig = serde_json::from_reader(reader)?;
    log::debug!(
        "Loaded config: {:?} / {:?}, {} category rules, {} customers",
        config.profile.entity_type,
        config.profile.filing_status,
        config.category_rules.len(),
        config.customers.len()
    );
    Ok(config)
}

pub(crate) fn clamp_unit(value: Decimal) -> Decimal {
    value.clamp(Decimal::ZERO, Decimal::ONE)
}
