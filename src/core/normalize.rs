//! Canonical category and vendor labels.
//!
//! Free-text labels are matched against an ordered rule table; the first rule
//! whose pattern appears in the lower-cased text decides the label. Order is
//! significant ("consulting services" is Consulting, not Services), so the
//! table is a slice rather than a map.

use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

pub const UNCATEGORIZED: &str = "Uncategorized";
pub const UNKNOWN_VENDOR: &str = "Unknown vendor";

static RETAINER_FROM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bretainer\b.*?\bfrom\s+(.+)$").expect("valid retainer pattern")
});

/// A canonical label plus an explanation of why it was chosen
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizedCategory {
    pub label: String,
    pub hint: Option<&'static str>,
}

#[derive(Debug, Clone, Copy)]
enum Matcher {
    /// "retainer ... from <client>", keeps the client name
    RetainerFrom,
    /// Any of the phrases appears in the lower-cased text
    Contains(&'static [&'static str]),
}

#[derive(Debug, Clone, Copy)]
struct LabelRule {
    matcher: Matcher,
    label: &'static str,
    hint: &'static str,
}

const LABEL_RULES: &[LabelRule] = &[
    LabelRule {
        matcher: Matcher::RetainerFrom,
        label: "Retainer from",
        hint: "Retainer payment attributed to the named client",
    },
    LabelRule {
        matcher: Matcher::Contains(&["retainer"]),
        label: "Client Retainer",
        hint: "Advance payment from a client for future work",
    },
    LabelRule {
        matcher: Matcher::Contains(&[
            "owner investment",
            "owner contribution",
            "capital contribution",
            "capital injection",
            "member contribution",
        ]),
        label: "Owner Investment",
        hint: "Money the owner put into the business; not revenue",
    },
    LabelRule {
        matcher: Matcher::Contains(&["deposit"]),
        label: "Deposit",
        hint: "Bank deposit; confirm whether it is a sale or a transfer",
    },
    LabelRule {
        matcher: Matcher::Contains(&["equipment", "machinery"]),
        label: "Equipment",
        hint: "Long-lived equipment; usually capitalized rather than expensed",
    },
    LabelRule {
        matcher: Matcher::Contains(&["consult"]),
        label: "Consulting",
        hint: "Professional consulting work",
    },
    LabelRule {
        matcher: Matcher::Contains(&["subscription", "saas"]),
        label: "Subscription",
        hint: "Recurring subscription charge or revenue",
    },
    LabelRule {
        matcher: Matcher::Contains(&["service"]),
        label: "Services",
        hint: "Service revenue or purchased services",
    },
    LabelRule {
        matcher: Matcher::Contains(&["product sale", "sale of goods", "merchandise"]),
        label: "Product Sales",
        hint: "Revenue from selling products",
    },
    LabelRule {
        matcher: Matcher::Contains(&[
            "investment income",
            "investment return",
            "interest",
            "dividend",
            "capital gain",
        ]),
        label: "Investment Income",
        hint: "Interest, dividends or gains on investments",
    },
];

/// Collapse runs of whitespace and trim
pub fn clean_text(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Canonicalize a free-text category label
pub fn normalize_category(raw: &str) -> NormalizedCategory {
    let cleaned = clean_text(raw);
    if cleaned.is_empty() {
        return NormalizedCategory {
            label: UNCATEGORIZED.to_string(),
            hint: None,
        };
    }

    let lower = cleaned.to_lowercase();
    LABEL_RULES
        .iter()
        .find_map(|rule| apply_rule(rule, &cleaned, &lower))
        .unwrap_or_else(|| NormalizedCategory {
            label: title_case_if_shouting(&cleaned),
            hint: None,
        })
}

/// Canonicalize the vendor of an expense: explicit field, then description
pub fn normalize_vendor(vendor_field: Option<&str>, description: Option<&str>) -> String {
    let picked = vendor_field
        .map(clean_text)
        .filter(|v| !v.is_empty())
        .or_else(|| description.map(clean_text).filter(|d| !d.is_empty()));
    match picked {
        Some(text) => normalize_category(&text).label,
        None => UNKNOWN_VENDOR.to_string(),
    }
}

fn apply_rule(rule: &LabelRule, cleaned: &str, lower: &str) -> Option<NormalizedCategory> {
    let label = match rule.matcher {
        Matcher::RetainerFrom => {
            let captures = RETAINER_FROM.captures(cleaned)?;
            let client = captures
                .get(1)?
                .as_str()
                .trim_end_matches(|c: char| c.is_ascii_punctuation() || c.is_whitespace());
            if client.is_empty() {
                return None;
            }
            format!("{} {}", rule.label, client)
        }
        Matcher::Contains(phrases) => {
            if !phrases.iter().any(|p| lower.contains(p)) {
                return None;
            }
            rule.label.to_string()
        }
    };
    Some(NormalizedCategory {
        label,
        hint: Some(rule.hint),
    })
}

fn title_case_if_shouting(text: &str) -> String {
    let has_letters = text.chars().any(char::is_alphabetic);
    let has_lower = text.chars().any(char::is_lowercase);
    if !has_letters || has_lower {
        return text.to_string();
    }
    text.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    let rest = chars.as_str().to_lowercase();
                    first.to_uppercase().chain(rest.chars()).collect()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
