//! Keyword-indexed tax facts.
//!
//! A small, fixed table of Canadian tax facts. Lookup is plain substring
//! containment against the lower-cased query, walked in insertion order.

use serde::{Deserialize, Serialize};

/// A single fact, keyed by a short lower-case keyword.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactEntry {
    /// Trigger keyword. Matches when it appears anywhere in the query.
    pub keyword: String,

    /// Explanatory text handed to the model as context.
    pub body: String,
}

impl FactEntry {
    pub fn new(keyword: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into().to_lowercase(),
            body: body.into(),
        }
    }
}

/// Static keyword to explanation lookup table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FactStore {
    entries: Vec<FactEntry>,
}

impl FactStore {
    /// Build a store from an ordered list of entries.
    ///
    /// Keywords are unique: a repeated keyword keeps its first entry.
    /// Empty keywords are dropped since they would match every query.
    pub fn new(entries: impl IntoIterator<Item = FactEntry>) -> Self {
        let mut unique: Vec<FactEntry> = Vec::new();
        for entry in entries {
            if entry.keyword.is_empty() || unique.iter().any(|e| e.keyword == entry.keyword) {
                continue;
            }
            unique.push(entry);
        }
        Self { entries: unique }
    }

    /// The built-in Canadian tax table.
    pub fn canadian_tax() -> Self {
        Self::new(CANADIAN_TAX_FACTS.iter().map(|(k, b)| FactEntry::new(*k, *b)))
    }

    /// Bodies of every entry whose keyword occurs in `query`.
    ///
    /// Case-insensitive, in insertion order, never fails.
    pub fn search(&self, query: &str) -> Vec<&str> {
        let query = query.to_lowercase();
        self.entries
            .iter()
            .filter(|entry| query.contains(entry.keyword.as_str()))
            .map(|entry| entry.body.as_str())
            .collect()
    }

    pub fn entries(&self) -> &[FactEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for FactStore {
    fn default() -> Self {
        Self::canadian_tax()
    }
}

const CANADIAN_TAX_FACTS: [(&str, &str); 6] = [
    (
        "tfsa",
        "The 2024 TFSA contribution limit is **$7,000**. You must be 18+ with a valid SIN. Unused contribution room carries forward indefinitely.",
    ),
    (
        "rrsp",
        "Your RRSP deduction limit is **18%** of your previous year's earned income, up to a maximum of **$31,560** (for 2024). Contributions reduce your taxable income.",
    ),
    (
        "home",
        "The flat rate method ($2/day) for home office expenses ended in 2023. You must now use the **Detailed Method** and obtain a signed T2200 form from your employer.",
    ),
    (
        "deadline",
        "The filing deadline for most individuals is **April 30, 2024**. For self-employed individuals, it is June 15, but any taxes owed are still due by April 30.",
    ),
    (
        "meal",
        "Meal and entertainment expenses are generally limited to **50% deductibility** for business purposes.",
    ),
    (
        "cpp",
        "The maximum pensionable earnings for CPP in 2024 is **$68,500**. The basic exemption remains at $3,500.",
    ),
];
