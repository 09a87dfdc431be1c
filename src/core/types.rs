// src/core/types.rs
use crate::error::NormalizerError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The kind of name being normalized. Selects both the cleaning rules and
/// the reference table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NameCategory {
    First,
    Last,
    /// Surnames backed by a looser-built reference table.
    LastExtended,
    Patronym,
    CauseOfDeath,
    /// Causes of death backed by a looser-built reference table.
    CauseOfDeathExtended,
}

impl NameCategory {
    pub const ALL: [NameCategory; 6] = [
        NameCategory::First,
        NameCategory::Last,
        NameCategory::LastExtended,
        NameCategory::Patronym,
        NameCategory::CauseOfDeath,
        NameCategory::CauseOfDeathExtended,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NameCategory::First => "first",
            NameCategory::Last => "last",
            NameCategory::LastExtended => "last_extended",
            NameCategory::Patronym => "patronym",
            NameCategory::CauseOfDeath => "cause_of_death",
            NameCategory::CauseOfDeathExtended => "cause_of_death_extended",
        }
    }

    pub fn is_surname(&self) -> bool {
        matches!(self, NameCategory::Last | NameCategory::LastExtended)
    }

    pub fn is_cause_of_death(&self) -> bool {
        matches!(
            self,
            NameCategory::CauseOfDeath | NameCategory::CauseOfDeathExtended
        )
    }

    pub fn is_extended(&self) -> bool {
        matches!(
            self,
            NameCategory::LastExtended | NameCategory::CauseOfDeathExtended
        )
    }

    /// File name of the reference table for this category.
    pub fn table_file_name(&self) -> &'static str {
        match self {
            NameCategory::First => "normalized_first_names.tsv",
            NameCategory::Last => "normalized_last_names.tsv",
            NameCategory::LastExtended => "normalized_last_names_extended.tsv",
            NameCategory::Patronym => "normalized_patronyms.tsv",
            NameCategory::CauseOfDeath => "normalized_death_causes.tsv",
            NameCategory::CauseOfDeathExtended => "normalized_death_causes_extended.tsv",
        }
    }
}

impl fmt::Display for NameCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NameCategory {
    type Err = NormalizerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NameCategory::ALL
            .iter()
            .copied()
            .find(|category| category.as_str() == s)
            .ok_or_else(|| NormalizerError::UnknownCategory(s.to_string()))
    }
}

/// One parsed line of a reference table, before cleaning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceRow {
    pub raw_name: String,
    pub normalized_name: String,
    pub popularity: u64,
    pub group_popularity: u64,
    pub auxiliary: Vec<String>,
}

/// The value stored under a cleaned key in the exact-match dictionary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReferenceEntry {
    pub normalized_name: String,
    /// Sum of the popularity of every raw name that cleans to this key.
    pub popularity: u64,
    /// Popularity of the whole name group behind `normalized_name`.
    pub group_popularity: u64,
    /// Trailing fields of the latest row seen for this key.
    pub auxiliary: Vec<String>,
}

/// Which fallback the matcher uses when the exact lookup misses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchMode {
    /// Compare against the top name of the longest shared prefix in the trie.
    Prefix,
    /// Compare against every reference key.
    #[default]
    Exhaustive,
}

/// How a query was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMethod {
    Empty,
    Exact,
    Prefix,
    Exhaustive,
}

/// Per-query record describing how a normalized name was obtained.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchDiagnostics {
    /// The cleaned query.
    pub query: String,
    /// The reference key the query was compared against, if any.
    pub nearest: Option<String>,
    pub similarity: f64,
    pub success: bool,
    /// Group popularity of the accepted normalized name.
    pub popularity: Option<u64>,
    pub method: MatchMethod,
}

impl MatchDiagnostics {
    pub(crate) fn empty() -> Self {
        Self {
            query: String::new(),
            nearest: None,
            similarity: 1.0,
            success: true,
            popularity: None,
            method: MatchMethod::Empty,
        }
    }
}
