use crate::config::NormalizerConfig;
use crate::core::cleaner::clean_with;
use crate::core::index::{IndexBuilder, ReferenceIndex};
use crate::core::types::{MatchDiagnostics, NameCategory, ReferenceEntry, SearchMode};
use crate::error::Result;
use crate::fuzzy::matcher::Matcher;
use std::io::BufRead;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizeOptions {
    pub mode: SearchMode,
    /// Only the first whitespace-delimited token of the input is normalized.
    pub only_first_token: bool,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            mode: SearchMode::Exhaustive,
            only_first_token: false,
        }
    }
}

/// Normalizes names of one category against its reference index.
///
/// Construction loads and indexes the reference table once; afterwards the
/// normalizer is read-only and can be shared between threads.
pub struct Normalizer {
    index: ReferenceIndex,
    matcher: Matcher,
}

impl Normalizer {
    /// Loads the category's reference table from `config.data_dir`.
    pub fn new(category: NameCategory, config: &NormalizerConfig) -> Result<Self> {
        let index = ReferenceIndex::load(
            &config.table_path(category),
            category,
            config.strict_conflicts,
            config.clean_names,
        )?;
        Ok(Self::from_index(index, Matcher::new(config.threshold_for(category))))
    }

    /// Like `new`, with the category given by name.
    pub fn for_category_name(category: &str, config: &NormalizerConfig) -> Result<Self> {
        Self::new(category.parse()?, config)
    }

    /// Builds the index from an already opened table.
    pub fn from_reader<R: BufRead>(
        category: NameCategory,
        reader: R,
        config: &NormalizerConfig,
    ) -> Result<Self> {
        let index = IndexBuilder::new(category)
            .strict_conflicts(config.strict_conflicts)
            .clean_names(config.clean_names)
            .load_reader(reader)?
            .build();
        Ok(Self::from_index(index, Matcher::new(config.threshold_for(category))))
    }

    pub fn from_index(index: ReferenceIndex, matcher: Matcher) -> Self {
        Self { index, matcher }
    }

    pub fn category(&self) -> NameCategory {
        self.index.category()
    }

    pub fn index(&self) -> &ReferenceIndex {
        &self.index
    }

    pub fn threshold(&self) -> f64 {
        self.matcher.threshold()
    }

    /// Cleans `raw` with the same rules the reference keys were built with.
    pub fn clean(&self, raw: &str) -> String {
        clean_with(raw, self.index.rules())
    }

    /// The reference entry `raw` cleans to, if it is an exact hit.
    pub fn entry(&self, raw: &str) -> Option<&ReferenceEntry> {
        self.index.get(&self.clean(raw))
    }

    /// Normalizes `raw` with exhaustive search over the whole string.
    pub fn normalize(&self, raw: &str) -> (String, MatchDiagnostics) {
        self.normalize_with(Some(raw), NormalizeOptions::default())
    }

    pub fn normalize_with(
        &self,
        raw: Option<&str>,
        options: NormalizeOptions,
    ) -> (String, MatchDiagnostics) {
        let Some(mut raw) = raw else {
            return (String::new(), MatchDiagnostics::empty());
        };
        if options.only_first_token {
            raw = raw.split_whitespace().next().unwrap_or("");
        }
        let query = self.clean(raw);
        self.matcher.resolve(&self.index, &query, options.mode)
    }

    /// Normalizes every whitespace-separated token on its own and joins the
    /// results with single spaces. Tokens that clean to nothing are dropped.
    pub fn normalize_all(&self, raw: &str) -> String {
        self.normalize_all_with(raw, SearchMode::Exhaustive)
    }

    /// Like `normalize_all`, with an explicit search mode.
    pub fn normalize_all_with(&self, raw: &str, mode: SearchMode) -> String {
        let options = NormalizeOptions {
            mode,
            only_first_token: false,
        };
        raw.split_whitespace()
            .map(|token| self.normalize_with(Some(token), options).0)
            .filter(|name| !name.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}
