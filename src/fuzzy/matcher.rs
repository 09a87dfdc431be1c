// File: src/fuzzy/matcher.rs
use crate::core::index::ReferenceIndex;
use crate::core::types::{MatchDiagnostics, MatchMethod, SearchMode};
use crate::fuzzy::similarity::{JaroWinkler, Similarity};
use log::debug;

pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.9;

/// Resolves a cleaned query against a reference index: exact lookup first,
/// then a similarity search gated by `threshold` (inclusive).
pub struct Matcher {
    threshold: f64,
    similarity: Box<dyn Similarity>,
}

impl Default for Matcher {
    fn default() -> Self {
        Self::new(DEFAULT_SIMILARITY_THRESHOLD)
    }
}

impl Matcher {
    pub fn new(threshold: f64) -> Self {
        Self::with_similarity(threshold, Box::new(JaroWinkler))
    }

    pub fn with_similarity(threshold: f64, similarity: Box<dyn Similarity>) -> Self {
        Self { threshold, similarity }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Returns the normalized name for `query`, or `query` itself when no
    /// candidate is similar enough.
    pub fn resolve(
        &self,
        index: &ReferenceIndex,
        query: &str,
        mode: SearchMode,
    ) -> (String, MatchDiagnostics) {
        if query.is_empty() {
            return (String::new(), MatchDiagnostics::empty());
        }

        if let Some(entry) = index.get(query) {
            let diagnostics = MatchDiagnostics {
                query: query.to_string(),
                nearest: Some(query.to_string()),
                similarity: 1.0,
                success: true,
                popularity: Some(entry.group_popularity),
                method: MatchMethod::Exact,
            };
            return (entry.normalized_name.clone(), diagnostics);
        }

        let (candidate, method) = match mode {
            SearchMode::Prefix => (self.prefix_candidate(index, query), MatchMethod::Prefix),
            SearchMode::Exhaustive => (self.nearest_key(index, query), MatchMethod::Exhaustive),
        };

        let mut diagnostics = MatchDiagnostics {
            query: query.to_string(),
            nearest: None,
            similarity: 0.0,
            success: false,
            popularity: None,
            method,
        };
        let Some((key, score)) = candidate else {
            return (query.to_string(), diagnostics);
        };

        diagnostics.nearest = Some(key.to_string());
        diagnostics.similarity = score;
        debug!("{:?} match for '{}': '{}' ({:.4})", method, query, key, score);

        if score < self.threshold {
            return (query.to_string(), diagnostics);
        }
        match index.get(key) {
            Some(entry) => {
                diagnostics.success = true;
                diagnostics.popularity = Some(entry.group_popularity);
                (entry.normalized_name.clone(), diagnostics)
            }
            None => (query.to_string(), diagnostics),
        }
    }

    /// The top name of the deepest trie node sharing a prefix with `query`.
    fn prefix_candidate<'a>(&self, index: &'a ReferenceIndex, query: &str) -> Option<(&'a str, f64)> {
        let (node, _) = index.trie().longest_prefix(query);
        let top = node.top()?;
        Some((top.name.as_str(), self.similarity.similarity(&top.name, query)))
    }

    /// The reference key most similar to `query`. Ties keep the first key seen.
    fn nearest_key<'a>(&self, index: &'a ReferenceIndex, query: &str) -> Option<(&'a str, f64)> {
        let mut best: Option<(&'a str, f64)> = None;
        for key in index.keys() {
            let score = self.similarity.similarity(query, key);
            match best {
                Some((_, best_score)) if score <= best_score => {}
                _ => best = Some((key, score)),
            }
        }
        best
    }
}
