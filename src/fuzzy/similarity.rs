// File: src/fuzzy/similarity.rs

/// A string similarity metric in the range (0, 1].
///
/// Implementations must be symmetric and score identical strings as 1.0;
/// the matcher relies on both when it ranks candidates.
pub trait Similarity: Send + Sync {
    fn similarity(&self, a: &str, b: &str) -> f64;
}

/// Jaro-Winkler similarity, as implemented by `strsim`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JaroWinkler;

impl Similarity for JaroWinkler {
    fn similarity(&self, a: &str, b: &str) -> f64 {
        strsim::jaro_winkler(a, b)
    }
}
