// File: src/config.rs
use crate::core::types::NameCategory;
use crate::error::Result;
use crate::fuzzy::matcher::DEFAULT_SIMILARITY_THRESHOLD;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct NormalizerConfig {
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f64,
    /// Threshold for the extended categories; falls back to `similarity_threshold`.
    #[serde(default)]
    pub extended_similarity_threshold: Option<f64>,
    /// Abort index construction on conflicting mappings instead of skipping them.
    #[serde(default)]
    pub strict_conflicts: bool,
    /// Run the character substitution pass on keys and queries.
    #[serde(default = "default_clean_names")]
    pub clean_names: bool,
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

fn default_similarity_threshold() -> f64 {
    DEFAULT_SIMILARITY_THRESHOLD
}

fn default_clean_names() -> bool {
    true
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: default_similarity_threshold(),
            extended_similarity_threshold: None,
            strict_conflicts: false,
            clean_names: default_clean_names(),
            data_dir: default_data_dir(),
        }
    }
}

impl NormalizerConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn threshold_for(&self, category: NameCategory) -> f64 {
        if category.is_extended() {
            self.extended_similarity_threshold
                .unwrap_or(self.similarity_threshold)
        } else {
            self.similarity_threshold
        }
    }

    pub fn table_path(&self, category: NameCategory) -> PathBuf {
        self.data_dir.join(category.table_file_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NormalizerError;

    #[test]
    fn empty_file_gives_defaults() {
        let config = NormalizerConfig::from_toml_str("").unwrap();
        assert_eq!(config, NormalizerConfig::default());
        assert_eq!(config.similarity_threshold, 0.9);
        assert!(config.clean_names);
        assert!(!config.strict_conflicts);
    }

    #[test]
    fn extended_threshold_overrides_only_extended_categories() {
        let config = NormalizerConfig::from_toml_str(
            "similarity_threshold = 0.92\nextended_similarity_threshold = 0.85\ndata_dir = \"/srv/names\"\n",
        )
        .unwrap();
        assert_eq!(config.threshold_for(NameCategory::Last), 0.92);
        assert_eq!(config.threshold_for(NameCategory::LastExtended), 0.85);
        assert_eq!(config.threshold_for(NameCategory::CauseOfDeathExtended), 0.85);
        assert_eq!(
            config.table_path(NameCategory::Patronym),
            PathBuf::from("/srv/names/normalized_patronyms.tsv")
        );
    }

    #[test]
    fn extended_threshold_falls_back() {
        let config = NormalizerConfig::default();
        assert_eq!(config.threshold_for(NameCategory::LastExtended), 0.9);
    }

    #[test]
    fn invalid_toml_is_a_config_error() {
        let err = NormalizerConfig::from_toml_str("similarity_threshold = \"high\"").unwrap_err();
        assert!(matches!(err, NormalizerError::Config(_)));
    }
}
