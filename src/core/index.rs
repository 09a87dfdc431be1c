// File: src/core/index.rs
use crate::core::cleaner::{clean_with, CleanRules};
use crate::core::trie::PrefixTrie;
use crate::core::types::{NameCategory, ReferenceEntry, ReferenceRow};
use crate::error::{NormalizerError, Result};
use log::{info, warn};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// A non-fatal problem found while building an index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildWarning {
    /// Rows sharing a cleaned key and normalized name disagree on group popularity.
    GroupPopularityMismatch {
        key: String,
        raw_name: String,
        stored: u64,
        found: u64,
    },
    /// A row mapped an existing key to a different normalized name and was skipped.
    ConflictingMapping {
        key: String,
        kept: String,
        skipped: String,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    pub rows_read: usize,
    pub warnings: Vec<BuildWarning>,
}

impl BuildReport {
    pub fn conflicts(&self) -> usize {
        self.warnings
            .iter()
            .filter(|w| matches!(w, BuildWarning::ConflictingMapping { .. }))
            .count()
    }
}

/// Builds a `ReferenceIndex` from reference rows. Single-threaded, one-shot.
pub struct IndexBuilder {
    category: NameCategory,
    rules: CleanRules,
    strict_conflicts: bool,
    /// Keys in first-insertion order; `positions` maps a key to its slot.
    entries: Vec<(String, ReferenceEntry)>,
    positions: HashMap<String, usize>,
    report: BuildReport,
}

impl IndexBuilder {
    pub fn new(category: NameCategory) -> Self {
        Self {
            category,
            rules: CleanRules::for_category(category),
            strict_conflicts: false,
            entries: Vec::new(),
            positions: HashMap::new(),
            report: BuildReport::default(),
        }
    }

    /// Abort on conflicting mappings instead of skipping the later row.
    pub fn strict_conflicts(mut self, strict: bool) -> Self {
        self.strict_conflicts = strict;
        self
    }

    pub fn clean_names(mut self, clean_names: bool) -> Self {
        let rules = CleanRules::for_category(self.category);
        self.rules = if clean_names { rules } else { rules.without_substitution() };
        self
    }

    /// Parses one tab-separated table line. Blank lines yield `None`.
    pub fn parse_line(line: &str, line_no: usize) -> Result<Option<ReferenceRow>> {
        let line = line.trim_end_matches(['\n', '\r']);
        if line.trim().is_empty() {
            return Ok(None);
        }

        let parts: Vec<&str> = line.split('\t').collect();
        if parts.len() < 4 {
            return Err(NormalizerError::MalformedRow {
                line: line_no,
                reason: format!("expected at least 4 tab-separated fields, found {}", parts.len()),
            });
        }
        let parse_count = |field: &str, what: &str| {
            field.trim().parse::<u64>().map_err(|_| NormalizerError::MalformedRow {
                line: line_no,
                reason: format!("{} '{}' is not a non-negative integer", what, field),
            })
        };

        Ok(Some(ReferenceRow {
            raw_name: parts[0].to_string(),
            normalized_name: parts[1].to_string(),
            popularity: parse_count(parts[2], "popularity")?,
            group_popularity: parse_count(parts[3], "group popularity")?,
            auxiliary: parts[4..].iter().map(|s| s.to_string()).collect(),
        }))
    }

    /// Adds one row to the dictionary.
    pub fn push_row(&mut self, row: ReferenceRow) -> Result<()> {
        self.report.rows_read += 1;
        let raw_name = row.raw_name.to_lowercase();
        let normalized_name = row.normalized_name.to_lowercase();
        let key = clean_with(&raw_name, self.rules);

        let existing = self.positions.get(&key).copied();
        let Some(slot) = existing else {
            self.positions.insert(key.clone(), self.entries.len());
            self.entries.push((
                key,
                ReferenceEntry {
                    normalized_name,
                    popularity: row.popularity,
                    group_popularity: row.group_popularity,
                    auxiliary: row.auxiliary,
                },
            ));
            return Ok(());
        };

        let entry = &mut self.entries[slot].1;
        if entry.normalized_name != normalized_name {
            if self.strict_conflicts {
                return Err(NormalizerError::ConflictingMapping {
                    key,
                    existing: entry.normalized_name.clone(),
                    candidate: normalized_name,
                });
            }
            warn!(
                "Incompatible mappings for '{}': keeping '{}', skipping '{}'",
                key, entry.normalized_name, normalized_name
            );
            self.report.warnings.push(BuildWarning::ConflictingMapping {
                key,
                kept: entry.normalized_name.clone(),
                skipped: normalized_name,
            });
            return Ok(());
        }

        if entry.group_popularity != row.group_popularity {
            warn!(
                "Same name group but different popularities: {} ({}), {} ({})",
                key, entry.group_popularity, raw_name, row.group_popularity
            );
            self.report.warnings.push(BuildWarning::GroupPopularityMismatch {
                key,
                raw_name,
                stored: entry.group_popularity,
                found: row.group_popularity,
            });
        }
        // Counts sum; the latest row's group popularity and trailing fields win.
        entry.popularity = entry.popularity.saturating_add(row.popularity);
        entry.group_popularity = row.group_popularity;
        entry.auxiliary = row.auxiliary;
        Ok(())
    }

    /// Reads a whole table. Any malformed line aborts the load.
    pub fn load_reader<R: BufRead>(mut self, reader: R) -> Result<Self> {
        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            if let Some(row) = Self::parse_line(&line, i + 1)? {
                self.push_row(row)?;
            }
        }
        Ok(self)
    }

    /// Freezes the dictionary and builds the trie over it.
    pub fn build(self) -> ReferenceIndex {
        let mut trie = PrefixTrie::new();
        for (key, entry) in &self.entries {
            trie.insert(key, &entry.normalized_name, entry.popularity);
        }
        info!(
            "Built {} index: {} keys from {} rows, {} warnings",
            self.category,
            self.entries.len(),
            self.report.rows_read,
            self.report.warnings.len()
        );
        ReferenceIndex {
            category: self.category,
            rules: self.rules,
            entries: self.entries,
            positions: self.positions,
            trie,
            report: self.report,
        }
    }
}

/// The exact-match dictionary and prefix trie for one category.
/// Immutable once built.
#[derive(Debug, Clone)]
pub struct ReferenceIndex {
    category: NameCategory,
    rules: CleanRules,
    entries: Vec<(String, ReferenceEntry)>,
    positions: HashMap<String, usize>,
    trie: PrefixTrie,
    report: BuildReport,
}

impl ReferenceIndex {
    /// Loads the reference table at `path`.
    pub fn load(
        path: &Path,
        category: NameCategory,
        strict_conflicts: bool,
        clean_names: bool,
    ) -> Result<Self> {
        let file = File::open(path)?;
        let builder = IndexBuilder::new(category)
            .strict_conflicts(strict_conflicts)
            .clean_names(clean_names)
            .load_reader(BufReader::new(file))?;
        Ok(builder.build())
    }

    pub fn category(&self) -> NameCategory {
        self.category
    }

    /// The cleaning rules the keys were built with; queries must use the same.
    pub fn rules(&self) -> CleanRules {
        self.rules
    }

    pub fn get(&self, key: &str) -> Option<&ReferenceEntry> {
        self.positions.get(key).map(|&slot| &self.entries[slot].1)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.positions.contains_key(key)
    }

    /// Keys in the order they were first seen.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn trie(&self) -> &PrefixTrie {
        &self.trie
    }

    pub fn report(&self) -> &BuildReport {
        &self.report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(raw: &str, norm: &str, popularity: u64, group: u64) -> ReferenceRow {
        ReferenceRow {
            raw_name: raw.to_string(),
            normalized_name: norm.to_string(),
            popularity,
            group_popularity: group,
            auxiliary: Vec::new(),
        }
    }

    fn build(category: NameCategory, rows: Vec<ReferenceRow>) -> ReferenceIndex {
        let mut builder = IndexBuilder::new(category);
        for r in rows {
            builder.push_row(r).unwrap();
        }
        builder.build()
    }

    #[test]
    fn parses_rows_with_auxiliary_fields() {
        let row = IndexBuilder::parse_line("Henric\tHenrik\t12\t340\tm\tsv\n", 1)
            .unwrap()
            .unwrap();
        assert_eq!(row.raw_name, "Henric");
        assert_eq!(row.normalized_name, "Henrik");
        assert_eq!(row.popularity, 12);
        assert_eq!(row.group_popularity, 340);
        assert_eq!(row.auxiliary, vec!["m", "sv"]);
    }

    #[test]
    fn blank_lines_are_skipped() {
        assert_eq!(IndexBuilder::parse_line("", 3).unwrap(), None);
        assert_eq!(IndexBuilder::parse_line("  \r\n", 3).unwrap(), None);
    }

    #[test]
    fn malformed_rows_are_rejected() {
        let err = IndexBuilder::parse_line("Henric\tHenrik\t12", 7).unwrap_err();
        assert!(matches!(err, NormalizerError::MalformedRow { line: 7, .. }));

        let err = IndexBuilder::parse_line("Henric\tHenrik\tmany\t3", 2).unwrap_err();
        assert!(matches!(err, NormalizerError::MalformedRow { line: 2, .. }));

        let err = IndexBuilder::parse_line("Henric\tHenrik\t-1\t3", 2).unwrap_err();
        assert!(matches!(err, NormalizerError::MalformedRow { .. }));
    }

    #[test]
    fn keys_are_cleaned_and_names_lowercased() {
        let index = build(NameCategory::Last, vec![row("Cwist", "Kvist", 3, 10)]);
        let entry = index.get("kvist").unwrap();
        assert_eq!(entry.normalized_name, "kvist");
        assert!(index.get("Cwist").is_none());
    }

    #[test]
    fn same_mapping_accumulates_popularity() {
        let index = build(
            NameCategory::First,
            vec![row("Henric", "henrik", 4, 100), row("Henrik", "henrik", 6, 100)],
        );
        assert_eq!(index.len(), 1);
        assert_eq!(index.get("henrik").unwrap().popularity, 10);
        assert!(index.report().warnings.is_empty());
    }

    #[test]
    fn group_popularity_mismatch_is_a_warning() {
        let index = build(
            NameCategory::First,
            vec![row("Henric", "henrik", 4, 100), row("Henrik", "henrik", 6, 90)],
        );
        let entry = index.get("henrik").unwrap();
        assert_eq!(entry.popularity, 10);
        assert_eq!(entry.group_popularity, 90);
        assert_eq!(
            index.report().warnings,
            vec![BuildWarning::GroupPopularityMismatch {
                key: "henrik".to_string(),
                raw_name: "henrik".to_string(),
                stored: 100,
                found: 90,
            }]
        );
    }

    #[test]
    fn repeated_key_takes_latest_trailing_fields() {
        let table = "Henric\thenrik\t4\t100\told\nHenrik\thenrik\t6\t90\tnew\n";
        let index = IndexBuilder::new(NameCategory::First)
            .load_reader(table.as_bytes())
            .unwrap()
            .build();
        let entry = index.get("henrik").unwrap();
        assert_eq!(entry.popularity, 10);
        assert_eq!(entry.group_popularity, 90);
        assert_eq!(entry.auxiliary, vec!["new"]);
    }

    #[test]
    fn popularity_sum_saturates_instead_of_overflowing() {
        let table = format!("Anna\tanna\t{}\t1\nAnna\tanna\t1\t1\nAnni\tanni\t5\t5\n", u64::MAX);
        let index = IndexBuilder::new(NameCategory::First)
            .load_reader(table.as_bytes())
            .unwrap()
            .build();
        assert_eq!(index.get("anna").unwrap().popularity, u64::MAX);
        let top = index.trie().find("ann").unwrap().top().unwrap();
        assert_eq!(top.name, "anna");
        assert_eq!(top.popularity, u64::MAX);
    }

    #[test]
    fn conflicting_mapping_keeps_first_and_warns() {
        let index = build(
            NameCategory::First,
            vec![row("Karin", "karin", 5, 50), row("Karin", "katarina", 9, 80)],
        );
        assert_eq!(index.len(), 1);
        let entry = index.get("karin").unwrap();
        assert_eq!(entry.normalized_name, "karin");
        assert_eq!(entry.popularity, 5);
        assert_eq!(index.report().conflicts(), 1);
        assert_eq!(
            index.report().warnings[0],
            BuildWarning::ConflictingMapping {
                key: "karin".to_string(),
                kept: "karin".to_string(),
                skipped: "katarina".to_string(),
            }
        );
    }

    #[test]
    fn strict_conflicts_abort_the_build() {
        let mut builder = IndexBuilder::new(NameCategory::First).strict_conflicts(true);
        builder.push_row(row("Karin", "karin", 5, 50)).unwrap();
        let err = builder.push_row(row("Karin", "katarina", 9, 80)).unwrap_err();
        assert!(matches!(
            err,
            NormalizerError::ConflictingMapping { ref existing, ref candidate, .. }
                if existing == "karin" && candidate == "katarina"
        ));
    }

    #[test]
    fn trie_uses_accumulated_popularity() {
        let index = build(
            NameCategory::First,
            vec![
                row("Anna", "anna", 10, 30),
                row("Anni", "anni", 25, 25),
                row("Anna", "anna", 20, 30),
            ],
        );
        let top = index.trie().find("ann").unwrap().top().unwrap();
        assert_eq!(top.name, "anna");
        assert_eq!(top.popularity, 30);
    }

    #[test]
    fn keys_keep_first_insertion_order() {
        let index = build(
            NameCategory::First,
            vec![row("Erik", "erik", 1, 1), row("Anna", "anna", 1, 1), row("Erik", "erik", 1, 1)],
        );
        assert_eq!(index.keys().collect::<Vec<_>>(), vec!["erik", "anna"]);
    }

    #[test]
    fn load_reader_reads_every_row() {
        let table = "Henric\thenrik\t4\t10\nHindrich\thenrik\t1\t10\n\nAnna\tanna\t7\t7\textra\n";
        let index = IndexBuilder::new(NameCategory::First)
            .load_reader(table.as_bytes())
            .unwrap()
            .build();
        assert_eq!(index.report().rows_read, 3);
        assert_eq!(index.len(), 3);
        assert_eq!(index.get("anna").unwrap().auxiliary, vec!["extra"]);
    }

    #[test]
    fn load_reader_reports_bad_line_number() {
        let table = "Henric\thenrik\t4\t10\nbroken line\n";
        let err = IndexBuilder::new(NameCategory::First)
            .load_reader(table.as_bytes())
            .err()
            .unwrap();
        assert!(matches!(err, NormalizerError::MalformedRow { line: 2, .. }));
    }
}
