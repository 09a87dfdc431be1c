// File: src/core/cleaner.rs
use crate::core::types::NameCategory;

/// Marker left behind in the source records; everything from it onward is noise.
const ARTIFACT_MARKER: &str = "\\k";

/// Prefixes stripped from causes of death, in this order, each at most once.
const DEATH_CAUSE_PREFIXES: [&str; 4] = ["af ", "i ", "död af ", "död i "];

/// The rule set the canonicalizer applies to one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CleanRules {
    /// Strip unknown characters and map historical spellings to modern letters.
    pub substitute: bool,
    pub surname: bool,
    pub death_cause: bool,
}

impl CleanRules {
    pub fn for_category(category: NameCategory) -> Self {
        Self {
            substitute: true,
            surname: category.is_surname(),
            death_cause: category.is_cause_of_death(),
        }
    }

    /// Same rules with the substitution pass switched off.
    pub fn without_substitution(self) -> Self {
        Self {
            substitute: false,
            ..self
        }
    }
}

fn is_vowel(c: char) -> bool {
    matches!(c, 'a' | 'e' | 'i' | 'o' | 'u' | 'y' | 'ä' | 'ö')
}

fn is_kept_char(c: char) -> bool {
    c.is_ascii_lowercase() || matches!(c, 'å' | 'ä' | 'ö' | 'é' | ' ')
}

/// Cleans a raw token into the lookup key used by `category`.
pub fn clean(token: &str, category: NameCategory) -> String {
    clean_with(token, CleanRules::for_category(category))
}

/// Cleans a raw token with an explicit rule set.
pub fn clean_with(token: &str, rules: CleanRules) -> String {
    if token.is_empty() {
        return String::new();
    }

    let lowered = token.to_lowercase();
    let mut cleaned = match lowered.find(ARTIFACT_MARKER) {
        Some(pos) => lowered[..pos].trim().to_string(),
        None => lowered.trim().to_string(),
    };

    if rules.substitute {
        cleaned = substitute(&cleaned);
    }
    if rules.surname {
        cleaned = clean_surname(&cleaned);
    }
    if rules.death_cause {
        cleaned = strip_death_cause_prefixes(cleaned);
    }
    cleaned
}

fn substitute(token: &str) -> String {
    token
        .chars()
        .filter(|&c| is_kept_char(c))
        .collect::<String>()
        .trim()
        .chars()
        .map(|c| match c {
            'c' => 'k',
            'å' => 'o',
            'w' => 'v',
            'é' => 'e',
            other => other,
        })
        .collect()
}

fn clean_surname(token: &str) -> String {
    let replaced = token
        .replace("io", "jo")
        .replace("iö", "jö")
        .replace("ph", "ff");
    let mut chars: Vec<char> = replaced.chars().collect();

    // Legacy behaviour: only the last two characters of "nen" go.
    if chars.ends_with(&['n', 'e', 'n']) {
        chars.truncate(chars.len() - 2);
    }
    if chars.len() > 3 && chars.ends_with(&['i', 'n']) && is_vowel(chars[chars.len() - 3]) {
        chars.truncate(chars.len() - 2);
        chars.push('n');
    }
    chars.into_iter().collect()
}

fn strip_death_cause_prefixes(mut token: String) -> String {
    for prefix in DEATH_CAUSE_PREFIXES {
        if let Some(rest) = token.strip_prefix(prefix) {
            token = rest.trim_start().to_string();
        }
    }
    token
}
