// src/lib.rs

pub mod config;
pub mod core;
pub mod error;
pub mod fuzzy;

pub use crate::config::NormalizerConfig;
pub use crate::core::engine::{NormalizeOptions, Normalizer};
pub use crate::core::types::{MatchDiagnostics, MatchMethod, NameCategory, SearchMode};
pub use crate::error::{NormalizerError, Result};
