//! Import Extractors: language-specific import specifier extraction.
//!
//! The two language families form a closed variant set. Both extractors
//! return sorted, deduplicated import specifiers and never fail the whole
//! analysis on a per-file syntax error — the caller isolates failures
//! per file.

pub mod python;
pub mod tsjs;

use std::collections::BTreeSet;

/// One extracted import, tagged with the ordered group of candidate
/// module strings it expands to (submodule-then-package ordering for
/// Python; a single-element group for TS/JS).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSpec {
    /// The literal text of the import as it appeared in source, used for
    /// evidence records.
    pub import_text: String,
    /// Ordered candidates to probe during resolution; first match wins.
    pub candidates: Vec<String>,
}

/// Shared extraction contract across language families (Design Note 1).
pub trait LanguageExtractor {
    /// Extract a sorted, deduplicated list of import specs from source
    /// text. `internal_prefixes` filters absolute imports to those
    /// considered part of the analyzed repo.
    fn extract(&self, text: &str, internal_prefixes: &BTreeSet<String>) -> Vec<ImportSpec>;
}

pub(crate) fn dedupe_sorted(mut specs: Vec<ImportSpec>) -> Vec<ImportSpec> {
    specs.sort_by(|a, b| a.import_text.cmp(&b.import_text));
    specs.dedup_by(|a, b| a.import_text == b.import_text);
    specs
}
