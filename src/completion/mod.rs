//! Pack autocomplete for the `create` command
//!
//! The `packs` argument is a space-separated list of pack keys. Every
//! keystroke re-parses the raw text and produces a fresh suggestion list:
//! - `parse` splits committed tokens from the one still being typed
//! - `similarity` scores typo tolerance
//! - `rank` filters, orders, caps and truncates the suggestions

mod parse;
mod rank;
mod similarity;

use serde::Serialize;

use crate::catalog::Catalog;

pub use parse::{parse, ParsedSelection, WILDCARD};
pub use rank::{rank, MAX_SUGGESTIONS, MAX_SUGGESTION_LEN, SIMILARITY_THRESHOLD};
pub use similarity::similarity;

/// A single autocomplete choice
///
/// `value` is re-submitted verbatim when the user picks the choice, so it is
/// always identical to `label`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Suggestion {
    #[serde(rename = "name")]
    pub label: String,
    pub value: String,
}

impl Suggestion {
    pub fn new(text: impl Into<String>) -> Self {
        let label = text.into();
        Self {
            value: label.clone(),
            label,
        }
    }

    /// The "all packs" choice
    pub fn wildcard() -> Self {
        Self::new(WILDCARD)
    }
}

/// Suggestions for the raw, partially typed `packs` argument
pub fn complete(catalog: &Catalog, raw: &str) -> Vec<Suggestion> {
    let selection = parse(raw);
    let suggestions = rank(catalog, &selection);
    tracing::trace!(
        committed = selection.committed.len(),
        in_progress = selection.in_progress,
        count = suggestions.len(),
        "pack autocomplete"
    );
    suggestions
}
