//! Building the bounded suggestion list from a parsed selection

use crate::catalog::{Catalog, CatalogItem};

use super::parse::ParsedSelection;
use super::similarity::similarity;
use super::Suggestion;

/// Most choices the host UI accepts, wildcard included
pub const MAX_SUGGESTIONS: usize = 25;
/// Longest label/value the host UI accepts, in chars
pub const MAX_SUGGESTION_LEN: usize = 100;
/// Minimum similarity for a non-substring match
pub const SIMILARITY_THRESHOLD: f64 = 0.7;

const ELLIPSIS: &str = "...";

/// Rank the remaining packs against the in-progress token.
///
/// The wildcard always comes first. Packs follow in ordinal name order;
/// similarity only decides membership, never position. Each value is the
/// display names already committed followed by the candidate's name.
pub fn rank(catalog: &Catalog, selection: &ParsedSelection<'_>) -> Vec<Suggestion> {
    if selection.has_wildcard() {
        return vec![Suggestion::wildcard()];
    }

    // unknown keys drop out here
    let resolved: Vec<&CatalogItem> = selection
        .committed
        .iter()
        .filter_map(|key| catalog.lookup(key))
        .collect();

    let mut prefix = String::new();
    for item in &resolved {
        prefix.push_str(&item.name);
        prefix.push(' ');
    }

    let needle = selection.in_progress.to_lowercase();
    let mut candidates: Vec<&str> = catalog
        .all()
        .iter()
        .map(|item| item.name.as_str())
        .filter(|name| !resolved.iter().any(|r| r.name == *name))
        .filter(|name| is_relevant(name, &needle, selection.trailing_space))
        .collect();
    candidates.sort_unstable();

    let mut suggestions = Vec::with_capacity(MAX_SUGGESTIONS.min(candidates.len() + 1));
    suggestions.push(Suggestion::wildcard());
    suggestions.extend(
        candidates
            .into_iter()
            .take(MAX_SUGGESTIONS - 1)
            .map(|name| Suggestion::new(compose(&prefix, name))),
    );
    suggestions
}

fn is_relevant(name: &str, needle: &str, trailing_space: bool) -> bool {
    if needle.is_empty() || trailing_space {
        return true;
    }
    let name = name.to_lowercase();
    name.contains(needle) || similarity(&name, needle) >= SIMILARITY_THRESHOLD
}

/// Join prefix and name, cutting the prefix down when the result is too long.
///
/// A cut value no longer re-parses to the packs it shows; the host limit
/// leaves no room for both.
fn compose(prefix: &str, name: &str) -> String {
    let name_len = name.chars().count();
    if prefix.chars().count() + name_len <= MAX_SUGGESTION_LEN {
        return format!("{prefix}{name}");
    }

    let keep = (MAX_SUGGESTION_LEN - ELLIPSIS.len()).saturating_sub(name_len);
    let mut value: String = prefix.chars().take(keep).collect();
    value.push_str(ELLIPSIS);
    value.push_str(name);

    // a name longer than the budget on its own still has to fit
    if name_len + ELLIPSIS.len() > MAX_SUGGESTION_LEN {
        value = value.chars().take(MAX_SUGGESTION_LEN).collect();
    }
    value
}
