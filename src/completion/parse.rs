//! Splitting the raw `packs` argument into committed and in-progress tokens

/// Token meaning "every pack in the catalog"
pub const WILDCARD: &str = "*";

/// The raw argument split at whitespace
///
/// Tokens are opaque here; nothing is checked against the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedSelection<'a> {
    /// Whitespace-terminated tokens in typing order
    pub committed: Vec<&'a str>,
    /// Trailing token still being typed (empty after a space)
    pub in_progress: &'a str,
    /// Raw input ended in whitespace
    pub trailing_space: bool,
}

impl ParsedSelection<'_> {
    pub fn has_wildcard(&self) -> bool {
        self.committed.contains(&WILDCARD)
    }
}

/// Parse raw input into committed tokens plus the in-progress one
pub fn parse(raw: &str) -> ParsedSelection<'_> {
    let mut committed: Vec<&str> = raw.split_whitespace().collect();
    let trailing_space = raw.ends_with(char::is_whitespace);

    let in_progress = if trailing_space || raw.is_empty() {
        ""
    } else {
        committed.pop().unwrap_or("")
    };

    ParsedSelection {
        committed,
        in_progress,
        trailing_space,
    }
}
