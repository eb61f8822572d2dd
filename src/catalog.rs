//! Pack catalog: the fixed set of card packs a game can be created with
//!
//! Built once at startup (from the built-in list plus config overrides) and
//! shared read-only behind an `Arc`. Iteration order is the order packs were
//! added, which is stable for the lifetime of the process.

use std::collections::HashMap;

use serde::Serialize;
use thiserror::Error;

/// A selectable card pack
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogItem {
    /// Short key typed by users (e.g., "main")
    pub key: String,
    /// Display name shown in suggestions (e.g., "Base Set")
    pub name: String,
    pub description: String,
}

impl CatalogItem {
    pub fn new(
        key: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            description: description.into(),
        }
    }
}

/// Catalog construction failures
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("pack key must not be empty or contain whitespace: {0:?}")]
    InvalidKey(String),
    #[error("duplicate pack key: {0}")]
    DuplicateKey(String),
    #[error("duplicate pack name: {0}")]
    DuplicateName(String),
}

/// Immutable registry of packs, looked up by key or iterated in full
#[derive(Debug, Default)]
pub struct Catalog {
    items: Vec<CatalogItem>,
    by_key: HashMap<String, usize>,
}

impl Catalog {
    /// Build a catalog, rejecting duplicate keys or display names.
    ///
    /// `"*"` is reserved for the wildcard and is rejected as a key.
    pub fn new(items: Vec<CatalogItem>) -> Result<Self, CatalogError> {
        let mut by_key = HashMap::with_capacity(items.len());
        let mut names = HashMap::with_capacity(items.len());

        for (idx, item) in items.iter().enumerate() {
            if item.key.is_empty() || item.key == "*" || item.key.contains(char::is_whitespace) {
                return Err(CatalogError::InvalidKey(item.key.clone()));
            }
            if by_key.insert(item.key.clone(), idx).is_some() {
                return Err(CatalogError::DuplicateKey(item.key.clone()));
            }
            if names.insert(item.name.as_str(), idx).is_some() {
                return Err(CatalogError::DuplicateName(item.name.clone()));
            }
        }

        Ok(Self { items, by_key })
    }

    /// Catalog populated with the built-in packs
    pub fn builtin() -> Self {
        Self::new(builtin_packs()).unwrap_or_default()
    }

    pub fn lookup(&self, key: &str) -> Option<&CatalogItem> {
        self.by_key.get(key).map(|&idx| &self.items[idx])
    }

    pub fn all(&self) -> &[CatalogItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Built-in packs: (key, display name, description)
const BUILTIN_PACKS: &[(&str, &str, &str)] = &[
    ("main", "Base Set", "The main deck, US edition"),
    ("uk", "UK Edition", "The main deck with British cards swapped in"),
    ("exp1", "The First Expansion", "80 extra cards from the first expansion"),
    ("exp2", "The Second Expansion", "75 extra cards from the second expansion"),
    ("exp3", "The Third Expansion", "75 extra cards from the third expansion"),
    ("exp4", "The Fourth Expansion", "70 extra cards from the fourth expansion"),
    ("exp5", "The Fifth Expansion", "75 extra cards from the fifth expansion"),
    ("exp6", "The Sixth Expansion", "75 extra cards from the sixth expansion"),
    ("green", "Green Box Expansion", "300 cards from the green box"),
    ("red", "Red Box Expansion", "300 cards from the red box"),
    ("blue", "Blue Box Expansion", "300 cards from the blue box"),
    ("holiday", "Holiday Pack", "Seasonal cards from the holiday bullshit packs"),
    ("science", "Science Pack", "Cards about science, written with actual scientists"),
    ("fantasy", "Fantasy Pack", "Wizards, dragons and questionable quests"),
    ("food", "Food Pack", "Cards about eating things"),
    ("scifi", "Sci-Fi Pack", "Space, robots and time travel"),
    ("nostalgia", "90s Nostalgia Pack", "Cards for people who peaked in the nineties"),
    ("world", "World Wide Web Pack", "Cards about the internet"),
    ("weed", "Weed Pack", "Cards about weed"),
    ("college", "College Pack", "Cards about college life"),
    ("theatre", "Theatre Pack", "Cards for theatre kids"),
    ("geek", "PAX Geek Pack", "Cards from the PAX conventions"),
];

fn builtin_packs() -> Vec<CatalogItem> {
    BUILTIN_PACKS
        .iter()
        .map(|(key, name, desc)| CatalogItem::new(*key, *name, *desc))
        .collect()
}
