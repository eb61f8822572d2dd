//! Bot configuration
//!
//! Everything has a default, so a missing config file is not an error.
//!
//! ```toml
//! default_packs = ["main"]
//! admins = [1234]
//!
//! [[packs]]
//! key = "house"
//! name = "House Rules"
//! description = "Cards we wrote ourselves"
//!
//! [[packs]]
//! key = "weed"
//! enabled = false
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::catalog::{Catalog, CatalogItem};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Packs used by `create` when none are given
    #[serde(default = "default_packs")]
    pub default_packs: Vec<String>,
    /// Start from the built-in pack list
    #[serde(default = "default_true")]
    pub include_builtin_packs: bool,
    /// Pack additions and overrides, matched by key
    #[serde(default)]
    pub packs: Vec<PackConfig>,
    /// Users treated as channel admins by the static admin check
    #[serde(default)]
    pub admins: Vec<u64>,
}

/// Single pack entry
#[derive(Debug, Clone, Deserialize)]
pub struct PackConfig {
    pub key: String,
    /// Display name; required for new packs, optional for overrides
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_packs() -> Vec<String> {
    vec!["main".to_string()]
}

fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_packs: default_packs(),
            include_builtin_packs: true,
            packs: vec![],
            admins: vec![],
        }
    }
}

impl Config {
    /// Load config from a TOML file, falling back to defaults when absent
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::warn!("config not found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("failed to parse {}", path.display()))?;

        tracing::info!(
            "loaded {} pack entries from {}",
            config.packs.len(),
            path.display()
        );

        Ok(config)
    }

    /// Merge built-in and configured packs into a validated catalog.
    ///
    /// A configured key replaces the built-in entry in place, unknown keys
    /// are appended, and `enabled = false` drops the pack.
    pub fn build_catalog(&self) -> Result<Catalog> {
        let mut items = if self.include_builtin_packs {
            Catalog::builtin().all().to_vec()
        } else {
            Vec::new()
        };

        for pack in &self.packs {
            match items.iter().position(|p| p.key == pack.key) {
                Some(idx) if !pack.enabled => {
                    items.remove(idx);
                }
                Some(idx) => {
                    let item = &mut items[idx];
                    if let Some(name) = &pack.name {
                        item.name = name.clone();
                    }
                    if let Some(desc) = &pack.description {
                        item.description = desc.clone();
                    }
                }
                None if !pack.enabled => {}
                None => {
                    let name = pack
                        .name
                        .clone()
                        .with_context(|| format!("pack '{}' needs a name", pack.key))?;
                    items.push(CatalogItem::new(
                        pack.key.clone(),
                        name,
                        pack.description.clone().unwrap_or_default(),
                    ));
                }
            }
        }

        Catalog::new(items).context("invalid pack catalog")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.default_packs, vec!["main"]);
        assert!(config.include_builtin_packs);
        let catalog = config.build_catalog().unwrap();
        assert_eq!(catalog.len(), Catalog::builtin().len());
    }

    #[test]
    fn test_overrides_and_additions() {
        let config: Config = toml::from_str(
            r#"
            [[packs]]
            key = "main"
            name = "Core"

            [[packs]]
            key = "weed"
            enabled = false

            [[packs]]
            key = "house"
            name = "House Rules"
            description = "Ours"
            "#,
        )
        .unwrap();

        let catalog = config.build_catalog().unwrap();
        assert_eq!(catalog.all()[0].name, "Core");
        assert_eq!(catalog.all()[0].description, "The main deck, US edition");
        assert!(catalog.lookup("weed").is_none());
        assert_eq!(catalog.all().last().map(|p| p.key.as_str()), Some("house"));
    }

    #[test]
    fn test_only_configured_packs() {
        let config: Config = toml::from_str(
            r#"
            include_builtin_packs = false
            default_packs = ["a"]

            [[packs]]
            key = "a"
            name = "Alpha"
            "#,
        )
        .unwrap();
        let catalog = config.build_catalog().unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(config.default_packs, vec!["a"]);
    }

    #[test]
    fn test_new_pack_without_name_fails() {
        let config: Config = toml::from_str("[[packs]]\nkey = \"x\"\n").unwrap();
        let err = config.build_catalog().unwrap_err();
        assert!(err.to_string().contains("needs a name"));
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let config: Config =
            toml::from_str("[[packs]]\nkey = \"x\"\nname = \"Base Set\"\n").unwrap();
        let err = config.build_catalog().unwrap_err();
        assert!(format!("{err:#}").contains("duplicate pack name"));
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = Config::load("/definitely/not/here/config.toml").unwrap();
        assert_eq!(config.default_packs, vec!["main"]);
    }
}
