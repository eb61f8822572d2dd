//! Shared bot state

use std::sync::Arc;

use anyhow::Result;

use crate::catalog::Catalog;
use crate::commands::{AdminCheck, StaticAdmins};
use crate::config::Config;
use crate::session::SessionManager;

/// State shared by every command invocation
pub struct SharedState {
    pub catalog: Arc<Catalog>,
    pub sessions: Arc<SessionManager>,
    pub admins: Arc<dyn AdminCheck>,
    pub config: Config,
}

impl SharedState {
    /// Build the catalog from config and wire up a fresh session registry
    pub fn from_config(config: Config) -> Result<Self> {
        let catalog = Arc::new(config.build_catalog()?);
        let admins = Arc::new(StaticAdmins::from_ids(config.admins.iter().copied()));
        Ok(Self::new(catalog, admins, config))
    }

    pub fn new(catalog: Arc<Catalog>, admins: Arc<dyn AdminCheck>, config: Config) -> Self {
        Self {
            sessions: Arc::new(SessionManager::new(catalog.clone())),
            catalog,
            admins,
            config,
        }
    }
}
