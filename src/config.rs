use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    catalog::{NpcNames, RepositoryCatalog, TargetRoster},
    handlers::{Collaborators, TrackerSettings, DEFAULT_ITEM_PICKUP_GRACE_SECS},
    run_state::DEFAULT_PENDING_SIGHTINGS,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    pub item_pickup_grace_secs: f64,
    pub resolve_names: bool,
    pub repository_path: Option<PathBuf>,
    pub npc_names_path: Option<PathBuf>,
    pub target_roster_path: Option<PathBuf>,
    pub playstyle_seed: Option<u64>,
    pub pending_sighting_capacity: usize,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            item_pickup_grace_secs: DEFAULT_ITEM_PICKUP_GRACE_SECS,
            resolve_names: true,
            repository_path: None,
            npc_names_path: None,
            target_roster_path: None,
            playstyle_seed: None,
            pending_sighting_capacity: DEFAULT_PENDING_SIGHTINGS,
        }
    }
}

impl TrackerConfig {
    pub fn load_or_create() -> Result<(Self, PathBuf)> {
        let config_dir = dirs::config_dir()
            .context("unable to locate OS config directory")?
            .join("stealth-tracker");
        fs::create_dir_all(&config_dir)
            .with_context(|| format!("failed creating config dir at {}", config_dir.display()))?;
        let config_path = config_dir.join("config.json");
        let config = Self::load_or_create_at(&config_path)?;
        Ok((config, config_path))
    }

    pub fn load_or_create_at(path: &Path) -> Result<Self> {
        if !path.exists() {
            let default = Self::default();
            default.save(path)?;
            return Ok(default);
        }

        let text = fs::read_to_string(path)
            .with_context(|| format!("failed reading {}", path.display()))?;
        serde_json::from_str::<Self>(&text)
            .with_context(|| format!("invalid json in {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let payload = serde_json::to_string_pretty(self).context("failed serializing config")?;
        fs::write(path, payload).with_context(|| format!("failed writing {}", path.display()))?;
        Ok(())
    }

    pub fn tracker_settings(&self) -> TrackerSettings {
        TrackerSettings {
            item_pickup_grace_secs: self.item_pickup_grace_secs,
            pending_sighting_capacity: self.pending_sighting_capacity,
        }
    }

    pub fn load_collaborators(&self) -> Result<Collaborators> {
        let mut collaborators = Collaborators::default();
        if let Some(path) = &self.repository_path {
            let catalog = RepositoryCatalog::load(path)
                .with_context(|| format!("failed loading repository catalog {}", path.display()))?;
            info!(entries = catalog.len(), path = %path.display(), "repository catalog loaded");
            collaborators.repository = Box::new(catalog);
        }
        if let Some(path) = &self.npc_names_path {
            let names = NpcNames::load(path)
                .with_context(|| format!("failed loading npc names {}", path.display()))?;
            collaborators.npc_names = Box::new(names);
        }
        if let Some(path) = &self.target_roster_path {
            let roster = TargetRoster::load(path)
                .with_context(|| format!("failed loading target roster {}", path.display()))?;
            info!(locations = roster.location_count(), "target roster loaded");
            collaborators.targets = Box::new(roster);
        }
        Ok(collaborators)
    }
}
