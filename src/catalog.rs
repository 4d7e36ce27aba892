use std::{
    collections::{HashMap, HashSet},
    fs,
    path::Path,
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::{
    keys::{RepoId, RepoMap, RepoSet},
    stats::ItemInfoType,
};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RepositoryItem {
    pub kind: ItemInfoType,
    pub title: String,
    pub common_name: String,
    pub is_hitman_suit: bool,
}

pub trait RepositoryLookup: Send {
    fn item(&self, id: &RepoId) -> Option<RepositoryItem>;

    fn is_hitman_suit(&self, id: &RepoId) -> bool {
        self.item(id).is_some_and(|item| item.is_hitman_suit)
    }
}

pub trait NpcNameLookup: Send {
    fn npc_name(&self, id: &RepoId) -> Option<String>;
}

pub trait TargetRegistry: Send {
    fn is_target(&self, id: &RepoId) -> bool;

    fn select_location(&mut self, location_id: &RepoId);

    fn add_dynamic_target(&mut self, id: RepoId);
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct RepositoryRecord {
    #[serde(rename = "ID_")]
    id: RepoId,
    #[serde(rename = "Title")]
    title: String,
    #[serde(rename = "CommonName")]
    common_name: String,
    #[serde(rename = "ItemType")]
    item_type: String,
    #[serde(rename = "InventoryCategoryIcon")]
    inventory_icon: String,
    #[serde(rename = "IsHitmanSuit")]
    is_hitman_suit: bool,
}

#[derive(Debug, Clone, Default)]
pub struct RepositoryCatalog {
    items: RepoMap<RepositoryItem>,
}

impl RepositoryCatalog {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed reading repository at {}", path.display()))?;
        Self::from_json(&text)
            .with_context(|| format!("invalid repository json at {}", path.display()))
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let records = serde_json::from_str::<Vec<RepositoryRecord>>(text)
            .context("repository must be a list of entries")?;
        let mut catalog = Self::default();
        for record in records {
            if record.id.is_empty() {
                continue;
            }
            let kind = classify_item(&record.inventory_icon, &record.item_type);
            catalog.items.insert(
                record.id,
                RepositoryItem {
                    kind,
                    title: record.title,
                    common_name: record.common_name,
                    is_hitman_suit: record.is_hitman_suit,
                },
            );
        }
        Ok(catalog)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl RepositoryLookup for RepositoryCatalog {
    fn item(&self, id: &RepoId) -> Option<RepositoryItem> {
        self.items.get(id).cloned()
    }
}

fn classify_item(inventory_icon: &str, item_type: &str) -> ItemInfoType {
    let item_type = item_type.to_ascii_lowercase();
    match inventory_icon.to_ascii_lowercase().as_str() {
        "key" => ItemInfoType::Key,
        "questitem" | "intel" => ItemInfoType::Intel,
        "remote" | "detonator" => ItemInfoType::Detonator,
        "coin" => ItemInfoType::Coin,
        "pistol" | "smg" | "shotgun" | "sniperrifle" | "assaultrifle" => ItemInfoType::Firearm,
        "ammunition" => ItemInfoType::AmmoBox,
        "explosives" => ItemInfoType::Explosive,
        "melee" if item_type.contains("lethal") => ItemInfoType::LethalMelee,
        "melee" => ItemInfoType::Melee,
        "poison" => ItemInfoType::Poison,
        "container" => ItemInfoType::Briefcase,
        "" => ItemInfoType::None,
        _ => ItemInfoType::Other,
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NpcNames {
    names: HashMap<RepoId, String>,
}

impl NpcNames {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed reading npc names at {}", path.display()))?;
        let names = serde_json::from_str::<HashMap<RepoId, String>>(&text)
            .with_context(|| format!("invalid npc names json at {}", path.display()))?;
        Ok(Self { names })
    }

    pub fn insert(&mut self, id: RepoId, name: impl Into<String>) {
        self.names.insert(id, name.into());
    }
}

impl NpcNameLookup for NpcNames {
    fn npc_name(&self, id: &RepoId) -> Option<String> {
        self.names
            .get(id)
            .map(|name| name.trim())
            .filter(|name| !name.is_empty())
            .map(ToOwned::to_owned)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct PersistedRoster {
    locations: HashMap<RepoId, Vec<RepoId>>,
}

#[derive(Debug, Clone, Default)]
pub struct TargetRoster {
    locations: HashMap<RepoId, RepoSet>,
    active: RepoSet,
    dynamic: HashSet<RepoId>,
}

impl TargetRoster {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed reading target roster at {}", path.display()))?;
        let parsed = serde_json::from_str::<PersistedRoster>(&text)
            .with_context(|| format!("invalid target roster json at {}", path.display()))?;
        let mut roster = Self::default();
        for (location_id, targets) in parsed.locations {
            roster.insert_location(location_id, targets);
        }
        Ok(roster)
    }

    pub fn insert_location(&mut self, location_id: RepoId, targets: impl IntoIterator<Item = RepoId>) {
        self.locations
            .entry(location_id)
            .or_default()
            .extend(targets);
    }

    pub fn location_count(&self) -> usize {
        self.locations.len()
    }
}

impl TargetRegistry for TargetRoster {
    fn is_target(&self, id: &RepoId) -> bool {
        self.active.contains(id) || self.dynamic.contains(id)
    }

    fn select_location(&mut self, location_id: &RepoId) {
        self.active = self.locations.get(location_id).cloned().unwrap_or_default();
    }

    fn add_dynamic_target(&mut self, id: RepoId) {
        if !id.is_empty() {
            self.dynamic.insert(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        NpcNameLookup, NpcNames, RepositoryCatalog, RepositoryLookup, TargetRegistry, TargetRoster,
    };
    use crate::{keys::RepoId, stats::ItemInfoType};

    #[test]
    fn repository_classifies_by_inventory_icon() {
        let catalog = RepositoryCatalog::from_json(
            r#"[
                { "ID_": "KEY-1", "Title": "Office Key", "InventoryCategoryIcon": "key" },
                { "ID_": "knife", "CommonName": "Knife", "ItemType": "eItemMeleeLethal", "InventoryCategoryIcon": "melee" },
                { "ID_": "suit", "Title": "Signature Suit", "IsHitmanSuit": true },
                { "Title": "no id" }
            ]"#,
        )
        .expect("repository should parse");
        assert_eq!(catalog.len(), 3);
        let key = catalog.item(&RepoId::new("key-1")).expect("key should resolve");
        assert_eq!(key.kind, ItemInfoType::Key);
        assert_eq!(key.title, "Office Key");
        assert_eq!(
            catalog.item(&RepoId::new("KNIFE")).map(|item| item.kind),
            Some(ItemInfoType::LethalMelee)
        );
        assert!(catalog.is_hitman_suit(&RepoId::new("suit")));
        assert!(!catalog.is_hitman_suit(&RepoId::new("missing")));
    }

    #[test]
    fn roster_combines_location_and_dynamic_targets() {
        let mut roster = TargetRoster::default();
        roster.insert_location(RepoId::new("paris"), [RepoId::new("Viktor"), RepoId::new("Dalia")]);
        assert!(!roster.is_target(&RepoId::new("viktor")));

        roster.select_location(&RepoId::new("PARIS"));
        assert!(roster.is_target(&RepoId::new("viktor")));

        roster.add_dynamic_target(RepoId::new("Syndicate-Leader"));
        roster.select_location(&RepoId::new("sapienza"));
        assert!(!roster.is_target(&RepoId::new("viktor")));
        assert!(roster.is_target(&RepoId::new("syndicate-leader")));
    }

    #[test]
    fn npc_names_skip_blank_entries() {
        let mut names = NpcNames::default();
        names.insert(RepoId::new("a"), "Agent Smith");
        names.insert(RepoId::new("b"), "  ");
        assert_eq!(names.npc_name(&RepoId::new("A")).as_deref(), Some("Agent Smith"));
        assert_eq!(names.npc_name(&RepoId::new("b")), None);
        assert_eq!(names.npc_name(&RepoId::new("c")), None);
    }
}
