use serde::Serialize;

use crate::{
    enums::{GameTension, MissionType},
    keys::{RepoId, RepoMap, RepoSet},
};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct KillStats {
    pub total: u32,
    pub targets: RepoSet,
    pub non_targets: RepoSet,
    pub proxy_deaths: RepoSet,
    pub noticed: u32,
    pub unnoticed: u32,
    pub unnoticed_target: u32,
    pub unnoticed_non_target: u32,
    pub guard: u32,
    pub civilian: u32,
    pub crowd: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct KillMethodStats {
    pub accident: u32,
    pub accident_target: u32,
    pub headshot: u32,
    pub headshot_target: u32,
    pub melee: u32,
    pub melee_target: u32,
    pub unarmed: u32,
    pub unarmed_target: u32,
    pub thrown: u32,
    pub thrown_target: u32,
    pub pistol: u32,
    pub pistol_target: u32,
    pub smg: u32,
    pub smg_target: u32,
    pub shotgun: u32,
    pub shotgun_target: u32,
    pub pistol_elim: u32,
    pub pistol_elim_target: u32,
    pub silenced_weapon: u32,
    pub silenced_weapon_target: u32,
    pub drown: u32,
    pub drown_target: u32,
    pub push: u32,
    pub push_target: u32,
    pub burn: u32,
    pub burn_target: u32,
    pub accident_explosion: u32,
    pub accident_explosion_target: u32,
    pub falling_object: u32,
    pub falling_object_target: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PacifyStats {
    pub total: u32,
    pub targets: RepoSet,
    pub non_targets: RepoSet,
    pub proxy_deaths: RepoSet,
    pub noticed: u32,
    pub unnoticed: u32,
    pub unnoticed_target: u32,
    pub unnoticed_non_target: u32,
    pub guard: u32,
    pub civilian: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PacifyMethodStats {
    pub accident: u32,
    pub melee: u32,
    pub thrown: u32,
    pub headshot: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MurderedBodyFoundInfo {
    pub sightings: RepoMap<bool>,
    pub sighted_by_non_target: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BodyStats {
    pub unique_bodies_found: RepoSet,
    pub crowd_bodies_found: RepoSet,
    pub murdered_bodies: RepoMap<MurderedBodyFoundInfo>,
    pub hidden_bodies: RepoSet,
    pub all_hidden: bool,
    pub hidden: u32,
    pub found: u32,
    pub found_accidents: u32,
    pub found_murdered: u32,
    pub found_murdered_by_non_target: u32,
    pub found_crowd: u32,
    pub found_crowd_murders: u32,
    pub target_body_witnesses_killed: u32,
    pub dead_seen: u32,
    pub targets_found: u32,
    pub bagged: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DetectionStats {
    pub on_camera: bool,
    pub spotted: u32,
    pub witnesses: u32,
    pub caught_trespassing: u32,
    pub targets_spotted_by_and_killed: u32,
    pub non_targets_spotted_by: u32,
    pub unique_npcs_caught_by_and_killed: u32,
    pub witnesses_killed: u32,
    pub situations_contained: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TensionStats {
    pub alerted_low: u32,
    pub alerted_high: u32,
    pub agitated: u32,
    pub searching: u32,
    pub hunting: u32,
    pub arrest: u32,
    pub combat: u32,
    pub level: i32,
}

impl TensionStats {
    pub fn record_occurrence(&mut self, tension: GameTension) {
        let counter = match tension {
            GameTension::AlertedLow => &mut self.alerted_low,
            GameTension::AlertedHigh => &mut self.alerted_high,
            GameTension::Agitated => &mut self.agitated,
            GameTension::Searching => &mut self.searching,
            GameTension::Hunting => &mut self.hunting,
            GameTension::Arrest => &mut self.arrest,
            GameTension::Combat => &mut self.combat,
            GameTension::Ambient | GameTension::Undefined => return,
        };
        *counter = counter.saturating_add(1);
    }

    pub fn escalate(&mut self, delta: i32) {
        if delta > 0 {
            self.level = self.level.saturating_add(delta);
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MiscStats {
    pub started_in_suit: bool,
    pub suit_retrieved: bool,
    pub recorder_erased: bool,
    pub recorder_destroyed: bool,
    pub recorded_then_erased: bool,
    pub agility_actions: u32,
    pub cameras_destroyed: u32,
    pub disguises_taken: u32,
    pub doors_unlocked: u32,
    pub intel_items_picked_up: u32,
    pub items_picked_up: u32,
    pub items_removed_from_inventory: u32,
    pub items_dropped: u32,
    pub items_thrown: u32,
    pub key_items_picked_up: u32,
    pub missed_shots: u32,
    pub non_headshots: u32,
    pub shots_fired: u32,
    pub targets_made_sick: u32,
    pub times_trespassed: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CurrentStats {
    pub tension: GameTension,
    pub in_suit: bool,
    pub trespassing: bool,
    pub disguise_blown: bool,
    pub holding_illegal_weapon: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum ItemInfoType {
    #[default]
    None,
    Key,
    Intel,
    Detonator,
    Coin,
    Firearm,
    AmmoBox,
    Explosive,
    Melee,
    LethalMelee,
    Poison,
    Briefcase,
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemInfo {
    pub kind: ItemInfoType,
    pub name: String,
    pub count: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ItemMap(RepoMap<ItemInfo>);

impl ItemMap {
    pub fn insert(&mut self, id: RepoId, kind: ItemInfoType, name: impl Into<String>) {
        self.0
            .entry(id)
            .and_modify(|info| info.count = info.count.saturating_add(1))
            .or_insert_with(|| ItemInfo {
                kind,
                name: name.into(),
                count: 1,
            });
    }

    pub fn take_one(&mut self, id: &RepoId) -> Option<ItemInfo> {
        let info = self.0.get_mut(id)?;
        let taken = ItemInfo {
            count: 1,
            ..info.clone()
        };
        if info.count > 1 {
            info.count -= 1;
        } else {
            self.0.remove(id);
        }
        Some(taken)
    }

    pub fn get(&self, id: &RepoId) -> Option<&ItemInfo> {
        self.0.get(id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ContractInfo {
    pub location_id: RepoId,
    pub mission_type: MissionType,
    pub difficulty_level: i32,
    pub is_vr: bool,
    pub starting_disguise: RepoId,
    pub loadout: Vec<RepoId>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Stats {
    pub witnesses: RepoSet,
    pub target_witnesses: RepoSet,
    pub spotted_by: RepoSet,
    pub targets_spotted_by: RepoSet,
    pub target_body_witnesses: RepoSet,
    pub disguises_blown: RepoSet,
    pub items_obtained: ItemMap,
    pub items_disposed: ItemMap,
    pub kills: KillStats,
    pub kill_methods: KillMethodStats,
    pub pacifies: PacifyStats,
    pub pacify_methods: PacifyMethodStats,
    pub bodies: BodyStats,
    pub detection: DetectionStats,
    pub tension: TensionStats,
    pub current: CurrentStats,
    pub misc: MiscStats,
}

impl Stats {
    pub fn is_killed(&self, id: &RepoId) -> bool {
        self.kills.targets.contains(id) || self.kills.non_targets.contains(id)
    }

    pub fn refresh_non_targets_spotted_by(&mut self) {
        let count = self.spotted_by.len().saturating_sub(self.targets_spotted_by.len());
        self.detection.non_targets_spotted_by = u32::try_from(count).unwrap_or(u32::MAX);
    }
}
