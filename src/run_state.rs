use std::collections::{HashMap, VecDeque};

use serde::Serialize;
use tracing::debug;

use crate::{
    events::DeadBody,
    keys::{RepoId, RepoMap, RepoSet},
    stats::{ContractInfo, Stats},
};

// Timestamps are float seconds. Two events belong to the same batch when
// they are within this distance of each other.
pub const TIMESTAMP_EPSILON: f64 = 1e-4;

pub const DEFAULT_PENDING_SIGHTINGS: usize = 64;

pub fn same_instant(a: f64, b: f64) -> bool {
    (a - b).abs() <= TIMESTAMP_EPSILON
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SightingKind {
    Accident,
    Found,
    Murdered,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BodyWitness {
    pub id: RepoId,
    pub is_target: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BodySighting {
    pub kind: SightingKind,
    pub body: DeadBody,
    pub witness: Option<BodyWitness>,
}

#[derive(Debug, Clone, PartialEq)]
struct PendingSighting {
    timestamp: f64,
    sighting: BodySighting,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NoticedTakedown {
    pub is_target: bool,
    pub timestamp: f64,
    pub witnesses: RepoSet,
}

#[derive(Debug, Clone, Default)]
struct Batch {
    timestamp: Option<f64>,
    killed: RepoSet,
    reported_witnesses: RepoSet,
}

#[derive(Debug, Clone)]
pub struct RunState {
    pub stats: Stats,
    pub contract: ContractInfo,
    pub ended: bool,
    pub intro_cut_end: Option<f64>,
    pub noticed_kills: RepoMap<NoticedTakedown>,
    pub noticed_pacifies: RepoMap<NoticedTakedown>,
    batch: Batch,
    pending: VecDeque<PendingSighting>,
    pending_capacity: usize,
    actor_tension: HashMap<RepoId, u8>,
}

impl Default for RunState {
    fn default() -> Self {
        Self::new(DEFAULT_PENDING_SIGHTINGS)
    }
}

impl RunState {
    pub fn new(pending_capacity: usize) -> Self {
        Self {
            stats: Stats::default(),
            contract: ContractInfo::default(),
            ended: false,
            intro_cut_end: None,
            noticed_kills: RepoMap::new(),
            noticed_pacifies: RepoMap::new(),
            batch: Batch::default(),
            pending: VecDeque::new(),
            pending_capacity: pending_capacity.max(1),
            actor_tension: HashMap::new(),
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.pending_capacity);
    }

    pub fn begin_event(&mut self, timestamp: f64) {
        if self
            .batch
            .timestamp
            .is_some_and(|current| same_instant(current, timestamp))
        {
            return;
        }
        self.batch = Batch {
            timestamp: Some(timestamp),
            ..Batch::default()
        };
        if !self.pending.is_empty() {
            debug!(
                dropped = self.pending.len(),
                "discarding unresolved body sightings from previous batch"
            );
            self.pending.clear();
        }
    }

    pub fn remember_kill(&mut self, id: RepoId) {
        self.batch.killed.insert(id);
    }

    pub fn killed_this_batch(&self, id: &RepoId) -> bool {
        self.batch.killed.contains(id)
    }

    pub fn note_reported_witnesses<'a>(&mut self, ids: impl IntoIterator<Item = &'a RepoId>) {
        self.batch
            .reported_witnesses
            .extend(ids.into_iter().filter(|id| !id.is_unresolved()).cloned());
    }

    pub fn reported_witnesses(&self) -> &RepoSet {
        &self.batch.reported_witnesses
    }

    pub fn park_sighting(&mut self, timestamp: f64, sighting: BodySighting) {
        if self.pending.len() >= self.pending_capacity {
            self.pending.pop_front();
        }
        self.pending.push_back(PendingSighting {
            timestamp,
            sighting,
        });
    }

    pub fn take_sightings_at(&mut self, timestamp: f64) -> Vec<BodySighting> {
        let mut taken = Vec::new();
        self.pending.retain(|pending| {
            if same_instant(pending.timestamp, timestamp) {
                taken.push(pending.sighting.clone());
                false
            } else {
                true
            }
        });
        taken
    }

    pub fn pending_sightings(&self) -> usize {
        self.pending.len()
    }

    pub fn raise_actor_tension(&mut self, id: &RepoId, level: u8) -> u8 {
        let mark = self.actor_tension.entry(id.clone()).or_insert(0);
        if level <= *mark {
            return 0;
        }
        let delta = level - *mark;
        *mark = level;
        delta
    }
}

#[cfg(test)]
mod tests {
    use super::{same_instant, BodySighting, RunState, SightingKind};
    use crate::{events::DeadBody, keys::RepoId};

    fn sighting(id: &str) -> BodySighting {
        BodySighting {
            kind: SightingKind::Found,
            body: DeadBody {
                repository_id: RepoId::new(id),
                ..DeadBody::default()
            },
            witness: None,
        }
    }

    #[test]
    fn batch_forgets_kills_on_new_timestamp() {
        let mut state = RunState::default();
        state.begin_event(10.0);
        state.remember_kill(RepoId::new("guard"));
        state.begin_event(10.00001);
        assert!(state.killed_this_batch(&RepoId::new("GUARD")));
        state.begin_event(11.0);
        assert!(!state.killed_this_batch(&RepoId::new("guard")));
    }

    #[test]
    fn parked_sightings_are_taken_by_timestamp_and_bounded() {
        let mut state = RunState::new(2);
        state.begin_event(5.0);
        state.park_sighting(5.0, sighting(""));
        state.park_sighting(5.0, sighting("0"));
        state.park_sighting(5.0, sighting("000"));
        assert_eq!(state.pending_sightings(), 2);

        assert!(state.take_sightings_at(6.0).is_empty());
        let taken = state.take_sightings_at(5.0);
        assert_eq!(taken.len(), 2);
        assert_eq!(taken[0].body.repository_id.as_str(), "0");
        assert_eq!(state.pending_sightings(), 0);
    }

    #[test]
    fn new_batch_drops_stale_sightings() {
        let mut state = RunState::default();
        state.begin_event(1.0);
        state.park_sighting(1.0, sighting(""));
        state.begin_event(2.0);
        assert_eq!(state.pending_sightings(), 0);
    }

    #[test]
    fn actor_tension_only_adds_delta_above_mark() {
        let mut state = RunState::default();
        let actor = RepoId::new("npc");
        assert_eq!(state.raise_actor_tension(&actor, 2), 2);
        assert_eq!(state.raise_actor_tension(&actor, 1), 0);
        assert_eq!(state.raise_actor_tension(&actor, 2), 0);
        assert_eq!(state.raise_actor_tension(&actor, 3), 1);
    }

    #[test]
    fn reset_keeps_capacity_and_clears_everything_else() {
        let mut state = RunState::new(3);
        state.ended = true;
        state.intro_cut_end = Some(4.0);
        state.stats.kills.total = 9;
        state.reset();
        assert!(!state.ended);
        assert_eq!(state.intro_cut_end, None);
        assert_eq!(state.stats.kills.total, 0);
        assert_eq!(state.pending_capacity, 3);
    }

    #[test]
    fn instants_compare_with_tolerance() {
        assert!(same_instant(1.0, 1.0 + 1e-6));
        assert!(!same_instant(1.0, 1.01));
    }
}
