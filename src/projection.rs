use chrono::{DateTime, Utc};
use crossbeam_channel::{Receiver, Sender};
use serde::Serialize;
use tracing::debug;

use crate::{
    handlers::Tracker,
    keys::RepoSet,
    rating::{self, PlaystyleSelector, SilentAssassinStatus},
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayStats {
    pub guard_kills: u32,
    pub civilian_kills: u32,
    pub tension: i32,
    pub pacifications: u32,
    pub spotted: usize,
    pub witnesses: usize,
    pub bodies_hidden: u32,
    pub bodies_found: u32,
    pub disguises_taken: u32,
    pub disguises_blown: usize,
    pub recorded: bool,
    pub targets_found: u32,
    pub playstyle: Option<String>,
    pub stealth_rating: f64,
    pub silent_assassin: SilentAssassinStatus,
    pub spotted_by_names: Vec<String>,
    pub witness_names: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectionUpdate {
    pub stats: DisplayStats,
    pub at: DateTime<Utc>,
}

pub struct Projector {
    selector: PlaystyleSelector,
    resolve_names: bool,
    last: Option<DisplayStats>,
    subscribers: Vec<Sender<ProjectionUpdate>>,
}

impl Projector {
    pub fn new(playstyle_seed: Option<u64>, resolve_names: bool) -> Self {
        Self {
            selector: PlaystyleSelector::new(playstyle_seed),
            resolve_names,
            last: None,
            subscribers: Vec::new(),
        }
    }

    pub fn subscribe(&mut self) -> Receiver<ProjectionUpdate> {
        let (tx, rx) = crossbeam_channel::unbounded();
        self.subscribers.push(tx);
        rx
    }

    pub fn current(&self) -> Option<&DisplayStats> {
        self.last.as_ref()
    }

    pub fn compute(&mut self, tracker: &Tracker) -> DisplayStats {
        let stats = &tracker.state.stats;
        let names = |ids: &RepoSet| -> Vec<String> {
            if !self.resolve_names {
                return ids.iter().map(ToString::to_string).collect();
            }
            ids.iter().map(|id| tracker.display_name(id)).collect()
        };
        let spotted_by_names = names(&stats.spotted_by);
        let witness_names = names(&stats.witnesses);

        DisplayStats {
            guard_kills: stats.kills.guard,
            civilian_kills: stats.kills.civilian,
            tension: stats.tension.level,
            pacifications: stats.pacifies.total,
            spotted: stats.spotted_by.len(),
            witnesses: stats.witnesses.len(),
            bodies_hidden: stats.bodies.hidden,
            bodies_found: stats.bodies.found,
            disguises_taken: stats.misc.disguises_taken,
            disguises_blown: stats.disguises_blown.len(),
            recorded: stats.detection.on_camera,
            targets_found: stats.bodies.targets_found,
            playstyle: self.selector.select(stats).map(ToOwned::to_owned),
            stealth_rating: rating::stealth_rating(stats),
            silent_assassin: rating::silent_assassin(stats),
            spotted_by_names,
            witness_names,
        }
    }

    pub fn refresh(&mut self, tracker: &Tracker) -> Option<DisplayStats> {
        let next = self.compute(tracker);
        if self.last.as_ref() == Some(&next) {
            return None;
        }
        self.last = Some(next.clone());
        let update = ProjectionUpdate {
            stats: next.clone(),
            at: Utc::now(),
        };
        self.subscribers.retain(|tx| {
            let delivered = tx.send(update.clone()).is_ok();
            if !delivered {
                debug!("projection subscriber dropped");
            }
            delivered
        });
        Some(next)
    }
}

#[cfg(test)]
mod tests {
    use super::Projector;
    use crate::{
        catalog::NpcNames,
        handlers::{Collaborators, Tracker, TrackerSettings},
        keys::RepoId,
        rating::SilentAssassinStatus,
    };

    #[test]
    fn only_publishes_changed_snapshots() {
        let tracker = Tracker::default();
        let mut projector = Projector::new(Some(1), true);
        let rx = projector.subscribe();

        let first = projector.refresh(&tracker).expect("first snapshot is always new");
        assert_eq!(first.stealth_rating, 100.0);
        assert_eq!(first.silent_assassin, SilentAssassinStatus::Ok);
        assert_eq!(first.playstyle.as_deref(), Some("Civilian"));
        assert!(projector.refresh(&tracker).is_none());
        assert_eq!(rx.try_iter().count(), 1);
    }

    #[test]
    fn change_in_run_state_is_published() {
        let mut tracker = Tracker::default();
        let mut projector = Projector::new(Some(1), true);
        let rx = projector.subscribe();
        projector.refresh(&tracker);

        tracker.state.stats.spotted_by.insert(RepoId::new("guard-1"));
        let next = projector.refresh(&tracker).expect("spotter changes the snapshot");
        assert_eq!(next.spotted, 1);
        assert_eq!(next.silent_assassin, SilentAssassinStatus::Fail);
        assert_eq!(rx.try_iter().count(), 2);
    }

    #[test]
    fn names_resolve_with_fallback_to_id() {
        let mut names = NpcNames::default();
        names.insert(RepoId::new("guard-1"), "Gate Guard");
        let mut tracker = Tracker::new(
            Collaborators {
                npc_names: Box::new(names),
                ..Collaborators::default()
            },
            TrackerSettings::default(),
        );
        tracker.state.stats.witnesses.insert(RepoId::new("guard-1"));
        tracker.state.stats.witnesses.insert(RepoId::new("cook-7"));

        let mut projector = Projector::new(None, true);
        let snapshot = projector.compute(&tracker);
        assert_eq!(snapshot.witness_names, vec!["cook-7", "Gate Guard"]);

        let mut raw = Projector::new(None, false);
        assert_eq!(raw.compute(&tracker).witness_names, vec!["cook-7", "guard-1"]);
    }

    #[test]
    fn dropped_subscriber_is_pruned() {
        let tracker = Tracker::default();
        let mut projector = Projector::new(Some(3), false);
        drop(projector.subscribe());
        assert!(projector.refresh(&tracker).is_some());
        assert!(projector.current().is_some());
    }
}
