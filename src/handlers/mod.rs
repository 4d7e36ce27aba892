mod bodies;
mod detection;
mod items;
mod kills;
mod lifecycle;
mod misc;
mod tension;

use tracing::trace;

pub use tension::{BehaviorObservation, BehaviorTable, BehaviorTension};

use crate::{
    catalog::{
        NpcNameLookup, NpcNames, RepositoryCatalog, RepositoryLookup, TargetRegistry,
        TargetRoster,
    },
    dispatch::Dispatcher,
    events::ServerEvent,
    keys::RepoId,
    run_state::{RunState, DEFAULT_PENDING_SIGHTINGS},
};

pub const DEFAULT_ITEM_PICKUP_GRACE_SECS: f64 = 2.0;

pub struct Collaborators {
    pub repository: Box<dyn RepositoryLookup>,
    pub npc_names: Box<dyn NpcNameLookup>,
    pub targets: Box<dyn TargetRegistry>,
}

impl Default for Collaborators {
    fn default() -> Self {
        Self {
            repository: Box::new(RepositoryCatalog::default()),
            npc_names: Box::new(NpcNames::default()),
            targets: Box::new(TargetRoster::default()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackerSettings {
    pub item_pickup_grace_secs: f64,
    pub pending_sighting_capacity: usize,
}

impl Default for TrackerSettings {
    fn default() -> Self {
        Self {
            item_pickup_grace_secs: DEFAULT_ITEM_PICKUP_GRACE_SECS,
            pending_sighting_capacity: DEFAULT_PENDING_SIGHTINGS,
        }
    }
}

pub struct Tracker {
    pub state: RunState,
    pub repository: Box<dyn RepositoryLookup>,
    pub npc_names: Box<dyn NpcNameLookup>,
    pub targets: Box<dyn TargetRegistry>,
    pub settings: TrackerSettings,
    behaviors: BehaviorTable,
}

impl Default for Tracker {
    fn default() -> Self {
        Self::new(Collaborators::default(), TrackerSettings::default())
    }
}

impl Tracker {
    pub fn new(collaborators: Collaborators, settings: TrackerSettings) -> Self {
        Self {
            state: RunState::new(settings.pending_sighting_capacity),
            repository: collaborators.repository,
            npc_names: collaborators.npc_names,
            targets: collaborators.targets,
            settings,
            behaviors: BehaviorTable::new(),
        }
    }

    pub fn observe_behaviors(&mut self, observations: &[BehaviorObservation]) -> bool {
        tension::observe_behaviors(self, observations)
    }

    pub fn display_name(&self, id: &RepoId) -> String {
        self.npc_names
            .npc_name(id)
            .unwrap_or_else(|| id.to_string())
    }
}

fn live<F>(handler: F) -> impl Fn(&mut Tracker, &ServerEvent) + Send + Sync + 'static
where
    F: Fn(&mut Tracker, &ServerEvent) + Send + Sync + 'static,
{
    move |tracker, event| {
        if tracker.state.ended {
            trace!(name = event.kind.name(), "contract ended; ignoring event");
            return;
        }
        handler(tracker, event);
    }
}

pub fn register_all(dispatcher: &mut Dispatcher<Tracker>) {
    lifecycle::register(dispatcher);
    kills::register(dispatcher);
    bodies::register(dispatcher);
    detection::register(dispatcher);
    tension::register(dispatcher);
    items::register(dispatcher);
    misc::register(dispatcher);
}

fn bump(counter: &mut u32) {
    *counter = counter.saturating_add(1);
}

#[cfg(test)]
mod tests {
    use serde_json::Value;

    use super::register_all;
    use crate::{dispatch::Dispatcher, events::EventKind};

    #[test]
    fn every_catalog_kind_has_a_handler() {
        let mut dispatcher = Dispatcher::new();
        register_all(&mut dispatcher);
        for kind in EventKind::ALL {
            let decoded = dispatcher
                .decode(kind.name(), &Value::Null, 0.0)
                .expect("null payload should decode to defaults");
            assert!(decoded.is_some(), "{} has no handler", kind.name());
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use serde_json::Value;

    use super::{register_all, Collaborators, Tracker, TrackerSettings};
    use crate::{
        catalog::{RepositoryCatalog, TargetRoster},
        dispatch::Dispatcher,
        keys::RepoId,
    };

    pub struct Harness {
        pub tracker: Tracker,
        dispatcher: Dispatcher<Tracker>,
    }

    impl Harness {
        pub fn new() -> Self {
            Self::with_targets(&[])
        }

        pub fn with_targets(targets: &[&str]) -> Self {
            let mut roster = TargetRoster::default();
            roster.insert_location(
                RepoId::new("test-location"),
                targets.iter().map(|id| RepoId::new(id)),
            );
            Self::with_collaborators(Collaborators {
                targets: Box::new(roster),
                ..Collaborators::default()
            })
        }

        pub fn with_repository(json: &str) -> Self {
            let catalog = RepositoryCatalog::from_json(json).expect("test repository should parse");
            Self::with_collaborators(Collaborators {
                repository: Box::new(catalog),
                ..Collaborators::default()
            })
        }

        fn with_collaborators(collaborators: Collaborators) -> Self {
            let mut dispatcher = Dispatcher::new();
            register_all(&mut dispatcher);
            let mut harness = Self {
                tracker: Tracker::new(collaborators, TrackerSettings::default()),
                dispatcher,
            };
            harness.send(
                "ContractStart",
                serde_json::json!({ "LocationId": "test-location" }),
                0.0,
            );
            harness
        }

        pub fn send(&mut self, name: &str, payload: Value, timestamp: f64) -> bool {
            let event = self
                .dispatcher
                .decode(name, &payload, timestamp)
                .expect("test payload should decode");
            let Some(event) = event else {
                return false;
            };
            self.tracker.state.begin_event(timestamp);
            self.dispatcher.invoke(&mut self.tracker, &event);
            true
        }
    }
}
