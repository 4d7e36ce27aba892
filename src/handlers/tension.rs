use std::collections::HashMap;

use serde::Deserialize;
use tracing::trace;

use super::{live, Tracker};
use crate::{
    dispatch::Dispatcher,
    events::{EventKind, EventValue, ServerEvent},
    keys::RepoId,
};

pub(super) fn register(dispatcher: &mut Dispatcher<Tracker>) {
    dispatcher.register(EventKind::AmbientChanged, live(on_ambient_changed));
}

fn on_ambient_changed(tracker: &mut Tracker, event: &ServerEvent) {
    let EventValue::AmbientChanged(ambient) = &event.value else {
        return;
    };
    let tension = &mut tracker.state.stats.tension;
    tension.escalate(ambient.ambient_value.weight() - ambient.previous_ambient_value.weight());
    tension.record_occurrence(ambient.ambient_value);
    tracker.state.stats.current.tension = ambient.ambient_value;
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BehaviorObservation {
    pub repository_id: RepoId,
    pub behavior: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BehaviorTension {
    Ignored,
    Level(u8),
}

#[derive(Debug, Clone)]
pub struct BehaviorTable {
    levels: HashMap<&'static str, u8>,
    ignored: &'static [&'static str],
}

impl Default for BehaviorTable {
    fn default() -> Self {
        Self::new()
    }
}

impl BehaviorTable {
    pub fn new() -> Self {
        const LEVELS: &[(&str, u8)] = &[
            ("BT_StandOffArrest", 3),
            ("BT_StandOffReposition", 3),
            ("BT_CoverFightSeasonTwo", 3),
            ("BT_HomeAttackOrigin", 3),
            ("BT_CloseCombat", 2),
            ("BT_AgitatedGuard", 2),
            ("BT_AgitatedPatrol", 2),
            ("BT_DefendVIP", 2),
            ("BT_SituationAct", 2),
            ("BT_SituationApproach", 2),
            ("BT_SituationFace", 2),
            ("BT_CautiousSearchPosition", 2),
            ("BT_ProtoSearchIdle", 2),
            ("BT_Flee", 1),
            ("BT_Scared", 1),
            ("BT_SituationGetHelp", 1),
            ("BT_AgitatedBystander", 1),
        ];
        Self {
            levels: LEVELS.iter().copied().collect(),
            ignored: &["BT_Act", "BT_Error", "BT_Dummy"],
        }
    }

    pub fn tension_of(&self, behavior: &str) -> BehaviorTension {
        if self.ignored.iter().any(|ignored| *ignored == behavior) {
            return BehaviorTension::Ignored;
        }
        BehaviorTension::Level(self.levels.get(behavior).copied().unwrap_or(0))
    }
}

pub(super) fn observe_behaviors(
    tracker: &mut Tracker,
    observations: &[BehaviorObservation],
) -> bool {
    if tracker.state.ended {
        return false;
    }
    let mut raised = 0i32;
    for observation in observations {
        if observation.repository_id.is_unresolved() {
            continue;
        }
        let BehaviorTension::Level(level) = tracker.behaviors.tension_of(&observation.behavior)
        else {
            continue;
        };
        let delta = tracker
            .state
            .raise_actor_tension(&observation.repository_id, level);
        if delta > 0 {
            trace!(
                actor = %observation.repository_id,
                behavior = %observation.behavior,
                delta,
                "actor tension raised"
            );
            raised += i32::from(delta);
        }
    }
    tracker.state.stats.tension.escalate(raised);
    raised > 0
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{BehaviorObservation, BehaviorTable, BehaviorTension};
    use crate::{enums::GameTension, handlers::testing::Harness, keys::RepoId};

    fn frame(entries: &[(&str, &str)]) -> Vec<BehaviorObservation> {
        entries
            .iter()
            .map(|(id, behavior)| BehaviorObservation {
                repository_id: RepoId::new(id),
                behavior: (*behavior).to_owned(),
            })
            .collect()
    }

    #[test]
    fn oscillating_actor_only_counts_highest_level() {
        let mut harness = Harness::new();
        let tracker = &mut harness.tracker;
        assert!(tracker.observe_behaviors(&frame(&[("npc", "BT_Flee")])));
        assert!(tracker.observe_behaviors(&frame(&[("npc", "BT_StandOffArrest")])));
        assert!(!tracker.observe_behaviors(&frame(&[("npc", "BT_Flee")])));
        assert!(!tracker.observe_behaviors(&frame(&[("npc", "BT_StandOffArrest")])));
        assert_eq!(tracker.state.stats.tension.level, 3);
    }

    #[test]
    fn ignorable_and_unknown_behaviors_add_nothing() {
        let table = BehaviorTable::new();
        assert_eq!(table.tension_of("BT_Dummy"), BehaviorTension::Ignored);
        assert_eq!(table.tension_of("BT_Idle"), BehaviorTension::Level(0));
        assert_eq!(table.tension_of("BT_CloseCombat"), BehaviorTension::Level(2));

        let mut harness = Harness::new();
        assert!(!harness
            .tracker
            .observe_behaviors(&frame(&[("a", "BT_Act"), ("b", "BT_Idle")])));
        assert_eq!(harness.tracker.state.stats.tension.level, 0);
    }

    #[test]
    fn each_actor_has_its_own_mark() {
        let mut harness = Harness::new();
        harness
            .tracker
            .observe_behaviors(&frame(&[("a", "BT_Scared"), ("b", "BT_AgitatedGuard")]));
        assert_eq!(harness.tracker.state.stats.tension.level, 3);
    }

    #[test]
    fn ambient_changes_escalate_by_weight_delta() {
        let mut harness = Harness::new();
        harness.send("AmbientChanged", json!({ "PreviousAmbientValue": 1, "AmbientValue": 3 }), 1.0);
        harness.send("AmbientChanged", json!({ "PreviousAmbientValue": 3, "AmbientValue": 8 }), 2.0);
        harness.send("AmbientChanged", json!({ "PreviousAmbientValue": 8, "AmbientValue": 1 }), 3.0);

        let stats = &harness.tracker.state.stats;
        assert_eq!(stats.tension.level, 10);
        assert_eq!(stats.tension.searching, 1);
        assert_eq!(stats.tension.combat, 1);
        assert_eq!(stats.current.tension, GameTension::Ambient);
    }

    #[test]
    fn behavior_channel_is_frozen_after_contract_end() {
        let mut harness = Harness::new();
        harness.send("ContractEnd", json!(null), 1.0);
        assert!(!harness
            .tracker
            .observe_behaviors(&frame(&[("npc", "BT_CloseCombat")])));
        assert_eq!(harness.tracker.state.stats.tension.level, 0);
    }
}
