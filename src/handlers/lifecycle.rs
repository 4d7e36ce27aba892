use tracing::info;

use super::{live, Tracker};
use crate::{
    dispatch::Dispatcher,
    events::{EventKind, EventValue, ServerEvent},
    stats::ContractInfo,
};

pub(super) fn register(dispatcher: &mut Dispatcher<Tracker>) {
    dispatcher.register(EventKind::ContractStart, on_contract_start);
    dispatcher.register(EventKind::ContractEnd, on_contract_end);
    dispatcher.register(EventKind::ExitGate, on_contract_end);
    dispatcher.register(EventKind::IntroCutEnd, live(on_intro_cut_end));
}

fn on_contract_start(tracker: &mut Tracker, event: &ServerEvent) {
    let EventValue::ContractStart(start) = &event.value else {
        return;
    };
    tracker.state.reset();
    tracker.state.contract = ContractInfo {
        location_id: start.location_id.clone(),
        mission_type: start.contract_type,
        difficulty_level: start.difficulty_level,
        is_vr: start.is_vr,
        starting_disguise: start.disguise.clone(),
        loadout: start
            .loadout
            .iter()
            .map(|item| item.repository_id.clone())
            .collect(),
    };
    let stats = &mut tracker.state.stats;
    stats.misc.started_in_suit = start.is_hitman_suit;
    stats.current.in_suit = start.is_hitman_suit;
    tracker.targets.select_location(&start.location_id);
    info!(
        location = %start.location_id,
        mission = ?start.contract_type,
        difficulty = start.difficulty_level,
        "contract started"
    );
}

fn on_contract_end(tracker: &mut Tracker, event: &ServerEvent) {
    if tracker.state.ended {
        return;
    }
    tracker.state.ended = true;
    info!(
        via = event.kind.name(),
        kills = tracker.state.stats.kills.total,
        "contract ended"
    );
}

fn on_intro_cut_end(tracker: &mut Tracker, event: &ServerEvent) {
    tracker.state.intro_cut_end = Some(event.timestamp);
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::{
        enums::MissionType,
        handlers::{testing::Harness, BehaviorObservation},
        keys::RepoId,
        stats::Stats,
    };

    #[test]
    fn contract_start_resets_run_state() {
        let mut harness = Harness::new();
        harness.send("Kill", json!({ "RepositoryId": "npc-1", "ActorType": 1 }), 1.0);
        harness.send("Spotted", json!(["npc-2"]), 2.0);
        harness.send("Witnesses", json!(["npc-3"]), 2.0);
        harness.send("NoticedKill", json!({ "RepositoryId": "npc-1" }), 2.0);
        harness.send("AmbientChanged", json!({ "PreviousAmbientValue": 1, "AmbientValue": 8 }), 2.0);
        harness.send("IntroCutEnd", json!(null), 2.0);
        harness.send(
            "MurderedBodySeen",
            json!({ "DeadBody": { "RepositoryId": "" }, "Witness": "npc-3" }),
            2.5,
        );
        let frame = [BehaviorObservation {
            repository_id: RepoId::new("npc-4"),
            behavior: "BT_CloseCombat".to_owned(),
        }];
        assert!(harness.tracker.observe_behaviors(&frame));
        harness.send("ContractEnd", json!(null), 2.5);
        assert!(harness.tracker.state.ended);
        assert_eq!(harness.tracker.state.pending_sightings(), 1);

        harness.send(
            "ContractStart",
            json!({
                "LocationId": "LOC_PARIS",
                "ContractType": "mission",
                "DifficultyLevel": 2,
                "IsHitmanSuit": true,
                "Disguise": "SUIT",
                "Loadout": [{ "RepositoryId": "Gun" }]
            }),
            2.5,
        );
        let state = &harness.tracker.state;
        let mut expected = Stats::default();
        expected.misc.started_in_suit = true;
        expected.current.in_suit = true;
        assert_eq!(state.stats, expected);
        assert!(!state.ended);
        assert_eq!(state.intro_cut_end, None);
        assert!(state.noticed_kills.is_empty());
        assert!(state.noticed_pacifies.is_empty());
        assert_eq!(state.pending_sightings(), 0);
        assert!(state.reported_witnesses().is_empty());
        assert_eq!(state.contract.location_id, RepoId::new("loc_paris"));
        assert_eq!(state.contract.mission_type, MissionType::Mission);
        assert_eq!(state.contract.difficulty_level, 2);
        assert_eq!(state.contract.loadout, vec![RepoId::new("gun")]);

        assert!(harness.tracker.observe_behaviors(&frame));
        assert_eq!(harness.tracker.state.stats.tension.level, 2);
    }

    #[test]
    fn ended_contract_freezes_non_lifecycle_events() {
        let mut harness = Harness::new();
        harness.send("exit_gate", json!(null), 5.0);
        harness.send("Kill", json!({ "RepositoryId": "npc-1" }), 6.0);
        harness.send("Agility_Start", json!(null), 6.0);
        harness.send("IntroCutEnd", json!(null), 6.0);
        let state = &harness.tracker.state;
        assert_eq!(state.stats.kills.total, 0);
        assert_eq!(state.stats.misc.agility_actions, 0);
        assert_eq!(state.intro_cut_end, None);
    }

    #[test]
    fn intro_cut_end_records_timestamp() {
        let mut harness = Harness::new();
        harness.send("IntroCutEnd", json!(null), 12.5);
        assert_eq!(harness.tracker.state.intro_cut_end, Some(12.5));
    }
}
