use tracing::debug;

use super::{bump, live, Tracker};
use crate::{
    dispatch::Dispatcher,
    enums::RecorderEvent,
    events::{EventKind, EventValue, ServerEvent},
    keys::RepoId,
    run_state::same_instant,
};

pub(super) fn register(dispatcher: &mut Dispatcher<Tracker>) {
    dispatcher.register(EventKind::Spotted, live(on_spotted));
    dispatcher.register(EventKind::Witnesses, live(on_witnesses));
    dispatcher.register(EventKind::SecuritySystemRecorder, live(on_recorder));
    dispatcher.register(EventKind::Trespassing, live(on_trespassing));
    dispatcher.register(EventKind::FoundTrespassing, live(on_found_trespassing));
    dispatcher.register(EventKind::SituationContained, live(on_situation_contained));
}

fn fresh_ids<'a>(tracker: &'a Tracker, ids: &'a [RepoId]) -> impl Iterator<Item = &'a RepoId> + 'a {
    ids.iter().filter(move |id| {
        if id.is_unresolved() {
            return false;
        }
        if tracker.state.killed_this_batch(id) {
            debug!(actor = %id, "dropping report from actor killed in this batch");
            return false;
        }
        true
    })
}

fn on_spotted(tracker: &mut Tracker, event: &ServerEvent) {
    let EventValue::Ids(ids) = &event.value else {
        return;
    };
    let fresh: Vec<(RepoId, bool)> = fresh_ids(tracker, ids)
        .map(|id| (id.clone(), tracker.targets.is_target(id)))
        .collect();
    let stats = &mut tracker.state.stats;
    for (id, is_target) in fresh {
        if !stats.spotted_by.insert(id.clone()) {
            continue;
        }
        bump(&mut stats.detection.spotted);
        if is_target {
            stats.targets_spotted_by.insert(id);
        }
    }
    stats.refresh_non_targets_spotted_by();
}

fn on_witnesses(tracker: &mut Tracker, event: &ServerEvent) {
    let EventValue::Ids(ids) = &event.value else {
        return;
    };
    tracker.state.note_reported_witnesses(ids);
    let timestamp = event.timestamp;
    let reported: Vec<RepoId> = ids.iter().filter(|id| !id.is_unresolved()).cloned().collect();
    for record in tracker
        .state
        .noticed_kills
        .values_mut()
        .chain(tracker.state.noticed_pacifies.values_mut())
        .filter(|record| same_instant(record.timestamp, timestamp))
    {
        record.witnesses.extend(reported.iter().cloned());
    }

    let fresh: Vec<(RepoId, bool)> = fresh_ids(tracker, ids)
        .map(|id| (id.clone(), tracker.targets.is_target(id)))
        .collect();
    let stats = &mut tracker.state.stats;
    for (id, is_target) in fresh {
        if is_target {
            stats.target_witnesses.insert(id.clone());
        }
        if stats.witnesses.insert(id) {
            bump(&mut stats.detection.witnesses);
        }
    }
}

fn on_recorder(tracker: &mut Tracker, event: &ServerEvent) {
    let EventValue::Recorder(recorder) = &event.value else {
        return;
    };
    let stats = &mut tracker.state.stats;
    match recorder.event {
        RecorderEvent::Spotted => stats.detection.on_camera = true,
        RecorderEvent::Erased => {
            if stats.detection.on_camera {
                stats.misc.recorded_then_erased = true;
            }
            stats.detection.on_camera = false;
            stats.misc.recorder_erased = true;
        }
        RecorderEvent::Destroyed => {
            stats.detection.on_camera = false;
            stats.misc.recorder_destroyed = true;
        }
        RecorderEvent::CameraDestroyed => bump(&mut stats.misc.cameras_destroyed),
        RecorderEvent::Undefined => debug!("ignoring unrecognized recorder event"),
    }
}

fn on_trespassing(tracker: &mut Tracker, event: &ServerEvent) {
    let EventValue::Trespassing(value) = &event.value else {
        return;
    };
    let stats = &mut tracker.state.stats;
    if value.is_trespassing && !stats.current.trespassing {
        bump(&mut stats.misc.times_trespassed);
    }
    stats.current.trespassing = value.is_trespassing;
}

fn on_found_trespassing(tracker: &mut Tracker, _event: &ServerEvent) {
    bump(&mut tracker.state.stats.detection.caught_trespassing);
}

fn on_situation_contained(tracker: &mut Tracker, _event: &ServerEvent) {
    bump(&mut tracker.state.stats.detection.situations_contained);
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::{handlers::testing::Harness, keys::RepoId};

    #[test]
    fn spotters_are_split_by_target_registry() {
        let mut harness = Harness::with_targets(&["target-1"]);
        harness.send("Spotted", json!(["Target-1", "guard-1", "guard-1"]), 1.0);
        harness.send("Spotted", json!(["guard-2", "guard-1"]), 2.0);

        let stats = &harness.tracker.state.stats;
        assert_eq!(stats.spotted_by.len(), 3);
        assert_eq!(stats.detection.spotted, 3);
        assert_eq!(stats.targets_spotted_by.len(), 1);
        assert_eq!(stats.detection.non_targets_spotted_by, 2);
    }

    #[test]
    fn reports_from_actors_killed_in_same_batch_are_dropped() {
        let mut harness = Harness::new();
        harness.send("Kill", json!({ "RepositoryId": "guard-1", "ActorType": 1 }), 3.0);
        harness.send("Spotted", json!(["guard-1"]), 3.0);
        harness.send("Witnesses", json!(["guard-1", "guard-2"]), 3.0);

        let stats = &harness.tracker.state.stats;
        assert!(stats.spotted_by.is_empty());
        assert_eq!(stats.witnesses.len(), 1);
        assert!(stats.witnesses.contains(&RepoId::new("guard-2")));

        harness.send("Spotted", json!(["guard-1"]), 4.0);
        assert_eq!(harness.tracker.state.stats.spotted_by.len(), 1);
    }

    #[test]
    fn target_witnesses_are_tracked_separately() {
        let mut harness = Harness::with_targets(&["t"]);
        harness.send("Witnesses", json!(["t", "npc"]), 1.0);
        let stats = &harness.tracker.state.stats;
        assert_eq!(stats.witnesses.len(), 2);
        assert_eq!(stats.target_witnesses.len(), 1);
        assert_eq!(stats.detection.witnesses, 2);
    }

    #[test]
    fn recorder_tracks_camera_state() {
        let mut harness = Harness::new();
        harness.send("SecuritySystemRecorder", json!({ "event": "spotted" }), 1.0);
        assert!(harness.tracker.state.stats.detection.on_camera);
        harness.send("SecuritySystemRecorder", json!({ "event": "erased" }), 2.0);
        harness.send("SecuritySystemRecorder", json!({ "event": "CameraDestroyed", "camera": 4 }), 3.0);

        let stats = &harness.tracker.state.stats;
        assert!(!stats.detection.on_camera);
        assert!(stats.misc.recorder_erased);
        assert!(stats.misc.recorded_then_erased);
        assert_eq!(stats.misc.cameras_destroyed, 1);
    }

    #[test]
    fn trespassing_counts_entries_not_updates() {
        let mut harness = Harness::new();
        harness.send("Trespassing", json!({ "IsTrespassing": true, "RoomId": 3 }), 1.0);
        harness.send("Trespassing", json!({ "IsTrespassing": true, "RoomId": 4 }), 2.0);
        harness.send("Trespassing", json!({ "IsTrespassing": false }), 3.0);
        harness.send("Trespassing", json!({ "IsTrespassing": true }), 4.0);
        harness.send("47_FoundTrespassing", json!(null), 4.0);
        harness.send("SituationContained", json!(null), 5.0);

        let stats = &harness.tracker.state.stats;
        assert_eq!(stats.misc.times_trespassed, 2);
        assert!(stats.current.trespassing);
        assert_eq!(stats.detection.caught_trespassing, 1);
        assert_eq!(stats.detection.situations_contained, 1);
    }
}
