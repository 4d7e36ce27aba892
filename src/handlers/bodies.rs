// `AccidentBodyFound`, `BodyFound` and `MurderedBodySeen` all funnel into
// `discover`. The game sometimes reports a sighting before it knows which
// body was seen; those are parked until an event at the same instant carries
// the real ID.

use std::collections::btree_map::Entry;

use tracing::debug;

use super::{bump, live, Tracker};
use crate::{
    dispatch::Dispatcher,
    enums::DeathContext,
    events::{DeadBody, EventKind, EventValue, ServerEvent},
    run_state::{BodySighting, BodyWitness, SightingKind},
    stats::Stats,
};

pub(super) fn register(dispatcher: &mut Dispatcher<Tracker>) {
    dispatcher.register(EventKind::AccidentBodyFound, live(on_accident_body_found));
    dispatcher.register(EventKind::BodyFound, live(on_body_found));
    dispatcher.register(EventKind::MurderedBodySeen, live(on_murdered_body_seen));
    dispatcher.register(EventKind::DeadBodySeen, live(on_dead_body_seen));
    dispatcher.register(EventKind::TargetBodySpotted, live(on_target_body_spotted));
    dispatcher.register(EventKind::BodyHidden, live(on_body_hidden));
    dispatcher.register(EventKind::BodyBagged, live(on_body_bagged));
    dispatcher.register(EventKind::AllBodiesHidden, live(on_all_bodies_hidden));
}

fn on_accident_body_found(tracker: &mut Tracker, event: &ServerEvent) {
    let EventValue::BodyFound(found) = &event.value else {
        return;
    };
    let sighting = BodySighting {
        kind: SightingKind::Accident,
        body: found.dead_body.clone(),
        witness: None,
    };
    discover(tracker, event.timestamp, sighting);
}

fn on_body_found(tracker: &mut Tracker, event: &ServerEvent) {
    let EventValue::BodyFound(found) = &event.value else {
        return;
    };
    let kind = match found.dead_body.death_context {
        DeathContext::Accident => SightingKind::Accident,
        DeathContext::Murder => SightingKind::Murdered,
        _ => SightingKind::Found,
    };
    let sighting = BodySighting {
        kind,
        body: found.dead_body.clone(),
        witness: None,
    };
    discover(tracker, event.timestamp, sighting);
}

fn on_murdered_body_seen(tracker: &mut Tracker, event: &ServerEvent) {
    let EventValue::MurderedBodySeen(seen) = &event.value else {
        return;
    };
    let witness = (!seen.witness.is_unresolved()).then(|| BodyWitness {
        is_target: seen.is_witness_target || tracker.targets.is_target(&seen.witness),
        id: seen.witness.clone(),
    });
    let sighting = BodySighting {
        kind: SightingKind::Murdered,
        body: seen.dead_body.clone(),
        witness,
    };
    discover(tracker, event.timestamp, sighting);
}

fn discover(tracker: &mut Tracker, timestamp: f64, sighting: BodySighting) {
    if sighting.body.repository_id.is_unresolved() {
        debug!(timestamp, kind = ?sighting.kind, "parking body sighting without body id");
        tracker.state.park_sighting(timestamp, sighting);
        return;
    }

    let body_id = sighting.body.repository_id.clone();
    let parked = tracker.state.take_sightings_at(timestamp);
    if !parked.is_empty() {
        debug!(body = %body_id, count = parked.len(), "resolved parked body sightings");
    }
    for mut earlier in parked {
        earlier.body.repository_id = body_id.clone();
        apply_sighting(&mut tracker.state.stats, earlier);
    }
    apply_sighting(&mut tracker.state.stats, sighting);
}

fn is_murder(kind: SightingKind, body: &DeadBody) -> bool {
    kind == SightingKind::Murdered || body.death_context == DeathContext::Murder
}

fn apply_sighting(stats: &mut Stats, sighting: BodySighting) {
    let Stats {
        bodies,
        target_body_witnesses,
        ..
    } = stats;
    let BodySighting {
        kind,
        body,
        witness,
    } = sighting;
    let id = body.repository_id.clone();

    if body.is_crowd_actor {
        if bodies.crowd_bodies_found.insert(id) {
            bump(&mut bodies.found_crowd);
            if is_murder(kind, &body) {
                bump(&mut bodies.found_crowd_murders);
            }
        }
        return;
    }

    if bodies.unique_bodies_found.insert(id.clone()) {
        bump(&mut bodies.found);
        if kind == SightingKind::Accident {
            bump(&mut bodies.found_accidents);
        }
    }

    if kind != SightingKind::Murdered {
        return;
    }

    let info = match bodies.murdered_bodies.entry(id) {
        Entry::Occupied(entry) => entry.into_mut(),
        Entry::Vacant(entry) => {
            bump(&mut bodies.found_murdered);
            entry.insert(Default::default())
        }
    };
    let Some(witness) = witness else {
        return;
    };
    info.sightings.insert(witness.id.clone(), witness.is_target);
    if witness.is_target {
        target_body_witnesses.insert(witness.id);
    } else if !info.sighted_by_non_target {
        info.sighted_by_non_target = true;
        bump(&mut bodies.found_murdered_by_non_target);
    }
}

fn on_dead_body_seen(tracker: &mut Tracker, _event: &ServerEvent) {
    bump(&mut tracker.state.stats.bodies.dead_seen);
}

fn on_target_body_spotted(tracker: &mut Tracker, _event: &ServerEvent) {
    bump(&mut tracker.state.stats.bodies.targets_found);
}

fn on_body_hidden(tracker: &mut Tracker, event: &ServerEvent) {
    let EventValue::Actor(actor) = &event.value else {
        return;
    };
    let bodies = &mut tracker.state.stats.bodies;
    if actor.repository_id.is_unresolved() {
        bump(&mut bodies.hidden);
        return;
    }
    if bodies.hidden_bodies.insert(actor.repository_id.clone()) {
        bump(&mut bodies.hidden);
    }
}

fn on_body_bagged(tracker: &mut Tracker, _event: &ServerEvent) {
    bump(&mut tracker.state.stats.bodies.bagged);
}

fn on_all_bodies_hidden(tracker: &mut Tracker, _event: &ServerEvent) {
    tracker.state.stats.bodies.all_hidden = true;
}
