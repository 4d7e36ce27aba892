use tracing::debug;

use super::{bump, live, Tracker};
use crate::{
    dispatch::Dispatcher,
    events::{EventKind, EventValue, ServerEvent},
};

pub(super) fn register(dispatcher: &mut Dispatcher<Tracker>) {
    dispatcher.register(EventKind::Disguise, live(on_disguise));
    dispatcher.register(EventKind::StartingSuit, live(on_starting_suit));
    dispatcher.register(EventKind::DisguiseBlown, live(on_disguise_blown));
    dispatcher.register(EventKind::BrokenDisguiseCleared, live(on_broken_disguise_cleared));
    dispatcher.register(EventKind::HoldingIllegalWeapon, live(on_holding_illegal_weapon));
    dispatcher.register(EventKind::ShotsFired, live(on_shots_fired));
    dispatcher.register(EventKind::FirstMissedShot, live(on_first_missed_shot));
    dispatcher.register(EventKind::FirstNonHeadshot, live(on_first_non_headshot));
    dispatcher.register(EventKind::DoorUnlocked, live(on_door_unlocked));
    dispatcher.register(EventKind::AgilityStart, live(on_agility));
    dispatcher.register(EventKind::DrainPipeClimbed, live(on_agility));
    dispatcher.register(EventKind::AddSyndicateTarget, live(on_add_syndicate_target));
    dispatcher.register(EventKind::ActorSick, live(on_actor_sick));
    dispatcher.register(EventKind::DartHit, live(on_dart_hit));
}

fn on_disguise(tracker: &mut Tracker, event: &ServerEvent) {
    let EventValue::Id(outfit) = &event.value else {
        return;
    };
    let is_suit = tracker.repository.is_hitman_suit(outfit);
    let stats = &mut tracker.state.stats;
    if is_suit {
        if !stats.current.in_suit {
            stats.misc.suit_retrieved = true;
        }
        stats.current.in_suit = true;
    } else {
        stats.current.in_suit = false;
        bump(&mut stats.misc.disguises_taken);
    }
}

fn on_starting_suit(tracker: &mut Tracker, event: &ServerEvent) {
    let EventValue::Id(outfit) = &event.value else {
        return;
    };
    let Some(item) = tracker.repository.item(outfit) else {
        debug!(outfit = %outfit, "starting outfit missing from repository");
        return;
    };
    let stats = &mut tracker.state.stats;
    stats.misc.started_in_suit = item.is_hitman_suit;
    stats.current.in_suit = item.is_hitman_suit;
}

fn on_disguise_blown(tracker: &mut Tracker, event: &ServerEvent) {
    let EventValue::Id(outfit) = &event.value else {
        return;
    };
    let stats = &mut tracker.state.stats;
    stats.disguises_blown.insert(outfit.clone());
    stats.current.disguise_blown = true;
}

fn on_broken_disguise_cleared(tracker: &mut Tracker, _event: &ServerEvent) {
    tracker.state.stats.current.disguise_blown = false;
}

fn on_holding_illegal_weapon(tracker: &mut Tracker, event: &ServerEvent) {
    let EventValue::IllegalWeapon(value) = &event.value else {
        return;
    };
    tracker.state.stats.current.holding_illegal_weapon = value.is_holding_illegal_weapon;
}

fn on_shots_fired(tracker: &mut Tracker, event: &ServerEvent) {
    let EventValue::ShotsFired(value) = &event.value else {
        return;
    };
    let misc = &mut tracker.state.stats.misc;
    if value.total > 0 {
        let total = u32::try_from(value.total).unwrap_or(u32::MAX);
        misc.shots_fired = misc.shots_fired.max(total);
    } else {
        bump(&mut misc.shots_fired);
    }
}

fn on_first_missed_shot(tracker: &mut Tracker, _event: &ServerEvent) {
    bump(&mut tracker.state.stats.misc.missed_shots);
}

fn on_first_non_headshot(tracker: &mut Tracker, _event: &ServerEvent) {
    bump(&mut tracker.state.stats.misc.non_headshots);
}

fn on_door_unlocked(tracker: &mut Tracker, _event: &ServerEvent) {
    bump(&mut tracker.state.stats.misc.doors_unlocked);
}

fn on_agility(tracker: &mut Tracker, _event: &ServerEvent) {
    bump(&mut tracker.state.stats.misc.agility_actions);
}

fn on_add_syndicate_target(tracker: &mut Tracker, event: &ServerEvent) {
    let EventValue::SyndicateTarget(value) = &event.value else {
        return;
    };
    debug!(actor = %value.repo_id, "adding dynamic target");
    tracker.targets.add_dynamic_target(value.repo_id.clone());
}

fn on_actor_sick(tracker: &mut Tracker, event: &ServerEvent) {
    let EventValue::ActorSick(value) = &event.value else {
        return;
    };
    if value.is_target {
        bump(&mut tracker.state.stats.misc.targets_made_sick);
    }
}

fn on_dart_hit(tracker: &mut Tracker, event: &ServerEvent) {
    let EventValue::DartHit(value) = &event.value else {
        return;
    };
    if value.is_target && value.sick {
        bump(&mut tracker.state.stats.misc.targets_made_sick);
    }
}
