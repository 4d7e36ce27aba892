use tracing::debug;

use super::{bump, live, Tracker};
use crate::{
    dispatch::Dispatcher,
    enums::{ActorType, DeathContext, KillType},
    events::{CleannessValue, EventKind, EventValue, ServerEvent, TakedownValue},
    run_state::NoticedTakedown,
    stats::{KillMethodStats, PacifyMethodStats},
};

pub(super) fn register(dispatcher: &mut Dispatcher<Tracker>) {
    dispatcher.register(EventKind::Kill, live(on_kill));
    dispatcher.register(EventKind::Pacify, live(on_pacify));
    dispatcher.register(EventKind::NoticedKill, live(on_noticed_kill));
    dispatcher.register(EventKind::NoticedPacified, live(on_noticed_pacify));
    dispatcher.register(EventKind::UnnoticedKill, live(on_unnoticed_kill));
    dispatcher.register(EventKind::UnnoticedPacified, live(on_unnoticed_pacify));
    dispatcher.register(EventKind::CrowdNpcDied, live(on_crowd_npc_died));
}

fn on_kill(tracker: &mut Tracker, event: &ServerEvent) {
    let EventValue::Takedown(kill) = &event.value else {
        return;
    };
    let id = kill.repository_id.clone();
    let stats = &mut tracker.state.stats;
    bump(&mut stats.kills.total);
    record_kill_methods(&mut stats.kill_methods, kill);

    if id.is_unresolved() {
        debug!("kill without actor id; counted but not classified");
        return;
    }

    if kill.is_target {
        if stats.kills.targets.insert(id.clone()) {
            if stats.targets_spotted_by.contains(&id) {
                bump(&mut stats.detection.targets_spotted_by_and_killed);
            }
            if stats.target_body_witnesses.contains(&id) {
                bump(&mut stats.bodies.target_body_witnesses_killed);
            }
        }
    } else if kill.kill_context == DeathContext::NotHero {
        stats.kills.proxy_deaths.insert(id.clone());
    } else if stats.kills.non_targets.insert(id.clone()) {
        match kill.actor_type {
            ActorType::Civilian => bump(&mut stats.kills.civilian),
            ActorType::Guard => bump(&mut stats.kills.guard),
            ActorType::Hitman | ActorType::Last => {}
        }
        if stats.spotted_by.contains(&id) {
            bump(&mut stats.detection.unique_npcs_caught_by_and_killed);
        }
    }

    if stats.witnesses.remove(&id) {
        bump(&mut stats.detection.witnesses_killed);
    }
    tracker.state.remember_kill(id);
}

fn on_pacify(tracker: &mut Tracker, event: &ServerEvent) {
    let EventValue::Takedown(pacify) = &event.value else {
        return;
    };
    let id = pacify.repository_id.clone();
    let stats = &mut tracker.state.stats;
    bump(&mut stats.pacifies.total);
    record_pacify_methods(&mut stats.pacify_methods, pacify);

    if id.is_unresolved() {
        debug!("pacification without actor id; counted but not classified");
        return;
    }

    if pacify.is_target {
        stats.pacifies.targets.insert(id);
    } else if pacify.kill_context == DeathContext::NotHero {
        stats.pacifies.proxy_deaths.insert(id);
    } else if stats.pacifies.non_targets.insert(id) {
        match pacify.actor_type {
            ActorType::Civilian => bump(&mut stats.pacifies.civilian),
            ActorType::Guard => bump(&mut stats.pacifies.guard),
            ActorType::Hitman | ActorType::Last => {}
        }
    }
}

fn bump_pair(counter: &mut u32, target_counter: &mut u32, is_target: bool) {
    bump(counter);
    if is_target {
        bump(target_counter);
    }
}

fn record_kill_methods(methods: &mut KillMethodStats, kill: &TakedownValue) {
    let target = kill.is_target;
    let broad = kill.kill_method_broad.as_str();
    if kill.accident {
        bump_pair(&mut methods.accident, &mut methods.accident_target, target);
    }
    if kill.is_headshot {
        bump_pair(&mut methods.headshot, &mut methods.headshot_target, target);
    }
    if kill.weapon_silenced {
        bump_pair(&mut methods.silenced_weapon, &mut methods.silenced_weapon_target, target);
    }
    if broad == "melee" || kill.kill_class.eq_ignore_ascii_case("melee") {
        bump_pair(&mut methods.melee, &mut methods.melee_target, target);
    }
    if broad == "throw" || kill.kill_type == KillType::Throw {
        bump_pair(&mut methods.thrown, &mut methods.thrown_target, target);
    }
    match broad {
        "unarmed" => bump_pair(&mut methods.unarmed, &mut methods.unarmed_target, target),
        "pistol" => bump_pair(&mut methods.pistol, &mut methods.pistol_target, target),
        "smg" => bump_pair(&mut methods.smg, &mut methods.smg_target, target),
        "shotgun" => bump_pair(&mut methods.shotgun, &mut methods.shotgun_target, target),
        "close_combat_pistol_elimination" => {
            bump_pair(&mut methods.pistol_elim, &mut methods.pistol_elim_target, target)
        }
        _ => {}
    }
    match kill.kill_method_strict.as_str() {
        "accident_drown" => bump_pair(&mut methods.drown, &mut methods.drown_target, target),
        "accident_push" => bump_pair(&mut methods.push, &mut methods.push_target, target),
        "accident_burn" => bump_pair(&mut methods.burn, &mut methods.burn_target, target),
        "accident_explosion" => bump_pair(
            &mut methods.accident_explosion,
            &mut methods.accident_explosion_target,
            target,
        ),
        "accident_suspended_object" => bump_pair(
            &mut methods.falling_object,
            &mut methods.falling_object_target,
            target,
        ),
        _ => {}
    }
}

fn record_pacify_methods(methods: &mut PacifyMethodStats, pacify: &TakedownValue) {
    if pacify.accident {
        bump(&mut methods.accident);
    }
    if pacify.is_headshot {
        bump(&mut methods.headshot);
    }
    if pacify.kill_method_broad == "melee" || pacify.kill_class.eq_ignore_ascii_case("melee") {
        bump(&mut methods.melee);
    }
    if pacify.kill_method_broad == "throw" || pacify.kill_type == KillType::Throw {
        bump(&mut methods.thrown);
    }
}

fn on_noticed_kill(tracker: &mut Tracker, event: &ServerEvent) {
    let EventValue::Cleanness(value) = &event.value else {
        return;
    };
    if record_noticed(tracker, value, event.timestamp, false) {
        bump(&mut tracker.state.stats.kills.noticed);
    }
}

fn on_noticed_pacify(tracker: &mut Tracker, event: &ServerEvent) {
    let EventValue::Cleanness(value) = &event.value else {
        return;
    };
    if record_noticed(tracker, value, event.timestamp, true) {
        bump(&mut tracker.state.stats.pacifies.noticed);
    }
}

fn record_noticed(
    tracker: &mut Tracker,
    value: &CleannessValue,
    timestamp: f64,
    pacified: bool,
) -> bool {
    if value.repository_id.is_unresolved() {
        debug!(pacified, "noticed takedown without victim id");
        return false;
    }
    let witnesses = tracker.state.reported_witnesses().clone();
    let records = if pacified {
        &mut tracker.state.noticed_pacifies
    } else {
        &mut tracker.state.noticed_kills
    };
    if let Some(existing) = records.get_mut(&value.repository_id) {
        existing.witnesses.extend(witnesses);
        return false;
    }
    records.insert(
        value.repository_id.clone(),
        NoticedTakedown {
            is_target: value.is_target,
            timestamp,
            witnesses,
        },
    );
    true
}

fn on_unnoticed_kill(tracker: &mut Tracker, event: &ServerEvent) {
    let EventValue::Cleanness(value) = &event.value else {
        return;
    };
    let kills = &mut tracker.state.stats.kills;
    bump(&mut kills.unnoticed);
    if value.is_target {
        bump(&mut kills.unnoticed_target);
    } else {
        bump(&mut kills.unnoticed_non_target);
    }
}

fn on_unnoticed_pacify(tracker: &mut Tracker, event: &ServerEvent) {
    let EventValue::Cleanness(value) = &event.value else {
        return;
    };
    let pacifies = &mut tracker.state.stats.pacifies;
    bump(&mut pacifies.unnoticed);
    if value.is_target {
        bump(&mut pacifies.unnoticed_target);
    } else {
        bump(&mut pacifies.unnoticed_non_target);
    }
}

fn on_crowd_npc_died(tracker: &mut Tracker, _event: &ServerEvent) {
    bump(&mut tracker.state.stats.kills.crowd);
}
