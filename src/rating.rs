use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Serialize, Serializer};

use crate::stats::Stats;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SilentAssassinStatus {
    Ok,
    Fail,
    RedeemableTarget,
    RedeemableCamera,
    RedeemableCameraAndTarget,
}

impl SilentAssassinStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::Fail => "Fail",
            Self::RedeemableTarget => "Redeemable (target)",
            Self::RedeemableCamera => "Redeemable (camera)",
            Self::RedeemableCameraAndTarget => "Redeemable (camera + target)",
        }
    }
}

impl Serialize for SilentAssassinStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

pub fn silent_assassin(stats: &Stats) -> SilentAssassinStatus {
    if !stats.kills.non_targets.is_empty() || stats.kills.crowd > 0 {
        return SilentAssassinStatus::Fail;
    }

    let unredeemable_witness = stats
        .witnesses
        .iter()
        .any(|id| !stats.target_witnesses.contains(id) && !stats.is_killed(id));
    let unredeemable_spotter = stats
        .spotted_by
        .iter()
        .any(|id| !stats.targets_spotted_by.contains(id) && !stats.is_killed(id));
    if unredeemable_witness || unredeemable_spotter {
        return SilentAssassinStatus::Fail;
    }

    if stats.bodies.found_murdered_by_non_target > 0 {
        return SilentAssassinStatus::Fail;
    }

    let redeemable_by_target = stats.target_body_witnesses.len()
        > stats.bodies.target_body_witnesses_killed as usize
        || stats.targets_spotted_by.len() > stats.detection.targets_spotted_by_and_killed as usize;

    match (stats.detection.on_camera, redeemable_by_target) {
        (true, true) => SilentAssassinStatus::RedeemableCameraAndTarget,
        (true, false) => SilentAssassinStatus::RedeemableCamera,
        (false, true) => SilentAssassinStatus::RedeemableTarget,
        (false, false) => SilentAssassinStatus::Ok,
    }
}

pub fn stealth_rating(stats: &Stats) -> f64 {
    let count = |n: usize| n as f64;
    let civilians = f64::from(stats.kills.civilian);
    let guards = f64::from(stats.kills.guard);
    let witnesses = count(stats.witnesses.len());
    let on_camera = if stats.detection.on_camera { 1.0 } else { 0.0 };
    let bodies_found = f64::from(stats.bodies.found);
    let spotted = count(stats.spotted_by.len());
    let excess_pacifies = (count(stats.pacifies.non_targets.len()) - 3.0).max(0.0);
    let hidden_bonus = (3.0 * f64::from(stats.bodies.hidden)).min(15.0);

    let rating = 100.0
        - 8.0 * civilians
        - 5.0 * guards
        - 10.0 * witnesses
        - 15.0 * on_camera
        - 5.0 * bodies_found
        - 5.0 * spotted
        - 2.0 * excess_pacifies
        + hidden_bonus;
    rating.clamp(0.0, 100.0)
}

type ScoreFn = fn(&Stats) -> i64;

pub struct PlaystyleRule {
    pub titles: &'static [&'static str],
    score: ScoreFn,
}

impl PlaystyleRule {
    pub fn score(&self, stats: &Stats) -> i64 {
        (self.score)(stats)
    }
}

fn n(value: u32) -> i64 {
    i64::from(value)
}

fn len(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn flag(value: bool) -> i64 {
    i64::from(value)
}

fn bad_actor(stats: &Stats) -> i64 {
    len(stats.disguises_blown.len()) * 500
}

fn chameleon(stats: &Stats) -> i64 {
    n(stats.misc.disguises_taken) * 250
}

fn method_actor(stats: &Stats) -> i64 {
    n(stats.misc.disguises_taken) * 500 - len(stats.disguises_blown.len()) * 500
}

fn hacker(stats: &Stats) -> i64 {
    flag(stats.misc.recorder_erased) * 500
}

fn murderer(stats: &Stats) -> i64 {
    if stats.kills.total >= 47 {
        return 0;
    }
    len(stats.kills.non_targets.len()) * 50
}

fn serial_killer(stats: &Stats) -> i64 {
    if stats.kills.total < 3 || stats.kills.noticed > 0 {
        return 0;
    }
    if stats.detection.witnesses > stats.detection.witnesses_killed {
        return 0;
    }
    n(stats.kills.total) * 60
}

fn mass_murderer(stats: &Stats) -> i64 {
    if stats.kills.total < 47 {
        return 0;
    }
    len(stats.kills.non_targets.len()) * 50
}

fn poisoner(stats: &Stats) -> i64 {
    n(stats.misc.targets_made_sick) * 1000
}

fn vandal(stats: &Stats) -> i64 {
    n(stats.misc.cameras_destroyed) * 100 + flag(stats.misc.recorder_destroyed) * 150
}

fn climber(stats: &Stats) -> i64 {
    n(stats.misc.agility_actions) * 50
}

fn civilian(stats: &Stats) -> i64 {
    let activity = len(stats.spotted_by.len())
        + n(stats.misc.times_trespassed)
        + n(stats.misc.agility_actions)
        + n(stats.misc.cameras_destroyed)
        + n(stats.misc.disguises_taken)
        + n(stats.misc.items_thrown)
        + flag(stats.misc.recorder_destroyed)
        + flag(stats.misc.recorder_erased)
        + n(stats.misc.shots_fired)
        + n(stats.misc.targets_made_sick)
        + n(stats.kills.total)
        + n(stats.pacifies.total)
        + n(stats.tension.alerted_high)
        + n(stats.tension.arrest)
        + n(stats.tension.combat)
        + n(stats.tension.hunting)
        + n(stats.tension.searching);
    if activity == 0 {
        10
    } else {
        0
    }
}

fn enigma(_stats: &Stats) -> i64 {
    1
}

// Ordered rule catalog. Order matters: ties go to the earlier rule.
pub struct PlaystyleCatalog {
    rules: Vec<PlaystyleRule>,
}

impl Default for PlaystyleCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

impl PlaystyleCatalog {
    pub fn standard() -> Self {
        fn rule(titles: &'static [&'static str], score: ScoreFn) -> PlaystyleRule {
            PlaystyleRule { titles, score }
        }
        Self {
            rules: vec![
                rule(&["Bad Actor"], bad_actor),
                rule(&["Chameleon"], chameleon),
                rule(&["Method Actor"], method_actor),
                rule(&["Hacker"], hacker),
                rule(&["Murderer"], murderer),
                rule(&["Serial Killer"], serial_killer),
                rule(&["Mass Murderer", "Psychopath", "Terrorist"], mass_murderer),
                rule(&["Bad Cook", "Envenomer", "Poisoner"], poisoner),
                rule(&["Vandal"], vandal),
                rule(&["Climber", "Hitmantler", "Spider-Hitman", "Traceur"], climber),
                rule(&["Civilian"], civilian),
                rule(&["Enigma"], enigma),
            ],
        }
    }

    pub fn rules(&self) -> &[PlaystyleRule] {
        &self.rules
    }

    pub fn best_match(&self, stats: &Stats) -> Option<usize> {
        let mut top: Option<(usize, i64)> = None;
        for (index, rule) in self.rules.iter().enumerate() {
            let score = rule.score(stats);
            let best = top.map_or(-1, |(_, best)| best);
            if score > best {
                top = Some((index, score));
            }
        }
        top.map(|(index, _)| index)
    }
}

pub struct PlaystyleSelector {
    catalog: PlaystyleCatalog,
    rng: StdRng,
    current: Option<(usize, usize)>,
}

impl PlaystyleSelector {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            catalog: PlaystyleCatalog::standard(),
            rng,
            current: None,
        }
    }

    pub fn select(&mut self, stats: &Stats) -> Option<&'static str> {
        let Some(rule_index) = self.catalog.best_match(stats) else {
            self.current = None;
            return None;
        };
        let titles = self.catalog.rules[rule_index].titles;
        if titles.is_empty() {
            return None;
        }
        let title_index = match self.current {
            Some((current_rule, title)) if current_rule == rule_index => title,
            _ => {
                let title = self.rng.gen_range(0..titles.len());
                self.current = Some((rule_index, title));
                title
            }
        };
        titles.get(title_index).copied()
    }
}
