use serde::{
    de::{DeserializeOwned, IgnoredAny},
    Deserialize, Deserializer, Serialize,
};
use serde_json::Value;

use crate::{
    enums::{ActorType, DeathContext, DeathType, GameTension, KillType, MissionType, RecorderEvent},
    keys::RepoId,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum EventKind {
    ContractStart,
    ContractEnd,
    ExitGate,
    IntroCutEnd,
    Kill,
    Pacify,
    AccidentBodyFound,
    BodyFound,
    MurderedBodySeen,
    DeadBodySeen,
    Spotted,
    Witnesses,
    DisguiseBlown,
    BrokenDisguiseCleared,
    Disguise,
    StartingSuit,
    ItemPickedUp,
    ItemDropped,
    ItemThrown,
    ItemRemovedFromInventory,
    Trespassing,
    HoldingIllegalWeapon,
    SecuritySystemRecorder,
    AmbientChanged,
    NoticedKill,
    NoticedPacified,
    UnnoticedKill,
    UnnoticedPacified,
    TargetBodySpotted,
    BodyHidden,
    BodyBagged,
    AllBodiesHidden,
    ShotsFired,
    DoorUnlocked,
    CrowdNpcDied,
    FoundTrespassing,
    AddSyndicateTarget,
    AgilityStart,
    DrainPipeClimbed,
    SituationContained,
    FirstMissedShot,
    FirstNonHeadshot,
    ActorSick,
    DartHit,
}

impl EventKind {
    pub const ALL: &'static [EventKind] = &[
        Self::ContractStart,
        Self::ContractEnd,
        Self::ExitGate,
        Self::IntroCutEnd,
        Self::Kill,
        Self::Pacify,
        Self::AccidentBodyFound,
        Self::BodyFound,
        Self::MurderedBodySeen,
        Self::DeadBodySeen,
        Self::Spotted,
        Self::Witnesses,
        Self::DisguiseBlown,
        Self::BrokenDisguiseCleared,
        Self::Disguise,
        Self::StartingSuit,
        Self::ItemPickedUp,
        Self::ItemDropped,
        Self::ItemThrown,
        Self::ItemRemovedFromInventory,
        Self::Trespassing,
        Self::HoldingIllegalWeapon,
        Self::SecuritySystemRecorder,
        Self::AmbientChanged,
        Self::NoticedKill,
        Self::NoticedPacified,
        Self::UnnoticedKill,
        Self::UnnoticedPacified,
        Self::TargetBodySpotted,
        Self::BodyHidden,
        Self::BodyBagged,
        Self::AllBodiesHidden,
        Self::ShotsFired,
        Self::DoorUnlocked,
        Self::CrowdNpcDied,
        Self::FoundTrespassing,
        Self::AddSyndicateTarget,
        Self::AgilityStart,
        Self::DrainPipeClimbed,
        Self::SituationContained,
        Self::FirstMissedShot,
        Self::FirstNonHeadshot,
        Self::ActorSick,
        Self::DartHit,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::ContractStart => "ContractStart",
            Self::ContractEnd => "ContractEnd",
            Self::ExitGate => "exit_gate",
            Self::IntroCutEnd => "IntroCutEnd",
            Self::Kill => "Kill",
            Self::Pacify => "Pacify",
            Self::AccidentBodyFound => "AccidentBodyFound",
            Self::BodyFound => "BodyFound",
            Self::MurderedBodySeen => "MurderedBodySeen",
            Self::DeadBodySeen => "DeadBodySeen",
            Self::Spotted => "Spotted",
            Self::Witnesses => "Witnesses",
            Self::DisguiseBlown => "DisguiseBlown",
            Self::BrokenDisguiseCleared => "BrokenDisguiseCleared",
            Self::Disguise => "Disguise",
            Self::StartingSuit => "StartingSuit",
            Self::ItemPickedUp => "ItemPickedUp",
            Self::ItemDropped => "ItemDropped",
            Self::ItemThrown => "ItemThrown",
            Self::ItemRemovedFromInventory => "ItemRemovedFromInventory",
            Self::Trespassing => "Trespassing",
            Self::HoldingIllegalWeapon => "HoldingIllegalWeapon",
            Self::SecuritySystemRecorder => "SecuritySystemRecorder",
            Self::AmbientChanged => "AmbientChanged",
            Self::NoticedKill => "NoticedKill",
            Self::NoticedPacified => "Noticed_Pacified",
            Self::UnnoticedKill => "Unnoticed_Kill",
            Self::UnnoticedPacified => "Unnoticed_Pacified",
            Self::TargetBodySpotted => "TargetBodySpotted",
            Self::BodyHidden => "BodyHidden",
            Self::BodyBagged => "BodyBagged",
            Self::AllBodiesHidden => "AllBodiesHidden",
            Self::ShotsFired => "ShotsFired",
            Self::DoorUnlocked => "Door_Unlocked",
            Self::CrowdNpcDied => "CrowdNPC_Died",
            Self::FoundTrespassing => "47_FoundTrespassing",
            Self::AddSyndicateTarget => "AddSyndicateTarget",
            Self::AgilityStart => "Agility_Start",
            Self::DrainPipeClimbed => "Drain_Pipe_Climbed",
            Self::SituationContained => "SituationContained",
            Self::FirstMissedShot => "FirstMissedShot",
            Self::FirstNonHeadshot => "FirstNonHeadshot",
            Self::ActorSick => "Actorsick",
            Self::DartHit => "Dart_Hit",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|kind| kind.name() == name)
    }

    pub fn decode(self, payload: &Value) -> Result<EventValue, serde_json::Error> {
        let value = match self {
            Self::ContractStart => EventValue::ContractStart(decode_struct(payload)?),
            Self::Kill | Self::Pacify => EventValue::Takedown(decode_struct(payload)?),
            Self::AccidentBodyFound | Self::BodyFound => {
                EventValue::BodyFound(decode_struct(payload)?)
            }
            Self::MurderedBodySeen => EventValue::MurderedBodySeen(decode_struct(payload)?),
            Self::DeadBodySeen
            | Self::DisguiseBlown
            | Self::BrokenDisguiseCleared
            | Self::Disguise
            | Self::StartingSuit => EventValue::Id(serde_json::from_value(payload.clone())?),
            Self::Spotted | Self::Witnesses => EventValue::Ids(decode_id_list(payload)?),
            Self::ItemPickedUp
            | Self::ItemDropped
            | Self::ItemThrown
            | Self::ItemRemovedFromInventory => EventValue::Item(decode_struct(payload)?),
            Self::Trespassing => EventValue::Trespassing(decode_struct(payload)?),
            Self::HoldingIllegalWeapon => EventValue::IllegalWeapon(decode_struct(payload)?),
            Self::SecuritySystemRecorder => EventValue::Recorder(decode_struct(payload)?),
            Self::AmbientChanged => EventValue::AmbientChanged(decode_struct(payload)?),
            Self::NoticedKill
            | Self::NoticedPacified
            | Self::UnnoticedKill
            | Self::UnnoticedPacified => EventValue::Cleanness(decode_struct(payload)?),
            Self::BodyHidden | Self::BodyBagged => EventValue::Actor(decode_struct(payload)?),
            Self::ShotsFired => EventValue::ShotsFired(decode_struct(payload)?),
            Self::AddSyndicateTarget => EventValue::SyndicateTarget(decode_struct(payload)?),
            Self::ActorSick => EventValue::ActorSick(decode_struct(payload)?),
            Self::DartHit => EventValue::DartHit(decode_struct(payload)?),
            Self::ContractEnd
            | Self::ExitGate
            | Self::IntroCutEnd
            | Self::TargetBodySpotted
            | Self::AllBodiesHidden
            | Self::DoorUnlocked
            | Self::CrowdNpcDied
            | Self::FoundTrespassing
            | Self::AgilityStart
            | Self::DrainPipeClimbed
            | Self::SituationContained
            | Self::FirstMissedShot
            | Self::FirstNonHeadshot => EventValue::Void,
        };
        Ok(value)
    }
}

fn decode_struct<T>(payload: &Value) -> Result<T, serde_json::Error>
where
    T: DeserializeOwned + Default,
{
    if payload.is_null() {
        return Ok(T::default());
    }
    serde_json::from_value(payload.clone())
}

fn decode_id_list(payload: &Value) -> Result<Vec<RepoId>, serde_json::Error> {
    if payload.is_null() {
        return Ok(Vec::new());
    }
    serde_json::from_value(payload.clone())
}

#[derive(Debug, Clone)]
pub struct ServerEvent {
    pub kind: EventKind,
    pub timestamp: f64,
    pub value: EventValue,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EventValue {
    Void,
    ContractStart(ContractStartValue),
    Takedown(TakedownValue),
    BodyFound(BodyFoundValue),
    MurderedBodySeen(MurderedBodySeenValue),
    Id(RepoId),
    Ids(Vec<RepoId>),
    Item(ItemValue),
    Trespassing(TrespassingValue),
    IllegalWeapon(IllegalWeaponValue),
    Recorder(RecorderValue),
    AmbientChanged(AmbientChangedValue),
    Cleanness(CleannessValue),
    Actor(ActorIdentityValue),
    ShotsFired(ShotsFiredValue),
    SyndicateTarget(SyndicateTargetValue),
    ActorSick(ActorSickValue),
    DartHit(DartHitValue),
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct LoadoutItem {
    pub repository_id: RepoId,
    pub instance_id: String,
    pub online_traits: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct ContractStartValue {
    pub loadout: Vec<LoadoutItem>,
    pub disguise: RepoId,
    pub location_id: RepoId,
    pub contract_type: MissionType,
    pub difficulty_level: i32,
    #[serde(rename = "IsVR")]
    pub is_vr: bool,
    pub is_hitman_suit: bool,
    pub selected_character_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct DamageHistoryEntry {
    pub explosive: bool,
    pub headshot: bool,
    pub accident: bool,
    pub weapon_silenced: bool,
    pub projectile: bool,
    pub sniper: bool,
    pub through_wall: bool,
    pub instance_id: String,
    pub repository_id: RepoId,
    pub body_part_id: i32,
    pub total_damage: i32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct TakedownValue {
    pub repository_id: RepoId,
    pub actor_id: u32,
    pub actor_name: String,
    pub actor_type: ActorType,
    pub kill_type: KillType,
    pub kill_context: DeathContext,
    pub kill_class: String,
    pub accident: bool,
    pub weapon_silenced: bool,
    pub explosive: bool,
    pub explosion_type: i32,
    pub projectile: bool,
    pub sniper: bool,
    pub is_headshot: bool,
    pub is_target: bool,
    pub through_wall: bool,
    pub body_part_id: i32,
    pub total_damage: f64,
    pub is_moving: bool,
    pub room_id: i32,
    pub damage_events: Vec<String>,
    pub player_id: i32,
    pub outfit_repository_id: RepoId,
    pub outfit_is_hitman_suit: bool,
    pub kill_method_broad: String,
    pub kill_method_strict: String,
    pub evergreen_rarity: i32,
    pub history: Vec<DamageHistoryEntry>,
    pub kill_item_repository_id: RepoId,
    pub kill_item_instance_id: String,
    pub kill_item_category: String,
}

impl Default for TakedownValue {
    fn default() -> Self {
        Self {
            repository_id: RepoId::default(),
            actor_id: 0,
            actor_name: String::new(),
            actor_type: ActorType::default(),
            kill_type: KillType::default(),
            kill_context: DeathContext::default(),
            kill_class: String::new(),
            accident: false,
            weapon_silenced: false,
            explosive: false,
            explosion_type: 0,
            projectile: false,
            sniper: false,
            is_headshot: false,
            is_target: false,
            through_wall: false,
            body_part_id: -1,
            total_damage: 0.0,
            is_moving: false,
            room_id: -1,
            damage_events: Vec::new(),
            player_id: -1,
            outfit_repository_id: RepoId::default(),
            outfit_is_hitman_suit: false,
            kill_method_broad: String::new(),
            kill_method_strict: String::new(),
            evergreen_rarity: -1,
            history: Vec::new(),
            kill_item_repository_id: RepoId::default(),
            kill_item_instance_id: String::new(),
            kill_item_category: String::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct DeadBody {
    pub repository_id: RepoId,
    pub is_crowd_actor: bool,
    pub death_context: DeathContext,
    pub death_type: DeathType,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct BodyFoundValue {
    pub dead_body: DeadBody,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct MurderedBodySeenValue {
    pub dead_body: DeadBody,
    pub witness: RepoId,
    pub is_witness_target: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct ItemValue {
    pub repository_id: RepoId,
    pub item_type: String,
    pub item_name: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct TrespassingValue {
    pub is_trespassing: bool,
    pub room_id: i32,
}

impl Default for TrespassingValue {
    fn default() -> Self {
        Self {
            is_trespassing: false,
            room_id: -1,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct IllegalWeaponValue {
    pub is_holding_illegal_weapon: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RecorderValue {
    pub event: RecorderEvent,
    pub camera: u32,
    pub recorder: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct AmbientChangedValue {
    pub previous_ambient_value: GameTension,
    pub ambient_value: GameTension,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct CleannessValue {
    pub repository_id: RepoId,
    pub is_target: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct ActorIdentityValue {
    pub actor_id: u32,
    pub repository_id: RepoId,
    pub actor_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct ShotsFiredValue {
    pub split: i64,
    pub total: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SyndicateTargetValue {
    #[serde(rename = "repoID")]
    pub repo_id: RepoId,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ActorSickValue {
    #[serde(rename = "ActorId")]
    pub actor_id: u32,
    #[serde(rename = "ActorName")]
    pub actor_name: String,
    #[serde(rename = "actor_R_ID")]
    pub actor_repository_id: RepoId,
    #[serde(rename = "IsTarget")]
    pub is_target: bool,
    #[serde(rename = "item_R_ID")]
    pub item_repository_id: RepoId,
    #[serde(rename = "setpiece_R_ID")]
    pub setpiece_repository_id: RepoId,
    #[serde(rename = "ActorType")]
    pub actor_type: ActorType,
}

// The game only sends `Sick` when the dart is a sickness dart; its value is
// meaningless, often null.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct DartHitValue {
    pub repository_id: RepoId,
    pub actor_type: ActorType,
    pub is_target: bool,
    #[serde(deserialize_with = "key_present")]
    pub sick: bool,
}

fn key_present<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    IgnoredAny::deserialize(deserializer)?;
    Ok(true)
}
