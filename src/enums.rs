use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

macro_rules! coded_enum {
    (
        $(#[$meta:meta])*
        $name:ident, sentinel = $sentinel:ident {
            $($variant:ident = $code:literal),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
        pub enum $name {
            $($variant,)*
            $sentinel,
        }

        impl $name {
            pub fn from_code(code: i64) -> Self {
                match code {
                    $($code => Self::$variant,)*
                    _ => Self::$sentinel,
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::$sentinel
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = Value::deserialize(deserializer)?;
                Ok(raw.as_i64().map(Self::from_code).unwrap_or_default())
            }
        }
    };
}

coded_enum! {
    GameTension, sentinel = Undefined {
        Ambient = 1,
        Agitated = 2,
        Searching = 3,
        AlertedLow = 4,
        AlertedHigh = 5,
        Hunting = 6,
        Arrest = 7,
        Combat = 8,
    }
}

impl GameTension {
    pub fn weight(self) -> i32 {
        match self {
            Self::Searching => 1,
            Self::AlertedHigh => 3,
            Self::Hunting => 5,
            Self::Arrest => 8,
            Self::Combat => 10,
            _ => 0,
        }
    }
}

coded_enum! {
    DeathContext, sentinel = Undefined {
        NotHero = 1,
        Hidden = 2,
        Accident = 3,
        Murder = 4,
    }
}

coded_enum! {
    DeathType, sentinel = Undefined {
        Pacify = 1,
        Kill = 2,
        BloodyKill = 3,
    }
}

coded_enum! {
    ActorType, sentinel = Last {
        Civilian = 0,
        Guard = 1,
        Hitman = 2,
    }
}

coded_enum! {
    KillType, sentinel = Undefined {
        Push = 1,
        Pull = 2,
        Throw = 3,
        ChokeOut = 4,
        SnapNeck = 5,
        KnockOut = 6,
        Fiberwire = 7,
        PistolExecute = 8,
        ItemTakeOutFront = 9,
        ItemTakeOutBack = 10,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum MissionType {
    Arcade,
    Campaign,
    Creation,
    Elusive,
    Escalation,
    Evergreen,
    Featured,
    Mission,
    Orbis,
    Sniper,
    Tutorial,
    UserCreated,
    VsRace,
    #[default]
    Undefined,
}

impl MissionType {
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "arcade" => Self::Arcade,
            "campaign" => Self::Campaign,
            "creation" => Self::Creation,
            "elusive" => Self::Elusive,
            "escalation" => Self::Escalation,
            "evergreen" => Self::Evergreen,
            "featured" => Self::Featured,
            "mission" => Self::Mission,
            "orbis" => Self::Orbis,
            "sniper" => Self::Sniper,
            "tutorial" => Self::Tutorial,
            "usercreated" => Self::UserCreated,
            "vsrace" => Self::VsRace,
            _ => Self::Undefined,
        }
    }
}

impl<'de> Deserialize<'de> for MissionType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        Ok(raw.as_str().map(Self::from_name).unwrap_or_default())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum RecorderEvent {
    Spotted,
    Erased,
    Destroyed,
    CameraDestroyed,
    #[default]
    Undefined,
}

impl RecorderEvent {
    pub fn from_name(name: &str) -> Self {
        match name {
            "spotted" => Self::Spotted,
            "erased" => Self::Erased,
            "destroyed" => Self::Destroyed,
            "CameraDestroyed" => Self::CameraDestroyed,
            _ => Self::Undefined,
        }
    }
}

impl<'de> Deserialize<'de> for RecorderEvent {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        Ok(raw.as_str().map(Self::from_name).unwrap_or_default())
    }
}
