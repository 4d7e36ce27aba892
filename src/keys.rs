use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

// Repository identifier for an actor, item or outfit.
// The game emits the same GUID with inconsistent casing depending on the
// event source, so the key is stored lower-cased and every set and map in
// the run state is keyed by it.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RepoId(String);

impl RepoId {
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(raw.as_ref().trim().to_ascii_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn is_unresolved(&self) -> bool {
        self.0.chars().all(|c| c == '0' || c == '-')
    }
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RepoId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for RepoId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl Serialize for RepoId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for RepoId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.map(Self::new).unwrap_or_default())
    }
}

pub type RepoSet = BTreeSet<RepoId>;
pub type RepoMap<V> = BTreeMap<RepoId, V>;

#[cfg(test)]
mod tests {
    use super::{RepoId, RepoSet};

    #[test]
    fn compares_case_insensitively() {
        let upper = RepoId::new("0A1B-FF");
        let lower = RepoId::new("0a1b-ff");
        assert_eq!(upper, lower);

        let mut set = RepoSet::new();
        assert!(set.insert(upper));
        assert!(!set.insert(lower));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn zeroed_guid_is_unresolved() {
        assert!(RepoId::new("").is_unresolved());
        assert!(RepoId::new("00000000-0000-0000-0000-000000000000").is_unresolved());
        assert!(!RepoId::new("a0000000-0000-0000-0000-000000000000").is_unresolved());
    }

    #[test]
    fn deserializes_normalized() {
        let parsed: RepoId = serde_json::from_str("\" ABC \"").expect("repo id should parse");
        assert_eq!(parsed.as_str(), "abc");
        let missing: RepoId = serde_json::from_str("null").expect("null repo id should parse");
        assert!(missing.is_empty());
        assert!(serde_json::from_str::<RepoId>("{}").is_err());
    }
}
