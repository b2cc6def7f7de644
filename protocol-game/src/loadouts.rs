use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::constants::DEFAULT_LOADOUT_DATA;
use crate::stats::Stats;

/// Operational mode presets, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LoadoutId {
    SilentMerge,
    CicdGhost,
    BugHunter,
}

impl LoadoutId {
    pub const ALL: [Self; 3] = [Self::SilentMerge, Self::CicdGhost, Self::BugHunter];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SilentMerge => "SILENT_MERGE",
            Self::CicdGhost => "CICD_GHOST",
            Self::BugHunter => "BUG_HUNTER",
        }
    }
}

impl fmt::Display for LoadoutId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string does not name a loadout.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown loadout '{0}'")]
pub struct ParseLoadoutError(pub String);

impl FromStr for LoadoutId {
    type Err = ParseLoadoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace('-', "_");
        match normalized.as_str() {
            "SILENT_MERGE" => Ok(Self::SilentMerge),
            "CICD_GHOST" => Ok(Self::CicdGhost),
            "BUG_HUNTER" => Ok(Self::BugHunter),
            _ => Err(ParseLoadoutError(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loadout {
    pub id: LoadoutId,
    pub name: String,
    pub description: String,
    pub initial_stats: Stats,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
struct LoadoutNoId {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub initial_stats: Stats,
}

impl Loadout {
    #[must_use]
    fn with_id(id: LoadoutId, l: LoadoutNoId) -> Self {
        Self {
            id,
            name: l.name,
            description: l.description,
            initial_stats: l.initial_stats,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct LoadoutList(pub Vec<Loadout>);

impl LoadoutList {
    #[must_use]
    pub const fn empty() -> Self {
        Self(vec![])
    }

    /// Load loadouts from a JSON map keyed by loadout id.
    ///
    /// Entries come back in [`LoadoutId::ALL`] order; unknown keys are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed into valid loadout data.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let map: std::collections::HashMap<String, LoadoutNoId> = serde_json::from_str(json)?;
        let mut v = Vec::with_capacity(LoadoutId::ALL.len());
        for id in LoadoutId::ALL {
            if let Some(l) = map.get(id.as_str()) {
                v.push(Loadout::with_id(id, l.clone()));
            }
        }
        Ok(Self(v))
    }

    /// Parse the loadouts shipped with the crate.
    ///
    /// # Errors
    ///
    /// Returns an error if the embedded asset is malformed.
    pub fn load_from_static() -> Result<Self, serde_json::Error> {
        Self::from_json(DEFAULT_LOADOUT_DATA)
    }

    #[must_use]
    pub fn get(&self, id: LoadoutId) -> Option<&Loadout> {
        self.0.iter().find(|l| l.id == id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Loadout> {
        self.0.iter()
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> IntoIterator for &'a LoadoutList {
    type Item = &'a Loadout;
    type IntoIter = std::slice::Iter<'a, Loadout>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
