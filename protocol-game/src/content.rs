//! Validated, read-only campaign tables
use std::sync::Arc;
use thiserror::Error;

use crate::constants::MIN_CHOICES_PER_MISSION;
use crate::data::{Mission, MissionData};
use crate::loadouts::{Loadout, LoadoutId, LoadoutList};

/// Fatal configuration errors raised while loading campaign content.
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("mission table is empty")]
    NoMissions,
    #[error("mission {mission_id} has {count} choices (at least {min} required)")]
    TooFewChoices {
        mission_id: u32,
        count: usize,
        min: usize,
    },
    #[error("loadout table is empty")]
    NoLoadouts,
    #[error("loadout {id} has invalid initial stats: {reason}")]
    InvalidLoadoutStats { id: LoadoutId, reason: &'static str },
    #[error("failed to parse {table} data")]
    Parse {
        table: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Immutable loadout and mission tables, validated once at startup.
#[derive(Debug, Clone)]
pub struct ContentStore {
    loadouts: Arc<LoadoutList>,
    missions: Arc<MissionData>,
}

impl ContentStore {
    /// Validate and freeze the two content tables.
    ///
    /// # Errors
    ///
    /// Returns a [`ContentError`] when the mission list is empty, a mission has
    /// fewer than two choices, or the loadout table is empty or carries stats
    /// a session could never start from.
    pub fn new(loadouts: LoadoutList, missions: MissionData) -> Result<Self, ContentError> {
        validate_missions(&missions)?;
        validate_loadouts(&loadouts)?;
        Ok(Self {
            loadouts: Arc::new(loadouts),
            missions: Arc::new(missions),
        })
    }

    /// Build the store from the embedded assets.
    ///
    /// # Errors
    ///
    /// Returns a [`ContentError`] if an embedded table fails to parse or validate.
    pub fn load_from_static() -> Result<Self, ContentError> {
        let loadouts = LoadoutList::load_from_static().map_err(|source| ContentError::Parse {
            table: "loadout",
            source,
        })?;
        let missions = MissionData::load_from_static().map_err(|source| ContentError::Parse {
            table: "mission",
            source,
        })?;
        Self::new(loadouts, missions)
    }

    #[must_use]
    pub fn mission(&self, index: usize) -> Option<&Mission> {
        self.missions.missions.get(index)
    }

    #[must_use]
    pub fn missions(&self) -> &[Mission] {
        &self.missions.missions
    }

    #[must_use]
    pub fn mission_count(&self) -> usize {
        self.missions.len()
    }

    #[must_use]
    pub fn loadout(&self, id: LoadoutId) -> Option<&Loadout> {
        self.loadouts.get(id)
    }

    #[must_use]
    pub fn loadouts(&self) -> &LoadoutList {
        &self.loadouts
    }
}

fn validate_missions(missions: &MissionData) -> Result<(), ContentError> {
    if missions.is_empty() {
        return Err(ContentError::NoMissions);
    }
    for mission in &missions.missions {
        if mission.choices.len() < MIN_CHOICES_PER_MISSION {
            return Err(ContentError::TooFewChoices {
                mission_id: mission.id,
                count: mission.choices.len(),
                min: MIN_CHOICES_PER_MISSION,
            });
        }
    }
    Ok(())
}

fn validate_loadouts(loadouts: &LoadoutList) -> Result<(), ContentError> {
    if loadouts.is_empty() {
        return Err(ContentError::NoLoadouts);
    }
    for loadout in loadouts {
        if !loadout.initial_stats.is_non_negative() {
            return Err(ContentError::InvalidLoadoutStats {
                id: loadout.id,
                reason: "stats must not be negative",
            });
        }
        if loadout.initial_stats.hp == 0 {
            return Err(ContentError::InvalidLoadoutStats {
                id: loadout.id,
                reason: "hp must start above zero",
            });
        }
    }
    Ok(())
}
