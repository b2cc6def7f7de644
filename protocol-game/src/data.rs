use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::constants::DEFAULT_MISSION_DATA;

/// An item picked up during a mission. Pickups are never merged by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_item_count")]
    pub count: u32,
}

const fn default_item_count() -> u32 {
    1
}

/// Sparse stat deltas applied when a choice is selected
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Consequences {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hp: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stealth: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focus: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item: Option<InventoryItem>,
}

impl Consequences {
    #[must_use]
    pub fn hp_delta(&self) -> i32 {
        self.hp.unwrap_or(0)
    }

    #[must_use]
    pub fn stealth_delta(&self) -> i32 {
        self.stealth.unwrap_or(0)
    }

    #[must_use]
    pub fn style_delta(&self) -> i32 {
        self.style.unwrap_or(0)
    }

    #[must_use]
    pub fn focus_delta(&self) -> i32 {
        self.focus.unwrap_or(0)
    }
}

/// A selectable option within a mission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    pub text: String,
    #[serde(default)]
    pub consequences: Consequences,
    /// Follow-up narrative shown on the debrief screen.
    pub next_text: String,
}

/// Cosmetic encounter classification. No rule branches on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EncounterType {
    Decision,
    Puzzle,
    #[serde(alias = "STREALTH_OR_LOUD")]
    StealthOrLoud,
    Boss,
}

impl EncounterType {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Decision => "DECISION",
            Self::Puzzle => "PUZZLE",
            Self::StealthOrLoud => "STEALTH_OR_LOUD",
            Self::Boss => "BOSS",
        }
    }
}

/// One fixed step of the campaign
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mission {
    pub id: u32,
    pub title: String,
    /// Static briefing used when no generated briefing has been delivered.
    pub briefing: String,
    pub encounter_type: EncounterType,
    pub problem: String,
    #[serde(default)]
    pub choices: SmallVec<[Choice; 2]>,
    pub debrief: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_snippet: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
}

impl Mission {
    #[must_use]
    pub fn choice(&self, index: usize) -> Option<&Choice> {
        self.choices.get(index)
    }
}

/// Ordered mission table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct MissionData {
    pub missions: Vec<Mission>,
}

impl MissionData {
    /// Create empty mission data (useful for tests)
    #[must_use]
    pub fn empty() -> Self {
        Self {
            missions: Vec::new(),
        }
    }

    /// Load mission data from JSON string
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed into valid mission data.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    #[must_use]
    pub fn from_missions(missions: Vec<Mission>) -> Self {
        Self { missions }
    }

    /// Parse the campaign shipped with the crate.
    ///
    /// # Errors
    ///
    /// Returns an error if the embedded asset is malformed.
    pub fn load_from_static() -> Result<Self, serde_json::Error> {
        Self::from_json(DEFAULT_MISSION_DATA)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.missions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.missions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mission_data_from_json_defaults_sparse_fields() {
        let json = r#"{
            "missions": [
                {
                    "id": 1,
                    "title": "Test Mission",
                    "briefing": "Go.",
                    "encounter_type": "STREALTH_OR_LOUD",
                    "problem": "A door.",
                    "choices": [
                        {
                            "text": "Open",
                            "consequences": { "hp": -1, "item": { "id": "key", "name": "Key" } },
                            "next_text": "It opened."
                        },
                        { "text": "Wait", "next_text": "Nothing happened." }
                    ],
                    "debrief": "Done."
                }
            ]
        }"#;

        let data = MissionData::from_json(json).unwrap();
        assert_eq!(data.len(), 1);
        let mission = &data.missions[0];
        assert_eq!(mission.encounter_type, EncounterType::StealthOrLoud);
        assert_eq!(mission.choices.len(), 2);

        let open = mission.choice(0).unwrap();
        assert_eq!(open.consequences.hp_delta(), -1);
        assert_eq!(open.consequences.stealth_delta(), 0);
        let item = open.consequences.item.as_ref().unwrap();
        assert_eq!(item.count, 1);
        assert!(item.description.is_empty());

        let wait = mission.choice(1).unwrap();
        assert_eq!(wait.consequences, Consequences::default());
        assert!(mission.choice(2).is_none());
    }

    #[test]
    fn encounter_type_serializes_canonical_spelling() {
        let json = serde_json::to_string(&EncounterType::StealthOrLoud).unwrap();
        assert_eq!(json, "\"STEALTH_OR_LOUD\"");
        assert_eq!(EncounterType::Boss.label(), "BOSS");
    }

    #[test]
    fn sparse_consequences_skip_absent_fields() {
        let consequences = Consequences {
            focus: Some(30),
            ..Consequences::default()
        };
        let json = serde_json::to_string(&consequences).unwrap();
        assert_eq!(json, r#"{"focus":30}"#);
    }

    #[test]
    fn static_campaign_parses() {
        let data = MissionData::load_from_static().unwrap();
        assert_eq!(data.len(), 10);
        assert!(!data.is_empty());
        assert!(MissionData::empty().is_empty());
    }
}
