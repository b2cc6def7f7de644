use std::collections::HashSet;

use protocol_game::{
    ContentError, ContentStore, EncounterType, EngineConfig, LoadoutId, LoadoutList, MissionData,
    Stats,
};

#[test]
fn shipped_missions_are_ordered_and_unique() {
    let data = MissionData::load_from_static().unwrap();
    let ids: Vec<u32> = data.missions.iter().map(|m| m.id).collect();
    assert_eq!(ids, (1..=10).collect::<Vec<_>>());

    let titles: HashSet<&str> = data.missions.iter().map(|m| m.title.as_str()).collect();
    assert_eq!(titles.len(), data.len());

    for mission in &data.missions {
        assert!(mission.choices.len() >= 2, "mission {}", mission.id);
        assert!(!mission.briefing.is_empty());
        assert!(!mission.debrief.is_empty());
        for choice in &mission.choices {
            assert!(!choice.text.is_empty());
            assert!(!choice.next_text.is_empty());
        }
    }
}

#[test]
fn shipped_campaign_ends_on_bosses() {
    let data = MissionData::load_from_static().unwrap();
    let tail: Vec<EncounterType> = data.missions[7..].iter().map(|m| m.encounter_type).collect();
    assert_eq!(tail, vec![EncounterType::Boss; 3]);
    let with_code: Vec<u32> = data
        .missions
        .iter()
        .filter(|m| m.code_snippet.is_some())
        .map(|m| m.id)
        .collect();
    assert_eq!(with_code, vec![4, 9]);
    assert!(data.missions[3].answer.is_some());
    assert!(data.missions[8].answer.is_none());
}

#[test]
fn shipped_loadouts_match_presets() {
    let loadouts = LoadoutList::load_from_static().unwrap();
    let presets: Vec<(LoadoutId, Stats)> =
        loadouts.iter().map(|l| (l.id, l.initial_stats)).collect();
    assert_eq!(
        presets,
        vec![
            (LoadoutId::SilentMerge, Stats::new(80, 100, 50, 70)),
            (LoadoutId::CicdGhost, Stats::new(100, 70, 70, 80)),
            (LoadoutId::BugHunter, Stats::new(90, 50, 90, 100)),
        ]
    );
}

#[test]
fn shipped_content_passes_validation() {
    let store = ContentStore::load_from_static().unwrap();
    assert_eq!(store.mission_count(), 10);
    for id in LoadoutId::ALL {
        assert!(store.loadout(id).is_some(), "{id} missing");
    }
    assert!(EngineConfig::load_from_static().validate().is_ok());
}

#[test]
fn malformed_mission_json_is_reported() {
    let err = MissionData::from_json(r#"{ "missions": [ { "id": "one" } ] }"#);
    assert!(err.is_err());

    let store = ContentStore::new(
        LoadoutList::load_from_static().unwrap(),
        MissionData::from_json(r#"{ "missions": [] }"#).unwrap(),
    );
    assert!(matches!(store, Err(ContentError::NoMissions)));
}

#[test]
fn consequence_records_stay_sparse_on_the_wire() {
    let data = MissionData::load_from_static().unwrap();
    let first = serde_json::to_value(&data.missions[0].choices[1].consequences).unwrap();
    let keys: HashSet<&str> = first
        .as_object()
        .unwrap()
        .keys()
        .map(String::as_str)
        .collect();
    assert_eq!(keys, HashSet::from(["stealth", "focus"]));
}
