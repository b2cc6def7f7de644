//! Final outcome classification and the ending screen summary
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::constants::{
    OUTCOME_FLAWLESS_HP_AT_LEAST, OUTCOME_GHOST_STEALTH_ABOVE, OUTCOME_IMPROVISED_HP_BELOW,
};
use crate::content::ContentStore;
use crate::session::{GamePhase, SessionSnapshot};
use crate::stats::Stats;

/// Possible campaign endings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Outcome {
    /// Finished with hp below 30
    Improvised,
    /// Finished with stealth above 90
    Ghost,
    /// Finished with hp of at least 80
    Flawless,
    Standard,
}

impl Outcome {
    #[must_use]
    pub const fn headline(self) -> &'static str {
        match self {
            Self::Improvised => "CRITICAL DAMAGE SUSTAINED. CAKE EXTRACTED VIA DUCT TAPE.",
            Self::Ghost => "GHOST EXTRACTION. NO ONE KNEW THE CAKE EXISTED.",
            Self::Flawless => "LEGENDARY PERFORMANCE. CAKE DEPLOYED TO PROD.",
            Self::Standard => "MISSION ACCOMPLISHED. CAKE SECURED.",
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Improvised => write!(f, "improvised"),
            Self::Ghost => write!(f, "ghost"),
            Self::Flawless => write!(f, "flawless"),
            Self::Standard => write!(f, "standard"),
        }
    }
}

/// Classify final stats. The first matching rule wins.
#[must_use]
pub const fn classify_outcome(stats: &Stats) -> Outcome {
    if stats.hp < OUTCOME_IMPROVISED_HP_BELOW {
        Outcome::Improvised
    } else if stats.stealth > OUTCOME_GHOST_STEALTH_ABOVE {
        Outcome::Ghost
    } else if stats.hp >= OUTCOME_FLAWLESS_HP_AT_LEAST {
        Outcome::Flawless
    } else {
        Outcome::Standard
    }
}

/// Everything the ending screen shows
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultSummary {
    pub outcome: Outcome,
    pub headline: String,
    pub operator_name: String,
    pub callsign: String,
    pub loadout_name: String,
    pub stats: Stats,
    pub inventory_size: usize,
    pub missions_cleared: usize,
    pub total_missions: usize,
    pub retries: u32,
}

/// Build the ending screen summary from a session snapshot.
///
/// Works on any snapshot; before the campaign ends the outcome is what the
/// current stats would classify as.
#[must_use]
pub fn result_summary(
    snapshot: &SessionSnapshot,
    content: &ContentStore,
    config: &EngineConfig,
) -> ResultSummary {
    let outcome = snapshot
        .outcome
        .unwrap_or_else(|| classify_outcome(&snapshot.stats));
    let loadout_name = snapshot
        .loadout
        .and_then(|id| content.loadout(id))
        .map_or_else(|| "UNASSIGNED".to_string(), |l| l.name.clone());
    let missions_cleared = match snapshot.phase {
        GamePhase::Ending => snapshot.total_missions,
        GamePhase::Debriefing => snapshot.mission_index + 1,
        _ => snapshot.mission_index,
    };

    ResultSummary {
        outcome,
        headline: outcome.headline().to_string(),
        operator_name: config.operator.name.clone(),
        callsign: config.operator.callsign.clone(),
        loadout_name,
        stats: snapshot.stats,
        inventory_size: snapshot.inventory.len(),
        missions_cleared,
        total_missions: snapshot.total_missions,
        retries: snapshot.retries,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ending::EndingStage;
    use crate::loadouts::LoadoutId;

    #[test]
    fn improvised_wins_over_ghost() {
        assert_eq!(
            classify_outcome(&Stats::new(25, 95, 10, 10)),
            Outcome::Improvised
        );
    }

    #[test]
    fn ghost_wins_over_flawless() {
        assert_eq!(classify_outcome(&Stats::new(100, 91, 0, 0)), Outcome::Ghost);
        assert_eq!(
            classify_outcome(&Stats::new(100, 90, 0, 0)),
            Outcome::Flawless
        );
    }

    #[test]
    fn thresholds_are_exact() {
        assert_eq!(
            classify_outcome(&Stats::new(30, 0, 0, 0)),
            Outcome::Standard
        );
        assert_eq!(
            classify_outcome(&Stats::new(29, 0, 0, 0)),
            Outcome::Improvised
        );
        assert_eq!(
            classify_outcome(&Stats::new(80, 0, 0, 0)),
            Outcome::Flawless
        );
        assert_eq!(
            classify_outcome(&Stats::new(79, 50, 0, 0)),
            Outcome::Standard
        );
    }

    #[test]
    fn headlines_are_stable() {
        assert_eq!(
            Outcome::Standard.headline(),
            "MISSION ACCOMPLISHED. CAKE SECURED."
        );
        assert_eq!(Outcome::Ghost.to_string(), "ghost");
    }

    #[test]
    fn summary_reads_snapshot_and_config() {
        let content = ContentStore::load_from_static().unwrap();
        let config = EngineConfig::default();
        let snapshot = SessionSnapshot {
            phase: GamePhase::Ending,
            mission_index: 9,
            total_missions: 10,
            stats: Stats::new(85, 40, 200, 90),
            inventory: Vec::new(),
            loadout: Some(LoadoutId::CicdGhost),
            briefing: String::new(),
            debrief: String::new(),
            ending_stage: EndingStage::Reveal,
            ending_progress: 100,
            outcome: Some(Outcome::Flawless),
            retries: 2,
            generation: 0,
        };

        let summary = result_summary(&snapshot, &content, &config);
        assert_eq!(summary.outcome, Outcome::Flawless);
        assert_eq!(summary.headline, Outcome::Flawless.headline());
        assert_eq!(summary.loadout_name, "CI/CD GHOST");
        assert_eq!(summary.operator_name, "Mansoor Rana");
        assert_eq!(summary.missions_cleared, 10);
        assert_eq!(summary.retries, 2);
    }
}
