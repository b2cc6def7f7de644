use anyhow::{Result, bail};
use colored::Colorize;
use protocol_game::{
    Advance, BriefingProvider, ContentStore, EndingStage, EndingTiming, EngineConfig, GamePhase,
    LoadoutId, Outcome, Session, SessionDriver, Stats, classify_outcome,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::policy::{PlayStrategy, PlayerPolicy};

/// One policy decision as it was played
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionLogEntry {
    pub mission_id: u32,
    pub mission_title: String,
    pub choice_index: usize,
    pub choice_text: String,
    pub policy_name: String,
    pub rationale: Option<String>,
    pub lethal: bool,
}

/// Full account of a single automated playthrough
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaythroughRecord {
    pub strategy: PlayStrategy,
    pub loadout: LoadoutId,
    pub seed: u64,
    pub provider: String,
    pub finished: bool,
    pub outcome: Option<Outcome>,
    pub final_stats: Stats,
    pub inventory_size: usize,
    pub missions_cleared: usize,
    pub retries: u32,
    pub ending_stage: EndingStage,
    pub decision_log: Vec<DecisionLogEntry>,
    pub failures: Vec<String>,
    #[serde(with = "duration_serde")]
    pub duration: Duration,
}

impl PlaythroughRecord {
    #[must_use]
    pub fn passed(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Drives complete campaigns with scripted policies.
pub struct PlaythroughRunner {
    content: ContentStore,
    config: EngineConfig,
    provider: Arc<dyn BriefingProvider>,
    max_retries: u32,
    verbose: bool,
}

impl PlaythroughRunner {
    /// Build a runner. The ending sequence always runs without delays.
    #[must_use]
    pub fn new(
        content: ContentStore,
        mut config: EngineConfig,
        provider: Arc<dyn BriefingProvider>,
        max_retries: u32,
        verbose: bool,
    ) -> Self {
        config.ending = EndingTiming {
            tick_interval_ms: 0,
            reveal_delay_ms: 0,
            ..config.ending
        };
        Self {
            content,
            config,
            provider,
            max_retries,
            verbose,
        }
    }

    pub async fn run_matrix(
        &self,
        strategies: &[PlayStrategy],
        loadouts: &[LoadoutId],
        seeds: &[u64],
    ) -> Vec<PlaythroughRecord> {
        let mut records = Vec::new();
        for &strategy in strategies {
            for &loadout in loadouts {
                for &seed in seeds {
                    if self.verbose {
                        println!(
                            "🧪 Playing {} with {} (seed {seed})",
                            strategy.label().bright_white(),
                            loadout
                        );
                    }
                    let record = self.run(strategy, loadout, seed).await;
                    if self.verbose {
                        print_record_line(&record);
                    }
                    records.push(record);
                }
            }
        }
        records
    }

    pub async fn run(
        &self,
        strategy: PlayStrategy,
        loadout: LoadoutId,
        seed: u64,
    ) -> PlaythroughRecord {
        let start = Instant::now();
        let session = Session::new(self.content.clone(), self.config.clone());
        let mut driver = SessionDriver::new(session, Arc::clone(&self.provider));
        let mut policy = strategy.create_policy(seed);
        let mut decision_log = Vec::new();
        let mut failures = Vec::new();

        if let Err(err) = self
            .play(&mut driver, policy.as_mut(), loadout, &mut decision_log)
            .await
        {
            failures.push(format!("{err:#}"));
        }

        let ending_stage = if driver.session().phase() == GamePhase::Ending {
            driver.play_ending(|_| {}).await
        } else {
            driver.session().ending().stage()
        };

        let snapshot = driver.snapshot();
        let finished = snapshot.phase == GamePhase::Ending;
        let mut record = PlaythroughRecord {
            strategy,
            loadout,
            seed,
            provider: driver.provider_name().to_string(),
            finished,
            outcome: snapshot.outcome,
            final_stats: snapshot.stats,
            inventory_size: snapshot.inventory.len(),
            missions_cleared: if finished {
                snapshot.total_missions
            } else {
                snapshot.mission_index
            },
            retries: snapshot.retries,
            ending_stage,
            decision_log,
            failures,
            duration: start.elapsed(),
        };
        record.failures.extend(evaluate_expectations(&record));
        log::info!(
            "{} / {loadout} / seed {seed}: {}",
            strategy.label(),
            if record.passed() { "passed" } else { "failed" }
        );
        record
    }

    async fn play(
        &self,
        driver: &mut SessionDriver,
        policy: &mut (dyn PlayerPolicy + Send),
        loadout: LoadoutId,
        decision_log: &mut Vec<DecisionLogEntry>,
    ) -> Result<()> {
        driver.open_loadout()?;
        driver.select_loadout(loadout).await?;

        let mut excluded: Vec<usize> = Vec::new();
        let mut mission_retries = 0u32;
        loop {
            match driver.session().phase() {
                GamePhase::MissionActive => {
                    let snapshot = driver.snapshot();
                    let Some(mission) = driver.session().current_mission().cloned() else {
                        bail!("mission {} is missing", snapshot.mission_index);
                    };
                    if excluded.len() >= mission.choices.len() {
                        bail!("no survivable choice left on mission {}", mission.id);
                    }

                    let decision = policy.pick_choice(&snapshot, &mission, &excluded);
                    let resolution = driver.resolve_choice(decision.choice_index)?;
                    let choice_text = mission
                        .choice(decision.choice_index)
                        .map(|c| c.text.clone())
                        .unwrap_or_default();
                    decision_log.push(DecisionLogEntry {
                        mission_id: mission.id,
                        mission_title: mission.title.clone(),
                        choice_index: decision.choice_index,
                        choice_text,
                        policy_name: policy.name().to_string(),
                        rationale: decision.rationale,
                        lethal: resolution.is_lethal(),
                    });

                    if resolution.is_lethal() {
                        if mission_retries >= self.max_retries {
                            bail!(
                                "mission {} still lethal after {mission_retries} retries",
                                mission.id
                            );
                        }
                        mission_retries += 1;
                        excluded.push(decision.choice_index);
                        driver.retry_mission()?;
                    }
                }
                GamePhase::Debriefing => {
                    excluded.clear();
                    mission_retries = 0;
                    if let Advance::Ending(outcome) = driver.next_mission().await? {
                        log::debug!("Reached ending: {outcome}");
                    }
                }
                GamePhase::Ending => return Ok(()),
                phase => bail!("playthrough stalled in {phase}"),
            }
        }
    }
}

/// Checks every finished record must satisfy
fn evaluate_expectations(record: &PlaythroughRecord) -> Vec<String> {
    let mut failures = Vec::new();
    if !record.finished {
        failures.push("campaign did not reach ENDING".to_string());
        return failures;
    }
    if !record.final_stats.is_non_negative() {
        failures.push(format!("negative stats {:?}", record.final_stats));
    }
    let expected = classify_outcome(&record.final_stats);
    if record.outcome != Some(expected) {
        failures.push(format!(
            "outcome {:?} does not match classification {expected}",
            record.outcome
        ));
    }
    if record.ending_stage != EndingStage::Reveal {
        failures.push(format!(
            "ending sequence stopped in {:?}",
            record.ending_stage
        ));
    }
    failures
}

fn print_record_line(record: &PlaythroughRecord) {
    if record.passed() {
        println!(
            "  ✅ {} in {:?} (retries {}, {} items)",
            record
                .outcome
                .map_or_else(|| "-".to_string(), |o| o.to_string()),
            record.duration,
            record.retries,
            record.inventory_size
        );
    } else {
        for failure in &record.failures {
            println!("  ❌ {}", failure.red());
        }
    }
}

/// Last few decisions, newest first
pub fn summarize_decision_path(record: &PlaythroughRecord) -> String {
    if record.decision_log.is_empty() {
        return "no decisions recorded".to_string();
    }

    record
        .decision_log
        .iter()
        .rev()
        .take(3)
        .map(|entry| {
            let rationale = entry
                .rationale
                .as_deref()
                .filter(|s| !s.is_empty())
                .unwrap_or("-");
            let marker = if entry.lethal { " (lethal)" } else { "" };
            format!(
                "mission {} ({}): {} [{}] idx {} reason {}{marker}",
                entry.mission_id,
                entry.mission_title,
                entry.choice_text,
                entry.policy_name,
                entry.choice_index,
                rationale
            )
        })
        .collect::<Vec<_>>()
        .join(" | ")
}

mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_millis().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u128::deserialize(deserializer)?;
        Ok(Duration::from_millis(u64::try_from(millis).unwrap_or(0)))
    }
}
