//! Session state machine for a single playthrough
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::briefing::{BriefingRequest, BriefingTicket};
use crate::config::EngineConfig;
use crate::content::ContentStore;
use crate::data::{InventoryItem, Mission};
use crate::ending::{EndingSequence, EndingStage, EndingStep, ScheduledTick};
use crate::loadouts::LoadoutId;
use crate::result::{Outcome, classify_outcome};
use crate::stats::{Resolution, Stats, resolve_consequences};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GamePhase {
    #[default]
    Start,
    Loadout,
    MissionLoading,
    MissionActive,
    Debriefing,
    Ending,
    GameOver,
}

impl std::fmt::Display for GamePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Start => "START",
            Self::Loadout => "LOADOUT",
            Self::MissionLoading => "MISSION_LOADING",
            Self::MissionActive => "MISSION_ACTIVE",
            Self::Debriefing => "DEBRIEFING",
            Self::Ending => "ENDING",
            Self::GameOver => "GAME_OVER",
        };
        f.write_str(label)
    }
}

/// Contract violations. The session is left untouched when one is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("cannot {operation} during {phase}")]
    InvalidTransition {
        operation: &'static str,
        phase: GamePhase,
    },
    #[error("mission {mission_index} has no choice {choice}")]
    UnknownChoice { mission_index: usize, choice: usize },
    #[error("loadout {0} is not available")]
    UnknownLoadout(LoadoutId),
}

/// Stats and inventory as they stood when the current mission was entered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Checkpoint {
    pub stats: Stats,
    pub inventory: Vec<InventoryItem>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BriefingDelivery {
    Applied,
    /// The ticket was superseded; the text was discarded.
    Stale,
}

/// What `next_mission` led to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advance {
    /// Another mission is loading; its briefing must be delivered.
    Loading(BriefingRequest),
    /// The campaign is over and the ending sequence has started.
    Ending(Outcome),
}

/// Read-only view of a session for rendering and reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub phase: GamePhase,
    pub mission_index: usize,
    pub total_missions: usize,
    pub stats: Stats,
    pub inventory: Vec<InventoryItem>,
    pub loadout: Option<LoadoutId>,
    pub briefing: String,
    pub debrief: String,
    pub ending_stage: EndingStage,
    pub ending_progress: u8,
    pub outcome: Option<Outcome>,
    pub retries: u32,
    pub generation: u64,
}

/// One playthrough of the campaign.
///
/// Every mutator takes `&mut self`, so operations are serialised by the
/// borrow checker. Asynchronous briefing responses come back through
/// [`Session::complete_briefing`] and are matched against the pending ticket.
#[derive(Debug, Clone)]
pub struct Session {
    content: ContentStore,
    config: EngineConfig,
    phase: GamePhase,
    mission_index: usize,
    stats: Stats,
    inventory: Vec<InventoryItem>,
    loadout: Option<LoadoutId>,
    briefing: Option<String>,
    debrief: Option<String>,
    checkpoint: Checkpoint,
    generation: u64,
    sequence: u64,
    pending: Option<BriefingTicket>,
    retries: u32,
    outcome: Option<Outcome>,
    ending: EndingSequence,
}

impl Session {
    #[must_use]
    pub fn new(content: ContentStore, config: EngineConfig) -> Self {
        let ending = EndingSequence::new(config.ending);
        Self {
            content,
            config,
            phase: GamePhase::Start,
            mission_index: 0,
            stats: Stats::default(),
            inventory: Vec::new(),
            loadout: None,
            briefing: None,
            debrief: None,
            checkpoint: Checkpoint::default(),
            generation: 0,
            sequence: 0,
            pending: None,
            retries: 0,
            outcome: None,
            ending,
        }
    }

    #[must_use]
    pub const fn phase(&self) -> GamePhase {
        self.phase
    }

    #[must_use]
    pub const fn stats(&self) -> Stats {
        self.stats
    }

    #[must_use]
    pub fn inventory(&self) -> &[InventoryItem] {
        &self.inventory
    }

    #[must_use]
    pub const fn mission_index(&self) -> usize {
        self.mission_index
    }

    #[must_use]
    pub fn current_mission(&self) -> Option<&Mission> {
        self.content.mission(self.mission_index)
    }

    #[must_use]
    pub const fn loadout(&self) -> Option<LoadoutId> {
        self.loadout
    }

    #[must_use]
    pub const fn checkpoint(&self) -> &Checkpoint {
        &self.checkpoint
    }

    #[must_use]
    pub const fn retries(&self) -> u32 {
        self.retries
    }

    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub const fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    #[must_use]
    pub const fn pending_ticket(&self) -> Option<BriefingTicket> {
        self.pending
    }

    #[must_use]
    pub const fn ending(&self) -> &EndingSequence {
        &self.ending
    }

    #[must_use]
    pub const fn content(&self) -> &ContentStore {
        &self.content
    }

    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    const fn invalid(&self, operation: &'static str) -> SessionError {
        SessionError::InvalidTransition {
            operation,
            phase: self.phase,
        }
    }

    /// START -> LOADOUT.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidTransition`] outside START.
    pub fn open_loadout(&mut self) -> Result<(), SessionError> {
        if self.phase != GamePhase::Start {
            return Err(self.invalid("open loadout"));
        }
        self.phase = GamePhase::Loadout;
        log::debug!("Session {} opened loadout selection", self.generation);
        Ok(())
    }

    /// Seed stats from a loadout preset and start loading the first mission.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidTransition`] outside START and LOADOUT, or
    /// [`SessionError::UnknownLoadout`] when the content has no such preset.
    pub fn select_loadout(&mut self, id: LoadoutId) -> Result<BriefingRequest, SessionError> {
        if !matches!(self.phase, GamePhase::Start | GamePhase::Loadout) {
            return Err(self.invalid("select loadout"));
        }
        let preset = self
            .content
            .loadout(id)
            .ok_or(SessionError::UnknownLoadout(id))?
            .initial_stats;

        self.loadout = Some(id);
        self.stats = preset;
        self.inventory.clear();
        self.checkpoint = Checkpoint {
            stats: preset,
            inventory: Vec::new(),
        };
        self.mission_index = 0;
        self.retries = 0;
        self.outcome = None;
        self.debrief = None;
        log::debug!("Session {} deployed with {id}", self.generation);
        Ok(self.issue_briefing())
    }

    fn issue_briefing(&mut self) -> BriefingRequest {
        self.sequence = self.sequence.wrapping_add(1);
        let ticket = BriefingTicket {
            generation: self.generation,
            sequence: self.sequence,
            mission_index: self.mission_index,
        };
        self.pending = Some(ticket);
        self.briefing = None;
        self.phase = GamePhase::MissionLoading;
        BriefingRequest {
            ticket,
            mission_title: self
                .current_mission()
                .map(|m| m.title.clone())
                .unwrap_or_default(),
            operator_name: self.config.operator.name.clone(),
        }
    }

    /// Deliver briefing text for a previously issued request.
    ///
    /// Anything other than the pending ticket is discarded, which covers late
    /// answers after a restart as well as duplicates.
    pub fn complete_briefing(
        &mut self,
        ticket: BriefingTicket,
        text: impl Into<String>,
    ) -> BriefingDelivery {
        if self.pending != Some(ticket) {
            log::warn!(
                "Discarding stale briefing for mission {} (generation {}, request {})",
                ticket.mission_index,
                ticket.generation,
                ticket.sequence
            );
            return BriefingDelivery::Stale;
        }
        self.pending = None;
        self.briefing = Some(text.into());
        self.phase = GamePhase::MissionActive;
        log::debug!("Mission {} active", self.mission_index);
        BriefingDelivery::Applied
    }

    /// Resolve the choice at `index` for the active mission.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidTransition`] outside MISSION_ACTIVE and
    /// [`SessionError::UnknownChoice`] for an out-of-range index.
    pub fn resolve_choice(&mut self, index: usize) -> Result<Resolution, SessionError> {
        if self.phase != GamePhase::MissionActive {
            return Err(self.invalid("resolve choice"));
        }
        let unknown = SessionError::UnknownChoice {
            mission_index: self.mission_index,
            choice: index,
        };
        let choice = self
            .content
            .mission(self.mission_index)
            .and_then(|m| m.choice(index))
            .ok_or(unknown)?;

        let resolution = resolve_consequences(&self.stats, &choice.consequences);
        match resolution {
            Resolution::Lethal { next_hp } => {
                log::info!(
                    "Choice {index} on mission {} is lethal (hp would be {next_hp})",
                    self.mission_index
                );
                self.phase = GamePhase::GameOver;
            }
            Resolution::Survived { stats } => {
                self.stats = stats;
                if let Some(item) = &choice.consequences.item {
                    self.inventory.push(item.clone());
                }
                self.debrief = Some(choice.next_text.clone());
                self.phase = GamePhase::Debriefing;
                log::debug!("Mission {} cleared via choice {index}", self.mission_index);
            }
        }
        Ok(resolution)
    }

    /// Leave the debrief for the next mission, or for the ending after the last.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidTransition`] outside DEBRIEFING.
    pub fn next_mission(&mut self) -> Result<Advance, SessionError> {
        if self.phase != GamePhase::Debriefing {
            return Err(self.invalid("advance"));
        }
        if self.mission_index + 1 < self.content.mission_count() {
            self.checkpoint = Checkpoint {
                stats: self.stats,
                inventory: self.inventory.clone(),
            };
            self.mission_index += 1;
            self.debrief = None;
            return Ok(Advance::Loading(self.issue_briefing()));
        }

        let outcome = classify_outcome(&self.stats);
        self.outcome = Some(outcome);
        self.phase = GamePhase::Ending;
        self.ending.start();
        log::info!(
            "Campaign complete: {outcome} ({:?}, {} retries)",
            self.stats,
            self.retries
        );
        Ok(Advance::Ending(outcome))
    }

    /// Restore the checkpoint and replay the mission that ended the run.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidTransition`] outside GAME_OVER.
    pub fn retry_mission(&mut self) -> Result<(), SessionError> {
        if self.phase != GamePhase::GameOver {
            return Err(self.invalid("retry mission"));
        }
        self.stats = self.checkpoint.stats;
        self.inventory.clone_from(&self.checkpoint.inventory);
        self.debrief = None;
        self.retries = self.retries.saturating_add(1);
        self.phase = GamePhase::MissionActive;
        log::debug!(
            "Retrying mission {} (retry {})",
            self.mission_index,
            self.retries
        );
        Ok(())
    }

    /// Wipe the run and return to START. Pending briefings and ending ticks
    /// from before the restart are ignored from now on.
    pub fn hard_restart(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.phase = GamePhase::Start;
        self.mission_index = 0;
        self.stats = Stats::default();
        self.inventory.clear();
        self.loadout = None;
        self.briefing = None;
        self.debrief = None;
        self.checkpoint = Checkpoint::default();
        self.pending = None;
        self.retries = 0;
        self.outcome = None;
        self.ending.reset();
        log::debug!("Session restarted as generation {}", self.generation);
    }

    /// The next ending tick to schedule, if the ending is in motion.
    #[must_use]
    pub const fn next_ending_tick(&self) -> Option<ScheduledTick> {
        if matches!(self.phase, GamePhase::Ending) {
            self.ending.next_tick()
        } else {
            None
        }
    }

    /// Advance the ending sequence. Stale epochs and any phase other than
    /// ENDING return [`EndingStep::Ignored`].
    pub fn ending_tick(&mut self, epoch: u64) -> EndingStep {
        if self.phase != GamePhase::Ending {
            return EndingStep::Ignored;
        }
        self.ending.tick(epoch)
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        let mission = self.current_mission();
        let briefing = self
            .briefing
            .clone()
            .or_else(|| mission.map(|m| m.briefing.clone()))
            .unwrap_or_default();
        let debrief = self
            .debrief
            .clone()
            .or_else(|| mission.map(|m| m.debrief.clone()))
            .unwrap_or_default();
        SessionSnapshot {
            phase: self.phase,
            mission_index: self.mission_index,
            total_missions: self.content.mission_count(),
            stats: self.stats,
            inventory: self.inventory.clone(),
            loadout: self.loadout,
            briefing,
            debrief,
            ending_stage: self.ending.stage(),
            ending_progress: self.ending.progress(),
            outcome: self.outcome,
            retries: self.retries,
            generation: self.generation,
        }
    }
}
