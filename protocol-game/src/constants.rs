//! Centralized tuning constants and embedded asset paths for the session engine.
//!
//! Outcome thresholds live here rather than in the JSON assets so that the
//! ending classification can only change through reviewed code.

// Embedded content ---------------------------------------------------------
pub(crate) const DEFAULT_MISSION_DATA: &str = include_str!("../assets/data/missions.json");
pub(crate) const DEFAULT_LOADOUT_DATA: &str = include_str!("../assets/data/loadouts.json");
pub(crate) const DEFAULT_PROTOCOL_CONFIG: &str = include_str!("../assets/data/protocol.json");

// Content validation -------------------------------------------------------
pub const MIN_CHOICES_PER_MISSION: usize = 2;

// Ending classification ----------------------------------------------------
pub const OUTCOME_IMPROVISED_HP_BELOW: i32 = 30;
pub const OUTCOME_GHOST_STEALTH_ABOVE: i32 = 90;
pub const OUTCOME_FLAWLESS_HP_AT_LEAST: i32 = 80;

// Stat floor ---------------------------------------------------------------
pub const STAT_FLOOR: i32 = 0;

// Ending sequence defaults -------------------------------------------------
pub(crate) const ENDING_PROGRESS_STEP: u8 = 5;
pub(crate) const ENDING_COMPLETION_THRESHOLD: u8 = 100;
pub(crate) const ENDING_TICK_INTERVAL_MS: u64 = 15;
pub(crate) const ENDING_REVEAL_DELAY_MS: u64 = 400;

// Briefing defaults --------------------------------------------------------
pub(crate) const BRIEFING_TIMEOUT_MS: u64 = 8_000;
pub(crate) const BRIEFING_FALLBACK_TEXT: &str =
    "The system is dark. Proceed to target coordinates and await signal.";
pub(crate) const BRIEFING_EMPTY_RESPONSE_TEXT: &str =
    "Mission intel is classified. Proceed with caution.";

// Operator defaults --------------------------------------------------------
pub(crate) const DEFAULT_OPERATOR_NAME: &str = "Mansoor Rana";
pub(crate) const DEFAULT_CALLSIGN: &str = "RANA-43";
pub(crate) const DEFAULT_UNIT: &str = "TASK FORCE: DEVOPS GHOSTS";
