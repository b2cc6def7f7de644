//! Operator stats and consequence resolution
use serde::{Deserialize, Serialize};

use crate::constants::STAT_FLOOR;
use crate::data::Consequences;

/// The four live counters carried through a playthrough.
///
/// Only a floor of zero is enforced; consequences may push a stat well past 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Stats {
    #[serde(default)]
    pub hp: i32,
    #[serde(default)]
    pub stealth: i32,
    #[serde(default)]
    pub style: i32,
    #[serde(default)]
    pub focus: i32,
}

impl Stats {
    #[must_use]
    pub const fn new(hp: i32, stealth: i32, style: i32, focus: i32) -> Self {
        Self {
            hp,
            stealth,
            style,
            focus,
        }
    }

    pub fn clamp_floor(&mut self) {
        self.hp = self.hp.max(STAT_FLOOR);
        self.stealth = self.stealth.max(STAT_FLOOR);
        self.style = self.style.max(STAT_FLOOR);
        self.focus = self.focus.max(STAT_FLOOR);
    }

    #[must_use]
    pub const fn is_non_negative(&self) -> bool {
        self.hp >= STAT_FLOOR
            && self.stealth >= STAT_FLOOR
            && self.style >= STAT_FLOOR
            && self.focus >= STAT_FLOOR
    }
}

/// Result of applying a choice's consequences to the current stats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The operator survived; `stats` is the fully applied, floored result.
    Survived { stats: Stats },
    /// The hp delta would drop hp to zero or below. Nothing is applied.
    Lethal { next_hp: i32 },
}

impl Resolution {
    #[must_use]
    pub const fn is_lethal(&self) -> bool {
        matches!(self, Self::Lethal { .. })
    }
}

/// Resolve a consequence record against `stats`.
///
/// The lethal check looks at hp alone. When it trips, stealth, style and focus
/// deltas are skipped entirely, so the caller keeps the pre-choice values.
#[must_use]
pub fn resolve_consequences(stats: &Stats, consequences: &Consequences) -> Resolution {
    let next_hp = stats.hp.saturating_add(consequences.hp_delta());
    if next_hp <= 0 {
        return Resolution::Lethal { next_hp };
    }

    let mut next = Stats {
        hp: next_hp,
        stealth: stats.stealth.saturating_add(consequences.stealth_delta()),
        style: stats.style.saturating_add(consequences.style_delta()),
        focus: stats.focus.saturating_add(consequences.focus_delta()),
    };
    next.clamp_floor();
    Resolution::Survived { stats: next }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ghost() -> Stats {
        Stats::new(100, 70, 70, 80)
    }

    #[test]
    fn force_push_applies_every_delta() {
        let consequences = Consequences {
            hp: Some(-5),
            style: Some(20),
            stealth: Some(-40),
            ..Consequences::default()
        };
        assert_eq!(
            resolve_consequences(&ghost(), &consequences),
            Resolution::Survived {
                stats: Stats::new(95, 30, 90, 80)
            }
        );
    }

    #[test]
    fn lethal_hp_reports_next_hp_only() {
        let consequences = Consequences {
            hp: Some(-150),
            style: Some(500),
            ..Consequences::default()
        };
        let resolution = resolve_consequences(&ghost(), &consequences);
        assert_eq!(resolution, Resolution::Lethal { next_hp: -50 });
        assert!(resolution.is_lethal());
    }

    #[test]
    fn exactly_zero_hp_is_lethal() {
        let consequences = Consequences {
            hp: Some(-100),
            ..Consequences::default()
        };
        assert!(resolve_consequences(&ghost(), &consequences).is_lethal());
    }

    #[test]
    fn secondary_stats_floor_at_zero() {
        let consequences = Consequences {
            stealth: Some(-500),
            focus: Some(-81),
            ..Consequences::default()
        };
        let Resolution::Survived { stats } = resolve_consequences(&ghost(), &consequences) else {
            panic!("expected survival");
        };
        assert_eq!(stats.stealth, 0);
        assert_eq!(stats.focus, 0);
        assert_eq!(stats.hp, 100);
    }

    #[test]
    fn empty_consequences_are_identity() {
        assert_eq!(
            resolve_consequences(&ghost(), &Consequences::default()),
            Resolution::Survived { stats: ghost() }
        );
    }

    #[test]
    fn no_ceiling_is_enforced() {
        let consequences = Consequences {
            focus: Some(1000),
            style: Some(1000),
            hp: Some(100),
            ..Consequences::default()
        };
        let Resolution::Survived { stats } = resolve_consequences(&ghost(), &consequences) else {
            panic!("expected survival");
        };
        assert_eq!(stats, Stats::new(200, 70, 1070, 1080));
    }

    #[test]
    fn clamp_floor_and_non_negative_agree() {
        let mut stats = Stats::new(-1, 5, -7, 0);
        assert!(!stats.is_non_negative());
        stats.clamp_floor();
        assert_eq!(stats, Stats::new(0, 5, 0, 0));
        assert!(stats.is_non_negative());
    }
}
