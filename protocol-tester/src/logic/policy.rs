use std::fmt;
use std::str::FromStr;

use protocol_game::{Consequences, Mission, SessionSnapshot};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};

/// Decision returned by a [`PlayerPolicy`]
#[derive(Debug, Clone)]
pub struct PolicyDecision {
    pub choice_index: usize,
    pub rationale: Option<String>,
}

impl PolicyDecision {
    #[must_use]
    pub fn new(choice_index: usize, rationale: Option<String>) -> Self {
        Self {
            choice_index,
            rationale,
        }
    }
}

/// Policy interface for automated play strategies.
pub trait PlayerPolicy {
    /// Name used for logging/debug output.
    fn name(&self) -> &'static str;

    /// Select a choice for the active mission, skipping `excluded` indices.
    fn pick_choice(
        &mut self,
        snapshot: &SessionSnapshot,
        mission: &Mission,
        excluded: &[usize],
    ) -> PolicyDecision;
}

/// Built-in strategies for automated playthroughs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlayStrategy {
    Cautious,
    Ghost,
    Showboat,
    Reckless,
    FirstChoice,
    Random,
}

impl PlayStrategy {
    pub const ALL: [Self; 6] = [
        Self::Cautious,
        Self::Ghost,
        Self::Showboat,
        Self::Reckless,
        Self::FirstChoice,
        Self::Random,
    ];

    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            PlayStrategy::Cautious => "cautious",
            PlayStrategy::Ghost => "ghost",
            PlayStrategy::Showboat => "showboat",
            PlayStrategy::Reckless => "reckless",
            PlayStrategy::FirstChoice => "first-choice",
            PlayStrategy::Random => "random",
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            PlayStrategy::Cautious => "Cautious",
            PlayStrategy::Ghost => "Ghost",
            PlayStrategy::Showboat => "Showboat",
            PlayStrategy::Reckless => "Reckless",
            PlayStrategy::FirstChoice => "First Choice",
            PlayStrategy::Random => "Random",
        }
    }

    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            PlayStrategy::Cautious => "Take the choice with the best hp delta",
            PlayStrategy::Ghost => "Chase stealth, avoiding known-lethal choices",
            PlayStrategy::Showboat => "Chase style, avoiding known-lethal choices",
            PlayStrategy::Reckless => "Take the choice with the worst hp delta",
            PlayStrategy::FirstChoice => "Always take the first available choice",
            PlayStrategy::Random => "Pick uniformly with a seeded ChaCha20 stream",
        }
    }

    #[must_use]
    pub fn create_policy(self, seed: u64) -> Box<dyn PlayerPolicy + Send> {
        match self {
            PlayStrategy::Cautious => Box::new(CautiousPolicy),
            PlayStrategy::Ghost => Box::new(GhostPolicy),
            PlayStrategy::Showboat => Box::new(ShowboatPolicy),
            PlayStrategy::Reckless => Box::new(RecklessPolicy),
            PlayStrategy::FirstChoice => Box::new(FirstChoicePolicy),
            PlayStrategy::Random => Box::new(RandomPolicy::new(seed)),
        }
    }
}

impl fmt::Display for PlayStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for PlayStrategy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|strategy| strategy.key() == key)
            .ok_or_else(|| anyhow::anyhow!("unknown strategy '{s}'"))
    }
}

struct CautiousPolicy;
struct GhostPolicy;
struct ShowboatPolicy;
struct RecklessPolicy;
struct FirstChoicePolicy;

struct RandomPolicy {
    rng: ChaCha20Rng,
}

impl RandomPolicy {
    fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
        }
    }
}

impl PlayerPolicy for CautiousPolicy {
    fn name(&self) -> &'static str {
        "Cautious"
    }

    fn pick_choice(
        &mut self,
        _snapshot: &SessionSnapshot,
        mission: &Mission,
        excluded: &[usize],
    ) -> PolicyDecision {
        scored_decision(mission, excluded, "hp", Consequences::hp_delta)
    }
}

impl PlayerPolicy for GhostPolicy {
    fn name(&self) -> &'static str {
        "Ghost"
    }

    fn pick_choice(
        &mut self,
        snapshot: &SessionSnapshot,
        mission: &Mission,
        excluded: &[usize],
    ) -> PolicyDecision {
        let hp = snapshot.stats.hp;
        scored_decision(mission, excluded, "stealth", |c| {
            survivable_score(hp, c, c.stealth_delta())
        })
    }
}

impl PlayerPolicy for ShowboatPolicy {
    fn name(&self) -> &'static str {
        "Showboat"
    }

    fn pick_choice(
        &mut self,
        snapshot: &SessionSnapshot,
        mission: &Mission,
        excluded: &[usize],
    ) -> PolicyDecision {
        let hp = snapshot.stats.hp;
        scored_decision(mission, excluded, "style", |c| {
            survivable_score(hp, c, c.style_delta())
        })
    }
}

impl PlayerPolicy for RecklessPolicy {
    fn name(&self) -> &'static str {
        "Reckless"
    }

    fn pick_choice(
        &mut self,
        _snapshot: &SessionSnapshot,
        mission: &Mission,
        excluded: &[usize],
    ) -> PolicyDecision {
        scored_decision(mission, excluded, "damage", |c| -c.hp_delta())
    }
}

impl PlayerPolicy for FirstChoicePolicy {
    fn name(&self) -> &'static str {
        "First Choice"
    }

    fn pick_choice(
        &mut self,
        _snapshot: &SessionSnapshot,
        mission: &Mission,
        excluded: &[usize],
    ) -> PolicyDecision {
        let idx = available(mission, excluded).next().unwrap_or(0);
        PolicyDecision::new(idx, None)
    }
}

impl PlayerPolicy for RandomPolicy {
    fn name(&self) -> &'static str {
        "Random"
    }

    fn pick_choice(
        &mut self,
        _snapshot: &SessionSnapshot,
        mission: &Mission,
        excluded: &[usize],
    ) -> PolicyDecision {
        let options: Vec<usize> = available(mission, excluded).collect();
        if options.is_empty() {
            return PolicyDecision::new(0, Some("no choices".to_string()));
        }
        let roll = self.rng.gen_range(0..options.len());
        PolicyDecision::new(
            options[roll],
            Some(format!("roll {roll} of {}", options.len())),
        )
    }
}

fn available<'a>(mission: &'a Mission, excluded: &'a [usize]) -> impl Iterator<Item = usize> + 'a {
    (0..mission.choices.len()).filter(move |idx| !excluded.contains(idx))
}

/// Highest score among the remaining choices; the earliest index wins ties.
fn scored_decision<F>(
    mission: &Mission,
    excluded: &[usize],
    metric: &str,
    score: F,
) -> PolicyDecision
where
    F: Fn(&Consequences) -> i32,
{
    let mut best: Option<(usize, i32)> = None;
    for idx in available(mission, excluded) {
        let value = score(&mission.choices[idx].consequences);
        if best.is_none_or(|(_, top)| value > top) {
            best = Some((idx, value));
        }
    }
    match best {
        Some((idx, value)) => PolicyDecision::new(idx, Some(format!("{metric} {value}"))),
        None => PolicyDecision::new(0, Some("no choices".to_string())),
    }
}

fn survivable_score(hp: i32, consequences: &Consequences, reward: i32) -> i32 {
    if hp.saturating_add(consequences.hp_delta()) <= 0 {
        i32::MIN
    } else {
        reward
    }
}
