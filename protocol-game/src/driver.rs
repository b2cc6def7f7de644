//! Async driver that pairs a session with a briefing provider
use std::sync::Arc;

use crate::briefing::{BriefingProvider, BriefingRequest, fetch_briefing};
use crate::ending::{EndingStage, EndingStep};
use crate::loadouts::LoadoutId;
use crate::session::{Advance, BriefingDelivery, Session, SessionError, SessionSnapshot};
use crate::stats::Resolution;

/// Runs a [`Session`] with briefings fetched inline, so callers never observe
/// `MISSION_LOADING` between calls.
pub struct SessionDriver {
    session: Session,
    provider: Arc<dyn BriefingProvider>,
}

impl SessionDriver {
    #[must_use]
    pub fn new(session: Session, provider: Arc<dyn BriefingProvider>) -> Self {
        Self { session, provider }
    }

    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// Mutable access for callers that deliver briefings themselves.
    pub const fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    #[must_use]
    pub fn into_session(self) -> Session {
        self.session
    }

    #[must_use]
    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        self.session.snapshot()
    }

    async fn deliver(&mut self, request: BriefingRequest) -> BriefingDelivery {
        let config = self.session.config().briefing.clone();
        let text = fetch_briefing(self.provider.as_ref(), &request, &config).await;
        self.session.complete_briefing(request.ticket, text)
    }

    /// # Errors
    ///
    /// Returns [`SessionError::InvalidTransition`] outside START.
    pub fn open_loadout(&mut self) -> Result<(), SessionError> {
        self.session.open_loadout()
    }

    /// Pick a loadout and wait for the first briefing.
    ///
    /// # Errors
    ///
    /// Propagates the session's rejection of the loadout.
    pub async fn select_loadout(&mut self, id: LoadoutId) -> Result<(), SessionError> {
        let request = self.session.select_loadout(id)?;
        self.deliver(request).await;
        Ok(())
    }

    /// # Errors
    ///
    /// Propagates [`Session::resolve_choice`] errors.
    pub fn resolve_choice(&mut self, index: usize) -> Result<Resolution, SessionError> {
        self.session.resolve_choice(index)
    }

    /// Advance past the debrief, fetching the next briefing when there is one.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidTransition`] outside DEBRIEFING.
    pub async fn next_mission(&mut self) -> Result<Advance, SessionError> {
        let advance = self.session.next_mission()?;
        if let Advance::Loading(request) = &advance {
            self.deliver(request.clone()).await;
        }
        Ok(advance)
    }

    /// # Errors
    ///
    /// Returns [`SessionError::InvalidTransition`] outside GAME_OVER.
    pub fn retry_mission(&mut self) -> Result<(), SessionError> {
        self.session.retry_mission()
    }

    pub fn hard_restart(&mut self) {
        self.session.hard_restart();
    }

    /// Play the ending sequence to rest, calling `observer` after every tick.
    ///
    /// Every wait and tick is read from the live session, never from a
    /// captured snapshot.
    pub async fn play_ending<F>(&mut self, mut observer: F) -> EndingStage
    where
        F: FnMut(&SessionSnapshot),
    {
        while let Some(tick) = self.session.next_ending_tick() {
            if !tick.delay.is_zero() {
                tokio::time::sleep(tick.delay).await;
            }
            if self.session.ending_tick(tick.epoch) == EndingStep::Ignored {
                break;
            }
            observer(&self.session.snapshot());
        }
        self.session.ending().stage()
    }
}

impl std::fmt::Debug for SessionDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionDriver")
            .field("session", &self.session)
            .field("provider", &self.provider.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::briefing::{BriefingError, StaticBriefing};
    use crate::config::{EndingTiming, EngineConfig};
    use crate::content::ContentStore;
    use crate::session::GamePhase;
    use async_trait::async_trait;

    struct Echo;

    #[async_trait]
    impl BriefingProvider for Echo {
        fn name(&self) -> &'static str {
            "echo"
        }

        async fn generate(&self, title: &str, operator: &str) -> Result<String, BriefingError> {
            Ok(format!("{operator}: {title}"))
        }
    }

    fn driver(provider: Arc<dyn BriefingProvider>) -> SessionDriver {
        let content = ContentStore::load_from_static().unwrap();
        let config = EngineConfig {
            ending: EndingTiming {
                tick_interval_ms: 1,
                reveal_delay_ms: 1,
                ..EndingTiming::default()
            },
            ..EngineConfig::default()
        };
        SessionDriver::new(Session::new(content, config), provider)
    }

    #[test]
    fn loadout_skips_past_mission_loading() {
        let mut driver = driver(Arc::new(Echo));
        tokio_test::block_on(driver.select_loadout(LoadoutId::CicdGhost)).unwrap();
        let snap = driver.snapshot();
        assert_eq!(snap.phase, GamePhase::MissionActive);
        assert_eq!(
            snap.briefing,
            "Mansoor Rana: TRAINING: HELLO WORLD EXTRACTION"
        );
        assert_eq!(driver.provider_name(), "echo");
    }

    #[test]
    fn full_campaign_reaches_reveal() {
        let mut driver = driver(Arc::new(StaticBriefing::default()));
        tokio_test::block_on(async {
            driver.select_loadout(LoadoutId::CicdGhost).await.unwrap();
            loop {
                let resolution = driver.resolve_choice(1).unwrap();
                assert!(!resolution.is_lethal());
                if let Advance::Ending(_) = driver.next_mission().await.unwrap() {
                    break;
                }
            }
            let mut ticks = 0;
            let stage = driver.play_ending(|_| ticks += 1).await;
            assert_eq!(stage, EndingStage::Reveal);
            assert_eq!(ticks, 21);
        });
        assert_eq!(driver.snapshot().ending_progress, 100);
        assert!(driver.session().outcome().is_some());
    }

    #[test]
    fn ending_without_campaign_returns_idle() {
        let mut driver = driver(Arc::new(StaticBriefing::default()));
        let stage = tokio_test::block_on(driver.play_ending(|_| {}));
        assert_eq!(stage, EndingStage::Idle);
    }
}
