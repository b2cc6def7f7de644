//! Birthday Protocol Session Engine
//!
//! Platform-agnostic core for the Birthday Protocol narrative mission game.
//! This crate owns the campaign content, stat resolution, the session state
//! machine and the ending sequence, without UI or network dependencies.

pub mod briefing;
pub mod config;
pub mod constants;
pub mod content;
pub mod data;
pub mod driver;
pub mod ending;
pub mod loadouts;
pub mod result;
pub mod session;
pub mod stats;

use anyhow::Context;

// Re-export commonly used types
pub use briefing::{
    BriefingError, BriefingProvider, BriefingRequest, BriefingTicket, StaticBriefing,
    briefing_prompt, fetch_briefing,
};
pub use config::{BriefingConfig, ConfigError, EndingTiming, EngineConfig, OperatorProfile};
pub use content::{ContentError, ContentStore};
pub use data::{Choice, Consequences, EncounterType, InventoryItem, Mission, MissionData};
pub use driver::SessionDriver;
pub use ending::{EndingSequence, EndingStage, EndingStep, ScheduledTick};
pub use loadouts::{Loadout, LoadoutId, LoadoutList, ParseLoadoutError};
pub use result::{Outcome, ResultSummary, classify_outcome, result_summary};
pub use session::{
    Advance, BriefingDelivery, Checkpoint, GamePhase, Session, SessionError, SessionSnapshot,
};
pub use stats::{Resolution, Stats, resolve_consequences};

/// Trait for abstracting content loading operations
/// Platform-specific implementations should provide this
pub trait ContentLoader {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the validated mission and loadout tables
    ///
    /// # Errors
    ///
    /// Returns an error if the content cannot be loaded or fails validation.
    fn load_content(&self) -> Result<ContentStore, Self::Error>;

    /// Load engine configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded or parsed.
    fn load_config(&self) -> Result<EngineConfig, Self::Error>;
}

/// Loader backed by the assets embedded in this crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticContent;

impl ContentLoader for StaticContent {
    type Error = ContentError;

    fn load_content(&self) -> Result<ContentStore, Self::Error> {
        ContentStore::load_from_static()
    }

    fn load_config(&self) -> Result<EngineConfig, Self::Error> {
        Ok(EngineConfig::load_from_static())
    }
}

/// Entry point for creating sessions from a content source
pub struct ProtocolEngine<L>
where
    L: ContentLoader,
{
    loader: L,
}

impl<L> ProtocolEngine<L>
where
    L: ContentLoader,
{
    /// Create a new engine with the provided content loader
    pub const fn new(loader: L) -> Self {
        Self { loader }
    }

    /// Construct a fresh session in START.
    ///
    /// # Errors
    ///
    /// Returns an error if content or configuration cannot be loaded, or the
    /// configuration fails validation.
    pub fn create_session(&self) -> anyhow::Result<Session> {
        let content = self
            .loader
            .load_content()
            .context("loading campaign content")?;
        let config = self
            .loader
            .load_config()
            .context("loading engine configuration")?;
        config.validate().context("validating engine configuration")?;
        log::debug!(
            "Created session with {} missions for {}",
            content.mission_count(),
            config.operator.name
        );
        Ok(Session::new(content, config))
    }

    /// Construct a session already bound to a briefing provider.
    ///
    /// # Errors
    ///
    /// Same as [`ProtocolEngine::create_session`].
    pub fn create_driver(
        &self,
        provider: std::sync::Arc<dyn BriefingProvider>,
    ) -> anyhow::Result<SessionDriver> {
        Ok(SessionDriver::new(self.create_session()?, provider))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[derive(Clone, Copy, Default)]
    struct BrokenConfigLoader;

    impl ContentLoader for BrokenConfigLoader {
        type Error = ContentError;

        fn load_content(&self) -> Result<ContentStore, Self::Error> {
            ContentStore::load_from_static()
        }

        fn load_config(&self) -> Result<EngineConfig, Self::Error> {
            let mut config = EngineConfig::default();
            config.ending.progress_step = 0;
            Ok(config)
        }
    }

    #[derive(Clone, Copy, Default)]
    struct EmptyLoader;

    impl ContentLoader for EmptyLoader {
        type Error = ContentError;

        fn load_content(&self) -> Result<ContentStore, Self::Error> {
            ContentStore::new(LoadoutList::empty(), MissionData::empty())
        }

        fn load_config(&self) -> Result<EngineConfig, Self::Error> {
            Ok(EngineConfig::default())
        }
    }

    #[test]
    fn engine_creates_session_from_static_content() {
        let engine = ProtocolEngine::new(StaticContent);
        let session = engine.create_session().unwrap();
        assert_eq!(session.phase(), GamePhase::Start);
        assert_eq!(session.content().mission_count(), 10);
        assert_eq!(session.config().operator.callsign, "RANA-43");
    }

    #[test]
    fn invalid_config_is_reported_with_context() {
        let engine = ProtocolEngine::new(BrokenConfigLoader);
        let err = engine.create_session().unwrap_err();
        assert!(err.to_string().contains("validating engine configuration"));
        assert!(err.downcast_ref::<ConfigError>().is_some());
    }

    #[test]
    fn empty_content_is_fatal() {
        let engine = ProtocolEngine::new(EmptyLoader);
        let err = engine.create_session().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ContentError>(),
            Some(ContentError::NoMissions)
        ));
    }

    #[test]
    fn engine_builds_driver() {
        let engine = ProtocolEngine::new(StaticContent);
        let driver = engine
            .create_driver(Arc::new(StaticBriefing::default()))
            .unwrap();
        assert_eq!(driver.provider_name(), "static");
    }
}
