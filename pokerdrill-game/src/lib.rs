//! Pokerdrill Quiz Engine
//!
//! Platform-agnostic progression core for the Pokerdrill poker decision
//! trainer. This crate provides the leveling, achievement, scenario
//! selection, and session aggregation logic without UI or platform-specific
//! dependencies.

pub mod achievements;
pub mod constants;
pub mod data;
pub mod leveling;
pub mod result;
pub mod selector;
pub mod session;
pub mod state;

// Re-export commonly used types
pub use achievements::{
    ACHIEVEMENTS, AchievementCategory, AchievementDef, AchievementProgress, AchievementStatus,
    by_category, find as find_achievement, newly_unlocked, progress_for, statuses,
};
pub use data::{
    ActionType, Card, CatalogError, Difficulty, HistoryEntry, Position, Rank, Scenario,
    ScenarioData, Seat, Street, Suit,
};
pub use leveling::{
    MAX_LEVEL, difficulty_multiplier, format_xp, is_difficulty_unlocked, level_for_xp,
    level_increased, level_progress, next_difficulty_unlock, required_level, streak_bonus,
    unlocked_difficulties, xp_for_level, xp_reward, xp_to_next_level,
};
pub use result::{SessionSummary, session_summary};
pub use selector::{build_session, select_random, select_weighted};
pub use session::{AnswerFeedback, QuizTrainer};
pub use state::{
    DifficultyFilter, ParseFilterError, PlayerProgress, PlayerSettings, PlayerStats, SaveDocument,
    Session, SessionConfig, SessionResult, SettingsPatch, StreetFilter, Tally,
};

/// Trait for abstracting catalog loading operations.
/// Platform-specific implementations should provide this.
pub trait CatalogLoader {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the authored scenario catalog from the platform-specific source.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be loaded or fails validation.
    fn load_scenarios(&self) -> Result<ScenarioData, Self::Error>;
}

/// Trait for abstracting save/load of the player document.
/// Platform-specific implementations should provide this.
pub trait ProgressStore {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Persist the player document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be saved.
    fn save(&self, document: &SaveDocument) -> Result<(), Self::Error>;

    /// Load the previously persisted player document, `None` when no prior
    /// state exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be loaded.
    fn load(&self) -> Result<Option<SaveDocument>, Self::Error>;

    /// Delete the persisted player document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be deleted.
    fn clear(&self) -> Result<(), Self::Error>;
}

/// Binds a [`QuizTrainer`] to an injected storage collaborator: the trainer
/// stays pure and testable, the engine persists the player document after
/// every successful mutation.
pub struct QuizEngine<S>
where
    S: ProgressStore,
{
    trainer: QuizTrainer,
    store: S,
}

impl<S> QuizEngine<S>
where
    S: ProgressStore,
{
    /// Create an engine over a catalog, restoring any persisted document.
    ///
    /// # Errors
    ///
    /// Returns an error if the persisted document cannot be loaded.
    pub fn new(catalog: ScenarioData, store: S, seed: u64) -> Result<Self, S::Error> {
        let mut trainer = QuizTrainer::new(catalog, seed);
        if let Some(document) = store.load()? {
            trainer.restore(document);
        }
        Ok(Self { trainer, store })
    }

    /// Create an engine whose catalog comes from a loader collaborator.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be loaded or the persisted
    /// document cannot be read.
    pub fn from_loader<L>(loader: &L, store: S, seed: u64) -> Result<Self, anyhow::Error>
    where
        L: CatalogLoader,
    {
        let catalog = loader.load_scenarios()?;
        Ok(Self::new(catalog, store, seed)?)
    }

    /// Start a session and persist. See [`QuizTrainer::start_session`].
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be saved.
    pub fn start_session(&mut self, config: SessionConfig) -> Result<Option<Scenario>, S::Error> {
        let scenario = self.trainer.start_session(config).cloned();
        self.persist()?;
        Ok(scenario)
    }

    /// Score an answer and persist the updated progress. See
    /// [`QuizTrainer::submit_answer`].
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be saved.
    pub fn submit_answer(&mut self, action: ActionType) -> Result<Option<AnswerFeedback>, S::Error> {
        let feedback = self.trainer.submit_answer(action);
        if feedback.is_some() {
            self.persist()?;
        }
        Ok(feedback)
    }

    /// Advance to the next scenario (or complete the session) and persist.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be saved.
    pub fn advance_to_next(&mut self) -> Result<Option<Scenario>, S::Error> {
        let scenario = self.trainer.advance_to_next().cloned();
        self.persist()?;
        Ok(scenario)
    }

    /// End the active session and persist.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be saved.
    pub fn end_session(&mut self) -> Result<(), S::Error> {
        self.trainer.end_session();
        self.persist()
    }

    /// Reset all progress, dropping the persisted document first so a
    /// failed rewrite cannot resurrect stale state.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored document cannot be cleared or saved.
    pub fn reset_progress(&mut self) -> Result<(), S::Error> {
        self.trainer.reset_progress();
        self.store.clear()?;
        self.persist()
    }

    /// Apply a settings patch and persist.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be saved.
    pub fn update_settings(&mut self, patch: SettingsPatch) -> Result<(), S::Error> {
        self.trainer.update_settings(patch);
        self.persist()
    }

    fn persist(&self) -> Result<(), S::Error> {
        self.store.save(&self.trainer.save_document())
    }

    /// Borrow the underlying trainer for read access.
    #[must_use]
    pub const fn trainer(&self) -> &QuizTrainer {
        &self.trainer
    }

    #[must_use]
    pub const fn progress(&self) -> &PlayerProgress {
        self.trainer.progress()
    }

    #[must_use]
    pub const fn settings(&self) -> &PlayerSettings {
        self.trainer.settings()
    }

    #[must_use]
    pub fn session(&self) -> Option<&Session> {
        self.trainer.session()
    }

    #[must_use]
    pub fn current_scenario(&self) -> Option<&Scenario> {
        self.trainer.current_scenario()
    }

    /// Drain the achievement notification queue. Purely in-memory; nothing
    /// to persist.
    pub fn take_pending_achievements(&mut self) -> Vec<&'static AchievementDef> {
        self.trainer.take_pending_achievements()
    }

    /// Consume the engine, returning the underlying trainer.
    #[must_use]
    pub fn into_trainer(self) -> QuizTrainer {
        self.trainer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::convert::Infallible;
    use std::rc::Rc;

    #[derive(Clone, Default)]
    struct MemoryStore {
        document: Rc<RefCell<Option<SaveDocument>>>,
    }

    impl ProgressStore for MemoryStore {
        type Error = Infallible;

        fn save(&self, document: &SaveDocument) -> Result<(), Self::Error> {
            *self.document.borrow_mut() = Some(document.clone());
            Ok(())
        }

        fn load(&self) -> Result<Option<SaveDocument>, Self::Error> {
            Ok(self.document.borrow().clone())
        }

        fn clear(&self) -> Result<(), Self::Error> {
            *self.document.borrow_mut() = None;
            Ok(())
        }
    }

    #[derive(Clone, Copy, Default)]
    struct FixtureLoader;

    impl CatalogLoader for FixtureLoader {
        type Error = CatalogError;

        fn load_scenarios(&self) -> Result<ScenarioData, Self::Error> {
            ScenarioData::from_scenarios(vec![fixture_scenario("f1"), fixture_scenario("f2")])
        }
    }

    fn fixture_scenario(id: &str) -> Scenario {
        Scenario {
            id: id.to_string(),
            difficulty: Difficulty::Beginner,
            street: Street::Preflop,
            hero_position: Position::BTN,
            hero_cards: [
                Card {
                    rank: Rank::Ace,
                    suit: Suit::Clubs,
                },
                Card {
                    rank: Rank::King,
                    suit: Suit::Clubs,
                },
            ],
            community_cards: Vec::new(),
            pot: 15,
            players: Vec::new(),
            action_history: Vec::new(),
            valid_actions: vec![ActionType::Fold, ActionType::Raise],
            optimal_action: ActionType::Raise,
            optimal_amount: None,
            explanation: String::new(),
            key_concept: String::new(),
            tags: Vec::new(),
        }
    }

    fn beginner_config(count: u32) -> SessionConfig {
        SessionConfig {
            question_count: count,
            difficulty: DifficultyFilter::Only(Difficulty::Beginner),
            street_filter: StreetFilter::All,
            topics: Vec::new(),
        }
    }

    #[test]
    fn engine_persists_after_each_mutation() {
        let store = MemoryStore::default();
        let mut engine =
            QuizEngine::from_loader(&FixtureLoader, store.clone(), 0xABCD).unwrap();

        engine.start_session(beginner_config(2)).unwrap();
        engine.submit_answer(ActionType::Raise).unwrap().unwrap();

        let saved = store.load().unwrap().expect("document saved");
        assert_eq!(saved.progress.xp, 10);
        assert_eq!(saved.progress.stats.total_questions_answered, 1);
    }

    #[test]
    fn engine_round_trips_progress_across_restarts() {
        let store = MemoryStore::default();
        {
            let mut engine =
                QuizEngine::new(FixtureLoader.load_scenarios().unwrap(), store.clone(), 7)
                    .unwrap();
            engine.start_session(beginner_config(1)).unwrap();
            engine.submit_answer(ActionType::Raise).unwrap();
            engine.advance_to_next().unwrap();
        }

        let reloaded =
            QuizEngine::new(FixtureLoader.load_scenarios().unwrap(), store, 7).unwrap();
        assert_eq!(reloaded.progress().xp, 10);
        assert_eq!(reloaded.progress().stats.total_sessions, 1);
        assert!(reloaded.session().is_none());
    }

    #[test]
    fn loaded_documents_are_normalized() {
        let store = MemoryStore::default();
        let mut stale = SaveDocument::default();
        stale.progress.xp = 300;
        stale.progress.level = 1; // stale cache
        store.save(&stale).unwrap();

        let engine =
            QuizEngine::new(FixtureLoader.load_scenarios().unwrap(), store, 1).unwrap();
        assert_eq!(engine.progress().level, 3);
    }

    #[test]
    fn reset_drops_the_stored_document_before_rewriting() {
        let store = MemoryStore::default();
        let mut engine =
            QuizEngine::new(FixtureLoader.load_scenarios().unwrap(), store.clone(), 2).unwrap();
        engine.start_session(beginner_config(1)).unwrap();
        engine.submit_answer(ActionType::Raise).unwrap();

        engine.reset_progress().unwrap();
        let saved = store.load().unwrap().expect("defaults saved");
        assert_eq!(saved.progress, PlayerProgress::default());
        assert_eq!(engine.progress().xp, 0);
    }
}
