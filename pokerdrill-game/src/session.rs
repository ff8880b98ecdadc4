//! Session lifecycle and progress aggregation.
//!
//! `QuizTrainer` owns all mutable state (progress, settings, the active
//! session, the pending-notification queue) and is the only writer. Every
//! answered question runs one transaction (score, reward, credit, tally,
//! unlock, re-evaluate achievements) in that order, completely, before the
//! next scenario may be drawn.
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use std::collections::HashSet;

use crate::achievements::{self, AchievementDef};
use crate::data::{ActionType, Difficulty, Scenario, ScenarioData};
use crate::leveling;
use crate::result::{SessionSummary, session_summary};
use crate::selector;
use crate::state::{
    PlayerProgress, PlayerSettings, SaveDocument, Session, SessionConfig, SessionResult,
    SettingsPatch,
};

/// Deterministic session id from the trainer seed and a per-trainer ordinal
/// (FNV-1a mix), so replays under a fixed seed reproduce their ids.
fn derive_session_id(seed: u64, ordinal: u64) -> String {
    const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const FNV_PRIME: u64 = 0x0100_0000_01b3;
    let mut hash = FNV_OFFSET;
    for byte in seed.to_le_bytes().into_iter().chain(ordinal.to_le_bytes()) {
        hash = (hash ^ u64::from(byte)).wrapping_mul(FNV_PRIME);
    }
    format!("session-{hash:016x}")
}

/// Everything the presentation layer needs to render feedback for one
/// answered question.
#[derive(Debug, Clone)]
pub struct AnswerFeedback {
    pub correct: bool,
    pub chosen: ActionType,
    pub optimal: ActionType,
    pub explanation: String,
    pub key_concept: String,
    pub xp_earned: u64,
    /// Streak after this answer was applied.
    pub streak: u32,
    pub leveled_up: bool,
    pub level: u32,
    /// Tiers that opened because of this answer, in tier order.
    pub unlocked_difficulties: Vec<Difficulty>,
    /// Achievements that unlocked on this answer, in registry order.
    pub achievements: Vec<&'static AchievementDef>,
}

/// The progression core's aggregate state and its named operations.
#[derive(Debug, Clone)]
pub struct QuizTrainer {
    catalog: ScenarioData,
    progress: PlayerProgress,
    settings: PlayerSettings,
    session: Option<Session>,
    current: Option<Scenario>,
    answered: bool,
    pending: Vec<&'static AchievementDef>,
    used_ids: HashSet<String>,
    rng: ChaCha20Rng,
    seed: u64,
    sessions_started: u64,
}

impl QuizTrainer {
    /// Construct a trainer over a catalog with a deterministic seed.
    #[must_use]
    pub fn new(catalog: ScenarioData, seed: u64) -> Self {
        Self {
            catalog,
            progress: PlayerProgress::default(),
            settings: PlayerSettings::default(),
            session: None,
            current: None,
            answered: false,
            pending: Vec::new(),
            used_ids: HashSet::new(),
            rng: ChaCha20Rng::seed_from_u64(seed),
            seed,
            sessions_started: 0,
        }
    }

    /// Install a loaded save document, repairing its invariants first.
    pub fn restore(&mut self, document: SaveDocument) {
        let SaveDocument {
            mut progress,
            settings,
        } = document;
        progress.normalize();
        self.progress = progress;
        self.settings = settings;
    }

    /// Snapshot the persistent half of the trainer for the storage
    /// collaborator.
    #[must_use]
    pub fn save_document(&self) -> SaveDocument {
        SaveDocument {
            progress: self.progress.clone(),
            settings: self.settings.clone(),
        }
    }

    /// Deterministically reseed the random source.
    pub fn reseed(&mut self, seed: u64) {
        self.seed = seed;
        self.rng = ChaCha20Rng::seed_from_u64(seed);
    }

    /// Begin a new session, replacing any previous one, and serve its first
    /// scenario. `None` means the config's filters match nothing; the
    /// session is still active and the caller should relax filters or end
    /// it. Never an error.
    pub fn start_session(&mut self, config: SessionConfig) -> Option<&Scenario> {
        let ordinal = self.sessions_started;
        self.sessions_started += 1;
        let id = derive_session_id(self.seed, ordinal);
        log::info!("session {id} started");

        self.session = Some(Session::new(id, config));
        self.used_ids.clear();
        self.current = None;
        self.answered = false;
        self.draw_next()
    }

    /// Score the current scenario against the player's decision and run the
    /// full progression transaction. No-op (`None`) without an active
    /// session, without a current scenario, or when the current question was
    /// already answered.
    pub fn submit_answer(&mut self, action: ActionType) -> Option<AnswerFeedback> {
        if self.answered {
            return None;
        }
        let scenario = self.current.clone()?;
        let session = self.session.as_mut()?;
        if session.completed {
            return None;
        }

        // 1. Correctness, 2. reward from the streak walked in with.
        let correct = action == scenario.optimal_action;
        let streak_before = session.streak;
        let xp_earned = leveling::xp_reward(correct, scenario.difficulty, streak_before);

        // 3. Credit XP; the cached level is rewritten inside the credit.
        let leveled_up = self.progress.credit_xp(xp_earned);

        // 4. Session result, streak, stats. The best-streak stat sees the
        // post-answer streak, unlike the reward above.
        let streak = if correct { streak_before + 1 } else { 0 };
        session.streak = streak;
        session.results.push(SessionResult {
            scenario_id: scenario.id.clone(),
            action,
            correct,
            xp_earned,
        });
        self.progress.stats.record_answer(
            scenario.difficulty,
            scenario.street,
            scenario.optimal_action,
            correct,
        );
        self.progress.stats.note_streak(streak);

        // 5. Cascading difficulty unlocks; a multi-level jump may open more
        // than one tier at once.
        let mut unlocked_difficulties = Vec::new();
        if leveled_up {
            let level = self.progress.level;
            log::info!("level up: now level {level}");
            for difficulty in Difficulty::ALL {
                if leveling::is_difficulty_unlocked(difficulty, level)
                    && self.progress.unlock_difficulty(difficulty)
                {
                    log::info!("difficulty unlocked: {difficulty}");
                    unlocked_difficulties.push(difficulty);
                }
            }
        }

        // 6. Achievement re-evaluation against the fresh snapshots.
        let fresh = achievements::newly_unlocked(
            &self.progress.stats,
            &self.progress,
            &self.progress.achievements,
        );
        for definition in &fresh {
            log::info!("achievement unlocked: {}", definition.id);
            self.progress.achievements.push(definition.id.to_string());
            self.pending.push(*definition);
        }

        self.answered = true;
        Some(AnswerFeedback {
            correct,
            chosen: action,
            optimal: scenario.optimal_action,
            explanation: scenario.explanation.clone(),
            key_concept: scenario.key_concept.clone(),
            xp_earned,
            streak,
            leveled_up,
            level: self.progress.level,
            unlocked_difficulties,
            achievements: fresh,
        })
    }

    /// Serve the next scenario, or complete the session once the configured
    /// question count has been answered. Drawing retries with an empty
    /// exclusion set when the filtered pool is exhausted, so repeats beat
    /// mid-session failure.
    pub fn advance_to_next(&mut self) -> Option<&Scenario> {
        let session = self.session.as_ref()?;
        if session.completed {
            return None;
        }
        if session.questions_answered() >= session.config.question_count {
            self.end_session();
            return None;
        }
        self.draw_next()
    }

    fn draw_next(&mut self) -> Option<&Scenario> {
        let (config, answered) = {
            let session = self.session.as_ref()?;
            (session.config.clone(), session.questions_answered())
        };

        let mut picked = selector::select_random(&self.catalog, &config, &self.used_ids, &mut self.rng);
        if picked.is_none() && !self.used_ids.is_empty() {
            log::debug!("scenario pool exhausted; allowing repeats");
            self.used_ids.clear();
            picked = selector::select_random(&self.catalog, &config, &self.used_ids, &mut self.rng);
        }

        let scenario = picked?;
        self.used_ids.insert(scenario.id.clone());
        if let Some(session) = self.session.as_mut() {
            session.current_question_index = answered;
        }
        self.current = Some(scenario);
        self.answered = false;
        self.current.as_ref()
    }

    /// Complete the active session. Counts the session exactly once;
    /// calling without an active session, or again after completion, is a
    /// no-op.
    pub fn end_session(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if session.completed {
            return;
        }
        session.completed = true;
        self.progress.stats.total_sessions += 1;
        self.current = None;
        self.answered = false;
        log::info!(
            "session {} completed: {}/{} correct",
            session.id,
            session.correct_count(),
            session.questions_answered()
        );
    }

    /// Full overwrite back to zero progress. Clears the in-flight session
    /// and pending notifications atomically; settings are preferences and
    /// survive.
    pub fn reset_progress(&mut self) {
        self.progress = PlayerProgress::default();
        self.session = None;
        self.current = None;
        self.answered = false;
        self.pending.clear();
        self.used_ids.clear();
        log::info!("progress reset");
    }

    /// Apply a partial settings update.
    pub fn update_settings(&mut self, patch: SettingsPatch) {
        self.settings.apply(patch);
    }

    /// A session config seeded from the player's saved preferences.
    #[must_use]
    pub fn default_config(&self) -> SessionConfig {
        SessionConfig::from_settings(&self.settings)
    }

    #[must_use]
    pub const fn progress(&self) -> &PlayerProgress {
        &self.progress
    }

    #[must_use]
    pub const fn settings(&self) -> &PlayerSettings {
        &self.settings
    }

    #[must_use]
    pub const fn catalog(&self) -> &ScenarioData {
        &self.catalog
    }

    #[must_use]
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    #[must_use]
    pub fn session_active(&self) -> bool {
        self.session
            .as_ref()
            .is_some_and(|session| !session.completed)
    }

    #[must_use]
    pub fn current_scenario(&self) -> Option<&Scenario> {
        self.current.as_ref()
    }

    /// Summary of the active (or just-completed) session's results so far.
    #[must_use]
    pub fn session_summary(&self) -> Option<SessionSummary> {
        self.session
            .as_ref()
            .map(|session| session_summary(&session.results))
    }

    /// Achievement notifications not yet shown, in unlock order.
    #[must_use]
    pub fn pending_achievements(&self) -> &[&'static AchievementDef] {
        &self.pending
    }

    /// Drain the notification queue; the display layer calls this after
    /// showing the toasts.
    pub fn take_pending_achievements(&mut self) -> Vec<&'static AchievementDef> {
        std::mem::take(&mut self.pending)
    }
}
