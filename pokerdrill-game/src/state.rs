//! Persistent player state: progress, statistics, settings, and the
//! ephemeral session structures mutated by the trainer.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::constants::{DEFAULT_SESSION_LENGTH, MIN_SESSION_LENGTH};
use crate::data::{ActionType, Difficulty, Street};
use crate::leveling;

/// Raised when a persisted filter keyword cannot be interpreted.
#[derive(Debug, thiserror::Error)]
#[error("unknown filter value: {0}")]
pub struct ParseFilterError(String);

/// Difficulty constraint for a session: everything, or one tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(try_from = "String", into = "String")]
pub enum DifficultyFilter {
    #[default]
    All,
    Only(Difficulty),
}

impl DifficultyFilter {
    #[must_use]
    pub fn matches(self, difficulty: Difficulty) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => wanted == difficulty,
        }
    }
}

impl From<DifficultyFilter> for String {
    fn from(value: DifficultyFilter) -> Self {
        match value {
            DifficultyFilter::All => "all".to_string(),
            DifficultyFilter::Only(difficulty) => difficulty.as_str().to_string(),
        }
    }
}

impl TryFrom<String> for DifficultyFilter {
    type Error = ParseFilterError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value == "all" {
            return Ok(Self::All);
        }
        Difficulty::from_str(&value)
            .map(Self::Only)
            .map_err(|()| ParseFilterError(value))
    }
}

impl fmt::Display for DifficultyFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Only(difficulty) => f.write_str(difficulty.as_str()),
        }
    }
}

/// Street constraint for a session. `Postflop` keeps every street except
/// preflop; a specific street keeps only itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(try_from = "String", into = "String")]
pub enum StreetFilter {
    #[default]
    All,
    Postflop,
    Only(Street),
}

impl StreetFilter {
    #[must_use]
    pub fn matches(self, street: Street) -> bool {
        match self {
            Self::All => true,
            Self::Postflop => street.is_postflop(),
            Self::Only(wanted) => wanted == street,
        }
    }
}

impl From<StreetFilter> for String {
    fn from(value: StreetFilter) -> Self {
        match value {
            StreetFilter::All => "all".to_string(),
            StreetFilter::Postflop => "postflop".to_string(),
            StreetFilter::Only(street) => street.as_str().to_string(),
        }
    }
}

impl TryFrom<String> for StreetFilter {
    type Error = ParseFilterError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "all" => Ok(Self::All),
            "postflop" => Ok(Self::Postflop),
            other => Street::from_str(other)
                .map(Self::Only)
                .map_err(|()| ParseFilterError(value)),
        }
    }
}

impl fmt::Display for StreetFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from(*self))
    }
}

/// Answered/correct pair for one breakdown bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    pub answered: u32,
    pub correct: u32,
}

impl Tally {
    pub fn record(&mut self, correct: bool) {
        self.answered += 1;
        if correct {
            self.correct += 1;
        }
    }
}

fn zero_table<K: Ord + Copy>(keys: &[K]) -> BTreeMap<K, Tally> {
    keys.iter().map(|key| (*key, Tally::default())).collect()
}

/// Aggregate lifetime statistics. Every breakdown table always carries every
/// key, so the sum-consistency invariant can be checked without key-presence
/// special cases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerStats {
    pub total_questions_answered: u32,
    pub total_correct: u32,
    pub best_streak: u32,
    pub total_sessions: u32,
    pub by_difficulty: BTreeMap<Difficulty, Tally>,
    pub by_street: BTreeMap<Street, Tally>,
    pub by_action: BTreeMap<ActionType, Tally>,
}

impl Default for PlayerStats {
    fn default() -> Self {
        Self {
            total_questions_answered: 0,
            total_correct: 0,
            best_streak: 0,
            total_sessions: 0,
            by_difficulty: zero_table(&Difficulty::ALL),
            by_street: zero_table(&Street::ALL),
            by_action: zero_table(&ActionType::ALL),
        }
    }
}

impl PlayerStats {
    /// Tally one answered question into the totals and all three breakdown
    /// tables. One scenario has exactly one difficulty, one street, and one
    /// target action, so a single event feeds every table.
    pub fn record_answer(
        &mut self,
        difficulty: Difficulty,
        street: Street,
        target_action: ActionType,
        correct: bool,
    ) {
        self.total_questions_answered += 1;
        if correct {
            self.total_correct += 1;
        }
        self.by_difficulty.entry(difficulty).or_default().record(correct);
        self.by_street.entry(street).or_default().record(correct);
        self.by_action.entry(target_action).or_default().record(correct);
    }

    /// Raise the lifetime best streak if the given run beats it.
    pub fn note_streak(&mut self, streak: u32) {
        if streak > self.best_streak {
            self.best_streak = streak;
        }
    }

    /// Overall accuracy as a rounded percentage, 0 when nothing was answered.
    #[must_use]
    pub fn accuracy_pct(&self) -> u8 {
        percentage(self.total_correct, self.total_questions_answered)
    }

    /// Re-seed any breakdown key a hand-edited or older save is missing.
    fn ensure_all_keys(&mut self) {
        for difficulty in Difficulty::ALL {
            self.by_difficulty.entry(difficulty).or_default();
        }
        for street in Street::ALL {
            self.by_street.entry(street).or_default();
        }
        for action in ActionType::ALL {
            self.by_action.entry(action).or_default();
        }
    }
}

/// Rounded integer percentage of `part` in `whole`, 0 for an empty whole.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub(crate) fn percentage(part: u32, whole: u32) -> u8 {
    if whole == 0 {
        return 0;
    }
    let pct = (f64::from(part) / f64::from(whole) * 100.0).round();
    pct.clamp(0.0, 100.0) as u8
}

/// Long-lived player progression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerProgress {
    /// Cached `leveling::level_for_xp(xp)`; rewritten on every credit and
    /// repaired on load, never trusted stale.
    pub level: u32,
    pub xp: u64,
    /// Unlocked achievement ids in unlock order.
    pub achievements: Vec<String>,
    pub stats: PlayerStats,
    /// Unlocked tiers in unlock order; monotonically growing.
    pub unlocked_difficulties: Vec<Difficulty>,
}

impl Default for PlayerProgress {
    fn default() -> Self {
        Self {
            level: 1,
            xp: 0,
            achievements: Vec::new(),
            stats: PlayerStats::default(),
            unlocked_difficulties: vec![Difficulty::Beginner],
        }
    }
}

impl PlayerProgress {
    /// Credit XP and rewrite the cached level. Returns true when the credit
    /// crossed at least one level threshold.
    pub fn credit_xp(&mut self, amount: u64) -> bool {
        let previous = self.xp;
        self.xp += amount;
        self.level = leveling::level_for_xp(self.xp);
        leveling::level_increased(previous, self.xp)
    }

    /// Add a tier to the unlocked set. Returns true when it was new.
    pub fn unlock_difficulty(&mut self, difficulty: Difficulty) -> bool {
        if self.unlocked_difficulties.contains(&difficulty) {
            return false;
        }
        self.unlocked_difficulties.push(difficulty);
        true
    }

    #[must_use]
    pub fn is_difficulty_unlocked(&self, difficulty: Difficulty) -> bool {
        self.unlocked_difficulties.contains(&difficulty)
    }

    /// Repair invariants on a loaded document: recompute the cached level,
    /// drop duplicate achievement ids (keeping first occurrence), guarantee
    /// the beginner tier, and re-seed missing breakdown keys.
    pub fn normalize(&mut self) {
        self.level = leveling::level_for_xp(self.xp);
        let mut seen = std::collections::HashSet::new();
        self.achievements.retain(|id| seen.insert(id.clone()));
        if !self.unlocked_difficulties.contains(&Difficulty::Beginner) {
            self.unlocked_difficulties.insert(0, Difficulty::Beginner);
        }
        let mut seen_tiers = std::collections::HashSet::new();
        self.unlocked_difficulties
            .retain(|tier| seen_tiers.insert(*tier));
        self.stats.ensure_all_keys();
    }
}

/// User preferences. Not progression: these survive a progress reset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSettings {
    pub default_session_length: u32,
    pub default_difficulty: DifficultyFilter,
    pub street_filter: StreetFilter,
    pub topics: Vec<String>,
    pub sound_enabled: bool,
    pub reduced_motion: bool,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            default_session_length: DEFAULT_SESSION_LENGTH,
            default_difficulty: DifficultyFilter::Only(Difficulty::Beginner),
            street_filter: StreetFilter::All,
            topics: Vec::new(),
            sound_enabled: true,
            reduced_motion: false,
        }
    }
}

/// Partial settings update; `None` fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsPatch {
    pub default_session_length: Option<u32>,
    pub default_difficulty: Option<DifficultyFilter>,
    pub street_filter: Option<StreetFilter>,
    pub topics: Option<Vec<String>>,
    pub sound_enabled: Option<bool>,
    pub reduced_motion: Option<bool>,
}

impl PlayerSettings {
    pub fn apply(&mut self, patch: SettingsPatch) {
        if let Some(length) = patch.default_session_length {
            self.default_session_length = length.max(MIN_SESSION_LENGTH);
        }
        if let Some(difficulty) = patch.default_difficulty {
            self.default_difficulty = difficulty;
        }
        if let Some(street) = patch.street_filter {
            self.street_filter = street;
        }
        if let Some(topics) = patch.topics {
            self.topics = topics;
        }
        if let Some(sound) = patch.sound_enabled {
            self.sound_enabled = sound;
        }
        if let Some(reduced) = patch.reduced_motion {
            self.reduced_motion = reduced;
        }
    }
}

/// Filters and length for one quiz session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub question_count: u32,
    pub difficulty: DifficultyFilter,
    pub street_filter: StreetFilter,
    /// Topic tags; empty means unrestricted.
    pub topics: Vec<String>,
}

impl SessionConfig {
    /// Session defaults drawn from the player's saved preferences.
    #[must_use]
    pub fn from_settings(settings: &PlayerSettings) -> Self {
        Self {
            question_count: settings.default_session_length,
            difficulty: settings.default_difficulty,
            street_filter: settings.street_filter,
            topics: settings.topics.clone(),
        }
    }

    /// Clamp out-of-range requests to the supported minimum.
    pub fn sanitize(&mut self) {
        self.question_count = self.question_count.max(MIN_SESSION_LENGTH);
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::from_settings(&PlayerSettings::default())
    }
}

/// One answered question, immutable once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionResult {
    pub scenario_id: String,
    pub action: ActionType,
    pub correct: bool,
    pub xp_earned: u64,
}

/// One quiz run. Created at session start, replaced by the next start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub config: SessionConfig,
    pub results: Vec<SessionResult>,
    pub current_question_index: u32,
    /// Consecutive correct answers; reset to 0 by any incorrect answer.
    pub streak: u32,
    pub completed: bool,
}

impl Session {
    #[must_use]
    pub fn new(id: String, mut config: SessionConfig) -> Self {
        config.sanitize();
        Self {
            id,
            config,
            results: Vec::new(),
            current_question_index: 0,
            streak: 0,
            completed: false,
        }
    }

    #[must_use]
    pub fn correct_count(&self) -> u32 {
        u32::try_from(self.results.iter().filter(|result| result.correct).count()).unwrap_or(0)
    }

    #[must_use]
    pub fn questions_answered(&self) -> u32 {
        u32::try_from(self.results.len()).unwrap_or(u32::MAX)
    }
}

/// The single serialized document exchanged with the persistence
/// collaborator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveDocument {
    pub progress: PlayerProgress,
    pub settings: PlayerSettings,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filters_round_trip_through_strings() {
        for filter in [
            DifficultyFilter::All,
            DifficultyFilter::Only(Difficulty::Expert),
        ] {
            let text = String::from(filter);
            assert_eq!(DifficultyFilter::try_from(text).unwrap(), filter);
        }
        for filter in [
            StreetFilter::All,
            StreetFilter::Postflop,
            StreetFilter::Only(Street::Turn),
        ] {
            let text = String::from(filter);
            assert_eq!(StreetFilter::try_from(text).unwrap(), filter);
        }
        assert!(StreetFilter::try_from("sideways".to_string()).is_err());
    }

    #[test]
    fn postflop_filter_excludes_only_preflop() {
        assert!(!StreetFilter::Postflop.matches(Street::Preflop));
        assert!(StreetFilter::Postflop.matches(Street::Flop));
        assert!(StreetFilter::Postflop.matches(Street::Turn));
        assert!(StreetFilter::Postflop.matches(Street::River));
    }

    #[test]
    fn record_answer_feeds_totals_and_all_tables() {
        let mut stats = PlayerStats::default();
        stats.record_answer(Difficulty::Advanced, Street::Turn, ActionType::Raise, true);
        stats.record_answer(Difficulty::Advanced, Street::River, ActionType::Fold, false);

        assert_eq!(stats.total_questions_answered, 2);
        assert_eq!(stats.total_correct, 1);
        assert_eq!(stats.by_difficulty[&Difficulty::Advanced].answered, 2);
        assert_eq!(stats.by_street[&Street::Turn].correct, 1);
        assert_eq!(stats.by_action[&ActionType::Fold].answered, 1);

        let answered_sum: u32 = stats.by_difficulty.values().map(|t| t.answered).sum();
        assert_eq!(answered_sum, stats.total_questions_answered);
    }

    #[test]
    fn normalize_repairs_level_and_duplicates() {
        let mut progress = PlayerProgress {
            level: 99,
            xp: 120,
            achievements: vec!["a".to_string(), "b".to_string(), "a".to_string()],
            stats: PlayerStats::default(),
            unlocked_difficulties: vec![Difficulty::Intermediate],
        };
        progress.normalize();
        assert_eq!(progress.level, 2);
        assert_eq!(progress.achievements, vec!["a", "b"]);
        assert_eq!(
            progress.unlocked_difficulties,
            vec![Difficulty::Beginner, Difficulty::Intermediate]
        );
    }

    #[test]
    fn settings_patch_applies_only_set_fields() {
        let mut settings = PlayerSettings::default();
        settings.apply(SettingsPatch {
            default_session_length: Some(0),
            sound_enabled: Some(false),
            ..SettingsPatch::default()
        });
        assert_eq!(settings.default_session_length, MIN_SESSION_LENGTH);
        assert!(!settings.sound_enabled);
        assert_eq!(
            settings.default_difficulty,
            DifficultyFilter::Only(Difficulty::Beginner)
        );
    }

    #[test]
    fn stats_maps_serialize_with_readable_keys() {
        let stats = PlayerStats::default();
        let json = serde_json::to_string(&stats).unwrap();
        assert!(json.contains("\"beginner\""));
        assert!(json.contains("\"all-in\""));
        let back: PlayerStats = serde_json::from_str(&json).unwrap();
        assert_eq!(back, stats);
    }
}
