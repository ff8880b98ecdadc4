//! Static achievement registry and unlock evaluation.
//!
//! Achievements are stateless rule predicates re-evaluated after every stat
//! change rather than event-driven triggers. The registry is small and
//! fixed, and re-evaluation makes catch-up unlocking correct when stats jump
//! past several thresholds in a single update.
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::state::{PlayerProgress, PlayerStats, percentage};

/// Grouping for display; also the registry's section order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AchievementCategory {
    Volume,
    Accuracy,
    Streaks,
    Milestones,
}

impl AchievementCategory {
    pub const ALL: [Self; 4] = [
        Self::Volume,
        Self::Accuracy,
        Self::Streaks,
        Self::Milestones,
    ];

    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Volume => "Volume",
            Self::Accuracy => "Accuracy",
            Self::Streaks => "Streaks",
            Self::Milestones => "Milestones",
        }
    }
}

impl fmt::Display for AchievementCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

type UnlockFn = fn(&PlayerStats, &PlayerProgress) -> bool;
type ProgressFn = fn(&PlayerStats, &PlayerProgress) -> u32;

/// One achievement definition. The predicate and progress measure are pure
/// functions of the current stats/progress snapshots; no hidden state.
pub struct AchievementDef {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub category: AchievementCategory,
    /// Strictly positive threshold the progress measure is compared against.
    pub requirement: u32,
    unlock: UnlockFn,
    progress: ProgressFn,
}

impl AchievementDef {
    #[must_use]
    pub fn is_satisfied(&self, stats: &PlayerStats, progress: &PlayerProgress) -> bool {
        (self.unlock)(stats, progress)
    }

    #[must_use]
    pub fn measured(&self, stats: &PlayerStats, progress: &PlayerProgress) -> u32 {
        (self.progress)(stats, progress)
    }
}

impl fmt::Debug for AchievementDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AchievementDef")
            .field("id", &self.id)
            .field("category", &self.category)
            .field("requirement", &self.requirement)
            .finish_non_exhaustive()
    }
}

fn answered(stats: &PlayerStats, _: &PlayerProgress) -> u32 {
    stats.total_questions_answered
}

fn correct(stats: &PlayerStats, _: &PlayerProgress) -> u32 {
    stats.total_correct
}

fn best_streak(stats: &PlayerStats, _: &PlayerProgress) -> u32 {
    stats.best_streak
}

fn level(_: &PlayerStats, progress: &PlayerProgress) -> u32 {
    progress.level
}

fn sessions(stats: &PlayerStats, _: &PlayerProgress) -> u32 {
    stats.total_sessions
}

/// The full registry. Order here is unlock-report order, relied on for
/// sequential notification display.
pub static ACHIEVEMENTS: &[AchievementDef] = &[
    // Volume ----------------------------------------------------------------
    AchievementDef {
        id: "first-steps",
        title: "First Steps",
        description: "Complete your first quiz question",
        icon: "\u{1F463}",
        category: AchievementCategory::Volume,
        requirement: 1,
        unlock: |stats, _| stats.total_questions_answered >= 1,
        progress: answered,
    },
    AchievementDef {
        id: "getting-started",
        title: "Getting Started",
        description: "Answer 10 questions",
        icon: "\u{1F3AF}",
        category: AchievementCategory::Volume,
        requirement: 10,
        unlock: |stats, _| stats.total_questions_answered >= 10,
        progress: answered,
    },
    AchievementDef {
        id: "dedicated-student",
        title: "Dedicated Student",
        description: "Answer 50 questions",
        icon: "\u{1F4DA}",
        category: AchievementCategory::Volume,
        requirement: 50,
        unlock: |stats, _| stats.total_questions_answered >= 50,
        progress: answered,
    },
    AchievementDef {
        id: "centurion",
        title: "Centurion",
        description: "Answer 100 questions",
        icon: "\u{1F4AF}",
        category: AchievementCategory::Volume,
        requirement: 100,
        unlock: |stats, _| stats.total_questions_answered >= 100,
        progress: answered,
    },
    AchievementDef {
        id: "grinder",
        title: "Grinder",
        description: "Answer 500 questions",
        icon: "\u{2699}",
        category: AchievementCategory::Volume,
        requirement: 500,
        unlock: |stats, _| stats.total_questions_answered >= 500,
        progress: answered,
    },
    // Accuracy --------------------------------------------------------------
    AchievementDef {
        id: "sharp-shooter",
        title: "Sharp Shooter",
        description: "Get 10 correct answers",
        icon: "\u{1F3AF}",
        category: AchievementCategory::Accuracy,
        requirement: 10,
        unlock: |stats, _| stats.total_correct >= 10,
        progress: correct,
    },
    AchievementDef {
        id: "precision-player",
        title: "Precision Player",
        description: "Get 50 correct answers",
        icon: "\u{1F3F9}",
        category: AchievementCategory::Accuracy,
        requirement: 50,
        unlock: |stats, _| stats.total_correct >= 50,
        progress: correct,
    },
    AchievementDef {
        id: "master-decision",
        title: "Master of Decisions",
        description: "Get 100 correct answers",
        icon: "\u{1F9E0}",
        category: AchievementCategory::Accuracy,
        requirement: 100,
        unlock: |stats, _| stats.total_correct >= 100,
        progress: correct,
    },
    // Streaks ---------------------------------------------------------------
    AchievementDef {
        id: "on-fire",
        title: "On Fire",
        description: "Get a streak of 5 correct answers",
        icon: "\u{1F525}",
        category: AchievementCategory::Streaks,
        requirement: 5,
        unlock: |stats, _| stats.best_streak >= 5,
        progress: best_streak,
    },
    AchievementDef {
        id: "hot-streak",
        title: "Hot Streak",
        description: "Get a streak of 10 correct answers",
        icon: "\u{1F31F}",
        category: AchievementCategory::Streaks,
        requirement: 10,
        unlock: |stats, _| stats.best_streak >= 10,
        progress: best_streak,
    },
    AchievementDef {
        id: "unstoppable",
        title: "Unstoppable",
        description: "Get a streak of 15 correct answers",
        icon: "\u{1F4AB}",
        category: AchievementCategory::Streaks,
        requirement: 15,
        unlock: |stats, _| stats.best_streak >= 15,
        progress: best_streak,
    },
    AchievementDef {
        id: "legendary",
        title: "Legendary",
        description: "Get a streak of 20 correct answers",
        icon: "\u{1F451}",
        category: AchievementCategory::Streaks,
        requirement: 20,
        unlock: |stats, _| stats.best_streak >= 20,
        progress: best_streak,
    },
    // Milestones ------------------------------------------------------------
    AchievementDef {
        id: "level-5",
        title: "Rising Star",
        description: "Reach level 5",
        icon: "\u{2B50}",
        category: AchievementCategory::Milestones,
        requirement: 5,
        unlock: |_, progress| progress.level >= 5,
        progress: level,
    },
    AchievementDef {
        id: "level-10",
        title: "Expert Unlocked",
        description: "Reach level 10 and unlock Expert difficulty",
        icon: "\u{1F396}",
        category: AchievementCategory::Milestones,
        requirement: 10,
        unlock: |_, progress| progress.level >= 10,
        progress: level,
    },
    AchievementDef {
        id: "level-15",
        title: "Poker Pro",
        description: "Reach level 15",
        icon: "\u{1F3C6}",
        category: AchievementCategory::Milestones,
        requirement: 15,
        unlock: |_, progress| progress.level >= 15,
        progress: level,
    },
    AchievementDef {
        id: "level-20",
        title: "Grand Master",
        description: "Reach level 20",
        icon: "\u{1F451}",
        category: AchievementCategory::Milestones,
        requirement: 20,
        unlock: |_, progress| progress.level >= 20,
        progress: level,
    },
    AchievementDef {
        id: "session-master",
        title: "Session Master",
        description: "Complete 10 quiz sessions",
        icon: "\u{1F4CB}",
        category: AchievementCategory::Milestones,
        requirement: 10,
        unlock: |stats, _| stats.total_sessions >= 10,
        progress: sessions,
    },
];

/// Display progress toward one achievement; percentage clamps to 100 even
/// when the measure overshoots the requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AchievementProgress {
    pub current: u32,
    pub target: u32,
    pub percentage: u8,
}

/// One registry entry joined with the player's standing, for display layers.
#[derive(Debug)]
pub struct AchievementStatus {
    pub definition: &'static AchievementDef,
    pub unlocked: bool,
    pub progress: AchievementProgress,
}

/// Every definition whose predicate holds and whose id is not yet recorded,
/// in registry order. Calling again with the returned ids appended yields
/// nothing for unchanged stats (idempotence); a stats jump past several
/// thresholds reports every newly satisfied tier at once (catch-up).
#[must_use]
pub fn newly_unlocked(
    stats: &PlayerStats,
    progress: &PlayerProgress,
    already_unlocked: &[String],
) -> Vec<&'static AchievementDef> {
    ACHIEVEMENTS
        .iter()
        .filter(|definition| {
            !already_unlocked.iter().any(|id| id == definition.id)
                && definition.is_satisfied(stats, progress)
        })
        .collect()
}

/// Progress triple for one definition.
#[must_use]
pub fn progress_for(
    definition: &AchievementDef,
    stats: &PlayerStats,
    progress: &PlayerProgress,
) -> AchievementProgress {
    let current = definition.measured(stats, progress);
    AchievementProgress {
        current,
        target: definition.requirement,
        percentage: percentage(current.min(definition.requirement), definition.requirement),
    }
}

/// Look up a definition by id.
#[must_use]
pub fn find(id: &str) -> Option<&'static AchievementDef> {
    ACHIEVEMENTS.iter().find(|definition| definition.id == id)
}

/// Registry entries in one category, in registry order.
#[must_use]
pub fn by_category(category: AchievementCategory) -> Vec<&'static AchievementDef> {
    ACHIEVEMENTS
        .iter()
        .filter(|definition| definition.category == category)
        .collect()
}

/// The whole registry joined with the player's standing.
#[must_use]
pub fn statuses(
    stats: &PlayerStats,
    progress: &PlayerProgress,
    unlocked_ids: &[String],
) -> Vec<AchievementStatus> {
    ACHIEVEMENTS
        .iter()
        .map(|definition| AchievementStatus {
            definition,
            unlocked: unlocked_ids.iter().any(|id| id == definition.id),
            progress: progress_for(definition, stats, progress),
        })
        .collect()
}
