//! XP curve, answer rewards, and difficulty gating.
//!
//! Every function here is total over its documented domain: levels clamp to
//! the top of the threshold table and unknown inputs cannot be constructed
//! thanks to the enum types.
use crate::constants::{
    BASE_XP_CORRECT, BASE_XP_INCORRECT, LEVEL_THRESHOLDS, STREAK_BONUS_THRESHOLDS,
    UNLOCK_LEVEL_ADVANCED, UNLOCK_LEVEL_BEGINNER, UNLOCK_LEVEL_EXPERT, UNLOCK_LEVEL_INTERMEDIATE,
    XP_MULT_ADVANCED, XP_MULT_BEGINNER, XP_MULT_EXPERT, XP_MULT_INTERMEDIATE,
};
use crate::data::Difficulty;

/// Highest obtainable level; XP beyond the top threshold changes nothing.
#[allow(clippy::cast_possible_truncation)]
pub const MAX_LEVEL: u32 = LEVEL_THRESHOLDS.len() as u32;

/// Level for a cumulative XP total: the highest threshold index at or below
/// `xp`, starting from level 1 at 0 XP.
#[must_use]
pub fn level_for_xp(xp: u64) -> u32 {
    let mut level = 1;
    for (index, threshold) in LEVEL_THRESHOLDS.iter().enumerate().skip(1) {
        if xp >= *threshold {
            level = u32::try_from(index + 1).unwrap_or(MAX_LEVEL);
        } else {
            break;
        }
    }
    level.min(MAX_LEVEL)
}

/// Cumulative XP required to reach a level. Out-of-range levels clamp to the
/// table's ends.
#[must_use]
pub fn xp_for_level(level: u32) -> u64 {
    if level <= 1 {
        return 0;
    }
    let index = (level.min(MAX_LEVEL) - 1) as usize;
    LEVEL_THRESHOLDS[index]
}

/// XP still needed to reach the next level; 0 at max level.
#[must_use]
pub fn xp_to_next_level(xp: u64) -> u64 {
    let level = level_for_xp(xp);
    if level >= MAX_LEVEL {
        return 0;
    }
    LEVEL_THRESHOLDS[level as usize] - xp
}

/// Progress through the current level as a rounded percentage. 0 exactly at
/// a level's starting threshold, always 100 at max level.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn level_progress(xp: u64) -> u8 {
    let level = level_for_xp(xp);
    if level >= MAX_LEVEL {
        return 100;
    }
    let floor = LEVEL_THRESHOLDS[(level - 1) as usize];
    let ceiling = LEVEL_THRESHOLDS[level as usize];
    let into_level = (xp - floor) as f64;
    let span = (ceiling - floor) as f64;
    (into_level / span * 100.0).round().clamp(0.0, 100.0) as u8
}

/// True iff crediting XP from `prev_xp` to `new_xp` crossed a level
/// threshold. The aggregator uses this to trigger cascading difficulty
/// unlocks.
#[must_use]
pub fn level_increased(prev_xp: u64, new_xp: u64) -> bool {
    level_for_xp(new_xp) > level_for_xp(prev_xp)
}

/// XP multiplier for a difficulty tier; scales linearly with tier.
#[must_use]
pub const fn difficulty_multiplier(difficulty: Difficulty) -> f64 {
    match difficulty {
        Difficulty::Beginner => XP_MULT_BEGINNER,
        Difficulty::Intermediate => XP_MULT_INTERMEDIATE,
        Difficulty::Advanced => XP_MULT_ADVANCED,
        Difficulty::Expert => XP_MULT_EXPERT,
    }
}

/// Flat bonus for the highest streak threshold met; tiers do not stack.
#[must_use]
pub fn streak_bonus(streak: u32) -> u64 {
    let mut bonus = 0;
    for (threshold, amount) in STREAK_BONUS_THRESHOLDS {
        if streak >= *threshold {
            bonus = *amount;
        }
    }
    bonus
}

/// XP reward for one answered question.
///
/// `streak` is the run of correct answers *before* this question was scored;
/// the bonus rewards the streak the player walked in with. Incorrect answers
/// earn the small participation base with no bonus.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
pub fn xp_reward(correct: bool, difficulty: Difficulty, streak: u32) -> u64 {
    let base = if correct {
        BASE_XP_CORRECT
    } else {
        BASE_XP_INCORRECT
    };
    // Round half-up to the nearest whole XP.
    let mut reward = (base as f64 * difficulty_multiplier(difficulty)).round() as u64;
    if correct {
        reward += streak_bonus(streak);
    }
    reward
}

/// Level required before a difficulty tier may be served.
#[must_use]
pub const fn required_level(difficulty: Difficulty) -> u32 {
    match difficulty {
        Difficulty::Beginner => UNLOCK_LEVEL_BEGINNER,
        Difficulty::Intermediate => UNLOCK_LEVEL_INTERMEDIATE,
        Difficulty::Advanced => UNLOCK_LEVEL_ADVANCED,
        Difficulty::Expert => UNLOCK_LEVEL_EXPERT,
    }
}

/// Beginner is always unlocked at level 1.
#[must_use]
pub const fn is_difficulty_unlocked(difficulty: Difficulty, level: u32) -> bool {
    level >= required_level(difficulty)
}

/// Every tier available at the given level, in tier order.
#[must_use]
pub fn unlocked_difficulties(level: u32) -> Vec<Difficulty> {
    Difficulty::ALL
        .into_iter()
        .filter(|difficulty| is_difficulty_unlocked(*difficulty, level))
        .collect()
}

/// The next tier still locked at the given level and the level it needs,
/// or `None` once everything is open.
#[must_use]
pub fn next_difficulty_unlock(level: u32) -> Option<(Difficulty, u32)> {
    Difficulty::ALL
        .into_iter()
        .map(|difficulty| (difficulty, required_level(difficulty)))
        .find(|(_, required)| level < *required)
}

/// Compact XP display form: values from 1000 up render as "1.3k".
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn format_xp(xp: u64) -> String {
    if xp >= 1_000 {
        format!("{:.1}k", xp as f64 / 1_000.0)
    } else {
        xp.to_string()
    }
}
