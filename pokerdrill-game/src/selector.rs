//! Scenario selection logic.
//!
//! Selection is generic over the random source so sessions replay
//! deterministically under an injected seeded generator.
use rand::Rng;
use rand::seq::SliceRandom;
use std::collections::HashSet;

use crate::constants::{
    ADVANCED_WEIGHT_LEVEL_OFFSET, EXPERT_WEIGHT_LEVEL_OFFSET, PREFERRED_DIFFICULTY_BOOST,
    WEIGHT_CAP,
};
use crate::data::{Difficulty, Scenario, ScenarioData};
use crate::state::{DifficultyFilter, SessionConfig};

/// Scenarios surviving the config's filters, applied in order: exclusion
/// set, difficulty, street, topics.
#[must_use]
pub fn filter_candidates<'a>(
    catalog: &'a ScenarioData,
    config: &SessionConfig,
    exclude: &HashSet<String>,
) -> Vec<&'a Scenario> {
    catalog
        .iter()
        .filter(|scenario| !exclude.contains(&scenario.id))
        .filter(|scenario| config.difficulty.matches(scenario.difficulty))
        .filter(|scenario| config.street_filter.matches(scenario.street))
        .filter(|scenario| scenario.matches_topics(&config.topics))
        .collect()
}

/// Draw one scenario uniformly from the filtered pool, or `None` when the
/// filters match nothing. The caller owns the fallback policy for an
/// exhausted exclusion set (retry with an empty one); exhaustion is never a
/// hard error.
#[must_use]
pub fn select_random<R: Rng>(
    catalog: &ScenarioData,
    config: &SessionConfig,
    exclude: &HashSet<String>,
    rng: &mut R,
) -> Option<Scenario> {
    let candidates = filter_candidates(catalog, config, exclude);
    log::debug!(
        "scenario selection | difficulty:{} street:{} candidates:{}",
        config.difficulty,
        config.street_filter,
        candidates.len()
    );
    if candidates.is_empty() {
        return None;
    }
    let index = rng.gen_range(0..candidates.len());
    Some(candidates[index].clone())
}

/// Pre-draw a full session worth of scenarios: without replacement until the
/// filtered pool runs dry, then with repeats. Returns fewer than requested
/// only when the filters match nothing at all.
#[must_use]
pub fn build_session<R: Rng>(
    catalog: &ScenarioData,
    config: &SessionConfig,
    rng: &mut R,
) -> Vec<Scenario> {
    let mut drawn = Vec::with_capacity(config.question_count as usize);
    let mut used: HashSet<String> = HashSet::new();
    let no_exclusions = HashSet::new();

    for _ in 0..config.question_count {
        if let Some(scenario) = select_random(catalog, config, &used, rng) {
            used.insert(scenario.id.clone());
            drawn.push(scenario);
        } else if let Some(repeat) = select_random(catalog, config, &no_exclusions, rng) {
            drawn.push(repeat);
        } else {
            break;
        }
    }
    drawn
}

fn difficulty_weight(difficulty: Difficulty, level: u32, preferred: DifficultyFilter) -> u32 {
    let base = match difficulty {
        // Beginner fades as the player levels; the others ramp in.
        Difficulty::Beginner => WEIGHT_CAP.saturating_sub(level).max(1),
        Difficulty::Intermediate => level.min(WEIGHT_CAP),
        Difficulty::Advanced => level
            .saturating_sub(ADVANCED_WEIGHT_LEVEL_OFFSET)
            .min(WEIGHT_CAP),
        Difficulty::Expert => level
            .saturating_sub(EXPERT_WEIGHT_LEVEL_OFFSET)
            .min(WEIGHT_CAP),
    };
    if preferred == DifficultyFilter::Only(difficulty) {
        base * PREFERRED_DIFFICULTY_BOOST
    } else {
        base
    }
}

/// Draw one scenario with difficulty weights derived from the player's
/// level, so the served mix tracks progression instead of a hard filter. A
/// preferred difficulty gets a heavy boost rather than exclusivity. Falls
/// back to a uniform draw when every weight is zero.
#[must_use]
pub fn select_weighted<R: Rng>(
    catalog: &ScenarioData,
    level: u32,
    preferred: DifficultyFilter,
    exclude: &HashSet<String>,
    rng: &mut R,
) -> Option<Scenario> {
    let candidates: Vec<&Scenario> = catalog
        .iter()
        .filter(|scenario| !exclude.contains(&scenario.id))
        .collect();
    if candidates.is_empty() {
        return None;
    }

    let weights: Vec<u32> = candidates
        .iter()
        .map(|scenario| difficulty_weight(scenario.difficulty, level, preferred))
        .collect();
    let total: u32 = weights.iter().sum();
    if total == 0 {
        return candidates.choose(rng).map(|scenario| (*scenario).clone());
    }

    let mut roll = rng.gen_range(0..total);
    for (scenario, weight) in candidates.iter().zip(&weights) {
        if roll < *weight {
            return Some((*scenario).clone());
        }
        roll -= *weight;
    }
    candidates.last().map(|scenario| (*scenario).clone())
}
