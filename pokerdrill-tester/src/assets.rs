//! Catalog asset loading with an in-code fallback.
use std::fs;
use std::path::{Path, PathBuf};

use pokerdrill_game::{
    ActionType, Card, CatalogError, CatalogLoader, Difficulty, Position, Rank, Scenario,
    ScenarioData, Street, Suit,
};

/// Failures while reading a catalog asset from disk.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("could not read catalog file: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Loads a scenario catalog from a JSON file.
pub struct AssetCatalogLoader {
    path: PathBuf,
}

impl AssetCatalogLoader {
    /// The catalog bundled with the tester crate.
    #[must_use]
    pub fn bundled() -> Self {
        let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("assets")
            .join("scenarios.json");
        Self { path }
    }

    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }
}

impl CatalogLoader for AssetCatalogLoader {
    type Error = AssetError;

    fn load_scenarios(&self) -> Result<ScenarioData, Self::Error> {
        let text = fs::read_to_string(&self.path)?;
        Ok(ScenarioData::from_json(&text)?)
    }
}

/// Load the requested catalog, falling back to a minimal in-code catalog
/// when the asset is missing or invalid so simulations always have content.
#[must_use]
pub fn load_catalog(path: Option<&Path>) -> ScenarioData {
    let loader = path.map_or_else(AssetCatalogLoader::bundled, AssetCatalogLoader::from_path);
    loader.load_scenarios().unwrap_or_else(|err| {
        log::warn!("catalog asset unavailable ({err}); using fallback scenarios");
        fallback_catalog()
    })
}

fn card(rank: Rank, suit: Suit) -> Card {
    Card { rank, suit }
}

fn fallback_scenario(
    id: &str,
    difficulty: Difficulty,
    street: Street,
    optimal: ActionType,
) -> Scenario {
    Scenario {
        id: id.to_string(),
        difficulty,
        street,
        hero_position: Position::BTN,
        hero_cards: [card(Rank::Ace, Suit::Spades), card(Rank::King, Suit::Spades)],
        community_cards: Vec::new(),
        pot: 15,
        players: Vec::new(),
        action_history: Vec::new(),
        valid_actions: vec![
            ActionType::Fold,
            ActionType::Check,
            ActionType::Call,
            ActionType::Raise,
        ],
        optimal_action: optimal,
        optimal_amount: None,
        explanation: "Fallback drill scenario.".to_string(),
        key_concept: "Fallback".to_string(),
        tags: vec![street.as_str().to_string()],
    }
}

fn fallback_catalog() -> ScenarioData {
    ScenarioData::from_scenarios(vec![
        fallback_scenario("fb-pre", Difficulty::Beginner, Street::Preflop, ActionType::Raise),
        fallback_scenario("fb-flop", Difficulty::Beginner, Street::Flop, ActionType::Check),
        fallback_scenario("fb-turn", Difficulty::Intermediate, Street::Turn, ActionType::Call),
        fallback_scenario("fb-river", Difficulty::Advanced, Street::River, ActionType::Fold),
    ])
    .unwrap_or_else(|_| ScenarioData::empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_catalog_parses_and_covers_every_difficulty() {
        let catalog = AssetCatalogLoader::bundled().load_scenarios().unwrap();
        assert!(!catalog.is_empty());
        for (difficulty, count) in catalog.count_by_difficulty() {
            assert!(count > 0, "no {difficulty} scenarios in bundled catalog");
        }
    }

    #[test]
    fn missing_asset_falls_back_to_in_code_catalog() {
        let catalog = load_catalog(Some(Path::new("does/not/exist.json")));
        assert_eq!(catalog.len(), 4);
        assert!(catalog.get("fb-pre").is_some());
    }
}
