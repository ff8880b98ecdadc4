//! Authored scenario records and the catalog container.
//!
//! Scenarios are static content: the hand/board snapshot is carried for
//! display layers and (de)serialization but the rule engines only read
//! `difficulty`, `street`, `tags`, `valid_actions`, and `optimal_action`.
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;
use std::str::FromStr;

/// Difficulty tier gating scenario availability and XP multipliers.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
    Expert,
}

impl Difficulty {
    /// Tier order, lowest first. Also the difficulty-unlock order.
    pub const ALL: [Self; 4] = [
        Self::Beginner,
        Self::Intermediate,
        Self::Advanced,
        Self::Expert,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
            Self::Expert => "expert",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Beginner => "Beginner",
            Self::Intermediate => "Intermediate",
            Self::Advanced => "Advanced",
            Self::Expert => "Expert",
        }
    }

    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Beginner => "Learn basic hand rankings and simple preflop decisions",
            Self::Intermediate => "Position-based play and postflop fundamentals",
            Self::Advanced => "Complex spots, draws, and multi-street thinking",
            Self::Expert => "GTO concepts, balanced ranges, and advanced exploits",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "beginner" => Ok(Self::Beginner),
            "intermediate" => Ok(Self::Intermediate),
            "advanced" => Ok(Self::Advanced),
            "expert" => Ok(Self::Expert),
            _ => Err(()),
        }
    }
}

/// Betting round a scenario is set on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Street {
    Preflop,
    Flop,
    Turn,
    River,
}

impl Street {
    pub const ALL: [Self; 4] = [Self::Preflop, Self::Flop, Self::Turn, Self::River];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Preflop => "preflop",
            Self::Flop => "flop",
            Self::Turn => "turn",
            Self::River => "river",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Preflop => "Preflop",
            Self::Flop => "Flop",
            Self::Turn => "Turn",
            Self::River => "River",
        }
    }

    /// Whether this street comes after the preflop round.
    #[must_use]
    pub const fn is_postflop(self) -> bool {
        !matches!(self, Self::Preflop)
    }
}

impl fmt::Display for Street {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Street {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "preflop" => Ok(Self::Preflop),
            "flop" => Ok(Self::Flop),
            "turn" => Ok(Self::Turn),
            "river" => Ok(Self::River),
            _ => Err(()),
        }
    }
}

/// A poker decision the player can choose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionType {
    Fold,
    Check,
    Call,
    Bet,
    Raise,
    #[serde(rename = "all-in")]
    AllIn,
}

impl ActionType {
    pub const ALL: [Self; 6] = [
        Self::Fold,
        Self::Check,
        Self::Call,
        Self::Bet,
        Self::Raise,
        Self::AllIn,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fold => "fold",
            Self::Check => "check",
            Self::Call => "call",
            Self::Bet => "bet",
            Self::Raise => "raise",
            Self::AllIn => "all-in",
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fold" => Ok(Self::Fold),
            "check" => Ok(Self::Check),
            "call" => Ok(Self::Call),
            "bet" => Ok(Self::Bet),
            "raise" => Ok(Self::Raise),
            "all-in" => Ok(Self::AllIn),
            _ => Err(()),
        }
    }
}

/// Table position of a seat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Position {
    UTG,
    MP,
    CO,
    BTN,
    SB,
    BB,
}

impl Position {
    /// Seats in action order preflop.
    pub const ORDER: [Self; 6] = [Self::UTG, Self::MP, Self::CO, Self::BTN, Self::SB, Self::BB];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::UTG => "Under the Gun",
            Self::MP => "Middle Position",
            Self::CO => "Cutoff",
            Self::BTN => "Button",
            Self::SB => "Small Blind",
            Self::BB => "Big Blind",
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            Self::UTG => "UTG",
            Self::MP => "MP",
            Self::CO => "CO",
            Self::BTN => "BTN",
            Self::SB => "SB",
            Self::BB => "BB",
        };
        f.write_str(tag)
    }
}

/// Card rank, deuce through ace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Rank {
    #[serde(rename = "2")]
    Two,
    #[serde(rename = "3")]
    Three,
    #[serde(rename = "4")]
    Four,
    #[serde(rename = "5")]
    Five,
    #[serde(rename = "6")]
    Six,
    #[serde(rename = "7")]
    Seven,
    #[serde(rename = "8")]
    Eight,
    #[serde(rename = "9")]
    Nine,
    #[serde(rename = "T")]
    Ten,
    #[serde(rename = "J")]
    Jack,
    #[serde(rename = "Q")]
    Queen,
    #[serde(rename = "K")]
    King,
    #[serde(rename = "A")]
    Ace,
}

impl Rank {
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            Self::Two => '2',
            Self::Three => '3',
            Self::Four => '4',
            Self::Five => '5',
            Self::Six => '6',
            Self::Seven => '7',
            Self::Eight => '8',
            Self::Nine => '9',
            Self::Ten => 'T',
            Self::Jack => 'J',
            Self::Queen => 'Q',
            Self::King => 'K',
            Self::Ace => 'A',
        }
    }
}

/// Card suit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Suit {
    Spades,
    Hearts,
    Diamonds,
    Clubs,
}

impl Suit {
    #[must_use]
    pub const fn symbol(self) -> char {
        match self {
            Self::Spades => '\u{2660}',
            Self::Hearts => '\u{2665}',
            Self::Diamonds => '\u{2666}',
            Self::Clubs => '\u{2663}',
        }
    }

    /// Hearts and diamonds render red on a standard deck.
    #[must_use]
    pub const fn is_red(self) -> bool {
        matches!(self, Self::Hearts | Self::Diamonds)
    }
}

/// A playing card in a scenario snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub rank: Rank,
    pub suit: Suit,
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.rank.as_char(), self.suit.symbol())
    }
}

/// One seat at the table in a scenario snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seat {
    pub position: Position,
    /// Chip stack in big-blind-denominated chips.
    pub stack: i64,
    #[serde(default)]
    pub is_hero: bool,
    #[serde(default)]
    pub is_folded: bool,
    #[serde(default)]
    pub current_bet: i64,
    #[serde(default)]
    pub name: Option<String>,
}

/// One entry in the action history leading up to the decision point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub action: ActionType,
    pub position: Position,
    #[serde(default)]
    pub amount: Option<i64>,
}

/// An authored quiz scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    pub id: String,
    pub difficulty: Difficulty,
    pub street: Street,
    pub hero_position: Position,
    pub hero_cards: [Card; 2],
    #[serde(default)]
    pub community_cards: Vec<Card>,
    pub pot: i64,
    #[serde(default)]
    pub players: Vec<Seat>,
    #[serde(default)]
    pub action_history: Vec<HistoryEntry>,
    pub valid_actions: Vec<ActionType>,
    pub optimal_action: ActionType,
    #[serde(default)]
    pub optimal_amount: Option<i64>,
    #[serde(default)]
    pub explanation: String,
    #[serde(default)]
    pub key_concept: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Scenario {
    /// Whether the given decision is offered by this scenario.
    #[must_use]
    pub fn is_valid_action(&self, action: ActionType) -> bool {
        self.valid_actions.contains(&action)
    }

    /// Whether the scenario carries at least one of the given topic tags.
    #[must_use]
    pub fn matches_topics(&self, topics: &[String]) -> bool {
        topics.is_empty() || self.tags.iter().any(|tag| topics.contains(tag))
    }
}

/// Validation failures for authored catalog content.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("catalog is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("duplicate scenario id: {0}")]
    DuplicateId(String),
    #[error("scenario {0} offers no valid actions")]
    EmptyActions(String),
    #[error("scenario {id}: optimal action {action} is not among the valid actions")]
    InvalidOptimal { id: String, action: ActionType },
}

/// Container for all authored scenarios.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ScenarioData {
    pub scenarios: Vec<Scenario>,
}

impl ScenarioData {
    /// An empty catalog. Every selector path degrades to `None` against it.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            scenarios: Vec::new(),
        }
    }

    /// Build a catalog from scenarios, validating authored invariants.
    ///
    /// # Errors
    ///
    /// Returns an error on duplicate ids, an empty `valid_actions` set, or an
    /// `optimal_action` outside `valid_actions`.
    pub fn from_scenarios(scenarios: Vec<Scenario>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        for scenario in &scenarios {
            if !seen.insert(scenario.id.as_str()) {
                return Err(CatalogError::DuplicateId(scenario.id.clone()));
            }
            if scenario.valid_actions.is_empty() {
                return Err(CatalogError::EmptyActions(scenario.id.clone()));
            }
            if !scenario.is_valid_action(scenario.optimal_action) {
                return Err(CatalogError::InvalidOptimal {
                    id: scenario.id.clone(),
                    action: scenario.optimal_action,
                });
            }
        }
        Ok(Self { scenarios })
    }

    /// Parse and validate a catalog from its JSON form.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or the content fails
    /// authored-invariant validation.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let parsed: Self = serde_json::from_str(json)?;
        Self::from_scenarios(parsed.scenarios)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Scenario> {
        self.scenarios.iter()
    }

    /// Find a scenario by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Scenario> {
        self.scenarios.iter().find(|scenario| scenario.id == id)
    }

    /// All distinct topic tags across the catalog, sorted.
    #[must_use]
    pub fn topics(&self) -> Vec<String> {
        let set: BTreeSet<&str> = self
            .scenarios
            .iter()
            .flat_map(|scenario| scenario.tags.iter().map(String::as_str))
            .collect();
        set.into_iter().map(str::to_string).collect()
    }

    /// Scenario counts per difficulty tier.
    #[must_use]
    pub fn count_by_difficulty(&self) -> BTreeMap<Difficulty, usize> {
        let mut counts: BTreeMap<Difficulty, usize> =
            Difficulty::ALL.iter().map(|d| (*d, 0)).collect();
        for scenario in &self.scenarios {
            *counts.entry(scenario.difficulty).or_default() += 1;
        }
        counts
    }
}
