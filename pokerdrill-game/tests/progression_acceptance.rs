//! End-to-end acceptance flows for the progression core, driven entirely
//! through the public trainer API.
use pokerdrill_game::state::DifficultyFilter;
use pokerdrill_game::{
    ActionType, Card, Difficulty, Position, QuizTrainer, Rank, SaveDocument, Scenario,
    ScenarioData, SessionConfig, Street, StreetFilter, Suit, leveling, session_summary,
};
use std::collections::HashSet;

fn scenario(id: &str, difficulty: Difficulty, street: Street, optimal: ActionType) -> Scenario {
    Scenario {
        id: id.to_string(),
        difficulty,
        street,
        hero_position: Position::BTN,
        hero_cards: [
            Card {
                rank: Rank::Ace,
                suit: Suit::Spades,
            },
            Card {
                rank: Rank::King,
                suit: Suit::Spades,
            },
        ],
        community_cards: Vec::new(),
        pot: 12,
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
        explanation: "Authored explanation.".to_string(),
        key_concept: "Authored concept.".to_string(),
        tags: vec![street.as_str().to_string()],
    }
}

fn training_catalog() -> ScenarioData {
    ScenarioData::from_scenarios(vec![
        scenario("pf-1", Difficulty::Beginner, Street::Preflop, ActionType::Raise),
        scenario("pf-2", Difficulty::Beginner, Street::Preflop, ActionType::Fold),
        scenario("fl-1", Difficulty::Beginner, Street::Flop, ActionType::Check),
        scenario("tn-1", Difficulty::Intermediate, Street::Turn, ActionType::Call),
        scenario("rv-1", Difficulty::Advanced, Street::River, ActionType::Raise),
        scenario("rv-2", Difficulty::Expert, Street::River, ActionType::Fold),
    ])
    .unwrap()
}

fn config(count: u32, difficulty: DifficultyFilter, street: StreetFilter) -> SessionConfig {
    SessionConfig {
        question_count: count,
        difficulty,
        street_filter: street,
        topics: Vec::new(),
    }
}

/// Answer the current question with its own optimal action.
fn answer_optimally(trainer: &mut QuizTrainer) -> u64 {
    let optimal = trainer.current_scenario().unwrap().optimal_action;
    let feedback = trainer.submit_answer(optimal).unwrap();
    assert!(feedback.correct);
    feedback.xp_earned
}

#[test]
fn three_question_beginner_session_end_to_end() {
    let mut trainer = QuizTrainer::new(training_catalog(), 1337);
    let started = trainer.start_session(config(
        3,
        DifficultyFilter::Only(Difficulty::Beginner),
        StreetFilter::All,
    ));
    assert!(started.is_some());

    let mut expected = Vec::new();
    for streak_before in 0..3u32 {
        expected.push(leveling::xp_reward(
            true,
            Difficulty::Beginner,
            streak_before,
        ));
        answer_optimally(&mut trainer);
        trainer.advance_to_next();
    }

    let session = trainer.session().expect("session retained for summary");
    assert!(session.completed);
    assert_eq!(session.results.len(), 3);
    assert_eq!(trainer.progress().stats.total_sessions, 1);
    assert_eq!(trainer.progress().xp, expected.iter().sum::<u64>());

    let summary = session_summary(&session.results);
    assert_eq!(summary.total_questions, 3);
    assert_eq!(summary.correct, 3);
    assert_eq!(summary.accuracy_pct, 100);
    assert_eq!(summary.best_streak, 3);
}

#[test]
fn stats_breakdowns_stay_sum_consistent() {
    let mut trainer = QuizTrainer::new(training_catalog(), 99);
    trainer.start_session(config(12, DifficultyFilter::All, StreetFilter::All));

    let before = trainer.progress().stats.total_questions_answered;
    for round in 0..12 {
        // Alternate correct and incorrect answers.
        let current = trainer.current_scenario().unwrap();
        let action = if round % 2 == 0 {
            current.optimal_action
        } else {
            *current
                .valid_actions
                .iter()
                .find(|a| **a != current.optimal_action)
                .unwrap()
        };
        trainer.submit_answer(action).unwrap();
        trainer.advance_to_next();
    }

    let stats = &trainer.progress().stats;
    assert_eq!(stats.total_questions_answered, before + 12);
    for (label, sum) in [
        (
            "difficulty",
            stats.by_difficulty.values().map(|t| t.answered).sum::<u32>(),
        ),
        (
            "street",
            stats.by_street.values().map(|t| t.answered).sum::<u32>(),
        ),
        (
            "action",
            stats.by_action.values().map(|t| t.answered).sum::<u32>(),
        ),
    ] {
        assert_eq!(sum, stats.total_questions_answered, "{label} breakdown");
    }
    assert_eq!(stats.total_correct, 6);
}

#[test]
fn streak_rewards_cross_bonus_tiers_as_documented() {
    let mut trainer = QuizTrainer::new(training_catalog(), 555);
    trainer.start_session(config(
        12,
        DifficultyFilter::Only(Difficulty::Beginner),
        StreetFilter::All,
    ));

    let mut rewards = Vec::new();
    for _ in 0..12 {
        rewards.push(answer_optimally(&mut trainer));
        trainer.advance_to_next();
    }

    // Base 10 each; the bonus steps in at streaks 3, 5, and 10 walked-in.
    let expected: Vec<u64> = (0..12u32)
        .map(|streak_before| 10 + leveling::streak_bonus(streak_before))
        .collect();
    assert_eq!(rewards, expected);
    assert_eq!(trainer.progress().stats.best_streak, 12);
    // Streak achievements caught up in order as tiers were crossed.
    let unlocked = &trainer.progress().achievements;
    assert!(unlocked.contains(&"on-fire".to_string()));
    assert!(unlocked.contains(&"hot-streak".to_string()));
}

#[test]
fn big_xp_jump_unlocks_every_qualified_difficulty_at_once() {
    let mut trainer = QuizTrainer::new(training_catalog(), 7);
    let mut document = SaveDocument::default();
    document.progress.xp = leveling::xp_for_level(10) - 5;
    trainer.restore(document);

    trainer.start_session(config(
        1,
        DifficultyFilter::Only(Difficulty::Beginner),
        StreetFilter::All,
    ));
    let feedback = trainer
        .submit_answer(trainer.current_scenario().unwrap().optimal_action)
        .unwrap();

    assert!(feedback.leveled_up);
    assert_eq!(
        feedback.unlocked_difficulties,
        vec![
            Difficulty::Intermediate,
            Difficulty::Advanced,
            Difficulty::Expert
        ]
    );
    for difficulty in Difficulty::ALL {
        assert!(trainer.progress().is_difficulty_unlocked(difficulty));
    }
}

#[test]
fn short_pool_sessions_fall_back_to_repeats_instead_of_failing() {
    let mut trainer = QuizTrainer::new(training_catalog(), 23);
    // Only two preflop scenarios exist; ask for five questions.
    trainer.start_session(config(
        5,
        DifficultyFilter::All,
        StreetFilter::Only(Street::Preflop),
    ));

    let mut served = Vec::new();
    for _ in 0..5 {
        let current = trainer.current_scenario().expect("a scenario every turn");
        assert_eq!(current.street, Street::Preflop);
        served.push(current.id.clone());
        let optimal = current.optimal_action;
        trainer.submit_answer(optimal).unwrap();
        trainer.advance_to_next();
    }

    assert!(trainer.session().unwrap().completed);
    let distinct: HashSet<&String> = served.iter().collect();
    assert_eq!(distinct.len(), 2, "both preflop scenarios served");
}

#[test]
fn postflop_sessions_never_serve_preflop() {
    let mut trainer = QuizTrainer::new(training_catalog(), 31);
    trainer.start_session(config(8, DifficultyFilter::All, StreetFilter::Postflop));
    for _ in 0..8 {
        let current = trainer.current_scenario().unwrap();
        assert_ne!(current.street, Street::Preflop);
        let optimal = current.optimal_action;
        trainer.submit_answer(optimal).unwrap();
        trainer.advance_to_next();
    }
}

#[test]
fn abandoned_sessions_still_count_once() {
    let mut trainer = QuizTrainer::new(training_catalog(), 41);
    trainer.start_session(config(10, DifficultyFilter::All, StreetFilter::All));
    answer_optimally(&mut trainer);
    trainer.end_session();
    trainer.end_session();
    assert_eq!(trainer.progress().stats.total_sessions, 1);
    // Progress from the answered question survives the abandonment.
    assert_eq!(trainer.progress().stats.total_questions_answered, 1);
}
