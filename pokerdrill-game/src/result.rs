//! Session summary calculation for the end-of-run screen.
use serde::{Deserialize, Serialize};

use crate::state::{SessionResult, percentage};

/// Aggregates of one finished (or abandoned) session's results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub total_questions: u32,
    pub correct: u32,
    /// Rounded percentage, 0 for an empty session.
    pub accuracy_pct: u8,
    pub total_xp: u64,
    /// Longest run of correct answers inside this session.
    pub best_streak: u32,
}

/// Summarize an ordered result list.
#[must_use]
pub fn session_summary(results: &[SessionResult]) -> SessionSummary {
    let total_questions = u32::try_from(results.len()).unwrap_or(u32::MAX);
    let correct = u32::try_from(results.iter().filter(|r| r.correct).count()).unwrap_or(u32::MAX);
    let total_xp = results.iter().map(|r| r.xp_earned).sum();

    let mut best_streak = 0;
    let mut run = 0;
    for result in results {
        if result.correct {
            run += 1;
            best_streak = best_streak.max(run);
        } else {
            run = 0;
        }
    }

    SessionSummary {
        total_questions,
        correct,
        accuracy_pct: percentage(correct, total_questions),
        total_xp,
        best_streak,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::ActionType;

    fn result(correct: bool, xp: u64) -> SessionResult {
        SessionResult {
            scenario_id: "s".to_string(),
            action: ActionType::Call,
            correct,
            xp_earned: xp,
        }
    }

    #[test]
    fn empty_session_summarizes_to_zeroes() {
        assert_eq!(session_summary(&[]), SessionSummary::default());
    }

    #[test]
    fn summary_tracks_streak_and_accuracy() {
        let results = vec![
            result(true, 10),
            result(true, 10),
            result(false, 2),
            result(true, 15),
            result(true, 15),
            result(true, 20),
        ];
        let summary = session_summary(&results);
        assert_eq!(summary.total_questions, 6);
        assert_eq!(summary.correct, 5);
        assert_eq!(summary.accuracy_pct, 83);
        assert_eq!(summary.total_xp, 72);
        assert_eq!(summary.best_streak, 3);
    }
}
