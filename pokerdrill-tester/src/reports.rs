//! Report rendering for simulation outcomes.
use anyhow::Result;
use colored::Colorize;
use std::fmt::Write as _;

use crate::simulation::SimulationOutcome;

pub fn generate_console_report(outcomes: &[SimulationOutcome]) {
    println!();
    println!("{}", "Pokerdrill Simulation Summary".bright_cyan().bold());
    println!("{}", "=============================".cyan());

    for outcome in outcomes {
        let accuracy = format!("{}%", outcome.accuracy_pct);
        let accuracy = if outcome.accuracy_pct >= 70 {
            accuracy.green()
        } else {
            accuracy.yellow()
        };

        println!(
            "{} seed {}",
            outcome.strategy.to_string().bold(),
            outcome.seed
        );
        println!(
            "   Sessions: {}  Questions: {}  Accuracy: {accuracy}",
            outcome.sessions_completed, outcome.questions_answered
        );
        println!(
            "   XP: {}  Level: {}  Best streak: {}",
            outcome.total_xp, outcome.final_level, outcome.best_streak
        );
        println!(
            "   Achievements: {}  Difficulties: {}",
            outcome.achievements.len(),
            outcome.unlocked_difficulties.join(", ")
        );
        println!();
    }

    if let Some(top) = outcomes.iter().max_by_key(|outcome| outcome.total_xp) {
        println!(
            "Top XP: {} ({} seed {})",
            top.total_xp.to_string().green(),
            top.strategy,
            top.seed
        );
    }
}

/// JSON form of the outcomes.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn generate_json_report(outcomes: &[SimulationOutcome]) -> Result<String> {
    Ok(serde_json::to_string_pretty(outcomes)?)
}

#[must_use]
pub fn generate_markdown_report(outcomes: &[SimulationOutcome]) -> String {
    let mut out = String::from("# Pokerdrill Simulation Results\n\n");
    out.push_str("| Strategy | Seed | Sessions | Questions | Accuracy | XP | Level | Best streak | Achievements |\n");
    out.push_str("|---|---|---|---|---|---|---|---|---|\n");
    for outcome in outcomes {
        let _ = writeln!(
            out,
            "| {} | {} | {} | {} | {}% | {} | {} | {} | {} |",
            outcome.strategy,
            outcome.seed,
            outcome.sessions_completed,
            outcome.questions_answered,
            outcome.accuracy_pct,
            outcome.total_xp,
            outcome.final_level,
            outcome.best_streak,
            outcome.achievements.len(),
        );
    }
    out
}
