//! Automated QA harness for the Pokerdrill progression core: drives seeded
//! simulated quiz sessions under answer strategies and reports the
//! progression outcomes.
mod assets;
mod reports;
mod simulation;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use colored::Colorize;
use std::fs;
use std::path::PathBuf;

use pokerdrill_game::{DifficultyFilter, SessionConfig, StreetFilter};
use simulation::{AnswerStrategy, SimulationConfig, SimulationOutcome, run_simulation};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ReportFormat {
    /// Colored console summary
    Console,
    /// Machine-readable JSON
    Json,
    /// Markdown table
    Markdown,
}

#[derive(Debug, Parser)]
#[command(name = "pokerdrill-tester", version)]
#[command(about = "Automated QA simulations for the Pokerdrill progression core")]
struct Args {
    /// Seeds to run (comma-separated)
    #[arg(long, default_value = "1337")]
    seeds: String,

    /// Answer strategies to run (comma-separated: optimal,random,mixed)
    #[arg(long, default_value = "optimal")]
    strategies: String,

    /// List all available strategies and exit
    #[arg(long)]
    list_strategies: bool,

    /// Sessions per seed
    #[arg(long, default_value_t = 10)]
    sessions: u32,

    /// Questions per session
    #[arg(long, default_value_t = 10)]
    questions: u32,

    /// Difficulty filter (beginner|intermediate|advanced|expert|all)
    #[arg(long, default_value = "all")]
    difficulty: String,

    /// Street filter (preflop|flop|turn|river|postflop|all)
    #[arg(long, default_value = "all")]
    street: String,

    /// Output report format
    #[arg(long, value_enum, default_value_t = ReportFormat::Console)]
    report: ReportFormat,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// Path to a scenario catalog JSON (defaults to the bundled assets)
    #[arg(long)]
    catalog: Option<PathBuf>,
}

fn split_csv(s: &str) -> Vec<String> {
    s.split(',')
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
        .collect()
}

fn parse_seeds(raw: &str) -> Result<Vec<u64>> {
    split_csv(raw)
        .into_iter()
        .map(|seed| {
            seed.parse::<u64>()
                .with_context(|| format!("invalid seed: {seed}"))
        })
        .collect()
}

fn parse_strategies(raw: &str) -> Result<Vec<AnswerStrategy>> {
    split_csv(raw)
        .into_iter()
        .map(|name| name.parse::<AnswerStrategy>().map_err(anyhow::Error::msg))
        .collect()
}

fn session_config(args: &Args) -> Result<SessionConfig> {
    let difficulty = DifficultyFilter::try_from(args.difficulty.clone())?;
    let street_filter = StreetFilter::try_from(args.street.clone())?;
    Ok(SessionConfig {
        question_count: args.questions,
        difficulty,
        street_filter,
        topics: Vec::new(),
    })
}

fn emit_report(args: &Args, outcomes: &[SimulationOutcome]) -> Result<()> {
    let rendered = match args.report {
        ReportFormat::Console => {
            reports::generate_console_report(outcomes);
            return Ok(());
        }
        ReportFormat::Json => reports::generate_json_report(outcomes)?,
        ReportFormat::Markdown => reports::generate_markdown_report(outcomes),
    };

    if let Some(path) = &args.output {
        fs::write(path, rendered).with_context(|| format!("writing report to {}", path.display()))?;
        println!("Report written to {}", path.display().to_string().green());
    } else {
        println!("{rendered}");
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if args.list_strategies {
        println!("Available strategies:");
        for strategy in AnswerStrategy::ALL {
            println!("  {strategy}");
        }
        return Ok(());
    }

    let seeds = parse_seeds(&args.seeds)?;
    let strategies = parse_strategies(&args.strategies)?;
    let session = session_config(&args)?;
    let catalog = assets::load_catalog(args.catalog.as_deref());
    println!(
        "Running {} strategies x {} seeds over {} scenarios",
        strategies.len().to_string().bold(),
        seeds.len().to_string().bold(),
        catalog.len().to_string().bold()
    );

    let mut outcomes = Vec::with_capacity(strategies.len() * seeds.len());
    for strategy in &strategies {
        for seed in &seeds {
            let config = SimulationConfig {
                seed: *seed,
                sessions: args.sessions,
                session: session.clone(),
            };
            log::debug!("simulating {strategy} with seed {seed}");
            outcomes.push(run_simulation(&catalog, *strategy, &config));
        }
    }

    emit_report(&args, &outcomes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_csv_trims_and_filters() {
        let parts = split_csv(" 1337, ,42,  7 ");
        assert_eq!(parts, vec!["1337", "42", "7"]);
    }

    #[test]
    fn seeds_parse_or_explain() {
        assert_eq!(parse_seeds("1,2,3").unwrap(), vec![1, 2, 3]);
        assert!(parse_seeds("one").is_err());
    }

    #[test]
    fn strategy_lists_parse() {
        let strategies = parse_strategies("optimal, mixed").unwrap();
        assert_eq!(
            strategies,
            vec![AnswerStrategy::Optimal, AnswerStrategy::Mixed]
        );
        assert!(parse_strategies("psychic").is_err());
    }
}
