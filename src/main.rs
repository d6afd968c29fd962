mod catalog;
mod coach;
mod config;
mod error;
mod models;
mod queue;
mod scheduler;
mod stats;
mod store;
mod tui;

use chrono::{DateTime, Local};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use catalog::Catalog;
use coach::{now_ms, Coach};
use error::{Error, Result};
use models::{JsonOutput, ProgressRecord, Score};
use scheduler::{DAY_MS, MINUTE_MS};
use store::{ProgressStore, SqliteStore};

#[derive(Parser)]
#[command(name = "coach")]
#[command(about = "A spaced-repetition flashcard coach for interview preparation")]
#[command(version)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Catalog JSON file (defaults to the built-in catalog)
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database
    Init,

    /// Show the study queue: unseen items first, then most overdue
    Queue {
        /// Only show the first N items
        #[arg(long, short)]
        limit: Option<usize>,
    },

    /// Show the next item to study
    Next,

    /// Show an item with its progress and rating history
    Show {
        /// Item ID
        id: i64,
    },

    /// Record a rating for an item
    Review {
        /// Item ID
        id: i64,

        /// Rating: 1 (poor), 2 (ok) or 3 (good)
        #[arg(long, short)]
        score: String,
    },

    /// Correct the most recent rating of an item
    Revise {
        /// Item ID
        id: i64,

        /// Corrected rating: 1 (poor), 2 (ok) or 3 (good)
        #[arg(long, short)]
        score: String,
    },

    /// Postpone an item for 20 minutes without rating it
    Skip {
        /// Item ID
        id: i64,
    },

    /// Show learning statistics
    Stats,

    /// Export progress as JSON
    Export {
        /// Write to this file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Replace all progress with a previous export
    Import {
        /// Export file to read
        file: PathBuf,
    },

    /// Launch interactive terminal UI
    Tui,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let json = cli.json;

    if let Err(e) = run(cli) {
        if json {
            if let Ok(out) = serde_json::to_string(&JsonOutput::<()>::err(e.to_string())) {
                println!("{}", out);
            }
        } else {
            eprintln!("Error: {}", e);
        }
        std::process::exit(1);
    }
}

fn parse_score(s: &str) -> Result<Score> {
    Score::from_str(s).ok_or_else(|| Error::InvalidScore(s.to_string()))
}

fn load_catalog(flag: Option<PathBuf>) -> Result<Catalog> {
    match config::catalog_path(flag) {
        Some(path) => {
            log::debug!("Loading catalog from {}", path.display());
            Catalog::load(path)
        }
        None => Catalog::builtin(),
    }
}

fn print_json<T: serde::Serialize>(data: T) -> Result<()> {
    println!("{}", serde_json::to_string(&JsonOutput::ok(data))?);
    Ok(())
}

// Export text re-read as a value so `--json` can wrap it in an envelope.
fn export_document(data: &str) -> Result<serde_json::Value> {
    Ok(serde_json::from_str(data)?)
}

fn run(cli: Cli) -> Result<()> {
    let db_path = config::db_path();
    let store = SqliteStore::open(&db_path)?;
    store.init()?;

    let catalog = load_catalog(cli.catalog)?;
    let mut coach = Coach::new(catalog, store);

    match cli.command {
        Commands::Init => {
            if cli.json {
                print_json(())?;
            } else {
                println!("Database initialized at: {}", db_path.display());
            }
        }

        Commands::Queue { limit } => {
            let progress = coach.store().get();
            let mut queue = coach.get_smart_queue();
            if let Some(n) = limit {
                queue.truncate(n);
            }

            if cli.json {
                let entries: Vec<_> = queue
                    .iter()
                    .map(|item| {
                        serde_json::json!({
                            "item": item,
                            "progress": progress.get(&item.id),
                        })
                    })
                    .collect();
                print_json(entries)?;
            } else if queue.is_empty() {
                println!("No study items in catalog.");
            } else {
                let now = now_ms();
                println!("{:<5} {:<4} {:<14} QUESTION", "ID", "BOX", "DUE");
                println!("{}", "-".repeat(70));
                for item in &queue {
                    let (box_text, due_text) = match progress.get(&item.id) {
                        Some(p) => (p.box_level.to_string(), format_due(p.next_review_at, now)),
                        None => ("-".to_string(), "new".to_string()),
                    };
                    println!(
                        "{:<5} {:<4} {:<14} {}",
                        item.id,
                        box_text,
                        due_text,
                        truncate(&item.text, 45)
                    );
                }
            }
        }

        Commands::Next => {
            let queue = coach.get_smart_queue();
            match queue.first() {
                Some(item) => {
                    let progress = coach.progress_for(item.id);
                    if cli.json {
                        print_json(serde_json::json!({
                            "item": item,
                            "progress": progress,
                        }))?;
                    } else {
                        println!("=== Next Question ===");
                        println!();
                        println!("{}", item.text);
                        println!();
                        let category = coach
                            .catalog()
                            .category_title(&item.category_id)
                            .unwrap_or(&item.category_id);
                        println!("Category: {}", category);
                        println!("Difficulty: {}", item.difficulty.label());
                        match &progress {
                            Some(p) => println!("Box: {} ({})", p.box_level, p.box_label()),
                            None => println!("Not studied yet"),
                        }
                        println!();
                        println!("After answering, record how it went with:");
                        println!("  coach review {} --score <1|2|3>", item.id);
                        println!("or postpone it with:");
                        println!("  coach skip {}", item.id);
                    }
                }
                None if cli.json => print_json(())?,
                None => println!("No study items in catalog."),
            }
        }

        Commands::Show { id } => {
            let item = coach
                .catalog()
                .get(id)
                .cloned()
                .ok_or(Error::UnknownItem(id))?;
            let progress = coach.progress_for(id);

            if cli.json {
                print_json(serde_json::json!({
                    "item": item,
                    "progress": progress,
                }))?;
            } else {
                println!("Question: {}", item.text);
                println!("ID: {}", item.id);
                println!(
                    "Category: {}",
                    coach
                        .catalog()
                        .category_title(&item.category_id)
                        .unwrap_or(&item.category_id)
                );
                println!("Difficulty: {}", item.difficulty.label());
                if let Some(answer) = &item.answer {
                    println!("Answer: {}", answer);
                }
                for source in &item.sources {
                    println!("Source: {} <{}>", source.name, source.url);
                }

                if let Some(p) = progress {
                    println!();
                    print_progress(&p);
                    if !p.history.is_empty() {
                        println!();
                        println!("--- History ---");
                        for entry in &p.history {
                            println!(
                                "{}  {} ({})",
                                format_time(entry.at),
                                entry.score.as_u8(),
                                entry.score.label()
                            );
                        }
                    }
                }
            }
        }

        Commands::Review { id, score } => {
            let score = parse_score(&score)?;
            let record = coach.save_progress(id, score)?;

            if cli.json {
                print_json(&record)?;
            } else {
                println!("Rated item {} as {}.", id, score.label());
                print_progress(&record);
            }
        }

        Commands::Revise { id, score } => {
            let score = parse_score(&score)?;
            let revised = coach.update_last_rating(id, score)?;

            if cli.json {
                print_json(&revised)?;
            } else {
                match revised {
                    Some(record) => {
                        println!("Last rating of item {} changed to {}.", id, score.label());
                        print_progress(&record);
                    }
                    None => println!("Item {} has no rating to revise.", id),
                }
            }
        }

        Commands::Skip { id } => {
            let record = coach.skip_question(id)?;

            if cli.json {
                print_json(&record)?;
            } else {
                println!(
                    "Skipped item {}. It comes back at {}.",
                    id,
                    format_time(record.next_review_at)
                );
            }
        }

        Commands::Stats => {
            let stats = coach.get_stats();
            if cli.json {
                print_json(stats)?;
            } else {
                println!("=== Learning Statistics ===");
                println!(
                    "Total questions: {} in {} categories",
                    stats.total,
                    coach.catalog().categories().len()
                );
                println!("Started: {}", stats.started);
                println!("Learned (box 3+): {}", stats.learned);
                println!("Struggling (box 1): {}", stats.struggling);
                println!("Due for review: {}", stats.due);
            }
        }

        Commands::Export { output } => {
            let data = coach.export_data()?;
            match output {
                Some(path) => {
                    std::fs::write(&path, data)?;
                    if cli.json {
                        print_json(())?;
                    } else {
                        println!("Progress exported to: {}", path.display());
                    }
                }
                None if cli.json => print_json(export_document(&data)?)?,
                None => println!("{}", data),
            }
        }

        Commands::Import { file } => {
            let data = std::fs::read_to_string(&file)?;
            let count = coach.import_data(&data)?;

            if cli.json {
                print_json(serde_json::json!({ "imported": count }))?;
            } else {
                println!("Imported progress for {} questions.", count);
            }
        }

        Commands::Tui => {
            tui::run(coach)?;
        }
    }

    Ok(())
}

fn print_progress(p: &ProgressRecord) {
    println!("--- Progress ---");
    println!("Box: {} ({})", p.box_level, p.box_label());
    if let Some(score) = p.last_score() {
        println!("Last rating: {} ({})", score.as_u8(), score.label());
        println!("Last reviewed: {}", format_time(p.last_reviewed_at));
    }
    println!("Next review: {}", format_time(p.next_review_at));
}

pub fn format_time(ms: i64) -> String {
    match DateTime::from_timestamp_millis(ms) {
        Some(dt) => dt.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string(),
        None => ms.to_string(),
    }
}

/// Short relative description of a due time, e.g. "in 3d" or "overdue 2h".
pub fn format_due(next_review_at: i64, now: i64) -> String {
    let diff = next_review_at - now;
    let span = diff.abs();
    let amount = if span >= DAY_MS {
        format!("{}d", span / DAY_MS)
    } else if span >= 60 * MINUTE_MS {
        format!("{}h", span / (60 * MINUTE_MS))
    } else {
        format!("{}m", span / MINUTE_MS)
    };

    if diff > 0 {
        format!("in {}", amount)
    } else {
        format!("overdue {}", amount)
    }
}

pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    mod truncate_tests {
        use super::*;

        #[test]
        fn truncate_short_string() {
            assert_eq!(truncate("hello", 10), "hello");
        }

        #[test]
        fn truncate_exact_length() {
            assert_eq!(truncate("hello", 5), "hello");
        }

        #[test]
        fn truncate_long_string() {
            assert_eq!(truncate("hello world", 8), "hello...");
        }

        #[test]
        fn truncate_counts_chars_not_bytes() {
            assert_eq!(truncate("Требования к системе", 8), "Требо...");
        }
    }

    mod format_due_tests {
        use super::*;

        #[test]
        fn future_days() {
            assert_eq!(format_due(3 * DAY_MS + 5, 0), "in 3d");
        }

        #[test]
        fn future_minutes() {
            assert_eq!(format_due(10 * MINUTE_MS, 0), "in 10m");
        }

        #[test]
        fn overdue_hours() {
            assert_eq!(format_due(0, 5 * 60 * MINUTE_MS), "overdue 5h");
        }

        #[test]
        fn exactly_now_is_overdue() {
            assert_eq!(format_due(1_000, 1_000), "overdue 0m");
        }
    }

    mod score_parsing_tests {
        use super::*;

        #[test]
        fn accepts_numbers_and_words() {
            assert_eq!(parse_score("3").unwrap(), Score::Good);
            assert_eq!(parse_score("ok").unwrap(), Score::Ok);
        }

        #[test]
        fn rejects_out_of_range() {
            assert!(matches!(parse_score("4"), Err(Error::InvalidScore(s)) if s == "4"));
        }
    }

    mod export_output_tests {
        use super::*;
        use crate::store::MemoryStore;

        #[test]
        fn json_mode_wraps_export_in_envelope() {
            let catalog = Catalog::from_json(
                r#"{ "categories": [ { "id": "c", "title": "C", "questions": [
                    { "id": 1, "question": "Q?", "difficulty": "basic" } ] } ] }"#,
            )
            .unwrap();
            let mut coach = Coach::new(catalog, MemoryStore::new());
            coach.save_progress(1, Score::Good).unwrap();

            let document = export_document(&coach.export_data().unwrap()).unwrap();
            let output = serde_json::to_value(JsonOutput::ok(document)).unwrap();

            assert_eq!(output["success"], true);
            assert_eq!(output["data"]["progress"]["1"]["box"], 1);
            assert!(output["error"].is_null());
        }
    }

    mod cli_parsing_tests {
        use super::*;

        #[test]
        fn parse_init_command() {
            let cli = Cli::try_parse_from(["coach", "init"]).unwrap();
            assert!(!cli.json);
            assert!(cli.catalog.is_none());
            assert!(matches!(cli.command, Commands::Init));
        }

        #[test]
        fn parse_global_flags() {
            let cli =
                Cli::try_parse_from(["coach", "stats", "--json", "--catalog", "cards.json"]).unwrap();
            assert!(cli.json);
            assert_eq!(cli.catalog, Some(PathBuf::from("cards.json")));
            assert!(matches!(cli.command, Commands::Stats));
        }

        #[test]
        fn parse_queue_with_limit() {
            let cli = Cli::try_parse_from(["coach", "queue", "-l", "5"]).unwrap();
            match cli.command {
                Commands::Queue { limit } => assert_eq!(limit, Some(5)),
                _ => panic!("Expected Queue command"),
            }
        }

        #[test]
        fn parse_review_command() {
            let cli = Cli::try_parse_from(["coach", "review", "7", "--score", "3"]).unwrap();
            match cli.command {
                Commands::Review { id, score } => {
                    assert_eq!(id, 7);
                    assert_eq!(score, "3");
                }
                _ => panic!("Expected Review command"),
            }
        }

        #[test]
        fn parse_revise_short_flag() {
            let cli = Cli::try_parse_from(["coach", "revise", "7", "-s", "poor"]).unwrap();
            match cli.command {
                Commands::Revise { id, score } => {
                    assert_eq!(id, 7);
                    assert_eq!(score, "poor");
                }
                _ => panic!("Expected Revise command"),
            }
        }

        #[test]
        fn parse_skip_and_show() {
            let cli = Cli::try_parse_from(["coach", "skip", "2"]).unwrap();
            assert!(matches!(cli.command, Commands::Skip { id: 2 }));

            let cli = Cli::try_parse_from(["coach", "show", "12"]).unwrap();
            assert!(matches!(cli.command, Commands::Show { id: 12 }));
        }

        #[test]
        fn parse_export_and_import() {
            let cli = Cli::try_parse_from(["coach", "export", "-o", "backup.json"]).unwrap();
            match cli.command {
                Commands::Export { output } => {
                    assert_eq!(output, Some(PathBuf::from("backup.json")))
                }
                _ => panic!("Expected Export command"),
            }

            let cli = Cli::try_parse_from(["coach", "import", "backup.json"]).unwrap();
            match cli.command {
                Commands::Import { file } => assert_eq!(file, PathBuf::from("backup.json")),
                _ => panic!("Expected Import command"),
            }
        }

        #[test]
        fn parse_missing_required_arg_fails() {
            assert!(Cli::try_parse_from(["coach", "review", "1"]).is_err());
            assert!(Cli::try_parse_from(["coach", "revise"]).is_err());
            assert!(Cli::try_parse_from(["coach", "import"]).is_err());
        }

        #[test]
        fn parse_invalid_command_fails() {
            assert!(Cli::try_parse_from(["coach", "invalid"]).is_err());
        }
    }
}
