mod catalog;
mod config;
mod error;
mod logging;
mod models;
mod reconciler;
mod store;
mod tracker;
mod tui;

use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;

use config::Config;
use error::TrackerError;
use models::{JsonOutput, ProblemView, TaskView};
use reconciler::{ProgressIntent, ProgressOutcome, Query, TaskIntent, TaskOutcome};
use tracker::Tracker;

#[derive(Parser)]
#[command(name = "tracker")]
#[command(about = "Track a to-do list and your progress through a practice-problem catalog")]
#[command(version)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Directory holding tasks.json, user_progress.json and the catalog
    #[arg(long, global = true, default_value = ".")]
    dir: PathBuf,

    /// Catalog file; .json is read strictly, anything else as a relaxed array literal
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Log more (-v info, -vv debug, -vvv trace)
    #[arg(long, short, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the to-do list
    #[command(subcommand)]
    Todo(TodoCommands),

    /// Browse the problem catalog and record progress
    #[command(subcommand)]
    Problems(ProblemCommands),

    /// Show completion statistics
    Stats,

    /// Launch interactive terminal UI
    Tui,
}

#[derive(Subcommand)]
enum TodoCommands {
    /// List tasks
    List {
        /// Only show tasks containing this text
        #[arg(long, short)]
        search: Option<String>,
    },

    /// Add a task
    Add {
        /// Task text
        text: String,
    },

    /// Flip a task between done and not done
    Toggle {
        /// Task ID
        id: u64,
    },

    /// Replace the text of a task
    Edit {
        /// Task ID
        id: u64,

        /// New text
        text: String,
    },

    /// Delete a task
    Delete {
        /// Task ID
        id: u64,
    },

    /// Delete every task
    Clear,
}

#[derive(Subcommand)]
enum ProblemCommands {
    /// List problems
    List {
        /// Only show this category ("All" for every category)
        #[arg(long, short)]
        category: Option<String>,

        /// Only show titles containing this text
        #[arg(long, short)]
        search: Option<String>,
    },

    /// List categories
    Categories,

    /// Mark a problem as done
    Done {
        /// Problem ID
        id: i64,
    },

    /// Mark a problem as not done
    Undo {
        /// Problem ID
        id: i64,
    },

    /// Forget all recorded progress
    Clear,

    /// Suggest a random unsolved problem
    Next {
        /// Pick from this category only
        #[arg(long, short)]
        category: Option<String>,
    },

    /// Validate the catalog file and report problems with it
    Check,
}

fn main() {
    let cli = Cli::parse();
    let json = cli.json;

    if let Err(e) = run(cli) {
        if json {
            if let Ok(out) = serde_json::to_string(&JsonOutput::<()>::err(e.to_string())) {
                println!("{}", out);
            }
        } else {
            eprintln!("Error: {}", e);
            if let Some(err) = e.downcast_ref::<TrackerError>() {
                if let Some(text) = err.diagnostic_text() {
                    eprintln!("--- offending text ---");
                    eprintln!("{}", text);
                }
                if let Some(hint) = error_hint(err) {
                    eprintln!("{}", hint);
                }
            }
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::new(&cli.dir, cli.catalog.clone());

    if matches!(cli.command, Commands::Tui) {
        let _guard = logging::init_file(&config.log_path(), cli.verbose)?;
        return tui::run(Tracker::open(config));
    }

    logging::init_stderr(cli.verbose);
    let tracker = Tracker::open(config);

    match cli.command {
        Commands::Todo(todo_cmd) => match todo_cmd {
            TodoCommands::List { search } => {
                let view = tracker.task_view(search.as_deref())?;
                if cli.json {
                    print_json(&view)?;
                } else {
                    print_tasks(&view);
                }
            }

            TodoCommands::Add { text } => {
                let outcome = tracker.apply_task(TaskIntent::Add(text))?;
                report_task(cli.json, &outcome)?;
            }

            TodoCommands::Toggle { id } => {
                let outcome = tracker.apply_task(TaskIntent::Toggle(id))?;
                report_task(cli.json, &outcome)?;
            }

            TodoCommands::Edit { id, text } => {
                let outcome = tracker.apply_task(TaskIntent::Edit { id, text })?;
                report_task(cli.json, &outcome)?;
            }

            TodoCommands::Delete { id } => {
                let outcome = tracker.apply_task(TaskIntent::Delete(id))?;
                report_task(cli.json, &outcome)?;
            }

            TodoCommands::Clear => {
                let outcome = tracker.apply_task(TaskIntent::ClearAll)?;
                report_task(cli.json, &outcome)?;
            }
        },

        Commands::Problems(problem_cmd) => match problem_cmd {
            ProblemCommands::List { category, search } => {
                let query = Query::new(category.as_deref(), search.as_deref());
                let view = tracker.problem_view(&query)?;
                if cli.json {
                    print_json(&view)?;
                } else {
                    print_problems(&view);
                }
            }

            ProblemCommands::Categories => {
                let view = tracker.problem_view(&Query::default())?;
                if cli.json {
                    print_json(&view.categories)?;
                } else {
                    if let Some(warning) = &view.warning {
                        eprintln!("Warning: {}", warning);
                    }
                    for category in &view.categories {
                        println!("{}", category);
                    }
                }
            }

            ProblemCommands::Done { id } => {
                let outcome = tracker.apply_progress(ProgressIntent::MarkDone(id))?;
                report_progress(cli.json, &outcome)?;
            }

            ProblemCommands::Undo { id } => {
                let outcome = tracker.apply_progress(ProgressIntent::Undo(id))?;
                report_progress(cli.json, &outcome)?;
            }

            ProblemCommands::Clear => {
                let outcome = tracker.apply_progress(ProgressIntent::ClearProgress)?;
                report_progress(cli.json, &outcome)?;
            }

            ProblemCommands::Next { category } => {
                let query = Query::new(category.as_deref(), None);
                let picked = tracker.next_unsolved(&query, &mut rand::thread_rng())?;
                if cli.json {
                    print_json(&picked)?;
                } else if let Some(problem) = picked {
                    println!("=== Next Problem ===");
                    println!();
                    println!("{} (ID: {})", problem.title, problem.id);
                    println!("Category: {}", problem.category);
                    println!("Difficulty: {}", problem.difficulty.as_str());
                    if !problem.link.is_empty() {
                        println!("Link: {}", problem.link);
                    }
                    println!();
                    println!("When solved, record it with:");
                    println!("  tracker problems done {}", problem.id);
                } else {
                    println!("Nothing left to solve here. Nice work!");
                }
            }

            ProblemCommands::Check => {
                let catalog = tracker.catalog();
                let path = tracker.config().catalog_path.display().to_string();
                match catalog.issue {
                    Some(e) => return Err(e.into()),
                    None if cli.json => print_json(serde_json::json!({
                        "path": path,
                        "problems": catalog.problems.len(),
                        "categories": catalog::categories(&catalog.problems),
                    }))?,
                    None => {
                        println!("Catalog: {}", path);
                        println!("Problems: {}", catalog.problems.len());
                        println!(
                            "Categories: {}",
                            catalog::categories(&catalog.problems).join(", ")
                        );
                    }
                }
            }
        },

        Commands::Stats => {
            let stats = tracker.stats()?;
            if cli.json {
                print_json(serde_json::json!({
                    "tasks_total": stats.tasks_total,
                    "tasks_done": stats.tasks_done,
                    "problems_total": stats.problems_total,
                    "problems_completed": stats.problems_completed,
                    "easy_completed": stats.easy_completed,
                    "medium_completed": stats.medium_completed,
                    "hard_completed": stats.hard_completed,
                    "completion_rate": stats.completion_rate()
                }))?;
            } else {
                println!("=== Progress ===");
                println!("Tasks done: {} / {}", stats.tasks_done, stats.tasks_total);
                println!(
                    "Problems completed: {} / {} ({:.0}%)",
                    stats.problems_completed,
                    stats.problems_total,
                    stats.completion_rate()
                );
                println!("  Easy: {}", stats.easy_completed);
                println!("  Medium: {}", stats.medium_completed);
                println!("  Hard: {}", stats.hard_completed);
            }
        }

        Commands::Tui => unreachable!("handled before logging setup"),
    }

    Ok(())
}

fn print_json<T: Serialize>(data: T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string(&JsonOutput::ok(data))?);
    Ok(())
}

fn report_task(json: bool, outcome: &TaskOutcome) -> Result<(), serde_json::Error> {
    if json {
        return print_json(outcome);
    }
    match outcome {
        TaskOutcome::Added(item) => println!("Added task '{}' with ID: {}", item.text, item.id),
        TaskOutcome::Toggled(item) => println!(
            "Task {} marked {}.",
            item.id,
            if item.done { "done" } else { "not done" }
        ),
        TaskOutcome::Edited(item) => println!("Task {} updated.", item.id),
        TaskOutcome::Deleted(item) => println!("Task {} deleted.", item.id),
        TaskOutcome::Cleared(count) => println!("Cleared {} task(s).", count),
        TaskOutcome::Ignored => println!("Nothing to do: task text is empty."),
    }
    Ok(())
}

fn report_progress(json: bool, outcome: &ProgressOutcome) -> Result<(), serde_json::Error> {
    if json {
        return print_json(outcome);
    }
    match outcome {
        ProgressOutcome::Completed(id) => println!("Problem {} marked done.", id),
        ProgressOutcome::Reopened(id) => println!("Problem {} marked not done.", id),
        ProgressOutcome::Cleared(count) => println!("Cleared progress for {} problem(s).", count),
        ProgressOutcome::Unchanged(id) => println!("Problem {} already in that state.", id),
    }
    Ok(())
}

fn print_tasks(view: &TaskView) {
    if view.items.is_empty() {
        if view.total == 0 {
            println!("No tasks yet.");
        } else {
            println!("No tasks match.");
        }
        return;
    }

    println!("{:<5} {:<5} TASK", "ID", "DONE");
    println!("{}", "-".repeat(70));
    for item in &view.items {
        let mark = if item.done { "[x]" } else { "[ ]" };
        println!("{:<5} {:<5} {}", item.id, mark, truncate(&item.text, 58));
    }
    println!();
    println!("{} of {} done", view.done, view.total);
}

fn print_problems(view: &ProblemView) {
    if let Some(warning) = &view.warning {
        eprintln!("Warning: {}", warning);
    }

    println!(
        "Showing {} problems ({})",
        view.shown, view.selected_category
    );
    if !view.rows.is_empty() {
        println!(
            "{:<5} {:<5} {:<7} {:<18} TITLE",
            "ID", "DONE", "LEVEL", "CATEGORY"
        );
        println!("{}", "-".repeat(78));
        for row in &view.rows {
            let mark = if row.completed { "[x]" } else { "[ ]" };
            println!(
                "{:<5} {:<5} {:<7} {:<18} {}",
                row.problem.id,
                mark,
                row.problem.difficulty.as_str(),
                truncate(&row.problem.category, 16),
                truncate(&row.problem.title, 38)
            );
        }
    }
    println!();
    println!("Completed: {} / {}", view.completed, view.total);
}

fn error_hint(err: &TrackerError) -> Option<&'static str> {
    if !err.is_not_found() {
        return None;
    }
    match err {
        TrackerError::NotFound { kind: "Task", .. } => {
            Some("Run `tracker todo list` to see task ids.")
        }
        _ => Some("Run `tracker problems list` to see problem ids."),
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
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
        fn truncate_multibyte() {
            assert_eq!(truncate("ünïcødé text", 6), "ünï...");
        }

        #[test]
        fn truncate_empty_string() {
            assert_eq!(truncate("", 10), "");
        }
    }

    mod error_hint_tests {
        use super::*;

        #[test]
        fn not_found_points_at_the_right_list() {
            assert_eq!(
                error_hint(&TrackerError::task_not_found(3)),
                Some("Run `tracker todo list` to see task ids.")
            );
            assert_eq!(
                error_hint(&TrackerError::problem_not_found(7)),
                Some("Run `tracker problems list` to see problem ids.")
            );
        }

        #[test]
        fn other_errors_have_no_hint() {
            assert_eq!(error_hint(&TrackerError::Format("no '['".into())), None);
        }
    }

    mod cli_parsing_tests {
        use super::*;

        #[test]
        fn parse_todo_list() {
            let cli = Cli::try_parse_from(["tracker", "todo", "list"]).unwrap();
            assert!(!cli.json);
            assert_eq!(cli.dir, PathBuf::from("."));
            match cli.command {
                Commands::Todo(TodoCommands::List { search }) => assert!(search.is_none()),
                _ => panic!("Expected Todo List command"),
            }
        }

        #[test]
        fn parse_todo_list_with_search() {
            let cli = Cli::try_parse_from(["tracker", "todo", "list", "-s", "milk"]).unwrap();
            match cli.command {
                Commands::Todo(TodoCommands::List { search }) => {
                    assert_eq!(search, Some("milk".to_string()));
                }
                _ => panic!("Expected Todo List command"),
            }
        }

        #[test]
        fn parse_todo_add() {
            let cli = Cli::try_parse_from(["tracker", "todo", "add", "Buy milk"]).unwrap();
            match cli.command {
                Commands::Todo(TodoCommands::Add { text }) => assert_eq!(text, "Buy milk"),
                _ => panic!("Expected Todo Add command"),
            }
        }

        #[test]
        fn parse_todo_edit() {
            let cli = Cli::try_parse_from(["tracker", "todo", "edit", "3", "Buy oat milk"]).unwrap();
            match cli.command {
                Commands::Todo(TodoCommands::Edit { id, text }) => {
                    assert_eq!(id, 3);
                    assert_eq!(text, "Buy oat milk");
                }
                _ => panic!("Expected Todo Edit command"),
            }
        }

        #[test]
        fn parse_todo_toggle_and_delete() {
            let cli = Cli::try_parse_from(["tracker", "todo", "toggle", "4"]).unwrap();
            assert!(matches!(
                cli.command,
                Commands::Todo(TodoCommands::Toggle { id: 4 })
            ));

            let cli = Cli::try_parse_from(["tracker", "todo", "delete", "5"]).unwrap();
            assert!(matches!(
                cli.command,
                Commands::Todo(TodoCommands::Delete { id: 5 })
            ));
        }

        #[test]
        fn parse_problems_list_with_filters() {
            let cli = Cli::try_parse_from([
                "tracker", "problems", "list", "--category", "Arrays", "-s", "sum",
            ])
            .unwrap();
            match cli.command {
                Commands::Problems(ProblemCommands::List { category, search }) => {
                    assert_eq!(category, Some("Arrays".to_string()));
                    assert_eq!(search, Some("sum".to_string()));
                }
                _ => panic!("Expected Problems List command"),
            }
        }

        #[test]
        fn parse_problems_done_and_undo() {
            let cli = Cli::try_parse_from(["tracker", "problems", "done", "12"]).unwrap();
            assert!(matches!(
                cli.command,
                Commands::Problems(ProblemCommands::Done { id: 12 })
            ));

            let cli = Cli::try_parse_from(["tracker", "problems", "undo", "12"]).unwrap();
            assert!(matches!(
                cli.command,
                Commands::Problems(ProblemCommands::Undo { id: 12 })
            ));
        }

        #[test]
        fn parse_global_flags() {
            let cli = Cli::try_parse_from([
                "tracker",
                "--dir",
                "/tmp/dsa",
                "--catalog",
                "450.js",
                "-vv",
                "stats",
                "--json",
            ])
            .unwrap();
            assert!(cli.json);
            assert_eq!(cli.dir, PathBuf::from("/tmp/dsa"));
            assert_eq!(cli.catalog, Some(PathBuf::from("450.js")));
            assert_eq!(cli.verbose, 2);
            assert!(matches!(cli.command, Commands::Stats));
        }

        #[test]
        fn parse_tui_command() {
            let cli = Cli::try_parse_from(["tracker", "tui"]).unwrap();
            assert!(matches!(cli.command, Commands::Tui));
        }

        #[test]
        fn parse_invalid_command_fails() {
            assert!(Cli::try_parse_from(["tracker", "invalid"]).is_err());
        }

        #[test]
        fn parse_missing_required_arg_fails() {
            assert!(Cli::try_parse_from(["tracker", "todo", "add"]).is_err());
            assert!(Cli::try_parse_from(["tracker", "todo", "edit", "1"]).is_err());
            assert!(Cli::try_parse_from(["tracker", "problems", "done"]).is_err());
        }

        #[test]
        fn parse_non_numeric_id_fails() {
            assert!(Cli::try_parse_from(["tracker", "todo", "toggle", "abc"]).is_err());
        }
    }
}
