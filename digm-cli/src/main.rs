//! digm - goal progression and coaching from the terminal
//!
//! Thin driver over digm-core: loads the session, runs one engine operation,
//! prints the result. All state lives in the core library and its store.
//!
//! Uses XDG Base Directory specification for file locations:
//! - Database: $XDG_DATA_HOME/digm/data.db (~/.local/share/digm/data.db)
//! - Logs: $XDG_STATE_HOME/digm/digm.log (~/.local/state/digm/digm.log)
//! - Config: $XDG_CONFIG_HOME/digm/config.toml (~/.config/digm/config.toml)

use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use digm_core::focus::FocusGoal;
use digm_core::summary::ProfileSummary;
use digm_core::sync::SyncClient;
use digm_core::{
    quotes, Config, Database, EngineEvent, GoalPatch, NewGoal, NewJournalEntry, NewTask, Session,
    Task, TaskStatus, Timeframe,
};

#[derive(Parser)]
#[command(name = "digm")]
#[command(about = "Digm - goal progression and coaching from the terminal")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show profile summary, focus goals, and the quote of the day
    Status {
        /// Emit the summary as JSON instead of the terminal view
        #[arg(long)]
        json: bool,
    },
    /// List all goals with progress
    Goals,
    /// List tasks grouped by status
    Tasks,
    /// Create a goal (with optional initial tasks)
    AddGoal {
        /// Goal title
        title: String,
        /// Due date (YYYY-MM-DD)
        #[arg(long)]
        due: String,
        /// Timeframe: 10year, 5year, 1year, 3month, 1month, 1week
        #[arg(long, default_value = "3month")]
        timeframe: String,
        /// Initial task titles (repeatable)
        #[arg(long = "task")]
        tasks: Vec<String>,
    },
    /// Create a task
    AddTask {
        /// Task title
        title: String,
        /// Owning goal id (or unique prefix)
        #[arg(long)]
        goal: Option<String>,
        /// Flag as high impact
        #[arg(long)]
        high_impact: bool,
        /// Override the XP reward
        #[arg(long)]
        xp: Option<i64>,
    },
    /// Mark a task done
    Done {
        /// Task id (or unique prefix)
        task_id: String,
    },
    /// Move a task to a status: open, in-progress, done
    Move {
        /// Task id (or unique prefix)
        task_id: String,
        /// Target status
        status: String,
    },
    /// Delete a task
    DeleteTask {
        /// Task id (or unique prefix)
        task_id: String,
    },
    /// Delete a goal and its tasks
    DeleteGoal {
        /// Goal id (or unique prefix)
        goal_id: String,
    },
    /// Pin or unpin a goal (max 3 pinned, oldest pin evicted)
    Pin {
        /// Goal id (or unique prefix)
        goal_id: String,
    },
    /// Rename a goal or move its due date
    EditGoal {
        /// Goal id (or unique prefix)
        goal_id: String,
        /// New title
        #[arg(long)]
        title: Option<String>,
        /// New due date (YYYY-MM-DD)
        #[arg(long)]
        due: Option<String>,
    },
    /// Write a journal entry for today (or list recent entries)
    Journal {
        /// Entry content; omit to list recent entries
        content: Option<String>,
        #[arg(long, default_value = "")]
        accomplishments: String,
        #[arg(long, default_value = "")]
        blockers: String,
        #[arg(long, default_value = "")]
        gratitude: String,
        #[arg(long, default_value = "")]
        value_served: String,
    },
    /// Set the vision statement
    Vision {
        /// The vision text
        text: String,
    },
    /// Push the current snapshot to the configured sync server
    Sync,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    Config::ensure_xdg_env();
    let config = Config::load().context("failed to load configuration")?;
    let _log_guard = digm_core::logging::init(&config.logging).ok();

    let db = Database::open(&Config::database_path()).context("failed to open database")?;
    db.migrate().context("failed to run migrations")?;

    let mut session = Session::open(db, &config).context("failed to open session")?;
    print_events(&mut session);

    match cli.command {
        Command::Status { json } => {
            if json {
                print_status_json(&session)?;
            } else {
                print_status(&session);
            }
        }
        Command::Goals => print_goals(&session),
        Command::Tasks => print_tasks(&session),
        Command::AddGoal {
            title,
            due,
            timeframe,
            tasks,
        } => {
            let due_date = due.parse().context("due date must be YYYY-MM-DD")?;
            let timeframe: Timeframe = timeframe
                .parse()
                .map_err(|e: String| anyhow::anyhow!(e))?;
            let initial_tasks = tasks
                .into_iter()
                .map(|title| NewTask {
                    title,
                    ..Default::default()
                })
                .collect();

            let goal = session.mutate(|ledger| {
                ledger.add_goal(
                    NewGoal {
                        title,
                        due_date,
                        timeframe,
                        specific: None,
                        measurable: None,
                        achievable: None,
                        relevant: None,
                        time_bound: None,
                    },
                    initial_tasks,
                )
            })?;
            println!(
                "Created goal \"{}\" ({}) with {} task{}",
                goal.title,
                short_id(&goal.id),
                goal.task_ids.len(),
                plural(goal.task_ids.len())
            );
            print_events(&mut session);
        }
        Command::AddTask {
            title,
            goal,
            high_impact,
            xp,
        } => {
            let goal_id = match goal {
                Some(prefix) => Some(resolve_goal(&session, &prefix)?),
                None => None,
            };
            let task = session.mutate(|ledger| {
                ledger.add_task(NewTask {
                    title,
                    is_high_impact: high_impact,
                    goal_id,
                    xp_reward: xp,
                })
            })?;
            println!(
                "Created task \"{}\" ({}) worth {} XP",
                task.title,
                short_id(&task.id),
                task.xp_reward
            );
        }
        Command::Done { task_id } => {
            move_task(&mut session, &task_id, TaskStatus::Done)?;
        }
        Command::Move { task_id, status } => {
            let status: TaskStatus = status.parse().map_err(|e: String| anyhow::anyhow!(e))?;
            move_task(&mut session, &task_id, status)?;
        }
        Command::DeleteTask { task_id } => {
            let id = resolve_task(&session, &task_id)?;
            session.mutate(|ledger| ledger.delete_task(&id))?;
            println!("Deleted task {}", short_id(&id));
            print_events(&mut session);
        }
        Command::DeleteGoal { goal_id } => {
            let id = resolve_goal(&session, &goal_id)?;
            session.mutate(|ledger| ledger.delete_goal(&id))?;
            println!("Deleted goal {} and its tasks", short_id(&id));
        }
        Command::Pin { goal_id } => {
            let id = resolve_goal(&session, &goal_id)?;
            let pinned = session.mutate(|ledger| ledger.toggle_pin(&id))?;
            if pinned.contains(&id) {
                println!("Pinned ({} of 3 slots in use)", pinned.len());
            } else {
                println!("Unpinned ({} of 3 slots in use)", pinned.len());
            }
        }
        Command::EditGoal { goal_id, title, due } => {
            let id = resolve_goal(&session, &goal_id)?;
            let due_date = match due {
                Some(d) => Some(d.parse().context("due date must be YYYY-MM-DD")?),
                None => None,
            };
            let goal = session.mutate(|ledger| {
                ledger.update_goal(
                    &id,
                    GoalPatch {
                        title,
                        due_date,
                        ..Default::default()
                    },
                )
            })?;
            println!("Updated goal \"{}\"", goal.title);
            print_events(&mut session);
        }
        Command::Journal {
            content,
            accomplishments,
            blockers,
            gratitude,
            value_served,
        } => match content {
            Some(content) => {
                let entry = session.mutate(|ledger| {
                    ledger.add_journal_entry(NewJournalEntry {
                        date: Local::now().date_naive(),
                        content,
                        accomplishments,
                        blockers,
                        gratitude,
                        value_served,
                    })
                })?;
                println!("Journal entry saved (+{} XP)", entry.xp_earned);
                print_events(&mut session);
            }
            None => print_journal(&session),
        },
        Command::Vision { text } => {
            session.mutate(|ledger| {
                ledger.update_vision(text);
                Ok(())
            })?;
            println!("Vision updated");
        }
        Command::Sync => {
            if !config.sync.is_ready() {
                anyhow::bail!(
                    "sync is not configured; set [sync] in {}",
                    Config::config_path().display()
                );
            }
            let client = SyncClient::new(config.sync.clone())?;
            let snapshot = session.snapshot();
            let rt = tokio::runtime::Runtime::new().context("failed to start runtime")?;
            let response = rt.block_on(client.push_snapshot_with_retry(&snapshot))?;
            println!("Synced snapshot (server revision {})", response.revision);
        }
    }

    if session.failed_saves() > 0 {
        eprintln!(
            "warning: {} change(s) could not be written to disk; they are kept for this session only",
            session.failed_saves()
        );
    }

    Ok(())
}

// ============================================
// Mutations
// ============================================

fn move_task(session: &mut Session<Database>, prefix: &str, status: TaskStatus) -> Result<()> {
    let id = resolve_task(session, prefix)?;
    let change = session.mutate(|ledger| ledger.update_task_status(&id, status))?;

    match status {
        TaskStatus::Done if change.xp_awarded > 0 => {
            println!("✅ \"{}\" done (+{} XP)", change.task.title, change.xp_awarded)
        }
        _ => println!("Moved \"{}\" to {}", change.task.title, status.display_name()),
    }
    if let Some(progress) = &change.goal_progress {
        println!("   goal progress: {}%", progress.progress);
    }
    print_events(session);
    Ok(())
}

fn print_events(session: &mut Session<Database>) {
    for event in session.take_events() {
        match event {
            EngineEvent::GoalCompleted { title, .. } => {
                println!("🎉 Goal completed: {}", title);
            }
            EngineEvent::LevelUp { level } => {
                println!("⬆️  Level up! You reached level {}", level);
            }
        }
    }
}

// ============================================
// Views
// ============================================

fn print_status(session: &Session<Database>) {
    let summary = ProfileSummary::build(session.ledger());
    let profile = session.ledger().profile();

    println!();
    println!("╭{}╮", "─".repeat(56));
    println!("│{:^56}│", format!("DIGM - LEVEL {}", summary.level));
    println!("╰{}╯", "─".repeat(56));
    println!();

    if !profile.vision.is_empty() {
        println!("   \"{}\"", profile.vision);
        println!();
    }

    println!(
        "   XP:      {:<24} Streak: {}",
        summary.format_xp(),
        summary.format_streak()
    );
    println!("   Level:   {}", progress_bar(summary.level_progress_pct));
    println!(
        "   Goals:   {:<24} Tasks: {} open, {} done",
        format!("{} ({} complete)", summary.goal_count, summary.completed_goals),
        summary.open_tasks,
        summary.done_tasks
    );
    println!();

    let focus = session.ledger().focus_goals();
    if !focus.is_empty() {
        println!("🎯 FOCUS");
        for goal in &focus {
            print_focus_goal(goal, session.ledger().pinned_goal_ids());
        }
        println!();
    }

    let high_impact = session.ledger().high_impact_tasks();
    if !high_impact.is_empty() {
        println!("⚡ HIGH IMPACT");
        for task in &high_impact {
            println!(
                "   [{}] {} (+{} XP)",
                short_id(&task.id),
                task.title,
                task.xp_reward
            );
        }
        println!();
    }

    let quote = quotes::quote_for(Local::now().date_naive());
    println!("   \"{}\" — {}", quote.text, quote.author);
    println!();
}

fn print_status_json(session: &Session<Database>) -> Result<()> {
    let summary = ProfileSummary::build(session.ledger());
    let profile = session.ledger().profile();

    let json = serde_json::json!({
        "vision": profile.vision,
        "level": summary.level,
        "xp": summary.xp,
        "xp_into_level": summary.xp_into_level,
        "xp_to_next_level": summary.xp_to_next_level,
        "level_progress_pct": summary.level_progress_pct,
        "streak_days": summary.streak_days,
        "goals": {
            "total": summary.goal_count,
            "completed": summary.completed_goals,
        },
        "tasks": {
            "open": summary.open_tasks,
            "done": summary.done_tasks,
        },
        "journal_entries": summary.journal_entries,
        "focus": session.ledger().focus_goals().iter().map(|f| serde_json::json!({
            "id": f.goal.id,
            "title": f.goal.title,
            "progress": f.goal.progress,
            "total_tasks": f.total_tasks,
            "completed_tasks": f.completed_tasks,
            "earned_xp": f.earned_xp,
            "due_date": f.goal.due_date.to_string(),
        })).collect::<Vec<_>>(),
    });

    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}

fn print_goals(session: &Session<Database>) {
    let goals = session.ledger().goals();
    if goals.is_empty() {
        println!("No goals yet. Create one with: digm add-goal <title> --due YYYY-MM-DD");
        return;
    }

    println!();
    for goal in goals {
        let pinned = if session.ledger().pinned_goal_ids().contains(&goal.id) {
            "📌 "
        } else {
            "   "
        };
        println!(
            "{}[{}] {} ({}, due {})",
            pinned,
            short_id(&goal.id),
            goal.title,
            goal.timeframe.display_name(),
            goal.due_date
        );
        println!("      {} {}%", progress_bar(goal.progress as f64), goal.progress);
    }
    println!();
}

fn print_focus_goal(focus: &FocusGoal, pinned: &[String]) {
    let marker = if pinned.contains(&focus.goal.id) {
        "📌"
    } else {
        "  "
    };
    println!(
        "   {} [{}] {} - {}/{} tasks, {} XP earned, due {}",
        marker,
        short_id(&focus.goal.id),
        focus.goal.title,
        focus.completed_tasks,
        focus.total_tasks,
        focus.earned_xp,
        focus.goal.due_date
    );
}

fn print_tasks(session: &Session<Database>) {
    let buckets = session.ledger().tasks_by_status();

    println!();
    for (label, tasks) in [
        ("OPEN", &buckets.open),
        ("IN PROGRESS", &buckets.in_progress),
        ("DONE", &buckets.done),
    ] {
        println!("{} ({})", label, tasks.len());
        for task in tasks {
            print_task_line(session, task);
        }
        println!();
    }
}

fn print_task_line(session: &Session<Database>, task: &Task) {
    let impact = if task.is_high_impact { "⚡" } else { "  " };
    let goal_title = task
        .goal_id
        .as_deref()
        .and_then(|id| session.ledger().goal(id))
        .map(|g| format!("  ({})", g.title))
        .unwrap_or_default();
    println!(
        "   {} [{}] {} (+{} XP){}",
        impact,
        short_id(&task.id),
        task.title,
        task.xp_reward,
        goal_title
    );
}

fn print_journal(session: &Session<Database>) {
    let entries = session.ledger().journal_entries();
    if entries.is_empty() {
        println!("No journal entries yet. Write one with: digm journal \"how the day went\"");
        return;
    }

    println!();
    for entry in entries.iter().take(7) {
        println!("── {} (+{} XP)", entry.date, entry.xp_earned);
        println!("   {}", entry.content);
        if !entry.accomplishments.is_empty() {
            println!("   Accomplished: {}", entry.accomplishments);
        }
        if !entry.blockers.is_empty() {
            println!("   Blocked by:   {}", entry.blockers);
        }
        println!();
    }
}

// ============================================
// Helpers
// ============================================

/// Resolve a task id from an exact id or a unique prefix.
fn resolve_task(session: &Session<Database>, prefix: &str) -> Result<String> {
    let matches: Vec<&str> = session
        .ledger()
        .tasks()
        .iter()
        .map(|t| t.id.as_str())
        .filter(|id| id.starts_with(prefix))
        .collect();
    resolve_one(matches, prefix, "task")
}

/// Resolve a goal id from an exact id or a unique prefix.
fn resolve_goal(session: &Session<Database>, prefix: &str) -> Result<String> {
    let matches: Vec<&str> = session
        .ledger()
        .goals()
        .iter()
        .map(|g| g.id.as_str())
        .filter(|id| id.starts_with(prefix))
        .collect();
    resolve_one(matches, prefix, "goal")
}

fn resolve_one(matches: Vec<&str>, prefix: &str, kind: &str) -> Result<String> {
    match matches.len() {
        0 => anyhow::bail!("no {} matches \"{}\"", kind, prefix),
        1 => Ok(matches[0].to_string()),
        n => anyhow::bail!("\"{}\" is ambiguous ({} {}s match)", prefix, n, kind),
    }
}

fn short_id(id: &str) -> &str {
    &id[..id.len().min(8)]
}

fn progress_bar(pct: f64) -> String {
    let filled = ((pct / 10.0).round() as usize).min(10);
    format!("[{}{}]", "█".repeat(filled), "░".repeat(10 - filled))
}

fn plural(n: usize) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}
