//! Core domain types for digm
//!
//! These types represent the canonical data model of the progression engine:
//! a user profile driven by experience points, goals broken down by
//! timeframe, tasks that feed goal progress, and daily journal entries.
//!
//! ## Terminology
//!
//! | Term | Definition |
//! |------|------------|
//! | **XP** | Experience points, a monotonically-awarded counter driving level |
//! | **Level** | A tier derived purely from XP via the level table |
//! | **Goal** | A user objective with a due date and a timeframe horizon |
//! | **Task** | A unit of work, optionally tied to one goal |
//! | **High-impact task** | A task flagged as especially valuable, with a larger reward |
//! | **Pinned goal** | A goal the user marked for prominent display (max 3) |
//! | **Streak** | Count of consecutive calendar days with recorded activity |
//!
//! Progress on a goal is never set directly: it is always rederived from the
//! completion state of the goal's tasks.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Generate a fresh record id.
pub(crate) fn new_id() -> String {
    Uuid::new_v4().to_string()
}

// ============================================
// User profile
// ============================================

/// The per-user progression record.
///
/// `level` is derived state: after every mutation it must equal
/// `level_for(xp).level`. The engine recomputes it; callers never set it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Long-term vision statement (free text, may be empty)
    pub vision: String,
    /// Lifetime experience points, never negative
    pub xp: i64,
    /// Current level, derived from `xp`
    pub level: i32,
    /// Consecutive calendar days with recorded activity
    pub streak: i64,
    /// Last calendar day the user was active; `None` before first activity
    pub last_active: Option<NaiveDate>,
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            vision: String::new(),
            xp: 0,
            level: 1,
            streak: 0,
            last_active: None,
        }
    }
}

// ============================================
// Goals
// ============================================

/// Planning horizon for a goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Timeframe {
    TenYear,
    FiveYear,
    OneYear,
    ThreeMonth,
    OneMonth,
    OneWeek,
}

impl Timeframe {
    /// Returns the identifier used in database storage
    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::TenYear => "10year",
            Timeframe::FiveYear => "5year",
            Timeframe::OneYear => "1year",
            Timeframe::ThreeMonth => "3month",
            Timeframe::OneMonth => "1month",
            Timeframe::OneWeek => "1week",
        }
    }

    /// Returns the display name for this timeframe
    pub fn display_name(&self) -> &'static str {
        match self {
            Timeframe::TenYear => "10 Year",
            Timeframe::FiveYear => "5 Year",
            Timeframe::OneYear => "1 Year",
            Timeframe::ThreeMonth => "3 Month",
            Timeframe::OneMonth => "1 Month",
            Timeframe::OneWeek => "1 Week",
        }
    }
}

impl std::fmt::Display for Timeframe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Timeframe {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "10year" => Ok(Timeframe::TenYear),
            "5year" => Ok(Timeframe::FiveYear),
            "1year" => Ok(Timeframe::OneYear),
            "3month" => Ok(Timeframe::ThreeMonth),
            "1month" => Ok(Timeframe::OneMonth),
            "1week" => Ok(Timeframe::OneWeek),
            _ => Err(format!("unknown timeframe: {}", s)),
        }
    }
}

/// A user goal.
///
/// Owns the ordered list of task-id references but not the task records
/// themselves. `progress` is derived: `round(100 * done / total)` over the
/// goal's tasks, 0 when the goal has no tasks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    /// Unique identifier
    pub id: String,
    /// Goal title
    pub title: String,
    /// Target completion date
    pub due_date: NaiveDate,
    /// Planning horizon
    pub timeframe: Timeframe,
    /// Derived completion percentage (0-100)
    pub progress: i32,
    /// Ordered ids of the tasks created under this goal
    pub task_ids: Vec<String>,
    /// SMART detail: what exactly will be accomplished
    pub specific: Option<String>,
    /// SMART detail: how progress is measured
    pub measurable: Option<String>,
    /// SMART detail: why the goal is realistic
    pub achievable: Option<String>,
    /// SMART detail: why the goal matters
    pub relevant: Option<String>,
    /// SMART detail: the deadline framing
    pub time_bound: Option<String>,
}

/// Caller-supplied fields for creating a goal.
#[derive(Debug, Clone)]
pub struct NewGoal {
    pub title: String,
    pub due_date: NaiveDate,
    pub timeframe: Timeframe,
    pub specific: Option<String>,
    pub measurable: Option<String>,
    pub achievable: Option<String>,
    pub relevant: Option<String>,
    pub time_bound: Option<String>,
}

/// Partial update for an existing goal.
///
/// `progress` is deliberately absent: it is rederived from tasks on every
/// update, never accepted from the caller.
#[derive(Debug, Clone, Default)]
pub struct GoalPatch {
    pub title: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub timeframe: Option<Timeframe>,
    pub specific: Option<String>,
    pub measurable: Option<String>,
    pub achievable: Option<String>,
    pub relevant: Option<String>,
    pub time_bound: Option<String>,
}

// ============================================
// Tasks
// ============================================

/// Workflow state of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Open,
    InProgress,
    Done,
}

impl TaskStatus {
    /// Returns the identifier used in database storage
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Open => "open",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Done => "done",
        }
    }

    /// Returns the display name for this status
    pub fn display_name(&self) -> &'static str {
        match self {
            TaskStatus::Open => "Open",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Done => "Done",
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(TaskStatus::Open),
            "in_progress" | "in-progress" => Ok(TaskStatus::InProgress),
            "done" => Ok(TaskStatus::Done),
            _ => Err(format!("unknown task status: {}", s)),
        }
    }
}

/// A unit of work.
///
/// `is_completed` always mirrors `status == Done`, and `completed_at` is set
/// if and only if the task is done. A task may reference one goal; the
/// reference is weak in the data model, but the only goal-deletion path
/// cascades, so the engine never produces a dangling `goal_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier
    pub id: String,
    /// Task title
    pub title: String,
    /// Workflow state
    pub status: TaskStatus,
    /// Whether the user flagged this task as high impact
    pub is_high_impact: bool,
    /// Mirror of `status == Done`
    pub is_completed: bool,
    /// Owning goal, if any
    pub goal_id: Option<String>,
    /// XP granted when this task transitions into `Done`
    pub xp_reward: i64,
    /// When the task was created
    pub created_at: DateTime<Utc>,
    /// When the task entered `Done`; cleared when it leaves
    pub completed_at: Option<DateTime<Utc>>,
}

/// Caller-supplied fields for creating a task.
#[derive(Debug, Clone, Default)]
pub struct NewTask {
    pub title: String,
    pub is_high_impact: bool,
    pub goal_id: Option<String>,
    /// XP reward override; defaults from the rewards policy by impact flag
    pub xp_reward: Option<i64>,
}

// ============================================
// Journal
// ============================================

/// A daily journal entry.
///
/// `xp_earned` is fixed at creation; editing the text fields later never
/// re-awards XP.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Unique identifier
    pub id: String,
    /// Calendar day this entry is for
    pub date: NaiveDate,
    /// Free-form reflection
    pub content: String,
    /// What got done today
    pub accomplishments: String,
    /// What got in the way
    pub blockers: String,
    /// Gratitude note
    pub gratitude: String,
    /// Who was served by today's work
    pub value_served: String,
    /// XP granted at creation
    pub xp_earned: i64,
}

/// Caller-supplied fields for creating a journal entry.
///
/// This is the commit value for an editing session; the engine never holds
/// partial journal input.
#[derive(Debug, Clone, Default)]
pub struct NewJournalEntry {
    pub date: NaiveDate,
    pub content: String,
    pub accomplishments: String,
    pub blockers: String,
    pub gratitude: String,
    pub value_served: String,
}

/// Partial update for an existing journal entry. Text only; `xp_earned` is
/// immutable after creation.
#[derive(Debug, Clone, Default)]
pub struct JournalPatch {
    pub content: Option<String>,
    pub accomplishments: Option<String>,
    pub blockers: Option<String>,
    pub gratitude: Option<String>,
    pub value_served: Option<String>,
}

// ============================================
// Snapshot
// ============================================

/// Full persistable state of one user's session.
///
/// This is the unit the persistence and remote-sync collaborators exchange:
/// `load` returns one at session start, `save` receives one after mutations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    pub profile: UserProfile,
    pub goals: Vec<Goal>,
    pub tasks: Vec<Task>,
    pub journal_entries: Vec<JournalEntry>,
    /// Pinned goal ids, oldest pin first
    pub pinned_goal_ids: Vec<String>,
}
