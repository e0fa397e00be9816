//! Focus selection: which goals and tasks to surface.
//!
//! Everything here is a read-only projection over the ledger's collections,
//! except `toggle_pin`, which computes a new pin list without touching any
//! other state. Pin eviction is FIFO by pin insertion order.

use crate::types::{Goal, Task, TaskStatus};

/// A goal annotated with derived numbers for display.
///
/// View-only: none of the extra fields are persisted.
#[derive(Debug, Clone)]
pub struct FocusGoal {
    /// The underlying goal
    pub goal: Goal,
    /// Number of tasks under this goal
    pub total_tasks: i64,
    /// Number of those tasks that are done
    pub completed_tasks: i64,
    /// Sum of `xp_reward` over the goal's completed tasks
    pub earned_xp: i64,
}

/// Tasks bucketed by workflow state, in creation order.
#[derive(Debug, Clone, Default)]
pub struct TasksByStatus {
    pub open: Vec<Task>,
    pub in_progress: Vec<Task>,
    pub done: Vec<Task>,
}

/// Select up to `limit` goals for the focus view.
///
/// Pinned goals come first, in pin order. Remaining slots fill with unpinned
/// goals sorted ascending by due date. With nothing pinned, all goals compete
/// on due date alone.
pub fn select_focus_goals(
    goals: &[Goal],
    tasks: &[Task],
    pinned_ids: &[String],
    limit: usize,
) -> Vec<FocusGoal> {
    let mut selected: Vec<&Goal> = Vec::new();

    for id in pinned_ids {
        if selected.len() >= limit {
            break;
        }
        if let Some(goal) = goals.iter().find(|g| &g.id == id) {
            selected.push(goal);
        }
    }

    if selected.len() < limit {
        let mut rest: Vec<&Goal> = goals
            .iter()
            .filter(|g| !pinned_ids.contains(&g.id))
            .collect();
        rest.sort_by_key(|g| g.due_date);
        for goal in rest {
            if selected.len() >= limit {
                break;
            }
            selected.push(goal);
        }
    }

    selected
        .into_iter()
        .map(|goal| annotate_goal(goal, tasks))
        .collect()
}

/// Attach derived task counts and earned XP to a goal.
pub fn annotate_goal(goal: &Goal, tasks: &[Task]) -> FocusGoal {
    let mut total = 0i64;
    let mut completed = 0i64;
    let mut earned = 0i64;

    for task in tasks.iter().filter(|t| t.goal_id.as_deref() == Some(goal.id.as_str())) {
        total += 1;
        if task.is_completed {
            completed += 1;
            earned += task.xp_reward;
        }
    }

    FocusGoal {
        goal: goal.clone(),
        total_tasks: total,
        completed_tasks: completed,
        earned_xp: earned,
    }
}

/// Up to `limit` incomplete high-impact tasks, in original creation order.
///
/// No goal-aware sorting happens here; callers wanting urgency ordering sort
/// externally.
pub fn select_high_impact_tasks(tasks: &[Task], limit: usize) -> Vec<Task> {
    tasks
        .iter()
        .filter(|t| t.is_high_impact && !t.is_completed)
        .take(limit)
        .cloned()
        .collect()
}

/// Toggle a goal's pin, returning the new pin list.
///
/// Unpins the goal if present; otherwise appends it and, past `capacity`,
/// evicts from the front (oldest pin first).
pub fn toggle_pin(pinned_ids: &[String], goal_id: &str, capacity: usize) -> Vec<String> {
    let mut updated: Vec<String> = pinned_ids.to_vec();

    if let Some(pos) = updated.iter().position(|id| id == goal_id) {
        updated.remove(pos);
        return updated;
    }

    updated.push(goal_id.to_string());
    while updated.len() > capacity {
        updated.remove(0);
    }
    updated
}

/// Bucket tasks by status, preserving creation order within each bucket.
pub fn tasks_by_status(tasks: &[Task]) -> TasksByStatus {
    let mut buckets = TasksByStatus::default();
    for task in tasks {
        match task.status {
            TaskStatus::Open => buckets.open.push(task.clone()),
            TaskStatus::InProgress => buckets.in_progress.push(task.clone()),
            TaskStatus::Done => buckets.done.push(task.clone()),
        }
    }
    buckets
}
