//! The task/goal ledger: authoritative in-memory state and its mutations.
//!
//! One `Ledger` is constructed per session from a loaded [`Snapshot`] and
//! passed by reference to whatever layer needs it; there is no ambient
//! global store. Every mutation is synchronous and keeps the engine
//! invariants:
//!
//! - `profile.level` always equals `level_for(profile.xp).level`
//! - `task.is_completed` always mirrors `task.status == Done`, and
//!   `completed_at` is set exactly when the task is done
//! - `goal.progress` is always rederived from the goal's current tasks,
//!   never cached or accepted from a caller
//! - XP is one-directional: granted entering `Done`, never deducted leaving
//!
//! Validation failures reject the operation and leave state untouched.
//! Mutations queue [`EngineEvent`]s which the display layer drains.

use chrono::{NaiveDate, Utc};

use crate::config::{FocusConfig, RewardsConfig};
use crate::error::{Error, Result};
use crate::events::EngineEvent;
use crate::focus::{self, FocusGoal, TasksByStatus};
use crate::progression;
use crate::streak::{self, StreakChange};
use crate::types::{
    new_id, Goal, GoalPatch, JournalEntry, JournalPatch, NewGoal, NewJournalEntry, NewTask,
    Snapshot, Task, TaskStatus, UserProfile,
};

/// Result of recomputing one goal's progress.
#[derive(Debug, Clone, PartialEq)]
pub struct GoalProgressUpdate {
    /// The goal whose progress was recomputed
    pub goal_id: String,
    /// The new derived progress (0-100)
    pub progress: i32,
    /// Whether this recompute was the goal-completion transition
    pub completed: bool,
}

/// Result of a task status transition.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskStatusChange {
    /// The task after the transition
    pub task: Task,
    /// XP granted by this transition (0 unless the task entered `Done`)
    pub xp_awarded: i64,
    /// Progress recompute for the owning goal, if the task has one and the
    /// transition was not a no-op
    pub goal_progress: Option<GoalProgressUpdate>,
}

/// Authoritative in-memory state for one user session.
pub struct Ledger {
    profile: UserProfile,
    goals: Vec<Goal>,
    tasks: Vec<Task>,
    journal_entries: Vec<JournalEntry>,
    pinned_goal_ids: Vec<String>,
    rewards: RewardsConfig,
    focus: FocusConfig,
    events: Vec<EngineEvent>,
}

impl Ledger {
    /// Create an empty ledger with a fresh profile.
    pub fn new(rewards: RewardsConfig, focus: FocusConfig) -> Self {
        Self::from_snapshot(Snapshot::default(), rewards, focus)
    }

    /// Build a ledger from a loaded snapshot.
    ///
    /// The profile level is recomputed from XP on the way in, so a snapshot
    /// written by an older build can never leave the level out of sync.
    pub fn from_snapshot(snapshot: Snapshot, rewards: RewardsConfig, focus: FocusConfig) -> Self {
        let mut profile = snapshot.profile;
        let derived = crate::levels::level_for(profile.xp).level;
        if profile.level != derived {
            tracing::warn!(
                xp = profile.xp,
                stored = profile.level,
                derived,
                "Stored level out of sync with XP, recomputing"
            );
            profile.level = derived;
        }

        Self {
            profile,
            goals: snapshot.goals,
            tasks: snapshot.tasks,
            journal_entries: snapshot.journal_entries,
            pinned_goal_ids: snapshot.pinned_goal_ids,
            rewards,
            focus,
            events: Vec::new(),
        }
    }

    /// Clone the current state into a persistable snapshot.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            profile: self.profile.clone(),
            goals: self.goals.clone(),
            tasks: self.tasks.clone(),
            journal_entries: self.journal_entries.clone(),
            pinned_goal_ids: self.pinned_goal_ids.clone(),
        }
    }

    // ============================================
    // Read access
    // ============================================

    pub fn profile(&self) -> &UserProfile {
        &self.profile
    }

    pub fn goals(&self) -> &[Goal] {
        &self.goals
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn journal_entries(&self) -> &[JournalEntry] {
        &self.journal_entries
    }

    pub fn pinned_goal_ids(&self) -> &[String] {
        &self.pinned_goal_ids
    }

    pub fn goal(&self, goal_id: &str) -> Option<&Goal> {
        self.goals.iter().find(|g| g.id == goal_id)
    }

    pub fn task(&self, task_id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == task_id)
    }

    /// Drain queued engine events. Each event is delivered exactly once.
    pub fn drain_events(&mut self) -> Vec<EngineEvent> {
        std::mem::take(&mut self.events)
    }

    // ============================================
    // Derived views
    // ============================================

    /// Focus goals for the home view: pinned first, due date fills the rest.
    pub fn focus_goals(&self) -> Vec<FocusGoal> {
        focus::select_focus_goals(
            &self.goals,
            &self.tasks,
            &self.pinned_goal_ids,
            self.focus.pinned_goal_limit,
        )
    }

    /// Incomplete high-impact tasks, creation order.
    pub fn high_impact_tasks(&self) -> Vec<Task> {
        focus::select_high_impact_tasks(&self.tasks, self.focus.high_impact_limit)
    }

    /// Tasks bucketed by workflow state.
    pub fn tasks_by_status(&self) -> TasksByStatus {
        focus::tasks_by_status(&self.tasks)
    }

    // ============================================
    // Task operations
    // ============================================

    /// Transition a task to a new status.
    ///
    /// Same-status transitions are no-ops: no XP, no progress recompute, no
    /// events. Entering `Done` grants the task's reward exactly once per
    /// completion event; leaving `Done` clears completion state but never
    /// deducts XP. The award is strictly one-directional: complete /
    /// un-complete / re-complete grants the reward twice.
    pub fn update_task_status(
        &mut self,
        task_id: &str,
        new_status: TaskStatus,
    ) -> Result<TaskStatusChange> {
        let idx = self
            .tasks
            .iter()
            .position(|t| t.id == task_id)
            .ok_or_else(|| Error::TaskNotFound(task_id.to_string()))?;

        if self.tasks[idx].status == new_status {
            tracing::debug!(task_id, status = %new_status, "No-op status transition");
            return Ok(TaskStatusChange {
                task: self.tasks[idx].clone(),
                xp_awarded: 0,
                goal_progress: None,
            });
        }

        let entering_done = new_status == TaskStatus::Done;
        {
            let task = &mut self.tasks[idx];
            task.status = new_status;
            task.is_completed = entering_done;
            task.completed_at = entering_done.then(Utc::now);
        }

        let mut xp_awarded = 0;
        if entering_done {
            xp_awarded = self.tasks[idx].xp_reward;
            tracing::info!(
                task_id,
                title = %self.tasks[idx].title,
                xp = xp_awarded,
                "Task completed"
            );
            self.award_profile_xp(xp_awarded)?;
        }

        let goal_id = self.tasks[idx].goal_id.clone();
        let goal_progress = match goal_id {
            Some(ref gid) => self.recompute_goal_progress(gid)?,
            None => None,
        };

        Ok(TaskStatusChange {
            task: self.tasks[idx].clone(),
            xp_awarded,
            goal_progress,
        })
    }

    /// Create a standalone task (or one attached to an existing goal).
    pub fn add_task(&mut self, new: NewTask) -> Result<Task> {
        let task = self.build_task(&new, new.goal_id.clone(), true)?;

        let task_id = task.id.clone();
        self.tasks.push(task.clone());

        if let Some(gid) = &new.goal_id {
            if let Some(goal) = self.goals.iter_mut().find(|g| &g.id == gid) {
                goal.task_ids.push(task_id);
            }
            // A new open task lowers the ratio; a goal sitting at 100 drops
            // below and the completion event re-arms.
            self.recompute_goal_progress(gid)?;
        }

        Ok(task)
    }

    /// Delete a task, recomputing the owning goal's progress from the
    /// remaining tasks.
    pub fn delete_task(&mut self, task_id: &str) -> Result<()> {
        let idx = self
            .tasks
            .iter()
            .position(|t| t.id == task_id)
            .ok_or_else(|| Error::TaskNotFound(task_id.to_string()))?;

        let removed = self.tasks.remove(idx);
        tracing::info!(task_id, title = %removed.title, "Task deleted");

        if let Some(gid) = &removed.goal_id {
            if let Some(goal) = self.goals.iter_mut().find(|g| &g.id == gid) {
                goal.task_ids.retain(|id| id != task_id);
            }
            self.recompute_goal_progress(gid)?;
        }

        Ok(())
    }

    // ============================================
    // Goal operations
    // ============================================

    /// Create a goal with its initial tasks.
    ///
    /// With no initial tasks, a single high-impact kickoff task named after
    /// the goal is created so the goal is never unactionable.
    pub fn add_goal(&mut self, new: NewGoal, initial_tasks: Vec<NewTask>) -> Result<Goal> {
        if new.title.trim().is_empty() {
            return Err(Error::Validation("goal title must not be empty".to_string()));
        }

        let goal_id = new_id();
        let task_specs = if initial_tasks.is_empty() {
            vec![NewTask {
                title: format!("Complete {}", new.title),
                is_high_impact: true,
                goal_id: None,
                xp_reward: None,
            }]
        } else {
            initial_tasks
        };

        // Validate every task before touching state; the goal id they carry
        // is ignored in favor of the goal being created.
        let mut tasks = Vec::with_capacity(task_specs.len());
        for spec in &task_specs {
            tasks.push(self.build_task(spec, Some(goal_id.clone()), false)?);
        }

        let goal = Goal {
            id: goal_id,
            title: new.title,
            due_date: new.due_date,
            timeframe: new.timeframe,
            progress: 0,
            task_ids: tasks.iter().map(|t| t.id.clone()).collect(),
            specific: new.specific,
            measurable: new.measurable,
            achievable: new.achievable,
            relevant: new.relevant,
            time_bound: new.time_bound,
        };

        tracing::info!(
            goal_id = %goal.id,
            title = %goal.title,
            tasks = tasks.len(),
            "Goal created"
        );

        self.goals.push(goal.clone());
        self.tasks.extend(tasks);
        Ok(goal)
    }

    /// Edit a goal's descriptive fields. Progress is rederived, never set.
    pub fn update_goal(&mut self, goal_id: &str, patch: GoalPatch) -> Result<Goal> {
        let idx = self
            .goals
            .iter()
            .position(|g| g.id == goal_id)
            .ok_or_else(|| Error::GoalNotFound(goal_id.to_string()))?;

        if let Some(title) = &patch.title {
            if title.trim().is_empty() {
                return Err(Error::Validation("goal title must not be empty".to_string()));
            }
        }

        {
            let goal = &mut self.goals[idx];
            if let Some(title) = patch.title {
                goal.title = title;
            }
            if let Some(due_date) = patch.due_date {
                goal.due_date = due_date;
            }
            if let Some(timeframe) = patch.timeframe {
                goal.timeframe = timeframe;
            }
            if let Some(specific) = patch.specific {
                goal.specific = Some(specific);
            }
            if let Some(measurable) = patch.measurable {
                goal.measurable = Some(measurable);
            }
            if let Some(achievable) = patch.achievable {
                goal.achievable = Some(achievable);
            }
            if let Some(relevant) = patch.relevant {
                goal.relevant = Some(relevant);
            }
            if let Some(time_bound) = patch.time_bound {
                goal.time_bound = Some(time_bound);
            }
        }

        self.recompute_goal_progress(goal_id)?;
        Ok(self.goals[idx].clone())
    }

    /// Delete a goal, cascading to its tasks and pin entry.
    ///
    /// Irreversible: owned tasks are hard-deleted, never orphaned.
    pub fn delete_goal(&mut self, goal_id: &str) -> Result<()> {
        let idx = self
            .goals
            .iter()
            .position(|g| g.id == goal_id)
            .ok_or_else(|| Error::GoalNotFound(goal_id.to_string()))?;

        let removed = self.goals.remove(idx);
        self.tasks.retain(|t| t.goal_id.as_deref() != Some(goal_id));
        self.pinned_goal_ids.retain(|id| id != goal_id);

        tracing::info!(goal_id, title = %removed.title, "Goal deleted with its tasks");
        Ok(())
    }

    /// Toggle a goal's pin. At most 3 goals stay pinned; pinning a fourth
    /// evicts the oldest pin.
    pub fn toggle_pin(&mut self, goal_id: &str) -> Result<Vec<String>> {
        if self.goal(goal_id).is_none() {
            return Err(Error::GoalNotFound(goal_id.to_string()));
        }

        self.pinned_goal_ids = focus::toggle_pin(
            &self.pinned_goal_ids,
            goal_id,
            self.focus.pinned_goal_limit,
        );
        Ok(self.pinned_goal_ids.clone())
    }

    // ============================================
    // Journal operations
    // ============================================

    /// Commit a journal entry. The fixed XP award happens here, once; later
    /// edits never re-award.
    pub fn add_journal_entry(&mut self, new: NewJournalEntry) -> Result<JournalEntry> {
        let entry = JournalEntry {
            id: new_id(),
            date: new.date,
            content: new.content,
            accomplishments: new.accomplishments,
            blockers: new.blockers,
            gratitude: new.gratitude,
            value_served: new.value_served,
            xp_earned: self.rewards.journal_entry_xp,
        };

        self.award_profile_xp(entry.xp_earned)?;
        tracing::info!(entry_id = %entry.id, date = %entry.date, xp = entry.xp_earned, "Journal entry added");

        // Newest first, matching how the journal is read
        self.journal_entries.insert(0, entry.clone());
        Ok(entry)
    }

    /// Edit a journal entry's text. `xp_earned` is immutable.
    pub fn update_journal_entry(&mut self, entry_id: &str, patch: JournalPatch) -> Result<JournalEntry> {
        let entry = self
            .journal_entries
            .iter_mut()
            .find(|e| e.id == entry_id)
            .ok_or_else(|| Error::JournalEntryNotFound(entry_id.to_string()))?;

        if let Some(content) = patch.content {
            entry.content = content;
        }
        if let Some(accomplishments) = patch.accomplishments {
            entry.accomplishments = accomplishments;
        }
        if let Some(blockers) = patch.blockers {
            entry.blockers = blockers;
        }
        if let Some(gratitude) = patch.gratitude {
            entry.gratitude = gratitude;
        }
        if let Some(value_served) = patch.value_served {
            entry.value_served = value_served;
        }

        Ok(entry.clone())
    }

    // ============================================
    // Profile operations
    // ============================================

    /// Replace the vision statement.
    pub fn update_vision(&mut self, vision: impl Into<String>) {
        self.profile.vision = vision.into();
    }

    /// Run the once-per-day streak check against `today`.
    pub fn check_daily_streak(&mut self, today: NaiveDate) -> Result<StreakChange> {
        let (updated, change) = streak::check_daily_streak(&self.profile, today);
        self.profile = updated;

        if change.earns_bonus() {
            tracing::info!(streak = self.profile.streak, "Streak continued");
            self.award_profile_xp(self.rewards.streak_bonus_xp)?;
        }

        Ok(change)
    }

    // ============================================
    // Internals
    // ============================================

    /// Build (but do not insert) a task record from caller-supplied fields.
    ///
    /// `check_goal_ref` is false when the owning goal is the one currently
    /// being created and so not yet in the collection.
    fn build_task(
        &self,
        new: &NewTask,
        goal_id: Option<String>,
        check_goal_ref: bool,
    ) -> Result<Task> {
        if new.title.trim().is_empty() {
            return Err(Error::Validation("task title must not be empty".to_string()));
        }

        if check_goal_ref {
            if let Some(gid) = &goal_id {
                if self.goal(gid).is_none() {
                    return Err(Error::Validation(format!(
                        "task references unknown goal: {}",
                        gid
                    )));
                }
            }
        }

        let xp_reward = match new.xp_reward {
            Some(xp) if xp <= 0 => {
                return Err(Error::Validation(format!(
                    "task XP reward must be positive, got {}",
                    xp
                )));
            }
            Some(xp) => xp,
            None => self.rewards.task_reward(new.is_high_impact),
        };

        Ok(Task {
            id: new_id(),
            title: new.title.clone(),
            status: TaskStatus::Open,
            is_high_impact: new.is_high_impact,
            is_completed: false,
            goal_id,
            xp_reward,
            created_at: Utc::now(),
            completed_at: None,
        })
    }

    /// Award XP to the profile, queueing a level-up event on a boundary
    /// crossing.
    fn award_profile_xp(&mut self, amount: i64) -> Result<()> {
        let award = progression::award_xp(&self.profile, amount)?;
        if let Some(level) = award.new_level {
            tracing::info!(level, xp = award.profile.xp, "Level up");
            self.events.push(EngineEvent::LevelUp { level });
        }
        self.profile = award.profile;
        Ok(())
    }

    /// Rederive one goal's progress from the current task set.
    ///
    /// Always reads `self.tasks` directly so the computation can never see a
    /// stale copy. The `<100 -> ==100` transition is the goal-completion
    /// event: flat bonus XP, a `GoalCompleted` signal, and the goal leaves
    /// the pin set. Any later dip below 100 re-arms the event.
    fn recompute_goal_progress(&mut self, goal_id: &str) -> Result<Option<GoalProgressUpdate>> {
        let Some(idx) = self.goals.iter().position(|g| g.id == goal_id) else {
            return Ok(None);
        };

        let mut total = 0i64;
        let mut done = 0i64;
        for task in self.tasks.iter().filter(|t| t.goal_id.as_deref() == Some(goal_id)) {
            total += 1;
            if task.status == TaskStatus::Done {
                done += 1;
            }
        }

        let progress = if total > 0 {
            (100.0 * done as f64 / total as f64).round() as i32
        } else {
            0
        };

        let previous = self.goals[idx].progress;
        self.goals[idx].progress = progress;

        let completed = previous < 100 && progress == 100;
        if completed {
            let title = self.goals[idx].title.clone();
            tracing::info!(goal_id, title = %title, "Goal completed");

            self.award_profile_xp(self.rewards.goal_completion_bonus_xp)?;
            self.events.push(EngineEvent::GoalCompleted {
                goal_id: goal_id.to_string(),
                title,
            });
            // A finished goal no longer needs a focus slot
            self.pinned_goal_ids.retain(|id| id != goal_id);
        }

        Ok(Some(GoalProgressUpdate {
            goal_id: goal_id.to_string(),
            progress,
            completed,
        }))
    }
}

#[cfg(test)]
mod tests;
