//! Profile summary for the status/home view.
//!
//! Aggregates the numbers the home screen leads with: level and XP position,
//! streak, and collection counts. Derived on demand, never stored.

use crate::ledger::Ledger;
use crate::levels;
use crate::types::TaskStatus;

/// Headline statistics for one profile.
#[derive(Debug, Clone, Default)]
pub struct ProfileSummary {
    /// Current level
    pub level: i32,
    /// Lifetime XP
    pub xp: i64,
    /// XP earned inside the current level
    pub xp_into_level: i64,
    /// XP still needed for the next level (0 at the top level)
    pub xp_to_next_level: i64,
    /// Progress through the current level as a percentage
    pub level_progress_pct: f64,
    /// Consecutive active days
    pub streak_days: i64,
    /// Total goals
    pub goal_count: i64,
    /// Goals at 100% progress
    pub completed_goals: i64,
    /// Tasks not yet done
    pub open_tasks: i64,
    /// Tasks done
    pub done_tasks: i64,
    /// Journal entries written
    pub journal_entries: i64,
}

impl ProfileSummary {
    /// Compute the summary from the current ledger state.
    pub fn build(ledger: &Ledger) -> Self {
        let profile = ledger.profile();
        let range = levels::level_for(profile.xp);

        let mut open_tasks = 0i64;
        let mut done_tasks = 0i64;
        for task in ledger.tasks() {
            if task.status == TaskStatus::Done {
                done_tasks += 1;
            } else {
                open_tasks += 1;
            }
        }

        Self {
            level: range.level,
            xp: profile.xp,
            xp_into_level: profile.xp - range.min_xp,
            xp_to_next_level: levels::xp_to_next_level(profile.xp),
            level_progress_pct: levels::progress_within_level(profile.xp),
            streak_days: profile.streak,
            goal_count: ledger.goals().len() as i64,
            completed_goals: ledger.goals().iter().filter(|g| g.progress == 100).count() as i64,
            open_tasks,
            done_tasks,
            journal_entries: ledger.journal_entries().len() as i64,
        }
    }

    /// Format the streak for display (e.g., "7 days").
    pub fn format_streak(&self) -> String {
        if self.streak_days == 1 {
            "1 day".to_string()
        } else {
            format!("{} days", self.streak_days)
        }
    }

    /// Format the XP position for display (e.g., "120 XP, 130 to level 4").
    pub fn format_xp(&self) -> String {
        if self.xp_to_next_level == 0 {
            format!("{} XP (max level)", self.xp)
        } else {
            format!(
                "{} XP, {} to level {}",
                self.xp,
                self.xp_to_next_level,
                self.level + 1
            )
        }
    }
}
