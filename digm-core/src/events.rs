//! Observable engine signals.
//!
//! The ledger queues these as mutations happen; the display layer drains the
//! queue after each operation and renders whatever it finds. Events are
//! transient, consumed-once notifications, never persisted state.

use serde::Serialize;

/// A signal the display layer may react to.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EngineEvent {
    /// A goal's derived progress just reached 100%
    GoalCompleted { goal_id: String, title: String },
    /// An XP award crossed a level boundary
    LevelUp { level: i32 },
}
