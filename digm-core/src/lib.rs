//! # digm-core
//!
//! Core library for digm - a goal progression and coaching engine.
//!
//! This library provides:
//! - Domain types for the user profile, goals, tasks, and journal entries
//! - The progression engine: XP awards and level computation over a static
//!   level table
//! - The task/goal ledger with derived goal progress and engine events
//! - Focus selection (pinned goals, high-impact tasks) and streak tracking
//! - SQLite storage layer and an optional remote sync client
//! - Configuration management and logging infrastructure
//!
//! ## Architecture
//!
//! State flows one direction:
//! - **Mutations** enter through the [`Ledger`] (or a [`Session`] wrapping it)
//! - **XP side effects** run through the progression engine, which derives
//!   level from XP - level is never set independently
//! - **Views** ([`focus`], [`summary`]) are read-only projections recomputed
//!   from the authoritative collections on demand
//!
//! Persistence is a collaborator behind [`SnapshotStore`]: in-memory state is
//! updated first and saved best-effort afterwards.
//!
//! ## Example
//!
//! ```rust,no_run
//! use digm_core::{Config, Database, Session};
//!
//! // Load configuration
//! let config = Config::load().expect("failed to load config");
//!
//! // Open the store and start a session
//! let db = Database::open(&Config::database_path()).expect("failed to open database");
//! db.migrate().expect("failed to run migrations");
//! let session = Session::open(db, &config).expect("failed to open session");
//! ```

// Re-export commonly used items at the crate root
pub use config::Config;
pub use error::{Error, Result};
pub use events::EngineEvent;
pub use ledger::{GoalProgressUpdate, Ledger, TaskStatusChange};
pub use session::Session;
pub use store::{Database, SnapshotStore};
pub use types::*;

// Public modules
pub mod config;
pub mod error;
pub mod events;
pub mod focus;
pub mod ledger;
pub mod levels;
pub mod logging;
pub mod progression;
pub mod quotes;
pub mod session;
pub mod store;
pub mod streak;
pub mod summary;
pub mod sync;
pub mod types;
