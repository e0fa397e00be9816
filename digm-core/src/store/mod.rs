//! Persistence layer for digm
//!
//! This module provides the storage layer using SQLite with:
//! - Schema migrations
//! - Repository pattern for queries
//! - Whole-snapshot load/save for session start and after-mutation persists
//!
//! The engine treats persistence as a collaborator: it computes new in-memory
//! state first and saves afterwards, best-effort.

pub mod repo;
pub mod schema;

use crate::error::Result;
use crate::types::Snapshot;

/// The persistence contract the engine requires.
///
/// `load` runs once at session start; `save` runs after mutating operations
/// (possibly debounced by the caller). The local SQLite [`Database`] is the
/// primary implementation; a remote target may stand in behind the same
/// contract, without any conflict resolution on this side.
pub trait SnapshotStore {
    /// Read the full session snapshot.
    fn load(&self) -> Result<Snapshot>;

    /// Persist the full session snapshot.
    fn save(&self, snapshot: &Snapshot) -> Result<()>;
}

pub use repo::Database;
