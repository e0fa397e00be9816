//! Session wiring: one ledger, one store, in-memory first.
//!
//! A `Session` is constructed once per process: it loads the snapshot,
//! runs the daily streak check against the wall-clock date, and then applies
//! every mutation to the in-memory ledger before asking the store to persist.
//! Persistence is best-effort: a failed save is logged and counted, the
//! in-memory state stays authoritative, and nothing is rolled back.

use chrono::{Local, NaiveDate};

use crate::config::Config;
use crate::error::Result;
use crate::events::EngineEvent;
use crate::ledger::Ledger;
use crate::store::SnapshotStore;
use crate::streak::StreakChange;
use crate::types::Snapshot;

/// A live engine session over a persistence collaborator.
pub struct Session<S: SnapshotStore> {
    ledger: Ledger,
    store: S,
    failed_saves: u32,
}

impl<S: SnapshotStore> Session<S> {
    /// Open a session against today's wall-clock date.
    ///
    /// Loading is the one persistence call that must succeed: without a
    /// snapshot there is no state to be authoritative over.
    pub fn open(store: S, config: &Config) -> Result<Self> {
        Self::open_on(store, config, Local::now().date_naive())
    }

    /// Open a session against an explicit date.
    pub fn open_on(store: S, config: &Config, today: NaiveDate) -> Result<Self> {
        let snapshot = store.load()?;
        let mut ledger =
            Ledger::from_snapshot(snapshot, config.rewards.clone(), config.focus.clone());
        let change = ledger.check_daily_streak(today)?;

        let mut session = Self {
            ledger,
            store,
            failed_saves: 0,
        };
        if change != StreakChange::SameDay {
            session.persist();
        }
        Ok(session)
    }

    /// Read access to the ledger.
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// The current state as a persistable snapshot.
    pub fn snapshot(&self) -> Snapshot {
        self.ledger.snapshot()
    }

    /// Apply a mutation, then persist best-effort.
    ///
    /// The mutation's own error (validation, not-found) propagates and skips
    /// the save; a save failure never fails the mutation.
    pub fn mutate<T>(&mut self, op: impl FnOnce(&mut Ledger) -> Result<T>) -> Result<T> {
        let result = op(&mut self.ledger)?;
        self.persist();
        Ok(result)
    }

    /// Drain queued engine events for display. Delivered exactly once.
    pub fn take_events(&mut self) -> Vec<EngineEvent> {
        self.ledger.drain_events()
    }

    /// Consecutive failed saves since the last successful one.
    pub fn failed_saves(&self) -> u32 {
        self.failed_saves
    }

    fn persist(&mut self) {
        match self.store.save(&self.ledger.snapshot()) {
            Ok(()) => self.failed_saves = 0,
            Err(e) => {
                self.failed_saves += 1;
                tracing::warn!(
                    error = %e,
                    failed_saves = self.failed_saves,
                    "Snapshot save failed; in-memory state remains authoritative"
                );
            }
        }
    }
}
