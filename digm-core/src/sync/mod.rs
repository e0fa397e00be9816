//! Remote sync for digm
//!
//! Optional best-effort replication of the session snapshot to a sync
//! server. The local store stays authoritative; this layer only pushes and
//! fetches whole snapshots and implements no conflict resolution (a
//! last-write-wins server is assumed).

pub mod client;

pub use client::{PushResponse, SyncClient};
