//! Database schema and migrations
//!
//! Uses SQLite with embedded migrations managed via PRAGMA user_version.

use rusqlite::Connection;

/// Current schema version
pub const SCHEMA_VERSION: i32 = 1;

/// SQL migrations, indexed by version number
const MIGRATIONS: &[&str] = &[
    // Version 1: Initial schema
    r#"
    -- Single-row profile; the engine owns exactly one user per database
    CREATE TABLE IF NOT EXISTS profile (
        id           INTEGER PRIMARY KEY CHECK (id = 1),
        vision       TEXT NOT NULL DEFAULT '',
        xp           INTEGER NOT NULL DEFAULT 0,
        level        INTEGER NOT NULL DEFAULT 1,
        streak       INTEGER NOT NULL DEFAULT 0,
        last_active  DATE
    );

    CREATE TABLE IF NOT EXISTS goals (
        id           TEXT PRIMARY KEY,
        title        TEXT NOT NULL,
        due_date     DATE NOT NULL,
        timeframe    TEXT NOT NULL,
        progress     INTEGER NOT NULL DEFAULT 0,

        -- Ordered task-id references, JSON array
        task_ids     JSON NOT NULL DEFAULT '[]',

        -- SMART details
        specific     TEXT,
        measurable   TEXT,
        achievable   TEXT,
        relevant     TEXT,
        time_bound   TEXT
    );

    CREATE TABLE IF NOT EXISTS tasks (
        id              TEXT PRIMARY KEY,
        title           TEXT NOT NULL,
        status          TEXT NOT NULL,
        is_high_impact  INTEGER NOT NULL DEFAULT 0,
        is_completed    INTEGER NOT NULL DEFAULT 0,
        goal_id         TEXT REFERENCES goals(id) ON DELETE CASCADE,
        xp_reward       INTEGER NOT NULL,
        created_at      DATETIME NOT NULL,
        completed_at    DATETIME
    );

    CREATE INDEX IF NOT EXISTS idx_tasks_goal ON tasks(goal_id);
    CREATE INDEX IF NOT EXISTS idx_tasks_status ON tasks(status);

    CREATE TABLE IF NOT EXISTS journal_entries (
        id              TEXT PRIMARY KEY,
        date            DATE NOT NULL,
        content         TEXT NOT NULL DEFAULT '',
        accomplishments TEXT NOT NULL DEFAULT '',
        blockers        TEXT NOT NULL DEFAULT '',
        gratitude       TEXT NOT NULL DEFAULT '',
        value_served    TEXT NOT NULL DEFAULT '',
        xp_earned       INTEGER NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_journal_date ON journal_entries(date);

    -- Pin order matters: position 0 is the oldest pin (first evicted)
    CREATE TABLE IF NOT EXISTS pinned_goals (
        goal_id   TEXT PRIMARY KEY REFERENCES goals(id) ON DELETE CASCADE,
        position  INTEGER NOT NULL
    );
    "#,
];

/// Run all pending migrations
pub fn run_migrations(conn: &Connection) -> crate::error::Result<()> {
    let current_version: i32 = conn
        .query_row("PRAGMA user_version", [], |r| r.get(0))
        .unwrap_or(0);

    tracing::info!(
        current_version,
        target_version = SCHEMA_VERSION,
        "Checking database migrations"
    );

    for (i, migration) in MIGRATIONS.iter().enumerate() {
        let version = (i + 1) as i32;
        if version > current_version {
            tracing::info!(version, "Running migration");
            conn.execute_batch(migration)?;
            conn.execute(&format!("PRAGMA user_version = {}", version), [])?;
        }
    }

    if current_version < SCHEMA_VERSION {
        tracing::info!(
            from = current_version,
            to = SCHEMA_VERSION,
            "Migrations complete"
        );
    }

    Ok(())
}

/// Get the current schema version from the database
pub fn get_schema_version(conn: &Connection) -> crate::error::Result<i32> {
    let version: i32 = conn.query_row("PRAGMA user_version", [], |r| r.get(0))?;
    Ok(version)
}
