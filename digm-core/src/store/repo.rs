//! Database repository layer
//!
//! Provides load and save operations for the engine's snapshot and for the
//! individual record types. The engine computes new in-memory state first;
//! callers persist afterwards, best-effort.

use crate::error::{Error, Result};
use crate::types::{Goal, JournalEntry, Snapshot, Task, TaskStatus, Timeframe, UserProfile};
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::PathBuf;
use std::sync::Mutex;

use super::SnapshotStore;

/// Database handle with connection pooling (single connection for now)
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open or create a database at the given path
    pub fn open(path: &PathBuf) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        // Enable foreign keys and WAL mode for better concurrency
        conn.execute_batch(
            "
            PRAGMA foreign_keys = ON;
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            ",
        )?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute("PRAGMA foreign_keys = ON", [])?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Run migrations on this database
    pub fn migrate(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        super::schema::run_migrations(&conn)
    }

    /// Get the underlying connection (for advanced use)
    pub fn connection(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().unwrap()
    }

    // ============================================
    // Profile operations
    // ============================================

    /// Read the profile row; a database that has never been saved yields the
    /// default fresh profile.
    pub fn get_profile(&self) -> Result<UserProfile> {
        let conn = self.conn.lock().unwrap();
        let profile = conn
            .query_row("SELECT * FROM profile WHERE id = 1", [], Self::row_to_profile)
            .optional()?;
        Ok(profile.unwrap_or_default())
    }

    /// Write the single profile row
    pub fn save_profile(&self, profile: &UserProfile) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        Self::upsert_profile(&conn, profile)
    }

    fn upsert_profile(conn: &Connection, profile: &UserProfile) -> Result<()> {
        conn.execute(
            r#"
            INSERT INTO profile (id, vision, xp, level, streak, last_active)
            VALUES (1, ?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(id) DO UPDATE SET
                vision = excluded.vision,
                xp = excluded.xp,
                level = excluded.level,
                streak = excluded.streak,
                last_active = excluded.last_active
            "#,
            params![
                profile.vision,
                profile.xp,
                profile.level,
                profile.streak,
                profile.last_active.map(|d| d.to_string()),
            ],
        )?;
        Ok(())
    }

    fn row_to_profile(row: &Row) -> rusqlite::Result<UserProfile> {
        let last_active_str: Option<String> = row.get("last_active")?;
        Ok(UserProfile {
            vision: row.get("vision")?,
            xp: row.get("xp")?,
            level: row.get("level")?,
            streak: row.get("streak")?,
            last_active: last_active_str.and_then(|s| s.parse::<NaiveDate>().ok()),
        })
    }

    // ============================================
    // Goal operations
    // ============================================

    /// Insert or update a goal
    pub fn upsert_goal(&self, goal: &Goal) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        Self::insert_goal(&conn, goal)
    }

    fn insert_goal(conn: &Connection, goal: &Goal) -> Result<()> {
        conn.execute(
            r#"
            INSERT INTO goals (id, title, due_date, timeframe, progress, task_ids,
                               specific, measurable, achievable, relevant, time_bound)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                due_date = excluded.due_date,
                timeframe = excluded.timeframe,
                progress = excluded.progress,
                task_ids = excluded.task_ids,
                specific = excluded.specific,
                measurable = excluded.measurable,
                achievable = excluded.achievable,
                relevant = excluded.relevant,
                time_bound = excluded.time_bound
            "#,
            params![
                goal.id,
                goal.title,
                goal.due_date.to_string(),
                goal.timeframe.as_str(),
                goal.progress,
                serde_json::to_string(&goal.task_ids)?,
                goal.specific,
                goal.measurable,
                goal.achievable,
                goal.relevant,
                goal.time_bound,
            ],
        )?;
        Ok(())
    }

    /// Get a goal by ID
    pub fn get_goal(&self, id: &str) -> Result<Option<Goal>> {
        let conn = self.conn.lock().unwrap();
        conn.query_row("SELECT * FROM goals WHERE id = ?", [id], Self::row_to_goal)
            .optional()
            .map_err(Error::from)
    }

    /// List all goals in insertion order
    pub fn list_goals(&self) -> Result<Vec<Goal>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT * FROM goals ORDER BY rowid")?;
        let goals = stmt
            .query_map([], Self::row_to_goal)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(goals)
    }

    fn row_to_goal(row: &Row) -> rusqlite::Result<Goal> {
        let due_date_str: String = row.get("due_date")?;
        let timeframe_str: String = row.get("timeframe")?;
        let task_ids_str: String = row.get("task_ids")?;

        Ok(Goal {
            id: row.get("id")?,
            title: row.get("title")?,
            due_date: due_date_str.parse().unwrap_or_default(),
            timeframe: timeframe_str.parse().unwrap_or(Timeframe::OneWeek),
            progress: row.get("progress")?,
            task_ids: serde_json::from_str(&task_ids_str).unwrap_or_default(),
            specific: row.get("specific")?,
            measurable: row.get("measurable")?,
            achievable: row.get("achievable")?,
            relevant: row.get("relevant")?,
            time_bound: row.get("time_bound")?,
        })
    }

    // ============================================
    // Task operations
    // ============================================

    /// Insert or update a task
    pub fn upsert_task(&self, task: &Task) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        Self::insert_task(&conn, task)
    }

    fn insert_task(conn: &Connection, task: &Task) -> Result<()> {
        conn.execute(
            r#"
            INSERT INTO tasks (id, title, status, is_high_impact, is_completed,
                               goal_id, xp_reward, created_at, completed_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                status = excluded.status,
                is_high_impact = excluded.is_high_impact,
                is_completed = excluded.is_completed,
                goal_id = excluded.goal_id,
                xp_reward = excluded.xp_reward,
                completed_at = excluded.completed_at
            "#,
            params![
                task.id,
                task.title,
                task.status.as_str(),
                task.is_high_impact,
                task.is_completed,
                task.goal_id,
                task.xp_reward,
                task.created_at.to_rfc3339(),
                task.completed_at.map(|t| t.to_rfc3339()),
            ],
        )?;
        Ok(())
    }

    /// Get a task by ID
    pub fn get_task(&self, id: &str) -> Result<Option<Task>> {
        let conn = self.conn.lock().unwrap();
        conn.query_row("SELECT * FROM tasks WHERE id = ?", [id], Self::row_to_task)
            .optional()
            .map_err(Error::from)
    }

    /// List all tasks in creation (insertion) order
    pub fn list_tasks(&self) -> Result<Vec<Task>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT * FROM tasks ORDER BY rowid")?;
        let tasks = stmt
            .query_map([], Self::row_to_task)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(tasks)
    }

    fn row_to_task(row: &Row) -> rusqlite::Result<Task> {
        let status_str: String = row.get("status")?;
        let created_at_str: String = row.get("created_at")?;
        let completed_at_str: Option<String> = row.get("completed_at")?;

        Ok(Task {
            id: row.get("id")?,
            title: row.get("title")?,
            status: status_str.parse().unwrap_or(TaskStatus::Open),
            is_high_impact: row.get("is_high_impact")?,
            is_completed: row.get("is_completed")?,
            goal_id: row.get("goal_id")?,
            xp_reward: row.get("xp_reward")?,
            created_at: DateTime::parse_from_rfc3339(&created_at_str)
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(|_| Utc::now()),
            completed_at: completed_at_str
                .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
                .map(|dt| dt.with_timezone(&Utc)),
        })
    }

    // ============================================
    // Journal operations
    // ============================================

    /// Insert or update a journal entry
    pub fn upsert_journal_entry(&self, entry: &JournalEntry) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        Self::insert_journal_entry(&conn, entry)
    }

    fn insert_journal_entry(conn: &Connection, entry: &JournalEntry) -> Result<()> {
        conn.execute(
            r#"
            INSERT INTO journal_entries (id, date, content, accomplishments, blockers,
                                         gratitude, value_served, xp_earned)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ON CONFLICT(id) DO UPDATE SET
                content = excluded.content,
                accomplishments = excluded.accomplishments,
                blockers = excluded.blockers,
                gratitude = excluded.gratitude,
                value_served = excluded.value_served
            "#,
            params![
                entry.id,
                entry.date.to_string(),
                entry.content,
                entry.accomplishments,
                entry.blockers,
                entry.gratitude,
                entry.value_served,
                entry.xp_earned,
            ],
        )?;
        Ok(())
    }

    /// List journal entries, newest date first
    pub fn list_journal_entries(&self) -> Result<Vec<JournalEntry>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt =
            conn.prepare("SELECT * FROM journal_entries ORDER BY date DESC, rowid DESC")?;
        let entries = stmt
            .query_map([], Self::row_to_journal_entry)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(entries)
    }

    fn row_to_journal_entry(row: &Row) -> rusqlite::Result<JournalEntry> {
        let date_str: String = row.get("date")?;
        Ok(JournalEntry {
            id: row.get("id")?,
            date: date_str.parse().unwrap_or_default(),
            content: row.get("content")?,
            accomplishments: row.get("accomplishments")?,
            blockers: row.get("blockers")?,
            gratitude: row.get("gratitude")?,
            value_served: row.get("value_served")?,
            xp_earned: row.get("xp_earned")?,
        })
    }

    // ============================================
    // Pinned goals
    // ============================================

    /// List pinned goal ids, oldest pin first
    pub fn list_pinned_goals(&self) -> Result<Vec<String>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT goal_id FROM pinned_goals ORDER BY position")?;
        let ids = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(ids)
    }

    // ============================================
    // Snapshot operations
    // ============================================

    /// Load the full session snapshot.
    ///
    /// Called once at session start; an empty database yields the default
    /// snapshot (fresh profile, no records).
    pub fn load_snapshot(&self) -> Result<Snapshot> {
        Ok(Snapshot {
            profile: self.get_profile()?,
            goals: self.list_goals()?,
            tasks: self.list_tasks()?,
            journal_entries: self.list_journal_entries()?,
            pinned_goal_ids: self.list_pinned_goals()?,
        })
    }

    /// Replace the stored state with `snapshot`, atomically.
    ///
    /// The in-memory ledger is the source of truth for the session, so the
    /// write replaces rather than merges: one transaction clears every table
    /// and reinserts the snapshot in order.
    pub fn save_snapshot(&self, snapshot: &Snapshot) -> Result<()> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;

        tx.execute("DELETE FROM pinned_goals", [])?;
        tx.execute("DELETE FROM tasks", [])?;
        tx.execute("DELETE FROM goals", [])?;
        tx.execute("DELETE FROM journal_entries", [])?;

        Self::upsert_profile(&tx, &snapshot.profile)?;
        for goal in &snapshot.goals {
            Self::insert_goal(&tx, goal)?;
        }
        for task in &snapshot.tasks {
            Self::insert_task(&tx, task)?;
        }
        for entry in &snapshot.journal_entries {
            Self::insert_journal_entry(&tx, entry)?;
        }
        for (position, goal_id) in snapshot.pinned_goal_ids.iter().enumerate() {
            tx.execute(
                "INSERT INTO pinned_goals (goal_id, position) VALUES (?1, ?2)",
                params![goal_id, position as i64],
            )?;
        }

        tx.commit()?;
        Ok(())
    }
}

impl SnapshotStore for Database {
    fn load(&self) -> Result<Snapshot> {
        self.load_snapshot()
    }

    fn save(&self, snapshot: &Snapshot) -> Result<()> {
        self.save_snapshot(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::new_id;

    fn create_test_goal(title: &str) -> Goal {
        Goal {
            id: new_id(),
            title: title.to_string(),
            due_date: "2025-12-31".parse().unwrap(),
            timeframe: Timeframe::ThreeMonth,
            progress: 0,
            task_ids: vec![],
            specific: Some("specifically this".to_string()),
            measurable: None,
            achievable: None,
            relevant: None,
            time_bound: None,
        }
    }

    fn create_test_task(goal_id: Option<&str>) -> Task {
        Task {
            id: new_id(),
            title: "test task".to_string(),
            status: TaskStatus::Open,
            is_high_impact: true,
            is_completed: false,
            goal_id: goal_id.map(String::from),
            xp_reward: 15,
            created_at: Utc::now(),
            completed_at: None,
        }
    }

    fn create_test_entry() -> JournalEntry {
        JournalEntry {
            id: new_id(),
            date: "2025-03-10".parse().unwrap(),
            content: "wrote tests".to_string(),
            accomplishments: "all of them".to_string(),
            blockers: String::new(),
            gratitude: "coffee".to_string(),
            value_served: "future me".to_string(),
            xp_earned: 10,
        }
    }

    #[test]
    fn test_empty_database_loads_default_snapshot() {
        let db = Database::open_in_memory().unwrap();
        db.migrate().unwrap();

        let snapshot = db.load_snapshot().unwrap();
        assert_eq!(snapshot.profile, UserProfile::default());
        assert!(snapshot.goals.is_empty());
        assert!(snapshot.tasks.is_empty());
        assert!(snapshot.pinned_goal_ids.is_empty());
    }

    #[test]
    fn test_goal_crud() {
        let db = Database::open_in_memory().unwrap();
        db.migrate().unwrap();

        let mut goal = create_test_goal("Learn Rust");
        goal.task_ids = vec!["t1".to_string(), "t2".to_string()];
        db.upsert_goal(&goal).unwrap();

        let retrieved = db.get_goal(&goal.id).unwrap().unwrap();
        assert_eq!(retrieved, goal);

        // Update round-trips too
        goal.progress = 50;
        db.upsert_goal(&goal).unwrap();
        assert_eq!(db.get_goal(&goal.id).unwrap().unwrap().progress, 50);

        assert_eq!(db.list_goals().unwrap().len(), 1);
    }

    #[test]
    fn test_task_round_trip_preserves_completion() {
        let db = Database::open_in_memory().unwrap();
        db.migrate().unwrap();

        let goal = create_test_goal("Owner");
        db.upsert_goal(&goal).unwrap();

        let mut task = create_test_task(Some(&goal.id));
        task.status = TaskStatus::Done;
        task.is_completed = true;
        task.completed_at = Some(Utc::now());
        db.upsert_task(&task).unwrap();

        let retrieved = db.get_task(&task.id).unwrap().unwrap();
        assert_eq!(retrieved.status, TaskStatus::Done);
        assert!(retrieved.is_completed);
        assert!(retrieved.completed_at.is_some());
        assert_eq!(retrieved.goal_id.as_deref(), Some(goal.id.as_str()));
    }

    #[test]
    fn test_snapshot_round_trip() {
        let db = Database::open_in_memory().unwrap();
        db.migrate().unwrap();

        let goal = create_test_goal("Round trip");
        let task = create_test_task(Some(&goal.id));
        let snapshot = Snapshot {
            profile: UserProfile {
                vision: "ship it".to_string(),
                xp: 120,
                level: 3,
                streak: 4,
                last_active: Some("2025-03-10".parse().unwrap()),
            },
            goals: vec![goal.clone()],
            tasks: vec![task.clone()],
            journal_entries: vec![create_test_entry()],
            pinned_goal_ids: vec![goal.id.clone()],
        };

        db.save_snapshot(&snapshot).unwrap();
        let loaded = db.load_snapshot().unwrap();

        assert_eq!(loaded.profile, snapshot.profile);
        assert_eq!(loaded.goals, snapshot.goals);
        assert_eq!(loaded.tasks.len(), 1);
        assert_eq!(loaded.tasks[0].id, task.id);
        assert_eq!(loaded.journal_entries, snapshot.journal_entries);
        assert_eq!(loaded.pinned_goal_ids, snapshot.pinned_goal_ids);
    }

    #[test]
    fn test_save_snapshot_replaces_previous_state() {
        let db = Database::open_in_memory().unwrap();
        db.migrate().unwrap();

        let goal_a = create_test_goal("A");
        let snapshot_a = Snapshot {
            goals: vec![goal_a.clone()],
            pinned_goal_ids: vec![goal_a.id.clone()],
            ..Default::default()
        };
        db.save_snapshot(&snapshot_a).unwrap();

        // A second save with different contents fully replaces the first
        let goal_b = create_test_goal("B");
        let snapshot_b = Snapshot {
            goals: vec![goal_b.clone()],
            ..Default::default()
        };
        db.save_snapshot(&snapshot_b).unwrap();

        let loaded = db.load_snapshot().unwrap();
        assert_eq!(loaded.goals.len(), 1);
        assert_eq!(loaded.goals[0].id, goal_b.id);
        assert!(loaded.pinned_goal_ids.is_empty());
    }

    #[test]
    fn test_pin_order_preserved() {
        let db = Database::open_in_memory().unwrap();
        db.migrate().unwrap();

        let goals: Vec<Goal> = ["A", "B", "C"].iter().map(|t| create_test_goal(t)).collect();
        let pinned: Vec<String> = goals.iter().rev().map(|g| g.id.clone()).collect();
        let snapshot = Snapshot {
            goals: goals.clone(),
            pinned_goal_ids: pinned.clone(),
            ..Default::default()
        };

        db.save_snapshot(&snapshot).unwrap();
        assert_eq!(db.list_pinned_goals().unwrap(), pinned);
    }

    #[test]
    fn test_open_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("digm").join("data.db");

        let db = Database::open(&path).unwrap();
        db.migrate().unwrap();
        db.save_profile(&UserProfile {
            xp: 42,
            ..Default::default()
        })
        .unwrap();
        drop(db);

        // Reopen and read back
        let db = Database::open(&path).unwrap();
        db.migrate().unwrap();
        assert_eq!(db.get_profile().unwrap().xp, 42);
    }
}
