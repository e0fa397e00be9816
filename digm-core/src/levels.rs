//! Static level table and XP-to-level lookups.
//!
//! The table is fixed at compile time: ranges are contiguous, ordered
//! ascending, and saturate at the top. Everything here is a pure lookup
//! with no state.

use serde::{Deserialize, Serialize};

/// One row of the level table: the XP range that maps to a level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelRange {
    /// Level number, starting at 1
    pub level: i32,
    /// Lowest XP value inside this level (inclusive)
    pub min_xp: i64,
    /// Highest XP value inside this level (inclusive)
    pub max_xp: i64,
}

/// The level table.
///
/// Contiguous by construction: `min_xp` of each row is `max_xp + 1` of the
/// previous row. XP beyond the last row stays at the last level.
pub const LEVELS: [LevelRange; 10] = [
    LevelRange { level: 1, min_xp: 0, max_xp: 50 },
    LevelRange { level: 2, min_xp: 51, max_xp: 100 },
    LevelRange { level: 3, min_xp: 101, max_xp: 250 },
    LevelRange { level: 4, min_xp: 251, max_xp: 500 },
    LevelRange { level: 5, min_xp: 501, max_xp: 750 },
    LevelRange { level: 6, min_xp: 751, max_xp: 1000 },
    LevelRange { level: 7, min_xp: 1001, max_xp: 1500 },
    LevelRange { level: 8, min_xp: 1501, max_xp: 2000 },
    LevelRange { level: 9, min_xp: 2001, max_xp: 3000 },
    LevelRange { level: 10, min_xp: 3001, max_xp: 5000 },
];

/// Returns the level range containing `xp`.
///
/// Total over all non-negative inputs: XP above the highest defined range
/// returns the highest range rather than an undefined level.
pub fn level_for(xp: i64) -> &'static LevelRange {
    LEVELS
        .iter()
        .find(|range| xp >= range.min_xp && xp <= range.max_xp)
        .unwrap_or(&LEVELS[LEVELS.len() - 1])
}

/// Returns the range for the level after `current_level`, saturating at the
/// top of the table.
pub fn next_level_for(current_level: i32) -> &'static LevelRange {
    LEVELS
        .iter()
        .find(|range| range.level == current_level + 1)
        .unwrap_or(&LEVELS[LEVELS.len() - 1])
}

/// Fraction of the current level already earned, as a percentage in [0, 100].
///
/// Division is safe: every defined range has `max_xp > min_xp`.
pub fn progress_within_level(xp: i64) -> f64 {
    let range = level_for(xp);
    let span = (range.max_xp - range.min_xp) as f64;
    let into = (xp - range.min_xp) as f64;
    (100.0 * into / span).clamp(0.0, 100.0)
}

/// XP still needed to reach the next level. Zero at the top level.
pub fn xp_to_next_level(xp: i64) -> i64 {
    let range = level_for(xp);
    let next = next_level_for(range.level);
    if next.level == range.level {
        return 0;
    }
    (next.min_xp - xp).max(0)
}
