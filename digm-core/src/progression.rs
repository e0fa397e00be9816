//! XP awards and level recomputation.
//!
//! `award_xp` is the single place XP enters a profile. It is a pure
//! transform: the input profile is untouched and the caller decides what to
//! do with the result, including persisting it and emitting a level-up
//! signal when the award crossed a boundary.

use crate::error::{Error, Result};
use crate::levels;
use crate::types::UserProfile;

/// Outcome of an XP award.
#[derive(Debug, Clone, PartialEq)]
pub struct XpAward {
    /// The profile after the award, level recomputed
    pub profile: UserProfile,
    /// The new level if the award crossed a level boundary
    pub new_level: Option<i32>,
}

/// Award `amount` XP to `profile`, returning the updated profile.
///
/// Non-positive amounts are rejected with a validation error: XP is only
/// ever granted, and a zero or negative request is a caller bug the engine
/// refuses to hide.
pub fn award_xp(profile: &UserProfile, amount: i64) -> Result<XpAward> {
    if amount <= 0 {
        return Err(Error::Validation(format!(
            "XP award must be positive, got {}",
            amount
        )));
    }

    let xp = profile.xp + amount;
    let level = levels::level_for(xp).level;
    let new_level = (level > profile.level).then_some(level);

    Ok(XpAward {
        profile: UserProfile {
            xp,
            level,
            ..profile.clone()
        },
        new_level,
    })
}
