//! Progression: the leveling curve plus XP/coin grants
//!
//! XP is lifetime-earned and the only leveling input. Coins are earned
//! alongside XP but spent independently, so spending never changes a level.

mod awards;
mod levels;

pub(crate) use awards::credit;
pub use awards::{AwardReason, LeaderboardEntry, Progression, UserProfile};
pub use levels::{
    BAND_WIDTH, FIRST_BAND, LevelUp, Progress, XpProgress, level_floor, level_for_xp,
    xp_for_next_level, xp_progress,
};
