//! XP and Level system
//!
//! The first band covers 0..=10 XP; every band after it is 30 XP wide, so
//! levels start at 11, 41, 71, ... XP.

use serde::Serialize;

/// XP needed to leave level 1
pub const FIRST_BAND: u64 = 11;

/// Width of every band after the first
pub const BAND_WIDTH: u64 = 30;

/// Level reached with the given lifetime XP (always >= 1)
pub fn level_for_xp(xp: u64) -> u64 {
    if xp < FIRST_BAND {
        1
    } else {
        (xp - FIRST_BAND) / BAND_WIDTH + 2
    }
}

/// First XP value of `level`
pub fn level_floor(level: u64) -> u64 {
    match level {
        0 | 1 => 0,
        n => (n - 2).saturating_mul(BAND_WIDTH).saturating_add(FIRST_BAND),
    }
}

/// XP still needed to reach the next level
pub fn xp_for_next_level(xp: u64) -> u64 {
    let next_floor = level_floor(level_for_xp(xp).saturating_add(1));
    next_floor.saturating_sub(xp)
}

/// Position inside the current level band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct XpProgress {
    /// XP earned since the band started
    pub current: u64,
    /// Width of the band
    pub total: u64,
}

pub fn xp_progress(xp: u64) -> XpProgress {
    let level = level_for_xp(xp);
    let total = if level == 1 { FIRST_BAND } else { BAND_WIDTH };
    XpProgress {
        current: xp - level_floor(level),
        total,
    }
}

/// Leveling summary for a given XP total
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    pub total_xp: u64,
    pub level: u64,
    pub xp_for_next_level: u64,
    pub progress: XpProgress,
}

impl Progress {
    pub fn new(total_xp: u64) -> Self {
        Self {
            total_xp,
            level: level_for_xp(total_xp),
            xp_for_next_level: xp_for_next_level(total_xp),
            progress: xp_progress(total_xp),
        }
    }

    /// Calculate progress fraction to next level (0.0 - 1.0)
    pub fn fraction(&self) -> f32 {
        if self.progress.total == 0 {
            1.0
        } else {
            self.progress.current as f32 / self.progress.total as f32
        }
    }
}

/// A level up event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelUp {
    pub old_level: u64,
    pub new_level: u64,
}

impl LevelUp {
    /// `Some` when going from `old_xp` to `new_xp` crosses a boundary
    pub fn between(old_xp: u64, new_xp: u64) -> Option<Self> {
        let old_level = level_for_xp(old_xp);
        let new_level = level_for_xp(new_xp);
        (new_level > old_level).then_some(Self {
            old_level,
            new_level,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_for_xp() {
        assert_eq!(level_for_xp(0), 1);
        assert_eq!(level_for_xp(10), 1);
        assert_eq!(level_for_xp(11), 2);
        assert_eq!(level_for_xp(40), 2);
        assert_eq!(level_for_xp(41), 3);
        assert_eq!(level_for_xp(70), 3);
        assert_eq!(level_for_xp(71), 4);
    }

    #[test]
    fn test_level_monotonic_and_at_least_one() {
        let mut prev = level_for_xp(0);
        for xp in 0..5_000 {
            let level = level_for_xp(xp);
            assert!(level >= 1);
            assert!(level >= prev, "level dropped at xp {xp}");
            prev = level;
        }
    }

    #[test]
    fn test_xp_for_next_level_crosses_boundary() {
        assert_eq!(xp_for_next_level(0), 11);
        assert_eq!(xp_for_next_level(10), 1);
        assert_eq!(xp_for_next_level(11), 30);
        assert_eq!(xp_for_next_level(40), 1);
        for xp in 0..5_000 {
            let need = xp_for_next_level(xp);
            assert!(need > 0);
            assert!(level_for_xp(xp + need) > level_for_xp(xp));
            assert_eq!(level_for_xp(xp + need - 1), level_for_xp(xp));
        }
    }

    #[test]
    fn test_xp_progress_bands() {
        assert_eq!(xp_progress(0), XpProgress { current: 0, total: 11 });
        assert_eq!(xp_progress(10), XpProgress { current: 10, total: 11 });
        assert_eq!(xp_progress(11), XpProgress { current: 0, total: 30 });
        assert_eq!(xp_progress(55), XpProgress { current: 14, total: 30 });
    }

    #[test]
    fn test_total_near_max() {
        // Must not panic at the top of the range
        let xp = u64::MAX;
        assert!(level_for_xp(xp) > 1);
        let _ = xp_for_next_level(xp);
        let progress = xp_progress(xp);
        assert!(progress.current <= progress.total);
    }

    #[test]
    fn test_progress_fraction() {
        let progress = Progress::new(26); // 15 into the 30-wide band
        assert_eq!(progress.level, 2);
        assert!((progress.fraction() - 0.5).abs() < 0.01);
    }

    #[test]
    fn test_level_up_between() {
        assert_eq!(LevelUp::between(5, 9), None);
        assert_eq!(
            LevelUp::between(5, 45),
            Some(LevelUp { old_level: 1, new_level: 3 })
        );
    }
}
