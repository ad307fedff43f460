//! XP awards and level derivation.
//!
//! Check-ins earn XP at most once per calendar day, with a bonus when the
//! streak lands exactly on a milestone. Journal entries and mindfulness
//! sessions earn XP on every event.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::ChildProgress;
use crate::streak::{StreakEvaluator, StreakOutcome};

/// Base XP for the first check-in of a day.
pub const CHECK_IN_XP: u32 = 10;
/// XP per saved journal entry.
pub const JOURNAL_XP: u32 = 15;
/// XP per completed mindfulness session.
pub const MINDFULNESS_XP: u32 = 10;

/// Streak length and bonus XP, awarded on the exact day the streak reaches it.
pub const STREAK_MILESTONES: [(u32, u32); 3] = [(3, 10), (7, 15), (15, 25)];

/// Cumulative XP required for each level, ascending. Level N starts at
/// `LEVEL_THRESHOLDS[N - 1]`.
pub const LEVEL_THRESHOLDS: [u32; 10] = [0, 50, 100, 200, 350, 500, 750, 1000, 1500, 2000];

/// Outcome of a check-in XP evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckInAward {
    /// How the check-in relates to the previous one.
    pub outcome: StreakOutcome,
    /// Streak length after this check-in.
    pub updated_streak: u32,
    /// Base XP (0 on a repeated same-day check-in).
    pub base_xp: u32,
    /// Milestone bonus XP.
    pub bonus_xp: u32,
}

impl CheckInAward {
    pub fn xp_delta(&self) -> u32 {
        self.base_xp + self.bonus_xp
    }

    /// Returns `true` if this check-in was already recorded today.
    pub fn is_repeat(&self) -> bool {
        self.outcome == StreakOutcome::SameDay
    }
}

/// Bonus XP for reaching `streak` through an increment, if it is a milestone.
pub fn milestone_bonus(streak: u32) -> u32 {
    STREAK_MILESTONES
        .iter()
        .find(|(milestone, _)| *milestone == streak)
        .map(|(_, bonus)| *bonus)
        .unwrap_or(0)
}

/// Computes the XP and streak effect of a daily check-in at `now`.
pub fn award_check_in_xp(
    evaluator: &StreakEvaluator,
    progress: &ChildProgress,
    now: DateTime<Utc>,
) -> CheckInAward {
    let outcome = evaluator.evaluate(progress.last_check_in, now);
    let updated_streak = outcome.apply(progress.streak_count);

    let base_xp = if outcome == StreakOutcome::SameDay {
        0
    } else {
        CHECK_IN_XP
    };
    let bonus_xp = if outcome.should_increment() {
        milestone_bonus(updated_streak)
    } else {
        0
    };

    tracing::debug!(
        ?outcome,
        updated_streak,
        base_xp,
        bonus_xp,
        "evaluated check-in"
    );

    CheckInAward {
        outcome,
        updated_streak,
        base_xp,
        bonus_xp,
    }
}

/// A level and the progress towards the next one, derived from total XP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelInfo {
    /// 1-based level.
    pub level: u32,
    /// Percentage of the way to the next level, floored. 100 at max level.
    pub progress_percent: u32,
    /// XP threshold of the current level.
    pub current_threshold: u32,
    /// XP threshold of the next level, `None` at max level.
    pub next_threshold: Option<u32>,
}

impl LevelInfo {
    pub fn is_max(&self) -> bool {
        self.next_threshold.is_none()
    }
}

/// Derives the level for a cumulative XP total.
pub fn level_for(xp_points: u32) -> LevelInfo {
    let index = LEVEL_THRESHOLDS
        .iter()
        .rposition(|&threshold| threshold <= xp_points)
        .unwrap_or(0);
    let current_threshold = LEVEL_THRESHOLDS[index];
    let next_threshold = LEVEL_THRESHOLDS.get(index + 1).copied();

    let progress_percent = match next_threshold {
        Some(next) => {
            let span = u64::from(next - current_threshold);
            let earned = u64::from(xp_points - current_threshold);
            (earned * 100 / span) as u32
        }
        None => 100,
    };

    LevelInfo {
        level: index as u32 + 1,
        progress_percent,
        current_threshold,
        next_threshold,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 4, d, 17, 0, 0).unwrap()
    }

    fn check_in(progress: &mut ChildProgress, now: DateTime<Utc>) -> CheckInAward {
        let award = award_check_in_xp(&StreakEvaluator::default(), progress, now);
        if !award.is_repeat() {
            progress.streak_count = award.updated_streak;
            progress.xp_points += award.xp_delta();
            progress.last_check_in = Some(now);
        }
        award
    }

    #[test]
    fn first_check_in_awards_base_only() {
        let award =
            award_check_in_xp(&StreakEvaluator::default(), &ChildProgress::default(), day(1));
        assert_eq!(award.updated_streak, 1);
        assert_eq!(award.xp_delta(), CHECK_IN_XP);
    }

    #[test]
    fn same_day_check_in_is_free() {
        let mut progress = ChildProgress::default();
        check_in(&mut progress, day(1));
        let again = check_in(&mut progress, day(1) + Duration::hours(3));
        assert_eq!(again.xp_delta(), 0);
        assert_eq!(again.updated_streak, 1);
        assert_eq!(progress.xp_points, CHECK_IN_XP);
    }

    #[test]
    fn milestone_bonuses_on_exact_values() {
        let mut progress = ChildProgress::default();
        let mut bonuses = Vec::new();
        for d in 1..=16 {
            let award = check_in(&mut progress, day(d));
            if award.bonus_xp > 0 {
                bonuses.push((award.updated_streak, award.bonus_xp));
            }
        }
        assert_eq!(bonuses, vec![(3, 10), (7, 15), (15, 25)]);
        assert_eq!(progress.streak_count, 16);
        assert_eq!(progress.xp_points, 16 * CHECK_IN_XP + 10 + 15 + 25);
    }

    #[test]
    fn reset_to_one_earns_no_bonus() {
        let progress = ChildProgress {
            streak_count: 2,
            last_check_in: Some(day(1)),
            ..Default::default()
        };
        let award = award_check_in_xp(&StreakEvaluator::default(), &progress, day(5));
        assert_eq!(award.outcome, StreakOutcome::Reset);
        assert_eq!(award.updated_streak, 1);
        assert_eq!(award.bonus_xp, 0);
        assert_eq!(award.base_xp, CHECK_IN_XP);
    }

    #[test]
    fn level_boundaries() {
        assert_eq!(level_for(0).level, 1);
        assert_eq!(level_for(0).progress_percent, 0);
        assert_eq!(level_for(49).level, 1);
        assert_eq!(level_for(49).progress_percent, 98);
        assert_eq!(level_for(50).level, 2);
        assert_eq!(level_for(75).progress_percent, 50);
        assert_eq!(level_for(349).level, 4);
        assert_eq!(level_for(349).progress_percent, 99);
        assert_eq!(level_for(1999).level, 9);
    }

    #[test]
    fn max_level_is_full() {
        for xp in [2000, 2001, 50_000] {
            let info = level_for(xp);
            assert_eq!(info.level, 10);
            assert_eq!(info.progress_percent, 100);
            assert!(info.is_max());
        }
    }
}
