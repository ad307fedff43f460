//! Daily check-in streak evaluation.

use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};
use serde::{Deserialize, Serialize};

/// How a check-in at "now" relates to the previous one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreakOutcome {
    /// No prior check-in; the streak starts at 1.
    First,
    /// The previous check-in was yesterday; the caller adds 1.
    Continued,
    /// Already checked in today; nothing changes.
    SameDay,
    /// A day or more was missed; the streak restarts at 1.
    Reset,
}

impl StreakOutcome {
    /// Value the streak is set to when positive; 0 means "keep or increment".
    pub fn seed(self) -> u32 {
        match self {
            StreakOutcome::First | StreakOutcome::Reset => 1,
            StreakOutcome::Continued | StreakOutcome::SameDay => 0,
        }
    }

    pub fn should_increment(self) -> bool {
        self == StreakOutcome::Continued
    }

    /// Applies this outcome to the current streak length.
    pub fn apply(self, current: u32) -> u32 {
        if self.should_increment() {
            current.saturating_add(1)
        } else if self.seed() > 0 {
            self.seed()
        } else {
            current
        }
    }
}

/// Decides whether a check-in continues, repeats, or resets a streak.
///
/// Calendar days are computed in a fixed UTC offset.
#[derive(Debug, Clone, Copy)]
pub struct StreakEvaluator {
    offset: FixedOffset,
}

impl Default for StreakEvaluator {
    fn default() -> Self {
        Self { offset: Utc.fix() }
    }
}

impl StreakEvaluator {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// The local calendar day of `instant`.
    pub fn local_day(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.offset).date_naive()
    }

    pub fn evaluate(
        &self,
        last_check_in: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> StreakOutcome {
        let Some(last) = last_check_in else {
            return StreakOutcome::First;
        };

        let gap = (self.local_day(now) - self.local_day(last)).num_days();
        match gap {
            1 => StreakOutcome::Continued,
            // A check-in dated after today (clock skew) counts as today's.
            i64::MIN..=0 => StreakOutcome::SameDay,
            _ => StreakOutcome::Reset,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[test]
    fn first_check_in_starts_at_one() {
        let outcome = StreakEvaluator::default().evaluate(None, at(2025, 1, 10, 9));
        assert_eq!(outcome, StreakOutcome::First);
        assert_eq!(outcome.seed(), 1);
        assert!(!outcome.should_increment());
    }

    #[test]
    fn yesterday_increments() {
        let eval = StreakEvaluator::default();
        let outcome = eval.evaluate(Some(at(2025, 1, 9, 23)), at(2025, 1, 10, 0));
        assert_eq!(outcome, StreakOutcome::Continued);
        assert_eq!(outcome.seed(), 0);
        assert!(outcome.should_increment());
        assert_eq!(outcome.apply(4), 5);
    }

    #[test]
    fn same_day_is_noop_for_every_hour() {
        let eval = StreakEvaluator::default();
        let last = at(2025, 1, 10, 0);
        for hour in 0..24 {
            let now = last + Duration::hours(hour);
            let outcome = eval.evaluate(Some(last), now);
            assert_eq!(outcome.seed(), 0, "hour {hour}");
            assert!(!outcome.should_increment(), "hour {hour}");
            assert_eq!(outcome.apply(6), 6);
        }
    }

    #[test]
    fn gap_resets() {
        let eval = StreakEvaluator::default();
        let outcome = eval.evaluate(Some(at(2025, 1, 7, 12)), at(2025, 1, 10, 12));
        assert_eq!(outcome, StreakOutcome::Reset);
        assert_eq!(outcome.apply(12), 1);
    }

    #[test]
    fn future_check_in_is_treated_as_today() {
        let eval = StreakEvaluator::default();
        let outcome = eval.evaluate(Some(at(2025, 1, 11, 8)), at(2025, 1, 10, 8));
        assert_eq!(outcome, StreakOutcome::SameDay);
    }

    #[test]
    fn calendar_day_follows_offset() {
        // 23:30 UTC on the 9th is already the 10th at UTC+2.
        let eval = StreakEvaluator::new(FixedOffset::east_opt(2 * 3600).unwrap());
        let last = Utc.with_ymd_and_hms(2025, 1, 9, 23, 30, 0).unwrap();
        let now = Utc.with_ymd_and_hms(2025, 1, 10, 8, 0, 0).unwrap();
        assert_eq!(eval.evaluate(Some(last), now), StreakOutcome::SameDay);
        assert_eq!(
            StreakEvaluator::default().evaluate(Some(last), now),
            StreakOutcome::Continued
        );
    }
}
