//! Badge unlock rules.
//!
//! Evaluation runs in two phases. Leaf rules look only at the metrics; the
//! composite rules then look at `existing ∪ new leaves`, so one event can
//! unlock a leaf badge and the composite it completes in the same call.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::model::{BadgeId, Dimension};

/// Streak length required for each streak badge.
pub const STREAK_BADGES: [(u32, BadgeId); 3] = [
    (3, BadgeId::ThreeDayStreak),
    (7, BadgeId::WeekStreak),
    (15, BadgeId::HalfMonthStreak),
];

/// XP total required for each XP badge.
pub const XP_BADGES: [(u32, BadgeId); 2] = [(50, BadgeId::XpCollector50), (100, BadgeId::LevelUp)];

/// Minimum dimension score (0.0–1.0) for a dimension milestone badge.
pub const SEL_MILESTONE_THRESHOLD: f64 = 0.7;

/// Snapshot of a child's progress used to evaluate badge rules.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BadgeMetrics {
    pub daily_check_in: bool,
    pub journal_entry: bool,
    pub all_activities_in_one_day: bool,
    pub profile_completed: bool,
    pub streak_count: u32,
    pub xp_points: u32,
    /// Per-dimension scores in `0.0..=1.0`, when available.
    #[serde(default)]
    pub sel_scores: Option<BTreeMap<Dimension, f64>>,
}

/// A composite badge and the badges it requires.
struct CompositeRule {
    badge: BadgeId,
    requires: &'static [BadgeId],
}

const COMPOSITE_RULES: [CompositeRule; 2] = [
    CompositeRule {
        badge: BadgeId::ConsistencyChamp,
        requires: &[
            BadgeId::ThreeDayStreak,
            BadgeId::WeekStreak,
            BadgeId::HalfMonthStreak,
        ],
    },
    CompositeRule {
        badge: BadgeId::SelGrowthChampion,
        requires: &[
            BadgeId::SelfAwarenessStar,
            BadgeId::SelfManagementStar,
            BadgeId::SocialAwarenessStar,
            BadgeId::RelationshipSkillsStar,
            BadgeId::DecisionMakingStar,
        ],
    },
];

/// Badges whose leaf rule holds for `metrics`, regardless of what is held.
fn leaf_badges(metrics: &BadgeMetrics) -> BTreeSet<BadgeId> {
    let mut earned = BTreeSet::from([BadgeId::FirstLogin]);

    let flags = [
        (metrics.profile_completed, BadgeId::ProfileCreator),
        (metrics.daily_check_in, BadgeId::DailyHero),
        (metrics.journal_entry, BadgeId::JournalStarter),
        (metrics.all_activities_in_one_day, BadgeId::TrioChamp),
    ];
    earned.extend(flags.iter().filter(|(hit, _)| *hit).map(|(_, b)| *b));

    earned.extend(
        STREAK_BADGES
            .iter()
            .filter(|(min, _)| metrics.streak_count >= *min)
            .map(|(_, b)| *b),
    );
    earned.extend(
        XP_BADGES
            .iter()
            .filter(|(min, _)| metrics.xp_points >= *min)
            .map(|(_, b)| *b),
    );

    if let Some(scores) = &metrics.sel_scores {
        earned.extend(
            scores
                .iter()
                .filter(|(_, score)| **score >= SEL_MILESTONE_THRESHOLD)
                .map(|(dim, _)| dim.milestone_badge()),
        );
    }

    earned
}

/// Returns the badges newly unlocked by `metrics`.
///
/// Never returns a badge already in `existing`. Calling again with
/// `existing` extended by the result returns an empty set.
pub fn evaluate(existing: &BTreeSet<BadgeId>, metrics: &BadgeMetrics) -> BTreeSet<BadgeId> {
    let new_leaves: BTreeSet<BadgeId> = leaf_badges(metrics)
        .difference(existing)
        .copied()
        .collect();

    let held: BTreeSet<BadgeId> = existing.union(&new_leaves).copied().collect();
    let new_composites = COMPOSITE_RULES
        .iter()
        .filter(|rule| !held.contains(&rule.badge))
        .filter(|rule| rule.requires.iter().all(|b| held.contains(b)))
        .map(|rule| rule.badge);

    let unlocked: BTreeSet<BadgeId> = new_leaves.iter().copied().chain(new_composites).collect();
    if !unlocked.is_empty() {
        tracing::debug!(?unlocked, "badges unlocked");
    }
    unlocked
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_high_scores() -> BTreeMap<Dimension, f64> {
        Dimension::ALL.iter().map(|d| (*d, 0.8)).collect()
    }

    #[test]
    fn first_evaluation_always_grants_first_login() {
        let unlocked = evaluate(&BTreeSet::new(), &BadgeMetrics::default());
        assert_eq!(unlocked, BTreeSet::from([BadgeId::FirstLogin]));
    }

    #[test]
    fn flag_badges() {
        let metrics = BadgeMetrics {
            daily_check_in: true,
            journal_entry: true,
            all_activities_in_one_day: true,
            profile_completed: true,
            ..Default::default()
        };
        let unlocked = evaluate(&BTreeSet::from([BadgeId::FirstLogin]), &metrics);
        assert_eq!(
            unlocked,
            BTreeSet::from([
                BadgeId::ProfileCreator,
                BadgeId::DailyHero,
                BadgeId::JournalStarter,
                BadgeId::TrioChamp,
            ])
        );
    }

    #[test]
    fn streak_badges_unlock_once_at_threshold() {
        let mut held = BTreeSet::new();
        let mut unlock_days = Vec::new();
        for streak in 1..=20 {
            let metrics = BadgeMetrics {
                streak_count: streak,
                ..Default::default()
            };
            let unlocked = evaluate(&held, &metrics);
            for (min, badge) in STREAK_BADGES {
                if unlocked.contains(&badge) {
                    unlock_days.push((badge, streak));
                    assert_eq!(streak, min);
                }
            }
            held.extend(unlocked);
        }
        assert_eq!(
            unlock_days,
            vec![
                (BadgeId::ThreeDayStreak, 3),
                (BadgeId::WeekStreak, 7),
                (BadgeId::HalfMonthStreak, 15),
            ]
        );
        assert!(held.contains(&BadgeId::ConsistencyChamp));
    }

    #[test]
    fn composite_cascades_in_same_pass() {
        let existing = BTreeSet::from([BadgeId::FirstLogin, BadgeId::ThreeDayStreak]);
        let metrics = BadgeMetrics {
            streak_count: 15,
            ..Default::default()
        };
        let unlocked = evaluate(&existing, &metrics);
        assert!(unlocked.contains(&BadgeId::WeekStreak));
        assert!(unlocked.contains(&BadgeId::HalfMonthStreak));
        assert!(unlocked.contains(&BadgeId::ConsistencyChamp));
        assert!(!unlocked.contains(&BadgeId::ThreeDayStreak));
    }

    #[test]
    fn sel_milestones_and_growth_champion() {
        let mut scores = all_high_scores();
        scores.insert(Dimension::SocialAwareness, 0.69);
        let metrics = BadgeMetrics {
            sel_scores: Some(scores),
            ..Default::default()
        };
        let unlocked = evaluate(&BTreeSet::new(), &metrics);
        assert!(unlocked.contains(&BadgeId::SelfAwarenessStar));
        assert!(!unlocked.contains(&BadgeId::SocialAwarenessStar));
        assert!(!unlocked.contains(&BadgeId::SelGrowthChampion));

        let mut held = unlocked;
        let later = BadgeMetrics {
            sel_scores: Some(BTreeMap::from([(Dimension::SocialAwareness, 0.7)])),
            ..Default::default()
        };
        let unlocked = evaluate(&held, &later);
        assert_eq!(
            unlocked,
            BTreeSet::from([BadgeId::SocialAwarenessStar, BadgeId::SelGrowthChampion])
        );
        held.extend(unlocked);
        assert!(evaluate(&held, &later).is_empty());
    }

    #[test]
    fn composite_from_existing_alone() {
        // Leaves held from earlier passes still complete a composite.
        let existing: BTreeSet<BadgeId> = Dimension::ALL
            .iter()
            .map(|d| d.milestone_badge())
            .chain([BadgeId::FirstLogin])
            .collect();
        let unlocked = evaluate(&existing, &BadgeMetrics::default());
        assert_eq!(unlocked, BTreeSet::from([BadgeId::SelGrowthChampion]));
    }

    #[test]
    fn xp_badges() {
        let metrics = BadgeMetrics {
            xp_points: 120,
            ..Default::default()
        };
        let unlocked = evaluate(&BTreeSet::from([BadgeId::FirstLogin]), &metrics);
        assert_eq!(
            unlocked,
            BTreeSet::from([BadgeId::XpCollector50, BadgeId::LevelUp])
        );
    }

    #[test]
    fn monotonic_and_idempotent() {
        let metrics = BadgeMetrics {
            daily_check_in: true,
            journal_entry: true,
            all_activities_in_one_day: true,
            profile_completed: true,
            streak_count: 30,
            xp_points: 5000,
            sel_scores: Some(all_high_scores()),
        };
        let existing = BTreeSet::from([BadgeId::DailyHero, BadgeId::WeekStreak]);
        let unlocked = evaluate(&existing, &metrics);
        assert!(unlocked.is_disjoint(&existing));

        let held: BTreeSet<BadgeId> = existing.union(&unlocked).copied().collect();
        assert_eq!(held.len(), BadgeId::ALL.len());
        assert!(evaluate(&held, &metrics).is_empty());
    }
}
