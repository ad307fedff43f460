//! Central progress engine orchestrator.
//!
//! Routes daily-activity events through the streak, XP, and badge rules and
//! persists the result with a conditional write. Assessment submissions and
//! comparisons are delegated to the scorer and comparator.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::badges::{self, BadgeMetrics};
use crate::comparison::{self, ComparisonView};
use crate::error::{EngineError, ValidationError};
use crate::model::{
    Activity, AssessmentAnswer, AssessmentType, BadgeId, ChildProgress, Dimension,
};
use crate::scoring::AssessmentScorer;
use crate::streak::{StreakEvaluator, StreakOutcome};
use crate::traits::{
    sanitize_scores, AssessmentStore, FeatureFlags, ProgressStore, TextAnalyzer,
};
use crate::xp::{self, LevelInfo};

/// Configuration for the progress engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Offset that defines the calendar day for streaks and daily activity.
    pub utc_offset: FixedOffset,
    /// How often a conflicted write is re-evaluated from fresh state.
    pub max_conflict_retries: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            utc_offset: Utc.fix(),
            max_conflict_retries: 3,
        }
    }
}

/// A daily-activity event.
#[derive(Debug, Clone, PartialEq)]
pub enum ActivityEvent {
    CheckIn,
    Journal {
        /// Dimension scores from text analysis, if available.
        sel_scores: Option<BTreeMap<Dimension, f64>>,
    },
    Mindfulness,
    ProfileCompleted,
}

impl ActivityEvent {
    fn activity(&self) -> Option<Activity> {
        match self {
            ActivityEvent::CheckIn => Some(Activity::CheckIn),
            ActivityEvent::Journal { .. } => Some(Activity::Journal),
            ActivityEvent::Mindfulness => Some(Activity::Mindfulness),
            ActivityEvent::ProfileCompleted => None,
        }
    }
}

/// What an activity event did to a child's progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityReport {
    pub activity: Option<Activity>,
    /// Streak classification, for check-ins only.
    pub streak_outcome: Option<StreakOutcome>,
    pub base_xp: u32,
    pub bonus_xp: u32,
    pub xp_total: u32,
    pub streak_count: u32,
    pub level: LevelInfo,
    pub unlocked: BTreeSet<BadgeId>,
    /// `false` when the event changed nothing, e.g. a repeated check-in.
    pub applied: bool,
}

impl ActivityReport {
    pub fn xp_delta(&self) -> u32 {
        self.base_xp + self.bonus_xp
    }
}

/// Progress plus values derived from it for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressSummary {
    pub child_id: String,
    pub progress: ChildProgress,
    pub level: LevelInfo,
    pub checked_in_today: bool,
}

/// Applies one event to a progress record. Pure; the caller persists.
pub fn apply_event(
    evaluator: &StreakEvaluator,
    current: &ChildProgress,
    event: &ActivityEvent,
    now: DateTime<Utc>,
) -> (ChildProgress, ActivityReport) {
    let today = evaluator.local_day(now);
    let mut next = current.clone();
    next.activities_today = current.activities_on(today);
    next.activity_day = Some(today);

    let mut streak_outcome = None;
    let mut base_xp = 0;
    let mut bonus_xp = 0;
    let mut sel_scores = None;

    match event {
        ActivityEvent::CheckIn => {
            let award = xp::award_check_in_xp(evaluator, current, now);
            streak_outcome = Some(award.outcome);
            if !award.is_repeat() {
                next.streak_count = award.updated_streak;
                next.last_check_in = Some(now);
                base_xp = award.base_xp;
                bonus_xp = award.bonus_xp;
            }
        }
        ActivityEvent::Journal { sel_scores: scores } => {
            base_xp = xp::JOURNAL_XP;
            sel_scores = scores.clone();
        }
        ActivityEvent::Mindfulness => base_xp = xp::MINDFULNESS_XP,
        ActivityEvent::ProfileCompleted => next.profile_completed = true,
    }

    if let Some(activity) = event.activity() {
        next.activities_today.insert(activity);
    }
    next.daily_check_in_completed = next
        .last_check_in
        .is_some_and(|last| evaluator.local_day(last) == today);
    next.xp_points = next.xp_points.saturating_add(base_xp + bonus_xp);

    let metrics = BadgeMetrics {
        daily_check_in: next.daily_check_in_completed,
        journal_entry: next.activities_today.contains(&Activity::Journal),
        all_activities_in_one_day: next.activities_today.len() == 3,
        profile_completed: next.profile_completed,
        streak_count: next.streak_count,
        xp_points: next.xp_points,
        sel_scores,
    };
    let unlocked = badges::evaluate(&next.badges, &metrics);
    next.badges.extend(unlocked.iter().copied());

    let applied = next != *current;
    let report = ActivityReport {
        activity: event.activity(),
        streak_outcome,
        base_xp,
        bonus_xp,
        xp_total: next.xp_points,
        streak_count: next.streak_count,
        level: xp::level_for(next.xp_points),
        unlocked,
        applied,
    };
    (next, report)
}

/// The progress and assessment engine.
pub struct ProgressEngine {
    progress: Arc<dyn ProgressStore>,
    assessments: Arc<dyn AssessmentStore>,
    flags: Arc<dyn FeatureFlags>,
    analyzer: Option<Arc<dyn TextAnalyzer>>,
    streaks: StreakEvaluator,
    config: EngineConfig,
}

impl ProgressEngine {
    pub fn new(
        progress: Arc<dyn ProgressStore>,
        assessments: Arc<dyn AssessmentStore>,
        flags: Arc<dyn FeatureFlags>,
        config: EngineConfig,
    ) -> Self {
        Self {
            progress,
            assessments,
            flags,
            analyzer: None,
            streaks: StreakEvaluator::new(config.utc_offset),
            config,
        }
    }

    /// Attach a text analyzer used to score journal entries.
    pub fn with_analyzer(mut self, analyzer: Arc<dyn TextAnalyzer>) -> Self {
        self.analyzer = Some(analyzer);
        self
    }

    pub fn streak_evaluator(&self) -> &StreakEvaluator {
        &self.streaks
    }

    pub async fn record_check_in(
        &self,
        child_id: &str,
        now: DateTime<Utc>,
    ) -> Result<ActivityReport, EngineError> {
        self.record(child_id, ActivityEvent::CheckIn, now).await
    }

    /// Records a journal entry, scoring its text when an analyzer is set.
    ///
    /// Analyzer failures do not block the XP award; the entry is credited
    /// without dimension scores.
    pub async fn record_journal(
        &self,
        child_id: &str,
        text: &str,
        now: DateTime<Utc>,
    ) -> Result<ActivityReport, EngineError> {
        require_child(child_id)?;

        let sel_scores = match &self.analyzer {
            Some(analyzer) if !text.trim().is_empty() => match analyzer.analyze(text).await {
                Ok(scores) => Some(sanitize_scores(scores)),
                Err(e) => {
                    tracing::warn!(
                        child_id,
                        analyzer = analyzer.name(),
                        "text analysis failed, skipping SEL scores: {e:#}"
                    );
                    None
                }
            },
            _ => None,
        };

        self.record(child_id, ActivityEvent::Journal { sel_scores }, now)
            .await
    }

    pub async fn record_mindfulness(
        &self,
        child_id: &str,
        now: DateTime<Utc>,
    ) -> Result<ActivityReport, EngineError> {
        self.record(child_id, ActivityEvent::Mindfulness, now).await
    }

    pub async fn mark_profile_completed(
        &self,
        child_id: &str,
        now: DateTime<Utc>,
    ) -> Result<ActivityReport, EngineError> {
        self.record(child_id, ActivityEvent::ProfileCompleted, now)
            .await
    }

    /// Applies an event and persists the outcome with a conditional write.
    ///
    /// On a version conflict the event is re-evaluated against freshly
    /// loaded state, so a duplicate same-day check-in from a concurrent
    /// caller turns into a no-op instead of a second award.
    pub async fn record(
        &self,
        child_id: &str,
        event: ActivityEvent,
        now: DateTime<Utc>,
    ) -> Result<ActivityReport, EngineError> {
        require_child(child_id)?;

        for attempt in 0..=self.config.max_conflict_retries {
            let current = self
                .progress
                .load_progress(child_id)
                .await?
                .unwrap_or_default();
            let (next, report) = apply_event(&self.streaks, &current, &event, now);

            if !report.applied {
                tracing::debug!(child_id, ?event, "event changed nothing");
                return Ok(report);
            }

            match self
                .progress
                .save_progress(child_id, &next, current.version)
                .await
            {
                Ok(version) => {
                    tracing::info!(
                        child_id,
                        version,
                        xp_delta = report.xp_delta(),
                        streak = report.streak_count,
                        unlocked = report.unlocked.len(),
                        "activity recorded"
                    );
                    return Ok(report);
                }
                Err(e) if e.is_conflict() => {
                    tracing::warn!(child_id, attempt, "conflicting progress update, retrying: {e}");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(EngineError::Conflict {
            child_id: child_id.to_string(),
        })
    }

    /// Current progress and derived level for a child.
    pub async fn progress_summary(
        &self,
        child_id: &str,
        now: DateTime<Utc>,
    ) -> Result<ProgressSummary, EngineError> {
        require_child(child_id)?;
        let progress = self
            .progress
            .load_progress(child_id)
            .await?
            .unwrap_or_default();
        let today = self.streaks.local_day(now);
        let checked_in_today = progress.daily_check_in_completed
            && progress
                .last_check_in
                .is_some_and(|last| self.streaks.local_day(last) == today);

        Ok(ProgressSummary {
            child_id: child_id.to_string(),
            level: xp::level_for(progress.xp_points),
            progress,
            checked_in_today,
        })
    }

    /// Validates, scores, and stores an assessment submission.
    pub async fn submit_assessment(
        &self,
        child_id: &str,
        assessment_type: AssessmentType,
        answers: &[AssessmentAnswer],
        now: DateTime<Utc>,
    ) -> Result<Uuid, EngineError> {
        require_child(child_id)?;
        if answers.is_empty() {
            return Err(ValidationError::EmptyAnswers.into());
        }
        let questions = self.assessments.load_questions().await?;
        AssessmentScorer::new(questions)
            .submit(
                self.assessments.as_ref(),
                child_id,
                assessment_type,
                answers,
                now,
            )
            .await
    }

    /// Builds the pre/post comparison view for a child.
    pub async fn comparison(&self, child_id: &str) -> Result<ComparisonView, EngineError> {
        require_child(child_id)?;
        if !self.flags.comparison_enabled(child_id).await {
            return Ok(ComparisonView::Disabled);
        }

        let (pre, post) = futures::try_join!(
            self.assessments.load_result(child_id, AssessmentType::Pre),
            self.assessments.load_result(child_id, AssessmentType::Post),
        )?;

        let view = comparison::compare(true, pre.as_ref(), post.as_ref());
        tracing::debug!(child_id, state = view.state_name(), "comparison evaluated");
        Ok(view)
    }
}

fn require_child(child_id: &str) -> Result<(), ValidationError> {
    if child_id.trim().is_empty() {
        Err(ValidationError::MissingChildId)
    } else {
        Ok(())
    }
}
