//! Likert answers to per-dimension competency scores.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::{EngineError, ValidationError};
use crate::model::{
    AssessmentAnswer, AssessmentQuestion, AssessmentType, Dimension, DimensionScores, Likert,
};
use crate::traits::AssessmentStore;

/// Scores the answers against the questions they belong to.
///
/// Each dimension's score is the mean answer divided by 5, as a rounded
/// percentage. Dimensions without any answered question are omitted.
/// Answers to unknown question codes are ignored, and a code answered twice
/// keeps its last answer.
pub fn score(questions: &[AssessmentQuestion], answers: &[AssessmentAnswer]) -> DimensionScores {
    let by_code: HashMap<&str, Likert> = answers
        .iter()
        .map(|a| (a.question_code.as_str(), a.value))
        .collect();

    let mut totals: BTreeMap<Dimension, (u32, u32)> = BTreeMap::new();
    for question in questions {
        if let Some(value) = by_code.get(question.code.as_str()) {
            let entry = totals.entry(question.dimension).or_default();
            entry.0 += u32::from(value.get());
            entry.1 += 1;
        }
    }

    totals
        .into_iter()
        .map(|(dimension, (sum, count))| {
            let mean = f64::from(sum) / f64::from(count);
            let percent = (mean / f64::from(Likert::MAX) * 100.0).round();
            (dimension, percent as u8)
        })
        .collect()
}

/// Scores assessment submissions against a fixed question bank.
#[derive(Debug, Clone)]
pub struct AssessmentScorer {
    questions: Vec<AssessmentQuestion>,
}

impl AssessmentScorer {
    pub fn new(questions: Vec<AssessmentQuestion>) -> Self {
        Self { questions }
    }

    pub fn questions(&self) -> &[AssessmentQuestion] {
        &self.questions
    }

    pub fn score(&self, answers: &[AssessmentAnswer]) -> DimensionScores {
        score(&self.questions, answers)
    }

    /// Checks that a submission can be accepted: a child id, a non-empty
    /// answer set, and an answer for every question.
    pub fn validate_submission(
        &self,
        child_id: &str,
        answers: &[AssessmentAnswer],
    ) -> Result<(), ValidationError> {
        if child_id.trim().is_empty() {
            return Err(ValidationError::MissingChildId);
        }
        if answers.is_empty() {
            return Err(ValidationError::EmptyAnswers);
        }

        let missing: Vec<String> = self
            .questions
            .iter()
            .filter(|q| !answers.iter().any(|a| a.question_code == q.code))
            .map(|q| q.code.clone())
            .collect();
        if !missing.is_empty() {
            return Err(ValidationError::IncompleteAnswers { missing });
        }

        Ok(())
    }

    /// Validates, scores, and upserts a completed assessment.
    ///
    /// Nothing is written when validation fails. Re-submitting the same
    /// assessment type replaces the stored scores and keeps the result id.
    pub async fn submit(
        &self,
        store: &dyn AssessmentStore,
        child_id: &str,
        assessment_type: AssessmentType,
        answers: &[AssessmentAnswer],
        now: DateTime<Utc>,
    ) -> Result<Uuid, EngineError> {
        self.validate_submission(child_id, answers)?;

        let scores = self.score(answers);
        let id = store
            .upsert_result(child_id, assessment_type, &scores, now)
            .await?;

        tracing::info!(
            child_id,
            %assessment_type,
            result_id = %id,
            dimensions = scores.len(),
            "assessment submitted"
        );
        Ok(id)
    }
}
