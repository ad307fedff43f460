//! Pre/post assessment comparison.
//!
//! The view is recomputed on every request and never persisted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{AssessmentResult, Dimension, DimensionScores};

/// Score change for one dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionDelta {
    pub dimension: Dimension,
    pub pre: u8,
    pub post: u8,
    /// `post - pre`.
    pub change: i16,
}

/// What the comparison screen can show for a child.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComparisonView {
    /// The comparison feature is switched off for this child.
    Disabled,
    /// No completed baseline assessment yet.
    PrePending,
    /// Baseline completed, follow-up outstanding.
    PostPending {
        pre_scores: DimensionScores,
        pre_completed_at: Option<DateTime<Utc>>,
    },
    /// Both assessments completed.
    Available {
        pre_scores: DimensionScores,
        post_scores: DimensionScores,
        deltas: Vec<DimensionDelta>,
        overall_change_percent: i32,
    },
}

impl ComparisonView {
    pub fn state_name(&self) -> &'static str {
        match self {
            ComparisonView::Disabled => "DISABLED",
            ComparisonView::PrePending => "PRE_PENDING",
            ComparisonView::PostPending { .. } => "POST_PENDING",
            ComparisonView::Available { .. } => "AVAILABLE",
        }
    }
}

/// Per-dimension deltas for dimensions scored in both assessments, in
/// canonical dimension order.
pub fn dimension_deltas(pre: &DimensionScores, post: &DimensionScores) -> Vec<DimensionDelta> {
    pre.iter()
        .filter_map(|(dimension, &pre_score)| {
            post.get(dimension).map(|&post_score| DimensionDelta {
                dimension: *dimension,
                pre: pre_score,
                post: post_score,
                change: i16::from(post_score) - i16::from(pre_score),
            })
        })
        .collect()
}

/// Percentage change between the average pre score and the average post
/// score across `deltas`.
///
/// A zero baseline maps to +100 when anything was gained, otherwise 0.
pub fn overall_change_percent(deltas: &[DimensionDelta]) -> i32 {
    if deltas.is_empty() {
        return 0;
    }
    let n = deltas.len() as f64;
    let pre_avg = deltas.iter().map(|d| f64::from(d.pre)).sum::<f64>() / n;
    let post_avg = deltas.iter().map(|d| f64::from(d.post)).sum::<f64>() / n;

    if pre_avg == 0.0 {
        return if post_avg > 0.0 { 100 } else { 0 };
    }
    // Halves round up, including negative ones: -12.5 -> -12.
    ((post_avg - pre_avg) / pre_avg * 100.0 + 0.5).floor() as i32
}

/// Classifies a pre/post pair into a [`ComparisonView`].
pub fn compare(
    enabled: bool,
    pre: Option<&AssessmentResult>,
    post: Option<&AssessmentResult>,
) -> ComparisonView {
    if !enabled {
        return ComparisonView::Disabled;
    }

    let Some(pre) = pre.filter(|r| r.is_completed()) else {
        return ComparisonView::PrePending;
    };

    let Some(post) = post.filter(|r| r.is_completed()) else {
        return ComparisonView::PostPending {
            pre_scores: pre.scores.clone(),
            pre_completed_at: pre.completion_date,
        };
    };

    let deltas = dimension_deltas(&pre.scores, &post.scores);
    let overall_change_percent = overall_change_percent(&deltas);
    ComparisonView::Available {
        pre_scores: pre.scores.clone(),
        post_scores: post.scores.clone(),
        deltas,
        overall_change_percent,
    }
}
