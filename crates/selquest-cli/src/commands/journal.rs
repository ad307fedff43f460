//! The `selquest journal` command.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

use selquest_core::engine::ActivityEvent;
use selquest_core::model::Dimension;
use selquest_core::traits::sanitize_scores;

use super::common::{build_engine, now_or, print_activity};

pub async fn execute(
    config_path: Option<PathBuf>,
    child: String,
    text: String,
    sel_scores: Vec<String>,
    at: Option<DateTime<Utc>>,
    format: String,
) -> Result<()> {
    let (_, engine) = build_engine(config_path.as_deref())?;
    let now = now_or(at);

    // Scores given on the command line replace text analysis.
    let result = if sel_scores.is_empty() {
        engine.record_journal(&child, &text, now).await
    } else {
        let scores = parse_sel_scores(&sel_scores)?;
        engine
            .record(
                &child,
                ActivityEvent::Journal {
                    sel_scores: Some(sanitize_scores(scores)),
                },
                now,
            )
            .await
    };
    print_activity("Journal entry", &child, result, &format)
}

/// Parses `dimension=score` pairs.
fn parse_sel_scores(pairs: &[String]) -> Result<BTreeMap<Dimension, f64>> {
    pairs
        .iter()
        .map(|pair| {
            let (dimension, score) = pair
                .split_once('=')
                .with_context(|| format!("expected dimension=score, got '{pair}'"))?;
            let dimension: Dimension = dimension.parse()?;
            let score: f64 = score
                .trim()
                .parse()
                .with_context(|| format!("invalid score in '{pair}'"))?;
            Ok((dimension, score))
        })
        .collect()
}
