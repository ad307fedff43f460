//! Comparison report rendering with JSON persistence.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::comparison::ComparisonView;

/// A rendered snapshot of a child's pre/post comparison.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonReport {
    pub child_id: String,
    /// When the view was computed.
    pub generated_at: DateTime<Utc>,
    pub view: ComparisonView,
}

impl ComparisonReport {
    pub fn new(child_id: impl Into<String>, view: ComparisonView) -> Self {
        Self {
            child_id: child_id.into(),
            generated_at: Utc::now(),
            view,
        }
    }

    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: ComparisonReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }

    /// Format the report as plain text.
    pub fn to_text(&self) -> String {
        let mut out = format!("Comparison for {}: {}\n", self.child_id, self.view.state_name());

        match &self.view {
            ComparisonView::Disabled => {
                out.push_str("Pre/post comparison is not enabled for this child.\n");
            }
            ComparisonView::PrePending => {
                out.push_str("Waiting for the PRE assessment.\n");
            }
            ComparisonView::PostPending {
                pre_scores,
                pre_completed_at,
            } => {
                if let Some(at) = pre_completed_at {
                    out.push_str(&format!("PRE completed {}\n", at.format("%Y-%m-%d")));
                }
                for (dimension, score) in pre_scores {
                    out.push_str(&format!("  {:<28} {:>3}\n", dimension.label(), score));
                }
                out.push_str("Waiting for the POST assessment.\n");
            }
            ComparisonView::Available {
                deltas,
                overall_change_percent,
                ..
            } => {
                for d in deltas {
                    out.push_str(&format!(
                        "  {:<28} {:>3} -> {:>3} ({:+})\n",
                        d.dimension.label(),
                        d.pre,
                        d.post,
                        d.change
                    ));
                }
                out.push_str(&format!("Overall change: {overall_change_percent:+}%\n"));
            }
        }

        out
    }

    /// Format the report as markdown.
    pub fn to_markdown(&self) -> String {
        let mut md = format!(
            "**Comparison for {}:** `{}`\n\n",
            self.child_id,
            self.view.state_name()
        );

        match &self.view {
            ComparisonView::Disabled | ComparisonView::PrePending => {}
            ComparisonView::PostPending { pre_scores, .. } => {
                md.push_str("| Dimension | Pre |\n");
                md.push_str("|-----------|-----|\n");
                for (dimension, score) in pre_scores {
                    md.push_str(&format!("| {} | {} |\n", dimension.label(), score));
                }
            }
            ComparisonView::Available {
                deltas,
                overall_change_percent,
                ..
            } => {
                md.push_str("| Dimension | Pre | Post | Change |\n");
                md.push_str("|-----------|-----|------|--------|\n");
                for d in deltas {
                    md.push_str(&format!(
                        "| {} | {} | {} | {:+} |\n",
                        d.dimension.label(),
                        d.pre,
                        d.post,
                        d.change
                    ));
                }
                md.push_str(&format!(
                    "\n**Overall change:** {overall_change_percent:+}%\n"
                ));
            }
        }

        md
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comparison::dimension_deltas;
    use crate::model::Dimension;

    fn available() -> ComparisonView {
        let pre = [(Dimension::SelfAwareness, 60)].into_iter().collect();
        let post = [(Dimension::SelfAwareness, 75)].into_iter().collect();
        let deltas = dimension_deltas(&pre, &post);
        ComparisonView::Available {
            pre_scores: pre,
            post_scores: post,
            deltas,
            overall_change_percent: 25,
        }
    }

    #[test]
    fn text_output() {
        let text = ComparisonReport::new("kid", available()).to_text();
        assert!(text.contains("AVAILABLE"));
        assert!(text.contains("60 ->  75 (+15)"));
        assert!(text.contains("Overall change: +25%"));
    }

    #[test]
    fn markdown_output() {
        let md = ComparisonReport::new("kid", available()).to_markdown();
        assert!(md.contains("| Self-Awareness | 60 | 75 | +15 |"));
        assert!(md.contains("+25%"));

        let pending = ComparisonReport::new("kid", ComparisonView::PrePending).to_markdown();
        assert!(pending.contains("PRE_PENDING"));
        assert!(!pending.contains('|'));
    }

    #[test]
    fn json_roundtrip() {
        let report = ComparisonReport::new("kid", available());
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/report.json");

        report.save_json(&path).unwrap();
        let loaded = ComparisonReport::load_json(&path).unwrap();

        assert_eq!(loaded.child_id, "kid");
        assert_eq!(loaded.view, report.view);
    }
}
