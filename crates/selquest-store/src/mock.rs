//! Mock text analyzer for testing.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use selquest_core::model::Dimension;
use selquest_core::traits::TextAnalyzer;

/// A mock analyzer for exercising the engine without a real model.
///
/// Scores come from keyword matches (case-insensitive) merged over a
/// fixed default; the highest score wins when several keywords hit the
/// same dimension.
pub struct MockAnalyzer {
    /// Keyword → (dimension, score).
    keywords: Vec<(String, Dimension, f64)>,
    /// Scores returned for every call, before keyword matches.
    default_scores: BTreeMap<Dimension, f64>,
    /// When set, every call fails with this message.
    failure: Option<String>,
    /// Number of calls made.
    call_count: AtomicU32,
    /// Last text received.
    last_text: Mutex<Option<String>>,
}

impl MockAnalyzer {
    /// Create a mock with keyword → dimension score mappings.
    pub fn new(keywords: Vec<(String, Dimension, f64)>) -> Self {
        Self {
            keywords,
            default_scores: BTreeMap::new(),
            failure: None,
            call_count: AtomicU32::new(0),
            last_text: Mutex::new(None),
        }
    }

    /// Create a mock that always returns the same scores.
    pub fn with_fixed_scores(scores: BTreeMap<Dimension, f64>) -> Self {
        Self {
            default_scores: scores,
            ..Self::new(Vec::new())
        }
    }

    /// Create a mock whose every call fails.
    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::new(Vec::new())
        }
    }

    /// Get the number of calls made to this analyzer.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// Get the last text passed to this analyzer.
    pub fn last_text(&self) -> Option<String> {
        self.last_text.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextAnalyzer for MockAnalyzer {
    fn name(&self) -> &str {
        "mock"
    }

    async fn analyze(&self, text: &str) -> anyhow::Result<BTreeMap<Dimension, f64>> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        *self.last_text.lock().unwrap() = Some(text.to_string());

        if let Some(message) = &self.failure {
            anyhow::bail!("{message}");
        }

        let lowered = text.to_lowercase();
        let mut scores = self.default_scores.clone();
        for (keyword, dimension, score) in &self.keywords {
            if lowered.contains(&keyword.to_lowercase()) {
                let entry = scores.entry(*dimension).or_insert(0.0);
                *entry = entry.max(*score);
            }
        }
        Ok(scores)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fixed_scores() {
        let analyzer =
            MockAnalyzer::with_fixed_scores(BTreeMap::from([(Dimension::SelfAwareness, 0.8)]));
        let scores = analyzer.analyze("anything").await.unwrap();
        assert_eq!(scores[&Dimension::SelfAwareness], 0.8);
        assert_eq!(analyzer.call_count(), 1);
        assert_eq!(analyzer.last_text().as_deref(), Some("anything"));
    }

    #[tokio::test]
    async fn keyword_matching() {
        let analyzer = MockAnalyzer::new(vec![
            ("friend".into(), Dimension::RelationshipSkills, 0.9),
            ("calm".into(), Dimension::SelfManagement, 0.75),
            ("buddy".into(), Dimension::RelationshipSkills, 0.4),
        ]);

        let scores = analyzer
            .analyze("I stayed Calm and helped my friend and my buddy")
            .await
            .unwrap();
        assert_eq!(scores.len(), 2);
        assert_eq!(scores[&Dimension::RelationshipSkills], 0.9);
        assert_eq!(scores[&Dimension::SelfManagement], 0.75);

        let none = analyzer.analyze("nothing relevant").await.unwrap();
        assert!(none.is_empty());
        assert_eq!(analyzer.call_count(), 2);
    }

    #[tokio::test]
    async fn failing_analyzer() {
        let analyzer = MockAnalyzer::failing("model offline");
        let err = analyzer.analyze("text").await.unwrap_err();
        assert!(err.to_string().contains("model offline"));
        assert_eq!(analyzer.call_count(), 1);
    }
}
