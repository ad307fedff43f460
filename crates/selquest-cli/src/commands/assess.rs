//! The `selquest assess` command.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

use selquest_core::model::{AssessmentAnswer, AssessmentType};

use super::common::{build_engine, now_or};

pub async fn execute(
    config_path: Option<PathBuf>,
    child: String,
    assessment_type: AssessmentType,
    answers_path: PathBuf,
    at: Option<DateTime<Utc>>,
) -> Result<()> {
    let answers = load_answers(&answers_path)?;
    let (_, engine) = build_engine(config_path.as_deref())?;

    let id = engine
        .submit_assessment(&child, assessment_type, &answers, now_or(at))
        .await?;

    println!(
        "{assessment_type} assessment stored for {child} ({} answers, id {id})",
        answers.len()
    );
    Ok(())
}

/// Reads a `code = value` answers file, TOML or JSON by extension.
fn load_answers(path: &Path) -> Result<Vec<AssessmentAnswer>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read answers file: {}", path.display()))?;

    let raw: BTreeMap<String, u8> = match path.extension().and_then(|e| e.to_str()) {
        Some("json") => serde_json::from_str(&content)
            .with_context(|| format!("failed to parse answers JSON: {}", path.display()))?,
        _ => toml::from_str(&content)
            .with_context(|| format!("failed to parse answers TOML: {}", path.display()))?,
    };

    raw.into_iter()
        .map(|(code, value)| {
            AssessmentAnswer::new(code.as_str(), value)
                .with_context(|| format!("answer for {code}"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_toml_and_json() {
        let dir = tempfile::tempdir().unwrap();

        let toml_path = dir.path().join("answers.toml");
        std::fs::write(&toml_path, "SA1 = 4\nSM1 = 2\n").unwrap();
        let answers = load_answers(&toml_path).unwrap();
        assert_eq!(answers.len(), 2);
        assert_eq!(answers[0].question_code, "SA1");
        assert_eq!(answers[0].value.get(), 4);

        let json_path = dir.path().join("answers.json");
        std::fs::write(&json_path, r#"{"DM1": 5}"#).unwrap();
        assert_eq!(load_answers(&json_path).unwrap()[0].value.get(), 5);
    }

    #[test]
    fn out_of_range_value_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("answers.toml");
        std::fs::write(&path, "SA1 = 6\n").unwrap();
        let err = load_answers(&path).unwrap_err();
        assert!(format!("{err:#}").contains("outside 1..=5"));
    }
}
