//! TOML question bank parser.
//!
//! Loads assessment question banks from TOML files and validates them.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::model::{AssessmentQuestion, Dimension};

/// The question bank shipped with selquest.
pub const DEFAULT_QUESTION_BANK: &str = include_str!("../question-banks/default.toml");

/// A named, ordered set of assessment questions.
#[derive(Debug, Clone)]
pub struct QuestionBank {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Questions sorted by display order.
    pub questions: Vec<AssessmentQuestion>,
}

/// Intermediate TOML structure for parsing question bank files.
#[derive(Debug, Deserialize)]
struct TomlBankFile {
    bank: TomlBankHeader,
    #[serde(default)]
    questions: Vec<TomlQuestion>,
}

#[derive(Debug, Deserialize)]
struct TomlBankHeader {
    id: String,
    name: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct TomlQuestion {
    code: String,
    dimension: String,
    text: String,
    #[serde(default)]
    display_order: Option<i32>,
}

/// Parse a single TOML file into a `QuestionBank`.
pub fn parse_question_bank(path: &Path) -> Result<QuestionBank> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read question bank file: {}", path.display()))?;

    parse_question_bank_str(&content, path)
}

/// Parse the built-in question bank.
pub fn default_question_bank() -> Result<QuestionBank> {
    parse_question_bank_str(DEFAULT_QUESTION_BANK, Path::new("<built-in>"))
}

/// Parse a TOML string into a `QuestionBank` (useful for testing).
///
/// Questions without a `display_order` take their position in the file.
pub fn parse_question_bank_str(content: &str, source_path: &Path) -> Result<QuestionBank> {
    let parsed: TomlBankFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let mut questions = parsed
        .questions
        .into_iter()
        .enumerate()
        .map(|(index, q)| {
            let dimension: Dimension = q
                .dimension
                .parse()
                .with_context(|| format!("question {}", q.code))?;
            Ok(AssessmentQuestion {
                code: q.code,
                dimension,
                text: q.text,
                display_order: q.display_order.unwrap_or(index as i32 + 1),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    questions.sort_by_key(|q| q.display_order);

    Ok(QuestionBank {
        id: parsed.bank.id,
        name: parsed.bank.name,
        description: parsed.bank.description,
        questions,
    })
}

/// A warning from question bank validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The question code (if applicable).
    pub code: Option<String>,
    /// Warning message.
    pub message: String,
}

/// Validate a question bank for common issues.
pub fn validate_question_bank(bank: &QuestionBank) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    let mut seen_codes = HashSet::new();
    let mut seen_orders = HashSet::new();
    for question in &bank.questions {
        if !seen_codes.insert(&question.code) {
            warnings.push(ValidationWarning {
                code: Some(question.code.clone()),
                message: format!("duplicate question code: {}", question.code),
            });
        }
        if !seen_orders.insert(question.display_order) {
            warnings.push(ValidationWarning {
                code: Some(question.code.clone()),
                message: format!("duplicate display_order: {}", question.display_order),
            });
        }
        if question.text.trim().is_empty() {
            warnings.push(ValidationWarning {
                code: Some(question.code.clone()),
                message: "question text is empty".into(),
            });
        }
    }

    for dimension in Dimension::ALL {
        if !bank.questions.iter().any(|q| q.dimension == dimension) {
            warnings.push(ValidationWarning {
                code: None,
                message: format!("no questions for dimension {dimension}"),
            });
        }
    }

    warnings
}
