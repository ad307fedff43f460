//! The `selquest validate` command.

use std::path::PathBuf;

use anyhow::Result;

use selquest_core::parser::{parse_question_bank, validate_question_bank};
use selquest_store::load_config_from;

pub fn execute(config_path: Option<PathBuf>, bank_path: Option<PathBuf>) -> Result<()> {
    let bank = match bank_path {
        Some(path) => parse_question_bank(&path)?,
        None => load_config_from(config_path.as_deref())?.load_question_bank()?,
    };

    println!(
        "Question bank: {} ({} questions)",
        bank.name,
        bank.questions.len()
    );

    let warnings = validate_question_bank(&bank);
    for w in &warnings {
        let prefix = w
            .code
            .as_ref()
            .map(|code| format!("  [{code}]"))
            .unwrap_or_else(|| "  ".to_string());
        println!("{prefix} WARNING: {}", w.message);
    }

    if warnings.is_empty() {
        println!("Question bank valid.");
    } else {
        println!("\n{} warning(s) found.", warnings.len());
    }

    Ok(())
}
