//! The `selquest init` command.

use std::path::Path;

use anyhow::Result;

use selquest_core::parser::{default_question_bank, DEFAULT_QUESTION_BANK};

pub fn execute() -> Result<()> {
    // Create selquest.toml
    if Path::new("selquest.toml").exists() {
        println!("selquest.toml already exists, skipping.");
    } else {
        std::fs::write("selquest.toml", SAMPLE_CONFIG)?;
        println!("Created selquest.toml");
    }

    // Copy the built-in question bank so it can be edited
    std::fs::create_dir_all("question-banks")?;
    let bank_path = Path::new("question-banks/sel-core.toml");
    if bank_path.exists() {
        println!("question-banks/sel-core.toml already exists, skipping.");
    } else {
        std::fs::write(bank_path, DEFAULT_QUESTION_BANK)?;
        println!("Created question-banks/sel-core.toml");
    }

    // Example answers covering every question
    let answers_path = Path::new("answers-example.toml");
    if answers_path.exists() {
        println!("answers-example.toml already exists, skipping.");
    } else {
        let bank = default_question_bank()?;
        let mut answers = String::from("# question code = answer (1-5)\n");
        for question in &bank.questions {
            answers.push_str(&format!("{} = 3\n", question.code));
        }
        std::fs::write(answers_path, answers)?;
        println!("Created answers-example.toml");
    }

    println!("\nNext steps:");
    println!("  1. Run: selquest validate --bank question-banks/sel-core.toml");
    println!("  2. Run: selquest check-in --child kid-1");
    println!("  3. Run: selquest assess --child kid-1 --type pre --answers answers-example.toml");
    println!("  4. Run: selquest compare --child kid-1");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# selquest configuration

# Where progress and assessment files are stored. ${VAR} references are resolved.
data_dir = "./selquest-data"

# Hours east of UTC that define the calendar day for streaks (-12..=14).
utc_offset_hours = 0

# Pre/post comparison view.
comparison_enabled = true
comparison_disabled_children = []

# Re-evaluation attempts after a conflicting progress write.
max_conflict_retries = 3

# Progress read cache lifetime in seconds (0 disables).
cache_ttl_secs = 30

# question_bank = "question-banks/sel-core.toml"
"#;
