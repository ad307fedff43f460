//! The `selquest compare` command.

use std::path::PathBuf;

use anyhow::Result;

use selquest_core::report::ComparisonReport;

use super::common::build_engine;

pub async fn execute(
    config_path: Option<PathBuf>,
    child: String,
    format: String,
    output: Option<PathBuf>,
) -> Result<()> {
    let (_, engine) = build_engine(config_path.as_deref())?;
    let view = engine.comparison(&child).await?;
    let report = ComparisonReport::new(child, view);

    match format.as_str() {
        "markdown" | "md" => println!("{}", report.to_markdown()),
        "json" => println!("{}", serde_json::to_string_pretty(&report)?),
        _ => print!("{}", report.to_text()),
    }

    if let Some(path) = output {
        report.save_json(&path)?;
        eprintln!("Report saved to {}", path.display());
    }

    Ok(())
}
