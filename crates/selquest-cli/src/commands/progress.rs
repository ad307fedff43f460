//! The `selquest progress` command.

use std::path::PathBuf;

use anyhow::Result;
use chrono::Utc;
use comfy_table::{Cell, Table};

use selquest_core::engine::ProgressSummary;

use super::common::build_engine;

pub async fn execute(config_path: Option<PathBuf>, child: String, format: String) -> Result<()> {
    let (_, engine) = build_engine(config_path.as_deref())?;
    let summary = engine.progress_summary(&child, Utc::now()).await?;

    match format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&summary)?),
        _ => print_summary(&summary),
    }
    Ok(())
}

fn print_summary(summary: &ProgressSummary) {
    let progress = &summary.progress;
    let level = &summary.level;

    let next = match level.next_threshold {
        Some(next) => format!("{}% (next level at {next} XP)", level.progress_percent),
        None => "max level".to_string(),
    };
    let last_check_in = progress
        .last_check_in
        .map(|at| at.format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_else(|| "never".to_string());

    let mut table = Table::new();
    table.set_header(vec!["Child", summary.child_id.as_str()]);
    table.add_row(vec![
        Cell::new("Streak"),
        Cell::new(format!("{} day(s)", progress.streak_count)),
    ]);
    table.add_row(vec![Cell::new("XP"), Cell::new(progress.xp_points)]);
    table.add_row(vec![Cell::new("Level"), Cell::new(level.level)]);
    table.add_row(vec![Cell::new("Progress"), Cell::new(next)]);
    table.add_row(vec![
        Cell::new("Checked in today"),
        Cell::new(if summary.checked_in_today { "yes" } else { "no" }),
    ]);
    table.add_row(vec![Cell::new("Last check-in"), Cell::new(last_check_in)]);
    table.add_row(vec![
        Cell::new("Profile completed"),
        Cell::new(if progress.profile_completed { "yes" } else { "no" }),
    ]);

    let badges: Vec<&str> = progress.badges.iter().map(|b| b.as_str()).collect();
    table.add_row(vec![
        Cell::new(format!("Badges ({})", badges.len())),
        Cell::new(if badges.is_empty() {
            "-".to_string()
        } else {
            badges.join("\n")
        }),
    ]);

    println!("{table}");
}
