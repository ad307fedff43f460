//! Engine wiring and output helpers shared by the commands.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

use selquest_core::engine::{ActivityReport, ProgressEngine};
use selquest_core::error::EngineError;
use selquest_store::{load_config_from, CachedStore, JsonFileStore, SelquestConfig, StaticFlags};

/// Loads config and builds an engine over the JSON store in `data_dir`.
pub fn build_engine(config_path: Option<&Path>) -> Result<(SelquestConfig, ProgressEngine)> {
    let config = load_config_from(config_path)?;
    let bank = config.load_question_bank()?;

    let store = JsonFileStore::open(&config.data_dir, bank.questions)
        .with_context(|| format!("failed to open data dir {}", config.data_dir.display()))?;
    let store = Arc::new(CachedStore::new(store, config.cache_ttl()));

    let engine = ProgressEngine::new(
        store.clone(),
        store,
        Arc::new(StaticFlags::from_config(&config)),
        config.engine_config()?,
    );
    Ok((config, engine))
}

pub fn now_or(at: Option<DateTime<Utc>>) -> DateTime<Utc> {
    at.unwrap_or_else(Utc::now)
}

/// Prints the outcome of an activity. A lost concurrent update is not an
/// error: the other writer's state stands.
pub fn print_activity(
    label: &str,
    child: &str,
    result: Result<ActivityReport, EngineError>,
    format: &str,
) -> Result<()> {
    let report = match result {
        Ok(report) => report,
        Err(e) if e.is_noop() => {
            println!("{label} for {child} lost a concurrent update; nothing applied.");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if !report.applied {
        println!("{label} for {child}: already recorded, nothing changed.");
        return Ok(());
    }

    if report.bonus_xp > 0 {
        println!(
            "{label} recorded for {child}: +{} XP ({} base + {} streak bonus)",
            report.xp_delta(),
            report.base_xp,
            report.bonus_xp
        );
    } else {
        println!("{label} recorded for {child}: +{} XP", report.xp_delta());
    }
    println!(
        "Streak: {} | XP: {} | Level {} ({}%)",
        report.streak_count, report.xp_total, report.level.level, report.level.progress_percent
    );
    if !report.unlocked.is_empty() {
        let names: Vec<&str> = report.unlocked.iter().map(|b| b.as_str()).collect();
        println!("Unlocked: {}", names.join(", "));
    }
    Ok(())
}
