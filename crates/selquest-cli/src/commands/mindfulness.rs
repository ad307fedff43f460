//! The `selquest mindfulness` command.

use std::path::PathBuf;

use anyhow::Result;
use chrono::{DateTime, Utc};

use super::common::{build_engine, now_or, print_activity};

pub async fn execute(
    config_path: Option<PathBuf>,
    child: String,
    at: Option<DateTime<Utc>>,
    format: String,
) -> Result<()> {
    let (_, engine) = build_engine(config_path.as_deref())?;
    let result = engine.record_mindfulness(&child, now_or(at)).await;
    print_activity("Mindfulness session", &child, result, &format)
}
