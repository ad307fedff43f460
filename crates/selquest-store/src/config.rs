//! selquest configuration.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::FixedOffset;
use serde::{Deserialize, Serialize};

use selquest_core::engine::EngineConfig;
use selquest_core::parser::{default_question_bank, parse_question_bank, QuestionBank};

/// Top-level selquest configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelquestConfig {
    /// Directory holding progress and assessment files.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Offset in whole hours that defines the calendar day.
    #[serde(default)]
    pub utc_offset_hours: i32,
    /// Global switch for the pre/post comparison view.
    #[serde(default = "default_true")]
    pub comparison_enabled: bool,
    /// Children for whom the comparison view is turned off.
    #[serde(default)]
    pub comparison_disabled_children: Vec<String>,
    /// Re-evaluation attempts after a conflicting progress write.
    #[serde(default = "default_retries")]
    pub max_conflict_retries: u32,
    /// Progress read cache lifetime; 0 disables the cache.
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_secs: u64,
    /// Question bank TOML file. The built-in bank is used when unset.
    #[serde(default)]
    pub question_bank: Option<PathBuf>,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./selquest-data")
}
fn default_true() -> bool {
    true
}
fn default_retries() -> u32 {
    3
}
fn default_cache_ttl() -> u64 {
    30
}

impl Default for SelquestConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            utc_offset_hours: 0,
            comparison_enabled: true,
            comparison_disabled_children: Vec::new(),
            max_conflict_retries: default_retries(),
            cache_ttl_secs: default_cache_ttl(),
            question_bank: None,
        }
    }
}

impl SelquestConfig {
    /// The offset that defines a calendar day.
    pub fn utc_offset(&self) -> Result<FixedOffset> {
        if !(-12..=14).contains(&self.utc_offset_hours) {
            anyhow::bail!(
                "utc_offset_hours must be between -12 and 14, got {}",
                self.utc_offset_hours
            );
        }
        FixedOffset::east_opt(self.utc_offset_hours * 3600)
            .with_context(|| format!("invalid utc offset: {}", self.utc_offset_hours))
    }

    pub fn engine_config(&self) -> Result<EngineConfig> {
        Ok(EngineConfig {
            utc_offset: self.utc_offset()?,
            max_conflict_retries: self.max_conflict_retries,
        })
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn disabled_children(&self) -> HashSet<String> {
        self.comparison_disabled_children.iter().cloned().collect()
    }

    /// Load the configured question bank, or the built-in one.
    pub fn load_question_bank(&self) -> Result<QuestionBank> {
        match &self.question_bank {
            Some(path) => parse_question_bank(path),
            None => default_question_bank(),
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
///
/// Single pass: substituted values are not scanned again.
fn resolve_env_vars(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(end) = rest[start..].find('}') else {
            break;
        };
        result.push_str(&rest[..start]);
        let var_name = &rest[start + 2..start + end];
        result.push_str(&std::env::var(var_name).unwrap_or_default());
        rest = &rest[start + end + 1..];
    }
    result.push_str(rest);
    result
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `selquest.toml` in the current directory
/// 2. `~/.config/selquest/config.toml`
///
/// Environment variable overrides: `SELQUEST_DATA_DIR`, `SELQUEST_UTC_OFFSET`.
pub fn load_config() -> Result<SelquestConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<SelquestConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("selquest.toml");
        if local.exists() {
            Some(local)
        } else if let Some(home) = dirs_path() {
            let global = home.join("config.toml");
            if global.exists() {
                Some(global)
            } else {
                None
            }
        } else {
            None
        }
    };

    let mut config = match &config_path {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<SelquestConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => SelquestConfig::default(),
    };

    if let Ok(dir) = std::env::var("SELQUEST_DATA_DIR") {
        config.data_dir = PathBuf::from(dir);
    }
    if let Ok(offset) = std::env::var("SELQUEST_UTC_OFFSET") {
        config.utc_offset_hours = offset
            .trim()
            .parse()
            .with_context(|| format!("SELQUEST_UTC_OFFSET is not an integer: {offset}"))?;
    }

    config.data_dir = PathBuf::from(resolve_env_vars(&config.data_dir.to_string_lossy()));
    config.question_bank = config
        .question_bank
        .map(|p| PathBuf::from(resolve_env_vars(&p.to_string_lossy())));

    // Validate early so a bad offset fails at startup.
    config.utc_offset()?;

    tracing::debug!(
        source = ?config_path,
        data_dir = %config.data_dir.display(),
        "loaded config"
    );
    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("selquest"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_env_vars_basic() {
        std::env::set_var("_SELQUEST_TEST_VAR", "hello");
        assert_eq!(resolve_env_vars("${_SELQUEST_TEST_VAR}"), "hello");
        assert_eq!(
            resolve_env_vars("prefix_${_SELQUEST_TEST_VAR}_suffix"),
            "prefix_hello_suffix"
        );
        std::env::remove_var("_SELQUEST_TEST_VAR");
    }

    #[test]
    fn resolve_env_vars_does_not_rescan_values() {
        std::env::set_var("_SELQUEST_SELF_REF", "${_SELQUEST_SELF_REF}/data");
        assert_eq!(
            resolve_env_vars("${_SELQUEST_SELF_REF}"),
            "${_SELQUEST_SELF_REF}/data"
        );
        std::env::remove_var("_SELQUEST_SELF_REF");

        assert_eq!(resolve_env_vars("${_SELQUEST_UNSET_VAR}x"), "x");
        assert_eq!(resolve_env_vars("open ${brace"), "open ${brace");
    }

    #[test]
    fn default_config() {
        let config = SelquestConfig::default();
        assert_eq!(config.data_dir, PathBuf::from("./selquest-data"));
        assert!(config.comparison_enabled);
        assert_eq!(config.max_conflict_retries, 3);
        assert_eq!(config.cache_ttl(), Duration::from_secs(30));
        assert_eq!(config.utc_offset().unwrap().local_minus_utc(), 0);
    }

    #[test]
    fn parse_config_file() {
        let toml_str = r#"
data_dir = "/var/lib/selquest"
utc_offset_hours = -5
comparison_disabled_children = ["kid-7"]
cache_ttl_secs = 0
"#;
        let config: SelquestConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/var/lib/selquest"));
        assert_eq!(config.utc_offset().unwrap().local_minus_utc(), -5 * 3600);
        assert!(config.disabled_children().contains("kid-7"));
        assert_eq!(config.cache_ttl_secs, 0);
        assert_eq!(config.max_conflict_retries, 3);
    }

    #[test]
    fn offset_out_of_range() {
        let config = SelquestConfig {
            utc_offset_hours: 15,
            ..Default::default()
        };
        assert!(config.utc_offset().is_err());
        assert!(config.engine_config().is_err());
    }

    #[test]
    fn explicit_path_must_exist() {
        let err = load_config_from(Some(Path::new("/nonexistent/selquest.toml"))).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }

    #[test]
    fn load_from_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("selquest.toml");
        std::fs::write(&path, "utc_offset_hours = 9\nmax_conflict_retries = 5\n").unwrap();

        let config = load_config_from(Some(&path)).unwrap();
        assert_eq!(config.max_conflict_retries, 5);
        assert_eq!(config.engine_config().unwrap().max_conflict_retries, 5);
    }

    #[test]
    fn builtin_question_bank_when_unset() {
        let bank = SelquestConfig::default().load_question_bank().unwrap();
        assert_eq!(bank.questions.len(), 15);
    }
}
