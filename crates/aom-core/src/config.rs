//! Application configuration
//!
//! Config is loaded once at startup with a two-layer resolution:
//! 1. Check for an override (explicit path, or ~/.local/share/aom/config.toml)
//! 2. Fall back to embedded defaults (compiled into binary)
//!
//! The loaded [`AppConfig`] is passed down explicitly. Nothing below the
//! entry points reads config files or rich-menu state from disk.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::FixedOffset;
use serde::Deserialize;

use crate::error::{Error, Result};

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/aom.toml");

/// Environment variable holding the messaging channel secret
pub const CHANNEL_SECRET_ENV: &str = "AOM_CHANNEL_SECRET";

/// Environment variable holding the messaging channel access token
pub const CHANNEL_TOKEN_ENV: &str = "AOM_CHANNEL_ACCESS_TOKEN";

/// Environment variable holding comma-separated API keys
pub const API_KEYS_ENV: &str = "AOM_API_KEYS";

/// Application configuration
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Offset from UTC used for calendar days and month keys
    pub utc_offset_hours: i32,
    /// Number of category names suggested when a label cannot be resolved
    pub suggestion_limit: usize,
    /// Number of categories listed by the top-categories command
    pub top_categories_limit: usize,
    /// Alert percentage used when a category has a budget but no threshold
    pub default_alert_percent: f64,
    /// Rich menu ids keyed by role ("main", "family", ...)
    pub rich_menus: BTreeMap<String, String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            utc_offset_hours: 7,
            suggestion_limit: 5,
            top_categories_limit: 5,
            default_alert_percent: 80.0,
            rich_menus: BTreeMap::new(),
        }
    }
}

impl AppConfig {
    /// Load from the default override location, falling back to embedded defaults
    pub fn load() -> Result<Self> {
        load_config(None)
    }

    /// Load from an explicit path (missing file falls back to embedded defaults)
    pub fn load_from(path: &Path) -> Result<Self> {
        load_config(Some(path))
    }

    /// Parse a TOML document
    pub fn from_toml(content: &str) -> Result<Self> {
        parse_config(content)
    }

    /// Fixed offset for local calendar computations
    pub fn offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_hours * 3600)
            .unwrap_or_else(|| FixedOffset::east_opt(0).expect("zero offset is valid"))
    }

    pub fn rich_menu(&self, role: &str) -> Option<&str> {
        self.rich_menus.get(role).map(String::as_str)
    }
}

/// Get the default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("aom").join("config.toml"))
}

/// Load configuration (override first, then default)
fn load_config(override_path: Option<&Path>) -> Result<AppConfig> {
    let path = match override_path {
        Some(path) => Some(path.to_path_buf()),
        None => default_config_path(),
    };

    let content = match path {
        Some(path) if path.exists() => fs::read_to_string(&path)
            .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))?,
        _ => DEFAULT_CONFIG.to_string(),
    };

    parse_config(&content)
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
struct RawConfig {
    timezone: Option<RawTimezone>,
    chat: Option<RawChat>,
    budget: Option<RawBudget>,
    rich_menu: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Deserialize)]
struct RawTimezone {
    utc_offset_hours: Option<i32>,
}

#[derive(Debug, Deserialize)]
struct RawChat {
    suggestion_limit: Option<usize>,
    top_categories_limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct RawBudget {
    default_alert_percent: Option<f64>,
}

fn parse_config(content: &str) -> Result<AppConfig> {
    let raw: RawConfig = toml::from_str(content)?;
    let mut config = AppConfig::default();

    if let Some(tz) = raw.timezone {
        if let Some(hours) = tz.utc_offset_hours {
            if !(-12..=14).contains(&hours) {
                return Err(Error::Config(format!(
                    "utc_offset_hours out of range: {}",
                    hours
                )));
            }
            config.utc_offset_hours = hours;
        }
    }

    if let Some(chat) = raw.chat {
        if let Some(limit) = chat.suggestion_limit {
            config.suggestion_limit = limit;
        }
        if let Some(limit) = chat.top_categories_limit {
            config.top_categories_limit = limit;
        }
    }

    if let Some(budget) = raw.budget {
        if let Some(percent) = budget.default_alert_percent {
            config.default_alert_percent = percent;
        }
    }

    if let Some(menus) = raw.rich_menu {
        config.rich_menus = menus
            .into_iter()
            .filter(|(_, id)| !id.trim().is_empty())
            .collect();
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_embedded_default_parses() {
        let config = parse_config(DEFAULT_CONFIG).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_override_values() {
        let config = AppConfig::from_toml(
            r#"
            [timezone]
            utc_offset_hours = 9

            [chat]
            suggestion_limit = 3

            [rich_menu]
            main = "richmenu-abc"
            family = ""
            "#,
        )
        .unwrap();

        assert_eq!(config.utc_offset_hours, 9);
        assert_eq!(config.suggestion_limit, 3);
        assert_eq!(config.top_categories_limit, 5);
        assert_eq!(config.rich_menu("main"), Some("richmenu-abc"));
        // Blank ids are dropped
        assert_eq!(config.rich_menu("family"), None);
    }

    #[test]
    fn test_offset_out_of_range() {
        let result = AppConfig::from_toml("[timezone]\nutc_offset_hours = 20\n");
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[budget]\ndefault_alert_percent = 90.0").unwrap();

        let config = AppConfig::load_from(file.path()).unwrap();
        assert_eq!(config.default_alert_percent, 90.0);
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let config = AppConfig::load_from(Path::new("/nonexistent/aom.toml")).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_offset() {
        let config = AppConfig::default();
        assert_eq!(config.offset().local_minus_utc(), 7 * 3600);
    }
}
