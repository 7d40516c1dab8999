use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, RouteStampError};
use crate::query::{SortKey, SortOrder};
use crate::store::DEFAULT_AUDIT_CAPACITY;

/// Root application configuration, loaded from `~/.config/routestamp/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub core: CoreConfig,
    pub history: HistoryConfig,
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// Directory holding the persisted JSON documents.
    pub data_dir: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    pub audit_capacity: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub default_sort: SortKey,
    pub default_order: SortOrder,
    /// Locale used for currency detection; empty means "ask the environment".
    pub locale: String,
}

// ─── Defaults ──────────────────────────────────────────────

impl Default for CoreConfig {
    fn default() -> Self {
        let data_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("~/.local/share"))
            .join("routestamp");

        Self {
            data_dir: data_dir.to_string_lossy().to_string(),
        }
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            audit_capacity: DEFAULT_AUDIT_CAPACITY,
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            default_sort: SortKey::Name,
            default_order: SortOrder::Asc,
            locale: String::new(),
        }
    }
}

// ─── Load / Save ───────────────────────────────────────────

impl AppConfig {
    /// Standard config file path: `~/.config/routestamp/config.toml`
    pub fn config_path() -> PathBuf {
        if let Ok(path) = std::env::var("ROUTESTAMP_CONFIG") {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("routestamp")
            .join("config.toml")
    }

    /// Load config from disk, falling back to defaults if file doesn't exist.
    /// `ROUTESTAMP_DATA_DIR` overrides `core.data_dir`.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::config_path())?;
        if let Ok(dir) = std::env::var("ROUTESTAMP_DATA_DIR") {
            config.core.data_dir = dir;
        }
        Ok(config)
    }

    /// Load config from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Save config to the standard path.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    /// Save config to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let toml_str = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_str)?;
        Ok(())
    }

    /// Update one setting by its flat key, as used by `config get`/`config set`.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let invalid = |e: String| RouteStampError::ConfigError(format!("{key}: {e}"));
        match key {
            "data_dir" => self.core.data_dir = value.to_string(),
            "audit_capacity" => {
                let capacity: usize = value.parse().map_err(|e| invalid(format!("{e}")))?;
                if capacity == 0 {
                    return Err(invalid("must be at least 1".to_string()));
                }
                self.history.audit_capacity = capacity;
            }
            "default_sort" => self.ui.default_sort = value.parse().map_err(invalid)?,
            "default_order" => self.ui.default_order = value.parse().map_err(invalid)?,
            "locale" => self.ui.locale = value.to_string(),
            _ => {
                return Err(RouteStampError::ConfigError(format!(
                    "unknown config key: {key}"
                )));
            }
        }
        Ok(())
    }

    // ─── Derived values ────────────────────────────────────

    /// Directory backing the [`FileStore`](crate::FileStore).
    pub fn storage_dir(&self) -> PathBuf {
        PathBuf::from(&self.core.data_dir)
    }

    /// Configured locale, or the process locale when unset.
    pub fn locale(&self) -> String {
        if self.ui.locale.is_empty() {
            crate::prefs::system_locale()
        } else {
            self.ui.locale.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config_is_valid() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.history.audit_capacity, 50);
        assert_eq!(cfg.ui.default_sort, SortKey::Name);
        assert!(!cfg.core.data_dir.is_empty());
    }

    #[test]
    fn test_config_toml_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");

        let mut cfg = AppConfig::default();
        cfg.ui.default_sort = SortKey::Rating;
        cfg.ui.default_order = SortOrder::Desc;
        cfg.history.audit_capacity = 20;
        cfg.save_to(&path).unwrap();

        let loaded = AppConfig::load_from(&path).unwrap();
        assert_eq!(loaded.ui.default_sort, SortKey::Rating);
        assert_eq!(loaded.ui.default_order, SortOrder::Desc);
        assert_eq!(loaded.history.audit_capacity, 20);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[ui]\ndefault_sort = \"visit_date\"\n").unwrap();

        let loaded = AppConfig::load_from(&path).unwrap();
        assert_eq!(loaded.ui.default_sort, SortKey::VisitDate);
        assert_eq!(loaded.history.audit_capacity, 50);
    }

    #[test]
    fn test_load_nonexistent_returns_default() {
        let cfg =
            AppConfig::load_from(Path::new("/tmp/nonexistent_routestamp_config.toml")).unwrap();
        assert_eq!(cfg.ui.default_order, SortOrder::Asc);
    }

    #[test]
    fn test_set_by_key() {
        let mut cfg = AppConfig::default();
        cfg.set("default_order", "desc").unwrap();
        cfg.set("default_sort", "date_added").unwrap();
        cfg.set("audit_capacity", "10").unwrap();
        assert_eq!(cfg.ui.default_order, SortOrder::Desc);
        assert_eq!(cfg.ui.default_sort, SortKey::DateAdded);
        assert_eq!(cfg.history.audit_capacity, 10);

        assert!(cfg.set("audit_capacity", "0").is_err());
        assert!(cfg.set("default_order", "sideways").is_err());
        assert!(matches!(
            cfg.set("nope", "1"),
            Err(RouteStampError::ConfigError(_))
        ));
    }

    #[test]
    fn test_explicit_locale_wins() {
        let mut cfg = AppConfig::default();
        cfg.ui.locale = "en-GB".into();
        assert_eq!(cfg.locale(), "en-GB");
    }
}
