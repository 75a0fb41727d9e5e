use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{BugetError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub data_dir: String,
    /// User that imports are filed under when `--user` is not given.
    #[serde(default)]
    pub user_name: String,
    /// Default tracing filter, overridden by `RUST_LOG`.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir().to_string_lossy().to_string(),
            user_name: String::new(),
            log_level: default_log_level(),
        }
    }
}

impl Settings {
    pub fn db_path(&self) -> PathBuf {
        PathBuf::from(&self.data_dir).join("buget.db")
    }

    /// `explicit` if given, else the configured default user.
    pub fn resolve_user(&self, explicit: Option<&str>) -> Result<String> {
        match explicit {
            Some(name) if !name.trim().is_empty() => Ok(name.to_string()),
            _ if !self.user_name.trim().is_empty() => Ok(self.user_name.clone()),
            _ => Err(BugetError::Settings(
                "No user given. Pass --user or run `buget init --user <name>`.".to_string(),
            )),
        }
    }
}

fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("buget")
}

fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Documents")
        .join("buget")
}

pub fn load_settings() -> Settings {
    load_settings_from(&settings_path())
}

/// Settings stored at `path`, or defaults when the file is missing or unreadable.
pub fn load_settings_from(path: &Path) -> Settings {
    if path.exists() {
        let content = std::fs::read_to_string(path).unwrap_or_default();
        serde_json::from_str(&content).unwrap_or_default()
    } else {
        Settings::default()
    }
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    save_settings_to(settings, &settings_path())
}

pub fn save_settings_to(settings: &Settings, path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| BugetError::Settings(e.to_string()))?;
    std::fs::write(path, format!("{json}\n"))?;
    Ok(())
}

pub fn shellexpand_path(path: &str) -> String {
    if path.starts_with('~') {
        if let Some(home) = dirs::home_dir() {
            return path.replacen('~', &home.to_string_lossy(), 1);
        }
    }
    std::fs::canonicalize(path)
        .unwrap_or_else(|_| PathBuf::from(path))
        .to_string_lossy()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config").join("settings.json");
        let settings = Settings {
            data_dir: "/tmp/test".to_string(),
            user_name: "ana".to_string(),
            log_level: "debug".to_string(),
        };
        save_settings_to(&settings, &path).unwrap();
        assert!(path.exists());

        let loaded = load_settings_from(&path);
        assert_eq!(loaded.user_name, "ana");
        assert_eq!(loaded.data_dir, "/tmp/test");
        assert_eq!(loaded.log_level, "debug");
    }

    #[test]
    fn test_load_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let missing = load_settings_from(&dir.path().join("settings.json"));
        assert_eq!(missing.log_level, "warn");
        assert!(missing.user_name.is_empty());

        let broken = dir.path().join("broken.json");
        std::fs::write(&broken, "{ not json").unwrap();
        assert_eq!(load_settings_from(&broken).log_level, "warn");
    }

    #[test]
    fn test_missing_keys_use_defaults() {
        let s: Settings = serde_json::from_str(r#"{"data_dir": "/tmp/test"}"#).unwrap();
        assert!(s.user_name.is_empty());
        assert_eq!(s.log_level, "warn");
    }

    #[test]
    fn test_db_path() {
        let s = Settings {
            data_dir: "/tmp/b".to_string(),
            ..Settings::default()
        };
        assert_eq!(s.db_path(), PathBuf::from("/tmp/b/buget.db"));
    }

    #[test]
    fn test_resolve_user() {
        let mut s = Settings::default();
        assert!(s.resolve_user(None).is_err());
        assert_eq!(s.resolve_user(Some("ana")).unwrap(), "ana");
        s.user_name = "bob".to_string();
        assert_eq!(s.resolve_user(None).unwrap(), "bob");
        assert_eq!(s.resolve_user(Some("ana")).unwrap(), "ana");
    }
}
