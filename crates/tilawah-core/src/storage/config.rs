//! TOML-based application configuration.
//!
//! Stores:
//! - Which editions the daily verse, verse explanations and search read from
//! - Defaults for newly created user profiles
//! - Reading history page size
//!
//! Configuration is stored at `~/.config/tilawah/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::catalog;
use crate::error::ConfigError;
use crate::profile::{translation_for_language, Theme};

/// Editions used when fetching verse text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditionsConfig {
    #[serde(default = "default_arabic_edition")]
    pub arabic: String,
    #[serde(default = "default_translation_edition")]
    pub translation: String,
    /// Edition searched when the caller names none.
    #[serde(default = "default_search_edition")]
    pub search: String,
}

/// Preferences given to a profile on first access.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileDefaults {
    #[serde(default = "default_language")]
    pub preferred_language: String,
    #[serde(default = "default_reciter")]
    pub preferred_reciter: String,
    #[serde(default)]
    pub theme: Theme,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressConfig {
    /// How many recent reading events `progress` returns.
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/tilawah/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub editions: EditionsConfig,
    #[serde(default)]
    pub profile: ProfileDefaults,
    #[serde(default)]
    pub progress: ProgressConfig,
}

fn default_arabic_edition() -> String {
    "quran-uthmani".into()
}
fn default_translation_edition() -> String {
    "en.sahih".into()
}
fn default_search_edition() -> String {
    "quran-simple".into()
}
fn default_language() -> String {
    "en".into()
}
fn default_reciter() -> String {
    "ar.alafasy".into()
}
fn default_history_limit() -> usize {
    30
}

impl Default for EditionsConfig {
    fn default() -> Self {
        Self {
            arabic: default_arabic_edition(),
            translation: default_translation_edition(),
            search: default_search_edition(),
        }
    }
}

impl Default for ProfileDefaults {
    fn default() -> Self {
        Self {
            preferred_language: default_language(),
            preferred_reciter: default_reciter(),
            theme: Theme::Light,
        }
    }
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            history_limit: default_history_limit(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().is_none() || key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_none() {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => serde_json::Value::Number(
                        value
                            .parse::<u64>()
                            .map_err(|_| invalid(format!("cannot parse '{value}' as number")))?
                            .into(),
                    ),
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the default location, writing defaults on first use.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from `path`, writing defaults there if the file is missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or fails
    /// validation.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?;
                cfg.validate()?;
                Ok(cfg)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Persist to the default location.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Check that configured editions exist and the history limit is usable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for the first bad field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (key, id) in [
            ("editions.arabic", &self.editions.arabic),
            ("editions.translation", &self.editions.translation),
            ("editions.search", &self.editions.search),
        ] {
            match catalog::find_edition(id) {
                Some(e) if e.kind == catalog::EditionKind::Text => {}
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key: key.into(),
                        message: format!("'{id}' is not a known text edition"),
                    })
                }
            }
        }
        if translation_for_language(&self.profile.preferred_language).is_none() {
            return Err(ConfigError::InvalidValue {
                key: "profile.preferred_language".into(),
                message: format!(
                    "'{}' is not a supported language",
                    self.profile.preferred_language
                ),
            });
        }
        if self.progress.history_limit == 0 {
            return Err(ConfigError::InvalidValue {
                key: "progress.history_limit".into(),
                message: "must be at least 1".into(),
            });
        }
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key without saving.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the resulting config is
    /// invalid; `self` is left unchanged in that case.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::InvalidValue {
            key: key.into(),
            message: e.to_string(),
        })?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.into(),
            message: e.to_string(),
        })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }
}
