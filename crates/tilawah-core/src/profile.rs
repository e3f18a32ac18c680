//! User-owned records: profile preferences, reading position, progress
//! history and bookmarks.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Interface languages and the translation edition each one reads with.
pub const SUPPORTED_LANGUAGES: [(&str, &str); 4] = [
    ("en", "en.sahih"),
    ("ms", "ms.basmeih"),
    ("ur", "ur.jalandhry"),
    ("id", "id.indonesian"),
];

/// Translation edition for an interface language, if supported.
pub fn translation_for_language(code: &str) -> Option<&'static str> {
    SUPPORTED_LANGUAGES
        .iter()
        .find(|(lang, _)| *lang == code)
        .map(|(_, edition)| *edition)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

impl FromStr for Theme {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(ValidationError::InvalidValue {
                field: "theme".into(),
                message: format!("expected 'light' or 'dark', got '{other}'"),
            }),
        }
    }
}

/// Where the user last stopped reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadingPosition {
    pub surah_number: u32,
    pub ayat_number: u32,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: String,
    pub email: String,
    pub name: Option<String>,
    pub preferred_language: String,
    pub preferred_reciter: String,
    pub theme: Theme,
    pub reading_position: Option<ReadingPosition>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserProfile {
    /// Fresh profile with the app-wide defaults.
    pub fn new(
        user_id: impl Into<String>,
        email: impl Into<String>,
        name: Option<String>,
        defaults: &crate::storage::ProfileDefaults,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            email: email.into(),
            name: name.filter(|n| !n.is_empty()),
            preferred_language: defaults.preferred_language.clone(),
            preferred_reciter: defaults.preferred_reciter.clone(),
            theme: defaults.theme,
            reading_position: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a partial preferences update. Fields left `None` are kept.
    ///
    /// # Errors
    /// Rejects unsupported languages and empty names/reciters without
    /// changing the profile.
    pub fn apply(&mut self, update: &PreferencesUpdate, now: DateTime<Utc>) -> Result<(), ValidationError> {
        if let Some(lang) = &update.preferred_language {
            if translation_for_language(lang).is_none() {
                return Err(ValidationError::InvalidValue {
                    field: "preferred_language".into(),
                    message: format!("unsupported language '{lang}'"),
                });
            }
        }
        if let Some(reciter) = &update.preferred_reciter {
            if reciter.trim().is_empty() {
                return Err(ValidationError::InvalidValue {
                    field: "preferred_reciter".into(),
                    message: "must not be empty".into(),
                });
            }
        }

        if let Some(lang) = &update.preferred_language {
            self.preferred_language = lang.clone();
        }
        if let Some(reciter) = &update.preferred_reciter {
            self.preferred_reciter = reciter.clone();
        }
        if let Some(theme) = update.theme {
            self.theme = theme;
        }
        if let Some(name) = &update.name {
            self.name = Some(name.clone()).filter(|n| !n.is_empty());
        }
        self.updated_at = now;
        Ok(())
    }
}

/// Partial profile update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferencesUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub preferred_language: Option<String>,
    #[serde(default)]
    pub preferred_reciter: Option<String>,
    #[serde(default)]
    pub theme: Option<Theme>,
}

/// One recorded reading event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressEntry {
    /// Assigned by storage; 0 before insertion.
    pub id: i64,
    pub user_id: String,
    pub surah_number: u32,
    pub ayat_number: u32,
    pub time_spent_secs: u64,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bookmark {
    pub id: String,
    pub user_id: String,
    pub surah_number: u32,
    pub ayat_number: u32,
    pub note: String,
    pub created_at: DateTime<Utc>,
}

impl Bookmark {
    pub fn new(user_id: &str, surah_number: u32, ayat_number: u32, note: Option<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            surah_number,
            ayat_number,
            note: note.unwrap_or_default(),
            created_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::ProfileDefaults;

    fn profile() -> UserProfile {
        UserProfile::new("u1", "a@b.c", Some(String::new()), &ProfileDefaults::default(), Utc::now())
    }

    #[test]
    fn new_profile_uses_defaults() {
        let p = profile();
        assert_eq!(p.preferred_language, "en");
        assert_eq!(p.preferred_reciter, "ar.alafasy");
        assert_eq!(p.theme, Theme::Light);
        assert!(p.name.is_none());
        assert!(p.reading_position.is_none());
    }

    #[test]
    fn apply_updates_only_given_fields() {
        let mut p = profile();
        let update = PreferencesUpdate {
            theme: Some(Theme::Dark),
            preferred_language: Some("ms".into()),
            ..Default::default()
        };
        p.apply(&update, Utc::now()).unwrap();
        assert_eq!(p.theme, Theme::Dark);
        assert_eq!(p.preferred_language, "ms");
        assert_eq!(p.preferred_reciter, "ar.alafasy");
    }

    #[test]
    fn apply_rejects_unknown_language_without_changes() {
        let mut p = profile();
        let before = p.clone();
        let update = PreferencesUpdate {
            preferred_language: Some("fr".into()),
            theme: Some(Theme::Dark),
            ..Default::default()
        };
        assert!(p.apply(&update, Utc::now()).is_err());
        assert_eq!(p, before);
    }

    #[test]
    fn theme_parses() {
        assert_eq!("dark".parse::<Theme>().unwrap(), Theme::Dark);
        assert!("sepia".parse::<Theme>().is_err());
    }

    #[test]
    fn language_maps_to_translation() {
        assert_eq!(translation_for_language("ur"), Some("ur.jalandhry"));
        assert_eq!(translation_for_language("xx"), None);
    }
}
