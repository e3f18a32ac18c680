//! Typed service layer over the engines and collaborators.
//!
//! Each method is one app operation: load what it needs from the
//! persistence provider, run the pure engines, call content/AI providers,
//! and write back. Nothing is retried here. Engine rejections happen before
//! any write, and a failed completion leaves the chat history untouched.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::catalog::{self, ChapterInfo};
use crate::collaborators::{
    CompletionProvider, ContentProvider, JuzText, PersistenceProvider, SearchResults, SurahText,
    VerseText,
};
use crate::conversation::{append_turn, context_window};
use crate::daily_verse::select_daily_verse;
use crate::error::{CollaboratorError, Result, ValidationError};
use crate::profile::{
    translation_for_language, Bookmark, PreferencesUpdate, ProgressEntry, ReadingPosition,
    UserProfile,
};
use crate::prompt::{self, ChatContext};
use crate::storage::Config;
use crate::streak::{self, StreakState};

/// Shortest accepted search query, in characters.
pub const MIN_SEARCH_LEN: usize = 2;

/// A profile together with its streak counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileSummary {
    #[serde(flatten)]
    pub profile: UserProfile,
    pub streak: StreakState,
}

/// One reading event reported by the app.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadingEvent {
    pub surah_number: u32,
    pub ayat_number: u32,
    #[serde(default)]
    pub time_spent_secs: u64,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressReport {
    pub current_position: Option<ReadingPosition>,
    pub streak: StreakState,
    /// Streak as it should be shown today (0 once broken).
    pub displayed_streak: u32,
    pub history: Vec<ProgressEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyVerse {
    pub date: NaiveDate,
    pub surah_number: u32,
    pub surah_name: String,
    pub ayah_number: u32,
    /// `None` when the provider's chapter table disagrees with the built-in
    /// juz boundaries for this verse.
    pub juz: Option<u32>,
    pub text: String,
    pub translation: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerseExplanation {
    pub surah_number: u32,
    pub ayah_number: u32,
    pub surah_name: String,
    pub explanation: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "bookmark", rename_all = "snake_case")]
pub enum BookmarkOutcome {
    Created(Bookmark),
    AlreadyExists(Bookmark),
}

pub struct Gateway<C, A, P> {
    content: C,
    ai: A,
    store: P,
    config: Config,
}

impl<C, A, P> Gateway<C, A, P>
where
    C: ContentProvider,
    A: CompletionProvider,
    P: PersistenceProvider,
{
    pub fn new(content: C, ai: A, store: P, config: Config) -> Self {
        Self {
            content,
            ai,
            store,
            config,
        }
    }

    pub fn store(&self) -> &P {
        &self.store
    }

    pub fn ai(&self) -> &A {
        &self.ai
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn load_or_create_profile(
        &self,
        user_id: &str,
        email: &str,
        name: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<UserProfile> {
        if let Some(profile) = self.store.load_profile(user_id)? {
            return Ok(profile);
        }
        let profile = UserProfile::new(user_id, email, name, &self.config.profile, now);
        self.store.save_profile(&profile)?;
        info!(user_id, "created profile");
        Ok(profile)
    }

    /// Load the user's profile, creating it with defaults on first access.
    pub fn profile(
        &self,
        user_id: &str,
        email: &str,
        name: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<ProfileSummary> {
        let profile = self.load_or_create_profile(user_id, email, name, now)?;
        let streak = self.store.load_streak(user_id)?;
        Ok(ProfileSummary { profile, streak })
    }

    pub fn update_preferences(
        &self,
        user_id: &str,
        update: &PreferencesUpdate,
        now: DateTime<Utc>,
    ) -> Result<UserProfile> {
        let mut profile = self.load_or_create_profile(user_id, "", None, now)?;
        profile.apply(update, now)?;
        self.store.save_profile(&profile)?;
        Ok(profile)
    }

    /// Record a reading event: advance the streak, move the last-read
    /// position and append to the reading history, in that order.
    ///
    /// # Errors
    /// Invalid references and non-monotonic dates are rejected before
    /// anything is written. A storage failure after the streak is saved
    /// leaves the position and history behind it.
    pub fn record_reading(&self, user_id: &str, event: ReadingEvent) -> Result<StreakState> {
        catalog::validate_reference(event.surah_number, event.ayat_number)?;

        let today = event.at.date_naive();
        let previous = self.store.load_streak(user_id)?;
        let next = streak::record_reading(&previous, today).inspect_err(|e| {
            warn!(user_id, error = %e, "rejected reading event");
        })?;

        // saved first so a same-day retry holds rather than double-counts
        self.store.save_streak(user_id, &next)?;

        let mut profile = self.load_or_create_profile(user_id, "", None, event.at)?;
        profile.reading_position = Some(ReadingPosition {
            surah_number: event.surah_number,
            ayat_number: event.ayat_number,
            updated_at: event.at,
        });
        profile.updated_at = event.at;
        self.store.save_profile(&profile)?;

        self.store.append_progress(&ProgressEntry {
            id: 0,
            user_id: user_id.to_string(),
            surah_number: event.surah_number,
            ayat_number: event.ayat_number,
            time_spent_secs: event.time_spent_secs,
            recorded_at: event.at,
        })?;

        info!(
            user_id,
            current = next.current_streak,
            longest = next.longest_streak,
            "recorded reading"
        );
        Ok(next)
    }

    pub fn progress(&self, user_id: &str, today: NaiveDate) -> Result<ProgressReport> {
        let current_position = self
            .store
            .load_profile(user_id)?
            .and_then(|p| p.reading_position);
        let streak = self.store.load_streak(user_id)?;
        let history = self
            .store
            .recent_progress(user_id, self.config.progress.history_limit)?;

        Ok(ProgressReport {
            current_position,
            displayed_streak: streak.displayed(today),
            streak,
            history,
        })
    }

    fn chapter_list(&self) -> Result<Vec<ChapterInfo>> {
        Ok(self.content.chapter_list().inspect_err(log_collaborator_failure)?)
    }

    /// The verse of the day with its Arabic text and translation.
    pub fn daily_verse(&self, today: NaiveDate) -> Result<DailyVerse> {
        let chapters = self.chapter_list()?;
        let pick = select_daily_verse(today, &chapters)?;
        debug!(%today, chapter = pick.chapter_index, verse = pick.verse_index, "daily verse selected");

        let arabic = self
            .content
            .verse(pick.chapter_index, pick.verse_index, &self.config.editions.arabic)
            .inspect_err(log_collaborator_failure)?;
        let translation = self
            .content
            .verse(pick.chapter_index, pick.verse_index, &self.config.editions.translation)
            .inspect_err(log_collaborator_failure)?;

        let surah_name = if arabic.chapter_name.is_empty() {
            chapters
                .iter()
                .find(|c| c.index == pick.chapter_index)
                .map(|c| c.name.clone())
                .unwrap_or_default()
        } else {
            arabic.chapter_name
        };

        Ok(DailyVerse {
            date: today,
            surah_number: pick.chapter_index,
            surah_name,
            ayah_number: pick.verse_index,
            juz: catalog::juz_for(pick.chapter_index, pick.verse_index).ok(),
            text: arabic.text,
            translation: translation.text,
        })
    }

    /// A whole surah, in `edition` or the configured Arabic edition.
    pub fn surah(&self, surah: u32, edition: Option<&str>) -> Result<SurahText> {
        catalog::chapter(surah).ok_or(ValidationError::UnknownSurah(surah))?;
        let edition = edition.unwrap_or(self.config.editions.arabic.as_str());
        Ok(self
            .content
            .surah(surah, edition)
            .inspect_err(log_collaborator_failure)?)
    }

    /// A surah in the configured Arabic edition followed by one
    /// translation per language code. Unsupported codes fall back to the
    /// configured translation; repeated editions are fetched once.
    pub fn surah_translations(&self, surah: u32, languages: &[&str]) -> Result<Vec<SurahText>> {
        catalog::chapter(surah).ok_or(ValidationError::UnknownSurah(surah))?;

        let mut editions: Vec<&str> = vec![self.config.editions.arabic.as_str()];
        for lang in languages {
            let edition = translation_for_language(lang.trim())
                .unwrap_or(self.config.editions.translation.as_str());
            if !editions.contains(&edition) {
                editions.push(edition);
            }
        }
        debug!(surah, ?editions, "fetching surah editions");

        Ok(self
            .content
            .surah_editions(surah, &editions)
            .inspect_err(log_collaborator_failure)?)
    }

    /// One verse, in `edition` or the configured Arabic edition.
    pub fn ayah(&self, surah: u32, ayat: u32, edition: Option<&str>) -> Result<VerseText> {
        let reference = catalog::validate_reference(surah, ayat)?;
        let edition = edition.unwrap_or(self.config.editions.arabic.as_str());
        Ok(self
            .content
            .verse(reference.chapter, reference.verse, edition)
            .inspect_err(log_collaborator_failure)?)
    }

    pub fn juz(&self, juz: u32, edition: Option<&str>) -> Result<JuzText> {
        catalog::juz_start(juz)?;
        let edition = edition.unwrap_or(self.config.editions.arabic.as_str());
        Ok(self
            .content
            .juz(juz, edition)
            .inspect_err(log_collaborator_failure)?)
    }

    /// Full-text search, in `edition` or the configured search edition.
    ///
    /// # Errors
    /// Queries shorter than [`MIN_SEARCH_LEN`] characters after trimming
    /// are rejected without calling the provider.
    pub fn search(&self, query: &str, edition: Option<&str>) -> Result<SearchResults> {
        let query = query.trim();
        if query.chars().count() < MIN_SEARCH_LEN {
            return Err(ValidationError::InvalidValue {
                field: "query".into(),
                message: format!("must be at least {MIN_SEARCH_LEN} characters"),
            }
            .into());
        }
        let edition = edition.unwrap_or(self.config.editions.search.as_str());
        Ok(self
            .content
            .search(query, edition)
            .inspect_err(log_collaborator_failure)?)
    }

    /// One chat turn with the AI teacher.
    ///
    /// The AI sees the last [`crate::conversation::CONTEXT_WINDOW`] stored
    /// messages. The turn is stored only if the completion succeeds.
    pub fn chat(&self, user_id: &str, message: &str, context: Option<&ChatContext>) -> Result<String> {
        let message = message.trim();
        if message.is_empty() {
            return Err(ValidationError::InvalidValue {
                field: "message".into(),
                message: "must not be empty".into(),
            }
            .into());
        }

        let log = self.store.load_log(user_id)?;
        let system_prompt = prompt::chat_system_prompt(context);
        let reply = self
            .ai
            .complete(&system_prompt, context_window(&log), message)
            .inspect_err(log_collaborator_failure)?;

        let log = append_turn(log, message, reply.as_str());
        self.store.save_log(user_id, &log)?;
        debug!(user_id, stored = log.len(), "chat turn stored");
        Ok(reply)
    }

    /// Ask the AI to explain one verse, using the configured editions.
    pub fn explain_verse(&self, surah: u32, ayat: u32) -> Result<VerseExplanation> {
        let reference = catalog::validate_reference(surah, ayat)?;

        let arabic = self
            .content
            .verse(reference.chapter, reference.verse, &self.config.editions.arabic)
            .inspect_err(log_collaborator_failure)?;
        let translation = self
            .content
            .verse(reference.chapter, reference.verse, &self.config.editions.translation)
            .inspect_err(log_collaborator_failure)?;

        let user_prompt = prompt::explain_verse_prompt(
            surah,
            ayat,
            &arabic.chapter_name,
            &arabic.text,
            &translation.text,
        );
        let explanation = self
            .ai
            .complete(prompt::SYSTEM_PROMPT, &[], &user_prompt)
            .inspect_err(log_collaborator_failure)?;

        Ok(VerseExplanation {
            surah_number: surah,
            ayah_number: ayat,
            surah_name: arabic.chapter_name,
            explanation,
        })
    }

    /// In-app help for the screen the user is on.
    pub fn context_help(&self, screen: &str, query: Option<&str>) -> Result<String> {
        let user_prompt = prompt::contextual_help_prompt(screen, query);
        Ok(self
            .ai
            .complete(&prompt::help_system_prompt(), &[], &user_prompt)
            .inspect_err(log_collaborator_failure)?)
    }

    pub fn bookmarks(&self, user_id: &str) -> Result<Vec<Bookmark>> {
        self.store.list_bookmarks(user_id)
    }

    /// Bookmark a verse. Bookmarking the same verse twice returns the
    /// existing bookmark instead of creating a second one.
    pub fn add_bookmark(
        &self,
        user_id: &str,
        surah: u32,
        ayat: u32,
        note: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<BookmarkOutcome> {
        catalog::validate_reference(surah, ayat)?;

        if let Some(existing) = self.store.find_bookmark(user_id, surah, ayat)? {
            return Ok(BookmarkOutcome::AlreadyExists(existing));
        }
        let bookmark = Bookmark::new(user_id, surah, ayat, note, now);
        self.store.insert_bookmark(&bookmark)?;
        info!(user_id, surah, ayat, "bookmark created");
        Ok(BookmarkOutcome::Created(bookmark))
    }

    pub fn remove_bookmark(&self, user_id: &str, bookmark_id: &str) -> Result<()> {
        if !self.store.delete_bookmark(user_id, bookmark_id)? {
            return Err(ValidationError::UnknownBookmark(bookmark_id.to_string()).into());
        }
        Ok(())
    }
}

fn log_collaborator_failure(err: &CollaboratorError) {
    warn!(service = %err.service, message = %err.message, "collaborator call failed");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::BuiltinChapters;
    use crate::collaborators::NoCompletion;
    use crate::error::CoreError;
    use crate::storage::Database;

    fn gateway() -> Gateway<BuiltinChapters, NoCompletion, Database> {
        Gateway::new(
            BuiltinChapters,
            NoCompletion,
            Database::open_memory().unwrap(),
            Config::default(),
        )
    }

    fn at(raw: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(raw).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn invalid_reference_rejected_before_write() {
        let gw = gateway();
        let event = ReadingEvent {
            surah_number: 1,
            ayat_number: 8,
            time_spent_secs: 0,
            at: at("2024-01-01T10:00:00Z"),
        };
        assert!(matches!(
            gw.record_reading("u1", event),
            Err(CoreError::Validation(ValidationError::AyatOutOfRange { .. }))
        ));
        assert!(gw.store().load_profile("u1").unwrap().is_none());
    }

    #[test]
    fn time_of_day_is_ignored() {
        let gw = gateway();
        let mut event = ReadingEvent {
            surah_number: 1,
            ayat_number: 1,
            time_spent_secs: 30,
            at: at("2024-01-01T00:00:01Z"),
        };
        gw.record_reading("u1", event).unwrap();
        event.at = at("2024-01-01T23:59:59Z");
        let s = gw.record_reading("u1", event).unwrap();
        assert_eq!(s.current_streak, 1);
    }

    #[test]
    fn offline_daily_verse_reports_missing_text() {
        let gw = gateway();
        let today = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert!(matches!(gw.daily_verse(today), Err(CoreError::Collaborator(_))));
    }

    #[test]
    fn remove_unknown_bookmark_fails() {
        let gw = gateway();
        assert!(matches!(
            gw.remove_bookmark("u1", "nope"),
            Err(CoreError::Validation(ValidationError::UnknownBookmark(_)))
        ));
    }

    #[test]
    fn empty_chat_message_rejected() {
        let gw = gateway();
        assert!(matches!(
            gw.chat("u1", "   ", None),
            Err(CoreError::Validation(_))
        ));
    }

    #[test]
    fn content_lookups_check_ranges_before_the_provider() {
        let gw = gateway();
        for surah in [0, 115] {
            assert!(matches!(
                gw.surah(surah, None),
                Err(CoreError::Validation(ValidationError::UnknownSurah(n))) if n == surah
            ));
            assert!(matches!(
                gw.surah_translations(surah, &["en"]),
                Err(CoreError::Validation(ValidationError::UnknownSurah(_)))
            ));
        }
        for juz in [0, 31] {
            assert!(matches!(
                gw.juz(juz, None),
                Err(CoreError::Validation(ValidationError::UnknownJuz(_)))
            ));
        }
        assert!(matches!(gw.ayah(114, 7, None), Err(CoreError::Validation(_))));

        // in range, so the offline provider is reached and reports no text
        assert!(matches!(gw.surah(114, None), Err(CoreError::Collaborator(_))));
        assert!(matches!(gw.juz(30, None), Err(CoreError::Collaborator(_))));
    }

    #[test]
    fn short_search_query_rejected() {
        let gw = gateway();
        for query in ["", "a", "  a  ", "\u{0627}"] {
            assert!(matches!(
                gw.search(query, None),
                Err(CoreError::Validation(ValidationError::InvalidValue { .. }))
            ));
        }
        assert!(matches!(gw.search("ab", None), Err(CoreError::Collaborator(_))));
    }
}
