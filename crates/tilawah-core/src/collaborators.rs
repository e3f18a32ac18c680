//! Interfaces to the external systems the core depends on.
//!
//! Implementations are injected into [`crate::gateway::Gateway`]; the pure
//! engines never call them. Every trait is synchronous and stateless
//! between calls. Timeouts and retries belong to the implementation.

use serde::{Deserialize, Serialize};

use crate::catalog::ChapterInfo;
use crate::conversation::{ChatMessage, ConversationLog};
use crate::error::{CollaboratorError, Result};
use crate::profile::{Bookmark, ProgressEntry, UserProfile};
use crate::streak::StreakState;

/// Verse text as returned by a content provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerseText {
    pub text: String,
    pub chapter_name: String,
}

/// One verse inside a surah, juz or search result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AyahText {
    pub surah_number: u32,
    pub number_in_surah: u32,
    pub text: String,
}

/// A whole surah in one edition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurahText {
    pub number: u32,
    pub name: String,
    pub edition: String,
    pub ayahs: Vec<AyahText>,
}

/// A whole juz in one edition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JuzText {
    pub number: u32,
    pub edition: String,
    pub ayahs: Vec<AyahText>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResults {
    pub count: usize,
    pub matches: Vec<AyahText>,
}

/// Source of corpus structure and verse text (e.g. a REST content API).
pub trait ContentProvider: Send + Sync {
    /// All chapters in canonical order.
    fn chapter_list(&self) -> Result<Vec<ChapterInfo>, CollaboratorError>;

    /// Text of one verse in the given edition.
    fn verse(
        &self,
        chapter_index: u32,
        verse: u32,
        edition: &str,
    ) -> Result<VerseText, CollaboratorError>;

    /// Every verse of one surah in the given edition.
    fn surah(&self, chapter_index: u32, edition: &str) -> Result<SurahText, CollaboratorError>;

    /// One surah in several editions, in the order requested.
    ///
    /// The default fetches each edition separately; providers with a
    /// batch endpoint should override it.
    fn surah_editions(
        &self,
        chapter_index: u32,
        editions: &[&str],
    ) -> Result<Vec<SurahText>, CollaboratorError> {
        editions
            .iter()
            .map(|edition| self.surah(chapter_index, edition))
            .collect()
    }

    /// Every verse of one juz in the given edition.
    fn juz(&self, juz: u32, edition: &str) -> Result<JuzText, CollaboratorError>;

    /// Full-text search across the whole corpus.
    fn search(&self, query: &str, edition: &str) -> Result<SearchResults, CollaboratorError>;
}

/// Conversational AI completion endpoint.
pub trait CompletionProvider: Send + Sync {
    /// Produce the assistant reply for `user_message` given prior `history`.
    fn complete(
        &self,
        system_prompt: &str,
        history: &[ChatMessage],
        user_message: &str,
    ) -> Result<String, CollaboratorError>;
}

/// Per-user document storage.
///
/// Plain get/put semantics with no transactions: concurrent
/// read-modify-write cycles for one user are last-write-wins.
pub trait PersistenceProvider: Send {
    /// Streak counters; the default state if the user has none yet.
    fn load_streak(&self, user_id: &str) -> Result<StreakState>;
    fn save_streak(&self, user_id: &str, state: &StreakState) -> Result<()>;

    /// Stored chat history; empty if the user has none yet.
    fn load_log(&self, user_id: &str) -> Result<ConversationLog>;
    fn save_log(&self, user_id: &str, log: &ConversationLog) -> Result<()>;

    fn load_profile(&self, user_id: &str) -> Result<Option<UserProfile>>;
    fn save_profile(&self, profile: &UserProfile) -> Result<()>;

    /// Ordered by surah, then ayat.
    fn list_bookmarks(&self, user_id: &str) -> Result<Vec<Bookmark>>;
    fn find_bookmark(&self, user_id: &str, surah: u32, ayat: u32) -> Result<Option<Bookmark>>;
    fn insert_bookmark(&self, bookmark: &Bookmark) -> Result<()>;
    /// Returns `false` if no bookmark with that id belongs to the user.
    fn delete_bookmark(&self, user_id: &str, bookmark_id: &str) -> Result<bool>;

    fn append_progress(&self, entry: &ProgressEntry) -> Result<i64>;
    /// Most recent entries first.
    fn recent_progress(&self, user_id: &str, limit: usize) -> Result<Vec<ProgressEntry>>;
}

/// Completion provider for deployments without an AI endpoint.
///
/// Every call fails, so AI-backed operations report a collaborator error
/// while the rest of the gateway keeps working.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCompletion;

impl CompletionProvider for NoCompletion {
    fn complete(
        &self,
        _system_prompt: &str,
        _history: &[ChatMessage],
        _user_message: &str,
    ) -> Result<String, CollaboratorError> {
        Err(CollaboratorError::new("completion", "no completion provider configured"))
    }
}
