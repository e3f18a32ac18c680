//! # Tilawah Core Library
//!
//! Core logic for a Quran reading companion backend. Reading streaks, the
//! verse of the day and chat-history bounds are pure functions; everything
//! that talks to the outside world (content API, AI endpoint, storage) sits
//! behind traits that the [`Gateway`] is generic over.
//!
//! ## Architecture
//!
//! - **Streak Engine** ([`streak`]): date-delta counter with
//!   hold/increment/reset semantics
//! - **Daily Verse Selector** ([`daily_verse`]): date-seeded PCG pick, stable
//!   for every caller on the same day
//! - **Conversation Log** ([`conversation`]): capped history and AI context
//!   window
//! - **Gateway** ([`gateway`]): app operations wired to the collaborators
//! - **Storage**: SQLite persistence and TOML-based configuration
//!
//! ## Key Components
//!
//! - [`record_reading`]: streak update for one reading event
//! - [`select_daily_verse`]: verse of the day
//! - [`append_turn`] / [`context_window`]: chat history policy
//! - [`Database`]: [`PersistenceProvider`] backed by SQLite
//! - [`Config`]: application configuration

pub mod catalog;
pub mod collaborators;
pub mod conversation;
pub mod daily_verse;
pub mod error;
pub mod gateway;
pub mod profile;
pub mod prompt;
pub mod storage;
pub mod streak;

pub use catalog::{BuiltinChapters, ChapterInfo, Edition, VerseRef};
pub use collaborators::{
    AyahText, CompletionProvider, ContentProvider, JuzText, NoCompletion, PersistenceProvider,
    SearchResults, SurahText, VerseText,
};
pub use conversation::{append_turn, context_window, ChatMessage, ChatRole, ConversationLog};
pub use daily_verse::{select_daily_verse, DailyVerseSelection};
pub use error::{
    CollaboratorError, ConfigError, CoreError, DatabaseError, SelectionError, StreakError,
    ValidationError,
};
pub use gateway::{
    BookmarkOutcome, DailyVerse, Gateway, ProfileSummary, ProgressReport, ReadingEvent,
    VerseExplanation,
};
pub use profile::{Bookmark, PreferencesUpdate, ProgressEntry, Theme, UserProfile};
pub use prompt::ChatContext;
pub use storage::{Config, Database};
pub use streak::{record_reading, StreakState};
