//! SQLite-based persistence for per-user state.
//!
//! Provides persistent storage for:
//! - User profiles and last-read position
//! - Reading streak counters
//! - Chat history (JSON message array, capped on write)
//! - Bookmarks and reading history
//!
//! Writes are plain upserts: concurrent read-modify-write cycles for the
//! same user are last-write-wins.

use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{data_dir, migrations};
use crate::collaborators::PersistenceProvider;
use crate::conversation::{ChatMessage, ConversationLog};
use crate::error::{DatabaseError, Result};
use crate::profile::{Bookmark, ProgressEntry, ReadingPosition, Theme, UserProfile};
use crate::streak::StreakState;

/// SQLite database for per-user state.
pub struct Database {
    conn: Connection,
}

fn corrupt(table: &str, message: impl std::fmt::Display) -> DatabaseError {
    DatabaseError::CorruptRow {
        table: table.to_string(),
        message: message.to_string(),
    }
}

fn parse_timestamp(table: &str, raw: &str) -> Result<DateTime<Utc>, DatabaseError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| corrupt(table, format!("bad timestamp '{raw}': {e}")))
}

impl Database {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open the database at `~/.config/tilawah/tilawah.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        let path = data_dir()?.join("tilawah.db");
        Self::open_at(&path)
    }

    /// Open (or create) a database file at `path`.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_connection(conn)
    }

    /// Open an in-memory database (for tests and dry runs).
    ///
    /// # Errors
    /// Returns an error if the schema cannot be created.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(DatabaseError::from)?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        migrations::migrate(&conn).map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        Ok(Self { conn })
    }

    fn profile_from_row(row: &Row<'_>) -> rusqlite::Result<ProfileRow> {
        Ok(ProfileRow {
            user_id: row.get(0)?,
            email: row.get(1)?,
            name: row.get(2)?,
            preferred_language: row.get(3)?,
            preferred_reciter: row.get(4)?,
            theme: row.get(5)?,
            last_surah: row.get(6)?,
            last_ayat: row.get(7)?,
            position_updated_at: row.get(8)?,
            created_at: row.get(9)?,
            updated_at: row.get(10)?,
        })
    }

    fn bookmark_from_row(row: &Row<'_>) -> rusqlite::Result<(String, String, u32, u32, String, String)> {
        Ok((
            row.get(0)?,
            row.get(1)?,
            row.get(2)?,
            row.get(3)?,
            row.get(4)?,
            row.get(5)?,
        ))
    }

    fn decode_bookmark(raw: (String, String, u32, u32, String, String)) -> Result<Bookmark> {
        let (id, user_id, surah_number, ayat_number, note, created_at) = raw;
        Ok(Bookmark {
            id,
            user_id,
            surah_number,
            ayat_number,
            note,
            created_at: parse_timestamp("bookmarks", &created_at)?,
        })
    }

    /// Remove all stored chat history for a user.
    pub fn clear_log(&self, user_id: &str) -> Result<bool> {
        let removed = self
            .conn
            .execute("DELETE FROM conversations WHERE user_id = ?1", params![user_id])?;
        Ok(removed > 0)
    }
}

/// Raw `profiles` row before timestamp/enum decoding.
struct ProfileRow {
    user_id: String,
    email: String,
    name: Option<String>,
    preferred_language: String,
    preferred_reciter: String,
    theme: String,
    last_surah: Option<u32>,
    last_ayat: Option<u32>,
    position_updated_at: Option<String>,
    created_at: String,
    updated_at: String,
}

impl ProfileRow {
    fn decode(self) -> Result<UserProfile> {
        let theme: Theme = self.theme.parse().map_err(|e| corrupt("profiles", e))?;
        let reading_position = match (self.last_surah, self.last_ayat, self.position_updated_at) {
            (Some(surah_number), Some(ayat_number), Some(at)) => Some(ReadingPosition {
                surah_number,
                ayat_number,
                updated_at: parse_timestamp("profiles", &at)?,
            }),
            _ => None,
        };
        Ok(UserProfile {
            user_id: self.user_id,
            email: self.email,
            name: self.name,
            preferred_language: self.preferred_language,
            preferred_reciter: self.preferred_reciter,
            theme,
            reading_position,
            created_at: parse_timestamp("profiles", &self.created_at)?,
            updated_at: parse_timestamp("profiles", &self.updated_at)?,
        })
    }
}

impl PersistenceProvider for Database {
    fn load_streak(&self, user_id: &str) -> Result<StreakState> {
        let row = self
            .conn
            .query_row(
                "SELECT current_streak, longest_streak, last_read_date FROM streaks WHERE user_id = ?1",
                params![user_id],
                |row| {
                    Ok((
                        row.get::<_, u32>(0)?,
                        row.get::<_, u32>(1)?,
                        row.get::<_, Option<String>>(2)?,
                    ))
                },
            )
            .optional()?;

        let Some((current_streak, longest_streak, last_read)) = row else {
            return Ok(StreakState::default());
        };
        let last_read_date = last_read
            .map(|raw| {
                NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
                    .map_err(|e| corrupt("streaks", format!("bad date '{raw}': {e}")))
            })
            .transpose()?;

        Ok(StreakState {
            current_streak,
            longest_streak,
            last_read_date,
        })
    }

    fn save_streak(&self, user_id: &str, state: &StreakState) -> Result<()> {
        self.conn.execute(
            "INSERT INTO streaks (user_id, current_streak, longest_streak, last_read_date)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(user_id) DO UPDATE SET
                current_streak = excluded.current_streak,
                longest_streak = excluded.longest_streak,
                last_read_date = excluded.last_read_date",
            params![
                user_id,
                state.current_streak,
                state.longest_streak,
                state.last_read_date.map(|d| d.format("%Y-%m-%d").to_string()),
            ],
        )?;
        Ok(())
    }

    fn load_log(&self, user_id: &str) -> Result<ConversationLog> {
        let raw: Option<String> = self
            .conn
            .query_row(
                "SELECT messages FROM conversations WHERE user_id = ?1",
                params![user_id],
                |row| row.get(0),
            )
            .optional()?;

        match raw {
            Some(json) => {
                let messages: Vec<ChatMessage> =
                    serde_json::from_str(&json).map_err(|e| corrupt("conversations", e))?;
                Ok(ConversationLog::from_messages(messages))
            }
            None => Ok(ConversationLog::new()),
        }
    }

    fn save_log(&self, user_id: &str, log: &ConversationLog) -> Result<()> {
        let json = serde_json::to_string(log)?;
        self.conn.execute(
            "INSERT INTO conversations (user_id, messages, updated_at)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(user_id) DO UPDATE SET
                messages = excluded.messages,
                updated_at = excluded.updated_at",
            params![user_id, json, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    fn load_profile(&self, user_id: &str) -> Result<Option<UserProfile>> {
        let row = self
            .conn
            .query_row(
                "SELECT user_id, email, name, preferred_language, preferred_reciter, theme,
                        last_surah, last_ayat, position_updated_at, created_at, updated_at
                 FROM profiles WHERE user_id = ?1",
                params![user_id],
                Self::profile_from_row,
            )
            .optional()?;
        row.map(ProfileRow::decode).transpose()
    }

    fn save_profile(&self, profile: &UserProfile) -> Result<()> {
        let position = profile.reading_position;
        self.conn.execute(
            "INSERT INTO profiles (user_id, email, name, preferred_language, preferred_reciter, theme,
                                   last_surah, last_ayat, position_updated_at, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
             ON CONFLICT(user_id) DO UPDATE SET
                email = excluded.email,
                name = excluded.name,
                preferred_language = excluded.preferred_language,
                preferred_reciter = excluded.preferred_reciter,
                theme = excluded.theme,
                last_surah = excluded.last_surah,
                last_ayat = excluded.last_ayat,
                position_updated_at = excluded.position_updated_at,
                updated_at = excluded.updated_at",
            params![
                profile.user_id,
                profile.email,
                profile.name,
                profile.preferred_language,
                profile.preferred_reciter,
                profile.theme.as_str(),
                position.map(|p| p.surah_number),
                position.map(|p| p.ayat_number),
                position.map(|p| p.updated_at.to_rfc3339()),
                profile.created_at.to_rfc3339(),
                profile.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    fn list_bookmarks(&self, user_id: &str) -> Result<Vec<Bookmark>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, user_id, surah_number, ayat_number, note, created_at
             FROM bookmarks WHERE user_id = ?1
             ORDER BY surah_number, ayat_number",
        )?;
        let rows = stmt.query_map(params![user_id], Self::bookmark_from_row)?;

        let mut bookmarks = Vec::new();
        for row in rows {
            bookmarks.push(Self::decode_bookmark(row?)?);
        }
        Ok(bookmarks)
    }

    fn find_bookmark(&self, user_id: &str, surah: u32, ayat: u32) -> Result<Option<Bookmark>> {
        let raw = self
            .conn
            .query_row(
                "SELECT id, user_id, surah_number, ayat_number, note, created_at
                 FROM bookmarks WHERE user_id = ?1 AND surah_number = ?2 AND ayat_number = ?3",
                params![user_id, surah, ayat],
                Self::bookmark_from_row,
            )
            .optional()?;
        raw.map(Self::decode_bookmark).transpose()
    }

    fn insert_bookmark(&self, bookmark: &Bookmark) -> Result<()> {
        self.conn.execute(
            "INSERT INTO bookmarks (id, user_id, surah_number, ayat_number, note, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                bookmark.id,
                bookmark.user_id,
                bookmark.surah_number,
                bookmark.ayat_number,
                bookmark.note,
                bookmark.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    fn delete_bookmark(&self, user_id: &str, bookmark_id: &str) -> Result<bool> {
        let removed = self.conn.execute(
            "DELETE FROM bookmarks WHERE id = ?1 AND user_id = ?2",
            params![bookmark_id, user_id],
        )?;
        Ok(removed > 0)
    }

    fn append_progress(&self, entry: &ProgressEntry) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO progress (user_id, surah_number, ayat_number, time_spent_secs, recorded_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                entry.user_id,
                entry.surah_number,
                entry.ayat_number,
                entry.time_spent_secs,
                entry.recorded_at.to_rfc3339(),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn recent_progress(&self, user_id: &str, limit: usize) -> Result<Vec<ProgressEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, user_id, surah_number, ayat_number, time_spent_secs, recorded_at
             FROM progress WHERE user_id = ?1
             ORDER BY recorded_at DESC, id DESC
             LIMIT ?2",
        )?;
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = stmt.query_map(params![user_id, limit], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, u32>(2)?,
                row.get::<_, u32>(3)?,
                row.get::<_, u64>(4)?,
                row.get::<_, String>(5)?,
            ))
        })?;

        let mut entries = Vec::new();
        for row in rows {
            let (id, user_id, surah_number, ayat_number, time_spent_secs, recorded_at) = row?;
            entries.push(ProgressEntry {
                id,
                user_id,
                surah_number,
                ayat_number,
                time_spent_secs,
                recorded_at: parse_timestamp("progress", &recorded_at)?,
            });
        }
        Ok(entries)
    }
}
