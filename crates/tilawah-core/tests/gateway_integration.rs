//! Integration tests for the gateway over an in-memory database and
//! scripted content/AI providers.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use tilawah_core::catalog;
use tilawah_core::{
    AyahText, Bookmark, BookmarkOutcome, ChatContext, ChatMessage, ChatRole, ChapterInfo,
    CollaboratorError, CompletionProvider, Config, ContentProvider, ConversationLog, CoreError,
    Database, Gateway, JuzText, PersistenceProvider, ProgressEntry, ReadingEvent, SearchResults,
    StreakError, StreakState, SurahText, UserProfile, ValidationError, VerseText,
};

fn echo_ayah(edition: &str, chapter: u32, verse: u32) -> AyahText {
    AyahText {
        surah_number: chapter,
        number_in_surah: verse,
        text: format!("{edition} {chapter}:{verse}"),
    }
}

/// Content provider that echoes the reference and edition back as text.
struct EchoContent;

impl ContentProvider for EchoContent {
    fn chapter_list(&self) -> Result<Vec<ChapterInfo>, CollaboratorError> {
        Ok(catalog::chapters())
    }

    fn verse(&self, chapter: u32, verse: u32, edition: &str) -> Result<VerseText, CollaboratorError> {
        Ok(VerseText {
            text: format!("{edition} {chapter}:{verse}"),
            chapter_name: catalog::chapter(chapter).map(|c| c.name).unwrap_or_default(),
        })
    }

    fn surah(&self, chapter: u32, edition: &str) -> Result<SurahText, CollaboratorError> {
        let info = catalog::chapter(chapter)
            .ok_or_else(|| CollaboratorError::new("echo", format!("no surah {chapter}")))?;
        Ok(SurahText {
            number: chapter,
            name: info.name,
            edition: edition.to_string(),
            ayahs: (1..=info.verse_count)
                .map(|v| echo_ayah(edition, chapter, v))
                .collect(),
        })
    }

    fn juz(&self, juz: u32, edition: &str) -> Result<JuzText, CollaboratorError> {
        let start = catalog::juz_start(juz).map_err(|e| CollaboratorError::new("echo", e.to_string()))?;
        Ok(JuzText {
            number: juz,
            edition: edition.to_string(),
            ayahs: vec![echo_ayah(edition, start.chapter, start.verse)],
        })
    }

    fn search(&self, query: &str, edition: &str) -> Result<SearchResults, CollaboratorError> {
        if query == "outage" {
            return Err(CollaboratorError::new("echo", "HTTP 502"));
        }
        let mut hit = echo_ayah(edition, 1, 1);
        hit.text = format!("{} {query}", hit.text);
        Ok(SearchResults {
            count: 1,
            matches: vec![hit],
        })
    }
}

/// Echo content whose chapter table lists 300 verses for every chapter.
struct WideTable;

impl ContentProvider for WideTable {
    fn chapter_list(&self) -> Result<Vec<ChapterInfo>, CollaboratorError> {
        Ok(catalog::chapters()
            .into_iter()
            .map(|c| ChapterInfo {
                verse_count: 300,
                ..c
            })
            .collect())
    }

    fn verse(&self, chapter: u32, verse: u32, edition: &str) -> Result<VerseText, CollaboratorError> {
        EchoContent.verse(chapter, verse, edition)
    }

    fn surah(&self, chapter: u32, edition: &str) -> Result<SurahText, CollaboratorError> {
        EchoContent.surah(chapter, edition)
    }

    fn juz(&self, juz: u32, edition: &str) -> Result<JuzText, CollaboratorError> {
        EchoContent.juz(juz, edition)
    }

    fn search(&self, query: &str, edition: &str) -> Result<SearchResults, CollaboratorError> {
        EchoContent.search(query, edition)
    }
}

/// Completion provider that numbers its replies and remembers what it saw.
#[derive(Default)]
struct ScriptedAi {
    fail: AtomicBool,
    calls: Mutex<Vec<(String, Vec<ChatMessage>, String)>>,
}

impl CompletionProvider for ScriptedAi {
    fn complete(
        &self,
        system_prompt: &str,
        history: &[ChatMessage],
        user_message: &str,
    ) -> Result<String, CollaboratorError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(CollaboratorError::new("completion", "HTTP 503"));
        }
        let mut calls = self.calls.lock().unwrap();
        calls.push((system_prompt.to_string(), history.to_vec(), user_message.to_string()));
        Ok(format!("reply {}", calls.len()))
    }
}

/// Database wrapper whose profile writes can be made to fail.
struct FlakyProfiles {
    inner: Database,
    fail_profile_writes: AtomicBool,
}

impl PersistenceProvider for FlakyProfiles {
    fn load_streak(&self, user_id: &str) -> Result<StreakState, CoreError> {
        self.inner.load_streak(user_id)
    }
    fn save_streak(&self, user_id: &str, state: &StreakState) -> Result<(), CoreError> {
        self.inner.save_streak(user_id, state)
    }
    fn load_log(&self, user_id: &str) -> Result<ConversationLog, CoreError> {
        self.inner.load_log(user_id)
    }
    fn save_log(&self, user_id: &str, log: &ConversationLog) -> Result<(), CoreError> {
        self.inner.save_log(user_id, log)
    }
    fn load_profile(&self, user_id: &str) -> Result<Option<UserProfile>, CoreError> {
        self.inner.load_profile(user_id)
    }
    fn save_profile(&self, profile: &UserProfile) -> Result<(), CoreError> {
        if self.fail_profile_writes.load(Ordering::SeqCst) {
            return Err(CoreError::Collaborator(CollaboratorError::new("store", "disk full")));
        }
        self.inner.save_profile(profile)
    }
    fn list_bookmarks(&self, user_id: &str) -> Result<Vec<Bookmark>, CoreError> {
        self.inner.list_bookmarks(user_id)
    }
    fn find_bookmark(&self, user_id: &str, surah: u32, ayat: u32) -> Result<Option<Bookmark>, CoreError> {
        self.inner.find_bookmark(user_id, surah, ayat)
    }
    fn insert_bookmark(&self, bookmark: &Bookmark) -> Result<(), CoreError> {
        self.inner.insert_bookmark(bookmark)
    }
    fn delete_bookmark(&self, user_id: &str, bookmark_id: &str) -> Result<bool, CoreError> {
        self.inner.delete_bookmark(user_id, bookmark_id)
    }
    fn append_progress(&self, entry: &ProgressEntry) -> Result<i64, CoreError> {
        self.inner.append_progress(entry)
    }
    fn recent_progress(&self, user_id: &str, limit: usize) -> Result<Vec<ProgressEntry>, CoreError> {
        self.inner.recent_progress(user_id, limit)
    }
}

type TestGateway = Gateway<EchoContent, ScriptedAi, Database>;

fn gateway() -> TestGateway {
    Gateway::new(
        EchoContent,
        ScriptedAi::default(),
        Database::open_memory().unwrap(),
        Config::default(),
    )
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn noon(day: NaiveDate) -> DateTime<Utc> {
    day.and_hms_opt(12, 0, 0).unwrap().and_utc()
}

fn read(gw: &TestGateway, user: &str, day: NaiveDate) -> Result<StreakState, CoreError> {
    gw.record_reading(
        user,
        ReadingEvent {
            surah_number: 18,
            ayat_number: 1,
            time_spent_secs: 120,
            at: noon(day),
        },
    )
}

#[test]
fn streak_scenarios_through_gateway() {
    let gw = gateway();
    let first = read(&gw, "u1", date(2024, 1, 1)).unwrap();
    assert_eq!(
        first,
        StreakState {
            current_streak: 1,
            longest_streak: 1,
            last_read_date: Some(date(2024, 1, 1)),
        }
    );

    gw.store()
        .save_streak(
            "u1",
            &StreakState {
                current_streak: 3,
                longest_streak: 5,
                last_read_date: Some(date(2024, 3, 10)),
            },
        )
        .unwrap();
    let next = read(&gw, "u1", date(2024, 3, 11)).unwrap();
    assert_eq!((next.current_streak, next.longest_streak), (4, 5));

    let same_day = read(&gw, "u1", date(2024, 3, 11)).unwrap();
    assert_eq!(same_day, next);

    let after_gap = read(&gw, "u1", date(2024, 3, 15)).unwrap();
    assert_eq!((after_gap.current_streak, after_gap.longest_streak), (1, 5));
    assert_eq!(gw.store().load_streak("u1").unwrap(), after_gap);
}

#[test]
fn backdated_reading_is_rejected_without_side_effects() {
    let gw = gateway();
    read(&gw, "u1", date(2024, 3, 10)).unwrap();
    let before_streak = gw.store().load_streak("u1").unwrap();
    let before_history = gw.store().recent_progress("u1", 100).unwrap();

    let err = read(&gw, "u1", date(2024, 3, 9)).unwrap_err();
    assert!(matches!(
        err,
        CoreError::Streak(StreakError::NonMonotonicDate { .. })
    ));
    assert_eq!(gw.store().load_streak("u1").unwrap(), before_streak);
    assert_eq!(gw.store().recent_progress("u1", 100).unwrap(), before_history);
}

#[test]
fn retry_after_partial_write_does_not_double_count() {
    let gw = Gateway::new(
        EchoContent,
        ScriptedAi::default(),
        FlakyProfiles {
            inner: Database::open_memory().unwrap(),
            fail_profile_writes: AtomicBool::new(false),
        },
        Config::default(),
    );
    let event = |day| ReadingEvent {
        surah_number: 18,
        ayat_number: 1,
        time_spent_secs: 60,
        at: noon(day),
    };
    gw.record_reading("u1", event(date(2024, 3, 10))).unwrap();

    gw.store().fail_profile_writes.store(true, Ordering::SeqCst);
    assert!(gw.record_reading("u1", event(date(2024, 3, 11))).is_err());
    // the streak was saved before the failing profile write
    assert_eq!(gw.store().load_streak("u1").unwrap().current_streak, 2);
    assert_eq!(gw.store().recent_progress("u1", 10).unwrap().len(), 1);

    gw.store().fail_profile_writes.store(false, Ordering::SeqCst);
    let retried = gw.record_reading("u1", event(date(2024, 3, 11))).unwrap();
    assert_eq!((retried.current_streak, retried.longest_streak), (2, 2));
    assert_eq!(gw.store().recent_progress("u1", 10).unwrap().len(), 2);
}

#[test]
fn reading_moves_position_and_history() {
    let gw = gateway();
    let day = date(2024, 5, 1);
    gw.record_reading(
        "u1",
        ReadingEvent {
            surah_number: 2,
            ayat_number: 255,
            time_spent_secs: 300,
            at: noon(day),
        },
    )
    .unwrap();

    let report = gw.progress("u1", day).unwrap();
    let position = report.current_position.unwrap();
    assert_eq!((position.surah_number, position.ayat_number), (2, 255));
    assert_eq!(report.displayed_streak, 1);
    assert_eq!(report.history.len(), 1);
    assert_eq!(report.history[0].time_spent_secs, 300);

    // two days later the stored streak is stale and shows as broken
    let later = gw.progress("u1", day + Duration::days(2)).unwrap();
    assert_eq!(later.streak.current_streak, 1);
    assert_eq!(later.displayed_streak, 0);
}

#[test]
fn progress_history_is_capped_newest_first() {
    let gw = gateway();
    let start = date(2024, 1, 1);
    for offset in 0..35 {
        read(&gw, "u1", start + Duration::days(offset)).unwrap();
    }
    let report = gw.progress("u1", start + Duration::days(34)).unwrap();
    assert_eq!(report.history.len(), 30);
    assert_eq!(report.history[0].recorded_at, noon(start + Duration::days(34)));
    assert_eq!(report.streak.current_streak, 35);
}

#[test]
fn profile_created_with_defaults_once() {
    let gw = gateway();
    let now = noon(date(2024, 1, 1));
    let created = gw.profile("u1", "u1@example.com", Some("Yusuf".into()), now).unwrap();
    assert_eq!(created.profile.preferred_reciter, "ar.alafasy");
    assert_eq!(created.streak, StreakState::default());

    let again = gw
        .profile("u1", "other@example.com", None, now + Duration::hours(1))
        .unwrap();
    assert_eq!(again.profile.email, "u1@example.com");
    assert_eq!(again.profile.created_at, now);
}

#[test]
fn daily_verse_is_stable_and_uses_configured_editions() {
    let gw = gateway();
    let today = date(2024, 1, 1);
    let a = gw.daily_verse(today).unwrap();
    let b = gw.daily_verse(today).unwrap();
    assert_eq!(a, b);

    let chapter = catalog::chapter(a.surah_number).unwrap();
    assert!((1..=chapter.verse_count).contains(&a.ayah_number));
    assert_eq!(a.surah_name, chapter.name);
    assert_eq!(a.text, format!("quran-uthmani {}:{}", a.surah_number, a.ayah_number));
    assert_eq!(a.translation, format!("en.sahih {}:{}", a.surah_number, a.ayah_number));
    assert_eq!(a.juz, Some(catalog::juz_for(a.surah_number, a.ayah_number).unwrap()));
}

#[test]
fn daily_verse_survives_a_provider_table_that_differs_from_the_builtin_one() {
    let gw = Gateway::new(
        WideTable,
        ScriptedAi::default(),
        Database::open_memory().unwrap(),
        Config::default(),
    );
    let start = date(2024, 1, 1);
    let mut beyond_builtin = 0;
    for offset in 0..30 {
        let verse = gw.daily_verse(start + Duration::days(offset)).unwrap();
        assert!((1..=300).contains(&verse.ayah_number));
        match catalog::juz_for(verse.surah_number, verse.ayah_number) {
            Ok(juz) => assert_eq!(verse.juz, Some(juz)),
            Err(_) => {
                beyond_builtin += 1;
                assert_eq!(verse.juz, None);
            }
        }
    }
    // most chapters have far fewer than 300 verses
    assert!(beyond_builtin > 0);
}

#[test]
fn surah_uses_requested_or_configured_edition() {
    let gw = gateway();
    let surah = gw.surah(112, None).unwrap();
    assert_eq!(surah.edition, "quran-uthmani");
    assert_eq!(surah.ayahs.len(), 4);
    assert_eq!(surah.ayahs[3].text, "quran-uthmani 112:4");

    let translated = gw.surah(112, Some("en.asad")).unwrap();
    assert_eq!(translated.edition, "en.asad");

    assert!(matches!(
        gw.surah(115, None),
        Err(CoreError::Validation(ValidationError::UnknownSurah(115)))
    ));
}

#[test]
fn surah_translations_map_languages_to_editions() {
    let gw = gateway();
    let editions: Vec<String> = gw
        .surah_translations(1, &["en", "ms"])
        .unwrap()
        .into_iter()
        .map(|s| s.edition)
        .collect();
    assert_eq!(editions, ["quran-uthmani", "en.sahih", "ms.basmeih"]);

    // unknown codes fall back to the configured translation, fetched once
    let editions: Vec<String> = gw
        .surah_translations(1, &["fr", "ur", "en"])
        .unwrap()
        .into_iter()
        .map(|s| s.edition)
        .collect();
    assert_eq!(editions, ["quran-uthmani", "en.sahih", "ur.jalandhry"]);
}

#[test]
fn ayah_and_juz_lookups() {
    let gw = gateway();
    let ayah = gw.ayah(2, 255, Some("en.sahih")).unwrap();
    assert_eq!(ayah.text, "en.sahih 2:255");
    assert_eq!(ayah.chapter_name, "Al-Baqara");
    assert!(matches!(gw.ayah(2, 287, None), Err(CoreError::Validation(_))));

    let juz = gw.juz(30, None).unwrap();
    assert_eq!(juz.edition, "quran-uthmani");
    assert_eq!(juz.ayahs[0].text, "quran-uthmani 78:1");
    assert!(matches!(
        gw.juz(31, None),
        Err(CoreError::Validation(ValidationError::UnknownJuz(31)))
    ));
}

#[test]
fn search_validates_query_and_passes_failures_through() {
    let gw = gateway();
    let results = gw.search("  mercy ", None).unwrap();
    assert_eq!(results.count, 1);
    assert_eq!(results.matches[0].text, "quran-simple 1:1 mercy");

    assert!(matches!(gw.search("m", None), Err(CoreError::Validation(_))));
    assert!(matches!(gw.search("outage", None), Err(CoreError::Collaborator(_))));
}

#[test]
fn chat_sends_window_and_caps_storage() {
    let gw = gateway();
    for i in 0..15 {
        gw.chat("u1", &format!("question {i}"), None).unwrap();
    }

    let log = gw.store().load_log("u1").unwrap();
    assert_eq!(log.len(), 20);
    assert_eq!(log.messages()[0].content, "question 5");
    assert_eq!(log.messages()[19].content, "reply 15");

    let calls = gw.ai_calls();
    assert!(calls[0].1.is_empty());
    // the 15th call saw the last 10 of the 20 messages stored before it
    let last_history = &calls[14].1;
    assert_eq!(last_history.len(), 10);
    assert_eq!(last_history[0].content, "question 9");
    assert_eq!(last_history[0].role, ChatRole::User);
    assert_eq!(last_history[9].content, "reply 14");
    assert_eq!(calls[14].2, "question 14");
}

#[test]
fn chat_context_reaches_system_prompt() {
    let gw = gateway();
    let ctx = ChatContext {
        current_surah: Some(36),
        current_ayat: Some(1),
        screen: Some("reading".into()),
    };
    gw.chat("u1", "What is this surah about?", Some(&ctx)).unwrap();
    let calls = gw.ai_calls();
    assert!(calls[0]
        .0
        .ends_with("Context: User is currently reading Surah 36, at Ayat 1, on the reading screen"));
}

#[test]
fn failed_completion_leaves_log_untouched() {
    let gw = gateway();
    gw.chat("u1", "first", None).unwrap();
    let before = gw.store().load_log("u1").unwrap();

    gw.fail_ai(true);
    let err = gw.chat("u1", "second", None).unwrap_err();
    assert!(matches!(err, CoreError::Collaborator(_)));
    assert_eq!(gw.store().load_log("u1").unwrap(), before);
}

#[test]
fn explain_verse_fetches_both_editions() {
    let gw = gateway();
    let explanation = gw.explain_verse(1, 1).unwrap();
    assert_eq!(explanation.surah_name, "Al-Faatiha");
    let calls = gw.ai_calls();
    assert!(calls[0].1.is_empty());
    assert!(calls[0].2.contains("Arabic: quran-uthmani 1:1"));
    assert!(calls[0].2.contains("Translation: en.sahih 1:1"));

    assert!(matches!(gw.explain_verse(1, 9), Err(CoreError::Validation(_))));
}

#[test]
fn context_help_uses_screen_prompt() {
    let gw = gateway();
    let reply = gw.context_help("bookmarks", Some("how do I add a note?")).unwrap();
    assert_eq!(reply, "reply 1");
    let calls = gw.ai_calls();
    assert!(calls[0].2.starts_with("Guide on how to save"));
    assert!(calls[0].2.ends_with("how do I add a note?"));
}

#[test]
fn bookmarks_deduplicate_and_delete() {
    let gw = gateway();
    let now = noon(date(2024, 1, 1));

    let created = match gw.add_bookmark("u1", 2, 255, Some("Kursi".into()), now).unwrap() {
        BookmarkOutcome::Created(b) => b,
        other => panic!("expected Created, got {other:?}"),
    };
    match gw.add_bookmark("u1", 2, 255, None, now).unwrap() {
        BookmarkOutcome::AlreadyExists(b) => assert_eq!(b.id, created.id),
        other => panic!("expected AlreadyExists, got {other:?}"),
    }
    assert_eq!(gw.bookmarks("u1").unwrap().len(), 1);

    assert!(gw.remove_bookmark("u2", &created.id).is_err());
    gw.remove_bookmark("u1", &created.id).unwrap();
    assert!(gw.bookmarks("u1").unwrap().is_empty());
}

trait ScriptedAccess {
    fn ai_calls(&self) -> Vec<(String, Vec<ChatMessage>, String)>;
    fn fail_ai(&self, fail: bool);
}

impl ScriptedAccess for TestGateway {
    fn ai_calls(&self) -> Vec<(String, Vec<ChatMessage>, String)> {
        self.ai().calls.lock().unwrap().clone()
    }

    fn fail_ai(&self, fail: bool) {
        self.ai().fail.store(fail, Ordering::SeqCst);
    }
}
