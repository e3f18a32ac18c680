//! Built-in corpus catalog: chapters, juz boundaries and known editions.
//!
//! The chapter table is fixed by the corpus itself, so it ships with the
//! crate. [`BuiltinChapters`] exposes it as a [`ContentProvider`] for
//! offline use; verse text always comes from a real provider.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::collaborators::{ContentProvider, JuzText, SearchResults, SurahText, VerseText};
use crate::error::{CollaboratorError, ValidationError};

/// Number of chapters (surahs).
pub const CHAPTER_COUNT: u32 = 114;

/// Number of juz partitions.
pub const JUZ_COUNT: u32 = 30;

/// Total verses across all chapters.
pub const VERSE_COUNT: u32 = 6236;

/// (index, transliterated name, verse count)
const CHAPTER_TABLE: [(u32, &str, u32); CHAPTER_COUNT as usize] = [
    (1, "Al-Faatiha", 7),
    (2, "Al-Baqara", 286),
    (3, "Aal-i-Imraan", 200),
    (4, "An-Nisaa", 176),
    (5, "Al-Maaida", 120),
    (6, "Al-An'aam", 165),
    (7, "Al-A'raaf", 206),
    (8, "Al-Anfaal", 75),
    (9, "At-Tawba", 129),
    (10, "Yunus", 109),
    (11, "Hud", 123),
    (12, "Yusuf", 111),
    (13, "Ar-Ra'd", 43),
    (14, "Ibrahim", 52),
    (15, "Al-Hijr", 99),
    (16, "An-Nahl", 128),
    (17, "Al-Israa", 111),
    (18, "Al-Kahf", 110),
    (19, "Maryam", 98),
    (20, "Taa-Haa", 135),
    (21, "Al-Anbiyaa", 112),
    (22, "Al-Hajj", 78),
    (23, "Al-Muminoon", 118),
    (24, "An-Noor", 64),
    (25, "Al-Furqaan", 77),
    (26, "Ash-Shu'araa", 227),
    (27, "An-Naml", 93),
    (28, "Al-Qasas", 88),
    (29, "Al-Ankaboot", 69),
    (30, "Ar-Room", 60),
    (31, "Luqman", 34),
    (32, "As-Sajda", 30),
    (33, "Al-Ahzaab", 73),
    (34, "Saba", 54),
    (35, "Faatir", 45),
    (36, "Yaseen", 83),
    (37, "As-Saaffaat", 182),
    (38, "Saad", 88),
    (39, "Az-Zumar", 75),
    (40, "Ghafir", 85),
    (41, "Fussilat", 54),
    (42, "Ash-Shura", 53),
    (43, "Az-Zukhruf", 89),
    (44, "Ad-Dukhaan", 59),
    (45, "Al-Jaathiya", 37),
    (46, "Al-Ahqaf", 35),
    (47, "Muhammad", 38),
    (48, "Al-Fath", 29),
    (49, "Al-Hujuraat", 18),
    (50, "Qaaf", 45),
    (51, "Adh-Dhaariyat", 60),
    (52, "At-Tur", 49),
    (53, "An-Najm", 62),
    (54, "Al-Qamar", 55),
    (55, "Ar-Rahmaan", 78),
    (56, "Al-Waaqia", 96),
    (57, "Al-Hadid", 29),
    (58, "Al-Mujaadila", 22),
    (59, "Al-Hashr", 24),
    (60, "Al-Mumtahana", 13),
    (61, "As-Saff", 14),
    (62, "Al-Jumu'a", 11),
    (63, "Al-Munaafiqoon", 11),
    (64, "At-Taghaabun", 18),
    (65, "At-Talaaq", 12),
    (66, "At-Tahrim", 12),
    (67, "Al-Mulk", 30),
    (68, "Al-Qalam", 52),
    (69, "Al-Haaqqa", 52),
    (70, "Al-Ma'aarij", 44),
    (71, "Nooh", 28),
    (72, "Al-Jinn", 28),
    (73, "Al-Muzzammil", 20),
    (74, "Al-Muddaththir", 56),
    (75, "Al-Qiyaama", 40),
    (76, "Al-Insaan", 31),
    (77, "Al-Mursalaat", 50),
    (78, "An-Naba", 40),
    (79, "An-Naazi'aat", 46),
    (80, "Abasa", 42),
    (81, "At-Takwir", 29),
    (82, "Al-Infitaar", 19),
    (83, "Al-Mutaffifin", 36),
    (84, "Al-Inshiqaaq", 25),
    (85, "Al-Burooj", 22),
    (86, "At-Taariq", 17),
    (87, "Al-A'laa", 19),
    (88, "Al-Ghaashiya", 26),
    (89, "Al-Fajr", 30),
    (90, "Al-Balad", 20),
    (91, "Ash-Shams", 15),
    (92, "Al-Lail", 21),
    (93, "Ad-Dhuhaa", 11),
    (94, "Ash-Sharh", 8),
    (95, "At-Tin", 8),
    (96, "Al-Alaq", 19),
    (97, "Al-Qadr", 5),
    (98, "Al-Bayyina", 8),
    (99, "Az-Zalzala", 8),
    (100, "Al-Aadiyaat", 11),
    (101, "Al-Qaari'a", 11),
    (102, "At-Takaathur", 8),
    (103, "Al-Asr", 3),
    (104, "Al-Humaza", 9),
    (105, "Al-Fil", 5),
    (106, "Quraish", 4),
    (107, "Al-Maa'un", 7),
    (108, "Al-Kawthar", 3),
    (109, "Al-Kaafiroon", 6),
    (110, "An-Nasr", 3),
    (111, "Al-Masad", 5),
    (112, "Al-Ikhlaas", 4),
    (113, "Al-Falaq", 5),
    (114, "An-Naas", 6),
];

/// First verse of each juz, as (chapter, verse).
const JUZ_STARTS: [(u32, u32); JUZ_COUNT as usize] = [
    (1, 1),
    (2, 142),
    (2, 253),
    (3, 93),
    (4, 24),
    (4, 148),
    (5, 82),
    (6, 111),
    (7, 88),
    (8, 41),
    (9, 93),
    (11, 6),
    (12, 53),
    (15, 1),
    (17, 1),
    (18, 75),
    (21, 1),
    (23, 1),
    (25, 21),
    (27, 56),
    (29, 46),
    (33, 31),
    (36, 28),
    (39, 32),
    (41, 47),
    (46, 1),
    (51, 31),
    (58, 1),
    (67, 1),
    (78, 1),
];

/// One chapter of the corpus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterInfo {
    pub index: u32,
    pub name: String,
    pub verse_count: u32,
}

/// A validated (chapter, verse) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VerseRef {
    pub chapter: u32,
    pub verse: u32,
}

impl std::fmt::Display for VerseRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.chapter, self.verse)
    }
}

/// The full chapter table in canonical order.
pub fn chapters() -> Vec<ChapterInfo> {
    CHAPTER_TABLE
        .iter()
        .map(|&(index, name, verse_count)| ChapterInfo {
            index,
            name: name.to_string(),
            verse_count,
        })
        .collect()
}

/// Look up a chapter by its 1-based index.
pub fn chapter(index: u32) -> Option<ChapterInfo> {
    let &(index, name, verse_count) = CHAPTER_TABLE.get(index.checked_sub(1)? as usize)?;
    Some(ChapterInfo {
        index,
        name: name.to_string(),
        verse_count,
    })
}

/// Check that `chapter:verse` exists in the corpus.
///
/// # Errors
/// [`ValidationError::UnknownSurah`] or [`ValidationError::AyatOutOfRange`].
pub fn validate_reference(chapter_index: u32, verse: u32) -> Result<VerseRef, ValidationError> {
    let info = chapter(chapter_index).ok_or(ValidationError::UnknownSurah(chapter_index))?;
    if verse == 0 || verse > info.verse_count {
        return Err(ValidationError::AyatOutOfRange {
            surah: chapter_index,
            ayat: verse,
            verse_count: info.verse_count,
        });
    }
    Ok(VerseRef {
        chapter: chapter_index,
        verse,
    })
}

/// First verse of juz `juz` (1..=30).
///
/// # Errors
/// [`ValidationError::UnknownJuz`] for numbers outside 1..=30.
pub fn juz_start(juz: u32) -> Result<VerseRef, ValidationError> {
    let idx = juz
        .checked_sub(1)
        .filter(|i| *i < JUZ_COUNT)
        .ok_or(ValidationError::UnknownJuz(juz))?;
    let (chapter, verse) = JUZ_STARTS[idx as usize];
    Ok(VerseRef { chapter, verse })
}

/// Juz containing `chapter:verse`.
///
/// # Errors
/// Fails if the reference itself is invalid.
pub fn juz_for(chapter_index: u32, verse: u32) -> Result<u32, ValidationError> {
    let target = validate_reference(chapter_index, verse)?;
    let pos = JUZ_STARTS
        .iter()
        .rposition(|&start| start <= (target.chapter, target.verse))
        .unwrap_or(0);
    Ok(pos as u32 + 1)
}

/// Whether an edition carries text or recitation audio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditionKind {
    Text,
    Audio,
}

/// A named text variant or recitation of the corpus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Edition {
    pub identifier: &'static str,
    pub language: &'static str,
    pub name: &'static str,
    pub kind: EditionKind,
    /// Display group ("arabic", "english", ...)
    pub group: &'static str,
}

const fn text(identifier: &'static str, language: &'static str, name: &'static str, group: &'static str) -> Edition {
    Edition {
        identifier,
        language,
        name,
        kind: EditionKind::Text,
        group,
    }
}

static EDITIONS: [Edition; 9] = [
    text("quran-simple", "ar", "Simple", "arabic"),
    text("quran-uthmani", "ar", "Uthmani", "arabic"),
    Edition {
        identifier: "ar.alafasy",
        language: "ar",
        name: "Alafasy",
        kind: EditionKind::Audio,
        group: "arabic",
    },
    text("en.asad", "en", "Muhammad Asad", "english"),
    text("en.sahih", "en", "Sahih International", "english"),
    text("en.pickthall", "en", "Pickthall", "english"),
    text("ms.basmeih", "ms", "Basmeih", "malay"),
    text("ur.jalandhry", "ur", "Jalandhry", "urdu"),
    text(
        "id.indonesian",
        "id",
        "Indonesian Ministry of Religious Affairs",
        "indonesian",
    ),
];

/// Every edition the app knows about.
pub fn editions() -> &'static [Edition] {
    &EDITIONS
}

/// Editions keyed by display group.
pub fn editions_by_group() -> BTreeMap<&'static str, Vec<&'static Edition>> {
    let mut groups: BTreeMap<&'static str, Vec<&'static Edition>> = BTreeMap::new();
    for edition in EDITIONS.iter() {
        groups.entry(edition.group).or_default().push(edition);
    }
    groups
}

pub fn find_edition(identifier: &str) -> Option<&'static Edition> {
    EDITIONS.iter().find(|e| e.identifier == identifier)
}

/// Offline content provider backed by the embedded chapter table.
///
/// Only the chapter list is available. Every text lookup fails as a
/// collaborator error since no verse text is bundled.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinChapters;

impl ContentProvider for BuiltinChapters {
    fn chapter_list(&self) -> Result<Vec<ChapterInfo>, CollaboratorError> {
        Ok(chapters())
    }

    fn verse(&self, chapter_index: u32, verse: u32, edition: &str) -> Result<VerseText, CollaboratorError> {
        Err(CollaboratorError::new(
            "builtin-chapters",
            format!("verse text for {chapter_index}:{verse} ({edition}) is not bundled"),
        ))
    }

    fn surah(&self, chapter_index: u32, edition: &str) -> Result<SurahText, CollaboratorError> {
        Err(not_bundled(format!("surah {chapter_index} ({edition})")))
    }

    fn juz(&self, juz: u32, edition: &str) -> Result<JuzText, CollaboratorError> {
        Err(not_bundled(format!("juz {juz} ({edition})")))
    }

    fn search(&self, _query: &str, edition: &str) -> Result<SearchResults, CollaboratorError> {
        Err(not_bundled(format!("search index ({edition})")))
    }
}

fn not_bundled(what: String) -> CollaboratorError {
    CollaboratorError::new("builtin-chapters", format!("{what} is not bundled"))
}
