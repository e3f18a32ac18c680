//! Deterministic verse-of-the-day selection.
//!
//! The pick is a pure function of the calendar date and the chapter table:
//!
//! 1. seed = the date as the integer `YYYYMMDD` (e.g. `20240101`)
//! 2. generator = `Mcg128Xsl64::seed_from_u64(seed)` (PCG XSL 128/64 MCG)
//! 3. chapter = uniform `u32` in `1..=114`, drawn first
//! 4. verse = uniform `u32` in `1..=verse_count(chapter)`, drawn second from
//!    the same stream
//!
//! Every deployment must use this exact sequence to agree on the verse of
//! the day. Draws are `u32` so the result does not depend on pointer width.

use chrono::{Datelike, NaiveDate};
use rand::{Rng, SeedableRng};
use rand_pcg::Mcg128Xsl64;
use serde::{Deserialize, Serialize};

use crate::catalog::{ChapterInfo, CHAPTER_COUNT};
use crate::error::SelectionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyVerseSelection {
    pub date: NaiveDate,
    pub chapter_index: u32,
    pub verse_index: u32,
}

/// `YYYYMMDD` as an integer.
pub fn seed_for_date(date: NaiveDate) -> u64 {
    // years before 0 never occur in practice; clamp instead of wrapping
    let year = date.year().max(0) as u64;
    year * 10_000 + u64::from(date.month()) * 100 + u64::from(date.day())
}

/// Pick the verse for `date` from `chapters`.
///
/// # Errors
/// [`SelectionError::EmptyChapterTable`] when `chapters` is empty, and
/// [`SelectionError::ChapterNotFound`] when the drawn chapter is missing
/// from the table or lists no verses.
pub fn select_daily_verse(
    date: NaiveDate,
    chapters: &[ChapterInfo],
) -> Result<DailyVerseSelection, SelectionError> {
    if chapters.is_empty() {
        return Err(SelectionError::EmptyChapterTable);
    }

    let mut rng = Mcg128Xsl64::seed_from_u64(seed_for_date(date));

    let chapter_index: u32 = rng.gen_range(1..=CHAPTER_COUNT);
    let verse_count = chapters
        .iter()
        .find(|c| c.index == chapter_index)
        .map(|c| c.verse_count)
        .filter(|&n| n > 0)
        .ok_or(SelectionError::ChapterNotFound {
            chapter: chapter_index,
        })?;

    let verse_index: u32 = rng.gen_range(1..=verse_count);

    Ok(DailyVerseSelection {
        date,
        chapter_index,
        verse_index,
    })
}
