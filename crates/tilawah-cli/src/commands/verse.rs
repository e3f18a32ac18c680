use chrono::{NaiveDate, Utc};
use clap::Subcommand;
use serde_json::json;
use tilawah_core::catalog;
use tilawah_core::select_daily_verse;

use super::{print_json, CliResult};

#[derive(Subcommand)]
pub enum VerseAction {
    /// Show the verse of the day
    Daily {
        /// Date to pick for (YYYY-MM-DD, default: today UTC)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Show which juz a verse belongs to
    Juz {
        /// Surah number
        surah: u32,
        /// Ayat number
        ayat: u32,
    },
}

pub fn run(action: VerseAction) -> CliResult {
    match action {
        VerseAction::Daily { date } => {
            let date = date.unwrap_or_else(|| Utc::now().date_naive());
            let pick = select_daily_verse(date, &catalog::chapters())?;
            let name = catalog::chapter(pick.chapter_index)
                .map(|c| c.name)
                .unwrap_or_default();
            print_json(&json!({
                "date": pick.date,
                "surah_number": pick.chapter_index,
                "surah_name": name,
                "ayah_number": pick.verse_index,
                "juz": catalog::juz_for(pick.chapter_index, pick.verse_index)?,
            }))
        }
        VerseAction::Juz { surah, ayat } => {
            let reference = catalog::validate_reference(surah, ayat)?;
            let juz = catalog::juz_for(reference.chapter, reference.verse)?;
            print_json(&json!({ "reference": reference.to_string(), "juz": juz }))
        }
    }
}
