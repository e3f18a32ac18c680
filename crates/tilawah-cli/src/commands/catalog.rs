use clap::Subcommand;
use serde_json::json;
use tilawah_core::catalog;
use tilawah_core::ValidationError;

use super::{print_json, CliResult};

#[derive(Subcommand)]
pub enum CatalogAction {
    /// List all chapters
    Chapters,
    /// Show one chapter
    Chapter {
        /// Chapter number (1-114)
        index: u32,
    },
    /// List supported editions grouped by language
    Editions,
    /// Show where a juz starts
    Juz {
        /// Juz number (1-30)
        number: u32,
    },
}

pub fn run(action: CatalogAction) -> CliResult {
    match action {
        CatalogAction::Chapters => print_json(&catalog::chapters()),
        CatalogAction::Chapter { index } => {
            let chapter = catalog::chapter(index).ok_or(ValidationError::UnknownSurah(index))?;
            print_json(&chapter)
        }
        CatalogAction::Editions => print_json(&catalog::editions_by_group()),
        CatalogAction::Juz { number } => {
            let start = catalog::juz_start(number)?;
            print_json(&json!({
                "juz": number,
                "surah_number": start.chapter,
                "ayah_number": start.verse,
            }))
        }
    }
}
