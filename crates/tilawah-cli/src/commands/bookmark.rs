use chrono::Utc;
use clap::Subcommand;
use serde_json::json;

use super::{print_json, CliResult, Context};

#[derive(Subcommand)]
pub enum BookmarkAction {
    /// List bookmarks in reading order (by surah, then ayat)
    List,
    /// Bookmark a verse
    Add {
        /// Surah number
        surah: u32,
        /// Ayat number
        ayat: u32,
        /// Optional note
        #[arg(long)]
        note: Option<String>,
    },
    /// Remove a bookmark by id
    Remove {
        /// Bookmark id
        id: String,
    },
}

pub fn run(ctx: &Context, action: BookmarkAction) -> CliResult {
    let gateway = ctx.gateway()?;
    match action {
        BookmarkAction::List => print_json(&gateway.bookmarks(&ctx.user)?),
        BookmarkAction::Add { surah, ayat, note } => {
            let outcome = gateway.add_bookmark(&ctx.user, surah, ayat, note, Utc::now())?;
            print_json(&outcome)
        }
        BookmarkAction::Remove { id } => {
            gateway.remove_bookmark(&ctx.user, &id)?;
            print_json(&json!({ "removed": id }))
        }
    }
}
