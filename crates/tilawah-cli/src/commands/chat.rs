//! Stored AI chat history.
//!
//! Sending messages needs a completion endpoint; these commands only read
//! and reset what the backend has stored.

use clap::Subcommand;
use serde_json::json;
use tilawah_core::{context_window, PersistenceProvider};

use super::{print_json, CliResult, Context};

#[derive(Subcommand)]
pub enum ChatAction {
    /// Show the stored conversation, oldest first
    History,
    /// Show the messages the AI would see with the next question
    Context,
    /// Delete the stored conversation
    Clear,
}

pub fn run(ctx: &Context, action: ChatAction) -> CliResult {
    let db = ctx.database()?;
    match action {
        ChatAction::History => print_json(&db.load_log(&ctx.user)?),
        ChatAction::Context => {
            let log = db.load_log(&ctx.user)?;
            print_json(&context_window(&log))
        }
        ChatAction::Clear => {
            let removed = db.clear_log(&ctx.user)?;
            print_json(&json!({ "cleared": removed }))
        }
    }
}
