//! Subcommand handlers.
//!
//! Commands run fully offline: the chapter list comes from the built-in
//! catalog and no AI endpoint is configured, so verse text and AI answers
//! are unavailable here.

use std::path::PathBuf;

use serde::Serialize;
use tilawah_core::{BuiltinChapters, Config, Database, Gateway, NoCompletion};
use tracing::debug;

pub mod bookmark;
pub mod catalog;
pub mod chat;
pub mod config;
pub mod profile;
pub mod progress;
pub mod streak;
pub mod verse;

pub type CliResult = Result<(), Box<dyn std::error::Error>>;

pub type LocalGateway = Gateway<BuiltinChapters, NoCompletion, Database>;

/// Options shared by every subcommand.
pub struct Context {
    pub user: String,
    pub db: Option<PathBuf>,
}

impl Context {
    pub fn database(&self) -> Result<Database, Box<dyn std::error::Error>> {
        debug!(user = %self.user, db = ?self.db, "opening database");
        let db = match &self.db {
            Some(path) => Database::open_at(path)?,
            None => Database::open()?,
        };
        Ok(db)
    }

    pub fn gateway(&self) -> Result<LocalGateway, Box<dyn std::error::Error>> {
        let config = Config::load()?;
        Ok(Gateway::new(BuiltinChapters, NoCompletion, self.database()?, config))
    }
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
