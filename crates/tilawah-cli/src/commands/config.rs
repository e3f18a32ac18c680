//! Read and edit `config.toml`.
//!
//! Keys are dot paths into the TOML tables, e.g. `editions.search` or
//! `profile.theme`. Every write is validated before it reaches disk.

use clap::Subcommand;
use serde_json::json;
use tilawah_core::Config;

use super::{print_json, CliResult};

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print one value
    Get {
        /// Dot path, e.g. "editions.translation" or "progress.history_limit"
        key: String,
    },
    /// Change one value and save it
    Set {
        /// Dot path of an existing key
        key: String,
        /// New value; editions must be known text editions and languages
        /// one of en, ms, ur, id
        value: String,
    },
    /// Print the whole configuration as JSON
    List,
    /// Overwrite config.toml with the defaults
    Reset,
}

pub fn run(action: ConfigAction) -> CliResult {
    match action {
        ConfigAction::Get { key } => {
            let config = Config::load()?;
            let value = config
                .get(&key)
                .ok_or_else(|| format!("unknown config key: {key}"))?;
            println!("{value}");
            Ok(())
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            config.save()?;
            let stored = config.get(&key).unwrap_or(value);
            print_json(&json!({ "key": key, "value": stored }))
        }
        ConfigAction::List => print_json(&Config::load()?),
        ConfigAction::Reset => {
            let config = Config::default();
            config.save()?;
            print_json(&config)
        }
    }
}
