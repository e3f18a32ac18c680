//! Profile and preference commands.

use chrono::Utc;
use clap::Subcommand;
use tilawah_core::{PreferencesUpdate, Theme};

use super::{print_json, CliResult, Context};

#[derive(Subcommand)]
pub enum ProfileAction {
    /// Show the profile, creating it with defaults on first use
    Show {
        /// Email recorded when the profile is created
        #[arg(long, default_value = "")]
        email: String,
        /// Display name recorded when the profile is created
        #[arg(long)]
        name: Option<String>,
    },
    /// Update preferences
    Set {
        #[arg(long)]
        name: Option<String>,
        /// Language code (en, ms, ur, id)
        #[arg(long)]
        language: Option<String>,
        /// Reciter edition identifier (e.g. ar.alafasy)
        #[arg(long)]
        reciter: Option<String>,
        /// light or dark
        #[arg(long)]
        theme: Option<String>,
    },
}

pub fn run(ctx: &Context, action: ProfileAction) -> CliResult {
    let gateway = ctx.gateway()?;
    match action {
        ProfileAction::Show { email, name } => {
            let summary = gateway.profile(&ctx.user, &email, name, Utc::now())?;
            print_json(&summary)
        }
        ProfileAction::Set {
            name,
            language,
            reciter,
            theme,
        } => {
            let theme = theme.map(|t| t.parse::<Theme>()).transpose()?;
            let update = PreferencesUpdate {
                name,
                preferred_language: language,
                preferred_reciter: reciter,
                theme,
            };
            let profile = gateway.update_preferences(&ctx.user, &update, Utc::now())?;
            print_json(&profile)
        }
    }
}
