use chrono::{NaiveDate, Utc};
use clap::Subcommand;
use serde_json::json;
use tilawah_core::PersistenceProvider;

use super::{print_json, CliResult, Context};

#[derive(Subcommand)]
pub enum StreakAction {
    /// Show the stored streak and the streak as displayed today
    Show {
        /// Evaluate as of this date (YYYY-MM-DD, default: today UTC)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
}

pub fn run(ctx: &Context, action: StreakAction) -> CliResult {
    match action {
        StreakAction::Show { date } => {
            let today = date.unwrap_or_else(|| Utc::now().date_naive());
            let db = ctx.database()?;
            let state = db.load_streak(&ctx.user)?;
            print_json(&json!({
                "user_id": ctx.user,
                "current_streak": state.current_streak,
                "longest_streak": state.longest_streak,
                "last_read_date": state.last_read_date,
                "displayed_streak": state.displayed(today),
                "active": state.is_active(today),
            }))
        }
    }
}
