//! Reading progress: record a session and view position, streak and history.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use clap::Subcommand;
use tilawah_core::ReadingEvent;

use super::{print_json, CliResult, Context};

#[derive(Subcommand)]
pub enum ProgressAction {
    /// Record a reading session
    Record {
        /// Surah number (1-114)
        #[arg(long)]
        surah: u32,
        /// Ayat number within the surah
        #[arg(long)]
        ayat: u32,
        /// Seconds spent reading
        #[arg(long, default_value_t = 0)]
        time_spent: u64,
        /// Record the session on this date (YYYY-MM-DD) instead of now
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Show current position, streak and recent history
    Show {
        /// Evaluate the streak as of this date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
}

pub fn run(ctx: &Context, action: ProgressAction) -> CliResult {
    match action {
        ProgressAction::Record {
            surah,
            ayat,
            time_spent,
            date,
        } => {
            let at = date.map_or_else(Utc::now, start_of_day);
            let gateway = ctx.gateway()?;
            let streak = gateway.record_reading(
                &ctx.user,
                ReadingEvent {
                    surah_number: surah,
                    ayat_number: ayat,
                    time_spent_secs: time_spent,
                    at,
                },
            )?;
            print_json(&streak)
        }
        ProgressAction::Show { date } => {
            let today = date.unwrap_or_else(|| Utc::now().date_naive());
            let report = ctx.gateway()?.progress(&ctx.user, today)?;
            print_json(&report)
        }
    }
}

fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}
