//! Session ledger and reporting commands.

use clap::{Args, Subcommand};
use studyplan_core::{ApiClient, NewSession, SessionFilter, SessionLedger};

#[derive(Args, Debug, Default)]
pub struct FilterArgs {
    /// Only sessions for this subject
    #[arg(long)]
    pub subject: Option<i64>,
    /// Only sessions for this topic
    #[arg(long)]
    pub topic: Option<i64>,
    /// Earliest start time, inclusive (e.g. 2026-10-01 or a full timestamp)
    #[arg(long)]
    pub from: Option<String>,
    /// Latest start time, inclusive. A bare date means midnight at its start,
    /// so `--to 2026-10-31` excludes that day; pass `2026-11-01` or a full
    /// timestamp such as 2026-10-31T23:59:59.999Z to include it
    #[arg(long)]
    pub to: Option<String>,
}

impl From<FilterArgs> for SessionFilter {
    fn from(args: FilterArgs) -> Self {
        SessionFilter {
            subject_id: args.subject,
            topic_id: args.topic,
            from: args.from,
            to: args.to,
        }
    }
}

#[derive(Subcommand)]
pub enum SessionsAction {
    /// Open a session without running the timer
    Start {
        #[arg(long)]
        subject: Option<i64>,
        #[arg(long)]
        topic: Option<i64>,
        /// Activity tag (default: pomodoro)
        #[arg(long = "type")]
        kind: Option<String>,
    },
    /// Close a session
    Stop {
        /// Session ID
        id: i64,
    },
    /// List sessions, newest first
    List {
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Aggregate counts and minutes
    Stats {
        #[command(flatten)]
        filter: FilterArgs,
    },
}

pub async fn run(action: SessionsAction, api: &ApiClient) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        SessionsAction::Start {
            subject,
            topic,
            kind,
        } => {
            let request = NewSession {
                subject_id: subject,
                topic_id: topic,
                kind,
            };
            let session = api.start_session(&request).await?;
            println!("Session started: {}", session.id);
            println!("{}", serde_json::to_string_pretty(&session)?);
        }
        SessionsAction::Stop { id } => {
            let session = api.stop_session(id).await?;
            println!(
                "Session stopped: {} ({} min)",
                session.id,
                session.duration_minutes.unwrap_or(0)
            );
            println!("{}", serde_json::to_string_pretty(&session)?);
        }
        SessionsAction::List { filter } => {
            let sessions = api.list_sessions(&filter.into()).await?;
            println!("{}", serde_json::to_string_pretty(&sessions)?);
        }
        SessionsAction::Stats { filter } => {
            let stats = api.session_stats(&filter.into()).await?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
    }
    Ok(())
}
