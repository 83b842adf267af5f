//! Interactive Pomodoro timer.
//!
//! Reads single-letter commands from stdin (`p` pause, `r` resume, `i` info,
//! `s`/`q` stop) while a [`TimerController`] counts down and records the session
//! through the API. Ctrl-C stops the timer the same way `s` does.

use std::io::Write;
use std::sync::Arc;

use chrono::Local;
use clap::Subcommand;
use studyplan_core::timer::format_clock;
use studyplan_core::{
    ApiClient, Config, LedgerOp, TimerController, TimerDurations, TimerEvent, TimerMode,
    TimerState,
};
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Subcommand)]
pub enum TimerAction {
    /// Run a focus timer until stopped
    Run {
        /// Subject to record the session under
        #[arg(long)]
        subject: Option<i64>,
        /// Topic to record the session under; its estimate seeds the focus length
        #[arg(long, requires = "subject")]
        topic: Option<i64>,
        /// Focus length in minutes
        #[arg(long)]
        focus: Option<u32>,
        /// Short break length in minutes
        #[arg(long)]
        short_break: Option<u32>,
        /// Long break length in minutes
        #[arg(long)]
        long_break: Option<u32>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Key {
    Pause,
    Resume,
    Info,
    Stop,
}

fn parse_key(line: &str) -> Option<Key> {
    match line.trim().to_ascii_lowercase().as_str() {
        "p" | "pause" => Some(Key::Pause),
        "r" | "resume" => Some(Key::Resume),
        "i" | "info" => Some(Key::Info),
        "s" | "q" | "stop" | "quit" => Some(Key::Stop),
        _ => None,
    }
}

/// One-line message for an event, or `None` for events shown only on the status line.
fn describe(event: &TimerEvent) -> Option<String> {
    let line = match event {
        TimerEvent::FocusStarted { remaining_secs, .. } => {
            format!("Focus started ({})", format_clock(*remaining_secs))
        }
        TimerEvent::Paused { remaining_secs, .. } => {
            format!("Paused at {}", format_clock(*remaining_secs))
        }
        TimerEvent::Resumed { .. } => "Resumed".to_string(),
        TimerEvent::FocusCompleted {
            completed_cycles,
            next,
            remaining_secs,
            ..
        } => format!(
            "Focus #{completed_cycles} complete. {next} for {}",
            format_clock(*remaining_secs)
        ),
        TimerEvent::BreakCompleted { from, .. } => format!("{from} over. Back to focus"),
        TimerEvent::Stopped { .. } => "Timer stopped".to_string(),
        TimerEvent::SessionOpened { session } => format!("Session {} opened", session.id),
        TimerEvent::SessionClosed { session } => format!(
            "Session {} closed ({} min)",
            session.id,
            session.duration_minutes.unwrap_or(0)
        ),
        TimerEvent::SessionOrphaned { session_id } => {
            format!("Session {session_id} opened too late; closing it")
        }
        TimerEvent::LedgerError { op, message } => {
            let what = match op {
                LedgerOp::Start => "open",
                LedgerOp::Stop => "close",
            };
            format!("warning: could not {what} session: {message}")
        }
        TimerEvent::Tick { .. } | TimerEvent::DurationsChanged { .. } => return None,
    };
    Some(line)
}

fn info_line(state: &TimerState) -> String {
    let session = match state.session_id {
        Some(id) => format!("session {id}"),
        None => "no session".to_string(),
    };
    format!(
        "{} {} | {} focus done | {session}",
        state.mode.label(),
        state.clock(),
        state.completed_cycles
    )
}

fn status_line(mode: TimerMode, remaining_secs: i64) -> String {
    format!("\r{:<12}{}  ", mode.label(), format_clock(remaining_secs))
}

fn print_status(mode: TimerMode, remaining_secs: i64) {
    let mut stdout = std::io::stdout();
    let _ = write!(stdout, "{}", status_line(mode, remaining_secs));
    let _ = stdout.flush();
}

fn print_event(line: &str) {
    println!("\r[{}] {line}", Local::now().format("%H:%M"));
}

async fn durations_for(
    api: &ApiClient,
    config: &Config,
    subject: Option<i64>,
    topic: Option<i64>,
    focus: Option<u32>,
) -> Result<TimerDurations, Box<dyn std::error::Error>> {
    let mut durations = config.timer.durations();
    if let Some(minutes) = focus {
        return Ok(durations.with_focus_minutes(minutes));
    }
    if let (Some(subject_id), Some(topic_id)) = (subject, topic) {
        let topics = api.list_topics(subject_id).await?;
        let topic = topics
            .into_iter()
            .find(|t| t.id == topic_id)
            .ok_or_else(|| format!("topic {topic_id} not found under subject {subject_id}"))?;
        durations = durations.for_topic(topic.estimated_minutes);
    }
    Ok(durations)
}

pub async fn run(action: TimerAction, api: ApiClient, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let TimerAction::Run {
        subject,
        topic,
        focus,
        short_break,
        long_break,
    } = action;

    let mut durations = durations_for(&api, config, subject, topic, focus).await?;
    if let Some(minutes) = short_break {
        durations.short_break_secs = i64::from(minutes) * 60;
    }
    if let Some(minutes) = long_break {
        durations.long_break_secs = i64::from(minutes) * 60;
    }

    let (controller, mut events) = TimerController::new(Arc::new(api), durations);
    controller.start_focus(subject, topic).await;
    eprintln!("p = pause, r = resume, i = info, s/q = stop, Ctrl-C = stop");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    loop {
        tokio::select! {
            Some(event) = events.recv() => {
                match &event {
                    TimerEvent::Tick { mode, remaining_secs } => print_status(*mode, *remaining_secs),
                    other => {
                        if let Some(line) = describe(other) {
                            print_event(&line);
                        }
                    }
                }
            }
            line = lines.next_line(), if stdin_open => {
                match line? {
                    Some(line) => match parse_key(&line) {
                        Some(Key::Pause) => {
                            if !controller.pause().await {
                                print_event("Nothing to pause");
                            }
                        }
                        Some(Key::Resume) => {
                            if !controller.resume().await {
                                print_event("Nothing to resume");
                            }
                        }
                        Some(Key::Info) => print_event(&info_line(&controller.state().await)),
                        Some(Key::Stop) => break,
                        None => print_event("Unknown command (p, r, i, s, q)"),
                    },
                    None => stdin_open = false,
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    let closed = controller.stop().await;
    while let Ok(event) = events.try_recv() {
        if let Some(line) = describe(&event) {
            print_event(&line);
        }
    }
    match closed {
        Ok(Some(session)) => {
            println!("{}", serde_json::to_string_pretty(&session)?);
            Ok(())
        }
        Ok(None) => Ok(()),
        Err(e) => Err(e.into()),
    }
}
