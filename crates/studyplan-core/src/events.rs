use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ledger::StudySession;
use crate::timer::TimerMode;

/// Which ledger call an error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LedgerOp {
    Start,
    Stop,
}

/// Every timer state change produces an event.
/// Front-ends render from these; the timer never prints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TimerEvent {
    FocusStarted {
        generation: u64,
        subject_id: Option<i64>,
        topic_id: Option<i64>,
        remaining_secs: i64,
        at: DateTime<Utc>,
    },
    Paused {
        remaining_secs: i64,
        at: DateTime<Utc>,
    },
    Resumed {
        remaining_secs: i64,
        at: DateTime<Utc>,
    },
    /// One second elapsed without a transition.
    Tick {
        mode: TimerMode,
        remaining_secs: i64,
    },
    /// A focus interval ran out and its break has begun.
    FocusCompleted {
        /// Session that was open for the interval, now being closed.
        session_id: Option<i64>,
        completed_cycles: u32,
        next: TimerMode,
        remaining_secs: i64,
        at: DateTime<Utc>,
    },
    /// A break ran out and the next focus interval has begun.
    BreakCompleted {
        from: TimerMode,
        generation: u64,
        remaining_secs: i64,
        at: DateTime<Utc>,
    },
    Stopped {
        session_id: Option<i64>,
        at: DateTime<Utc>,
    },
    /// Durations changed and `remaining` was re-synced.
    DurationsChanged {
        remaining_secs: i64,
        at: DateTime<Utc>,
    },
    /// The ledger confirmed a start and the session is attached.
    SessionOpened {
        session: StudySession,
    },
    SessionClosed {
        session: StudySession,
    },
    /// A start response arrived for an interval that already ended.
    SessionOrphaned {
        session_id: i64,
    },
    LedgerError {
        op: LedgerOp,
        message: String,
    },
}
