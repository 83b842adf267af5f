//! # Studyplan Core Library
//!
//! Business logic shared by the studyplan REST server and terminal client.
//!
//! ## Architecture
//!
//! - **Session ledger**: start/stop records for timed study intervals,
//!   persisted in SQLite alongside subjects and topics
//! - **Reporting**: filtered listings and aggregate stats over the ledger
//! - **Timer**: a pure Pomodoro state machine plus an async controller that
//!   ticks it and talks to the ledger over HTTP
//! - **Configuration**: TOML settings for server, timer and client
//!
//! ## Key Components
//!
//! - [`Database`]: Ledger and catalog persistence
//! - [`PomodoroTimer`]: Timer state machine
//! - [`TimerController`]: Ticking, ledger-aware timer driver
//! - [`ApiClient`]: HTTP client implementing [`SessionLedger`]
//! - [`Config`]: Application configuration management

pub mod catalog;
pub mod client;
pub mod error;
pub mod events;
pub mod ledger;
pub mod reporting;
pub mod storage;
pub mod timer;
pub mod timestamp;

pub use catalog::{NewSubject, NewTopic, Subject, Topic, TopicUpdate};
pub use client::{ApiClient, ClientError, SessionLedger};
pub use error::{ConfigError, CoreError, DatabaseError, ValidationError};
pub use events::{LedgerOp, TimerEvent};
pub use ledger::{NewSession, StopSession, StudySession};
pub use reporting::{SessionFilter, SessionStats};
pub use storage::{Config, Database};
pub use timer::{PomodoroTimer, TimerController, TimerDurations, TimerMode, TimerState};
