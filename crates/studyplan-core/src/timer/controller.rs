//! Async driver for a [`PomodoroTimer`].
//!
//! The controller owns one ticker task that advances the timer once per
//! second, and performs the ledger calls the timer's transitions announce.
//! Ledger calls run as their own tasks so a slow server never stalls the
//! countdown. Events are delivered on an unbounded channel.
//!
//! The ticker handle is only replaced or aborted while the state lock is
//! held, so a `Focus` timer with `running` set always has a live ticker.

use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};

use super::engine::{PomodoroTimer, TimerState};
use super::mode::TimerDurations;
use crate::client::{ClientError, SessionLedger};
use crate::events::{LedgerOp, TimerEvent};
use crate::ledger::{NewSession, StudySession};

const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// How long `stop` waits for an in-flight start request to settle.
pub const START_SETTLE_TIMEOUT: Duration = Duration::from_secs(10);

type Events = mpsc::UnboundedSender<TimerEvent>;

pub struct TimerController {
    state: Arc<Mutex<PomodoroTimer>>,
    ledger: Arc<dyn SessionLedger>,
    events: Events,
    ticker: StdMutex<Option<JoinHandle<()>>>,
    pending_start: StdMutex<Option<JoinHandle<()>>>,
}

impl TimerController {
    pub fn new(
        ledger: Arc<dyn SessionLedger>,
        durations: TimerDurations,
    ) -> (Self, mpsc::UnboundedReceiver<TimerEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        let controller = Self {
            state: Arc::new(Mutex::new(PomodoroTimer::new(durations))),
            ledger,
            events,
            ticker: StdMutex::new(None),
            pending_start: StdMutex::new(None),
        };
        (controller, rx)
    }

    pub async fn state(&self) -> TimerState {
        self.state.lock().await.state()
    }

    /// Start a focus interval and open a ledger session for it in the background.
    ///
    /// Returns `false` if the timer was not idle.
    pub async fn start_focus(&self, subject_id: Option<i64>, topic_id: Option<i64>) -> bool {
        let generation = {
            let mut timer = self.state.lock().await;
            let Some(event) = timer.begin_focus(subject_id, topic_id) else {
                return false;
            };
            emit(&self.events, event);
            self.spawn_ticker();
            timer.generation()
        };

        let state = self.state.clone();
        let ledger = self.ledger.clone();
        let events = self.events.clone();
        let handle = tokio::spawn(async move {
            let request = NewSession::pomodoro(subject_id, topic_id);
            let session = match ledger.start_session(&request).await {
                Ok(session) => session,
                Err(e) => {
                    tracing::warn!(error = %e, "failed to open study session");
                    emit(&events, ledger_error(LedgerOp::Start, &e));
                    return;
                }
            };

            let attached = state.lock().await.attach_session(generation, session.id);
            if attached {
                tracing::info!(session_id = session.id, "study session opened");
                emit(&events, TimerEvent::SessionOpened { session });
                return;
            }

            tracing::warn!(
                session_id = session.id,
                generation,
                "focus interval ended before its session opened; closing it"
            );
            emit(
                &events,
                TimerEvent::SessionOrphaned {
                    session_id: session.id,
                },
            );
            close_session(ledger.as_ref(), &events, session.id).await;
        });
        if let Ok(mut pending) = self.pending_start.lock() {
            *pending = Some(handle);
        }
        true
    }

    pub async fn pause(&self) -> bool {
        let mut timer = self.state.lock().await;
        match timer.pause() {
            Some(event) => {
                self.cancel_ticker();
                emit(&self.events, event);
                true
            }
            None => false,
        }
    }

    pub async fn resume(&self) -> bool {
        let mut timer = self.state.lock().await;
        match timer.resume() {
            Some(event) => {
                emit(&self.events, event);
                self.spawn_ticker();
                true
            }
            None => false,
        }
    }

    /// Stop the timer and close the open session, if any.
    ///
    /// The timer is idle when this returns, even if closing the session failed.
    /// A start request still in flight is given up to [`START_SETTLE_TIMEOUT`]
    /// to come back, so the session it opens is closed before this returns.
    pub async fn stop(&self) -> Result<Option<StudySession>, ClientError> {
        let event = {
            let mut timer = self.state.lock().await;
            let event = timer.stop();
            self.cancel_ticker();
            event
        };
        let session_id = match &event {
            Some(TimerEvent::Stopped { session_id, .. }) => *session_id,
            _ => None,
        };
        if let Some(event) = event {
            emit(&self.events, event);
        }

        let closed = match session_id {
            Some(session_id) => self.close_attached(session_id).await.map(Some),
            None => Ok(None),
        };
        self.settle_pending_start().await;
        closed
    }

    async fn close_attached(&self, session_id: i64) -> Result<StudySession, ClientError> {
        match self.ledger.stop_session(session_id).await {
            Ok(session) => {
                tracing::info!(session_id, duration = ?session.duration_minutes, "study session closed");
                emit(
                    &self.events,
                    TimerEvent::SessionClosed {
                        session: session.clone(),
                    },
                );
                Ok(session)
            }
            Err(e) => {
                tracing::warn!(session_id, error = %e, "failed to close study session");
                emit(&self.events, ledger_error(LedgerOp::Stop, &e));
                Err(e)
            }
        }
    }

    async fn settle_pending_start(&self) {
        let pending = match self.pending_start.lock() {
            Ok(mut pending) => pending.take(),
            Err(_) => None,
        };
        let Some(handle) = pending else {
            return;
        };
        match time::timeout(START_SETTLE_TIMEOUT, handle).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::warn!(error = %e, "session start task failed"),
            Err(_) => tracing::warn!(
                timeout_secs = START_SETTLE_TIMEOUT.as_secs(),
                "gave up waiting for the session start request"
            ),
        }
    }

    /// Swap in new interval lengths. Unless paused, the current interval restarts at its new length.
    pub async fn set_durations(&self, durations: TimerDurations) {
        if let Some(event) = self.state.lock().await.set_durations(durations) {
            emit(&self.events, event);
        }
    }

    fn spawn_ticker(&self) {
        let state = self.state.clone();
        let ledger = self.ledger.clone();
        let events = self.events.clone();

        let handle = tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + TICK_INTERVAL, TICK_INTERVAL);
            loop {
                interval.tick().await;

                let (transition, tick) = {
                    let mut timer = state.lock().await;
                    if !timer.is_running() {
                        break;
                    }
                    let transition = timer.tick();
                    let tick = TimerEvent::Tick {
                        mode: timer.mode(),
                        remaining_secs: timer.remaining_secs(),
                    };
                    (transition, tick)
                };

                let Some(transition) = transition else {
                    emit(&events, tick);
                    continue;
                };
                let closing = match &transition {
                    TimerEvent::FocusCompleted { session_id, .. } => *session_id,
                    _ => None,
                };
                emit(&events, transition);

                if let Some(session_id) = closing {
                    let ledger = ledger.clone();
                    let events = events.clone();
                    tokio::spawn(async move {
                        close_session(ledger.as_ref(), &events, session_id).await;
                    });
                }
            }
        });

        if let Ok(mut ticker) = self.ticker.lock() {
            if let Some(previous) = ticker.replace(handle) {
                previous.abort();
            }
        }
    }

    fn cancel_ticker(&self) {
        if let Ok(mut ticker) = self.ticker.lock() {
            if let Some(handle) = ticker.take() {
                handle.abort();
            }
        }
    }
}

impl Drop for TimerController {
    fn drop(&mut self) {
        self.cancel_ticker();
    }
}

async fn close_session(ledger: &dyn SessionLedger, events: &Events, session_id: i64) {
    match ledger.stop_session(session_id).await {
        Ok(session) => {
            tracing::info!(session_id, duration = ?session.duration_minutes, "study session closed");
            emit(events, TimerEvent::SessionClosed { session });
        }
        Err(e) => {
            tracing::warn!(session_id, error = %e, "failed to close study session");
            emit(events, ledger_error(LedgerOp::Stop, &e));
        }
    }
}

fn ledger_error(op: LedgerOp, err: &ClientError) -> TimerEvent {
    TimerEvent::LedgerError {
        op,
        message: err.to_string(),
    }
}

fn emit(events: &Events, event: TimerEvent) {
    // A dropped receiver just means nobody is listening.
    let _ = events.send(event);
}
