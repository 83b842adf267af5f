//! Pomodoro timer state machine.
//!
//! The timer is a pure, synchronous state machine with no internal thread.
//! The caller drives it by calling `tick()` once per second while it runs
//! and performs the ledger calls announced by the returned events.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Focus <-> Paused
//!         Focus -> ShortBreak | LongBreak -> Focus -> ...
//! (any) -> Idle on stop
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut timer = PomodoroTimer::new(TimerDurations::default());
//! timer.begin_focus(Some(subject_id), None);
//! // Once per second:
//! timer.tick(); // Returns Some(Event) when an interval completes
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::mode::{format_clock, TimerDurations, TimerMode};
use crate::events::TimerEvent;

/// Point-in-time view of a timer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerState {
    pub mode: TimerMode,
    pub remaining_secs: i64,
    pub running: bool,
    pub completed_cycles: u32,
    /// Open ledger session for the current focus interval.
    pub session_id: Option<i64>,
    pub subject_id: Option<i64>,
    pub topic_id: Option<i64>,
    pub generation: u64,
}

impl TimerState {
    pub fn clock(&self) -> String {
        format_clock(self.remaining_secs)
    }
}

#[derive(Debug, Clone)]
pub struct PomodoroTimer {
    durations: TimerDurations,
    mode: TimerMode,
    remaining_secs: i64,
    running: bool,
    completed_cycles: u32,
    session_id: Option<i64>,
    subject_id: Option<i64>,
    topic_id: Option<i64>,
    /// Bumped for every new focus interval and on stop.
    generation: u64,
}

impl PomodoroTimer {
    /// Create an idle timer showing the full focus length.
    pub fn new(durations: TimerDurations) -> Self {
        Self {
            durations,
            mode: TimerMode::Idle,
            remaining_secs: durations.focus_secs,
            running: false,
            completed_cycles: 0,
            session_id: None,
            subject_id: None,
            topic_id: None,
            generation: 0,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn mode(&self) -> TimerMode {
        self.mode
    }

    pub fn remaining_secs(&self) -> i64 {
        self.remaining_secs
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn completed_cycles(&self) -> u32 {
        self.completed_cycles
    }

    pub fn session_id(&self) -> Option<i64> {
        self.session_id
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn durations(&self) -> TimerDurations {
        self.durations
    }

    pub fn state(&self) -> TimerState {
        TimerState {
            mode: self.mode,
            remaining_secs: self.remaining_secs,
            running: self.running,
            completed_cycles: self.completed_cycles,
            session_id: self.session_id,
            subject_id: self.subject_id,
            topic_id: self.topic_id,
            generation: self.generation,
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start a focus interval from idle.
    ///
    /// The caller opens a ledger session and hands the id back through
    /// [`attach_session`](Self::attach_session) with the returned generation.
    pub fn begin_focus(&mut self, subject_id: Option<i64>, topic_id: Option<i64>) -> Option<TimerEvent> {
        if self.mode != TimerMode::Idle {
            return None;
        }
        self.generation += 1;
        self.mode = TimerMode::Focus;
        self.running = true;
        self.remaining_secs = self.durations.focus_secs;
        self.session_id = None;
        self.subject_id = subject_id;
        self.topic_id = topic_id;
        Some(TimerEvent::FocusStarted {
            generation: self.generation,
            subject_id,
            topic_id,
            remaining_secs: self.remaining_secs,
            at: Utc::now(),
        })
    }

    /// Attach an opened session to the focus interval identified by `generation`.
    ///
    /// Returns `false` when the interval has already ended (or already has a
    /// session); the caller must then close the orphan.
    pub fn attach_session(&mut self, generation: u64, session_id: i64) -> bool {
        let in_focus = matches!(self.mode, TimerMode::Focus | TimerMode::Paused);
        if generation != self.generation || !in_focus || self.session_id.is_some() {
            return false;
        }
        self.session_id = Some(session_id);
        true
    }

    pub fn pause(&mut self) -> Option<TimerEvent> {
        if self.mode != TimerMode::Focus {
            return None;
        }
        self.mode = TimerMode::Paused;
        self.running = false;
        Some(TimerEvent::Paused {
            remaining_secs: self.remaining_secs,
            at: Utc::now(),
        })
    }

    pub fn resume(&mut self) -> Option<TimerEvent> {
        if self.mode != TimerMode::Paused {
            return None;
        }
        self.mode = TimerMode::Focus;
        self.running = true;
        Some(TimerEvent::Resumed {
            remaining_secs: self.remaining_secs,
            at: Utc::now(),
        })
    }

    /// Return to idle, handing back the session that must be closed.
    ///
    /// Stop while idle is a no-op.
    pub fn stop(&mut self) -> Option<TimerEvent> {
        if self.mode == TimerMode::Idle {
            return None;
        }
        let session_id = self.session_id.take();
        self.mode = TimerMode::Idle;
        self.running = false;
        self.remaining_secs = self.durations.focus_secs;
        self.completed_cycles = 0;
        self.generation += 1;
        Some(TimerEvent::Stopped {
            session_id,
            at: Utc::now(),
        })
    }

    /// Advance one second. Returns an event only when an interval completes.
    pub fn tick(&mut self) -> Option<TimerEvent> {
        if !self.running {
            return None;
        }
        self.remaining_secs -= 1;
        if self.remaining_secs > 0 {
            return None;
        }
        match self.mode {
            TimerMode::Focus => Some(self.complete_focus()),
            TimerMode::ShortBreak | TimerMode::LongBreak => Some(self.complete_break()),
            TimerMode::Idle | TimerMode::Paused => None,
        }
    }

    /// Replace the interval lengths.
    ///
    /// `remaining` is re-synced to the new length of the current mode,
    /// except while paused.
    pub fn set_durations(&mut self, durations: TimerDurations) -> Option<TimerEvent> {
        self.durations = durations;
        if self.mode == TimerMode::Paused {
            return None;
        }
        self.remaining_secs = durations.secs_for(self.mode);
        Some(TimerEvent::DurationsChanged {
            remaining_secs: self.remaining_secs,
            at: Utc::now(),
        })
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn complete_focus(&mut self) -> TimerEvent {
        let session_id = self.session_id.take();
        self.completed_cycles += 1;
        let next = self.durations.break_after(self.completed_cycles);
        self.mode = next;
        self.remaining_secs = self.durations.secs_for(next);
        TimerEvent::FocusCompleted {
            session_id,
            completed_cycles: self.completed_cycles,
            next,
            remaining_secs: self.remaining_secs,
            at: Utc::now(),
        }
    }

    // The follow-up focus interval does not open a ledger session.
    fn complete_break(&mut self) -> TimerEvent {
        let from = self.mode;
        self.generation += 1;
        self.mode = TimerMode::Focus;
        self.remaining_secs = self.durations.focus_secs;
        TimerEvent::BreakCompleted {
            from,
            generation: self.generation,
            remaining_secs: self.remaining_secs,
            at: Utc::now(),
        }
    }
}

impl Default for PomodoroTimer {
    fn default() -> Self {
        Self::new(TimerDurations::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_secs(timer: &mut PomodoroTimer, secs: i64) -> Vec<TimerEvent> {
        (0..secs).filter_map(|_| timer.tick()).collect()
    }

    #[test]
    fn new_timer_is_idle_at_focus_length() {
        let timer = PomodoroTimer::default();
        assert_eq!(timer.mode(), TimerMode::Idle);
        assert_eq!(timer.remaining_secs(), 1500);
        assert!(!timer.is_running());
        assert!(timer.state().session_id.is_none());
        assert_eq!(timer.state().clock(), "25:00");
    }

    #[test]
    fn focus_runs_into_short_break() {
        let mut timer = PomodoroTimer::default();
        timer.begin_focus(Some(1), Some(2)).unwrap();
        assert_eq!(timer.remaining_secs(), 1500);

        let events = run_secs(&mut timer, 1499);
        assert!(events.is_empty());
        assert_eq!(timer.mode(), TimerMode::Focus);

        let event = timer.tick().unwrap();
        assert!(matches!(
            event,
            TimerEvent::FocusCompleted {
                completed_cycles: 1,
                next: TimerMode::ShortBreak,
                remaining_secs: 300,
                ..
            }
        ));
        assert_eq!(timer.mode(), TimerMode::ShortBreak);
        assert_eq!(timer.completed_cycles(), 1);
        assert_eq!(timer.remaining_secs(), 300);
        assert!(timer.is_running());
    }

    #[test]
    fn fourth_focus_earns_long_break() {
        let mut timer = PomodoroTimer::default();
        timer.begin_focus(None, None);
        for _ in 0..3 {
            run_secs(&mut timer, 1500);
            assert_eq!(timer.mode(), TimerMode::ShortBreak);
            run_secs(&mut timer, 300);
            assert_eq!(timer.mode(), TimerMode::Focus);
        }
        run_secs(&mut timer, 1500);
        assert_eq!(timer.mode(), TimerMode::LongBreak);
        assert_eq!(timer.remaining_secs(), 900);
        assert_eq!(timer.completed_cycles(), 4);
    }

    #[test]
    fn completion_fires_once_per_interval() {
        let mut timer = PomodoroTimer::default();
        timer.begin_focus(None, None);
        let events = run_secs(&mut timer, 1500 + 300);
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], TimerEvent::FocusCompleted { .. }));
        assert!(matches!(
            events[1],
            TimerEvent::BreakCompleted {
                from: TimerMode::ShortBreak,
                remaining_secs: 1500,
                ..
            }
        ));
    }

    #[test]
    fn focus_completion_hands_back_the_session() {
        let mut timer = PomodoroTimer::default();
        timer.begin_focus(None, None);
        assert!(timer.attach_session(timer.generation(), 42));
        let events = run_secs(&mut timer, 1500);
        assert!(matches!(
            events[0],
            TimerEvent::FocusCompleted {
                session_id: Some(42),
                ..
            }
        ));
        assert!(timer.session_id().is_none());
    }

    #[test]
    fn focus_after_break_has_no_session() {
        let mut timer = PomodoroTimer::default();
        timer.begin_focus(None, None);
        timer.attach_session(timer.generation(), 7);
        run_secs(&mut timer, 1500 + 300);
        assert_eq!(timer.mode(), TimerMode::Focus);
        assert!(timer.session_id().is_none());
    }

    #[test]
    fn stop_resets_and_returns_session() {
        let mut timer = PomodoroTimer::default();
        timer.begin_focus(None, None);
        timer.attach_session(timer.generation(), 9);
        run_secs(&mut timer, 60);

        let event = timer.stop().unwrap();
        assert!(matches!(event, TimerEvent::Stopped { session_id: Some(9), .. }));
        assert_eq!(timer.mode(), TimerMode::Idle);
        assert_eq!(timer.remaining_secs(), 1500);
        assert_eq!(timer.completed_cycles(), 0);
        assert!(timer.session_id().is_none());
        assert!(!timer.is_running());
    }

    #[test]
    fn stop_while_idle_is_noop() {
        let mut timer = PomodoroTimer::default();
        let before = timer.state();
        assert!(timer.stop().is_none());
        assert_eq!(timer.state(), before);
    }

    #[test]
    fn stop_during_break_resets_cycles() {
        let mut timer = PomodoroTimer::default();
        timer.begin_focus(None, None);
        run_secs(&mut timer, 1500);
        assert_eq!(timer.completed_cycles(), 1);
        let event = timer.stop().unwrap();
        assert!(matches!(event, TimerEvent::Stopped { session_id: None, .. }));
        assert_eq!(timer.completed_cycles(), 0);
    }

    #[test]
    fn pause_and_resume_only_from_matching_modes() {
        let mut timer = PomodoroTimer::default();
        assert!(timer.pause().is_none());
        assert!(timer.resume().is_none());

        timer.begin_focus(None, None);
        run_secs(&mut timer, 10);
        assert!(timer.resume().is_none());
        assert!(timer.pause().is_some());
        assert_eq!(timer.mode(), TimerMode::Paused);

        // Paused timers do not count down.
        assert!(run_secs(&mut timer, 100).is_empty());
        assert_eq!(timer.remaining_secs(), 1490);

        assert!(timer.pause().is_none());
        assert!(timer.resume().is_some());
        assert_eq!(timer.mode(), TimerMode::Focus);
        assert_eq!(timer.remaining_secs(), 1490);
    }

    #[test]
    fn pause_during_break_is_noop() {
        let mut timer = PomodoroTimer::default();
        timer.begin_focus(None, None);
        run_secs(&mut timer, 1500);
        assert!(timer.pause().is_none());
        assert_eq!(timer.mode(), TimerMode::ShortBreak);
    }

    #[test]
    fn begin_focus_requires_idle() {
        let mut timer = PomodoroTimer::default();
        assert!(timer.begin_focus(None, None).is_some());
        let generation = timer.generation();
        assert!(timer.begin_focus(Some(1), None).is_none());
        assert_eq!(timer.generation(), generation);
    }

    #[test]
    fn stale_start_is_not_attached() {
        let mut timer = PomodoroTimer::default();
        timer.begin_focus(None, None);
        let generation = timer.generation();
        timer.stop();
        assert!(!timer.attach_session(generation, 5));

        timer.begin_focus(None, None);
        assert!(!timer.attach_session(generation, 5));
        assert!(timer.attach_session(timer.generation(), 6));
        assert!(!timer.attach_session(timer.generation(), 7));
        assert_eq!(timer.session_id(), Some(6));
    }

    #[test]
    fn attach_while_paused_is_accepted() {
        let mut timer = PomodoroTimer::default();
        timer.begin_focus(None, None);
        timer.pause();
        assert!(timer.attach_session(timer.generation(), 3));
        assert_eq!(timer.session_id(), Some(3));
    }

    #[test]
    fn set_durations_resyncs_remaining() {
        let mut timer = PomodoroTimer::default();
        timer.set_durations(TimerDurations::default().with_focus_minutes(50));
        assert_eq!(timer.remaining_secs(), 3000);

        timer.begin_focus(None, None);
        run_secs(&mut timer, 3000);
        assert_eq!(timer.mode(), TimerMode::ShortBreak);
        timer.set_durations(TimerDurations::from_minutes(50, 10, 20, 4));
        assert_eq!(timer.remaining_secs(), 600);
    }

    #[test]
    fn set_durations_keeps_paused_remaining() {
        let mut timer = PomodoroTimer::default();
        timer.begin_focus(None, None);
        run_secs(&mut timer, 30);
        timer.pause();
        assert!(timer
            .set_durations(TimerDurations::default().with_focus_minutes(10))
            .is_none());
        assert_eq!(timer.remaining_secs(), 1470);
        assert_eq!(timer.durations().focus_secs, 600);
    }
}
