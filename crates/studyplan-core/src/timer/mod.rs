mod controller;
mod engine;
mod mode;

pub use controller::{TimerController, START_SETTLE_TIMEOUT};
pub use engine::{PomodoroTimer, TimerState};
pub use mode::{
    format_clock, TimerDurations, TimerMode, MAX_TOPIC_FOCUS_MINUTES, MIN_TOPIC_FOCUS_MINUTES,
};
