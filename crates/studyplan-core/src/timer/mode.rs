use serde::{Deserialize, Serialize};

/// Bounds applied when a topic's estimate seeds the focus length.
pub const MIN_TOPIC_FOCUS_MINUTES: i64 = 5;
pub const MAX_TOPIC_FOCUS_MINUTES: i64 = 55;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerMode {
    Idle,
    Focus,
    Paused,
    ShortBreak,
    LongBreak,
}

impl TimerMode {
    pub fn label(self) -> &'static str {
        match self {
            TimerMode::Idle => "Idle",
            TimerMode::Focus => "Focus",
            TimerMode::Paused => "Paused",
            TimerMode::ShortBreak => "Short break",
            TimerMode::LongBreak => "Long break",
        }
    }
}

impl std::fmt::Display for TimerMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Interval lengths in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerDurations {
    pub focus_secs: i64,
    pub short_break_secs: i64,
    pub long_break_secs: i64,
    /// A long break follows every Nth completed focus interval.
    pub cycles_before_long_break: u32,
}

impl Default for TimerDurations {
    fn default() -> Self {
        Self::from_minutes(25, 5, 15, 4)
    }
}

impl TimerDurations {
    pub fn from_minutes(focus: u32, short_break: u32, long_break: u32, cycles: u32) -> Self {
        Self {
            focus_secs: i64::from(focus) * 60,
            short_break_secs: i64::from(short_break) * 60,
            long_break_secs: i64::from(long_break) * 60,
            cycles_before_long_break: cycles.max(1),
        }
    }

    pub fn with_focus_minutes(mut self, minutes: u32) -> Self {
        self.focus_secs = i64::from(minutes) * 60;
        self
    }

    /// Use a topic's estimate as the focus length, clamped to 5..=55 minutes.
    pub fn for_topic(mut self, estimated_minutes: i64) -> Self {
        let minutes = estimated_minutes.clamp(MIN_TOPIC_FOCUS_MINUTES, MAX_TOPIC_FOCUS_MINUTES);
        self.focus_secs = minutes * 60;
        self
    }

    /// Full length of `mode`. Idle and paused report the focus length.
    pub fn secs_for(&self, mode: TimerMode) -> i64 {
        match mode {
            TimerMode::Idle | TimerMode::Focus | TimerMode::Paused => self.focus_secs,
            TimerMode::ShortBreak => self.short_break_secs,
            TimerMode::LongBreak => self.long_break_secs,
        }
    }

    /// Break that follows the `completed_cycles`-th focus interval.
    pub fn break_after(&self, completed_cycles: u32) -> TimerMode {
        if completed_cycles > 0 && completed_cycles % self.cycles_before_long_break == 0 {
            TimerMode::LongBreak
        } else {
            TimerMode::ShortBreak
        }
    }
}

/// Render seconds as zero-padded `MM:SS`; negative values show as `00:00`.
pub fn format_clock(remaining_secs: i64) -> String {
    let secs = remaining_secs.max(0);
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_classic_pomodoro() {
        let d = TimerDurations::default();
        assert_eq!(d.focus_secs, 1500);
        assert_eq!(d.short_break_secs, 300);
        assert_eq!(d.long_break_secs, 900);
        assert_eq!(d.cycles_before_long_break, 4);
    }

    #[test]
    fn topic_estimate_is_clamped() {
        let d = TimerDurations::default();
        assert_eq!(d.for_topic(2).focus_secs, 5 * 60);
        assert_eq!(d.for_topic(30).focus_secs, 30 * 60);
        assert_eq!(d.for_topic(90).focus_secs, 55 * 60);
    }

    #[test]
    fn every_fourth_cycle_is_long() {
        let d = TimerDurations::default();
        let breaks: Vec<TimerMode> = (1..=8).map(|c| d.break_after(c)).collect();
        assert_eq!(breaks[3], TimerMode::LongBreak);
        assert_eq!(breaks[7], TimerMode::LongBreak);
        assert_eq!(
            breaks.iter().filter(|m| **m == TimerMode::ShortBreak).count(),
            6
        );
    }

    #[test]
    fn zero_cycles_means_every_break_is_long() {
        let d = TimerDurations::from_minutes(25, 5, 15, 0);
        assert_eq!(d.cycles_before_long_break, 1);
        assert_eq!(d.break_after(1), TimerMode::LongBreak);
    }

    #[test]
    fn clock_formatting() {
        assert_eq!(format_clock(1500), "25:00");
        assert_eq!(format_clock(65), "01:05");
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(-3), "00:00");
        assert_eq!(format_clock(100 * 60), "100:00");
    }

    #[test]
    fn mode_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&TimerMode::ShortBreak).unwrap(),
            "\"short_break\""
        );
    }
}
