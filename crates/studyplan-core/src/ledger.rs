//! Study session records.
//!
//! A session is open while `end_time` and `duration_minutes` are both unset
//! and closed once both are set. The store only ever writes them together.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timestamp;

/// Activity tag used when a start request does not name one.
pub const DEFAULT_SESSION_TYPE: &str = "pomodoro";

const MS_PER_MINUTE: i64 = 60_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudySession {
    pub id: i64,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub subject_id: Option<i64>,
    #[serde(default)]
    pub topic_id: Option<i64>,
    #[serde(with = "timestamp::iso")]
    pub start_time: DateTime<Utc>,
    #[serde(default, with = "timestamp::iso_opt")]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub duration_minutes: Option<i64>,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(with = "timestamp::iso")]
    pub created_at: DateTime<Utc>,
}

impl StudySession {
    pub fn is_open(&self) -> bool {
        self.end_time.is_none()
    }
}

/// Body of a start request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSession {
    #[serde(default)]
    pub subject_id: Option<i64>,
    #[serde(default)]
    pub topic_id: Option<i64>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl NewSession {
    pub fn pomodoro(subject_id: Option<i64>, topic_id: Option<i64>) -> Self {
        Self {
            subject_id,
            topic_id,
            kind: Some(DEFAULT_SESSION_TYPE.to_string()),
        }
    }

    /// The activity tag to store, falling back to [`DEFAULT_SESSION_TYPE`]
    /// when absent or blank.
    pub fn kind_or_default(&self) -> &str {
        match self.kind.as_deref().map(str::trim) {
            Some(kind) if !kind.is_empty() => kind,
            _ => DEFAULT_SESSION_TYPE,
        }
    }
}

/// Body of a stop request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StopSession {
    #[serde(default)]
    pub session_id: Option<i64>,
}

/// Whole minutes between `start` and `end`, half a minute rounding up.
///
/// A clock that went backwards yields 0 rather than a negative duration.
pub fn duration_minutes(start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
    let elapsed_ms = (end - start).num_milliseconds();
    if elapsed_ms <= 0 {
        return 0;
    }
    (elapsed_ms + MS_PER_MINUTE / 2) / MS_PER_MINUTE
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use proptest::prelude::*;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 18, 9, 0, 0).unwrap() + Duration::seconds(secs)
    }

    #[test]
    fn duration_rounds_half_up() {
        assert_eq!(duration_minutes(at(0), at(29)), 0);
        assert_eq!(duration_minutes(at(0), at(30)), 1);
        assert_eq!(duration_minutes(at(0), at(89)), 1);
        assert_eq!(duration_minutes(at(0), at(90)), 2);
        assert_eq!(duration_minutes(at(0), at(25 * 60)), 25);
    }

    #[test]
    fn duration_clamps_backwards_clock() {
        assert_eq!(duration_minutes(at(600), at(0)), 0);
    }

    #[test]
    fn kind_defaults_to_pomodoro() {
        assert_eq!(NewSession::default().kind_or_default(), "pomodoro");
        let blank = NewSession {
            kind: Some("  ".into()),
            ..Default::default()
        };
        assert_eq!(blank.kind_or_default(), "pomodoro");
        let review = NewSession {
            kind: Some("review".into()),
            ..Default::default()
        };
        assert_eq!(review.kind_or_default(), "review");
    }

    #[test]
    fn session_json_shape() {
        let session = StudySession {
            id: 7,
            user_id: None,
            subject_id: Some(1),
            topic_id: None,
            start_time: at(0),
            end_time: None,
            duration_minutes: None,
            kind: "pomodoro".into(),
            created_at: at(0),
        };
        let json = serde_json::to_value(&session).unwrap();
        assert_eq!(json["type"], "pomodoro");
        assert_eq!(json["start_time"], "2026-10-18T09:00:00.000Z");
        assert!(json["end_time"].is_null());
        assert!(json["duration_minutes"].is_null());
        assert!(json["user_id"].is_null());
        assert!(session.is_open());
    }

    proptest! {
        #[test]
        fn duration_is_never_negative(start in -1_000_000i64..1_000_000, end in -1_000_000i64..1_000_000) {
            prop_assert!(duration_minutes(at(start), at(end)) >= 0);
        }

        #[test]
        fn duration_matches_rounded_minutes(secs in 0i64..1_000_000) {
            let expected = ((secs as f64) / 60.0).round() as i64;
            prop_assert_eq!(duration_minutes(at(0), at(secs)), expected);
        }
    }
}
