//! Subjects and the topics studied under them.
//!
//! The timer only references these by id; they carry no timing state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ValidationError;
use crate::timestamp;

pub const DEFAULT_SUBJECT_PRIORITY: i64 = 1;
pub const DEFAULT_ESTIMATED_MINUTES: i64 = 30;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub id: i64,
    pub name: String,
    pub priority: i64,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(with = "timestamp::iso")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewSubject {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub priority: Option<i64>,
    #[serde(default)]
    pub color: Option<String>,
}

impl NewSubject {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    /// Trimmed name, or a validation error when missing or blank.
    pub fn validated_name(&self) -> Result<String, ValidationError> {
        required_text(&self.name, "name")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    pub id: i64,
    pub subject_id: i64,
    pub title: String,
    pub estimated_minutes: i64,
    pub completed: bool,
    #[serde(with = "timestamp::iso")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewTopic {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub estimated_minutes: Option<i64>,
}

impl NewTopic {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Default::default()
        }
    }

    pub fn validated_title(&self) -> Result<String, ValidationError> {
        required_text(&self.title, "title")
    }

    pub fn estimated_minutes_or_default(&self) -> Result<i64, ValidationError> {
        validate_minutes(self.estimated_minutes.unwrap_or(DEFAULT_ESTIMATED_MINUTES))
    }
}

/// Partial update; absent fields keep their stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TopicUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_minutes: Option<i64>,
    #[serde(
        default,
        deserialize_with = "deserialize_flag",
        skip_serializing_if = "Option::is_none"
    )]
    pub completed: Option<bool>,
}

impl TopicUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.estimated_minutes.is_none() && self.completed.is_none()
    }
}

fn required_text(value: &Option<String>, field: &'static str) -> Result<String, ValidationError> {
    match value.as_deref().map(str::trim) {
        Some(text) if !text.is_empty() => Ok(text.to_string()),
        _ => Err(ValidationError::MissingField(field)),
    }
}

pub(crate) fn validate_minutes(minutes: i64) -> Result<i64, ValidationError> {
    if minutes < 0 {
        return Err(ValidationError::InvalidValue {
            field: "estimated_minutes",
            message: format!("must not be negative, got {minutes}"),
        });
    }
    Ok(minutes)
}

/// Accepts `true`/`false` as well as the `0`/`1` integers older clients send.
fn deserialize_flag<'de, D: Deserializer<'de>>(d: D) -> Result<Option<bool>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
    }

    Ok(match Option::<Flag>::deserialize(d)? {
        Some(Flag::Bool(b)) => Some(b),
        Some(Flag::Int(i)) => Some(i != 0),
        None => None,
    })
}
