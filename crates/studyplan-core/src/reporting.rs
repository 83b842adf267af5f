//! Read-side queries over the session ledger.
//!
//! Filters are conjunctive. An absent field places no constraint. `from` and
//! `to` bound `start_time` inclusively and are compared as strings, so callers
//! should pass timestamps in the ledger's own format (or a date prefix).
//! A bare date sorts before every timestamp on that day, so as a `to` bound
//! it excludes the day itself.

use rusqlite::types::Value;
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionFilter {
    #[serde(default, deserialize_with = "deserialize_id")]
    pub subject_id: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_id")]
    pub topic_id: Option<i64>,
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
}

impl SessionFilter {
    pub fn subject(mut self, subject_id: i64) -> Self {
        self.subject_id = Some(subject_id);
        self
    }

    pub fn topic(mut self, topic_id: i64) -> Self {
        self.topic_id = Some(topic_id);
        self
    }

    pub fn from(mut self, from: impl Into<String>) -> Self {
        self.from = Some(from.into());
        self
    }

    pub fn to(mut self, to: impl Into<String>) -> Self {
        self.to = Some(to.into());
        self
    }

    /// Build a `WHERE` clause (empty when unconstrained) and its positional params.
    pub(crate) fn where_clause(&self) -> (String, Vec<Value>) {
        let mut conditions = Vec::new();
        let mut params = Vec::new();

        if let Some(subject_id) = self.subject_id {
            conditions.push("subject_id = ?");
            params.push(Value::Integer(subject_id));
        }
        if let Some(topic_id) = self.topic_id {
            conditions.push("topic_id = ?");
            params.push(Value::Integer(topic_id));
        }
        if let Some(from) = non_blank(&self.from) {
            conditions.push("start_time >= ?");
            params.push(Value::Text(from.to_string()));
        }
        if let Some(to) = non_blank(&self.to) {
            conditions.push("start_time <= ?");
            params.push(Value::Text(to.to_string()));
        }

        if conditions.is_empty() {
            (String::new(), params)
        } else {
            (format!(" WHERE {}", conditions.join(" AND ")), params)
        }
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Query strings carry ids as text, and `?subject_id=` means no constraint.
fn deserialize_id<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Int(i64),
        Text(String),
    }

    match Option::<Id>::deserialize(d)? {
        Some(Id::Int(id)) => Ok(Some(id)),
        Some(Id::Text(text)) if text.trim().is_empty() => Ok(None),
        Some(Id::Text(text)) => text
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("invalid id: {text:?}"))),
        None => Ok(None),
    }
}

/// Aggregate view over the sessions matching a filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStats {
    pub total_sessions: u64,
    pub open_sessions: u64,
    pub closed_sessions: u64,
    pub total_minutes: i64,
}
