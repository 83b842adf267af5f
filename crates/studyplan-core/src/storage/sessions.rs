//! Session ledger and reporting queries.

use chrono::{DateTime, Utc};
use rusqlite::{params, params_from_iter, OptionalExtension, Row};

use super::database::{optional_timestamp_column, timestamp_column, Database};
use crate::error::{CoreError, DatabaseError, Result};
use crate::ledger::{duration_minutes, NewSession, StudySession};
use crate::reporting::{SessionFilter, SessionStats};
use crate::timestamp;

const SESSION_COLUMNS: &str = "id, user_id, subject_id, topic_id, start_time, end_time, \
     duration_minutes, type, created_at";

fn row_to_session(row: &Row<'_>) -> rusqlite::Result<StudySession> {
    Ok(StudySession {
        id: row.get(0)?,
        user_id: row.get(1)?,
        subject_id: row.get(2)?,
        topic_id: row.get(3)?,
        start_time: timestamp_column(row, 4)?,
        end_time: optional_timestamp_column(row, 5)?,
        duration_minutes: row.get(6)?,
        kind: row.get(7)?,
        created_at: timestamp_column(row, 8)?,
    })
}

impl Database {
    /// Open a new session stamped with the current server time.
    ///
    /// # Errors
    /// Returns an error if the insert fails.
    pub fn start_session(&self, request: &NewSession) -> Result<StudySession> {
        self.start_session_at(request, timestamp::now())
    }

    /// Open a new session with an explicit start time.
    pub fn start_session_at(
        &self,
        request: &NewSession,
        started_at: DateTime<Utc>,
    ) -> Result<StudySession> {
        let started = timestamp::format(&started_at);
        self.conn()
            .execute(
                "INSERT INTO study_sessions (user_id, subject_id, topic_id, start_time, type, created_at)
                 VALUES (NULL, ?1, ?2, ?3, ?4, ?5)",
                params![
                    request.subject_id,
                    request.topic_id,
                    started,
                    request.kind_or_default(),
                    started,
                ],
            )
            .map_err(DatabaseError::from)?;

        let id = self.conn().last_insert_rowid();
        tracing::info!(
            session_id = id,
            subject_id = ?request.subject_id,
            topic_id = ?request.topic_id,
            "session started"
        );
        self.get_session(id)?
            .ok_or_else(|| DatabaseError::QueryFailed(format!("session {id} missing after insert")).into())
    }

    /// Close a session at the current server time.
    ///
    /// A session that is already closed is closed again: its end time and
    /// duration are recomputed from now.
    ///
    /// # Errors
    /// Returns [`CoreError::NotFound`] if no session has this id.
    pub fn stop_session(&self, session_id: i64) -> Result<StudySession> {
        self.stop_session_at(session_id, timestamp::now())
    }

    /// Close a session with an explicit end time.
    pub fn stop_session_at(&self, session_id: i64, ended_at: DateTime<Utc>) -> Result<StudySession> {
        let tx = self.conn().unchecked_transaction().map_err(DatabaseError::from)?;

        let existing: Option<(String, Option<String>)> = tx
            .query_row(
                "SELECT start_time, end_time FROM study_sessions WHERE id = ?1",
                params![session_id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()
            .map_err(DatabaseError::from)?;
        let Some((started_at, previous_end)) = existing else {
            return Err(CoreError::not_found("session", session_id));
        };
        let started_at = timestamp::parse(&started_at).map_err(|e| DatabaseError::CorruptValue {
            column: "start_time",
            message: e.to_string(),
        })?;

        if let Some(previous_end) = previous_end {
            tracing::warn!(session_id, %previous_end, "stopping a session that is already closed");
        }

        let minutes = duration_minutes(started_at, ended_at);
        tx.execute(
            "UPDATE study_sessions SET end_time = ?1, duration_minutes = ?2 WHERE id = ?3",
            params![timestamp::format(&ended_at), minutes, session_id],
        )
        .map_err(DatabaseError::from)?;
        tx.commit().map_err(DatabaseError::from)?;

        tracing::info!(session_id, duration_minutes = minutes, "session stopped");
        self.get_session(session_id)?
            .ok_or_else(|| CoreError::not_found("session", session_id))
    }

    pub fn get_session(&self, session_id: i64) -> Result<Option<StudySession>> {
        let sql = format!("SELECT {SESSION_COLUMNS} FROM study_sessions WHERE id = ?1");
        let session = self
            .conn()
            .query_row(&sql, params![session_id], row_to_session)
            .optional()
            .map_err(DatabaseError::from)?;
        Ok(session)
    }

    /// Sessions matching `filter`, newest start first.
    pub fn list_sessions(&self, filter: &SessionFilter) -> Result<Vec<StudySession>> {
        let (clause, values) = filter.where_clause();
        let sql = format!(
            "SELECT {SESSION_COLUMNS} FROM study_sessions{clause} ORDER BY start_time DESC, id DESC"
        );
        let mut stmt = self.conn().prepare(&sql).map_err(DatabaseError::from)?;
        let rows = stmt
            .query_map(params_from_iter(values), row_to_session)
            .map_err(DatabaseError::from)?;

        let mut sessions = Vec::new();
        for row in rows {
            sessions.push(row.map_err(DatabaseError::from)?);
        }
        Ok(sessions)
    }

    /// Counts and total recorded minutes for the sessions matching `filter`.
    pub fn session_stats(&self, filter: &SessionFilter) -> Result<SessionStats> {
        let (clause, values) = filter.where_clause();
        let sql = format!(
            "SELECT COUNT(*),
                    COALESCE(SUM(CASE WHEN end_time IS NULL THEN 1 ELSE 0 END), 0),
                    COALESCE(SUM(duration_minutes), 0)
             FROM study_sessions{clause}"
        );
        let (total, open, minutes) = self
            .conn()
            .query_row(&sql, params_from_iter(values), |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, i64>(2)?,
                ))
            })
            .map_err(DatabaseError::from)?;

        let total = total.max(0) as u64;
        let open = open.max(0) as u64;
        Ok(SessionStats {
            total_sessions: total,
            open_sessions: open,
            closed_sessions: total.saturating_sub(open),
            total_minutes: minutes,
        })
    }
}
