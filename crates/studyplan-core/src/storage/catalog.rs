//! Subject and topic CRUD.

use rusqlite::{params, OptionalExtension, Row};

use super::database::{timestamp_column, Database};
use crate::catalog::{
    validate_minutes, NewSubject, NewTopic, Subject, Topic, TopicUpdate,
    DEFAULT_SUBJECT_PRIORITY,
};
use crate::error::{CoreError, DatabaseError, Result, ValidationError};
use crate::timestamp;

fn row_to_subject(row: &Row<'_>) -> rusqlite::Result<Subject> {
    Ok(Subject {
        id: row.get(0)?,
        name: row.get(1)?,
        priority: row.get(2)?,
        color: row.get(3)?,
        created_at: timestamp_column(row, 4)?,
    })
}

fn row_to_topic(row: &Row<'_>) -> rusqlite::Result<Topic> {
    Ok(Topic {
        id: row.get(0)?,
        subject_id: row.get(1)?,
        title: row.get(2)?,
        estimated_minutes: row.get(3)?,
        completed: row.get::<_, i64>(4)? != 0,
        created_at: timestamp_column(row, 5)?,
    })
}

impl Database {
    pub fn list_subjects(&self) -> Result<Vec<Subject>> {
        let mut stmt = self
            .conn()
            .prepare("SELECT id, name, priority, color, created_at FROM subjects ORDER BY id")
            .map_err(DatabaseError::from)?;
        let rows = stmt
            .query_map([], row_to_subject)
            .map_err(DatabaseError::from)?;
        let mut subjects = Vec::new();
        for row in rows {
            subjects.push(row.map_err(DatabaseError::from)?);
        }
        Ok(subjects)
    }

    pub fn get_subject(&self, subject_id: i64) -> Result<Option<Subject>> {
        let subject = self
            .conn()
            .query_row(
                "SELECT id, name, priority, color, created_at FROM subjects WHERE id = ?1",
                params![subject_id],
                row_to_subject,
            )
            .optional()
            .map_err(DatabaseError::from)?;
        Ok(subject)
    }

    /// # Errors
    /// Returns a validation error if the name is missing or blank.
    pub fn create_subject(&self, request: &NewSubject) -> Result<Subject> {
        let name = request.validated_name()?;
        let priority = request.priority.unwrap_or(DEFAULT_SUBJECT_PRIORITY);
        self.conn()
            .execute(
                "INSERT INTO subjects (name, priority, color, created_at) VALUES (?1, ?2, ?3, ?4)",
                params![name, priority, request.color, timestamp::format(&timestamp::now())],
            )
            .map_err(DatabaseError::from)?;
        let id = self.conn().last_insert_rowid();
        tracing::info!(subject_id = id, %name, "subject created");
        self.get_subject(id)?
            .ok_or_else(|| CoreError::not_found("subject", id))
    }

    /// Delete a subject together with its topics.
    ///
    /// Sessions that reference the subject are left untouched.
    pub fn delete_subject(&self, subject_id: i64) -> Result<()> {
        let tx = self.conn().unchecked_transaction().map_err(DatabaseError::from)?;
        tx.execute("DELETE FROM topics WHERE subject_id = ?1", params![subject_id])
            .map_err(DatabaseError::from)?;
        let removed = tx
            .execute("DELETE FROM subjects WHERE id = ?1", params![subject_id])
            .map_err(DatabaseError::from)?;
        if removed == 0 {
            return Err(CoreError::not_found("subject", subject_id));
        }
        tx.commit().map_err(DatabaseError::from)?;
        tracing::info!(subject_id, "subject deleted");
        Ok(())
    }

    /// Topics of a subject in creation order.
    ///
    /// # Errors
    /// Returns [`CoreError::NotFound`] if the subject does not exist.
    pub fn list_topics(&self, subject_id: i64) -> Result<Vec<Topic>> {
        self.require_subject(subject_id)?;
        let mut stmt = self
            .conn()
            .prepare(
                "SELECT id, subject_id, title, estimated_minutes, completed, created_at
                 FROM topics WHERE subject_id = ?1 ORDER BY id",
            )
            .map_err(DatabaseError::from)?;
        let rows = stmt
            .query_map(params![subject_id], row_to_topic)
            .map_err(DatabaseError::from)?;
        let mut topics = Vec::new();
        for row in rows {
            topics.push(row.map_err(DatabaseError::from)?);
        }
        Ok(topics)
    }

    pub fn get_topic(&self, topic_id: i64) -> Result<Option<Topic>> {
        let topic = self
            .conn()
            .query_row(
                "SELECT id, subject_id, title, estimated_minutes, completed, created_at
                 FROM topics WHERE id = ?1",
                params![topic_id],
                row_to_topic,
            )
            .optional()
            .map_err(DatabaseError::from)?;
        Ok(topic)
    }

    pub fn create_topic(&self, subject_id: i64, request: &NewTopic) -> Result<Topic> {
        let title = request.validated_title()?;
        let minutes = request.estimated_minutes_or_default()?;
        self.require_subject(subject_id)?;

        self.conn()
            .execute(
                "INSERT INTO topics (subject_id, title, estimated_minutes, completed, created_at)
                 VALUES (?1, ?2, ?3, 0, ?4)",
                params![subject_id, title, minutes, timestamp::format(&timestamp::now())],
            )
            .map_err(DatabaseError::from)?;
        let id = self.conn().last_insert_rowid();
        tracing::info!(topic_id = id, subject_id, "topic created");
        self.get_topic(id)?.ok_or_else(|| CoreError::not_found("topic", id))
    }

    /// Apply the fields present in `update` and return the stored topic.
    pub fn update_topic(&self, topic_id: i64, update: &TopicUpdate) -> Result<Topic> {
        let mut topic = self
            .get_topic(topic_id)?
            .ok_or_else(|| CoreError::not_found("topic", topic_id))?;

        if let Some(title) = update.title.as_deref() {
            let title = title.trim();
            if title.is_empty() {
                return Err(ValidationError::MissingField("title").into());
            }
            topic.title = title.to_string();
        }
        if let Some(minutes) = update.estimated_minutes {
            topic.estimated_minutes = validate_minutes(minutes)?;
        }
        if let Some(completed) = update.completed {
            topic.completed = completed;
        }

        self.conn()
            .execute(
                "UPDATE topics SET title = ?1, estimated_minutes = ?2, completed = ?3 WHERE id = ?4",
                params![
                    topic.title,
                    topic.estimated_minutes,
                    i64::from(topic.completed),
                    topic_id
                ],
            )
            .map_err(DatabaseError::from)?;
        Ok(topic)
    }

    pub fn delete_topic(&self, topic_id: i64) -> Result<()> {
        let removed = self
            .conn()
            .execute("DELETE FROM topics WHERE id = ?1", params![topic_id])
            .map_err(DatabaseError::from)?;
        if removed == 0 {
            return Err(CoreError::not_found("topic", topic_id));
        }
        Ok(())
    }

    fn require_subject(&self, subject_id: i64) -> Result<()> {
        match self.get_subject(subject_id)? {
            Some(_) => Ok(()),
            None => Err(CoreError::not_found("subject", subject_id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn db() -> Database {
        Database::open_in_memory().unwrap()
    }

    #[test]
    fn create_and_list_subjects() {
        let db = db();
        let math = db.create_subject(&NewSubject::named("Math")).unwrap();
        assert_eq!(math.priority, 1);
        assert!(math.color.is_none());
        let bio = db
            .create_subject(&NewSubject {
                name: Some("Biology".into()),
                priority: Some(3),
                color: Some("#ff7777".into()),
            })
            .unwrap();
        let names: Vec<String> = db.list_subjects().unwrap().into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["Math", "Biology"]);
        assert_eq!(bio.color.as_deref(), Some("#ff7777"));
    }

    #[test]
    fn subject_requires_name() {
        let err = db().create_subject(&NewSubject::default()).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn deleting_subject_cascades_topics() {
        let db = db();
        let subject = db.create_subject(&NewSubject::named("History")).unwrap();
        let topic = db.create_topic(subject.id, &NewTopic::titled("Rome")).unwrap();
        db.delete_subject(subject.id).unwrap();
        assert!(db.get_topic(topic.id).unwrap().is_none());
        assert!(db.delete_subject(subject.id).unwrap_err().is_not_found());
    }

    #[test]
    fn topics_need_an_existing_subject() {
        let db = db();
        let err = db.create_topic(404, &NewTopic::titled("Orphan")).unwrap_err();
        assert!(err.is_not_found());
        assert!(db.list_topics(404).unwrap_err().is_not_found());
    }

    #[test]
    fn update_topic_applies_present_fields() {
        let db = db();
        let subject = db.create_subject(&NewSubject::named("Physics")).unwrap();
        let topic = db.create_topic(subject.id, &NewTopic::titled("Optics")).unwrap();
        assert_eq!(topic.estimated_minutes, 30);
        assert!(!topic.completed);

        let updated = db
            .update_topic(
                topic.id,
                &TopicUpdate {
                    completed: Some(true),
                    ..Default::default()
                },
            )
            .unwrap();
        assert!(updated.completed);
        assert_eq!(updated.title, "Optics");

        let renamed = db
            .update_topic(
                topic.id,
                &TopicUpdate {
                    title: Some("Wave optics".into()),
                    estimated_minutes: Some(45),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(renamed.title, "Wave optics");
        assert_eq!(renamed.estimated_minutes, 45);
        assert!(renamed.completed);
        assert_eq!(db.get_topic(topic.id).unwrap().unwrap(), renamed);
    }

    #[test]
    fn update_and_delete_missing_topic() {
        let db = db();
        assert!(db
            .update_topic(9, &TopicUpdate::default())
            .unwrap_err()
            .is_not_found());
        assert!(db.delete_topic(9).unwrap_err().is_not_found());
    }
}
