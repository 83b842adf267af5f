use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use studyplan_core::{NewSubject, NewTopic, Subject, Topic};

use crate::error::ApiResult;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/subjects", get(list_subjects).post(create_subject))
        .route("/subjects/{id}", delete(delete_subject))
        .route("/subjects/{id}/topics", get(list_topics).post(create_topic))
}

async fn list_subjects(State(state): State<AppState>) -> ApiResult<Json<Vec<Subject>>> {
    let db = state.db.lock().await;
    Ok(Json(db.list_subjects()?))
}

async fn create_subject(
    State(state): State<AppState>,
    body: Result<Json<NewSubject>, JsonRejection>,
) -> ApiResult<Json<Subject>> {
    let Json(body) = body?;
    let db = state.db.lock().await;
    Ok(Json(db.create_subject(&body)?))
}

async fn delete_subject(
    State(state): State<AppState>,
    subject_id: Result<Path<i64>, PathRejection>,
) -> ApiResult<StatusCode> {
    let Path(subject_id) = subject_id?;
    let db = state.db.lock().await;
    db.delete_subject(subject_id)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_topics(
    State(state): State<AppState>,
    subject_id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Vec<Topic>>> {
    let Path(subject_id) = subject_id?;
    let db = state.db.lock().await;
    Ok(Json(db.list_topics(subject_id)?))
}

async fn create_topic(
    State(state): State<AppState>,
    subject_id: Result<Path<i64>, PathRejection>,
    body: Result<Json<NewTopic>, JsonRejection>,
) -> ApiResult<Json<Topic>> {
    let Path(subject_id) = subject_id?;
    let Json(body) = body?;
    let db = state.db.lock().await;
    Ok(Json(db.create_topic(subject_id, &body)?))
}
