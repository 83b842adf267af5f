use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    routing::put,
    Json, Router,
};
use studyplan_core::{Topic, TopicUpdate};

use crate::error::ApiResult;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/topics/{id}", put(update_topic).delete(delete_topic))
}

async fn update_topic(
    State(state): State<AppState>,
    topic_id: Result<Path<i64>, PathRejection>,
    body: Result<Json<TopicUpdate>, JsonRejection>,
) -> ApiResult<Json<Topic>> {
    let Path(topic_id) = topic_id?;
    let Json(body) = body?;
    let db = state.db.lock().await;
    Ok(Json(db.update_topic(topic_id, &body)?))
}

async fn delete_topic(
    State(state): State<AppState>,
    topic_id: Result<Path<i64>, PathRejection>,
) -> ApiResult<StatusCode> {
    let Path(topic_id) = topic_id?;
    let db = state.db.lock().await;
    db.delete_topic(topic_id)?;
    Ok(StatusCode::NO_CONTENT)
}
