use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    routing::{get, post},
    Json, Router,
};
use studyplan_core::{NewSession, SessionFilter, SessionStats, StopSession, StudySession};

use crate::error::{ApiError, ApiResult};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/sessions", get(list_sessions))
        .route("/sessions/stats", get(session_stats))
        .route("/sessions/start", post(start_session))
        .route("/sessions/stop", post(stop_session))
}

async fn start_session(
    State(state): State<AppState>,
    body: Result<Json<NewSession>, JsonRejection>,
) -> ApiResult<Json<StudySession>> {
    let Json(body) = body?;
    let db = state.db.lock().await;
    Ok(Json(db.start_session(&body)?))
}

async fn stop_session(
    State(state): State<AppState>,
    body: Result<Json<StopSession>, JsonRejection>,
) -> ApiResult<Json<StudySession>> {
    let Json(body) = body?;
    let session_id = body.session_id.ok_or_else(|| ApiError::missing("session_id"))?;
    let db = state.db.lock().await;
    Ok(Json(db.stop_session(session_id)?))
}

async fn list_sessions(
    State(state): State<AppState>,
    filter: Result<Query<SessionFilter>, QueryRejection>,
) -> ApiResult<Json<Vec<StudySession>>> {
    let Query(filter) = filter?;
    let db = state.db.lock().await;
    Ok(Json(db.list_sessions(&filter)?))
}

async fn session_stats(
    State(state): State<AppState>,
    filter: Result<Query<SessionFilter>, QueryRejection>,
) -> ApiResult<Json<SessionStats>> {
    let Query(filter) = filter?;
    let db = state.db.lock().await;
    Ok(Json(db.session_stats(&filter)?))
}
