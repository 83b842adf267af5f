//! HTTP client for the studyplan REST API.
//!
//! [`SessionLedger`] is the narrow seam the timer controller depends on;
//! [`ApiClient`] implements it over HTTP and also exposes the reporting and
//! catalog endpoints for the terminal client.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::catalog::{NewSubject, NewTopic, Subject, Topic, TopicUpdate};
use crate::ledger::{NewSession, StopSession, StudySession};
use crate::reporting::{SessionFilter, SessionStats};

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Invalid API URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Server returned {status}: {message}")]
    Status { status: u16, message: String },
}

/// Server-side session bookkeeping used by the timer.
#[async_trait]
pub trait SessionLedger: Send + Sync {
    async fn start_session(&self, request: &NewSession) -> Result<StudySession, ClientError>;
    async fn stop_session(&self, session_id: i64) -> Result<StudySession, ClientError>;
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// Client for the REST API rooted at e.g. `http://localhost:4000/api`.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    http_client: Client,
}

impl ApiClient {
    /// # Errors
    /// Returns [`ClientError::InvalidUrl`] if `base_url` is not an http(s) URL.
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let parsed = Url::parse(base_url).map_err(|e| ClientError::InvalidUrl {
            url: base_url.to_string(),
            message: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ClientError::InvalidUrl {
                url: base_url.to_string(),
                message: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http_client: Client::new(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn execute(&self, request: RequestBuilder) -> Result<Response, ClientError> {
        let resp = request.send().await?;
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let text = resp.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&text)
            .map(|body| body.error)
            .unwrap_or(text);
        tracing::debug!(status = status.as_u16(), %message, "API request failed");
        Err(match status {
            StatusCode::NOT_FOUND => ClientError::NotFound(message),
            StatusCode::BAD_REQUEST => ClientError::BadRequest(message),
            other => ClientError::Status {
                status: other.as_u16(),
                message,
            },
        })
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ClientError> {
        Ok(self.execute(request).await?.json().await?)
    }

    async fn send_empty(&self, request: RequestBuilder) -> Result<(), ClientError> {
        self.execute(request).await.map(|_| ())
    }

    pub async fn list_sessions(&self, filter: &SessionFilter) -> Result<Vec<StudySession>, ClientError> {
        self.send(self.http_client.get(self.url("sessions")).query(filter))
            .await
    }

    pub async fn session_stats(&self, filter: &SessionFilter) -> Result<SessionStats, ClientError> {
        self.send(self.http_client.get(self.url("sessions/stats")).query(filter))
            .await
    }

    pub async fn list_subjects(&self) -> Result<Vec<Subject>, ClientError> {
        self.send(self.http_client.get(self.url("subjects"))).await
    }

    pub async fn create_subject(&self, request: &NewSubject) -> Result<Subject, ClientError> {
        self.send(self.http_client.post(self.url("subjects")).json(request))
            .await
    }

    pub async fn delete_subject(&self, subject_id: i64) -> Result<(), ClientError> {
        self.send_empty(
            self.http_client
                .delete(self.url(&format!("subjects/{subject_id}"))),
        )
        .await
    }

    pub async fn list_topics(&self, subject_id: i64) -> Result<Vec<Topic>, ClientError> {
        self.send(
            self.http_client
                .get(self.url(&format!("subjects/{subject_id}/topics"))),
        )
        .await
    }

    pub async fn create_topic(&self, subject_id: i64, request: &NewTopic) -> Result<Topic, ClientError> {
        self.send(
            self.http_client
                .post(self.url(&format!("subjects/{subject_id}/topics")))
                .json(request),
        )
        .await
    }

    pub async fn update_topic(&self, topic_id: i64, update: &TopicUpdate) -> Result<Topic, ClientError> {
        self.send(
            self.http_client
                .put(self.url(&format!("topics/{topic_id}")))
                .json(update),
        )
        .await
    }

    pub async fn delete_topic(&self, topic_id: i64) -> Result<(), ClientError> {
        self.send_empty(self.http_client.delete(self.url(&format!("topics/{topic_id}"))))
            .await
    }
}

#[async_trait]
impl SessionLedger for ApiClient {
    async fn start_session(&self, request: &NewSession) -> Result<StudySession, ClientError> {
        self.send(self.http_client.post(self.url("sessions/start")).json(request))
            .await
    }

    async fn stop_session(&self, session_id: i64) -> Result<StudySession, ClientError> {
        let body = StopSession {
            session_id: Some(session_id),
        };
        self.send(self.http_client.post(self.url("sessions/stop")).json(&body))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_bad_urls() {
        assert!(matches!(
            ApiClient::new("not a url"),
            Err(ClientError::InvalidUrl { .. })
        ));
        assert!(matches!(
            ApiClient::new("ftp://example.com/api"),
            Err(ClientError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn url_joins_without_double_slashes() {
        let client = ApiClient::new("http://localhost:4000/api/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:4000/api");
        assert_eq!(client.url("/sessions/start"), "http://localhost:4000/api/sessions/start");
        assert_eq!(client.url("subjects"), "http://localhost:4000/api/subjects");
    }
}
