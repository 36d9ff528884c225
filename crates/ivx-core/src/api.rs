//! HTTP client for the remote interview evaluation service.
//!
//! Each operation is a single request/response exchange: no retries, no
//! caching, no local state. Idempotence is the service's responsibility.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Categories of transport errors for consistent error handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiErrorKind {
    /// Request never completed (connection refused, DNS failure, etc.)
    Request,
    /// Non-success HTTP status from the service
    HttpStatus,
    /// Failed to parse the response body
    Parse,
}

impl fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiErrorKind::Request => write!(f, "request"),
            ApiErrorKind::HttpStatus => write!(f, "http_status"),
            ApiErrorKind::Parse => write!(f, "parse"),
        }
    }
}

/// Structured error from the transport layer with kind and details.
#[derive(Debug, Clone)]
pub struct ApiError {
    /// Error category
    pub kind: ApiErrorKind,
    /// One-line summary suitable for display
    pub message: String,
    /// Optional additional details (e.g., raw error body)
    pub details: Option<String>,
}

impl ApiError {
    pub fn new(kind: ApiErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            details: None,
        }
    }

    /// Creates an error from a failed request (no response received).
    pub fn request(err: &reqwest::Error) -> Self {
        Self::new(ApiErrorKind::Request, err.to_string())
    }

    /// Creates an error from a non-success HTTP status.
    ///
    /// The service reports failures as a JSON body with an `error` string
    /// field; that string is surfaced verbatim as the message when present.
    /// Otherwise the message is a generic `HTTP <status>` with the raw body
    /// kept as details.
    pub fn http_status(status: u16, body: &str) -> Self {
        if let Ok(json) = serde_json::from_str::<Value>(body)
            && let Some(msg) = json.get("error").and_then(|v| v.as_str())
        {
            return Self {
                kind: ApiErrorKind::HttpStatus,
                message: msg.to_string(),
                details: Some(body.to_string()),
            };
        }
        Self {
            kind: ApiErrorKind::HttpStatus,
            message: format!("HTTP {status}"),
            details: (!body.is_empty()).then(|| body.to_string()),
        }
    }

    /// Creates an error from an unparseable response body.
    pub fn parse(err: &reqwest::Error) -> Self {
        Self::new(ApiErrorKind::Parse, format!("invalid response: {err}"))
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ApiError {}

/// Result type for transport operations.
pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[derive(Serialize)]
struct StartInterviewRequest<'a> {
    job_role: &'a str,
    candidate_name: Option<&'a str>,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    session_id: &'a str,
    message: &'a str,
}

/// Response to `start-interview`.
#[derive(Debug, Clone, Deserialize)]
pub struct StartResponse {
    pub session_id: String,
    pub job_role: String,
    pub current_round: u32,
    pub round_name: String,
    pub greeting: String,
    pub total_questions: u32,
}

/// Response to `chat`.
///
/// `current_question` is 0-indexed on the wire; conversion to the 1-indexed
/// display value happens in the session state machine, not here.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    pub session_id: String,
    pub ai_message: String,
    pub current_round: u32,
    pub current_question: u32,
    pub total_questions: u32,
    #[serde(default)]
    pub round_complete: bool,
    #[serde(default)]
    pub round_passed: Option<bool>,
    #[serde(default)]
    pub interview_complete: bool,
    #[serde(default)]
    pub round_feedback: Option<String>,
    #[serde(default)]
    pub final_evaluation: Option<FinalEvaluation>,
}

/// Aggregate verdict produced after all rounds (or an early failure).
///
/// Treated as an opaque value: the client renders these fields but never
/// interprets them beyond passthrough.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalEvaluation {
    pub overall_score: f64,
    #[serde(default)]
    pub confidence_score: f64,
    #[serde(default)]
    pub batch: String,
    pub recommendation: String,
    #[serde(default)]
    pub summary: String,
    /// Per-round score breakdown, keyed by round ordinal.
    #[serde(default)]
    pub round_breakdown: BTreeMap<u32, f64>,
}

/// One transcript entry as stored by the service.
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryEntry {
    pub role: String,
    pub content: String,
    #[serde(default)]
    pub timestamp: String,
}

/// Response to `session/{id}/history`.
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryResponse {
    pub session_id: String,
    pub history: Vec<HistoryEntry>,
}

/// Per-round record inside a session snapshot.
#[derive(Debug, Clone, Deserialize)]
pub struct RoundRecord {
    pub round_number: u32,
    pub round_name: String,
    pub status: String,
    #[serde(default)]
    pub round_score: f64,
    #[serde(default)]
    pub passed: bool,
    #[serde(default)]
    pub feedback: String,
}

/// Full session snapshot from `session/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionSnapshot {
    pub session_id: String,
    pub job_role: String,
    #[serde(default)]
    pub candidate_name: Option<String>,
    pub current_round: u32,
    pub current_question: u32,
    pub status: String,
    #[serde(default)]
    pub rounds: BTreeMap<u32, RoundRecord>,
    #[serde(default)]
    pub conversation_history: Vec<HistoryEntry>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub completed_at: Option<String>,
    #[serde(default)]
    pub final_evaluation: Option<FinalEvaluation>,
}

/// Health check response from the service root.
#[derive(Debug, Clone, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    #[serde(default)]
    pub service: String,
}

/// Interview service client.
pub struct InterviewClient {
    http: reqwest::Client,
    base_url: String,
}

impl InterviewClient {
    /// Creates a client for the given API base URL (e.g. `http://localhost:5000/api`).
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Starts a new interview session for the given job role.
    ///
    /// # Errors
    /// Returns an error if the request fails, the service responds with a
    /// non-success status, or the body cannot be parsed.
    pub async fn start(
        &self,
        job_role: &str,
        candidate_name: Option<&str>,
    ) -> ApiResult<StartResponse> {
        let url = format!("{}/start-interview", self.base_url);
        tracing::debug!(%url, job_role, "starting interview");
        let request = StartInterviewRequest {
            job_role,
            candidate_name,
        };
        let response = self
            .http
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| ApiError::request(&e))?;
        Self::parse_json(response).await
    }

    /// Sends one answer in an active session and returns the service's reply.
    ///
    /// # Errors
    /// Returns an error if the request fails, the service responds with a
    /// non-success status, or the body cannot be parsed.
    pub async fn send(&self, session_id: &str, message: &str) -> ApiResult<ChatResponse> {
        let url = format!("{}/chat", self.base_url);
        tracing::debug!(%url, session_id, "sending answer");
        let request = ChatRequest {
            session_id,
            message,
        };
        let response = self
            .http
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| ApiError::request(&e))?;
        Self::parse_json(response).await
    }

    /// Fetches the full session snapshot.
    ///
    /// # Errors
    /// Returns an error if the request fails, the service responds with a
    /// non-success status, or the body cannot be parsed.
    pub async fn fetch_session(&self, session_id: &str) -> ApiResult<SessionSnapshot> {
        let url = format!("{}/session/{session_id}", self.base_url);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| ApiError::request(&e))?;
        Self::parse_json(response).await
    }

    /// Fetches the conversation history for a session.
    ///
    /// # Errors
    /// Returns an error if the request fails, the service responds with a
    /// non-success status, or the body cannot be parsed.
    pub async fn fetch_history(&self, session_id: &str) -> ApiResult<HistoryResponse> {
        let url = format!("{}/session/{session_id}/history", self.base_url);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| ApiError::request(&e))?;
        Self::parse_json(response).await
    }

    /// Checks service health.
    ///
    /// The health endpoint lives at the service root, not under the API
    /// prefix, so any trailing `/api` segment is stripped from the base URL.
    ///
    /// # Errors
    /// Returns an error if the request fails, the service responds with a
    /// non-success status, or the body cannot be parsed.
    pub async fn health(&self) -> ApiResult<HealthResponse> {
        let root = self
            .base_url
            .trim_end_matches('/')
            .trim_end_matches("/api");
        let url = format!("{root}/health");
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| ApiError::request(&e))?;
        Self::parse_json(response).await
    }

    async fn parse_json<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> ApiResult<T> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::http_status(status.as_u16(), &body));
        }
        response.json::<T>().await.map_err(|e| ApiError::parse(&e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Test: the service's `error` field is surfaced verbatim.
    #[test]
    fn test_http_status_extracts_error_field() {
        let err = ApiError::http_status(404, r#"{"error": "Session not found"}"#);
        assert_eq!(err.kind, ApiErrorKind::HttpStatus);
        assert_eq!(err.message, "Session not found");
        assert!(err.details.is_some());
    }

    /// Test: unparseable bodies fall back to a generic status message.
    #[test]
    fn test_http_status_generic_fallback() {
        let err = ApiError::http_status(502, "<html>bad gateway</html>");
        assert_eq!(err.message, "HTTP 502");
        assert_eq!(err.details.as_deref(), Some("<html>bad gateway</html>"));
    }

    /// Test: empty bodies produce no details.
    #[test]
    fn test_http_status_empty_body() {
        let err = ApiError::http_status(500, "");
        assert_eq!(err.message, "HTTP 500");
        assert!(err.details.is_none());
    }

    /// Test: a chat response with only the required fields deserializes.
    #[test]
    fn test_chat_response_minimal() {
        let json = r#"{
            "session_id": "abc",
            "ai_message": "Next question.",
            "current_round": 1,
            "current_question": 2,
            "total_questions": 4,
            "round_complete": false
        }"#;
        let resp: ChatResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.current_question, 2);
        assert!(!resp.interview_complete);
        assert!(resp.round_passed.is_none());
        assert!(resp.final_evaluation.is_none());
    }

    /// Test: a final evaluation payload round-trips with its breakdown map.
    #[test]
    fn test_final_evaluation_breakdown() {
        let json = r#"{
            "overall_score": 78.5,
            "confidence_score": 74.2,
            "batch": "B",
            "recommendation": "HIRE",
            "summary": "Good fit.",
            "round_breakdown": {"1": 80.0, "2": 75.0, "3": 81.0}
        }"#;
        let eval: FinalEvaluation = serde_json::from_str(json).unwrap();
        assert_eq!(eval.round_breakdown.len(), 3);
        assert_eq!(eval.round_breakdown[&2], 75.0);
    }
}
