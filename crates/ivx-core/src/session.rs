//! Interview session state machine.
//!
//! [`InterviewSession`] owns all mutable interview state: session identity,
//! round/question progression, the message transcript, and completion/failure
//! outcomes. Consumers hold it directly (or behind `&mut`) and read state
//! between operations; there is no ambient/global session.
//!
//! Operations take `&mut self` and complete before any other mutation can
//! begin, so a `reset` can never interleave with an in-flight call. As a
//! second guard, `chat` responses addressed to a different session id are
//! discarded instead of committed.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::api::{ApiError, ChatResponse, FinalEvaluation, InterviewClient, StartResponse};
use crate::rounds::{self, RoundSpec};

/// Fixed transcript notice inserted when sending an answer fails.
pub const SEND_FAILURE_NOTICE: &str =
    "Sorry, there was an error processing your message. Please try again.";

/// Author of a transcript message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    User,
    Assistant,
}

/// One transcript entry.
///
/// The transcript is append-only: entries are never reordered, rewritten, or
/// deduplicated, and ids increase by exactly 1 per entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    /// Sequence id, 1-indexed and gapless within a session.
    pub id: u64,
    pub sender: Sender,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    /// Round ordinal this message belongs to.
    pub round: u32,
    /// True only for locally synthesized failure notices.
    pub is_error: bool,
    /// True while the optimistic user insert awaits server confirmation.
    pub pending: bool,
}

/// Lifecycle phase of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// No session.
    #[default]
    Idle,
    /// A start request is in flight.
    Starting,
    /// Session established, answering questions.
    Active,
    /// Terminal: all rounds done or a round failed.
    Complete,
}

/// Outcome of the current round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RoundOutcome {
    #[default]
    Pending,
    Passed,
    Failed,
}

impl RoundOutcome {
    pub fn is_terminal(self) -> bool {
        !matches!(self, RoundOutcome::Pending)
    }
}

/// Errors surfaced by session operations.
///
/// Validation variants are rejected before any network call and leave state
/// untouched. `Api` wraps a transport failure that has already been absorbed
/// into the session (error field or error-flagged transcript notice) and is
/// re-raised for optional handling by the caller.
#[derive(Debug)]
pub enum SessionError {
    EmptyJobRole,
    EmptyAnswer,
    NotActive,
    AwaitingResponse,
    /// The service answered for a different session id; nothing was committed.
    StaleResponse,
    Api(ApiError),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::EmptyJobRole => write!(f, "job role must not be empty"),
            SessionError::EmptyAnswer => write!(f, "answer must not be empty"),
            SessionError::NotActive => write!(f, "no active interview session"),
            SessionError::AwaitingResponse => {
                write!(f, "a previous answer is still being processed")
            }
            SessionError::StaleResponse => {
                write!(f, "discarded a response addressed to a different session")
            }
            SessionError::Api(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SessionError::Api(e) => Some(e),
            _ => None,
        }
    }
}

/// The interview session state machine.
///
/// Fields are public for display surfaces to read; surfaces mutate state only
/// through [`start`](Self::start), [`submit_answer`](Self::submit_answer) and
/// [`reset`](Self::reset).
#[derive(Debug, Clone, PartialEq)]
pub struct InterviewSession {
    pub phase: Phase,

    /// Opaque token issued by the service; `Some` from a successful start
    /// until `reset`.
    pub session_id: Option<String>,
    pub job_role: String,
    pub candidate_name: Option<String>,

    /// Active round ordinal, mirrored from the service. Always 1..=3.
    pub current_round: u32,
    /// Current question ordinal, 1-indexed for display. The wire carries a
    /// 0-indexed value; the conversion happens once, at commit.
    pub current_question: u32,
    pub total_questions: u32,
    pub round_name: String,

    pub messages: Vec<Message>,
    /// True while a send is in flight; callers must not submit while set.
    pub awaiting_response: bool,
    /// Message of the most recent failure, if any.
    pub last_error: Option<String>,

    pub round_outcome: RoundOutcome,
    pub round_feedback: Option<String>,
    pub final_evaluation: Option<FinalEvaluation>,
}

impl Default for InterviewSession {
    fn default() -> Self {
        Self {
            phase: Phase::Idle,
            session_id: None,
            job_role: String::new(),
            candidate_name: None,
            current_round: 1,
            current_question: 0,
            total_questions: 0,
            round_name: rounds::get(1).name.to_string(),
            messages: Vec::new(),
            awaiting_response: false,
            last_error: None,
            round_outcome: RoundOutcome::Pending,
            round_feedback: None,
            final_evaluation: None,
        }
    }
}

impl InterviewSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// True once the interview has reached its terminal state.
    pub fn interview_complete(&self) -> bool {
        self.phase == Phase::Complete
    }

    /// Catalog metadata for the active round.
    pub fn round_info(&self) -> &'static RoundSpec {
        rounds::get(self.current_round)
    }

    /// Starts a new interview session for `job_role`.
    ///
    /// Any prior session state is fully cleared first. On success the session
    /// id, round data and the assistant greeting (sequence id 1) are committed
    /// together and the session becomes active. On failure nothing is
    /// committed: the session returns to idle with only `last_error` set.
    ///
    /// # Errors
    /// [`SessionError::EmptyJobRole`] if `job_role` is empty after trimming
    /// (state untouched), or [`SessionError::Api`] if the transport call
    /// fails.
    pub async fn start(
        &mut self,
        client: &InterviewClient,
        job_role: &str,
        candidate_name: Option<&str>,
    ) -> Result<(), SessionError> {
        let role = job_role.trim();
        if role.is_empty() {
            return Err(SessionError::EmptyJobRole);
        }

        *self = Self::default();
        self.phase = Phase::Starting;

        match client.start(role, candidate_name).await {
            Ok(resp) => {
                self.commit_start(candidate_name, resp);
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to start interview");
                self.phase = Phase::Idle;
                self.last_error = Some(e.to_string());
                Err(SessionError::Api(e))
            }
        }
    }

    /// Submits one answer in the active session.
    ///
    /// The user message is appended optimistically (marked pending) before
    /// the network call and stays committed whatever the outcome. On success
    /// it is finalized and the assistant reply plus the server's round,
    /// question and outcome data are committed. On failure it is finalized,
    /// an error-flagged notice is appended, round/progress state is left
    /// untouched and the failure is re-raised.
    ///
    /// # Errors
    /// Validation errors ([`SessionError::NotActive`],
    /// [`SessionError::EmptyAnswer`], [`SessionError::AwaitingResponse`])
    /// leave state untouched; [`SessionError::Api`] and
    /// [`SessionError::StaleResponse`] are absorbed into the transcript
    /// before being returned.
    pub async fn submit_answer(
        &mut self,
        client: &InterviewClient,
        text: &str,
    ) -> Result<(), SessionError> {
        if self.phase != Phase::Active {
            return Err(SessionError::NotActive);
        }
        if self.awaiting_response {
            return Err(SessionError::AwaitingResponse);
        }
        let text = text.trim();
        if text.is_empty() {
            return Err(SessionError::EmptyAnswer);
        }
        let Some(session_id) = self.session_id.clone() else {
            return Err(SessionError::NotActive);
        };

        // Preconditions passed: any earlier failure is no longer current.
        self.last_error = None;

        // Phase 1: optimistic insert, confirmed or error-annotated below.
        let id = self.next_seq();
        self.messages.push(Message {
            id,
            sender: Sender::User,
            text: text.to_string(),
            timestamp: Utc::now(),
            round: self.current_round,
            is_error: false,
            pending: true,
        });
        self.awaiting_response = true;

        let result = client.send(&session_id, text).await;
        self.awaiting_response = false;

        match result {
            Ok(resp) if resp.session_id == session_id => {
                self.commit_answer(resp);
                Ok(())
            }
            Ok(resp) => {
                tracing::warn!(
                    expected = %session_id,
                    got = %resp.session_id,
                    "discarding chat response for a different session"
                );
                self.record_send_failure(&SessionError::StaleResponse.to_string());
                Err(SessionError::StaleResponse)
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to send answer");
                self.record_send_failure(&e.to_string());
                Err(SessionError::Api(e))
            }
        }
    }

    /// Returns every field to its idle default. Always succeeds.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    fn commit_start(&mut self, candidate_name: Option<&str>, resp: StartResponse) {
        self.session_id = Some(resp.session_id);
        self.job_role = resp.job_role;
        self.candidate_name = candidate_name.map(str::to_string);
        self.current_round = rounds::get(resp.current_round).ordinal;
        self.round_name = resp.round_name;
        self.total_questions = resp.total_questions;
        self.current_question = 1;
        self.messages.push(Message {
            id: 1,
            sender: Sender::Assistant,
            text: resp.greeting,
            timestamp: Utc::now(),
            round: self.current_round,
            is_error: false,
            pending: false,
        });
        self.phase = Phase::Active;
        tracing::debug!(round = self.current_round, "interview session started");
    }

    fn commit_answer(&mut self, resp: ChatResponse) {
        self.finalize_pending();

        // Keep the 1..=3 invariant even against a misbehaving server: an
        // out-of-range ordinal collapses to the catalog fallback.
        let round = rounds::get(resp.current_round).ordinal;
        if round != resp.current_round {
            tracing::warn!(
                got = resp.current_round,
                using = round,
                "service sent an out-of-range round ordinal"
            );
        }

        let id = self.next_seq();
        self.messages.push(Message {
            id,
            sender: Sender::Assistant,
            text: resp.ai_message,
            timestamp: Utc::now(),
            round,
            is_error: false,
            pending: false,
        });

        self.current_round = round;
        self.round_name = rounds::get(round).name.to_string();
        // Wire value is 0-indexed; stored value is 1-indexed for display.
        self.current_question = resp.current_question + 1;
        self.total_questions = resp.total_questions;

        if resp.round_complete {
            self.round_outcome = match resp.round_passed {
                Some(false) => RoundOutcome::Failed,
                _ => RoundOutcome::Passed,
            };
            if resp.round_feedback.is_some() {
                self.round_feedback = resp.round_feedback;
            }
        } else {
            // A new round (or the next question) is underway.
            self.round_outcome = RoundOutcome::Pending;
        }

        // A failed round terminates the interview regardless of ordinal.
        if resp.interview_complete || self.round_outcome == RoundOutcome::Failed {
            self.phase = Phase::Complete;
            if self.final_evaluation.is_none() {
                self.final_evaluation = resp.final_evaluation;
            }
        }
    }

    /// Finalizes the optimistic user insert and appends an error-flagged
    /// assistant notice. Round, progress and outcome fields stay untouched.
    fn record_send_failure(&mut self, error: &str) {
        self.finalize_pending();
        let id = self.next_seq();
        self.messages.push(Message {
            id,
            sender: Sender::Assistant,
            text: SEND_FAILURE_NOTICE.to_string(),
            timestamp: Utc::now(),
            round: self.current_round,
            is_error: true,
            pending: false,
        });
        self.last_error = Some(error.to_string());
    }

    fn finalize_pending(&mut self) {
        if let Some(last) = self.messages.last_mut()
            && last.pending
        {
            last.pending = false;
        }
    }

    /// Next message sequence id. The transcript is append-only, so ids stay
    /// strictly increasing and gapless.
    fn next_seq(&self) -> u64 {
        self.messages.len() as u64 + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn started_session() -> InterviewSession {
        let mut session = InterviewSession::new();
        session.phase = Phase::Starting;
        session.commit_start(
            Some("Dana"),
            StartResponse {
                session_id: "sess-1".to_string(),
                job_role: "Backend Engineer".to_string(),
                current_round: 1,
                round_name: "Screening Round".to_string(),
                greeting: "Welcome! First question...".to_string(),
                total_questions: 4,
            },
        );
        session
    }

    fn chat_response(round: u32, question: u32) -> ChatResponse {
        ChatResponse {
            session_id: "sess-1".to_string(),
            ai_message: "Noted. Next question...".to_string(),
            current_round: round,
            current_question: question,
            total_questions: 4,
            round_complete: false,
            round_passed: None,
            interview_complete: false,
            round_feedback: None,
            final_evaluation: None,
        }
    }

    fn push_user_answer(session: &mut InterviewSession, text: &str) {
        let id = session.next_seq();
        session.messages.push(Message {
            id,
            sender: Sender::User,
            text: text.to_string(),
            timestamp: Utc::now(),
            round: session.current_round,
            is_error: false,
            pending: true,
        });
    }

    #[test]
    fn test_start_commit_seeds_greeting() {
        let session = started_session();
        assert_eq!(session.phase, Phase::Active);
        assert_eq!(session.session_id.as_deref(), Some("sess-1"));
        assert_eq!(session.current_round, 1);
        assert_eq!(session.current_question, 1);
        assert_eq!(session.messages.len(), 1);
        assert_eq!(session.messages[0].id, 1);
        assert_eq!(session.messages[0].sender, Sender::Assistant);
        assert!(!session.interview_complete());
    }

    #[test]
    fn test_sequence_ids_are_gapless() {
        let mut session = started_session();
        push_user_answer(&mut session, "I have 5 years experience");
        session.commit_answer(chat_response(1, 1));
        push_user_answer(&mut session, "Mostly distributed systems");
        session.commit_answer(chat_response(1, 2));

        let ids: Vec<u64> = session.messages.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_commit_answer_converts_question_index() {
        let mut session = started_session();
        push_user_answer(&mut session, "answer");
        session.commit_answer(chat_response(1, 2));
        // Wire 0-indexed 2 becomes display 3.
        assert_eq!(session.current_question, 3);
        assert!(!session.messages.iter().any(|m| m.pending));
    }

    #[test]
    fn test_round_passed_advances() {
        let mut session = started_session();
        push_user_answer(&mut session, "final screening answer");
        let mut resp = chat_response(2, 0);
        resp.round_complete = true;
        resp.round_passed = Some(true);
        resp.round_feedback = Some("Strong screening performance.".to_string());
        session.commit_answer(resp);

        assert_eq!(session.round_outcome, RoundOutcome::Passed);
        assert_eq!(session.current_round, 2);
        assert_eq!(session.round_name, "Technical Round");
        assert_eq!(session.messages.len(), 3);
        assert!(!session.interview_complete());
    }

    #[test]
    fn test_round_failed_is_terminal_without_evaluation() {
        let mut session = started_session();
        push_user_answer(&mut session, "weak answer");
        let mut resp = chat_response(1, 3);
        resp.round_complete = true;
        resp.round_passed = Some(false);
        resp.round_feedback = Some("Did not meet the bar.".to_string());
        session.commit_answer(resp);

        assert_eq!(session.round_outcome, RoundOutcome::Failed);
        assert!(session.interview_complete());
        assert!(session.final_evaluation.is_none());
    }

    #[test]
    fn test_final_evaluation_not_overwritten() {
        let mut session = started_session();
        push_user_answer(&mut session, "final answer");
        let mut resp = chat_response(3, 2);
        resp.round_complete = true;
        resp.round_passed = Some(true);
        resp.interview_complete = true;
        resp.final_evaluation = Some(FinalEvaluation {
            overall_score: 82.0,
            confidence_score: 80.0,
            batch: "A".to_string(),
            recommendation: "STRONG HIRE".to_string(),
            summary: "Excellent.".to_string(),
            round_breakdown: std::collections::BTreeMap::new(),
        });
        session.commit_answer(resp);
        assert!(session.interview_complete());

        let committed = session.final_evaluation.clone().unwrap();
        let mut late = chat_response(3, 2);
        late.interview_complete = true;
        late.final_evaluation = Some(FinalEvaluation {
            overall_score: 10.0,
            confidence_score: 10.0,
            batch: "D".to_string(),
            recommendation: "NO HIRE".to_string(),
            summary: "Late duplicate.".to_string(),
            round_breakdown: std::collections::BTreeMap::new(),
        });
        session.commit_answer(late);

        assert_eq!(session.final_evaluation.unwrap(), committed);
    }

    #[test]
    fn test_send_failure_keeps_progress_and_flags_notice() {
        let mut session = started_session();
        push_user_answer(&mut session, "answer lost to the network");
        let before_round = session.current_round;
        let before_question = session.current_question;

        session.record_send_failure("network error");

        assert_eq!(session.messages.len(), 3);
        let notice = session.messages.last().unwrap();
        assert!(notice.is_error);
        assert_eq!(notice.sender, Sender::Assistant);
        assert_eq!(notice.text, SEND_FAILURE_NOTICE);
        // The optimistic user message stays committed, no longer pending.
        assert!(!session.messages[1].pending);
        assert_eq!(session.current_round, before_round);
        assert_eq!(session.current_question, before_question);
        assert_eq!(session.round_outcome, RoundOutcome::Pending);
        assert_eq!(session.last_error.as_deref(), Some("network error"));
    }

    #[test]
    fn test_reset_restores_idle_defaults() {
        let mut session = started_session();
        push_user_answer(&mut session, "answer");
        session.commit_answer(chat_response(2, 0));
        session.last_error = Some("leftover".to_string());

        session.reset();

        assert_eq!(session, InterviewSession::default());
        assert_eq!(session.phase, Phase::Idle);
        assert_eq!(session.current_round, 1);
        assert!(session.messages.is_empty());
    }

    #[test]
    fn test_out_of_range_round_ordinal_collapses_to_catalog() {
        let mut session = started_session();
        push_user_answer(&mut session, "answer");
        session.commit_answer(chat_response(9, 0));

        assert_eq!(session.current_round, 1);
        assert_eq!(session.round_name, "Screening Round");
        assert_eq!(session.messages.last().unwrap().round, 1);
        assert_eq!(session.round_info().ordinal, 1);
    }

    #[test]
    fn test_round_info_tracks_current_round() {
        let mut session = started_session();
        assert_eq!(session.round_info().name, "Screening Round");
        push_user_answer(&mut session, "answer");
        session.commit_answer(chat_response(2, 0));
        assert_eq!(session.round_info().name, "Technical Round");
        assert_eq!(session.round_info().questions, 5);
    }
}
