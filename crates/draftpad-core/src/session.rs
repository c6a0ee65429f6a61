//! The assist session: one transcript, at most one request in flight.
//!
//! `submit` records the user's instruction and spawns the generation request
//! on the tokio runtime. The owner (the UI loop) later picks up the outcome
//! with [`AssistSession::try_settle`] or [`AssistSession::settle`], so every
//! transcript change happens on the owner's side between awaits.
//!
//! Requests are single-turn. The transcript is rendered to the user but never
//! fed back to the model.

use std::sync::Arc;
use std::time::Duration;

use futures_util::FutureExt;
use tokio::task::{JoinError, JoinHandle};

use crate::ai::TextGenerator;
use crate::config::DEFAULT_REQUEST_TIMEOUT_SECS;
use crate::document::DocumentSnapshot;
use crate::error::AssistError;
use crate::input::InputLine;
use crate::prompt::build_assist_prompt;
use crate::state::{ChatMessage, Transcript};

/// Shown in place of the reply whenever a request fails, whatever the cause.
pub const FALLBACK_REPLY: &str =
    "Sorry, I encountered an error while checking your text. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    InFlight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    EmptyInstruction,
    RequestInFlight,
}

/// Outcome of a submit call. A rejection leaves the session untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    Accepted,
    Rejected(RejectReason),
}

impl Submission {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Submission::Accepted)
    }
}

type PendingReply = JoinHandle<Result<String, AssistError>>;

pub struct AssistSession {
    generator: Arc<dyn TextGenerator>,
    transcript: Transcript,
    input: InputLine,
    in_flight: Option<PendingReply>,
    timeout: Duration,
}

impl AssistSession {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            generator,
            transcript: Transcript::new(),
            input: InputLine::new(),
            in_flight: None,
            timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }

    /// Upper bound for a single request; expiry counts as a failed request.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn generator(&self) -> &dyn TextGenerator {
        self.generator.as_ref()
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Pending input typed into the assist panel.
    pub fn input(&self) -> &InputLine {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut InputLine {
        &mut self.input
    }

    pub fn state(&self) -> SessionState {
        if self.in_flight.is_some() {
            SessionState::InFlight
        } else {
            SessionState::Idle
        }
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Send `instruction` together with `snapshot` to the model.
    ///
    /// Blank instructions and submissions made while a request is in flight
    /// are dropped silently. Must be called from within a tokio runtime.
    pub fn submit(&mut self, instruction: &str, snapshot: &DocumentSnapshot) -> Submission {
        if instruction.trim().is_empty() {
            return Submission::Rejected(RejectReason::EmptyInstruction);
        }
        if self.in_flight.is_some() {
            tracing::debug!("assist request already in flight, dropping submission");
            return Submission::Rejected(RejectReason::RequestInFlight);
        }

        self.transcript.push(ChatMessage::user(instruction));
        self.input.clear();

        let prompt = build_assist_prompt(snapshot, instruction);
        let generator = Arc::clone(&self.generator);
        let timeout = self.timeout;

        tracing::info!(
            provider = generator.name(),
            model = generator.model(),
            document_len = snapshot.len(),
            "submitting assist request"
        );
        if snapshot.is_empty() {
            tracing::debug!("document is empty, request carries only the instruction");
        }

        self.in_flight = Some(tokio::spawn(async move {
            match tokio::time::timeout(timeout, generator.generate(&prompt)).await {
                Ok(result) => result,
                Err(_) => Err(AssistError::Timeout(timeout)),
            }
        }));

        Submission::Accepted
    }

    /// Submit whatever is in the pending-input buffer.
    pub fn submit_pending(&mut self, snapshot: &DocumentSnapshot) -> Submission {
        let instruction = self.input.text().to_string();
        self.submit(&instruction, snapshot)
    }

    /// Record the reply if the in-flight request has finished. Never blocks.
    ///
    /// Returns the appended assistant message, if any.
    pub fn try_settle(&mut self) -> Option<&ChatMessage> {
        let handle = self.in_flight.as_mut()?;
        if !handle.is_finished() {
            return None;
        }
        let result = handle.now_or_never()?;
        self.in_flight = None;
        Some(self.finish(result))
    }

    /// Wait for the in-flight request, if any, and record its reply.
    pub async fn settle(&mut self) -> Option<&ChatMessage> {
        let handle = self.in_flight.as_mut()?;
        let result = handle.await;
        self.in_flight = None;
        Some(self.finish(result))
    }

    fn finish(&mut self, result: Result<Result<String, AssistError>, JoinError>) -> &ChatMessage {
        let outcome = result.unwrap_or_else(|e| Err(AssistError::Aborted(e.to_string())));

        let content = match outcome {
            Ok(reply) => {
                tracing::info!(reply_len = reply.len(), "assist reply received");
                reply
            }
            Err(e) => {
                tracing::error!(error = %e, "assist request failed");
                FALLBACK_REPLY.to_string()
            }
        };

        self.transcript.push(ChatMessage::assistant(content))
    }
}
