//! State machine gating the three assistant actions.
//!
//! Only one action is in flight at a time. An accepted action appends the
//! user's message, runs exactly one model call and appends either the reply
//! or a fixed apology, then returns to `Idle`.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::ai::ModelClient;
use crate::error::ModelError;
use crate::knowledge::KnowledgeDocument;
use crate::prompt::{build_prompt, Intent};
use crate::state::{ChatMessage, Transcript};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusyKind {
    Sending,
    Summarizing,
    GeneratingQuestions,
}

impl BusyKind {
    /// Message shown when the call for this kind fails
    pub fn apology(&self) -> &'static str {
        match self {
            BusyKind::Sending => "There was an error connecting to Gemini. Please try again later.",
            BusyKind::Summarizing => "Sorry, I couldn't summarize the resume. Please try again.",
            BusyKind::GeneratingQuestions => {
                "Sorry, I couldn't generate interview questions. Please try again."
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrchestratorState {
    #[default]
    Idle,
    Busy(BusyKind),
}

/// A user-triggered action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Send(String),
    Summarize,
    GenerateQuestions,
}

impl Action {
    pub fn kind(&self) -> BusyKind {
        match self {
            Action::Send(_) => BusyKind::Sending,
            Action::Summarize => BusyKind::Summarizing,
            Action::GenerateQuestions => BusyKind::GeneratingQuestions,
        }
    }

    fn user_text(&self) -> &str {
        match self {
            Action::Send(text) => text,
            Action::Summarize => "Summarize my resume.",
            Action::GenerateQuestions => "Generate interview questions based on my resume.",
        }
    }

    fn into_intent(self) -> Intent {
        match self {
            Action::Send(text) => Intent::FreeQuestion(text),
            Action::Summarize => Intent::Summarize,
            Action::GenerateQuestions => Intent::GenerateQuestions,
        }
    }
}

/// Prompt for an accepted action, discarded once the call resolves
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRequest {
    pub kind: BusyKind,
    pub prompt: String,
}

/// A model call running on the tokio runtime
pub struct InFlight {
    pub kind: BusyKind,
    handle: JoinHandle<Result<String, ModelError>>,
}

impl InFlight {
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the call; a panicked task counts as a model failure
    pub async fn finish(self) -> (BusyKind, Result<String, ModelError>) {
        let outcome = match self.handle.await {
            Ok(result) => result,
            Err(e) => Err(ModelError::TaskFailed(e.to_string())),
        };
        (self.kind, outcome)
    }
}

pub struct Orchestrator<C> {
    client: Arc<C>,
    knowledge: KnowledgeDocument,
    transcript: Transcript,
    state: OrchestratorState,
    open: bool,
}

impl<C: ModelClient + 'static> Orchestrator<C> {
    pub fn new(client: Arc<C>, knowledge: KnowledgeDocument) -> Self {
        Self {
            client,
            knowledge,
            transcript: Transcript::new(),
            state: OrchestratorState::Idle,
            open: false,
        }
    }

    pub fn transcript(&self) -> &[ChatMessage] {
        self.transcript.all()
    }

    pub fn state(&self) -> OrchestratorState {
        self.state
    }

    pub fn busy_kind(&self) -> Option<BusyKind> {
        match self.state {
            OrchestratorState::Idle => None,
            OrchestratorState::Busy(kind) => Some(kind),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.state != OrchestratorState::Idle
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Show or hide the chat; never cancels a pending call
    pub fn toggle_open(&mut self) {
        self.open = !self.open;
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    /// Accept `action` if idle: record the user message, go busy and return
    /// the prompt to send. Blank input and busy states yield `None`.
    pub fn begin(&mut self, action: Action) -> Option<PendingRequest> {
        if let Action::Send(text) = &action {
            if text.trim().is_empty() {
                debug!("ignoring blank submission");
                return None;
            }
        }

        if let OrchestratorState::Busy(current) = self.state {
            debug!(?current, requested = ?action.kind(), "action refused while busy");
            return None;
        }

        let kind = action.kind();
        self.transcript.append(ChatMessage::user(action.user_text()));
        self.state = OrchestratorState::Busy(kind);
        info!(?kind, "action accepted");

        let prompt = build_prompt(&action.into_intent(), &self.knowledge);
        Some(PendingRequest { kind, prompt })
    }

    /// Record the outcome of the call started for `kind` and return to idle
    pub fn complete(&mut self, kind: BusyKind, outcome: Result<String, ModelError>) {
        if self.state != OrchestratorState::Busy(kind) {
            warn!(?kind, state = ?self.state, "ignoring completion for an action that is not running");
            return;
        }

        let reply = match outcome {
            Ok(text) => {
                info!(?kind, len = text.len(), "model reply received");
                text
            }
            Err(e) => {
                error!(?kind, malformed = e.is_malformed(), "model call failed: {}", e);
                kind.apology().to_string()
            }
        };

        self.transcript.append(ChatMessage::assistant(reply));
        self.state = OrchestratorState::Idle;
    }

    /// Run an action to completion on the current task
    pub async fn dispatch(&mut self, action: Action) -> bool {
        let Some(request) = self.begin(action) else {
            return false;
        };
        let outcome = self.client.generate(&request.prompt).await;
        self.complete(request.kind, outcome);
        true
    }

    /// Accept an action and run its model call in the background
    pub fn spawn(&mut self, action: Action) -> Option<InFlight> {
        let request = self.begin(action)?;
        let client = Arc::clone(&self.client);
        let handle = tokio::spawn(async move { client.generate(&request.prompt).await });
        Some(InFlight {
            kind: request.kind,
            handle,
        })
    }

    pub fn on_submit_free_text(&mut self, text: &str) -> Option<InFlight> {
        self.spawn(Action::Send(text.to_string()))
    }

    pub fn on_trigger_summarize(&mut self) -> Option<InFlight> {
        self.spawn(Action::Summarize)
    }

    pub fn on_trigger_generate_questions(&mut self) -> Option<InFlight> {
        self.spawn(Action::GenerateQuestions)
    }

    /// Apply a finished background call
    pub async fn settle(&mut self, in_flight: InFlight) {
        let (kind, outcome) = in_flight.finish().await;
        self.complete(kind, outcome);
    }
}
