//! Turn scheduling for debates and trials.
//!
//! Each orchestrator is a finite-state scheduler: its run state is an explicit
//! value and `step` performs exactly one inference call plus the bookkeeping
//! that follows it. `drive` is the shared loop around `step`. It owns pacing,
//! cancellation and the terminal status, and it never issues a call before the
//! previous call's output has been recorded.

pub mod debate;
pub mod prompts;
pub mod trial;


use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::core_types::TranscriptEntry;
use crate::errors::RemoteError;
use crate::history::ConversationHistory;
use crate::llm::LLM;
use crate::presentation::PresentationSink;

pub use debate::{DebateAgent, DebateOrchestrator, DebateRunState};
pub use trial::{TrialOrchestrator, TrialPhase, TrialRole, TrialRunState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunKind {
    Debate,
    Trial,
}

impl RunKind {
    pub fn label(&self) -> &'static str {
        match self {
            RunKind::Debate => "Debate",
            RunKind::Trial => "Trial",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "error", rename_all = "snake_case")]
pub enum RunStatus {
    Completed,
    /// Stopped by the first remote failure; nothing after it was attempted
    Failed(RemoteError),
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Continue,
    Finished,
}

/// Read access every run state offers to the shared loop.
pub trait RunState: Send {
    fn history(&self) -> &ConversationHistory;
    fn transcript(&self) -> &[TranscriptEntry];
    fn calls(&self) -> usize;
    fn verdict(&self) -> Option<&str> {
        None
    }
}

#[async_trait]
pub trait TurnScheduler: Send + Sync {
    type State: RunState;

    fn kind(&self) -> RunKind;

    /// Fresh state for a new run, with an empty history.
    fn initial_state(&self) -> Self::State;

    /// Delay between consecutive non-terminal steps.
    fn pacing(&self) -> Duration;

    /// Perform one call. On error the state is left exactly as it was before
    /// the call.
    async fn step(
        &self,
        state: &mut Self::State,
        llm: &dyn LLM,
        sink: &mut dyn PresentationSink,
    ) -> Result<StepOutcome, RemoteError>;
}

/// Outcome of a run, including whatever was recorded before it stopped.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub kind: RunKind,
    pub status: RunStatus,
    pub transcript: Vec<TranscriptEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verdict: Option<String>,
    pub history: ConversationHistory,
    pub calls: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunReport {
    pub fn is_completed(&self) -> bool {
        self.status == RunStatus::Completed
    }

    pub fn error(&self) -> Option<&RemoteError> {
        match &self.status {
            RunStatus::Failed(err) => Some(err),
            _ => None,
        }
    }
}

pub fn terminal_message(kind: RunKind, status: &RunStatus) -> String {
    match status {
        RunStatus::Completed => match kind {
            RunKind::Debate => "Debate completed.".to_string(),
            RunKind::Trial => "Trial completed. The verdict has been delivered.".to_string(),
        },
        RunStatus::Failed(err) => format!("{} stopped by an error: {}", kind.label(), err),
        RunStatus::Cancelled => format!("{} cancelled.", kind.label()),
    }
}

/// Run a scheduler from its initial state to a terminal status.
pub async fn drive<S: TurnScheduler>(
    scheduler: &S,
    llm: &dyn LLM,
    sink: &mut dyn PresentationSink,
    cancel: &CancellationToken,
) -> RunReport {
    let run_id = Uuid::new_v4();
    let kind = scheduler.kind();
    let started_at = Utc::now();
    let mut state = scheduler.initial_state();
    let pacing = scheduler.pacing();

    log::info!("[run {}] {} started", run_id, kind.label());

    let status = loop {
        if cancel.is_cancelled() {
            break RunStatus::Cancelled;
        }

        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            result = scheduler.step(&mut state, llm, sink) => Some(result),
        };

        match outcome {
            None => break RunStatus::Cancelled,
            Some(Err(err)) => {
                log::error!(
                    "[run {}] call {} failed, aborting remaining schedule: {}",
                    run_id,
                    state.calls() + 1,
                    err
                );
                break RunStatus::Failed(err);
            }
            Some(Ok(StepOutcome::Finished)) => break RunStatus::Completed,
            Some(Ok(StepOutcome::Continue)) => {
                log::debug!(
                    "[run {}] call {} recorded, history has {} turns",
                    run_id,
                    state.calls(),
                    state.history().len()
                );
                if !pacing.is_zero() {
                    log::debug!("[run {}] pacing for {:?}", run_id, pacing);
                    tokio::select! {
                        biased;
                        _ = cancel.cancelled() => break RunStatus::Cancelled,
                        _ = tokio::time::sleep(pacing) => {}
                    }
                }
            }
        }
    };

    match &status {
        RunStatus::Completed => log::info!(
            "[run {}] {} completed after {} calls",
            run_id,
            kind.label(),
            state.calls()
        ),
        RunStatus::Cancelled => log::warn!(
            "[run {}] {} cancelled after {} calls",
            run_id,
            kind.label(),
            state.calls()
        ),
        _ => {}
    }
    sink.on_status(&terminal_message(kind, &status));

    RunReport {
        run_id,
        kind,
        status,
        transcript: state.transcript().to_vec(),
        verdict: state.verdict().map(str::to_string),
        history: state.history().clone(),
        calls: state.calls(),
        started_at,
        finished_at: Utc::now(),
    }
}
