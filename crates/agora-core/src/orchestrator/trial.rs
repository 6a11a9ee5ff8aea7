//! Mock criminal trial with a fixed script.
//!
//! Prosecution and defense alternate through eleven scripted calls (openings,
//! three argument rounds, closings and the prosecution's rebuttal). Their
//! outputs are recorded as model turns prefixed with the speaker's role. The
//! judge is then called once over the whole history; that verdict ends the run
//! and is never appended to the history.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::core_types::{TranscriptEntry, Turn};
use crate::errors::RemoteError;
use crate::history::ConversationHistory;
use crate::llm::LLM;
use crate::orchestrator::prompts;
use crate::orchestrator::{drive, RunKind, RunReport, RunState, StepOutcome, TurnScheduler};
use crate::presentation::PresentationSink;
use crate::session::TrialSession;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TrialRole {
    Prosecutor,
    Defense,
    Judge,
}

impl TrialRole {
    pub fn label(&self) -> &'static str {
        match self {
            TrialRole::Prosecutor => "Prosecutor",
            TrialRole::Defense => "Defense",
            TrialRole::Judge => "Judge",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TrialPhase {
    OpeningStatements,
    Arguments { round: u8 },
    ClosingStatements,
}

impl TrialPhase {
    fn describe(&self) -> String {
        match self {
            TrialPhase::OpeningStatements => "Opening statements".to_string(),
            TrialPhase::Arguments { round } => format!("Arguments, round {}/{}", round, ARGUMENT_ROUNDS),
            TrialPhase::ClosingStatements => "Closing statements".to_string(),
        }
    }
}

pub const ARGUMENT_ROUNDS: u8 = 3;

#[derive(Debug, Clone, Copy)]
pub struct ScriptedCall {
    pub phase: TrialPhase,
    pub role: TrialRole,
    /// May contain `{quote}`, replaced by the opposing side's latest statement
    pub instruction: &'static str,
    /// Clerk announcement emitted before this call, when it opens a phase
    pub announcement: Option<&'static str>,
}

const fn call(
    phase: TrialPhase,
    role: TrialRole,
    instruction: &'static str,
    announcement: Option<&'static str>,
) -> ScriptedCall {
    ScriptedCall {
        phase,
        role,
        instruction,
        announcement,
    }
}

use TrialPhase::{Arguments, ClosingStatements, OpeningStatements};
use TrialRole::{Defense, Prosecutor};

pub const TRIAL_SCRIPT: [ScriptedCall; 11] = [
    call(OpeningStatements, Prosecutor, prompts::PROSECUTION_OPENING, Some(prompts::ANNOUNCE_OPENING)),
    call(OpeningStatements, Defense, prompts::DEFENSE_OPENING, None),
    call(Arguments { round: 1 }, Prosecutor, prompts::PROSECUTION_ROUND_1, Some(prompts::ANNOUNCE_ARGUMENTS)),
    call(Arguments { round: 1 }, Defense, prompts::DEFENSE_ROUND_1, None),
    call(Arguments { round: 2 }, Prosecutor, prompts::PROSECUTION_ROUND_2, None),
    call(Arguments { round: 2 }, Defense, prompts::DEFENSE_ROUND_2, None),
    call(Arguments { round: 3 }, Prosecutor, prompts::PROSECUTION_ROUND_3, None),
    call(Arguments { round: 3 }, Defense, prompts::DEFENSE_ROUND_3, None),
    call(ClosingStatements, Prosecutor, prompts::PROSECUTION_CLOSING, Some(prompts::ANNOUNCE_CLOSING)),
    call(ClosingStatements, Defense, prompts::DEFENSE_CLOSING, None),
    call(ClosingStatements, Prosecutor, prompts::PROSECUTION_REBUTTAL, None),
];

#[derive(Debug, Clone, Default)]
pub struct TrialRunState {
    /// Index into the script; `TRIAL_SCRIPT.len()` means the judge is next
    pub position: usize,
    pub last_prosecution: Option<String>,
    pub last_defense: Option<String>,
    pub history: ConversationHistory,
    pub transcript: Vec<TranscriptEntry>,
    pub verdict: Option<String>,
    pub calls: usize,
}

impl RunState for TrialRunState {
    fn history(&self) -> &ConversationHistory {
        &self.history
    }

    fn transcript(&self) -> &[TranscriptEntry] {
        &self.transcript
    }

    fn calls(&self) -> usize {
        self.calls
    }

    fn verdict(&self) -> Option<&str> {
        self.verdict.as_deref()
    }
}

pub struct TrialOrchestrator {
    session: TrialSession,
    prosecutor_prompt: String,
    defense_prompt: String,
    judge_prompt: String,
    pacing: Duration,
}

impl TrialOrchestrator {
    pub fn new(session: TrialSession) -> Self {
        let facts = session.case_facts();
        Self {
            prosecutor_prompt: prompts::prosecutor_system_prompt(facts),
            defense_prompt: prompts::defense_system_prompt(facts),
            judge_prompt: prompts::judge_system_prompt(facts),
            session,
            pacing: Duration::ZERO,
        }
    }

    pub fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn session(&self) -> &TrialSession {
        &self.session
    }

    pub fn system_prompt(&self, role: TrialRole) -> &str {
        match role {
            TrialRole::Prosecutor => &self.prosecutor_prompt,
            TrialRole::Defense => &self.defense_prompt,
            TrialRole::Judge => &self.judge_prompt,
        }
    }

    /// Instruction for a scripted call, quoting the other side where asked.
    pub fn instruction_for(&self, scripted: &ScriptedCall, state: &TrialRunState) -> String {
        if !scripted.instruction.contains(prompts::QUOTE) {
            return scripted.instruction.to_string();
        }
        let opposing = match scripted.role {
            TrialRole::Prosecutor => state.last_defense.as_deref(),
            _ => state.last_prosecution.as_deref(),
        };
        scripted
            .instruction
            .replace(prompts::QUOTE, opposing.unwrap_or_default())
    }

    async fn scripted_step(
        &self,
        scripted: &ScriptedCall,
        state: &mut TrialRunState,
        llm: &dyn LLM,
        sink: &mut dyn PresentationSink,
    ) -> Result<StepOutcome, RemoteError> {
        if let Some(announcement) = scripted.announcement {
            sink.on_status(announcement);
        }
        sink.on_status(&format!(
            "{} - {}",
            scripted.phase.describe(),
            scripted.role.label()
        ));

        let instruction = self.instruction_for(scripted, state);
        log::info!(
            "Trial call {}/{}: {} ({})",
            state.position + 1,
            TRIAL_SCRIPT.len() + 1,
            scripted.role.label(),
            scripted.phase.describe()
        );

        let reply = llm
            .generate(self.system_prompt(scripted.role), &instruction, state.history.turns())
            .await?;

        match scripted.role {
            TrialRole::Prosecutor => state.last_prosecution = Some(reply.clone()),
            _ => state.last_defense = Some(reply.clone()),
        }
        // Speaker tag in capitals, e.g. "PROSECUTOR: ..."
        state.history.push(Turn::model(format!(
            "{}: {}",
            scripted.role.label().to_uppercase(),
            reply
        )));
        state
            .transcript
            .push(TranscriptEntry::new(scripted.role.label(), reply.clone()));
        state.calls += 1;
        state.position += 1;
        sink.on_turn(scripted.role.label(), &reply);

        Ok(StepOutcome::Continue)
    }

    async fn verdict_step(
        &self,
        state: &mut TrialRunState,
        llm: &dyn LLM,
        sink: &mut dyn PresentationSink,
    ) -> Result<StepOutcome, RemoteError> {
        sink.on_status(prompts::ANNOUNCE_VERDICT);
        log::info!(
            "Trial call {}/{}: Judge deliberating over {} turns",
            state.position + 1,
            TRIAL_SCRIPT.len() + 1,
            state.history.len()
        );

        let verdict = llm
            .generate(
                self.system_prompt(TrialRole::Judge),
                prompts::JUDGE_VERDICT_INSTRUCTION,
                state.history.turns(),
            )
            .await?;

        state.calls += 1;
        state.position += 1;
        state.verdict = Some(verdict.clone());
        sink.on_verdict(&verdict);

        Ok(StepOutcome::Finished)
    }

    pub async fn run(
        &self,
        llm: &dyn LLM,
        sink: &mut dyn PresentationSink,
        cancel: &CancellationToken,
    ) -> RunReport {
        drive(self, llm, sink, cancel).await
    }
}

#[async_trait]
impl TurnScheduler for TrialOrchestrator {
    type State = TrialRunState;

    fn kind(&self) -> RunKind {
        RunKind::Trial
    }

    fn initial_state(&self) -> TrialRunState {
        TrialRunState::default()
    }

    fn pacing(&self) -> Duration {
        self.pacing
    }

    async fn step(
        &self,
        state: &mut TrialRunState,
        llm: &dyn LLM,
        sink: &mut dyn PresentationSink,
    ) -> Result<StepOutcome, RemoteError> {
        match TRIAL_SCRIPT.get(state.position) {
            Some(scripted) => self.scripted_step(scripted, state, llm, sink).await,
            None if state.verdict.is_none() => self.verdict_step(state, llm, sink).await,
            None => Ok(StepOutcome::Finished),
        }
    }
}
