//! Round-robin debate between N personas.
//!
//! Steps visit `(iteration, agent)` in row-major order. The first step opens
//! the topic; every later step quotes the previous speaker verbatim. Each
//! completed call appends the instruction and the reply to the history.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::core_types::TranscriptEntry;
use crate::errors::RemoteError;
use crate::history::ConversationHistory;
use crate::llm::LLM;
use crate::orchestrator::prompts;
use crate::orchestrator::{drive, RunKind, RunReport, RunState, StepOutcome, TurnScheduler};
use crate::presentation::PresentationSink;
use crate::session::DebateSession;

pub const DEFAULT_DEBATE_PACING: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DebateAgent {
    pub index: usize,
    pub name: String,
    pub personality: String,
    pub system_prompt: String,
}

impl DebateAgent {
    fn new(index: usize, personality: &str, topic: &str) -> Self {
        // Short display name from the first word, e.g. "Agent 1 (Skeptic)"
        let short = personality.split_whitespace().next().unwrap_or(personality);
        Self {
            index,
            name: format!("Agent {} ({})", index + 1, short),
            personality: personality.to_string(),
            system_prompt: prompts::debate_system_prompt(topic, personality),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DebateRunState {
    pub iteration: usize,
    pub agent_index: usize,
    /// Output of the most recent call
    pub last_message: Option<String>,
    pub history: ConversationHistory,
    pub transcript: Vec<TranscriptEntry>,
    pub calls: usize,
    pub finished: bool,
}

impl RunState for DebateRunState {
    fn history(&self) -> &ConversationHistory {
        &self.history
    }

    fn transcript(&self) -> &[TranscriptEntry] {
        &self.transcript
    }

    fn calls(&self) -> usize {
        self.calls
    }
}

pub struct DebateOrchestrator {
    session: DebateSession,
    agents: Vec<DebateAgent>,
    pacing: Duration,
}

impl DebateOrchestrator {
    pub fn new(session: DebateSession) -> Self {
        let agents = session
            .personalities()
            .iter()
            .enumerate()
            .map(|(index, personality)| DebateAgent::new(index, personality, session.topic()))
            .collect();

        Self {
            session,
            agents,
            pacing: DEFAULT_DEBATE_PACING,
        }
    }

    pub fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn session(&self) -> &DebateSession {
        &self.session
    }

    pub fn agents(&self) -> &[DebateAgent] {
        &self.agents
    }

    /// Number of calls a successful run makes.
    pub fn total_steps(&self) -> usize {
        self.agents.len() * self.session.iterations()
    }

    pub fn is_terminal_step(&self, state: &DebateRunState) -> bool {
        state.iteration + 1 == self.session.iterations() && state.agent_index + 1 == self.agents.len()
    }

    pub fn instruction_for(&self, state: &DebateRunState) -> String {
        match &state.last_message {
            Some(previous) if state.calls > 0 => prompts::debate_reply_instruction(previous),
            _ => prompts::debate_opening_instruction(self.session.topic()),
        }
    }

    pub fn status_for(&self, state: &DebateRunState) -> String {
        format!(
            "Iteration {}/{} - Turn: {}",
            state.iteration + 1,
            self.session.iterations(),
            self.agents[state.agent_index].name
        )
    }

    fn advance(&self, state: &mut DebateRunState) {
        state.agent_index = (state.agent_index + 1) % self.agents.len();
        if state.agent_index == 0 {
            state.iteration += 1;
        }
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
impl TurnScheduler for DebateOrchestrator {
    type State = DebateRunState;

    fn kind(&self) -> RunKind {
        RunKind::Debate
    }

    fn initial_state(&self) -> DebateRunState {
        DebateRunState::default()
    }

    fn pacing(&self) -> Duration {
        self.pacing
    }

    async fn step(
        &self,
        state: &mut DebateRunState,
        llm: &dyn LLM,
        sink: &mut dyn PresentationSink,
    ) -> Result<StepOutcome, RemoteError> {
        if state.finished {
            return Ok(StepOutcome::Finished);
        }

        let agent = &self.agents[state.agent_index];
        let instruction = self.instruction_for(state);
        sink.on_status(&self.status_for(state));
        log::info!(
            "Debate iteration {}/{}, speaker {}",
            state.iteration + 1,
            self.session.iterations(),
            agent.name
        );

        let reply = llm
            .generate(&agent.system_prompt, &instruction, state.history.turns())
            .await?;

        state.calls += 1;
        state.last_message = Some(reply.clone());
        state.history.push_exchange(instruction, reply.clone());
        state.transcript.push(TranscriptEntry::new(agent.name.clone(), reply.clone()));
        sink.on_turn(&agent.name, &reply);

        if self.is_terminal_step(state) {
            state.finished = true;
            return Ok(StepOutcome::Finished);
        }

        self.advance(state);
        Ok(StepOutcome::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn orchestrator(personalities: &[&str], iterations: usize) -> DebateOrchestrator {
        let session = DebateSession::new("Universal basic income", personalities, iterations).unwrap();
        DebateOrchestrator::new(session).with_pacing(Duration::ZERO)
    }

    #[test]
    fn test_agents_are_named_from_first_word() {
        let debate = orchestrator(&["Skeptical scientist", "Optimist"], 1);
        let names: Vec<&str> = debate.agents().iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["Agent 1 (Skeptical)", "Agent 2 (Optimist)"]);
        assert!(debate.agents()[0]
            .system_prompt
            .contains("YOUR PERSONALITY: Skeptical scientist."));
    }

    #[test]
    fn test_row_major_advance_and_terminal_step() {
        let debate = orchestrator(&["a", "b", "c"], 2);
        let mut state = debate.initial_state();
        let mut visited = Vec::new();
        loop {
            visited.push((state.iteration, state.agent_index));
            if debate.is_terminal_step(&state) {
                break;
            }
            debate.advance(&mut state);
        }
        assert_eq!(
            visited,
            vec![(0, 0), (0, 1), (0, 2), (1, 0), (1, 1), (1, 2)]
        );
        assert_eq!(debate.total_steps(), 6);
    }

    #[test]
    fn test_status_line() {
        let debate = orchestrator(&["Skeptic", "Optimist"], 3);
        let state = DebateRunState {
            iteration: 1,
            agent_index: 1,
            ..DebateRunState::default()
        };
        assert_eq!(debate.status_for(&state), "Iteration 2/3 - Turn: Agent 2 (Optimist)");
    }
}
