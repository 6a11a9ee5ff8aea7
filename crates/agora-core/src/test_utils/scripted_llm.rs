// src/test_utils/scripted_llm.rs
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::core_types::Turn;
use crate::errors::RemoteError;
use crate::llm::LLM;

#[derive(Debug, Clone)]
pub enum ScriptStep {
    Reply(String),
    Fail(RemoteError),
    /// Never completes
    Hang,
}

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub system_prompt: String,
    pub instruction: String,
    pub history: Vec<Turn>,
}

/// In-memory `LLM` that plays back a script and records every call.
///
/// Once the script runs out it answers `reply {n}` where `n` is the 1-based
/// call number.
#[derive(Clone, Default)]
pub struct ScriptedLLM {
    script: Arc<Mutex<VecDeque<ScriptStep>>>,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl ScriptedLLM {
    pub fn new(script: Vec<ScriptStep>) -> Self {
        Self {
            script: Arc::new(Mutex::new(VecDeque::from(script))),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Succeeds `successes` times, then fails once with `error`.
    pub fn failing_after(successes: usize, error: RemoteError) -> Self {
        let mut script: Vec<ScriptStep> = (1..=successes)
            .map(|n| ScriptStep::Reply(format!("reply {}", n)))
            .collect();
        script.push(ScriptStep::Fail(error));
        Self::new(script)
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl LLM for ScriptedLLM {
    async fn generate(
        &self,
        system_prompt: &str,
        instruction: &str,
        history: &[Turn],
    ) -> Result<String, RemoteError> {
        let call_number = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(RecordedCall {
                system_prompt: system_prompt.to_string(),
                instruction: instruction.to_string(),
                history: history.to_vec(),
            });
            calls.len()
        };

        let step = self.script.lock().unwrap().pop_front();
        match step {
            Some(ScriptStep::Reply(text)) => Ok(text),
            Some(ScriptStep::Fail(err)) => Err(err),
            Some(ScriptStep::Hang) => std::future::pending().await,
            None => Ok(format!("reply {}", call_number)),
        }
    }
}
