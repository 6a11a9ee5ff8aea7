//! Validated session configuration.
//!
//! Sessions can only be obtained through their validating constructors, so a
//! scheduler never sees a configuration that would have been rejected. All
//! text inputs are trimmed before they are checked or stored.

use serde::Serialize;

use crate::errors::ConfigurationError;

pub const MIN_DEBATE_AGENTS: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DebateSession {
    topic: String,
    personalities: Vec<String>,
    iterations: usize,
}

impl DebateSession {
    pub fn new<S: AsRef<str>>(
        topic: &str,
        personalities: &[S],
        iterations: usize,
    ) -> Result<Self, ConfigurationError> {
        let session = Self {
            topic: topic.trim().to_string(),
            personalities: personalities
                .iter()
                .map(|p| p.as_ref().trim().to_string())
                .collect(),
            iterations,
        };
        session.validate()?;
        Ok(session)
    }

    /// Checks run in the order a user fills the form: agent count, each
    /// personality, the topic, then the iteration count.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.personalities.len() < MIN_DEBATE_AGENTS {
            return Err(ConfigurationError::TooFewAgents(self.personalities.len()));
        }
        if let Some(index) = self.personalities.iter().position(|p| p.trim().is_empty()) {
            return Err(ConfigurationError::EmptyPersonality(index));
        }
        if self.topic.trim().is_empty() {
            return Err(ConfigurationError::EmptyTopic);
        }
        if self.iterations == 0 {
            return Err(ConfigurationError::ZeroIterations);
        }
        Ok(())
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn personalities(&self) -> &[String] {
        &self.personalities
    }

    pub fn agent_count(&self) -> usize {
        self.personalities.len()
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrialSession {
    case_facts: String,
}

impl TrialSession {
    pub fn new(case_facts: &str) -> Result<Self, ConfigurationError> {
        let session = Self {
            case_facts: case_facts.trim().to_string(),
        };
        session.validate()?;
        Ok(session)
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.case_facts.trim().is_empty() {
            return Err(ConfigurationError::EmptyCaseFacts);
        }
        Ok(())
    }

    pub fn case_facts(&self) -> &str {
        &self.case_facts
    }
}
