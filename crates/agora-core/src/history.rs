//! Append-only conversation history replayed on every inference call.
//!
//! The history is never truncated, summarized or reordered: each call sees
//! every turn recorded before it, so request size grows linearly with the
//! transcript. A run creates a fresh history and drops it when it ends.

use serde::{Deserialize, Serialize};

use crate::core_types::{Role, Turn};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationHistory {
    turns: Vec<Turn>,
}

impl ConversationHistory {
    pub fn new() -> Self {
        Self { turns: Vec::new() }
    }

    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    /// Records an instruction followed by the output it produced.
    pub fn push_exchange(&mut self, instruction: impl Into<String>, output: impl Into<String>) {
        self.turns.push(Turn::user(instruction));
        self.turns.push(Turn::model(output));
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn count_role(&self, role: Role) -> usize {
        self.turns.iter().filter(|t| t.role == role).count()
    }
}
