//! Output side of a run.
//!
//! The schedulers report progress through a `PresentationSink` and never
//! format markup themselves: a speaker label with raw text per completed call,
//! the trial verdict, and human-readable status lines.

use crate::core_types::TranscriptEntry;

pub trait PresentationSink: Send {
    /// Current phase or turn, and the terminal state of the run.
    fn on_status(&mut self, status: &str);

    /// Called once per successful call, in the order calls complete.
    fn on_turn(&mut self, speaker: &str, text: &str);

    /// Called at most once, for the trial's terminal judgement.
    fn on_verdict(&mut self, text: &str);
}

/// Sink that keeps everything it is given.
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    pub statuses: Vec<String>,
    pub transcript: Vec<TranscriptEntry>,
    pub verdict: Option<String>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_status(&self) -> Option<&str> {
        self.statuses.last().map(String::as_str)
    }
}

impl PresentationSink for RecordingSink {
    fn on_status(&mut self, status: &str) {
        self.statuses.push(status.to_string());
    }

    fn on_turn(&mut self, speaker: &str, text: &str) {
        self.transcript.push(TranscriptEntry::new(speaker, text));
    }

    fn on_verdict(&mut self, text: &str) {
        self.verdict = Some(text.to_string());
    }
}
