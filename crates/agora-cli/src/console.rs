//! Plain-text presentation of a run on a terminal.

use std::io::Write;

use agora_core::PresentationSink;

/// Writes statuses, turns and the verdict as they arrive.
///
/// Write failures are logged and otherwise ignored so a closed pipe never
/// aborts a run that is still paying for inference calls.
pub struct ConsoleSink<W: Write + Send> {
    out: W,
    turns: usize,
}

impl ConsoleSink<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> ConsoleSink<W> {
    pub fn new(out: W) -> Self {
        Self { out, turns: 0 }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, text: &str) {
        if let Err(e) = writeln!(self.out, "{}", text).and_then(|_| self.out.flush()) {
            log::warn!("Failed to write to console: {}", e);
        }
    }
}

impl<W: Write + Send> PresentationSink for ConsoleSink<W> {
    fn on_status(&mut self, status: &str) {
        self.emit(&format!("-- {}", status));
    }

    fn on_turn(&mut self, speaker: &str, text: &str) {
        self.turns += 1;
        self.emit(&format!("\n[{}] {}:\n{}\n", self.turns, speaker, text.trim()));
    }

    fn on_verdict(&mut self, text: &str) {
        self.emit(&format!("\n=== VERDICT ===\n{}\n", text.trim()));
    }
}
