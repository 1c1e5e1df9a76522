// Per-Step JSONL Trace Writer
// One JSON line per transform invocation, streamed as the run progresses

use std::io::{self, Write};

use dilation_engine::{StepObserver, StepRecord};
use tracing::warn;

/// Streams [`StepRecord`]s as JSONL. The first write error stops output and
/// is reported by [`finish`](Self::finish).
pub struct StepTraceWriter<W: Write> {
    out: W,
    lines: usize,
    failed: Option<io::Error>,
}

impl StepTraceWriter<io::StdoutLock<'static>> {
    pub fn stdout() -> Self {
        Self::new(io::stdout().lock())
    }
}

impl<W: Write> StepTraceWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out, lines: 0, failed: None }
    }

    pub fn lines_written(&self) -> usize {
        self.lines
    }

    /// Flush and hand back the writer, logging any write failure.
    pub fn finish(mut self) -> W {
        if self.failed.is_none() {
            if let Err(e) = self.out.flush() {
                self.failed = Some(e);
            }
        }
        if let Some(e) = &self.failed {
            warn!("step trace truncated after {} lines: {}", self.lines, e);
        }
        self.out
    }
}

impl<W: Write> StepObserver for StepTraceWriter<W> {
    fn on_step(&mut self, record: &StepRecord) {
        if self.failed.is_some() {
            return;
        }
        let written = serde_json::to_string(record)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))
            .and_then(|line| writeln!(self.out, "{}", line));
        match written {
            Ok(()) => self.lines += 1,
            Err(e) => self.failed = Some(e),
        }
    }
}
