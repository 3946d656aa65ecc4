//! Pipeline: guard, tail, parse and filter one file per request.

use std::time::Instant;

use tracing::{debug, warn};

use crate::filter::LineFilter;
use crate::guard::{FileRef, GuardError, PathGuard};
use crate::parser::{parse_line, LineParser, LogRecord, SyslogParser};
use crate::tail::{read_tail, TailStrategy};

/// Upper bound on lines returned by one request unless configured otherwise.
pub const DEFAULT_MAX_LINES: usize = 10_000;

/// Read-only view over the files below one log root.
///
/// Holds no per-request state; a single instance is shared by every request.
pub struct LogPipeline {
    guard: PathGuard,
    parser: Box<dyn LineParser>,
    strategy: TailStrategy,
    max_lines: usize,
}

impl LogPipeline {
    pub fn new(guard: PathGuard) -> Self {
        Self {
            guard,
            parser: Box::new(SyslogParser),
            strategy: TailStrategy::default(),
            max_lines: DEFAULT_MAX_LINES,
        }
    }

    pub fn with_strategy(mut self, strategy: TailStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_max_lines(mut self, max_lines: usize) -> Self {
        self.max_lines = max_lines.max(1);
        self
    }

    pub fn with_parser(mut self, parser: Box<dyn LineParser>) -> Self {
        self.parser = parser;
        self
    }

    pub fn guard(&self) -> &PathGuard {
        &self.guard
    }

    pub fn max_lines(&self) -> usize {
        self.max_lines
    }

    /// Clamp a client-supplied line count into `[1, max_lines]`.
    pub fn clamp_lines(&self, requested: i64) -> usize {
        if requested < 1 {
            return 1;
        }
        usize::try_from(requested).map_or(self.max_lines, |n| n.min(self.max_lines))
    }

    /// Resolve `file_ref` under the root, then return its last `max_lines`
    /// lines parsed and filtered, oldest first.
    ///
    /// Only a path outside the root is an error. A missing file gives an
    /// empty list; a read failure gives a single synthetic record.
    pub fn resolve_and_tail(
        &self,
        file_ref: &str,
        max_lines: i64,
        search: &str,
        level: &str,
    ) -> Result<Vec<LogRecord>, GuardError> {
        let file = self.guard.resolve(file_ref)?;
        let count = self.clamp_lines(max_lines);

        let filter = match LineFilter::new(search, level) {
            Ok(filter) => filter,
            Err(e) => {
                warn!(search, level, error = %e, "Could not build line filter");
                return Ok(vec![LogRecord::synthetic(e.to_string())]);
            }
        };

        Ok(self.tail_file(&file, count, &filter))
    }

    /// Tail an already validated file.
    pub fn tail_file(&self, file: &FileRef, count: usize, filter: &LineFilter) -> Vec<LogRecord> {
        let started = Instant::now();

        let lines = match read_tail(file.as_path(), count, self.strategy) {
            Ok(lines) => lines,
            Err(e) => {
                warn!(path = %file.as_path().display(), error = %e, "Failed to read log file");
                return vec![LogRecord::read_failure(&e)];
            }
        };

        let tailed = lines.len();
        let records: Vec<LogRecord> = lines
            .iter()
            .map(|line| line.trim())
            .filter(|line| !line.is_empty())
            .filter(|line| filter.matches(line))
            .map(|line| parse_line(self.parser.as_ref(), line))
            .collect();

        if !filter.is_passthrough() {
            filter.log_stats();
        }
        debug!(
            path = %file.as_path().display(),
            strategy = self.strategy.as_str(),
            parser = self.parser.name(),
            requested = count,
            tailed,
            returned = records.len(),
            elapsed_us = started.elapsed().as_micros() as u64,
            "Tail complete"
        );

        records
    }
}
