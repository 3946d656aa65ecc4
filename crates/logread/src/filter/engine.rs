use std::sync::atomic::{AtomicU64, Ordering};
use grep_matcher::Matcher;
use grep_regex::{RegexMatcher, RegexMatcherBuilder};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FilterError {
    #[error("Invalid filter pattern: {0}")]
    InvalidPattern(String),
}

#[derive(Debug, Default)]
pub struct FilterStats {
    pub lines_scanned: AtomicU64,
    pub lines_matched: AtomicU64,
    pub bytes_processed: AtomicU64,
}

/// Case-insensitive literal substring matcher.
pub struct FilterEngine {
    matcher: RegexMatcher,
    needle: String,
    stats: FilterStats,
}

impl FilterEngine {
    /// Match lines containing `needle`. Regex metacharacters in `needle`
    /// are escaped, so `[error]` matches the literal text `[error]`.
    pub fn literal(needle: &str) -> Result<Self, FilterError> {
        let matcher = RegexMatcherBuilder::new()
            .case_insensitive(true)
            .multi_line(false)
            .build(&regex::escape(needle))
            .map_err(|e| FilterError::InvalidPattern(e.to_string()))?;

        Ok(Self {
            matcher,
            needle: needle.to_string(),
            stats: FilterStats::default(),
        })
    }

    pub fn needle(&self) -> &str {
        &self.needle
    }

    #[inline]
    pub fn is_match(&self, line: &str) -> bool {
        self.stats.lines_scanned.fetch_add(1, Ordering::Relaxed);
        self.stats.bytes_processed.fetch_add(line.len() as u64, Ordering::Relaxed);

        let matches = self.matcher.is_match(line.as_bytes()).unwrap_or(false);

        if matches {
            self.stats.lines_matched.fetch_add(1, Ordering::Relaxed);
        }

        matches
    }

    pub fn stats(&self) -> (u64, u64, u64) {
        (
            self.stats.lines_scanned.load(Ordering::Relaxed),
            self.stats.lines_matched.load(Ordering::Relaxed),
            self.stats.bytes_processed.load(Ordering::Relaxed),
        )
    }
}
