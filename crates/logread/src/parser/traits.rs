pub use super::model::{LogRecord, ParseOutcome};

pub trait LineParser: Send + Sync {
    /// Parse one trimmed, non-empty line. Must not fail: lines the grammar
    /// does not describe come back as `ParseOutcome::Unmatched`.
    fn parse(&self, line: &str) -> ParseOutcome;
    fn name(&self) -> &'static str;
}
