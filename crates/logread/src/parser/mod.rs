/// Log line parsing
///
/// Turns one trimmed line into a `LogRecord`. Parsing is total: a line the
/// grammar does not describe still yields a record, with the structured
/// fields left empty and the message carrying the whole line.
///
/// - `traits.rs`: the `LineParser` seam used by the pipeline
/// - `formats/`: grammar implementations (legacy syslog)
/// - `model.rs`: `ParseOutcome` and `LogRecord`

pub mod traits;
pub mod formats;
pub mod model;

pub use traits::LineParser;
pub use model::{LogRecord, ParseOutcome};
pub use formats::SyslogParser;

/// Parse `line` with `parser` and wrap the verdict in a record.
pub fn parse_line(parser: &dyn LineParser, line: &str) -> LogRecord {
    LogRecord::from_outcome(line, parser.parse(line))
}
