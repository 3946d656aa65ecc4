// Read-only access to a directory of syslog files.

// Access control
pub mod guard;

// Line processing
pub mod parser;
pub mod filter;
pub mod tail;

// Request-level services
pub mod pipeline;
pub mod inventory;

pub use guard::{FileRef, GuardError, PathGuard};
pub use inventory::{LogFileEntry, LogStats};
pub use parser::{LogRecord, ParseOutcome};
pub use pipeline::LogPipeline;
pub use tail::TailStrategy;
