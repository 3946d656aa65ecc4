/// Line grammars understood by the pipeline

pub mod syslog;

pub use syslog::SyslogParser;
