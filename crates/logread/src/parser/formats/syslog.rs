use std::sync::LazyLock;

use regex::Regex;

use crate::parser::traits::{LineParser, ParseOutcome};

/// `Mon DD HH:MM:SS host tag: message` with no `<PRI>` prefix.
///
/// The day may be padded with extra spaces (`Jan  5`). The tag stops at the
/// first colon; everything after it, minus leading whitespace, is the message.
static LEGACY_SYSLOG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\w{3}\s+\d{1,2}\s+\d{2}:\d{2}:\d{2})\s+(\S+)\s+(\S+?):\s*(.*)").unwrap()
});

/// Parser for the legacy (pre RFC 5424) syslog line layout written by
/// rsyslog's default file template.
pub struct SyslogParser;

impl LineParser for SyslogParser {
    fn parse(&self, line: &str) -> ParseOutcome {
        let Some(caps) = LEGACY_SYSLOG.captures(line) else {
            return ParseOutcome::Unmatched;
        };

        // All four groups are mandatory in the pattern, so a match has them all.
        match (caps.get(1), caps.get(2), caps.get(3), caps.get(4)) {
            (Some(ts), Some(host), Some(tag), Some(msg)) => ParseOutcome::Matched {
                timestamp: ts.as_str().to_string(),
                hostname: host.as_str().to_string(),
                tag: tag.as_str().to_string(),
                message: msg.as_str().to_string(),
            },
            _ => ParseOutcome::Unmatched,
        }
    }

    fn name(&self) -> &'static str {
        "syslog"
    }
}
