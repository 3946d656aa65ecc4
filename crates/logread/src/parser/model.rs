use serde::Serialize;

/// Result of running a line grammar over one trimmed line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseOutcome {
    /// Every structured field was captured.
    Matched {
        timestamp: String,
        hostname: String,
        tag: String,
        message: String,
    },
    /// The grammar did not apply; the line is kept verbatim.
    Unmatched,
}

/// One log line as returned to clients.
///
/// Either `timestamp`, `hostname` and `tag` are all populated, or all three
/// are empty and `message == raw`. There is no partial form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogRecord {
    pub timestamp: String,
    pub hostname: String,
    pub tag: String,
    pub message: String,
    pub raw: String,
}

impl LogRecord {
    /// Build a record from a trimmed line and the parser's verdict on it.
    pub fn from_outcome(raw: &str, outcome: ParseOutcome) -> Self {
        match outcome {
            ParseOutcome::Matched { timestamp, hostname, tag, message } => Self {
                timestamp,
                hostname,
                tag,
                message,
                raw: raw.to_string(),
            },
            ParseOutcome::Unmatched => Self::unparsed(raw),
        }
    }

    /// Fallback record: structured fields empty, message mirrors the line.
    pub fn unparsed(raw: &str) -> Self {
        Self {
            timestamp: String::new(),
            hostname: String::new(),
            tag: String::new(),
            message: raw.to_string(),
            raw: raw.to_string(),
        }
    }

    /// In-band error entry used when an approved file cannot be read.
    pub fn read_failure(error: &std::io::Error) -> Self {
        Self::synthetic(format!("Error reading file: {}", error))
    }

    /// A record that carries only a message. `raw` stays empty so it can
    /// never be mistaken for a line from the file.
    pub fn synthetic(message: String) -> Self {
        Self {
            timestamp: String::new(),
            hostname: String::new(),
            tag: String::new(),
            message,
            raw: String::new(),
        }
    }

    pub fn is_parsed(&self) -> bool {
        !self.timestamp.is_empty()
    }
}
