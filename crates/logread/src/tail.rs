//! Tail: read the last N lines of a file.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Bytes read per step when scanning backwards from end-of-file.
pub const REVERSE_CHUNK_SIZE: usize = 8 * 1024;

/// How the tail of a file is located.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TailStrategy {
    /// Read the whole file and keep the last lines.
    #[default]
    Buffered,
    /// Read fixed-size chunks backwards from end-of-file until enough
    /// complete lines are buffered.
    Reverse,
}

impl TailStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            TailStrategy::Buffered => "buffered",
            TailStrategy::Reverse => "reverse",
        }
    }
}

/// Return the last `count` lines of `path`, oldest first.
///
/// A missing file is an empty tail. `\n`, `\r\n` and a lone `\r` all end a
/// line, and invalid UTF-8 is replaced rather than rejected.
pub fn read_tail(path: &Path, count: usize, strategy: TailStrategy) -> io::Result<Vec<String>> {
    let mut file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e),
    };

    if file.metadata()?.is_dir() {
        return Err(io::Error::new(io::ErrorKind::InvalidInput, "is a directory"));
    }

    if count == 0 {
        return Ok(Vec::new());
    }

    let bytes = match strategy {
        TailStrategy::Buffered => {
            let mut bytes = Vec::new();
            file.read_to_end(&mut bytes)?;
            bytes
        }
        TailStrategy::Reverse => read_suffix(&mut file, count, REVERSE_CHUNK_SIZE)?,
    };

    Ok(last_lines(&bytes, count))
}

fn last_lines(bytes: &[u8], count: usize) -> Vec<String> {
    let text = String::from_utf8_lossy(bytes);
    let lines = split_lines(&text);
    let start = lines.len().saturating_sub(count);
    lines[start..].iter().map(|line| line.to_string()).collect()
}

/// Split on `\n`, `\r\n` or `\r`. A terminator on the last line does not
/// produce a trailing empty line.
fn split_lines(text: &str) -> Vec<&str> {
    let bytes = text.as_bytes();
    let mut lines = Vec::new();
    let mut start = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'\n' => {
                lines.push(&text[start..i]);
                i += 1;
                start = i;
            }
            b'\r' => {
                lines.push(&text[start..i]);
                i += if bytes.get(i + 1) == Some(&b'\n') { 2 } else { 1 };
                start = i;
            }
            _ => i += 1,
        }
    }

    if start < bytes.len() {
        lines.push(&text[start..]);
    }
    lines
}

/// Read just enough of the end of `file` to hold its last `count` lines.
///
/// Stops once the buffer contains `count` line breaks, not counting a
/// terminator on the very last line. Everything after the first of those
/// breaks is then `count` complete lines.
fn read_suffix<R: Read + Seek>(file: &mut R, count: usize, chunk_size: usize) -> io::Result<Vec<u8>> {
    let len = file.seek(SeekFrom::End(0))?;
    if len == 0 {
        return Ok(Vec::new());
    }

    let mut last = [0u8; 1];
    file.seek(SeekFrom::Start(len - 1))?;
    file.read_exact(&mut last)?;
    // Offset one past the last byte that can count as a line break.
    let scan_end = if matches!(last[0], b'\n' | b'\r') { len - 1 } else { len };

    let mut suffix: Vec<u8> = Vec::new();
    let mut pos = len;
    let mut breaks = 0usize;

    while pos > 0 && breaks < count {
        let step = chunk_size.min(pos as usize);
        pos -= step as u64;

        let mut chunk = vec![0u8; step];
        file.seek(SeekFrom::Start(pos))?;
        file.read_exact(&mut chunk)?;

        let countable = (scan_end.saturating_sub(pos) as usize).min(step);
        breaks += (0..countable)
            .filter(|&i| match chunk[i] {
                b'\n' => true,
                // `\r\n` is counted once, at its `\n`.
                b'\r' => chunk.get(i + 1).or(suffix.first()) != Some(&b'\n'),
                _ => false,
            })
            .count();

        chunk.extend_from_slice(&suffix);
        suffix = chunk;
    }

    Ok(suffix)
}
