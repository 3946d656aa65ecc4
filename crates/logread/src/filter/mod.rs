//! Filter: `search` and `level` substring filters over raw lines.

pub mod engine;

use tracing::debug;

pub use engine::{FilterEngine, FilterError};

/// Both query filters. An empty query string disables that filter.
///
/// Matching runs against the whole raw line, so a level such as `error`
/// also hits a host or tag that happens to contain the word.
pub struct LineFilter {
    search: Option<FilterEngine>,
    level: Option<FilterEngine>,
}

impl LineFilter {
    pub fn new(search: &str, level: &str) -> Result<Self, FilterError> {
        Ok(Self {
            search: Self::engine_for(search)?,
            level: Self::engine_for(level)?,
        })
    }

    fn engine_for(needle: &str) -> Result<Option<FilterEngine>, FilterError> {
        if needle.is_empty() {
            Ok(None)
        } else {
            FilterEngine::literal(needle).map(Some)
        }
    }

    pub fn is_passthrough(&self) -> bool {
        self.search.is_none() && self.level.is_none()
    }

    /// Keep `raw` only if every active filter finds its needle in it.
    pub fn matches(&self, raw: &str) -> bool {
        let search_ok = self.search.as_ref().is_none_or(|f| f.is_match(raw));
        search_ok && self.level.as_ref().is_none_or(|f| f.is_match(raw))
    }

    pub fn log_stats(&self) {
        for (name, engine) in [("search", &self.search), ("level", &self.level)] {
            if let Some(engine) = engine {
                let (scanned, matched, bytes) = engine.stats();
                debug!(
                    filter = name,
                    needle = engine.needle(),
                    scanned,
                    matched,
                    bytes,
                    "Filter pass complete"
                );
            }
        }
    }
}
