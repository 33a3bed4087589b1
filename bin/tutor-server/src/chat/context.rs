//! Per-(user, subject) uploaded reference text.
//!
//! Entries live only as long as the process runs: nothing is persisted, and
//! each backend instance keeps its own map.  Concurrent writes for the same
//! pair race with last-write-wins semantics, which is acceptable for hint
//! data.

use std::collections::HashMap;
use std::sync::Mutex;

/// In-process map of (user id, subject name) → reference text.
pub struct ContextCache {
    entries: Mutex<HashMap<(String, String), String>>,
}

impl std::fmt::Debug for ContextCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.entries.lock().map(|m| m.len()).unwrap_or(0);
        write!(f, "ContextCache({count} entries)")
    }
}

impl ContextCache {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Replace any previously stored text for the pair.
    pub fn store(&self, user_id: &str, subject: &str, text: String) {
        if let Ok(mut map) = self.entries.lock() {
            map.insert((user_id.to_owned(), subject.to_owned()), text);
        }
    }

    /// The most recently stored text for the pair, if any.
    pub fn fetch(&self, user_id: &str, subject: &str) -> Option<String> {
        self.entries
            .lock()
            .ok()
            .and_then(|map| map.get(&(user_id.to_owned(), subject.to_owned())).cloned())
    }
}

impl Default for ContextCache {
    fn default() -> Self {
        Self::new()
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
