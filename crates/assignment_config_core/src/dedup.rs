//! crates/assignment_config_core/src/dedup.rs
//!
//! Remembers which (kind, reason) warnings were already emitted so a fallback
//! that repeats on every request logs once per process.

use std::collections::HashSet;
use std::sync::Mutex;

/// Created once at startup and shared by the services that log fallbacks.
#[derive(Debug, Default)]
pub struct WarningLog {
    seen: Mutex<HashSet<(String, String)>>,
}

impl WarningLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` the first time a (kind, reason) pair is recorded.
    pub fn first_occurrence(&self, kind: &str, reason: &str) -> bool {
        let mut seen = self.seen.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        seen.insert((kind.to_string(), reason.to_string()))
    }

    /// Forgets every recorded pair.
    pub fn reset(&self) {
        self.seen
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clear();
    }

    pub fn recorded(&self) -> usize {
        self.seen
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_pair_is_reported_once_until_reset() {
        let log = WarningLog::new();
        assert!(log.first_occurrence("type_metadata", "query_failed"));
        assert!(!log.first_occurrence("type_metadata", "query_failed"));
        assert!(log.first_occurrence("type_metadata", "invalid_rows"));
        assert_eq!(log.recorded(), 2);

        log.reset();
        assert_eq!(log.recorded(), 0);
        assert!(log.first_occurrence("type_metadata", "query_failed"));
    }
}
