//! # Request History
//!
//! Keeps the most recent exchanges with the service so a report can show
//! which calls a scenario made.

use std::collections::VecDeque;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::http::method::HttpMethod;

/// Maximum number of history entries to retain.
const MAX_HISTORY_ENTRIES: usize = 100;

/// One request and its outcome. `status` is `None` when no response arrived.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub timestamp: u64,
    pub method: HttpMethod,
    pub url: String,
    pub status: Option<u16>,
    pub duration_ms: Option<u128>,
}

/// Seconds since the Unix epoch, or 0 if the clock is before it.
pub fn unix_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.as_secs())
        .unwrap_or(0)
}

#[derive(Debug, Clone, Default)]
pub struct History {
    entries: VecDeque<HistoryEntry>,
}

impl History {
    pub fn new() -> Self {
        Self {
            entries: VecDeque::new(),
        }
    }

    /// Add an entry to the front of the history list, evicting the oldest
    /// entry if the list exceeds the maximum size.
    pub fn push(&mut self, entry: HistoryEntry) {
        if self.entries.len() >= MAX_HISTORY_ENTRIES {
            self.entries.pop_back();
        }
        self.entries.push_front(entry);
    }

    /// Return all history entries (most recent first).
    pub fn entries(&self) -> &VecDeque<HistoryEntry> {
        &self.entries
    }

    /// Empty the history, returning entries oldest first.
    pub fn drain_chronological(&mut self) -> Vec<HistoryEntry> {
        self.entries.drain(..).rev().collect()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exchange(method: HttpMethod, path: &str, status: Option<u16>) -> HistoryEntry {
        HistoryEntry {
            timestamp: 1_700_000_000,
            method,
            url: format!("https://petfriends.skillfactory.ru/{path}"),
            status,
            duration_ms: status.map(|_| 12),
        }
    }

    #[test]
    fn newest_exchange_is_listed_first() {
        let mut history = History::new();
        history.push(exchange(HttpMethod::Get, "api/key", Some(200)));
        history.push(exchange(HttpMethod::Delete, "api/pets/p1", Some(200)));

        let entries = history.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].method, HttpMethod::Delete);
        assert!(entries[0].url.ends_with("api/pets/p1"));
        assert!(entries[1].url.ends_with("api/key"));
    }

    #[test]
    fn long_runs_keep_only_the_latest_requests() {
        let mut history = History::new();
        for n in 0..MAX_HISTORY_ENTRIES + 3 {
            history.push(exchange(HttpMethod::Put, &format!("api/pets/p{n}"), Some(200)));
        }

        assert_eq!(history.entries().len(), MAX_HISTORY_ENTRIES);
        let newest = format!("api/pets/p{}", MAX_HISTORY_ENTRIES + 2);
        assert!(history.entries()[0].url.ends_with(&newest));
        assert!(history.entries().iter().all(|entry| !entry.url.ends_with("api/pets/p0")));
    }

    #[test]
    fn drain_returns_scenario_calls_in_order() {
        let mut history = History::new();
        history.push(exchange(HttpMethod::Get, "api/key", Some(200)));
        history.push(exchange(HttpMethod::Get, "api/pets?filter=my_pets", Some(200)));
        history.push(exchange(HttpMethod::Post, "api/pets/set_photo/p1", None));

        let drained = history.drain_chronological();
        let statuses: Vec<_> = drained.iter().map(|entry| entry.status).collect();
        assert_eq!(statuses, [Some(200), Some(200), None]);
        assert_eq!(drained[2].method, HttpMethod::Post);
        assert_eq!(drained[2].duration_ms, None);
        assert!(history.entries().is_empty());
    }

    #[test]
    fn clear_drops_failed_requests_too() {
        let mut history = History::new();
        history.push(exchange(HttpMethod::Get, "api/key", Some(403)));
        history.push(exchange(HttpMethod::Get, "api/key", None));
        history.clear();
        assert!(history.drain_chronological().is_empty());
    }
}
