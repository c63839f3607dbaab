//! History ledger
//!
//! Layout of the persisted document:
//! ```text
//! {
//!   "2024-05-01": [
//!     { "title", "url", "canonical_url", "favicon_id", "visits": [epoch, ...] }
//!   ]
//! }
//! ```

use chrono::{DateTime, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

use veil_storage::{load_json, save_json, DocumentStore};

use crate::canonical::PageKey;
use crate::error::HistoryError;
use crate::Result;

const HISTORY_DOCUMENT: &str = "history";
const PARTITION_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Last title seen for this page on this date
    pub title: String,
    /// URL as first reported by the engine
    pub url: String,
    pub canonical_url: String,
    pub favicon_id: String,
    /// Epoch seconds, oldest first
    pub visits: Vec<f64>,
}

impl HistoryEntry {
    pub fn visit_count(&self) -> usize {
        self.visits.len()
    }

    pub fn last_visit(&self) -> Option<f64> {
        self.visits.last().copied()
    }
}

/// All history, bucketed by local calendar date.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HistoryDocument {
    partitions: BTreeMap<String, Vec<HistoryEntry>>,
}

impl HistoryDocument {
    pub fn partition_key(now: &DateTime<Local>) -> String {
        now.format(PARTITION_FORMAT).to_string()
    }

    /// Entries of one date, in first-visit order
    pub fn partition(&self, date: &str) -> &[HistoryEntry] {
        self.partitions.get(date).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Dates that have at least one entry, oldest first
    pub fn dates(&self) -> impl Iterator<Item = &str> {
        self.partitions.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.partitions.values().all(Vec::is_empty)
    }

    pub fn entry_count(&self) -> usize {
        self.partitions.values().map(Vec::len).sum()
    }

    /// Apply one visit. Returns a copy of the entry as it now stands.
    pub fn record(
        &mut self,
        raw_url: &str,
        title: &str,
        now: &DateTime<Local>,
    ) -> HistoryEntry {
        let key = PageKey::from_url(raw_url);
        let timestamp = now.timestamp_micros() as f64 / 1_000_000.0;

        let entries = self
            .partitions
            .entry(Self::partition_key(now))
            .or_default();

        match entries
            .iter_mut()
            .find(|entry| entry.canonical_url == key.canonical_url)
        {
            Some(existing) => {
                existing.visits.push(timestamp);
                existing.title = title.to_string();
                existing.clone()
            }
            None => {
                let entry = HistoryEntry {
                    title: title.to_string(),
                    url: raw_url.to_string(),
                    canonical_url: key.canonical_url,
                    favicon_id: key.favicon_id,
                    visits: vec![timestamp],
                };
                entries.push(entry.clone());
                entry
            }
        }
    }
}

/// Persistent, date-partitioned record of visited pages.
#[derive(Clone)]
pub struct HistoryLedger {
    store: Arc<dyn DocumentStore>,
}

impl HistoryLedger {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Read the whole ledger. A ledger that was never written is empty.
    pub fn load(&self) -> Result<HistoryDocument> {
        Ok(load_json(self.store.as_ref(), HISTORY_DOCUMENT)?)
    }

    /// Record a finished page load.
    ///
    /// Within the date partition of `now`, a page whose canonical URL is
    /// already present gets `now` appended to its visits and its title
    /// replaced; otherwise a new entry is added. The full ledger is then
    /// written back.
    pub fn record_visit(
        &self,
        raw_url: &str,
        title: &str,
        now: DateTime<Local>,
    ) -> Result<HistoryEntry> {
        let mut document = self.load()?;
        let entry = document.record(raw_url, title, &now);
        save_json(self.store.as_ref(), HISTORY_DOCUMENT, &document)?;

        tracing::debug!(
            url = %entry.canonical_url,
            visits = entry.visit_count(),
            "Recorded history visit"
        );

        Ok(entry)
    }

    /// Entries for one `YYYY-MM-DD` date
    pub fn entries_on(&self, date: &str) -> Result<Vec<HistoryEntry>> {
        NaiveDate::parse_from_str(date, PARTITION_FORMAT)
            .map_err(|_| HistoryError::InvalidDate(date.to_string()))?;

        Ok(self.load()?.partition(date).to_vec())
    }

    /// Case-insensitive substring search over titles and URLs, newest date first.
    pub fn search(&self, query: &str) -> Result<Vec<HistoryEntry>> {
        let document = self.load()?;
        let needle = query.to_lowercase();

        let results = document
            .partitions
            .values()
            .rev()
            .flat_map(|entries| entries.iter())
            .filter(|entry| {
                entry.title.to_lowercase().contains(&needle)
                    || entry.url.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect();

        Ok(results)
    }

    /// Remove all history
    pub fn clear(&self) -> Result<()> {
        self.store.remove(HISTORY_DOCUMENT)?;
        tracing::info!("Cleared browsing history");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use veil_storage::{JsonFileStore, MemoryStore};

    fn at(day: u32, hour: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 5, day, hour, 0, 0).unwrap()
    }

    fn ledger() -> HistoryLedger {
        HistoryLedger::new(Arc::new(MemoryStore::new()))
    }

    #[test]
    fn test_empty_store_loads_empty_ledger() {
        let doc = ledger().load().unwrap();
        assert!(doc.is_empty());
        assert_eq!(doc.entry_count(), 0);
    }

    #[test]
    fn test_repeat_visits_aggregate_on_same_date() {
        let ledger = ledger();

        ledger.record_visit("https://example.com", "First", at(1, 9)).unwrap();
        ledger.record_visit("https://Example.com/", "Second", at(1, 10)).unwrap();
        let entry = ledger
            .record_visit("https://example.com:443", "Third", at(1, 11))
            .unwrap();

        assert_eq!(entry.visit_count(), 3);
        assert_eq!(entry.title, "Third");
        assert_eq!(entry.url, "https://example.com");
        assert_eq!(
            entry.visits,
            vec![
                at(1, 9).timestamp() as f64,
                at(1, 10).timestamp() as f64,
                at(1, 11).timestamp() as f64,
            ]
        );

        let doc = ledger.load().unwrap();
        assert_eq!(doc.entry_count(), 1);
    }

    #[test]
    fn test_distinct_urls_make_distinct_entries() {
        let ledger = ledger();

        ledger.record_visit("https://example.com/a", "A", at(1, 9)).unwrap();
        ledger.record_visit("https://example.com/b", "B", at(1, 9)).unwrap();

        let entries = ledger.entries_on("2024-05-01").unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].title, "A");
        assert_eq!(entries[1].title, "B");
        assert_eq!(entries[0].favicon_id, entries[1].favicon_id);
    }

    #[test]
    fn test_dates_are_never_merged() {
        let ledger = ledger();

        ledger.record_visit("https://example.com", "Mon", at(1, 23)).unwrap();
        ledger.record_visit("https://example.com", "Tue", at(2, 0)).unwrap();

        let doc = ledger.load().unwrap();
        assert_eq!(doc.dates().collect::<Vec<_>>(), vec!["2024-05-01", "2024-05-02"]);
        assert_eq!(doc.partition("2024-05-01")[0].visit_count(), 1);
        assert_eq!(doc.partition("2024-05-02")[0].visit_count(), 1);
        assert_eq!(doc.partition("2024-05-02")[0].title, "Tue");
    }

    #[test]
    fn test_unparseable_url_is_kept_raw() {
        let ledger = ledger();
        let entry = ledger.record_visit("not a url", "Odd", at(1, 9)).unwrap();
        assert_eq!(entry.canonical_url, "not a url");
        assert_eq!(entry.favicon_id, crate::favicon_id(""));
    }

    #[test]
    fn test_prior_visits_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();

        HistoryLedger::new(Arc::new(JsonFileStore::new(dir.path())))
            .record_visit("https://rust-lang.org", "Rust", at(3, 8))
            .unwrap();

        let reopened = HistoryLedger::new(Arc::new(JsonFileStore::new(dir.path())));
        let entry = reopened
            .record_visit("https://rust-lang.org", "Rust Lang", at(3, 9))
            .unwrap();
        assert_eq!(entry.visit_count(), 2);

        let raw = std::fs::read_to_string(dir.path().join("history.json")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        let entry = &value["2024-05-03"][0];
        assert_eq!(entry["canonical_url"], "https://rust-lang.org/");
        assert_eq!(entry["title"], "Rust Lang");
        assert_eq!(entry["visits"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_corrupt_ledger_is_not_overwritten() {
        let store = Arc::new(MemoryStore::new());
        store.write("history", "{ truncated").unwrap();

        let ledger = HistoryLedger::new(store.clone());
        assert!(ledger.record_visit("https://example.com", "x", at(1, 9)).is_err());
        assert_eq!(store.read("history").unwrap().as_deref(), Some("{ truncated"));
    }

    #[test]
    fn test_search_and_clear() {
        let ledger = ledger();
        ledger.record_visit("https://rust-lang.org", "Rust", at(1, 9)).unwrap();
        ledger.record_visit("https://example.com", "Example", at(2, 9)).unwrap();
        ledger.record_visit("https://docs.rs", "Docs for RUST crates", at(2, 10)).unwrap();

        let hits = ledger.search("rust").unwrap();
        assert_eq!(hits.len(), 2);
        // Newest date first
        assert_eq!(hits[0].title, "Docs for RUST crates");

        assert!(matches!(
            ledger.entries_on("May 1st"),
            Err(HistoryError::InvalidDate(_))
        ));

        ledger.clear().unwrap();
        assert!(ledger.load().unwrap().is_empty());
    }
}
