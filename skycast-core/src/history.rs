use std::sync::Arc;

use crate::store::KvStore;

/// Store key holding the serialized search list.
pub const HISTORY_KEY: &str = "recent_searches";

/// At most this many terms are kept.
pub const MAX_ENTRIES: usize = 5;

/// Bounded, deduplicated list of recent search terms, most recent first.
///
/// Every mutation writes the full serialized list back to the store, so the
/// persisted and in-memory representations never drift apart. Persistence
/// failures are logged, not surfaced.
pub struct RecentHistory {
    entries: Vec<String>,
    store: Arc<dyn KvStore>,
}

impl RecentHistory {
    /// Load persisted history. Missing or malformed data yields an empty list.
    pub fn load(store: Arc<dyn KvStore>) -> Self {
        let mut entries = store
            .get(HISTORY_KEY)
            .and_then(|raw| serde_json::from_str::<Vec<String>>(&raw).ok())
            .unwrap_or_default();
        entries.truncate(MAX_ENTRIES);

        Self { entries, store }
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert `term` at the front. A prior occurrence of the same value moves
    /// to the front instead of duplicating; the list is then capped at
    /// [`MAX_ENTRIES`] and persisted in full.
    pub fn record(&mut self, term: &str) {
        self.entries.retain(|t| t != term);
        self.entries.insert(0, term.to_string());
        self.entries.truncate(MAX_ENTRIES);
        self.persist();
    }

    /// Empty the list and drop the persisted record entirely.
    pub fn clear(&mut self) {
        self.entries.clear();
        if let Err(err) = self.store.remove(HISTORY_KEY) {
            tracing::warn!("failed to remove persisted search history: {err:#}");
        }
    }

    fn persist(&self) {
        match serde_json::to_string(&self.entries) {
            Ok(raw) => {
                if let Err(err) = self.store.set(HISTORY_KEY, &raw) {
                    tracing::warn!("failed to persist search history: {err:#}");
                }
            }
            Err(err) => tracing::warn!("failed to serialize search history: {err}"),
        }
    }
}
