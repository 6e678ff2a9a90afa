use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{SubsecRound, Utc};
use parking_lot::Mutex;

use crate::contract::model::Document;
use crate::domain::seed::seed_document;
use crate::domain::store::DocumentStore;

/// Process-local document store. Backs `--mock` runs and tests.
pub struct InMemoryStore {
    doc: Mutex<Option<Document>>,
    seed_buyers: usize,
    saves: AtomicUsize,
}

impl InMemoryStore {
    /// Empty store that seeds itself on first load, like a missing file.
    pub fn new(seed_buyers: usize) -> Self {
        Self {
            doc: Mutex::new(None),
            seed_buyers,
            saves: AtomicUsize::new(0),
        }
    }

    pub fn with_document(doc: Document) -> Self {
        Self {
            doc: Mutex::new(Some(doc)),
            seed_buyers: 0,
            saves: AtomicUsize::new(0),
        }
    }

    /// Current contents, or `None` before the first load.
    pub fn snapshot(&self) -> Option<Document> {
        self.doc.lock().clone()
    }

    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn load(&self) -> anyhow::Result<Document> {
        let mut guard = self.doc.lock();
        if let Some(doc) = guard.as_ref() {
            return Ok(doc.clone());
        }
        let doc = seed_document(self.seed_buyers, Utc::now().trunc_subsecs(3))?;
        *guard = Some(doc.clone());
        Ok(doc)
    }

    async fn save(&self, doc: &Document) -> anyhow::Result<()> {
        *self.doc.lock() = Some(doc.clone());
        self.saves.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn seeds_lazily_then_round_trips() {
        let store = InMemoryStore::new(2);
        assert!(store.snapshot().is_none());

        let mut doc = store.load().await.unwrap();
        assert_eq!(doc.buyers.len(), 2);

        doc.buyers.clear();
        store.save(&doc).await.unwrap();
        assert!(store.load().await.unwrap().buyers.is_empty());
        assert_eq!(store.save_count(), 1);
    }
}
