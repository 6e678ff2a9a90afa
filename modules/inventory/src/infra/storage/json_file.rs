use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use async_trait::async_trait;
use chrono::{SubsecRound, Utc};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::contract::model::Document;
use crate::domain::seed::seed_document;
use crate::domain::store::DocumentStore;

/// Stores the whole document as one pretty-printed JSON file.
///
/// Writes go to a temp file in the same directory which is then renamed over
/// the target, so readers never observe a half-written document.
pub struct JsonFileStore {
    path: PathBuf,
    seed_buyers: usize,
    seed_lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>, seed_buyers: usize) -> Self {
        Self {
            path: path.into(),
            seed_buyers,
            seed_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `Ok(None)` when the file does not exist yet.
    async fn read_existing(&self) -> anyhow::Result<Option<Document>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => {
                let doc = serde_json::from_slice(&bytes)
                    .with_context(|| format!("failed to parse {}", self.path.display()))?;
                Ok(Some(doc))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => {
                Err(e).with_context(|| format!("failed to read {}", self.path.display()))
            }
        }
    }

    async fn seed(&self) -> anyhow::Result<Document> {
        let _guard = self.seed_lock.lock().await;
        // another request may have seeded while we waited
        if let Some(doc) = self.read_existing().await? {
            return Ok(doc);
        }

        info!(
            buyers = self.seed_buyers,
            "Loading document store from {} (new file, seeding)",
            self.path.display()
        );
        let doc = seed_document(self.seed_buyers, Utc::now().trunc_subsecs(3))?;
        self.save(&doc).await?;
        Ok(doc)
    }
}

#[async_trait]
impl DocumentStore for JsonFileStore {
    async fn load(&self) -> anyhow::Result<Document> {
        match self.read_existing().await? {
            Some(doc) => Ok(doc),
            None => self.seed().await,
        }
    }

    async fn save(&self, doc: &Document) -> anyhow::Result<()> {
        let bytes = serde_json::to_vec_pretty(doc).context("failed to serialize document")?;
        let path = self.path.clone();

        tokio::task::spawn_blocking(move || write_atomically(&path, &bytes))
            .await
            .context("document writer task failed")??;

        debug!(path = %self.path.display(), "Saved document");
        Ok(())
    }
}

fn write_atomically(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create directory {}", dir.display()))?;

    let mut tmp = tempfile::NamedTempFile::new_in(&dir)
        .with_context(|| format!("failed to create temp file in {}", dir.display()))?;
    tmp.write_all(bytes)
        .and_then(|_| tmp.as_file().sync_all())
        .with_context(|| format!("failed to write {}", path.display()))?;
    tmp.persist(path)
        .map_err(|e| e.error)
        .with_context(|| format!("failed to replace {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::model::Item;
    use tempfile::TempDir;

    #[tokio::test]
    async fn first_load_seeds_and_persists() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("db.json");
        let store = JsonFileStore::new(&path, 3);

        let first = store.load().await.unwrap();
        assert!(path.is_file());
        assert_eq!(first.buyers.len(), 3);
        assert!(!first.inventory.is_empty());

        // second load reads the same file instead of reseeding
        let second = store.load().await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn save_replaces_whole_document() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("db.json");
        let store = JsonFileStore::new(&path, 0);

        let now = Utc::now().trunc_subsecs(3);
        let doc = Document {
            inventory: vec![Item {
                id: "lamp".into(),
                name: "Lamp".into(),
                category: None,
                color: None,
                sell_price: Some(12.5),
                buy_price: None,
                image_uri: None,
                interested_buyers: vec![],
                created_at: now,
                updated_at: now,
            }],
            buyers: vec![],
        };
        store.save(&doc).await.unwrap();

        assert_eq!(store.load().await.unwrap(), doc);

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\n  \"inventory\""), "expected pretty JSON: {raw}");

        // no temp files left next to the document
        let entries = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[tokio::test]
    async fn corrupt_file_is_an_error_not_a_reseed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("db.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = JsonFileStore::new(&path, 1).load().await.unwrap_err();
        assert!(format!("{err:#}").contains("failed to parse"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{ not json");
    }

    #[tokio::test]
    async fn concurrent_first_loads_seed_once() {
        let dir = TempDir::new().unwrap();
        let store = std::sync::Arc::new(JsonFileStore::new(dir.path().join("db.json"), 4));

        let a = tokio::spawn({
            let s = store.clone();
            async move { s.load().await.unwrap() }
        });
        let b = tokio::spawn({
            let s = store.clone();
            async move { s.load().await.unwrap() }
        });
        let (a, b) = (a.await.unwrap(), b.await.unwrap());
        assert_eq!(a, b);
    }
}
