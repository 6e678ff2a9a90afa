use async_trait::async_trait;

use crate::contract::model::Document;

/// Port for the domain layer: whole-document persistence.
///
/// `load` returns the full document, writing the seed document first when no
/// storage exists yet. `save` replaces the stored document entirely; there is
/// no concurrency token, the last writer wins.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn load(&self) -> anyhow::Result<Document>;
    async fn save(&self, doc: &Document) -> anyhow::Result<()>;
}
