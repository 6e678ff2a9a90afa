use std::sync::Arc;

use chrono::{DateTime, Duration, SubsecRound, Utc};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::contract::model::{Buyer, BuyerPatch, Document, Item, ItemPatch, NewBuyer, NewItem};
use crate::domain::error::{DomainError, Resource};
use crate::domain::store::DocumentStore;

/// Configuration for the domain service
#[derive(Debug, Clone, Default)]
pub struct ServiceConfig {
    /// Serialize every load→mutate→save cycle behind one async lock.
    pub serialize_writes: bool,
}

/// Domain service: every operation loads the document, works on the
/// in-memory copy and, for mutations, saves the whole document back.
#[derive(Clone)]
pub struct Service {
    store: Arc<dyn DocumentStore>,
    write_gate: Option<Arc<Mutex<()>>>,
}

/// Timestamp for a mutation: millisecond precision, strictly after `previous`.
fn next_timestamp(previous: Option<DateTime<Utc>>) -> DateTime<Utc> {
    let now = Utc::now().trunc_subsecs(3);
    match previous {
        Some(prev) if prev >= now => prev + Duration::milliseconds(1),
        _ => now,
    }
}

/// A required string counts as present only when non-empty.
fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// A patch may not set a required string to a blank value.
fn reject_blank(fields: &[(&'static str, Option<&String>)]) -> Result<(), DomainError> {
    let missing: Vec<&'static str> = fields
        .iter()
        .filter(|(_, value)| value.is_some_and(|v| v.trim().is_empty()))
        .map(|(name, _)| *name)
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(DomainError::missing_fields(missing))
    }
}

impl Service {
    pub fn new(store: Arc<dyn DocumentStore>, config: ServiceConfig) -> Self {
        Self {
            store,
            write_gate: config
                .serialize_writes
                .then(|| Arc::new(Mutex::new(()))),
        }
    }

    async fn snapshot(&self) -> Result<Document, DomainError> {
        self.store
            .load()
            .await
            .map_err(|e| DomainError::storage(&e))
    }

    /// Load, apply `f`, save. Nothing is saved when `f` fails, so a rejected
    /// request never leaves a partial mutation behind.
    async fn mutate<T, F>(&self, f: F) -> Result<T, DomainError>
    where
        F: FnOnce(&mut Document) -> Result<T, DomainError> + Send,
        T: Send,
    {
        let _guard = match &self.write_gate {
            Some(gate) => Some(gate.lock().await),
            None => None,
        };

        let mut doc = self.snapshot().await?;
        let out = f(&mut doc)?;
        self.store
            .save(&doc)
            .await
            .map_err(|e| DomainError::storage(&e))?;
        Ok(out)
    }

    // --- items ---

    #[instrument(name = "inventory.service.list_items", skip(self))]
    pub async fn list_items(&self) -> Result<Vec<Item>, DomainError> {
        let doc = self.snapshot().await?;
        debug!(count = doc.inventory.len(), "Listed items");
        Ok(doc.inventory)
    }

    #[instrument(name = "inventory.service.get_item", skip(self))]
    pub async fn get_item(&self, id: &str) -> Result<Item, DomainError> {
        let doc = self.snapshot().await?;
        doc.item(id)
            .cloned()
            .ok_or_else(|| DomainError::item_not_found(id))
    }

    #[instrument(name = "inventory.service.create_item", skip(self, new_item))]
    pub async fn create_item(&self, new_item: NewItem) -> Result<Item, DomainError> {
        info!("Creating item");
        let item = self
            .mutate(move |doc| {
                let (id, name) = match (present(new_item.id), present(new_item.name)) {
                    (Some(id), Some(name)) => (id, name),
                    (id, name) => {
                        let mut missing = Vec::new();
                        if id.is_none() {
                            missing.push("id");
                        }
                        if name.is_none() {
                            missing.push("name");
                        }
                        return Err(DomainError::missing_fields(missing));
                    }
                };
                if doc.item(&id).is_some() {
                    return Err(DomainError::already_exists(Resource::Item, id));
                }

                let now = next_timestamp(None);
                let item = Item {
                    id,
                    name,
                    category: new_item.category,
                    color: new_item.color,
                    sell_price: new_item.sell_price,
                    buy_price: new_item.buy_price,
                    image_uri: new_item.image_uri,
                    interested_buyers: Vec::new(),
                    created_at: now,
                    updated_at: now,
                };
                doc.inventory.push(item.clone());
                Ok(item)
            })
            .await?;
        info!(item_id = %item.id, "Created item");
        Ok(item)
    }

    #[instrument(name = "inventory.service.update_item", skip(self, patch))]
    pub async fn update_item(&self, id: &str, patch: ItemPatch) -> Result<Item, DomainError> {
        info!("Updating item");
        self.mutate(|doc| {
            let item = doc
                .item_mut(id)
                .ok_or_else(|| DomainError::item_not_found(id))?;
            reject_blank(&[("name", patch.name.as_ref())])?;
            let now = next_timestamp(Some(item.updated_at));
            patch.apply(item, now);
            Ok(item.clone())
        })
        .await
    }

    #[instrument(name = "inventory.service.delete_item", skip(self))]
    pub async fn delete_item(&self, id: &str) -> Result<(), DomainError> {
        info!("Deleting item");
        self.mutate(|doc| {
            let idx = doc
                .inventory
                .iter()
                .position(|i| i.id == id)
                .ok_or_else(|| DomainError::item_not_found(id))?;
            doc.inventory.remove(idx);
            Ok(())
        })
        .await
    }

    // --- buyers ---

    #[instrument(name = "inventory.service.list_buyers", skip(self))]
    pub async fn list_buyers(&self) -> Result<Vec<Buyer>, DomainError> {
        let doc = self.snapshot().await?;
        debug!(count = doc.buyers.len(), "Listed buyers");
        Ok(doc.buyers)
    }

    #[instrument(name = "inventory.service.get_buyer", skip(self))]
    pub async fn get_buyer(&self, id: &str) -> Result<Buyer, DomainError> {
        let doc = self.snapshot().await?;
        doc.buyer(id)
            .cloned()
            .ok_or_else(|| DomainError::buyer_not_found(id))
    }

    #[instrument(name = "inventory.service.create_buyer", skip(self, new_buyer))]
    pub async fn create_buyer(&self, new_buyer: NewBuyer) -> Result<Buyer, DomainError> {
        info!("Creating buyer");
        let buyer = self
            .mutate(move |doc| {
                let (name, email) = match (present(new_buyer.name), present(new_buyer.email)) {
                    (Some(name), Some(email)) => (name, email),
                    (name, email) => {
                        let mut missing = Vec::new();
                        if name.is_none() {
                            missing.push("name");
                        }
                        if email.is_none() {
                            missing.push("email");
                        }
                        return Err(DomainError::missing_fields(missing));
                    }
                };
                if doc.buyer_by_email(&email).is_some() {
                    return Err(DomainError::already_exists(Resource::Buyer, email));
                }
                let id = match present(new_buyer.id) {
                    Some(id) if doc.buyer(&id).is_some() => {
                        return Err(DomainError::already_exists(Resource::Buyer, id));
                    }
                    Some(id) => id,
                    None => Uuid::new_v4().to_string(),
                };

                let now = next_timestamp(None);
                let buyer = Buyer {
                    id,
                    name,
                    email,
                    wishlist: new_buyer.wishlist.unwrap_or_default(),
                    created_at: now,
                    updated_at: now,
                };
                doc.buyers.push(buyer.clone());
                Ok(buyer)
            })
            .await?;
        info!(buyer_id = %buyer.id, "Created buyer");
        Ok(buyer)
    }

    #[instrument(name = "inventory.service.update_buyer", skip(self, patch))]
    pub async fn update_buyer(&self, id: &str, patch: BuyerPatch) -> Result<Buyer, DomainError> {
        info!("Updating buyer");
        self.mutate(|doc| {
            if doc.buyer(id).is_none() {
                return Err(DomainError::buyer_not_found(id));
            }
            reject_blank(&[("name", patch.name.as_ref()), ("email", patch.email.as_ref())])?;
            if let Some(email) = &patch.email {
                if doc.buyers.iter().any(|b| b.id != id && &b.email == email) {
                    return Err(DomainError::already_exists(Resource::Buyer, email.clone()));
                }
            }
            let buyer = doc
                .buyer_mut(id)
                .ok_or_else(|| DomainError::buyer_not_found(id))?;
            let now = next_timestamp(Some(buyer.updated_at));
            patch.apply(buyer, now);
            Ok(buyer.clone())
        })
        .await
    }

    /// Removes the buyer and drops its id from every item's interested buyers.
    #[instrument(name = "inventory.service.delete_buyer", skip(self))]
    pub async fn delete_buyer(&self, id: &str) -> Result<(), DomainError> {
        info!("Deleting buyer");
        self.mutate(|doc| {
            let idx = doc
                .buyers
                .iter()
                .position(|b| b.id == id)
                .ok_or_else(|| DomainError::buyer_not_found(id))?;
            doc.buyers.remove(idx);

            let mut unlinked = 0usize;
            for item in &mut doc.inventory {
                let before = item.interested_buyers.len();
                item.interested_buyers.retain(|b| b != id);
                unlinked += before - item.interested_buyers.len();
            }
            debug!(unlinked, "Removed buyer from interested lists");
            Ok(())
        })
        .await
    }

    // --- item ↔ buyer relation ---

    /// Buyers interested in an item, in link order. Ids that no longer resolve are skipped.
    #[instrument(name = "inventory.service.interested_buyers", skip(self))]
    pub async fn interested_buyers(&self, item_id: &str) -> Result<Vec<Buyer>, DomainError> {
        let doc = self.snapshot().await?;
        let item = doc
            .item(item_id)
            .ok_or_else(|| DomainError::item_not_found(item_id))?;

        let resolved: Vec<Buyer> = item
            .interested_buyers
            .iter()
            .filter_map(|bid| doc.buyer(bid).cloned())
            .collect();
        if resolved.len() != item.interested_buyers.len() {
            debug!(
                dangling = item.interested_buyers.len() - resolved.len(),
                "Skipped unresolvable buyer ids"
            );
        }
        Ok(resolved)
    }

    #[instrument(name = "inventory.service.add_interested_buyer", skip(self))]
    pub async fn add_interested_buyer(
        &self,
        item_id: &str,
        buyer_id: Option<String>,
    ) -> Result<Item, DomainError> {
        info!("Linking buyer to item");
        self.mutate(move |doc| {
            if doc.item(item_id).is_none() {
                return Err(DomainError::item_not_found(item_id));
            }
            let buyer_id =
                present(buyer_id).ok_or_else(|| DomainError::missing_fields(vec!["buyerId"]))?;
            if doc.buyer(&buyer_id).is_none() {
                return Err(DomainError::buyer_not_found(buyer_id));
            }
            let item = doc
                .item_mut(item_id)
                .ok_or_else(|| DomainError::item_not_found(item_id))?;
            if item.interested_buyers.contains(&buyer_id) {
                return Err(DomainError::already_exists(Resource::Buyer, buyer_id));
            }
            item.interested_buyers.push(buyer_id);
            item.updated_at = next_timestamp(Some(item.updated_at));
            Ok(item.clone())
        })
        .await
    }

    #[instrument(name = "inventory.service.remove_interested_buyer", skip(self))]
    pub async fn remove_interested_buyer(
        &self,
        item_id: &str,
        buyer_id: Option<String>,
    ) -> Result<(), DomainError> {
        info!("Unlinking buyer from item");
        self.mutate(move |doc| {
            let item = doc
                .item_mut(item_id)
                .ok_or_else(|| DomainError::item_not_found(item_id))?;
            let buyer_id =
                present(buyer_id).ok_or_else(|| DomainError::missing_fields(vec!["buyerId"]))?;
            let pos = item
                .interested_buyers
                .iter()
                .position(|b| *b == buyer_id)
                .ok_or_else(|| DomainError::not_modified(item_id, buyer_id.as_str()))?;
            item.interested_buyers.remove(pos);
            item.updated_at = next_timestamp(Some(item.updated_at));
            Ok(())
        })
        .await
    }
}
