use anyhow::Context;
use chrono::{DateTime, Utc};
use rand::{seq::index, seq::SliceRandom, Rng};
use serde::Deserialize;
use uuid::Uuid;

use crate::contract::model::{Buyer, Document, Item};

const CATALOG_JSON: &str = include_str!("../../data/housewares.json");

/// Upper bound on interested buyers attached to one seeded item.
const MAX_INTERESTED: usize = 5;

const FIRST_NAMES: &[&str] = &[
    "Ada", "Bruno", "Chiara", "Dmitri", "Elena", "Farah", "Gustav", "Hana", "Ivan", "Jonas",
    "Keiko", "Luis", "Maya", "Nikolai", "Olga", "Priya", "Quentin", "Rosa", "Sven", "Tariq",
];

const LAST_NAMES: &[&str] = &[
    "Abbott", "Becker", "Castillo", "Dubois", "Eriksen", "Fischer", "Garcia", "Hoffman",
    "Ivanova", "Jensen", "Kowalski", "Lindqvist", "Moreau", "Novak", "Okafor", "Petrov",
];

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CatalogEntry {
    id: String,
    name: String,
    category: Option<String>,
    color: Option<String>,
    sell_price: Option<f64>,
    image_uri: Option<String>,
}

fn catalog() -> anyhow::Result<Vec<CatalogEntry>> {
    serde_json::from_str(CATALOG_JSON).context("embedded housewares catalog is not valid JSON")
}

/// Build the initial document using the thread-local RNG.
pub fn seed_document(buyer_count: usize, now: DateTime<Utc>) -> anyhow::Result<Document> {
    seed_document_with(&mut rand::thread_rng(), buyer_count, now)
}

/// Build the initial document: the static catalog plus `buyer_count` synthetic
/// buyers, each item linked to a random subset of them.
pub fn seed_document_with<R: Rng + ?Sized>(
    rng: &mut R,
    buyer_count: usize,
    now: DateTime<Utc>,
) -> anyhow::Result<Document> {
    let buyers: Vec<Buyer> = (0..buyer_count).map(|n| fake_buyer(rng, n, now)).collect();

    let inventory = catalog()?
        .into_iter()
        .map(|entry| Item {
            id: entry.id.to_lowercase(),
            name: entry.name,
            category: entry.category,
            color: entry.color,
            sell_price: entry.sell_price,
            buy_price: None,
            image_uri: entry.image_uri,
            interested_buyers: sample_buyer_ids(rng, &buyers),
            created_at: now,
            updated_at: now,
        })
        .collect();

    Ok(Document { inventory, buyers })
}

fn fake_buyer<R: Rng + ?Sized>(rng: &mut R, n: usize, now: DateTime<Utc>) -> Buyer {
    let first = FIRST_NAMES.choose(rng).copied().unwrap_or("Alex");
    let last = LAST_NAMES.choose(rng).copied().unwrap_or("Smith");
    Buyer {
        id: Uuid::new_v4().to_string(),
        name: format!("{first} {last}"),
        // the roster index keeps generated emails unique
        email: format!(
            "{}.{}{}@example.com",
            first.to_lowercase(),
            last.to_lowercase(),
            n + 1
        ),
        wishlist: Vec::new(),
        created_at: now,
        updated_at: now,
    }
}

/// Between 1 and `MAX_INTERESTED` distinct buyer ids, drawn without replacement.
fn sample_buyer_ids<R: Rng + ?Sized>(rng: &mut R, buyers: &[Buyer]) -> Vec<String> {
    if buyers.is_empty() {
        return Vec::new();
    }
    let amount = rng.gen_range(1..=MAX_INTERESTED.min(buyers.len()));
    index::sample(rng, buyers.len(), amount)
        .into_iter()
        .map(|i| buyers[i].id.clone())
        .collect()
}
