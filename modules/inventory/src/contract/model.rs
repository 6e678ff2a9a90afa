use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Root persisted object: every collection the service owns.
///
/// The whole document is read at the start of each request and rewritten
/// in full after every successful mutation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    #[serde(default)]
    pub inventory: Vec<Item>,
    #[serde(default)]
    pub buyers: Vec<Buyer>,
}

impl Document {
    pub fn item(&self, id: &str) -> Option<&Item> {
        self.inventory.iter().find(|i| i.id == id)
    }

    pub fn item_mut(&mut self, id: &str) -> Option<&mut Item> {
        self.inventory.iter_mut().find(|i| i.id == id)
    }

    pub fn buyer(&self, id: &str) -> Option<&Buyer> {
        self.buyers.iter().find(|b| b.id == id)
    }

    pub fn buyer_mut(&mut self, id: &str) -> Option<&mut Buyer> {
        self.buyers.iter_mut().find(|b| b.id == id)
    }

    pub fn buyer_by_email(&self, email: &str) -> Option<&Buyer> {
        self.buyers.iter().find(|b| b.email == email)
    }
}

/// Inventory item (a houseware) as persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: String,
    pub name: String,
    pub category: Option<String>,
    pub color: Option<String>,
    pub sell_price: Option<f64>,
    pub buy_price: Option<f64>,
    pub image_uri: Option<String>,
    /// Buyer ids in insertion order, without duplicates.
    #[serde(default)]
    pub interested_buyers: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Buyer as persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Buyer {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub wishlist: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Data for creating an item. Required fields are optional here so that
/// presence is checked by the service, not by deserialization.
#[derive(Debug, Clone, Default)]
pub struct NewItem {
    pub id: Option<String>,
    pub name: Option<String>,
    pub category: Option<String>,
    pub color: Option<String>,
    pub sell_price: Option<f64>,
    pub buy_price: Option<f64>,
    pub image_uri: Option<String>,
}

/// Partial update for an item.
///
/// Outer `None` leaves a field untouched; `Some(None)` clears a nullable field.
/// `id`, `createdAt` and `interestedBuyers` cannot be patched.
#[derive(Debug, Clone, Default)]
pub struct ItemPatch {
    pub name: Option<String>,
    pub category: Option<Option<String>>,
    pub color: Option<Option<String>>,
    pub sell_price: Option<Option<f64>>,
    pub buy_price: Option<Option<f64>>,
    pub image_uri: Option<Option<String>>,
}

impl ItemPatch {
    /// Overlay the present fields onto `item` and stamp `updated_at`.
    pub fn apply(self, item: &mut Item, now: DateTime<Utc>) {
        if let Some(name) = self.name {
            item.name = name;
        }
        if let Some(category) = self.category {
            item.category = category;
        }
        if let Some(color) = self.color {
            item.color = color;
        }
        if let Some(sell_price) = self.sell_price {
            item.sell_price = sell_price;
        }
        if let Some(buy_price) = self.buy_price {
            item.buy_price = buy_price;
        }
        if let Some(image_uri) = self.image_uri {
            item.image_uri = image_uri;
        }
        item.updated_at = now;
    }
}

/// Data for creating a buyer. A missing `id` is generated by the service.
#[derive(Debug, Clone, Default)]
pub struct NewBuyer {
    pub id: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub wishlist: Option<Vec<String>>,
}

/// Partial update for a buyer. `id` and `createdAt` cannot be patched.
#[derive(Debug, Clone, Default)]
pub struct BuyerPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub wishlist: Option<Vec<String>>,
}

impl BuyerPatch {
    pub fn apply(self, buyer: &mut Buyer, now: DateTime<Utc>) {
        if let Some(name) = self.name {
            buyer.name = name;
        }
        if let Some(email) = self.email {
            buyer.email = email;
        }
        if let Some(wishlist) = self.wishlist {
            buyer.wishlist = wishlist;
        }
        buyer.updated_at = now;
    }
}
