use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

use crate::contract::model::{Buyer, BuyerPatch, Item, ItemPatch, NewBuyer, NewItem};

// Field order is alphabetical: records are rendered with sorted keys.

/// REST DTO for an inventory item
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ItemDto {
    pub buy_price: Option<f64>,
    pub category: Option<String>,
    pub color: Option<String>,
    pub created_at: DateTime<Utc>,
    pub id: String,
    pub image_uri: Option<String>,
    pub interested_buyers: Vec<String>,
    pub name: String,
    pub sell_price: Option<f64>,
    pub updated_at: DateTime<Utc>,
}

/// REST DTO for a buyer
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BuyerDto {
    pub created_at: DateTime<Utc>,
    pub email: String,
    pub id: String,
    pub name: String,
    pub updated_at: DateTime<Utc>,
    pub wishlist: Vec<String>,
}

/// REST DTO for creating an item. `id` and `name` are required; presence is
/// checked by the service so a missing field yields 422, not a parse error.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateItemReq {
    pub id: Option<String>,
    pub name: Option<String>,
    pub category: Option<String>,
    pub color: Option<String>,
    pub sell_price: Option<f64>,
    pub buy_price: Option<f64>,
    pub image_uri: Option<String>,
}

/// REST DTO for updating an item (partial). An explicit `null` clears a field.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateItemReq {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_some")]
    #[schema(value_type = Option<String>)]
    pub category: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    #[schema(value_type = Option<String>)]
    pub color: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    #[schema(value_type = Option<f64>)]
    pub sell_price: Option<Option<f64>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    #[schema(value_type = Option<f64>)]
    pub buy_price: Option<Option<f64>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    #[schema(value_type = Option<String>)]
    pub image_uri: Option<Option<String>>,
}

/// REST DTO for creating a buyer
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBuyerReq {
    pub id: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub wishlist: Option<Vec<String>>,
}

/// REST DTO for updating a buyer (partial)
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBuyerReq {
    pub name: Option<String>,
    pub email: Option<String>,
    pub wishlist: Option<Vec<String>>,
}

/// Body of the item ↔ buyer relation endpoints
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RelationReq {
    pub buyer_id: Option<String>,
}

/// Present-but-null becomes `Some(None)`; an absent key stays `None` via `default`.
fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

// Conversion implementations between REST DTOs and contract models

impl From<Item> for ItemDto {
    fn from(item: Item) -> Self {
        Self {
            buy_price: item.buy_price,
            category: item.category,
            color: item.color,
            created_at: item.created_at,
            id: item.id,
            image_uri: item.image_uri,
            interested_buyers: item.interested_buyers,
            name: item.name,
            sell_price: item.sell_price,
            updated_at: item.updated_at,
        }
    }
}

impl From<Buyer> for BuyerDto {
    fn from(buyer: Buyer) -> Self {
        Self {
            created_at: buyer.created_at,
            email: buyer.email,
            id: buyer.id,
            name: buyer.name,
            updated_at: buyer.updated_at,
            wishlist: buyer.wishlist,
        }
    }
}

impl From<CreateItemReq> for NewItem {
    fn from(req: CreateItemReq) -> Self {
        Self {
            id: req.id,
            name: req.name,
            category: req.category,
            color: req.color,
            sell_price: req.sell_price,
            buy_price: req.buy_price,
            image_uri: req.image_uri,
        }
    }
}

impl From<UpdateItemReq> for ItemPatch {
    fn from(req: UpdateItemReq) -> Self {
        Self {
            name: req.name,
            category: req.category,
            color: req.color,
            sell_price: req.sell_price,
            buy_price: req.buy_price,
            image_uri: req.image_uri,
        }
    }
}

impl From<CreateBuyerReq> for NewBuyer {
    fn from(req: CreateBuyerReq) -> Self {
        Self {
            id: req.id,
            name: req.name,
            email: req.email,
            wishlist: req.wishlist,
        }
    }
}

impl From<UpdateBuyerReq> for BuyerPatch {
    fn from(req: UpdateBuyerReq) -> Self {
        Self {
            name: req.name,
            email: req.email,
            wishlist: req.wishlist,
        }
    }
}
