use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::Path,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    Extension,
};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::api::rest::dto::{
    BuyerDto, CreateBuyerReq, CreateItemReq, ItemDto, RelationReq, UpdateBuyerReq, UpdateItemReq,
};
use crate::domain::error::DomainError;
use crate::domain::service::Service;

/// Decode a JSON request body regardless of `Content-Type`.
///
/// An empty body is a request without any fields, so required-field checks
/// still answer 422. Anything else that fails to parse is a bare 400.
fn parse_body<T>(body: &Bytes) -> Result<T, Response>
where
    T: DeserializeOwned + Default,
{
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body).map_err(|e| {
        warn!(error = %e, "Rejected request body");
        StatusCode::BAD_REQUEST.into_response()
    })
}

/// List all inventory items
#[utoipa::path(
    get,
    path = "/inventory",
    tag = "inventory",
    operation_id = "inventory.list_items",
    responses(
        (status = 200, description = "All items in stored order", body = [ItemDto]),
        (status = 500, description = "Storage failure")
    )
)]
pub async fn list_items(
    Extension(svc): Extension<Arc<Service>>,
) -> Result<Json<Vec<ItemDto>>, DomainError> {
    let items = svc.list_items().await?;
    Ok(Json(items.into_iter().map(ItemDto::from).collect()))
}

/// Get an item by id
#[utoipa::path(
    get,
    path = "/inventory/{id}",
    tag = "inventory",
    operation_id = "inventory.get_item",
    params(("id" = String, Path, description = "Item id")),
    responses(
        (status = 200, description = "Item found", body = ItemDto),
        (status = 404, description = "No such item")
    )
)]
pub async fn get_item(
    Extension(svc): Extension<Arc<Service>>,
    Path(id): Path<String>,
) -> Result<Json<ItemDto>, DomainError> {
    Ok(Json(svc.get_item(&id).await?.into()))
}

/// Create an item
#[utoipa::path(
    post,
    path = "/inventory",
    tag = "inventory",
    operation_id = "inventory.create_item",
    request_body = CreateItemReq,
    responses(
        (status = 201, description = "Created item", body = ItemDto),
        (status = 400, description = "Body is not JSON"),
        (status = 409, description = "Item id already exists"),
        (status = 422, description = "Missing id or name")
    )
)]
pub async fn create_item(
    Extension(svc): Extension<Arc<Service>>,
    body: Bytes,
) -> Result<(StatusCode, Json<ItemDto>), Response> {
    let req = parse_body::<CreateItemReq>(&body)?;
    debug!(?req, "Create item request");
    let item = svc
        .create_item(req.into())
        .await
        .map_err(IntoResponse::into_response)?;
    Ok((StatusCode::CREATED, Json(item.into())))
}

/// Partially update an item
#[utoipa::path(
    patch,
    path = "/inventory/{id}",
    tag = "inventory",
    operation_id = "inventory.update_item",
    params(("id" = String, Path, description = "Item id")),
    request_body = UpdateItemReq,
    responses(
        (status = 200, description = "Updated item", body = ItemDto),
        (status = 400, description = "Body is not JSON"),
        (status = 404, description = "No such item"),
        (status = 422, description = "Blank name")
    )
)]
pub async fn update_item(
    Extension(svc): Extension<Arc<Service>>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<ItemDto>, Response> {
    let req = parse_body::<UpdateItemReq>(&body)?;
    debug!(?req, "Update item request");
    let item = svc
        .update_item(&id, req.into())
        .await
        .map_err(IntoResponse::into_response)?;
    Ok(Json(item.into()))
}

/// Delete an item
#[utoipa::path(
    delete,
    path = "/inventory/{id}",
    tag = "inventory",
    operation_id = "inventory.delete_item",
    params(("id" = String, Path, description = "Item id")),
    responses(
        (status = 204, description = "Item deleted"),
        (status = 404, description = "No such item")
    )
)]
pub async fn delete_item(
    Extension(svc): Extension<Arc<Service>>,
    Path(id): Path<String>,
) -> Result<StatusCode, DomainError> {
    svc.delete_item(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Buyers interested in an item
#[utoipa::path(
    get,
    path = "/inventory/{id}/buyers",
    tag = "inventory",
    operation_id = "inventory.list_interested_buyers",
    params(("id" = String, Path, description = "Item id")),
    responses(
        (status = 200, description = "Interested buyers in link order", body = [BuyerDto]),
        (status = 404, description = "No such item")
    )
)]
pub async fn list_interested_buyers(
    Extension(svc): Extension<Arc<Service>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<BuyerDto>>, DomainError> {
    let buyers = svc.interested_buyers(&id).await?;
    Ok(Json(buyers.into_iter().map(BuyerDto::from).collect()))
}

/// Mark a buyer as interested in an item
#[utoipa::path(
    post,
    path = "/inventory/{id}/buyers",
    tag = "inventory",
    operation_id = "inventory.add_interested_buyer",
    params(("id" = String, Path, description = "Item id")),
    request_body = RelationReq,
    responses(
        (status = 201, description = "Buyer linked; the updated item", body = ItemDto),
        (status = 400, description = "Body is not JSON"),
        (status = 404, description = "No such item or buyer"),
        (status = 409, description = "Buyer already linked"),
        (status = 422, description = "Missing buyerId")
    )
)]
pub async fn add_interested_buyer(
    Extension(svc): Extension<Arc<Service>>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<(StatusCode, Json<ItemDto>), Response> {
    let req = parse_body::<RelationReq>(&body)?;
    let item = svc
        .add_interested_buyer(&id, req.buyer_id)
        .await
        .map_err(IntoResponse::into_response)?;
    Ok((StatusCode::CREATED, Json(item.into())))
}

/// Remove a buyer from an item's interested list
#[utoipa::path(
    delete,
    path = "/inventory/{id}/buyers",
    tag = "inventory",
    operation_id = "inventory.remove_interested_buyer",
    params(("id" = String, Path, description = "Item id")),
    request_body = RelationReq,
    responses(
        (status = 204, description = "Buyer unlinked"),
        (status = 304, description = "Buyer was not linked"),
        (status = 400, description = "Body is not JSON"),
        (status = 404, description = "No such item"),
        (status = 422, description = "Missing buyerId")
    )
)]
pub async fn remove_interested_buyer(
    Extension(svc): Extension<Arc<Service>>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<StatusCode, Response> {
    let req = parse_body::<RelationReq>(&body)?;
    svc.remove_interested_buyer(&id, req.buyer_id)
        .await
        .map_err(IntoResponse::into_response)?;
    Ok(StatusCode::NO_CONTENT)
}

/// List all buyers
#[utoipa::path(
    get,
    path = "/buyers",
    tag = "buyers",
    operation_id = "inventory.list_buyers",
    responses(
        (status = 200, description = "All buyers in stored order", body = [BuyerDto]),
        (status = 500, description = "Storage failure")
    )
)]
pub async fn list_buyers(
    Extension(svc): Extension<Arc<Service>>,
) -> Result<Json<Vec<BuyerDto>>, DomainError> {
    let buyers = svc.list_buyers().await?;
    Ok(Json(buyers.into_iter().map(BuyerDto::from).collect()))
}

/// Get a buyer by id
#[utoipa::path(
    get,
    path = "/buyers/{id}",
    tag = "buyers",
    operation_id = "inventory.get_buyer",
    params(("id" = String, Path, description = "Buyer id")),
    responses(
        (status = 200, description = "Buyer found", body = BuyerDto),
        (status = 404, description = "No such buyer")
    )
)]
pub async fn get_buyer(
    Extension(svc): Extension<Arc<Service>>,
    Path(id): Path<String>,
) -> Result<Json<BuyerDto>, DomainError> {
    Ok(Json(svc.get_buyer(&id).await?.into()))
}

/// Create a buyer
#[utoipa::path(
    post,
    path = "/buyers",
    tag = "buyers",
    operation_id = "inventory.create_buyer",
    request_body = CreateBuyerReq,
    responses(
        (status = 201, description = "Created buyer", body = BuyerDto),
        (status = 400, description = "Body is not JSON"),
        (status = 409, description = "Email or id already taken"),
        (status = 422, description = "Missing name or email")
    )
)]
pub async fn create_buyer(
    Extension(svc): Extension<Arc<Service>>,
    body: Bytes,
) -> Result<(StatusCode, Json<BuyerDto>), Response> {
    let req = parse_body::<CreateBuyerReq>(&body)?;
    debug!(?req, "Create buyer request");
    let buyer = svc
        .create_buyer(req.into())
        .await
        .map_err(IntoResponse::into_response)?;
    Ok((StatusCode::CREATED, Json(buyer.into())))
}

/// Partially update a buyer
#[utoipa::path(
    patch,
    path = "/buyers/{id}",
    tag = "buyers",
    operation_id = "inventory.update_buyer",
    params(("id" = String, Path, description = "Buyer id")),
    request_body = UpdateBuyerReq,
    responses(
        (status = 200, description = "Updated buyer", body = BuyerDto),
        (status = 400, description = "Body is not JSON"),
        (status = 404, description = "No such buyer"),
        (status = 409, description = "Email taken by another buyer"),
        (status = 422, description = "Blank name or email")
    )
)]
pub async fn update_buyer(
    Extension(svc): Extension<Arc<Service>>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<BuyerDto>, Response> {
    let req = parse_body::<UpdateBuyerReq>(&body)?;
    debug!(?req, "Update buyer request");
    let buyer = svc
        .update_buyer(&id, req.into())
        .await
        .map_err(IntoResponse::into_response)?;
    Ok(Json(buyer.into()))
}

/// Delete a buyer and unlink it from every item
#[utoipa::path(
    delete,
    path = "/buyers/{id}",
    tag = "buyers",
    operation_id = "inventory.delete_buyer",
    params(("id" = String, Path, description = "Buyer id")),
    responses(
        (status = 204, description = "Buyer deleted"),
        (status = 404, description = "No such buyer")
    )
)]
pub async fn delete_buyer(
    Extension(svc): Extension<Arc<Service>>,
    Path(id): Path<String>,
) -> Result<StatusCode, DomainError> {
    svc.delete_buyer(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
