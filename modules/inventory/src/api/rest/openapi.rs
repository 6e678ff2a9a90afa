use utoipa::OpenApi;

use crate::api::rest::{dto, handlers};

/// OpenAPI description of the inventory and buyer routes.
#[derive(OpenApi)]
#[openapi(
    info(title = "Housewares inventory API"),
    paths(
        handlers::list_items,
        handlers::get_item,
        handlers::create_item,
        handlers::update_item,
        handlers::delete_item,
        handlers::list_interested_buyers,
        handlers::add_interested_buyer,
        handlers::remove_interested_buyer,
        handlers::list_buyers,
        handlers::get_buyer,
        handlers::create_buyer,
        handlers::update_buyer,
        handlers::delete_buyer,
    ),
    components(schemas(
        dto::ItemDto,
        dto::BuyerDto,
        dto::CreateItemReq,
        dto::UpdateItemReq,
        dto::CreateBuyerReq,
        dto::UpdateBuyerReq,
        dto::RelationReq,
    )),
    tags(
        (name = "inventory", description = "Housewares and their interested buyers"),
        (name = "buyers", description = "Buyer roster")
    )
)]
pub struct InventoryApiDoc;
