use axum::{routing::get, Extension, Router};
use std::sync::Arc;

use crate::api::rest::handlers;
use crate::domain::service::Service;

pub fn register_routes(router: Router, service: Arc<Service>) -> Router {
    router
        // GET/POST /inventory
        .route(
            "/inventory",
            get(handlers::list_items).post(handlers::create_item),
        )
        // GET/PATCH/DELETE /inventory/{id}
        .route(
            "/inventory/{id}",
            get(handlers::get_item)
                .patch(handlers::update_item)
                .delete(handlers::delete_item),
        )
        // GET/POST/DELETE /inventory/{id}/buyers
        .route(
            "/inventory/{id}/buyers",
            get(handlers::list_interested_buyers)
                .post(handlers::add_interested_buyer)
                .delete(handlers::remove_interested_buyer),
        )
        // GET/POST /buyers
        .route(
            "/buyers",
            get(handlers::list_buyers).post(handlers::create_buyer),
        )
        // GET/PATCH/DELETE /buyers/{id}
        .route(
            "/buyers/{id}",
            get(handlers::get_buyer)
                .patch(handlers::update_buyer)
                .delete(handlers::delete_buyer),
        )
        .layer(Extension(service))
}
