use std::sync::Arc;

use tracing::{debug, info};
use utoipa::OpenApi;

use crate::api::rest::{openapi::InventoryApiDoc, routes};
use crate::config::InventoryConfig;
use crate::domain::service::{Service, ServiceConfig};
use crate::domain::store::DocumentStore;

/// Inventory module: wires a document store into the domain service and
/// exposes its REST routes.
#[derive(Clone)]
pub struct Inventory {
    service: Arc<Service>,
}

impl Inventory {
    pub fn init(store: Arc<dyn DocumentStore>, cfg: &InventoryConfig) -> Self {
        info!("Initializing inventory module");
        debug!(
            "Loaded inventory config: serialize_writes={}, seed_buyers={}",
            cfg.serialize_writes, cfg.seed_buyers
        );

        let service = Service::new(
            store,
            ServiceConfig {
                serialize_writes: cfg.serialize_writes,
            },
        );
        Self {
            service: Arc::new(service),
        }
    }

    pub fn register_rest(&self, router: axum::Router) -> axum::Router {
        info!("Registering inventory REST routes");
        routes::register_routes(router, self.service.clone())
    }

    pub fn openapi(&self) -> utoipa::openapi::OpenApi {
        InventoryApiDoc::openapi()
    }
}
