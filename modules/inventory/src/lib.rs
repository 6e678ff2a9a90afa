// === PUBLIC CONTRACT ===
// Record types shared by the store, the service and the REST layer
pub mod contract;

pub use contract::model;

// === MODULE DEFINITION ===
pub mod module;
pub use module::Inventory;

// === INTERNAL MODULES ===
// Exposed for tests and for the server binary's wiring; not a stable API.
#[doc(hidden)]
pub mod api;
#[doc(hidden)]
pub mod config;
#[doc(hidden)]
pub mod domain;
#[doc(hidden)]
pub mod infra;
