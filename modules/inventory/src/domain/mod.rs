pub mod error;
pub mod seed;
pub mod service;
pub mod store;
