pub mod aggregate;
pub mod api;
pub mod asset;
pub mod cityiq;
pub mod config;
pub mod places;
pub mod uaa;
