pub mod geo;
pub mod req;
