pub mod cors;
pub mod https;

pub use cors::cors_layer;
pub use https::require_https;
