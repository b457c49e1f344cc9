//! Catalog client implementations.

pub mod http_client;
pub mod response_cache;
pub mod static_client;

pub use http_client::HttpCatalogClient;
pub use response_cache::ResponseCache;
pub use static_client::StaticCatalogClient;
