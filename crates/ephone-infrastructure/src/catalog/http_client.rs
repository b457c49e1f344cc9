//! HttpCatalogClient - REST client for the remote product catalog.
//!
//! Talks to a fakestoreapi-compatible API and caches every decoded response
//! for the configured TTL.

use super::response_cache::ResponseCache;
use async_trait::async_trait;
use ephone_core::config::CatalogConfig;
use ephone_core::error::{EphoneError, Result};
use ephone_core::product::{CatalogClient, Product, ProductId};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

/// Catalog client backed by the remote HTTP API.
pub struct HttpCatalogClient {
    client: Client,
    base_url: String,
    cache: ResponseCache,
}

impl HttpCatalogClient {
    /// Creates a client for `base_url` with the given cache TTL and request timeout.
    pub fn new(base_url: impl Into<String>, cache_ttl: Duration, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| EphoneError::config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            cache: ResponseCache::new(cache_ttl),
        })
    }

    pub fn from_config(config: &CatalogConfig) -> Result<Self> {
        Self::new(
            config.base_url.clone(),
            Duration::from_secs(config.cache_ttl_secs),
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    async fn get_cached<T>(&self, cache_key: &str, path: &str, query: &[(&str, String)]) -> Result<T>
    where
        T: DeserializeOwned,
    {
        if let Some(cached) = self.cache.get(cache_key).await {
            tracing::debug!(cache_key, "Catalog cache hit");
            return Ok(serde_json::from_value(cached)?);
        }

        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|err| {
                EphoneError::transport(
                    format!("Catalog request to {url} failed: {err}"),
                    err.is_connect() || err.is_timeout(),
                )
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read catalog error body".to_string());
            tracing::error!(%url, status = status.as_u16(), "Catalog request rejected");
            return Err(EphoneError::http_status(status.as_u16(), body));
        }

        let body: Value = response.json().await.map_err(|err| {
            EphoneError::transport(format!("Failed to decode catalog response: {err}"), false)
        })?;

        // Some deployments answer unknown ids with `200 null`.
        if body.is_null() {
            return Err(EphoneError::http_status(
                StatusCode::NOT_FOUND.as_u16(),
                format!("{url} returned no data"),
            ));
        }

        let decoded = serde_json::from_value(body.clone())?;
        self.cache.insert(cache_key, body).await;
        Ok(decoded)
    }
}

#[async_trait]
impl CatalogClient for HttpCatalogClient {
    async fn list_products(&self, limit: usize, offset: usize) -> Result<Vec<Product>> {
        let cache_key = format!("products_{limit}_{offset}");
        self.get_cached(
            &cache_key,
            "/products",
            &[("limit", limit.to_string()), ("skip", offset.to_string())],
        )
        .await
    }

    async fn list_all(&self) -> Result<Vec<Product>> {
        let products: Vec<Product> = self.get_cached("products_all", "/products", &[]).await?;
        tracing::info!(count = products.len(), "Fetched catalog");
        Ok(products)
    }

    async fn get_product(&self, id: ProductId) -> Result<Product> {
        let cache_key = format!("product_{id}");
        self.get_cached(&cache_key, &format!("/products/{id}"), &[])
            .await
            .map_err(|err| match err {
                EphoneError::Transport {
                    status: Some(404), ..
                } => EphoneError::not_found("product", id.to_string()),
                other => other,
            })
    }

    async fn list_categories(&self) -> Result<Vec<String>> {
        self.get_cached("categories", "/products/categories", &[])
            .await
    }

    async fn invalidate(&self) {
        tracing::debug!("Dropping cached catalog responses");
        self.cache.clear().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> HttpCatalogClient {
        HttpCatalogClient::new(server.uri(), Duration::from_secs(300), Duration::from_secs(5))
            .unwrap()
    }

    fn product_json(id: u64) -> Value {
        json!({
            "id": id,
            "title": format!("Product {id}"),
            "price": 10.5,
            "description": "desc",
            "category": "electronics",
            "image": "https://example.com/img.png",
            "rating": { "rate": 4.1, "count": 12 }
        })
    }

    #[tokio::test]
    async fn test_list_all_is_cached() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/products"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!([product_json(1), product_json(2)])),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let first = client.list_all().await.unwrap();
        let second = client.list_all().await.unwrap();
        assert_eq!(first.len(), 2);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_invalidate_refetches_catalog() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/products"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!([product_json(1), product_json(2)])),
            )
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/products"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                product_json(1),
                product_json(2),
                product_json(3)
            ])))
            .mount(&server)
            .await;

        let client = client_for(&server);
        assert_eq!(client.list_all().await.unwrap().len(), 2);
        assert_eq!(client.list_all().await.unwrap().len(), 2);

        client.invalidate().await;
        assert_eq!(client.list_all().await.unwrap().len(), 3);
        assert_eq!(server.received_requests().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_list_products_sends_paging_params() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/products"))
            .and(query_param("limit", "5"))
            .and(query_param("skip", "10"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([product_json(11)])))
            .mount(&server)
            .await;

        let page = client_for(&server).list_products(5, 10).await.unwrap();
        assert_eq!(page[0].id, 11);
    }

    #[tokio::test]
    async fn test_missing_product_maps_to_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/products/99"))
            .respond_with(ResponseTemplate::new(200).set_body_string("null"))
            .mount(&server)
            .await;

        let err = client_for(&server).get_product(99).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_server_error_is_retryable_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/products/categories"))
            .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
            .mount(&server)
            .await;

        let err = client_for(&server).list_categories().await.unwrap_err();
        assert!(matches!(
            err,
            EphoneError::Transport {
                status: Some(503),
                ..
            }
        ));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_categories_decode() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/products/categories"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!(["electronics", "jewelery"])),
            )
            .mount(&server)
            .await;

        let categories = client_for(&server).list_categories().await.unwrap();
        assert_eq!(categories, vec!["electronics", "jewelery"]);
    }
}
