//! Product catalog over HTTP, with a short-lived in-process cache.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;
use reqwest::StatusCode;
use storefront_core::error::StoreError;
use storefront_core::payment::Product;
use storefront_core::store::{CatalogProvider, StoreResult};
use storefront_core::types::ProductId;

/// Upper bound on one catalog round-trip.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for a FakeStore-compatible catalog (`GET {base}/products/{id}`).
#[derive(Clone)]
pub struct HttpCatalog {
    client: reqwest::Client,
    base_url: String,
}

impl HttpCatalog {
    pub fn new(base_url: impl Into<String>) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }
}

#[async_trait]
impl CatalogProvider for HttpCatalog {
    async fn product(&self, id: ProductId) -> StoreResult<Option<Product>> {
        let url = format!("{}/products/{id}", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| StoreError::Backend(format!("catalog request failed: {e}")))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(StoreError::Backend(format!(
                "catalog returned status {} for product {id}",
                response.status()
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| StoreError::Backend(format!("catalog body read failed: {e}")))?;

        // The catalog answers an unknown id with 200 and an empty body.
        let trimmed = body.trim_ascii();
        if trimmed.is_empty() || trimmed == b"null" {
            return Ok(None);
        }

        serde_json::from_slice::<Product>(trimmed)
            .map(Some)
            .map_err(|e| StoreError::Backend(format!("catalog returned malformed product {id}: {e}")))
    }
}

struct CachedProduct {
    product: Product,
    fetched_at: Instant,
}

/// Caches found products for `ttl`. Misses and failures are not cached.
pub struct CachedCatalog {
    inner: Arc<dyn CatalogProvider>,
    ttl: Duration,
    entries: DashMap<ProductId, CachedProduct>,
}

impl CachedCatalog {
    pub fn new(inner: Arc<dyn CatalogProvider>, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            entries: DashMap::new(),
        }
    }
}

#[async_trait]
impl CatalogProvider for CachedCatalog {
    async fn product(&self, id: ProductId) -> StoreResult<Option<Product>> {
        if let Some(entry) = self.entries.get(&id) {
            if entry.fetched_at.elapsed() < self.ttl {
                return Ok(Some(entry.product.clone()));
            }
        }

        let product = self.inner.product(id).await?;
        match &product {
            Some(found) => {
                self.entries.insert(
                    id,
                    CachedProduct {
                        product: found.clone(),
                        fetched_at: Instant::now(),
                    },
                );
            }
            None => {
                self.entries.remove(&id);
            }
        }
        Ok(product)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingCatalog {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl CatalogProvider for CountingCatalog {
        async fn product(&self, id: ProductId) -> StoreResult<Option<Product>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok((id == 1).then(|| Product {
                id,
                title: "Backpack".into(),
                price: 109.95,
                image_url: String::new(),
            }))
        }
    }

    #[tokio::test]
    async fn test_hits_are_served_from_cache_until_ttl() {
        let inner = Arc::new(CountingCatalog {
            calls: AtomicUsize::new(0),
        });
        let cached = CachedCatalog::new(inner.clone(), Duration::from_secs(60));

        assert!(cached.product(1).await.unwrap().is_some());
        assert!(cached.product(1).await.unwrap().is_some());
        assert_eq!(inner.calls.load(Ordering::SeqCst), 1);

        assert!(cached.product(2).await.unwrap().is_none());
        assert!(cached.product(2).await.unwrap().is_none());
        assert_eq!(inner.calls.load(Ordering::SeqCst), 3, "misses are not cached");
    }

    #[tokio::test]
    async fn test_zero_ttl_always_refetches() {
        let inner = Arc::new(CountingCatalog {
            calls: AtomicUsize::new(0),
        });
        let cached = CachedCatalog::new(inner.clone(), Duration::ZERO);

        cached.product(1).await.unwrap();
        cached.product(1).await.unwrap();
        assert_eq!(inner.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_product_payload_deserializes() {
        let body = br#"{"id":1,"title":"Fjallraven","price":109.95,"description":"x","category":"bags","image":"https://img/1.jpg","rating":{"rate":3.9,"count":120}}"#;
        let product: Product = serde_json::from_slice(body).unwrap();
        assert_eq!(product.id, 1);
        assert_eq!(product.image_url, "https://img/1.jpg");
    }
}
