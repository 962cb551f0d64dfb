//! Cart snapshot provider: persisted cart lines joined with live catalog data.

use std::sync::Arc;

use async_trait::async_trait;
use storefront_core::payment::CartLine;
use storefront_core::store::{CartProvider, CatalogProvider, StoreResult};
use storefront_core::types::UserId;
use storefront_db::error::classify_sqlx_error;
use storefront_db::CartRepo;

pub struct CatalogCart {
    repo: CartRepo,
    catalog: Arc<dyn CatalogProvider>,
}

impl CatalogCart {
    pub fn new(repo: CartRepo, catalog: Arc<dyn CatalogProvider>) -> Self {
        Self { repo, catalog }
    }
}

#[async_trait]
impl CartProvider for CatalogCart {
    /// Lines whose product no longer resolves in the catalog are skipped.
    async fn lines(&self, user_id: UserId) -> StoreResult<Vec<CartLine>> {
        let items = self.repo.items(user_id).await.map_err(classify_sqlx_error)?;
        let mut lines = Vec::with_capacity(items.len());
        for item in items {
            let Some(product) = self.catalog.product(item.product_id).await? else {
                tracing::debug!(user_id = %user_id, product_id = item.product_id, "Skipping cart line for unknown product");
                continue;
            };
            lines.push(CartLine {
                product_id: product.id,
                quantity: item.quantity,
                unit_price: product.price,
                title: product.title,
                image_url: product.image_url,
            });
        }
        Ok(lines)
    }

    async fn clear(&self, user_id: UserId) -> StoreResult<()> {
        let removed = self.repo.clear(user_id).await.map_err(classify_sqlx_error)?;
        tracing::debug!(user_id = %user_id, removed, "Cart cleared");
        Ok(())
    }
}
