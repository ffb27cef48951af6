//! Product resource: `/api/products`.

use reqwest::Method;
use tracing::instrument;
use url::form_urlencoded::byte_serialize;

use scamazon_core::{Product, ProductId};

use super::{ApiClient, ApiError};

/// Listing envelope some backends wrap category results in.
#[derive(serde::Deserialize)]
#[serde(untagged)]
enum ProductList {
    Wrapped { products: Vec<Product> },
    Bare(Vec<Product>),
}

impl ApiClient {
    /// Get a single product.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] if the product does not exist, or any
    /// other error if the request fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_product(&self, id: ProductId) -> Result<Product, ApiError> {
        self.execute(self.request(Method::GET, &format!("/api/products/{id}"), None))
            .await
    }

    /// Get every product in a category.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn products_by_category(&self, category: &str) -> Result<Vec<Product>, ApiError> {
        // Form encoding writes spaces as `+`, which a path segment would keep literally
        let segment = byte_serialize(category.as_bytes())
            .collect::<String>()
            .replace('+', "%20");
        let list: ProductList = self
            .execute(self.request(
                Method::GET,
                &format!("/api/products/category/{segment}"),
                None,
            ))
            .await?;
        Ok(match list {
            ProductList::Wrapped { products } | ProductList::Bare(products) => products,
        })
    }
}
