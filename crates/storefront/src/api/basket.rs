//! Basket resource: `/api/basket`.

use reqwest::Method;
use secrecy::SecretString;
use tracing::instrument;

use scamazon_core::{Basket, Product, ProductId, Quantity};

use super::types::{AddItemRequest, BasketPayload, RemoveItemRequest};
use super::{ApiClient, ApiError};

impl ApiClient {
    /// Fetch the current basket.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is not a basket.
    #[instrument(skip(self, token))]
    pub async fn get_basket(&self, token: Option<&SecretString>) -> Result<Basket, ApiError> {
        let payload: BasketPayload = self
            .execute(self.request(Method::GET, "/api/basket", token))
            .await?;
        Ok(payload.into())
    }

    /// Add `quantity` units of `product` and return the updated basket.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is not a basket.
    #[instrument(skip(self, token, product), fields(product_id = %product.id, quantity = %quantity))]
    pub async fn add_item(
        &self,
        token: Option<&SecretString>,
        product: &Product,
        quantity: Quantity,
    ) -> Result<Basket, ApiError> {
        let body = AddItemRequest { product, quantity };
        let payload: BasketPayload = self
            .execute(
                self.request(Method::POST, "/api/basket/add", token)
                    .json(&body),
            )
            .await?;
        Ok(payload.into())
    }

    /// Remove the line for `product_id` and return the updated basket.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] if the backend has no such line, or any
    /// other error if the request fails.
    #[instrument(skip(self, token), fields(product_id = %product_id))]
    pub async fn remove_item(
        &self,
        token: Option<&SecretString>,
        product_id: ProductId,
    ) -> Result<Basket, ApiError> {
        let body = RemoveItemRequest { id: product_id };
        let payload: BasketPayload = self
            .execute(
                self.request(Method::DELETE, "/api/basket/remove", token)
                    .json(&body),
            )
            .await?;
        Ok(payload.into())
    }

    /// Remove every line from the basket.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token))]
    pub async fn clear_basket(&self, token: Option<&SecretString>) -> Result<(), ApiError> {
        self.execute_empty(self.request(Method::DELETE, "/api/basket/clear", token))
            .await
    }
}
