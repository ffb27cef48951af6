//! Address resource: `/api/addresses`.

use reqwest::Method;
use secrecy::SecretString;
use tracing::instrument;

use scamazon_core::{Address, AddressId, AddressInput};

use super::{ApiClient, ApiError};

impl ApiClient {
    /// List the signed-in user's addresses.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token))]
    pub async fn list_addresses(&self, token: Option<&SecretString>) -> Result<Vec<Address>, ApiError> {
        self.execute(self.request(Method::GET, "/api/addresses", token))
            .await
    }

    /// Create an address and return the stored record.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token, input))]
    pub async fn create_address(
        &self,
        token: Option<&SecretString>,
        input: &AddressInput,
    ) -> Result<Address, ApiError> {
        self.execute(
            self.request(Method::POST, "/api/addresses", token)
                .json(input),
        )
        .await
    }

    /// Replace the editable fields of an address.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] for an unknown id, or any other error if
    /// the request fails.
    #[instrument(skip(self, token, input), fields(address_id = %id))]
    pub async fn update_address(
        &self,
        token: Option<&SecretString>,
        id: AddressId,
        input: &AddressInput,
    ) -> Result<Address, ApiError> {
        self.execute(
            self.request(Method::PUT, &format!("/api/addresses/{id}"), token)
                .json(input),
        )
        .await
    }

    /// Delete an address.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token), fields(address_id = %id))]
    pub async fn delete_address(&self, token: Option<&SecretString>, id: AddressId) -> Result<(), ApiError> {
        self.execute_empty(self.request(Method::DELETE, &format!("/api/addresses/{id}"), token))
            .await
    }

    /// Make `id` the default address and return the full, updated list.
    ///
    /// Clearing the previous default is the backend's job; the returned list
    /// is what the storefront reduces into state.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token), fields(address_id = %id))]
    pub async fn set_default_address(
        &self,
        token: Option<&SecretString>,
        id: AddressId,
    ) -> Result<Vec<Address>, ApiError> {
        self.execute(self.request(
            Method::PUT,
            &format!("/api/addresses/{id}/default"),
            token,
        ))
        .await
    }
}
