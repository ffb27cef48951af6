//! User resource: `/api/users`.

use reqwest::Method;
use secrecy::SecretString;
use tracing::instrument;

use scamazon_core::User;

use super::types::{AuthSession, LoginRequest, LoginResponse, RegisterRequest};
use super::{ApiClient, ApiError};

impl ApiClient {
    /// Create an account. The new user still has to sign in.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails (including a taken email).
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn register(&self, request: &RegisterRequest) -> Result<User, ApiError> {
        self.execute(
            self.request(Method::POST, "/api/users/register", None)
                .json(request),
        )
        .await
    }

    /// Sign in and return the user with the backend session token.
    ///
    /// # Errors
    ///
    /// Returns an error if the credentials are rejected or the request fails.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn login(&self, request: &LoginRequest) -> Result<AuthSession, ApiError> {
        let response: LoginResponse = self
            .execute(
                self.request(Method::POST, "/api/users/login", None)
                    .json(request),
            )
            .await?;
        Ok(response.into())
    }

    /// End the backend session for `token`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token))]
    pub async fn logout(&self, token: Option<&SecretString>) -> Result<(), ApiError> {
        self.execute_empty(self.request(Method::POST, "/api/users/logout", token))
            .await
    }
}
