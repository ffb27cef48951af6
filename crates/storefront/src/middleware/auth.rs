//! Authentication extractor.
//!
//! Signed-in state lives in the client's user slice, not in the cookie.

use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};

use scamazon_core::User;

use super::client::Client;
use crate::error::AppError;
use crate::session::ClientSession;
use crate::state::AppState;

/// Extractor that requires a signed-in user.
///
/// If nobody is signed in, redirects to the sign-in page.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(RequireUser { user, .. }: RequireUser) -> impl IntoResponse {
///     format!("Hello, {}!", user.first_name())
/// }
/// ```
pub struct RequireUser {
    pub user: User,
    pub client: ClientSession,
}

/// Why [`RequireUser`] rejected a request.
pub enum AuthRejection {
    /// Nobody is signed in.
    RedirectToSignIn,
    /// The client session could not be loaded.
    Session(AppError),
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToSignIn => Redirect::to("/signin").into_response(),
            Self::Session(err) => err.into_response(),
        }
    }
}

impl FromRequestParts<AppState> for RequireUser {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Client(client) = Client::from_request_parts(parts, state)
            .await
            .map_err(AuthRejection::Session)?;

        let user = client
            .store
            .select(|s| s.user.current_user().cloned())
            .ok_or(AuthRejection::RedirectToSignIn)?;

        Ok(Self { user, client })
    }
}
