//! Client session extractor.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use tower_sessions::Session;
use uuid::Uuid;

use crate::error::AppError;
use crate::session::{CLIENT_ID_KEY, ClientSession};
use crate::state::AppState;

/// The requesting browser's client session.
///
/// A browser without a client id gets a fresh one, stored in its session
/// cookie.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(Client(client): Client) -> impl IntoResponse {
///     let basket = client.store.select(|s| s.basket.basket().clone());
///     // ...
/// }
/// ```
pub struct Client(pub ClientSession);

impl Client {
    /// Read the client id from `session`, assigning one if missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub async fn id(session: &Session) -> Result<Uuid, AppError> {
        if let Some(id) = session.get::<Uuid>(CLIENT_ID_KEY).await? {
            return Ok(id);
        }
        let id = Uuid::new_v4();
        session.insert(CLIENT_ID_KEY, id).await?;
        Ok(id)
    }
}

impl FromRequestParts<AppState> for Client {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or_else(|| AppError::Internal("session layer missing".to_string()))?;

        let id = Self::id(&session).await?;
        Ok(Self(state.sessions().get_or_create(id).await))
    }
}
