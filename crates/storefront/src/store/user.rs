//! User slice: who is signed in, and the backend session token.

use secrecy::SecretString;

use scamazon_core::User;

use super::{Reducer, RequestToken, SliceAction, SliceError, SliceMeta, StalePolicy, Store};
use crate::api::ApiClient;
use crate::api::types::{AuthSession, LoginRequest, RegisterRequest};

#[derive(Debug, Clone, Default)]
pub struct UserState {
    meta: SliceMeta,
    current_user: Option<User>,
    token: Option<SecretString>,
    /// Set by a successful registration, cleared by the next request.
    registered: bool,
}

impl UserState {
    #[must_use]
    pub fn new(policy: StalePolicy) -> Self {
        Self {
            meta: SliceMeta::with_policy(policy),
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn meta(&self) -> &SliceMeta {
        &self.meta
    }

    #[must_use]
    pub const fn current_user(&self) -> Option<&User> {
        self.current_user.as_ref()
    }

    #[must_use]
    pub const fn is_logged_in(&self) -> bool {
        self.current_user.is_some()
    }

    /// Bearer token for authenticated backend calls.
    #[must_use]
    pub const fn token(&self) -> Option<&SecretString> {
        self.token.as_ref()
    }

    /// Whether the last completed request was a successful registration.
    #[must_use]
    pub const fn just_registered(&self) -> bool {
        self.registered
    }
}

#[derive(Debug, Clone)]
pub enum UserAction {
    Pending { token: RequestToken },
    LoggedIn { token: RequestToken, session: AuthSession },
    Registered { token: RequestToken, user: User },
    LoggedOut { token: RequestToken },
    Rejected { token: RequestToken, error: SliceError },
    Cancelled { token: RequestToken },
}

impl SliceAction for UserAction {
    fn pending(token: RequestToken) -> Self {
        Self::Pending { token }
    }

    fn rejected(token: RequestToken, error: SliceError) -> Self {
        Self::Rejected { token, error }
    }

    fn cancelled(token: RequestToken) -> Self {
        Self::Cancelled { token }
    }
}

impl Reducer for UserState {
    type Action = UserAction;

    fn reduce(mut self, action: UserAction) -> Self {
        match action {
            UserAction::Pending { token } => {
                self.meta.begin(token);
                self.registered = false;
            }
            UserAction::LoggedIn { token, session } => {
                if self.meta.accepts(token) {
                    self.meta.succeed();
                    self.current_user = Some(session.user);
                    self.token = session.token;
                }
            }
            UserAction::Registered { token, user } => {
                if self.meta.accepts(token) {
                    self.meta.succeed();
                    self.registered = true;
                    tracing::debug!(user_id = %user.id, "registered; awaiting sign-in");
                }
            }
            UserAction::LoggedOut { token } => {
                if self.meta.accepts(token) {
                    self.meta.succeed();
                    self.current_user = None;
                    self.token = None;
                }
            }
            UserAction::Rejected { token, error } => {
                if self.meta.accepts(token) {
                    self.meta.fail(error);
                }
            }
            UserAction::Cancelled { token } => self.meta.cancel(token),
        }
        self
    }
}

/// Create an account. The shopper still has to sign in afterwards.
///
/// # Errors
///
/// Returns the stored [`SliceError`] if the request fails.
pub async fn register_user(
    store: Store,
    api: ApiClient,
    request: RegisterRequest,
) -> Result<(), SliceError> {
    let pending = store.start::<UserAction>();
    let result = api.register(&request).await;
    pending.settle(result, |token, user| UserAction::Registered { token, user })
}

/// Sign in.
///
/// # Errors
///
/// Returns the stored [`SliceError`] if the credentials are rejected or the
/// request fails.
pub async fn login_user(
    store: Store,
    api: ApiClient,
    request: LoginRequest,
) -> Result<(), SliceError> {
    let pending = store.start::<UserAction>();
    let result = api.login(&request).await;
    pending.settle(result, |token, session| UserAction::LoggedIn { token, session })
}

/// Sign out.
///
/// A backend that no longer recognises the session token counts as signed
/// out.
///
/// # Errors
///
/// Returns the stored [`SliceError`] if the request fails.
pub async fn logout_user(store: Store, api: ApiClient) -> Result<(), SliceError> {
    let auth = store.select(|s| s.user.token().cloned());
    let pending = store.start::<UserAction>();
    let result = match api.logout(auth.as_ref()).await {
        Err(err) if err.is_unauthorized() => Ok(()),
        other => other,
    };
    pending.settle(result, |token, ()| UserAction::LoggedOut { token })
}
