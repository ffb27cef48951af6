//! Client state container.
//!
//! The store is split into slices (basket, addresses, products, user). Each
//! slice holds one domain's data plus request metadata and changes only
//! through its reducer, a pure `(state, action) -> state` function.
//!
//! # Flow
//!
//! ```text
//! view ──calls──▶ thunk ──start()──▶ Pending ──▶ reducer
//!                   │
//!                   └──ApiClient──▶ resolve()/reject ──▶ reducer
//! ```
//!
//! Thunks are the async actions in each slice module. They dispatch
//! `Pending`, await the backend, then dispatch the outcome. The lock is held
//! only while a reducer runs, never across an await, so reducers never
//! interleave and readers always see a whole update.
//!
//! # Overlapping requests
//!
//! Every request carries a [`RequestToken`]. Under
//! [`StalePolicy::LastResolutionWins`] whichever response lands last is
//! applied, even if it belongs to an older request. Under
//! [`StalePolicy::LatestDispatchWins`] responses for superseded requests are
//! dropped.

pub mod addresses;
pub mod basket;
pub mod products;
pub mod user;

use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use scamazon_core::LoadStatus;
use thiserror::Error;

use crate::api::ApiError;

pub use addresses::{AddressesAction, AddressesState};
pub use basket::{BasketAction, BasketState};
pub use products::{ProductsAction, ProductsState};
pub use user::{UserAction, UserState};

/// A pure state transition.
pub trait Reducer: Sized {
    type Action;

    /// Compute the next state from the current one and an action.
    #[must_use]
    fn reduce(self, action: Self::Action) -> Self;
}

/// Which response wins when two requests on one slice overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StalePolicy {
    /// Apply every response in arrival order.
    #[default]
    LastResolutionWins,
    /// Apply only the response to the most recently dispatched request.
    LatestDispatchWins,
}

impl FromStr for StalePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "last-resolution-wins" => Ok(Self::LastResolutionWins),
            "latest-dispatch-wins" => Ok(Self::LatestDispatchWins),
            other => Err(format!(
                "unknown policy '{other}' (expected last-resolution-wins or latest-dispatch-wins)"
            )),
        }
    }
}

/// Identifies one dispatched request. Tokens increase per store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestToken(u64);

impl RequestToken {
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for RequestToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Error stored in a slice after a failed request.
///
/// Transport failures and error statuses are deliberately not told apart;
/// only "not found" gets its own variant so views can say so.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SliceError {
    #[error("not found")]
    NotFound,
    #[error("request failed: {0}")]
    Request(String),
}

impl From<&ApiError> for SliceError {
    fn from(err: &ApiError) -> Self {
        if err.is_not_found() {
            Self::NotFound
        } else {
            Self::Request(err.to_string())
        }
    }
}

/// Request bookkeeping shared by every slice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SliceMeta {
    status: LoadStatus,
    error: Option<SliceError>,
    latest: Option<RequestToken>,
    policy: StalePolicy,
}

impl SliceMeta {
    #[must_use]
    pub fn with_policy(policy: StalePolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn status(&self) -> LoadStatus {
        self.status
    }

    #[must_use]
    pub const fn error(&self) -> Option<&SliceError> {
        self.error.as_ref()
    }

    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.status.is_loading()
    }

    /// Enter `loading` for `token`, clearing any previous error.
    fn begin(&mut self, token: RequestToken) {
        self.status = LoadStatus::Loading;
        self.error = None;
        self.latest = Some(token);
    }

    /// Whether a response for `token` may be applied.
    fn accepts(&self, token: RequestToken) -> bool {
        match self.policy {
            StalePolicy::LastResolutionWins => true,
            StalePolicy::LatestDispatchWins => self.latest.is_none_or(|latest| latest == token),
        }
    }

    fn succeed(&mut self) {
        self.status = LoadStatus::Succeeded;
        self.error = None;
    }

    fn fail(&mut self, error: SliceError) {
        self.status = LoadStatus::Failed;
        self.error = Some(error);
    }

    /// Leave `loading` after the request for `token` was abandoned.
    fn cancel(&mut self, token: RequestToken) {
        if self.latest == Some(token) && self.status.is_loading() {
            self.status = LoadStatus::Idle;
        }
    }
}

/// Actions every slice understands, used by [`Store::start`] and [`InFlight`].
pub trait SliceAction: Into<Action> {
    fn pending(token: RequestToken) -> Self;
    fn rejected(token: RequestToken, error: SliceError) -> Self;
    fn cancelled(token: RequestToken) -> Self;
}

/// Any action, routed to its slice by [`StoreState::reduce`].
#[derive(Debug, Clone)]
pub enum Action {
    Basket(BasketAction),
    Addresses(AddressesAction),
    Products(ProductsAction),
    User(UserAction),
}

impl From<BasketAction> for Action {
    fn from(action: BasketAction) -> Self {
        Self::Basket(action)
    }
}

impl From<AddressesAction> for Action {
    fn from(action: AddressesAction) -> Self {
        Self::Addresses(action)
    }
}

impl From<ProductsAction> for Action {
    fn from(action: ProductsAction) -> Self {
        Self::Products(action)
    }
}

impl From<UserAction> for Action {
    fn from(action: UserAction) -> Self {
        Self::User(action)
    }
}

/// The whole client state: one field per slice.
#[derive(Debug, Clone, Default)]
pub struct StoreState {
    pub basket: BasketState,
    pub addresses: AddressesState,
    pub products: ProductsState,
    pub user: UserState,
}

impl StoreState {
    #[must_use]
    pub fn new(policy: StalePolicy) -> Self {
        Self {
            basket: BasketState::new(policy),
            addresses: AddressesState::new(policy),
            products: ProductsState::new(policy),
            user: UserState::new(policy),
        }
    }
}

impl Reducer for StoreState {
    type Action = Action;

    fn reduce(self, action: Action) -> Self {
        match action {
            Action::Basket(action) => Self {
                basket: self.basket.reduce(action),
                ..self
            },
            Action::Addresses(action) => Self {
                addresses: self.addresses.reduce(action),
                ..self
            },
            Action::Products(action) => Self {
                products: self.products.reduce(action),
                ..self
            },
            Action::User(action) => {
                // Basket and saved addresses belong to the signed-in user
                let signs_out = matches!(action, UserAction::LoggedOut { .. });
                let user = self.user.reduce(action);
                if signs_out && !user.is_logged_in() {
                    Self {
                        user,
                        basket: self.basket.reset(),
                        addresses: self.addresses.reset(),
                        ..self
                    }
                } else {
                    Self { user, ..self }
                }
            }
        }
    }
}

/// Shared, injectable handle to one shopper's state.
///
/// Cheap to clone; all clones see the same state.
#[derive(Clone, Default)]
pub struct Store {
    inner: Arc<StoreInner>,
}

#[derive(Default)]
struct StoreInner {
    state: RwLock<StoreState>,
    next_token: AtomicU64,
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("state", &*self.inner.state.read())
            .finish_non_exhaustive()
    }
}

impl Store {
    /// Create an empty store.
    #[must_use]
    pub fn new(policy: StalePolicy) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                state: RwLock::new(StoreState::new(policy)),
                next_token: AtomicU64::new(0),
            }),
        }
    }

    /// A copy of the current state, for rendering.
    #[must_use]
    pub fn snapshot(&self) -> StoreState {
        self.inner.state.read().clone()
    }

    /// Read part of the current state without cloning all of it.
    pub fn select<T>(&self, selector: impl FnOnce(&StoreState) -> T) -> T {
        selector(&self.inner.state.read())
    }

    /// Apply an action to the state.
    pub fn dispatch(&self, action: impl Into<Action>) {
        let action = action.into();
        tracing::trace!(?action, "dispatch");
        let mut state = self.inner.state.write();
        let current = std::mem::take(&mut *state);
        *state = current.reduce(action);
    }

    /// Issue a fresh request token.
    #[must_use]
    pub fn next_token(&self) -> RequestToken {
        RequestToken(self.inner.next_token.fetch_add(1, Ordering::Relaxed) + 1)
    }

    /// Begin a request on slice `A`: dispatch `Pending` and return a guard.
    ///
    /// Dropping the guard without resolving it dispatches `Cancelled`.
    #[must_use]
    pub fn start<A: SliceAction>(&self) -> InFlight {
        let token = self.next_token();
        self.dispatch(A::pending(token));
        InFlight {
            store: self.clone(),
            token,
            cancelled: Some(A::cancelled(token).into()),
        }
    }
}

/// A request that has been dispatched but not yet resolved.
#[must_use = "dropping an InFlight cancels the request"]
pub struct InFlight {
    store: Store,
    token: RequestToken,
    cancelled: Option<Action>,
}

impl InFlight {
    #[must_use]
    pub const fn token(&self) -> RequestToken {
        self.token
    }

    /// Dispatch the outcome of this request.
    pub fn resolve(mut self, action: impl Into<Action>) {
        self.cancelled = None;
        self.store.dispatch(action);
    }

    /// Dispatch either `fulfilled(value)` or the slice's rejection.
    ///
    /// # Errors
    ///
    /// Returns the stored [`SliceError`] if `result` is an error.
    pub fn settle<T, A: SliceAction>(
        self,
        result: Result<T, ApiError>,
        fulfilled: impl FnOnce(RequestToken, T) -> A,
    ) -> Result<(), SliceError> {
        let token = self.token;
        match result {
            Ok(value) => {
                self.resolve(fulfilled(token, value));
                Ok(())
            }
            Err(err) => {
                tracing::warn!(%token, error = %err, "request rejected");
                let error = SliceError::from(&err);
                self.resolve(A::rejected(token, error.clone()));
                Err(error)
            }
        }
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        if let Some(action) = self.cancelled.take() {
            tracing::debug!(token = %self.token, "request abandoned before it resolved");
            self.store.dispatch(action);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;
    use scamazon_core::{
        Basket, Email, LineItem, LoadStatus, Price, ProductId, Quantity, User, UserId,
    };
    use secrecy::SecretString;

    use super::*;
    use crate::api::types::AuthSession;

    #[test]
    fn test_tokens_increase() {
        let store = Store::new(StalePolicy::default());
        let a = store.next_token();
        let b = store.next_token();
        assert!(b > a);
    }

    #[test]
    fn test_dropped_request_is_cancelled() {
        let store = Store::new(StalePolicy::default());
        let request = store.start::<BasketAction>();
        assert_eq!(store.select(|s| s.basket.meta().status()), LoadStatus::Loading);

        drop(request);
        assert_eq!(store.select(|s| s.basket.meta().status()), LoadStatus::Idle);
    }

    #[test]
    fn test_resolved_request_is_not_cancelled() {
        let store = Store::new(StalePolicy::default());
        let request = store.start::<BasketAction>();
        let token = request.token();
        request.resolve(BasketAction::Loaded {
            token,
            basket: Basket::new(),
        });
        assert_eq!(
            store.select(|s| s.basket.meta().status()),
            LoadStatus::Succeeded
        );
    }

    #[test]
    fn test_settle_stores_error() {
        let store = Store::new(StalePolicy::default());
        let request = store.start::<BasketAction>();
        let result = request.settle(
            Err::<Basket, _>(ApiError::NotFound("/api/basket".to_string())),
            |token, basket| BasketAction::Loaded { token, basket },
        );
        assert_eq!(result, Err(SliceError::NotFound));
        assert_eq!(
            store.select(|s| s.basket.meta().error().cloned()),
            Some(SliceError::NotFound)
        );
    }

    #[test]
    fn test_latest_dispatch_wins_rejects_superseded() {
        let mut meta = SliceMeta::with_policy(StalePolicy::LatestDispatchWins);
        meta.begin(RequestToken::new(1));
        meta.begin(RequestToken::new(2));
        assert!(!meta.accepts(RequestToken::new(1)));
        assert!(meta.accepts(RequestToken::new(2)));
    }

    #[test]
    fn test_last_resolution_wins_accepts_everything() {
        let mut meta = SliceMeta::default();
        meta.begin(RequestToken::new(1));
        meta.begin(RequestToken::new(2));
        assert!(meta.accepts(RequestToken::new(1)));
    }

    #[test]
    fn test_cancel_only_affects_latest_request() {
        let mut meta = SliceMeta::default();
        meta.begin(RequestToken::new(1));
        meta.begin(RequestToken::new(2));
        meta.cancel(RequestToken::new(1));
        assert!(meta.is_loading());
        meta.cancel(RequestToken::new(2));
        assert_eq!(meta.status(), LoadStatus::Idle);
    }

    #[test]
    fn test_logout_forgets_the_shoppers_basket() {
        let store = Store::new(StalePolicy::default());
        store.dispatch(UserAction::LoggedIn {
            token: store.next_token(),
            session: AuthSession {
                user: User {
                    id: UserId::new(1),
                    full_name: "Ada Lovelace".to_string(),
                    email: Email::parse("ada@example.com").unwrap(),
                },
                token: Some(SecretString::from("session-token")),
            },
        });
        store.dispatch(BasketAction::Loaded {
            token: store.next_token(),
            basket: Basket::from_items([LineItem {
                product_id: ProductId::new(1),
                title: "iPhone 9".to_string(),
                price: Price::new(Decimal::new(549, 0)),
                quantity: Quantity::new(3).unwrap(),
                thumbnail: None,
            }]),
        });
        assert_eq!(store.select(|s| s.basket.basket().item_count()), 3);

        store.dispatch(UserAction::LoggedOut {
            token: store.next_token(),
        });
        let state = store.snapshot();
        assert!(!state.user.is_logged_in());
        assert!(state.basket.basket().is_empty());
        assert_eq!(state.basket.meta().status(), LoadStatus::Idle);
        assert!(state.addresses.book().addresses().is_empty());
    }

    #[test]
    fn test_stale_policy_from_str() {
        assert_eq!(
            "latest-dispatch-wins".parse::<StalePolicy>(),
            Ok(StalePolicy::LatestDispatchWins)
        );
        assert!("nope".parse::<StalePolicy>().is_err());
    }
}
