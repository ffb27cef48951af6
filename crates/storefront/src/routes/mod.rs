//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                                  - Home page (shop by department)
//! GET  /health                            - Health check
//!
//! # Catalog
//! GET  /department/{slug}                 - Department page
//! GET  /category/{category}               - Category listing
//! GET  /product/{id}                      - Product detail (?image=n picks the thumbnail)
//!
//! # Basket
//! GET  /basket                            - Basket page
//! POST /basket/add                        - Add a product
//! POST /basket/remove                     - Remove a line
//! POST /basket/clear                      - Empty the basket
//!
//! # Account (requires sign-in)
//! GET  /account                           - Account overview
//! GET  /account/addresses                 - Address book
//! GET  /account/addresses/new             - New address form
//! POST /account/addresses/new             - Create address
//! GET  /account/addresses/{id}/edit       - Edit address form
//! POST /account/addresses/{id}/edit       - Update address
//! POST /account/addresses/{id}/delete     - Delete address
//! POST /account/addresses/{id}/default    - Make address the default
//!
//! # Auth
//! GET  /signin                            - Sign-in portal (email step)
//! POST /signin                            - Email step, password step, or "Change"
//! GET  /register                          - Registration form
//! POST /register                          - Create account
//! POST /signout                           - Sign out
//! ```
//!
//! Handlers that load data mount a [`ViewScope`](crate::lifecycle::ViewScope),
//! spawn the slice thunks they need into it and render from a store snapshot
//! once the loads settle.

pub mod account;
pub mod auth;
pub mod basket;
pub mod home;
pub mod products;

use axum::{
    Router,
    routing::{get, post},
};

use crate::store::StoreState;
use crate::state::AppState;

/// Shared header data every page renders.
#[derive(Debug, Clone)]
pub struct PageHeader {
    pub greeting: String,
    pub signed_in: bool,
    pub basket_count: u32,
}

impl PageHeader {
    #[must_use]
    pub fn from_state(state: &StoreState) -> Self {
        let user = state.user.current_user();
        Self {
            greeting: user.map_or_else(
                || "Hello, sign in".to_string(),
                |user| format!("Hello, {}", user.first_name()),
            ),
            signed_in: user.is_some(),
            basket_count: state.basket.basket().item_count(),
        }
    }
}

/// Create the catalog routes router.
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/department/{slug}", get(home::department))
        .route("/category/{category}", get(products::category))
        .route("/product/{id}", get(products::show))
}

/// Create the basket routes router.
pub fn basket_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(basket::show))
        .route("/add", post(basket::add))
        .route("/remove", post(basket::remove))
        .route("/clear", post(basket::clear))
}

/// Create the account routes router.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(account::index))
        .route("/addresses", get(account::addresses))
        .route(
            "/addresses/new",
            get(account::new_address).post(account::create_address),
        )
        .route(
            "/addresses/{id}/edit",
            get(account::edit_address).post(account::update_address),
        )
        .route("/addresses/{id}/delete", post(account::delete_address))
        .route("/addresses/{id}/default", post(account::set_default_address))
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/signin", get(auth::signin_page).post(auth::signin))
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/signout", post(auth::signout))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(catalog_routes())
        .nest("/basket", basket_routes())
        .nest("/account", account_routes())
        .merge(auth_routes())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use scamazon_core::{Email, User, UserId};
    use secrecy::SecretString;

    use super::*;
    use crate::api::types::AuthSession;
    use crate::store::{RequestToken, StalePolicy, Store, UserAction};

    #[test]
    fn test_header_for_guest() {
        let header = PageHeader::from_state(&StoreState::default());
        assert_eq!(header.greeting, "Hello, sign in");
        assert!(!header.signed_in);
        assert_eq!(header.basket_count, 0);
    }

    #[test]
    fn test_header_greets_by_first_name() {
        let store = Store::new(StalePolicy::default());
        store.dispatch(UserAction::LoggedIn {
            token: RequestToken::new(1),
            session: AuthSession {
                user: User {
                    id: UserId::new(3),
                    full_name: "Grace Brewster Hopper".to_string(),
                    email: Email::parse("grace@example.com").unwrap(),
                },
                token: Some(SecretString::from("t")),
            },
        });
        let header = PageHeader::from_state(&store.snapshot());
        assert_eq!(header.greeting, "Hello, Grace");
        assert!(header.signed_in);
    }
}
