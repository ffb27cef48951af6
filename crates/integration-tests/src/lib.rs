//! Integration tests for the Scamazon storefront.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p scamazon-integration-tests
//! ```
//!
//! Each test starts a [`FakeBackend`] (an in-process REST API on an
//! ephemeral port) and the real storefront router pointed at it, then drives
//! the storefront over HTTP with a cookie-keeping client.
//!
//! # Fixtures
//!
//! - Products 1-3: smartphones; product 4: laptop
//! - User `ada@example.com` / [`PASSWORD`]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
};
use serde::Deserialize;
use serde_json::json;
use tokio::sync::Mutex;

use scamazon_core::{
    Address, AddressBook, AddressId, AddressInput, Basket, Email, LineItem, Product, ProductId,
    User, UserId,
};
use scamazon_storefront::config::{ApiConfig, StorefrontConfig};
use scamazon_storefront::state::AppState;
use scamazon_storefront::store::StalePolicy;

/// Password of the seeded user.
pub const PASSWORD: &str = "correct horse";

/// Email of the seeded user.
pub const EMAIL: &str = "ada@example.com";

// =============================================================================
// Fake backend
// =============================================================================

struct Account {
    user: User,
    password: String,
}

#[derive(Default)]
struct BackendState {
    products: Vec<Product>,
    basket: Basket,
    accounts: Vec<Account>,
    sessions: HashMap<String, UserId>,
    addresses: AddressBook,
    next_address_id: i64,
    /// Calls made per "METHOD path", for asserting on traffic.
    calls: HashMap<String, usize>,
}

impl BackendState {
    fn seeded() -> Self {
        let product = |id: i64, title: &str, category: &str, price: f64| -> Product {
            serde_json::from_value(json!({
                "id": id,
                "title": title,
                "description": format!("{title} description"),
                "category": category,
                "price": price,
                "discountPercentage": 10.0,
                "rating": 4.5,
                "availabilityStatus": "In Stock",
                "sku": format!("SKU-{id}"),
                "images": [format!("https://cdn.example.com/{id}/1.jpg")],
                "thumbnail": format!("https://cdn.example.com/{id}/thumb.jpg"),
            }))
            .unwrap_or_else(|e| panic!("invalid product fixture: {e}"))
        };

        Self {
            products: vec![
                product(1, "iPhone 9", "smartphones", 549.0),
                product(2, "iPhone X", "smartphones", 899.0),
                product(3, "Samsung Universe 9", "smartphones", 1249.0),
                product(4, "MacBook Pro", "laptops", 1749.0),
            ],
            accounts: vec![Account {
                user: user(1, "Ada Lovelace", EMAIL),
                password: PASSWORD.to_string(),
            }],
            next_address_id: 1,
            ..Self::default()
        }
    }

    fn signed_in(&self, headers: &HeaderMap) -> Option<UserId> {
        let token = headers
            .get(header::AUTHORIZATION)?
            .to_str()
            .ok()?
            .strip_prefix("Bearer ")?;
        self.sessions.get(token).copied()
    }
}

fn user(id: i64, full_name: &str, email: &str) -> User {
    User {
        id: UserId::new(id),
        full_name: full_name.to_string(),
        email: Email::parse(email).unwrap_or_else(|e| panic!("invalid email fixture: {e}")),
    }
}

type Shared = Arc<Mutex<BackendState>>;

/// An in-process stand-in for the backend REST API.
pub struct FakeBackend {
    pub url: String,
    state: Shared,
}

impl FakeBackend {
    /// Start the backend on an ephemeral port.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound.
    pub async fn start() -> Self {
        let state: Shared = Arc::new(Mutex::new(BackendState::seeded()));
        let addr = serve(router(state.clone())).await;
        Self {
            url: format!("http://{addr}"),
            state,
        }
    }

    /// How many times `METHOD path` was called (e.g. `"GET /api/products/1"`).
    pub async fn calls(&self, route: &str) -> usize {
        self.state.lock().await.calls.get(route).copied().unwrap_or(0)
    }

    /// Lines currently in the backend basket.
    pub async fn basket(&self) -> Basket {
        self.state.lock().await.basket.clone()
    }

    /// Saved addresses.
    pub async fn addresses(&self) -> Vec<Address> {
        self.state.lock().await.addresses.addresses().to_vec()
    }

    /// Seed an address directly and return its id.
    pub async fn seed_address(&self, full_name: &str, postcode: &str) -> AddressId {
        let mut state = self.state.lock().await;
        let id = AddressId::new(state.next_address_id);
        state.next_address_id += 1;
        let is_default = state.addresses.is_empty();
        state.addresses.upsert(Address {
            address_id: id,
            details: AddressInput {
                full_name: full_name.to_string(),
                address_line1: "1 Test Street".to_string(),
                city: "London".to_string(),
                postcode: postcode.to_string(),
                country: "United Kingdom".to_string(),
                phone_number: "020 7946 0000".to_string(),
                ..AddressInput::default()
            },
            is_default,
        });
        id
    }
}

async fn serve(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .unwrap_or_else(|e| panic!("failed to bind test listener: {e}"));
    let addr = listener
        .local_addr()
        .unwrap_or_else(|e| panic!("listener has no address: {e}"));
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

fn router(state: Shared) -> Router {
    Router::new()
        .route("/api/products/{id}", get(get_product))
        .route("/api/products/category/{category}", get(products_by_category))
        .route("/api/basket", get(get_basket))
        .route("/api/basket/add", post(add_item))
        .route("/api/basket/remove", delete(remove_item))
        .route("/api/basket/clear", delete(clear_basket))
        .route("/api/addresses", get(list_addresses).post(create_address))
        .route(
            "/api/addresses/{id}",
            put(update_address).delete(delete_address),
        )
        .route("/api/addresses/{id}/default", put(set_default_address))
        .route("/api/users/register", post(register))
        .route("/api/users/login", post(login))
        .route("/api/users/logout", post(logout))
        .layer(axum::middleware::from_fn_with_state(state.clone(), count_calls))
        .with_state(state)
}

async fn count_calls(
    State(state): State<Shared>,
    request: axum::extract::Request,
    next: axum::middleware::Next,
) -> Response {
    let route = format!("{} {}", request.method(), request.uri().path());
    *state.lock().await.calls.entry(route).or_default() += 1;
    next.run(request).await
}

fn basket_body(basket: &Basket) -> Json<serde_json::Value> {
    Json(json!({ "items": basket.items() }))
}

async fn get_product(State(state): State<Shared>, Path(id): Path<ProductId>) -> Response {
    let state = state.lock().await;
    match state.products.iter().find(|p| p.id == id) {
        Some(product) => Json(product.clone()).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn products_by_category(
    State(state): State<Shared>,
    Path(category): Path<String>,
) -> Json<serde_json::Value> {
    let state = state.lock().await;
    let products: Vec<&Product> = state
        .products
        .iter()
        .filter(|p| p.category == category)
        .collect();
    Json(json!({ "products": products }))
}

async fn get_basket(State(state): State<Shared>) -> Json<serde_json::Value> {
    basket_body(&state.lock().await.basket)
}

async fn add_item(
    State(state): State<Shared>,
    Json(line): Json<LineItem>,
) -> Json<serde_json::Value> {
    let mut state = state.lock().await;
    state.basket.add(line);
    basket_body(&state.basket)
}

#[derive(Deserialize)]
struct RemoveBody {
    id: ProductId,
}

async fn remove_item(State(state): State<Shared>, Json(body): Json<RemoveBody>) -> Response {
    let mut state = state.lock().await;
    if state.basket.remove(body.id).is_none() {
        return StatusCode::NOT_FOUND.into_response();
    }
    basket_body(&state.basket).into_response()
}

async fn clear_basket(State(state): State<Shared>) -> StatusCode {
    state.lock().await.basket.clear();
    StatusCode::NO_CONTENT
}

async fn list_addresses(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let state = state.lock().await;
    if state.signed_in(&headers).is_none() {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    Json(state.addresses.addresses().to_vec()).into_response()
}

async fn create_address(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(input): Json<AddressInput>,
) -> Response {
    let mut state = state.lock().await;
    if state.signed_in(&headers).is_none() {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let address = Address {
        address_id: AddressId::new(state.next_address_id),
        details: input,
        is_default: state.addresses.is_empty(),
    };
    state.next_address_id += 1;
    state.addresses.upsert(address.clone());
    (StatusCode::CREATED, Json(address)).into_response()
}

async fn update_address(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<AddressId>,
    Json(input): Json<AddressInput>,
) -> Response {
    let mut state = state.lock().await;
    if state.signed_in(&headers).is_none() {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let Some(existing) = state.addresses.get(id).cloned() else {
        return StatusCode::NOT_FOUND.into_response();
    };
    let address = Address {
        details: input,
        ..existing
    };
    state.addresses.upsert(address.clone());
    Json(address).into_response()
}

async fn delete_address(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<AddressId>,
) -> StatusCode {
    let mut state = state.lock().await;
    if state.signed_in(&headers).is_none() {
        return StatusCode::UNAUTHORIZED;
    }
    match state.addresses.remove(id) {
        Some(_) => StatusCode::NO_CONTENT,
        None => StatusCode::NOT_FOUND,
    }
}

async fn set_default_address(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<AddressId>,
) -> Response {
    let mut state = state.lock().await;
    if state.signed_in(&headers).is_none() {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    if !state.addresses.set_default(id) {
        return StatusCode::NOT_FOUND.into_response();
    }
    Json(state.addresses.addresses().to_vec()).into_response()
}

#[derive(Deserialize)]
struct RegisterBody {
    fullname: String,
    email: String,
    password: String,
}

async fn register(State(state): State<Shared>, Json(body): Json<RegisterBody>) -> Response {
    let mut state = state.lock().await;
    if state.accounts.iter().any(|a| a.user.email.as_str() == body.email) {
        return (StatusCode::CONFLICT, "email already registered").into_response();
    }
    let id = i64::try_from(state.accounts.len()).unwrap_or(i64::MAX) + 1;
    let new_user = user(id, &body.fullname, &body.email);
    state.accounts.push(Account {
        user: new_user.clone(),
        password: body.password,
    });
    (StatusCode::CREATED, Json(new_user)).into_response()
}

#[derive(Deserialize)]
struct LoginBody {
    email: String,
    password: String,
}

async fn login(State(state): State<Shared>, Json(body): Json<LoginBody>) -> Response {
    let mut state = state.lock().await;
    let Some(found) = state
        .accounts
        .iter()
        .find(|a| a.user.email.as_str() == body.email && a.password == body.password)
        .map(|a| a.user.clone())
    else {
        return StatusCode::UNAUTHORIZED.into_response();
    };
    let token = format!("token-{}-{}", found.id, state.sessions.len());
    state.sessions.insert(token.clone(), found.id);
    Json(json!({ "user": found, "token": token })).into_response()
}

async fn logout(State(state): State<Shared>, headers: HeaderMap) -> StatusCode {
    let mut state = state.lock().await;
    if state.signed_in(&headers).is_none() {
        return StatusCode::UNAUTHORIZED;
    }
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(String::from);
    if let Some(token) = token {
        state.sessions.remove(&token);
    }
    StatusCode::NO_CONTENT
}

// =============================================================================
// Test context
// =============================================================================

/// A running storefront wired to a [`FakeBackend`], and a browser-like client.
pub struct TestContext {
    pub client: reqwest::Client,
    pub storefront_url: String,
    pub backend: FakeBackend,
}

impl TestContext {
    /// Start a backend and a storefront pointed at it.
    ///
    /// # Panics
    ///
    /// Panics if either server cannot start.
    pub async fn new() -> Self {
        let backend = FakeBackend::start().await;

        let config = StorefrontConfig {
            host: "127.0.0.1".parse().unwrap_or_else(|e| panic!("bad host: {e}")),
            port: 0,
            base_url: "http://127.0.0.1".to_string(),
            api: ApiConfig {
                base_url: backend.url.clone(),
                timeout: Duration::from_secs(5),
            },
            stale_policy: StalePolicy::default(),
            session_idle: Duration::from_secs(600),
            sentry_dsn: None,
            sentry_environment: None,
        };
        let state =
            AppState::new(config).unwrap_or_else(|e| panic!("failed to build app state: {e}"));
        let addr = serve(scamazon_storefront::app(state)).await;

        let client = reqwest::Client::builder()
            .cookie_store(true)
            .build()
            .unwrap_or_else(|e| panic!("failed to build client: {e}"));

        Self {
            client,
            storefront_url: format!("http://{addr}"),
            backend,
        }
    }

    /// Full storefront URL for `path`.
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.storefront_url)
    }

    /// GET a page and return its status and body.
    ///
    /// # Panics
    ///
    /// Panics if the request fails.
    pub async fn get(&self, path: &str) -> (reqwest::StatusCode, String) {
        let response = self
            .client
            .get(self.url(path))
            .send()
            .await
            .unwrap_or_else(|e| panic!("GET {path} failed: {e}"));
        let status = response.status();
        (status, response.text().await.unwrap_or_default())
    }

    /// POST a form, following redirects, and return the final path, status
    /// and body.
    ///
    /// # Panics
    ///
    /// Panics if the request fails.
    pub async fn post(&self, path: &str, form: &[(&str, &str)]) -> (String, reqwest::StatusCode, String) {
        let response = self
            .client
            .post(self.url(path))
            .form(form)
            .send()
            .await
            .unwrap_or_else(|e| panic!("POST {path} failed: {e}"));
        let final_path = response.url().path().to_string();
        let status = response.status();
        (final_path, status, response.text().await.unwrap_or_default())
    }

    /// Sign in as the seeded user through the two-step portal.
    ///
    /// # Panics
    ///
    /// Panics if sign-in does not land on the home page.
    pub async fn sign_in(&self) {
        self.post("/signin", &[("step", "email"), ("email", EMAIL)]).await;
        let (path, status, _) = self
            .post(
                "/signin",
                &[("step", "password"), ("email", EMAIL), ("password", PASSWORD)],
            )
            .await;
        assert_eq!((path.as_str(), status.as_u16()), ("/", 200), "sign-in failed");
    }
}
