//! Request and response bodies for the backend API.
//!
//! Domain records (`Basket`, `Address`, `Product`, `User`) come from
//! `scamazon-core`; this module only holds the envelopes around them.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize, Serializer};

use scamazon_core::{Basket, Email, LineItem, Product, ProductId, Quantity, User};

/// A basket as the backend returns it.
///
/// Both `{"items": [...]}` and a bare array are accepted. Duplicate lines for
/// one product are folded when converting to a [`Basket`].
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum BasketPayload {
    Wrapped { items: Vec<LineItem> },
    Bare(Vec<LineItem>),
}

impl From<BasketPayload> for Basket {
    fn from(payload: BasketPayload) -> Self {
        match payload {
            BasketPayload::Wrapped { items } | BasketPayload::Bare(items) => {
                Self::from_items(items)
            }
        }
    }
}

/// Body of `POST /api/basket/add`: the product's own fields plus a quantity.
#[derive(Debug, Serialize)]
pub struct AddItemRequest<'a> {
    #[serde(flatten)]
    pub product: &'a Product,
    pub quantity: Quantity,
}

/// Body of `DELETE /api/basket/remove`.
#[derive(Debug, Serialize)]
pub struct RemoveItemRequest {
    pub id: ProductId,
}

/// Body of `POST /api/users/register`.
#[derive(Debug, Serialize)]
pub struct RegisterRequest {
    pub fullname: String,
    pub email: Email,
    #[serde(serialize_with = "serialize_secret")]
    pub password: SecretString,
}

/// Body of `POST /api/users/login`.
#[derive(Debug, Serialize)]
pub struct LoginRequest {
    pub email: Email,
    #[serde(serialize_with = "serialize_secret")]
    pub password: SecretString,
}

/// Response of `POST /api/users/login`.
#[derive(Deserialize)]
pub struct LoginResponse {
    pub user: User,
    #[serde(default)]
    pub token: Option<String>,
}

/// A signed-in user together with the backend session token, if one was issued.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub user: User,
    pub token: Option<SecretString>,
}

impl From<LoginResponse> for AuthSession {
    fn from(response: LoginResponse) -> Self {
        Self {
            user: response.user,
            token: response.token.map(SecretString::from),
        }
    }
}

fn serialize_secret<S: Serializer>(secret: &SecretString, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(secret.expose_secret())
}
