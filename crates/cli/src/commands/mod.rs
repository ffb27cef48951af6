//! CLI command implementations.

pub mod addresses;
pub mod basket;
pub mod catalog;

use secrecy::SecretString;

use scamazon_core::Email;
use scamazon_storefront::api::ApiClient;
use scamazon_storefront::api::types::LoginRequest;
use scamazon_storefront::config::ApiConfig;
use scamazon_storefront::store::{StalePolicy, Store, user};

/// Result type shared by the commands.
pub type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// A store and API client, optionally signed in.
pub struct Shopper {
    pub store: Store,
    pub api: ApiClient,
}

impl Shopper {
    /// Load the API settings and sign in as `email` if given.
    ///
    /// # Errors
    ///
    /// Returns an error if `SCAMAZON_API_URL` is missing, `SCAMAZON_PASSWORD`
    /// is missing when signing in, or the backend rejects the credentials.
    pub async fn connect(email: Option<&str>) -> Result<Self, Box<dyn std::error::Error>> {
        dotenvy::dotenv().ok();

        let config = ApiConfig::from_env()?;
        let api = ApiClient::new(&config)?;
        let store = Store::new(StalePolicy::default());
        tracing::debug!(api = %api.base_url(), "using backend");

        if let Some(email) = email {
            let password = std::env::var("SCAMAZON_PASSWORD")
                .map(SecretString::from)
                .map_err(|_| "SCAMAZON_PASSWORD not set")?;
            let request = LoginRequest {
                email: Email::parse(email)?,
                password,
            };
            user::login_user(store.clone(), api.clone(), request).await?;
            tracing::info!("Signed in as {}", email);
        }

        Ok(Self { store, api })
    }

    /// Whether a user is signed in.
    pub fn signed_in(&self) -> bool {
        self.store.select(|s| s.user.is_logged_in())
    }
}
