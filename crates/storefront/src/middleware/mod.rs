//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. Request ID (reuse or generate `x-request-id`)
//! 3. `TraceLayer` (request span, tagged with the request id)
//! 4. Security headers
//! 5. Session layer (tower-sessions, in-memory store)
//!
//! # Extractors
//!
//! - [`Client`] - the browser's [`ClientSession`](crate::session::ClientSession)
//! - [`RequireUser`] - the signed-in user, or a redirect to `/signin`

pub mod auth;
pub mod client;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use auth::RequireUser;
pub use client::Client;
pub use request_id::{RequestId, request_id_middleware};
pub use security_headers::security_headers_middleware;
pub use session::create_session_layer;
