//! Per-browser client state.
//!
//! The session cookie carries only a random client id. The id maps to a
//! [`ClientSession`] held in memory; idle entries are evicted after the
//! configured idle time and nothing is persisted.

use std::time::Duration;

use moka::future::Cache;
use uuid::Uuid;

use crate::lifecycle::NoticeBoard;
use crate::store::{StalePolicy, Store};

/// Session key holding the client id.
pub const CLIENT_ID_KEY: &str = "client_id";

/// Upper bound on concurrently held client sessions.
const MAX_CLIENTS: u64 = 100_000;

/// Everything one browser session owns.
#[derive(Debug, Clone, Default)]
pub struct ClientSession {
    pub store: Store,
    pub notices: NoticeBoard,
}

impl ClientSession {
    #[must_use]
    pub fn new(policy: StalePolicy) -> Self {
        Self {
            store: Store::new(policy),
            notices: NoticeBoard::default(),
        }
    }
}

/// Maps client ids to their [`ClientSession`].
#[derive(Clone)]
pub struct SessionRegistry {
    clients: Cache<Uuid, ClientSession>,
    policy: StalePolicy,
}

impl SessionRegistry {
    #[must_use]
    pub fn new(policy: StalePolicy, idle: Duration) -> Self {
        let clients = Cache::builder()
            .max_capacity(MAX_CLIENTS)
            .time_to_idle(idle)
            .build();
        Self { clients, policy }
    }

    /// The session for `id`, created empty on first use.
    pub async fn get_or_create(&self, id: Uuid) -> ClientSession {
        let policy = self.policy;
        self.clients
            .get_with(id, async move {
                tracing::debug!(client_id = %id, "new client session");
                ClientSession::new(policy)
            })
            .await
    }

    /// Drop the session for `id`, e.g. after sign-out.
    pub async fn forget(&self, id: Uuid) {
        self.clients.invalidate(&id).await;
    }
}
