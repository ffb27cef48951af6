//! Addresses slice.
//!
//! Backend records pass through [`AddressBook`] on the way in, so the held
//! collection never has more than one default.

use scamazon_core::{Address, AddressBook, AddressId, AddressInput};

use super::{Reducer, RequestToken, SliceAction, SliceError, SliceMeta, StalePolicy, Store};
use crate::api::ApiClient;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressesState {
    meta: SliceMeta,
    book: AddressBook,
}

impl AddressesState {
    #[must_use]
    pub fn new(policy: StalePolicy) -> Self {
        Self {
            meta: SliceMeta::with_policy(policy),
            book: AddressBook::default(),
        }
    }

    #[must_use]
    pub const fn meta(&self) -> &SliceMeta {
        &self.meta
    }

    #[must_use]
    pub const fn book(&self) -> &AddressBook {
        &self.book
    }

    /// Drop all addresses, keeping the configured policy.
    #[must_use]
    pub(crate) fn reset(self) -> Self {
        Self::new(self.meta.policy)
    }
}

#[derive(Debug, Clone)]
pub enum AddressesAction {
    Pending { token: RequestToken },
    Loaded { token: RequestToken, addresses: Vec<Address> },
    /// A created or updated address.
    Saved { token: RequestToken, address: Address },
    Deleted { token: RequestToken, id: AddressId },
    DefaultSet {
        token: RequestToken,
        id: AddressId,
        addresses: Vec<Address>,
    },
    Rejected { token: RequestToken, error: SliceError },
    Cancelled { token: RequestToken },
}

impl SliceAction for AddressesAction {
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

impl Reducer for AddressesState {
    type Action = AddressesAction;

    fn reduce(mut self, action: AddressesAction) -> Self {
        match action {
            AddressesAction::Pending { token } => self.meta.begin(token),
            AddressesAction::Rejected { token, error } => {
                if self.meta.accepts(token) {
                    self.meta.fail(error);
                }
            }
            AddressesAction::Cancelled { token } => self.meta.cancel(token),
            AddressesAction::Loaded { token, addresses } => {
                if self.meta.accepts(token) {
                    self.meta.succeed();
                    self.book = AddressBook::from_addresses(addresses);
                }
            }
            AddressesAction::Saved { token, address } => {
                if self.meta.accepts(token) {
                    self.meta.succeed();
                    self.book.upsert(address);
                }
            }
            AddressesAction::Deleted { token, id } => {
                if self.meta.accepts(token) {
                    self.meta.succeed();
                    self.book.remove(id);
                }
            }
            AddressesAction::DefaultSet {
                token,
                id,
                addresses,
            } => {
                if self.meta.accepts(token) {
                    self.meta.succeed();
                    let mut book = AddressBook::from_addresses(addresses);
                    // The chosen address wins even if the response disagrees
                    if !book.set_default(id) {
                        tracing::warn!(address_id = %id, "default address missing from response");
                    }
                    self.book = book;
                }
            }
        }
        self
    }
}

fn auth(store: &Store) -> Option<secrecy::SecretString> {
    store.select(|s| s.user.token().cloned())
}

/// Load the signed-in user's addresses.
///
/// # Errors
///
/// Returns the stored [`SliceError`] if the request fails.
pub async fn fetch_addresses(store: Store, api: ApiClient) -> Result<(), SliceError> {
    let token = auth(&store);
    let request = store.start::<AddressesAction>();
    let result = api.list_addresses(token.as_ref()).await;
    request.settle(result, |token, addresses| AddressesAction::Loaded {
        token,
        addresses,
    })
}

/// Save a new address.
///
/// # Errors
///
/// Returns the stored [`SliceError`] if the request fails.
pub async fn create_address(
    store: Store,
    api: ApiClient,
    input: AddressInput,
) -> Result<(), SliceError> {
    let token = auth(&store);
    let request = store.start::<AddressesAction>();
    let result = api.create_address(token.as_ref(), &input).await;
    request.settle(result, |token, address| AddressesAction::Saved { token, address })
}

/// Replace the editable fields of address `id`.
///
/// # Errors
///
/// Returns the stored [`SliceError`] if the request fails.
pub async fn update_address(
    store: Store,
    api: ApiClient,
    id: AddressId,
    input: AddressInput,
) -> Result<(), SliceError> {
    let token = auth(&store);
    let request = store.start::<AddressesAction>();
    let result = api.update_address(token.as_ref(), id, &input).await;
    request.settle(result, |token, address| AddressesAction::Saved { token, address })
}

/// Delete address `id`.
///
/// # Errors
///
/// Returns the stored [`SliceError`] if the request fails.
pub async fn delete_address(store: Store, api: ApiClient, id: AddressId) -> Result<(), SliceError> {
    let token = auth(&store);
    let request = store.start::<AddressesAction>();
    let result = api.delete_address(token.as_ref(), id).await;
    request.settle(result, |token, ()| AddressesAction::Deleted { token, id })
}

/// Make address `id` the default.
///
/// # Errors
///
/// Returns the stored [`SliceError`] if the request fails.
pub async fn set_default_address(
    store: Store,
    api: ApiClient,
    id: AddressId,
) -> Result<(), SliceError> {
    let token = auth(&store);
    let request = store.start::<AddressesAction>();
    let result = api.set_default_address(token.as_ref(), id).await;
    request.settle(result, |token, addresses| AddressesAction::DefaultSet {
        token,
        id,
        addresses,
    })
}

#[cfg(test)]
mod tests {
    use scamazon_core::LoadStatus;

    use super::*;

    fn address(id: i64, is_default: bool) -> Address {
        Address {
            address_id: AddressId::new(id),
            details: AddressInput {
                full_name: format!("Resident {id}"),
                address_line1: format!("{id} High Street"),
                city: "Leeds".to_string(),
                postcode: "LS1 1AA".to_string(),
                country: "United Kingdom".to_string(),
                phone_number: "0113 000 0000".to_string(),
                ..AddressInput::default()
            },
            is_default,
        }
    }

    fn token(n: u64) -> RequestToken {
        RequestToken::new(n)
    }

    fn defaults(state: &AddressesState) -> Vec<AddressId> {
        state
            .book()
            .addresses()
            .iter()
            .filter(|a| a.is_default)
            .map(|a| a.address_id)
            .collect()
    }

    #[test]
    fn test_set_default_leaves_exactly_one() {
        let state = AddressesState::default()
            .reduce(AddressesAction::Loaded {
                token: token(1),
                addresses: vec![address(1, true), address(2, false), address(3, false)],
            })
            .reduce(AddressesAction::DefaultSet {
                token: token(2),
                id: AddressId::new(3),
                addresses: vec![address(1, true), address(2, false), address(3, true)],
            });
        assert_eq!(defaults(&state), vec![AddressId::new(3)]);
    }

    #[test]
    fn test_set_default_when_response_is_stale() {
        let state = AddressesState::default().reduce(AddressesAction::DefaultSet {
            token: token(1),
            id: AddressId::new(2),
            addresses: vec![address(1, true), address(2, false)],
        });
        assert_eq!(defaults(&state), vec![AddressId::new(2)]);
    }

    #[test]
    fn test_saved_default_clears_previous() {
        let state = AddressesState::default()
            .reduce(AddressesAction::Loaded {
                token: token(1),
                addresses: vec![address(1, true)],
            })
            .reduce(AddressesAction::Saved {
                token: token(2),
                address: address(2, true),
            });
        assert_eq!(state.book().addresses().len(), 2);
        assert_eq!(defaults(&state), vec![AddressId::new(2)]);
    }

    #[test]
    fn test_deleted_removes_address() {
        let state = AddressesState::default()
            .reduce(AddressesAction::Loaded {
                token: token(1),
                addresses: vec![address(1, true), address(2, false)],
            })
            .reduce(AddressesAction::Deleted {
                token: token(2),
                id: AddressId::new(1),
            });
        assert!(!state.book().contains(AddressId::new(1)));
        assert!(state.book().default_address().is_none());
    }

    #[test]
    fn test_failed_fetch_keeps_addresses() {
        let state = AddressesState::default()
            .reduce(AddressesAction::Loaded {
                token: token(1),
                addresses: vec![address(1, true)],
            })
            .reduce(AddressesAction::Pending { token: token(2) })
            .reduce(AddressesAction::Rejected {
                token: token(2),
                error: SliceError::Request("502 Bad Gateway".to_string()),
            });
        assert_eq!(state.meta().status(), LoadStatus::Failed);
        assert_eq!(state.book().addresses().len(), 1);
    }

    #[test]
    fn test_reset_keeps_policy() {
        let state = AddressesState::new(StalePolicy::LatestDispatchWins)
            .reduce(AddressesAction::Loaded {
                token: token(1),
                addresses: vec![address(1, true)],
            })
            .reset();
        assert!(state.book().is_empty());
        assert_eq!(state, AddressesState::new(StalePolicy::LatestDispatchWins));
    }
}
