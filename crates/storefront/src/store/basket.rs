//! Basket slice.
//!
//! Every backend response carries the whole basket, so successful actions
//! replace the held basket instead of patching it.

use scamazon_core::{Basket, Product, ProductId, Quantity};

use super::{Reducer, RequestToken, SliceAction, SliceError, SliceMeta, StalePolicy, Store};
use crate::api::ApiClient;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BasketState {
    meta: SliceMeta,
    basket: Basket,
}

impl BasketState {
    #[must_use]
    pub fn new(policy: StalePolicy) -> Self {
        Self {
            meta: SliceMeta::with_policy(policy),
            basket: Basket::new(),
        }
    }

    #[must_use]
    pub const fn meta(&self) -> &SliceMeta {
        &self.meta
    }

    #[must_use]
    pub const fn basket(&self) -> &Basket {
        &self.basket
    }

    /// Forget the held basket, keeping the configured policy.
    #[must_use]
    pub(crate) fn reset(self) -> Self {
        Self::new(self.meta.policy)
    }
}

#[derive(Debug, Clone)]
pub enum BasketAction {
    Pending { token: RequestToken },
    /// The backend returned the basket after a fetch, add or remove.
    Loaded { token: RequestToken, basket: Basket },
    /// The backend had no line for a product the local basket still lists.
    LineMissing { token: RequestToken, product_id: ProductId },
    Cleared { token: RequestToken },
    Rejected { token: RequestToken, error: SliceError },
    Cancelled { token: RequestToken },
}

impl SliceAction for BasketAction {
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

impl Reducer for BasketState {
    type Action = BasketAction;

    fn reduce(mut self, action: BasketAction) -> Self {
        match action {
            BasketAction::Pending { token } => self.meta.begin(token),
            BasketAction::Loaded { token, basket } => {
                if self.meta.accepts(token) {
                    self.meta.succeed();
                    self.basket = Basket::from_items(basket.items().iter().cloned());
                }
            }
            BasketAction::LineMissing { token, product_id } => {
                if self.meta.accepts(token) {
                    self.meta.succeed();
                    self.basket.remove(product_id);
                }
            }
            BasketAction::Cleared { token } => {
                if self.meta.accepts(token) {
                    self.meta.succeed();
                    self.basket.clear();
                }
            }
            BasketAction::Rejected { token, error } => {
                if self.meta.accepts(token) {
                    self.meta.fail(error);
                }
            }
            BasketAction::Cancelled { token } => self.meta.cancel(token),
        }
        self
    }
}

/// Load the basket from the backend.
///
/// # Errors
///
/// Returns the stored [`SliceError`] if the request fails.
pub async fn fetch_basket(store: Store, api: ApiClient) -> Result<(), SliceError> {
    let auth = store.select(|s| s.user.token().cloned());
    let request = store.start::<BasketAction>();
    let result = api.get_basket(auth.as_ref()).await;
    request.settle(result, |token, basket| BasketAction::Loaded { token, basket })
}

/// Add `quantity` units of `product`.
///
/// # Errors
///
/// Returns the stored [`SliceError`] if the request fails.
pub async fn add_item_to_basket(
    store: Store,
    api: ApiClient,
    product: Product,
    quantity: Quantity,
) -> Result<(), SliceError> {
    let auth = store.select(|s| s.user.token().cloned());
    let request = store.start::<BasketAction>();
    let result = api.add_item(auth.as_ref(), &product, quantity).await;
    request.settle(result, |token, basket| BasketAction::Loaded { token, basket })
}

/// Remove the line for `product_id`.
///
/// A product that is not in the basket is a no-op and sends no request. If
/// the backend has already dropped the line, it is removed locally.
///
/// # Errors
///
/// Returns the stored [`SliceError`] if the request fails.
pub async fn remove_item_from_basket(
    store: Store,
    api: ApiClient,
    product_id: ProductId,
) -> Result<(), SliceError> {
    let (present, auth) = store.select(|s| {
        (
            s.basket.basket().contains(product_id),
            s.user.token().cloned(),
        )
    });
    if !present {
        tracing::debug!(%product_id, "product not in basket, nothing to remove");
        return Ok(());
    }

    let request = store.start::<BasketAction>();
    match api.remove_item(auth.as_ref(), product_id).await {
        Err(err) if err.is_not_found() => {
            let token = request.token();
            request.resolve(BasketAction::LineMissing { token, product_id });
            Ok(())
        }
        result => request.settle(result, |token, basket| BasketAction::Loaded { token, basket }),
    }
}

/// Empty the basket.
///
/// # Errors
///
/// Returns the stored [`SliceError`] if the request fails.
pub async fn clear_basket(store: Store, api: ApiClient) -> Result<(), SliceError> {
    let auth = store.select(|s| s.user.token().cloned());
    let request = store.start::<BasketAction>();
    let result = api.clear_basket(auth.as_ref()).await;
    request.settle(result, |token, ()| BasketAction::Cleared { token })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;
    use scamazon_core::{LineItem, LoadStatus, Price};

    use super::*;

    fn line(id: i64, quantity: u32, price: i64) -> LineItem {
        LineItem {
            product_id: ProductId::new(id),
            title: format!("Product {id}"),
            price: Price::new(Decimal::new(price, 0)),
            quantity: Quantity::new(quantity).unwrap(),
            thumbnail: None,
        }
    }

    fn loaded(items: Vec<LineItem>) -> BasketState {
        BasketState::default()
            .reduce(BasketAction::Pending {
                token: RequestToken::new(1),
            })
            .reduce(BasketAction::Loaded {
                token: RequestToken::new(1),
                basket: Basket::from_items(items),
            })
    }

    #[test]
    fn test_pending_clears_error() {
        let state = BasketState::default()
            .reduce(BasketAction::Rejected {
                token: RequestToken::new(1),
                error: SliceError::Request("boom".to_string()),
            })
            .reduce(BasketAction::Pending {
                token: RequestToken::new(2),
            });
        assert_eq!(state.meta().status(), LoadStatus::Loading);
        assert!(state.meta().error().is_none());
    }

    #[test]
    fn test_loaded_replaces_basket() {
        let state = loaded(vec![line(1, 2, 10)]);
        assert_eq!(state.meta().status(), LoadStatus::Succeeded);
        assert_eq!(state.basket().total().to_string(), "£20.00");
    }

    #[test]
    fn test_loaded_folds_duplicate_lines() {
        let duplicated: Basket = serde_json::from_str(
            r#"{"items":[
                {"id":1,"title":"A","price":5,"quantity":1},
                {"id":1,"title":"A","price":5,"quantity":3}
            ]}"#,
        )
        .unwrap();
        let state = BasketState::default().reduce(BasketAction::Loaded {
            token: RequestToken::new(1),
            basket: duplicated,
        });
        assert_eq!(state.basket().items().len(), 1);
        assert_eq!(state.basket().item_count(), 4);
    }

    #[test]
    fn test_failed_fetch_keeps_basket() {
        let state = loaded(vec![line(1, 2, 10)])
            .reduce(BasketAction::Pending {
                token: RequestToken::new(2),
            })
            .reduce(BasketAction::Rejected {
                token: RequestToken::new(2),
                error: SliceError::Request("timeout".to_string()),
            });
        assert_eq!(state.meta().status(), LoadStatus::Failed);
        assert!(state.meta().error().is_some());
        assert_eq!(state.basket().items().len(), 1);
    }

    #[test]
    fn test_cleared_empties_any_basket() {
        let state = loaded(vec![line(1, 2, 10), line(2, 1, 3), line(3, 7, 1)]).reduce(
            BasketAction::Cleared {
                token: RequestToken::new(2),
            },
        );
        assert!(state.basket().is_empty());
    }

    #[test]
    fn test_line_missing_removes_locally() {
        let state = loaded(vec![line(1, 2, 10), line(2, 1, 3)]).reduce(
            BasketAction::LineMissing {
                token: RequestToken::new(2),
                product_id: ProductId::new(1),
            },
        );
        assert!(!state.basket().contains(ProductId::new(1)));
        assert!(state.basket().contains(ProductId::new(2)));
    }

    #[test]
    fn test_last_resolution_wins_by_default() {
        let state = BasketState::default()
            .reduce(BasketAction::Pending {
                token: RequestToken::new(1),
            })
            .reduce(BasketAction::Pending {
                token: RequestToken::new(2),
            })
            .reduce(BasketAction::Loaded {
                token: RequestToken::new(2),
                basket: Basket::from_items([line(2, 1, 1)]),
            })
            .reduce(BasketAction::Loaded {
                token: RequestToken::new(1),
                basket: Basket::from_items([line(1, 1, 1)]),
            });
        assert!(state.basket().contains(ProductId::new(1)));
    }

    #[test]
    fn test_latest_dispatch_wins_ignores_superseded() {
        let state = BasketState::new(StalePolicy::LatestDispatchWins)
            .reduce(BasketAction::Pending {
                token: RequestToken::new(1),
            })
            .reduce(BasketAction::Pending {
                token: RequestToken::new(2),
            })
            .reduce(BasketAction::Loaded {
                token: RequestToken::new(2),
                basket: Basket::from_items([line(2, 1, 1)]),
            })
            .reduce(BasketAction::Rejected {
                token: RequestToken::new(1),
                error: SliceError::Request("late".to_string()),
            });
        assert!(state.basket().contains(ProductId::new(2)));
        assert_eq!(state.meta().status(), LoadStatus::Succeeded);
    }

    #[test]
    fn test_cancelled_returns_to_idle_with_data() {
        let state = loaded(vec![line(1, 2, 10)])
            .reduce(BasketAction::Pending {
                token: RequestToken::new(2),
            })
            .reduce(BasketAction::Cancelled {
                token: RequestToken::new(2),
            });
        assert_eq!(state.meta().status(), LoadStatus::Idle);
        assert_eq!(state.basket().items().len(), 1);
    }
}
