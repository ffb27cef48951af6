//! Products slice: the product being viewed and the current category listing.

use scamazon_core::{Product, ProductId};

use super::{Reducer, RequestToken, SliceAction, SliceError, SliceMeta, StalePolicy, Store};
use crate::api::ApiClient;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductsState {
    meta: SliceMeta,
    current: Option<Product>,
    category: Option<String>,
    listing: Vec<Product>,
}

impl ProductsState {
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

    /// The most recently loaded single product.
    #[must_use]
    pub const fn current(&self) -> Option<&Product> {
        self.current.as_ref()
    }

    /// The current product, if it is the one with `id`.
    #[must_use]
    pub fn current_if(&self, id: ProductId) -> Option<&Product> {
        self.current.as_ref().filter(|product| product.id == id)
    }

    /// The listing for `category`, if that is the loaded category.
    #[must_use]
    pub fn listing_for(&self, category: &str) -> Option<&[Product]> {
        (self.category.as_deref() == Some(category)).then_some(self.listing.as_slice())
    }
}

#[derive(Debug, Clone)]
pub enum ProductsAction {
    Pending { token: RequestToken },
    ProductLoaded { token: RequestToken, product: Product },
    CategoryLoaded {
        token: RequestToken,
        category: String,
        products: Vec<Product>,
    },
    Rejected { token: RequestToken, error: SliceError },
    Cancelled { token: RequestToken },
}

impl SliceAction for ProductsAction {
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

impl Reducer for ProductsState {
    type Action = ProductsAction;

    fn reduce(mut self, action: ProductsAction) -> Self {
        match action {
            ProductsAction::Pending { token } => self.meta.begin(token),
            ProductsAction::ProductLoaded { token, product } => {
                if self.meta.accepts(token) {
                    self.meta.succeed();
                    self.current = Some(product);
                }
            }
            ProductsAction::CategoryLoaded {
                token,
                category,
                products,
            } => {
                if self.meta.accepts(token) {
                    self.meta.succeed();
                    self.category = Some(category);
                    self.listing = products;
                }
            }
            ProductsAction::Rejected { token, error } => {
                if self.meta.accepts(token) {
                    self.meta.fail(error);
                }
            }
            ProductsAction::Cancelled { token } => self.meta.cancel(token),
        }
        self
    }
}

/// Load product `id` unless it is already the current product.
///
/// # Errors
///
/// Returns the stored [`SliceError`] if the request fails;
/// [`SliceError::NotFound`] when the product does not exist.
pub async fn fetch_single_product(
    store: Store,
    api: ApiClient,
    id: ProductId,
) -> Result<(), SliceError> {
    if store.select(|s| s.products.current_if(id).is_some()) {
        tracing::debug!(product_id = %id, "product already loaded");
        return Ok(());
    }
    let request = store.start::<ProductsAction>();
    let result = api.get_product(id).await;
    request.settle(result, |token, product| ProductsAction::ProductLoaded {
        token,
        product,
    })
}

/// Load every product in `category`.
///
/// # Errors
///
/// Returns the stored [`SliceError`] if the request fails.
pub async fn fetch_products_by_category(
    store: Store,
    api: ApiClient,
    category: String,
) -> Result<(), SliceError> {
    let request = store.start::<ProductsAction>();
    let result = api.products_by_category(&category).await;
    request.settle(result, |token, products| ProductsAction::CategoryLoaded {
        token,
        category,
        products,
    })
}
