//! Product route handlers: category listings and the product detail page.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::instrument;

use scamazon_core::{AvailabilityStatus, Product, ProductId};

use super::PageHeader;
use super::basket::MAX_PER_ADD;
use crate::content;
use crate::filters;
use crate::lifecycle::ViewScope;
use crate::middleware::Client;
use crate::state::AppState;
use crate::store::{SliceError, StoreState, products};

const LOADING: &str = "Loading...";
const LOAD_FAILED: &str = "Failed to load product. Please try again later.";
const NOT_FOUND: &str = "Product not found";
const LISTING_FAILED: &str = "Failed to load products. Please try again later.";

// =============================================================================
// View Types
// =============================================================================

/// A product card in a listing.
#[derive(Clone)]
pub struct ProductCardView {
    pub href: String,
    pub title: String,
    pub thumbnail: Option<String>,
    pub price: String,
    pub rating: String,
}

impl From<&Product> for ProductCardView {
    fn from(product: &Product) -> Self {
        Self {
            href: format!("/product/{}", product.id),
            title: product.title.clone(),
            thumbnail: product
                .thumbnail
                .clone()
                .or_else(|| product.images.first().cloned()),
            price: product.price.to_string(),
            rating: format!("{:.1}", product.rating),
        }
    }
}

/// Link to a department page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DepartmentLink {
    pub href: String,
    pub title: String,
}

impl DepartmentLink {
    fn for_category(category: &str) -> Option<Self> {
        content::department_of(category).map(|department| Self {
            href: format!("/department/{}", department.slug),
            title: department.title.to_string(),
        })
    }
}

/// Breadcrumb trail: department › category › product.
#[derive(Clone)]
pub struct BreadcrumbView {
    pub department: Option<DepartmentLink>,
    pub category_href: String,
    pub category_label: String,
    pub title: String,
}

/// A gallery thumbnail.
#[derive(Clone)]
pub struct ThumbnailView {
    pub href: String,
    pub url: String,
    pub active: bool,
}

#[derive(Clone)]
pub struct ReviewView {
    pub reviewer: String,
    pub stars: String,
    pub comment: String,
    pub date: Option<String>,
}

/// Everything the product page shows, preformatted.
#[derive(Clone)]
pub struct ProductView {
    pub id: ProductId,
    pub title: String,
    pub description: String,
    pub breadcrumb: BreadcrumbView,
    pub thumbnails: Vec<ThumbnailView>,
    pub main_image: Option<String>,
    pub rating: String,
    pub review_count: usize,
    pub availability: String,
    pub availability_class: &'static str,
    pub discount: String,
    pub price_whole: String,
    pub price_pence: String,
    pub rrp: Option<String>,
    pub shipping_information: String,
    pub return_policy: String,
    pub brand: Option<String>,
    pub sku: String,
    pub weight: String,
    pub width: String,
    pub height: String,
    pub depth: String,
    pub max_quantity: u32,
    /// Whether the Add to Basket button is enabled.
    pub purchasable: bool,
    pub reviews: Vec<ReviewView>,
}

impl ProductView {
    /// Build the view with image `active` selected (clamped to the gallery).
    #[must_use]
    pub fn new(product: &Product, active: usize) -> Self {
        let active = active.min(product.images.len().saturating_sub(1));
        Self {
            id: product.id,
            title: product.title.clone(),
            description: product.description.clone(),
            breadcrumb: BreadcrumbView {
                department: DepartmentLink::for_category(&product.category),
                category_href: format!("/category/{}", product.category),
                category_label: content::format_category(&product.category),
                title: product.title.clone(),
            },
            thumbnails: product
                .images
                .iter()
                .enumerate()
                .map(|(index, url)| ThumbnailView {
                    href: format!("/product/{}?image={index}", product.id),
                    url: url.clone(),
                    active: index == active,
                })
                .collect(),
            main_image: product
                .images
                .get(active)
                .or(product.thumbnail.as_ref())
                .cloned(),
            rating: format!("{:.1}", product.rating),
            review_count: product.reviews.len(),
            availability: product.availability_status.label().to_string(),
            availability_class: if product.availability_status == AvailabilityStatus::InStock {
                "in"
            } else {
                "out"
            },
            discount: format!("-{}", product.discount_percentage),
            price_whole: product.price.whole(),
            price_pence: product.price.pence(),
            rrp: product.recommended_retail().map(|rrp| rrp.to_string()),
            shipping_information: product.shipping_information.clone(),
            return_policy: product.return_policy.clone(),
            brand: product.brand.clone().filter(|brand| !brand.is_empty()),
            sku: product.sku.clone(),
            weight: format!("{}g", product.weight),
            width: format!("{}cm", product.dimensions.width),
            height: format!("{}cm", product.dimensions.height),
            depth: format!("{}cm", product.dimensions.depth),
            max_quantity: MAX_PER_ADD,
            purchasable: product.availability_status.is_available(),
            reviews: product
                .reviews
                .iter()
                .map(|review| ReviewView {
                    reviewer: review.reviewer_name.clone(),
                    stars: stars(review.rating),
                    comment: review.comment.clone(),
                    date: review
                        .date
                        .map(|date| date.format("%-d %B %Y").to_string()),
                })
                .collect(),
        }
    }
}

fn stars(rating: u8) -> String {
    let filled = usize::from(rating.min(5));
    format!("{}{}", "★".repeat(filled), "☆".repeat(5 - filled))
}

// =============================================================================
// Templates
// =============================================================================

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "product.html")]
pub struct ProductTemplate {
    pub header: PageHeader,
    pub product: Option<ProductView>,
    pub message: &'static str,
}

/// Category listing template.
#[derive(Template, WebTemplate)]
#[template(path = "category.html")]
pub struct CategoryTemplate {
    pub header: PageHeader,
    pub title: String,
    pub department: Option<DepartmentLink>,
    pub products: Vec<ProductCardView>,
    pub error: Option<&'static str>,
}

/// Query parameters for the product page.
#[derive(Debug, Deserialize)]
pub struct ProductQuery {
    /// Index of the active gallery image.
    pub image: Option<usize>,
}

/// What the product page shows for a store snapshot.
fn product_page(state: &StoreState, id: ProductId, active: usize) -> (StatusCode, ProductTemplate) {
    let header = PageHeader::from_state(state);
    let products = &state.products;

    if let Some(product) = products.current_if(id) {
        let template = ProductTemplate {
            header,
            product: Some(ProductView::new(product, active)),
            message: "",
        };
        return (StatusCode::OK, template);
    }

    let (status, message) = if products.meta().is_loading() {
        (StatusCode::OK, LOADING)
    } else {
        match products.meta().error() {
            Some(SliceError::NotFound) | None => (StatusCode::NOT_FOUND, NOT_FOUND),
            Some(SliceError::Request(_)) => (StatusCode::BAD_GATEWAY, LOAD_FAILED),
        }
    };
    let template = ProductTemplate {
        header,
        product: None,
        message,
    };
    (status, template)
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the product detail page.
///
/// The product is fetched on mount unless it is already the current product.
#[instrument(skip(state, client))]
pub async fn show(
    State(state): State<AppState>,
    Client(client): Client,
    Path(id): Path<String>,
    Query(query): Query<ProductQuery>,
) -> Response {
    let Ok(id) = id.parse::<ProductId>() else {
        let header = client.store.select(PageHeader::from_state);
        let template = ProductTemplate {
            header,
            product: None,
            message: NOT_FOUND,
        };
        return (StatusCode::NOT_FOUND, template).into_response();
    };

    let mut scope = ViewScope::mount("product", &client.notices);
    scope.spawn(products::fetch_single_product(
        client.store.clone(),
        state.api().clone(),
        id,
    ));
    scope.settle().await;

    client
        .store
        .select(|s| product_page(s, id, query.image.unwrap_or(0)))
        .into_response()
}

/// Display every product in a category.
#[instrument(skip(state, client))]
pub async fn category(
    State(state): State<AppState>,
    Client(client): Client,
    Path(category): Path<String>,
) -> Response {
    let mut scope = ViewScope::mount("category", &client.notices);
    scope.spawn(products::fetch_products_by_category(
        client.store.clone(),
        state.api().clone(),
        category.clone(),
    ));
    let failed = !scope.settle().await.is_empty();

    let department = DepartmentLink::for_category(&category);

    let template = client.store.select(|s| CategoryTemplate {
        header: PageHeader::from_state(s),
        title: content::format_category(&category),
        department,
        products: s
            .products
            .listing_for(&category)
            .unwrap_or_default()
            .iter()
            .map(ProductCardView::from)
            .collect(),
        error: failed.then_some(LISTING_FAILED),
    });

    let status = if failed {
        StatusCode::BAD_GATEWAY
    } else {
        StatusCode::OK
    };
    (status, template).into_response()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::store::{ProductsAction, RequestToken, StalePolicy, Store};

    fn product() -> Product {
        serde_json::from_value(serde_json::json!({
            "id": 4,
            "title": "iPhone 9",
            "description": "An apple mobile which is nothing like apple",
            "category": "smartphones",
            "price": 549,
            "discountPercentage": 12.96,
            "rating": 4.69,
            "availabilityStatus": "In Stock",
            "sku": "IPH-9",
            "weight": 150,
            "dimensions": {"width": 7.1, "height": 14.3, "depth": 0.8},
            "images": ["https://cdn.example.com/4/1.jpg", "https://cdn.example.com/4/2.jpg"],
            "reviews": [{"rating": 4, "comment": "Great", "reviewerName": "Sam"}]
        }))
        .unwrap()
    }

    #[test]
    fn test_pricing() {
        let view = ProductView::new(&product(), 0);
        assert_eq!(view.price_whole, "549");
        assert_eq!(view.price_pence, "00");
        assert_eq!(view.discount, "-12.96%");
        // 549 / (1 - 0.1296) = 630.744...
        assert_eq!(view.rrp.as_deref(), Some("£630.74"));
    }

    #[test]
    fn test_breadcrumb_and_specs() {
        let view = ProductView::new(&product(), 0);
        assert_eq!(
            view.breadcrumb.department,
            Some(DepartmentLink {
                href: "/department/electronics".to_string(),
                title: "Electronics".to_string(),
            })
        );
        assert_eq!(view.breadcrumb.category_label, "Smartphones");
        assert_eq!(view.availability_class, "in");
        assert!(view.purchasable);
        assert!(view.brand.is_none());
        assert_eq!(view.weight, "150g");
        assert_eq!(view.depth, "0.8cm");
        assert_eq!(view.review_count, 1);
        assert_eq!(view.reviews[0].stars, "★★★★☆");
    }

    #[test]
    fn test_low_stock_is_purchasable_but_not_in_stock() {
        let mut product = product();
        product.availability_status = AvailabilityStatus::LowStock;
        let view = ProductView::new(&product, 0);
        assert_eq!(view.availability_class, "out");
        assert!(view.purchasable);

        product.availability_status = AvailabilityStatus::OutOfStock;
        assert!(!ProductView::new(&product, 0).purchasable);
    }

    #[test]
    fn test_active_thumbnail_is_clamped() {
        let view = ProductView::new(&product(), 9);
        assert!(view.thumbnails[1].active);
        assert_eq!(view.main_image.as_deref(), Some("https://cdn.example.com/4/2.jpg"));
    }

    #[test]
    fn test_page_states() {
        let store = Store::new(StalePolicy::default());
        let id = ProductId::new(4);

        let (status, page) = store.select(|s| product_page(s, id, 0));
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(page.message, NOT_FOUND);

        let request = store.start::<ProductsAction>();
        let (_, page) = store.select(|s| product_page(s, id, 0));
        assert_eq!(page.message, LOADING);

        let token = request.token();
        request.resolve(ProductsAction::Rejected {
            token,
            error: SliceError::Request("HTTP 500".to_string()),
        });
        let (status, page) = store.select(|s| product_page(s, id, 0));
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(page.message, LOAD_FAILED);

        store.dispatch(ProductsAction::ProductLoaded {
            token: RequestToken::new(99),
            product: product(),
        });
        let (status, page) = store.select(|s| product_page(s, id, 0));
        assert_eq!(status, StatusCode::OK);
        assert!(page.product.is_some());
    }
}
