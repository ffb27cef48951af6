//! Basket route handlers.
//!
//! The page fetches the basket on mount. Add, remove and clear run the
//! matching slice action and redirect back to the basket page.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use scamazon_core::{Basket, LineItem, ProductId, Quantity};

use super::PageHeader;
use crate::error::{AppError, add_breadcrumb};
use crate::filters;
use crate::lifecycle::ViewScope;
use crate::middleware::Client;
use crate::state::AppState;
use crate::store::basket;

const LOAD_FAILED: &str = "Failed to load your basket. Please try again later.";

/// Most units one "Add to Basket" submission may request.
pub const MAX_PER_ADD: u32 = 999;

/// Basket line display data for templates.
#[derive(Clone)]
pub struct LineView {
    pub product_id: ProductId,
    pub href: String,
    pub title: String,
    pub thumbnail: Option<String>,
    pub quantity: u32,
    pub price: String,
    pub line_total: String,
}

impl From<&LineItem> for LineView {
    fn from(line: &LineItem) -> Self {
        Self {
            product_id: line.product_id,
            href: format!("/product/{}", line.product_id),
            title: line.title.clone(),
            thumbnail: line.thumbnail.clone(),
            quantity: line.quantity.get(),
            price: line.price.to_string(),
            line_total: line.line_total().to_string(),
        }
    }
}

/// Basket display data for templates.
#[derive(Clone)]
pub struct BasketView {
    pub lines: Vec<LineView>,
    pub item_count: u32,
    pub total: String,
}

impl From<&Basket> for BasketView {
    fn from(basket: &Basket) -> Self {
        Self {
            lines: basket.items().iter().map(LineView::from).collect(),
            item_count: basket.item_count(),
            total: basket.total().to_string(),
        }
    }
}

/// Basket page template.
#[derive(Template, WebTemplate)]
#[template(path = "basket.html")]
pub struct BasketTemplate {
    pub header: PageHeader,
    pub basket: BasketView,
    pub error: Option<&'static str>,
}

/// Add to basket form data.
#[derive(Debug, Deserialize)]
pub struct AddToBasketForm {
    pub product_id: ProductId,
    pub quantity: Option<u32>,
}

/// Remove from basket form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromBasketForm {
    pub product_id: ProductId,
}

/// Display the basket page.
#[instrument(skip(state, client))]
pub async fn show(State(state): State<AppState>, Client(client): Client) -> Response {
    let mut scope = ViewScope::mount("basket", &client.notices);
    scope.spawn(basket::fetch_basket(client.store.clone(), state.api().clone()));
    let failed = !scope.settle().await.is_empty();

    let template = client.store.select(|s| BasketTemplate {
        header: PageHeader::from_state(s),
        basket: BasketView::from(s.basket.basket()),
        error: failed.then_some(LOAD_FAILED),
    });

    if failed {
        (StatusCode::BAD_GATEWAY, template).into_response()
    } else {
        template.into_response()
    }
}

/// Add a product to the basket.
///
/// Uses the product already in the store when it matches, otherwise fetches
/// it for the line snapshot.
#[instrument(skip(state, client))]
pub async fn add(
    State(state): State<AppState>,
    Client(client): Client,
    Form(form): Form<AddToBasketForm>,
) -> Result<Redirect, AppError> {
    let quantity = form_quantity(form.quantity)?;

    let cached = client
        .store
        .select(|s| s.products.current_if(form.product_id).cloned());
    let product = match cached {
        Some(product) => product,
        None => state.api().get_product(form.product_id).await?,
    };

    let product_id = product.id.to_string();
    basket::add_item_to_basket(client.store.clone(), state.api().clone(), product, quantity)
        .await?;
    add_breadcrumb(
        "basket",
        "Added to basket",
        Some(&[("product_id", product_id.as_str())]),
    );

    Ok(Redirect::to("/basket"))
}

/// Parse the submitted quantity, defaulting to one unit.
fn form_quantity(value: Option<u32>) -> Result<Quantity, AppError> {
    let value = value.unwrap_or(1);
    if value > MAX_PER_ADD {
        return Err(AppError::BadRequest(format!(
            "quantity must be at most {MAX_PER_ADD}"
        )));
    }
    Quantity::new(value).map_err(|e| AppError::BadRequest(e.to_string()))
}

/// Remove a line from the basket.
#[instrument(skip(state, client))]
pub async fn remove(
    State(state): State<AppState>,
    Client(client): Client,
    Form(form): Form<RemoveFromBasketForm>,
) -> Result<Redirect, AppError> {
    basket::remove_item_from_basket(client.store.clone(), state.api().clone(), form.product_id)
        .await?;
    Ok(Redirect::to("/basket"))
}

/// Empty the basket.
#[instrument(skip(state, client))]
pub async fn clear(State(state): State<AppState>, Client(client): Client) -> Result<Redirect, AppError> {
    basket::clear_basket(client.store.clone(), state.api().clone()).await?;
    Ok(Redirect::to("/basket"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;
    use scamazon_core::Price;

    use super::*;

    #[test]
    fn test_basket_view_totals() {
        let basket = Basket::from_items([LineItem {
            product_id: ProductId::new(1),
            title: "Kettle".to_string(),
            price: Price::new(Decimal::new(1000, 2)),
            quantity: Quantity::new(2).unwrap(),
            thumbnail: None,
        }]);
        let view = BasketView::from(&basket);
        assert_eq!(view.total, "£20.00");
        assert_eq!(view.item_count, 2);
        assert_eq!(view.lines[0].line_total, "£20.00");
        assert_eq!(view.lines[0].href, "/product/1");
    }

    #[test]
    fn test_form_quantity_limits_a_single_add() {
        assert_eq!(form_quantity(None).unwrap(), Quantity::ONE);
        assert_eq!(form_quantity(Some(MAX_PER_ADD)).unwrap().get(), MAX_PER_ADD);
        assert!(matches!(form_quantity(Some(0)), Err(AppError::BadRequest(_))));
        assert!(matches!(
            form_quantity(Some(MAX_PER_ADD + 1)),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn test_basket_view_shows_lines_above_the_add_limit() {
        let basket = Basket::from_items([LineItem {
            product_id: ProductId::new(2),
            title: "Phone".to_string(),
            price: Price::new(Decimal::new(100, 2)),
            quantity: Quantity::new(1200).unwrap(),
            thumbnail: None,
        }]);
        let view = BasketView::from(&basket);
        assert_eq!(view.item_count, 1200);
        assert_eq!(view.total, "£1200.00");
    }

    #[test]
    fn test_empty_basket_view() {
        let view = BasketView::from(&Basket::new());
        assert!(view.lines.is_empty());
        assert_eq!(view.total, "£0.00");
    }
}
