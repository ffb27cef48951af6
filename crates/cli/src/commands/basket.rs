//! Basket commands.

use scamazon_core::{ProductId, Quantity};
use scamazon_storefront::store::basket;

use super::{CommandResult, Shopper};

fn log_basket(shopper: &Shopper) {
    shopper.store.select(|s| {
        let basket = s.basket.basket();
        if basket.is_empty() {
            tracing::info!("Basket is empty");
            return;
        }
        for line in basket.items() {
            tracing::info!(
                "  #{:<5} {:<40} x{:<3} {}",
                line.product_id.to_string(),
                line.title,
                line.quantity.get(),
                line.line_total()
            );
        }
        tracing::info!("Subtotal ({} items): {}", basket.item_count(), basket.total());
    });
}

async fn fetch(shopper: &Shopper) -> CommandResult {
    basket::fetch_basket(shopper.store.clone(), shopper.api.clone()).await?;
    Ok(())
}

/// Show the basket.
///
/// # Errors
///
/// Returns an error if the request fails.
pub async fn show(shopper: &Shopper) -> CommandResult {
    fetch(shopper).await?;
    log_basket(shopper);
    Ok(())
}

/// Add `quantity` of a product.
///
/// # Errors
///
/// Returns an error if the quantity is out of range, the product is missing,
/// or a request fails.
pub async fn add(shopper: &Shopper, id: ProductId, quantity: u32) -> CommandResult {
    let quantity = Quantity::new(quantity)?;
    let product = shopper.api.get_product(id).await?;
    basket::add_item_to_basket(shopper.store.clone(), shopper.api.clone(), product, quantity)
        .await?;
    log_basket(shopper);
    Ok(())
}

/// Remove a product's line.
///
/// # Errors
///
/// Returns an error if a request fails.
pub async fn remove(shopper: &Shopper, id: ProductId) -> CommandResult {
    // Removal only reaches the backend for lines the store holds
    fetch(shopper).await?;
    if !shopper.store.select(|s| s.basket.basket().contains(id)) {
        tracing::warn!("Product {} is not in the basket", id);
    }
    basket::remove_item_from_basket(shopper.store.clone(), shopper.api.clone(), id).await?;
    log_basket(shopper);
    Ok(())
}

/// Empty the basket.
///
/// # Errors
///
/// Returns an error if the request fails.
pub async fn clear(shopper: &Shopper) -> CommandResult {
    basket::clear_basket(shopper.store.clone(), shopper.api.clone()).await?;
    tracing::info!("Basket cleared");
    Ok(())
}
