//! Product and category lookups.

use scamazon_core::ProductId;
use scamazon_storefront::store::products;

use super::{CommandResult, Shopper};

/// Show one product.
///
/// # Errors
///
/// Returns an error if the product is missing or the request fails.
pub async fn product(shopper: &Shopper, id: ProductId) -> CommandResult {
    products::fetch_single_product(shopper.store.clone(), shopper.api.clone(), id).await?;

    shopper.store.select(|s| {
        if let Some(product) = s.products.current() {
            tracing::info!("{} (#{})", product.title, product.id);
            tracing::info!("  {} | {}", product.price, product.availability_status.label());
            tracing::info!("  Rated {:.1} from {} reviews", product.rating, product.reviews.len());
            tracing::info!("  {}", product.description);
        }
    });
    Ok(())
}

/// List the products in a category.
///
/// # Errors
///
/// Returns an error if the request fails.
pub async fn category(shopper: &Shopper, name: String) -> CommandResult {
    products::fetch_products_by_category(shopper.store.clone(), shopper.api.clone(), name.clone())
        .await?;

    shopper.store.select(|s| {
        let listing = s.products.listing_for(&name).unwrap_or_default();
        tracing::info!("{} products in {}", listing.len(), name);
        for product in listing {
            tracing::info!("  #{:<5} {:<40} {}", product.id.to_string(), product.title, product.price);
        }
    });
    Ok(())
}
