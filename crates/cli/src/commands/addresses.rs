//! Address book commands. All need a signed-in [`Shopper`].

use scamazon_core::AddressId;
use scamazon_storefront::store::addresses;

use super::{CommandResult, Shopper};

fn log_addresses(shopper: &Shopper) {
    shopper.store.select(|s| {
        let book = s.addresses.book();
        if book.is_empty() {
            tracing::info!("No saved addresses");
        }
        for address in book.addresses() {
            let marker = if address.is_default { " (default)" } else { "" };
            let details = &address.details;
            tracing::info!(
                "  #{:<4} {}, {}, {} {}{}",
                address.address_id.to_string(),
                details.full_name,
                details.address_line1,
                details.city,
                details.postcode,
                marker
            );
        }
    });
}

/// List saved addresses.
///
/// # Errors
///
/// Returns an error if the request fails.
pub async fn list(shopper: &Shopper) -> CommandResult {
    addresses::fetch_addresses(shopper.store.clone(), shopper.api.clone()).await?;
    log_addresses(shopper);
    Ok(())
}

/// Make an address the default.
///
/// # Errors
///
/// Returns an error if the request fails.
pub async fn set_default(shopper: &Shopper, id: AddressId) -> CommandResult {
    addresses::set_default_address(shopper.store.clone(), shopper.api.clone(), id).await?;
    tracing::info!("Default address changed");
    log_addresses(shopper);
    Ok(())
}

/// Delete an address.
///
/// # Errors
///
/// Returns an error if the request fails.
pub async fn delete(shopper: &Shopper, id: AddressId) -> CommandResult {
    addresses::fetch_addresses(shopper.store.clone(), shopper.api.clone()).await?;
    addresses::delete_address(shopper.store.clone(), shopper.api.clone(), id).await?;
    tracing::info!("Address {} deleted", id);
    log_addresses(shopper);
    Ok(())
}
