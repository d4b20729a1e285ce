//! Cart commands over the file-backed cart slot.
//!
//! These open the same slot the storefront server uses, so changes made here
//! show up on the next page load.
//!
//! # Environment Variables
//!
//! - `NISSAHUB_DATA_DIR` - Directory holding the cart slot (default `.nissahub`)
//! - `NISSAHUB_CART_KEY` - Slot key (default `nissahub_cart`)

use askama::Template;
use nissahub_core::{Price, PriceError, Product, ProductId};
use nissahub_storefront::cart::{AddOutcome, CartManager, LoggingObserver};
use nissahub_storefront::config::{CartConfig, ConfigError};
use nissahub_storefront::routes::cart::CartItemsTemplate;
use nissahub_storefront::routes::checkout::CheckoutShowTemplate;
use nissahub_storefront::store::{CartRepository, FileSlot, StoreError};
use nissahub_storefront::views::{ActivePage, BadgeView, CheckoutView, ViewRefresher};
use thiserror::Error;

/// Errors that can occur during cart commands.
#[derive(Debug, Error)]
pub enum CartCommandError {
    /// Slot location is misconfigured.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Slot could not be read or written.
    #[error("Cart storage error: {0}")]
    Store(#[from] StoreError),

    /// Invalid price argument.
    #[error("Invalid price: {0}")]
    Price(#[from] PriceError),

    /// Empty product id argument.
    #[error("Product id must not be empty")]
    EmptyId,

    /// Template rendering failed.
    #[error("Render error: {0}")]
    Render(#[from] askama::Error),

    /// Checkout payload could not be built.
    #[error("Checkout payload error: {0}")]
    Payload(#[from] serde_json::Error),
}

/// Open the configured slot with a refresher bound to `page`.
fn open(page: ActivePage) -> Result<(CartManager<FileSlot>, ViewRefresher), CartCommandError> {
    let config = CartConfig::from_env()?;
    tracing::debug!(dir = %config.data_dir.display(), key = %config.key, "Opening cart slot");

    let repo = CartRepository::with_key(FileSlot::new(config.data_dir), config.key);
    let refresher = ViewRefresher::new(page);
    let manager = CartManager::new(repo)
        .with_observer(LoggingObserver)
        .with_observer(refresher.clone());
    Ok((manager, refresher))
}

/// Add a product and print the resulting button label and badge count.
///
/// # Errors
///
/// Returns an error for an empty id, an invalid price, or a slot failure.
pub fn add(id: &str, name: String, price: &str, image: String) -> Result<(), CartCommandError> {
    let id = id.trim();
    if id.is_empty() {
        return Err(CartCommandError::EmptyId);
    }
    let product = Product {
        id: ProductId::new(id),
        name,
        price: Price::parse(price)?,
        image,
    };

    let (manager, refresher) = open(ActivePage::Product(product.id.clone()))?;
    refresher.render_all(&manager.load()?);
    let outcome = manager.add_item(product)?;

    let views = refresher.snapshot();
    if outcome == AddOutcome::AlreadyInCart {
        print_line("Already in cart");
    }
    if let Some(button) = views.add_button {
        print_line(button.label);
    }
    if let Some(badge) = views.badge {
        print_line(&format!("Cart: {}", badge.count));
    }
    Ok(())
}

/// Remove a product by id. Removing an absent id is not an error.
///
/// # Errors
///
/// Returns an error if the slot cannot be read or written.
pub fn remove(id: &str) -> Result<(), CartCommandError> {
    let (manager, _) = open(ActivePage::Cart)?;
    let cart = manager.remove_item(&ProductId::new(id))?;
    print_line(&format!("Cart: {}", cart.item_count()));
    Ok(())
}

/// Print each item and the totals.
///
/// # Errors
///
/// Returns an error if the slot cannot be read.
pub fn list() -> Result<(), CartCommandError> {
    let (manager, _) = open(ActivePage::Other)?;
    let cart = manager.load()?;
    if cart.is_empty() {
        print_line("Your cart is empty.");
        return Ok(());
    }
    for item in &cart {
        print_line(&format!("{}\t{}\t{}", item.id, item.name, item.price));
    }
    print_line(&format!("Subtotal\t{}", cart.subtotal()));
    print_line(&format!("Total\t{}", cart.total()));
    Ok(())
}

/// Print the badge count.
///
/// # Errors
///
/// Returns an error if the slot cannot be read.
pub fn count() -> Result<(), CartCommandError> {
    let (manager, _) = open(ActivePage::Other)?;
    let badge = manager.badge()?;
    print_line(&badge.count.to_string());
    Ok(())
}

/// Empty the cart.
///
/// # Errors
///
/// Returns an error if the slot cannot be cleared.
pub fn clear() -> Result<(), CartCommandError> {
    let (manager, _) = open(ActivePage::Other)?;
    manager.clear_for_checkout()?;
    print_line("Cart cleared");
    Ok(())
}

/// Print the cart items fragment.
///
/// # Errors
///
/// Returns an error if the slot cannot be read or the template fails.
pub fn render_cart() -> Result<(), CartCommandError> {
    let (manager, refresher) = open(ActivePage::Cart)?;
    refresher.render_all(&manager.load()?);
    if let Some(page) = refresher.snapshot().cart_page {
        print_line(&CartItemsTemplate { page }.render()?);
    }
    Ok(())
}

/// Print the full checkout page.
///
/// # Errors
///
/// Returns an error if the slot cannot be read or the template fails.
pub fn render_checkout() -> Result<(), CartCommandError> {
    let (manager, _) = open(ActivePage::Checkout)?;
    let cart = manager.load()?;
    let html = CheckoutShowTemplate {
        checkout: CheckoutView::new(&cart)?,
        badge: BadgeView::from(&cart),
    }
    .render()?;
    print_line(&html);
    Ok(())
}

#[allow(clippy::print_stdout)]
fn print_line(line: &str) {
    println!("{line}");
}
