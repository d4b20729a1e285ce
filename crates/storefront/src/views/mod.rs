//! View models derived from the cart.
//!
//! Every view is recomputed from a whole [`Cart`]; none is patched
//! incrementally. Templates in `routes` render these models, and the
//! [`ViewRefresher`] observer keeps the latest set in sync with cart changes.

mod refresher;

use nissahub_core::{Cart, CartItem, Price, ProductId};

pub use refresher::{ActivePage, RenderedViews, ViewRefresher};

/// Label of the add button when the product is not in the cart.
pub const ADD_LABEL: &str = "Add to Cart";
/// Label of the add button once the product is in the cart.
pub const ADDED_LABEL: &str = "✓ Added to Cart";
/// Message shown on the checkout page for an empty cart.
pub const EMPTY_CHECKOUT_MESSAGE: &str = "Your cart is empty. Please add items before checking out.";

/// Header cart counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BadgeView {
    /// Sum of quantities.
    pub count: u32,
    /// Drives the `has-items` CSS class. True exactly when `count > 0`.
    pub has_items: bool,
}

impl From<&Cart> for BadgeView {
    fn from(cart: &Cart) -> Self {
        let count = cart.item_count();
        Self {
            count,
            has_items: count > 0,
        }
    }
}

/// State of the "Add to Cart" button on a product page.
///
/// Advisory only. [`crate::cart::CartManager::add_item`] is what actually
/// prevents duplicates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddButtonView {
    pub product_id: ProductId,
    pub disabled: bool,
    pub label: &'static str,
}

impl AddButtonView {
    #[must_use]
    pub fn new(product_id: ProductId, cart: &Cart) -> Self {
        let in_cart = cart.contains(&product_id);
        Self {
            product_id,
            disabled: in_cart,
            label: if in_cart { ADDED_LABEL } else { ADD_LABEL },
        }
    }
}

/// One row of the cart page table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartRowView {
    pub id: String,
    pub name: String,
    pub image: String,
    pub price: String,
    /// Product detail link, `/product/{id}`.
    pub url: String,
}

impl From<&CartItem> for CartRowView {
    fn from(item: &CartItem) -> Self {
        Self {
            id: item.id.to_string(),
            name: item.name.clone(),
            image: item.image.clone(),
            price: item.price.to_string(),
            url: format!("/product/{}", item.id),
        }
    }
}

/// Full cart page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartPageView {
    /// Show the empty-state panel, hide the itemized layout.
    Empty,
    /// Show the itemized layout.
    Items {
        rows: Vec<CartRowView>,
        subtotal: String,
        total: String,
    },
}

impl CartPageView {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    #[must_use]
    pub fn rows(&self) -> &[CartRowView] {
        match self {
            Self::Empty => &[],
            Self::Items { rows, .. } => rows,
        }
    }

    /// Formatted subtotal, `"0.00 MAD"` when empty.
    #[must_use]
    pub fn subtotal(&self) -> String {
        match self {
            Self::Empty => Price::ZERO.to_string(),
            Self::Items { subtotal, .. } => subtotal.clone(),
        }
    }

    /// Formatted total, `"0.00 MAD"` when empty.
    #[must_use]
    pub fn total(&self) -> String {
        match self {
            Self::Empty => Price::ZERO.to_string(),
            Self::Items { total, .. } => total.clone(),
        }
    }
}

impl From<&Cart> for CartPageView {
    fn from(cart: &Cart) -> Self {
        if cart.is_empty() {
            return Self::Empty;
        }
        Self::Items {
            rows: cart.iter().map(CartRowView::from).collect(),
            subtotal: cart.subtotal().to_string(),
            total: cart.total().to_string(),
        }
    }
}

/// One line of the checkout summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutLineView {
    pub name: String,
    pub price: String,
}

/// Checkout summary page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutView {
    pub items: Vec<CheckoutLineView>,
    pub subtotal: String,
    pub total: String,
    /// Whether the confirm-purchase control is enabled.
    pub confirm_enabled: bool,
    /// JSON of the full cart for the hidden `cart_data` form field. Empty
    /// when the cart is empty.
    pub cart_payload: String,
    pub empty_message: Option<&'static str>,
}

impl CheckoutView {
    /// Build the checkout summary.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be serialized for the form payload.
    pub fn new(cart: &Cart) -> Result<Self, serde_json::Error> {
        if cart.is_empty() {
            return Ok(Self {
                items: Vec::new(),
                subtotal: Price::ZERO.to_string(),
                total: Price::ZERO.to_string(),
                confirm_enabled: false,
                cart_payload: String::new(),
                empty_message: Some(EMPTY_CHECKOUT_MESSAGE),
            });
        }

        Ok(Self {
            items: cart
                .iter()
                .map(|item| CheckoutLineView {
                    name: item.name.clone(),
                    price: item.price.to_string(),
                })
                .collect(),
            subtotal: cart.subtotal().to_string(),
            total: cart.total().to_string(),
            confirm_enabled: true,
            cart_payload: serde_json::to_string(cart)?,
            empty_message: None,
        })
    }
}
