//! Cart change notifications.
//!
//! Mutations never decide which views to redraw. They publish a
//! [`CartChange`] and each subscribed [`CartObserver`] reacts to it.

use nissahub_core::{Cart, ProductId};
use tracing::info;

/// What happened to the cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartEvent {
    /// A new item was appended.
    Added(ProductId),
    /// A remove was requested for this id. Published whether or not the id
    /// was present, since the cart is re-saved either way.
    Removed(ProductId),
    /// The persisted cart was dropped after checkout submission.
    Cleared,
}

/// A change notification with the cart as persisted after the change.
#[derive(Debug, Clone, Copy)]
pub struct CartChange<'a> {
    pub event: &'a CartEvent,
    pub cart: &'a Cart,
}

/// Subscriber to cart changes.
pub trait CartObserver: Send + Sync {
    fn cart_changed(&self, change: &CartChange<'_>);
}

impl<F> CartObserver for F
where
    F: Fn(&CartChange<'_>) + Send + Sync,
{
    fn cart_changed(&self, change: &CartChange<'_>) {
        self(change);
    }
}

/// Observer that records every change as a structured log event.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingObserver;

impl CartObserver for LoggingObserver {
    fn cart_changed(&self, change: &CartChange<'_>) {
        let items = change.cart.item_count();
        match change.event {
            CartEvent::Added(id) => info!(product_id = %id, items, "cart item added"),
            CartEvent::Removed(id) => info!(product_id = %id, items, "cart item removed"),
            CartEvent::Cleared => info!(items, "cart cleared for checkout"),
        }
    }
}
