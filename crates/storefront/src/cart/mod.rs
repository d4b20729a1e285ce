//! Cart state manager.
//!
//! Owns the persisted cart and keeps every on-screen representation of it
//! consistent with the stored value.
//!
//! # Consistency
//!
//! Each operation re-reads the slot, applies its change, and writes the whole
//! cart back before notifying observers (write-through). No copy of the cart
//! is cached between operations, so the stored value is the only source of
//! truth.
//!
//! # Lifecycle
//!
//! ```text
//! Uninitialized --load--> Loaded(cart)
//! Loaded(cart) --add--> Loaded(cart')
//! Loaded(cart) --remove--> Loaded(cart'')
//! Loaded(cart) --checkout submit--> Loaded(empty)
//! ```

mod observer;

use nissahub_core::{Cart, CartItem, Product, ProductId};
use tracing::{debug, instrument};

use crate::store::{CartRepository, Slot, StoreError};
use crate::views::{AddButtonView, BadgeView};

pub use observer::{CartChange, CartEvent, CartObserver, LoggingObserver};

/// Result of [`CartManager::add_item`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// The item was appended and persisted.
    Added,
    /// An item with the same id was already present. Nothing changed.
    AlreadyInCart,
}

/// Single entry point for reading and mutating the cart.
pub struct CartManager<S> {
    repo: CartRepository<S>,
    observers: Vec<Box<dyn CartObserver>>,
}

impl<S: Slot> CartManager<S> {
    /// Create a manager with no observers.
    pub const fn new(repo: CartRepository<S>) -> Self {
        Self {
            repo,
            observers: Vec::new(),
        }
    }

    /// Subscribe an observer to cart changes.
    pub fn subscribe(&mut self, observer: impl CartObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Builder-style [`subscribe`](Self::subscribe).
    #[must_use]
    pub fn with_observer(mut self, observer: impl CartObserver + 'static) -> Self {
        self.subscribe(observer);
        self
    }

    pub const fn repository(&self) -> &CartRepository<S> {
        &self.repo
    }

    /// Read the current cart.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the slot cannot be read or holds a corrupt value.
    pub fn load(&self) -> Result<Cart, StoreError> {
        self.repo.load()
    }

    /// Overwrite the cart.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the slot write fails.
    pub fn save(&self, cart: &Cart) -> Result<(), StoreError> {
        self.repo.save(cart)
    }

    /// Add a product with quantity 1.
    ///
    /// Adding a product that is already in the cart is a silent no-op: no
    /// write, no notification.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the slot cannot be read or written.
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub fn add_item(&self, product: Product) -> Result<AddOutcome, StoreError> {
        let mut cart = self.repo.load()?;
        let id = product.id.clone();

        if !cart.insert(CartItem::from_product(product)) {
            debug!("already in cart");
            return Ok(AddOutcome::AlreadyInCart);
        }

        self.repo.save(&cart)?;
        self.notify(&CartEvent::Added(id), &cart);
        Ok(AddOutcome::Added)
    }

    /// Remove the item with this id.
    ///
    /// Idempotent: the cart is saved and observers notified even when no item
    /// matched.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the slot cannot be read or written.
    #[instrument(skip(self))]
    pub fn remove_item(&self, id: &ProductId) -> Result<Cart, StoreError> {
        let mut cart = self.repo.load()?;
        if !cart.remove(id) {
            debug!("not in cart");
        }

        self.repo.save(&cart)?;
        self.notify(&CartEvent::Removed(id.clone()), &cart);
        Ok(cart)
    }

    /// Drop the persisted cart when the checkout form is submitted.
    ///
    /// This runs before the order endpoint has answered. If the order then
    /// fails, the shopper's selections are gone.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the slot write fails.
    #[instrument(skip(self))]
    pub fn clear_for_checkout(&self) -> Result<(), StoreError> {
        self.repo.clear()?;
        self.notify(&CartEvent::Cleared, &Cart::new());
        Ok(())
    }

    /// Header badge state for the current cart.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the slot cannot be read.
    pub fn badge(&self) -> Result<BadgeView, StoreError> {
        Ok(BadgeView::from(&self.repo.load()?))
    }

    /// "Add to cart" button state for a product page.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the slot cannot be read.
    pub fn add_button(&self, id: &ProductId) -> Result<AddButtonView, StoreError> {
        Ok(AddButtonView::new(id.clone(), &self.repo.load()?))
    }

    fn notify(&self, event: &CartEvent, cart: &Cart) {
        let change = CartChange { event, cart };
        for observer in &self.observers {
            observer.cart_changed(&change);
        }
    }
}

impl<S: std::fmt::Debug> std::fmt::Debug for CartManager<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartManager")
            .field("repo", &self.repo)
            .field("observers", &self.observers.len())
            .finish()
    }
}
