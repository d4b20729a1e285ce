//! Persisted cart storage.
//!
//! # Architecture
//!
//! - [`Slot`] is a synchronous named key/value store. Nothing else in the
//!   crate touches the storage medium directly.
//! - [`CartRepository`] owns one slot key and is the only code that reads or
//!   writes the persisted cart. Every write replaces the whole value.
//!
//! Two processes sharing one slot race last-write-wins. There is no
//! versioning field in the stored value.

mod file;
mod memory;

use std::fmt;
use std::sync::Arc;

use nissahub_core::Cart;
use thiserror::Error;
use tracing::{debug, instrument};

pub use file::FileSlot;
pub use memory::MemorySlot;

/// Default slot key for the persisted cart.
pub const DEFAULT_CART_KEY: &str = "nissahub_cart";

/// Errors that can occur when reading or writing a slot.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem access failed.
    #[error("I/O error on slot '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// The stored value is not a valid cart. Not recovered.
    #[error("corrupt value in slot '{key}': {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// Serializing the cart failed.
    #[error("failed to encode cart: {0}")]
    Encode(#[source] serde_json::Error),

    /// The key contains characters outside `[A-Za-z0-9_-]`.
    #[error("invalid slot key: {0:?}")]
    InvalidKey(String),

    /// A previous holder of the slot lock panicked.
    #[error("slot lock poisoned")]
    Poisoned,
}

/// A synchronous, named key/value storage location.
///
/// Absent keys read as `Ok(None)`. Removing an absent key succeeds.
pub trait Slot: Send + Sync + fmt::Debug {
    /// Read the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backing medium cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Replace the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backing medium cannot be written.
    fn put(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Delete the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backing medium cannot be written.
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

impl<S: Slot + ?Sized> Slot for Arc<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn put(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).put(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        (**self).remove(key)
    }
}

impl<S: Slot + ?Sized> Slot for Box<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn put(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).put(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        (**self).remove(key)
    }
}

/// Load/save gateway for the persisted cart.
#[derive(Debug, Clone)]
pub struct CartRepository<S> {
    slot: S,
    key: String,
}

impl<S: Slot> CartRepository<S> {
    /// Create a repository over `slot` using [`DEFAULT_CART_KEY`].
    pub fn new(slot: S) -> Self {
        Self::with_key(slot, DEFAULT_CART_KEY)
    }

    /// Create a repository over `slot` using a custom key.
    pub fn with_key(slot: S, key: impl Into<String>) -> Self {
        Self {
            slot,
            key: key.into(),
        }
    }

    /// The slot key this repository reads and writes.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The underlying slot.
    pub const fn slot(&self) -> &S {
        &self.slot
    }

    /// Read the persisted cart.
    ///
    /// An absent value is an empty cart. A malformed value is an error.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Corrupt` if the stored JSON is not a cart, or any
    /// error from the slot itself.
    #[instrument(skip(self), fields(key = %self.key))]
    pub fn load(&self) -> Result<Cart, StoreError> {
        let Some(raw) = self.slot.get(&self.key)? else {
            debug!("no persisted cart, starting empty");
            return Ok(Cart::new());
        };

        serde_json::from_str(&raw).map_err(|source| StoreError::Corrupt {
            key: self.key.clone(),
            source,
        })
    }

    /// Overwrite the persisted cart.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if encoding or the slot write fails.
    #[instrument(skip(self, cart), fields(key = %self.key, items = cart.len()))]
    pub fn save(&self, cart: &Cart) -> Result<(), StoreError> {
        let raw = serde_json::to_string(cart).map_err(StoreError::Encode)?;
        self.slot.put(&self.key, &raw)
    }

    /// Delete the persisted cart. The next load returns an empty cart.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the slot write fails.
    #[instrument(skip(self), fields(key = %self.key))]
    pub fn clear(&self) -> Result<(), StoreError> {
        self.slot.remove(&self.key)
    }
}

/// Check that a key is safe to use as a file stem.
pub(crate) fn validate_key(key: &str) -> Result<(), StoreError> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidKey(key.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use nissahub_core::{CartItem, Price, Product, ProductId};

    use super::*;

    fn item(id: &str, price: &str) -> CartItem {
        CartItem::from_product(Product {
            id: ProductId::new(id),
            name: format!("Item {id}"),
            price: Price::parse(price).unwrap(),
            image: "/i.png".to_string(),
        })
    }

    #[test]
    fn test_load_absent_is_empty() {
        let repo = CartRepository::new(MemorySlot::new());
        assert!(repo.load().unwrap().is_empty());
    }

    #[test]
    fn test_load_corrupt_is_error() {
        let slot = MemorySlot::new();
        slot.put(DEFAULT_CART_KEY, "{not json").unwrap();
        let repo = CartRepository::new(slot);

        let err = repo.load().unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));
    }

    #[test]
    fn test_save_then_load() {
        let repo = CartRepository::new(MemorySlot::new());
        let cart: Cart = [item("a", "1.50"), item("b", "2")].into_iter().collect();

        repo.save(&cart).unwrap();
        assert_eq!(repo.load().unwrap(), cart);
    }

    #[test]
    fn test_save_of_load_is_byte_identical() {
        let slot = Arc::new(MemorySlot::new());
        let repo = CartRepository::new(Arc::clone(&slot));
        let cart: Cart = [item("a", "19.99"), item("b", "10.00"), item("c", "0")]
            .into_iter()
            .collect();
        repo.save(&cart).unwrap();
        let first = slot.get(DEFAULT_CART_KEY).unwrap().unwrap();

        let loaded = repo.load().unwrap();
        repo.save(&loaded).unwrap();
        let second = slot.get(DEFAULT_CART_KEY).unwrap().unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_clear_removes_value() {
        let slot = Arc::new(MemorySlot::new());
        let repo = CartRepository::with_key(Arc::clone(&slot), "cart");
        repo.save(&[item("a", "1")].into_iter().collect()).unwrap();

        repo.clear().unwrap();
        assert!(slot.get("cart").unwrap().is_none());
        assert!(repo.load().unwrap().is_empty());
    }

    #[test]
    fn test_validate_key() {
        assert!(validate_key("nissahub_cart").is_ok());
        assert!(validate_key("cart-2").is_ok());
        assert!(validate_key("").is_err());
        assert!(validate_key("../etc/passwd").is_err());
        assert!(validate_key("a/b").is_err());
    }
}
