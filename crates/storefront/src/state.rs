//! Application state shared across handlers.

use std::sync::{Arc, Mutex};

use crate::cart::{CartManager, LoggingObserver};
use crate::config::StorefrontConfig;
use crate::error::AppError;
use crate::services::{ApiError, MarketplaceClient};
use crate::store::{CartRepository, FileSlot, Slot, StoreError};

/// Slot type used by the running server.
pub type DynSlot = Box<dyn Slot>;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// the cart manager and the marketplace client.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Held for the whole load/modify/save sequence of one operation, so
    /// requests in this process never interleave on the slot.
    cart: Mutex<CartManager<DynSlot>>,
    marketplace: MarketplaceClient,
}

impl AppState {
    /// Create application state from parts.
    #[must_use]
    pub fn new(cart: CartManager<DynSlot>, marketplace: MarketplaceClient) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                cart: Mutex::new(cart),
                marketplace,
            }),
        }
    }

    /// Create application state with a file-backed cart slot.
    ///
    /// # Errors
    ///
    /// Returns an error if the marketplace HTTP client cannot be built.
    pub fn from_config(config: &StorefrontConfig) -> Result<Self, ApiError> {
        let slot: DynSlot = Box::new(FileSlot::new(&config.cart.data_dir));
        let repo = CartRepository::with_key(slot, config.cart.key.clone());
        let cart = CartManager::new(repo).with_observer(LoggingObserver);
        let marketplace = MarketplaceClient::new(&config.api)?;
        Ok(Self::new(cart, marketplace))
    }

    /// Run a cart operation under the cart lock.
    ///
    /// The slot may do blocking file I/O, so the lock is taken and the
    /// operation run on the blocking thread pool.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Store` if the operation fails, or
    /// `AppError::Internal` if the lock is poisoned or the task panics.
    pub async fn with_cart<T, F>(&self, op: F) -> Result<T, AppError>
    where
        T: Send + 'static,
        F: FnOnce(&CartManager<DynSlot>) -> Result<T, StoreError> + Send + 'static,
    {
        let inner = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || {
            let manager = inner
                .cart
                .lock()
                .map_err(|_| AppError::Internal("cart lock poisoned".to_string()))?;
            Ok(op(&manager)?)
        })
        .await
        .map_err(|e| AppError::Internal(format!("cart task failed: {e}")))?
    }

    /// Get a reference to the marketplace API client.
    #[must_use]
    pub fn marketplace(&self) -> &MarketplaceClient {
        &self.inner.marketplace
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use nissahub_core::{Price, Product, ProductId};

    use super::*;
    use crate::config::ApiConfig;
    use crate::store::MemorySlot;

    fn state() -> AppState {
        let slot: DynSlot = Box::new(MemorySlot::new());
        let api = ApiConfig::from_base("http://127.0.0.1:9").unwrap();
        AppState::new(
            CartManager::new(CartRepository::new(slot)),
            MarketplaceClient::new(&api).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_with_cart_runs_off_the_async_worker() {
        let state = state();
        let product = Product {
            id: ProductId::new("p1"),
            name: "Widget".to_string(),
            price: Price::parse("19.99").unwrap(),
            image: "/i.png".to_string(),
        };

        state.with_cart(move |manager| manager.add_item(product)).await.unwrap();
        let cart = state.with_cart(|manager| manager.load()).await.unwrap();
        assert_eq!(cart.len(), 1);
    }

    #[tokio::test]
    async fn test_with_cart_reports_panics_as_internal() {
        let state = state();

        let result: Result<(), AppError> = state
            .with_cart(|_| -> Result<(), StoreError> { panic!("slot exploded") })
            .await;
        assert!(matches!(result, Err(AppError::Internal(_))));

        let result: Result<(), AppError> = state.with_cart(|_| Ok(())).await;
        assert!(matches!(result, Err(AppError::Internal(_))));
    }
}
