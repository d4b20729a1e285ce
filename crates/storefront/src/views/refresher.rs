//! Observer that redraws the views affected by each cart change.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use nissahub_core::{Cart, ProductId};
use tracing::warn;

use super::{AddButtonView, BadgeView, CartPageView, CheckoutView};
use crate::cart::{CartChange, CartEvent, CartObserver};

/// The page currently on screen, besides the header badge which is on every
/// page.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ActivePage {
    #[default]
    Other,
    /// A product page with an add button bound to this id.
    Product(ProductId),
    Cart,
    Checkout,
}

/// The most recently rendered views.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedViews {
    pub badge: Option<BadgeView>,
    pub add_button: Option<AddButtonView>,
    pub cart_page: Option<CartPageView>,
    pub checkout: Option<CheckoutView>,
}

/// Keeps [`RenderedViews`] consistent with the persisted cart.
///
/// Refresh rules:
/// - added: badge, and the add button if a product page is active
/// - removed: badge, and the cart page if it is active
/// - cleared: badge, and whichever page is active
///
/// Cheap to clone; clones share the same rendered state.
#[derive(Debug, Clone)]
pub struct ViewRefresher {
    inner: Arc<RefresherInner>,
}

#[derive(Debug)]
struct RefresherInner {
    page: ActivePage,
    views: Mutex<RenderedViews>,
}

impl ViewRefresher {
    #[must_use]
    pub fn new(page: ActivePage) -> Self {
        Self {
            inner: Arc::new(RefresherInner {
                page,
                views: Mutex::new(RenderedViews::default()),
            }),
        }
    }

    #[must_use]
    pub fn page(&self) -> &ActivePage {
        &self.inner.page
    }

    /// Render the badge and the active page from scratch, as on page load.
    pub fn render_all(&self, cart: &Cart) {
        let mut views = self.lock();
        views.badge = Some(BadgeView::from(cart));
        self.render_page(&mut views, cart);
    }

    /// Snapshot of the latest rendered views.
    #[must_use]
    pub fn snapshot(&self) -> RenderedViews {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, RenderedViews> {
        self.inner
            .views
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn render_page(&self, views: &mut RenderedViews, cart: &Cart) {
        match &self.inner.page {
            ActivePage::Other => {}
            ActivePage::Product(id) => {
                views.add_button = Some(AddButtonView::new(id.clone(), cart));
            }
            ActivePage::Cart => views.cart_page = Some(CartPageView::from(cart)),
            ActivePage::Checkout => match CheckoutView::new(cart) {
                Ok(view) => views.checkout = Some(view),
                Err(e) => warn!("Failed to render checkout summary: {e}"),
            },
        }
    }
}

impl CartObserver for ViewRefresher {
    fn cart_changed(&self, change: &CartChange<'_>) {
        let mut views = self.lock();
        views.badge = Some(BadgeView::from(change.cart));

        match (change.event, &self.inner.page) {
            (CartEvent::Added(_), ActivePage::Product(_))
            | (CartEvent::Removed(_), ActivePage::Cart)
            | (CartEvent::Cleared, _) => self.render_page(&mut views, change.cart),
            _ => {}
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use nissahub_core::{Price, Product};

    use super::*;
    use crate::cart::CartManager;
    use crate::store::{CartRepository, MemorySlot};
    use crate::views::{ADD_LABEL, ADDED_LABEL};

    fn product(id: &str, price: &str) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            price: Price::parse(price).unwrap(),
            image: "/i.png".to_string(),
        }
    }

    fn manager_on(page: ActivePage) -> (CartManager<MemorySlot>, ViewRefresher) {
        let refresher = ViewRefresher::new(page);
        let manager =
            CartManager::new(CartRepository::new(MemorySlot::new())).with_observer(refresher.clone());
        refresher.render_all(&manager.load().unwrap());
        (manager, refresher)
    }

    #[test]
    fn test_product_page_add_refreshes_badge_and_button() {
        let (manager, refresher) = manager_on(ActivePage::Product(ProductId::new("p1")));
        assert_eq!(refresher.snapshot().add_button.unwrap().label, ADD_LABEL);

        manager.add_item(product("p1", "19.99")).unwrap();

        let views = refresher.snapshot();
        assert_eq!(views.badge.unwrap().count, 1);
        let button = views.add_button.unwrap();
        assert!(button.disabled);
        assert_eq!(button.label, ADDED_LABEL);
    }

    #[test]
    fn test_cart_page_remove_rerenders_page() {
        let (manager, refresher) = manager_on(ActivePage::Cart);
        manager.add_item(product("p1", "10.00")).unwrap();
        manager.add_item(product("p2", "15.50")).unwrap();
        // Adds do not redraw the cart page
        assert!(refresher.snapshot().cart_page.unwrap().is_empty());

        manager.remove_item(&ProductId::new("p1")).unwrap();

        let page = refresher.snapshot().cart_page.unwrap();
        assert_eq!(page.rows().len(), 1);
        assert_eq!(page.subtotal(), "15.50 MAD");
        assert_eq!(refresher.snapshot().badge.unwrap().count, 1);
    }

    #[test]
    fn test_other_page_only_updates_badge() {
        let (manager, refresher) = manager_on(ActivePage::Other);
        manager.add_item(product("p1", "1")).unwrap();

        let views = refresher.snapshot();
        assert!(views.badge.unwrap().has_items);
        assert!(views.add_button.is_none());
        assert!(views.cart_page.is_none());
        assert!(views.checkout.is_none());
    }

    #[test]
    fn test_clear_rerenders_checkout() {
        let (manager, refresher) = manager_on(ActivePage::Checkout);
        manager.add_item(product("p1", "1")).unwrap();
        refresher.render_all(&manager.load().unwrap());
        assert!(refresher.snapshot().checkout.unwrap().confirm_enabled);

        manager.clear_for_checkout().unwrap();

        let views = refresher.snapshot();
        assert!(!views.checkout.unwrap().confirm_enabled);
        assert!(!views.badge.unwrap().has_items);
    }
}
