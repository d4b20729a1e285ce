//! Integration tests for NissaHub.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p nissahub-integration-tests
//! ```
//!
//! The storefront router is driven in-process with `tower::ServiceExt`, so no
//! server or network is needed. Order submission points at a closed local
//! port and fails in the background, which the cart ignores.

use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use nissahub_storefront::{
    cart::CartManager,
    config::ApiConfig,
    routes,
    services::MarketplaceClient,
    state::{AppState, DynSlot},
    store::{CartRepository, DEFAULT_CART_KEY, MemorySlot, Slot},
};
use tower::ServiceExt;

/// Marketplace base URL nothing listens on.
pub const UNREACHABLE_API: &str = "http://127.0.0.1:9";

/// An in-process storefront over a slot the test can inspect.
pub struct TestApp<S> {
    pub router: Router,
    pub slot: Arc<S>,
}

/// A response read to completion.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub hx_trigger: Option<String>,
    pub location: Option<String>,
    pub request_id: Option<String>,
    pub body: String,
}

impl TestApp<MemorySlot> {
    /// Storefront over an empty in-memory slot.
    ///
    /// # Panics
    ///
    /// Panics if the marketplace client cannot be built.
    #[must_use]
    pub fn new() -> Self {
        Self::with_slot(Arc::new(MemorySlot::new()))
    }
}

impl<S: Slot + 'static> TestApp<S> {
    /// Storefront over the given slot.
    ///
    /// # Panics
    ///
    /// Panics if the marketplace client cannot be built.
    #[must_use]
    pub fn with_slot(slot: Arc<S>) -> Self {
        let dyn_slot: DynSlot = Box::new(Arc::clone(&slot));
        let cart = CartManager::new(CartRepository::new(dyn_slot));
        let api = ApiConfig::from_base(UNREACHABLE_API).expect("valid base URL");
        let marketplace = MarketplaceClient::new(&api).expect("HTTP client");
        Self {
            router: routes::app(AppState::new(cart, marketplace)),
            slot,
        }
    }

    /// Raw persisted cart JSON, if any.
    ///
    /// # Panics
    ///
    /// Panics if the slot cannot be read.
    #[must_use]
    pub fn stored(&self) -> Option<String> {
        self.slot.get(DEFAULT_CART_KEY).expect("slot read")
    }

    /// Send a GET request.
    pub async fn get(&self, uri: &str) -> TestResponse {
        self.send(Request::get(uri).body(Body::empty())).await
    }

    /// Send a form-encoded POST request.
    pub async fn post_form(&self, uri: &str, pairs: &[(&str, &str)]) -> TestResponse {
        let body = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(pairs)
            .finish();
        self.send(
            Request::post(uri)
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(body)),
        )
        .await
    }

    /// Add a product through the HTTP surface.
    pub async fn add(&self, id: &str, name: &str, price: &str) -> TestResponse {
        self.post_form(
            "/cart/add",
            &[("id", id), ("name", name), ("price", price), ("image", "/i.png")],
        )
        .await
    }

    async fn send(&self, request: Result<Request<Body>, axum::http::Error>) -> TestResponse {
        let request = request.expect("valid request");
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("infallible router");

        let status = response.status();
        let header_str = |name: &str| {
            response
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(String::from)
        };
        let hx_trigger = header_str("hx-trigger");
        let location = header_str("location");
        let request_id = header_str("x-request-id");
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("readable body");

        TestResponse {
            status,
            hx_trigger,
            location,
            request_id,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }
}

impl Default for TestApp<MemorySlot> {
    fn default() -> Self {
        Self::new()
    }
}
