//! Integration tests for the cart HTMX endpoints.
//!
//! Each test drives the full router over an in-memory slot and checks both
//! the rendered fragment and the persisted JSON.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use nissahub_integration_tests::TestApp;

// =============================================================================
// Add
// =============================================================================

#[tokio::test]
async fn test_add_persists_item_and_triggers_refresh() {
    let app = TestApp::new();

    let response = app.add("p1", "Widget", "19.99").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.hx_trigger.as_deref(), Some("cart-updated"));
    assert!(response.body.contains("✓ Added to Cart"));
    assert!(response.body.contains("disabled"));
    assert_eq!(
        app.stored().unwrap(),
        r#"[{"id":"p1","name":"Widget","price":19.99,"image":"/i.png","quantity":1}]"#
    );
}

#[tokio::test]
async fn test_add_existing_item_is_a_no_op() {
    let app = TestApp::new();
    app.add("p1", "Widget", "19.99").await;
    let before = app.stored();

    let response = app.add("p1", "Widget again", "5").await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.hx_trigger.is_none());
    assert!(response.body.contains("✓ Added to Cart"));
    assert_eq!(app.stored(), before);
}

#[tokio::test]
async fn test_add_rejects_invalid_input() {
    let app = TestApp::new();

    assert_eq!(app.add("", "Widget", "1").await.status, StatusCode::BAD_REQUEST);
    assert_eq!(app.add("p1", "Widget", "abc").await.status, StatusCode::BAD_REQUEST);
    assert_eq!(app.add("p1", "Widget", "-1").await.status, StatusCode::BAD_REQUEST);
    assert!(app.stored().is_none());
}

#[tokio::test]
async fn test_add_rejects_prices_the_slot_cannot_hold() {
    let app = TestApp::new();

    for price in ["79228162514264337593543950335", "1000000000000.01", "19.999"] {
        let response = app.add("p1", "Big", price).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{price}");
    }
    assert!(app.stored().is_none());

    assert_eq!(app.get("/cart").await.status, StatusCode::OK);
}

#[tokio::test]
async fn test_cart_with_max_prices_renders_totals() {
    let app = TestApp::new();
    app.add("p1", "Big", "1000000000000").await;
    app.add("p2", "Bigger", "1000000000000").await;

    let page = app.get("/cart").await;

    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("2000000000000.00 MAD"));
    assert_eq!(app.get("/checkout").await.status, StatusCode::OK);
}

// =============================================================================
// Badge and button
// =============================================================================

#[tokio::test]
async fn test_count_tracks_item_count() {
    let app = TestApp::new();

    let empty = app.get("/cart/count").await;
    assert!(empty.body.contains(">0<"));
    assert!(!empty.body.contains("has-items"));

    app.add("p1", "Widget", "19.99").await;
    app.add("p2", "Gadget", "5.51").await;

    let badge = app.get("/cart/count").await;
    assert!(badge.body.contains(">2<"));
    assert!(badge.body.contains("has-items"));
}

#[tokio::test]
async fn test_button_reflects_membership() {
    let app = TestApp::new();

    let before = app.get("/cart/button/p1").await;
    assert!(before.body.contains("Add to Cart"));
    assert!(!before.body.contains("disabled"));

    app.add("p1", "Widget", "19.99").await;

    let after = app.get("/cart/button/p1").await;
    assert!(after.body.contains("✓ Added to Cart"));
    let other = app.get("/cart/button/p2").await;
    assert!(!other.body.contains("disabled"));
}

// =============================================================================
// Cart page and remove
// =============================================================================

#[tokio::test]
async fn test_cart_page_lists_items_and_totals() {
    let app = TestApp::new();
    app.add("p1", "Widget", "19.99").await;
    app.add("p2", "Gadget", "5.51").await;

    let page = app.get("/cart").await;

    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("Widget"));
    assert!(page.body.contains("Gadget"));
    assert!(page.body.contains("25.50 MAD"));
}

#[tokio::test]
async fn test_empty_cart_page() {
    let app = TestApp::new();

    let page = app.get("/cart").await;

    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("empty-cart-message"));
}

#[tokio::test]
async fn test_remove_preserves_order_of_remaining_items() {
    let app = TestApp::new();
    app.add("p1", "Widget", "19.99").await;
    app.add("p2", "Gadget", "5.51").await;
    app.add("p3", "Gizmo", "1").await;

    let response = app.post_form("/cart/remove", &[("product_id", "p2")]).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.hx_trigger.as_deref(), Some("cart-updated"));
    assert!(!response.body.contains("Gadget"));

    let stored: serde_json::Value = serde_json::from_str(&app.stored().unwrap()).unwrap();
    let ids: Vec<&str> = stored
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, ["p1", "p3"]);
}

#[tokio::test]
async fn test_remove_last_item_renders_empty_cart() {
    let app = TestApp::new();
    app.add("p1", "Widget", "19.99").await;

    let response = app.post_form("/cart/remove", &[("product_id", "p1")]).await;

    assert!(response.body.contains("empty-cart-message"));
    assert_eq!(app.stored().as_deref(), Some("[]"));
}

#[tokio::test]
async fn test_remove_absent_item_still_refreshes() {
    let app = TestApp::new();
    app.add("p1", "Widget", "19.99").await;

    let response = app.post_form("/cart/remove", &[("product_id", "zz")]).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.hx_trigger.as_deref(), Some("cart-updated"));
    assert!(response.body.contains("Widget"));
}

// =============================================================================
// Misc
// =============================================================================

#[tokio::test]
async fn test_health_and_request_id() {
    let app = TestApp::new();

    let response = app.get("/health").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, "ok");
    assert!(response.request_id.is_some_and(|id| !id.is_empty()));
}

#[tokio::test]
async fn test_corrupt_slot_is_a_server_error() {
    use nissahub_storefront::store::{DEFAULT_CART_KEY, Slot};

    let app = TestApp::new();
    app.slot.put(DEFAULT_CART_KEY, "{not json").unwrap();

    let response = app.get("/cart").await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.body, "Internal server error");
}
