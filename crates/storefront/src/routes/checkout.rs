//! Checkout route handlers.
//!
//! The checkout page embeds the whole cart as JSON in a hidden `cart_data`
//! field. Submitting the form clears the persisted cart right away and
//! forwards the payload to the marketplace order endpoint in the background.
//! The clear is not undone if the order later fails.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect},
};
use serde::Deserialize;
use tracing::{Instrument, info_span, instrument, warn};

use nissahub_core::Cart;

use crate::error::{AppError, Result, add_breadcrumb};
use crate::state::AppState;
use crate::views::{BadgeView, CheckoutView};

/// Checkout form data.
#[derive(Debug, Deserialize)]
pub struct CheckoutForm {
    #[serde(default)]
    pub cart_data: String,
}

/// Checkout page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/show.html")]
pub struct CheckoutShowTemplate {
    pub checkout: CheckoutView,
    pub badge: BadgeView,
}

/// Display checkout summary.
///
/// # Errors
///
/// Returns an error if the persisted cart cannot be read.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>) -> Result<CheckoutShowTemplate> {
    let cart = state.with_cart(|manager| manager.load()).await?;
    let checkout = CheckoutView::new(&cart).map_err(|e| AppError::Internal(e.to_string()))?;
    Ok(CheckoutShowTemplate {
        checkout,
        badge: BadgeView::from(&cart),
    })
}

/// Submit the checkout form.
///
/// # Errors
///
/// Returns 400 if `cart_data` is missing, malformed, or an empty cart, or an
/// error if the persisted cart cannot be cleared.
#[instrument(skip(state, form), fields(bytes = form.cart_data.len()))]
pub async fn submit(
    State(state): State<AppState>,
    Form(form): Form<CheckoutForm>,
) -> Result<impl IntoResponse> {
    let cart: Cart = serde_json::from_str(&form.cart_data)
        .map_err(|e| AppError::BadRequest(format!("invalid cart_data: {e}")))?;
    if cart.is_empty() {
        return Err(AppError::BadRequest("cart is empty".to_string()));
    }

    state
        .with_cart(|manager| manager.clear_for_checkout())
        .await?;
    add_breadcrumb("checkout", "Submitted order", None);

    let marketplace = state.marketplace().clone();
    let payload = form.cart_data;
    tokio::spawn(
        async move {
            if let Err(e) = marketplace.submit_order(&payload).await {
                warn!("Order submission failed after cart was cleared: {e}");
            }
        }
        .instrument(info_span!("submit_order", items = cart.len())),
    );

    Ok(Redirect::to("/cart"))
}
