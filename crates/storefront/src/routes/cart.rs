//! Cart route handlers.
//!
//! Cart operations use HTMX for dynamic updates without full page reloads.
//! Mutations answer with the fragment they changed plus an `HX-Trigger:
//! cart-updated` header, which makes the header badge refetch itself.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    response::{AppendHeaders, IntoResponse, Response},
};
use serde::Deserialize;
use tracing::instrument;

use nissahub_core::{Price, Product, ProductId};

use crate::cart::AddOutcome;
use crate::error::{AppError, Result, add_breadcrumb};
use crate::state::AppState;
use crate::views::{AddButtonView, BadgeView, CartPageView};

/// HTMX event fired after any cart mutation.
pub const CART_UPDATED_TRIGGER: (&str, &str) = ("HX-Trigger", "cart-updated");

/// Add to cart form data, mirroring the product page's button attributes.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub id: String,
    pub name: String,
    pub price: String,
    pub image: String,
}

impl AddToCartForm {
    /// Validate the form into a product descriptor.
    ///
    /// # Errors
    ///
    /// Returns `AppError::BadRequest` for an empty id or an invalid price.
    pub fn into_product(self) -> Result<Product> {
        let id = self.id.trim();
        if id.is_empty() {
            return Err(AppError::BadRequest("product id is required".to_string()));
        }
        let price = Price::parse(&self.price).map_err(|e| AppError::BadRequest(e.to_string()))?;

        Ok(Product {
            id: ProductId::new(id),
            name: self.name,
            price,
            image: self.image,
        })
    }
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub product_id: String,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub page: CartPageView,
    pub badge: BadgeView,
}

/// Cart items fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate {
    pub page: CartPageView,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub badge: BadgeView,
}

/// Add-to-cart button fragment template (for HTMX).
///
/// The button posts its enclosing form, so a product page renders it inside
/// a form carrying [`AddToCartForm`]'s fields:
///
/// ```html
/// <form>
///   <input type="hidden" name="id" value="p1">
///   <input type="hidden" name="name" value="Widget">
///   <input type="hidden" name="price" value="19.99">
///   <input type="hidden" name="image" value="/i.png">
///   <!-- GET /cart/button/p1 -->
/// </form>
/// ```
#[derive(Template, WebTemplate)]
#[template(path = "partials/add_button.html")]
pub struct AddButtonTemplate {
    pub button: AddButtonView,
}

/// Display cart page.
///
/// # Errors
///
/// Returns an error if the persisted cart cannot be read.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>) -> Result<CartShowTemplate> {
    let cart = state.with_cart(|manager| manager.load()).await?;
    Ok(CartShowTemplate {
        page: CartPageView::from(&cart),
        badge: BadgeView::from(&cart),
    })
}

/// Add item to cart (HTMX).
///
/// Returns the refreshed add button. Re-adding a product already in the
/// cart changes nothing and fires no trigger.
///
/// # Errors
///
/// Returns 400 for invalid form input, or an error if the cart cannot be
/// read or written.
#[instrument(skip(state, form), fields(product_id = %form.id))]
pub async fn add(State(state): State<AppState>, Form(form): Form<AddToCartForm>) -> Result<Response> {
    let product = form.into_product()?;
    let id = product.id.clone();

    let button_id = id.clone();
    let (outcome, button) = state
        .with_cart(move |manager| {
            let outcome = manager.add_item(product)?;
            Ok((outcome, manager.add_button(&button_id)?))
        })
        .await?;

    let fragment = AddButtonTemplate { button };
    Ok(match outcome {
        AddOutcome::Added => {
            add_breadcrumb("cart", "Added item", Some(&[("product_id", id.as_str())]));
            (AppendHeaders([CART_UPDATED_TRIGGER]), fragment).into_response()
        }
        AddOutcome::AlreadyInCart => fragment.into_response(),
    })
}

/// Remove item from cart (HTMX).
///
/// Returns the re-rendered cart items.
///
/// # Errors
///
/// Returns an error if the cart cannot be read or written.
#[instrument(skip(state, form), fields(product_id = %form.product_id))]
pub async fn remove(
    State(state): State<AppState>,
    Form(form): Form<RemoveFromCartForm>,
) -> Result<impl IntoResponse> {
    let id = ProductId::new(form.product_id);
    let remove_id = id.clone();
    let cart = state
        .with_cart(move |manager| manager.remove_item(&remove_id))
        .await?;

    add_breadcrumb("cart", "Removed item", Some(&[("product_id", id.as_str())]));
    Ok((
        AppendHeaders([CART_UPDATED_TRIGGER]),
        CartItemsTemplate {
            page: CartPageView::from(&cart),
        },
    ))
}

/// Get cart count badge (HTMX).
///
/// # Errors
///
/// Returns an error if the persisted cart cannot be read.
#[instrument(skip(state))]
pub async fn count(State(state): State<AppState>) -> Result<CartCountTemplate> {
    let badge = state.with_cart(|manager| manager.badge()).await?;
    Ok(CartCountTemplate { badge })
}

/// Get the add-to-cart button for a product page (HTMX).
///
/// # Errors
///
/// Returns an error if the persisted cart cannot be read.
#[instrument(skip(state))]
pub async fn button(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> Result<AddButtonTemplate> {
    let id = ProductId::new(product_id);
    let button = state
        .with_cart(move |manager| manager.add_button(&id))
        .await?;
    Ok(AddButtonTemplate { button })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn form(id: &str, price: &str) -> AddToCartForm {
        AddToCartForm {
            id: id.to_string(),
            name: "Widget".to_string(),
            price: price.to_string(),
            image: "/i.png".to_string(),
        }
    }

    #[test]
    fn test_form_into_product() {
        let product = form(" p1 ", "19.99").into_product().unwrap();
        assert_eq!(product.id.as_str(), "p1");
        assert_eq!(product.price.to_string(), "19.99 MAD");
    }

    #[test]
    fn test_form_rejects_bad_input() {
        assert!(matches!(form("", "1").into_product(), Err(AppError::BadRequest(_))));
        assert!(matches!(form("p1", "abc").into_product(), Err(AppError::BadRequest(_))));
        assert!(matches!(form("p1", "-5").into_product(), Err(AppError::BadRequest(_))));
        assert!(matches!(
            form("p1", "79228162514264337593543950335").into_product(),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn test_badge_fragment_renders_class() {
        let html = CartCountTemplate {
            badge: BadgeView {
                count: 2,
                has_items: true,
            },
        }
        .render()
        .unwrap();
        assert!(html.contains("has-items"));
        assert!(html.contains(">2<"));

        let html = CartCountTemplate {
            badge: BadgeView {
                count: 0,
                has_items: false,
            },
        }
        .render()
        .unwrap();
        assert!(!html.contains("has-items"));
    }

    #[test]
    fn test_add_button_posts_enclosing_form() {
        let cart = nissahub_core::Cart::new();
        let html = AddButtonTemplate {
            button: AddButtonView::new(ProductId::new("p1"), &cart),
        }
        .render()
        .unwrap();
        assert!(html.contains(r#"hx-post="/cart/add""#));
        assert!(html.contains(r#"hx-include="closest form""#));
        assert!(!html.contains("#add-to-cart-form"));
        assert!(!html.contains("disabled"));
    }

    #[test]
    fn test_cart_items_fragment_escapes_names() {
        let cart: nissahub_core::Cart = [Product {
            id: ProductId::new("p1"),
            name: "<script>alert(1)</script>".to_string(),
            price: Price::parse("10").unwrap(),
            image: "/i.png".to_string(),
        }]
        .into_iter()
        .map(nissahub_core::CartItem::from_product)
        .collect();

        let html = CartItemsTemplate {
            page: CartPageView::from(&cart),
        }
        .render()
        .unwrap();
        assert!(!html.contains("<script>"));
        assert!(html.contains("10.00 MAD"));
    }
}
