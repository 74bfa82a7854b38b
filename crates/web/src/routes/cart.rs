//! Cart route handlers.
//!
//! The cart lives in the session. Mutations are plain form posts that
//! redirect back to the page they came from; the cart itself is rendered on
//! the dashboard and the checkout page.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use demo_dashboard_core::{Cart, CartItem, Price, ProductId};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::local_redirect_target;
use crate::error::{Result, add_breadcrumb};
use crate::middleware::RequireAuth;
use crate::services::cart as cart_service;
use crate::state::AppState;

/// Cart line display data for templates.
#[derive(Clone)]
pub struct CartItemView {
    pub product_id: i32,
    pub title: String,
    pub thumbnail: String,
    pub quantity: u32,
    pub price: String,
    pub effective_price: String,
    pub discount_percentage: String,
    pub is_discounted: bool,
    pub line_total: String,
}

/// Cart display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub subtotal: String,
    pub discount: String,
    pub final_total: String,
    pub item_count: u32,
    pub is_empty: bool,
}

impl From<&CartItem> for CartItemView {
    fn from(item: &CartItem) -> Self {
        let product = &item.product;
        Self {
            product_id: product.id.as_i32(),
            title: product.title.clone(),
            thumbnail: product.thumbnail.clone(),
            quantity: item.quantity,
            price: product.list_price().to_string(),
            effective_price: Price::usd(product.effective_price()).to_string(),
            discount_percentage: product.discount_rate().normalize().to_string(),
            is_discounted: product.is_discounted(),
            line_total: Price::usd(item.line_total()).to_string(),
        }
    }
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        let totals = cart.totals();
        Self {
            items: cart.items().iter().map(CartItemView::from).collect(),
            subtotal: totals.subtotal_price().to_string(),
            discount: totals.discount_price().to_string(),
            final_total: totals.final_price().to_string(),
            item_count: totals.item_count,
            is_empty: cart.is_empty(),
        }
    }
}

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: ProductId,
    pub redirect_to: Option<String>,
}

/// Update cart form data.
///
/// The quantity is signed so that `0` and negative values reach the cart
/// (and remove the line) instead of failing to parse.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub product_id: ProductId,
    pub quantity: i64,
    pub redirect_to: Option<String>,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub product_id: ProductId,
    pub redirect_to: Option<String>,
}

/// Cart count badge fragment template.
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u32,
}

/// Add one unit of a product to the cart.
///
/// The product record is read through the query cache so the cart holds the
/// same data the catalog shows.
#[instrument(skip(state, session, current))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(current): RequireAuth,
    Form(form): Form<AddToCartForm>,
) -> Result<Response> {
    let product = state
        .queries()
        .product(form.product_id, Some(&current.token))
        .await?;

    let (quantity, _) = cart_service::add(&session, (*product).clone()).await?;

    let id = form.product_id.to_string();
    let qty = quantity.to_string();
    add_breadcrumb(
        "cart",
        "Added product",
        Some(&[("product_id", id.as_str()), ("quantity", qty.as_str())]),
    );

    Ok(Redirect::to(local_redirect_target(form.redirect_to.as_deref())).into_response())
}

/// Set a line's quantity; anything below one removes the line.
#[instrument(skip(session, _current))]
pub async fn update(
    session: Session,
    RequireAuth(_current): RequireAuth,
    Form(form): Form<UpdateCartForm>,
) -> Result<Response> {
    let quantity = u32::try_from(form.quantity.max(0)).unwrap_or(u32::MAX);
    cart_service::set_quantity(&session, form.product_id, quantity).await?;
    Ok(Redirect::to(local_redirect_target(form.redirect_to.as_deref())).into_response())
}

/// Remove a line from the cart.
#[instrument(skip(session, _current))]
pub async fn remove(
    session: Session,
    RequireAuth(_current): RequireAuth,
    Form(form): Form<RemoveFromCartForm>,
) -> Result<Response> {
    cart_service::remove(&session, form.product_id).await?;
    Ok(Redirect::to(local_redirect_target(form.redirect_to.as_deref())).into_response())
}

/// Cart count badge.
#[instrument(skip(session, _current))]
pub async fn count(session: Session, RequireAuth(_current): RequireAuth) -> Result<impl IntoResponse> {
    let cart = cart_service::load(&session).await?;
    Ok(CartCountTemplate {
        count: cart.item_count(),
    })
}
