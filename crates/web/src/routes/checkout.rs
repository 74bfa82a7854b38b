//! Checkout route handlers.
//!
//! The payment form is validated field by field; a valid submission waits
//! the configured processing delay, turns the cart into an order, and shows
//! a confirmation page that sends the visitor home after a few seconds.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use demo_dashboard_core::{CheckoutForm, Order, ValidationErrors};
use tower_sessions::Session;
use tracing::instrument;

use super::NavView;
use super::cart::{CartItemView, CartView};
use crate::error::{Result, add_breadcrumb};
use crate::filters;
use crate::middleware::RequireAuth;
use crate::services::{cart as cart_service, checkout as checkout_service};
use crate::state::AppState;

/// Values to put back into the payment form.
///
/// The card number and CVV are never echoed back.
#[derive(Clone, Default)]
pub struct CheckoutFormView {
    pub card_holder: String,
    pub expiry_date: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
}

impl From<&CheckoutForm> for CheckoutFormView {
    fn from(form: &CheckoutForm) -> Self {
        Self {
            card_holder: form.payment.card_holder.clone(),
            expiry_date: form.payment.expiry_date.clone(),
            street: form.shipping.street.clone(),
            city: form.shipping.city.clone(),
            state: form.shipping.state.clone(),
            zip_code: form.shipping.zip_code.clone(),
            country: form.shipping.country.clone(),
        }
    }
}

/// Confirmation display data.
#[derive(Clone)]
pub struct OrderView {
    pub id: String,
    pub status: String,
    pub created_at: String,
    pub items: Vec<CartItemView>,
    pub total: String,
    pub discount: String,
    pub final_total: String,
    pub payment_method: String,
    pub shipping_address: String,
}

impl From<&Order> for OrderView {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id.to_string(),
            status: order.status.to_string(),
            created_at: order.created_at.format("%Y-%m-%d %H:%M UTC").to_string(),
            items: order.items.iter().map(CartItemView::from).collect(),
            total: order.total_price().to_string(),
            discount: order.discount_price().to_string(),
            final_total: order.final_price().to_string(),
            payment_method: order.payment_method.to_string(),
            shipping_address: order.shipping_address.one_line(),
        }
    }
}

/// Payment page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/payment.html")]
pub struct PaymentTemplate {
    pub nav: NavView,
    pub cart: CartView,
    pub form: CheckoutFormView,
    pub errors: ValidationErrors,
}

/// Order confirmation page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/confirmation.html")]
pub struct ConfirmationTemplate {
    pub nav: NavView,
    pub order: OrderView,
    pub redirect_secs: u64,
}

/// Display the payment form. An empty cart goes back to the dashboard.
#[instrument(skip_all)]
pub async fn show(session: Session, RequireAuth(current): RequireAuth) -> Result<Response> {
    let cart = cart_service::load(&session).await?;
    if cart.is_empty() {
        return Ok(Redirect::to("/").into_response());
    }

    Ok(PaymentTemplate {
        nav: NavView::load(&session, &current).await?,
        cart: CartView::from(&cart),
        form: CheckoutFormView::default(),
        errors: ValidationErrors::new(),
    }
    .into_response())
}

/// Submit the payment form.
///
/// Invalid input re-renders the form with a message next to each failing
/// field. Submitting twice produces two orders.
#[instrument(skip_all)]
pub async fn submit(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(current): RequireAuth,
    Form(form): Form<CheckoutForm>,
) -> Result<Response> {
    let checkout = match form.validate() {
        Ok(checkout) => checkout,
        Err(errors) => {
            let cart = cart_service::load(&session).await?;
            if cart.is_empty() {
                return Ok(Redirect::to("/").into_response());
            }
            tracing::debug!(%errors, "Checkout form rejected");
            return Ok((
                StatusCode::UNPROCESSABLE_ENTITY,
                PaymentTemplate {
                    nav: NavView::load(&session, &current).await?,
                    cart: CartView::from(&cart),
                    form: CheckoutFormView::from(&form),
                    errors,
                },
            )
                .into_response());
        }
    };

    let delay = state.config().checkout.processing_delay;
    let Some(order) = checkout_service::place_order(&session, checkout, delay).await? else {
        return Ok(Redirect::to("/").into_response());
    };

    let order_id = order.id.to_string();
    add_breadcrumb("checkout", "Order placed", Some(&[("order_id", order_id.as_str())]));

    Ok(ConfirmationTemplate {
        nav: NavView::load(&session, &current).await?,
        order: OrderView::from(&order),
        redirect_secs: state.config().checkout.redirect_delay.as_secs(),
    }
    .into_response())
}
