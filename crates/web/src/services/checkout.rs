//! Simulated checkout.
//!
//! Nothing is charged: placing an order waits a fixed processing delay,
//! synthesizes an [`Order`] from the session cart, empties the cart, and
//! remembers the order so the dashboard can announce it once.

use std::time::Duration;

use chrono::Utc;
use demo_dashboard_core::{Order, ValidatedCheckout};
use tower_sessions::Session;
use tower_sessions::session::Error as SessionError;
use tracing::{info, instrument};

use super::cart;
use crate::models::session_keys;

/// Place an order for the visitor's cart.
///
/// Returns `None` when the cart is empty. Every call with a non-empty cart
/// produces a new, distinct order.
///
/// # Errors
///
/// Returns an error if the session store fails.
#[instrument(skip(session, checkout))]
pub async fn place_order(
    session: &Session,
    checkout: ValidatedCheckout,
    processing_delay: Duration,
) -> Result<Option<Order>, SessionError> {
    if cart::load(session).await?.is_empty() {
        return Ok(None);
    }

    tokio::time::sleep(processing_delay).await;

    // Re-read: the cart may have changed while payment was "processing"
    let mut cart = cart::load(session).await?;
    if cart.is_empty() {
        return Ok(None);
    }

    let order = Order::place(&mut cart, checkout, Utc::now(), &mut rand::rng());
    cart::save(session, &cart).await?;
    session.insert(session_keys::LAST_ORDER, &order).await?;

    info!(
        order_id = %order.id,
        items = order.item_count(),
        final_total = %order.final_total,
        "Order placed"
    );

    Ok(Some(order))
}

/// Take the last order, if any. It is removed so it is shown only once.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn take_last_order(session: &Session) -> Result<Option<Order>, SessionError> {
    session.remove::<Order>(session_keys::LAST_ORDER).await
}
