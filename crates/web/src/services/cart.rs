//! Session-backed cart storage.
//!
//! The cart lives under [`session_keys::CART`]; a missing entry is an empty
//! cart. Every mutation is a load, a pure [`Cart`] operation, and a save.

use demo_dashboard_core::{Cart, Product, ProductId};
use tower_sessions::Session;
use tower_sessions::session::Error as SessionError;

use crate::models::session_keys;

/// Load the visitor's cart.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn load(session: &Session) -> Result<Cart, SessionError> {
    Ok(session.get::<Cart>(session_keys::CART).await?.unwrap_or_default())
}

/// Store the visitor's cart; an empty cart removes the entry.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn save(session: &Session, cart: &Cart) -> Result<(), SessionError> {
    if cart.is_empty() {
        session.remove::<Cart>(session_keys::CART).await?;
        Ok(())
    } else {
        session.insert(session_keys::CART, cart).await
    }
}

/// Add one unit of `product`. Returns the new quantity and the updated cart.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn add(session: &Session, product: Product) -> Result<(u32, Cart), SessionError> {
    let mut cart = load(session).await?;
    let quantity = cart.add(product);
    save(session, &cart).await?;
    Ok((quantity, cart))
}

/// Overwrite a line's quantity; below one removes the line.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn set_quantity(
    session: &Session,
    id: ProductId,
    quantity: u32,
) -> Result<Cart, SessionError> {
    let mut cart = load(session).await?;
    if cart.set_quantity(id, quantity) {
        save(session, &cart).await?;
    }
    Ok(cart)
}

/// Remove a line.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn remove(session: &Session, id: ProductId) -> Result<Cart, SessionError> {
    let mut cart = load(session).await?;
    if cart.remove(id) {
        save(session, &cart).await?;
    }
    Ok(cart)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use rust_decimal::Decimal;
    use tower_sessions::MemoryStore;

    use super::*;

    fn session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    fn mug() -> Product {
        serde_json::from_value(serde_json::json!({
            "id": 7,
            "title": "Mug",
            "category": "kitchen",
            "price": 20,
            "discountPercentage": 10
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_missing_cart_is_empty() {
        assert!(load(&session()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_add_twice_increments() {
        let session = session();
        let (qty, _) = add(&session, mug()).await.unwrap();
        assert_eq!(qty, 1);
        let (qty, cart) = add(&session, mug()).await.unwrap();
        assert_eq!(qty, 2);
        assert_eq!(cart.items().len(), 1);

        let totals = load(&session).await.unwrap().totals();
        assert_eq!(totals.subtotal, Decimal::from(40));
        assert_eq!(totals.discount, Decimal::from(4));
        assert_eq!(totals.final_total, Decimal::from(36));
    }

    #[tokio::test]
    async fn test_set_quantity_zero_removes() {
        let session = session();
        add(&session, mug()).await.unwrap();
        let cart = set_quantity(&session, ProductId::new(7), 0).await.unwrap();
        assert!(cart.is_empty());
        assert!(session.get::<Cart>(session_keys::CART).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_remove() {
        let session = session();
        add(&session, mug()).await.unwrap();
        assert!(remove(&session, ProductId::new(7)).await.unwrap().is_empty());
        assert!(remove(&session, ProductId::new(7)).await.unwrap().is_empty());
    }
}
