//! HTTP route handlers for the dashboard.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Dashboard (stats, latest products/posts, cart)
//!
//! # Catalog & content
//! GET  /products               - Product grid with search/category/price filter
//! GET  /products/{id}          - Product detail
//! GET  /posts                  - Post list
//! GET  /posts/{id}             - Post detail with its comments
//! GET  /comments               - Comment list
//!
//! # Cart
//! POST /cart/add               - Add one unit (redirects back)
//! POST /cart/update            - Set quantity; below one removes (redirects back)
//! POST /cart/remove            - Remove a line (redirects back)
//! GET  /cart/count             - Cart count badge (fragment)
//!
//! # Checkout
//! GET  /checkout               - Payment form with order summary
//! POST /checkout               - Simulated payment, order confirmation
//!
//! # Auth
//! GET  /login                  - Login page
//! POST /login                  - Login action
//! POST /logout                 - Logout action
//! ```
//!
//! Every page except the login page requires a signed-in user.

pub mod auth;
pub mod cart;
pub mod checkout;
pub mod comments;
pub mod home;
pub mod posts;
pub mod products;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower_sessions::Session;

use crate::error::AppError;
use crate::filters;
use crate::models::CurrentUser;
use crate::query::QueryError;
use crate::services::cart as cart_service;
use crate::state::AppState;

// =============================================================================
// Shared View Data
// =============================================================================

/// Header data every page renders: who is signed in and the cart badge.
#[derive(Clone, Default)]
pub struct NavView {
    pub username: Option<String>,
    pub display_name: Option<String>,
    pub avatar: Option<String>,
    pub cart_count: u32,
}

impl NavView {
    /// Build the header for a signed-in user.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub async fn load(session: &Session, current: &CurrentUser) -> Result<Self, AppError> {
        let cart = cart_service::load(session).await?;
        Ok(Self {
            username: Some(current.user.username.clone()),
            display_name: Some(current.user.display_name()),
            avatar: current.user.image.clone(),
            cart_count: cart.item_count(),
        })
    }
}

/// Error panel shown when a read failed after its retries.
#[derive(Template, WebTemplate)]
#[template(path = "error.html")]
pub struct QueryErrorTemplate {
    pub nav: NavView,
    pub title: String,
    pub message: String,
    pub retry_to: String,
}

/// Page for a resource the API does not know.
#[derive(Template, WebTemplate)]
#[template(path = "not_found.html")]
pub struct NotFoundTemplate {
    pub nav: NavView,
    pub what: String,
}

/// Render a failed read: a 404 page for unknown resources, otherwise the
/// error panel with a link that retries by reloading `retry_to`.
pub fn query_failed(nav: NavView, err: &QueryError, what: &str, retry_to: &str) -> Response {
    if err.is_not_found() {
        return (
            StatusCode::NOT_FOUND,
            NotFoundTemplate {
                nav,
                what: what.to_string(),
            },
        )
            .into_response();
    }

    tracing::warn!(error = %err, retry_to, "Rendering error panel");
    (
        StatusCode::BAD_GATEWAY,
        QueryErrorTemplate {
            nav,
            title: format!("Could not load {what}"),
            message: "The data service did not respond. Please try again.".to_string(),
            retry_to: retry_to.to_string(),
        },
    )
        .into_response()
}

/// Accept only local redirect targets (`/path`, not `//host` or `http://`).
///
/// Browsers drop tabs and newlines while parsing a URL, so anything but
/// printable ASCII (already percent-encoded paths) rejects the target too.
#[must_use]
pub fn local_redirect_target(target: Option<&str>) -> &str {
    match target {
        Some(path)
            if path.starts_with('/')
                && !path.starts_with("//")
                && path.chars().all(|c| c.is_ascii_graphic() && c != '\\') =>
        {
            path
        }
        _ => "/",
    }
}

// =============================================================================
// Routers
// =============================================================================

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{id}", get(products::show))
}

/// Create the post routes router.
pub fn post_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(posts::index))
        .route("/{id}", get(posts::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/count", get(cart::count))
}

/// Create all routes for the dashboard.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::dashboard))
        .nest("/products", product_routes())
        .nest("/posts", post_routes())
        .route("/comments", get(comments::index))
        .nest("/cart", cart_routes())
        .route("/checkout", get(checkout::show).post(checkout::submit))
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/logout", post(auth::logout))
}
