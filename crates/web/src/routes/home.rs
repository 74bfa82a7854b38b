//! Dashboard route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::State,
    response::{IntoResponse, Response},
};
use demo_dashboard_core::{Order, Post, Price, Product};
use tower_sessions::Session;
use tracing::instrument;

use super::cart::CartView;
use super::{NavView, query_failed};
use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAuth;
use crate::services::{cart as cart_service, checkout as checkout_service};
use crate::state::AppState;

/// How many products and posts the dashboard previews.
const PREVIEW_LEN: usize = 5;

/// How many tags a post preview shows.
const PREVIEW_TAGS: usize = 3;

/// Product card display data.
#[derive(Clone)]
pub struct ProductCardView {
    pub id: i32,
    pub title: String,
    pub thumbnail: String,
    pub category: String,
    pub price: String,
    pub effective_price: String,
    pub is_discounted: bool,
    pub discount_percentage: String,
    pub rating: String,
    pub stock: u32,
}

impl From<&Product> for ProductCardView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.as_i32(),
            title: product.title.clone(),
            thumbnail: product.thumbnail.clone(),
            category: product.category.clone(),
            price: product.list_price().to_string(),
            effective_price: Price::usd(product.effective_price()).to_string(),
            is_discounted: product.is_discounted(),
            discount_percentage: product.discount_rate().normalize().to_string(),
            rating: product.rating.to_string(),
            stock: product.stock,
        }
    }
}

/// Post preview display data.
#[derive(Clone)]
pub struct PostPreviewView {
    pub id: i32,
    pub title: String,
    pub excerpt: String,
    pub tags: Vec<String>,
    pub reactions: u64,
}

impl From<&Post> for PostPreviewView {
    fn from(post: &Post) -> Self {
        Self {
            id: post.id.as_i32(),
            title: post.title.clone(),
            excerpt: post.body.chars().take(120).collect(),
            tags: post.tags.iter().take(PREVIEW_TAGS).cloned().collect(),
            reactions: post.reactions.total(),
        }
    }
}

/// Banner for the order placed just before landing here.
#[derive(Clone)]
pub struct OrderBannerView {
    pub id: String,
    pub final_total: String,
    pub item_count: u32,
}

impl From<&Order> for OrderBannerView {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id.to_string(),
            final_total: order.final_price().to_string(),
            item_count: order.item_count(),
        }
    }
}

/// Resource totals shown in the stat cards.
#[derive(Clone, Copy)]
pub struct StatsView {
    pub products: u64,
    pub posts: u64,
    pub comments: u64,
}

/// Dashboard page template.
#[derive(Template, WebTemplate)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub nav: NavView,
    pub stats: StatsView,
    pub products: Vec<ProductCardView>,
    pub posts: Vec<PostPreviewView>,
    pub cart: CartView,
    pub last_order: Option<OrderBannerView>,
}

/// Display the dashboard.
///
/// The three resources are fetched concurrently; the page renders only when
/// all of them arrived, and shows the error panel if any failed.
#[instrument(skip_all)]
pub async fn dashboard(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(current): RequireAuth,
) -> Result<Response> {
    let nav = NavView::load(&session, &current).await?;
    let queries = state.queries();
    let token = Some(&current.token);

    let (products, posts, comments) = match tokio::try_join!(
        queries.products(token),
        queries.posts(token),
        queries.comments(token),
    ) {
        Ok(pages) => pages,
        Err(err) => return Ok(query_failed(nav, &err, "the dashboard", "/")),
    };

    let cart = cart_service::load(&session).await?;
    let last_order = checkout_service::take_last_order(&session).await?;

    Ok(DashboardTemplate {
        nav,
        stats: StatsView {
            products: products.total,
            posts: posts.total,
            comments: comments.total,
        },
        products: products
            .products
            .iter()
            .take(PREVIEW_LEN)
            .map(ProductCardView::from)
            .collect(),
        posts: posts
            .posts
            .iter()
            .take(PREVIEW_LEN)
            .map(PostPreviewView::from)
            .collect(),
        cart: CartView::from(&cart),
        last_order: last_order.as_ref().map(OrderBannerView::from),
    }
    .into_response())
}
