//! Product route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, RawQuery, State},
    response::{IntoResponse, Response},
};
use demo_dashboard_core::filter::{categories, price_bounds};
use demo_dashboard_core::{CategoryFilter, Price, Product, ProductFilter, ProductId};
use rust_decimal::Decimal;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::home::ProductCardView;
use super::{NavView, query_failed};
use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAuth;
use crate::state::AppState;

/// Product detail display data.
#[derive(Clone)]
pub struct ProductDetailView {
    pub card: ProductCardView,
    pub description: String,
    pub brand: Option<String>,
    pub images: Vec<String>,
    pub savings: String,
}

impl From<&Product> for ProductDetailView {
    fn from(product: &Product) -> Self {
        Self {
            card: ProductCardView::from(product),
            description: product.description.clone(),
            brand: product.brand.clone(),
            images: product.images.clone(),
            savings: Price::usd(product.unit_discount()).to_string(),
        }
    }
}

/// Filter query parameters, as typed into the filter form.
///
/// Prices are kept as text so that an empty or malformed bound means
/// "no bound" instead of a rejected request.
#[derive(Debug, Default, Deserialize)]
pub struct FilterQuery {
    pub search: Option<String>,
    pub category: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
}

impl FilterQuery {
    /// Build the core filter from the raw query.
    #[must_use]
    pub fn to_filter(&self) -> ProductFilter {
        ProductFilter {
            search: self.search.clone().unwrap_or_default(),
            category: CategoryFilter::parse(self.category.as_deref().unwrap_or_default()),
            min_price: parse_price(self.min_price.as_deref()),
            max_price: parse_price(self.max_price.as_deref()),
        }
    }
}

/// Path of the grid with its filter, so cart actions land back on it.
fn grid_path(raw_query: Option<&str>) -> String {
    match raw_query.filter(|q| !q.is_empty()) {
        Some(query) => format!("/products?{query}"),
        None => "/products".to_string(),
    }
}

fn parse_price(raw: Option<&str>) -> Option<Decimal> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse::<Decimal>().ok())
}

/// Current state of the filter form.
#[derive(Clone)]
pub struct FilterFormView {
    pub search: String,
    pub category: String,
    pub categories: Vec<String>,
    pub min_price: String,
    pub max_price: String,
}

/// Products listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub nav: NavView,
    pub products: Vec<ProductCardView>,
    pub form: FilterFormView,
    pub shown: usize,
    pub total: usize,
    pub filtered: bool,
    pub redirect_to: String,
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub nav: NavView,
    pub product: ProductDetailView,
    pub redirect_to: String,
}

/// Display the filtered product grid.
#[instrument(skip(state, session, current))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(current): RequireAuth,
    Query(query): Query<FilterQuery>,
    RawQuery(raw_query): RawQuery,
) -> Result<Response> {
    let nav = NavView::load(&session, &current).await?;

    let page = match state.queries().products(Some(&current.token)).await {
        Ok(page) => page,
        Err(err) => return Ok(query_failed(nav, &err, "products", "/products")),
    };

    let filter = query.to_filter();
    let matching = filter.apply(&page.products);
    let bounds = price_bounds(&page.products);

    // Observed min/max are the default bounds shown in the form
    let bound_text = |value: Option<Decimal>, default: Option<Decimal>| {
        value.or(default).map(|d| d.normalize().to_string()).unwrap_or_default()
    };

    let form = FilterFormView {
        search: filter.search.clone(),
        category: filter.category.as_str().to_string(),
        categories: categories(&page.products),
        min_price: bound_text(filter.min_price, bounds.map(|(lo, _)| lo)),
        max_price: bound_text(filter.max_price, bounds.map(|(_, hi)| hi)),
    };

    Ok(ProductsIndexTemplate {
        nav,
        shown: matching.len(),
        total: page.products.len(),
        filtered: !filter.is_identity(),
        products: matching.into_iter().map(ProductCardView::from).collect(),
        form,
        redirect_to: grid_path(raw_query.as_deref()),
    }
    .into_response())
}

/// Display a product detail page.
#[instrument(skip(state, session, current))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(current): RequireAuth,
    Path(id): Path<ProductId>,
) -> Result<Response> {
    let nav = NavView::load(&session, &current).await?;
    let path = format!("/products/{id}");

    match state.queries().product(id, Some(&current.token)).await {
        Ok(product) => Ok(ProductShowTemplate {
            nav,
            product: ProductDetailView::from(product.as_ref()),
            redirect_to: path,
        }
        .into_response()),
        Err(err) => Ok(query_failed(nav, &err, "this product", &path)),
    }
}
