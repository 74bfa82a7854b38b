//! Paged listing envelopes returned by the collection endpoints.
//!
//! Every list endpoint wraps its items as `{ <items>, total, skip, limit }`.
//! Only the first page is ever requested; `total` is what the dashboard
//! reports as the resource count.

use serde::{Deserialize, Serialize};

use super::post::{Comment, Post};
use super::product::Product;

/// `GET /products` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductsPage {
    pub products: Vec<Product>,
    pub total: u64,
    #[serde(default)]
    pub skip: u64,
    #[serde(default)]
    pub limit: u64,
}

/// `GET /posts` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostsPage {
    pub posts: Vec<Post>,
    pub total: u64,
    #[serde(default)]
    pub skip: u64,
    #[serde(default)]
    pub limit: u64,
}

/// `GET /comments` and `GET /posts/{id}/comments` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentsPage {
    pub comments: Vec<Comment>,
    pub total: u64,
    #[serde(default)]
    pub skip: u64,
    #[serde(default)]
    pub limit: u64,
}
