//! Core types for the demo dashboard.
//!
//! Records mirrored from the remote API plus type-safe wrappers for IDs and
//! prices.

pub mod id;
pub mod listing;
pub mod post;
pub mod price;
pub mod product;
pub mod user;

pub use id::*;
pub use listing::{CommentsPage, PostsPage, ProductsPage};
pub use post::{Comment, CommentAuthor, Post, Reactions};
pub use price::{CurrencyCode, Price};
pub use product::Product;
pub use user::{LoginResponse, User};
