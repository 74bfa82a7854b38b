//! Post route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use demo_dashboard_core::{Comment, Post, PostId};
use tower_sessions::Session;
use tracing::instrument;

use super::{NavView, query_failed};
use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAuth;
use crate::state::AppState;

/// Post display data.
#[derive(Clone)]
pub struct PostView {
    pub id: i32,
    pub title: String,
    pub body: String,
    pub user_id: i32,
    pub tags: Vec<String>,
    pub reactions: u64,
    pub likes: Option<u64>,
    pub dislikes: Option<u64>,
    pub views: Option<u64>,
}

impl From<&Post> for PostView {
    fn from(post: &Post) -> Self {
        Self {
            id: post.id.as_i32(),
            title: post.title.clone(),
            body: post.body.clone(),
            user_id: post.user_id.as_i32(),
            tags: post.tags.clone(),
            reactions: post.reactions.total(),
            likes: post.reactions.likes(),
            dislikes: post.reactions.dislikes(),
            views: post.views,
        }
    }
}

/// Comment display data.
#[derive(Clone)]
pub struct CommentView {
    pub id: i32,
    pub body: String,
    pub post_id: i32,
    pub username: String,
    pub full_name: Option<String>,
    pub likes: Option<u64>,
}

impl From<&Comment> for CommentView {
    fn from(comment: &Comment) -> Self {
        Self {
            id: comment.id.as_i32(),
            body: comment.body.clone(),
            post_id: comment.post_id.as_i32(),
            username: comment.user.username.clone(),
            full_name: comment.user.full_name.clone(),
            likes: comment.likes,
        }
    }
}

/// Posts listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "posts/index.html")]
pub struct PostsIndexTemplate {
    pub nav: NavView,
    pub posts: Vec<PostView>,
    pub total: u64,
}

/// Post detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "posts/show.html")]
pub struct PostShowTemplate {
    pub nav: NavView,
    pub post: PostView,
    pub comments: Vec<CommentView>,
}

/// Display the post list.
#[instrument(skip_all)]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(current): RequireAuth,
) -> Result<Response> {
    let nav = NavView::load(&session, &current).await?;

    match state.queries().posts(Some(&current.token)).await {
        Ok(page) => Ok(PostsIndexTemplate {
            nav,
            posts: page.posts.iter().map(PostView::from).collect(),
            total: page.total,
        }
        .into_response()),
        Err(err) => Ok(query_failed(nav, &err, "posts", "/posts")),
    }
}

/// Display a post with its comments.
#[instrument(skip(state, session, current))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(current): RequireAuth,
    Path(id): Path<PostId>,
) -> Result<Response> {
    let nav = NavView::load(&session, &current).await?;
    let queries = state.queries();
    let token = Some(&current.token);

    match tokio::try_join!(queries.post(id, token), queries.post_comments(id, token)) {
        Ok((post, comments)) => Ok(PostShowTemplate {
            nav,
            post: PostView::from(post.as_ref()),
            comments: comments.comments.iter().map(CommentView::from).collect(),
        }
        .into_response()),
        Err(err) => Ok(query_failed(nav, &err, "this post", &format!("/posts/{id}"))),
    }
}
