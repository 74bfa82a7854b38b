//! Comment route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::State,
    response::{IntoResponse, Response},
};
use tower_sessions::Session;
use tracing::instrument;

use super::posts::CommentView;
use super::{NavView, query_failed};
use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAuth;
use crate::state::AppState;

/// Comments listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "comments/index.html")]
pub struct CommentsIndexTemplate {
    pub nav: NavView,
    pub comments: Vec<CommentView>,
    pub total: u64,
}

/// Display the comment list.
#[instrument(skip_all)]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(current): RequireAuth,
) -> Result<Response> {
    let nav = NavView::load(&session, &current).await?;

    match state.queries().comments(Some(&current.token)).await {
        Ok(page) => Ok(CommentsIndexTemplate {
            nav,
            comments: page.comments.iter().map(CommentView::from).collect(),
            total: page.total,
        }
        .into_response()),
        Err(err) => Ok(query_failed(nav, &err, "comments", "/comments")),
    }
}
