//! Posts and comments from the content API.

use serde::{Deserialize, Serialize};

use super::id::{CommentId, PostId, UserId};

/// Reaction counts on a post.
///
/// The API has served both a bare number and a `{likes, dislikes}` object
/// for this field, so both shapes decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Reactions {
    Count(u64),
    Detailed { likes: u64, dislikes: u64 },
}

impl Reactions {
    /// Total reactions of any kind.
    #[must_use]
    pub const fn total(&self) -> u64 {
        match *self {
            Self::Count(n) => n,
            Self::Detailed { likes, dislikes } => likes.saturating_add(dislikes),
        }
    }

    /// Likes, when the API reports them separately.
    #[must_use]
    pub const fn likes(&self) -> Option<u64> {
        match *self {
            Self::Count(_) => None,
            Self::Detailed { likes, .. } => Some(likes),
        }
    }

    /// Dislikes, when the API reports them separately.
    #[must_use]
    pub const fn dislikes(&self) -> Option<u64> {
        match *self {
            Self::Count(_) => None,
            Self::Detailed { dislikes, .. } => Some(dislikes),
        }
    }
}

impl Default for Reactions {
    fn default() -> Self {
        Self::Count(0)
    }
}

/// A blog post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: PostId,
    pub title: String,
    pub body: String,
    pub user_id: UserId,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub reactions: Reactions,
    #[serde(default)]
    pub views: Option<u64>,
}

/// Author summary embedded in a comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentAuthor {
    pub id: UserId,
    pub username: String,
    #[serde(default)]
    pub full_name: Option<String>,
}

/// A comment on a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: CommentId,
    pub body: String,
    pub post_id: PostId,
    pub user: CommentAuthor,
    #[serde(default)]
    pub likes: Option<u64>,
    #[serde(default)]
    pub rating: Option<u8>,
    #[serde(default)]
    pub email: Option<String>,
}
