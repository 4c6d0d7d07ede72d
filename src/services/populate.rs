use std::collections::HashMap;

use chrono::{DateTime, Utc};
use futures::future::try_join_all;
use serde::Serialize;
use uuid::Uuid;

use crate::database::models::{AdminPost, Comment, Post, User, UserSummary};
use crate::database::{Record, Repository, StoreResult};

/// Resolve user ids to summaries. Ids without a stored user are left out.
pub async fn user_summaries(
    users: &Repository<User>,
    mut unique: Vec<Uuid>,
) -> StoreResult<HashMap<Uuid, UserSummary>> {
    unique.sort_unstable();
    unique.dedup();

    let found = try_join_all(unique.into_iter().map(|id| users.find_by_id(id))).await?;
    Ok(found
        .into_iter()
        .flatten()
        .map(|record| (record.id, UserSummary::from(&record)))
        .collect())
}

#[derive(Debug, Clone, Serialize)]
pub struct AdminCommentView {
    pub id: Uuid,
    pub user: Option<UserSummary>,
    pub text: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

/// Admin post with author and comment users populated
#[derive(Debug, Clone, Serialize)]
pub struct AdminPostView {
    pub id: Uuid,
    pub content: String,
    pub author: Option<UserSummary>,
    pub likes: Vec<Uuid>,
    pub comments: Vec<AdminCommentView>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

pub async fn admin_posts(
    users: &Repository<User>,
    posts: Vec<Record<AdminPost>>,
) -> StoreResult<Vec<AdminPostView>> {
    let ids: Vec<Uuid> = posts
        .iter()
        .flat_map(|post| {
            std::iter::once(post.data.author).chain(post.data.comments.iter().map(|c| c.user))
        })
        .collect();
    let summaries = user_summaries(users, ids).await?;

    Ok(posts
        .into_iter()
        .map(|post| AdminPostView {
            id: post.id,
            author: summaries.get(&post.data.author).cloned(),
            content: post.data.content,
            likes: post.data.likes,
            comments: post
                .data
                .comments
                .into_iter()
                .map(|comment| AdminCommentView {
                    id: comment.id,
                    user: summaries.get(&comment.user).cloned(),
                    text: comment.text,
                    created_at: comment.created_at,
                })
                .collect(),
            created_at: post.created_at,
            updated_at: post.updated_at,
        })
        .collect())
}

/// Member post with author and comment documents populated
#[derive(Debug, Clone, Serialize)]
pub struct PostView {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    #[serde(rename = "imageUrl", skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub author: Option<UserSummary>,
    pub likes: Vec<Uuid>,
    pub comments: Vec<Record<Comment>>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

pub async fn posts(
    users: &Repository<User>,
    comments: &Repository<Comment>,
    posts: Vec<Record<Post>>,
) -> StoreResult<Vec<PostView>> {
    let summaries = user_summaries(users, posts.iter().map(|p| p.data.author).collect()).await?;

    let comment_ids: Vec<Uuid> = posts
        .iter()
        .flat_map(|p| p.data.comments.iter().copied())
        .collect();
    let found = try_join_all(comment_ids.into_iter().map(|id| comments.find_by_id(id))).await?;
    let mut by_id: HashMap<Uuid, Record<Comment>> =
        found.into_iter().flatten().map(|c| (c.id, c)).collect();

    Ok(posts
        .into_iter()
        .map(|post| PostView {
            id: post.id,
            author: summaries.get(&post.data.author).cloned(),
            comments: post
                .data
                .comments
                .iter()
                .filter_map(|id| by_id.remove(id))
                .collect(),
            title: post.data.title,
            content: post.data.content,
            image_url: post.data.image_url,
            likes: post.data.likes,
            created_at: post.created_at,
            updated_at: post.updated_at,
        })
        .collect())
}
