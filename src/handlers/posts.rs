use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::Deserialize;

use super::crud::parse_id;
use crate::database::models::comment::CommentInput;
use crate::database::models::{toggle_like, Comment, Post, Resource, ValidationError};
use crate::database::{FindQuery, Record, Repository};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::populate::{self, PostView};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct NewPost {
    pub title: Option<String>,
    pub content: Option<String>,
    #[serde(rename = "imageUrl")]
    pub image_url: Option<String>,
}

impl NewPost {
    fn into_post(self, author: uuid::Uuid) -> Result<Post, ValidationError> {
        let title = match self.title {
            Some(t) if !t.trim().is_empty() => t,
            _ => return Err(ValidationError::new("Title must not be empty")),
        };
        let content = match self.content {
            Some(c) if !c.trim().is_empty() => c,
            _ => return Err(ValidationError::new("Content must not be empty")),
        };

        Ok(Post {
            title,
            content,
            image_url: self.image_url.filter(|url| !url.trim().is_empty()),
            author,
            likes: Vec::new(),
            comments: Vec::new(),
        })
    }
}

async fn populated(state: &AppState, posts: Vec<Record<Post>>) -> Result<Vec<PostView>, ApiError> {
    Ok(populate::posts(&state.repo(), &state.repo(), posts).await?)
}

async fn populated_one(state: &AppState, post: Record<Post>) -> Result<PostView, ApiError> {
    populated(state, vec![post])
        .await?
        .pop()
        .ok_or_else(|| ApiError::internal_server_error("Failed to load post"))
}

async fn load(posts: &Repository<Post>, id: &str) -> Result<Record<Post>, ApiError> {
    let id = parse_id(id, "Post")?;
    posts
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Post not found"))
}

async fn save(posts: &Repository<Post>, post: Record<Post>) -> Result<Record<Post>, ApiError> {
    posts
        .update(post.id, &post.data)
        .await?
        .ok_or_else(|| ApiError::not_found("Post not found"))
}

/// GET /api/posts
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<PostView>> {
    let posts = state.repo::<Post>().find(&FindQuery::all()).await?;
    Ok(ApiResponse::success(
        "Posts retrieved successfully",
        populated(&state, posts).await?,
    ))
}

/// GET /api/posts/:id
pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<PostView> {
    let post = load(&state.repo(), &id).await?;
    Ok(ApiResponse::success(
        "Post retrieved successfully",
        populated_one(&state, post).await?,
    ))
}

/// POST /api/posts
pub async fn create(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(input): Json<NewPost>,
) -> ApiResult<PostView> {
    let post = input.into_post(auth_user.id)?;
    let record = state.repo::<Post>().create(&post).await?;
    tracing::info!("User {} created post {}", auth_user.id, record.id);

    Ok(ApiResponse::created(
        "Post created successfully",
        populated_one(&state, record).await?,
    ))
}

/// POST /api/posts/:id/like
pub async fn like(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<PostView> {
    let posts = state.repo::<Post>();
    let mut post = load(&posts, &id).await?;

    let liked = toggle_like(&mut post.data.likes, auth_user.id);
    let post = save(&posts, post).await?;

    let message = if liked { "Post liked successfully" } else { "Post unliked successfully" };
    Ok(ApiResponse::success(message, populated_one(&state, post).await?))
}

/// POST /api/posts/:id/comments
pub async fn add_comment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<CommentInput>,
) -> ApiResult<PostView> {
    let posts = state.repo::<Post>();
    let mut post = load(&posts, &id).await?;

    let comment = state.repo::<Comment>().create(&Comment::create(input)?).await?;
    post.data.comments.push(comment.id);
    let post = save(&posts, post).await?;

    Ok(ApiResponse::success(
        "Comment added successfully",
        populated_one(&state, post).await?,
    ))
}

/// DELETE /api/posts/:id, allowed for the author only
pub async fn delete(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let posts = state.repo::<Post>();
    let post = load(&posts, &id).await?;

    if post.data.author != auth_user.id {
        tracing::warn!("User {} tried to delete post {} by {}", auth_user.id, post.id, post.data.author);
        return Err(ApiError::unauthorized("User not authorized"));
    }

    posts.delete(post.id).await?;
    let comments = state.repo::<Comment>();
    for comment_id in &post.data.comments {
        comments.delete(*comment_id).await?;
    }
    tracing::info!("Deleted post {}", post.id);

    Ok(ApiResponse::message("Post removed"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn new_post_requires_title_and_content() {
        let author = Uuid::new_v4();
        let err = NewPost {
            content: Some("body".into()),
            ..Default::default()
        }
        .into_post(author)
        .unwrap_err();
        assert_eq!(err.0, "Title must not be empty");

        let post = NewPost {
            title: Some("Gap up".into()),
            content: Some("Watching NVDA".into()),
            image_url: Some(" ".into()),
        }
        .into_post(author)
        .unwrap();
        assert_eq!(post.author, author);
        assert!(post.image_url.is_none());
    }
}
