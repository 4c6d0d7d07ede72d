use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::Deserialize;

use super::crud::parse_id;
use crate::database::models::{toggle_like, AdminComment, AdminPost, ValidationError};
use crate::database::{FindQuery, Record, Repository};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::populate::{self, AdminPostView};
use crate::state::AppState;

const POST_LABEL: &str = "Post";

#[derive(Debug, Default, Deserialize)]
pub struct NewAdminPost {
    pub content: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct NewComment {
    pub text: Option<String>,
}

async fn view(state: &AppState, post: Record<AdminPost>) -> Result<AdminPostView, ApiError> {
    let mut views = populate::admin_posts(&state.repo(), vec![post]).await?;
    views
        .pop()
        .ok_or_else(|| ApiError::internal_server_error("Failed to load post"))
}

async fn load(posts: &Repository<AdminPost>, id: &str) -> Result<Record<AdminPost>, ApiError> {
    let id = parse_id(id, POST_LABEL)?;
    posts
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Post not found"))
}

async fn save(posts: &Repository<AdminPost>, post: Record<AdminPost>) -> Result<Record<AdminPost>, ApiError> {
    posts
        .update(post.id, &post.data)
        .await?
        .ok_or_else(|| ApiError::not_found("Post not found"))
}

fn non_empty(value: Option<String>, message: &str) -> Result<String, ValidationError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ValidationError::new(message)),
    }
}

/// GET /api/admin-posts
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<AdminPostView>> {
    let posts = state
        .repo::<AdminPost>()
        .find(&FindQuery::newest_first())
        .await?;
    let views = populate::admin_posts(&state.repo(), posts).await?;
    Ok(ApiResponse::success("Posts retrieved successfully", views))
}

/// POST /api/admin-posts
pub async fn create(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(input): Json<NewAdminPost>,
) -> ApiResult<AdminPostView> {
    let content = non_empty(input.content, "Content must not be empty")?;
    let record = state
        .repo::<AdminPost>()
        .create(&AdminPost::new(content, auth_user.id))
        .await?;
    tracing::info!("Admin {} created post {}", auth_user.id, record.id);

    Ok(ApiResponse::created(
        "Post created successfully",
        view(&state, record).await?,
    ))
}

/// POST /api/admin-posts/:id/like
pub async fn like(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<AdminPostView> {
    let posts = state.repo::<AdminPost>();
    let mut post = load(&posts, &id).await?;

    let liked = toggle_like(&mut post.data.likes, auth_user.id);
    let post = save(&posts, post).await?;
    tracing::debug!("User {} liked={} admin post {}", auth_user.id, liked, post.id);

    let message = if liked { "Post liked successfully" } else { "Post unliked successfully" };
    Ok(ApiResponse::success(message, view(&state, post).await?))
}

/// POST /api/admin-posts/:id/comments
pub async fn add_comment(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(input): Json<NewComment>,
) -> ApiResult<AdminPostView> {
    let text = non_empty(input.text, "Text must not be empty")?;
    let posts = state.repo::<AdminPost>();
    let mut post = load(&posts, &id).await?;

    post.data.comments.push(AdminComment::new(auth_user.id, text));
    let post = save(&posts, post).await?;

    Ok(ApiResponse::success(
        "Comment added successfully",
        view(&state, post).await?,
    ))
}

/// DELETE /api/admin-posts/:postId/comments/:commentId
pub async fn delete_comment(
    State(state): State<AppState>,
    Path((post_id, comment_id)): Path<(String, String)>,
) -> ApiResult<AdminPostView> {
    let posts = state.repo::<AdminPost>();
    let mut post = load(&posts, &post_id).await?;

    let comment_id = parse_id(&comment_id, "Comment")?;
    if !post.data.remove_comment(comment_id) {
        return Err(ApiError::not_found("Comment not found"));
    }
    let post = save(&posts, post).await?;
    tracing::info!("Removed comment {} from admin post {}", comment_id, post.id);

    Ok(ApiResponse::success(
        "Comment deleted successfully",
        view(&state, post).await?,
    ))
}
