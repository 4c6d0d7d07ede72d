use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use super::auth::AuthUser;
use crate::database::models::User;
use crate::error::ApiError;
use crate::state::AppState;

const NOT_ADMIN: &str = "Not authorized as an admin";

/// Requires the stored user behind the JWT to currently hold the ADMIN role.
/// Must run after `jwt_auth_middleware`.
pub async fn admin_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user_id = request
        .extensions()
        .get::<AuthUser>()
        .map(|user| user.id)
        .ok_or_else(|| ApiError::unauthorized(NOT_ADMIN))?;

    let user = state
        .repo::<User>()
        .find_by_id(user_id)
        .await
        .map_err(|e| {
            tracing::error!("Admin check failed for {}: {}", user_id, e);
            ApiError::unauthorized(NOT_ADMIN)
        })?;

    match user {
        Some(record) if record.data.is_admin() => Ok(next.run(request).await),
        _ => {
            tracing::warn!("User {} denied admin access", user_id);
            Err(ApiError::unauthorized(NOT_ADMIN))
        }
    }
}
