use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::models::{Membership, Role, UserProfile};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::user_service::{
    AssignRole, LoginOutcome, LoginUser, RegisterUser, RegisteredUser, UpdateUser, UserPage,
};
use crate::state::AppState;

/// Auth bodies arrive wrapped as `{ "user": { ... } }`
#[derive(Debug, Default, Deserialize)]
pub struct UserEnvelope<T> {
    #[serde(default)]
    pub user: T,
}

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<UserEnvelope<RegisterUser>>,
) -> ApiResult<RegisteredUser> {
    let record = state.users().register(body.user).await?;
    Ok(ApiResponse::created(
        "Created User Successfully",
        RegisteredUser::from(&record),
    ))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<UserEnvelope<LoginUser>>,
) -> ApiResult<LoginOutcome> {
    let outcome = state.users().login(body.user).await?;
    tracing::info!("User {} logged in", outcome.user.id);
    Ok(ApiResponse::success("Login Successfully", outcome))
}

/// GET /api/auth/me
pub async fn me(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> ApiResult<UserProfile> {
    let record = state.users().get(auth_user.id).await?;
    Ok(ApiResponse::success("Get User", UserProfile::from(&record)))
}

/// Query strings are parsed leniently: anything unparsable falls back to the default
#[derive(Debug, Default, Deserialize)]
pub struct UserListQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub membership: Option<String>,
}

/// GET /api/auth/get-users
pub async fn get_users(
    State(state): State<AppState>,
    Query(query): Query<UserListQuery>,
) -> ApiResult<UserPage> {
    let api = &state.config.api;
    let page = parse_positive(query.page.as_deref()).unwrap_or(1);
    let limit = parse_positive(query.limit.as_deref())
        .unwrap_or(api.default_page_limit)
        .min(api.max_page_limit);

    let membership = match query.membership.as_deref().map(str::trim) {
        None | Some("") | Some("all") => None,
        Some(value) => Some(value.parse::<Membership>()?),
    };

    let result = state.users().list(page, limit, membership).await?;
    Ok(ApiResponse::success("Get Users", result))
}

fn parse_positive(value: Option<&str>) -> Option<u64> {
    value?.trim().parse::<u64>().ok().filter(|v| *v > 0)
}

#[derive(Debug, Serialize)]
pub struct AssignedRole {
    pub id: Uuid,
    pub role: Option<Role>,
}

/// PUT /api/auth/assign-role
pub async fn assign_role(
    State(state): State<AppState>,
    Json(body): Json<UserEnvelope<AssignRole>>,
) -> ApiResult<AssignedRole> {
    let record = state.users().assign_role(body.user).await?;
    Ok(ApiResponse::created(
        "Role assigned",
        AssignedRole {
            id: record.id,
            role: record.data.role,
        },
    ))
}

#[derive(Debug, Serialize)]
pub struct UpdatedUser {
    pub user: UserProfile,
}

/// PUT /api/auth/users/:id
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<UserEnvelope<UpdateUser>>,
) -> ApiResult<UpdatedUser> {
    let record = state.users().update(&id, body.user).await?;
    Ok(ApiResponse::success(
        "User updated successfully",
        UpdatedUser {
            user: UserProfile::from(&record),
        },
    ))
}

/// DELETE /api/auth/users/:id
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    state.users().delete(&id).await?;
    Ok(ApiResponse::message("User deleted successfully"))
}
