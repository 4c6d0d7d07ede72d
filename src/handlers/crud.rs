//! Generic list/get/create/update/delete handlers shared by every `Resource`.
//!
//! Mounted per model in `routes`, e.g. `get(crud::list::<Quote>)`.

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::database::models::Resource;
use crate::database::{FindQuery, Record};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// A path id that is not a UUID cannot name a document
pub fn parse_id(id: &str, label: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(id).map_err(|_| not_found(label))
}

fn not_found(label: &str) -> ApiError {
    ApiError::not_found(format!("{} not found", label))
}

pub async fn list<R: Resource>(State(state): State<AppState>) -> ApiResult<Vec<Record<R>>> {
    let query = FindQuery {
        sort: R::LIST_ORDER,
        ..FindQuery::default()
    };
    let records = state.repo::<R>().find(&query).await?;

    Ok(ApiResponse::success(
        format!("{} retrieved successfully", R::PLURAL),
        records,
    ))
}

pub async fn get<R: Resource>(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Record<R>> {
    let id = parse_id(&id, R::LABEL)?;
    let record = state
        .repo::<R>()
        .find_by_id(id)
        .await?
        .ok_or_else(|| not_found(R::LABEL))?;

    Ok(ApiResponse::success(
        format!("{} retrieved successfully", R::LABEL),
        record,
    ))
}

pub async fn create<R: Resource>(
    State(state): State<AppState>,
    Json(input): Json<R::Input>,
) -> ApiResult<Record<R>> {
    let model = R::create(input)?;
    let record = state.repo::<R>().create(&model).await?;
    tracing::info!("Created {} {}", R::COLLECTION, record.id);

    Ok(ApiResponse::created(
        format!("{} created successfully", R::LABEL),
        record,
    ))
}

/// Merge the supplied fields into the stored document
pub async fn update<R: Resource>(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<R::Input>,
) -> ApiResult<Record<R>> {
    let id = parse_id(&id, R::LABEL)?;
    let repo = state.repo::<R>();

    let mut model = repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| not_found(R::LABEL))?
        .data;
    model.apply(input)?;

    let record = repo
        .update(id, &model)
        .await?
        .ok_or_else(|| not_found(R::LABEL))?;
    tracing::info!("Updated {} {}", R::COLLECTION, id);

    Ok(ApiResponse::success(
        format!("{} updated successfully", R::LABEL),
        record,
    ))
}

/// Delete the document, then any uploaded files it owned
pub async fn delete<R: Resource>(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let id = parse_id(&id, R::LABEL)?;
    let deleted = state
        .repo::<R>()
        .delete(id)
        .await?
        .ok_or_else(|| not_found(R::LABEL))?;

    let uploads = state.uploads();
    for url in deleted.data.owned_uploads() {
        uploads.remove(url).await;
    }
    tracing::info!("Deleted {} {}", R::COLLECTION, id);

    Ok(ApiResponse::message(format!("{} deleted successfully", R::LABEL)))
}
