//! # Permissions API Handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::OperatorAuth;
use crate::error::{ApiError, validation_error};
use crate::models::permission::Model as PermissionModel;
use crate::repositories::{CreatePermissionRequest, PermissionRepository};
use crate::server::AppState;

/// Request payload for creating a new permission
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreatePermissionRequestDto {
    /// Permission name (required, unique)
    #[schema(example = "users.read")]
    pub name: String,
    /// Free-form description (optional)
    pub description: Option<String>,
}

/// Response payload for a permission
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PermissionResponseDto {
    /// Unique identifier for the permission (UUID)
    pub id: String,
    /// Permission name
    #[schema(example = "users.read")]
    pub name: String,
    /// Free-form description (optional)
    pub description: Option<String>,
    /// Timestamp when the permission was created (ISO 8601)
    pub created_at: String,
}

impl From<PermissionModel> for PermissionResponseDto {
    fn from(permission: PermissionModel) -> Self {
        Self {
            id: permission.id.to_string(),
            name: permission.name,
            description: permission.description,
            created_at: permission.created_at.to_rfc3339(),
        }
    }
}

/// Create a new permission
#[utoipa::path(
    post,
    path = "/api/v1/permissions",
    security(("bearer_auth" = [])),
    request_body = CreatePermissionRequestDto,
    responses(
        (status = 201, description = "Permission created", body = PermissionResponseDto),
        (status = 400, description = "Validation failed", body = ApiError),
        (status = 401, description = "Missing or invalid bearer token", body = ApiError),
        (status = 409, description = "Permission name already exists", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tag = "permissions"
)]
pub async fn create_permission(
    State(state): State<AppState>,
    _operator_auth: OperatorAuth,
    Json(request): Json<CreatePermissionRequestDto>,
) -> Result<(StatusCode, Json<PermissionResponseDto>), ApiError> {
    if request.name.trim().is_empty() {
        return Err(validation_error(
            "Permission name is required and cannot be empty",
            serde_json::json!({"field": "name"}),
        ));
    }

    let repo = PermissionRepository::new(&state.db);
    let permission = repo
        .create_permission(CreatePermissionRequest {
            name: request.name,
            description: request.description,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(permission.into())))
}

/// Get a permission by ID
#[utoipa::path(
    get,
    path = "/api/v1/permissions/{id}",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Permission UUID")),
    responses(
        (status = 200, description = "Permission retrieved", body = PermissionResponseDto),
        (status = 401, description = "Missing or invalid bearer token", body = ApiError),
        (status = 404, description = "Permission not found", body = ApiError)
    ),
    tag = "permissions"
)]
pub async fn get_permission(
    State(state): State<AppState>,
    _operator_auth: OperatorAuth,
    Path(permission_id): Path<Uuid>,
) -> Result<Json<PermissionResponseDto>, ApiError> {
    let repo = PermissionRepository::new(&state.db);
    let permission = repo.get_permission_by_id(permission_id).await?;

    Ok(Json(permission.into()))
}

/// List all permissions
#[utoipa::path(
    get,
    path = "/api/v1/permissions",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Permissions retrieved", body = [PermissionResponseDto]),
        (status = 401, description = "Missing or invalid bearer token", body = ApiError)
    ),
    tag = "permissions"
)]
pub async fn list_permissions(
    State(state): State<AppState>,
    _operator_auth: OperatorAuth,
) -> Result<Json<Vec<PermissionResponseDto>>, ApiError> {
    let repo = PermissionRepository::new(&state.db);
    let permissions = repo.list_permissions().await?;

    Ok(Json(permissions.into_iter().map(Into::into).collect()))
}

/// Delete a permission
#[utoipa::path(
    delete,
    path = "/api/v1/permissions/{id}",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Permission UUID")),
    responses(
        (status = 204, description = "Permission deleted"),
        (status = 401, description = "Missing or invalid bearer token", body = ApiError),
        (status = 404, description = "Permission not found", body = ApiError)
    ),
    tag = "permissions"
)]
pub async fn delete_permission(
    State(state): State<AppState>,
    _operator_auth: OperatorAuth,
    Path(permission_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let repo = PermissionRepository::new(&state.db);
    repo.delete_permission(permission_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
