//! # Roles API Handlers
//!
//! Role creation links the role to its permissions atomically; a partially
//! created role is never observable through the API.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::auth::OperatorAuth;
use crate::error::{ApiError, validation_error};
use crate::handlers::permissions::PermissionResponseDto;
use crate::models::role::Model as RoleModel;
use crate::repositories::{
    CreateRoleRequest, RoleRepository, RoleWithPermissions, UpdateRoleRequest,
};
use crate::server::AppState;

/// Request payload for creating a new role
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateRoleRequestDto {
    /// Role name (required, unique within its tenant scope)
    #[schema(example = "editor")]
    pub name: String,
    /// Free-form description (optional)
    pub description: Option<String>,
    /// Whether new users receive this role automatically
    #[serde(default)]
    pub is_default: bool,
    /// Tenant scope; omit for a global role
    pub tenant_id: Option<Uuid>,
    /// Permissions to grant the role
    #[serde(default)]
    pub permission_ids: Vec<Uuid>,
}

/// Request payload for updating an existing role
#[derive(Debug, Serialize, Deserialize, ToSchema, Default)]
pub struct UpdateRoleRequestDto {
    /// New role name (optional)
    pub name: Option<String>,
    /// New description (optional)
    pub description: Option<String>,
    /// New default flag (optional)
    pub is_default: Option<bool>,
    /// When present, replaces the role's full permission set
    pub permission_ids: Option<Vec<Uuid>>,
}

/// Response payload for a role without its permission set
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RoleResponseDto {
    /// Unique identifier for the role (UUID)
    pub id: String,
    /// Role name
    #[schema(example = "editor")]
    pub name: String,
    /// Free-form description (optional)
    pub description: Option<String>,
    /// Whether new users receive this role automatically
    pub is_default: bool,
    /// Tenant scope; null for a global role
    pub tenant_id: Option<String>,
    /// Timestamp when the role was created (ISO 8601)
    pub created_at: String,
    /// Timestamp when the role was last updated (ISO 8601)
    pub updated_at: String,
}

impl From<RoleModel> for RoleResponseDto {
    fn from(role: RoleModel) -> Self {
        Self {
            id: role.id.to_string(),
            name: role.name,
            description: role.description,
            is_default: role.is_default,
            tenant_id: role.tenant_id.map(|id| id.to_string()),
            created_at: role.created_at.to_rfc3339(),
            updated_at: role.updated_at.to_rfc3339(),
        }
    }
}

/// Response payload for a role with its full permission set
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RoleWithPermissionsResponseDto {
    #[serde(flatten)]
    pub role: RoleResponseDto,
    /// Permissions granted to the role
    pub permissions: Vec<PermissionResponseDto>,
}

impl From<RoleWithPermissions> for RoleWithPermissionsResponseDto {
    fn from(value: RoleWithPermissions) -> Self {
        Self {
            role: value.role.into(),
            permissions: value.permissions.into_iter().map(Into::into).collect(),
        }
    }
}

/// Query parameters for listing roles
#[derive(Debug, Deserialize, IntoParams)]
pub struct ListRolesQuery {
    /// Restrict the listing to one tenant scope
    pub tenant_id: Option<Uuid>,
}

/// Create a new role with its permission links
#[utoipa::path(
    post,
    path = "/api/v1/roles",
    security(("bearer_auth" = [])),
    request_body = CreateRoleRequestDto,
    responses(
        (status = 201, description = "Role created", body = RoleWithPermissionsResponseDto),
        (status = 400, description = "Validation failed", body = ApiError),
        (status = 401, description = "Missing or invalid bearer token", body = ApiError),
        (status = 409, description = "Role name already exists in this scope", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tag = "roles"
)]
pub async fn create_role(
    State(state): State<AppState>,
    _operator_auth: OperatorAuth,
    Json(request): Json<CreateRoleRequestDto>,
) -> Result<(StatusCode, Json<RoleWithPermissionsResponseDto>), ApiError> {
    if request.name.trim().is_empty() {
        return Err(validation_error(
            "Role name is required and cannot be empty",
            serde_json::json!({"field": "name"}),
        ));
    }

    let repo = RoleRepository::new(&state.db);
    let role = repo
        .create_role(CreateRoleRequest {
            name: request.name,
            description: request.description,
            is_default: request.is_default,
            tenant_id: request.tenant_id,
            permission_ids: request.permission_ids,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(role.into())))
}

/// Get a role by ID together with its permissions
#[utoipa::path(
    get,
    path = "/api/v1/roles/{id}",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Role UUID")),
    responses(
        (status = 200, description = "Role retrieved", body = RoleWithPermissionsResponseDto),
        (status = 401, description = "Missing or invalid bearer token", body = ApiError),
        (status = 404, description = "Role not found", body = ApiError)
    ),
    tag = "roles"
)]
pub async fn get_role(
    State(state): State<AppState>,
    _operator_auth: OperatorAuth,
    Path(role_id): Path<Uuid>,
) -> Result<Json<RoleWithPermissionsResponseDto>, ApiError> {
    let repo = RoleRepository::new(&state.db);
    let role = repo.get_role_by_id(role_id).await?;

    Ok(Json(role.into()))
}

/// List roles, optionally filtered by tenant
#[utoipa::path(
    get,
    path = "/api/v1/roles",
    security(("bearer_auth" = [])),
    params(ListRolesQuery),
    responses(
        (status = 200, description = "Roles retrieved", body = [RoleResponseDto]),
        (status = 401, description = "Missing or invalid bearer token", body = ApiError)
    ),
    tag = "roles"
)]
pub async fn list_roles(
    State(state): State<AppState>,
    _operator_auth: OperatorAuth,
    Query(query): Query<ListRolesQuery>,
) -> Result<Json<Vec<RoleResponseDto>>, ApiError> {
    let repo = RoleRepository::new(&state.db);
    let roles = repo.list_roles(query.tenant_id).await?;

    Ok(Json(roles.into_iter().map(Into::into).collect()))
}

/// Update a role
///
/// When `permission_ids` is present the role's permission set is replaced
/// wholesale; omitting it leaves the existing links untouched.
#[utoipa::path(
    patch,
    path = "/api/v1/roles/{id}",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Role UUID")),
    request_body = UpdateRoleRequestDto,
    responses(
        (status = 200, description = "Role updated", body = RoleWithPermissionsResponseDto),
        (status = 400, description = "Validation failed", body = ApiError),
        (status = 401, description = "Missing or invalid bearer token", body = ApiError),
        (status = 404, description = "Role not found", body = ApiError),
        (status = 409, description = "Role name already exists in this scope", body = ApiError)
    ),
    tag = "roles"
)]
pub async fn update_role(
    State(state): State<AppState>,
    _operator_auth: OperatorAuth,
    Path(role_id): Path<Uuid>,
    Json(request): Json<UpdateRoleRequestDto>,
) -> Result<Json<RoleWithPermissionsResponseDto>, ApiError> {
    let repo = RoleRepository::new(&state.db);
    let role = repo
        .update_role(
            role_id,
            UpdateRoleRequest {
                name: request.name,
                description: request.description,
                is_default: request.is_default,
                permission_ids: request.permission_ids,
            },
        )
        .await?;

    Ok(Json(role.into()))
}

/// Delete a role
#[utoipa::path(
    delete,
    path = "/api/v1/roles/{id}",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Role UUID")),
    responses(
        (status = 204, description = "Role deleted"),
        (status = 401, description = "Missing or invalid bearer token", body = ApiError),
        (status = 404, description = "Role not found", body = ApiError)
    ),
    tag = "roles"
)]
pub async fn delete_role(
    State(state): State<AppState>,
    _operator_auth: OperatorAuth,
    Path(role_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let repo = RoleRepository::new(&state.db);
    repo.delete_role(role_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
