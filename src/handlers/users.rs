//! # Users API Handlers
//!
//! The password is accepted as plaintext on create and hashed before storage;
//! no response shape ever carries the hash back out.

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
use crate::handlers::roles::RoleResponseDto;
use crate::models::user::Model as UserModel;
use crate::repositories::{
    CreateUserRequest, UpdateUserRequest, UserRepository, UserWithRoles,
};
use crate::server::AppState;

/// Request payload for creating a new user
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateUserRequestDto {
    /// Email address (required, unique)
    #[schema(example = "ada@example.com")]
    pub email: String,
    /// Plaintext password, minimum 8 characters
    pub password: String,
    /// Given name
    #[schema(example = "Ada")]
    pub first_name: String,
    /// Family name
    #[schema(example = "Lovelace")]
    pub last_name: String,
    /// Tenant scope; omit for a global user
    pub tenant_id: Option<Uuid>,
}

/// Request payload for a profile edit
#[derive(Debug, Serialize, Deserialize, ToSchema, Default)]
pub struct UpdateUserRequestDto {
    /// New given name (optional)
    pub first_name: Option<String>,
    /// New family name (optional)
    pub last_name: Option<String>,
}

/// Response payload for a user
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserResponseDto {
    /// Unique identifier for the user (UUID)
    pub id: String,
    /// Email address
    #[schema(example = "ada@example.com")]
    pub email: String,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Tenant scope; null for a global user
    pub tenant_id: Option<String>,
    /// Timestamp when the user was created (ISO 8601)
    pub created_at: String,
    /// Timestamp when the user was last updated (ISO 8601)
    pub updated_at: String,
}

impl From<UserModel> for UserResponseDto {
    fn from(user: UserModel) -> Self {
        Self {
            id: user.id.to_string(),
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            tenant_id: user.tenant_id.map(|id| id.to_string()),
            created_at: user.created_at.to_rfc3339(),
            updated_at: user.updated_at.to_rfc3339(),
        }
    }
}

/// Response payload for a user with the roles they hold
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserWithRolesResponseDto {
    #[serde(flatten)]
    pub user: UserResponseDto,
    /// Roles held by the user
    pub roles: Vec<RoleResponseDto>,
}

impl From<UserWithRoles> for UserWithRolesResponseDto {
    fn from(value: UserWithRoles) -> Self {
        Self {
            user: value.user.into(),
            roles: value.roles.into_iter().map(Into::into).collect(),
        }
    }
}

/// Query parameters for listing users
#[derive(Debug, Deserialize, IntoParams)]
pub struct ListUsersQuery {
    /// Restrict the listing to one tenant scope
    pub tenant_id: Option<Uuid>,
}

/// Create a new user
///
/// Newly created users receive the default role automatically when one is
/// seeded.
#[utoipa::path(
    post,
    path = "/api/v1/users",
    security(("bearer_auth" = [])),
    request_body = CreateUserRequestDto,
    responses(
        (status = 201, description = "User created", body = UserWithRolesResponseDto),
        (status = 400, description = "Validation failed", body = ApiError),
        (status = 401, description = "Missing or invalid bearer token", body = ApiError),
        (status = 409, description = "Email already registered", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tag = "users"
)]
pub async fn create_user(
    State(state): State<AppState>,
    _operator_auth: OperatorAuth,
    Json(request): Json<CreateUserRequestDto>,
) -> Result<(StatusCode, Json<UserWithRolesResponseDto>), ApiError> {
    if request.email.trim().is_empty() {
        return Err(validation_error(
            "Email is required and cannot be empty",
            serde_json::json!({"field": "email"}),
        ));
    }

    let repo = UserRepository::new(&state.db);
    let user = repo
        .create_user(CreateUserRequest {
            email: request.email,
            password: request.password,
            first_name: request.first_name,
            last_name: request.last_name,
            tenant_id: request.tenant_id,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(user.into())))
}

/// Get a user by ID together with the roles they hold
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "User UUID")),
    responses(
        (status = 200, description = "User retrieved", body = UserWithRolesResponseDto),
        (status = 401, description = "Missing or invalid bearer token", body = ApiError),
        (status = 404, description = "User not found", body = ApiError)
    ),
    tag = "users"
)]
pub async fn get_user(
    State(state): State<AppState>,
    _operator_auth: OperatorAuth,
    Path(user_id): Path<Uuid>,
) -> Result<Json<UserWithRolesResponseDto>, ApiError> {
    let repo = UserRepository::new(&state.db);
    let user = repo.get_user_by_id(user_id).await?;

    Ok(Json(user.into()))
}

/// List users, optionally filtered by tenant
#[utoipa::path(
    get,
    path = "/api/v1/users",
    security(("bearer_auth" = [])),
    params(ListUsersQuery),
    responses(
        (status = 200, description = "Users retrieved", body = [UserResponseDto]),
        (status = 401, description = "Missing or invalid bearer token", body = ApiError)
    ),
    tag = "users"
)]
pub async fn list_users(
    State(state): State<AppState>,
    _operator_auth: OperatorAuth,
    Query(query): Query<ListUsersQuery>,
) -> Result<Json<Vec<UserResponseDto>>, ApiError> {
    let repo = UserRepository::new(&state.db);
    let users = repo.list_users(query.tenant_id).await?;

    Ok(Json(users.into_iter().map(Into::into).collect()))
}

/// Update a user's profile fields
#[utoipa::path(
    patch,
    path = "/api/v1/users/{id}",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "User UUID")),
    request_body = UpdateUserRequestDto,
    responses(
        (status = 200, description = "User updated", body = UserResponseDto),
        (status = 400, description = "Validation failed", body = ApiError),
        (status = 401, description = "Missing or invalid bearer token", body = ApiError),
        (status = 404, description = "User not found", body = ApiError)
    ),
    tag = "users"
)]
pub async fn update_user(
    State(state): State<AppState>,
    _operator_auth: OperatorAuth,
    Path(user_id): Path<Uuid>,
    Json(request): Json<UpdateUserRequestDto>,
) -> Result<Json<UserResponseDto>, ApiError> {
    let repo = UserRepository::new(&state.db);
    let user = repo
        .update_user(
            user_id,
            UpdateUserRequest {
                first_name: request.first_name,
                last_name: request.last_name,
            },
        )
        .await?;

    Ok(Json(user.into()))
}

/// Delete a user
#[utoipa::path(
    delete,
    path = "/api/v1/users/{id}",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "User UUID")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 401, description = "Missing or invalid bearer token", body = ApiError),
        (status = 404, description = "User not found", body = ApiError)
    ),
    tag = "users"
)]
pub async fn delete_user(
    State(state): State<AppState>,
    _operator_auth: OperatorAuth,
    Path(user_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let repo = UserRepository::new(&state.db);
    repo.delete_user(user_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Grant a role to a user
#[utoipa::path(
    post,
    path = "/api/v1/users/{id}/roles/{role_id}",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "User UUID"),
        ("role_id" = Uuid, Path, description = "Role UUID")
    ),
    responses(
        (status = 204, description = "Role granted"),
        (status = 401, description = "Missing or invalid bearer token", body = ApiError),
        (status = 404, description = "User or role not found", body = ApiError),
        (status = 409, description = "Role already assigned", body = ApiError)
    ),
    tag = "users"
)]
pub async fn assign_role(
    State(state): State<AppState>,
    _operator_auth: OperatorAuth,
    Path((user_id, role_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError> {
    let repo = UserRepository::new(&state.db);
    repo.assign_role(user_id, role_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Revoke a role from a user
#[utoipa::path(
    delete,
    path = "/api/v1/users/{id}/roles/{role_id}",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "User UUID"),
        ("role_id" = Uuid, Path, description = "Role UUID")
    ),
    responses(
        (status = 204, description = "Role revoked"),
        (status = 401, description = "Missing or invalid bearer token", body = ApiError),
        (status = 404, description = "Grant not found", body = ApiError)
    ),
    tag = "users"
)]
pub async fn remove_role(
    State(state): State<AppState>,
    _operator_auth: OperatorAuth,
    Path((user_id, role_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError> {
    let repo = UserRepository::new(&state.db);
    repo.remove_role(user_id, role_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
