//! # Tenants API Handlers

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
use crate::models::tenant::Model as TenantModel;
use crate::repositories::{CreateTenantRequest, TenantRepository};
use crate::server::AppState;

/// Request payload for creating a new tenant
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateTenantRequestDto {
    /// Tenant display name (required, unique)
    #[schema(example = "Acme Corp")]
    pub name: String,
}

/// Response payload for a tenant
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TenantResponseDto {
    /// Unique identifier for the tenant (UUID)
    pub id: String,
    /// Tenant display name
    #[schema(example = "Acme Corp")]
    pub name: String,
    /// Timestamp when the tenant was created (ISO 8601)
    pub created_at: String,
    /// Timestamp when the tenant was last updated (ISO 8601)
    pub updated_at: String,
}

impl From<TenantModel> for TenantResponseDto {
    fn from(tenant: TenantModel) -> Self {
        Self {
            id: tenant.id.to_string(),
            name: tenant.name,
            created_at: tenant.created_at.to_rfc3339(),
            updated_at: tenant.updated_at.to_rfc3339(),
        }
    }
}

/// Create a new tenant
#[utoipa::path(
    post,
    path = "/api/v1/tenants",
    security(("bearer_auth" = [])),
    request_body = CreateTenantRequestDto,
    responses(
        (status = 201, description = "Tenant created", body = TenantResponseDto),
        (status = 400, description = "Validation failed", body = ApiError),
        (status = 401, description = "Missing or invalid bearer token", body = ApiError),
        (status = 409, description = "Tenant name already exists", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tag = "tenants"
)]
pub async fn create_tenant(
    State(state): State<AppState>,
    _operator_auth: OperatorAuth,
    Json(request): Json<CreateTenantRequestDto>,
) -> Result<(StatusCode, Json<TenantResponseDto>), ApiError> {
    if request.name.trim().is_empty() {
        return Err(validation_error(
            "Tenant name is required and cannot be empty",
            serde_json::json!({"field": "name"}),
        ));
    }

    let repo = TenantRepository::new(&state.db);
    let tenant = repo
        .create_tenant(CreateTenantRequest { name: request.name })
        .await?;

    Ok((StatusCode::CREATED, Json(tenant.into())))
}

/// Get a tenant by ID
#[utoipa::path(
    get,
    path = "/api/v1/tenants/{id}",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Tenant UUID")),
    responses(
        (status = 200, description = "Tenant retrieved", body = TenantResponseDto),
        (status = 401, description = "Missing or invalid bearer token", body = ApiError),
        (status = 404, description = "Tenant not found", body = ApiError)
    ),
    tag = "tenants"
)]
pub async fn get_tenant(
    State(state): State<AppState>,
    _operator_auth: OperatorAuth,
    Path(tenant_id): Path<Uuid>,
) -> Result<Json<TenantResponseDto>, ApiError> {
    let repo = TenantRepository::new(&state.db);
    let tenant = repo.get_tenant_by_id(tenant_id).await?;

    Ok(Json(tenant.into()))
}

/// List all tenants
#[utoipa::path(
    get,
    path = "/api/v1/tenants",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Tenants retrieved", body = [TenantResponseDto]),
        (status = 401, description = "Missing or invalid bearer token", body = ApiError)
    ),
    tag = "tenants"
)]
pub async fn list_tenants(
    State(state): State<AppState>,
    _operator_auth: OperatorAuth,
) -> Result<Json<Vec<TenantResponseDto>>, ApiError> {
    let repo = TenantRepository::new(&state.db);
    let tenants = repo.list_tenants().await?;

    Ok(Json(tenants.into_iter().map(Into::into).collect()))
}

/// Delete a tenant
///
/// Deletion is refused with 409 while the tenant still owns users or roles.
#[utoipa::path(
    delete,
    path = "/api/v1/tenants/{id}",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Tenant UUID")),
    responses(
        (status = 204, description = "Tenant deleted"),
        (status = 401, description = "Missing or invalid bearer token", body = ApiError),
        (status = 404, description = "Tenant not found", body = ApiError),
        (status = 409, description = "Tenant still owns users or roles", body = ApiError)
    ),
    tag = "tenants"
)]
pub async fn delete_tenant(
    State(state): State<AppState>,
    _operator_auth: OperatorAuth,
    Path(tenant_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let repo = TenantRepository::new(&state.db);
    repo.delete_tenant(tenant_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
