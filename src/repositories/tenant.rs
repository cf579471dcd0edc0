//! # Tenant Repository
//!
//! CRUD over the tenants table. Tenant deletion is restrict-by-default: a
//! tenant that still owns users or roles cannot be removed.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, PaginatorTrait,
    QueryFilter, Set,
};
use uuid::Uuid;

use crate::error::RepositoryError;
use crate::models::tenant::{
    self, ActiveModel as TenantActiveModel, Entity as Tenant, Model as TenantModel,
};
use crate::models::{role, user};

/// Request data for creating a new tenant
#[derive(Debug, Clone)]
pub struct CreateTenantRequest {
    /// Display name for the tenant
    pub name: String,
}

/// Repository for tenant database operations
pub struct TenantRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> TenantRepository<'a> {
    /// Create a new TenantRepository with the given database connection
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Create a new tenant; a duplicate name is a conflict.
    pub async fn create_tenant(
        &self,
        request: CreateTenantRequest,
    ) -> Result<TenantModel, RepositoryError> {
        let name = validate_tenant_name(&request.name)?;

        let existing = Tenant::find()
            .filter(tenant::Column::Name.eq(name.as_str()))
            .one(self.db)
            .await
            .map_err(RepositoryError::database)?;
        if existing.is_some() {
            return Err(RepositoryError::conflict(format!(
                "tenant '{}' already exists",
                name
            )));
        }

        let now = Utc::now();
        let tenant = TenantActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        tenant
            .insert(self.db)
            .await
            .map_err(RepositoryError::database)
    }

    /// Get a tenant by id.
    pub async fn get_tenant_by_id(&self, tenant_id: Uuid) -> Result<TenantModel, RepositoryError> {
        Tenant::find_by_id(tenant_id)
            .one(self.db)
            .await
            .map_err(RepositoryError::database)?
            .ok_or_else(|| RepositoryError::not_found(format!("tenant {} not found", tenant_id)))
    }

    /// List all tenants.
    pub async fn list_tenants(&self) -> Result<Vec<TenantModel>, RepositoryError> {
        Tenant::find()
            .all(self.db)
            .await
            .map_err(RepositoryError::database)
    }

    /// Delete a tenant. Restricted while the tenant still owns users or
    /// roles; explicit cleanup must happen first.
    pub async fn delete_tenant(&self, tenant_id: Uuid) -> Result<(), RepositoryError> {
        let tenant = Tenant::find_by_id(tenant_id)
            .one(self.db)
            .await
            .map_err(RepositoryError::database)?
            .ok_or_else(|| RepositoryError::not_found(format!("tenant {} not found", tenant_id)))?;

        let user_count = user::Entity::find()
            .filter(user::Column::TenantId.eq(tenant_id))
            .count(self.db)
            .await
            .map_err(RepositoryError::database)?;
        let role_count = role::Entity::find()
            .filter(role::Column::TenantId.eq(tenant_id))
            .count(self.db)
            .await
            .map_err(RepositoryError::database)?;

        if user_count > 0 || role_count > 0 {
            return Err(RepositoryError::conflict(format!(
                "tenant {} still owns {} user(s) and {} role(s)",
                tenant_id, user_count, role_count
            )));
        }

        tenant
            .delete(self.db)
            .await
            .map_err(RepositoryError::database)?;

        Ok(())
    }

    /// Check if a tenant exists.
    pub async fn tenant_exists(&self, tenant_id: Uuid) -> Result<bool, RepositoryError> {
        let exists = Tenant::find_by_id(tenant_id)
            .one(self.db)
            .await
            .map_err(RepositoryError::database)?
            .is_some();

        Ok(exists)
    }
}

fn validate_tenant_name(name: &str) -> Result<String, RepositoryError> {
    let trimmed = name.trim();

    if trimmed.is_empty() {
        return Err(RepositoryError::validation("tenant name cannot be empty"));
    }

    if trimmed.len() > 255 {
        return Err(RepositoryError::validation(
            "tenant name cannot exceed 255 characters",
        ));
    }

    if !trimmed
        .chars()
        .all(|c| c.is_alphanumeric() || c.is_whitespace() || c == '-' || c == '_')
    {
        return Err(RepositoryError::validation(
            "tenant name can only contain letters, numbers, spaces, hyphens, and underscores",
        ));
    }

    Ok(trimmed.to_string())
}
