//! # Permission Repository
//!
//! CRUD over the permissions table. Permission names are globally unique.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter, Set,
};
use uuid::Uuid;

use crate::error::RepositoryError;
use crate::models::permission::{
    self, ActiveModel as PermissionActiveModel, Entity as Permission, Model as PermissionModel,
};

/// Request data for creating a new permission
#[derive(Debug, Clone)]
pub struct CreatePermissionRequest {
    pub name: String,
    pub description: Option<String>,
}

/// Repository for permission database operations
pub struct PermissionRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> PermissionRepository<'a> {
    /// Create a new PermissionRepository with the given database connection
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Create a permission; a duplicate name is a conflict.
    pub async fn create_permission(
        &self,
        request: CreatePermissionRequest,
    ) -> Result<PermissionModel, RepositoryError> {
        let name = request.name.trim().to_string();
        if name.is_empty() {
            return Err(RepositoryError::validation(
                "permission name cannot be empty",
            ));
        }

        let existing = self.find_by_name(&name).await?;
        if existing.is_some() {
            return Err(RepositoryError::conflict(format!(
                "permission '{}' already exists",
                name
            )));
        }

        let permission = PermissionActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name),
            description: Set(request.description),
            created_at: Set(Utc::now().into()),
        };

        permission
            .insert(self.db)
            .await
            .map_err(RepositoryError::database)
    }

    /// Get a permission by id.
    pub async fn get_permission_by_id(
        &self,
        permission_id: Uuid,
    ) -> Result<PermissionModel, RepositoryError> {
        Permission::find_by_id(permission_id)
            .one(self.db)
            .await
            .map_err(RepositoryError::database)?
            .ok_or_else(|| {
                RepositoryError::not_found(format!("permission {} not found", permission_id))
            })
    }

    /// Find a permission by its unique name.
    pub async fn find_by_name(
        &self,
        name: &str,
    ) -> Result<Option<PermissionModel>, RepositoryError> {
        Permission::find()
            .filter(permission::Column::Name.eq(name))
            .one(self.db)
            .await
            .map_err(RepositoryError::database)
    }

    /// List all permissions.
    pub async fn list_permissions(&self) -> Result<Vec<PermissionModel>, RepositoryError> {
        Permission::find()
            .all(self.db)
            .await
            .map_err(RepositoryError::database)
    }

    /// Delete a permission; its role_permissions links cascade.
    pub async fn delete_permission(&self, permission_id: Uuid) -> Result<(), RepositoryError> {
        let permission = Permission::find_by_id(permission_id)
            .one(self.db)
            .await
            .map_err(RepositoryError::database)?
            .ok_or_else(|| {
                RepositoryError::not_found(format!("permission {} not found", permission_id))
            })?;

        permission
            .delete(self.db)
            .await
            .map_err(RepositoryError::database)?;

        Ok(())
    }
}
